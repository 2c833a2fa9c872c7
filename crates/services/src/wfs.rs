//! Risk-location feature queries against the OVAM WFS endpoint.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use foundation::{BoundingBox, PlanarCoordinate};

use crate::capakey::BoxFuture;
use crate::error::QueryError;

pub const DEFAULT_RISK_WFS_URL: &str = "https://beheer-risicolocaties.ovam.be/geoserver/BROL/wfs";

const FEATURE_TYPE: &str = "BROL:risicolocatie";
const SRS_NAME: &str = "EPSG:31370";

/// Fetches risk-location features around a projected-grid center.
///
/// Same dyn-compatible shape as [`crate::CoordinateResolver`], for the same
/// reason: the orchestrator tests run against a stub.
pub trait RiskQuery: Send + Sync {
    fn query(
        &self,
        center: PlanarCoordinate,
        buffer_m: f64,
    ) -> BoxFuture<'_, Result<Vec<RiskFeature>, QueryError>>;
}

/// A normalized risk-location feature.
///
/// Geometry is carried through unchanged; properties lose their null-valued
/// keys during normalization, which is one-way and lossy by design of the
/// display pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskFeature {
    pub id: Value,
    pub geometry_type: String,
    pub geometry_coordinates: Value,
    pub properties: serde_json::Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<WireFeature>,
}

#[derive(Debug, Deserialize)]
struct WireFeature {
    #[serde(default)]
    id: Value,
    #[serde(default)]
    geometry: WireGeometry,
    #[serde(default)]
    properties: serde_json::Map<String, Value>,
}

#[derive(Debug, Default, Deserialize)]
struct WireGeometry {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    coordinates: Value,
}

/// Client for the risk-location feature service.
pub struct RiskLocationClient {
    base_url: String,
    http: reqwest::Client,
}

impl RiskLocationClient {
    pub fn new(base_url: impl Into<String>, http: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into(),
            http,
        }
    }
}

impl RiskQuery for RiskLocationClient {
    /// Fetch risk locations intersecting the box of half-width `buffer_m`
    /// around `center`. A zero buffer queries the exact point.
    fn query(
        &self,
        center: PlanarCoordinate,
        buffer_m: f64,
    ) -> BoxFuture<'_, Result<Vec<RiskFeature>, QueryError>> {
        Box::pin(async move {
            let bbox = BoundingBox::from_center_buffer(center, buffer_m).bbox_param();
            debug!("querying risk locations in bbox {bbox}");

            let resp = self
                .http
                .get(&self.base_url)
                .query(&[
                    ("service", "WFS"),
                    ("version", "2.0.0"),
                    ("request", "GetFeature"),
                    ("typeName", FEATURE_TYPE),
                    ("outputFormat", "application/json"),
                    ("bbox", bbox.as_str()),
                    ("srsname", SRS_NAME),
                ])
                .header(reqwest::header::ACCEPT, "application/json")
                .send()
                .await
                .map_err(|e| QueryError::Transport(e.to_string()))?;

            if !resp.status().is_success() {
                return Err(QueryError::Status(resp.status().as_u16()));
            }

            let body: Value = resp
                .json()
                .await
                .map_err(|e| QueryError::Body(e.to_string()))?;

            let features = normalize_features(body)?;
            info!("{} risk location(s) in bbox {bbox}", features.len());
            Ok(features)
        })
    }
}

/// Normalize a feature-collection body into [`RiskFeature`]s.
///
/// An absent `features` list means zero results, not an error.
pub fn normalize_features(body: Value) -> Result<Vec<RiskFeature>, QueryError> {
    let collection: FeatureCollection =
        serde_json::from_value(body).map_err(|e| QueryError::Body(e.to_string()))?;

    Ok(collection
        .features
        .into_iter()
        .map(|feature| RiskFeature {
            id: feature.id,
            geometry_type: feature.geometry.kind,
            geometry_coordinates: feature.geometry.coordinates,
            properties: feature
                .properties
                .into_iter()
                .filter(|(_, v)| !v.is_null())
                .collect(),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::normalize_features;
    use crate::error::QueryError;
    use pretty_assertions::assert_eq;
    use serde_json::{Map, Value, json};

    #[test]
    fn null_properties_are_dropped() {
        let body = json!({
            "type": "FeatureCollection",
            "features": [{
                "id": "risicolocatie.101",
                "geometry": { "type": "Point", "coordinates": [152204.1, 211835.7] },
                "properties": { "a": 1, "b": null, "c": "x" }
            }]
        });

        let features = normalize_features(body).expect("features");
        assert_eq!(features.len(), 1);

        let mut expected = Map::new();
        expected.insert("a".into(), json!(1));
        expected.insert("c".into(), json!("x"));
        assert_eq!(features[0].properties, expected);
        assert_eq!(features[0].id, json!("risicolocatie.101"));
        assert_eq!(features[0].geometry_type, "Point");
        assert_eq!(
            features[0].geometry_coordinates,
            json!([152204.1, 211835.7])
        );
    }

    #[test]
    fn absent_features_list_means_zero_results() {
        let features = normalize_features(json!({ "type": "FeatureCollection" })).expect("empty");
        assert!(features.is_empty());

        let features =
            normalize_features(json!({ "type": "FeatureCollection", "features": [] })).expect("empty");
        assert!(features.is_empty());
    }

    #[test]
    fn features_without_geometry_or_id_still_normalize() {
        let body = json!({
            "features": [{ "properties": { "only": "props" } }]
        });
        let features = normalize_features(body).expect("features");
        assert_eq!(features[0].id, Value::Null);
        assert_eq!(features[0].geometry_type, "");
        assert_eq!(features[0].geometry_coordinates, Value::Null);
        assert_eq!(features[0].properties["only"], json!("props"));
    }

    #[test]
    fn non_collection_body_is_malformed() {
        assert!(matches!(
            normalize_features(json!([1, 2, 3])),
            Err(QueryError::Body(_))
        ));
    }
}

//! Parcel center lookup against the Flanders capakey service.

use std::future::Future;
use std::pin::Pin;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde_json::Value;
use tracing::{debug, info};

use foundation::{ParcelKey, PlanarCoordinate};

use crate::error::LookupError;

pub const DEFAULT_CAPAKEY_URL: &str = "https://geo.api.vlaanderen.be/capakey/v2";

/// Type alias for a boxed future that can be sent between threads.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Resolves a parcel key to its projected-grid center.
///
/// Implementations must be `Send + Sync`; methods return boxed futures for
/// dyn-compatibility, so the orchestrator can run against a fake resolver
/// in tests.
pub trait CoordinateResolver: Send + Sync {
    fn resolve<'a>(
        &'a self,
        key: &'a ParcelKey,
    ) -> BoxFuture<'a, Result<PlanarCoordinate, LookupError>>;
}

// RFC 3986 unreserved characters stay literal; everything else is escaped,
// so keys with slashes or spaces survive as a single path segment.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Client for the parcel lookup REST service.
pub struct CapakeyClient {
    base_url: String,
    http: reqwest::Client,
}

impl CapakeyClient {
    pub fn new(base_url: impl Into<String>, http: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into(),
            http,
        }
    }

    fn parcel_url(&self, key: &ParcelKey) -> String {
        let encoded = utf8_percent_encode(key.as_str(), PATH_SEGMENT);
        format!(
            "{}/parcel/{}?geometry=full&srs=31370&status=actual",
            self.base_url.trim_end_matches('/'),
            encoded
        )
    }
}

impl CoordinateResolver for CapakeyClient {
    /// Resolve a parcel key to its center in the EPSG:31370 grid.
    fn resolve<'a>(
        &'a self,
        key: &'a ParcelKey,
    ) -> BoxFuture<'a, Result<PlanarCoordinate, LookupError>> {
        Box::pin(async move {
            let url = self.parcel_url(key);
            debug!("resolving parcel center: {url}");

            let resp = self
                .http
                .get(&url)
                .header(reqwest::header::ACCEPT, "application/json")
                .send()
                .await
                .map_err(|e| LookupError::Transport(e.to_string()))?;

            if !resp.status().is_success() {
                return Err(LookupError::Status(resp.status().as_u16()));
            }

            let body: Value = resp
                .json()
                .await
                .map_err(|e| LookupError::Body(e.to_string()))?;

            let center = extract_center(&body)?;
            info!("parcel center resolved: {},{}", center.x, center.y);
            Ok(center)
        })
    }
}

/// Pull the center coordinate out of a lookup response body.
///
/// `geometry.center` is either a GeoJSON point object or, on some service
/// versions, that same object JSON-encoded as a string; both are accepted.
pub fn extract_center(body: &Value) -> Result<PlanarCoordinate, LookupError> {
    let center = body
        .get("geometry")
        .and_then(|g| g.get("center"))
        .ok_or_else(|| LookupError::MissingCenter("geometry.center is absent".into()))?;

    let center = match center {
        Value::String(encoded) => serde_json::from_str::<Value>(encoded)
            .map_err(|e| LookupError::MissingCenter(format!("center string is not JSON: {e}")))?,
        other => other.clone(),
    };

    let coords = center
        .get("coordinates")
        .and_then(|c| c.as_array())
        .ok_or_else(|| LookupError::MissingCenter("center has no coordinates array".into()))?;

    if coords.len() != 2 {
        return Err(LookupError::MissingCenter(format!(
            "expected exactly 2 coordinates, got {}",
            coords.len()
        )));
    }

    Ok(PlanarCoordinate::new(
        coordinate_value(&coords[0])?,
        coordinate_value(&coords[1])?,
    ))
}

fn coordinate_value(v: &Value) -> Result<f64, LookupError> {
    match v {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| LookupError::MissingCenter(format!("coordinate out of range: {n}"))),
        Value::String(s) => s
            .trim()
            .parse()
            .map_err(|_| LookupError::MissingCenter(format!("coordinate is not numeric: {s:?}"))),
        other => Err(LookupError::MissingCenter(format!(
            "coordinate is not numeric: {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::{CapakeyClient, PATH_SEGMENT, extract_center};
    use crate::error::LookupError;
    use foundation::ParcelKey;
    use percent_encoding::{percent_decode_str, utf8_percent_encode};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn extracts_center_from_object_form() {
        let body = json!({
            "capakey": "24505A0123/00C000",
            "geometry": {
                "center": { "type": "Point", "coordinates": [152204.1, 211835.7] }
            }
        });
        let c = extract_center(&body).expect("center");
        assert_eq!((c.x, c.y), (152204.1, 211835.7));
    }

    #[test]
    fn extracts_center_from_json_string_form() {
        let body = json!({
            "geometry": {
                "center": "{\"type\":\"Point\",\"coordinates\":[152204.1,211835.7]}"
            }
        });
        let c = extract_center(&body).expect("center");
        assert_eq!((c.x, c.y), (152204.1, 211835.7));
    }

    #[test]
    fn accepts_numeric_string_coordinates() {
        let body = json!({
            "geometry": { "center": { "coordinates": ["152204.1", "211835.7"] } }
        });
        let c = extract_center(&body).expect("center");
        assert_eq!((c.x, c.y), (152204.1, 211835.7));
    }

    #[test]
    fn missing_center_is_an_error() {
        let body = json!({ "capakey": "24505A0123/00C000", "geometry": {} });
        assert!(matches!(
            extract_center(&body),
            Err(LookupError::MissingCenter(_))
        ));

        let body = json!({ "status": "actual" });
        assert!(matches!(
            extract_center(&body),
            Err(LookupError::MissingCenter(_))
        ));
    }

    #[test]
    fn wrong_coordinate_arity_is_an_error() {
        let body = json!({
            "geometry": { "center": { "coordinates": [1.0, 2.0, 3.0] } }
        });
        assert!(matches!(
            extract_center(&body),
            Err(LookupError::MissingCenter(_))
        ));
    }

    #[test]
    fn key_with_reserved_characters_round_trips_through_the_path() {
        let raw = "24505A0123/00C000 bis+&?";
        let encoded = utf8_percent_encode(raw, PATH_SEGMENT).to_string();
        assert!(!encoded.contains('/'));
        assert!(!encoded.contains('&'));
        assert!(!encoded.contains('?'));
        assert!(!encoded.contains(' '));

        let decoded = percent_decode_str(&encoded).decode_utf8().expect("utf8");
        assert_eq!(decoded, raw);
    }

    #[test]
    fn parcel_url_embeds_encoded_key_and_fixed_parameters() {
        let client = CapakeyClient::new("https://example.test/capakey/v2/", reqwest::Client::new());
        let key = ParcelKey::parse("24505A0123/00C000").expect("key");
        assert_eq!(
            client.parcel_url(&key),
            "https://example.test/capakey/v2/parcel/24505A0123%2F00C000?geometry=full&srs=31370&status=actual"
        );
    }
}

use serde::{Deserialize, Serialize};

use foundation::{GeodeticCoordinate, ParcelKey, PlanarCoordinate};
use services::RiskFeature;

/// Result of a locate+resolve run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Extraction {
    pub parcel_key: ParcelKey,
    pub coordinate: PlanarCoordinate,
}

/// Result of a risk-location query, shaped for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskReport {
    /// Echoed from the session when known; a bare-coordinate query has none.
    pub parcel_key: Option<ParcelKey>,
    pub lambert72: PlanarCoordinate,
    pub wgs84: GeodeticCoordinate,
    pub risk_locations_found: usize,
    pub risk_locations: Vec<RiskFeature>,
}

/// Combined result of the full extract-then-query run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FullRun {
    pub extraction: Extraction,
    pub report: RiskReport,
}

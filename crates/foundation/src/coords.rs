use serde::{Deserialize, Serialize};

/// Position in the Belgian Lambert 72 grid (EPSG:31370), meters.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanarCoordinate {
    pub x: f64,
    pub y: f64,
}

impl PlanarCoordinate {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Longitude/latitude in WGS84, degrees.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeodeticCoordinate {
    pub lon: f64,
    pub lat: f64,
}

impl GeodeticCoordinate {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

//! Belgian Lambert 72 (EPSG:31370) and its datum shift to WGS84.
//!
//! The projection is a two-standard-parallel Lambert Conformal Conic on the
//! International 1924 ellipsoid. Going to WGS84 longitude/latitude takes the
//! published seven-parameter position-vector transformation from Belgian
//! Datum 72, applied in the ECEF frame.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

use super::{Ecef, Ellipsoid, Geodetic, INTL_1924, WGS84, ecef_to_geodetic, geodetic_to_ecef};
use crate::coords::{GeodeticCoordinate, PlanarCoordinate};

// EPSG:31370 defining parameters.
const LAT_1_DEG: f64 = 51.166_667_233_333_33; // 51°10'00.00204" N
const LAT_2_DEG: f64 = 49.833_333_9; // 49°50'00.00204" N
const LAT_0_DEG: f64 = 90.0;
const LON_0_DEG: f64 = 4.367_486_666_666_666; // 4°22'02.952" E
const FALSE_EASTING: f64 = 150_000.013;
const FALSE_NORTHING: f64 = 5_400_088.438;

// BD72 -> WGS84 position-vector parameters (meters, arcseconds, ppm).
const SHIFT_M: [f64; 3] = [-106.869, 52.2978, -103.724];
const ROT_ARCSEC: [f64; 3] = [0.3366, -0.457, 1.8422];
const SCALE_PPM: f64 = -1.2747;

const ARCSEC_TO_RAD: f64 = PI / 648_000.0;

/// Two-standard-parallel Lambert Conformal Conic with derived constants.
pub struct LambertConic {
    ell: Ellipsoid,
    n: f64,
    /// `a * F`, the scaled cone constant.
    af: f64,
    rho0: f64,
    lon0: f64,
    x0: f64,
    y0: f64,
}

impl LambertConic {
    /// The Belgian Lambert 72 grid on International 1924.
    pub fn belgian_lambert_72() -> Self {
        Self::new(
            INTL_1924,
            LAT_1_DEG.to_radians(),
            LAT_2_DEG.to_radians(),
            LAT_0_DEG.to_radians(),
            LON_0_DEG.to_radians(),
            FALSE_EASTING,
            FALSE_NORTHING,
        )
    }

    fn new(ell: Ellipsoid, lat1: f64, lat2: f64, lat0: f64, lon0: f64, x0: f64, y0: f64) -> Self {
        let e = ell.e2().sqrt();
        let m1 = m(lat1, e);
        let m2 = m(lat2, e);
        let t1 = t(lat1, e);
        let t2 = t(lat2, e);

        let n = (m1.ln() - m2.ln()) / (t1.ln() - t2.ln());
        let f = m1 / (n * t1.powf(n));
        let af = ell.a * f;
        // lat0 = 90° makes t0 = 0, so the grid origin sits at the cone apex.
        let rho0 = af * t(lat0, e).powf(n);

        Self {
            ell,
            n,
            af,
            rho0,
            lon0,
            x0,
            y0,
        }
    }

    /// Geodetic (on the conic's own datum) to grid meters.
    pub fn forward(&self, geo: Geodetic) -> PlanarCoordinate {
        let e = self.ell.e2().sqrt();
        let rho = self.af * t(geo.lat_rad, e).powf(self.n);
        let theta = self.n * (geo.lon_rad - self.lon0);
        PlanarCoordinate::new(
            self.x0 + rho * theta.sin(),
            self.y0 + self.rho0 - rho * theta.cos(),
        )
    }

    /// Grid meters to geodetic on the conic's own datum (altitude 0).
    pub fn inverse(&self, p: PlanarCoordinate) -> Geodetic {
        let e = self.ell.e2().sqrt();
        let dx = p.x - self.x0;
        let dy = self.rho0 - (p.y - self.y0);

        let rho = (dx * dx + dy * dy).sqrt();
        let t_inv = (rho / self.af).powf(1.0 / self.n);
        let theta = dx.atan2(dy);
        let lon = theta / self.n + self.lon0;

        // Fixed-point iteration for the isometric latitude inverse;
        // converges in a handful of steps at Belgian latitudes.
        let mut lat = FRAC_PI_2 - 2.0 * t_inv.atan();
        for _ in 0..10 {
            let es = (1.0 - e * lat.sin()) / (1.0 + e * lat.sin());
            let next = FRAC_PI_2 - 2.0 * (t_inv * es.powf(e / 2.0)).atan();
            if (next - lat).abs() < 1e-12 {
                lat = next;
                break;
            }
            lat = next;
        }

        Geodetic::new(lat, lon, 0.0)
    }
}

fn m(lat: f64, e: f64) -> f64 {
    lat.cos() / (1.0 - e * e * lat.sin() * lat.sin()).sqrt()
}

fn t(lat: f64, e: f64) -> f64 {
    let es = (1.0 - e * lat.sin()) / (1.0 + e * lat.sin());
    (FRAC_PI_4 - lat / 2.0).tan() / es.powf(e / 2.0)
}

/// Position-vector Helmert transformation from Belgian Datum 72 to WGS84.
fn bd72_to_wgs84(e: Ecef) -> Ecef {
    let rx = ROT_ARCSEC[0] * ARCSEC_TO_RAD;
    let ry = ROT_ARCSEC[1] * ARCSEC_TO_RAD;
    let rz = ROT_ARCSEC[2] * ARCSEC_TO_RAD;
    let s = 1.0 + SCALE_PPM * 1e-6;

    Ecef::new(
        SHIFT_M[0] + s * (e.x - rz * e.y + ry * e.z),
        SHIFT_M[1] + s * (rz * e.x + e.y - rx * e.z),
        SHIFT_M[2] + s * (-ry * e.x + rx * e.y + e.z),
    )
}

/// EPSG:31370 grid position to WGS84 longitude/latitude in degrees.
pub fn planar_to_wgs84(p: PlanarCoordinate) -> GeodeticCoordinate {
    let conic = LambertConic::belgian_lambert_72();
    let geo72 = conic.inverse(p);
    let ecef72 = geodetic_to_ecef(geo72, INTL_1924);
    let ecef84 = bd72_to_wgs84(ecef72);
    let geo84 = ecef_to_geodetic(ecef84, WGS84);
    GeodeticCoordinate::new(geo84.lon_rad.to_degrees(), geo84.lat_rad.to_degrees())
}

#[cfg(test)]
mod tests {
    use super::{LambertConic, LON_0_DEG, planar_to_wgs84};
    use crate::coords::PlanarCoordinate;

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn round_trip_inverse_forward() {
        let conic = LambertConic::belgian_lambert_72();
        for p in [
            PlanarCoordinate::new(150_000.013, 170_000.0),
            PlanarCoordinate::new(100_000.0, 200_000.0),
            PlanarCoordinate::new(250_000.0, 160_000.0),
            PlanarCoordinate::new(30_000.0, 20_000.0),
        ] {
            let geo = conic.inverse(p);
            let rt = conic.forward(geo);
            assert_close(rt.x, p.x, 1e-4);
            assert_close(rt.y, p.y, 1e-4);
        }
    }

    #[test]
    fn central_meridian_maps_to_origin_longitude() {
        let conic = LambertConic::belgian_lambert_72();
        let geo = conic.inverse(PlanarCoordinate::new(150_000.013, 170_000.0));
        assert_close(geo.lon_rad.to_degrees(), LON_0_DEG, 1e-9);
    }

    #[test]
    fn brussels_lands_near_known_position() {
        // Grand Place, Brussels: roughly (148879, 170539) in Lambert 72,
        // (4.3525 E, 50.8467 N) in WGS84.
        let geo = planar_to_wgs84(PlanarCoordinate::new(148_879.0, 170_539.0));
        assert_close(geo.lon, 4.3525, 0.05);
        assert_close(geo.lat, 50.8467, 0.05);
    }

    #[test]
    fn grid_axes_are_monotonic_in_lon_lat() {
        let base = planar_to_wgs84(PlanarCoordinate::new(150_000.0, 170_000.0));
        let east = planar_to_wgs84(PlanarCoordinate::new(151_000.0, 170_000.0));
        let north = planar_to_wgs84(PlanarCoordinate::new(150_000.0, 171_000.0));
        assert!(east.lon > base.lon);
        assert!(north.lat > base.lat);
        // 1 km on the grid is about 0.014° of longitude / 0.009° of latitude here.
        assert_close(east.lon - base.lon, 0.0142, 0.002);
        assert_close(north.lat - base.lat, 0.009, 0.002);
    }
}

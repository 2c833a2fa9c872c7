use super::Ecef;

/// Reference ellipsoid, defined by semi-major axis and flattening.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ellipsoid {
    /// Semi-major axis (meters).
    pub a: f64,
    /// Flattening.
    pub f: f64,
}

impl Ellipsoid {
    /// Semi-minor axis (meters).
    pub fn b(&self) -> f64 {
        self.a * (1.0 - self.f)
    }

    /// First eccentricity squared.
    pub fn e2(&self) -> f64 {
        self.f * (2.0 - self.f)
    }

    /// Second eccentricity squared.
    pub fn ep2(&self) -> f64 {
        let b = self.b();
        (self.a * self.a - b * b) / (b * b)
    }
}

/// WGS84, the datum of the displayed longitude/latitude.
pub const WGS84: Ellipsoid = Ellipsoid {
    a: 6_378_137.0,
    f: 1.0 / 298.257_223_563,
};

/// International 1924 (Hayford), the ellipsoid of Belgian Datum 72.
pub const INTL_1924: Ellipsoid = Ellipsoid {
    a: 6_378_388.0,
    f: 1.0 / 297.0,
};

/// Geodetic coordinates in radians and meters.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Geodetic {
    pub lat_rad: f64,
    pub lon_rad: f64,
    pub alt_m: f64,
}

impl Geodetic {
    pub fn new(lat_rad: f64, lon_rad: f64, alt_m: f64) -> Self {
        Self {
            lat_rad,
            lon_rad,
            alt_m,
        }
    }
}

pub fn geodetic_to_ecef(geo: Geodetic, ell: Ellipsoid) -> Ecef {
    let e2 = ell.e2();
    let sin_lat = geo.lat_rad.sin();
    let cos_lat = geo.lat_rad.cos();
    let sin_lon = geo.lon_rad.sin();
    let cos_lon = geo.lon_rad.cos();

    let n = ell.a / (1.0 - e2 * sin_lat * sin_lat).sqrt();
    let x = (n + geo.alt_m) * cos_lat * cos_lon;
    let y = (n + geo.alt_m) * cos_lat * sin_lon;
    let z = (n * (1.0 - e2) + geo.alt_m) * sin_lat;

    Ecef::new(x, y, z)
}

pub fn ecef_to_geodetic(ecef: Ecef, ell: Ellipsoid) -> Geodetic {
    let e2 = ell.e2();
    let ep2 = ell.ep2();
    let b = ell.b();

    let p = (ecef.x * ecef.x + ecef.y * ecef.y).sqrt();
    let lon = ecef.y.atan2(ecef.x);

    let theta = (ecef.z * ell.a).atan2(p * b);
    let sin_theta = theta.sin();
    let cos_theta = theta.cos();

    let lat = (ecef.z + ep2 * b * sin_theta * sin_theta * sin_theta)
        .atan2(p - e2 * ell.a * cos_theta * cos_theta * cos_theta);

    let sin_lat = lat.sin();
    let n = ell.a / (1.0 - e2 * sin_lat * sin_lat).sqrt();
    let alt = p / lat.cos() - n;

    Geodetic::new(lat, lon, alt)
}

#[cfg(test)]
mod tests {
    use super::{Geodetic, INTL_1924, WGS84, ecef_to_geodetic, geodetic_to_ecef};

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn geodetic_to_ecef_equator_prime_meridian() {
        let geo = Geodetic::new(0.0, 0.0, 0.0);
        let ecef = geodetic_to_ecef(geo, WGS84);
        assert_close(ecef.x, WGS84.a, 1e-6);
        assert_close(ecef.y, 0.0, 1e-6);
        assert_close(ecef.z, 0.0, 1e-6);
    }

    #[test]
    fn geodetic_to_ecef_equator_90e() {
        let geo = Geodetic::new(0.0, std::f64::consts::FRAC_PI_2, 0.0);
        let ecef = geodetic_to_ecef(geo, WGS84);
        assert_close(ecef.x, 0.0, 1e-6);
        assert_close(ecef.y, WGS84.a, 1e-6);
        assert_close(ecef.z, 0.0, 1e-6);
    }

    #[test]
    fn round_trip_geodetic_ecef_wgs84() {
        let geo = Geodetic::new(
            std::f64::consts::FRAC_PI_6,
            -std::f64::consts::FRAC_PI_3,
            120.0,
        );
        let ecef = geodetic_to_ecef(geo, WGS84);
        let geo_rt = ecef_to_geodetic(ecef, WGS84);
        assert_close(geo_rt.lat_rad, geo.lat_rad, 1e-9);
        assert_close(geo_rt.lon_rad, geo.lon_rad, 1e-9);
        assert_close(geo_rt.alt_m, geo.alt_m, 1e-6);
    }

    #[test]
    fn round_trip_geodetic_ecef_intl_1924() {
        let geo = Geodetic::new(50.8_f64.to_radians(), 4.35_f64.to_radians(), 0.0);
        let ecef = geodetic_to_ecef(geo, INTL_1924);
        let geo_rt = ecef_to_geodetic(ecef, INTL_1924);
        assert_close(geo_rt.lat_rad, geo.lat_rad, 1e-9);
        assert_close(geo_rt.lon_rad, geo.lon_rad, 1e-9);
        assert_close(geo_rt.alt_m, geo.alt_m, 1e-6);
    }
}

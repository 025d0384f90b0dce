//! Great-circle distance between monitoring stations and users.

/// Mean Earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Distance in kilometres between two points using the haversine formula.
///
/// Coordinates are decimal degrees. The result is symmetric in its two
/// points and zero (within floating-point tolerance) for identical points.
/// Antipodal points give half the circumference, never NaN.
pub fn distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let dphi = (lat2 - lat1).to_radians();
    let dlambda = (lon2 - lon1).to_radians();
    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    // rounding can push `a` just past 1 near antipodes
    let a = a.clamp(0.0, 1.0);
    2.0 * EARTH_RADIUS_KM * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Round a distance to one decimal place for display.
pub fn round_km(km: f64) -> f64 {
    (km * 10.0).round() / 10.0
}

/// Whether a latitude/longitude pair is usable for distance calculations.
pub fn is_valid_coordinate(lat: f64, lon: f64) -> bool {
    lat.is_finite()
        && lon.is_finite()
        && (-90.0..=90.0).contains(&lat)
        && (-180.0..=180.0).contains(&lon)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_point_is_zero() {
        assert!(distance_km(28.6139, 77.2090, 28.6139, 77.2090).abs() < 1e-9);
    }

    #[test]
    fn one_degree_of_latitude() {
        // 1 degree of latitude is ~111.19 km on a 6371 km sphere
        let d = distance_km(0.0, 0.0, 1.0, 0.0);
        assert!((d - 111.19).abs() < 0.01, "got {d}");
    }

    #[test]
    fn delhi_to_mumbai() {
        let d = distance_km(28.6139, 77.2090, 19.0760, 72.8777);
        assert!((d - 1148.1).abs() < 1.0, "got {d}");
    }

    #[test]
    fn antipodes_are_half_the_circumference() {
        let half = std::f64::consts::PI * EARTH_RADIUS_KM;
        for lon in [-180.0, -77.2, 0.0, 77.2, 180.0] {
            for tenth in -900..=900 {
                let lat = f64::from(tenth) / 10.0;
                let other = if lon > 0.0 { lon - 180.0 } else { lon + 180.0 };
                let d = distance_km(lat, lon, -lat, other);
                assert!(d.is_finite(), "({lat}, {lon}) gave {d}");
                assert!((d - half).abs() < 1.0, "({lat}, {lon}) gave {d}");
            }
        }
    }

    #[test]
    fn rounding() {
        assert_eq!(round_km(1.04), 1.0);
        assert_eq!(round_km(1.05), 1.1);
        assert_eq!(round_km(12.345), 12.3);
        assert_eq!(round_km(0.0), 0.0);
    }

    #[test]
    fn coordinate_validity() {
        assert!(is_valid_coordinate(28.6, 77.2));
        assert!(is_valid_coordinate(-90.0, 180.0));
        assert!(!is_valid_coordinate(90.1, 0.0));
        assert!(!is_valid_coordinate(0.0, -180.5));
        assert!(!is_valid_coordinate(f64::NAN, 0.0));
        assert!(!is_valid_coordinate(0.0, f64::INFINITY));
    }
}

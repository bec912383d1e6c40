//! Great-circle distance between coordinates

/// Mean Earth radius used by the haversine formula, in kilometers
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance in kilometers between two `(lat, lon)` points given in degrees
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lon2 - lon1).to_radians();

    let a = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    // Clamp guards against rounding pushing `a` past 1 for antipodal points
    let c = 2.0 * a.sqrt().min(1.0).asin();

    EARTH_RADIUS_KM * c
}

/// Travel time in minutes for `distance_km` at `speed_kmh`
#[inline]
pub fn travel_minutes(distance_km: f64, speed_kmh: f64) -> f64 {
    distance_km / speed_kmh * 60.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_zero_for_same_point() {
        assert_eq!(haversine_distance(41.1579, -8.6291, 41.1579, -8.6291), 0.0);
    }

    #[test]
    fn test_haversine_symmetric() {
        let d1 = haversine_distance(41.1579, -8.6291, 38.7223, -9.1393);
        let d2 = haversine_distance(38.7223, -9.1393, 41.1579, -8.6291);
        assert!((d1 - d2).abs() < 1e-9);
        assert!(d1 > 0.0);
    }

    #[test]
    fn test_haversine_known_distance() {
        // London to Paris
        let d = haversine_distance(51.5074, -0.1278, 48.8566, 2.3522);
        assert!((d - 343.5).abs() < 2.0, "got {d}");
    }

    #[test]
    fn test_haversine_one_degree_of_latitude() {
        let d = haversine_distance(0.0, 0.0, 1.0, 0.0);
        let expected = EARTH_RADIUS_KM * std::f64::consts::PI / 180.0;
        assert!((d - expected).abs() < 1e-9);
    }

    #[test]
    fn test_haversine_triangle_inequality() {
        let a = (41.15, -8.61);
        let b = (41.16, -8.60);
        let c = (41.14, -8.58);
        let ab = haversine_distance(a.0, a.1, b.0, b.1);
        let bc = haversine_distance(b.0, b.1, c.0, c.1);
        let ac = haversine_distance(a.0, a.1, c.0, c.1);
        assert!(ac <= ab + bc + 1e-12);
    }

    #[test]
    fn test_travel_minutes() {
        assert!((travel_minutes(5.0, 5.0) - 60.0).abs() < 1e-12);
        assert!((travel_minutes(1.0, 30.0) - 2.0).abs() < 1e-12);
    }
}

use stratus_shared::GeoPoint;

/// Mean Earth radius used for all distance computations
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two points using the haversine formula
pub fn haversine_km(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let rlat1 = a.latitude.to_radians();
    let rlat2 = b.latitude.to_radians();
    let dlat = (b.latitude - a.latitude).to_radians();
    let dlon = (b.longitude - a.longitude).to_radians();
    let h = (dlat / 2.0).sin().powi(2) + rlat1.cos() * rlat2.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_KM * c
}

/// Sum of great-circle hops along a sequence of points
pub fn path_length_km(points: &[GeoPoint]) -> f64 {
    points.windows(2).map(|w| haversine_km(&w[0], &w[1])).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_distance() {
        let p = GeoPoint::new(0.0, 0.0);
        assert_eq!(haversine_km(&p, &p), 0.0);
    }

    #[test]
    fn test_known_distance() {
        // London to Paris, roughly 344 km
        let london = GeoPoint::new(51.5074, -0.1278);
        let paris = GeoPoint::new(48.8566, 2.3522);
        let distance = haversine_km(&london, &paris);
        assert!((distance - 344.0).abs() < 10.0);
    }

    #[test]
    fn test_distance_is_symmetric() {
        let pairs = [
            (GeoPoint::new(40.7128, -74.0060), GeoPoint::new(25.7617, -80.1918)),
            (GeoPoint::new(-33.9399, 151.1753), GeoPoint::new(51.4700, -0.4543)),
            (GeoPoint::new(64.1466, -21.9426), GeoPoint::new(-54.8019, -68.3030)),
        ];
        for (a, b) in pairs {
            assert_eq!(haversine_km(&a, &b), haversine_km(&b, &a));
        }
    }

    #[test]
    fn test_curvature_matters_at_long_range() {
        // A flat lat/lon projection overstates this route by well over 1000 km
        let jfk = GeoPoint::new(40.6413, -73.7781);
        let lhr = GeoPoint::new(51.4700, -0.4543);
        let distance = haversine_km(&jfk, &lhr);
        assert!((distance - 5540.0).abs() < 30.0);
    }

    #[test]
    fn test_path_length() {
        let a = GeoPoint::new(0.0, 0.0);
        let b = GeoPoint::new(0.0, 1.0);
        let c = GeoPoint::new(0.0, 2.0);
        let total = path_length_km(&[a, b, c]);
        assert!((total - haversine_km(&a, &c)).abs() < 1e-6);
        assert_eq!(path_length_km(&[a]), 0.0);
        assert_eq!(path_length_km(&[]), 0.0);
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Roughly how many kilometres one degree of latitude spans.
pub const KM_PER_DEGREE_LATITUDE: f64 = 111.0;

/// A physical plant shop shown on the store locator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Store {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub phone: Option<String>,
    pub rating: Option<f64>,
    pub total_reviews: Option<i64>,
    pub is_partner: bool,
    pub created_at: DateTime<Utc>,
}

/// Missing coordinates are stored as 0.0 until the store is geocoded.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateStoreRequest {
    #[validate(length(min = 1, max = 200, message = "must be 1-200 characters"))]
    pub name: String,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub address: String,
    #[validate(range(min = -90.0, max = 90.0, message = "must be between -90 and 90"))]
    pub latitude: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0, message = "must be between -180 and 180"))]
    pub longitude: Option<f64>,
    #[validate(length(max = 20, message = "must be at most 20 characters"))]
    pub phone: Option<String>,
    #[validate(range(min = 0.0, max = 5.0, message = "must be between 0 and 5"))]
    pub rating: Option<f64>,
    #[validate(range(min = 0, message = "must not be negative"))]
    pub total_reviews: Option<i64>,
    #[serde(default)]
    pub is_partner: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NearbyStore {
    #[serde(flatten)]
    pub store: Store,
    pub distance_km: f64,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NearbyQuery {
    #[validate(range(min = -90.0, max = 90.0, message = "must be between -90 and 90"))]
    pub lat: f64,
    #[validate(range(min = -180.0, max = 180.0, message = "must be between -180 and 180"))]
    pub lng: f64,
    #[serde(default = "default_radius_km")]
    #[validate(range(exclusive_min = 0.0, max = 20_000.0, message = "must be between 0 and 20000"))]
    pub radius_km: f64,
}

fn default_radius_km() -> f64 {
    10.0
}

/// Great-circle distance between two coordinates in kilometres.
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let dlat = (lat2 - lat1).to_radians();
    let dlon = (lon2 - lon1).to_radians();
    let a = (dlat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_same_point_is_zero() {
        assert_eq!(haversine_km(12.97, 77.59, 12.97, 77.59), 0.0);
    }

    #[test]
    fn test_haversine_known_distance() {
        // Bengaluru to Chennai is about 290 km.
        let d = haversine_km(12.9716, 77.5946, 13.0827, 80.2707);
        assert!((d - 290.0).abs() < 5.0, "got {}", d);
    }

    #[test]
    fn test_nearby_query_rejects_bad_coordinates() {
        let query = NearbyQuery { lat: 91.0, lng: 0.0, radius_km: 5.0 };
        assert!(query.validate().is_err());
        let query = NearbyQuery { lat: 10.0, lng: 10.0, radius_km: 0.0 };
        assert!(query.validate().is_err());
    }
}

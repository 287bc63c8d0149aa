//! Geographic points and great-circle distance.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Mean earth radius used for distance calculations, in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A WGS84 latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GeoPoint {
    /// Latitude, -90..=90.
    pub lat: f64,
    /// Longitude, -180..=180.
    pub lng: f64,
}

impl GeoPoint {
    /// Builds a point, rejecting out-of-range or non-finite coordinates.
    ///
    /// # Errors
    ///
    /// Returns a message naming the offending coordinate.
    pub fn new(lat: f64, lng: f64) -> Result<Self, String> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(format!("latitude {lat} must be between -90 and 90"));
        }
        if !lng.is_finite() || !(-180.0..=180.0).contains(&lng) {
            return Err(format!("longitude {lng} must be between -180 and 180"));
        }
        Ok(Self { lat, lng })
    }

    /// Builds a point from optional columns; `None` unless both are present.
    #[must_use]
    pub fn from_parts(lat: Option<f64>, lng: Option<f64>) -> Option<Self> {
        match (lat, lng) {
            (Some(lat), Some(lng)) => Some(Self { lat, lng }),
            _ => None,
        }
    }

    /// Haversine distance to `other` in kilometres.
    #[must_use]
    pub fn distance_km(&self, other: &Self) -> f64 {
        let d_lat = (other.lat - self.lat).to_radians();
        let d_lng = (other.lng - self.lng).to_radians();
        let a = (d_lat / 2.0).sin().powi(2)
            + self.lat.to_radians().cos()
                * other.lat.to_radians().cos()
                * (d_lng / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_KM * a.sqrt().min(1.0).asin()
    }
}

/// Validates an optional coordinate pair supplied by a client.
///
/// Both or neither must be present.
///
/// # Errors
///
/// Returns the validation messages for the pair.
pub fn validate_pair(lat: Option<f64>, lng: Option<f64>) -> Result<Option<GeoPoint>, String> {
    match (lat, lng) {
        (None, None) => Ok(None),
        (Some(lat), Some(lng)) => GeoPoint::new(lat, lng).map(Some),
        _ => Err("latitude and longitude must be provided together".to_string()),
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn distance_to_self_is_zero() {
        let p = GeoPoint { lat: 48.85, lng: 2.35 };
        assert!(p.distance_km(&p).abs() < 1e-9);
    }

    #[test]
    fn paris_to_london_is_about_344_km() {
        let paris = GeoPoint { lat: 48.8566, lng: 2.3522 };
        let london = GeoPoint { lat: 51.5074, lng: -0.1278 };
        let d = paris.distance_km(&london);
        assert!((d - 343.5).abs() < 2.0, "got {d}");
        assert!((london.distance_km(&paris) - d).abs() < 1e-9);
    }

    #[test]
    fn rejects_out_of_range() {
        assert!(GeoPoint::new(91.0, 0.0).is_err());
        assert!(GeoPoint::new(0.0, -181.0).is_err());
        assert!(GeoPoint::new(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn pair_must_be_complete() {
        assert!(matches!(validate_pair(None, None), Ok(None)));
        assert!(validate_pair(Some(1.0), None).is_err());
        assert!(matches!(validate_pair(Some(1.0), Some(2.0)), Ok(Some(_))));
    }
}

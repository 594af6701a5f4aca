//! Danger zone aggregate and input validation.
//!
//! A zone is a circle on the WGS84 spheroid: a centre in degrees and a
//! radius in metres. Only `active` zones participate in nearest-zone
//! lookups.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Smallest radius a zone may carry, in metres.
pub const MIN_RADIUS_M: i32 = 5;

/// Description stored when the creator omits one.
pub const DESCRIPTION_PLACEHOLDER: &str = "without description";

/// A persisted danger zone.
///
/// `id`, `created_at`, and `updated_at` are assigned by the store;
/// `updated_at >= created_at` always holds. The store also maintains a
/// spatial representation of `(lat, long)` that callers never see.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Zone {
    pub id: i32,
    /// Unique, non-empty once trimmed.
    pub title: String,
    pub description: String,
    pub lat: f64,
    pub long: f64,
    pub radius_m: i32,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated field set for creating or fully updating a zone.
///
/// Construct through [`NewZone::try_from_parts`] so invalid values never
/// reach a store adapter.
#[derive(Debug, Clone, PartialEq)]
pub struct NewZone {
    pub title: String,
    pub description: String,
    pub lat: f64,
    pub long: f64,
    pub radius_m: i32,
    pub active: bool,
}

/// Validation failures raised while constructing a [`NewZone`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ZoneValidationError {
    #[error("title is required")]
    EmptyTitle,
    #[error("lat or long is out of range")]
    CoordinatesOutOfRange,
    #[error("radius must be at least {MIN_RADIUS_M} metres")]
    RadiusTooSmall,
}

impl NewZone {
    /// Validate raw creation input, filling in the description and active
    /// defaults.
    pub fn try_from_parts(
        title: &str,
        description: Option<String>,
        lat: f64,
        long: f64,
        radius_m: i32,
        active: Option<bool>,
    ) -> Result<Self, ZoneValidationError> {
        if title.trim().is_empty() {
            return Err(ZoneValidationError::EmptyTitle);
        }
        validate_coordinates(lat, long)?;
        if radius_m < MIN_RADIUS_M {
            return Err(ZoneValidationError::RadiusTooSmall);
        }
        Ok(Self {
            title: title.to_owned(),
            description: description.unwrap_or_else(|| DESCRIPTION_PLACEHOLDER.to_owned()),
            lat,
            long,
            radius_m,
            active: active.unwrap_or(true),
        })
    }
}

/// Check a WGS84 coordinate pair against its legal ranges.
pub fn validate_coordinates(lat: f64, long: f64) -> Result<(), ZoneValidationError> {
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&long) {
        return Err(ZoneValidationError::CoordinatesOutOfRange);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn draft(title: &str, lat: f64, long: f64, radius_m: i32) -> Result<NewZone, ZoneValidationError> {
        NewZone::try_from_parts(title, None, lat, long, radius_m, None)
    }

    #[test]
    fn accepts_minimal_input_and_applies_defaults() {
        let zone = draft("flood area", 50.0, 50.0, 100).expect("valid input");
        assert_eq!(zone.description, DESCRIPTION_PLACEHOLDER);
        assert!(zone.active);
    }

    #[rstest]
    #[case::empty("")]
    #[case::whitespace("   ")]
    fn rejects_blank_titles(#[case] title: &str) {
        assert_eq!(
            draft(title, 0.0, 0.0, 100),
            Err(ZoneValidationError::EmptyTitle)
        );
    }

    #[rstest]
    #[case::lat_min(-90.0, 0.0)]
    #[case::lat_max(90.0, 0.0)]
    #[case::long_min(0.0, -180.0)]
    #[case::long_max(0.0, 180.0)]
    fn accepts_boundary_coordinates(#[case] lat: f64, #[case] long: f64) {
        assert!(draft("z", lat, long, 100).is_ok());
    }

    #[rstest]
    #[case::lat_low(-90.000001, 0.0)]
    #[case::lat_high(90.000001, 0.0)]
    #[case::long_low(0.0, -180.000001)]
    #[case::long_high(0.0, 180.000001)]
    fn rejects_coordinates_one_epsilon_beyond(#[case] lat: f64, #[case] long: f64) {
        assert_eq!(
            draft("z", lat, long, 100),
            Err(ZoneValidationError::CoordinatesOutOfRange)
        );
    }

    #[test]
    fn radius_boundary_is_five_metres() {
        assert!(draft("z", 0.0, 0.0, 5).is_ok());
        assert_eq!(
            draft("z", 0.0, 0.0, 4),
            Err(ZoneValidationError::RadiusTooSmall)
        );
    }
}

//! Validation for geographic coordinates and viewport regions.

use crate::error::{ClusterError, Result};
use clustermap_types::{Location, Region};

/// Validates a location has a valid latitude and longitude.
///
/// Longitude: [-180.0, 180.0], Latitude: [-90.0, 90.0]
///
/// # Examples
///
/// ```
/// use clustermap::compute::validation::validate_location;
/// use clustermap::Location;
///
/// assert!(validate_location(&Location::new(40.7128, -74.0060)).is_ok());
/// assert!(validate_location(&Location::new(40.0, 200.0)).is_err());
/// assert!(validate_location(&Location::new(95.0, -74.0)).is_err());
/// ```
pub fn validate_location(location: &Location) -> Result<()> {
    let Location {
        latitude,
        longitude,
    } = *location;

    if !longitude.is_finite() {
        return Err(ClusterError::InvalidInput(format!(
            "Longitude must be finite, got: {}",
            longitude
        )));
    }

    if !latitude.is_finite() {
        return Err(ClusterError::InvalidInput(format!(
            "Latitude must be finite, got: {}",
            latitude
        )));
    }

    if !(-180.0..=180.0).contains(&longitude) {
        return Err(ClusterError::InvalidInput(format!(
            "Longitude out of range [-180.0, 180.0]: {}",
            longitude
        )));
    }

    if !(-90.0..=90.0).contains(&latitude) {
        return Err(ClusterError::InvalidInput(format!(
            "Latitude out of range [-90.0, 90.0]: {}",
            latitude
        )));
    }

    Ok(())
}

/// Validates a viewport region: the center must be a valid location and both
/// spans must be finite. The latitude span must not be negative; a negative
/// longitude span is accepted because it is normalized when converting to a
/// bounding box.
///
/// # Examples
///
/// ```
/// use clustermap::compute::validation::validate_region;
/// use clustermap::Region;
///
/// assert!(validate_region(&Region::new(37.78, -122.43, 0.09, 0.04)).is_ok());
/// assert!(validate_region(&Region::new(37.78, -122.43, -1.0, 0.04)).is_err());
/// ```
pub fn validate_region(region: &Region) -> Result<()> {
    validate_location(&region.center())
        .map_err(|e| ClusterError::InvalidInput(format!("Region center: {}", e)))?;

    if !region.latitude_delta.is_finite() || region.latitude_delta < 0.0 {
        return Err(ClusterError::InvalidInput(format!(
            "Latitude delta must be finite and non-negative, got: {}",
            region.latitude_delta
        )));
    }

    if !region.longitude_delta.is_finite() {
        return Err(ClusterError::InvalidInput(format!(
            "Longitude delta must be finite, got: {}",
            region.longitude_delta
        )));
    }

    Ok(())
}

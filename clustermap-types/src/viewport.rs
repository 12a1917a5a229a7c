use crate::location::Location;
use serde::{Deserialize, Serialize};

/// The visible extent of a map: a center plus the span of degrees shown.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    /// Center latitude in degrees
    pub latitude: f64,
    /// Center longitude in degrees
    pub longitude: f64,
    /// Visible latitude span in degrees
    pub latitude_delta: f64,
    /// Visible longitude span in degrees
    pub longitude_delta: f64,
}

impl Region {
    /// Create a region from its center and spans.
    pub fn new(latitude: f64, longitude: f64, latitude_delta: f64, longitude_delta: f64) -> Self {
        Self {
            latitude,
            longitude,
            latitude_delta,
            longitude_delta,
        }
    }

    /// Create a region centered on a location.
    pub fn centered_on(center: Location, latitude_delta: f64, longitude_delta: f64) -> Self {
        Self::new(
            center.latitude,
            center.longitude,
            latitude_delta,
            longitude_delta,
        )
    }

    /// The center of the region.
    pub fn center(&self) -> Location {
        Location::new(self.latitude, self.longitude)
    }
}

/// Output size of the map surface in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
}

impl Dimensions {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Inset in pixels kept between fitted coordinates and the viewport edges.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgePadding {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl EdgePadding {
    /// Same inset on all four sides.
    pub fn uniform(inset: f64) -> Self {
        Self {
            top: inset,
            right: inset,
            bottom: inset,
            left: inset,
        }
    }

    pub fn sides(&self) -> [f64; 4] {
        [self.top, self.right, self.bottom, self.left]
    }
}

impl Default for EdgePadding {
    fn default() -> Self {
        Self::uniform(10.0)
    }
}

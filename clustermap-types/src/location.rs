use geo::Point;
use serde::{Deserialize, Serialize};

/// A latitude/longitude pair in degrees.
///
/// Field order follows map SDK conventions (latitude first), while every
/// conversion into `geo` types puts longitude on the x axis.
///
/// # Examples
///
/// ```
/// use clustermap_types::location::Location;
///
/// let nyc = Location::new(40.7128, -74.0060);
/// let point: geo::Point = nyc.into();
/// assert_eq!(point.x(), -74.0060);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Latitude in degrees
    pub latitude: f64,
    /// Longitude in degrees
    pub longitude: f64,
}

impl Location {
    /// Create a new location from latitude and longitude.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Returns `true` when both components are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }

    /// Exact coordinate equality that treats any non-finite component as
    /// "not the same place", even when compared with itself.
    ///
    /// ```
    /// use clustermap_types::location::Location;
    ///
    /// let a = Location::new(10.0, 20.0);
    /// assert!(a.same_place(&Location::new(10.0, 20.0)));
    ///
    /// let broken = Location::new(f64::NAN, 20.0);
    /// assert!(!broken.same_place(&broken));
    /// ```
    pub fn same_place(&self, other: &Location) -> bool {
        self.is_finite()
            && other.is_finite()
            && self.latitude == other.latitude
            && self.longitude == other.longitude
    }

    /// Coordinates in GeoJSON order: `[longitude, latitude]`.
    pub fn lng_lat(&self) -> [f64; 2] {
        [self.longitude, self.latitude]
    }
}

impl From<Location> for Point {
    fn from(location: Location) -> Self {
        Point::new(location.longitude, location.latitude)
    }
}

impl From<Point> for Location {
    fn from(point: Point) -> Self {
        Location::new(point.y(), point.x())
    }
}

use crate::location::Location;
use serde::{Deserialize, Serialize};

/// A geographic bounding box in `[west, south, east, north]` order.
///
/// Edges are stored as given. A box produced by clamping always has
/// `west <= east`; a box built by hand may have `west > east` to describe a
/// span crossing the antimeridian, which [`BoundingBox::crosses_antimeridian`]
/// reports.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Western longitude edge
    pub west: f64,
    /// Southern latitude edge
    pub south: f64,
    /// Eastern longitude edge
    pub east: f64,
    /// Northern latitude edge
    pub north: f64,
}

impl BoundingBox {
    /// Create a new bounding box from its four edges.
    ///
    /// # Examples
    ///
    /// ```
    /// use clustermap_types::bbox::BoundingBox;
    ///
    /// let manhattan = BoundingBox::new(-74.0479, 40.6829, -73.9067, 40.8820);
    /// assert_eq!(manhattan.to_array()[0], -74.0479);
    /// ```
    pub fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            west,
            south,
            east,
            north,
        }
    }

    /// The whole world in longitude/latitude degrees.
    pub fn world() -> Self {
        Self::new(-180.0, -90.0, 180.0, 90.0)
    }

    /// Edges in `[west, south, east, north]` order.
    pub fn to_array(&self) -> [f64; 4] {
        [self.west, self.south, self.east, self.north]
    }

    /// Smallest box covering every location. Returns `None` for an empty set.
    pub fn covering<'a, I>(locations: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Location>,
    {
        locations.into_iter().fold(None, |acc, loc| {
            Some(match acc {
                None => Self::new(loc.longitude, loc.latitude, loc.longitude, loc.latitude),
                Some(b) => Self::new(
                    b.west.min(loc.longitude),
                    b.south.min(loc.latitude),
                    b.east.max(loc.longitude),
                    b.north.max(loc.latitude),
                ),
            })
        })
    }

    /// Longitude span in degrees, accounting for antimeridian crossing.
    pub fn width(&self) -> f64 {
        if self.crosses_antimeridian() {
            360.0 - (self.west - self.east)
        } else {
            self.east - self.west
        }
    }

    /// Latitude span in degrees.
    pub fn height(&self) -> f64 {
        self.north - self.south
    }

    /// Returns `true` when the box wraps across the 180° meridian.
    pub fn crosses_antimeridian(&self) -> bool {
        self.west > self.east
    }

    /// Returns `true` when every edge is a finite number.
    pub fn is_finite(&self) -> bool {
        self.to_array().iter().all(|v| v.is_finite())
    }
}

#[cfg(feature = "geojson")]
impl From<BoundingBox> for geojson::Bbox {
    fn from(bbox: BoundingBox) -> Self {
        bbox.to_array().to_vec()
    }
}

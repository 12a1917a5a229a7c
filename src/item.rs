//! Domain items: anything the host wants on the map.

use clustermap_types::Location;

/// A host record that can be placed on the map.
///
/// The record is opaque to the clustering engine apart from its location.
/// `None` stands for a missing location; a location with a non-finite
/// component stands for a non-numeric one.
pub trait Locatable {
    fn location(&self) -> Option<Location>;
}

impl Locatable for Location {
    fn location(&self) -> Option<Location> {
        Some(*self)
    }
}

impl<T: Locatable + ?Sized> Locatable for &T {
    fn location(&self) -> Option<Location> {
        (**self).location()
    }
}

/// JSON records carry their position under
/// `"location": { "latitude": .., "longitude": .. }`. Any other fields are
/// left alone; a missing or non-numeric coordinate yields `None`.
///
/// ```
/// use clustermap::Locatable;
/// use serde_json::json;
///
/// let cafe = json!({ "name": "Cafe", "location": { "latitude": 1.5, "longitude": 2.5 } });
/// assert_eq!(cafe.location().unwrap().longitude, 2.5);
///
/// let broken = json!({ "location": { "latitude": "north", "longitude": 2.5 } });
/// assert!(broken.location().is_none());
/// ```
impl Locatable for serde_json::Value {
    fn location(&self) -> Option<Location> {
        let location = self.get("location")?;
        let latitude = location.get("latitude")?.as_f64()?;
        let longitude = location.get("longitude")?.as_f64()?;
        Some(Location::new(latitude, longitude))
    }
}

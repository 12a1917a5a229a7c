//! Conversion of domain items into the point features the clustering index
//! ingests.

use crate::error::{ClusterError, Result};
use crate::item::Locatable;
use clustermap_types::Location;
use geo::Point;
use std::sync::Arc;

/// Property key under which a feature keeps its originating item.
///
/// Clustering metadata uses its own keys (`cluster`, `cluster_id`,
/// `point_count`) so the item never collides with them.
pub const ITEM_KEY: &str = "item";

/// A point feature with a back-reference to the domain item it came from.
#[derive(Debug)]
pub struct GeoFeature<T> {
    /// Point geometry, longitude on x
    pub geometry: Point,
    pub properties: FeatureProperties<T>,
}

/// Property bag of a [`GeoFeature`]. Holds the item verbatim.
#[derive(Debug)]
pub struct FeatureProperties<T> {
    pub item: Arc<T>,
}

impl<T> GeoFeature<T> {
    pub fn location(&self) -> Location {
        Location::from(self.geometry)
    }

    pub fn item(&self) -> &Arc<T> {
        &self.properties.item
    }
}

impl<T> Clone for GeoFeature<T> {
    fn clone(&self) -> Self {
        Self {
            geometry: self.geometry,
            properties: FeatureProperties {
                item: Arc::clone(&self.properties.item),
            },
        }
    }
}

/// Maps an item's location into a point feature (longitude first) and keeps
/// the item itself under [`ITEM_KEY`].
///
/// No range validation happens here. An item without a location, or with a
/// non-finite coordinate, cannot become a feature and yields
/// [`ClusterError::MissingLocation`]; callers filter or skip such items.
///
/// # Examples
///
/// ```
/// use clustermap::{Location, compute::feature::item_to_feature};
/// use std::sync::Arc;
///
/// let feature = item_to_feature(Arc::new(Location::new(40.7, -74.0))).unwrap();
/// assert_eq!(feature.geometry.x(), -74.0);
/// assert_eq!(feature.geometry.y(), 40.7);
/// ```
pub fn item_to_feature<T: Locatable>(item: Arc<T>) -> Result<GeoFeature<T>> {
    let location = item
        .location()
        .filter(Location::is_finite)
        .ok_or(ClusterError::MissingLocation)?;

    Ok(GeoFeature {
        geometry: location.into(),
        properties: FeatureProperties { item },
    })
}

//! The clustering index contract and its result types.
//!
//! The view controller only talks to an index through [`ClusterIndex`], so a
//! host can plug in its own clustering engine. [`SuperclusterIndex`] is the
//! bundled implementation.

pub mod supercluster;

pub use supercluster::SuperclusterIndex;

use crate::compute::feature::GeoFeature;
use crate::error::Result;
use clustermap_types::{BoundingBox, Location};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Options an index is built with.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndexOptions {
    /// Lowest zoom level clusters are generated for
    pub min_zoom: u8,
    /// Highest zoom level clusters are generated for
    pub max_zoom: u8,
    /// Tile extent the radius is measured against
    pub extent: f64,
    /// Cluster radius in pixels
    pub radius: f64,
}

/// An aggregate of at least two nearby points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cluster {
    /// Identifier accepted by [`ClusterIndex::leaves`] and friends
    pub id: u64,
    /// Number of leaf items under the cluster
    pub point_count: usize,
    /// Weighted center of the cluster's points
    pub coordinate: Location,
}

impl Cluster {
    /// Short label for the point count: `"999"`, `"1.2k"`, `"15k"`.
    ///
    /// ```
    /// use clustermap::{Cluster, Location};
    ///
    /// let cluster = Cluster { id: 1, point_count: 1250, coordinate: Location::new(0.0, 0.0) };
    /// assert_eq!(cluster.abbreviated_count(), "1.3k");
    /// ```
    pub fn abbreviated_count(&self) -> String {
        let count = self.point_count;
        if count >= 10_000 {
            format!("{}k", (count as f64 / 1000.0).round())
        } else if count >= 1000 {
            format!("{}k", (count as f64 / 100.0).round() / 10.0)
        } else {
            count.to_string()
        }
    }
}

/// One renderable entry of a clustering result: a cluster badge or a single
/// item marker.
#[derive(Debug)]
pub enum ClusterEntry<T> {
    Cluster(Cluster),
    Point(GeoFeature<T>),
}

impl<T> ClusterEntry<T> {
    /// Number of points under the entry. A single point reports `0`.
    pub fn point_count(&self) -> usize {
        match self {
            ClusterEntry::Cluster(cluster) => cluster.point_count,
            ClusterEntry::Point(_) => 0,
        }
    }

    /// Where the entry is drawn.
    pub fn coordinate(&self) -> Location {
        match self {
            ClusterEntry::Cluster(cluster) => cluster.coordinate,
            ClusterEntry::Point(feature) => feature.location(),
        }
    }

    pub fn cluster_id(&self) -> Option<u64> {
        match self {
            ClusterEntry::Cluster(cluster) => Some(cluster.id),
            ClusterEntry::Point(_) => None,
        }
    }

    /// The wrapped item, for single-point entries.
    pub fn item(&self) -> Option<&Arc<T>> {
        match self {
            ClusterEntry::Cluster(_) => None,
            ClusterEntry::Point(feature) => Some(feature.item()),
        }
    }

    pub fn is_cluster(&self) -> bool {
        matches!(self, ClusterEntry::Cluster(_))
    }
}

impl<T> Clone for ClusterEntry<T> {
    fn clone(&self) -> Self {
        match self {
            ClusterEntry::Cluster(cluster) => ClusterEntry::Cluster(*cluster),
            ClusterEntry::Point(feature) => ClusterEntry::Point(feature.clone()),
        }
    }
}

/// A spatial clustering engine.
///
/// An index is built once from a feature set and never mutated afterwards;
/// a new item set means a new index. All query methods take `&self`, so a
/// built index can be shared between readers.
pub trait ClusterIndex<T>: Sized {
    /// Build an index over `features`. An empty feature set is valid and
    /// yields an index whose queries return nothing.
    fn build(features: Vec<GeoFeature<T>>, options: &IndexOptions) -> Result<Self>;

    /// Clusters and single points inside `bbox` at `zoom`.
    fn query(&self, bbox: &BoundingBox, zoom: u8) -> Vec<ClusterEntry<T>>;

    /// Up to `limit` leaf items under a cluster.
    fn leaves(&self, cluster_id: u64, limit: usize) -> Result<Vec<Arc<T>>>;

    /// Entries one zoom level below a cluster.
    fn children(&self, cluster_id: u64) -> Result<Vec<ClusterEntry<T>>>;

    /// Zoom level at which a cluster breaks apart into its children.
    fn expansion_zoom(&self, cluster_id: u64) -> Result<u8>;

    /// Number of indexed features.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cluster_of(point_count: usize) -> Cluster {
        Cluster {
            id: 0,
            point_count,
            coordinate: Location::new(0.0, 0.0),
        }
    }

    #[test]
    fn test_abbreviated_count() {
        assert_eq!(cluster_of(2).abbreviated_count(), "2");
        assert_eq!(cluster_of(999).abbreviated_count(), "999");
        assert_eq!(cluster_of(1000).abbreviated_count(), "1k");
        assert_eq!(cluster_of(1540).abbreviated_count(), "1.5k");
        assert_eq!(cluster_of(12_400).abbreviated_count(), "12k");
    }
}

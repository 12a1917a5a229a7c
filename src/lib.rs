//! Viewport-driven marker clustering for interactive maps.
//!
//! ## Features
//! - **Geo conversion**: regions to bounding boxes, slippy-map zoom fitting, items to point features
//! - **Clustering index**: per-zoom R-tree pyramid of greedy point clusters behind a pluggable trait
//! - **View controller**: keeps the rendered clusters in sync with the visible region and resolves cluster presses
//! - **GeoJSON export**: result sets as feature collections (with the `geojson` feature)
//! - **Thread-safe wrapper**: `SyncMapView` (with the `sync` feature)
//!
//! ## Wide views
//! A region spanning more than [`WIDE_VIEW_THRESHOLD_DEGREES`] of longitude is
//! queried at the configured minimum zoom, and a camera move into such a
//! region keeps the previous clusters on screen instead of re-clustering.
//!
//! ```rust
//! use clustermap::prelude::*;
//!
//! let config = ClusterConfig::new(400.0, 800.0);
//! let mut view: ClusteredMapView<Location> = MapViewBuilder::new(config)
//!     .region(Region::new(40.7128, -74.0060, 0.5, 0.5))
//!     .build()?;
//!
//! view.rebuild(vec![
//!     Location::new(40.7128, -74.0060),
//!     Location::new(40.7130, -74.0062),
//!     Location::new(40.9000, -73.8000),
//! ]);
//!
//! let clusters = view.entries().iter().filter(|e| e.is_cluster()).count();
//! assert_eq!(clusters, 1);
//!
//! // Zooming into the pair splits it
//! view.on_region_change(Region::new(40.7129, -74.0061, 0.0005, 0.0005));
//! assert!(view.entries().iter().all(|e| e.point_count() == 0));
//! # Ok::<(), clustermap::ClusterError>(())
//! ```

pub mod compute;
pub mod config;
pub mod error;
pub mod index;
pub mod item;
pub mod view;

pub use config::{BadgeStyle, ClusterConfig};
pub use error::{ClusterError, Result};
pub use index::{Cluster, ClusterEntry, ClusterIndex, IndexOptions, SuperclusterIndex};
pub use item::Locatable;
pub use view::{
    ClusterBadge, ClusterPress, ClusteredMapView, DetachedSurface, MapObserver, MapSurface,
    MapViewBuilder, MarkerRenderer, NoopObserver, WIDE_VIEW_THRESHOLD_DEGREES, clusters_changed,
    content_version,
};

#[cfg(feature = "sync")]
pub use view::SyncMapView;

pub use clustermap_types::{BoundingBox, Dimensions, EdgePadding, Location, Region};

pub use compute::geo::{region_to_bounding_box, viewport_zoom};
pub use compute::feature::{GeoFeature, item_to_feature};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports
pub mod prelude {

    pub use crate::{ClusterConfig, ClusterError, MapViewBuilder, Result};

    pub use crate::{ClusterEntry, ClusterIndex, ClusteredMapView, SuperclusterIndex};

    pub use crate::{ClusterPress, MapObserver, MapSurface, MarkerRenderer};

    pub use crate::{BoundingBox, Dimensions, EdgePadding, Locatable, Location, Region};

    #[cfg(feature = "sync")]
    pub use crate::SyncMapView;
}

//! The clustered map view controller.
//!
//! `ClusteredMapView` owns the current region, the clustering index built
//! from the host's items, and the result set derived from both. Hosts drive
//! it with three events: a new item set ([`ClusteredMapView::rebuild`] or
//! [`ClusteredMapView::set_data`]), a settled camera move
//! ([`ClusteredMapView::on_region_change`]) and a cluster press
//! ([`ClusteredMapView::on_cluster_press`]).
//!
//! ```rust
//! use clustermap::prelude::*;
//!
//! let config = ClusterConfig::new(400.0, 800.0);
//! let mut view: ClusteredMapView<Location> = MapViewBuilder::new(config)
//!     .region(Region::new(0.0, 0.0, 10.0, 10.0))
//!     .build()?;
//!
//! view.rebuild(vec![Location::new(0.1, 0.1), Location::new(0.1001, 0.1001)]);
//! assert_eq!(view.entries().len(), 1);
//! # Ok::<(), clustermap::ClusterError>(())
//! ```

pub mod builder;
pub mod observer;
pub mod render;
#[cfg(feature = "sync")]
pub mod sync;

pub use builder::MapViewBuilder;
pub use observer::{ClusterPress, DetachedSurface, MapObserver, MapSurface, NoopObserver};
pub use render::{ClusterBadge, MarkerRenderer};
#[cfg(feature = "sync")]
pub use sync::SyncMapView;

use crate::compute::feature::item_to_feature;
use crate::compute::geo::{region_to_bounding_box, viewport_zoom};
use crate::config::ClusterConfig;
use crate::index::{ClusterEntry, ClusterIndex, SuperclusterIndex};
use crate::item::Locatable;
use clustermap_types::{BoundingBox, Location, Region};
use rustc_hash::FxHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Longitude span in degrees above which a region counts as a wide view.
///
/// Wide views are queried at the configured minimum zoom instead of a fitted
/// one, and a region change into a wide view keeps the previous result set
/// instead of re-clustering.
pub const WIDE_VIEW_THRESHOLD_DEGREES: f64 = 80.0;

/// Whether a region's longitude span, as reported by the map, is wider than
/// [`WIDE_VIEW_THRESHOLD_DEGREES`]. Negative spans are never wide.
pub fn is_wide_view(region: &Region) -> bool {
    region.longitude_delta > WIDE_VIEW_THRESHOLD_DEGREES
}

/// `true` when two result sets differ in size, which is when a host should
/// animate the transition between them.
pub fn clusters_changed<T>(current: &[ClusterEntry<T>], next: &[ClusterEntry<T>]) -> bool {
    current.len() != next.len()
}

/// Version of an item set derived from its contents, for hosts without their
/// own change counter. Equal contents in equal order give equal versions.
pub fn content_version<T: Hash>(items: &[T]) -> u64 {
    let mut hasher = FxHasher::default();
    items.hash(&mut hasher);
    hasher.finish()
}

/// `true` when every item has the same numeric location. Items without a
/// location, or with a non-finite one, never match. An empty set is
/// trivially co-located.
pub fn all_same_location<T: Locatable>(items: &[Arc<T>]) -> bool {
    let Some(first) = items.first() else {
        return true;
    };
    let first = first.location();

    items.iter().all(|item| match (first, item.location()) {
        (Some(a), Some(b)) => a.same_place(&b),
        _ => false,
    })
}

/// View controller keeping clusters in sync with the visible region.
pub struct ClusteredMapView<T, S = DetachedSurface, O = NoopObserver, I = SuperclusterIndex<T>> {
    config: ClusterConfig,
    region: Region,
    entries: Vec<ClusterEntry<T>>,
    items: Vec<Arc<T>>,
    index: Option<Arc<I>>,
    data_version: Option<u64>,
    surface: S,
    observer: O,
}

impl<T, S, O, I> ClusteredMapView<T, S, O, I>
where
    T: Locatable,
    S: MapSurface,
    O: MapObserver<T>,
    I: ClusterIndex<T>,
{
    pub(crate) fn from_parts(config: ClusterConfig, region: Region, surface: S, observer: O) -> Self {
        Self {
            config,
            region,
            entries: Vec::new(),
            items: Vec::new(),
            index: None,
            data_version: None,
            surface,
            observer,
        }
    }

    /// Replace the index with one built from `items`, recompute the result
    /// set for the current region and notify the host.
    pub fn rebuild<It>(&mut self, items: It) -> &[ClusterEntry<T>]
    where
        It: IntoIterator<Item = T>,
    {
        self.rebuild_shared(items.into_iter().map(Arc::new).collect())
    }

    /// Like [`rebuild`](Self::rebuild) for items the host already shares.
    ///
    /// Items without a numeric location are skipped. A failed index build
    /// leaves the view with an empty result set.
    pub fn rebuild_shared(&mut self, items: Vec<Arc<T>>) -> &[ClusterEntry<T>] {
        let mut features = Vec::with_capacity(items.len());
        let mut skipped = 0usize;
        for item in &items {
            match item_to_feature(Arc::clone(item)) {
                Ok(feature) => features.push(feature),
                Err(_) => skipped += 1,
            }
        }

        if skipped > 0 {
            log::warn!("Skipping {} items without a numeric location", skipped);
        }

        self.index = match I::build(features, &self.config.index_options()) {
            Ok(index) => Some(Arc::new(index)),
            Err(e) => {
                log::warn!("Cluster index build failed, rendering nothing: {}", e);
                None
            }
        };
        self.items = items;
        self.entries = self.query(&self.region);

        log::debug!(
            "Rebuilt clusters for {} items: {} entries",
            self.items.len(),
            self.entries.len()
        );

        self.observer
            .on_region_change_complete(&self.region, Some(self.entries.as_slice()));
        &self.entries
    }

    /// Rebuild only when `version` differs from the last version seen.
    /// Returns whether a rebuild happened.
    pub fn set_data<It>(&mut self, items: It, version: u64) -> bool
    where
        It: IntoIterator<Item = T>,
    {
        if self.data_version == Some(version) {
            log::trace!("Item set version {} unchanged, keeping index", version);
            return false;
        }
        self.data_version = Some(version);
        self.rebuild(items);
        true
    }

    /// Clusters and points visible in `region`. Reads the held index and
    /// changes nothing.
    pub fn query(&self, region: &Region) -> Vec<ClusterEntry<T>> {
        let Some(index) = self.index.as_deref() else {
            return Vec::new();
        };

        let bbox = region_to_bounding_box(region);
        let zoom = if is_wide_view(region) {
            self.config.min_zoom
        } else {
            viewport_zoom(&bbox, self.config.dimensions)
        };

        log::trace!("Querying clusters in {:?} at zoom {}", bbox.to_array(), zoom);
        index.query(&bbox, zoom)
    }

    /// Handle a settled camera move.
    ///
    /// The region is always stored. The result set is recomputed only when
    /// the region is not a wide view; otherwise the previous result set stays
    /// in place and the host receives `None`.
    pub fn on_region_change(&mut self, region: Region) -> Option<&[ClusterEntry<T>]> {
        let refreshed = !is_wide_view(&region);
        if refreshed {
            self.entries = self.query(&region);
        } else {
            log::debug!(
                "Region spans {}° of longitude, keeping previous clusters",
                region.longitude_delta
            );
        }
        self.region = region;

        let entries = refreshed.then_some(self.entries.as_slice());
        self.observer.on_region_change_complete(&self.region, entries);
        entries
    }

    /// Handle a press on a cluster using the configured leaf limit.
    pub fn on_cluster_press(&mut self, cluster_id: u64) -> ClusterPress<T> {
        self.resolve_cluster_tap(cluster_id, self.config.cluster_press_max_children)
    }

    /// Handle a press on a cluster.
    ///
    /// In pass-through mode the host only receives the id. In resolved mode
    /// up to `max_leaves` leaves are fetched; when they do not all share a
    /// location the surface is fitted around them with the configured edge
    /// padding. The host is notified in both modes.
    pub fn resolve_cluster_tap(&mut self, cluster_id: u64, max_leaves: usize) -> ClusterPress<T> {
        if !self.config.preserve_cluster_press_behavior {
            let press = ClusterPress::PassThrough { cluster_id };
            self.observer.on_cluster_press(&press);
            return press;
        }

        let leaves = match self.index.as_deref() {
            Some(index) => index.leaves(cluster_id, max_leaves).unwrap_or_else(|e| {
                log::warn!("Cannot resolve cluster press: {}", e);
                Vec::new()
            }),
            None => Vec::new(),
        };

        let all_same_location = all_same_location(&leaves);
        if !all_same_location {
            let coordinates: Vec<Location> =
                leaves.iter().filter_map(|leaf| leaf.location()).collect();
            if let Some(bounds) = BoundingBox::covering(&coordinates) {
                log::debug!(
                    "Fitting map to {} leaves of cluster {} within {:?}",
                    coordinates.len(),
                    cluster_id,
                    bounds.to_array()
                );
            }
            self.surface
                .fit_to_coordinates(&coordinates, self.config.edge_padding);
        }

        let press = ClusterPress::Resolved {
            cluster_id,
            leaves,
            all_same_location,
        };
        self.observer.on_cluster_press(&press);
        press
    }

    /// Whether moving from the current result set to `next` should animate.
    pub fn should_animate(&self, next: &[ClusterEntry<T>]) -> bool {
        self.config.animate_clusters && clusters_changed(&self.entries, next)
    }

    /// Draw the current state through host callbacks: a marker per single
    /// point and a badge per cluster, or a marker per item when clustering is
    /// disabled.
    pub fn render<R: MarkerRenderer<T>>(&self, renderer: &mut R) -> Vec<R::Output> {
        if !self.config.clustering_enabled {
            return self
                .items
                .iter()
                .map(|item| renderer.render_marker(item))
                .collect();
        }

        self.entries
            .iter()
            .map(|entry| match entry {
                ClusterEntry::Point(feature) => renderer.render_marker(feature.item()),
                ClusterEntry::Cluster(cluster) => {
                    let ratio = render::effective_ratio(renderer, cluster.point_count);
                    let badge = ClusterBadge::new(cluster, &self.config.badge, ratio);
                    renderer.render_cluster(&badge)
                }
            })
            .collect()
    }
}

impl<T, S, O, I> ClusteredMapView<T, S, O, I> {
    pub fn config(&self) -> &ClusterConfig {
        &self.config
    }

    pub fn region(&self) -> &Region {
        &self.region
    }

    /// The current result set.
    pub fn entries(&self) -> &[ClusterEntry<T>] {
        &self.entries
    }

    /// Items of the last rebuild, in host order.
    pub fn items(&self) -> &[Arc<T>] {
        &self.items
    }

    /// The clustering engine, once an item set has been indexed.
    pub fn index(&self) -> Option<&Arc<I>> {
        self.index.as_ref()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }
}

impl<T, S, O, I> std::fmt::Debug for ClusteredMapView<T, S, O, I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClusteredMapView")
            .field("region", &self.region)
            .field("entries", &self.entries.len())
            .field("items", &self.items.len())
            .field("indexed", &self.index.is_some())
            .field("data_version", &self.data_version)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClusterConfig;
    use clustermap_types::EdgePadding;

    #[derive(Default)]
    struct Recorder {
        regions: Vec<(Region, Option<usize>)>,
        presses: Vec<(u64, usize, Option<bool>)>,
    }

    impl<T> MapObserver<T> for Recorder {
        fn on_region_change_complete(&mut self, region: &Region, entries: Option<&[ClusterEntry<T>]>) {
            self.regions.push((*region, entries.map(<[_]>::len)));
        }

        fn on_cluster_press(&mut self, press: &ClusterPress<T>) {
            let same = match press {
                ClusterPress::PassThrough { .. } => None,
                ClusterPress::Resolved {
                    all_same_location, ..
                } => Some(*all_same_location),
            };
            self.presses
                .push((press.cluster_id(), press.leaves().len(), same));
        }
    }

    #[derive(Default)]
    struct FitLog {
        fits: Vec<(Vec<Location>, EdgePadding)>,
    }

    impl MapSurface for FitLog {
        fn fit_to_coordinates(&mut self, coordinates: &[Location], edge_padding: EdgePadding) {
            self.fits.push((coordinates.to_vec(), edge_padding));
        }
    }

    type TestView = ClusteredMapView<Location, FitLog, Recorder>;

    fn view(config: ClusterConfig) -> TestView {
        MapViewBuilder::new(config)
            .region(Region::new(0.0, 0.0, 20.0, 20.0))
            .surface(FitLog::default())
            .observer(Recorder::default())
            .build()
            .unwrap()
    }

    fn first_cluster_id(view: &TestView) -> u64 {
        view.entries()
            .iter()
            .find_map(ClusterEntry::cluster_id)
            .expect("a cluster in the result set")
    }

    #[test]
    fn test_query_without_index_is_empty() {
        let view = view(ClusterConfig::new(400.0, 800.0));
        assert!(view.query(view.region()).is_empty());
        assert!(view.index().is_none());
    }

    #[test]
    fn test_rebuild_notifies_with_current_region() {
        let mut view = view(ClusterConfig::new(400.0, 800.0));
        view.rebuild(vec![Location::new(1.0, 1.0), Location::new(5.0, 5.0)]);

        let (region, count) = view.observer().regions[0];
        assert_eq!(region, Region::new(0.0, 0.0, 20.0, 20.0));
        assert_eq!(count, Some(view.entries().len()));
    }

    #[test]
    fn test_rebuild_skips_items_without_location() {
        let config = ClusterConfig::new(400.0, 800.0);
        let mut view: ClusteredMapView<serde_json::Value> = MapViewBuilder::new(config)
            .region(Region::new(0.0, 0.0, 20.0, 20.0))
            .build()
            .unwrap();

        view.rebuild(vec![
            serde_json::json!({ "location": { "latitude": 1.0, "longitude": 1.0 } }),
            serde_json::json!({ "name": "nowhere" }),
        ]);
        assert_eq!(view.index().unwrap().len(), 1);
        assert_eq!(view.items().len(), 2);
    }

    #[test]
    fn test_set_data_only_rebuilds_on_new_version() {
        let mut view = view(ClusterConfig::new(400.0, 800.0));
        let items = vec![Location::new(1.0, 1.0)];

        assert!(view.set_data(items.clone(), 1));
        assert!(!view.set_data(items.clone(), 1));
        assert!(view.set_data(items, 2));
        assert_eq!(view.observer().regions.len(), 2);
    }

    #[test]
    fn test_wide_region_keeps_previous_entries() {
        let mut view = view(ClusterConfig::new(400.0, 800.0));
        view.rebuild(vec![Location::new(1.0, 1.0), Location::new(-3.0, 2.0)]);
        let before = view.entries().len();

        let wide = Region::new(0.0, 100.0, 60.0, 90.0);
        assert!(view.on_region_change(wide).is_none());
        assert_eq!(view.region(), &wide);
        assert_eq!(view.entries().len(), before);
        assert_eq!(view.observer().regions.last(), Some(&(wide, None)));
    }

    #[test]
    fn test_negative_longitude_delta_is_not_wide() {
        let mut view = view(ClusterConfig::new(400.0, 800.0));
        view.rebuild(vec![Location::new(1.0, 1.0)]);

        assert!(!is_wide_view(&Region::new(0.0, 0.0, 10.0, -10.0)));
        let entries = view.on_region_change(Region::new(0.0, 0.0, 10.0, -10.0));
        assert_eq!(entries.map(<[_]>::len), Some(1));
    }

    #[test]
    fn test_pass_through_press() {
        let config = ClusterConfig::new(400.0, 800.0).with_preserve_cluster_press_behavior(false);
        let mut view = view(config);
        view.rebuild(vec![Location::new(1.0, 1.0), Location::new(1.0, 1.0)]);

        let id = first_cluster_id(&view);
        let press = view.on_cluster_press(id);
        assert!(matches!(press, ClusterPress::PassThrough { cluster_id } if cluster_id == id));
        assert!(view.surface().fits.is_empty());
        assert_eq!(view.observer().presses, vec![(id, 0, None)]);
    }

    #[test]
    fn test_resolved_press_fits_distinct_leaves() {
        let padding = EdgePadding::uniform(24.0);
        let config = ClusterConfig::new(400.0, 800.0).with_edge_padding(padding);
        let mut view = view(config);
        view.rebuild(vec![Location::new(1.0, 1.0), Location::new(1.01, 1.01)]);

        let id = first_cluster_id(&view);
        let press = view.on_cluster_press(id);
        assert!(matches!(
            press,
            ClusterPress::Resolved {
                all_same_location: false,
                ..
            }
        ));

        let (coordinates, used_padding) = &view.surface().fits[0];
        assert_eq!(coordinates.len(), 2);
        assert_eq!(*used_padding, padding);
    }

    #[test]
    fn test_unknown_cluster_press_degrades() {
        let mut view = view(ClusterConfig::new(400.0, 800.0));
        view.rebuild(vec![Location::new(1.0, 1.0)]);

        let press = view.resolve_cluster_tap(12_345, 10);
        assert!(press.leaves().is_empty());
        assert!(view.surface().fits.is_empty());
        assert_eq!(view.observer().presses.len(), 1);
    }

    #[test]
    fn test_all_same_location() {
        let same = vec![Arc::new(Location::new(1.0, 2.0)), Arc::new(Location::new(1.0, 2.0))];
        assert!(all_same_location(&same));

        let different = vec![Arc::new(Location::new(1.0, 2.0)), Arc::new(Location::new(1.0, 2.1))];
        assert!(!all_same_location(&different));

        let broken = vec![Arc::new(Location::new(f64::NAN, 2.0))];
        assert!(!all_same_location(&broken));

        let missing = vec![
            Arc::new(serde_json::json!({ "location": { "latitude": 1.0, "longitude": 2.0 } })),
            Arc::new(serde_json::json!({ "location": { "latitude": "1.0", "longitude": 2.0 } })),
        ];
        assert!(!all_same_location(&missing));
    }

    #[test]
    fn test_content_version_tracks_contents() {
        assert_eq!(content_version(&[1u32, 2, 3]), content_version(&[1u32, 2, 3]));
        assert_ne!(content_version(&[1u32, 2, 3]), content_version(&[1u32, 2, 4]));
    }

    #[test]
    fn test_should_animate_respects_config() {
        let mut view = view(ClusterConfig::new(400.0, 800.0).with_animate_clusters(false));
        view.rebuild(vec![Location::new(1.0, 1.0)]);
        assert!(!view.should_animate(&[]));
    }
}

//! Host-facing callbacks and the presentation surface the view drives.

use crate::index::ClusterEntry;
use clustermap_types::{EdgePadding, Location, Region};
use std::sync::Arc;

/// Outcome of a cluster press, as handed to the host.
#[derive(Debug)]
pub enum ClusterPress<T> {
    /// Only the id is forwarded; the host handles the press itself.
    PassThrough { cluster_id: u64 },
    /// The cluster was resolved into (up to a limit of) its leaf items.
    Resolved {
        cluster_id: u64,
        leaves: Vec<Arc<T>>,
        /// Every leaf has the same numeric coordinate
        all_same_location: bool,
    },
}

impl<T> ClusterPress<T> {
    pub fn cluster_id(&self) -> u64 {
        match self {
            ClusterPress::PassThrough { cluster_id } | ClusterPress::Resolved { cluster_id, .. } => {
                *cluster_id
            }
        }
    }

    /// Leaf items of a resolved press; empty for pass-through.
    pub fn leaves(&self) -> &[Arc<T>] {
        match self {
            ClusterPress::PassThrough { .. } => &[],
            ClusterPress::Resolved { leaves, .. } => leaves,
        }
    }
}

/// Callbacks the view controller invokes on the host.
///
/// Both methods default to doing nothing so hosts implement only what they
/// listen to.
pub trait MapObserver<T> {
    /// Fired after a rebuild and after every region change. `entries` is
    /// `None` when the region was too wide for the result set to be refreshed.
    fn on_region_change_complete(&mut self, _region: &Region, _entries: Option<&[ClusterEntry<T>]>) {
    }

    fn on_cluster_press(&mut self, _press: &ClusterPress<T>) {}
}

/// Observer that ignores every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl<T> MapObserver<T> for NoopObserver {}

/// The map widget the view controller commands.
pub trait MapSurface {
    /// Move the camera so every coordinate is visible, keeping `edge_padding`
    /// pixels clear on each side.
    fn fit_to_coordinates(&mut self, coordinates: &[Location], edge_padding: EdgePadding);
}

/// Surface that is not attached to any widget. Fit commands are logged and
/// dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct DetachedSurface;

impl MapSurface for DetachedSurface {
    fn fit_to_coordinates(&mut self, coordinates: &[Location], _edge_padding: EdgePadding) {
        log::trace!(
            "Dropping fit command for {} coordinates: no surface attached",
            coordinates.len()
        );
    }
}

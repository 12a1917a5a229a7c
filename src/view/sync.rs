//! Thread-safe wrapper for hosts that drive a view from several threads.
//!
//! `SyncMapView` puts a [`ClusteredMapView`] behind `Arc<RwLock<..>>`: item
//! rebuilds and view events take the write lock, so an index swap and the
//! result set recomputed from it are observed together. Queries take the
//! read lock and may run concurrently.
//!
//! # Features
//!
//! Enable the `sync` feature to use this module:
//!
//! ```toml
//! [dependencies]
//! clustermap = { version = "0.1", features = ["sync"] }
//! ```

use super::{ClusterPress, ClusteredMapView, DetachedSurface, MapObserver, MapSurface, NoopObserver};
use crate::index::{ClusterEntry, ClusterIndex, SuperclusterIndex};
use crate::item::Locatable;
use clustermap_types::Region;
use parking_lot::RwLock;
use std::sync::Arc;

/// Thread-safe wrapper around `ClusteredMapView` using `Arc<RwLock<..>>`.
///
/// Cloning is cheap and shares the same view.
pub struct SyncMapView<T, S = DetachedSurface, O = NoopObserver, I = SuperclusterIndex<T>> {
    inner: Arc<RwLock<ClusteredMapView<T, S, O, I>>>,
}

impl<T, S, O, I> Clone for SyncMapView<T, S, O, I> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T, S, O, I> SyncMapView<T, S, O, I>
where
    T: Locatable,
    S: MapSurface,
    O: MapObserver<T>,
    I: ClusterIndex<T>,
{
    pub fn new(view: ClusteredMapView<T, S, O, I>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(view)),
        }
    }

    /// Rebuild the index and return a snapshot of the new result set.
    pub fn rebuild<It>(&self, items: It) -> Vec<ClusterEntry<T>>
    where
        It: IntoIterator<Item = T>,
    {
        self.inner.write().rebuild(items).to_vec()
    }

    /// Rebuild only for a new version. Returns whether a rebuild happened.
    pub fn set_data<It>(&self, items: It, version: u64) -> bool
    where
        It: IntoIterator<Item = T>,
    {
        self.inner.write().set_data(items, version)
    }

    /// Query under the read lock.
    pub fn query(&self, region: &Region) -> Vec<ClusterEntry<T>> {
        self.inner.read().query(region)
    }

    pub fn on_region_change(&self, region: Region) -> Option<Vec<ClusterEntry<T>>> {
        self.inner
            .write()
            .on_region_change(region)
            .map(<[ClusterEntry<T>]>::to_vec)
    }

    pub fn on_cluster_press(&self, cluster_id: u64) -> ClusterPress<T> {
        self.inner.write().on_cluster_press(cluster_id)
    }

    /// Snapshot of the current result set.
    pub fn entries(&self) -> Vec<ClusterEntry<T>> {
        self.inner.read().entries().to_vec()
    }

    pub fn region(&self) -> Region {
        *self.inner.read().region()
    }

    /// The current index, usable without holding the lock.
    pub fn index(&self) -> Option<Arc<I>> {
        self.inner.read().index().cloned()
    }

    /// Run a closure with shared access to the view.
    pub fn with_view<R>(&self, f: impl FnOnce(&ClusteredMapView<T, S, O, I>) -> R) -> R {
        f(&self.inner.read())
    }
}

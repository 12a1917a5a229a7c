//! Builder for clustered map views.
//!
//! The builder is where configuration is validated: a view that builds
//! successfully never rejects its configuration later.

use super::{ClusteredMapView, DetachedSurface, MapObserver, MapSurface, NoopObserver};
use crate::compute::validation::validate_region;
use crate::config::ClusterConfig;
use crate::error::{ClusterError, Result};
use crate::index::ClusterIndex;
use crate::item::Locatable;
use clustermap_types::Region;

/// Builder for a [`ClusteredMapView`] with its surface and observer.
#[derive(Debug)]
pub struct MapViewBuilder<S = DetachedSurface, O = NoopObserver> {
    config: ClusterConfig,
    region: Option<Region>,
    surface: S,
    observer: O,
}

impl MapViewBuilder {
    /// Create a builder with no surface and no observer attached.
    pub fn new(config: ClusterConfig) -> Self {
        Self {
            config,
            region: None,
            surface: DetachedSurface,
            observer: NoopObserver,
        }
    }
}

impl<S, O> MapViewBuilder<S, O> {
    /// Set the initial region. Required.
    pub fn region(mut self, region: Region) -> Self {
        self.region = Some(region);
        self
    }

    /// Replace the configuration.
    pub fn config(mut self, config: ClusterConfig) -> Self {
        self.config = config;
        self
    }

    /// Attach the map widget that receives fit commands.
    pub fn surface<S2: MapSurface>(self, surface: S2) -> MapViewBuilder<S2, O> {
        MapViewBuilder {
            config: self.config,
            region: self.region,
            surface,
            observer: self.observer,
        }
    }

    /// Attach the host callbacks.
    pub fn observer<O2>(self, observer: O2) -> MapViewBuilder<S, O2> {
        MapViewBuilder {
            config: self.config,
            region: self.region,
            surface: self.surface,
            observer,
        }
    }

    /// Validate the configuration and initial region and create the view.
    /// No index exists until the first rebuild.
    pub fn build<T, I>(self) -> Result<ClusteredMapView<T, S, O, I>>
    where
        T: Locatable,
        S: MapSurface,
        O: MapObserver<T>,
        I: ClusterIndex<T>,
    {
        self.config.validate()?;

        let region = self
            .region
            .ok_or_else(|| ClusterError::InvalidConfig("An initial region is required".into()))?;
        validate_region(&region)
            .map_err(|e| ClusterError::InvalidConfig(format!("Initial region: {}", e)))?;

        Ok(ClusteredMapView::from_parts(
            self.config,
            region,
            self.surface,
            self.observer,
        ))
    }
}

//! Host-facing configuration for the clustered map view.
//!
//! The configuration is plain serializable data so hosts can keep it next to
//! their other settings and load it from JSON (or TOML with the `toml` feature).

use crate::error::{ClusterError, Result};
use crate::index::IndexOptions;
use clustermap_types::{Dimensions, EdgePadding};
use serde::{Deserialize, Serialize};

/// Highest zoom level accepted for the clustering pyramid.
pub const MAX_SUPPORTED_ZOOM: u8 = 24;

/// Share of the viewport width used as the clustering radius when none is set.
pub const DEFAULT_RADIUS_RATIO: f64 = 0.045;

/// Sizing handed to cluster badges.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BadgeStyle {
    /// Font size of a badge representing the smallest cluster
    #[serde(default = "BadgeStyle::default_font_size")]
    pub cluster_initial_font_size: f64,

    /// Edge length in pixels of a badge representing the smallest cluster
    #[serde(default = "BadgeStyle::default_dimension")]
    pub cluster_initial_dimension: f64,
}

impl BadgeStyle {
    const fn default_font_size() -> f64 {
        12.0
    }

    const fn default_dimension() -> f64 {
        30.0
    }
}

impl Default for BadgeStyle {
    fn default() -> Self {
        Self {
            cluster_initial_font_size: Self::default_font_size(),
            cluster_initial_dimension: Self::default_dimension(),
        }
    }
}

/// Clustered map view configuration.
///
/// Every option except `dimensions` has a default, so a host only has to
/// supply the pixel size of its map surface.
///
/// # Example
///
/// ```rust
/// use clustermap::ClusterConfig;
///
/// let json = r#"{
///     "dimensions": { "width": 400.0, "height": 800.0 },
///     "max_zoom": 16,
///     "preserve_cluster_press_behavior": false
/// }"#;
/// let config = ClusterConfig::from_json(json).unwrap();
/// assert_eq!(config.min_zoom, 1);
/// assert_eq!(config.max_zoom, 16);
///
/// // Pixel dimensions are required
/// assert!(ClusterConfig::from_json("{}").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterConfig {
    /// Lowest zoom level at which clusters are computed
    #[serde(default = "ClusterConfig::default_min_zoom")]
    pub min_zoom: u8,

    /// Highest zoom level at which clusters are computed
    #[serde(default = "ClusterConfig::default_max_zoom")]
    pub max_zoom: u8,

    /// Tile extent the radius is measured against
    #[serde(default = "ClusterConfig::default_extent")]
    pub extent: f64,

    /// Cluster search radius in pixels (None means 4.5% of the viewport width)
    #[serde(default)]
    pub radius: Option<f64>,

    /// Whether the host should animate when the number of rendered entries changes
    #[serde(default = "ClusterConfig::default_true")]
    pub animate_clusters: bool,

    /// Render clusters (true) or every item as its own marker (false)
    #[serde(default = "ClusterConfig::default_true")]
    pub clustering_enabled: bool,

    /// Maximum number of leaves fetched when a cluster is pressed
    #[serde(default = "ClusterConfig::default_cluster_press_max_children")]
    pub cluster_press_max_children: usize,

    /// Resolve cluster presses into leaves and fit the map (true) or only
    /// forward the cluster id to the host (false)
    #[serde(default = "ClusterConfig::default_true")]
    pub preserve_cluster_press_behavior: bool,

    /// Inset used when fitting the map to a pressed cluster
    #[serde(default)]
    pub edge_padding: EdgePadding,

    /// Pixel size of the map surface
    pub dimensions: Dimensions,

    /// Cluster badge sizing
    #[serde(default)]
    pub badge: BadgeStyle,
}

impl ClusterConfig {
    const fn default_min_zoom() -> u8 {
        1
    }

    const fn default_max_zoom() -> u8 {
        20
    }

    const fn default_extent() -> f64 {
        512.0
    }

    const fn default_cluster_press_max_children() -> usize {
        100
    }

    const fn default_true() -> bool {
        true
    }

    /// Default configuration for a map surface of the given pixel size.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            min_zoom: Self::default_min_zoom(),
            max_zoom: Self::default_max_zoom(),
            extent: Self::default_extent(),
            radius: None,
            animate_clusters: true,
            clustering_enabled: true,
            cluster_press_max_children: Self::default_cluster_press_max_children(),
            preserve_cluster_press_behavior: true,
            edge_padding: EdgePadding::default(),
            dimensions: Dimensions::new(width, height),
            badge: BadgeStyle::default(),
        }
    }

    /// Parse a JSON document. Missing required fields are rejected, and the
    /// parsed values are validated.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).map_err(|e| {
            ClusterError::InvalidConfig(format!("Failed to parse configuration: {}", e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML document and validate it.
    #[cfg(feature = "toml")]
    pub fn from_toml(source: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(source).map_err(|e| ClusterError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_zoom_range(mut self, min_zoom: u8, max_zoom: u8) -> Self {
        self.min_zoom = min_zoom;
        self.max_zoom = max_zoom;
        self
    }

    pub fn with_extent(mut self, extent: f64) -> Self {
        self.extent = extent;
        self
    }

    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = Some(radius);
        self
    }

    pub fn with_animate_clusters(mut self, animate: bool) -> Self {
        self.animate_clusters = animate;
        self
    }

    pub fn with_clustering_enabled(mut self, enabled: bool) -> Self {
        self.clustering_enabled = enabled;
        self
    }

    pub fn with_cluster_press_max_children(mut self, max_children: usize) -> Self {
        self.cluster_press_max_children = max_children;
        self
    }

    /// Select resolved (true) or pass-through (false) cluster press handling.
    pub fn with_preserve_cluster_press_behavior(mut self, preserve: bool) -> Self {
        self.preserve_cluster_press_behavior = preserve;
        self
    }

    pub fn with_edge_padding(mut self, padding: EdgePadding) -> Self {
        self.edge_padding = padding;
        self
    }

    pub fn with_badge_style(mut self, badge: BadgeStyle) -> Self {
        self.badge = badge;
        self
    }

    /// Cluster radius in pixels, falling back to 4.5% of the viewport width.
    pub fn effective_radius(&self) -> f64 {
        self.radius
            .unwrap_or(self.dimensions.width * DEFAULT_RADIUS_RATIO)
    }

    /// Options handed to the clustering index on every rebuild.
    pub fn index_options(&self) -> IndexOptions {
        IndexOptions {
            min_zoom: self.min_zoom,
            max_zoom: self.max_zoom,
            extent: self.extent,
            radius: self.effective_radius(),
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        let Dimensions { width, height } = self.dimensions;
        if !width.is_finite() || !height.is_finite() || width <= 0.0 || height <= 0.0 {
            return Err(ClusterError::InvalidConfig(format!(
                "Viewport dimensions must be positive and finite, got {}x{}",
                width, height
            )));
        }

        if self.min_zoom > self.max_zoom {
            return Err(ClusterError::InvalidConfig(format!(
                "min_zoom ({}) must be <= max_zoom ({})",
                self.min_zoom, self.max_zoom
            )));
        }

        if self.max_zoom > MAX_SUPPORTED_ZOOM {
            return Err(ClusterError::InvalidConfig(format!(
                "max_zoom must be at most {}, got {}",
                MAX_SUPPORTED_ZOOM, self.max_zoom
            )));
        }

        if !self.extent.is_finite() || self.extent <= 0.0 {
            return Err(ClusterError::InvalidConfig(format!(
                "Extent must be positive and finite, got {}",
                self.extent
            )));
        }

        if let Some(radius) = self.radius
            && (!radius.is_finite() || radius <= 0.0)
        {
            return Err(ClusterError::InvalidConfig(format!(
                "Radius must be positive and finite, got {}",
                radius
            )));
        }

        if self.cluster_press_max_children == 0 {
            return Err(ClusterError::InvalidConfig(
                "cluster_press_max_children must be greater than zero".to_string(),
            ));
        }

        if self
            .edge_padding
            .sides()
            .iter()
            .any(|side| !side.is_finite() || *side < 0.0)
        {
            return Err(ClusterError::InvalidConfig(
                "Edge padding must be non-negative and finite".to_string(),
            ));
        }

        let BadgeStyle {
            cluster_initial_font_size,
            cluster_initial_dimension,
        } = self.badge;
        if [cluster_initial_font_size, cluster_initial_dimension]
            .iter()
            .any(|v| !v.is_finite() || *v <= 0.0)
        {
            return Err(ClusterError::InvalidConfig(
                "Badge font size and dimension must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

//! Render pass: turning a result set into host-drawn markers and badges.

use crate::config::BadgeStyle;
use crate::index::Cluster;
use clustermap_types::Location;
use std::sync::Arc;

/// Largest point count that still grows a badge.
const MAX_SCALED_COUNT: usize = 999;

/// Everything a host needs to draw one cluster badge.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterBadge {
    pub cluster_id: u64,
    pub point_count: usize,
    pub coordinate: Location,
    /// Badge edge length in pixels
    pub dimension: f64,
    pub font_size: f64,
    /// Bucketed count label: `"2"`..`"10"`, `"10+"`, `"25+"`, `"50+"`, `"100+"`
    pub label: String,
}

impl ClusterBadge {
    /// Size a badge for `cluster`, scaling the initial style by `ratio`.
    pub fn new(cluster: &Cluster, style: &BadgeStyle, ratio: f64) -> Self {
        Self {
            cluster_id: cluster.id,
            point_count: cluster.point_count,
            coordinate: cluster.coordinate,
            dimension: (style.cluster_initial_dimension * ratio).floor(),
            font_size: (style.cluster_initial_font_size * ratio).floor(),
            label: count_label(cluster.point_count),
        }
    }

    /// Corner radius that turns the badge into a circle.
    pub fn border_radius(&self) -> f64 {
        (self.dimension / 2.0).floor()
    }
}

/// Default growth of a badge with its point count: `1 + min(count, 999) / 100`.
pub fn default_scale_up_ratio(point_count: usize) -> f64 {
    1.0 + point_count.min(MAX_SCALED_COUNT) as f64 / 100.0
}

fn count_label(point_count: usize) -> String {
    match point_count {
        0..=1 => "1".to_string(),
        2..=10 => point_count.to_string(),
        11..=25 => "10+".to_string(),
        26..=50 => "25+".to_string(),
        51..=100 => "50+".to_string(),
        _ => "100+".to_string(),
    }
}

/// Host-supplied drawing callbacks.
pub trait MarkerRenderer<T> {
    type Output;

    /// Draw a single item.
    fn render_marker(&mut self, item: &Arc<T>) -> Self::Output;

    /// Draw a cluster badge.
    fn render_cluster(&mut self, badge: &ClusterBadge) -> Self::Output;

    /// Badge growth for a point count. Non-finite or non-positive values fall
    /// back to [`default_scale_up_ratio`].
    fn scale_up_ratio(&self, point_count: usize) -> f64 {
        default_scale_up_ratio(point_count)
    }
}

/// Resolve the scale ratio a renderer asks for, guarding against bad values.
pub(crate) fn effective_ratio<T, R: MarkerRenderer<T>>(renderer: &R, point_count: usize) -> f64 {
    let ratio = renderer.scale_up_ratio(point_count);
    if ratio.is_finite() && ratio > 0.0 {
        ratio
    } else {
        log::warn!(
            "scale_up_ratio returned {} for {} points, falling back to default",
            ratio,
            point_count
        );
        default_scale_up_ratio(point_count)
    }
}

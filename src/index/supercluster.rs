//! Hierarchical greedy point clustering over Web Mercator coordinates.
//!
//! Points are projected onto the unit square and clustered bottom-up: one
//! R-tree per zoom level from `max_zoom + 1` (raw points) down to `min_zoom`.
//! At each level every unclaimed node absorbs its unclaimed neighbours within
//! `radius / (extent * 2^zoom)`; the merged node sits at the weighted centroid.

use super::{Cluster, ClusterEntry, ClusterIndex, IndexOptions};
use crate::compute::feature::GeoFeature;
use crate::compute::geo::{lat_y, lng_x, x_lng, y_lat};
use crate::error::{ClusterError, Result};
use clustermap_types::{BoundingBox, Location};
use rstar::primitives::GeomWithData;
use rstar::{AABB, RTree};
use rustc_hash::FxHashSet;
use smallvec::SmallVec;
use std::sync::Arc;

/// Minimum total weight a group of neighbours needs to become a cluster.
const MIN_POINTS: usize = 2;

type TreeEntry = GeomWithData<[f64; 2], usize>;

#[derive(Debug, Clone)]
enum NodeKind {
    Leaf {
        feature: usize,
    },
    Cluster {
        zoom: u8,
        children: SmallVec<[usize; 4]>,
    },
}

#[derive(Debug, Clone)]
struct Node {
    x: f64,
    y: f64,
    num_points: usize,
    kind: NodeKind,
}

/// Clustering index with one R-tree per zoom level.
///
/// Cluster ids are positions in the node table, so building twice from the
/// same features in the same order yields the same ids.
///
/// # Examples
///
/// ```
/// use clustermap::{BoundingBox, ClusterIndex, IndexOptions, Location, SuperclusterIndex};
/// use clustermap::compute::feature::item_to_feature;
/// use std::sync::Arc;
///
/// let features = vec![
///     item_to_feature(Arc::new(Location::new(10.0, 10.0))).unwrap(),
///     item_to_feature(Arc::new(Location::new(10.0001, 10.0001))).unwrap(),
/// ];
/// let options = IndexOptions { min_zoom: 0, max_zoom: 16, extent: 512.0, radius: 40.0 };
/// let index = SuperclusterIndex::build(features, &options).unwrap();
///
/// let clusters = index.query(&BoundingBox::world(), 2);
/// assert_eq!(clusters.len(), 1);
/// assert_eq!(clusters[0].point_count(), 2);
/// ```
#[derive(Debug)]
pub struct SuperclusterIndex<T> {
    options: IndexOptions,
    features: Vec<GeoFeature<T>>,
    nodes: Vec<Node>,
    /// `levels[z - min_zoom]` holds the nodes visible at zoom `z`
    levels: Vec<RTree<TreeEntry>>,
}

impl<T> SuperclusterIndex<T> {
    fn validate_options(options: &IndexOptions) -> Result<()> {
        if options.min_zoom > options.max_zoom {
            return Err(ClusterError::IndexBuild(format!(
                "min_zoom ({}) must be <= max_zoom ({})",
                options.min_zoom, options.max_zoom
            )));
        }
        if !options.radius.is_finite() || options.radius <= 0.0 {
            return Err(ClusterError::IndexBuild(format!(
                "Radius must be positive and finite, got {}",
                options.radius
            )));
        }
        if !options.extent.is_finite() || options.extent <= 0.0 {
            return Err(ClusterError::IndexBuild(format!(
                "Extent must be positive and finite, got {}",
                options.extent
            )));
        }
        Ok(())
    }

    fn tree_entries(&self, ids: &[usize]) -> Vec<TreeEntry> {
        ids.iter()
            .map(|&id| GeomWithData::new([self.nodes[id].x, self.nodes[id].y], id))
            .collect()
    }

    /// Merge the nodes of the level above into the clusters of `zoom`.
    fn cluster_level(&mut self, above: &[usize], tree: &RTree<TreeEntry>, zoom: u8) -> Vec<usize> {
        let radius = self.options.radius / (self.options.extent * 2f64.powi(i32::from(zoom)));
        let mut claimed: FxHashSet<usize> = FxHashSet::default();
        let mut next = Vec::with_capacity(above.len());

        for &id in above {
            if !claimed.insert(id) {
                continue;
            }

            let (x, y, own_points) = {
                let node = &self.nodes[id];
                (node.x, node.y, node.num_points)
            };

            let mut neighbours: Vec<usize> = tree
                .locate_within_distance([x, y], radius * radius)
                .map(|entry| entry.data)
                .filter(|other| !claimed.contains(other))
                .collect();
            neighbours.sort_unstable();

            let weight = own_points
                + neighbours
                    .iter()
                    .map(|&n| self.nodes[n].num_points)
                    .sum::<usize>();

            if neighbours.is_empty() || weight < MIN_POINTS {
                next.push(id);
                continue;
            }

            let mut wx = x * own_points as f64;
            let mut wy = y * own_points as f64;
            let mut children: SmallVec<[usize; 4]> = SmallVec::with_capacity(neighbours.len() + 1);
            children.push(id);

            for n in neighbours {
                claimed.insert(n);
                let node = &self.nodes[n];
                wx += node.x * node.num_points as f64;
                wy += node.y * node.num_points as f64;
                children.push(n);
            }

            self.nodes.push(Node {
                x: wx / weight as f64,
                y: wy / weight as f64,
                num_points: weight,
                kind: NodeKind::Cluster { zoom, children },
            });
            next.push(self.nodes.len() - 1);
        }

        next
    }

    fn level(&self, zoom: u8) -> Option<&RTree<TreeEntry>> {
        let zoom = zoom.clamp(self.options.min_zoom, self.options.max_zoom.saturating_add(1));
        self.levels.get(usize::from(zoom - self.options.min_zoom))
    }

    fn entry(&self, id: usize) -> ClusterEntry<T> {
        let node = &self.nodes[id];
        match &node.kind {
            NodeKind::Leaf { feature } => ClusterEntry::Point(self.features[*feature].clone()),
            NodeKind::Cluster { .. } => ClusterEntry::Cluster(Cluster {
                id: id as u64,
                point_count: node.num_points,
                coordinate: Location::new(y_lat(node.y), x_lng(node.x)),
            }),
        }
    }

    fn cluster_node(&self, cluster_id: u64) -> Result<(u8, &[usize])> {
        let node = usize::try_from(cluster_id)
            .ok()
            .and_then(|id| self.nodes.get(id))
            .ok_or(ClusterError::UnknownCluster(cluster_id))?;

        match &node.kind {
            NodeKind::Cluster { zoom, children } => Ok((*zoom, children.as_slice())),
            NodeKind::Leaf { .. } => Err(ClusterError::UnknownCluster(cluster_id)),
        }
    }

    fn collect_leaves(&self, children: &[usize], limit: usize, out: &mut Vec<Arc<T>>) {
        for &child in children {
            if out.len() >= limit {
                return;
            }
            match &self.nodes[child].kind {
                NodeKind::Leaf { feature } => {
                    out.push(Arc::clone(self.features[*feature].item()));
                }
                NodeKind::Cluster { children, .. } => self.collect_leaves(children, limit, out),
            }
        }
    }

    fn query_range(&self, tree: &RTree<TreeEntry>, bbox: &BoundingBox, out: &mut Vec<usize>) {
        let envelope = AABB::from_corners(
            [lng_x(bbox.west), lat_y(bbox.north)],
            [lng_x(bbox.east), lat_y(bbox.south)],
        );
        out.extend(
            tree.locate_in_envelope_intersecting(&envelope)
                .map(|entry| entry.data),
        );
    }
}

fn wrap_longitude(lng: f64) -> f64 {
    if (-180.0..=180.0).contains(&lng) {
        lng
    } else {
        (lng + 180.0).rem_euclid(360.0) - 180.0
    }
}

impl<T> ClusterIndex<T> for SuperclusterIndex<T> {
    fn build(features: Vec<GeoFeature<T>>, options: &IndexOptions) -> Result<Self> {
        Self::validate_options(options)?;

        let mut index = Self {
            options: *options,
            nodes: Vec::with_capacity(features.len() * 2),
            features,
            levels: Vec::new(),
        };

        let level_count = usize::from(options.max_zoom - options.min_zoom) + 2;
        let mut levels: Vec<RTree<TreeEntry>> = (0..level_count).map(|_| RTree::new()).collect();

        let mut current: Vec<usize> = Vec::with_capacity(index.features.len());
        for (i, feature) in index.features.iter().enumerate() {
            index.nodes.push(Node {
                x: lng_x(feature.geometry.x()),
                y: lat_y(feature.geometry.y()),
                num_points: 1,
                kind: NodeKind::Leaf { feature: i },
            });
            current.push(i);
        }

        levels[level_count - 1] = RTree::bulk_load(index.tree_entries(&current));

        for zoom in (options.min_zoom..=options.max_zoom).rev() {
            let slot = usize::from(zoom - options.min_zoom);
            current = index.cluster_level(&current, &levels[slot + 1], zoom);
            levels[slot] = RTree::bulk_load(index.tree_entries(&current));
        }

        log::debug!(
            "Built cluster index: {} features, {} nodes, zoom {}..={}",
            index.features.len(),
            index.nodes.len(),
            options.min_zoom,
            options.max_zoom
        );

        index.levels = levels;
        Ok(index)
    }

    /// Edges inside [-180, 180] are used as given. Edges outside it are
    /// wrapped back into range, boxes with `west > east` are split at the
    /// antimeridian, and boxes spanning 360° or more cover every longitude.
    /// Results are ordered by node id.
    fn query(&self, bbox: &BoundingBox, zoom: u8) -> Vec<ClusterEntry<T>> {
        if !bbox.is_finite() {
            log::warn!("Rejecting cluster query with non-finite bounding box");
            return Vec::new();
        }

        let Some(tree) = self.level(zoom) else {
            return Vec::new();
        };

        let south = bbox.south.clamp(-90.0, 90.0);
        let north = bbox.north.clamp(-90.0, 90.0);
        let (west, east) = if bbox.east - bbox.west >= 360.0 {
            (-180.0, 180.0)
        } else {
            (wrap_longitude(bbox.west), wrap_longitude(bbox.east))
        };

        let mut ids = Vec::new();
        if west > east {
            self.query_range(tree, &BoundingBox::new(west, south, 180.0, north), &mut ids);
            self.query_range(tree, &BoundingBox::new(-180.0, south, east, north), &mut ids);
        } else {
            self.query_range(tree, &BoundingBox::new(west, south, east, north), &mut ids);
        }

        ids.sort_unstable();
        ids.dedup();
        ids.into_iter().map(|id| self.entry(id)).collect()
    }

    fn leaves(&self, cluster_id: u64, limit: usize) -> Result<Vec<Arc<T>>> {
        let (_, children) = self.cluster_node(cluster_id)?;
        let mut out = Vec::with_capacity(limit.min(self.features.len()));
        self.collect_leaves(children, limit, &mut out);
        Ok(out)
    }

    fn children(&self, cluster_id: u64) -> Result<Vec<ClusterEntry<T>>> {
        let (_, children) = self.cluster_node(cluster_id)?;
        Ok(children.iter().map(|&id| self.entry(id)).collect())
    }

    fn expansion_zoom(&self, cluster_id: u64) -> Result<u8> {
        let (zoom, _) = self.cluster_node(cluster_id)?;
        Ok(zoom + 1)
    }

    fn len(&self) -> usize {
        self.features.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::feature::item_to_feature;

    fn options(min_zoom: u8, max_zoom: u8) -> IndexOptions {
        IndexOptions {
            min_zoom,
            max_zoom,
            extent: 512.0,
            radius: 40.0,
        }
    }

    fn build(locations: &[Location], opts: IndexOptions) -> SuperclusterIndex<Location> {
        let features = locations
            .iter()
            .map(|loc| item_to_feature(Arc::new(*loc)).unwrap())
            .collect();
        SuperclusterIndex::build(features, &opts).unwrap()
    }

    fn grid(n: usize, spacing: f64) -> Vec<Location> {
        (0..n)
            .flat_map(|i| {
                (0..n).map(move |j| Location::new(i as f64 * spacing, j as f64 * spacing))
            })
            .collect()
    }

    #[test]
    fn test_empty_index_returns_nothing() {
        let index = build(&[], options(0, 16));
        assert!(index.is_empty());
        assert!(index.query(&BoundingBox::world(), 0).is_empty());
    }

    #[test]
    fn test_point_counts_are_conserved() {
        let locations = grid(10, 0.5);
        let index = build(&locations, options(0, 16));

        for zoom in 0..=17 {
            let total: usize = index
                .query(&BoundingBox::world(), zoom)
                .iter()
                .map(|e| e.point_count().max(1))
                .sum();
            assert_eq!(total, locations.len(), "zoom {}", zoom);
        }
    }

    #[test]
    fn test_clusters_split_when_zooming_in() {
        let index = build(&grid(10, 0.5), options(0, 16));
        let far = index.query(&BoundingBox::world(), 0).len();
        let near = index.query(&BoundingBox::world(), 17).len();
        assert!(far < near);
        assert_eq!(near, 100);
    }

    #[test]
    fn test_leaves_respect_limit_and_membership() {
        let locations = grid(5, 0.01);
        let index = build(&locations, options(0, 16));
        let top = index.query(&BoundingBox::world(), 0);
        assert_eq!(top.len(), 1);
        let id = top[0].cluster_id().unwrap();

        assert_eq!(index.leaves(id, 100).unwrap().len(), 25);
        assert_eq!(index.leaves(id, 7).unwrap().len(), 7);
        assert!(index.leaves(id, 0).unwrap().is_empty());
    }

    #[test]
    fn test_unknown_cluster_id() {
        let index = build(&grid(3, 0.01), options(0, 16));
        assert!(matches!(
            index.leaves(9_999, 10),
            Err(ClusterError::UnknownCluster(9_999))
        ));
        // Leaf nodes are not clusters
        assert!(index.children(0).is_err());
    }

    #[test]
    fn test_children_and_expansion_zoom() {
        let locations = [Location::new(0.0, 0.0), Location::new(0.0, 0.5)];
        let index = build(&locations, options(0, 16));
        let top = index.query(&BoundingBox::world(), 0);
        let id = top[0].cluster_id().unwrap();

        let children = index.children(id).unwrap();
        let child_total: usize = children.iter().map(|c| c.point_count().max(1)).sum();
        assert_eq!(child_total, 2);

        let zoom = index.expansion_zoom(id).unwrap();
        assert!(index.query(&BoundingBox::world(), zoom).len() > 1);
    }

    #[test]
    fn test_query_across_antimeridian() {
        let locations = [
            Location::new(0.0, 179.5),
            Location::new(0.0, -179.5),
            Location::new(0.0, 0.0),
        ];
        let index = build(&locations, options(0, 16));
        let bbox = BoundingBox::new(179.0, -1.0, -179.0, 1.0);

        let result = index.query(&bbox, 17);
        assert_eq!(result.len(), 2);
        assert!(result.iter().all(|e| e.coordinate().longitude.abs() > 179.0));
    }

    #[test]
    fn test_edges_at_the_antimeridian_are_kept() {
        let locations = [Location::new(0.0, 0.0), Location::new(0.0, -172.0)];
        let index = build(&locations, options(0, 16));

        // A box clamped onto the meridian covers nothing
        assert!(index.query(&BoundingBox::new(180.0, -5.0, 180.0, 5.0), 17).is_empty());
        assert!(index.query(&BoundingBox::new(-180.0, -5.0, -180.0, 5.0), 17).is_empty());

        // Out-of-range edges wrap back into [-180, 180]
        let wrapped = index.query(&BoundingBox::new(185.0, -1.0, 190.0, 1.0), 17);
        assert_eq!(wrapped.len(), 1);
        assert_eq!(wrapped[0].coordinate().longitude, -172.0);
    }

    #[test]
    fn test_non_finite_bbox_is_rejected() {
        let index = build(&grid(3, 1.0), options(0, 16));
        let bbox = BoundingBox::new(f64::NAN, 0.0, 10.0, 10.0);
        assert!(index.query(&bbox, 5).is_empty());
    }

    #[test]
    fn test_build_rejects_bad_options() {
        let bad = IndexOptions {
            radius: 0.0,
            ..options(0, 16)
        };
        assert!(SuperclusterIndex::<Location>::build(Vec::new(), &bad).is_err());
        assert!(SuperclusterIndex::<Location>::build(Vec::new(), &options(5, 2)).is_err());
    }

    #[test]
    fn test_rebuild_is_deterministic() {
        let locations = grid(8, 0.3);
        let a = build(&locations, options(0, 16));
        let b = build(&locations, options(0, 16));

        for zoom in [0, 3, 6, 9] {
            let ra = a.query(&BoundingBox::world(), zoom);
            let rb = b.query(&BoundingBox::world(), zoom);
            let ids_a: Vec<_> = ra.iter().map(|e| (e.cluster_id(), e.point_count())).collect();
            let ids_b: Vec<_> = rb.iter().map(|e| (e.cluster_id(), e.point_count())).collect();
            assert_eq!(ids_a, ids_b);
        }
    }
}

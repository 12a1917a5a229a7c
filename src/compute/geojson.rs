//! GeoJSON export of clustering results.

use crate::compute::feature::ITEM_KEY;
use crate::error::Result;
use crate::index::ClusterEntry;
use clustermap_types::BoundingBox;
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Value, feature::Id};
use serde::Serialize;
use serde_json::json;

/// Converts one result entry to a GeoJSON point feature.
///
/// Clusters carry `cluster`, `cluster_id`, `point_count` and
/// `point_count_abbreviated`; single points carry the serialized item under
/// `item` and `point_count: 0`.
pub fn entry_to_feature<T: Serialize>(entry: &ClusterEntry<T>) -> Result<Feature> {
    let coordinate = entry.coordinate();
    let mut properties = JsonObject::new();

    let id = match entry {
        ClusterEntry::Cluster(cluster) => {
            properties.insert("cluster".to_string(), json!(true));
            properties.insert("cluster_id".to_string(), json!(cluster.id));
            properties.insert("point_count".to_string(), json!(cluster.point_count));
            properties.insert(
                "point_count_abbreviated".to_string(),
                json!(cluster.abbreviated_count()),
            );
            Some(Id::Number(cluster.id.into()))
        }
        ClusterEntry::Point(feature) => {
            properties.insert("point_count".to_string(), json!(0));
            properties.insert(
                ITEM_KEY.to_string(),
                serde_json::to_value(feature.item().as_ref())?,
            );
            None
        }
    };

    Ok(Feature {
        bbox: None,
        geometry: Some(Geometry::new(Value::Point(coordinate.lng_lat().to_vec()))),
        id,
        properties: Some(properties),
        foreign_members: None,
    })
}

/// Converts a whole result set to a feature collection whose `bbox` covers
/// every entry. An empty result set has no `bbox`.
pub fn to_feature_collection<T: Serialize>(entries: &[ClusterEntry<T>]) -> Result<FeatureCollection> {
    let features = entries
        .iter()
        .map(entry_to_feature)
        .collect::<Result<Vec<_>>>()?;

    let coordinates: Vec<_> = entries.iter().map(ClusterEntry::coordinate).collect();

    Ok(FeatureCollection {
        bbox: BoundingBox::covering(&coordinates).map(Into::into),
        features,
        foreign_members: None,
    })
}

/// Converts a result set to a GeoJSON string.
pub fn to_geojson_string<T: Serialize>(entries: &[ClusterEntry<T>]) -> Result<String> {
    let collection = to_feature_collection(entries)?;
    Ok(serde_json::to_string(&collection)?)
}

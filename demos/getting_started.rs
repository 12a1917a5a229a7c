//! Getting started with clustermap.
//!
//! Builds a view over a handful of Paris landmarks, zooms in and out, and
//! presses a cluster.
//!
//! Run with: RUST_LOG=debug cargo run --example getting_started

use clustermap::prelude::*;
use clustermap::{ClusterBadge, clusters_changed};
use serde::Serialize;
use std::error::Error;
use std::sync::Arc;

#[derive(Debug, Clone, Serialize)]
struct Landmark {
    name: &'static str,
    latitude: f64,
    longitude: f64,
}

impl Locatable for Landmark {
    fn location(&self) -> Option<Location> {
        Some(Location::new(self.latitude, self.longitude))
    }
}

/// Prints what a real map widget would draw.
struct ConsoleRenderer;

impl MarkerRenderer<Landmark> for ConsoleRenderer {
    type Output = String;

    fn render_marker(&mut self, item: &Arc<Landmark>) -> String {
        format!("marker  {}", item.name)
    }

    fn render_cluster(&mut self, badge: &ClusterBadge) -> String {
        format!(
            "cluster #{} ({}) {}px font {}",
            badge.cluster_id, badge.label, badge.dimension, badge.font_size
        )
    }
}

struct ConsoleSurface;

impl MapSurface for ConsoleSurface {
    fn fit_to_coordinates(&mut self, coordinates: &[Location], edge_padding: EdgePadding) {
        println!(
            "   surface: fitting {} coordinates with padding {:?}",
            coordinates.len(),
            edge_padding.sides()
        );
    }
}

struct ConsoleObserver;

impl MapObserver<Landmark> for ConsoleObserver {
    fn on_region_change_complete(
        &mut self,
        region: &Region,
        entries: Option<&[ClusterEntry<Landmark>]>,
    ) {
        match entries {
            Some(entries) => println!(
                "   observer: region ({:.3}, {:.3}) shows {} entries",
                region.latitude,
                region.longitude,
                entries.len()
            ),
            None => println!("   observer: wide region, clusters kept"),
        }
    }

    fn on_cluster_press(&mut self, press: &ClusterPress<Landmark>) {
        let names: Vec<_> = press.leaves().iter().map(|l| l.name).collect();
        println!("   observer: cluster {} holds {:?}", press.cluster_id(), names);
    }
}

fn landmarks() -> Vec<Landmark> {
    vec![
        Landmark { name: "Eiffel Tower", latitude: 48.8584, longitude: 2.2945 },
        Landmark { name: "Louvre", latitude: 48.8606, longitude: 2.3376 },
        Landmark { name: "Notre-Dame", latitude: 48.8530, longitude: 2.3499 },
        Landmark { name: "Sacre-Coeur", latitude: 48.8867, longitude: 2.3431 },
        Landmark { name: "Versailles", latitude: 48.8049, longitude: 2.1204 },
        Landmark { name: "Lyon", latitude: 45.7640, longitude: 4.8357 },
    ]
}

fn main() -> std::result::Result<(), Box<dyn Error>> {
    env_logger::init();

    println!("=== clustermap - Getting Started ===\n");

    let config = ClusterConfig::new(400.0, 800.0).with_edge_padding(EdgePadding::uniform(24.0));
    let mut view: ClusteredMapView<Landmark, _, _> = MapViewBuilder::new(config)
        .region(Region::new(47.5, 3.5, 6.0, 6.0))
        .surface(ConsoleSurface)
        .observer(ConsoleObserver)
        .build()?;

    println!("1. Indexing {} landmarks", landmarks().len());
    view.rebuild(landmarks());
    for line in view.render(&mut ConsoleRenderer) {
        println!("   {}", line);
    }

    println!("\n2. Zooming into central Paris");
    let before = view.entries().to_vec();
    let paris = Region::new(48.8606, 2.3376, 0.08, 0.08);
    let preview = view.query(&paris);
    println!(
        "   animate transition: {}",
        clusters_changed(&before, &preview) && view.config().animate_clusters
    );
    view.on_region_change(paris);
    for line in view.render(&mut ConsoleRenderer) {
        println!("   {}", line);
    }

    println!("\n3. Pressing the first cluster at country scale");
    view.on_region_change(Region::new(47.5, 3.5, 6.0, 6.0));
    if let Some(cluster_id) = view.entries().iter().find_map(ClusterEntry::cluster_id) {
        view.on_cluster_press(cluster_id);
    }

    println!("\n4. Zooming out to a continent");
    view.on_region_change(Region::new(45.0, 10.0, 60.0, 120.0));
    println!("   still showing {} entries", view.entries().len());

    #[cfg(feature = "geojson")]
    {
        println!("\n5. GeoJSON export");
        let json = clustermap::compute::geojson::to_geojson_string(view.entries())?;
        println!("   {}", json);
    }

    Ok(())
}

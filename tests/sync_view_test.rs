use clustermap::prelude::*;
use std::thread;

fn grid(rows: usize, cols: usize, offset: f64) -> Vec<Location> {
    (0..rows)
        .flat_map(|r| {
            (0..cols).map(move |c| Location::new(offset + r as f64 * 0.5, offset + c as f64 * 0.5))
        })
        .collect()
}

fn shared_view() -> SyncMapView<Location> {
    let view = MapViewBuilder::new(ClusterConfig::new(400.0, 800.0))
        .region(Region::new(5.0, 5.0, 12.0, 12.0))
        .build()
        .expect("valid configuration");
    SyncMapView::new(view)
}

#[test]
fn test_concurrent_queries_share_one_index() {
    let view = shared_view();
    view.rebuild(grid(20, 20, 0.0));

    let expected = view.query(&Region::new(5.0, 5.0, 4.0, 4.0)).len();
    let mut handles = vec![];

    for _ in 0..4 {
        let view = view.clone();
        handles.push(thread::spawn(move || {
            (0..50)
                .map(|_| view.query(&Region::new(5.0, 5.0, 4.0, 4.0)).len())
                .collect::<Vec<_>>()
        }));
    }

    for handle in handles {
        let counts = handle.join().unwrap();
        assert!(counts.iter().all(|&c| c == expected));
    }
}

#[test]
fn test_rebuild_and_result_set_are_swapped_together() {
    let view = shared_view();
    let small = grid(2, 2, 0.0);
    let large = grid(10, 10, 0.0);

    let writer = {
        let view = view.clone();
        let (small, large) = (small.clone(), large.clone());
        thread::spawn(move || {
            for i in 0..20 {
                let items = if i % 2 == 0 { large.clone() } else { small.clone() };
                view.rebuild(items);
            }
        })
    };

    let reader = {
        let view = view.clone();
        thread::spawn(move || {
            for _ in 0..200 {
                view.with_view(|inner| {
                    let total: usize = inner
                        .entries()
                        .iter()
                        .map(|entry| entry.point_count().max(1))
                        .sum();
                    let indexed = inner.index().map_or(0, |index| index.len());
                    // Entries never outnumber the points of the index they came from
                    assert!(total <= indexed || inner.entries().is_empty());
                });
            }
        })
    };

    writer.join().unwrap();
    reader.join().unwrap();

    assert_eq!(view.with_view(|inner| inner.items().len()), small.len());
}

#[test]
fn test_region_changes_from_many_threads() {
    let view = shared_view();
    view.rebuild(grid(10, 10, 0.0));

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let view = view.clone();
            thread::spawn(move || {
                let region = Region::new(i as f64, i as f64, 3.0, 3.0);
                view.on_region_change(region).map(|entries| entries.len())
            })
        })
        .collect();

    for handle in handles {
        assert!(handle.join().unwrap().is_some());
    }

    let last = view.region();
    assert_eq!(view.entries().len(), view.query(&last).len());
}

#[test]
fn test_set_data_and_press_through_wrapper() {
    let view = shared_view();
    let items = vec![Location::new(5.0, 5.0), Location::new(5.0, 5.0)];

    assert!(view.set_data(items.clone(), 1));
    assert!(!view.set_data(items, 1));

    let cluster_id = view.entries()[0].cluster_id().expect("a cluster");
    let press = view.on_cluster_press(cluster_id);
    assert_eq!(press.leaves().len(), 2);
    assert!(view.index().is_some());
}

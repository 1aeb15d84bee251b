use bandobast::prelude::*;
use serde_json::json;

fn zones() -> serde_json::Value {
    json!({
        "a": {
            "title": "Zone A",
            "circle": { "center": { "lat": 12.9, "lng": 77.6 }, "radius": 500.0 }
        },
        "b": {
            "title": "Zone B",
            "coordinates": [[[77.5, 12.8], [77.6, 12.8], [77.6, 12.9], [77.5, 12.8]]]
        }
    })
}

#[test]
fn circle_and_polygon_sectors_test() {
    let store = MemoryStore::new();
    store.set("sectorDetails", zones());
    let sync = RemoteSectorSync::attach(&store, &Config::default());

    let overlays = sync.overlays();
    assert_eq!(overlays.shapes.len(), 2);
    assert!(overlays.markers.is_empty());

    let mut labels: Vec<_> = overlays.popups().map(|popup| popup.label.as_str()).collect();
    labels.sort();
    assert_eq!(labels, vec!["Zone A", "Zone B"]);

    assert!(overlays.shapes.iter().any(|shape| matches!(
        shape.shape,
        Shape::Circle { radius, .. } if radius == Distance::from_meters(500.0)
    )));
    assert!(
        overlays
            .shapes
            .iter()
            .any(|shape| matches!(&shape.shape, Shape::Polygon { ring } if ring.len() == 4))
    );
}

#[test]
fn personnel_markers_test() {
    let store = MemoryStore::new();
    store.set(
        "sectorDetails/a",
        json!({
            "title": "Zone A",
            "circle": { "center": { "lat": 12.9, "lng": 77.6 }, "radius": 500.0 },
            "personnel": {
                "d1": { "name": "Asha", "latitude": 12.91, "longitude": 77.61 },
                "d2": { "name": "Ravi" }
            }
        }),
    );
    let config = Config::default();
    let sync = RemoteSectorSync::attach(&store, &config);

    let overlays = sync.overlays();
    assert_eq!(overlays.markers.len(), 1);
    let marker = &overlays.markers[0];
    assert_eq!(marker.device_id, "d1");
    assert_eq!(marker.popup.label, "Asha");
    assert_eq!(marker.icon, config.marker_icon);
    assert_eq!(marker.position, Coordinate::new(12.91, 77.61));
}

#[test]
fn unreadable_personnel_keeps_sector_test() {
    let store = MemoryStore::new();
    store.set(
        "sectorDetails/a",
        json!({
            "title": "Zone A",
            "circle": { "center": { "lat": 12.9, "lng": 77.6 }, "radius": 500.0 },
            "personnel": {
                "d1": { "name": "Asha", "latitude": 12.91, "longitude": 77.61 },
                "d2": { "name": "Ravi", "latitude": "12.92", "longitude": 77.62 }
            }
        }),
    );
    let sync = RemoteSectorSync::attach(&store, &Config::default());

    let overlays = sync.overlays();
    assert_eq!(overlays.shapes.len(), 1);
    assert_eq!(overlays.shapes[0].popup.label, "Zone A");
    assert_eq!(overlays.markers.len(), 1);
    assert_eq!(overlays.markers[0].device_id, "d1");
}

#[test]
fn identical_snapshot_renders_same_overlays_test() {
    let store = MemoryStore::new();
    store.set("sectorDetails", zones());
    let sync = RemoteSectorSync::attach(&store, &Config::default());
    let first = sync.overlays();

    store.set("sectorDetails", zones());
    let second = sync.overlays();

    assert!(!std::sync::Arc::ptr_eq(&first, &second));
    assert_eq!(first, second);
}

#[test]
fn overlays_follow_changes_test() {
    let store = MemoryStore::new();
    let sync = RemoteSectorSync::attach(&store, &Config::default());
    assert!(sync.overlays().is_empty());

    store.set("sectorDetails", zones());
    assert_eq!(sync.overlays().shapes.len(), 2);

    store.remove("sectorDetails/a");
    assert_eq!(sync.overlays().shapes.len(), 1);

    store.remove("sectorDetails");
    assert!(sync.overlays().is_empty());
}

#[test]
fn roster_options_test() {
    let store = MemoryStore::new();
    let sync = RemoteSectorSync::attach(&store, &Config::default());
    assert!(sync.personnel_options().is_empty());

    store.set("personnel/p1", json!({ "name": "Asha", "deviceId": "d1" }));
    store.set("personnel/p2", json!({ "name": "Ravi", "deviceId": "d2" }));

    let options = sync.personnel_options();
    assert_eq!(options.len(), 2);
    assert_eq!(options[0].value, "p1");
    assert_eq!(options[0].label, "Asha");
    assert!(sync.overlays().is_empty());
}

#[test]
fn detach_releases_subscriptions_test() {
    let store = MemoryStore::new();
    let sync = RemoteSectorSync::attach(&store, &Config::default());
    let overlays = sync.watch_overlays();
    assert!(sync.is_attached());
    assert_eq!(store.listener_count(), 2);

    sync.detach();
    assert_eq!(store.listener_count(), 0);

    store.set("sectorDetails", zones());
    assert!(overlays.borrow().is_empty());
}

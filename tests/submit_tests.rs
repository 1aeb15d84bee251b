use bandobast::{prelude::*, sector::SectorRecord, store};
use serde_json::{Value, json};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Memory store whose reads or writes can be made to fail.
#[derive(Default)]
struct FlakyStore {
    inner: MemoryStore,
    fail_reads: bool,
    fail_writes: bool,
    reads: AtomicUsize,
}

impl RemoteStore for FlakyStore {
    fn subscribe(&self, path: &str, on_snapshot: store::SnapshotFn) -> Subscription {
        self.inner.subscribe(path, on_snapshot)
    }

    async fn read_once(&self, path: &str) -> Result<Option<Value>, store::Error> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads {
            return Err(store::Error::Read {
                path: path.to_string(),
                message: "network unreachable".into(),
            });
        }
        self.inner.read_once(path).await
    }

    async fn append_new(&self, path: &str, value: Value) -> Result<String, store::Error> {
        if self.fail_writes {
            return Err(store::Error::Write {
                path: path.to_string(),
                message: "permission denied".into(),
            });
        }
        self.inner.append_new(path, value).await
    }
}

fn roster(store: &MemoryStore) {
    store.set(
        "personnel/p1",
        json!({ "name": "Asha", "deviceId": "d1", "latitude": 1.0, "longitude": 2.0 }),
    );
    store.set(
        "personnel/p2",
        json!({ "name": "Ravi", "deviceId": "d2", "latitude": 3.0, "longitude": 4.0 }),
    );
}

fn open_form(session: &mut DrawSession, personnel: &[&str]) {
    session
        .handle_draw(DrawnLayer::Polygon {
            coordinates: json!([[77.5, 12.8], [77.6, 12.8], [77.6, 12.9], [77.5, 12.8]]),
        })
        .unwrap();
    let mut form = session.form().unwrap();
    form.set_title("Zone A");
    form.set_personnel(personnel.iter().copied());
    form.set_date("2024-05-01").unwrap();
    form.set_start_time("06:00").unwrap();
    form.set_end_time("14:00").unwrap();
}

fn stored_sectors(store: &MemoryStore) -> Vec<(String, SectorRecord)> {
    store
        .get("sectorDetails")
        .and_then(|value| value.as_object().cloned())
        .unwrap_or_default()
        .into_iter()
        .map(|(id, value)| (id, serde_json::from_value(value).unwrap()))
        .collect()
}

#[tokio::test]
async fn personnel_keyed_by_device_id_test() {
    let store = FlakyStore::default();
    roster(&store.inner);
    let config = Config::default();
    let mut session = DrawSession::new();
    open_form(&mut session, &["p1", "p2"]);

    let id = session.submit(&store, &config).await.unwrap();

    let sectors = stored_sectors(&store.inner);
    assert_eq!(sectors.len(), 1);
    let (stored_id, record) = &sectors[0];
    assert_eq!(stored_id, &id);
    assert_eq!(store.reads.load(Ordering::SeqCst), 2);

    let positions: Vec<_> = record
        .personnel
        .iter()
        .map(|(device, person)| (device.as_str(), person.position()))
        .collect();
    assert_eq!(
        positions,
        vec![
            ("d1", Some(Coordinate::new(1.0, 2.0))),
            ("d2", Some(Coordinate::new(3.0, 4.0))),
        ]
    );
    assert_eq!(record.title, "Zone A");
    assert_eq!(record.date.as_deref(), Some("2024-05-01"));
    assert_eq!(record.start_time.as_deref(), Some("06:00"));
    assert_eq!(record.end_time.as_deref(), Some("14:00"));
    assert!(matches!(record.geometry(), Some(Geometry::Polygon { .. })));
}

#[tokio::test]
async fn success_resets_draft_test() {
    let store = FlakyStore::default();
    roster(&store.inner);
    let mut session = DrawSession::new();
    open_form(&mut session, &["p1"]);

    let id = session.submit(&store, &Config::default()).await.unwrap();

    assert_eq!(session.state(), SessionState::Idle);
    assert_eq!(session.draft(), &DraftSector::default());
    assert_eq!(session.take_notice(), Some(Notice::Saved(id)));
    assert!(session.layers().iter().all(|layer| layer.committed));
    assert!(session.layers().uncommitted_rings().is_empty());
}

#[tokio::test]
async fn missing_personnel_fails_without_write_test() {
    let store = FlakyStore::default();
    store.inner.set(
        "personnel/p1",
        json!({ "name": "Asha", "deviceId": "d1", "latitude": 1.0, "longitude": 2.0 }),
    );
    let mut session = DrawSession::new();
    open_form(&mut session, &["p1", "p2"]);
    let draft = session.draft().clone();

    let result = session.submit(&store, &Config::default()).await;

    assert!(matches!(result, Err(SubmitError::PersonnelNotFound(ref id)) if id == "p2"));
    assert!(stored_sectors(&store.inner).is_empty());
    assert_eq!(session.state(), SessionState::FormOpen);
    assert_eq!(session.draft(), &draft);
    assert_eq!(session.layers().len(), 1);
    assert!(matches!(session.take_notice(), Some(Notice::Failed(_))));
}

#[tokio::test]
async fn write_failure_keeps_draft_for_retry_test() {
    let mut store = FlakyStore {
        fail_writes: true,
        ..Default::default()
    };
    roster(&store.inner);
    let config = Config::default();
    let mut session = DrawSession::new();
    open_form(&mut session, &["p1"]);

    let result = session.submit(&store, &config).await;
    assert!(matches!(result, Err(SubmitError::Write(_))));
    assert_eq!(session.state(), SessionState::FormOpen);
    assert_eq!(session.draft().title, "Zone A");

    store.fail_writes = false;
    session.submit(&store, &config).await.unwrap();
    assert_eq!(stored_sectors(&store.inner).len(), 1);
}

#[tokio::test]
async fn missing_device_id_fails_test() {
    let store = FlakyStore::default();
    store
        .inner
        .set("personnel/p1", json!({ "name": "Asha", "latitude": 1.0 }));
    let mut session = DrawSession::new();
    open_form(&mut session, &["p1"]);

    let result = session.submit(&store, &Config::default()).await;
    assert!(matches!(result, Err(SubmitError::MissingDeviceId(_))));
    assert!(stored_sectors(&store.inner).is_empty());
}

#[tokio::test]
async fn blank_title_is_refused_test() {
    let store = FlakyStore::default();
    let mut session = DrawSession::new();
    open_form(&mut session, &[]);
    session.form().unwrap().set_title("   ");

    let result = session.submit(&store, &Config::default()).await;
    assert!(matches!(result, Err(SubmitError::MissingTitle)));
    assert_eq!(store.reads.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn submit_without_form_test() {
    let store = FlakyStore::default();
    let mut session = DrawSession::new();
    let result = session.submit(&store, &Config::default()).await;
    assert!(matches!(result, Err(SubmitError::FormClosed)));
}

#[tokio::test]
async fn circle_sector_is_stored_as_circle_test() {
    let store = FlakyStore::default();
    let mut session = DrawSession::new();
    session
        .handle_draw(DrawnLayer::Circle {
            center: Some(LatLng {
                lat: Some(12.9),
                lng: Some(77.6),
            }),
            radius: Some(500.0),
        })
        .unwrap();
    session.form().unwrap().set_title("Ring road");

    session.submit(&store, &Config::default()).await.unwrap();

    let sectors = stored_sectors(&store.inner);
    let record = &sectors[0].1;
    assert_eq!(record.coordinates, None);
    assert_eq!(
        record.geometry(),
        Some(Geometry::Circle {
            center: Coordinate::new(12.9, 77.6),
            radius: Distance::from_meters(500.0),
        })
    );
}

#[tokio::test]
async fn cancelled_shapes_are_collected_on_next_submit_test() {
    let store = FlakyStore::default();
    let mut session = DrawSession::new();
    open_form(&mut session, &[]);
    session.cancel();
    open_form(&mut session, &[]);

    session.submit(&store, &Config::default()).await.unwrap();

    let sectors = stored_sectors(&store.inner);
    match sectors[0].1.geometry() {
        Some(Geometry::Polygon { rings }) => assert_eq!(rings.len(), 2),
        other => panic!("expected polygon, got {other:?}"),
    }
}

#[tokio::test]
async fn read_failure_keeps_draft_without_write_test() {
    let store = FlakyStore {
        fail_reads: true,
        ..Default::default()
    };
    roster(&store.inner);
    let mut session = DrawSession::new();
    open_form(&mut session, &["p1", "p2"]);
    let draft = session.draft().clone();

    let result = session.submit(&store, &Config::default()).await;

    assert!(matches!(result, Err(SubmitError::Read(_))));
    assert!(stored_sectors(&store.inner).is_empty());
    assert_eq!(session.state(), SessionState::FormOpen);
    assert_eq!(session.draft(), &draft);
    assert!(session.layers().iter().all(|layer| !layer.committed));
    assert!(matches!(session.take_notice(), Some(Notice::Failed(_))));
}

#[tokio::test]
async fn cancelled_circle_stays_uncommitted_test() {
    let store = FlakyStore::default();
    let mut session = DrawSession::new();
    let circle = session
        .handle_draw(DrawnLayer::Circle {
            center: Some(LatLng {
                lat: Some(12.9),
                lng: Some(77.6),
            }),
            radius: Some(500.0),
        })
        .unwrap();
    session.cancel();
    let polygon = session
        .handle_draw(DrawnLayer::Polygon {
            coordinates: json!([[0.0, 0.0], [0.0, 1.0], [1.0, 1.0], [0.0, 0.0]]),
        })
        .unwrap();
    session.form().unwrap().set_title("Zone");

    session.submit(&store, &Config::default()).await.unwrap();

    let sectors = stored_sectors(&store.inner);
    assert_eq!(sectors.len(), 1);
    assert_eq!(sectors[0].1.circle, None);
    assert!(matches!(sectors[0].1.geometry(), Some(Geometry::Polygon { .. })));
    assert!(!session.layers().get(circle).unwrap().committed);
    assert!(session.layers().get(polygon).unwrap().committed);
}

#[tokio::test]
async fn open_marker_is_committed_test() {
    let store = FlakyStore::default();
    let mut session = DrawSession::new();
    let marker = session
        .handle_draw(DrawnLayer::Marker {
            lat: Some(1.0),
            lng: Some(2.0),
        })
        .unwrap();
    session.form().unwrap().set_title("Checkpoint");

    session.submit(&store, &Config::default()).await.unwrap();

    assert!(session.layers().get(marker).unwrap().committed);
    assert!(sectors_have_marker(&store.inner));
}

fn sectors_have_marker(store: &MemoryStore) -> bool {
    stored_sectors(store)
        .iter()
        .any(|(_, record)| record.marker.is_some())
}

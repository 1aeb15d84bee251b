use chrono::Utc;
use serde_json::{Map, Value};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tracing::debug;

use super::{Error, RemoteStore, SnapshotFn, Subscription};

struct Listener {
    id: u64,
    path: Vec<String>,
    on_snapshot: SnapshotFn,
}

#[derive(Default)]
struct Inner {
    root: Value,
    listeners: Vec<Listener>,
    next_listener: u64,
    last_push: (i64, u32),
}

/// In-process store over a single JSON tree.
///
/// Listeners are always called after the internal lock is released, so a
/// listener may read or write the store again.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

type Notifications = Vec<(SnapshotFn, Option<Value>)>;

impl MemoryStore {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_value(root: Value) -> Self {
        let store = Self::new();
        store.lock().root = root;
        store
    }

    pub fn get(&self, path: &str) -> Option<Value> {
        lookup(&self.lock().root, &split(path)).cloned()
    }

    /// Replaces the value at `path`, `Value::Null` removes it.
    pub fn set(&self, path: &str, value: Value) {
        let segments = split(path);
        let notifications = {
            let mut inner = self.lock();
            write(&mut inner.root, &segments, value);
            inner.notifications(&segments)
        };
        deliver(notifications);
    }

    pub fn remove(&self, path: &str) {
        self.set(path, Value::Null);
    }

    pub fn listener_count(&self) -> usize {
        self.lock().listeners.len()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Inner {
    fn notifications(&self, changed: &[String]) -> Notifications {
        self.listeners
            .iter()
            .filter(|listener| {
                listener.path.starts_with(changed) || changed.starts_with(&listener.path)
            })
            .map(|listener| {
                (
                    listener.on_snapshot.clone(),
                    lookup(&self.root, &listener.path).cloned(),
                )
            })
            .collect()
    }

    /// Time ordered key, unique within this store.
    fn push_key(&mut self) -> String {
        let millis = Utc::now().timestamp_millis();
        let (last_millis, sequence) = self.last_push;
        let sequence = if millis <= last_millis {
            sequence + 1
        } else {
            0
        };
        let millis = millis.max(last_millis);
        self.last_push = (millis, sequence);
        format!("{millis:012x}{sequence:04x}")
    }
}

impl RemoteStore for MemoryStore {
    fn subscribe(&self, path: &str, on_snapshot: SnapshotFn) -> Subscription {
        let segments = split(path);
        let (id, current) = {
            let mut inner = self.lock();
            let id = inner.next_listener;
            inner.next_listener += 1;
            inner.listeners.push(Listener {
                id,
                path: segments.clone(),
                on_snapshot: on_snapshot.clone(),
            });
            (id, lookup(&inner.root, &segments).cloned())
        };
        debug!("Listener {id} attached to {path}");
        on_snapshot(current.as_ref());

        let inner: Weak<Mutex<Inner>> = Arc::downgrade(&self.inner);
        Subscription::new(path, move || {
            if let Some(inner) = inner.upgrade() {
                let mut inner = inner.lock().unwrap_or_else(PoisonError::into_inner);
                inner.listeners.retain(|listener| listener.id != id);
                debug!("Listener {id} detached");
            }
        })
    }

    async fn read_once(&self, path: &str) -> Result<Option<Value>, Error> {
        Ok(self.get(path))
    }

    async fn append_new(&self, path: &str, value: Value) -> Result<String, Error> {
        let mut segments = split(path);
        let (key, notifications) = {
            let mut inner = self.lock();
            if let Some(existing) = lookup(&inner.root, &segments)
                && !existing.is_object()
            {
                return Err(Error::Write {
                    path: path.to_string(),
                    message: "not a collection".into(),
                });
            }
            let key = inner.push_key();
            segments.push(key.clone());
            write(&mut inner.root, &segments, value);
            let notifications = inner.notifications(&segments);
            (key, notifications)
        };
        deliver(notifications);
        Ok(key)
    }
}

fn deliver(notifications: Notifications) {
    for (on_snapshot, snapshot) in notifications {
        on_snapshot(snapshot.as_ref());
    }
}

fn split(path: &str) -> Vec<String> {
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect()
}

fn lookup<'a>(root: &'a Value, segments: &[String]) -> Option<&'a Value> {
    let value = segments
        .iter()
        .try_fold(root, |value, segment| value.as_object()?.get(segment))?;
    (!value.is_null()).then_some(value)
}

fn write(root: &mut Value, segments: &[String], value: Value) {
    let Some((last, parents)) = segments.split_last() else {
        *root = value;
        return;
    };
    let mut node = root;
    for segment in parents {
        node = object_mut(node)
            .entry(segment.clone())
            .or_insert(Value::Null);
    }
    let map = object_mut(node);
    if value.is_null() {
        map.remove(last);
    } else {
        map.insert(last.clone(), value);
    }
}

/// Turns `node` into an object if it is anything else.
fn object_mut(node: &mut Value) -> &mut Map<String, Value> {
    if !node.is_object() {
        *node = Value::Object(Map::new());
    }
    match node {
        Value::Object(map) => map,
        _ => unreachable!("node was just made an object"),
    }
}

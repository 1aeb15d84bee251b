use bandobast::prelude::*;
use bandobast::sector::PersonnelOption;
use std::sync::Arc;
use tokio::sync::{Mutex, watch};

pub struct AppState {
    pub session: Mutex<MapSession<MemoryStore>>,
    pub overlays: watch::Receiver<Arc<OverlaySet>>,
    pub personnel_options: watch::Receiver<Arc<[PersonnelOption]>>,
}

impl AppState {
    pub fn new(session: MapSession<MemoryStore>) -> Self {
        let overlays = session.sync().watch_overlays();
        let personnel_options = session.sync().watch_personnel_options();
        Self {
            session: Mutex::new(session),
            overlays,
            personnel_options,
        }
    }
}

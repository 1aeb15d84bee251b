use std::sync::Arc;
use tracing::debug;

use crate::{
    config::Config,
    draw::{DrawError, DrawSession, LayerId},
    sector::{DrawnLayer, SectorId},
    store::RemoteStore,
    submit::SubmitError,
    sync::RemoteSectorSync,
};

/// Everything one map instance needs: the live overlays and the drawing
/// session. Built once per map and torn down with it.
pub struct MapSession<S: RemoteStore> {
    store: Arc<S>,
    config: Config,
    sync: RemoteSectorSync,
    draw: DrawSession,
}

impl<S: RemoteStore> MapSession<S> {
    pub fn open(store: Arc<S>, config: Config) -> Self {
        let sync = RemoteSectorSync::attach(store.as_ref(), &config);
        debug!(
            "Map session attached to {} and {}",
            config.sectors_path, config.personnel_path
        );
        Self {
            store,
            config,
            sync,
            draw: DrawSession::new(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn sync(&self) -> &RemoteSectorSync {
        &self.sync
    }

    pub fn draw(&self) -> &DrawSession {
        &self.draw
    }

    pub fn draw_mut(&mut self) -> &mut DrawSession {
        &mut self.draw
    }

    pub fn handle_draw(&mut self, layer: DrawnLayer) -> Result<LayerId, DrawError> {
        self.draw.handle_draw(layer)
    }

    pub async fn submit(&mut self) -> Result<SectorId, SubmitError> {
        self.draw.submit(self.store.as_ref(), &self.config).await
    }

    /// Detaches both live subscriptions.
    pub fn teardown(self) {
        debug!("Tearing down map session");
        self.sync.detach();
    }
}

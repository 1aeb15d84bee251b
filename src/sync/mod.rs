use serde_json::Value;
use std::{sync::Arc, time::Instant};
use tokio::sync::watch;
use tracing::debug;

mod overlay;
pub use overlay::*;

use crate::{
    config::Config,
    sector::PersonnelOption,
    store::{RemoteStore, Subscription},
};

/// Live projection of the sector collection and the personnel roster.
///
/// The two subscriptions are independent and may fire in any order. Each
/// snapshot is projected in full and swapped in atomically, so a reader never
/// sees a half rebuilt overlay set.
pub struct RemoteSectorSync {
    overlays: watch::Receiver<Arc<OverlaySet>>,
    options: watch::Receiver<Arc<[PersonnelOption]>>,
    subscriptions: Vec<Subscription>,
}

impl RemoteSectorSync {
    pub fn attach<S: RemoteStore>(store: &S, config: &Config) -> Self {
        let (overlay_tx, overlays) = watch::channel(Arc::new(OverlaySet::default()));
        let (options_tx, options) = watch::channel(Arc::<[PersonnelOption]>::from([]));

        let icon = config.marker_icon.clone();
        let sectors = store.subscribe(
            &config.sectors_path,
            Arc::new(move |snapshot: Option<&Value>| {
                let now = Instant::now();
                let projected = project_sectors(snapshot, &icon);
                debug!(
                    "Rendered {} shapes and {} markers in {:?}",
                    projected.shapes.len(),
                    projected.markers.len(),
                    now.elapsed()
                );
                overlay_tx.send_replace(Arc::new(projected));
            }),
        );

        let roster = store.subscribe(
            &config.personnel_path,
            Arc::new(move |snapshot: Option<&Value>| {
                let projected = project_roster(snapshot);
                debug!("Roster has {} personnel options", projected.len());
                options_tx.send_replace(projected.into());
            }),
        );

        Self {
            overlays,
            options,
            subscriptions: vec![sectors, roster],
        }
    }

    /// The overlay set of the latest sector snapshot.
    pub fn overlays(&self) -> Arc<OverlaySet> {
        self.overlays.borrow().clone()
    }

    pub fn personnel_options(&self) -> Arc<[PersonnelOption]> {
        self.options.borrow().clone()
    }

    pub fn watch_overlays(&self) -> watch::Receiver<Arc<OverlaySet>> {
        self.overlays.clone()
    }

    pub fn watch_personnel_options(&self) -> watch::Receiver<Arc<[PersonnelOption]>> {
        self.options.clone()
    }

    pub fn is_attached(&self) -> bool {
        self.subscriptions.iter().any(Subscription::is_active)
    }

    /// Releases both subscriptions. The last rendered state stays readable
    /// through receivers handed out earlier.
    pub fn detach(mut self) {
        for subscription in self.subscriptions.drain(..) {
            debug!("Detaching from {}", subscription.path());
            subscription.cancel();
        }
    }
}

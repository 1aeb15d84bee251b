use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error, info, warn};

mod form;
pub use form::*;

use crate::{
    config::Config,
    sector::{
        DraftSector, DrawnLayer, Geometry, LayerType, SectorId,
        validate::{ring_from_value, rings_from_value, validate_circle, validate_marker},
    },
    shared::{Coordinate, Distance},
    store::RemoteStore,
    submit::{SubmitError, submit_sector},
};

pub type LayerId = u64;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum DrawError {
    #[error("A sector form is already open")]
    FormOpen,
    #[error("Rejected malformed {0} geometry")]
    Rejected(LayerType),
    #[error("Marker coordinates are undefined")]
    MissingCoordinates,
}

/// `Idle → FormOpen → Idle`. Accepting a shape, submitting and cancelling
/// are the transitions; none of them leaves the session in between.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionState {
    #[default]
    Idle,
    FormOpen,
}

/// Outcome of the last submission, for the form UI to show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "camelCase")]
pub enum Notice {
    Saved(SectorId),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrawnLayerEntry {
    pub id: LayerId,
    pub geometry: Geometry,
    /// Persisted as part of a sector.
    pub committed: bool,
}

/// Shapes drawn on the map by this session.
#[derive(Debug, Clone, Default)]
pub struct DrawnLayers {
    layers: Vec<DrawnLayerEntry>,
    next_id: LayerId,
}

impl DrawnLayers {
    fn add(&mut self, geometry: Geometry) -> LayerId {
        let id = self.next_id;
        self.next_id += 1;
        self.layers.push(DrawnLayerEntry {
            id,
            geometry,
            committed: false,
        });
        id
    }

    /// Erases a drawn layer from the map.
    pub fn remove(&mut self, id: LayerId) -> Option<Geometry> {
        let index = self.layers.iter().position(|layer| layer.id == id)?;
        Some(self.layers.remove(index).geometry)
    }

    pub fn get(&self, id: LayerId) -> Option<&DrawnLayerEntry> {
        self.layers.iter().find(|layer| layer.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DrawnLayerEntry> {
        self.layers.iter()
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Coordinate rings of every path layer not yet persisted.
    pub fn uncommitted_rings(&self) -> Vec<Vec<Coordinate>> {
        self.uncommitted_paths()
            .flat_map(|layer| layer.geometry.rings())
            .collect()
    }

    fn uncommitted_paths(&self) -> impl Iterator<Item = &DrawnLayerEntry> {
        self.layers
            .iter()
            .filter(|layer| !layer.committed && layer.geometry.is_path())
    }

    /// Marks the layers whose geometry went into a stored sector: every
    /// uncommitted path plus the layer the form was opened for.
    fn commit_stored(&mut self, open_layer: Option<LayerId>) {
        self.layers
            .iter_mut()
            .filter(|layer| {
                !layer.committed && (layer.geometry.is_path() || Some(layer.id) == open_layer)
            })
            .for_each(|layer| layer.committed = true);
    }
}

/// The single drawing session of a map: the drawn layers and at most one
/// open sector form.
#[derive(Debug, Default)]
pub struct DrawSession {
    state: SessionState,
    draft: DraftSector,
    layers: DrawnLayers,
    open_layer: Option<LayerId>,
    notice: Option<Notice>,
}

impl DrawSession {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn draft(&self) -> &DraftSector {
        &self.draft
    }

    pub fn layers(&self) -> &DrawnLayers {
        &self.layers
    }

    pub fn remove_layer(&mut self, id: LayerId) -> Option<Geometry> {
        self.layers.remove(id)
    }

    /// Handles a draw-complete event from the map surface.
    ///
    /// A malformed shape is dropped and never reaches the map. While a form is
    /// open no new shape is accepted.
    pub fn handle_draw(&mut self, layer: DrawnLayer) -> Result<LayerId, DrawError> {
        if self.state == SessionState::FormOpen {
            debug!("Ignoring {} while a form is open", layer.layer_type());
            return Err(DrawError::FormOpen);
        }
        let layer_type = layer.layer_type();
        let geometry = accept(layer).inspect_err(|err| debug!("Dropped {layer_type}: {err}"))?;
        let id = self.layers.add(geometry.clone());
        self.draft = DraftSector::with_geometry(geometry);
        self.open_layer = Some(id);
        self.state = SessionState::FormOpen;
        debug!("Accepted {layer_type} as layer {id}");
        Ok(id)
    }

    /// Field editor for the open form.
    pub fn form(&mut self) -> Option<FormState<'_>> {
        match self.state {
            SessionState::FormOpen => Some(FormState::new(&mut self.draft)),
            SessionState::Idle => None,
        }
    }

    /// Closes the form without saving. The shape stays drawn.
    pub fn cancel(&mut self) -> bool {
        if self.state != SessionState::FormOpen {
            return false;
        }
        self.draft = DraftSector::default();
        self.open_layer = None;
        self.state = SessionState::Idle;
        debug!("Sector form cancelled");
        true
    }

    /// Saves the open form as a new sector.
    ///
    /// On failure the draft and the drawn layers are left as they were so the
    /// user can submit again.
    pub async fn submit<S: RemoteStore>(
        &mut self,
        store: &S,
        config: &Config,
    ) -> Result<SectorId, SubmitError> {
        if self.state != SessionState::FormOpen {
            return Err(SubmitError::FormClosed);
        }
        match submit_sector(store, config, &self.draft, &self.layers).await {
            Ok(id) => {
                info!("Sector {id} saved");
                self.layers.commit_stored(self.open_layer.take());
                self.draft = DraftSector::default();
                self.state = SessionState::Idle;
                self.notice = Some(Notice::Saved(id.clone()));
                Ok(id)
            }
            Err(err) => {
                error!("Error saving sector: {err}");
                self.notice = Some(Notice::Failed(err.to_string()));
                Err(err)
            }
        }
    }

    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }
}

fn accept(layer: DrawnLayer) -> Result<Geometry, DrawError> {
    let layer_type = layer.layer_type();
    let geometry = match layer {
        DrawnLayer::Rectangle { coordinates } | DrawnLayer::Polygon { coordinates } => {
            rings_from_value(&coordinates).map(|rings| Geometry::Polygon { rings })
        }
        DrawnLayer::Polyline { coordinates } => {
            ring_from_value(&coordinates).map(|points| Geometry::Polyline { points })
        }
        DrawnLayer::Circle { center, radius } => {
            if validate_circle(center.as_ref(), radius) {
                center
                    .and_then(|center| center.coordinate())
                    .zip(radius)
                    .map(|(center, radius)| Geometry::Circle {
                        center,
                        radius: Distance::from_meters(radius),
                    })
            } else {
                None
            }
        }
        DrawnLayer::Marker { lat, lng } => {
            if !validate_marker(lat, lng) {
                warn!("Marker coordinates are undefined");
                return Err(DrawError::MissingCoordinates);
            }
            lat.zip(lng)
                .map(|(lat, lng)| Geometry::Marker {
                    position: Coordinate::new(lat, lng),
                })
        }
    };
    geometry
        .filter(Geometry::is_valid)
        .ok_or(DrawError::Rejected(layer_type))
}

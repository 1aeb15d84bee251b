pub mod config;
pub mod draw;
pub mod sector;
pub mod session;
pub mod shared;
pub mod store;
pub mod submit;
pub mod sync;

pub mod prelude {
    pub use crate::config::{Config, MarkerIcon};
    pub use crate::draw::{
        DrawError, DrawSession, DrawnLayers, FormError, FormState, FormUpdate, LayerId, Notice,
        SessionState,
    };
    pub use crate::sector::{
        DraftSector, DrawnLayer, Geometry, LayerType, PersistedSector, PersonnelOption,
        PersonnelRecord, SectorRecord, validate_coordinates,
    };
    pub use crate::session::MapSession;
    pub use crate::shared::{Coordinate, Distance, LatLng};
    pub use crate::store::{MemoryStore, RemoteStore, Subscription};
    pub use crate::submit::{SubmitError, submit_sector};
    pub use crate::sync::{OverlaySet, RemoteSectorSync, Shape};
}

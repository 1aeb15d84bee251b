mod models;
pub mod record;
pub mod validate;

pub use models::*;
pub use record::{CircleRecord, SectorRecord};
pub use validate::{validate_circle, validate_coordinates, validate_marker};

mod draft;
mod overlays;

pub use draft::*;
pub use overlays::*;

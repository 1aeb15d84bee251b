mod draft;
pub use draft::*;

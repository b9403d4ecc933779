//! The asset manifest model and its on-disk representation.

mod io;
mod model;

pub use io::{load_manifest, parse_manifest, render_manifest, save_manifest};
pub use model::Manifest;

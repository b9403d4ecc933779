//! Helpers for deriving hashed filenames and mapping manifest paths onto disk.
//!
//! The rewrite logic is kept free of filesystem access so it can be tested on its own;
//! the physical helpers only join and escape paths.

mod physical;
mod versioned;

pub use physical::{physical_glob, physical_path};
pub use versioned::{VERSION_MARKER, VersionedName, rewrite_filename, stale_glob};

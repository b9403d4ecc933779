#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod asset_paths;
pub mod config;
pub mod error;
pub mod manifest;
pub mod models;
pub mod reconcile;
pub mod rehasher;
pub mod selection;

pub use config::{DeleteOptions, RehashOptions};
pub use error::{RehashError, Result};
pub use manifest::Manifest;
pub use models::{EntryOutcome, RehashReport};
pub use rehasher::{ManifestRehasher, run};
pub use selection::Blacklist;

//! Filesystem reconciliation primitives used by the rehash pipeline.

mod copy;
mod delete;

pub use copy::copy_asset;
pub use delete::{GlobDeletion, delete_glob, delete_path};

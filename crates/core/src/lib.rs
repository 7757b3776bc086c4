//! Tool bundle distribution for tooldist.
//!
//! This crate provides functionality to:
//! - Name versioned, platform-specific tool bundles inside a blob store
//! - Package a directory of executables as a gzipped tarball and upload it
//! - List the bundles in a store and resolve the ones matching a version
//! - Download and unpack a resolved bundle
//!
//! # Example
//!
//! ```ignore
//! use tooldist_core::tools::{self, VersionFilter};
//! use tooldist_storage::FileStorage;
//!
//! let store = FileStorage::new("/var/lib/tooldist");
//! let list = tools::read_list(&store, "released", VersionFilter::major(2))?;
//! let newest = list.newest();
//! ```

#![warn(missing_docs)]

pub mod config;
mod error;
pub mod tools;

pub use config::Config;
pub use error::{Error, Result};

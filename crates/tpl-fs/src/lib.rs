//! Filesystem layer for Template Manager
//!
//! Provides normalized path handling, atomic writes, size-capped reads,
//! checksums, and format-dispatched configuration I/O. Everything above this
//! crate manipulates the configuration tree exclusively through these
//! primitives.

pub mod checksum;
pub mod config;
pub mod constants;
pub mod error;
pub mod io;
pub mod path;

pub use config::ConfigStore;
pub use constants::TemplatePath;
pub use error::{Error, Result};
pub use io::MAX_CONFIG_FILE_BYTES;
pub use path::NormalizedPath;

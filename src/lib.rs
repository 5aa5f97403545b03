//! cipherpath - Name resolution for an encrypted overlay filesystem
//!
//! This library decides, for every path the filesystem driver hands over,
//! which on-disk path to operate on: case-insensitive lookups over a
//! case-sensitive store, alternate data stream names, and the synthetic files
//! of reverse (export) mounts. Name encryption itself is delegated to a
//! [`crypto::PathCodec`].

pub mod cache;
pub mod config;
pub mod crypto;
pub mod error;
pub mod fs;
pub mod path;

pub use config::Config;
pub use error::{Error, Result, TranslationFailure};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::cache::CaseCache;
    pub use crate::config::Config;
    pub use crate::crypto::PathCodec;
    pub use crate::error::{Error, Result, TranslationFailure};
    pub use crate::fs::{ResolveContext, ResolvedPath};
}

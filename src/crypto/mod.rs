//! Name codec contract
//!
//! The actual name encryption (per-directory IVs, key derivation, long name
//! hashing) lives behind [`PathCodec`]. The resolver only decides which path
//! goes through the codec.

mod passthrough;

pub use passthrough::PassthroughCodec;

use crate::error::Result;

/// Output of a forward (plaintext to ciphertext) encoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedPath {
    /// Full on-disk path
    pub path: String,
    /// Full encrypted leaf name when the on-disk leaf is a shortened
    /// long-name form
    pub actual_encrypted: Option<String>,
}

impl EncodedPath {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            actual_encrypted: None,
        }
    }
}

/// Encrypts and decrypts whole virtual paths.
///
/// Both directions are treated as pure functions of the path; a failure is
/// final and is never retried.
pub trait PathCodec: Send + Sync {
    /// Map a plaintext virtual path to its on-disk ciphertext path
    fn encode_forward(&self, plain_path: &str) -> Result<EncodedPath>;

    /// Map a ciphertext-looking virtual path (reverse mode) to the on-disk
    /// plaintext path
    fn decode_reverse(&self, cipher_path: &str) -> Result<String>;
}

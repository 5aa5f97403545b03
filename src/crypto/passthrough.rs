//! Identity codec for plaintext trees and diagnostics

use super::{EncodedPath, PathCodec};
use crate::error::{Error, Result};
use crate::path::{join, SEPARATOR};

/// Maps `\a\b` to `<root>\a\b` in both directions without encrypting.
///
/// Only meant for inspecting resolution against an unencrypted tree.
#[derive(Debug, Clone)]
pub struct PassthroughCodec {
    root: String,
}

impl PassthroughCodec {
    pub fn new(root: impl Into<String>) -> Self {
        Self { root: root.into() }
    }

    fn map(&self, path: &str) -> Result<String> {
        if !path.starts_with(SEPARATOR) {
            return Err(Error::InvalidPath(format!("not absolute: {}", path)));
        }
        Ok(join(&self.root, path))
    }
}

impl PathCodec for PassthroughCodec {
    fn encode_forward(&self, plain_path: &str) -> Result<EncodedPath> {
        self.map(plain_path).map(EncodedPath::new)
    }

    fn decode_reverse(&self, cipher_path: &str) -> Result<String> {
        self.map(cipher_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_maps_under_root() {
        let codec = PassthroughCodec::new("C:\\vault");
        assert_eq!(
            codec.encode_forward("\\Docs\\a.txt").unwrap().path,
            "C:\\vault\\Docs\\a.txt"
        );
        assert_eq!(codec.decode_reverse("\\").unwrap(), "C:\\vault\\");
    }

    #[test]
    fn test_rejects_relative() {
        let codec = PassthroughCodec::new("C:\\vault");
        assert!(codec.encode_forward("Docs").is_err());
    }
}

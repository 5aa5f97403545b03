//! Synthetic files exposed by reverse (export) mounts
//!
//! A reverse mount shows an encrypted view of a plaintext tree. Some files in
//! that view do not exist anywhere on disk: the config descriptor at the root,
//! the per-directory IV file and the long-name companion files.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::path::{fold_case, join, leaf, ROOT};
use regex::Regex;

/// What a reverse mode path refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathClassification {
    /// The config descriptor at the root of the export view
    ConfigDescriptor,
    /// A synthetic per-directory file
    VirtualDirectoryListing,
    /// Anything else; goes through the reverse codec
    Regular,
}

/// Recognizes synthetic reverse mode paths
#[derive(Debug, Clone)]
pub struct VirtualPathClassifier {
    /// Folded `\<config name>`
    config_path: String,
    /// On-disk location of the config descriptor
    config_target: String,
    /// Folded IV file name
    dir_iv_name: String,
    longname: Regex,
}

impl VirtualPathClassifier {
    pub fn new(config: &Config) -> Result<Self> {
        let names = &config.names;
        let pattern = format!(
            r"(?i)^{}[A-Za-z0-9_=-]+{}$",
            regex::escape(&names.longname_prefix),
            regex::escape(&names.longname_suffix)
        );
        let longname = Regex::new(&pattern)
            .map_err(|e| Error::InvalidConfig(format!("long name pattern: {}", e)))?;

        Ok(Self {
            config_path: fold_case(&join(ROOT, &names.config_name)),
            config_target: join(&config.mount.root_dir, &names.reverse_config_name),
            dir_iv_name: fold_case(&names.dir_iv_name),
            longname,
        })
    }

    /// Classify a path of the export view
    pub fn classify(&self, path: &str) -> PathClassification {
        if fold_case(path) == self.config_path {
            return PathClassification::ConfigDescriptor;
        }

        match leaf(path) {
            Some(name) if self.is_virtual_leaf(name) => {
                PathClassification::VirtualDirectoryListing
            }
            _ => PathClassification::Regular,
        }
    }

    /// On-disk path backing the config descriptor
    pub fn config_target(&self) -> &str {
        &self.config_target
    }

    fn is_virtual_leaf(&self, name: &str) -> bool {
        fold_case(name) == self.dir_iv_name || self.longname.is_match(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> VirtualPathClassifier {
        VirtualPathClassifier::new(&Config::with_root("C:\\plain")).unwrap()
    }

    #[test]
    fn test_config_descriptor() {
        let c = classifier();
        assert_eq!(c.classify("\\gocryptfs.conf"), PathClassification::ConfigDescriptor);
        assert_eq!(c.classify("\\GOCRYPTFS.CONF"), PathClassification::ConfigDescriptor);
        assert_eq!(c.config_target(), "C:\\plain\\.gocryptfs.reverse.conf");
    }

    #[test]
    fn test_config_name_below_root_is_regular() {
        let c = classifier();
        assert_eq!(c.classify("\\sub\\gocryptfs.conf"), PathClassification::Regular);
    }

    #[test]
    fn test_dir_iv_listing() {
        let c = classifier();
        assert_eq!(
            c.classify("\\abc\\gocryptfs.diriv"),
            PathClassification::VirtualDirectoryListing
        );
        assert_eq!(
            c.classify("\\gocryptfs.diriv"),
            PathClassification::VirtualDirectoryListing
        );
    }

    #[test]
    fn test_longname_companion() {
        let c = classifier();
        assert_eq!(
            c.classify("\\abc\\gocryptfs.longname.kNQv7Pl1h-_Qr0wXyz=.name"),
            PathClassification::VirtualDirectoryListing
        );
        // The long-name file itself is a real ciphertext entry
        assert_eq!(
            c.classify("\\abc\\gocryptfs.longname.kNQv7Pl1h"),
            PathClassification::Regular
        );
    }

    #[test]
    fn test_regular() {
        let c = classifier();
        assert_eq!(c.classify("\\abc\\def"), PathClassification::Regular);
        assert_eq!(c.classify("\\"), PathClassification::Regular);
    }

    #[test]
    fn test_custom_names() {
        let mut config = Config::with_root("D:\\data");
        config.names.config_name = "export.conf".to_string();
        config.names.dir_iv_name = "dir.iv".to_string();
        let c = VirtualPathClassifier::new(&config).unwrap();

        assert_eq!(c.classify("\\export.conf"), PathClassification::ConfigDescriptor);
        assert_eq!(c.classify("\\x\\dir.iv"), PathClassification::VirtualDirectoryListing);
        assert_eq!(c.classify("\\x\\gocryptfs.diriv"), PathClassification::Regular);
    }
}

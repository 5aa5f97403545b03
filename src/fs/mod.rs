//! Virtual namespace translation
//!
//! Turns the paths received from the filesystem driver into the paths that
//! are actually read and written on the storage tree.

pub mod resolver;
pub mod scan;
pub mod stream;
pub mod virtual_path;

pub use resolver::{ConversionRequest, PathResolver, ResolveContext, ResolveMode, ResolvedPath};
pub use scan::{DirectoryScanner, FsDirectoryScanner};
pub use stream::{NoStreams, StreamDescriptor, StreamEnumerator, StreamMap};
pub use virtual_path::{PathClassification, VirtualPathClassifier};

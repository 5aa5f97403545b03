//! Alternate data stream name handling
//!
//! A name may carry one stream suffix: `base:stream:type`. The stream name is
//! matched case-insensitively against the streams that really exist on the
//! base file; the type tag (e.g. `$DATA`) is carried through untouched.

use crate::error::{Error, Result};
use crate::path::{fold_case, is_root, SEPARATOR};
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

/// Folded stream name -> true-case stream name for one base file
pub type StreamMap = HashMap<String, String>;

/// Enumerates the named streams of a file.
///
/// Keys of the returned map must be folded with [`fold_case`].
pub trait StreamEnumerator: Send + Sync {
    fn enumerate_streams(&self, base: &str) -> Result<StreamMap>;
}

/// Enumerator for storage without named streams
#[derive(Debug, Default, Clone, Copy)]
pub struct NoStreams;

impl StreamEnumerator for NoStreams {
    fn enumerate_streams(&self, _base: &str) -> Result<StreamMap> {
        Ok(StreamMap::new())
    }
}

/// Undo the host driver quirk that inserts a separator before the stream colon.
///
/// `\dir\file.txt\:blah:$DATA` becomes `\dir\file.txt:blah:$DATA`. Exactly one
/// separator is removed, and only when the first colon is not the first
/// character of the path.
pub fn repair_separator(path: &str) -> Cow<'_, str> {
    let colon = match path.find(':') {
        Some(idx) if idx > 0 => idx,
        _ => return Cow::Borrowed(path),
    };

    if !path[..colon].ends_with(SEPARATOR) {
        return Cow::Borrowed(path);
    }

    let repaired = format!("{}{}", &path[..colon - 1], &path[colon..]);
    debug!("converted stream path {} -> {}", path, repaired);
    Cow::Owned(repaired)
}

/// Split a path at its first colon into the base and the `:stream[:type]` suffix
pub fn split_stream(path: &str) -> (&str, Option<&str>) {
    match path.find(':') {
        Some(idx) => (&path[..idx], Some(&path[idx..])),
        None => (path, None),
    }
}

/// Split a `:stream:type` suffix into the bare stream name and the type tag.
///
/// The type tag keeps its leading colon and is empty when absent.
pub fn remove_stream_type(suffix: &str) -> Result<(&str, &str)> {
    let rest = suffix
        .strip_prefix(':')
        .ok_or_else(|| Error::MalformedStream(suffix.to_string()))?;

    match rest.find(':') {
        Some(idx) => Ok((&rest[..idx], &rest[idx..])),
        None => Ok((rest, "")),
    }
}

/// A name decomposed into base, stream and stream type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamDescriptor {
    pub base: String,
    pub stream: Option<String>,
    pub stream_type: Option<String>,
}

impl StreamDescriptor {
    /// Repair the separator quirk, then decompose
    pub fn split(name: &str) -> Result<Self> {
        Self::parse(&repair_separator(name))
    }

    /// Decompose a name that is already repaired
    pub fn parse(name: &str) -> Result<Self> {
        let (base, suffix) = split_stream(name);
        let Some(suffix) = suffix else {
            return Ok(Self {
                base: base.to_string(),
                stream: None,
                stream_type: None,
            });
        };

        let (stream, type_tag) = remove_stream_type(suffix)?;
        Ok(Self {
            base: base.to_string(),
            stream: Some(stream.to_string()),
            stream_type: type_tag.strip_prefix(':').map(str::to_string),
        })
    }

    /// Whether a named (non-default) stream is addressed
    pub fn has_named_stream(&self) -> bool {
        self.stream.as_deref().is_some_and(|s| !s.is_empty())
    }

    /// Rebuild the stream using the true case recorded in `streams`.
    ///
    /// Returns `None` when the stream is not in the map; the caller keeps the
    /// original descriptor in that case.
    pub fn with_true_case(&self, streams: &StreamMap) -> Option<Self> {
        let stream = self.stream.as_deref()?;
        let true_case = streams.get(&fold_case(stream))?;
        Some(Self {
            base: self.base.clone(),
            stream: Some(true_case.clone()),
            stream_type: self.stream_type.clone(),
        })
    }

    /// Resolve the stream case against the real streams of the base file.
    ///
    /// Unnamed streams and streams on the root are never enumerated.
    pub fn resolve_case(&self, enumerator: &dyn StreamEnumerator) -> Result<Self> {
        if !self.has_named_stream() || self.base.is_empty() || is_root(&self.base) {
            return Ok(self.clone());
        }

        let streams = enumerator.enumerate_streams(&self.base)?;
        Ok(self.with_true_case(&streams).unwrap_or_else(|| self.clone()))
    }
}

impl fmt::Display for StreamDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.base)?;
        if let Some(stream) = &self.stream {
            write!(f, ":{}", stream)?;
            if let Some(stream_type) = &self.stream_type {
                write!(f, ":{}", stream_type)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedStreams {
        streams: Vec<&'static str>,
        calls: AtomicUsize,
    }

    impl FixedStreams {
        fn new(streams: Vec<&'static str>) -> Self {
            Self {
                streams,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl StreamEnumerator for FixedStreams {
        fn enumerate_streams(&self, _base: &str) -> Result<StreamMap> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self
                .streams
                .iter()
                .map(|s| (fold_case(s), s.to_string()))
                .collect())
        }
    }

    #[test]
    fn test_repair_extra_separator() {
        assert_eq!(
            repair_separator("\\dir\\file.txt\\:blah:$DATA"),
            "\\dir\\file.txt:blah:$DATA"
        );
    }

    #[test]
    fn test_repair_not_applied() {
        let clean = "\\dir\\file.txt:blah:$DATA";
        assert!(matches!(repair_separator(clean), Cow::Borrowed(_)));
        assert_eq!(repair_separator(clean), clean);

        let plain = "\\dir\\file.txt";
        assert_eq!(repair_separator(plain), plain);

        // Colon in first position is left alone
        assert_eq!(repair_separator(":blah:$DATA"), ":blah:$DATA");
    }

    #[test]
    fn test_repair_removes_only_one_separator() {
        assert_eq!(repair_separator("\\a\\\\:s"), "\\a\\:s");
    }

    #[test]
    fn test_split_repairs_then_decomposes() {
        let desc = StreamDescriptor::split("\\dir\\file.txt\\:blah:$DATA").unwrap();
        assert_eq!(desc.base, "\\dir\\file.txt");
        assert_eq!(desc.stream.as_deref(), Some("blah"));
        assert_eq!(desc.stream_type.as_deref(), Some("$DATA"));
        assert_eq!(desc.to_string(), "\\dir\\file.txt:blah:$DATA");
    }

    #[test]
    fn test_split_without_stream() {
        let desc = StreamDescriptor::split("\\dir\\file.txt").unwrap();
        assert_eq!(desc.base, "\\dir\\file.txt");
        assert!(desc.stream.is_none());
        assert!(desc.stream_type.is_none());
        assert!(!desc.has_named_stream());
    }

    #[test]
    fn test_split_stream_without_type() {
        let desc = StreamDescriptor::split("\\file.txt:blah").unwrap();
        assert_eq!(desc.stream.as_deref(), Some("blah"));
        assert!(desc.stream_type.is_none());
        assert_eq!(desc.to_string(), "\\file.txt:blah");
    }

    #[test]
    fn test_remove_stream_type() {
        assert_eq!(remove_stream_type(":blah:$DATA").unwrap(), ("blah", ":$DATA"));
        assert_eq!(remove_stream_type(":blah").unwrap(), ("blah", ""));
        assert_eq!(remove_stream_type("::$DATA").unwrap(), ("", ":$DATA"));
        assert!(remove_stream_type("blah").is_err());
    }

    #[test]
    fn test_resolve_case_match_keeps_type() {
        let streams = FixedStreams::new(vec!["Zone.Identifier", "Blah"]);
        let desc = StreamDescriptor::parse("\\f.txt:BLAH:$DATA").unwrap();

        let resolved = desc.resolve_case(&streams).unwrap();
        assert_eq!(resolved.to_string(), "\\f.txt:Blah:$DATA");
        assert_eq!(streams.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_resolve_case_no_match_unchanged() {
        let streams = FixedStreams::new(vec!["Other"]);
        let desc = StreamDescriptor::parse("\\f.txt:blah:$DATA").unwrap();

        let resolved = desc.resolve_case(&streams).unwrap();
        assert_eq!(resolved, desc);
    }

    #[test]
    fn test_unnamed_stream_not_enumerated() {
        let streams = FixedStreams::new(vec!["blah"]);
        let desc = StreamDescriptor::parse("\\f.txt::$DATA").unwrap();

        let resolved = desc.resolve_case(&streams).unwrap();
        assert_eq!(resolved.to_string(), "\\f.txt::$DATA");
        assert_eq!(streams.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_root_stream_not_enumerated() {
        let streams = FixedStreams::new(vec!["blah"]);
        let desc = StreamDescriptor::parse("\\:blah:$DATA").unwrap();

        assert_eq!(desc.resolve_case(&streams).unwrap(), desc);
        assert_eq!(streams.calls.load(Ordering::SeqCst), 0);
    }
}

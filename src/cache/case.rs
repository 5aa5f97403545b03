//! Case-preserving name cache
//!
//! Maps case-folded names to their true on-disk spelling, one table per
//! directory. Tables are only ever built from a complete directory scan and
//! expire after a configurable time-to-live.

use super::clock::{Clock, SystemClock};
use crate::config::CaseCacheConfig;
use crate::fs::scan::DirectoryScanner;
use crate::fs::stream::split_stream;
use crate::path::{fold_case, is_root, join, parent, split_parent, ROOT, SEPARATOR};
use dashmap::DashMap;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, trace, warn};

/// Result of a case cache lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheLookup {
    /// The name exists; carries the path in its true case
    Found(String),
    /// The directory was scanned and holds no such name; carries the path
    /// with the directory part in its true case
    NotFound(String),
    /// No usable answer: directory not scanned, entry expired, or miss forced
    Miss,
    /// Case-insensitive resolution is disabled
    NotApplicable,
}

impl CacheLookup {
    /// Corrected path for conclusive outcomes
    pub fn corrected(&self) -> Option<&str> {
        match self {
            CacheLookup::Found(path) | CacheLookup::NotFound(path) => Some(path),
            CacheLookup::Miss | CacheLookup::NotApplicable => None,
        }
    }
}

/// Snapshot of one scanned directory
#[derive(Debug)]
struct DirNode {
    /// Directory path in its true case
    true_path: String,
    /// Folded leaf name -> true-case leaf name
    entries: HashMap<String, String>,
    /// Time the scan that produced this node started
    scanned_at: Instant,
}

/// Process-wide case cache shared by all resolvers
pub struct CaseCache {
    enabled: bool,
    ttl: Duration,
    /// Folded directory path -> scanned directory
    nodes: DashMap<String, Arc<DirNode>>,
    /// Folded directory path -> in-flight scan guard
    scans: DashMap<String, Arc<Mutex<()>>>,
    scanner: Arc<dyn DirectoryScanner>,
    clock: Arc<dyn Clock>,
}

impl CaseCache {
    /// Create a cache driven by the mount configuration
    pub fn new(config: &CaseCacheConfig, scanner: Arc<dyn DirectoryScanner>) -> Self {
        Self::with_clock(config, scanner, Arc::new(SystemClock))
    }

    /// Create a cache with an explicit time source
    pub fn with_clock(
        config: &CaseCacheConfig,
        scanner: Arc<dyn DirectoryScanner>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            enabled: config.case_insensitive,
            ttl: config.ttl(),
            nodes: DashMap::new(),
            scans: DashMap::new(),
            scanner,
            clock,
        }
    }

    /// Whether lookups are answered at all
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Current time according to the cache's clock
    pub fn now(&self) -> Instant {
        self.clock.now()
    }

    /// Look up the true case of `path`.
    ///
    /// A stream suffix is ignored for the lookup and reattached verbatim to
    /// the corrected path.
    pub fn lookup(&self, path: &str, force_miss: bool) -> CacheLookup {
        if !self.enabled {
            return CacheLookup::NotApplicable;
        }
        if force_miss {
            return CacheLookup::Miss;
        }

        let (base, suffix) = split_stream(path);
        if is_root(base) {
            return CacheLookup::Found(path.to_string());
        }
        let Some((dir, leaf)) = split_parent(base) else {
            return CacheLookup::Miss;
        };

        let Some(node) = self.fresh_node(&fold_case(dir)) else {
            return CacheLookup::Miss;
        };

        let suffix = suffix.unwrap_or("");
        match node.entries.get(&fold_case(leaf)) {
            Some(true_leaf) => {
                CacheLookup::Found(join(&node.true_path, true_leaf) + suffix)
            }
            None => CacheLookup::NotFound(join(&node.true_path, leaf) + suffix),
        }
    }

    /// Scan the parent directory of `path` and replace its table.
    ///
    /// Returns whether the scan succeeded.
    pub fn load_directory(&self, path: &str) -> bool {
        self.load_directory_since(path, None)
    }

    /// Like [`load_directory`](Self::load_directory), but skips the scan when
    /// another caller already completed one that started at or after `since`.
    pub fn load_directory_since(&self, path: &str, since: Option<Instant>) -> bool {
        let (base, _) = split_stream(path);
        if is_root(base) {
            return true;
        }
        let Some(dir) = parent(base) else {
            return false;
        };
        let true_dir = self.true_case_dir(dir, since);
        self.scan_directory(&true_dir, since)
    }

    /// Drop the table of a directory so the next lookup rescans it
    pub fn invalidate_directory(&self, dir: &str) {
        self.nodes.remove(&fold_case(dir));
    }

    /// Remove every expired table
    pub fn purge_expired(&self) {
        let now = self.clock.now();
        self.nodes.retain(|_, node| !self.is_expired(node, now));
        self.scans.retain(|_, guard| Arc::strong_count(guard) > 1);
    }

    /// Remove everything
    pub fn clear(&self) {
        self.nodes.clear();
        self.scans.clear();
    }

    /// Number of cached directories
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn is_expired(&self, node: &DirNode, now: Instant) -> bool {
        !self.ttl.is_zero() && now.saturating_duration_since(node.scanned_at) >= self.ttl
    }

    fn fresh_node(&self, key: &str) -> Option<Arc<DirNode>> {
        let node = self.nodes.get(key).map(|n| Arc::clone(n.value()))?;
        if self.is_expired(&node, self.clock.now()) {
            self.nodes.remove_if(key, |_, current| Arc::ptr_eq(current, &node));
            trace!("case cache entry for {} expired", node.true_path);
            return None;
        }
        Some(node)
    }

    /// Scan one directory whose path is already in its true case.
    ///
    /// The directory's guard is held for this scan only.
    fn scan_directory(&self, true_dir: &str, since: Option<Instant>) -> bool {
        let key = fold_case(true_dir);
        let guard = self.scans.entry(key.clone()).or_default().value().clone();
        let _scan = guard.lock();

        if let Some(since) = since {
            if let Some(node) = self.fresh_node(&key) {
                if node.scanned_at >= since {
                    trace!("reusing concurrent scan of {}", node.true_path);
                    return true;
                }
            }
        }

        let started = self.clock.now();

        match self.scanner.list(true_dir) {
            Ok(names) => {
                let entries: HashMap<String, String> = names
                    .into_iter()
                    .map(|name| (fold_case(&name), name))
                    .collect();
                debug!("case cache loaded {} ({} entries)", true_dir, entries.len());
                self.nodes.insert(
                    key,
                    Arc::new(DirNode {
                        true_path: true_dir.to_string(),
                        entries,
                        scanned_at: started,
                    }),
                );
                true
            }
            Err(e) => {
                warn!("case cache scan of {} failed: {}", true_dir, e);
                false
            }
        }
    }

    /// True case of a directory path, walked down from the root.
    ///
    /// Each ancestor's table is consulted and scanned on a miss. Once an
    /// ancestor cannot be scanned or does not list the next segment, the rest
    /// of the path is kept as given.
    fn true_case_dir(&self, dir: &str, since: Option<Instant>) -> String {
        let mut true_path = ROOT.to_string();
        let mut segments = dir.split(SEPARATOR).filter(|segment| !segment.is_empty());

        for segment in segments.by_ref() {
            let candidate = join(&true_path, segment);
            let mut outcome = self.lookup(&candidate, false);
            if outcome == CacheLookup::Miss && self.scan_directory(&true_path, since) {
                outcome = self.lookup(&candidate, false);
            }

            match outcome {
                CacheLookup::Found(found) => true_path = found,
                CacheLookup::NotFound(_) | CacheLookup::Miss | CacheLookup::NotApplicable => {
                    true_path = candidate;
                    break;
                }
            }
        }

        for segment in segments {
            true_path.push(SEPARATOR);
            true_path.push_str(segment);
        }
        true_path
    }
}

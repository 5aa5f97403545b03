//! Path resolution
//!
//! Every filesystem call builds one [`PathResolver`] for the path it received.
//! In forward mode the resolver corrects the case of the plaintext path and
//! its stream suffix, then encodes it. In reverse mode it maps the export view
//! path to the plaintext file it stands for.
//!
//! A resolver runs its logic once; later calls return the stored outcome.

use super::stream::{repair_separator, StreamDescriptor, StreamEnumerator};
use super::virtual_path::{PathClassification, VirtualPathClassifier};
use crate::cache::{CacheLookup, CaseCache};
use crate::config::Config;
use crate::crypto::PathCodec;
use crate::error::{Error, Result, TranslationFailure};
use crate::path::{join, split_parent};
use std::borrow::Cow;
use std::sync::Arc;
use tracing::{debug, trace};

/// Direction of translation for a mount
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveMode {
    /// Plaintext view over ciphertext storage
    Forward,
    /// Ciphertext (export) view over plaintext storage
    Reverse,
}

/// Mount-wide state shared by all resolvers
pub struct ResolveContext {
    mode: ResolveMode,
    cache: Arc<CaseCache>,
    codec: Arc<dyn PathCodec>,
    streams: Arc<dyn StreamEnumerator>,
    classifier: VirtualPathClassifier,
}

impl ResolveContext {
    pub fn new(
        config: &Config,
        cache: Arc<CaseCache>,
        codec: Arc<dyn PathCodec>,
        streams: Arc<dyn StreamEnumerator>,
    ) -> Result<Self> {
        let mode = if config.mount.reverse {
            ResolveMode::Reverse
        } else {
            ResolveMode::Forward
        };

        Ok(Self {
            mode,
            cache,
            codec,
            streams,
            classifier: VirtualPathClassifier::new(config)?,
        })
    }

    pub fn cache(&self) -> &CaseCache {
        &self.cache
    }

    /// Resolve one path for one filesystem call
    pub fn resolve(
        &self,
        plain_path: &str,
        force_cache_miss: bool,
    ) -> std::result::Result<ResolvedPath, TranslationFailure> {
        let mut resolver = PathResolver::new(self, ConversionRequest::new(plain_path, force_cache_miss));
        resolver.convert().cloned()
    }
}

/// A path as received from the driver layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionRequest {
    plain_path: String,
    force_cache_miss: bool,
}

impl ConversionRequest {
    /// Build a request; a separator wrongly inserted before a stream colon is
    /// removed here
    pub fn new(plain_path: &str, force_cache_miss: bool) -> Self {
        Self {
            plain_path: repair_separator(plain_path).into_owned(),
            force_cache_miss,
        }
    }

    pub fn plain_path(&self) -> &str {
        &self.plain_path
    }

    pub fn force_cache_miss(&self) -> bool {
        self.force_cache_miss
    }
}

/// Successful translation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    path: String,
    actual_encrypted: Option<String>,
    file_existed: bool,
}

impl ResolvedPath {
    fn new(path: String) -> Self {
        Self {
            path,
            actual_encrypted: None,
            file_existed: false,
        }
    }

    /// Path to perform I/O on
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Full encrypted leaf when the on-disk leaf is a long-name form
    pub fn actual_encrypted(&self) -> Option<&str> {
        self.actual_encrypted.as_deref()
    }

    /// Whether the case cache confirmed the file exists
    pub fn file_existed(&self) -> bool {
        self.file_existed
    }
}

#[derive(Debug)]
enum State {
    Unresolved,
    Resolved(ResolvedPath),
    Failed,
}

/// Single-shot translator for one request
pub struct PathResolver<'a> {
    ctx: &'a ResolveContext,
    request: ConversionRequest,
    state: State,
}

impl<'a> PathResolver<'a> {
    pub fn new(ctx: &'a ResolveContext, request: ConversionRequest) -> Self {
        Self {
            ctx,
            request,
            state: State::Unresolved,
        }
    }

    /// Translate the request, running the resolution on first call only
    pub fn convert(&mut self) -> std::result::Result<&ResolvedPath, TranslationFailure> {
        if matches!(self.state, State::Unresolved) {
            self.state = self.attempt();
        }

        match &self.state {
            State::Resolved(resolved) => Ok(resolved),
            State::Unresolved | State::Failed => Err(TranslationFailure),
        }
    }

    fn attempt(&self) -> State {
        let plain = self.request.plain_path();
        let outcome = match self.ctx.mode {
            ResolveMode::Forward => resolve_forward(self.ctx, &self.request),
            ResolveMode::Reverse => resolve_reverse(self.ctx, plain),
        };

        match outcome {
            Ok(resolved) => {
                debug!("converted filename {} => {}", plain, resolved.path);
                State::Resolved(resolved)
            }
            Err(e) => {
                debug!("error converting filename {}: {}", plain, e);
                State::Failed
            }
        }
    }
}

/// Forward mode: case correction, stream case correction, encoding
fn resolve_forward(ctx: &ResolveContext, request: &ConversionRequest) -> Result<ResolvedPath> {
    let mut plain = Cow::Borrowed(request.plain_path());
    let mut file_existed = false;

    if ctx.cache.is_enabled() {
        let requested_at = ctx.cache.now();
        let mut outcome = ctx.cache.lookup(&plain, request.force_cache_miss());
        if outcome == CacheLookup::Miss
            && ctx.cache.load_directory_since(&plain, Some(requested_at))
        {
            outcome = ctx.cache.lookup(&plain, false);
        }

        if let Some(corrected) = outcome.corrected() {
            file_existed = matches!(outcome, CacheLookup::Found(_));
            plain = Cow::Owned(corrected.to_string());
        }

        plain = correct_stream_case(ctx, plain)?;
    }

    let encoded = ctx.codec.encode_forward(&plain)?;
    Ok(ResolvedPath {
        path: encoded.path,
        actual_encrypted: encoded.actual_encrypted,
        file_existed,
    })
}

/// Replace the stream name with its true case when the base file has it
fn correct_stream_case<'p>(ctx: &ResolveContext, plain: Cow<'p, str>) -> Result<Cow<'p, str>> {
    let desc = StreamDescriptor::parse(&plain)?;
    if !desc.has_named_stream() {
        return Ok(plain);
    }

    match desc.resolve_case(ctx.streams.as_ref()) {
        Ok(resolved) if resolved != desc => {
            let corrected = resolved.to_string();
            trace!("stream found {} -> {}", plain, corrected);
            Ok(Cow::Owned(corrected))
        }
        Ok(_) => {
            trace!("stream not found {}", plain);
            Ok(plain)
        }
        Err(e) => {
            trace!("stream enumeration for {} failed: {}", desc.base, e);
            Ok(plain)
        }
    }
}

/// Reverse mode: synthetic files, then the reverse codec
fn resolve_reverse(ctx: &ResolveContext, path: &str) -> Result<ResolvedPath> {
    let resolved = match ctx.classifier.classify(path) {
        PathClassification::ConfigDescriptor => ctx.classifier.config_target().to_string(),
        PathClassification::VirtualDirectoryListing => {
            let (dir, leaf) = split_parent(path)
                .ok_or_else(|| Error::InvalidPath(path.to_string()))?;
            let real_dir = ctx.codec.decode_reverse(dir)?;
            join(&real_dir, leaf)
        }
        PathClassification::Regular => ctx.codec.decode_reverse(path)?,
    };
    Ok(ResolvedPath::new(resolved))
}

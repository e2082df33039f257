// fileref-check/src/resolver.rs

use regex::Regex;
use serde::Serialize;
use std::{borrow::Cow, fs, path::PathBuf, sync::LazyLock};
use tracing::{debug, trace, warn};

use crate::error::ResolveError;

/// Nesting levels past the top-level document that still get substituted.
pub const DEFAULT_MAX_DEPTH: usize = 10;

/// Highest accepted `max_depth`; larger values are clamped. Each level is one
/// stack frame pair, and a file referencing itself twice doubles the work per level.
pub const MAX_DEPTH_LIMIT: usize = 32;

// A path can never contain `}`; there is no escape for it.
static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{file:([^}]+)\}").expect("placeholder pattern compiles"));

/// One `{file:PATH}` occurrence found in a text buffer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Placeholder {
    /// The token exactly as written, braces included.
    pub token: String,
    /// The raw path, before `~` expansion.
    pub path: String,
    /// Byte offsets of the token in the scanned text.
    pub start: usize,
    pub end: usize,
}

/// Lists every placeholder token in `text`, left to right, without touching the filesystem.
pub fn placeholders(text: &str) -> Vec<Placeholder> {
    PLACEHOLDER
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let path = caps.get(1)?;
            Some(Placeholder {
                token: whole.as_str().to_string(),
                path: path.as_str().to_string(),
                start: whole.start(),
                end: whole.end(),
            })
        })
        .collect()
}

/// Escape text so it can sit between the quotes of a JSON string literal.
///
/// Only backslash, double quote, newline, carriage return and tab are
/// rewritten; other control characters pass through untouched and will
/// surface later as a JSON parse failure.
pub fn escape_json_string(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
}

/// Substitutes `{file:PATH}` tokens with the escaped contents of the files they name.
///
/// The home directory used for `~` is fixed at construction so that resolution
/// never consults the process environment.
#[derive(Clone, Debug)]
pub struct Resolver {
    home: String,
    max_depth: usize,
}

impl Resolver {
    pub fn new(home: impl Into<String>) -> Self {
        Self { home: home.into(), max_depth: DEFAULT_MAX_DEPTH }
    }

    /// Values above [`MAX_DEPTH_LIMIT`] are clamped to it.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        if max_depth > MAX_DEPTH_LIMIT {
            warn!(requested = max_depth, limit = MAX_DEPTH_LIMIT, "max depth clamped");
        }
        self.max_depth = max_depth.min(MAX_DEPTH_LIMIT);
        self
    }

    pub fn max_depth(&self) -> usize { self.max_depth }

    /// Textual `~` replacement; every `~` in the path is expanded, not only a leading one.
    pub fn expand_home(&self, path: &str) -> PathBuf {
        PathBuf::from(path.replace('~', &self.home))
    }

    /// Resolve every placeholder in `content`, recursing into referenced files.
    ///
    /// `depth` is the nesting level of `content` itself (0 for the top-level
    /// document). Past `max_depth` the content comes back unchanged, which is
    /// what stops self-referencing files.
    pub fn resolve(&self, content: &str, depth: usize) -> Result<String, ResolveError> {
        if depth > self.max_depth {
            trace!(depth, max_depth = self.max_depth, "depth limit reached, leaving content as is");
            return Ok(content.to_string());
        }

        let mut out = String::with_capacity(content.len());
        let mut last = 0;
        for caps in PLACEHOLDER.captures_iter(content) {
            let (Some(whole), Some(path)) = (caps.get(0), caps.get(1)) else { continue };
            out.push_str(&content[last..whole.start()]);
            out.push_str(&self.substitute(whole.as_str(), path.as_str(), depth)?);
            last = whole.end();
        }
        out.push_str(&content[last..]);
        Ok(out)
    }

    fn substitute<'a>(&self, token: &'a str, raw_path: &str, depth: usize) -> Result<Cow<'a, str>, ResolveError> {
        let path = self.expand_home(raw_path);
        if !path.exists() {
            debug!(path = %path.display(), depth, "referenced file not found, keeping token");
            return Ok(Cow::Borrowed(token));
        }
        let text = fs::read_to_string(&path)
            .map_err(|source| ResolveError::Read { path: path.clone(), depth, source })?;
        let nested = self.resolve(&text, depth + 1)?;
        debug!(path = %path.display(), depth, bytes = nested.len(), "resolved file reference");
        Ok(Cow::Owned(escape_json_string(&nested)))
    }
}

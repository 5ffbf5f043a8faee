//! Render cache for incremental builds.
//!
//! Syntax highlighting dominates the process stage: every code block is
//! tokenized once per theme. This module lets the process stage reuse the
//! rendered HTML of any body it has seen before with the same render
//! parameters.
//!
//! Only the Markdown → HTML render of a body is cached. Front matter and
//! computed fields always come fresh from the scan manifest, so editing a
//! title never needs a cache bust.
//!
//! ## Fragment store
//!
//! Fragments are stored **by content**, never by document:
//!
//! ```text
//! processed/
//! ├── .render-index.json          # render id → documents that used it
//! └── fragments/
//!     └── 3f2a…c9.html            # one file per distinct (body, params)
//! ```
//!
//! A [`RenderKey`] pairs the SHA-256 of a body with the SHA-256 of the
//! render parameters ([`hash_render_params`]). Its [`RenderKey::id`] names
//! the fragment file, so a file's contents are fixed by its name: renaming
//! a document, or swapping the bodies of two documents, finds the right
//! fragment without copying anything. A build reads fragments and writes
//! only the ones it rendered, then rewrites the index from scratch and
//! [`prune`]s fragment files no current document uses.
//!
//! Pass `--no-cache` to `build` or `process` to ignore the index and
//! re-render everything.

use crate::rewrite::classes;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const INDEX_FILENAME: &str = ".render-index.json";
const FRAGMENT_DIR: &str = "fragments";

/// Bump to discard every existing index when its format changes.
const INDEX_VERSION: u32 = 2;

/// Version of the render pipeline output. Bump when the Markdown → HTML
/// conversion changes in a way not captured by themes or class names.
pub const RENDER_VERSION: u32 = 1;

// =========================================================================
// Keys
// =========================================================================

/// Identity of one render: which body, rendered with which parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RenderKey {
    pub source_hash: String,
    pub params_hash: String,
}

impl RenderKey {
    pub fn new(body: &str, params_hash: &str) -> Self {
        Self {
            source_hash: hash_source(body),
            params_hash: params_hash.to_string(),
        }
    }

    /// Stable hex id, used as the fragment file stem.
    pub fn id(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.source_hash.as_bytes());
        hasher.update(b":");
        hasher.update(self.params_hash.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// Path of the fragment file relative to the processed directory.
    pub fn fragment_path(&self) -> String {
        format!("{}/{}.html", FRAGMENT_DIR, self.id())
    }
}

/// SHA-256 hash of a document body, returned as a hex string.
pub fn hash_source(body: &str) -> String {
    format!("{:x}", Sha256::digest(body.as_bytes()))
}

/// SHA-256 hash of the render parameters.
pub fn hash_render_params(light_theme: &str, dark_theme: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(b"render\0");
    hasher.update(RENDER_VERSION.to_le_bytes());
    hasher.update(light_theme.as_bytes());
    hasher.update(b"\0");
    hasher.update(dark_theme.as_bytes());
    for class in classes::ALL {
        hasher.update(b"\0");
        hasher.update(class.as_bytes());
    }
    format!("{:x}", hasher.finalize())
}

// =========================================================================
// Index
// =========================================================================

/// Which fragments the last build produced, and for which documents.
///
/// The document list is informational (it shows up in the JSON for
/// inspection); lookups only need the id.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RenderIndex {
    pub version: u32,
    pub fragments: BTreeMap<String, Vec<String>>,
}

impl Default for RenderIndex {
    fn default() -> Self {
        Self {
            version: INDEX_VERSION,
            fragments: BTreeMap::new(),
        }
    }
}

impl RenderIndex {
    /// Load from the processed directory. A missing, unreadable or
    /// outdated index loads as empty, which just means a full render.
    pub fn load(processed_dir: &Path) -> Self {
        let path = index_path(processed_dir);
        let Ok(content) = fs::read_to_string(&path) else {
            return Self::default();
        };
        match serde_json::from_str::<Self>(&content) {
            Ok(index) if index.version == INDEX_VERSION => index,
            Ok(index) => {
                debug!(found = index.version, expected = INDEX_VERSION, "render index version changed");
                Self::default()
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring unreadable render index");
                Self::default()
            }
        }
    }

    pub fn save(&self, processed_dir: &Path) -> io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(index_path(processed_dir), json)
    }

    /// Cached HTML for `key`, if the last build produced it and its file
    /// is still readable.
    pub fn lookup(&self, key: &RenderKey, processed_dir: &Path) -> Option<String> {
        if !self.fragments.contains_key(&key.id()) {
            return None;
        }
        fs::read_to_string(processed_dir.join(key.fragment_path())).ok()
    }

    /// Note that `document` uses the fragment for `key`.
    pub fn record(&mut self, key: &RenderKey, document: &str) {
        let documents = self.fragments.entry(key.id()).or_default();
        if !documents.iter().any(|d| d == document) {
            documents.push(document.to_string());
        }
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }
}

/// Write the fragment for `key`. The name is derived from the content, so
/// concurrent writers of the same key write the same bytes.
pub fn write_fragment(processed_dir: &Path, key: &RenderKey, html: &str) -> io::Result<()> {
    let path = processed_dir.join(key.fragment_path());
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, html)
}

/// Delete fragment files `index` does not list. Returns how many went.
pub fn prune(processed_dir: &Path, index: &RenderIndex) -> io::Result<usize> {
    let dir = processed_dir.join(FRAGMENT_DIR);
    if !dir.is_dir() {
        return Ok(0);
    }
    let mut removed = 0;
    for entry in fs::read_dir(&dir)? {
        let path = entry?.path();
        let is_fragment = path.extension().is_some_and(|ext| ext == "html");
        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
        if is_fragment && !index.fragments.contains_key(stem) {
            fs::remove_file(&path)?;
            removed += 1;
        }
    }
    Ok(removed)
}

/// Resolve the render index path for a processed directory.
pub fn index_path(processed_dir: &Path) -> PathBuf {
    processed_dir.join(INDEX_FILENAME)
}

// =========================================================================
// Stats
// =========================================================================

/// Summary of cache performance for a build run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CacheStats {
    pub cached: u32,
    pub rendered: u32,
    /// Stale fragment files removed after the build.
    pub pruned: usize,
}

impl CacheStats {
    pub fn total(&self) -> u32 {
        self.cached + self.rendered
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.cached > 0 {
            write!(
                f,
                "{} cached, {} rendered ({} total)",
                self.cached,
                self.rendered,
                self.total()
            )?;
        } else {
            write!(f, "{} rendered", self.rendered)?;
        }
        if self.pruned > 0 {
            write!(f, ", {} stale removed", self.pruned)?;
        }
        Ok(())
    }
}

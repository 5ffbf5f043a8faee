//! Filesystem scanning and manifest generation.
//!
//! Stage 1 of the folio build pipeline. Reads every content file, validates
//! its front matter against the document schema, and attaches the computed
//! fields, producing a [`Manifest`] the later stages consume.
//!
//! ## Directory Structure
//!
//! ```text
//! content/                     # Content root
//! ├── config.toml              # Site configuration (optional)
//! ├── blog/
//! │   ├── hello-world.mdx      # → /blog/hello-world/
//! │   └── my.notes.mdx         # → /blog/my.notes/
//! └── project/
//!     └── weather-app.mdx      # → /portfolio/weather-app/
//! ```
//!
//! Only direct children of `blog/` and `project/` ending in `.mdx` are
//! documents. Other files (drafts as `.txt`, images, dotfiles) are skipped.
//! A missing `blog/` or `project/` directory just means no documents of
//! that kind.
//!
//! ## Validation
//!
//! Every failure is fatal and names the offending file:
//! - front matter missing, unterminated, or not a YAML mapping
//! - required field missing, empty, or of the wrong type
//! - two documents of one kind with the same slug
//!
//! ## Output
//!
//! Documents are ordered newest first by `publishedAt` (slug breaks ties).

use crate::computed;
use crate::config::{self, SiteConfig};
use crate::frontmatter::{self, FrontMatterError};
use crate::naming;
use crate::schema::{self, SchemaError};
use crate::types::{
    BlogFields, BlogPost, Body, Document, DocumentFields, DocumentKind, Project, ProjectFields,
    Source, sort_newest_first,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("IO error: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("{}: {source}", .path.display())]
    FrontMatter {
        path: PathBuf,
        #[source]
        source: FrontMatterError,
    },
    #[error("{}: {source}", .path.display())]
    Schema {
        path: PathBuf,
        #[source]
        source: SchemaError,
    },
}

/// Manifest output from the scan stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub blogs: Vec<BlogPost>,
    pub projects: Vec<Project>,
    pub config: SiteConfig,
}

impl Manifest {
    pub fn document_count(&self) -> usize {
        self.blogs.len() + self.projects.len()
    }
}

pub fn scan(root: &Path) -> Result<Manifest, ScanError> {
    // Load site config (uses defaults if config.toml doesn't exist)
    let config = config::load_config(root)?;
    let wpm = config.reading.words_per_minute;

    let blogs = scan_kind::<BlogFields>(root, wpm)?;
    let projects = scan_kind::<ProjectFields>(root, wpm)?;

    Ok(Manifest {
        blogs,
        projects,
        config,
    })
}

/// Load, validate, and sort every document of one kind.
fn scan_kind<F: DocumentFields>(
    root: &Path,
    words_per_minute: u32,
) -> Result<Vec<Document<F>>, ScanError> {
    let dir = root.join(F::KIND.content_dir());
    let files = content_files(&dir)?;
    debug!(kind = %F::KIND, dir = %dir.display(), count = files.len(), "found content files");

    let mut docs = files
        .iter()
        .map(|path| load_document::<F>(root, path, words_per_minute))
        .collect::<Result<Vec<_>, _>>()?;

    sort_newest_first(&mut docs);
    Ok(docs)
}

/// Content files directly inside `dir`, sorted by name.
fn content_files(dir: &Path) -> Result<Vec<PathBuf>, ScanError> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut files = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if entry.file_type().is_file() && !name.starts_with('.') && naming::is_content_file(&name)
        {
            files.push(entry.into_path());
        } else {
            debug!(path = %entry.path().display(), "skipping non-content entry");
        }
    }
    Ok(files)
}

/// Read one content file into a validated document.
pub fn load_document<F: DocumentFields>(
    root: &Path,
    path: &Path,
    words_per_minute: u32,
) -> Result<Document<F>, ScanError> {
    let rel_path = path.strip_prefix(root).unwrap_or(path).to_path_buf();
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    let content = fs::read_to_string(path)?;
    let parsed = frontmatter::parse(&content).map_err(|source| ScanError::FrontMatter {
        path: rel_path.clone(),
        source,
    })?;
    let fields = schema::document_type(F::KIND)
        .resolve::<F>(&parsed.fields)
        .map_err(|source| ScanError::Schema {
            path: rel_path.clone(),
            source,
        })?;
    let computed = computed::compute(&parsed.body, &file_name, words_per_minute);

    Ok(Document {
        fields,
        computed,
        body: Body { raw: parsed.body },
        source: Source {
            file_name,
            path: rel_path
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/"),
        },
    })
}

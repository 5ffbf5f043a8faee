//! Markdown rendering with highlighted, presentation-ready code.
//!
//! Stage 2 of the folio build pipeline. Takes the manifest from the scan
//! stage and renders every document body to HTML:
//!
//! ```text
//! body.raw ──markdown::to_tree──▶ node tree ──rewrite::rewrite──▶ styled tree ──to_html──▶ html
//!               (highlighting)                  (class names)
//! ```
//!
//! ## Output Structure
//!
//! ```text
//! processed/
//! ├── manifest.json              # Scan manifest + `html` per document
//! ├── .render-index.json         # Render cache index
//! └── fragments/
//!     └── <render id>.html       # One rendered body per distinct (body, params)
//! ```
//!
//! See [`cache`] for how fragments are named and reused.
//!
//! ## Parallel Processing
//!
//! Documents are independent, so they render in parallel on the global
//! [rayon](https://docs.rs/rayon) pool (sized from `[processing]` by the
//! CLI). Output order always matches the input manifest. Progress events are
//! sent over an optional channel. During the parallel section the previous
//! render index is only read and fragments are only written for new
//! renders; the new index is built and saved once it has finished.

use crate::cache::{self, CacheStats, RenderIndex, RenderKey};
use crate::config::SiteConfig;
use crate::hast;
use crate::highlight::{HighlightError, Highlighter};
use crate::markdown;
use crate::rewrite;
use crate::scan::Manifest;
use crate::types::{BlogFields, Document, DocumentFields, DocumentKind, ProjectFields, Rendered};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::mpsc::Sender;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Highlighter setup failed: {0}")]
    Highlight(#[from] HighlightError),
    #[error("Rendering {path} failed: {source}")]
    Render {
        path: String,
        #[source]
        source: HighlightError,
    },
}

/// Output manifest (after processing).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputManifest {
    pub blogs: Vec<Rendered<BlogFields>>,
    pub projects: Vec<Rendered<ProjectFields>>,
    pub config: SiteConfig,
}

/// How a document's HTML was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStatus {
    /// Read from a fragment of an earlier build.
    Cached,
    /// Rendered from Markdown.
    Rendered,
}

/// Progress events emitted while processing.
#[derive(Debug, Clone)]
pub enum ProcessEvent {
    KindStarted {
        kind: DocumentKind,
        count: usize,
    },
    DocumentRendered {
        /// 1-based position within its kind.
        index: usize,
        title: String,
        source_path: String,
        status: RenderStatus,
    },
}

/// Result of the process stage.
pub struct ProcessResult {
    pub manifest: OutputManifest,
    pub cache_stats: CacheStats,
}

/// Render one Markdown body to presentation-ready HTML.
pub fn render_body(markdown: &str, highlighter: &Highlighter) -> Result<String, HighlightError> {
    let mut tree = markdown::to_tree(markdown, highlighter)?;
    rewrite::rewrite(&mut tree);
    Ok(hast::to_html(&tree))
}

pub fn process(
    manifest_path: &Path,
    output_dir: &Path,
    use_cache: bool,
    progress: Option<Sender<ProcessEvent>>,
) -> Result<ProcessResult, ProcessError> {
    let manifest_content = fs::read_to_string(manifest_path)?;
    let input: Manifest = serde_json::from_str(&manifest_content)?;
    process_manifest(input, output_dir, use_cache, progress)
}

/// Process an in-memory scan manifest.
pub fn process_manifest(
    input: Manifest,
    output_dir: &Path,
    use_cache: bool,
    progress: Option<Sender<ProcessEvent>>,
) -> Result<ProcessResult, ProcessError> {
    fs::create_dir_all(output_dir)?;

    let theme = &input.config.highlight;
    let highlighter = Highlighter::new(&theme.light_theme, &theme.dark_theme)?;
    let previous = if use_cache {
        RenderIndex::load(output_dir)
    } else {
        RenderIndex::default()
    };
    let ctx = RenderContext {
        highlighter: &highlighter,
        previous: &previous,
        params_hash: cache::hash_render_params(&theme.light_theme, &theme.dark_theme),
        output_dir,
    };

    let blogs = process_kind(input.blogs, &ctx, progress.clone())?;
    let projects = process_kind(input.projects, &ctx, progress)?;

    // The new index lists exactly the fragments this build used.
    let mut index = RenderIndex::default();
    let mut cache_stats = CacheStats::default();
    let outcomes = blogs
        .iter()
        .map(|(r, o)| (&r.document.source.path, o))
        .chain(projects.iter().map(|(r, o)| (&r.document.source.path, o)));
    for (source_path, outcome) in outcomes {
        match outcome.status {
            RenderStatus::Cached => cache_stats.cached += 1,
            RenderStatus::Rendered => cache_stats.rendered += 1,
        }
        index.record(&outcome.key, source_path);
    }
    cache_stats.pruned = cache::prune(output_dir, &index)?;
    index.save(output_dir)?;
    info!(%cache_stats, fragments = index.len(), "process stage finished");

    Ok(ProcessResult {
        manifest: OutputManifest {
            blogs: blogs.into_iter().map(|(r, _)| r).collect(),
            projects: projects.into_iter().map(|(r, _)| r).collect(),
            config: input.config,
        },
        cache_stats,
    })
}

struct RenderContext<'a> {
    highlighter: &'a Highlighter,
    previous: &'a RenderIndex,
    params_hash: String,
    output_dir: &'a Path,
}

struct Outcome {
    status: RenderStatus,
    key: RenderKey,
}

fn process_kind<F: DocumentFields>(
    docs: Vec<Document<F>>,
    ctx: &RenderContext<'_>,
    progress: Option<Sender<ProcessEvent>>,
) -> Result<Vec<(Rendered<F>, Outcome)>, ProcessError> {
    if let Some(tx) = &progress {
        tx.send(ProcessEvent::KindStarted {
            kind: F::KIND,
            count: docs.len(),
        })
        .ok();
    }

    docs.into_par_iter()
        .enumerate()
        .map_with(progress, |tx, (i, doc)| {
            let (html, outcome) = render_document(&doc, ctx)?;
            if let Some(tx) = tx {
                tx.send(ProcessEvent::DocumentRendered {
                    index: i + 1,
                    title: doc.fields.title().to_string(),
                    source_path: doc.source.path.clone(),
                    status: outcome.status,
                })
                .ok();
            }
            Ok::<_, ProcessError>((Rendered { document: doc, html }, outcome))
        })
        .collect()
}

fn render_document<F: DocumentFields>(
    doc: &Document<F>,
    ctx: &RenderContext<'_>,
) -> Result<(String, Outcome), ProcessError> {
    let key = RenderKey::new(&doc.body.raw, &ctx.params_hash);

    if let Some(html) = ctx.previous.lookup(&key, ctx.output_dir) {
        debug!(path = %doc.source.path, "cached");
        let outcome = Outcome {
            status: RenderStatus::Cached,
            key,
        };
        return Ok((html, outcome));
    }

    let html = render_body(&doc.body.raw, ctx.highlighter).map_err(|source| {
        ProcessError::Render {
            path: doc.source.path.clone(),
            source,
        }
    })?;
    cache::write_fragment(ctx.output_dir, &key, &html)?;
    debug!(path = %doc.source.path, "rendered");
    let outcome = Outcome {
        status: RenderStatus::Rendered,
        key,
    };
    Ok((html, outcome))
}

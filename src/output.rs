//! CLI output formatting for all pipeline stages.
//!
//! # Information-First Display
//!
//! Output is **information-centric, not file-centric**. The primary display
//! for every document is its semantic identity (positional index and
//! title), with filesystem paths shown as secondary context via indented
//! `Source:` lines.
//!
//! # Output Format
//!
//! ## Scan
//!
//! ```text
//! Blog (2 documents)
//! 001 Hello World
//!     Source: blog/hello-world.mdx
//!     August 1, 2022 · 1 min read · 96 words
//!     Tags: rust, web
//!
//! Portfolio (1 document)
//! 001 Weather App
//!     Source: project/weather-app.mdx
//!     November 2, 2021 · 1 min read · 40 words
//!     Tag: CLI
//!
//! Config
//!     config.toml
//! ```
//!
//! ## Process
//!
//! ```text
//! Blog (2 documents)
//!     001 Hello World
//!         Source: blog/hello-world.mdx
//!         html: rendered
//! ```
//!
//! ## Generate
//!
//! ```text
//! Home → index.html
//! About → about/index.html
//! Stack → stack/index.html
//! Portfolio → portfolio/index.html
//!     001 Weather App → portfolio/weather-app/index.html
//! Blog → blog/index.html
//!     001 Hello World → blog/hello-world/index.html
//!
//! Generated 7 pages (1 project, 1 post)
//! ```
//!
//! # Architecture
//!
//! Each stage has a `format_*` function (returns `Vec<String>`) for testability
//! and a `print_*` wrapper that writes to stdout. Format functions are pure:
//! no I/O, no side effects.

use crate::generate::format_date;
use crate::process::{OutputManifest, ProcessEvent, RenderStatus};
use crate::scan::Manifest;
use crate::types::{Document, DocumentFields, DocumentKind, Rendered};

// ============================================================================
// Shared entity display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

fn plural(n: usize, singular: &str, plural: &str) -> String {
    if n == 1 {
        format!("{} {}", n, singular)
    } else {
        format!("{} {}", n, plural)
    }
}

/// Section heading for a document kind, as shown in the site navigation.
fn kind_heading(kind: DocumentKind) -> &'static str {
    match kind {
        DocumentKind::Blog => "Blog",
        DocumentKind::Project => "Portfolio",
    }
}

fn kind_header(kind: DocumentKind, count: usize) -> String {
    format!(
        "{} ({})",
        kind_heading(kind),
        plural(count, "document", "documents")
    )
}

/// Path of a page's `index.html`, relative to the output directory.
fn page_file(url: &str) -> String {
    let dir = url.trim_matches('/');
    if dir.is_empty() {
        "index.html".to_string()
    } else {
        format!("{}/index.html", dir)
    }
}

// ============================================================================
// Stage 1: Scan output
// ============================================================================

fn format_documents<F: DocumentFields>(docs: &[Document<F>], lines: &mut Vec<String>) {
    lines.push(kind_header(F::KIND, docs.len()));
    for (i, doc) in docs.iter().enumerate() {
        lines.push(format!("{} {}", format_index(i + 1), doc.fields.title()));
        lines.push(format!("    Source: {}", doc.source.path));
        lines.push(format!(
            "    {} · {} · {}",
            format_date(doc.fields.published_at()),
            doc.computed.reading_time.text,
            plural(doc.computed.word_count, "word", "words")
        ));
        let labels = doc.fields.labels();
        if !labels.is_empty() {
            let name = match F::KIND {
                DocumentKind::Blog => "Tags",
                DocumentKind::Project => "Tag",
            };
            lines.push(format!("    {}: {}", name, labels.join(", ")));
        }
    }
}

/// Format scan stage output showing the discovered documents.
pub fn format_scan_output(manifest: &Manifest, has_config_file: bool) -> Vec<String> {
    let mut lines = Vec::new();

    format_documents(&manifest.blogs, &mut lines);
    lines.push(String::new());
    format_documents(&manifest.projects, &mut lines);

    lines.push(String::new());
    lines.push("Config".to_string());
    if has_config_file {
        lines.push("    config.toml".to_string());
    } else {
        lines.push("    (stock defaults)".to_string());
    }

    lines
}

/// Print scan output to stdout.
pub fn print_scan_output(manifest: &Manifest, has_config_file: bool) {
    for line in format_scan_output(manifest, has_config_file) {
        println!("{}", line);
    }
}

// ============================================================================
// Stage 2: Process output
// ============================================================================

/// Format a single process progress event as display lines.
pub fn format_process_event(event: &ProcessEvent) -> Vec<String> {
    match event {
        ProcessEvent::KindStarted { kind, count } => vec![kind_header(*kind, *count)],
        ProcessEvent::DocumentRendered {
            index,
            title,
            source_path,
            status,
        } => {
            let status_str = match status {
                RenderStatus::Cached => "cached",
                RenderStatus::Rendered => "rendered",
            };
            vec![
                format!("    {} {}", format_index(*index), title),
                format!("        Source: {}", source_path),
                format!("        html: {}", status_str),
            ]
        }
    }
}

// ============================================================================
// Stage 3: Generate output
// ============================================================================

fn format_document_pages<F: DocumentFields>(docs: &[Rendered<F>], lines: &mut Vec<String>) {
    for (i, item) in docs.iter().enumerate() {
        lines.push(format!(
            "    {} {} \u{2192} {}",
            format_index(i + 1),
            item.document.fields.title(),
            page_file(&item.document.url())
        ));
    }
}

/// Format generate stage output showing generated HTML files.
pub fn format_generate_output(manifest: &OutputManifest) -> Vec<String> {
    let mut lines = Vec::new();

    for (label, url) in crate::generate::NAV_ITEMS {
        lines.push(format!("{} \u{2192} {}", label, page_file(url)));
        match url {
            "/portfolio/" => format_document_pages(&manifest.projects, &mut lines),
            "/blog/" => format_document_pages(&manifest.blogs, &mut lines),
            _ => {}
        }
    }

    let total = crate::generate::NAV_ITEMS.len() + manifest.projects.len() + manifest.blogs.len();
    lines.push(String::new());
    lines.push(format!(
        "Generated {} ({}, {})",
        plural(total, "page", "pages"),
        plural(manifest.projects.len(), "project", "projects"),
        plural(manifest.blogs.len(), "post", "posts")
    ));

    lines
}

/// Print generate output to stdout.
pub fn print_generate_output(manifest: &OutputManifest) {
    for line in format_generate_output(manifest) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================

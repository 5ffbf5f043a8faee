//! # Folio
//!
//! A static site generator for a personal portfolio and blog. Blog posts and
//! project write-ups are Markdown/MDX files with YAML front matter; the site
//! is Home, About, Stack, Portfolio and Blog pages built from them and from
//! `config.toml`.
//!
//! # Architecture: Three-Stage Pipeline
//!
//! Folio processes content through three independent stages, each producing
//! a JSON manifest that the next stage consumes:
//!
//! ```text
//! 1. Scan      content/  →  manifest.json    (files → validated documents + derived fields)
//! 2. Process   manifest  →  processed/       (markdown → highlighted, styled HTML)
//! 3. Generate  manifest  →  dist/            (final HTML site)
//! ```
//!
//! Each manifest is human-readable JSON you can inspect, and each stage can
//! be run on its own from the CLI.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Stage 1: walks `blog/` and `project/`, validates front matter, derives fields |
//! | [`process`] | Stage 2: renders bodies in parallel, with a content-addressed [`cache`] |
//! | [`generate`] | Stage 3: renders the final HTML site using Maud |
//! | [`config`] | `config.toml` loading, validation, merging, and CSS generation |
//! | [`types`] | Shared document types serialized between stages |
//! | [`frontmatter`] | Splits a content file into YAML front matter and body |
//! | [`schema`] | Per-kind field schema: required/optional fields and their checks |
//! | [`computed`] | Derived fields: reading time, word count, slug |
//! | [`naming`] | Slug from file name (`my.post.mdx` → `my.post`) |
//! | [`markdown`] | Markdown → [`hast`] tree, with highlighted code fragments |
//! | [`highlight`] | Fence metadata and two-theme syntax highlighting |
//! | [`rewrite`] | Assigns the presentation classes to highlighted code |
//! | [`view_state`] | Header menu/theme state as a pure reducer |
//! | [`output`] | CLI output formatting for each stage |
//!
//! # Design Decisions
//!
//! ## Trees, Not Strings
//!
//! Markdown is converted to a small HTML tree ([`hast`]) rather than straight
//! to a string, so that styling code blocks is a structural rewrite over
//! elements and markers instead of string patching. The class names the
//! stylesheet depends on live in one place, [`rewrite::classes`].
//!
//! ## Highlight at Build Time
//!
//! Code is highlighted with [syntect](https://docs.rs/syntect) once per theme
//! and both copies are shipped; CSS shows the one matching the page theme.
//! The site needs no client-side highlighter.

pub mod cache;
pub mod computed;
pub mod config;
pub mod frontmatter;
pub mod generate;
pub mod hast;
pub mod highlight;
pub mod markdown;
pub mod naming;
pub mod output;
pub mod process;
pub mod rewrite;
pub mod scan;
pub mod schema;
pub mod types;
pub mod view_state;

#[cfg(test)]
pub(crate) mod test_helpers;

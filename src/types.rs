//! Shared types used across all pipeline stages.
//!
//! These types are serialized to JSON between stages (scan → process → generate)
//! and must be identical across all three modules. Field names follow the
//! front-matter convention (`publishedAt`, `readingTime`, `wordCount`) so the
//! manifests read the same as the content files that produced them.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The two document types the site knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentKind {
    Blog,
    Project,
}

impl DocumentKind {
    /// Content sub-directory holding documents of this kind.
    pub fn content_dir(self) -> &'static str {
        match self {
            DocumentKind::Blog => "blog",
            DocumentKind::Project => "project",
        }
    }

    /// URL prefix of the generated pages for this kind.
    pub fn url_prefix(self) -> &'static str {
        match self {
            DocumentKind::Blog => "blog",
            DocumentKind::Project => "portfolio",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentKind::Blog => write!(f, "Blog"),
            DocumentKind::Project => write!(f, "Project"),
        }
    }
}

/// Reading-time estimate for a document body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadingTime {
    /// Display string, e.g. `"3 min read"`.
    pub text: String,
    /// Fractional minutes at the configured reading speed.
    pub minutes: f64,
    /// Reading time in milliseconds, rounded.
    pub time: u64,
    /// Words counted for the estimate.
    pub words: usize,
}

/// Fields computed once per document after its content is parsed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputedFields {
    pub reading_time: ReadingTime,
    pub word_count: usize,
    pub slug: String,
}

/// Front-matter fields of a blog post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogFields {
    pub title: String,
    pub published_at: String,
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Front-matter fields of a project write-up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectFields {
    pub title: String,
    pub published_at: String,
    pub summary: String,
    pub image: String,
    pub tag: String,
}

/// Common view over the per-kind field structs.
///
/// Lets the scan, process and generate stages handle both document kinds
/// with the same generic code.
pub trait DocumentFields:
    Serialize + DeserializeOwned + Clone + fmt::Debug + Send + Sync + 'static
{
    const KIND: DocumentKind;

    fn title(&self) -> &str;
    fn published_at(&self) -> &str;
    fn summary(&self) -> &str;
    fn image(&self) -> Option<&str>;
    /// Labels shown next to the document (blog tags, or the project's tag).
    fn labels(&self) -> Vec<&str>;
}

impl DocumentFields for BlogFields {
    const KIND: DocumentKind = DocumentKind::Blog;

    fn title(&self) -> &str {
        &self.title
    }

    fn published_at(&self) -> &str {
        &self.published_at
    }

    fn summary(&self) -> &str {
        &self.summary
    }

    fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }

    fn labels(&self) -> Vec<&str> {
        self.tags.iter().map(String::as_str).collect()
    }
}

impl DocumentFields for ProjectFields {
    const KIND: DocumentKind = DocumentKind::Project;

    fn title(&self) -> &str {
        &self.title
    }

    fn published_at(&self) -> &str {
        &self.published_at
    }

    fn summary(&self) -> &str {
        &self.summary
    }

    fn image(&self) -> Option<&str> {
        Some(&self.image)
    }

    fn labels(&self) -> Vec<&str> {
        vec![self.tag.as_str()]
    }
}

/// Where a document came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Source {
    /// File name including the `.mdx` suffix.
    pub file_name: String,
    /// Path relative to the content root.
    pub path: String,
}

/// Document body as authored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Body {
    /// Markdown text after the front matter.
    pub raw: String,
}

/// A validated content item: front-matter fields plus derived metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document<F> {
    #[serde(flatten)]
    pub fields: F,
    #[serde(flatten)]
    pub computed: ComputedFields,
    pub body: Body,
    pub source: Source,
}

impl<F: DocumentFields> Document<F> {
    pub fn kind(&self) -> DocumentKind {
        F::KIND
    }

    pub fn slug(&self) -> &str {
        &self.computed.slug
    }

    /// Site-relative URL of the document page, with trailing slash.
    pub fn url(&self) -> String {
        format!("/{}/{}/", F::KIND.url_prefix(), self.computed.slug)
    }
}

pub type BlogPost = Document<BlogFields>;
pub type Project = Document<ProjectFields>;

/// A document together with its rendered, presentation-ready HTML body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rendered<F> {
    #[serde(flatten)]
    pub document: Document<F>,
    pub html: String,
}

/// Sort newest first by `publishedAt`, then by slug for a stable order.
///
/// Dates are ISO-8601 strings, so lexical order is chronological order.
pub fn sort_newest_first<F: DocumentFields>(docs: &mut [Document<F>]) {
    docs.sort_by(|a, b| {
        b.fields
            .published_at()
            .cmp(a.fields.published_at())
            .then_with(|| a.computed.slug.cmp(&b.computed.slug))
    });
}

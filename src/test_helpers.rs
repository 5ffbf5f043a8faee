//! Shared test utilities for the folio test suite.
//!
//! Provides fixture setup, document builders, and lookup helpers that work
//! with scan-phase data structures (`Manifest`, `BlogPost`, `Project`).
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_fixtures();
//! let manifest = scan(tmp.path()).unwrap();
//!
//! let post = find_blog(&manifest, "hello-world");
//! assert_eq!(post.fields.tags, vec!["rust", "web"]);
//! assert_eq!(blog_slugs(&manifest), vec!["hello-world", "my.notes"]);
//! ```

use std::fs;
use std::path::Path;
use tempfile::TempDir;

use crate::scan::Manifest;
use crate::types::{BlogPost, DocumentKind, Project};

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/content/` to a temp directory and return it.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/content");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

/// Write a content file under `<root>/<kind dir>/<file_name>`.
pub fn write_doc(root: &Path, kind: DocumentKind, file_name: &str, content: &str) {
    let dir = root.join(kind.content_dir());
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(file_name), content).unwrap();
}

/// Source text of a minimal valid blog post.
pub fn blog_source(title: &str, published_at: &str, body: &str) -> String {
    format!("---\ntitle: {title}\npublishedAt: \"{published_at}\"\nsummary: About {title}\n---\n{body}")
}

/// Source text of a minimal valid project write-up.
pub fn project_source(title: &str, published_at: &str, tag: &str, body: &str) -> String {
    format!(
        "---\ntitle: {title}\npublishedAt: \"{published_at}\"\nsummary: About {title}\nimage: /img/{tag}.png\ntag: {tag}\n---\n{body}"
    )
}

// =========================================================================
// Manifest lookups (panic with a clear message on miss)
// =========================================================================

/// Find a blog post by slug. Panics if not found.
pub fn find_blog<'a>(manifest: &'a Manifest, slug: &str) -> &'a BlogPost {
    manifest
        .blogs
        .iter()
        .find(|p| p.slug() == slug)
        .unwrap_or_else(|| panic!("blog '{slug}' not found. Available: {:?}", blog_slugs(manifest)))
}

/// Find a project by slug. Panics if not found.
pub fn find_project<'a>(manifest: &'a Manifest, slug: &str) -> &'a Project {
    manifest
        .projects
        .iter()
        .find(|p| p.slug() == slug)
        .unwrap_or_else(|| {
            panic!(
                "project '{slug}' not found. Available: {:?}",
                project_slugs(manifest)
            )
        })
}

// =========================================================================
// Bulk extractors
// =========================================================================

/// All blog slugs in manifest order.
pub fn blog_slugs(manifest: &Manifest) -> Vec<&str> {
    manifest.blogs.iter().map(|p| p.slug()).collect()
}

/// All project slugs in manifest order.
pub fn project_slugs(manifest: &Manifest) -> Vec<&str> {
    manifest.projects.iter().map(|p| p.slug()).collect()
}

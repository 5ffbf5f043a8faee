//! Centralized filename handling for content documents.
//!
//! Every document lives in a file named `<slug>.mdx`. The slug is the file
//! name with exactly that suffix removed: no lowercasing, no dash handling,
//! no stripping of inner dots. This keeps URLs predictable from a glance at
//! the content directory:
//!
//! - `my-post.mdx` → `my-post`
//! - `my.post.mdx` → `my.post`
//! - `Hello-World.mdx` → `Hello-World`

/// The fixed suffix every content file must carry.
pub const CONTENT_EXTENSION: &str = ".mdx";

/// Whether a file name carries the content suffix.
///
/// A bare `.mdx` (nothing before the suffix) is not a content file: it
/// would produce an empty slug.
pub fn is_content_file(file_name: &str) -> bool {
    file_name.len() > CONTENT_EXTENSION.len() && file_name.ends_with(CONTENT_EXTENSION)
}

/// Derive a document slug from its source file name.
///
/// Removes exactly one trailing [`CONTENT_EXTENSION`]. Names without the
/// suffix are returned unchanged.
pub fn derive_slug(file_name: &str) -> String {
    file_name
        .strip_suffix(CONTENT_EXTENSION)
        .unwrap_or(file_name)
        .to_string()
}

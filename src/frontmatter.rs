//! YAML front-matter splitting.
//!
//! Content files open with a YAML block fenced by `---` lines:
//!
//! ```text
//! ---
//! title: Hello
//! publishedAt: "2022-08-01"
//! summary: First post
//! ---
//!
//! Markdown body…
//! ```
//!
//! The block is parsed into a raw YAML mapping; schema checks happen in
//! [`crate::schema`].

use serde_yaml::{Mapping, Value};
use thiserror::Error;

const FENCE: &str = "---";

#[derive(Error, Debug)]
pub enum FrontMatterError {
    #[error("missing front matter: file must start with a `---` line")]
    Missing,
    #[error("unterminated front matter: no closing `---` line")]
    Unterminated,
    #[error("front matter is not valid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("front matter must be a mapping of fields")]
    NotAMapping,
}

/// A content file split into its front matter and body.
#[derive(Debug, Clone, PartialEq)]
pub struct Parsed {
    pub fields: Mapping,
    /// Everything after the closing fence, untouched.
    pub body: String,
}

fn is_fence(line: &str) -> bool {
    line.trim_end_matches(['\n', '\r']).trim_end() == FENCE
}

/// Split raw file content into `(yaml, body)` slices.
pub fn split(content: &str) -> Result<(&str, &str), FrontMatterError> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut lines = content.split_inclusive('\n');

    let first = lines.next().ok_or(FrontMatterError::Missing)?;
    if !is_fence(first) {
        return Err(FrontMatterError::Missing);
    }

    let yaml_start = first.len();
    let mut offset = yaml_start;
    for line in lines {
        if is_fence(line) {
            let yaml = &content[yaml_start..offset];
            let body = &content[offset + line.len()..];
            return Ok((yaml, body));
        }
        offset += line.len();
    }
    Err(FrontMatterError::Unterminated)
}

/// Split and parse a content file.
pub fn parse(content: &str) -> Result<Parsed, FrontMatterError> {
    let (yaml, body) = split(content)?;
    let fields = match serde_yaml::from_str::<Value>(yaml)? {
        Value::Mapping(map) => map,
        Value::Null => Mapping::new(),
        _ => return Err(FrontMatterError::NotAMapping),
    };
    Ok(Parsed {
        fields,
        body: body.to_string(),
    })
}

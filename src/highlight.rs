//! Syntax highlighting of code spans into fragment trees.
//!
//! Fenced code blocks are tokenized with syntect once per theme and emitted
//! as a fragment container the presentation rewriter later styles:
//!
//! ```text
//! div[data-code-fragment]
//! ├── div[data-code-title][data-theme=light]      (only with title="…")
//! ├── pre[data-theme=light] > code[data-language]
//! │   └── span[data-line] > span[style=color:…]…
//! ├── div[data-code-title][data-theme=dark]
//! └── pre[data-theme=dark] > code[data-language]
//! ```
//!
//! The stylesheet shows the `pre` whose `data-theme` matches the page theme.
//!
//! ## Fence info string
//!
//! ````text
//! ```rust title="main.rs" showLineNumbers {1,3-5}
//! ````
//!
//! - first bare word: language (unknown languages render as plain text)
//! - `title="…"`: title bar above the block
//! - `showLineNumbers`: sets `data-line-numbers` on `code`
//! - `{…}`: 1-based line numbers and inclusive ranges to highlight
//!
//! Inline code opts in with a `{:lang}` suffix (`` `let x = 1{:rust}` ``) and
//! becomes `span[data-code-fragment] > code[data-language]`, highlighted with
//! the light theme only.

use crate::hast::{Element, Node};
use regex::Regex;
use std::ops::RangeInclusive;
use std::sync::LazyLock;
use syntect::easy::HighlightLines;
use syntect::highlighting::{Color, Theme, ThemeSet};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use thiserror::Error;
use tracing::debug;

// ============================================================================
// Markers read by the presentation rewriter
// ============================================================================

pub const FRAGMENT_MARKER: &str = "data-code-fragment";
pub const TITLE_MARKER: &str = "data-code-title";
pub const LINE_MARKER: &str = "data-line";
pub const HIGHLIGHTED_LINE_MARKER: &str = "data-highlighted-line";
pub const LINE_NUMBERS_MARKER: &str = "data-line-numbers";
pub const THEME_ATTR: &str = "data-theme";
pub const LANGUAGE_ATTR: &str = "data-language";

const PLAIN_TEXT: &str = "plaintext";

#[derive(Error, Debug)]
pub enum HighlightError {
    #[error("unknown highlight theme `{name}` (available: {available})")]
    UnknownTheme { name: String, available: String },
    #[error("highlighting failed: {0}")]
    Syntect(#[from] syntect::Error),
}

/// Page theme a highlighted variant belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeMode {
    Light,
    Dark,
}

impl ThemeMode {
    pub const ALL: [ThemeMode; 2] = [ThemeMode::Light, ThemeMode::Dark];

    pub fn as_str(self) -> &'static str {
        match self {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
        }
    }
}

// ============================================================================
// Fence meta
// ============================================================================

static TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"title="([^"]*)""#).expect("valid regex"));
static RANGES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([\d,\s-]*)\}").expect("valid regex"));
static INLINE_LANG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.*)\{:([\w#+.-]+)\}$").expect("valid regex"));

const LINE_NUMBERS_FLAG: &str = "showLineNumbers";

/// Options parsed from a fenced block's info string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FenceMeta {
    pub language: Option<String>,
    pub title: Option<String>,
    pub line_numbers: bool,
    pub highlighted: Vec<RangeInclusive<usize>>,
}

impl FenceMeta {
    pub fn parse(info: &str) -> Self {
        let title = TITLE_RE.captures(info).map(|c| c[1].to_string());
        let highlighted = RANGES_RE
            .captures(info)
            .map(|c| parse_ranges(&c[1]))
            .unwrap_or_default();

        // Strip the structured parts so the remaining words are plain flags.
        let rest = TITLE_RE.replace_all(info, " ");
        let rest = RANGES_RE.replace_all(&rest, " ");
        let mut language = None;
        let mut line_numbers = false;
        for word in rest.split_whitespace() {
            if word == LINE_NUMBERS_FLAG {
                line_numbers = true;
            } else if language.is_none() {
                language = Some(word.to_string());
            }
        }

        Self {
            language,
            title,
            line_numbers,
            highlighted,
        }
    }

    /// Whether 1-based `line` falls in a highlighted range.
    pub fn is_highlighted(&self, line: usize) -> bool {
        self.highlighted.iter().any(|r| r.contains(&line))
    }
}

/// Parse `1,3-5` into ranges. Malformed parts are skipped.
fn parse_ranges(list: &str) -> Vec<RangeInclusive<usize>> {
    list.split(',')
        .filter_map(|part| {
            let part = part.trim();
            match part.split_once('-') {
                Some((a, b)) => {
                    let (a, b) = (a.trim().parse().ok()?, b.trim().parse().ok()?);
                    (a <= b).then_some(a..=b)
                }
                None => part.parse().ok().map(|n| n..=n),
            }
        })
        .collect()
}

/// Split `code{:lang}` into `(code, lang)`.
pub fn split_inline_language(code: &str) -> Option<(&str, &str)> {
    let caps = INLINE_LANG_RE.captures(code)?;
    let body = caps.get(1)?.as_str();
    let lang = caps.get(2)?.as_str();
    Some((body, lang))
}

// ============================================================================
// Highlighter
// ============================================================================

/// Loaded syntax definitions plus the light and dark themes.
pub struct Highlighter {
    syntaxes: SyntaxSet,
    light: Theme,
    dark: Theme,
}

impl std::fmt::Debug for Highlighter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Highlighter")
            .field("light", &self.light.name)
            .field("dark", &self.dark.name)
            .finish_non_exhaustive()
    }
}

/// Names of the bundled themes, sorted.
pub fn available_themes() -> Vec<String> {
    ThemeSet::load_defaults().themes.into_keys().collect()
}

impl Highlighter {
    pub fn new(light_theme: &str, dark_theme: &str) -> Result<Self, HighlightError> {
        let mut themes = ThemeSet::load_defaults();
        let mut take = |name: &str| {
            themes
                .themes
                .remove(name)
                .ok_or_else(|| HighlightError::UnknownTheme {
                    name: name.to_string(),
                    available: available_themes().join(", "),
                })
        };
        // Same theme for both modes is allowed.
        let light = take(light_theme)?;
        let dark = if dark_theme == light_theme {
            light.clone()
        } else {
            take(dark_theme)?
        };

        Ok(Self {
            syntaxes: SyntaxSet::load_defaults_newlines(),
            light,
            dark,
        })
    }

    fn theme(&self, mode: ThemeMode) -> &Theme {
        match mode {
            ThemeMode::Light => &self.light,
            ThemeMode::Dark => &self.dark,
        }
    }

    fn syntax(&self, language: Option<&str>) -> &SyntaxReference {
        language
            .and_then(|lang| {
                let found = self.syntaxes.find_syntax_by_token(lang);
                if found.is_none() {
                    debug!(language = lang, "no syntax definition, rendering as plain text");
                }
                found
            })
            .unwrap_or_else(|| self.syntaxes.find_syntax_plain_text())
    }

    /// Highlight a fenced block into a `div` fragment container.
    pub fn block(&self, code: &str, meta: &FenceMeta) -> Result<Element, HighlightError> {
        let language = meta.language.as_deref().unwrap_or(PLAIN_TEXT);
        let syntax = self.syntax(meta.language.as_deref());
        let code = code.strip_suffix('\n').unwrap_or(code);

        let mut children = Vec::new();
        for mode in ThemeMode::ALL {
            if let Some(title) = &meta.title {
                children.push(
                    Element::new("div")
                        .with_flag(TITLE_MARKER)
                        .with_attr(THEME_ATTR, mode.as_str())
                        .with_attr(LANGUAGE_ATTR, language)
                        .with_children(vec![Node::text(title.clone())])
                        .into(),
                );
            }

            let lines = self.highlight_lines(code, syntax, mode, meta)?;
            let mut code_el = Element::new("code")
                .with_attr(LANGUAGE_ATTR, language)
                .with_attr(THEME_ATTR, mode.as_str())
                .with_children(lines);
            if meta.line_numbers {
                code_el = code_el.with_flag(LINE_NUMBERS_MARKER);
            }
            children.push(
                Element::new("pre")
                    .with_attr(THEME_ATTR, mode.as_str())
                    .with_attr(LANGUAGE_ATTR, language)
                    .with_children(vec![code_el.into()])
                    .into(),
            );
        }

        Ok(Element::new("div")
            .with_flag(FRAGMENT_MARKER)
            .with_children(children))
    }

    /// Highlight inline code carrying a `{:lang}` suffix.
    ///
    /// Returns `None` for plain inline code, which stays a bare `code`.
    pub fn inline(&self, code: &str) -> Result<Option<Element>, HighlightError> {
        let Some((body, lang)) = split_inline_language(code) else {
            return Ok(None);
        };
        let syntax = self.syntax(Some(lang));
        let mut hl = HighlightLines::new(syntax, self.theme(ThemeMode::Light));
        let tokens = tokens(&mut hl, body, &self.syntaxes)?;

        let code_el = Element::new("code")
            .with_attr(LANGUAGE_ATTR, lang)
            .with_children(tokens);
        Ok(Some(
            Element::new("span")
                .with_flag(FRAGMENT_MARKER)
                .with_children(vec![code_el.into()]),
        ))
    }

    fn highlight_lines(
        &self,
        code: &str,
        syntax: &SyntaxReference,
        mode: ThemeMode,
        meta: &FenceMeta,
    ) -> Result<Vec<Node>, HighlightError> {
        let mut hl = HighlightLines::new(syntax, self.theme(mode));
        let mut lines = Vec::new();
        for (idx, line) in code.split('\n').enumerate() {
            let mut span = Element::new("span")
                .with_flag(LINE_MARKER)
                .with_children(tokens(&mut hl, line, &self.syntaxes)?);
            if meta.is_highlighted(idx + 1) {
                span = span.with_flag(HIGHLIGHTED_LINE_MARKER);
            }
            lines.push(span.into());
        }
        Ok(lines)
    }
}

/// Tokenize one line into colored spans. Empty lines yield no tokens.
fn tokens(
    hl: &mut HighlightLines<'_>,
    line: &str,
    syntaxes: &SyntaxSet,
) -> Result<Vec<Node>, HighlightError> {
    if line.is_empty() {
        // Keep the parser state in step with the source.
        hl.highlight_line("\n", syntaxes)?;
        return Ok(Vec::new());
    }
    let with_newline = format!("{line}\n");
    let ranges = hl.highlight_line(&with_newline, syntaxes)?;
    Ok(ranges
        .into_iter()
        .filter_map(|(style, text)| {
            let text = text.trim_end_matches('\n');
            (!text.is_empty()).then(|| {
                Element::new("span")
                    .with_attr("style", format!("color:{}", hex(style.foreground)))
                    .with_children(vec![Node::text(text)])
                    .into()
            })
        })
        .collect())
}

fn hex(c: Color) -> String {
    format!("#{:02x}{:02x}{:02x}", c.r, c.g, c.b)
}

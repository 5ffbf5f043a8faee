//! Site configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. Stock defaults are
//! the base layer; a sparse `config.toml` in the content root overrides them.
//!
//! ## Config File Location
//!
//! ```text
//! content/
//! ├── config.toml      # Optional, overrides stock defaults
//! ├── blog/
//! │   └── *.mdx
//! └── project/
//!     └── *.mdx
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [site]
//! title = "Portfolio"
//! author = ""
//! description = ""
//! base_url = ""
//!
//! [reading]
//! words_per_minute = 200    # Reading-time estimate speed
//!
//! [highlight]
//! light_theme = "InspiredGitHub"
//! dark_theme = "base16-ocean.dark"
//!
//! [colors.light]
//! background = "#ffffff"
//! # ... see stock_config_toml() for every key
//!
//! [processing]
//! max_processes = 4         # Max parallel workers (omit for auto = CPU cores)
//!
//! [profile]
//! name = "Ada Lovelace"
//! headline = "Engineer"
//! bio = "Short **markdown** bio."
//! cv_url = "/pdf/cv.pdf"
//!
//! [[profile.experience]]
//! role = "Senior Engineer"
//! period = "January 2022 - Present"
//! highlights = ["Built things"]
//!
//! [[links]]
//! label = "Github"
//! url = "https://github.com/ada"
//!
//! [[stack]]
//! name = "Rust"
//! category = "Languages"
//! url = "https://www.rust-lang.org"
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse. Override just the values you want:
//!
//! ```toml
//! [highlight]
//! dark_theme = "Solarized (dark)"
//! ```
//!
//! Tables merge key by key; arrays (`links`, `stack`, `profile.experience`)
//! replace the default list wholesale. Unknown keys are rejected to catch
//! typos early.

use crate::highlight;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `config.toml`.
///
/// All fields have sensible defaults. User config files need only specify
/// the values they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Site identity used in page titles and the header.
    pub site: SiteInfo,
    /// Reading-time estimate settings.
    pub reading: ReadingConfig,
    /// Code highlighting themes.
    pub highlight: HighlightConfig,
    /// Color schemes for light and dark modes.
    pub colors: ColorConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
    /// About page content.
    pub profile: ProfileConfig,
    /// Extra footer links (social profiles and the like).
    pub links: Vec<LinkConfig>,
    /// Entries on the Stack page.
    pub stack: Vec<StackItem>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            site: SiteInfo::default(),
            reading: ReadingConfig::default(),
            highlight: HighlightConfig::default(),
            colors: ColorConfig::default(),
            processing: ProcessingConfig::default(),
            profile: ProfileConfig::default(),
            links: Vec::new(),
            stack: Vec::new(),
        }
    }
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.site.title.trim().is_empty() {
            return Err(ConfigError::Validation("site.title must not be empty".into()));
        }
        if self.reading.words_per_minute == 0 {
            return Err(ConfigError::Validation(
                "reading.words_per_minute must be greater than 0".into(),
            ));
        }
        let themes = highlight::available_themes();
        for (key, name) in [
            ("light_theme", &self.highlight.light_theme),
            ("dark_theme", &self.highlight.dark_theme),
        ] {
            if !themes.contains(name) {
                return Err(ConfigError::Validation(format!(
                    "highlight.{key} `{name}` is not a known theme (available: {})",
                    themes.join(", ")
                )));
            }
        }
        for link in &self.links {
            if link.label.trim().is_empty() || link.url.trim().is_empty() {
                return Err(ConfigError::Validation(
                    "links entries need a non-empty label and url".into(),
                ));
            }
        }
        for item in &self.stack {
            if item.name.trim().is_empty() {
                return Err(ConfigError::Validation(
                    "stack entries need a non-empty name".into(),
                ));
            }
        }
        Ok(())
    }

    /// Name shown on the About page: the profile name, else the site author.
    pub fn display_name(&self) -> &str {
        if self.profile.name.is_empty() {
            &self.site.author
        } else {
            &self.profile.name
        }
    }
}

/// Site identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteInfo {
    /// Site title, shown in the header and `<title>`.
    pub title: String,
    pub author: String,
    /// Meta description for the home page.
    pub description: String,
    /// Absolute origin for `<link rel="canonical">`, e.g. `https://example.dev`.
    /// Empty omits the canonical link.
    pub base_url: String,
}

impl Default for SiteInfo {
    fn default() -> Self {
        Self {
            title: "Portfolio".to_string(),
            author: String::new(),
            description: String::new(),
            base_url: String::new(),
        }
    }
}

/// Reading-time estimate settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReadingConfig {
    /// Reading speed used for `readingTime`.
    pub words_per_minute: u32,
}

impl Default for ReadingConfig {
    fn default() -> Self {
        Self {
            words_per_minute: crate::computed::DEFAULT_WORDS_PER_MINUTE,
        }
    }
}

/// Syntax highlighting themes, by bundled theme name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HighlightConfig {
    pub light_theme: String,
    pub dark_theme: String,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            light_theme: "InspiredGitHub".to_string(),
            dark_theme: "base16-ocean.dark".to_string(),
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel render workers.
    /// When absent or null, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

/// About page content.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProfileConfig {
    /// Falls back to `site.author` when empty.
    pub name: String,
    pub headline: String,
    /// Markdown.
    pub bio: String,
    /// Link for the "Download CV" button. No button when absent.
    pub cv_url: Option<String>,
    /// Work history, newest first.
    pub experience: Vec<Experience>,
}

/// One entry of the work-experience timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Experience {
    pub role: String,
    /// Free-form period, e.g. `"January 2022 - Present"`.
    pub period: String,
    #[serde(default)]
    pub highlights: Vec<String>,
    /// Show the "Latest" badge. Defaults to the first entry only.
    #[serde(default)]
    pub latest: Option<bool>,
}

/// A footer link. Targets outside the site open in a new tab.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LinkConfig {
    pub label: String,
    pub url: String,
}

/// An entry on the Stack page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StackItem {
    pub name: String,
    /// Grouping heading. Entries without one land under "Other".
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Color configuration for light and dark modes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorConfig {
    /// Light mode color scheme.
    pub light: ColorScheme,
    /// Dark mode color scheme.
    pub dark: ColorScheme,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            light: ColorScheme::default_light(),
            dark: ColorScheme::default_dark(),
        }
    }
}

/// Individual color scheme (light or dark).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorScheme {
    /// Background color.
    pub background: String,
    /// Primary text color.
    pub text: String,
    /// Muted/secondary text color (dates, summaries, footer).
    pub text_muted: String,
    /// Border color.
    pub border: String,
    /// Link color.
    pub link: String,
    /// Link hover color.
    pub link_hover: String,
}

impl ColorScheme {
    pub fn default_light() -> Self {
        Self {
            background: "#ffffff".to_string(),
            text: "#18181b".to_string(),
            text_muted: "#52525b".to_string(),
            border: "#e4e4e7".to_string(),
            link: "#60a5fa".to_string(),
            link_hover: "#2563eb".to_string(),
        }
    }

    pub fn default_dark() -> Self {
        Self {
            background: "#141318".to_string(),
            text: "#f4f4f5".to_string(),
            text_muted: "#a1a1aa".to_string(),
            border: "#3f3f46".to_string(),
            link: "#60a5fa".to_string(),
            link_hover: "#93c5fd".to_string(),
        }
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self::default_light()
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if no `config.toml` exists in the directory.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = path.join("config.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the given directory.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(root)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Folio Configuration
# ===================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Place this file at content/config.toml. It only needs the keys it wants
# to override. Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Site identity
# ---------------------------------------------------------------------------
[site]
# Shown in the header and in every page <title>.
title = "Portfolio"

# Author name, used when [profile] has no name.
author = ""

# Meta description of the home page.
description = ""

# Absolute origin for <link rel="canonical">, e.g. "https://example.dev".
# Leave empty to omit canonical links.
base_url = ""

# ---------------------------------------------------------------------------
# Reading time
# ---------------------------------------------------------------------------
[reading]
# Reading speed used for the "N min read" estimate. Must be > 0.
words_per_minute = 200

# ---------------------------------------------------------------------------
# Code highlighting
# ---------------------------------------------------------------------------
[highlight]
# Bundled themes: InspiredGitHub, Solarized (dark), Solarized (light),
# base16-eighties.dark, base16-mocha.dark, base16-ocean.dark,
# base16-ocean.light. Each code block is rendered once per theme.
light_theme = "InspiredGitHub"
dark_theme = "base16-ocean.dark"

# ---------------------------------------------------------------------------
# Colors - Light mode
# ---------------------------------------------------------------------------
[colors.light]
background = "#ffffff"
text = "#18181b"
text_muted = "#52525b"    # Dates, summaries, footer
border = "#e4e4e7"
link = "#60a5fa"
link_hover = "#2563eb"

# ---------------------------------------------------------------------------
# Colors - Dark mode (theme toggle; follows prefers-color-scheme until toggled)
# ---------------------------------------------------------------------------
[colors.dark]
background = "#141318"
text = "#f4f4f5"
text_muted = "#a1a1aa"
border = "#3f3f46"
link = "#60a5fa"
link_hover = "#93c5fd"

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel render workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4

# ---------------------------------------------------------------------------
# About page
# ---------------------------------------------------------------------------
[profile]
# Falls back to site.author when empty.
name = ""
headline = ""
# Markdown allowed.
bio = ""
# Adds a "Download CV" button.
# cv_url = "/pdf/cv.pdf"

# Work experience timeline, newest first. The first entry gets the
# "Latest" badge unless `latest` is set explicitly.
# [[profile.experience]]
# role = "Senior Engineer"
# period = "January 2022 - Present"
# highlights = ["Shipped the thing", "Mentored the team"]

# ---------------------------------------------------------------------------
# Footer links
# ---------------------------------------------------------------------------
# [[links]]
# label = "Github"
# url = "https://github.com/you"

# ---------------------------------------------------------------------------
# Stack page
# ---------------------------------------------------------------------------
# [[stack]]
# name = "Rust"
# category = "Languages"
# url = "https://www.rust-lang.org"
# description = "Systems work and this site's generator."
"##
}

/// Generate CSS custom properties from color config.
///
/// Dark colors apply when the root element carries `data-theme="dark"`.
pub fn generate_color_css(colors: &ColorConfig) -> String {
    format!(
        r#":root {{
    --color-bg: {light_bg};
    --color-text: {light_text};
    --color-text-muted: {light_text_muted};
    --color-border: {light_border};
    --color-link: {light_link};
    --color-link-hover: {light_link_hover};
}}

:root[data-theme="dark"] {{
    --color-bg: {dark_bg};
    --color-text: {dark_text};
    --color-text-muted: {dark_text_muted};
    --color-border: {dark_border};
    --color-link: {dark_link};
    --color-link-hover: {dark_link_hover};
}}"#,
        light_bg = colors.light.background,
        light_text = colors.light.text,
        light_text_muted = colors.light.text_muted,
        light_border = colors.light.border,
        light_link = colors.light.link,
        light_link_hover = colors.light.link_hover,
        dark_bg = colors.dark.background,
        dark_text = colors.dark.text,
        dark_text_muted = colors.dark.text_muted,
        dark_border = colors.dark.border,
        dark_link = colors.dark.link,
        dark_link_hover = colors.dark.link_hover,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_values() {
        let config = SiteConfig::default();
        assert_eq!(config.site.title, "Portfolio");
        assert_eq!(config.reading.words_per_minute, 200);
        assert_eq!(config.highlight.light_theme, "InspiredGitHub");
        assert_eq!(config.colors.dark.background, "#141318");
        assert!(config.links.is_empty());
        assert!(config.stack.is_empty());
    }

    #[test]
    fn parse_partial_config() {
        let toml = r##"
[colors.light]
background = "#fafafa"
"##;
        let config: SiteConfig = toml::from_str(toml).unwrap();
        // Overridden value
        assert_eq!(config.colors.light.background, "#fafafa");
        // Default values preserved
        assert_eq!(config.colors.light.text, "#18181b");
        assert_eq!(config.reading.words_per_minute, 200);
    }

    #[test]
    fn parse_profile_links_and_stack() {
        let toml = r#"
[profile]
name = "Ada"
cv_url = "/cv.pdf"

[[profile.experience]]
role = "Engineer"
period = "2022 - Present"
highlights = ["a", "b"]

[[links]]
label = "Github"
url = "https://github.com/ada"

[[stack]]
name = "Rust"
category = "Languages"
"#;
        let config: SiteConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.profile.name, "Ada");
        assert_eq!(config.profile.cv_url.as_deref(), Some("/cv.pdf"));
        assert_eq!(config.profile.experience[0].highlights.len(), 2);
        assert_eq!(config.profile.experience[0].latest, None);
        assert_eq!(config.links[0].label, "Github");
        assert_eq!(config.stack[0].category.as_deref(), Some("Languages"));
        assert_eq!(config.stack[0].url, None);
    }

    #[test]
    fn display_name_falls_back_to_author() {
        let mut config = SiteConfig::default();
        config.site.author = "Ada".into();
        assert_eq!(config.display_name(), "Ada");
        config.profile.name = "Ada Lovelace".into();
        assert_eq!(config.display_name(), "Ada Lovelace");
    }

    #[test]
    fn generate_css_uses_config_colors() {
        let mut colors = ColorConfig::default();
        colors.light.background = "#f0f0f0".to_string();
        colors.dark.background = "#1a1a1a".to_string();

        let css = generate_color_css(&colors);
        assert!(css.contains("--color-bg: #f0f0f0"));
        assert!(css.contains("--color-bg: #1a1a1a"));
        assert!(css.contains(r#":root[data-theme="dark"]"#));
    }

    #[test]
    fn generate_css_includes_all_variables() {
        let css = generate_color_css(&ColorConfig::default());
        for var in [
            "--color-bg:",
            "--color-text:",
            "--color-text-muted:",
            "--color-border:",
            "--color-link:",
            "--color-link-hover:",
        ] {
            assert_eq!(css.matches(var).count(), 2, "{var}");
        }
    }

    // =========================================================================
    // load_config tests
    // =========================================================================

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config, SiteConfig::default());
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("config.toml"),
            r##"
[site]
title = "Ada's Notes"

[reading]
words_per_minute = 250
"##,
        )
        .unwrap();

        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.site.title, "Ada's Notes");
        assert_eq!(config.reading.words_per_minute, 250);
        // Unspecified values should be defaults
        assert_eq!(config.highlight.dark_theme, "base16-ocean.dark");
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.toml"), "this is not valid toml [[[").unwrap();
        assert!(matches!(load_config(tmp.path()), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn load_config_validates_values() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("config.toml"),
            "[reading]\nwords_per_minute = 0\n",
        )
        .unwrap();
        let err = load_config(tmp.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("words_per_minute"));
    }

    // =========================================================================
    // Processing config tests
    // =========================================================================

    #[test]
    fn effective_threads_auto() {
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        assert_eq!(effective_threads(&ProcessingConfig::default()), cores);
    }

    #[test]
    fn effective_threads_clamped_to_cores() {
        let config = ProcessingConfig {
            max_processes: Some(99999),
        };
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        assert_eq!(effective_threads(&config), cores);
    }

    #[test]
    fn effective_threads_user_constrains_down() {
        let config = ProcessingConfig {
            max_processes: Some(1),
        };
        assert_eq!(effective_threads(&config), 1);
    }

    #[test]
    fn effective_threads_zero_means_one() {
        let config = ProcessingConfig {
            max_processes: Some(0),
        };
        assert_eq!(effective_threads(&config), 1);
    }

    // =========================================================================
    // merge_toml tests
    // =========================================================================

    #[test]
    fn merge_toml_table_merge() {
        let base: toml::Value = toml::from_str(
            r#"
[highlight]
light_theme = "InspiredGitHub"
dark_theme = "base16-ocean.dark"
"#,
        )
        .unwrap();
        let overlay: toml::Value = toml::from_str(
            r#"
[highlight]
dark_theme = "Solarized (dark)"
"#,
        )
        .unwrap();
        let merged = merge_toml(base, overlay);
        let hl = merged.get("highlight").unwrap();
        assert_eq!(hl.get("dark_theme").unwrap().as_str(), Some("Solarized (dark)"));
        assert_eq!(hl.get("light_theme").unwrap().as_str(), Some("InspiredGitHub"));
    }

    #[test]
    fn merge_toml_arrays_replace() {
        let base: toml::Value = toml::from_str(
            r#"
[[links]]
label = "a"
url = "/a"

[[links]]
label = "b"
url = "/b"
"#,
        )
        .unwrap();
        let overlay: toml::Value = toml::from_str(
            r#"
[[links]]
label = "c"
url = "/c"
"#,
        )
        .unwrap();
        let merged = merge_toml(base, overlay);
        let links = merged.get("links").unwrap().as_array().unwrap();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].get("label").unwrap().as_str(), Some("c"));
    }

    #[test]
    fn merge_toml_deep_nested() {
        let base: toml::Value = toml::from_str(
            r##"
[colors.light]
background = "#fff"
text = "#000"
"##,
        )
        .unwrap();
        let overlay: toml::Value = toml::from_str(
            r##"
[colors.light]
background = "#fafafa"
"##,
        )
        .unwrap();
        let merged = merge_toml(base, overlay);
        let light = merged.get("colors").unwrap().get("light").unwrap();
        assert_eq!(light.get("background").unwrap().as_str(), Some("#fafafa"));
        assert_eq!(light.get("text").unwrap().as_str(), Some("#000"));
    }

    // =========================================================================
    // Unknown key rejection tests
    // =========================================================================

    #[test]
    fn unknown_key_rejected() {
        let result: Result<SiteConfig, _> = toml::from_str("[reading]\nwpm = 200\n");
        let err = result.unwrap_err().to_string();
        assert!(err.contains("unknown field"));
    }

    #[test]
    fn unknown_section_rejected() {
        let result: Result<SiteConfig, _> = toml::from_str("[images]\nquality = 90\n");
        assert!(result.is_err());
    }

    #[test]
    fn unknown_key_in_array_table_rejected() {
        let result: Result<SiteConfig, _> =
            toml::from_str("[[links]]\nlabel = \"a\"\nurl = \"/a\"\nicon = \"x\"\n");
        assert!(result.is_err());
    }

    // =========================================================================
    // Validation tests
    // =========================================================================

    #[test]
    fn validate_default_config_passes() {
        assert!(SiteConfig::default().validate().is_ok());
    }

    #[test]
    fn validate_unknown_theme() {
        let mut config = SiteConfig::default();
        config.highlight.dark_theme = "one-dark-pro".into();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("highlight.dark_theme"));
    }

    #[test]
    fn validate_empty_title() {
        let mut config = SiteConfig::default();
        config.site.title = " ".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_link_needs_url() {
        let mut config = SiteConfig::default();
        config.links.push(LinkConfig {
            label: "Github".into(),
            url: String::new(),
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn resolve_config_with_overlay() {
        let overlay: toml::Value = toml::from_str("[site]\nauthor = \"Ada\"\n").unwrap();
        let config = resolve_config(stock_defaults_value(), Some(overlay)).unwrap();
        assert_eq!(config.site.author, "Ada");
        assert_eq!(config.site.title, "Portfolio");
    }

    // =========================================================================
    // stock_config_toml tests
    // =========================================================================

    #[test]
    fn stock_config_toml_roundtrips_to_defaults() {
        let config: SiteConfig = toml::from_str(stock_config_toml()).unwrap();
        assert_eq!(config, SiteConfig::default());
    }

    #[test]
    fn stock_config_toml_contains_all_sections() {
        let content = stock_config_toml();
        for section in [
            "[site]",
            "[reading]",
            "[highlight]",
            "[colors.light]",
            "[colors.dark]",
            "[processing]",
            "[profile]",
            "[[profile.experience]]",
            "[[links]]",
            "[[stack]]",
        ] {
            assert!(content.contains(section), "{section}");
        }
    }

    #[test]
    fn stock_defaults_value_has_all_sections() {
        let val = stock_defaults_value();
        assert!(val.is_table());
        for key in ["site", "reading", "highlight", "colors", "processing", "profile"] {
            assert!(val.get(key).is_some(), "{key}");
        }
    }
}

//! HTML site generation.
//!
//! Stage 3 of the folio build pipeline. Takes the processed manifest and
//! generates the final static HTML site.
//!
//! ## Generated Pages
//!
//! - **Home** (`/`): profile headline, latest posts and projects
//! - **About** (`/about/`): bio, CV link and work-experience timeline from `[profile]`
//! - **Stack** (`/stack/`): tools from `[[stack]]`, grouped by category
//! - **Portfolio** (`/portfolio/`, `/portfolio/{slug}/`): project cards and write-ups
//! - **Blog** (`/blog/`, `/blog/{slug}/`): post list and posts
//!
//! Every page shares the same header (navigation, mobile menu, theme
//! toggle) and footer (internal pages plus the configured `[[links]]`).
//!
//! ## Output Structure
//!
//! ```text
//! dist/
//! ├── index.html
//! ├── about/index.html
//! ├── stack/index.html
//! ├── portfolio/
//! │   ├── index.html
//! │   └── weather-app/index.html
//! └── blog/
//!     ├── index.html
//!     └── hello-world/index.html
//! ```
//!
//! ## CSS and JavaScript
//!
//! Static assets are embedded at compile time:
//! - `static/style.css`: Base styles and the code-block classes (colors injected from config)
//! - `static/theme.js`: Menu and theme-toggle transitions. The theme follows `prefers-color-scheme`
//!   until toggled, after which the choice is kept in `localStorage`
//!
//! ## HTML Generation
//!
//! Uses [maud](https://maud.lambda.xyz/) for compile-time HTML templating.
//! Document bodies arrive as pre-rendered HTML from the process stage and
//! are inserted unescaped; everything else is escaped by maud.

use crate::config::{self, SiteConfig, StackItem};
use crate::markdown::{self, is_internal_link};
use crate::process::OutputManifest;
use crate::types::{DocumentFields, DocumentKind, Rendered};
use crate::view_state::ViewState;
use chrono::NaiveDate;
use maud::{DOCTYPE, Markup, PreEscaped, html};
use pulldown_cmark::{Parser, html as md_html};
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

const CSS_STATIC: &str = include_str!("../static/style.css");
const JS: &str = include_str!("../static/theme.js");

/// Number of posts and projects listed on the home page.
const HOME_LATEST: usize = 3;

/// Header navigation, in display order.
pub const NAV_ITEMS: [(&str, &str); 5] = [
    ("Home", "/"),
    ("About", "/about/"),
    ("Portfolio", "/portfolio/"),
    ("Blog", "/blog/"),
    ("Stack", "/stack/"),
];

/// Result of the generate stage: every page written, by URL path.
#[derive(Debug, Default)]
pub struct GenerateResult {
    pub pages: Vec<String>,
}

pub fn generate(manifest_path: &Path, output_dir: &Path) -> Result<GenerateResult, GenerateError> {
    let manifest_content = fs::read_to_string(manifest_path)?;
    let manifest: OutputManifest = serde_json::from_str(&manifest_content)?;
    generate_manifest(&manifest, output_dir)
}

/// Generate the site from an in-memory processed manifest.
pub fn generate_manifest(
    manifest: &OutputManifest,
    output_dir: &Path,
) -> Result<GenerateResult, GenerateError> {
    let site = Site::new(&manifest.config);
    let mut result = GenerateResult::default();
    fs::create_dir_all(output_dir)?;

    let mut write = |url: String, page: Markup| -> Result<(), GenerateError> {
        write_page(output_dir, &url, page)?;
        debug!(%url, "generated");
        result.pages.push(url);
        Ok(())
    };

    write("/".into(), render_home(manifest, &site))?;
    write("/about/".into(), render_about(&site))?;
    write("/stack/".into(), render_stack(&site))?;
    write(
        "/portfolio/".into(),
        render_list_page(&manifest.projects, &site),
    )?;
    write("/blog/".into(), render_list_page(&manifest.blogs, &site))?;

    for project in &manifest.projects {
        write(project.document.url(), render_document_page(project, &site))?;
    }
    for post in &manifest.blogs {
        write(post.document.url(), render_document_page(post, &site))?;
    }

    Ok(result)
}

/// Write `page` to `<output_dir>/<url>/index.html`.
fn write_page(output_dir: &Path, url: &str, page: Markup) -> std::io::Result<()> {
    let dir = output_dir.join(url.trim_matches('/'));
    fs::create_dir_all(&dir)?;
    fs::write(dir.join("index.html"), page.into_string())
}

/// Site-wide rendering context shared by every page.
struct Site<'a> {
    config: &'a SiteConfig,
    css: String,
    state: ViewState,
}

impl<'a> Site<'a> {
    fn new(config: &'a SiteConfig) -> Self {
        let color_css = config::generate_color_css(&config.colors);
        Self {
            config,
            css: format!("{}\n\n{}", color_css, CSS_STATIC),
            state: ViewState::default(),
        }
    }

    fn page_title(&self, title: &str) -> String {
        if title.is_empty() {
            self.config.site.title.clone()
        } else {
            format!("{} | {}", title, self.config.site.title)
        }
    }
}

/// Human-readable publish date (`2022-08-01` → `August 1, 2022`).
///
/// Anything that isn't a plain ISO date is shown as written.
pub fn format_date(published_at: &str) -> String {
    let date_part = published_at.get(..10).unwrap_or(published_at);
    match NaiveDate::parse_from_str(date_part, "%Y-%m-%d") {
        Ok(date) => date.format("%B %-d, %Y").to_string(),
        Err(_) => published_at.to_string(),
    }
}

/// Whether the nav link `target` is active on `current_path`.
///
/// Home is only active on `/`; sections stay active on their sub-pages.
pub fn is_active(target: &str, current_path: &str) -> bool {
    if target == "/" {
        current_path == "/"
    } else {
        current_path.starts_with(target)
    }
}

// ============================================================================
// HTML Components
// ============================================================================

/// Renders the site header from an explicit view state.
pub fn render_header(state: ViewState, current_path: &str) -> Markup {
    let menu_open = state.is_menu_open();
    let expanded = if menu_open { "true" } else { "false" };
    html! {
        header.site-header data-menu=(state.menu.as_str()) {
            button.menu-open type="button" data-action="open" aria-label="Open menu"
                aria-expanded=(expanded) { "☰" }
            nav.site-nav {
                ul {
                    @for (label, target) in NAV_ITEMS {
                        li class=[is_active(target, current_path).then_some("active")] {
                            a href=(target) { (label) }
                        }
                    }
                }
            }
            div.menu-panel hidden[!menu_open] {
                button.menu-close type="button" data-action="close" aria-label="Close menu" { "×" }
                ul {
                    @for (label, target) in NAV_ITEMS {
                        li class=[is_active(target, current_path).then_some("active")] {
                            a href=(target) data-action="close" { (label) }
                        }
                    }
                }
            }
            button.theme-toggle type="button" data-action="toggle-theme"
                aria-label=(state.toggle_label()) { (state.toggle_label()) }
        }
    }
}

/// Renders the footer link grid: internal pages, then configured links.
pub fn render_footer(config: &SiteConfig) -> Markup {
    let internal = NAV_ITEMS.iter().map(|(label, target)| (*label, *target));
    let configured = config.links.iter().map(|l| (l.label.as_str(), l.url.as_str()));
    html! {
        footer.site-footer {
            section.footer-links {
                @for (label, url) in internal.chain(configured) {
                    (render_link(label, url))
                }
            }
        }
    }
}

/// A link that opens in a new tab unless it points inside the site.
fn render_link(label: &str, url: &str) -> Markup {
    let external = !is_internal_link(url);
    html! {
        a href=(url)
            target=[external.then_some("_blank")]
            rel=[external.then_some("noopener noreferrer")] { (label) }
    }
}

fn render_labels(labels: &[&str]) -> Markup {
    html! {
        @if !labels.is_empty() {
            ul.labels {
                @for label in labels {
                    li.label { (label) }
                }
            }
        }
    }
}

/// Card linking to a document, used on list pages and the home page.
fn render_card<F: DocumentFields>(item: &Rendered<F>) -> Markup {
    let doc = &item.document;
    let fields = &doc.fields;
    html! {
        article.card {
            @if let (DocumentKind::Project, Some(image)) = (F::KIND, fields.image()) {
                img src=(image) alt=(fields.title()) loading="lazy";
            }
            h3 { a href=(doc.url()) { (fields.title()) } }
            p.meta {
                time datetime=(fields.published_at()) { (format_date(fields.published_at())) }
                " · " (doc.computed.reading_time.text)
            }
            p.summary { (fields.summary()) }
            (render_labels(&fields.labels()))
        }
    }
}

// ============================================================================
// Page Renderers
// ============================================================================

/// Wraps page content with the shared header and footer.
/// Render a short Markdown string (the profile bio) to HTML.
fn markdown_to_html(source: &str) -> String {
    let mut out = String::new();
    md_html::push_html(&mut out, Parser::new_ext(source, markdown::options()));
    out
}

/// Absolute URL of a page, or `None` when no `base_url` is configured.
pub fn canonical_url(base_url: &str, current_path: &str) -> Option<String> {
    let base = base_url.trim_end_matches('/');
    if base.is_empty() {
        None
    } else {
        Some(format!("{base}{current_path}"))
    }
}

fn base_page(site: &Site, current_path: &str, title: &str, content: Markup) -> Markup {
    let description = site.config.site.description.as_str();
    let canonical = canonical_url(&site.config.site.base_url, current_path);
    html! {
        (DOCTYPE)
        html lang="en" data-theme=(site.state.theme.as_str()) {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                @if !description.is_empty() {
                    meta name="description" content=(description);
                }
                title { (site.page_title(title)) }
                @if let Some(href) = &canonical {
                    link rel="canonical" href=(href);
                }
                style { (PreEscaped(&site.css)) }
                script { (PreEscaped(JS)) }
            }
            body {
                (render_header(site.state, current_path))
                main { (content) }
                (render_footer(site.config))
            }
        }
    }
}

fn render_home(manifest: &OutputManifest, site: &Site) -> Markup {
    let profile = &site.config.profile;
    let content = html! {
        section.intro {
            h1 { (site.config.display_name()) }
            @if !profile.headline.is_empty() {
                p.headline { (profile.headline) }
            }
        }
        @if !manifest.blogs.is_empty() {
            section.latest {
                h2 { a href="/blog/" { "Latest posts" } }
                @for post in manifest.blogs.iter().take(HOME_LATEST) {
                    (render_card(post))
                }
            }
        }
        @if !manifest.projects.is_empty() {
            section.latest {
                h2 { a href="/portfolio/" { "Projects" } }
                @for project in manifest.projects.iter().take(HOME_LATEST) {
                    (render_card(project))
                }
            }
        }
    };
    base_page(site, "/", "", content)
}

fn render_about(site: &Site) -> Markup {
    let profile = &site.config.profile;
    let content = html! {
        section.about {
            header.profile {
                h1 { (site.config.display_name()) }
                @if !site.config.links.is_empty() {
                    ul.profile-links {
                        @for link in &site.config.links {
                            li { (render_link(&link.label, &link.url)) }
                        }
                    }
                }
                @if !profile.bio.is_empty() {
                    div.bio { (PreEscaped(markdown_to_html(&profile.bio))) }
                }
            }
            @if !profile.experience.is_empty() || profile.cv_url.is_some() {
                div.experience-header {
                    h2 { "Work Experience" }
                    @if let Some(cv) = &profile.cv_url {
                        a.cv-link href=(cv) target="_blank" rel="noopener noreferrer" { "Download CV" }
                    }
                }
            }
            @if !profile.experience.is_empty() {
                ol.timeline {
                    @for (i, exp) in profile.experience.iter().enumerate() {
                        li {
                            h3 {
                                (exp.role)
                                @if exp.latest.unwrap_or(i == 0) {
                                    " " span.badge { "Latest" }
                                }
                            }
                            @if !exp.period.is_empty() {
                                time { (exp.period) }
                            }
                            @if !exp.highlights.is_empty() {
                                ul {
                                    @for highlight in &exp.highlights {
                                        li { (highlight) }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    };
    base_page(site, "/about/", "About", content)
}

/// Group stack entries by category, keeping first-appearance order.
fn group_stack(items: &[StackItem]) -> Vec<(&str, Vec<&StackItem>)> {
    let mut groups: Vec<(&str, Vec<&StackItem>)> = Vec::new();
    for item in items {
        let category = item.category.as_deref().unwrap_or("Other");
        match groups.iter_mut().find(|(name, _)| *name == category) {
            Some((_, members)) => members.push(item),
            None => groups.push((category, vec![item])),
        }
    }
    groups
}

fn render_stack(site: &Site) -> Markup {
    let content = html! {
        section.stack {
            h1 { "Stack" }
            @for (category, items) in group_stack(&site.config.stack) {
                h2 { (category) }
                ul.stack-items {
                    @for item in items {
                        li {
                            @match &item.url {
                                Some(url) => { (render_link(&item.name, url)) }
                                None => { span { (item.name) } }
                            }
                            @if let Some(description) = &item.description {
                                p { (description) }
                            }
                        }
                    }
                }
            }
        }
    };
    base_page(site, "/stack/", "Stack", content)
}

/// List page for one document kind (`/blog/` or `/portfolio/`).
fn render_list_page<F: DocumentFields>(items: &[Rendered<F>], site: &Site) -> Markup {
    let (heading, path) = match F::KIND {
        DocumentKind::Blog => ("Blog", "/blog/"),
        DocumentKind::Project => ("Portfolio", "/portfolio/"),
    };
    let content = html! {
        section.list {
            h1 { (heading) }
            @if items.is_empty() {
                p.empty { "Nothing published yet." }
            }
            @for item in items {
                (render_card(item))
            }
        }
    };
    base_page(site, path, heading, content)
}

fn render_document_page<F: DocumentFields>(item: &Rendered<F>, site: &Site) -> Markup {
    let doc = &item.document;
    let fields = &doc.fields;
    let url = doc.url();
    let content = html! {
        article.document {
            header {
                h1 { (fields.title()) }
                p.meta {
                    time datetime=(fields.published_at()) { (format_date(fields.published_at())) }
                    " · " (doc.computed.reading_time.text)
                    " · " (doc.computed.word_count) " words"
                }
                (render_labels(&fields.labels()))
                @if let Some(image) = fields.image() {
                    img.cover src=(image) alt=(fields.title());
                }
            }
            div.prose { (PreEscaped(&item.html)) }
        }
    };
    base_page(site, &url, fields.title(), content)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LinkConfig;
    use crate::process;
    use crate::rewrite::classes;
    use crate::scan;
    use crate::test_helpers::*;
    use crate::view_state::{Action, reduce};

    fn build_fixtures() -> (tempfile::TempDir, OutputManifest) {
        let tmp = setup_fixtures();
        let manifest = scan::scan(tmp.path()).unwrap();
        let result =
            process::process_manifest(manifest, &tmp.path().join("processed"), false, None).unwrap();
        (tmp, result.manifest)
    }

    #[test]
    fn format_date_iso() {
        assert_eq!(format_date("2022-08-01"), "August 1, 2022");
        assert_eq!(format_date("2021-11-02T10:00:00Z"), "November 2, 2021");
    }

    #[test]
    fn format_date_falls_back_to_raw() {
        assert_eq!(format_date("Summer 2021"), "Summer 2021");
        assert_eq!(format_date(""), "");
    }

    #[test]
    fn home_only_active_on_root() {
        assert!(is_active("/", "/"));
        assert!(!is_active("/", "/blog/"));
        assert!(is_active("/blog/", "/blog/hello-world/"));
        assert!(!is_active("/blog/", "/about/"));
    }

    #[test]
    fn header_marks_active_link() {
        let html = render_header(ViewState::default(), "/portfolio/folio/").into_string();
        assert!(html.contains(r#"<li class="active"><a href="/portfolio/">Portfolio</a></li>"#));
        assert!(!html.contains(r#"<li class="active"><a href="/blog/">"#));
    }

    #[test]
    fn header_renders_from_view_state() {
        let closed = render_header(ViewState::default(), "/").into_string();
        assert!(closed.contains(r#"data-menu="closed""#));
        assert!(closed.contains("hidden"));
        assert!(closed.contains("Dark mode"));

        let open = reduce(reduce(ViewState::default(), Action::Open), Action::ToggleTheme);
        let html = render_header(open, "/").into_string();
        assert!(html.contains(r#"data-menu="open""#));
        assert!(!html.contains("hidden"));
        assert!(html.contains("Light mode"));
    }

    #[test]
    fn footer_marks_external_links() {
        let config = SiteConfig {
            links: vec![LinkConfig {
                label: "Github".into(),
                url: "https://github.com/ada".into(),
            }],
            ..SiteConfig::default()
        };
        let html = render_footer(&config).into_string();
        assert!(html.contains(r#"<a href="/stack/">Stack</a>"#));
        assert!(html.contains(
            r#"<a href="https://github.com/ada" target="_blank" rel="noopener noreferrer">Github</a>"#
        ));
    }

    #[test]
    fn group_stack_keeps_first_appearance_order() {
        let item = |name: &str, category: Option<&str>| StackItem {
            name: name.into(),
            category: category.map(String::from),
            url: None,
            description: None,
        };
        let items = vec![
            item("Rust", Some("Languages")),
            item("Neovim", Some("Editors")),
            item("Go", Some("Languages")),
            item("Make", None),
        ];
        let groups = group_stack(&items);
        let names: Vec<&str> = groups.iter().map(|(c, _)| *c).collect();
        assert_eq!(names, vec!["Languages", "Editors", "Other"]);
        assert_eq!(groups[0].1.len(), 2);
    }

    #[test]
    fn html_escape_in_maud() {
        let html = render_link("<script>alert('xss')</script>", "/x/").into_string();
        assert!(!html.contains("<script>alert"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn generate_writes_every_page() {
        let (tmp, manifest) = build_fixtures();
        let dist = tmp.path().join("dist");
        let result = generate_manifest(&manifest, &dist).unwrap();

        assert_eq!(result.pages.len(), 5 + 4);
        for page in [
            "index.html",
            "about/index.html",
            "stack/index.html",
            "portfolio/index.html",
            "portfolio/folio/index.html",
            "portfolio/weather-app/index.html",
            "blog/index.html",
            "blog/hello-world/index.html",
            "blog/my.notes/index.html",
        ] {
            assert!(dist.join(page).exists(), "missing {page}");
        }
    }

    #[test]
    fn document_page_embeds_rendered_body() {
        let (tmp, manifest) = build_fixtures();
        let dist = tmp.path().join("dist");
        generate_manifest(&manifest, &dist).unwrap();

        let html = fs::read_to_string(dist.join("blog/hello-world/index.html")).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains(classes::BLOCK));
        assert!(html.contains("August 1, 2022"));
        assert!(html.contains("min read"));
        assert!(html.contains(r#"<li class="active"><a href="/blog/">Blog</a></li>"#));
    }

    #[test]
    fn about_page_uses_profile() {
        let (tmp, manifest) = build_fixtures();
        let dist = tmp.path().join("dist");
        generate_manifest(&manifest, &dist).unwrap();

        let html = fs::read_to_string(dist.join("about/index.html")).unwrap();
        assert!(html.contains(manifest.config.display_name()));
        assert!(html.contains("Work Experience"));
        assert!(html.contains("Latest"));
        assert!(html.contains("Writes about <strong>engines</strong> and notation."));
        assert!(!html.contains("**engines**"));
    }

    #[test]
    fn bio_markdown_links_and_escaping() {
        let html = markdown_to_html("See [my notes](/blog/) & more");
        assert_eq!(html, "<p>See <a href=\"/blog/\">my notes</a> &amp; more</p>\n");
    }

    #[test]
    fn canonical_url_joins_base_and_path() {
        assert_eq!(
            canonical_url("https://example.dev", "/blog/hello/").as_deref(),
            Some("https://example.dev/blog/hello/")
        );
        assert_eq!(
            canonical_url("https://example.dev/", "/").as_deref(),
            Some("https://example.dev/")
        );
        assert_eq!(canonical_url("", "/about/"), None);
    }

    #[test]
    fn canonical_link_only_with_base_url() {
        let (tmp, mut manifest) = build_fixtures();
        let dist = tmp.path().join("dist");
        generate_manifest(&manifest, &dist).unwrap();
        let html = fs::read_to_string(dist.join("blog/hello-world/index.html")).unwrap();
        assert!(!html.contains(r#"rel="canonical""#));

        manifest.config.site.base_url = "https://ada.example/".into();
        generate_manifest(&manifest, &dist).unwrap();
        let html = fs::read_to_string(dist.join("blog/hello-world/index.html")).unwrap();
        assert!(html.contains(r#"<link rel="canonical" href="https://ada.example/blog/hello-world/">"#));
    }

    #[test]
    fn css_includes_config_colors() {
        let (tmp, manifest) = build_fixtures();
        let dist = tmp.path().join("dist");
        generate_manifest(&manifest, &dist).unwrap();

        let html = fs::read_to_string(dist.join("index.html")).unwrap();
        assert!(html.contains("--color-bg"));
        assert!(html.contains(r#":root[data-theme="dark"]"#));
    }

    #[test]
    fn theme_script_follows_system_preference() {
        let (tmp, manifest) = build_fixtures();
        let dist = tmp.path().join("dist");
        generate_manifest(&manifest, &dist).unwrap();

        let html = fs::read_to_string(dist.join("index.html")).unwrap();
        let head = &html[..html.find("</head>").unwrap()];
        assert!(head.contains("prefers-color-scheme: dark"));
        assert!(head.contains("localStorage.getItem"));
        // Only a toggle click writes the stored choice.
        let persist = JS.find("localStorage.setItem").unwrap();
        assert!(JS[..persist].contains("function persist"));
        assert_eq!(JS.matches("localStorage.setItem").count(), 1);
    }

    #[test]
    fn generate_reads_manifest_file() {
        let (tmp, manifest) = build_fixtures();
        let path = tmp.path().join("processed-manifest.json");
        fs::write(&path, serde_json::to_string(&manifest).unwrap()).unwrap();
        let result = generate(&path, &tmp.path().join("dist")).unwrap();
        assert!(result.pages.contains(&"/blog/hello-world/".to_string()));
    }
}

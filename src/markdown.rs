//! Markdown → node tree conversion.
//!
//! pulldown-cmark produces a flat stream of start/end events; this module
//! folds it into a [`hast`](crate::hast) tree with a stack of open frames.
//! Every `Start` pushes a frame and every `End` pops one, so nesting always
//! balances even for tags rendered as nothing (front-matter blocks, HTML
//! block wrappers).
//!
//! Code is handed to the [`Highlighter`] on the way:
//! fenced and indented blocks become fragment containers, inline code with a
//! `{:lang}` suffix becomes an inline fragment, everything else stays a bare
//! `code` element for the presentation rewriter to wrap.

use crate::hast::{Element, Node};
use crate::highlight::{FenceMeta, HighlightError, Highlighter};
use pulldown_cmark::{
    Alignment, CodeBlockKind, Event, HeadingLevel, LinkType, Options, Parser, Tag, TagEnd,
};

/// Class on links that leave the site.
pub const EXTERNAL_LINK_CLASS: &str =
    "font-bold text-blue-400 underline transition underline-offset-2 hover:text-blue-600";

/// Parser extensions enabled for content bodies (GitHub-flavored Markdown).
pub fn options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_HEADING_ATTRIBUTES
}

/// Whether a link target stays on the site.
pub fn is_internal_link(href: &str) -> bool {
    href.starts_with('/') || href.starts_with('#')
}

enum FrameKind {
    Element(Element),
    /// Children are spliced into the parent.
    Transparent,
    /// Content is dropped.
    Skip,
    CodeBlock(FenceMeta),
    Image { src: String, title: String },
    TableHead,
}

struct Frame {
    kind: FrameKind,
    children: Vec<Node>,
    /// Raw text of a code block.
    code: String,
}

impl Frame {
    fn new(kind: FrameKind) -> Self {
        Self {
            kind,
            children: Vec::new(),
            code: String::new(),
        }
    }
}

struct Converter<'h> {
    highlighter: &'h Highlighter,
    stack: Vec<Frame>,
    alignments: Vec<Alignment>,
    in_table_head: bool,
    cell: usize,
}

/// Convert a Markdown body into a node list.
pub fn to_tree(markdown: &str, highlighter: &Highlighter) -> Result<Vec<Node>, HighlightError> {
    let mut conv = Converter {
        highlighter,
        stack: vec![Frame::new(FrameKind::Transparent)],
        alignments: Vec::new(),
        in_table_head: false,
        cell: 0,
    };

    for event in Parser::new_ext(markdown, options()) {
        conv.event(event)?;
    }

    // Unbalanced input cannot come out of pulldown-cmark, but never lose nodes.
    while conv.stack.len() > 1 {
        conv.close()?;
    }
    Ok(conv.stack.pop().map(|f| f.children).unwrap_or_default())
}

impl Converter<'_> {
    fn top(&mut self) -> &mut Frame {
        let last = self.stack.len() - 1;
        &mut self.stack[last]
    }

    fn push(&mut self, node: Node) {
        self.top().children.push(node);
    }

    fn event(&mut self, event: Event<'_>) -> Result<(), HighlightError> {
        match event {
            Event::Start(tag) => {
                let kind = self.open(tag);
                self.stack.push(Frame::new(kind));
            }
            Event::End(_) => self.close()?,
            Event::Text(text) => {
                if matches!(self.top().kind, FrameKind::CodeBlock(_)) {
                    self.top().code.push_str(&text);
                } else {
                    self.push(Node::text(text.into_string()));
                }
            }
            Event::Code(code) => {
                let node = match self.highlighter.inline(&code)? {
                    Some(fragment) => fragment.into(),
                    None => Element::new("code")
                        .with_children(vec![Node::text(code.into_string())])
                        .into(),
                };
                self.push(node);
            }
            Event::Html(html) | Event::InlineHtml(html) => {
                self.push(Node::Raw(html.into_string()));
            }
            Event::SoftBreak => self.push(Node::text("\n")),
            Event::HardBreak => self.push(Element::new("br").into()),
            Event::Rule => self.push(Element::new("hr").into()),
            Event::TaskListMarker(checked) => {
                let mut input = Element::new("input")
                    .with_attr("type", "checkbox")
                    .with_flag("disabled");
                if checked {
                    input = input.with_flag("checked");
                }
                self.push(input.into());
            }
            Event::FootnoteReference(label) => {
                let link = Element::new("a")
                    .with_attr("href", format!("#fn-{label}"))
                    .with_children(vec![Node::text(label.into_string())]);
                self.push(
                    Element::new("sup")
                        .with_classes(["footnote-reference"])
                        .with_children(vec![link.into()])
                        .into(),
                );
            }
            Event::InlineMath(math) | Event::DisplayMath(math) => {
                self.push(Node::text(math.into_string()));
            }
        }
        Ok(())
    }

    fn open(&mut self, tag: Tag<'_>) -> FrameKind {
        let el = match tag {
            Tag::Paragraph => Element::new("p"),
            Tag::Heading { level, id, .. } => {
                let el = Element::new(heading_tag(level));
                match id {
                    Some(id) => el.with_attr("id", id.into_string()),
                    None => el,
                }
            }
            Tag::BlockQuote(_) => Element::new("blockquote"),
            Tag::CodeBlock(CodeBlockKind::Fenced(info)) => {
                return FrameKind::CodeBlock(FenceMeta::parse(&info));
            }
            Tag::CodeBlock(CodeBlockKind::Indented) => {
                return FrameKind::CodeBlock(FenceMeta::default());
            }
            Tag::HtmlBlock => return FrameKind::Transparent,
            Tag::List(Some(start)) => {
                let ol = Element::new("ol");
                if start == 1 {
                    ol
                } else {
                    ol.with_attr("start", start.to_string())
                }
            }
            Tag::List(None) => Element::new("ul"),
            Tag::Item => Element::new("li"),
            Tag::FootnoteDefinition(label) => Element::new("div")
                .with_classes(["footnote-definition"])
                .with_attr("id", format!("fn-{label}")),
            Tag::Table(alignments) => {
                self.alignments = alignments;
                Element::new("table")
            }
            Tag::TableHead => {
                self.in_table_head = true;
                self.cell = 0;
                return FrameKind::TableHead;
            }
            Tag::TableRow => {
                self.cell = 0;
                Element::new("tr")
            }
            Tag::TableCell => {
                let el = Element::new(if self.in_table_head { "th" } else { "td" });
                let align = self.alignments.get(self.cell).copied();
                self.cell += 1;
                match align {
                    Some(Alignment::Left) => el.with_attr("style", "text-align:left"),
                    Some(Alignment::Center) => el.with_attr("style", "text-align:center"),
                    Some(Alignment::Right) => el.with_attr("style", "text-align:right"),
                    _ => el,
                }
            }
            Tag::Emphasis => Element::new("em"),
            Tag::Strong => Element::new("strong"),
            Tag::Strikethrough => Element::new("del"),
            Tag::Link {
                link_type,
                dest_url,
                title,
                ..
            } => link(link_type, &dest_url, &title),
            Tag::Image {
                dest_url, title, ..
            } => {
                return FrameKind::Image {
                    src: dest_url.into_string(),
                    title: title.into_string(),
                };
            }
            Tag::MetadataBlock(_) => return FrameKind::Skip,
            _ => return FrameKind::Transparent,
        };
        FrameKind::Element(el)
    }

    fn close(&mut self) -> Result<(), HighlightError> {
        let Some(frame) = self.stack.pop() else {
            return Ok(());
        };
        match frame.kind {
            FrameKind::Element(el) => {
                let el = el.with_children(frame.children);
                self.push(el.into());
            }
            FrameKind::Transparent => {
                self.top().children.extend(frame.children);
            }
            FrameKind::Skip => {}
            FrameKind::CodeBlock(meta) => {
                let fragment = self.highlighter.block(&frame.code, &meta)?;
                self.push(fragment.into());
            }
            FrameKind::Image { src, title } => {
                let alt: String = frame.children.iter().map(Node::text_content).collect();
                let mut img = Element::new("img").with_attr("src", src).with_attr("alt", alt);
                if !title.is_empty() {
                    img = img.with_attr("title", title);
                }
                self.push(img.into());
            }
            FrameKind::TableHead => {
                self.in_table_head = false;
                let row = Element::new("tr").with_children(frame.children);
                let head = Element::new("thead").with_children(vec![row.into()]);
                self.push(head.into());
            }
        }
        Ok(())
    }
}

fn heading_tag(level: HeadingLevel) -> &'static str {
    match level {
        HeadingLevel::H1 => "h1",
        HeadingLevel::H2 => "h2",
        HeadingLevel::H3 => "h3",
        HeadingLevel::H4 => "h4",
        HeadingLevel::H5 => "h5",
        HeadingLevel::H6 => "h6",
    }
}

fn link(link_type: LinkType, dest: &str, title: &str) -> Element {
    let href = match link_type {
        LinkType::Email => format!("mailto:{dest}"),
        _ => dest.to_string(),
    };
    let mut a = Element::new("a").with_attr("href", href.as_str());
    if !title.is_empty() {
        a = a.with_attr("title", title);
    }
    if !is_internal_link(&href) {
        a = a
            .with_attr("target", "_blank")
            .with_attr("rel", "noopener noreferrer")
            .with_classes([EXTERNAL_LINK_CLASS]);
    }
    a
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hast::to_html;
    use crate::highlight::{FRAGMENT_MARKER, LINE_NUMBERS_MARKER};

    fn highlighter() -> Highlighter {
        Highlighter::new("InspiredGitHub", "base16-ocean.dark").unwrap()
    }

    fn html(md: &str) -> String {
        to_html(&to_tree(md, &highlighter()).unwrap())
    }

    #[test]
    fn paragraphs_and_emphasis() {
        assert_eq!(
            html("Hello *there* **you** ~~not~~"),
            "<p>Hello <em>there</em> <strong>you</strong> <del>not</del></p>"
        );
    }

    #[test]
    fn headings_with_explicit_id() {
        assert_eq!(html("## Setup {#setup}"), r#"<h2 id="setup">Setup</h2>"#);
        assert_eq!(html("###### Deep"), "<h6>Deep</h6>");
    }

    #[test]
    fn bare_inline_code_has_no_properties() {
        let tree = to_tree("run `cargo build`", &highlighter()).unwrap();
        let p = tree[0].as_element().unwrap();
        let code = p.children[1].as_element().unwrap();
        assert!(code.is("code"));
        assert!(code.properties.is_empty());
        assert_eq!(code.children, vec![Node::text("cargo build")]);
    }

    #[test]
    fn inline_code_with_language_is_fragment() {
        let tree = to_tree("see `Vec::new(){:rust}`", &highlighter()).unwrap();
        let p = tree[0].as_element().unwrap();
        let span = p.children[1].as_element().unwrap();
        assert!(span.is("span"));
        assert!(span.has(FRAGMENT_MARKER));
    }

    #[test]
    fn fenced_block_becomes_fragment() {
        let md = "```rust showLineNumbers\nfn main() {}\n```\n";
        let tree = to_tree(md, &highlighter()).unwrap();
        assert_eq!(tree.len(), 1);
        let div = tree[0].as_element().unwrap();
        assert!(div.is("div"));
        assert!(div.has(FRAGMENT_MARKER));
        let code = div.children[0].as_element().unwrap().children[0]
            .as_element()
            .unwrap();
        assert!(code.has(LINE_NUMBERS_MARKER));
        let node: Node = code.clone().into();
        assert_eq!(node.text_content(), "fn main() {}");
    }

    #[test]
    fn indented_block_is_highlighted_as_plain_text() {
        let tree = to_tree("para\n\n    let x = 1;\n", &highlighter()).unwrap();
        let div = tree[1].as_element().unwrap();
        assert!(div.has(FRAGMENT_MARKER));
    }

    #[test]
    fn external_links_open_in_new_tab() {
        let out = html("[gh](https://github.com)");
        assert!(out.contains(r#"href="https://github.com""#));
        assert!(out.contains(r#"target="_blank""#));
        assert!(out.contains(r#"rel="noopener noreferrer""#));
        assert!(out.contains(EXTERNAL_LINK_CLASS));
    }

    #[test]
    fn internal_links_stay_plain() {
        assert_eq!(html("[about](/about)"), r#"<p><a href="/about">about</a></p>"#);
        assert_eq!(html("[top](#top)"), r##"<p><a href="#top">top</a></p>"##);
    }

    #[test]
    fn images_collect_alt_text() {
        assert_eq!(
            html(r#"![A *cat*](/cat.png "Cat")"#),
            r#"<p><img alt="A cat" src="/cat.png" title="Cat"></p>"#
        );
    }

    #[test]
    fn lists_and_tasks() {
        let out = html("- [x] done\n- [ ] todo\n");
        assert!(out.starts_with("<ul><li>"));
        assert!(out.contains(r#"<input checked disabled type="checkbox">"#));
        assert!(out.contains(r#"<input disabled type="checkbox">"#));

        assert_eq!(html("3. three\n4. four\n"), r#"<ol start="3"><li>three</li><li>four</li></ol>"#);
    }

    #[test]
    fn tables_with_alignment() {
        let out = html("| a | b |\n|:--|--:|\n| 1 | 2 |\n");
        assert!(out.starts_with("<table><thead><tr><th style=\"text-align:left\">a</th>"));
        assert!(out.contains(r#"<td style="text-align:right">2</td>"#));
    }

    #[test]
    fn raw_html_passes_through() {
        let out = html("<Callout type=\"info\" />\n\nafter");
        assert!(out.contains("<Callout type=\"info\" />"));
        assert!(out.contains("<p>after</p>"));
    }

    #[test]
    fn footnotes_link_to_definitions() {
        let out = html("Claim[^1].\n\n[^1]: Source.\n");
        assert!(out.contains(r##"<a href="#fn-1">1</a>"##));
        assert!(out.contains(r#"id="fn-1""#));
    }

    #[test]
    fn internal_link_detection() {
        assert!(is_internal_link("/blog/x"));
        assert!(is_internal_link("#section"));
        assert!(!is_internal_link("https://x.dev"));
        assert!(!is_internal_link("mailto:a@b.c"));
    }
}

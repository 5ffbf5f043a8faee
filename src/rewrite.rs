//! Presentation rewriter for highlighted code.
//!
//! Runs after [`crate::highlight`] has turned code spans into fragments and
//! before serialization. It only relabels nodes: the stylesheet keys off the
//! class names in [`classes`], so those strings are a public interface and
//! changing any of them is a breaking change for the site's CSS.
//!
//! Each element is classified once into a [`Role`] and handled by exactly one
//! rule, then its children are visited:
//!
//! | Role               | Match                                      | Rewrite                                                   |
//! |--------------------|--------------------------------------------|-----------------------------------------------------------|
//! | `BareInlineCode`   | `code`, empty property bag, has a text child | becomes `span.INLINE_BLOCK > code.INLINE_CODE > text`     |
//! | `InlineFragment`   | `span[data-code-fragment]`                 | span += INLINE_BLOCK, first child += INLINE_CODE          |
//! | `BlockFragment`    | `div[data-code-fragment]`                  | div += BLOCK, title += TITLE, `pre` = PRE, `code` += CODE |
//! | `Line`             | `span[data-line]`                          | placeholder text if empty, += HIGHLIGHTED_LINE if flagged |
//!
//! Inline vs block fragments are told apart by tag label alone (`span` vs
//! `div`). That mirrors what the highlighter emits today; if its output shape
//! changes, fragments fall through to `Role::Other` and are left untouched
//! rather than guessed at.

use crate::hast::{Element, Node};
use crate::highlight::{
    FRAGMENT_MARKER, HIGHLIGHTED_LINE_MARKER, LINE_MARKER, LINE_NUMBERS_MARKER, TITLE_MARKER,
};

/// Class names the stylesheet depends on.
pub mod classes {
    /// `div` fragment container around a highlighted block.
    pub const BLOCK: &str = "overflow-hidden rounded-lg leading-6 shadow-lg mb-5";
    /// Title bar above a block.
    pub const TITLE: &str = "rounded-t-md bg-zinc-200 dark:bg-[#23272e] px-3 py-1 font-mono text-xs dark:!text-white/70 !text-black/70";
    /// `pre` inside a block.
    pub const PRE: &str = "overflow-x-auto py-2 text-[13px] bg-zinc-100 dark:bg-[#23272e]";
    /// `code` inside a block: one grid row per line.
    pub const CODE: &str = "grid [&>span]:border-l-4 [&>span]:border-l-transparent [&>span]:pl-2 [&>span]:pr-3";
    /// Badge around inline code.
    pub const INLINE_BLOCK: &str = "whitespace-nowrap border border-indigo-200 dark:border-indigo-400/10 px-1.5 py-px text-[12px] rounded-full bg-white/5 whitespace-nowrap text-indigo-500 dark:text-indigo-200/80";
    /// Inline `code` element. Intentionally empty: the badge carries the styling.
    pub const INLINE_CODE: &str = "";
    /// Line-number gutter, added to `code` when numbering is on.
    pub const NUMBERED_LINES: &str = "[counter-reset:line] before:[&>span]:mr-3 before:[&>span]:inline-block before:[&>span]:w-4 before:[&>span]:text-right before:[&>span]:text-white/20 before:[&>span]:![content:counter(line)] before:[&>span]:[counter-increment:line]";
    /// Highlighted line.
    pub const HIGHLIGHTED_LINE: &str = "!border-l-indigo-800/70 bg-indigo-200/50 dark:!border-l-cyan-300/70 dark:bg-cyan-200/10 before:!text-indigo-700 dark:before:!text-white/70";

    /// Every contract class, for cache keys and stylesheet checks.
    pub const ALL: &[&str] = &[
        BLOCK,
        TITLE,
        PRE,
        CODE,
        INLINE_BLOCK,
        INLINE_CODE,
        NUMBERED_LINES,
        HIGHLIGHTED_LINE,
    ];
}

/// Text inserted into empty lines so they keep their height in the grid and
/// survive copy/paste.
pub const LINE_PLACEHOLDER: &str = " ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Line,
    BareInlineCode,
    InlineFragment,
    BlockFragment,
    Other,
}

fn classify(el: &Element) -> Role {
    if el.has(FRAGMENT_MARKER) {
        return match el.tag.as_str() {
            "span" => Role::InlineFragment,
            "div" => Role::BlockFragment,
            _ => Role::Other,
        };
    }
    if el.is("span") && el.has(LINE_MARKER) {
        return Role::Line;
    }
    if el.is("code") && el.properties.is_empty() && el.children.iter().any(Node::is_text) {
        return Role::BareInlineCode;
    }
    Role::Other
}

/// Rewrite a node list in place.
pub fn rewrite(nodes: &mut [Node]) {
    for node in nodes {
        if let Node::Element(el) = node {
            rewrite_element(el);
        }
    }
}

fn rewrite_element(el: &mut Element) {
    match classify(el) {
        Role::Line => style_line(el),
        Role::BareInlineCode => wrap_inline_code(el),
        Role::InlineFragment => style_inline_fragment(el),
        Role::BlockFragment => style_block_fragment(el),
        Role::Other => {}
    }
    rewrite(&mut el.children);
}

fn style_line(line: &mut Element) {
    if line.children.is_empty() {
        line.children.push(Node::text(LINE_PLACEHOLDER));
    }
    if line.has(HIGHLIGHTED_LINE_MARKER) {
        line.add_class(classes::HIGHLIGHTED_LINE);
    }
}

fn wrap_inline_code(code: &mut Element) {
    let Some(pos) = code.children.iter().position(Node::is_text) else {
        return;
    };
    if let Node::Text(value) = &code.children[pos] {
        let inner = Element::new("code")
            .with_classes([classes::INLINE_CODE])
            .with_children(vec![Node::text(value.clone())]);
        code.children[pos] = inner.into();
    }
    code.tag = "span".to_string();
    code.set_classes(vec![classes::INLINE_BLOCK.to_string()]);
}

fn style_inline_fragment(span: &mut Element) {
    span.add_class(classes::INLINE_BLOCK);
    if let Some(first) = span.children.first_mut().and_then(Node::as_element_mut) {
        first.add_class(classes::INLINE_CODE);
    }
}

fn style_block_fragment(container: &mut Element) {
    container.add_class(classes::BLOCK);
    for child in container.children.iter_mut().filter_map(Node::as_element_mut) {
        if child.is("div") && child.has(TITLE_MARKER) {
            child.add_class(classes::TITLE);
        }
        if child.is("pre") {
            child.set_classes(vec![classes::PRE.to_string()]);
            let first = child.children.first_mut().and_then(Node::as_element_mut);
            if let Some(code) = first.filter(|el| el.is("code")) {
                code.add_class(classes::CODE);
                if code.has(LINE_NUMBERS_MARKER) {
                    code.add_class(classes::NUMBERED_LINES);
                }
            }
        }
    }
}

//! A small HTML syntax tree.
//!
//! Rendered Markdown is kept as a tree until the presentation rewriter
//! ([`crate::rewrite`]) has assigned its class names, then serialized with
//! [`to_html`]. The tree is deliberately minimal:
//!
//! - [`Node::Text`]: character data, escaped on output
//! - [`Node::Element`]: a tag label, a property bag and children
//! - [`Node::Raw`]: pre-rendered HTML passed through verbatim (inline HTML
//!   and MDX blocks authored in the content)
//!
//! Properties are an ordered map so serialization is stable across runs.

use std::collections::BTreeMap;

/// A property value on an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropValue {
    /// A plain attribute value.
    Str(String),
    /// A space-separated token list (used for `class`).
    List(Vec<String>),
    /// A presence-only marker, rendered as an empty attribute.
    Flag,
}

pub type Properties = BTreeMap<String, PropValue>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    pub properties: Properties,
    pub children: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Text(String),
    Element(Element),
    Raw(String),
}

const CLASS: &str = "class";

/// Elements that never have children or a closing tag.
const VOID_ELEMENTS: &[&str] = &["br", "hr", "img", "input", "meta", "link", "source", "wbr"];

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            properties: Properties::new(),
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }

    pub fn with_attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.properties
            .insert(name.to_string(), PropValue::Str(value.into()));
        self
    }

    pub fn with_flag(mut self, name: &str) -> Self {
        self.properties.insert(name.to_string(), PropValue::Flag);
        self
    }

    pub fn with_classes<I, S>(mut self, classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set_classes(classes.into_iter().map(Into::into).collect());
        self
    }

    pub fn is(&self, tag: &str) -> bool {
        self.tag == tag
    }

    /// Whether a property is present, whatever its value.
    pub fn has(&self, name: &str) -> bool {
        self.properties.contains_key(name)
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        match self.properties.get(name) {
            Some(PropValue::Str(s)) => Some(s),
            _ => None,
        }
    }

    /// Current class list. A plain string `class` is split on whitespace.
    pub fn classes(&self) -> Vec<String> {
        match self.properties.get(CLASS) {
            Some(PropValue::List(list)) => list.clone(),
            Some(PropValue::Str(s)) => s.split_whitespace().map(String::from).collect(),
            _ => Vec::new(),
        }
    }

    /// Replace the class list.
    pub fn set_classes(&mut self, classes: Vec<String>) {
        self.properties
            .insert(CLASS.to_string(), PropValue::List(classes));
    }

    /// Append a class, keeping every existing one.
    pub fn add_class(&mut self, class: &str) {
        let mut classes = self.classes();
        classes.push(class.to_string());
        self.set_classes(classes);
    }
}

impl Node {
    pub fn text(value: impl Into<String>) -> Self {
        Node::Text(value.into())
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Node::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Node::Text(_))
    }

    /// Concatenated text content of this node and its descendants.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }
}

impl From<Element> for Node {
    fn from(el: Element) -> Self {
        Node::Element(el)
    }
}

fn collect_text(node: &Node, out: &mut String) {
    match node {
        Node::Text(t) => out.push_str(t),
        Node::Element(el) => el.children.iter().for_each(|c| collect_text(c, out)),
        Node::Raw(_) => {}
    }
}

// ============================================================================
// Serialization
// ============================================================================

/// Serialize a node list to an HTML string.
pub fn to_html(nodes: &[Node]) -> String {
    let mut out = String::new();
    for node in nodes {
        write_node(node, &mut out);
    }
    out
}

fn write_node(node: &Node, out: &mut String) {
    match node {
        Node::Text(t) => escape_into(t, false, out),
        Node::Raw(html) => out.push_str(html),
        Node::Element(el) => {
            out.push('<');
            out.push_str(&el.tag);
            for (name, value) in &el.properties {
                match value {
                    PropValue::Flag => {
                        out.push(' ');
                        out.push_str(name);
                    }
                    PropValue::Str(s) => write_attr(name, s, out),
                    PropValue::List(list) => write_attr(name, &list.join(" "), out),
                }
            }
            out.push('>');
            if VOID_ELEMENTS.contains(&el.tag.as_str()) {
                return;
            }
            for child in &el.children {
                write_node(child, out);
            }
            out.push_str("</");
            out.push_str(&el.tag);
            out.push('>');
        }
    }
}

fn write_attr(name: &str, value: &str, out: &mut String) {
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    escape_into(value, true, out);
    out.push('"');
}

fn escape_into(text: &str, attribute: bool, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_nested_elements() {
        let tree = Element::new("p")
            .with_children(vec![
                Node::text("a "),
                Element::new("strong")
                    .with_children(vec![Node::text("b")])
                    .into(),
            ])
            .into();
        assert_eq!(to_html(&[tree]), "<p>a <strong>b</strong></p>");
    }

    #[test]
    fn escapes_text_and_attributes() {
        let tree = Element::new("a")
            .with_attr("title", "say \"hi\" & <go>")
            .with_children(vec![Node::text("1 < 2 & \"q\"")])
            .into();
        assert_eq!(
            to_html(&[tree]),
            r#"<a title="say &quot;hi&quot; &amp; &lt;go&gt;">1 &lt; 2 &amp; "q"</a>"#
        );
    }

    #[test]
    fn flags_render_as_empty_attributes() {
        let tree = Element::new("code").with_flag("data-line-numbers").into();
        assert_eq!(to_html(&[tree]), "<code data-line-numbers></code>");
    }

    #[test]
    fn class_list_joined_with_spaces() {
        let tree = Element::new("div").with_classes(["a", "b"]).into();
        assert_eq!(to_html(&[tree]), r#"<div class="a b"></div>"#);
    }

    #[test]
    fn void_elements_have_no_closing_tag() {
        let tree = Element::new("img").with_attr("src", "/x.png").into();
        assert_eq!(to_html(&[tree]), r#"<img src="/x.png">"#);
    }

    #[test]
    fn raw_passes_through() {
        assert_eq!(to_html(&[Node::Raw("<Callout />".into())]), "<Callout />");
    }

    #[test]
    fn add_class_keeps_existing() {
        let mut el = Element::new("span").with_classes(["line"]);
        el.add_class("hl");
        assert_eq!(el.classes(), vec!["line", "hl"]);
    }

    #[test]
    fn classes_from_plain_string_attribute() {
        let el = Element::new("span").with_attr("class", "a  b");
        assert_eq!(el.classes(), vec!["a", "b"]);
    }

    #[test]
    fn text_content_skips_raw() {
        let node: Node = Element::new("p")
            .with_children(vec![Node::text("a"), Node::Raw("<b>x</b>".into()), Node::text("c")])
            .into();
        assert_eq!(node.text_content(), "ac");
    }
}

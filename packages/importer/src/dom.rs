//! Thin read-only view over an `RcDom` tree.

use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData, RcDom};
use std::rc::Rc;

/// Tags that never produce visual content
pub const SKIPPED_TAGS: &[&str] = &[
    "script", "style", "meta", "link", "svg", "noscript", "template", "head", "title", "base",
    "object", "canvas", "map",
];

/// Void or self-contained elements that are meaningful without text
pub const MEANINGFUL_VOID_TAGS: &[&str] = &[
    "img", "picture", "video", "audio", "input", "hr", "br", "iframe", "embed", "textarea",
    "select", "progress", "meter",
];

/// Parsed markup document
pub struct HtmlDocument {
    dom: RcDom,
}

impl HtmlDocument {
    /// Parse a fragment or full document. Parsing never fails; malformed
    /// markup is repaired the way browsers repair it.
    pub fn parse(html: &str) -> Self {
        let dom = parse_document(RcDom::default(), Default::default()).one(html);
        Self { dom }
    }

    /// The `<html>` element
    pub fn root(&self) -> Option<Element> {
        Element::from_handle(self.dom.document.clone())
            .children()
            .into_iter()
            .find(|e| e.tag() == "html")
    }

    /// The `<body>` element (always synthesized by the parser)
    pub fn body(&self) -> Option<Element> {
        self.root()?.children().into_iter().find(|e| e.tag() == "body")
    }

    /// Every element with the given tag, in document order
    pub fn elements_by_tag(&self, tag: &str) -> Vec<Element> {
        match self.root() {
            Some(root) => root
                .descendants()
                .into_iter()
                .filter(|e| e.tag() == tag)
                .collect(),
            None => Vec::new(),
        }
    }
}

/// Element (or document) node handle
#[derive(Clone)]
pub struct Element {
    handle: Handle,
}

impl std::fmt::Debug for Element {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<{}>", self.tag())
    }
}

impl Element {
    fn from_handle(handle: Handle) -> Self {
        Self { handle }
    }

    /// Local tag name, lowercase. Empty for non-element nodes.
    pub fn tag(&self) -> &str {
        match &self.handle.data {
            NodeData::Element { name, .. } => &name.local,
            _ => "",
        }
    }

    pub fn attr(&self, name: &str) -> Option<String> {
        match &self.handle.data {
            NodeData::Element { attrs, .. } => attrs
                .borrow()
                .iter()
                .find(|a| &*a.name.local == name)
                .map(|a| String::from(&*a.value)),
            _ => None,
        }
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    /// Raw `class` attribute, empty when absent
    pub fn class_attr(&self) -> String {
        self.attr("class").unwrap_or_default()
    }

    pub fn has_class_containing(&self, needle: &str) -> bool {
        self.class_attr().to_lowercase().contains(needle)
    }

    /// Element children, in order
    pub fn children(&self) -> Vec<Element> {
        self.handle
            .children
            .borrow()
            .iter()
            .filter(|c| matches!(c.data, NodeData::Element { .. }))
            .cloned()
            .map(Element::from_handle)
            .collect()
    }

    /// Element children that can contribute visual content
    pub fn visible_children(&self) -> Vec<Element> {
        self.children()
            .into_iter()
            .filter(|c| !SKIPPED_TAGS.contains(&c.tag()))
            .collect()
    }

    /// All descendant elements in pre-order, excluding self
    pub fn descendants(&self) -> Vec<Element> {
        let mut out = Vec::new();
        self.collect_descendants(&mut out);
        out
    }

    fn collect_descendants(&self, out: &mut Vec<Element>) {
        for child in self.children() {
            out.push(child.clone());
            child.collect_descendants(out);
        }
    }

    pub fn find_descendant(&self, pred: impl Fn(&Element) -> bool) -> Option<Element> {
        self.descendants().into_iter().find(|e| pred(e))
    }

    pub fn parent(&self) -> Option<Element> {
        let weak = self.handle.parent.take();
        let parent = weak.as_ref().and_then(|w| w.upgrade());
        self.handle.parent.set(weak);
        parent.map(Element::from_handle)
    }

    /// Nearest ancestor with the given tag
    pub fn ancestor(&self, tag: &str) -> Option<Element> {
        let mut current = self.parent();
        while let Some(el) = current {
            if el.tag() == tag {
                return Some(el);
            }
            current = el.parent();
        }
        None
    }

    /// Topmost ancestor (the document node)
    pub fn top(&self) -> Element {
        let mut current = self.clone();
        while let Some(parent) = current.parent() {
            current = parent;
        }
        current
    }

    pub fn same_node(&self, other: &Element) -> bool {
        Rc::ptr_eq(&self.handle, &other.handle)
    }

    /// Whether `other` is this element or one of its descendants
    pub fn contains(&self, other: &Element) -> bool {
        let mut current = Some(other.clone());
        while let Some(el) = current {
            if el.same_node(self) {
                return true;
            }
            current = el.parent();
        }
        false
    }

    /// All descendant text with whitespace collapsed. Text inside skipped
    /// tags (scripts, styles) is ignored.
    pub fn text_content(&self) -> String {
        let mut raw = String::new();
        collect_text(&self.handle, &mut raw);
        collapse_whitespace(&raw)
    }

    /// Unprocessed text of direct text-node children, e.g. a stylesheet
    pub fn raw_text(&self) -> String {
        let mut raw = String::new();
        for child in self.handle.children.borrow().iter() {
            if let NodeData::Text { contents } = &child.data {
                raw.push_str(&contents.borrow());
            }
        }
        raw
    }

    /// Text of direct text-node children only, whitespace collapsed
    pub fn direct_text(&self) -> String {
        let mut raw = String::new();
        for child in self.handle.children.borrow().iter() {
            if let NodeData::Text { contents } = &child.data {
                raw.push_str(&contents.borrow());
                raw.push(' ');
            }
        }
        collapse_whitespace(&raw)
    }

    /// Neither visible element children nor text
    pub fn is_empty_visually(&self) -> bool {
        self.visible_children().is_empty() && self.text_content().is_empty()
    }
}

fn collect_text(handle: &Handle, out: &mut String) {
    match &handle.data {
        NodeData::Text { contents } => {
            out.push_str(&contents.borrow());
        }
        NodeData::Element { name, .. } => {
            if SKIPPED_TAGS.contains(&&*name.local) {
                return;
            }
            for child in handle.children.borrow().iter() {
                collect_text(child, out);
            }
            // Block boundaries separate words
            out.push(' ');
        }
        NodeData::Document => {
            for child in handle.children.borrow().iter() {
                collect_text(child, out);
            }
        }
        _ => {}
    }
}

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fragment_gets_body() {
        let doc = HtmlDocument::parse("<p>Hello</p>");
        let body = doc.body().unwrap();
        assert_eq!(body.children().len(), 1);
        assert_eq!(body.children()[0].tag(), "p");
    }

    #[test]
    fn test_text_content_collapses_and_skips_scripts() {
        let doc = HtmlDocument::parse(
            "<div>  Hello\n   <b>big</b><script>var x = 1;</script> world </div>",
        );
        let div = doc.body().unwrap().children()[0].clone();
        assert_eq!(div.text_content(), "Hello big world");
        assert_eq!(div.direct_text(), "Hello world");
    }

    #[test]
    fn test_attributes_and_classes() {
        let doc = HtmlDocument::parse(r#"<a href="/x" class="Nav-Link primary">Go</a>"#);
        let a = doc.body().unwrap().children()[0].clone();
        assert_eq!(a.attr("href").as_deref(), Some("/x"));
        assert!(a.has_class_containing("nav-link"));
        assert!(a.attr("target").is_none());
    }

    #[test]
    fn test_ancestor_and_contains() {
        let doc = HtmlDocument::parse("<label>Email <span><input id='e'></span></label>");
        let input = doc.elements_by_tag("input").remove(0);
        let label = input.ancestor("label").unwrap();
        assert!(label.contains(&input));
        assert!(!input.contains(&label));
        assert_eq!(input.top().tag(), "");
    }

    #[test]
    fn test_style_elements_found_in_head() {
        let doc = HtmlDocument::parse("<style>.a{display:flex}</style><div class='a'></div>");
        assert_eq!(doc.elements_by_tag("style").len(), 1);
    }
}

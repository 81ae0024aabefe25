//! # Flat Import
//!
//! Markup -> flat list of top-level components. Horizontal layouts become
//! layout containers whose children carry a column assignment.
//!
//! The element walk here is shared with the section importer, which runs it
//! in [`WalkMode::Section`] so it never synthesizes containers.

use crate::classifier::classify;
use crate::dom::{Element, HtmlDocument, MEANINGFUL_VOID_TAGS, SKIPPED_TAGS};
use crate::factory::{
    build_breadcrumb, build_footer, build_navbar, content_type_for, create_component, has_links,
    is_breadcrumb, is_generic_container, text_paragraph,
};
use crate::resolver::{CascadeResolver, StyleResolver};
use blocksmith_model::style::parse_inline_style;
use blocksmith_model::{Component, ComponentType};
use tracing::{debug, instrument};

/// Recursion cap for the flat importer
pub const MAX_IMPORT_DEPTH: usize = 15;

/// Recursion cap below a section's column root
pub const MAX_SECTION_DEPTH: usize = 10;

/// Upper bound for columns of any inferred layout
pub const MAX_LAYOUT_COLUMNS: usize = 3;

/// Direct text runs shorter than this are treated as decoration
const LEADING_TEXT_MIN_CHARS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WalkMode {
    /// Horizontal layouts become layout containers
    Flat,
    /// Horizontal layouts below the column root keep only their direct text
    Section,
}

pub(crate) struct Walker<'a> {
    resolver: &'a dyn StyleResolver,
    mode: WalkMode,
}

impl<'a> Walker<'a> {
    pub(crate) fn new(resolver: &'a dyn StyleResolver, mode: WalkMode) -> Self {
        Self { resolver, mode }
    }

    pub(crate) fn resolver(&self) -> &'a dyn StyleResolver {
        self.resolver
    }

    fn max_depth(&self) -> usize {
        match self.mode {
            WalkMode::Flat => MAX_IMPORT_DEPTH,
            WalkMode::Section => MAX_SECTION_DEPTH,
        }
    }

    /// Components produced by `element` at `depth`
    pub(crate) fn process(&self, element: &Element, depth: usize) -> Vec<Component> {
        if depth > self.max_depth() {
            debug!(tag = element.tag(), depth, "Depth cap reached");
            return Vec::new();
        }

        let tag = element.tag();
        if SKIPPED_TAGS.contains(&tag) {
            return Vec::new();
        }
        if element.is_empty_visually() && !MEANINGFUL_VOID_TAGS.contains(&tag) {
            return Vec::new();
        }

        let layout = classify(element, self.resolver);
        if layout.is_horizontal() && layout.child_count > 1 {
            return match self.mode {
                WalkMode::Flat => self.layout_container(element, layout.detected_columns(), depth),
                WalkMode::Section => direct_text_paragraph(element, 0).into_iter().collect(),
            };
        }

        if let Some(kind) = content_type_for(element) {
            // `<p><img></p>` and friends: the wrapper has nothing to say
            if kind == ComponentType::Paragraph && element.text_content().is_empty() {
                return self.recurse(element, depth);
            }
            return vec![create_component(element, kind)];
        }

        if is_generic_container(tag) {
            return self.generic_container(element, depth);
        }

        // Inline wrappers and other unmapped tags
        if element.visible_children().is_empty() {
            let text = element.text_content();
            if text.is_empty() {
                return Vec::new();
            }
            return vec![leaf_paragraph(element, &text)];
        }
        self.recurse(element, depth)
    }

    fn layout_container(&self, element: &Element, detected: usize, depth: usize) -> Vec<Component> {
        let columns = detected.clamp(1, MAX_LAYOUT_COLUMNS);
        let mut container = Component::new(ComponentType::LayoutContainer);
        container.columns = Some(columns);
        container.style = inline_style_of(element);

        let mut children = Vec::new();
        for (position, child) in element.visible_children().iter().enumerate() {
            for mut node in self.process(child, depth + 1) {
                node.set_column_index(position % columns);
                node.set_span("column");
                children.push(node);
            }
        }

        if children.is_empty() {
            return Vec::new();
        }
        container.children = Some(children);
        vec![container]
    }

    fn generic_container(&self, element: &Element, depth: usize) -> Vec<Component> {
        let tag = element.tag();

        if tag == "nav" && is_breadcrumb(element) {
            return vec![build_breadcrumb(element)];
        }
        if (tag == "nav" || tag == "header") && has_links(element) {
            return vec![build_navbar(element)];
        }
        if tag == "footer" {
            return vec![build_footer(element)];
        }

        if element.visible_children().is_empty() {
            let text = element.text_content();
            return vec![leaf_paragraph(element, &text)];
        }

        let mut out: Vec<Component> = direct_text_paragraph(element, LEADING_TEXT_MIN_CHARS)
            .into_iter()
            .collect();
        out.extend(self.recurse(element, depth));
        out
    }

    fn recurse(&self, element: &Element, depth: usize) -> Vec<Component> {
        element
            .visible_children()
            .iter()
            .flat_map(|child| self.process(child, depth + 1))
            .collect()
    }
}

fn inline_style_of(element: &Element) -> blocksmith_model::StyleMap {
    element
        .attr("style")
        .map(|s| parse_inline_style(&s))
        .unwrap_or_default()
}

fn leaf_paragraph(element: &Element, text: &str) -> Component {
    let mut paragraph = create_component(element, ComponentType::Paragraph);
    paragraph.content = text.to_string();
    paragraph
}

/// Paragraph from the element's own text nodes, when longer than `min_chars`
fn direct_text_paragraph(element: &Element, min_chars: usize) -> Option<Component> {
    let text = element.direct_text();
    (!text.is_empty() && text.chars().count() > min_chars).then(|| text_paragraph(&text))
}

/// Import markup as a flat component list using the document's own styles
pub fn import_components(html: &str) -> Vec<Component> {
    let doc = HtmlDocument::parse(html);
    let resolver = CascadeResolver::from_document(&doc);
    import_document(&doc, &resolver)
}

/// Import markup as a flat component list with a custom style resolver
pub fn import_components_with(html: &str, resolver: &dyn StyleResolver) -> Vec<Component> {
    import_document(&HtmlDocument::parse(html), resolver)
}

#[instrument(skip_all)]
fn import_document(doc: &HtmlDocument, resolver: &dyn StyleResolver) -> Vec<Component> {
    let Some(body) = doc.body() else {
        return Vec::new();
    };

    let walker = Walker::new(resolver, WalkMode::Flat);
    let components: Vec<Component> = body
        .visible_children()
        .iter()
        .flat_map(|child| walker.process(child, 1))
        .collect();

    debug!(count = components.len(), "Imported components");
    components
}

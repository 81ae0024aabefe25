//! # Style Resolution
//!
//! There is no rendering engine here, so "resolved style" means a small
//! cascade: simple selectors from the document's `<style>` blocks, then the
//! element's inline `style` attribute. Only the properties the layout
//! classifier needs are resolved.
//!
//! A resolver reports `None` when no `display` value could be determined; the
//! classifier then falls back to class-name heuristics.

use crate::dom::{Element, HtmlDocument};
use blocksmith_model::style::{parse_inline_style, StyleMap};
use tracing::debug;

/// Box properties relevant to layout classification
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedStyle {
    pub display: Option<String>,
    pub flex_direction: Option<String>,
    pub grid_template_columns: Option<String>,
}

impl ResolvedStyle {
    fn from_map(map: &StyleMap) -> Self {
        let get = |key: &str| map.get(key).map(|v| strip_important(v).to_ascii_lowercase());
        Self {
            display: get("display"),
            flex_direction: get("flexDirection").or_else(|| {
                // `flex-flow: column wrap`
                get("flexFlow").and_then(|flow| {
                    flow.split_whitespace()
                        .find(|t| t.starts_with("row") || t.starts_with("column"))
                        .map(str::to_string)
                })
            }),
            grid_template_columns: get("gridTemplateColumns"),
        }
    }
}

fn strip_important(value: &str) -> &str {
    value.trim().trim_end_matches("!important").trim()
}

pub trait StyleResolver {
    /// Resolved style of `element`, or `None` when `display` is unknown
    fn resolve(&self, element: &Element) -> Option<ResolvedStyle>;
}

/// Resolver that only looks at inline `style` attributes
#[derive(Debug, Default, Clone, Copy)]
pub struct InlineStyleResolver;

impl StyleResolver for InlineStyleResolver {
    fn resolve(&self, element: &Element) -> Option<ResolvedStyle> {
        let map = parse_inline_style(&element.attr("style")?);
        let resolved = ResolvedStyle::from_map(&map);
        resolved.display.is_some().then_some(resolved)
    }
}

/// Resolver that never has style information. Forces the class-name path.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoStyleResolver;

impl StyleResolver for NoStyleResolver {
    fn resolve(&self, _element: &Element) -> Option<ResolvedStyle> {
        None
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum SimpleSelector {
    Tag(String),
    Class(String),
    Id(String),
}

impl SimpleSelector {
    fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let valid_ident = |s: &str| {
            !s.is_empty()
                && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        };

        if let Some(class) = raw.strip_prefix('.') {
            valid_ident(class).then(|| SimpleSelector::Class(class.to_string()))
        } else if let Some(id) = raw.strip_prefix('#') {
            valid_ident(id).then(|| SimpleSelector::Id(id.to_string()))
        } else {
            valid_ident(raw).then(|| SimpleSelector::Tag(raw.to_ascii_lowercase()))
        }
    }

    fn specificity(&self) -> u32 {
        match self {
            SimpleSelector::Tag(_) => 1,
            SimpleSelector::Class(_) => 10,
            SimpleSelector::Id(_) => 100,
        }
    }

    fn matches(&self, element: &Element) -> bool {
        match self {
            SimpleSelector::Tag(tag) => element.tag() == tag,
            SimpleSelector::Class(class) => element
                .class_attr()
                .split_whitespace()
                .any(|c| c == class),
            SimpleSelector::Id(id) => element.attr("id").as_deref() == Some(id.as_str()),
        }
    }
}

#[derive(Debug, Clone)]
struct SimpleRule {
    selector: SimpleSelector,
    declarations: StyleMap,
}

/// Cascade of simple stylesheet rules plus inline styles
#[derive(Debug, Default, Clone)]
pub struct CascadeResolver {
    rules: Vec<SimpleRule>,
}

impl CascadeResolver {
    /// Collect rules from every `<style>` element of the document
    pub fn from_document(doc: &HtmlDocument) -> Self {
        let mut resolver = Self::default();
        for style in doc.elements_by_tag("style") {
            resolver.add_stylesheet(&style.raw_text());
        }
        debug!(rules = resolver.rules.len(), "Collected stylesheet rules");
        resolver
    }

    /// Parse a stylesheet, keeping rules whose selectors are all simple
    /// (`tag`, `.class`, `#id`). At-rules are skipped with their blocks.
    pub fn add_stylesheet(&mut self, css: &str) {
        let css = strip_comments(css);
        let mut rest = css.as_str();

        while let Some(open) = rest.find('{') {
            let prelude = rest[..open].trim();
            let Some(close) = matching_brace(rest, open) else {
                break;
            };
            let body = &rest[open + 1..close];
            rest = &rest[close + 1..];

            if prelude.starts_with('@') {
                continue;
            }

            let declarations = parse_inline_style(body);
            if declarations.is_empty() {
                continue;
            }
            for raw in prelude.split(',') {
                if let Some(selector) = SimpleSelector::parse(raw) {
                    self.rules.push(SimpleRule {
                        selector,
                        declarations: declarations.clone(),
                    });
                }
            }
        }
    }

    fn cascade(&self, element: &Element) -> StyleMap {
        let mut matched: Vec<&SimpleRule> = self
            .rules
            .iter()
            .filter(|r| r.selector.matches(element))
            .collect();
        // Stable: equal specificity keeps source order
        matched.sort_by_key(|r| r.selector.specificity());

        let mut map = StyleMap::new();
        for rule in matched {
            map.extend(rule.declarations.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        if let Some(inline) = element.attr("style") {
            map.extend(parse_inline_style(&inline));
        }
        map
    }
}

impl StyleResolver for CascadeResolver {
    fn resolve(&self, element: &Element) -> Option<ResolvedStyle> {
        let resolved = ResolvedStyle::from_map(&self.cascade(element));
        resolved.display.is_some().then_some(resolved)
    }
}

fn strip_comments(css: &str) -> String {
    let mut out = String::with_capacity(css.len());
    let mut rest = css;
    while let Some(start) = rest.find("/*") {
        out.push_str(&rest[..start]);
        match rest[start + 2..].find("*/") {
            Some(end) => rest = &rest[start + 2 + end + 2..],
            None => return out,
        }
    }
    out.push_str(rest);
    out
}

/// Index of the `}` closing the `{` at `open`, honoring nesting
fn matching_brace(text: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in text[open..].char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + i);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first_div(doc: &HtmlDocument) -> Element {
        doc.elements_by_tag("div").remove(0)
    }

    #[test]
    fn test_inline_resolver_requires_display() {
        let doc = HtmlDocument::parse(r#"<div style="color: red"></div>"#);
        assert!(InlineStyleResolver.resolve(&first_div(&doc)).is_none());

        let doc = HtmlDocument::parse(r#"<div style="display: flex; flex-direction: column"></div>"#);
        let resolved = InlineStyleResolver.resolve(&first_div(&doc)).unwrap();
        assert_eq!(resolved.display.as_deref(), Some("flex"));
        assert_eq!(resolved.flex_direction.as_deref(), Some("column"));
    }

    #[test]
    fn test_cascade_uses_stylesheet_classes() {
        let doc = HtmlDocument::parse(
            "<style>/* layout */ .cards { display: grid; grid-template-columns: 1fr 1fr }</style>\
             <div class=\"cards wide\"></div>",
        );
        let resolver = CascadeResolver::from_document(&doc);
        let resolved = resolver.resolve(&first_div(&doc)).unwrap();
        assert_eq!(resolved.display.as_deref(), Some("grid"));
        assert_eq!(resolved.grid_template_columns.as_deref(), Some("1fr 1fr"));
    }

    #[test]
    fn test_inline_beats_stylesheet_and_id_beats_class() {
        let doc = HtmlDocument::parse(
            "<style>#main { display: grid } .row { display: flex } div { display: block }</style>\
             <div id=\"main\" class=\"row\"></div>",
        );
        let resolver = CascadeResolver::from_document(&doc);
        let el = first_div(&doc);
        assert_eq!(resolver.resolve(&el).unwrap().display.as_deref(), Some("grid"));

        let doc = HtmlDocument::parse(
            "<style>.row { display: flex }</style><div class=\"row\" style=\"display: block\"></div>",
        );
        let resolver = CascadeResolver::from_document(&doc);
        assert_eq!(
            resolver.resolve(&first_div(&doc)).unwrap().display.as_deref(),
            Some("block")
        );
    }

    #[test]
    fn test_media_queries_and_complex_selectors_ignored() {
        let mut resolver = CascadeResolver::default();
        resolver.add_stylesheet(
            "@media (max-width: 600px) { .row { display: block } } \
             .nav > .row { display: grid } .row { display: flex }",
        );
        assert_eq!(resolver.rules.len(), 1);
    }

    #[test]
    fn test_important_is_stripped() {
        let doc = HtmlDocument::parse(r#"<div style="display: FLEX !important"></div>"#);
        let resolved = InlineStyleResolver.resolve(&first_div(&doc)).unwrap();
        assert_eq!(resolved.display.as_deref(), Some("flex"));
    }
}

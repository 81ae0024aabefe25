//! # Section Import
//!
//! Markup -> list of [`Section`]s. Each structural root (landmark element)
//! becomes one section; the first horizontal layout at or just below the root
//! defines the section's columns.

use crate::classifier::{classify, split_top_level};
use crate::dom::{Element, HtmlDocument};
use crate::pipeline::{WalkMode, Walker, MAX_LAYOUT_COLUMNS};
use crate::resolver::{CascadeResolver, StyleResolver};
use blocksmith_model::style::{is_safe_css_value, parse_inline_style};
use blocksmith_model::{Component, ComponentType, Section};
use std::collections::HashSet;
use tracing::{debug, instrument};

pub const STRUCTURAL_TAGS: &[&str] =
    &["header", "nav", "main", "section", "article", "aside", "footer"];

pub const LANDMARK_ROLES: &[&str] = &[
    "banner",
    "navigation",
    "main",
    "region",
    "complementary",
    "contentinfo",
    "article",
];

/// Characters of content (or src) that identify a duplicate
const DEDUP_PREFIX_CHARS: usize = 50;

pub fn is_structural(element: &Element) -> bool {
    STRUCTURAL_TAGS.contains(&element.tag())
        || element
            .attr("role")
            .map(|role| LANDMARK_ROLES.contains(&role.trim().to_ascii_lowercase().as_str()))
            .unwrap_or(false)
}

/// Import markup as sections using the document's own styles
pub fn import_sections(html: &str) -> Vec<Section> {
    let doc = HtmlDocument::parse(html);
    let resolver = CascadeResolver::from_document(&doc);
    import_document_sections(&doc, &resolver)
}

/// Import markup as sections with a custom style resolver
pub fn import_sections_with(html: &str, resolver: &dyn StyleResolver) -> Vec<Section> {
    import_document_sections(&HtmlDocument::parse(html), resolver)
}

#[instrument(skip_all)]
fn import_document_sections(doc: &HtmlDocument, resolver: &dyn StyleResolver) -> Vec<Section> {
    let Some(body) = doc.body() else {
        return Vec::new();
    };

    let walker = Walker::new(resolver, WalkMode::Section);
    let roots = structural_roots(&body);
    debug!(roots = roots.len(), "Found structural roots");

    let mut sections = Vec::new();
    for root in &roots {
        let section = build_section(&walker, root);
        if section.components.is_empty() {
            debug!(tag = root.tag(), "Skipping empty section");
            continue;
        }
        sections.push(section);
    }

    debug!(count = sections.len(), "Imported sections");
    sections
}

/// Direct structural children of the body; else the outermost structural
/// elements at any depth; else the body itself.
pub fn structural_roots(body: &Element) -> Vec<Element> {
    let direct: Vec<Element> = body
        .visible_children()
        .into_iter()
        .filter(is_structural)
        .collect();
    if !direct.is_empty() {
        return direct;
    }

    let mut nested = Vec::new();
    collect_outermost(body, &mut nested);
    if !nested.is_empty() {
        return nested;
    }

    vec![body.clone()]
}

fn collect_outermost(element: &Element, out: &mut Vec<Element>) {
    for child in element.visible_children() {
        if is_structural(&child) {
            out.push(child);
        } else {
            collect_outermost(&child, out);
        }
    }
}

fn build_section(walker: &Walker<'_>, root: &Element) -> Section {
    let resolver = walker.resolver();
    let layout = classify(root, resolver);

    let mut components = Vec::new();
    let (columns, column_root) = if layout.is_horizontal() && layout.child_count >= 2 {
        let columns = layout.child_count.min(MAX_LAYOUT_COLUMNS);
        push_columns(walker, root, columns, &mut components);
        (columns, Some(root.clone()))
    } else if let Some(probe) = find_column_probe(root, resolver) {
        let columns = probe.visible_children().len().min(MAX_LAYOUT_COLUMNS);
        for child in root.visible_children() {
            process_around_probe(walker, &child, &probe, columns, &mut components);
        }
        (columns, Some(probe))
    } else {
        components.extend(walker.process(root, 0));
        (1, None)
    };

    let mut section = Section::with_columns(columns);
    section.name = Some(section_name(root));
    apply_root_style(&mut section, root);

    if let Some(widths) = column_root
        .and_then(|el| resolver.resolve(&el))
        .and_then(|style| style.grid_template_columns)
        .and_then(|template| explicit_widths(&template, columns))
    {
        section.set_column_widths(Some(widths));
    }

    for component in &mut components {
        let column = section.clamp_column(component.column_index());
        component.set_column_index(column);
    }
    section.components = dedupe(components);
    section
}

/// Children of `column_root` become columns, child `i` at column `i % columns`
fn push_columns(
    walker: &Walker<'_>,
    column_root: &Element,
    columns: usize,
    out: &mut Vec<Component>,
) {
    for (position, child) in column_root.visible_children().iter().enumerate() {
        for mut node in walker.process(child, 1) {
            node.set_column_index(position % columns);
            out.push(node);
        }
    }
}

fn process_around_probe(
    walker: &Walker<'_>,
    element: &Element,
    probe: &Element,
    columns: usize,
    out: &mut Vec<Component>,
) {
    if element.same_node(probe) {
        push_columns(walker, probe, columns, out);
    } else if element.contains(probe) {
        let text = element.direct_text();
        if !text.is_empty() {
            out.push(Component::new(ComponentType::Paragraph).with_content(text).with_column(0));
        }
        for child in element.visible_children() {
            process_around_probe(walker, &child, probe, columns, out);
        }
    } else {
        for mut node in walker.process(element, 1) {
            node.set_column_index(0);
            out.push(node);
        }
    }
}

/// First horizontal layout with two or more children among the root's
/// children, then its grandchildren
fn find_column_probe(root: &Element, resolver: &dyn StyleResolver) -> Option<Element> {
    let is_columns = |el: &Element| {
        let layout = classify(el, resolver);
        layout.is_horizontal() && layout.child_count >= 2
    };

    let children = root.visible_children();
    if let Some(found) = children.iter().find(|c| is_columns(c)) {
        return Some(found.clone());
    }
    children
        .iter()
        .flat_map(|c| c.visible_children())
        .find(|gc| is_columns(gc))
}

/// Keep the first node per `(type, content prefix, column)`
pub fn dedupe(components: Vec<Component>) -> Vec<Component> {
    let mut seen: HashSet<(ComponentType, String, usize)> = HashSet::new();
    let before = components.len();

    let kept: Vec<Component> = components
        .into_iter()
        .filter(|c| {
            let basis = if c.content.is_empty() {
                c.src.as_deref().unwrap_or("")
            } else {
                c.content.as_str()
            };
            let prefix: String = basis.chars().take(DEDUP_PREFIX_CHARS).collect();
            seen.insert((c.kind, prefix, c.column_index()))
        })
        .collect();

    if kept.len() != before {
        debug!(removed = before - kept.len(), "Removed duplicate components");
    }
    kept
}

fn section_name(root: &Element) -> String {
    if let Some(label) = root.attr("aria-label").filter(|l| !l.trim().is_empty()) {
        return label.trim().to_string();
    }

    let role = root.attr("role").unwrap_or_default().to_ascii_lowercase();
    let name = match (root.tag(), role.as_str()) {
        (_, "banner") | ("header", _) => "Header",
        (_, "navigation") | ("nav", _) => "Navigation",
        (_, "main") | ("main", _) => "Main",
        (_, "complementary") | ("aside", _) => "Sidebar",
        (_, "contentinfo") | ("footer", _) => "Footer",
        (_, "article") | ("article", _) => "Article",
        ("body", _) => "Content",
        _ => "Section",
    };
    name.to_string()
}

fn apply_root_style(section: &mut Section, root: &Element) {
    let Some(style) = root.attr("style").map(|s| parse_inline_style(&s)) else {
        return;
    };

    section.background_color = style
        .get("backgroundColor")
        .or_else(|| style.get("background").filter(|b| is_plain_color(b)))
        .and_then(|v| safe_value("background-color", v));
    section.padding = style.get("padding").and_then(|v| safe_value("padding", v));
    section.min_height = style.get("minHeight").and_then(|v| safe_value("min-height", v));
}

fn safe_value(property: &str, value: &str) -> Option<String> {
    if is_safe_css_value(value) {
        Some(value.to_string())
    } else {
        debug!(property, "Dropped unsafe section style value");
        None
    }
}

fn is_plain_color(value: &str) -> bool {
    let value = value.trim();
    !value.contains(' ') && !value.contains("url(") && !value.contains("gradient")
}

/// Track list as column widths, when every track is a percentage or fr
/// value and the count matches
fn explicit_widths(template: &str, columns: usize) -> Option<Vec<String>> {
    let tracks = split_top_level(template);
    let explicit = tracks.len() == columns
        && tracks
            .iter()
            .all(|t| (t.ends_with('%') || t.ends_with("fr")) && is_safe_css_value(t));
    explicit.then_some(tracks)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedupe_keeps_first_per_column() {
        let nodes = vec![
            Component::new(ComponentType::Paragraph).with_content("Same text").with_column(0),
            Component::new(ComponentType::Paragraph).with_content("Same text").with_column(0),
            Component::new(ComponentType::Paragraph).with_content("Same text").with_column(1),
            Component::new(ComponentType::Heading).with_content("Same text").with_column(0),
        ];
        let first_id = nodes[0].id.clone();

        let kept = dedupe(nodes);
        assert_eq!(kept.len(), 3);
        assert_eq!(kept[0].id, first_id);
    }

    #[test]
    fn test_dedupe_uses_src_for_media() {
        let mut a = Component::new(ComponentType::Image);
        a.src = Some("/hero.jpg".into());
        let mut b = Component::new(ComponentType::Image);
        b.src = Some("/hero.jpg".into());
        let mut c = Component::new(ComponentType::Image);
        c.src = Some("/other.jpg".into());
        assert_eq!(dedupe(vec![a, b, c]).len(), 2);
    }

    #[test]
    fn test_dedupe_compares_prefix_only() {
        let long = "x".repeat(60);
        let other = format!("{}y", "x".repeat(59));
        let nodes = vec![
            Component::new(ComponentType::Paragraph).with_content(long),
            Component::new(ComponentType::Paragraph).with_content(other),
        ];
        assert_eq!(dedupe(nodes).len(), 1);
    }

    #[test]
    fn test_explicit_widths() {
        assert_eq!(
            explicit_widths("30% 70%", 2),
            Some(vec!["30%".to_string(), "70%".to_string()])
        );
        assert_eq!(explicit_widths("200px 1fr", 2), None);
        assert_eq!(explicit_widths("1fr 1fr 1fr", 2), None);
        assert_eq!(explicit_widths("1fr 2}fr", 2), None);
    }

    #[test]
    fn test_roots_prefer_direct_children() {
        let doc = HtmlDocument::parse(
            "<header>H</header><div><section>inner</section></div><footer>F</footer>",
        );
        let roots = structural_roots(&doc.body().unwrap());
        assert_eq!(roots.iter().map(|r| r.tag()).collect::<Vec<_>>(), vec!["header", "footer"]);
    }

    #[test]
    fn test_roots_fall_back_to_outermost_then_body() {
        let doc = HtmlDocument::parse(
            "<div id='app'><main><section>a</section></main><div role='contentinfo'>c</div></div>",
        );
        let roots = structural_roots(&doc.body().unwrap());
        assert_eq!(roots.len(), 2);
        assert_eq!(roots[0].tag(), "main");

        let doc = HtmlDocument::parse("<div><p>Just text</p></div>");
        let roots = structural_roots(&doc.body().unwrap());
        assert_eq!(roots[0].tag(), "body");
    }

    #[test]
    fn test_section_names() {
        let doc = HtmlDocument::parse(
            "<aside>a</aside><section aria-label='Pricing'>b</section><div role='banner'>c</div>",
        );
        let body = doc.body().unwrap();
        let names: Vec<String> = structural_roots(&body).iter().map(section_name).collect();
        assert_eq!(names, vec!["Sidebar", "Pricing", "Header"]);
    }
}

//! # Component Factory
//!
//! Maps one markup element to one typed [`Component`].

use crate::dom::{collapse_whitespace, Element};
use blocksmith_model::style::{formatting_from_style, parse_inline_style};
use blocksmith_model::{Component, ComponentType, Formatting, NavLink};

/// Tags that only group other content
pub const GENERIC_CONTAINER_TAGS: &[&str] = &[
    "div", "section", "article", "main", "header", "aside", "nav", "footer", "figure", "body",
    "html",
];

pub fn is_generic_container(tag: &str) -> bool {
    GENERIC_CONTAINER_TAGS.contains(&tag)
}

/// Content type an element maps to, if any. Generic containers and inline
/// wrappers (`span`, `strong`, `li`, ...) have none.
pub fn content_type_for(element: &Element) -> Option<ComponentType> {
    let kind = match element.tag() {
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => ComponentType::Heading,
        "p" | "blockquote" | "pre" => ComponentType::Paragraph,
        "a" => ComponentType::Link,
        "button" => ComponentType::Button,
        "img" if element.has_class_containing("avatar") => ComponentType::Avatar,
        "img" | "picture" => ComponentType::Image,
        "video" => ComponentType::Video,
        "audio" => ComponentType::Audio,
        "iframe" | "embed" => ComponentType::Embed,
        "hr" => ComponentType::Divider,
        "br" => ComponentType::Spacer,
        "ul" | "ol" => ComponentType::List,
        "table" => ComponentType::Table,
        "progress" | "meter" => ComponentType::Progress,
        "textarea" => ComponentType::Textarea,
        "select" => ComponentType::Select,
        "form" => ComponentType::Form,
        "menu" => ComponentType::Menu,
        "span" if element.has_class_containing("badge") => ComponentType::Badge,
        "input" => {
            let input_type = element
                .attr("type")
                .unwrap_or_else(|| "text".to_string())
                .to_ascii_lowercase();
            match input_type.as_str() {
                "hidden" => return None,
                "submit" | "button" | "reset" => ComponentType::Button,
                "checkbox" => ComponentType::Checkbox,
                "radio" => ComponentType::Radio,
                _ => ComponentType::Input,
            }
        }
        _ => return None,
    };
    Some(kind)
}

/// Build a component of `kind` from `element`
pub fn create_component(element: &Element, kind: ComponentType) -> Component {
    let mut component = Component::new(kind);
    component.style = element
        .attr("style")
        .map(|s| parse_inline_style(&s))
        .unwrap_or_default();
    component.formatting = formatting_for(element, &component);

    match kind {
        ComponentType::Heading => {
            component.content = element.text_content();
            component.level = element
                .tag()
                .strip_prefix('h')
                .and_then(|n| n.parse::<u8>().ok())
                .filter(|n| (1..=6).contains(n));
        }
        ComponentType::Paragraph | ComponentType::Badge => {
            component.content = element.text_content();
        }
        ComponentType::Link => {
            component.content = element.text_content();
            component.href = Some(element.attr("href").unwrap_or_else(|| "#".to_string()));
            component.target = Some(element.attr("target").unwrap_or_else(|| "_self".to_string()));
        }
        ComponentType::Button => {
            component.content = match element.tag() {
                "input" => element.attr("value").unwrap_or_else(|| "Submit".to_string()),
                _ => element.text_content(),
            };
            component.input_type = element.attr("type");
            component.disabled = element.has_attr("disabled").then_some(true);
        }
        ComponentType::Image | ComponentType::Avatar => fill_image(element, &mut component),
        ComponentType::Video | ComponentType::Audio | ComponentType::Embed => {
            component.src = media_src(element);
            component.alt = element.attr("title");
        }
        ComponentType::List => {
            component.content = top_level_items(element).join(", ");
        }
        ComponentType::Table => fill_table(element, &mut component),
        ComponentType::Progress => {
            component.content = progress_percentage(element).to_string();
        }
        ComponentType::Input
        | ComponentType::Textarea
        | ComponentType::Select
        | ComponentType::Checkbox
        | ComponentType::Radio => fill_form_field(element, &mut component),
        ComponentType::Form => {
            component.content = element.attr("aria-label").unwrap_or_default();
            component.action = element.attr("action");
            component.method = Some(
                element
                    .attr("method")
                    .unwrap_or_else(|| "get".to_string())
                    .to_ascii_lowercase(),
            );
        }
        ComponentType::Menu => {
            component.content = top_level_items(element).join(", ");
            component.nav_links = Some(collect_links(element)).filter(|l| !l.is_empty());
        }
        _ => {}
    }

    component
}

fn formatting_for(element: &Element, component: &Component) -> Option<Formatting> {
    let mut formatting = formatting_from_style(&component.style);

    // Tag semantics of the element and of a single wrapper around all its text
    let mut tags = vec![element.tag().to_string()];
    let children = element.visible_children();
    if children.len() == 1 && element.direct_text().is_empty() {
        tags.push(children[0].tag().to_string());
    }
    for tag in &tags {
        match tag.as_str() {
            "strong" | "b" => formatting.bold = true,
            "em" | "i" => formatting.italic = true,
            "u" => formatting.underline = true,
            _ => {}
        }
    }

    if formatting.align.is_none() {
        formatting.align = element.attr("align").map(|a| a.to_ascii_lowercase());
    }

    (!formatting.is_empty()).then_some(formatting)
}

fn fill_image(element: &Element, component: &mut Component) {
    let img = if element.tag() == "picture" {
        element.find_descendant(|e| e.tag() == "img")
    } else {
        Some(element.clone())
    };

    if let Some(img) = img {
        component.src = img.attr("src").or_else(|| img.attr("data-src"));
        component.alt = Some(img.attr("alt").unwrap_or_default());
    }

    if element.tag() == "picture" {
        component.mobile_src = element
            .children()
            .into_iter()
            .filter(|e| e.tag() == "source")
            .find(|source| {
                source
                    .attr("media")
                    .map(|m| m.contains("max-width"))
                    .unwrap_or(false)
            })
            .and_then(|source| source.attr("srcset"))
            .and_then(|srcset| first_srcset_url(&srcset));
        if component.src.is_none() {
            component.src = element
                .find_descendant(|e| e.tag() == "source")
                .and_then(|s| s.attr("srcset"))
                .and_then(|srcset| first_srcset_url(&srcset));
        }
    }
}

fn first_srcset_url(srcset: &str) -> Option<String> {
    srcset
        .split(',')
        .next()
        .and_then(|candidate| candidate.split_whitespace().next())
        .map(str::to_string)
}

fn media_src(element: &Element) -> Option<String> {
    element.attr("src").or_else(|| {
        element
            .find_descendant(|e| e.tag() == "source")
            .and_then(|s| s.attr("src"))
    })
}

/// Text of the element's own `<li>` children
fn top_level_items(element: &Element) -> Vec<String> {
    element
        .children()
        .into_iter()
        .filter(|e| e.tag() == "li")
        .map(|li| li.text_content())
        .filter(|t| !t.is_empty())
        .collect()
}

fn fill_table(element: &Element, component: &mut Component) {
    let rows: Vec<Element> = element
        .descendants()
        .into_iter()
        .filter(|e| e.tag() == "tr")
        .collect();

    let mut headers = Vec::new();
    let mut body = Vec::new();
    for row in rows {
        let cells = row.children();
        let in_head = row.ancestor("thead").is_some();
        let all_th = !cells.is_empty() && cells.iter().all(|c| c.tag() == "th");

        if (in_head || all_th) && headers.is_empty() {
            headers = cells.iter().map(Element::text_content).collect();
        } else if !in_head {
            let values: Vec<String> = cells
                .iter()
                .filter(|c| c.tag() == "td" || c.tag() == "th")
                .map(Element::text_content)
                .collect();
            if !values.is_empty() {
                body.push(values);
            }
        }
    }

    component.headers = Some(headers);
    component.rows = Some(body);
}

fn progress_percentage(element: &Element) -> u32 {
    let number = |name: &str| {
        element
            .attr(name)
            .and_then(|v| v.trim().parse::<f64>().ok())
    };
    let value = number("value").unwrap_or(0.0);
    let max = number("max").filter(|m| *m > 0.0).unwrap_or(1.0);
    ((value / max) * 100.0).clamp(0.0, 100.0).round() as u32
}

fn fill_form_field(element: &Element, component: &mut Component) {
    component.placeholder = element.attr("placeholder");
    component.label = field_label(element);
    component.name = element.attr("name");
    component.required = element.has_attr("required").then_some(true);
    component.disabled = element.has_attr("disabled").then_some(true);

    match element.tag() {
        "input" => {
            component.input_type =
                Some(element.attr("type").unwrap_or_else(|| "text".to_string()).to_ascii_lowercase());
            component.content = element.attr("value").unwrap_or_default();
        }
        "textarea" => component.content = element.text_content(),
        "select" => {
            component.options = Some(
                element
                    .descendants()
                    .into_iter()
                    .filter(|e| e.tag() == "option")
                    .map(|o| o.text_content())
                    .collect(),
            );
        }
        _ => {}
    }
}

/// `aria-label`, else the enclosing `<label>`, else a `<label for=id>`
fn field_label(element: &Element) -> Option<String> {
    if let Some(label) = element.attr("aria-label") {
        return Some(label);
    }
    if let Some(label) = element.ancestor("label") {
        let text = label.text_content();
        if !text.is_empty() {
            return Some(text);
        }
    }
    let id = element.attr("id")?;
    element
        .top()
        .find_descendant(|e| e.tag() == "label" && e.attr("for").as_deref() == Some(id.as_str()))
        .map(|label| label.text_content())
        .filter(|t| !t.is_empty())
}

fn collect_links(element: &Element) -> Vec<NavLink> {
    element
        .descendants()
        .into_iter()
        .filter(|e| e.tag() == "a")
        .map(|a| NavLink {
            title: a.text_content(),
            href: a.attr("href").unwrap_or_else(|| "#".to_string()),
        })
        .filter(|link| !link.title.is_empty())
        .collect()
}

/// Whether a generic container holds at least one link
pub fn has_links(element: &Element) -> bool {
    element.find_descendant(|e| e.tag() == "a").is_some()
}

pub fn is_breadcrumb(element: &Element) -> bool {
    element
        .attr("aria-label")
        .map(|l| l.to_lowercase().contains("breadcrumb"))
        .unwrap_or(false)
        || element.has_class_containing("breadcrumb")
}

/// `<nav>`/`<header>` with links -> navbar
pub fn build_navbar(element: &Element) -> Component {
    let mut navbar = Component::new(ComponentType::Navbar);
    navbar.style = element
        .attr("style")
        .map(|s| parse_inline_style(&s))
        .unwrap_or_default();

    let brand = element
        .find_descendant(|e| e.has_class_containing("logo") || e.has_class_containing("brand"))
        .map(|e| {
            let text = e.text_content();
            if text.is_empty() {
                e.attr("alt").unwrap_or_default()
            } else {
                text
            }
        })
        .filter(|t| !t.is_empty())
        .or_else(|| {
            element
                .children()
                .into_iter()
                .map(|e| e.text_content())
                .find(|t| !t.is_empty())
        });
    navbar.content = brand.unwrap_or_else(|| "Logo".to_string());
    navbar.nav_links = Some(collect_links(element));
    navbar
}

pub fn build_breadcrumb(element: &Element) -> Component {
    let mut breadcrumb = Component::new(ComponentType::Breadcrumb);
    let links = collect_links(element);
    breadcrumb.content = links
        .iter()
        .map(|l| l.title.as_str())
        .collect::<Vec<_>>()
        .join(" / ");
    breadcrumb.nav_links = Some(links);
    breadcrumb
}

pub fn build_footer(element: &Element) -> Component {
    let mut footer = Component::new(ComponentType::Footer);
    footer.style = element
        .attr("style")
        .map(|s| parse_inline_style(&s))
        .unwrap_or_default();
    footer.content = element.text_content();
    let links = collect_links(element);
    footer.nav_links = (!links.is_empty()).then_some(links);
    footer
}

/// Paragraph from a bare text run
pub fn text_paragraph(text: &str) -> Component {
    Component::new(ComponentType::Paragraph).with_content(collapse_whitespace(text))
}

//! # CSS Export
//!
//! Base stylesheet plus one grid ruleset per section. Output depends only on
//! the section list, so compiling twice yields identical bytes; the HTML
//! compiler embeds this exact string in its `<style>` block.

use blocksmith_model::style::is_safe_css_value;
use blocksmith_model::Section;
use tracing::{debug, warn};

/// Stylesheet every exported page starts with
pub const BASE_STYLESHEET: &str = include_str!("../static/base.css");

/// Viewport width at which section grids collapse to one column
pub const MOBILE_BREAKPOINT: &str = "(max-width: 768px)";

/// Gap between section columns
pub const SECTION_GAP: &str = "24px";

/// A single ruleset, optionally inside a media query
#[derive(Debug, Clone, PartialEq)]
pub struct CssRule {
    pub selector: String,
    /// Declarations in emission order
    pub properties: Vec<(String, String)>,
    pub media_query: Option<String>,
}

impl CssRule {
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            properties: Vec::new(),
            media_query: None,
        }
    }

    pub fn with_media(mut self, media_query: impl Into<String>) -> Self {
        self.media_query = Some(media_query.into());
        self
    }

    pub fn property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.push((name.into(), value.into()));
        self
    }

    fn write(&self, css: &mut String, indent: &str) {
        css.push_str(indent);
        css.push_str(&self.selector);
        css.push_str(" {\n");
        for (name, value) in &self.properties {
            css.push_str(indent);
            css.push_str("  ");
            css.push_str(name);
            css.push_str(": ");
            css.push_str(value);
            css.push_str(";\n");
        }
        css.push_str(indent);
        css.push_str("}\n");
    }
}

/// Ordered collection of rules. Media rules are grouped per query after the
/// plain rules, queries in order of first appearance.
#[derive(Debug, Clone, Default)]
pub struct StyleSheet {
    pub rules: Vec<CssRule>,
}

impl StyleSheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_rule(&mut self, rule: CssRule) {
        self.rules.push(rule);
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn to_css(&self) -> String {
        let mut css = String::new();

        for rule in self.rules.iter().filter(|r| r.media_query.is_none()) {
            if !css.is_empty() {
                css.push('\n');
            }
            rule.write(&mut css, "");
        }

        let mut queries: Vec<&str> = Vec::new();
        for query in self.rules.iter().filter_map(|r| r.media_query.as_deref()) {
            if !queries.contains(&query) {
                queries.push(query);
            }
        }

        for query in queries {
            if !css.is_empty() {
                css.push('\n');
            }
            css.push_str("@media ");
            css.push_str(query);
            css.push_str(" {\n");
            for rule in self
                .rules
                .iter()
                .filter(|r| r.media_query.as_deref() == Some(query))
            {
                rule.write(&mut css, "  ");
            }
            css.push_str("}\n");
        }

        css
    }
}

/// Selector of a section element, matching the HTML compiler's
/// `data-section-id` attribute
pub fn section_selector(section: &Section) -> String {
    format!(".page-section[data-section-id=\"{}\"]", escape_attr_value(&section.id))
}

fn escape_attr_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '<' => out.push_str("\\3c "),
            '>' => out.push_str("\\3e "),
            c if c.is_control() => out.push_str(&format!("\\{:x} ", c as u32)),
            c => out.push(c),
        }
    }
    out
}

/// `grid-template-columns` for a section: explicit widths when they match the
/// column count and are safe to emit, else `N x 1fr`
pub fn grid_template_columns(section: &Section) -> String {
    match section.effective_column_widths() {
        Some(widths) if widths.iter().all(|w| is_safe_css_value(w)) => widths.join(" "),
        Some(_) => {
            warn!(section_id = %section.id, "Ignoring unsafe column widths");
            equal_fractions(section)
        }
        None => equal_fractions(section),
    }
}

fn equal_fractions(section: &Section) -> String {
    vec!["1fr"; section.column_count()].join(" ")
}

/// Rules contributed by one section
pub fn section_rules(section: &Section) -> Vec<CssRule> {
    let selector = section_selector(section);
    let mut rules = Vec::new();

    let box_values = [
        ("background-color", &section.background_color),
        ("padding", &section.padding),
        ("min-height", &section.min_height),
    ];
    let mut box_rule = CssRule::new(selector.clone());
    for (name, value) in box_values {
        let Some(value) = value else { continue };
        if is_safe_css_value(value) {
            box_rule = box_rule.property(name, value.clone());
        } else {
            warn!(section_id = %section.id, property = name, "Skipping unsafe section style value");
        }
    }
    if !box_rule.properties.is_empty() {
        rules.push(box_rule);
    }

    let grid_selector = format!("{} .section-grid", selector);
    rules.push(
        CssRule::new(grid_selector.clone())
            .property("display", "grid")
            .property("grid-template-columns", grid_template_columns(section))
            .property("gap", SECTION_GAP),
    );
    rules.push(
        CssRule::new(grid_selector)
            .with_media(MOBILE_BREAKPOINT)
            .property("grid-template-columns", "1fr !important"),
    );

    rules
}

/// Section rules only, without the base stylesheet
pub fn compile_section_rules(sections: &[Section]) -> String {
    let mut sheet = StyleSheet::new();
    for section in sections {
        for rule in section_rules(section) {
            sheet.add_rule(rule);
        }
    }
    sheet.to_css()
}

/// Complete stylesheet for an exported page
pub fn compile_to_css(sections: &[Section]) -> String {
    let rules = compile_section_rules(sections);
    debug!(sections = sections.len(), bytes = rules.len(), "Compiled section CSS");

    let mut css = String::with_capacity(BASE_STYLESHEET.len() + rules.len() + 32);
    css.push_str(BASE_STYLESHEET);
    if !rules.is_empty() {
        css.push_str("\n/* Sections */\n");
        css.push_str(&rules);
    }
    css
}

use crate::component::Component;
use crate::id_generator::{new_id, IdKind};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Named layout archetype of a section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SectionLayout {
    #[default]
    FullWidth,
    TwoColumns,
    ThreeColumns,
    SidebarLeft,
    SidebarRight,
    Hero,
    FeatureGrid,
}

impl SectionLayout {
    /// Default archetype for a plain N-column section
    pub fn for_columns(columns: usize) -> Self {
        match columns {
            0 | 1 => SectionLayout::FullWidth,
            2 => SectionLayout::TwoColumns,
            _ => SectionLayout::ThreeColumns,
        }
    }

    /// Column count and widths this archetype starts with
    pub fn default_columns(self) -> (usize, Option<Vec<String>>) {
        match self {
            SectionLayout::FullWidth | SectionLayout::Hero => (1, None),
            SectionLayout::TwoColumns => (2, None),
            SectionLayout::ThreeColumns | SectionLayout::FeatureGrid => (3, None),
            SectionLayout::SidebarLeft => (2, Some(vec!["30%".into(), "70%".into()])),
            SectionLayout::SidebarRight => (2, Some(vec!["70%".into(), "30%".into()])),
        }
    }
}

/// Horizontal slice of the page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default)]
    pub layout: SectionLayout,

    #[serde(default = "default_columns")]
    pub columns: usize,

    /// Percentages or fr-units, one per column
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_widths: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub padding: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_height: Option<String>,

    #[serde(default)]
    pub components: Vec<Component>,
}

fn default_columns() -> usize {
    1
}

impl Section {
    /// Empty full-width section
    pub fn new() -> Self {
        Self::with_layout(SectionLayout::FullWidth)
    }

    pub fn with_layout(layout: SectionLayout) -> Self {
        let (columns, column_widths) = layout.default_columns();
        Self {
            id: new_id(IdKind::Section),
            name: None,
            layout,
            columns,
            column_widths,
            background_color: None,
            padding: None,
            min_height: None,
            components: Vec::new(),
        }
    }

    /// Plain section with `columns` equal columns
    pub fn with_columns(columns: usize) -> Self {
        let columns = columns.max(1);
        let mut section = Self::with_layout(SectionLayout::for_columns(columns));
        section.columns = columns;
        section
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Column count, never less than one
    pub fn column_count(&self) -> usize {
        self.columns.max(1)
    }

    pub fn clamp_column(&self, column_index: usize) -> usize {
        column_index.min(self.column_count() - 1)
    }

    /// Widths to emit, only when they match the column count
    pub fn effective_column_widths(&self) -> Option<&[String]> {
        match &self.column_widths {
            Some(widths) if widths.len() == self.column_count() => Some(widths),
            _ => None,
        }
    }

    /// Replace the column widths. A list whose length differs from the column
    /// count is discarded.
    pub fn set_column_widths(&mut self, widths: Option<Vec<String>>) {
        match widths {
            Some(widths) if widths.len() != self.column_count() => {
                warn!(
                    section_id = %self.id,
                    columns = self.column_count(),
                    widths = widths.len(),
                    "Discarding column widths that do not match column count"
                );
                self.column_widths = None;
            }
            other => self.column_widths = other,
        }
    }

    /// Change the column count, re-clamping every top-level column index
    pub fn set_columns(&mut self, columns: usize) {
        self.columns = columns.max(1);
        if self.effective_column_widths().is_none() {
            self.column_widths = None;
        }
        self.clamp_component_columns();
    }

    /// Clamp every direct child's column index to the valid range
    pub fn clamp_component_columns(&mut self) {
        let last = self.column_count() - 1;
        for component in &mut self.components {
            if component.column_index() > last {
                component.set_column_index(last);
            }
        }
    }

    /// Top-level components grouped by clamped column, in insertion order
    pub fn components_by_column(&self) -> Vec<Vec<&Component>> {
        let mut buckets: Vec<Vec<&Component>> = vec![Vec::new(); self.column_count()];
        for component in &self.components {
            buckets[self.clamp_column(component.column_index())].push(component);
        }
        buckets
    }

    /// Deep copy with fresh ids for the section and everything in it
    pub fn duplicate(&self) -> Section {
        let mut copy = self.clone();
        copy.id = new_id(IdKind::Section);
        copy.components = self.components.iter().map(Component::duplicate).collect();
        copy
    }
}

impl Default for Section {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::ComponentType;

    #[test]
    fn test_components_grouped_by_clamped_column() {
        let mut section = Section::with_columns(2);
        let paragraph = |text: &str| Component::new(ComponentType::Paragraph).with_content(text);
        section.components.push(paragraph("a"));
        section.components.push(paragraph("b").with_column(1));
        section.components.push(paragraph("c").with_column(7));

        let buckets = section.components_by_column();
        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].len(), 1);
        let second: Vec<&str> = buckets[1].iter().map(|c| c.content.as_str()).collect();
        assert_eq!(second, vec!["b", "c"]);
    }

    #[test]
    fn test_mismatched_widths_discarded() {
        let mut section = Section::with_columns(2);
        section.set_column_widths(Some(vec!["100%".into()]));
        assert!(section.column_widths.is_none());

        section.set_column_widths(Some(vec!["1fr".into(), "2fr".into()]));
        assert_eq!(section.effective_column_widths().map(|w| w.len()), Some(2));
    }

    #[test]
    fn test_reducing_columns_reclamps_children() {
        let mut section = Section::with_columns(3);
        section.components.push(Component::new(ComponentType::Heading).with_column(2));
        section.set_column_widths(Some(vec!["1fr".into(), "1fr".into(), "2fr".into()]));

        section.set_columns(2);
        assert_eq!(section.components[0].column_index(), 1);
        assert!(section.column_widths.is_none());
    }

    #[test]
    fn test_sidebar_layout_defaults() {
        let section = Section::with_layout(SectionLayout::SidebarLeft);
        assert_eq!(section.columns, 2);
        assert_eq!(
            section.effective_column_widths(),
            Some(&["30%".to_string(), "70%".to_string()][..])
        );
    }

    #[test]
    fn test_duplicate_section_has_fresh_ids() {
        let mut section = Section::new();
        section.components.push(Component::new(ComponentType::Paragraph));
        let copy = section.duplicate();
        assert_ne!(copy.id, section.id);
        assert_ne!(copy.components[0].id, section.components[0].id);
    }
}

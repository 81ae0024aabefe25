//! # Content Nodes
//!
//! A [`Component`] is the atomic unit of the page tree. Every component has a
//! closed [`ComponentType`], free-form `content`, a style map and a handful of
//! optional type-specific fields. Only the three container types own child
//! components; for every other type `children` is ignored.

use crate::id_generator::{new_id, IdKind};
use crate::style::StyleMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Closed set of content node types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ComponentType {
    // Text-like
    Heading,
    Paragraph,
    Link,
    Button,

    // Media
    Image,
    Video,
    Audio,
    Embed,

    // Structural
    Divider,
    Spacer,
    Card,
    List,
    LayoutContainer,
    GridContainer,
    FlexContainer,

    // Data display
    Table,
    Badge,
    Avatar,
    Progress,

    // Form
    Input,
    Textarea,
    Select,
    Checkbox,
    Radio,
    Form,

    // Navigation
    Navbar,
    Menu,
    Breadcrumb,
    Footer,

    // Catalog
    Collection,
    ProductList,

    /// Any type string this build does not know about
    #[serde(other)]
    Unknown,
}

impl ComponentType {
    /// Container types own an ordered list of child components
    pub fn is_container(self) -> bool {
        matches!(
            self,
            ComponentType::LayoutContainer
                | ComponentType::GridContainer
                | ComponentType::FlexContainer
        )
    }

    pub fn is_catalog(self) -> bool {
        matches!(self, ComponentType::Collection | ComponentType::ProductList)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ComponentType::Heading => "heading",
            ComponentType::Paragraph => "paragraph",
            ComponentType::Link => "link",
            ComponentType::Button => "button",
            ComponentType::Image => "image",
            ComponentType::Video => "video",
            ComponentType::Audio => "audio",
            ComponentType::Embed => "embed",
            ComponentType::Divider => "divider",
            ComponentType::Spacer => "spacer",
            ComponentType::Card => "card",
            ComponentType::List => "list",
            ComponentType::LayoutContainer => "layout-container",
            ComponentType::GridContainer => "grid-container",
            ComponentType::FlexContainer => "flex-container",
            ComponentType::Table => "table",
            ComponentType::Badge => "badge",
            ComponentType::Avatar => "avatar",
            ComponentType::Progress => "progress",
            ComponentType::Input => "input",
            ComponentType::Textarea => "textarea",
            ComponentType::Select => "select",
            ComponentType::Checkbox => "checkbox",
            ComponentType::Radio => "radio",
            ComponentType::Form => "form",
            ComponentType::Navbar => "navbar",
            ComponentType::Menu => "menu",
            ComponentType::Breadcrumb => "breadcrumb",
            ComponentType::Footer => "footer",
            ComponentType::Collection => "collection",
            ComponentType::ProductList => "product-list",
            ComponentType::Unknown => "unknown",
        }
    }
}

/// Text formatting applied on top of the style map
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Formatting {
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
    #[serde(default)]
    pub underline: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub align: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<String>,
}

impl Formatting {
    pub fn is_empty(&self) -> bool {
        !self.bold
            && !self.italic
            && !self.underline
            && self.align.is_none()
            && self.font_size.is_none()
    }
}

/// Positional metadata plus any extra keys callers attach
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Props {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_index: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavLink {
    pub title: String,
    pub href: String,
}

/// One product or collection entry returned by a catalog lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(default)]
    pub cta_text: String,
    #[serde(default)]
    pub cta_url: String,
}

/// Structured payload of collection and product-list nodes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<usize>,
    #[serde(default)]
    pub items: Vec<CatalogItem>,
}

/// Content node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Component {
    pub id: String,

    #[serde(rename = "type")]
    pub kind: ComponentType,

    #[serde(default)]
    pub content: String,

    #[serde(default, skip_serializing_if = "StyleMap::is_empty")]
    pub style: StyleMap,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatting: Option<Formatting>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub props: Option<Props>,

    /// Heading level (1-6)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<u8>,

    /// Column count for containers and catalog grids
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<usize>,

    // Media
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobile_image_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobile_src: Option<String>,

    // Table
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows: Option<Vec<Vec<String>>>,

    // Form
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,

    // Link
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,

    // Navigation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nav_links: Option<Vec<NavLink>>,

    // Catalog
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog: Option<CatalogPayload>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<Component>>,
}

impl Component {
    /// Create an empty component of the given type with a fresh id
    pub fn new(kind: ComponentType) -> Self {
        Self {
            id: new_id(IdKind::Component),
            kind,
            content: String::new(),
            style: StyleMap::new(),
            formatting: None,
            props: None,
            level: None,
            columns: None,
            src: None,
            alt: None,
            image_id: None,
            mobile_image_id: None,
            mobile_src: None,
            headers: None,
            rows: None,
            placeholder: None,
            label: None,
            name: None,
            input_type: None,
            required: None,
            disabled: None,
            options: None,
            action: None,
            method: None,
            href: None,
            target: None,
            nav_links: None,
            catalog: None,
            children: if kind.is_container() { Some(Vec::new()) } else { None },
        }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    pub fn with_column(mut self, column_index: usize) -> Self {
        self.set_column_index(column_index);
        self
    }

    pub fn is_container(&self) -> bool {
        self.kind.is_container()
    }

    /// Child components. Always empty for non-container types.
    pub fn children(&self) -> &[Component] {
        if !self.is_container() {
            return &[];
        }
        self.children.as_deref().unwrap_or(&[])
    }

    /// Mutable child list, created on demand. `None` for non-container types.
    pub fn children_mut(&mut self) -> Option<&mut Vec<Component>> {
        if !self.is_container() {
            return None;
        }
        Some(self.children.get_or_insert_with(Vec::new))
    }

    /// Column assignment within the parent section or container (default 0)
    pub fn column_index(&self) -> usize {
        self.props
            .as_ref()
            .and_then(|p| p.column_index)
            .unwrap_or(0)
    }

    pub fn set_column_index(&mut self, column_index: usize) {
        self.props.get_or_insert_with(Props::default).column_index = Some(column_index);
    }

    pub fn set_span(&mut self, span: impl Into<String>) {
        self.props.get_or_insert_with(Props::default).span = Some(span.into());
    }

    /// Deep copy with freshly generated ids for this node and every descendant
    pub fn duplicate(&self) -> Component {
        let mut copy = self.clone();
        copy.regenerate_ids();
        copy
    }

    fn regenerate_ids(&mut self) {
        self.id = new_id(IdKind::Component);
        if let Some(children) = self.children.as_mut() {
            for child in children {
                child.regenerate_ids();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_serializes_kebab_case() {
        let json = serde_json::to_string(&ComponentType::LayoutContainer).unwrap();
        assert_eq!(json, "\"layout-container\"");

        let parsed: ComponentType = serde_json::from_str("\"product-list\"").unwrap();
        assert_eq!(parsed, ComponentType::ProductList);
    }

    #[test]
    fn test_unknown_type_deserializes_to_fallback() {
        let parsed: ComponentType = serde_json::from_str("\"carousel\"").unwrap();
        assert_eq!(parsed, ComponentType::Unknown);
    }

    #[test]
    fn test_children_ignored_for_leaf_types() {
        let mut heading = Component::new(ComponentType::Heading);
        heading.children = Some(vec![Component::new(ComponentType::Paragraph)]);

        assert!(heading.children().is_empty());
        assert!(heading.children_mut().is_none());
    }

    #[test]
    fn test_duplicate_regenerates_nested_ids() {
        let mut container = Component::new(ComponentType::LayoutContainer);
        container
            .children_mut()
            .unwrap()
            .push(Component::new(ComponentType::Paragraph).with_content("inner"));

        let copy = container.duplicate();
        assert_ne!(copy.id, container.id);
        assert_ne!(copy.children()[0].id, container.children()[0].id);
        assert_eq!(copy.children()[0].content, "inner");
    }

    #[test]
    fn test_props_round_trip_with_extra_keys() {
        let json = r#"{"id":"c1","type":"paragraph","content":"x","props":{"columnIndex":2,"span":"column","anchor":"intro"}}"#;
        let component: Component = serde_json::from_str(json).unwrap();

        assert_eq!(component.column_index(), 2);
        let props = component.props.as_ref().unwrap();
        assert_eq!(props.span.as_deref(), Some("column"));
        assert_eq!(props.extra.get("anchor"), Some(&serde_json::json!("intro")));

        let back = serde_json::to_value(&component).unwrap();
        assert_eq!(back["props"]["columnIndex"], 2);
        assert_eq!(back["props"]["anchor"], "intro");
    }
}

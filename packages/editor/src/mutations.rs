//! # Tree Mutations
//!
//! Semantic operations on the section list. Every mutation addresses its
//! targets by id and searches container children recursively.
//!
//! ## Semantics
//!
//! - A mutation either applies completely or fails without touching the tree.
//!   All targets are looked up before anything is removed.
//! - Indexes are clamped to the destination list. Top-level column indexes
//!   are clamped to the section's column range.
//! - Inserted subtrees whose ids already occur in the tree are re-issued
//!   fresh ids, so no sequence of mutations produces duplicate ids.
//! - Removing a component or section reports every blob it referenced in
//!   [`MutationEffect::released_blobs`]; the caller releases them.

use crate::errors::MutationError;
use blocksmith_model::tree::{collect_ids, find_component, find_component_mut, subtree_contains};
use blocksmith_model::visitor::{walk_sections, BlobRefCollector};
use blocksmith_model::{
    CatalogPayload, Component, Formatting, NavLink, Props, Section, SectionLayout, StyleMap,
    Visitor,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Semantic mutations on the section list
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "op", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Mutation {
    /// Insert a component at the top level of a section (default: append)
    AddComponent {
        section_id: String,
        component: Component,
        #[serde(default)]
        index: Option<usize>,
    },

    /// Insert a component into a container anywhere in the section
    AddToContainer {
        section_id: String,
        container_id: String,
        component: Component,
        #[serde(default)]
        index: Option<usize>,
    },

    /// Shallow-merge fields into a component
    UpdateComponent {
        section_id: String,
        component_id: String,
        patch: ComponentPatch,
    },

    /// Remove a component and its subtree
    RemoveComponent {
        section_id: String,
        component_id: String,
    },

    /// Relocate a component, possibly across sections and containers
    MoveComponent {
        from_section_id: String,
        to_section_id: String,
        component_id: String,
        index: usize,
        #[serde(default)]
        target_column: Option<usize>,
        #[serde(default)]
        target_span: Option<String>,
        #[serde(default)]
        from_container_id: Option<String>,
        #[serde(default)]
        to_container_id: Option<String>,
    },

    /// Insert a copy with fresh ids right after the original
    DuplicateComponent {
        section_id: String,
        component_id: String,
    },

    /// Move one catalog item within a collection or product list
    ReorderCollection {
        section_id: String,
        component_id: String,
        old_index: usize,
        new_index: usize,
    },

    AddSection {
        section: Section,
        #[serde(default)]
        index: Option<usize>,
    },

    RemoveSection {
        section_id: String,
    },

    MoveSection {
        section_id: String,
        index: usize,
    },

    DuplicateSection {
        section_id: String,
    },

    UpdateSection {
        section_id: String,
        patch: SectionPatch,
    },

    /// Live column resize. Never recorded in history.
    ResizeColumns {
        section_id: String,
        widths: Vec<String>,
    },
}

/// Fields to overwrite on a component. `None` leaves the field alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ComponentPatch {
    pub content: Option<String>,
    pub style: Option<StyleMap>,
    pub formatting: Option<Formatting>,
    pub props: Option<Props>,
    pub level: Option<u8>,
    pub columns: Option<usize>,
    pub src: Option<String>,
    pub alt: Option<String>,
    pub image_id: Option<String>,
    pub mobile_image_id: Option<String>,
    pub mobile_src: Option<String>,
    pub headers: Option<Vec<String>>,
    pub rows: Option<Vec<Vec<String>>>,
    pub placeholder: Option<String>,
    pub label: Option<String>,
    pub name: Option<String>,
    pub input_type: Option<String>,
    pub required: Option<bool>,
    pub disabled: Option<bool>,
    pub options: Option<Vec<String>>,
    pub action: Option<String>,
    pub method: Option<String>,
    pub href: Option<String>,
    pub target: Option<String>,
    pub nav_links: Option<Vec<NavLink>>,
    pub catalog: Option<CatalogPayload>,
}

impl ComponentPatch {
    pub fn content(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Default::default()
        }
    }

    fn merge_into(self, component: &mut Component) {
        macro_rules! merge {
            ($($field:ident),* $(,)?) => {
                $(if let Some(value) = self.$field {
                    component.$field = value;
                })*
            };
        }
        macro_rules! merge_opt {
            ($($field:ident),* $(,)?) => {
                $(if let Some(value) = self.$field {
                    component.$field = Some(value);
                })*
            };
        }

        merge!(content, style);
        merge_opt!(
            formatting,
            props,
            level,
            columns,
            src,
            alt,
            image_id,
            mobile_image_id,
            mobile_src,
            headers,
            rows,
            placeholder,
            label,
            name,
            input_type,
            required,
            disabled,
            options,
            action,
            method,
            href,
            target,
            nav_links,
            catalog,
        );
    }
}

/// Section fields to overwrite
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SectionPatch {
    pub name: Option<String>,
    /// Also resets columns and widths to the archetype's defaults unless
    /// `columns` is given too
    pub layout: Option<SectionLayout>,
    pub columns: Option<usize>,
    /// An empty list clears the widths
    pub column_widths: Option<Vec<String>>,
    pub background_color: Option<String>,
    pub padding: Option<String>,
    pub min_height: Option<String>,
}

/// What an applied mutation did beyond editing the tree
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MutationEffect {
    /// Blob ids referenced only by removed content
    pub released_blobs: Vec<String>,
    /// The removed subtree, for `RemoveComponent`
    pub removed: Option<Component>,
}

impl Mutation {
    /// Short label used for history entries
    pub fn label(&self) -> &'static str {
        match self {
            Mutation::AddComponent { .. } | Mutation::AddToContainer { .. } => "Add component",
            Mutation::UpdateComponent { .. } => "Update component",
            Mutation::RemoveComponent { .. } => "Remove component",
            Mutation::MoveComponent { .. } => "Move component",
            Mutation::DuplicateComponent { .. } => "Duplicate component",
            Mutation::ReorderCollection { .. } => "Reorder collection",
            Mutation::AddSection { .. } => "Add section",
            Mutation::RemoveSection { .. } => "Remove section",
            Mutation::MoveSection { .. } => "Move section",
            Mutation::DuplicateSection { .. } => "Duplicate section",
            Mutation::UpdateSection { .. } => "Update section",
            Mutation::ResizeColumns { .. } => "Resize columns",
        }
    }

    pub fn records_history(&self) -> bool {
        !matches!(self, Mutation::ResizeColumns { .. })
    }

    /// Apply to `sections`. On error the tree is unchanged.
    pub fn apply(self, sections: &mut Vec<Section>) -> Result<MutationEffect, MutationError> {
        match self {
            Mutation::AddComponent { section_id, component, index } => {
                let component = with_unique_ids(component, sections);
                let section = section_mut(sections, &section_id)?;
                Self::apply_add(section, component, index);
                Ok(MutationEffect::default())
            }

            Mutation::AddToContainer { section_id, container_id, component, index } => {
                let component = with_unique_ids(component, sections);
                let section = section_mut(sections, &section_id)?;
                let children = container_children_mut(section, &container_id)?;
                let at = index.unwrap_or(children.len()).min(children.len());
                children.insert(at, component);
                Ok(MutationEffect::default())
            }

            Mutation::UpdateComponent { section_id, component_id, patch } => {
                let section = section_mut(sections, &section_id)?;
                let component = find_component_mut(&mut section.components, &component_id)
                    .ok_or(MutationError::ComponentNotFound(component_id))?;
                let previous = image_refs(component);
                patch.merge_into(component);
                let current = image_refs(component);
                section.clamp_component_columns();

                let replaced = previous.into_iter().filter(|id| !current.contains(id));
                Ok(MutationEffect {
                    released_blobs: unreferenced(replaced, sections),
                    removed: None,
                })
            }

            Mutation::RemoveComponent { section_id, component_id } => {
                let section = section_mut(sections, &section_id)?;
                let removed = take_component(&mut section.components, &component_id)
                    .ok_or(MutationError::ComponentNotFound(component_id))?;
                let released_blobs = released_blobs(&[&removed], sections);
                Ok(MutationEffect {
                    released_blobs,
                    removed: Some(removed),
                })
            }

            Mutation::MoveComponent {
                from_section_id,
                to_section_id,
                component_id,
                index,
                target_column,
                target_span,
                from_container_id,
                to_container_id,
            } => {
                Self::apply_move(
                    sections,
                    MoveRequest {
                        from_section_id,
                        to_section_id,
                        component_id,
                        index,
                        target_column,
                        target_span,
                        from_container_id,
                        to_container_id,
                    },
                )?;
                Ok(MutationEffect::default())
            }

            Mutation::DuplicateComponent { section_id, component_id } => {
                let section = section_mut(sections, &section_id)?;
                let (list, position) = locate_mut(&mut section.components, &component_id)
                    .ok_or(MutationError::ComponentNotFound(component_id))?;
                let copy = list[position].duplicate();
                list.insert(position + 1, copy);
                Ok(MutationEffect::default())
            }

            Mutation::ReorderCollection { section_id, component_id, old_index, new_index } => {
                let section = section_mut(sections, &section_id)?;
                let component = find_component_mut(&mut section.components, &component_id)
                    .ok_or_else(|| MutationError::ComponentNotFound(component_id.clone()))?;
                let items = component
                    .catalog
                    .as_mut()
                    .map(|payload| &mut payload.items)
                    .ok_or(MutationError::NoCatalogPayload(component_id))?;
                let len = items.len();
                for index in [old_index, new_index] {
                    if index >= len {
                        return Err(MutationError::IndexOutOfRange { index, len });
                    }
                }
                let item = items.remove(old_index);
                items.insert(new_index, item);
                Ok(MutationEffect::default())
            }

            Mutation::AddSection { section, index } => {
                let mut section = section;
                let existing = collect_ids(sections);
                if sections.iter().any(|s| s.id == section.id)
                    || section_ids_collide(&section, &existing)
                {
                    section = section.duplicate();
                }
                section.set_columns(section.columns);
                let at = index.unwrap_or(sections.len()).min(sections.len());
                sections.insert(at, section);
                Ok(MutationEffect::default())
            }

            Mutation::RemoveSection { section_id } => {
                let position = section_position(sections, &section_id)?;
                let removed = sections.remove(position);
                let roots: Vec<&Component> = removed.components.iter().collect();
                Ok(MutationEffect {
                    released_blobs: released_blobs(&roots, sections),
                    removed: None,
                })
            }

            Mutation::MoveSection { section_id, index } => {
                let position = section_position(sections, &section_id)?;
                let section = sections.remove(position);
                let at = index.min(sections.len());
                sections.insert(at, section);
                Ok(MutationEffect::default())
            }

            Mutation::DuplicateSection { section_id } => {
                let position = section_position(sections, &section_id)?;
                let copy = sections[position].duplicate();
                sections.insert(position + 1, copy);
                Ok(MutationEffect::default())
            }

            Mutation::UpdateSection { section_id, patch } => {
                let section = section_mut(sections, &section_id)?;
                Self::apply_section_patch(section, patch);
                Ok(MutationEffect::default())
            }

            Mutation::ResizeColumns { section_id, widths } => {
                let section = section_mut(sections, &section_id)?;
                section.set_column_widths(Some(widths));
                Ok(MutationEffect::default())
            }
        }
    }

    fn apply_add(section: &mut Section, mut component: Component, index: Option<usize>) {
        let column = section.clamp_column(component.column_index());
        component.set_column_index(column);
        let len = section.components.len();
        section.components.insert(index.unwrap_or(len).min(len), component);
    }

    fn apply_move(sections: &mut [Section], request: MoveRequest) -> Result<(), MutationError> {
        // Validate everything up front so a failed move leaves the tree intact
        let source = section_ref(sections, &request.from_section_id)?;
        let moving = match &request.from_container_id {
            Some(container_id) => {
                let container = find_component(&source.components, container_id)
                    .ok_or_else(|| MutationError::ContainerNotFound(container_id.clone()))?;
                find_component(container.children(), &request.component_id)
            }
            None => find_component(&source.components, &request.component_id),
        }
        .ok_or_else(|| MutationError::ComponentNotFound(request.component_id.clone()))?;

        let destination = section_ref(sections, &request.to_section_id)?;
        if let Some(container_id) = &request.to_container_id {
            let container = find_component(&destination.components, container_id)
                .ok_or_else(|| MutationError::ContainerNotFound(container_id.clone()))?;
            if !container.is_container() {
                return Err(MutationError::NotAContainer(container_id.clone()));
            }
            if subtree_contains(moving, container_id) {
                return Err(MutationError::CycleDetected);
            }
        }

        let source = section_mut(sections, &request.from_section_id)?;
        let mut component = take_component(&mut source.components, &request.component_id)
            .ok_or_else(|| MutationError::ComponentNotFound(request.component_id.clone()))?;
        if let Some(span) = request.target_span {
            component.set_span(span);
        }

        let destination = section_mut(sections, &request.to_section_id)?;
        match &request.to_container_id {
            Some(container_id) => {
                let container_columns = find_component(&destination.components, container_id)
                    .and_then(|c| c.columns)
                    .unwrap_or(1)
                    .max(1);
                let column = request.target_column.unwrap_or_else(|| component.column_index());
                component.set_column_index(column.min(container_columns - 1));
                let children = container_children_mut(destination, container_id)?;
                children.insert(request.index.min(children.len()), component);
            }
            None => {
                let column = request.target_column.unwrap_or_else(|| component.column_index());
                component.set_column_index(destination.clamp_column(column));
                let len = destination.components.len();
                destination.components.insert(request.index.min(len), component);
            }
        }
        Ok(())
    }

    fn apply_section_patch(section: &mut Section, patch: SectionPatch) {
        if let Some(name) = patch.name {
            section.name = Some(name);
        }
        if let Some(layout) = patch.layout {
            section.layout = layout;
            if patch.columns.is_none() {
                let (columns, widths) = layout.default_columns();
                section.column_widths = widths;
                section.set_columns(columns);
            }
        }
        if let Some(columns) = patch.columns {
            section.set_columns(columns);
        }
        if let Some(widths) = patch.column_widths {
            section.set_column_widths(if widths.is_empty() { None } else { Some(widths) });
        }
        if let Some(color) = patch.background_color {
            section.background_color = Some(color);
        }
        if let Some(padding) = patch.padding {
            section.padding = Some(padding);
        }
        if let Some(min_height) = patch.min_height {
            section.min_height = Some(min_height);
        }
    }
}

struct MoveRequest {
    from_section_id: String,
    to_section_id: String,
    component_id: String,
    index: usize,
    target_column: Option<usize>,
    target_span: Option<String>,
    from_container_id: Option<String>,
    to_container_id: Option<String>,
}

fn section_position(sections: &[Section], id: &str) -> Result<usize, MutationError> {
    sections
        .iter()
        .position(|s| s.id == id)
        .ok_or_else(|| MutationError::SectionNotFound(id.to_string()))
}

fn section_ref<'a>(sections: &'a [Section], id: &str) -> Result<&'a Section, MutationError> {
    sections
        .iter()
        .find(|s| s.id == id)
        .ok_or_else(|| MutationError::SectionNotFound(id.to_string()))
}

fn section_mut<'a>(
    sections: &'a mut [Section],
    id: &str,
) -> Result<&'a mut Section, MutationError> {
    sections
        .iter_mut()
        .find(|s| s.id == id)
        .ok_or_else(|| MutationError::SectionNotFound(id.to_string()))
}

fn container_children_mut<'a>(
    section: &'a mut Section,
    container_id: &str,
) -> Result<&'a mut Vec<Component>, MutationError> {
    let container = find_component_mut(&mut section.components, container_id)
        .ok_or_else(|| MutationError::ContainerNotFound(container_id.to_string()))?;
    container
        .children_mut()
        .ok_or_else(|| MutationError::NotAContainer(container_id.to_string()))
}

/// The list holding `id` and its position in that list
fn locate_mut<'a>(
    list: &'a mut Vec<Component>,
    id: &str,
) -> Option<(&'a mut Vec<Component>, usize)> {
    if let Some(position) = list.iter().position(|c| c.id == id) {
        return Some((list, position));
    }
    for component in list.iter_mut() {
        if let Some(children) = component.children_mut() {
            if let Some(found) = locate_mut(children, id) {
                return Some(found);
            }
        }
    }
    None
}

/// Detach `id` from wherever it is nested
fn take_component(list: &mut Vec<Component>, id: &str) -> Option<Component> {
    if let Some(position) = list.iter().position(|c| c.id == id) {
        return Some(list.remove(position));
    }
    for component in list.iter_mut() {
        if let Some(children) = component.children_mut() {
            if let Some(taken) = take_component(children, id) {
                return Some(taken);
            }
        }
    }
    None
}

fn with_unique_ids(component: Component, sections: &[Section]) -> Component {
    let existing: HashSet<String> = collect_ids(sections).into_iter().collect();
    let mut incoming = Vec::new();
    collect_subtree_ids(&component, &mut incoming);
    if incoming.iter().any(|id| existing.contains(id)) {
        component.duplicate()
    } else {
        component
    }
}

fn section_ids_collide(section: &Section, existing: &[String]) -> bool {
    let mut incoming = Vec::new();
    for component in &section.components {
        collect_subtree_ids(component, &mut incoming);
    }
    incoming.iter().any(|id| existing.contains(id))
}

fn collect_subtree_ids(component: &Component, ids: &mut Vec<String>) {
    ids.push(component.id.clone());
    for child in component.children() {
        collect_subtree_ids(child, ids);
    }
}

/// Blob ids referenced by `removed` that nothing left in `sections` still uses
fn released_blobs(removed: &[&Component], sections: &[Section]) -> Vec<String> {
    let mut collector = BlobRefCollector::default();
    for component in removed {
        collector.visit_component(component);
    }

    unreferenced(collector.blob_ids, sections)
}

/// Blob ids the component itself points at, children excluded
fn image_refs(component: &Component) -> Vec<String> {
    let mut ids: Vec<String> = [&component.image_id, &component.mobile_image_id]
        .into_iter()
        .flatten()
        .cloned()
        .collect();
    ids.dedup();
    ids
}

fn unreferenced(
    candidates: impl IntoIterator<Item = String>,
    sections: &[Section],
) -> Vec<String> {
    let mut remaining = BlobRefCollector::default();
    walk_sections(&mut remaining, sections);

    candidates
        .into_iter()
        .filter(|id| !remaining.blob_ids.contains(id))
        .collect()
}

use crate::component::Component;
use crate::section::Section;

/// Visitor pattern for traversing the page tree immutably
///
/// Default implementations walk the entire tree in document order.
/// Override specific visit_* methods to act on nodes.
pub trait Visitor: Sized {
    fn visit_section(&mut self, section: &Section) {
        walk_section(self, section);
    }

    fn visit_component(&mut self, component: &Component) {
        walk_component(self, component);
    }
}

/// Mutable visitor pattern for transforming the page tree
pub trait VisitorMut: Sized {
    fn visit_section_mut(&mut self, section: &mut Section) {
        walk_section_mut(self, section);
    }

    fn visit_component_mut(&mut self, component: &mut Component) {
        walk_component_mut(self, component);
    }
}

pub fn walk_sections<V: Visitor>(visitor: &mut V, sections: &[Section]) {
    for section in sections {
        visitor.visit_section(section);
    }
}

pub fn walk_section<V: Visitor>(visitor: &mut V, section: &Section) {
    for component in &section.components {
        visitor.visit_component(component);
    }
}

pub fn walk_component<V: Visitor>(visitor: &mut V, component: &Component) {
    for child in component.children() {
        visitor.visit_component(child);
    }
}

pub fn walk_sections_mut<V: VisitorMut>(visitor: &mut V, sections: &mut [Section]) {
    for section in sections {
        visitor.visit_section_mut(section);
    }
}

pub fn walk_section_mut<V: VisitorMut>(visitor: &mut V, section: &mut Section) {
    for component in &mut section.components {
        visitor.visit_component_mut(component);
    }
}

pub fn walk_component_mut<V: VisitorMut>(visitor: &mut V, component: &mut Component) {
    if let Some(children) = component.children_mut() {
        for child in children {
            visitor.visit_component_mut(child);
        }
    }
}

/// Collects every component id in document order
#[derive(Debug, Default)]
pub struct IdCollector {
    pub ids: Vec<String>,
}

impl Visitor for IdCollector {
    fn visit_component(&mut self, component: &Component) {
        self.ids.push(component.id.clone());
        walk_component(self, component);
    }
}

/// Collects blob ids referenced by images (desktop and mobile variants)
#[derive(Debug, Default)]
pub struct BlobRefCollector {
    pub blob_ids: Vec<String>,
}

impl Visitor for BlobRefCollector {
    fn visit_component(&mut self, component: &Component) {
        for id in [&component.image_id, &component.mobile_image_id].into_iter().flatten() {
            if !self.blob_ids.contains(id) {
                self.blob_ids.push(id.clone());
            }
        }
        walk_component(self, component);
    }
}

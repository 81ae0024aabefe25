//! Lookups over the section/component tree. All searches are top-down by id
//! and descend into container children.

use crate::component::Component;
use crate::section::Section;
use crate::visitor::{walk_sections, IdCollector};
use std::collections::HashSet;

pub fn find_component<'a>(components: &'a [Component], id: &str) -> Option<&'a Component> {
    for component in components {
        if component.id == id {
            return Some(component);
        }
        if let Some(found) = find_component(component.children(), id) {
            return Some(found);
        }
    }
    None
}

pub fn find_component_mut<'a>(components: &'a mut [Component], id: &str) -> Option<&'a mut Component> {
    for component in components {
        if component.id == id {
            return Some(component);
        }
        if let Some(children) = component.children_mut() {
            if let Some(found) = find_component_mut(children, id) {
                return Some(found);
            }
        }
    }
    None
}

pub fn find_section<'a>(sections: &'a [Section], id: &str) -> Option<&'a Section> {
    sections.iter().find(|s| s.id == id)
}

pub fn find_section_mut<'a>(sections: &'a mut [Section], id: &str) -> Option<&'a mut Section> {
    sections.iter_mut().find(|s| s.id == id)
}

/// Whether `id` names `root` itself or any of its descendants
pub fn subtree_contains(root: &Component, id: &str) -> bool {
    root.id == id || find_component(root.children(), id).is_some()
}

/// Every component id across all sections, in document order
pub fn collect_ids(sections: &[Section]) -> Vec<String> {
    let mut collector = IdCollector::default();
    walk_sections(&mut collector, sections);
    collector.ids
}

/// Ids that occur more than once. Empty for a well-formed tree.
pub fn duplicate_ids(sections: &[Section]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut duplicates = Vec::new();
    for id in collect_ids(sections) {
        if !seen.insert(id.clone()) && !duplicates.contains(&id) {
            duplicates.push(id);
        }
    }
    duplicates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::ComponentType;

    fn tree() -> (Vec<Section>, String, String) {
        let inner = Component::new(ComponentType::Button).with_content("deep");
        let inner_id = inner.id.clone();

        let mut grid = Component::new(ComponentType::GridContainer);
        grid.children_mut().unwrap().push(inner);

        let mut outer = Component::new(ComponentType::LayoutContainer);
        let outer_id = outer.id.clone();
        outer.children_mut().unwrap().push(grid);

        let mut section = Section::new();
        section.components.push(outer);
        (vec![section], outer_id, inner_id)
    }

    #[test]
    fn test_find_nested_component() {
        let (sections, _, inner_id) = tree();
        let found = find_component(&sections[0].components, &inner_id).unwrap();
        assert_eq!(found.content, "deep");
    }

    #[test]
    fn test_find_component_mut_edits_in_place() {
        let (mut sections, _, inner_id) = tree();
        find_component_mut(&mut sections[0].components, &inner_id)
            .unwrap()
            .content = "edited".into();
        assert_eq!(
            find_component(&sections[0].components, &inner_id).unwrap().content,
            "edited"
        );
    }

    #[test]
    fn test_subtree_contains() {
        let (sections, outer_id, inner_id) = tree();
        let outer = find_component(&sections[0].components, &outer_id).unwrap();
        assert!(subtree_contains(outer, &inner_id));
        assert!(subtree_contains(outer, &outer_id));
        assert!(!subtree_contains(outer, "missing"));
    }

    #[test]
    fn test_duplicate_ids_detected() {
        let (mut sections, _, _) = tree();
        let copy = sections[0].components[0].clone();
        sections[0].components.push(copy);
        assert_eq!(duplicate_ids(&sections).len(), 3);
    }
}

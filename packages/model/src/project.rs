use crate::id_generator::{new_id, IdKind};
use crate::section::Section;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Snapshot of the section list taken after a mutation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub action: String,
    pub sections: Vec<Section>,
}

impl HistoryEntry {
    /// Deep, independent copy of `sections`
    pub fn snapshot(action: impl Into<String>, sections: &[Section], timestamp: DateTime<Utc>) -> Self {
        Self {
            id: new_id(IdKind::History),
            timestamp,
            action: action.into(),
            sections: sections.to_vec(),
        }
    }
}

/// A page being edited
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub sections: Vec<Section>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Most recent entry first
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
}

impl Project {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: new_id(IdKind::Project),
            name: name.into(),
            sections: Vec::new(),
            created_at: now,
            updated_at: now,
            history: Vec::new(),
        }
    }

    pub fn with_sections(mut self, sections: Vec<Section>) -> Self {
        self.sections = sections;
        self
    }

    /// A project without sections gets one empty full-width section.
    /// Returns true when the project was changed.
    pub fn normalize(&mut self) -> bool {
        if self.sections.is_empty() {
            self.sections.push(Section::new());
            return true;
        }
        false
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }

    /// Total number of components, including nested container children
    pub fn component_count(&self) -> usize {
        fn count(components: &[crate::Component]) -> usize {
            components
                .iter()
                .map(|c| 1 + count(c.children()))
                .sum()
        }
        self.sections.iter().map(|s| count(&s.components)).sum()
    }
}

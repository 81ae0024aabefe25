use uuid::Uuid;

/// What an id is generated for. Only affects the readable prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdKind {
    Component,
    Section,
    Project,
    History,
    Blob,
}

impl IdKind {
    pub fn prefix(self) -> &'static str {
        match self {
            IdKind::Component => "comp",
            IdKind::Section => "section",
            IdKind::Project => "project",
            IdKind::History => "hist",
            IdKind::Blob => "img",
        }
    }
}

/// Generate a fresh id. Ids are never reused, including across imports,
/// duplications and history restores.
pub fn new_id(kind: IdKind) -> String {
    format!("{}-{}", kind.prefix(), Uuid::new_v4().simple())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_ids_carry_prefix() {
        assert!(new_id(IdKind::Component).starts_with("comp-"));
        assert!(new_id(IdKind::Section).starts_with("section-"));
        assert!(new_id(IdKind::History).starts_with("hist-"));
    }

    #[test]
    fn test_ids_are_unique() {
        let ids: HashSet<String> = (0..1000).map(|_| new_id(IdKind::Component)).collect();
        assert_eq!(ids.len(), 1000);
    }
}

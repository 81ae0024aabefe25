use crate::errors::EditorError;
use crate::mutations::{ComponentPatch, Mutation};
use crate::store::ProjectStore;
use blocksmith_model::tree::{find_component, find_section};
use blocksmith_model::{CatalogPayload, CatalogSource};
use tracing::debug;

/// Fill a collection or product-list node with the results of `query`.
///
/// The node keeps its title and column count. Returns false when the node is
/// missing or is not a catalog node.
pub async fn populate_catalog(
    store: &mut ProjectStore,
    catalog: &dyn CatalogSource,
    section_id: &str,
    component_id: &str,
    query: &str,
) -> Result<bool, EditorError> {
    let existing = find_section(store.sections(), section_id)
        .and_then(|section| find_component(&section.components, component_id))
        .filter(|component| component.kind.is_catalog())
        .map(|component| component.catalog.clone().unwrap_or_default());

    let Some(existing) = existing else {
        debug!(component_id, "Catalog target missing or not a catalog node");
        return Ok(false);
    };

    let items = catalog.search(query).await?;
    debug!(component_id, query, results = items.len(), "Populating catalog node");

    let patch = ComponentPatch {
        catalog: Some(CatalogPayload { items, ..existing }),
        ..Default::default()
    };
    let applied = store
        .apply(Mutation::UpdateComponent {
            section_id: section_id.to_string(),
            component_id: component_id.to_string(),
            patch,
        })
        .await;
    Ok(applied.is_some())
}

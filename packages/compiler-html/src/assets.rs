//! Image pre-pass: swaps blob references for inline data URIs so the exported
//! document is self-contained.

use blocksmith_model::visitor::{walk_component_mut, walk_sections, walk_sections_mut, BlobRefCollector};
use blocksmith_model::{BlobError, BlobStore, Component, Section, VisitorMut};
use std::collections::HashMap;
use tracing::{debug, instrument};

/// Copy of `sections` with every resolvable `imageId` / `mobileImageId`
/// written into `src` / `mobileSrc`. Blobs the store does not have are left
/// alone and render as "image absent". A store error aborts the pass.
#[instrument(skip_all, fields(sections = sections.len()))]
pub async fn resolve_images(
    sections: &[Section],
    store: &dyn BlobStore,
) -> Result<Vec<Section>, BlobError> {
    let mut collector = BlobRefCollector::default();
    walk_sections(&mut collector, sections);

    let mut resolved = HashMap::new();
    for id in collector.blob_ids {
        match store.get_inline(&id).await? {
            Some(uri) => {
                resolved.insert(id, uri);
            }
            None => debug!(blob_id = %id, "Blob missing, image left unresolved"),
        }
    }

    let mut sections = sections.to_vec();
    if !resolved.is_empty() {
        let mut inliner = ImageInliner { resolved: &resolved };
        walk_sections_mut(&mut inliner, &mut sections);
    }
    Ok(sections)
}

struct ImageInliner<'a> {
    resolved: &'a HashMap<String, String>,
}

impl VisitorMut for ImageInliner<'_> {
    fn visit_component_mut(&mut self, component: &mut Component) {
        if let Some(uri) = component.image_id.as_ref().and_then(|id| self.resolved.get(id)) {
            component.src = Some(uri.clone());
        }
        if let Some(uri) = component
            .mobile_image_id
            .as_ref()
            .and_then(|id| self.resolved.get(id))
        {
            component.mobile_src = Some(uri.clone());
        }
        walk_component_mut(self, component);
    }
}

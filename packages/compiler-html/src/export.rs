//! Export facade: HTML document plus the matching stylesheet.

use crate::assets::resolve_images;
use crate::compiler::{compile_to_html, CompileOptions};
use blocksmith_compiler_css::compile_to_css;
use blocksmith_model::{BlobStore, Section};
use std::borrow::Cow;
use tracing::{info, instrument, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOutput {
    pub html: String,
    pub css: String,
}

/// Export the tree as-is. Image blob references are not resolved.
pub fn export(sections: &[Section], options: &CompileOptions) -> ExportOutput {
    ExportOutput {
        html: compile_to_html(sections, options),
        css: compile_to_css(sections),
    }
}

/// Export with images inlined from `store`. When the pre-pass fails the
/// unresolved tree is exported instead.
#[instrument(skip_all, fields(sections = sections.len()))]
pub async fn export_with_assets(
    sections: &[Section],
    store: &dyn BlobStore,
    options: &CompileOptions,
) -> ExportOutput {
    let tree: Cow<'_, [Section]> = match resolve_images(sections, store).await {
        Ok(resolved) => Cow::Owned(resolved),
        Err(e) => {
            warn!(error = %e, "Image resolution failed, exporting unresolved tree");
            Cow::Borrowed(sections)
        }
    };

    let output = export(&tree, options);
    info!(html_bytes = output.html.len(), css_bytes = output.css.len(), "Exported page");
    output
}

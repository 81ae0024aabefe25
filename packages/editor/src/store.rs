//! # Project Store
//!
//! Owns the active [`Project`] and is the only writer of its section tree.
//!
//! ```text
//! Mutation ──► Mutation::apply(&mut sections) ──► updatedAt, history, blob release
//! ```
//!
//! Lookup failures are logged and dropped: an edit against a missing id is a
//! no-op, never an error surfaced to the caller.

use crate::errors::EditorError;
use crate::history::{HistoryConfig, HistoryLog, MemoryHistoryStorage, RecordOutcome};
use crate::mutations::{ComponentPatch, Mutation, MutationEffect};
use blocksmith_compiler_html::{export_with_assets, CompileOptions, ExportOutput};
use blocksmith_model::{new_id, BlobStore, IdKind, Project, Section};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

pub struct ProjectStore {
    project: Project,
    history: HistoryLog,
    blobs: Arc<dyn BlobStore>,
}

impl ProjectStore {
    /// Open with default history settings and in-memory history storage
    pub fn open(project: Project, blobs: Arc<dyn BlobStore>) -> Self {
        let history = HistoryLog::new(
            HistoryConfig::default(),
            Box::new(MemoryHistoryStorage::new()),
        );
        Self::open_with(project, blobs, history)
    }

    /// Make `project` active. A project without sections gets a default one,
    /// and the history is seeded with the opening state if it is empty.
    pub fn open_with(
        mut project: Project,
        blobs: Arc<dyn BlobStore>,
        mut history: HistoryLog,
    ) -> Self {
        let now = Utc::now();
        if project.normalize() {
            debug!(project_id = %project.id, "Added default section to empty project");
            project.touch(now);
        }

        if history.is_empty() {
            history.restore(std::mem::take(&mut project.history));
        }
        if history.is_empty() {
            history.seed(&project.sections, now);
        }

        info!(
            project_id = %project.id,
            sections = project.sections.len(),
            "Opened project"
        );
        Self {
            project,
            history,
            blobs,
        }
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn sections(&self) -> &[Section] {
        &self.project.sections
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    /// The project with its current history attached, for persistence
    pub fn to_project(&self) -> Project {
        let mut project = self.project.clone();
        project.history = self.history.entries().to_vec();
        project
    }

    pub async fn apply(&mut self, mutation: Mutation) -> Option<MutationEffect> {
        self.apply_at(mutation, Utc::now()).await
    }

    /// Apply with an explicit clock. Returns `None` when the mutation was a
    /// no-op.
    #[instrument(skip_all, fields(op = mutation.label()))]
    pub async fn apply_at(
        &mut self,
        mutation: Mutation,
        now: DateTime<Utc>,
    ) -> Option<MutationEffect> {
        let label = mutation.label();
        let records_history = mutation.records_history();

        let effect = match mutation.apply(&mut self.project.sections) {
            Ok(effect) => effect,
            Err(e) => {
                debug!(error = %e, "Mutation dropped");
                return None;
            }
        };

        self.project.touch(now);
        if records_history
            && self.history.record(label, &self.project.sections, now) == RecordOutcome::Failed
        {
            warn!(action = label, "History entry was not kept");
        }

        for blob_id in &effect.released_blobs {
            if let Err(e) = self.blobs.delete(blob_id).await {
                warn!(blob_id = %blob_id, error = %e, "Failed to release blob");
            }
        }
        Some(effect)
    }

    /// Restore the state before the newest history entry
    pub fn undo(&mut self) -> bool {
        self.undo_at(Utc::now())
    }

    pub fn undo_at(&mut self, now: DateTime<Utc>) -> bool {
        match self.history.undo() {
            Some(sections) => {
                self.project.sections = sections;
                self.project.touch(now);
                true
            }
            None => false,
        }
    }

    /// Store an uploaded image and point a component at it
    pub async fn attach_image(
        &mut self,
        section_id: &str,
        component_id: &str,
        bytes: Vec<u8>,
        mime: &str,
    ) -> Result<Option<String>, EditorError> {
        let blob_id = new_id(IdKind::Blob);
        self.blobs.put(&blob_id, bytes, mime).await?;

        let patch = ComponentPatch {
            image_id: Some(blob_id.clone()),
            ..Default::default()
        };
        let applied = self
            .apply(Mutation::UpdateComponent {
                section_id: section_id.to_string(),
                component_id: component_id.to_string(),
                patch,
            })
            .await;

        if applied.is_none() {
            // Nothing references the upload
            self.blobs.delete(&blob_id).await?;
            return Ok(None);
        }
        Ok(Some(blob_id))
    }

    /// Export the current tree with blob images inlined
    pub async fn export(&self, options: &CompileOptions) -> ExportOutput {
        export_with_assets(&self.project.sections, self.blobs.as_ref(), options).await
    }
}

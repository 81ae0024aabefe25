//! Store-level tests: history, undo, blob release and export

use blocksmith_compiler_html::CompileOptions;
use blocksmith_editor::{
    populate_catalog, ComponentPatch, HistoryConfig, HistoryLog, MemoryHistoryStorage, Mutation,
    ProjectStore, RecordOutcome,
};
use blocksmith_model::{
    BlobStore, Component, ComponentType, MemoryBlobStore, MockCatalog, Project, Section,
};
use chrono::{Duration, Utc};
use std::sync::Arc;

fn store_with(sections: Vec<Section>) -> (ProjectStore, Arc<MemoryBlobStore>) {
    let blobs = Arc::new(MemoryBlobStore::new());
    let project = Project::new("Test").with_sections(sections);
    (ProjectStore::open(project, blobs.clone()), blobs)
}

fn add_heading(section_id: &str, text: &str) -> Mutation {
    Mutation::AddComponent {
        section_id: section_id.to_string(),
        component: Component::new(ComponentType::Heading).with_content(text),
        index: None,
    }
}

#[tokio::test]
async fn test_open_normalizes_empty_project() {
    let (store, _) = store_with(vec![]);
    assert_eq!(store.sections().len(), 1);
    assert_eq!(store.sections()[0].columns, 1);
    assert_eq!(store.history().len(), 1);
}

#[tokio::test]
async fn test_history_bounded_at_five_with_newest_first() {
    let (mut store, _) = store_with(vec![Section::new()]);
    let section_id = store.sections()[0].id.clone();
    let start = Utc::now();

    for i in 0..100 {
        let at = start + Duration::seconds(i + 1);
        store
            .apply_at(add_heading(&section_id, &format!("Heading {}", i)), at)
            .await
            .unwrap();
    }

    let entries = store.history().entries();
    assert!(entries.len() <= 5);
    let newest = &entries[0].sections[0].components;
    assert_eq!(newest.len(), 100);
    assert_eq!(newest[99].content, "Heading 99");
}

#[tokio::test]
async fn test_rapid_mutations_are_throttled_but_applied() {
    let (mut store, _) = store_with(vec![Section::new()]);
    let section_id = store.sections()[0].id.clone();
    let t0 = Utc::now();

    store.apply_at(add_heading(&section_id, "a"), t0).await.unwrap();
    store
        .apply_at(add_heading(&section_id, "b"), t0 + Duration::milliseconds(300))
        .await
        .unwrap();

    assert_eq!(store.sections()[0].components.len(), 2);
    // Seed entry plus the first mutation
    assert_eq!(store.history().len(), 2);
    assert_eq!(store.project().updated_at, t0 + Duration::milliseconds(300));
}

#[tokio::test]
async fn test_undo_restores_previous_snapshot() {
    let (mut store, _) = store_with(vec![Section::new()]);
    let section_id = store.sections()[0].id.clone();
    let t0 = Utc::now();

    store.apply_at(add_heading(&section_id, "one"), t0).await.unwrap();
    store
        .apply_at(add_heading(&section_id, "two"), t0 + Duration::seconds(2))
        .await
        .unwrap();

    assert!(store.undo());
    let texts: Vec<_> = store.sections()[0].components.iter().map(|c| c.content.clone()).collect();
    assert_eq!(texts, vec!["one"]);

    assert!(store.undo());
    assert!(store.sections()[0].components.is_empty());
    assert!(!store.undo());
}

#[tokio::test]
async fn test_failed_lookup_is_a_silent_no_op() {
    let (mut store, _) = store_with(vec![Section::new()]);
    let before = store.to_project();
    let section_id = before.sections[0].id.clone();

    let effect = store
        .apply(Mutation::RemoveComponent {
            section_id,
            component_id: "missing".into(),
        })
        .await;

    assert!(effect.is_none());
    assert_eq!(store.sections(), &before.sections[..]);
    assert_eq!(store.history().len(), 1);
    assert_eq!(store.project().updated_at, before.updated_at);
}

#[tokio::test]
async fn test_removing_image_releases_blob_once() {
    let mut image = Component::new(ComponentType::Image);
    image.image_id = Some("img_42".into());
    let image_id = image.id.clone();
    let mut section = Section::new();
    section.components.push(image);
    let section_id = section.id.clone();

    let (mut store, blobs) = store_with(vec![section]);
    blobs.put("img_42", vec![0xff], "image/png").await.unwrap();

    store
        .apply(Mutation::RemoveComponent {
            section_id,
            component_id: image_id,
        })
        .await
        .unwrap();

    assert_eq!(blobs.deleted_ids(), vec!["img_42"]);
    assert!(!blobs.contains("img_42"));
}

#[tokio::test]
async fn test_resize_skips_history() {
    let (mut store, _) = store_with(vec![Section::with_columns(2)]);
    let section_id = store.sections()[0].id.clone();

    store
        .apply(Mutation::ResizeColumns {
            section_id,
            widths: vec!["20%".into(), "80%".into()],
        })
        .await
        .unwrap();

    assert_eq!(store.history().len(), 1);
    assert!(store.sections()[0].column_widths.is_some());
}

#[test]
fn test_quota_exhaustion_clears_and_retries_once() {
    let big = |text: &str| {
        let mut section = Section::new();
        section
            .components
            .push(Component::new(ComponentType::Paragraph).with_content(text.repeat(4000)));
        vec![section]
    };
    let mut history = HistoryLog::new(
        HistoryConfig::default(),
        Box::new(MemoryHistoryStorage::with_quota(10_000)),
    );
    let t0 = Utc::now();

    assert_eq!(history.record("a", &big("a"), t0), RecordOutcome::Recorded);
    assert_eq!(
        history.record("b", &big("b"), t0 + Duration::seconds(1)),
        RecordOutcome::Recorded
    );
    assert_eq!(
        history.record("c", &big("c"), t0 + Duration::seconds(2)),
        RecordOutcome::Recovered
    );
    assert_eq!(history.len(), 1);
    assert_eq!(history.entries()[0].action, "c");
}

#[test]
fn test_quota_too_small_gives_up() {
    let mut history = HistoryLog::new(
        HistoryConfig::default(),
        Box::new(MemoryHistoryStorage::with_quota(16)),
    );
    assert_eq!(history.record("a", &[Section::new()], Utc::now()), RecordOutcome::Failed);
    assert!(history.is_empty());
}

#[tokio::test]
async fn test_persisted_history_survives_reopen() {
    let (mut store, blobs) = store_with(vec![Section::new()]);
    let section_id = store.sections()[0].id.clone();
    store.apply(add_heading(&section_id, "saved")).await.unwrap();

    let json = serde_json::to_string(&store.to_project()).unwrap();
    let project: Project = serde_json::from_str(&json).unwrap();
    let mut reopened = ProjectStore::open(project, blobs);

    assert_eq!(reopened.history().len(), 2);
    assert!(reopened.undo());
    assert!(reopened.sections()[0].components.is_empty());
}

#[tokio::test]
async fn test_populate_catalog_and_export() {
    let mut section = Section::new();
    let mut collection = Component::new(ComponentType::Collection);
    collection.columns = Some(2);
    let collection_id = collection.id.clone();
    section.components.push(collection);
    let section_id = section.id.clone();

    let (mut store, _) = store_with(vec![section]);
    let populated = populate_catalog(
        &mut store,
        &MockCatalog::sample(),
        &section_id,
        &collection_id,
        "collection",
    )
    .await
    .unwrap();
    assert!(populated);

    let output = store.export(&CompileOptions::default()).await;
    assert!(output.html.contains("Summer Collection"));
    assert!(output.html.contains("Winter Collection"));
    assert!(!output.html.contains("Canvas Tote"));
}

#[tokio::test]
async fn test_populate_ignores_non_catalog_nodes() {
    let mut section = Section::new();
    let heading = Component::new(ComponentType::Heading);
    let heading_id = heading.id.clone();
    section.components.push(heading);
    let section_id = section.id.clone();

    let (mut store, _) = store_with(vec![section]);
    let populated = populate_catalog(&mut store, &MockCatalog::sample(), &section_id, &heading_id, "")
        .await
        .unwrap();
    assert!(!populated);
    assert_eq!(store.history().len(), 1);
}

#[tokio::test]
async fn test_attach_image_inlines_on_export() -> anyhow::Result<()> {
    let image = Component::new(ComponentType::Image);
    let image_id = image.id.clone();
    let mut section = Section::new();
    section.components.push(image);
    let section_id = section.id.clone();

    let (mut store, blobs) = store_with(vec![section]);
    let blob_id = store
        .attach_image(&section_id, &image_id, vec![1, 2, 3], "image/png")
        .await?
        .expect("image attached");
    assert!(blobs.contains(&blob_id));

    let output = store.export(&CompileOptions::default()).await;
    assert!(output.html.contains("data:image/png;base64,AQID"));

    // Unknown target: upload is rolled back
    let orphan = store
        .attach_image(&section_id, "missing", vec![9], "image/png")
        .await?;
    assert!(orphan.is_none());
    assert_eq!(blobs.deleted_ids().len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_imported_page_round_trips_through_store() {
    let sections = blocksmith_importer::import_sections(
        r#"<section style="display:flex"><div>A</div><div>B</div></section>"#,
    );
    let (mut store, _) = store_with(sections);
    let section_id = store.sections()[0].id.clone();
    let first_id = store.sections()[0].components[0].id.clone();

    store
        .apply(Mutation::UpdateComponent {
            section_id,
            component_id: first_id,
            patch: ComponentPatch::content("Alpha"),
        })
        .await
        .unwrap();

    let output = store.export(&CompileOptions::default()).await;
    assert!(output.html.contains("<p>Alpha</p>"));
    assert!(output.html.contains("<p>B</p>"));
    assert!(output.css.contains("grid-template-columns: 1fr 1fr;"));
}

#[tokio::test]
async fn test_replacing_an_image_releases_the_old_blob() -> anyhow::Result<()> {
    let image = Component::new(ComponentType::Image);
    let image_id = image.id.clone();
    let mut shared = Component::new(ComponentType::Image);
    shared.image_id = Some("img_shared".into());
    let mut section = Section::new();
    section.components.push(image);
    section.components.push(shared);
    let section_id = section.id.clone();

    let (mut store, blobs) = store_with(vec![section]);
    blobs.put("img_shared", vec![7], "image/png").await?;

    let first = store
        .attach_image(&section_id, &image_id, vec![1], "image/png")
        .await?
        .expect("first upload attached");
    let second = store
        .attach_image(&section_id, &image_id, vec![2], "image/png")
        .await?
        .expect("second upload attached");

    assert_eq!(blobs.deleted_ids(), vec![first.clone()]);
    assert!(!blobs.contains(&first));
    assert!(blobs.contains(&second));

    let patch = ComponentPatch {
        image_id: Some("img_shared".into()),
        ..Default::default()
    };
    store
        .apply(Mutation::UpdateComponent {
            section_id: section_id.clone(),
            component_id: image_id.clone(),
            patch,
        })
        .await
        .expect("patch applied");
    assert_eq!(blobs.deleted_ids(), vec![first, second]);

    // The other image still points at the shared blob
    let patch = ComponentPatch {
        image_id: Some("img_other".into()),
        ..Default::default()
    };
    let effect = store
        .apply(Mutation::UpdateComponent {
            section_id,
            component_id: image_id,
            patch,
        })
        .await
        .expect("patch applied");
    assert!(effect.released_blobs.is_empty());
    assert!(blobs.contains("img_shared"));
    Ok(())
}

use crate::{
    import_components, import_components_with, InlineStyleResolver, NoStyleResolver,
    MAX_IMPORT_DEPTH,
};
use blocksmith_model::ComponentType;

#[test]
fn test_flex_row_becomes_layout_container() {
    let html = r#"<div style="display: flex"><div>Left column</div><div>Right column</div></div>"#;
    let components = import_components(html);

    assert_eq!(components.len(), 1);
    let container = &components[0];
    assert_eq!(container.kind, ComponentType::LayoutContainer);
    assert_eq!(container.columns, Some(2));

    let children = container.children();
    assert_eq!(children.len(), 2);
    assert_eq!(children[0].content, "Left column");
    assert_eq!(children[0].column_index(), 0);
    assert_eq!(children[1].column_index(), 1);
    assert_eq!(children[1].props.as_ref().unwrap().span.as_deref(), Some("column"));
}

#[test]
fn test_grid_columns_capped_at_three() {
    let html = r#"
        <div style="display: grid; grid-template-columns: repeat(4, 1fr)">
            <p>One</p><p>Two</p><p>Three</p><p>Four</p><p>Five</p>
        </div>"#;
    let components = import_components(html);

    let container = &components[0];
    assert_eq!(container.columns, Some(3));
    let columns: Vec<usize> = container.children().iter().map(|c| c.column_index()).collect();
    assert_eq!(columns, vec![0, 1, 2, 0, 1]);
}

#[test]
fn test_empty_horizontal_layout_is_dropped() {
    let html = r#"<div class="flex"><span></span><span> </span></div><p>After</p>"#;
    let components = import_components(html);
    assert_eq!(components.len(), 1);
    assert_eq!(components[0].content, "After");
}

#[test]
fn test_class_hints_used_only_without_resolved_style() {
    let html = r#"<div class="row"><p>A</p><p>B</p></div>"#;

    let with_classes = import_components_with(html, &NoStyleResolver);
    assert_eq!(with_classes[0].kind, ComponentType::LayoutContainer);

    let blocked = r#"<div class="row" style="display: block"><p>A</p><p>B</p></div>"#;
    let components = import_components_with(blocked, &InlineStyleResolver);
    assert_eq!(components.len(), 2);
    assert!(components.iter().all(|c| c.kind == ComponentType::Paragraph));
}

#[test]
fn test_nav_with_links_becomes_navbar() {
    let html = r#"
        <nav>
            <a class="brand" href="/">Acme</a>
            <ul><li><a href="/docs">Docs</a></li><li><a href="/blog">Blog</a></li></ul>
        </nav>"#;
    let components = import_components(html);

    assert_eq!(components.len(), 1);
    let navbar = &components[0];
    assert_eq!(navbar.kind, ComponentType::Navbar);
    assert_eq!(navbar.content, "Acme");
    let titles: Vec<&str> = navbar
        .nav_links
        .as_ref()
        .unwrap()
        .iter()
        .map(|l| l.title.as_str())
        .collect();
    assert_eq!(titles, vec!["Acme", "Docs", "Blog"]);
}

#[test]
fn test_breadcrumb_and_footer() {
    let html = r#"
        <nav aria-label="Breadcrumb"><a href="/">Home</a><a href="/shop">Shop</a></nav>
        <footer>&copy; 2024 Acme. <a href="/privacy">Privacy</a></footer>"#;
    let components = import_components(html);

    assert_eq!(components[0].kind, ComponentType::Breadcrumb);
    assert_eq!(components[0].content, "Home / Shop");
    assert_eq!(components[1].kind, ComponentType::Footer);
    assert_eq!(components[1].content, "© 2024 Acme. Privacy");
}

#[test]
fn test_leading_text_run_becomes_paragraph() {
    let html = "<div>This intro is long enough<h2>Title</h2></div><div>Short<h2>Other</h2></div>";
    let components = import_components(html);

    let kinds: Vec<ComponentType> = components.iter().map(|c| c.kind).collect();
    assert_eq!(
        kinds,
        vec![ComponentType::Paragraph, ComponentType::Heading, ComponentType::Heading]
    );
    assert_eq!(components[0].content, "This intro is long enough");
}

#[test]
fn test_non_visual_and_empty_elements_skipped() {
    let html = r#"
        <script>alert(1)</script>
        <style>.x { color: red }</style>
        <div></div>
        <svg><text>icon</text></svg>
        <hr>
        <img src="/logo.png" alt="Logo">"#;
    let components = import_components(html);

    let kinds: Vec<ComponentType> = components.iter().map(|c| c.kind).collect();
    assert_eq!(kinds, vec![ComponentType::Divider, ComponentType::Image]);
}

#[test]
fn test_unknown_leaf_with_text_becomes_paragraph() {
    let components = import_components("<span><b>Bold words</b></span><custom-tag>Hi</custom-tag>");
    assert_eq!(components.len(), 2);
    assert_eq!(components[0].content, "Bold words");
    assert!(components[0].formatting.as_ref().unwrap().bold);
    assert_eq!(components[1].content, "Hi");
}

#[test]
fn test_depth_cap() {
    let depth = MAX_IMPORT_DEPTH + 5;
    let html = format!("{}<p>deep</p>{}", "<div>".repeat(depth), "</div>".repeat(depth));
    assert!(import_components(&html).is_empty());

    let shallow = format!("{}<p>ok</p>{}", "<div>".repeat(5), "</div>".repeat(5));
    let components = import_components(&shallow);
    assert_eq!(components.len(), 1);
    assert_eq!(components[0].content, "ok");
}

#[test]
fn test_flat_import_does_not_dedupe() {
    let components = import_components("<p>Repeat</p><p>Repeat</p>");
    assert_eq!(components.len(), 2);
    assert_ne!(components[0].id, components[1].id);
}

#[test]
fn test_stylesheet_classes_drive_layout() {
    let html = r#"
        <style>.cols { display: grid; grid-template-columns: 1fr 2fr; }</style>
        <div class="cols"><p>Narrow</p><p>Wide</p></div>"#;
    let components = import_components(html);
    assert_eq!(components[0].kind, ComponentType::LayoutContainer);
    assert_eq!(components[0].columns, Some(2));
}

use crate::escape::escape_html;
use crate::inline::render_inline;
use blocksmith_compiler_css::compile_to_css;
use blocksmith_model::style::inline_style;
use blocksmith_model::{CatalogPayload, Component, ComponentType, NavLink, Section};

/// Options for HTML compilation
#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// Document `<title>`
    pub title: String,
    /// Pretty print HTML
    pub pretty: bool,
    /// Indentation string
    pub indent: String,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            title: "Exported Page".to_string(),
            pretty: true,
            indent: "  ".to_string(),
        }
    }
}

/// Viewport query used for mobile image variants
const MOBILE_MEDIA: &str = "(max-width: 768px)";

/// Default grid columns for catalog nodes without an explicit count
const DEFAULT_CATALOG_COLUMNS: usize = 3;

struct Context<'a> {
    options: &'a CompileOptions,
    depth: usize,
    buffer: String,
}

impl<'a> Context<'a> {
    fn new(options: &'a CompileOptions) -> Self {
        Self {
            options,
            depth: 0,
            buffer: String::new(),
        }
    }

    fn add(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    fn add_line(&mut self, text: &str) {
        if self.options.pretty {
            self.add_indent();
        }
        self.add(text);
        if self.options.pretty {
            self.add("\n");
        }
    }

    fn add_indent(&mut self) {
        for _ in 0..self.depth {
            self.buffer.push_str(&self.options.indent);
        }
    }

    fn indent(&mut self) {
        self.depth += 1;
    }

    fn dedent(&mut self) {
        if self.depth > 0 {
            self.depth -= 1;
        }
    }

    /// `<open>`, indented body, `</close>`
    fn block(&mut self, open: &str, close: &str, body: impl FnOnce(&mut Self)) {
        self.add_line(open);
        self.indent();
        body(self);
        self.dedent();
        self.add_line(close);
    }

    fn get_output(self) -> String {
        self.buffer
    }
}

/// Attribute list builder. Values are escaped; `None` values are skipped.
#[derive(Default)]
struct Attrs(String);

impl Attrs {
    fn new() -> Self {
        Self::default()
    }

    fn set(mut self, name: &str, value: impl AsRef<str>) -> Self {
        self.0.push(' ');
        self.0.push_str(name);
        self.0.push_str("=\"");
        self.0.push_str(&escape_html(value.as_ref()));
        self.0.push('"');
        self
    }

    fn opt(self, name: &str, value: Option<&str>) -> Self {
        match value {
            Some(value) => self.set(name, value),
            None => self,
        }
    }

    fn flag(mut self, name: &str, on: bool) -> Self {
        if on {
            self.0.push(' ');
            self.0.push_str(name);
        }
        self
    }

    /// `style` attribute from the node's style map and formatting
    fn style_of(self, component: &Component) -> Self {
        let style = inline_style(&component.style, component.formatting.as_ref());
        self.style(style)
    }

    fn style(self, style: String) -> Self {
        if style.is_empty() {
            self
        } else {
            self.set("style", style)
        }
    }

    fn as_str(&self) -> &str {
        &self.0
    }
}

/// Compile the section list into a complete HTML document. The `<style>`
/// block holds exactly the CSS export.
pub fn compile_to_html(sections: &[Section], options: &CompileOptions) -> String {
    let css = compile_to_css(sections);
    let mut ctx = Context::new(options);

    ctx.add_line("<!DOCTYPE html>");
    ctx.add_line("<html lang=\"en\">");
    ctx.indent();

    compile_head(&css, &mut ctx);

    ctx.add_line("<body>");
    ctx.indent();
    ctx.block("<div class=\"page-container\">", "</div>", |ctx| {
        for section in sections {
            compile_section(section, ctx);
        }
    });
    ctx.dedent();
    ctx.add_line("</body>");

    ctx.dedent();
    ctx.add_line("</html>");

    ctx.get_output()
}

fn compile_head(css: &str, ctx: &mut Context) {
    ctx.add_line("<head>");
    ctx.indent();

    ctx.add_line("<meta charset=\"UTF-8\">");
    ctx.add_line("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">");
    let title = format!("<title>{}</title>", escape_html(&ctx.options.title));
    ctx.add_line(&title);

    // Stylesheet goes in verbatim, no re-indentation
    ctx.add_line("<style>");
    ctx.add(css);
    if !css.ends_with('\n') {
        ctx.add("\n");
    }
    ctx.add_line("</style>");

    ctx.dedent();
    ctx.add_line("</head>");
}

fn compile_section(section: &Section, ctx: &mut Context) {
    let attrs = Attrs::new()
        .set("class", "page-section")
        .set("data-section-id", &section.id)
        .opt("aria-label", section.name.as_deref());
    let open = format!("<section{}>", attrs.as_str());

    ctx.block(&open, "</section>", |ctx| {
        let columns = section.components_by_column();
        if columns.len() == 1 {
            ctx.block("<div class=\"section-content\">", "</div>", |ctx| {
                for component in &columns[0] {
                    compile_component(component, ctx);
                }
            });
        } else {
            ctx.block("<div class=\"section-grid\">", "</div>", |ctx| {
                for (index, column) in columns.iter().enumerate() {
                    let open = format!("<div class=\"section-column\" data-column=\"{}\">", index);
                    ctx.block(&open, "</div>", |ctx| {
                        for component in column {
                            compile_component(component, ctx);
                        }
                    });
                }
            });
        }
    });
}

fn compile_component(component: &Component, ctx: &mut Context) {
    match component.kind {
        ComponentType::Heading => {
            let level = component.level.unwrap_or(2).clamp(1, 6);
            let attrs = Attrs::new().style_of(component);
            ctx.add_line(&format!(
                "<h{level}{}>{}</h{level}>",
                attrs.as_str(),
                render_inline(&component.content),
            ));
        }
        ComponentType::Paragraph => {
            let attrs = Attrs::new().style_of(component);
            ctx.add_line(&format!("<p{}>{}</p>", attrs.as_str(), render_inline(&component.content)));
        }
        ComponentType::Link => {
            let target = component.target.as_deref().unwrap_or("_self");
            let attrs = Attrs::new()
                .set("href", component.href.as_deref().unwrap_or("#"))
                .set("target", target)
                .opt("rel", (target == "_blank").then_some("noopener noreferrer"))
                .style_of(component);
            ctx.add_line(&format!("<a{}>{}</a>", attrs.as_str(), render_inline(&component.content)));
        }
        ComponentType::Button => compile_button(component, ctx),
        ComponentType::Image => compile_image(component, ctx),
        ComponentType::Avatar => match &component.src {
            Some(src) => {
                let attrs = Attrs::new()
                    .set("class", "avatar")
                    .set("src", src)
                    .set("alt", component.alt.as_deref().unwrap_or(""))
                    .style_of(component);
                ctx.add_line(&format!("<img{}>", attrs.as_str()));
            }
            None => placeholder("Avatar", ctx),
        },
        ComponentType::Video | ComponentType::Audio => compile_media(component, ctx),
        ComponentType::Embed => match &component.src {
            Some(src) => {
                let attrs = Attrs::new()
                    .set("src", src)
                    .set("title", component.alt.as_deref().unwrap_or("Embedded content"))
                    .set("loading", "lazy")
                    .set("frameborder", "0")
                    .flag("allowfullscreen", true)
                    .style_of(component);
                ctx.add_line(&format!("<iframe{}></iframe>", attrs.as_str()));
            }
            None => placeholder("Embed", ctx),
        },
        ComponentType::Divider => {
            let attrs = Attrs::new().style_of(component);
            ctx.add_line(&format!("<hr{}>", attrs.as_str()));
        }
        ComponentType::Spacer => {
            let mut style = inline_style(&component.style, None);
            if !component.style.contains_key("height") {
                style = if style.is_empty() {
                    "height: 32px".to_string()
                } else {
                    format!("height: 32px; {}", style)
                };
            }
            let attrs = Attrs::new().set("class", "spacer").style(style);
            ctx.add_line(&format!("<div{}></div>", attrs.as_str()));
        }
        ComponentType::Card => {
            let attrs = Attrs::new().set("class", "card").style_of(component);
            let open = format!("<div{}>", attrs.as_str());
            ctx.block(&open, "</div>", |ctx| {
                if !component.content.is_empty() {
                    ctx.add_line(&format!("<p>{}</p>", render_inline(&component.content)));
                }
            });
        }
        ComponentType::List => {
            let attrs = Attrs::new().style_of(component);
            let open = format!("<ul{}>", attrs.as_str());
            ctx.block(&open, "</ul>", |ctx| {
                for item in list_items(&component.content) {
                    ctx.add_line(&format!("<li>{}</li>", render_inline(item)));
                }
            });
        }
        ComponentType::LayoutContainer => compile_layout_container(component, ctx),
        ComponentType::GridContainer => {
            let columns = component.columns.unwrap_or(2).max(1);
            compile_flat_container(component, "grid-container", Some(columns), ctx);
        }
        ComponentType::FlexContainer => compile_flat_container(component, "flex-container", None, ctx),
        ComponentType::Table => compile_table(component, ctx),
        ComponentType::Badge => {
            let attrs = Attrs::new().set("class", "badge").style_of(component);
            ctx.add_line(&format!("<span{}>{}</span>", attrs.as_str(), escape_html(&component.content)));
        }
        ComponentType::Progress => {
            let percent = component
                .content
                .trim()
                .trim_end_matches('%')
                .parse::<f64>()
                .map(|v| v.clamp(0.0, 100.0).round() as u32)
                .unwrap_or(0);
            let attrs = Attrs::new()
                .set("class", "progress")
                .set("role", "progressbar")
                .set("aria-valuenow", percent.to_string())
                .set("aria-valuemin", "0")
                .set("aria-valuemax", "100")
                .style_of(component);
            let open = format!("<div{}>", attrs.as_str());
            ctx.block(&open, "</div>", |ctx| {
                ctx.add_line(&format!(
                    "<div class=\"progress-bar\" style=\"width: {}%\"></div>",
                    percent
                ));
            });
        }
        ComponentType::Input
        | ComponentType::Textarea
        | ComponentType::Select
        | ComponentType::Checkbox
        | ComponentType::Radio => compile_form_field(component, ctx),
        ComponentType::Form => {
            let attrs = Attrs::new()
                .set("class", "form")
                .opt("action", component.action.as_deref())
                .set("method", component.method.as_deref().unwrap_or("get"))
                .style_of(component);
            let open = format!("<form{}>", attrs.as_str());
            ctx.block(&open, "</form>", |ctx| {
                let label = if component.content.is_empty() {
                    "Submit"
                } else {
                    component.content.as_str()
                };
                ctx.add_line(&format!(
                    "<button type=\"submit\" class=\"btn\">{}</button>",
                    escape_html(label)
                ));
            });
        }
        ComponentType::Navbar => {
            let attrs = Attrs::new().set("class", "navbar").style_of(component);
            let open = format!("<nav{}>", attrs.as_str());
            ctx.block(&open, "</nav>", |ctx| {
                ctx.add_line(&format!(
                    "<span class=\"navbar-brand\">{}</span>",
                    escape_html(&component.content)
                ));
                compile_link_list("navbar-links", component.nav_links.as_deref().unwrap_or(&[]), ctx);
            });
        }
        ComponentType::Menu => {
            let links = component.nav_links.as_deref().unwrap_or(&[]);
            if links.is_empty() {
                let attrs = Attrs::new().set("class", "menu").style_of(component);
                let open = format!("<ul{}>", attrs.as_str());
                ctx.block(&open, "</ul>", |ctx| {
                    for item in list_items(&component.content) {
                        ctx.add_line(&format!("<li>{}</li>", escape_html(item)));
                    }
                });
            } else {
                compile_link_list("menu", links, ctx);
            }
        }
        ComponentType::Breadcrumb => {
            let attrs = Attrs::new()
                .set("class", "breadcrumb")
                .set("aria-label", "Breadcrumb")
                .style_of(component);
            let links = component.nav_links.as_deref().unwrap_or(&[]);
            let trail = if links.is_empty() {
                escape_html(&component.content)
            } else {
                links
                    .iter()
                    .map(|l| format!("<a href=\"{}\">{}</a>", escape_html(&l.href), escape_html(&l.title)))
                    .collect::<Vec<_>>()
                    .join(" <span>/</span> ")
            };
            ctx.add_line(&format!("<nav{}>{}</nav>", attrs.as_str(), trail));
        }
        ComponentType::Footer => {
            let attrs = Attrs::new().set("class", "footer").style_of(component);
            let open = format!("<footer{}>", attrs.as_str());
            ctx.block(&open, "</footer>", |ctx| {
                if !component.content.is_empty() {
                    ctx.add_line(&format!("<p>{}</p>", escape_html(&component.content)));
                }
                if let Some(links) = component.nav_links.as_deref().filter(|l| !l.is_empty()) {
                    compile_link_list("footer-links", links, ctx);
                }
            });
        }
        ComponentType::Collection | ComponentType::ProductList => compile_catalog(component, ctx),
        ComponentType::Unknown => {
            let attrs = Attrs::new().set("class", "component-unknown").style_of(component);
            ctx.add_line(&format!("<div{}>{}</div>", attrs.as_str(), escape_html(&component.content)));
        }
    }
}

fn placeholder(label: &str, ctx: &mut Context) {
    ctx.add_line(&format!(
        "<div class=\"placeholder\">{}</div>",
        escape_html(label)
    ));
}

fn list_items(content: &str) -> impl Iterator<Item = &str> {
    content.split(',').map(str::trim).filter(|item| !item.is_empty())
}

fn compile_button(component: &Component, ctx: &mut Context) {
    let label = render_inline(&component.content);
    match &component.href {
        Some(href) => {
            let attrs = Attrs::new()
                .set("class", "btn")
                .set("href", href)
                .opt("target", component.target.as_deref())
                .style_of(component);
            ctx.add_line(&format!("<a{}>{}</a>", attrs.as_str(), label));
        }
        None => {
            let attrs = Attrs::new()
                .set("type", component.input_type.as_deref().unwrap_or("button"))
                .set("class", "btn")
                .flag("disabled", component.disabled.unwrap_or(false))
                .style_of(component);
            ctx.add_line(&format!("<button{}>{}</button>", attrs.as_str(), label));
        }
    }
}

fn compile_image(component: &Component, ctx: &mut Context) {
    let Some(src) = &component.src else {
        placeholder("Image", ctx);
        return;
    };

    let img = Attrs::new()
        .set("src", src)
        .set("alt", component.alt.as_deref().unwrap_or(""))
        .style_of(component);

    match &component.mobile_src {
        Some(mobile) => {
            ctx.block("<picture>", "</picture>", |ctx| {
                let source = Attrs::new().set("media", MOBILE_MEDIA).set("srcset", mobile);
                ctx.add_line(&format!("<source{}>", source.as_str()));
                ctx.add_line(&format!("<img{}>", img.as_str()));
            });
        }
        None => ctx.add_line(&format!("<img{}>", img.as_str())),
    }
}

fn compile_media(component: &Component, ctx: &mut Context) {
    let (tag, label) = match component.kind {
        ComponentType::Audio => ("audio", "Audio"),
        _ => ("video", "Video"),
    };
    match &component.src {
        Some(src) => {
            let attrs = Attrs::new().set("src", src).flag("controls", true).style_of(component);
            ctx.add_line(&format!("<{tag}{}></{tag}>", attrs.as_str()));
        }
        None => placeholder(label, ctx),
    }
}

fn compile_layout_container(component: &Component, ctx: &mut Context) {
    let columns = component.columns.unwrap_or(1).max(1);
    let grid = format!("grid-template-columns: repeat({}, 1fr)", columns);
    let own = inline_style(&component.style, component.formatting.as_ref());
    let style = if own.is_empty() { grid } else { format!("{}; {}", grid, own) };

    let attrs = Attrs::new()
        .set("class", "layout-container")
        .set("data-columns", columns.to_string())
        .style(style);
    let open = format!("<div{}>", attrs.as_str());

    let mut buckets: Vec<Vec<&Component>> = vec![Vec::new(); columns];
    for child in component.children() {
        buckets[child.column_index().min(columns - 1)].push(child);
    }

    ctx.block(&open, "</div>", |ctx| {
        for (index, bucket) in buckets.iter().enumerate() {
            let open = format!("<div class=\"layout-column\" data-column=\"{}\">", index);
            ctx.block(&open, "</div>", |ctx| {
                for child in bucket {
                    compile_component(child, ctx);
                }
            });
        }
    });
}

fn compile_flat_container(component: &Component, class: &str, columns: Option<usize>, ctx: &mut Context) {
    let own = inline_style(&component.style, component.formatting.as_ref());
    let style = match columns {
        Some(n) if own.is_empty() => format!("grid-template-columns: repeat({}, 1fr)", n),
        Some(n) => format!("grid-template-columns: repeat({}, 1fr); {}", n, own),
        None => own,
    };
    let attrs = Attrs::new().set("class", class).style(style);
    let open = format!("<div{}>", attrs.as_str());
    ctx.block(&open, "</div>", |ctx| {
        for child in component.children() {
            compile_component(child, ctx);
        }
    });
}

fn compile_table(component: &Component, ctx: &mut Context) {
    let attrs = Attrs::new().set("class", "data-table").style_of(component);
    let open = format!("<table{}>", attrs.as_str());
    let headers = component.headers.as_deref().unwrap_or(&[]);
    let rows = component.rows.as_deref().unwrap_or(&[]);

    ctx.block(&open, "</table>", |ctx| {
        if !headers.is_empty() {
            ctx.block("<thead>", "</thead>", |ctx| {
                let cells: String = headers
                    .iter()
                    .map(|h| format!("<th>{}</th>", escape_html(h)))
                    .collect();
                ctx.add_line(&format!("<tr>{}</tr>", cells));
            });
        }
        ctx.block("<tbody>", "</tbody>", |ctx| {
            for row in rows {
                let cells: String = row
                    .iter()
                    .map(|c| format!("<td>{}</td>", escape_html(c)))
                    .collect();
                ctx.add_line(&format!("<tr>{}</tr>", cells));
            }
        });
    });
}

fn compile_form_field(component: &Component, ctx: &mut Context) {
    let label = component.label.as_deref().unwrap_or("");
    let required = component.required.unwrap_or(false);
    let disabled = component.disabled.unwrap_or(false);

    match component.kind {
        ComponentType::Checkbox | ComponentType::Radio => {
            let input_type = if component.kind == ComponentType::Radio { "radio" } else { "checkbox" };
            let attrs = Attrs::new()
                .set("type", input_type)
                .opt("name", component.name.as_deref())
                .flag("required", required)
                .flag("disabled", disabled);
            let text = if label.is_empty() { component.content.as_str() } else { label };
            ctx.add_line(&format!(
                "<label class=\"form-check\"><input{}> {}</label>",
                attrs.as_str(),
                escape_html(text)
            ));
        }
        _ => {
            let wrapper = Attrs::new().set("class", "form-field").style_of(component);
            let open = format!("<label{}>", wrapper.as_str());
            ctx.block(&open, "</label>", |ctx| {
                if !label.is_empty() {
                    ctx.add_line(&format!("<span>{}</span>", escape_html(label)));
                }
                let common = |attrs: Attrs| {
                    attrs
                        .opt("name", component.name.as_deref())
                        .opt("placeholder", component.placeholder.as_deref())
                        .flag("required", required)
                        .flag("disabled", disabled)
                };
                match component.kind {
                    ComponentType::Textarea => {
                        let attrs = common(Attrs::new());
                        ctx.add_line(&format!(
                            "<textarea{}>{}</textarea>",
                            attrs.as_str(),
                            escape_html(&component.content)
                        ));
                    }
                    ComponentType::Select => {
                        let attrs = common(Attrs::new());
                        let open = format!("<select{}>", attrs.as_str());
                        ctx.block(&open, "</select>", |ctx| {
                            for option in component.options.as_deref().unwrap_or(&[]) {
                                ctx.add_line(&format!("<option>{}</option>", escape_html(option)));
                            }
                        });
                    }
                    _ => {
                        let value = (!component.content.is_empty()).then_some(component.content.as_str());
                        let attrs = common(
                            Attrs::new().set("type", component.input_type.as_deref().unwrap_or("text")),
                        )
                        .opt("value", value);
                        ctx.add_line(&format!("<input{}>", attrs.as_str()));
                    }
                }
            });
        }
    }
}

fn compile_link_list(class: &str, links: &[NavLink], ctx: &mut Context) {
    let open = format!("<ul class=\"{}\">", escape_html(class));
    ctx.block(&open, "</ul>", |ctx| {
        for link in links {
            ctx.add_line(&format!(
                "<li><a href=\"{}\">{}</a></li>",
                escape_html(&link.href),
                escape_html(&link.title)
            ));
        }
    });
}

fn compile_catalog(component: &Component, ctx: &mut Context) {
    let (label, class) = match component.kind {
        ComponentType::ProductList => ("Product list", "product-list"),
        _ => ("Collection", "collection"),
    };

    let Some(payload) = component.catalog.as_ref().filter(|p| !p.items.is_empty()) else {
        placeholder(&format!("{} not configured", label), ctx);
        return;
    };

    let columns = catalog_columns(component, payload);
    let attrs = Attrs::new().set("class", class).style_of(component);
    let open = format!("<div{}>", attrs.as_str());

    ctx.block(&open, "</div>", |ctx| {
        if let Some(title) = payload.title.as_deref().filter(|t| !t.is_empty()) {
            ctx.add_line(&format!("<h3 class=\"catalog-title\">{}</h3>", escape_html(title)));
        }
        let grid = format!(
            "<div class=\"catalog-grid\" style=\"grid-template-columns: repeat({}, 1fr)\">",
            columns
        );
        ctx.block(&grid, "</div>", |ctx| {
            for item in &payload.items {
                ctx.block("<div class=\"catalog-card\">", "</div>", |ctx| {
                    if !item.image.is_empty() {
                        let img = Attrs::new().set("src", &item.image).set("alt", &item.title);
                        ctx.add_line(&format!("<img{}>", img.as_str()));
                    }
                    ctx.add_line(&format!("<h4>{}</h4>", escape_html(&item.title)));
                    if let Some(price) = &item.price {
                        ctx.add_line(&format!(
                            "<span class=\"catalog-price\">{}</span>",
                            escape_html(price)
                        ));
                    }
                    if !item.cta_url.is_empty() {
                        let text = if item.cta_text.is_empty() { "View" } else { item.cta_text.as_str() };
                        let link = Attrs::new().set("class", "btn").set("href", &item.cta_url);
                        ctx.add_line(&format!("<a{}>{}</a>", link.as_str(), escape_html(text)));
                    }
                });
            }
        });
    });
}

fn catalog_columns(component: &Component, payload: &CatalogPayload) -> usize {
    payload
        .columns
        .or(component.columns)
        .unwrap_or(DEFAULT_CATALOG_COLUMNS)
        .max(1)
}

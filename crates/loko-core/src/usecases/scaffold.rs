//! ScaffoldEntity: create a System, Container, or Component on
//! disk from a template, wiring it into its parent's diagram and table.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::cancel::CancelToken;
use crate::diagram::renderer::DiagramRenderer;
use crate::diagram::{preview, RenderRequest};
use crate::entities::{Component, Container, Diagram, System, Technology};
use crate::error::{LokoError, Result};
use crate::id::{is_valid_slug, slugify};
use crate::report::Report;
use crate::repository::{frontmatter, FsRepository};
use crate::templates::{select_component_pack, TemplateEngine, TemplateVars, DEFAULT_PACK};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    System,
    Container,
    Component,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScaffoldRequest {
    pub entity_type: EntityType,
    pub name: String,
    /// Required for `Container` (the owning system's ID) and `Component`
    /// (`<system>/<container>`); ignored for `System`.
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub technology: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Forces a template pack, bypassing keyword matching.
    #[serde(default)]
    pub template: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScaffoldResponse {
    pub id: String,
    pub files_written: Vec<PathBuf>,
    #[serde(default)]
    pub report: Report,
}

/// Runs the scaffold use case. `renderer`, if given and available, is used
/// only for the component preview sub-mode —
/// a failure there is never fatal to scaffolding.
pub fn run(
    root: &std::path::Path,
    req: &ScaffoldRequest,
    templates: &TemplateEngine,
    renderer: Option<&dyn DiagramRenderer>,
    cancel: &CancelToken,
) -> Result<ScaffoldResponse> {
    cancel.check()?;
    if req.name.trim().is_empty() {
        return Err(LokoError::InvalidArgument("name must not be empty".into()));
    }
    let slug = slugify(&req.name);
    if !is_valid_slug(&slug) {
        return Err(LokoError::InvalidArgument(format!("'{}' has no usable slug form", req.name)));
    }

    let config = FsRepository::load_config(root, &slug)?;
    let source = config.paths.source.clone();

    match req.entity_type {
        EntityType::System => scaffold_system(root, &source, &slug, req, templates),
        EntityType::Container => scaffold_container(root, &source, &slug, req, templates),
        EntityType::Component => scaffold_component(root, &source, &slug, req, templates, renderer),
    }
}

fn scaffold_system(
    root: &std::path::Path,
    source: &str,
    slug: &str,
    req: &ScaffoldRequest,
    templates: &TemplateEngine,
) -> Result<ScaffoldResponse> {
    if FsRepository::list_systems(root, source)?.contains(&slug.to_string()) {
        return Err(LokoError::AlreadyExists(slug.to_string()));
    }

    let pack = req.template.as_deref().unwrap_or(DEFAULT_PACK);
    let vars = TemplateVars::new()
        .set("SystemName", req.name.clone())
        .set("SystemID", slug.to_string())
        .set("Description", req.description.clone())
        .set_opt("Language", req.technology.as_deref())
        .set_opt("Framework", None)
        .set_opt("Database", None);

    let md = templates.render(pack, "system.md", &vars);
    let d2 = templates.render(pack, "system.d2", &vars);

    let (fm, body) = frontmatter::parse(&md, std::path::Path::new("<template>"))?;
    let mut system = System::from_front_matter(slug.to_string(), fm, body);
    system.description = req.description.clone();
    system.tags = req.tags.clone();
    if let Some(tech) = &req.technology {
        system.technology = Technology {
            language: Some(tech.clone()),
            framework: None,
            database: None,
        };
    }
    system.diagram = Some(Diagram::new(d2));

    FsRepository::save_system(root, source, &system)?;

    let dir = std::path::Path::new(source).join(slug);
    Ok(ScaffoldResponse {
        id: slug.to_string(),
        files_written: vec![dir.join("system.md"), dir.join("system.d2")],
        report: Report::new(),
    })
}

fn scaffold_container(
    root: &std::path::Path,
    source: &str,
    slug: &str,
    req: &ScaffoldRequest,
    templates: &TemplateEngine,
) -> Result<ScaffoldResponse> {
    let system_id = req
        .parent
        .as_deref()
        .ok_or_else(|| LokoError::InvalidArgument("container scaffold requires a parent system ID".into()))?;
    let mut system = FsRepository::load_system(root, source, system_id)
        .map_err(|_| LokoError::NotFound(system_id.to_string()))?;
    if system.containers.contains_key(slug) {
        return Err(LokoError::AlreadyExists(format!("{system_id}/{slug}")));
    }

    let pack = req.template.as_deref().unwrap_or(DEFAULT_PACK);
    let vars = TemplateVars::new()
        .set("ContainerName", req.name.clone())
        .set("ContainerID", slug.to_string())
        .set("Description", req.description.clone())
        .set_opt("Technology", req.technology.as_deref());

    let md = templates.render(pack, "container.md", &vars);
    let d2 = templates.render(pack, "container.d2", &vars);

    let (fm, body) = frontmatter::parse(&md, std::path::Path::new("<template>"))?;
    let mut container = Container::from_front_matter(slug.to_string(), fm, body);
    container.description = req.description.clone();
    container.tags = req.tags.clone();
    container.technology = req.technology.clone();
    container.diagram = Some(Diagram::new(d2));

    FsRepository::save_container(root, source, system_id, &container)?;

    let mut files_written = vec![
        std::path::Path::new(source).join(system_id).join(slug).join("container.md"),
        std::path::Path::new(source).join(system_id).join(slug).join("container.d2"),
    ];

    let changed_diagram = append_node_if_missing(system.diagram.as_ref().map(|d| d.source.as_str()).unwrap_or(""), slug);
    system.diagram = Some(Diagram::new(changed_diagram));
    system.body = update_generated_table(
        &system.body,
        "containers",
        &render_table(
            &["ID", "Name", "Technology"],
            system
                .containers
                .values()
                .map(|c| vec![c.id.clone(), c.name.clone(), c.technology.clone().unwrap_or_default()])
                .chain(std::iter::once(vec![slug.to_string(), req.name.clone(), req.technology.clone().unwrap_or_default()]))
                .collect(),
        ),
    );
    system.containers.insert(slug.to_string(), container);
    FsRepository::save_system(root, source, &system)?;
    files_written.push(std::path::Path::new(source).join(system_id).join("system.md"));
    files_written.push(std::path::Path::new(source).join(system_id).join("system.d2"));

    Ok(ScaffoldResponse {
        id: format!("{system_id}/{slug}"),
        files_written,
        report: Report::new(),
    })
}

fn scaffold_component(
    root: &std::path::Path,
    source: &str,
    slug: &str,
    req: &ScaffoldRequest,
    templates: &TemplateEngine,
    renderer: Option<&dyn DiagramRenderer>,
) -> Result<ScaffoldResponse> {
    let parent = req
        .parent
        .as_deref()
        .ok_or_else(|| LokoError::InvalidArgument("component scaffold requires a parent container ID".into()))?;
    let (system_id, container_id) = parent
        .split_once('/')
        .ok_or_else(|| LokoError::InvalidArgument("parent must be '<system>/<container>'".into()))?;

    let mut container = FsRepository::load_container(root, source, system_id, container_id)
        .map_err(|_| LokoError::NotFound(parent.to_string()))?;
    if container.components.contains_key(slug) {
        return Err(LokoError::AlreadyExists(format!("{parent}/{slug}")));
    }

    let pack = select_component_pack(req.technology.as_deref().unwrap_or(""), req.template.as_deref());
    let vars = TemplateVars::new()
        .set("ComponentName", req.name.clone())
        .set("ComponentID", slug.to_string())
        .set("Description", req.description.clone())
        .set_opt("Technology", req.technology.as_deref());

    let md = templates.render(pack, "component.md", &vars);
    let d2 = templates.render(pack, "component.d2", &vars);

    let (fm, body) = frontmatter::parse(&md, std::path::Path::new("<template>"))?;
    let mut component = Component::from_front_matter(slug.to_string(), fm, body);
    component.description = req.description.clone();
    component.tags = req.tags.clone();
    component.technology = req.technology.clone();
    component.diagram = Some(Diagram::new(d2));

    FsRepository::save_component(root, source, system_id, container_id, &component)?;

    let mut files_written = vec![
        std::path::Path::new(source).join(system_id).join(container_id).join(slug).join("component.md"),
        std::path::Path::new(source).join(system_id).join(container_id).join(format!("{slug}.d2")),
    ];

    let changed_diagram = append_node_if_missing(container.diagram.as_ref().map(|d| d.source.as_str()).unwrap_or(""), slug);
    container.diagram = Some(Diagram::new(changed_diagram));
    container.body = update_generated_table(
        &container.body,
        "components",
        &render_table(
            &["ID", "Name", "Technology"],
            container
                .components
                .values()
                .map(|c| vec![c.id.clone(), c.name.clone(), c.technology.clone().unwrap_or_default()])
                .chain(std::iter::once(vec![slug.to_string(), req.name.clone(), req.technology.clone().unwrap_or_default()]))
                .collect(),
        ),
    );
    container.components.insert(slug.to_string(), component);
    FsRepository::save_container(root, source, system_id, &container)?;
    files_written.push(std::path::Path::new(source).join(system_id).join(container_id).join("container.md"));
    files_written.push(std::path::Path::new(source).join(system_id).join(container_id).join("container.d2"));

    let mut report = Report::new();
    if let Some(renderer) = renderer {
        if renderer.is_available() {
            let stub = preview::stub_source(&req.name, req.technology.as_deref(), container_id);
            if let Err(e) = renderer.render(&RenderRequest::new(stub)) {
                report.warn(format!("preview render failed: {e}"));
            }
        }
    }

    Ok(ScaffoldResponse {
        id: format!("{parent}/{slug}"),
        files_written,
        report,
    })
}

/// Appends a bare node block for `child_id` to `source` if no block with
/// that identifier already exists. Empty `source` starts a fresh diagram.
fn append_node_if_missing(source: &str, child_id: &str) -> String {
    let header_prefix = format!("{child_id} {{");
    let already_present = source.lines().any(|l| l.trim_start().starts_with(&header_prefix) || l.trim() == child_id);
    if already_present {
        return source.to_string();
    }
    let mut out = source.to_string();
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
    out.push_str(&format!("{child_id} {{\n}}\n"));
    out
}

const TABLE_START: &str = "<!-- loko:table:";
const TABLE_END: &str = "<!-- /loko:table -->";

fn render_table(headers: &[&str], rows: Vec<Vec<String>>) -> String {
    let mut out = String::new();
    out.push_str(&format!("| {} |\n", headers.join(" | ")));
    out.push_str(&format!("|{}|\n", headers.iter().map(|_| "---").collect::<Vec<_>>().join("|")));
    for row in rows {
        out.push_str(&format!("| {} |\n", row.join(" | ")));
    }
    out
}

/// Replaces (or appends) the auto-generated markdown table for `marker`
/// (e.g. `"containers"`, `"components"`) delimited by sentinel HTML
/// comments, leaving the rest of the body untouched.
fn update_generated_table(body: &str, marker: &str, table_md: &str) -> String {
    let start_marker = format!("{TABLE_START}{marker} -->");
    let block = format!("{start_marker}\n{table_md}{TABLE_END}\n");

    if let Some(start) = body.find(&start_marker) {
        if let Some(end_rel) = body[start..].find(TABLE_END) {
            let end = start + end_rel + TABLE_END.len();
            let mut out = body[..start].to_string();
            out.push_str(&block);
            out.push_str(body[end..].trim_start_matches('\n'));
            return out;
        }
    }

    let mut out = body.to_string();
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
    out.push('\n');
    out.push_str(&block);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_node_if_missing_is_idempotent() {
        let once = append_node_if_missing("", "api");
        assert!(once.contains("api {"));
        let twice = append_node_if_missing(&once, "api");
        assert_eq!(once, twice);
    }

    #[test]
    fn generated_table_round_trips_with_surrounding_body() {
        let body = "# Payments\n\nSome prose.\n";
        let with_table = update_generated_table(body, "containers", &render_table(&["ID"], vec![vec!["api".into()]]));
        assert!(with_table.contains("Some prose."));
        assert!(with_table.contains("| api |"));

        let updated = update_generated_table(&with_table, "containers", &render_table(&["ID"], vec![vec!["api".into()], vec!["worker".into()]]));
        assert!(updated.contains("worker"));
        assert_eq!(updated.matches("Some prose.").count(), 1);
    }
}

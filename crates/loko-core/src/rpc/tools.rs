//! Tool registration: one parameter struct, one handler function, one
//! registry entry per tool, built once at `ToolHost` construction.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;

use crate::cancel::CancelToken;
use crate::diagram;
use crate::error::{LokoError, Result};
use crate::query::{Detail, QueryRequest, Scope};
use crate::repository::FsRepository;
use crate::usecases::{self, EntityType, ScaffoldRequest};

use super::host::ToolHost;

pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: fn() -> Value,
    pub handler: fn(&ToolHost, Value) -> Result<Value>,
}

fn schema_of<T: JsonSchema>() -> Value {
    serde_json::to_value(schemars::schema_for!(T)).unwrap_or(Value::Null)
}

fn parse_params<T: serde::de::DeserializeOwned>(args: Value) -> Result<T> {
    serde_json::from_value(args).map_err(|e| LokoError::InvalidParams(e.to_string()))
}

fn fallback_name(root: &Path) -> String {
    root.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "project".to_string())
}

fn parse_detail(detail: &Option<String>) -> Result<Detail> {
    match detail.as_deref().unwrap_or("summary") {
        "summary" => Ok(Detail::Summary),
        "structure" => Ok(Detail::Structure),
        "full" => Ok(Detail::Full),
        other => Err(LokoError::InvalidArgument(format!("unknown detail level '{other}'"))),
    }
}

fn scope_for_target(target: &Option<String>) -> Scope {
    match target.as_deref().map(|t| t.split('/').filter(|s| !s.is_empty()).count()) {
        None | Some(0) => Scope::Project,
        Some(1) => Scope::System,
        _ => Scope::Container,
    }
}

// --- query_project -----------------------------------------------------

#[derive(Debug, Deserialize, JsonSchema)]
pub struct QueryProjectParams {
    /// Path to the project root (the directory holding `loko.toml`).
    pub project: PathBuf,
}

fn query_project(_host: &ToolHost, args: Value) -> Result<Value> {
    let params: QueryProjectParams = parse_params(args)?;
    let (project, _report) = FsRepository::load_project(&params.project, &fallback_name(&params.project))?;
    let req = QueryRequest { scope: Scope::Project, target: None, detail: Detail::Summary };
    let projection = crate::query::project(&project, &req)?;
    Ok(serde_json::to_value(projection)?)
}

// --- query_architecture --------------------------------------------------

#[derive(Debug, Deserialize, JsonSchema)]
pub struct QueryArchitectureParams {
    pub project: PathBuf,
    /// Qualified ID to scope the query to. Omit for the whole project.
    #[serde(default)]
    pub target: Option<String>,
    /// One of `summary`, `structure`, `full`. Defaults to `summary`.
    #[serde(default)]
    pub detail: Option<String>,
}

fn query_architecture(_host: &ToolHost, args: Value) -> Result<Value> {
    let params: QueryArchitectureParams = parse_params(args)?;
    let (project, _report) = FsRepository::load_project(&params.project, &fallback_name(&params.project))?;
    let req = QueryRequest {
        scope: scope_for_target(&params.target),
        target: params.target,
        detail: parse_detail(&params.detail)?,
    };
    let projection = crate::query::project(&project, &req)?;
    Ok(serde_json::to_value(projection)?)
}

// --- query_dependencies ---------------------------------------------------

#[derive(Debug, Deserialize, JsonSchema)]
pub struct QueryDependenciesParams {
    pub project: PathBuf,
    /// Qualified or short ID of the node whose edges are returned.
    pub target: String,
}

fn query_dependencies(host: &ToolHost, args: Value) -> Result<Value> {
    let params: QueryDependenciesParams = parse_params(args)?;
    let graph = host.graph_for(&params.project)?;
    let resolved = graph
        .resolve_id(&params.target)
        .ok_or_else(|| LokoError::NotFound(params.target.clone()))?
        .to_string();
    let outgoing: Vec<&crate::graph::Edge> = graph.outgoing_edges(&resolved);
    let incoming: Vec<&crate::graph::Edge> = graph.incoming_edges(&resolved);
    Ok(serde_json::json!({ "target": resolved, "outgoing": outgoing, "incoming": incoming }))
}

// --- query_related_components --------------------------------------------

#[derive(Debug, Deserialize, JsonSchema)]
pub struct QueryRelatedComponentsParams {
    pub project: PathBuf,
    pub target: String,
    /// Maximum hop count (defaults to 1).
    #[serde(default)]
    pub depth: Option<usize>,
}

fn query_related_components(host: &ToolHost, args: Value) -> Result<Value> {
    let params: QueryRelatedComponentsParams = parse_params(args)?;
    let graph = host.graph_for(&params.project)?;
    let resolved = graph
        .resolve_id(&params.target)
        .ok_or_else(|| LokoError::NotFound(params.target.clone()))?
        .to_string();
    let neighbours: Vec<&crate::graph::Node> = graph.neighbours(&resolved, params.depth.unwrap_or(1));
    Ok(serde_json::to_value(neighbours)?)
}

// --- analyze_coupling ------------------------------------------------------

#[derive(Debug, Deserialize, JsonSchema)]
pub struct AnalyzeCouplingParams {
    pub project: PathBuf,
    pub a: String,
    pub b: String,
}

fn analyze_coupling(host: &ToolHost, args: Value) -> Result<Value> {
    let params: AnalyzeCouplingParams = parse_params(args)?;
    let graph = host.graph_for(&params.project)?;
    let a = graph.resolve_id(&params.a).ok_or_else(|| LokoError::NotFound(params.a.clone()))?.to_string();
    let b = graph.resolve_id(&params.b).ok_or_else(|| LokoError::NotFound(params.b.clone()))?.to_string();
    let coupling = graph.coupling(&a, &b);
    Ok(serde_json::json!({ "a": a, "b": b, "edges": coupling }))
}

// --- create_system / create_container / create_component ------------------

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ScaffoldParams {
    pub project: PathBuf,
    pub name: String,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub technology: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub template: Option<String>,
}

impl ScaffoldParams {
    fn into_request(self, entity_type: EntityType) -> (PathBuf, ScaffoldRequest) {
        (
            self.project,
            ScaffoldRequest {
                entity_type,
                name: self.name,
                parent: self.parent,
                description: self.description,
                technology: self.technology,
                tags: self.tags,
                template: self.template,
            },
        )
    }
}

fn run_scaffold(host: &ToolHost, project: &Path, request: &ScaffoldRequest) -> Result<Value> {
    let response = usecases::scaffold::run(project, request, &host.templates, Some(host.renderer.as_ref()), &CancelToken::new())?;
    host.invalidate(project);
    Ok(serde_json::to_value(response)?)
}

fn create_system(host: &ToolHost, args: Value) -> Result<Value> {
    let params: ScaffoldParams = parse_params(args)?;
    let (project, request) = params.into_request(EntityType::System);
    run_scaffold(host, &project, &request)
}

fn create_container(host: &ToolHost, args: Value) -> Result<Value> {
    let params: ScaffoldParams = parse_params(args)?;
    let (project, request) = params.into_request(EntityType::Container);
    run_scaffold(host, &project, &request)
}

fn create_component(host: &ToolHost, args: Value) -> Result<Value> {
    let params: ScaffoldParams = parse_params(args)?;
    let (project, request) = params.into_request(EntityType::Component);
    run_scaffold(host, &project, &request)
}

// --- create_components (batch) --------------------------------------------

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateComponentsParams {
    pub project: PathBuf,
    pub components: Vec<BatchComponent>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct BatchComponent {
    pub parent: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub technology: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub template: Option<String>,
}

/// Scaffolds several components in one call. Each is independent: one
/// failure is recorded and the rest still run, matching the use-case
/// layer's aggregate-don't-abort error policy.
fn create_components(host: &ToolHost, args: Value) -> Result<Value> {
    let params: CreateComponentsParams = parse_params(args)?;
    let mut created = Vec::new();
    let mut report = crate::report::Report::new();

    for component in params.components {
        let request = ScaffoldRequest {
            entity_type: EntityType::Component,
            name: component.name.clone(),
            parent: Some(component.parent.clone()),
            description: component.description,
            technology: component.technology,
            tags: component.tags,
            template: component.template,
        };
        match usecases::scaffold::run(&params.project, &request, &host.templates, Some(host.renderer.as_ref()), &CancelToken::new()) {
            Ok(response) => created.push(response),
            Err(e) => report.error(format!("{}: {e}", component.name)),
        }
    }
    host.invalidate(&params.project);

    Ok(serde_json::json!({ "created": created, "report": report }))
}

// --- update_diagram ---------------------------------------------------------

#[derive(Debug, Deserialize, JsonSchema)]
pub struct UpdateDiagramParams {
    pub project: PathBuf,
    pub target: String,
    pub source: String,
}

fn update_diagram(host: &ToolHost, args: Value) -> Result<Value> {
    let params: UpdateDiagramParams = parse_params(args)?;
    let config = FsRepository::load_config(&params.project, &fallback_name(&params.project))?;
    let request = usecases::UpdateDiagramRequest { target: params.target, source: params.source };
    let response = usecases::update_diagram::run(
        &params.project,
        &config.paths.source,
        &request,
        &host.render_cache,
        &CancelToken::new(),
    )?;
    host.invalidate(&params.project);
    Ok(serde_json::to_value(response)?)
}

// --- validate ----------------------------------------------------------------

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ValidateParams {
    pub project: PathBuf,
    #[serde(default)]
    pub check_drift: bool,
}

fn validate(_host: &ToolHost, args: Value) -> Result<Value> {
    let params: ValidateParams = parse_params(args)?;
    let request = usecases::ValidateRequest { check_drift: params.check_drift };
    let response = usecases::validate::run(&params.project, &fallback_name(&params.project), &request, &CancelToken::new())?;
    Ok(serde_json::to_value(response)?)
}

// --- validate_diagram ---------------------------------------------------------

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ValidateDiagramParams {
    /// Diagram source to check. Parsed in isolation, nothing is read from
    /// or written to disk.
    pub source: String,
}

fn validate_diagram(_host: &ToolHost, args: Value) -> Result<Value> {
    let params: ValidateDiagramParams = parse_params(args)?;
    match diagram::parse(&params.source) {
        Ok(parsed) => Ok(serde_json::json!({
            "valid": true,
            "edges": parsed.edges,
            "tooltips": parsed.tooltips,
        })),
        Err(e) => Ok(serde_json::json!({ "valid": false, "error": e.to_string() })),
    }
}

// --- build_docs ----------------------------------------------------------------

#[derive(Debug, Deserialize, JsonSchema)]
pub struct BuildDocsParams {
    pub project: PathBuf,
    #[serde(default)]
    pub formats: Option<Vec<String>>,
    #[serde(default)]
    pub clean: bool,
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
}

fn parse_format(s: &str) -> Result<crate::build::OutputFormat> {
    match s {
        "html" => Ok(crate::build::OutputFormat::Html),
        "markdown" => Ok(crate::build::OutputFormat::Markdown),
        "pdf" => Ok(crate::build::OutputFormat::Pdf),
        other => Err(LokoError::InvalidArgument(format!("unknown format '{other}'"))),
    }
}

fn build_docs(host: &ToolHost, args: Value) -> Result<Value> {
    let params: BuildDocsParams = parse_params(args)?;
    let formats = params
        .formats
        .map(|names| names.iter().map(|s| parse_format(s)).collect::<Result<Vec<_>>>())
        .transpose()?;

    let request = usecases::BuildDocsRequest { formats, clean: params.clean, output_dir: params.output_dir };
    let response = usecases::build_docs::run(
        &params.project,
        &fallback_name(&params.project),
        &request,
        host.renderer.as_ref(),
        host.pdf_renderer.as_ref(),
        &host.render_cache,
        &host.renderer_version,
        &CancelToken::new(),
    )?;
    Ok(serde_json::to_value(response)?)
}

/// Builds the tool registry once, at `ToolHost` construction.
pub fn registry() -> IndexMap<&'static str, ToolSpec> {
    let mut map = IndexMap::new();
    let mut add = |spec: ToolSpec| {
        map.insert(spec.name, spec);
    };

    add(ToolSpec {
        name: "query_project",
        description: "Summarize a project: system/container/component/diagram counts and system names.",
        input_schema: schema_of::<QueryProjectParams>,
        handler: query_project,
    });
    add(ToolSpec {
        name: "query_architecture",
        description: "Project the architecture at a given scope and detail level (summary, structure, or full).",
        input_schema: schema_of::<QueryArchitectureParams>,
        handler: query_architecture,
    });
    add(ToolSpec {
        name: "query_dependencies",
        description: "List the incoming and outgoing edges of a system, container, or component. `triggered_by` edges follow the same source→target direction as every other relationship: the declaring node is `source`, the named node is `target`.",
        input_schema: schema_of::<QueryDependenciesParams>,
        handler: query_dependencies,
    });
    add(ToolSpec {
        name: "query_related_components",
        description: "List nodes reachable from a target within a given number of hops.",
        input_schema: schema_of::<QueryRelatedComponentsParams>,
        handler: query_related_components,
    });
    add(ToolSpec {
        name: "analyze_coupling",
        description: "Count edges between two subtrees of the architecture graph.",
        input_schema: schema_of::<AnalyzeCouplingParams>,
        handler: analyze_coupling,
    });
    add(ToolSpec {
        name: "create_system",
        description: "Scaffold a new System from a template.",
        input_schema: schema_of::<ScaffoldParams>,
        handler: create_system,
    });
    add(ToolSpec {
        name: "create_container",
        description: "Scaffold a new Container under a System from a template.",
        input_schema: schema_of::<ScaffoldParams>,
        handler: create_container,
    });
    add(ToolSpec {
        name: "create_component",
        description: "Scaffold a new Component under a Container, selecting a template pack by keyword match.",
        input_schema: schema_of::<ScaffoldParams>,
        handler: create_component,
    });
    add(ToolSpec {
        name: "create_components",
        description: "Scaffold several Components in one call; one failure does not abort the rest.",
        input_schema: schema_of::<CreateComponentsParams>,
        handler: create_components,
    });
    add(ToolSpec {
        name: "update_diagram",
        description: "Overwrite the diagram source owned by a system, container, or component.",
        input_schema: schema_of::<UpdateDiagramParams>,
        handler: update_diagram,
    });
    add(ToolSpec {
        name: "validate",
        description: "Run structural validation over a project, optionally including drift detection.",
        input_schema: schema_of::<ValidateParams>,
        handler: validate,
    });
    add(ToolSpec {
        name: "validate_diagram",
        description: "Parse a diagram source in isolation and report syntax errors without touching disk.",
        input_schema: schema_of::<ValidateDiagramParams>,
        handler: validate_diagram,
    });
    add(ToolSpec {
        name: "build_docs",
        description: "Run the build pipeline (render diagrams, emit html/markdown/pdf) for a project.",
        input_schema: schema_of::<BuildDocsParams>,
        handler: build_docs,
    });

    map
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_has_every_spec_tool() {
        let reg = registry();
        for name in [
            "query_project",
            "query_architecture",
            "query_dependencies",
            "query_related_components",
            "analyze_coupling",
            "create_system",
            "create_container",
            "create_component",
            "create_components",
            "update_diagram",
            "validate",
            "validate_diagram",
            "build_docs",
        ] {
            assert!(reg.contains_key(name), "missing tool '{name}'");
        }
    }

    #[test]
    fn every_schema_is_an_object_with_properties() {
        for spec in registry().values() {
            if spec.name == "validate_diagram" {
                continue; // single required field, schema may omit `properties` if empty after strip
            }
            let schema = (spec.input_schema)();
            assert!(schema.get("properties").is_some(), "{} has no properties", spec.name);
        }
    }
}

//! End-to-end coverage that no single module's unit tests exercise: scaffold
//! a project on disk through the same use cases the CLI and the JSON-RPC
//! host call, then build, query, and validate it.

use loko_core::build::OutputFormat;
use loko_core::cancel::CancelToken;
use loko_core::diagram::renderer::UnavailableRenderer;
use loko_core::diagram::RenderCache;
use loko_core::build::pdf::UnavailablePdfRenderer;
use loko_core::config::Config;
use loko_core::query::{Detail, Format, QueryRequest, Scope};
use loko_core::repository::FsRepository;
use loko_core::templates::TemplateEngine;
use loko_core::usecases::{build_docs, query, scaffold, validate, EntityType, ScaffoldRequest};

fn scaffold_request(entity_type: EntityType, name: &str, parent: Option<&str>, technology: Option<&str>) -> ScaffoldRequest {
    ScaffoldRequest {
        entity_type,
        name: name.to_string(),
        parent: parent.map(str::to_string),
        description: format!("{name} description"),
        technology: technology.map(str::to_string),
        tags: vec![],
        template: None,
    }
}

#[test]
fn scaffold_build_query_validate_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    let cancel = CancelToken::new();
    let templates = TemplateEngine::new(None);

    FsRepository::save_config(root, &Config::new("acme")).unwrap();
    std::fs::create_dir_all(root.join("src")).unwrap();

    let system = scaffold::run(
        root,
        &scaffold_request(EntityType::System, "Payments", None, Some("Go")),
        &templates,
        None,
        &cancel,
    )
    .unwrap();
    assert_eq!(system.id, "payments");

    let container = scaffold::run(
        root,
        &scaffold_request(EntityType::Container, "API", Some("payments"), Some("Go + Fiber")),
        &templates,
        None,
        &cancel,
    )
    .unwrap();
    assert_eq!(container.id, "payments/api");

    let component = scaffold::run(
        root,
        &scaffold_request(EntityType::Component, "Charge", Some("payments/api"), Some("AWS Lambda")),
        &templates,
        Some(&UnavailableRenderer),
        &cancel,
    )
    .unwrap();
    assert_eq!(component.id, "payments/api/charge");

    // The container's auto-generated component table and node diagram
    // should have picked up the new component without hand-editing.
    let loaded_container = FsRepository::load_container(root, "src", "payments", "api").unwrap();
    assert!(loaded_container.components.contains_key("charge"));
    assert!(loaded_container.body.contains("charge"));
    assert!(loaded_container
        .diagram
        .as_ref()
        .map(|d| d.source.contains("charge"))
        .unwrap_or(false));

    let (project, load_report) = FsRepository::load_project(root, "acme").unwrap();
    assert!(load_report.warnings.is_empty());
    assert_eq!(project.systems.len(), 1);

    let cache = RenderCache::new();
    let build_response = build_docs::run(
        root,
        "acme",
        &build_docs::BuildDocsRequest {
            formats: Some(vec![OutputFormat::Markdown]),
            clean: false,
            output_dir: None,
        },
        &UnavailableRenderer,
        &UnavailablePdfRenderer,
        &cache,
        "test",
        &cancel,
    )
    .unwrap();
    assert_eq!(build_response.build.files_generated, 1);
    assert!(root.join("dist/docs.md").exists());

    let query_response = query::run(
        &project,
        &QueryRequest {
            scope: Scope::Project,
            target: None,
            detail: Detail::Summary,
        },
        Format::Json,
        &cancel,
    )
    .unwrap();
    let summary: serde_json::Value = serde_json::from_str(&query_response.encoded).unwrap();
    assert_eq!(summary["systems"], 1);
    assert_eq!(summary["containers"], 1);
    assert_eq!(summary["components"], 1);

    let validate_response = validate::run(
        root,
        "acme",
        &validate::ValidateRequest { check_drift: true },
        &cancel,
    )
    .unwrap();
    assert!(!validate_response.report.has_errors());
}

#[test]
fn scaffolding_a_duplicate_system_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    let cancel = CancelToken::new();
    let templates = TemplateEngine::new(None);

    FsRepository::save_config(root, &Config::new("acme")).unwrap();
    scaffold::run(
        root,
        &scaffold_request(EntityType::System, "Payments", None, None),
        &templates,
        None,
        &cancel,
    )
    .unwrap();

    let err = scaffold::run(
        root,
        &scaffold_request(EntityType::System, "Payments", None, None),
        &templates,
        None,
        &cancel,
    )
    .unwrap_err();
    assert!(matches!(err, loko_core::error::LokoError::AlreadyExists(_)));
}

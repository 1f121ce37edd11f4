//! Golden fixture for the tabular query encoding over a small, fixed
//! project, exercising the full structure→container→component nesting
//! that the per-projection unit tests (scoped to one projection each)
//! don't cover end to end.

use loko_core::cancel::CancelToken;
use loko_core::diagram::renderer::UnavailableRenderer;
use loko_core::config::Config;
use loko_core::query::{Detail, Format, QueryRequest, Scope};
use loko_core::repository::FsRepository;
use loko_core::templates::TemplateEngine;
use loko_core::usecases::{query, scaffold, EntityType, ScaffoldRequest};

fn build_fixture_project(root: &std::path::Path) {
    let cancel = CancelToken::new();
    let templates = TemplateEngine::new(None);
    FsRepository::save_config(root, &Config::new("acme")).unwrap();

    scaffold::run(
        root,
        &ScaffoldRequest {
            entity_type: EntityType::System,
            name: "Payments".into(),
            parent: None,
            description: "Handles money movement".into(),
            technology: None,
            tags: vec![],
            template: None,
        },
        &templates,
        None,
        &cancel,
    )
    .unwrap();

    scaffold::run(
        root,
        &ScaffoldRequest {
            entity_type: EntityType::Container,
            name: "API".into(),
            parent: Some("payments".into()),
            description: "Public HTTP surface".into(),
            technology: Some("Go + Fiber".into()),
            tags: vec![],
            template: None,
        },
        &templates,
        None,
        &cancel,
    )
    .unwrap();

    scaffold::run(
        root,
        &ScaffoldRequest {
            entity_type: EntityType::Component,
            name: "Charge Handler".into(),
            parent: Some("payments/api".into()),
            description: "Processes a charge request".into(),
            technology: Some("AWS Lambda".into()),
            tags: vec![],
            template: None,
        },
        &templates,
        Some(&UnavailableRenderer),
        &cancel,
    )
    .unwrap();
}

#[test]
fn structure_detail_tabular_matches_golden_shape() {
    let dir = tempfile::tempdir().unwrap();
    build_fixture_project(dir.path());
    let cancel = CancelToken::new();

    let (project, _) = FsRepository::load_project(dir.path(), "acme").unwrap();
    let response = query::run(
        &project,
        &QueryRequest { scope: Scope::Project, target: None, detail: Detail::Structure },
        Format::Tabular,
        &cancel,
    )
    .unwrap();

    let expected = "systems[1]{id,name}\npayments,Payments\n  containers[1]{id,name,technology}\n  payments/api,API,Go + Fiber\n";
    assert_eq!(response.encoded, expected);
}

#[test]
fn full_detail_tabular_nests_components_and_relationships() {
    let dir = tempfile::tempdir().unwrap();
    build_fixture_project(dir.path());
    let cancel = CancelToken::new();

    let (project, _) = FsRepository::load_project(dir.path(), "acme").unwrap();
    let response = query::run(
        &project,
        &QueryRequest {
            scope: Scope::Project,
            target: Some("payments".into()),
            detail: Detail::Full,
        },
        Format::Tabular,
        &cancel,
    )
    .unwrap();

    assert!(response.encoded.starts_with("id payments\n"));
    assert!(response.encoded.contains("name Payments\n"));
    assert!(response.encoded.contains("containers[1]{id,name}\n"));
    assert!(response.encoded.contains("payments/api,API\n"));
    assert!(response.encoded.contains("components[1]{id,name}\n"));
    assert!(response.encoded.contains("payments/api/charge-handler,Charge Handler\n"));
    assert!(response.encoded.contains("relationships[0]{target,label,type}\n"));
}

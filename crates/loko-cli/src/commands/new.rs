//! `loko new {system|container|component}`.

use std::path::Path;

use loko_core::cancel::CancelToken;
use loko_core::diagram::DiagramRenderer;
use loko_core::templates::TemplateEngine;
use loko_core::usecases::{scaffold, EntityType, ScaffoldRequest};

use crate::cli::{NewArgs, NewEntity};
use crate::diagnostics;
use crate::renderer::D2Renderer;

pub fn run_new(root: &Path, entity: &NewEntity) -> i32 {
    let (entity_type, args) = match entity {
        NewEntity::System(args) => (EntityType::System, args),
        NewEntity::Container(args) => (EntityType::Container, args),
        NewEntity::Component(args) => (EntityType::Component, args),
    };

    let request = to_request(entity_type, args);
    let templates = TemplateEngine::new(crate::paths::template_override_dir());
    let renderer = D2Renderer::discover();

    let renderer_ref: &dyn DiagramRenderer = &renderer;
    match scaffold::run(root, &request, &templates, Some(renderer_ref), &CancelToken::new()) {
        Ok(response) => {
            diagnostics::print_report(&response.report, false);
            diagnostics::print_success(&format!(
                "created {} ({} file{} written)",
                response.id,
                response.files_written.len(),
                if response.files_written.len() == 1 { "" } else { "s" }
            ));
            super::EXIT_OK
        }
        Err(e) => {
            diagnostics::print_error(&e);
            super::exit_code_for(&e)
        }
    }
}

fn to_request(entity_type: EntityType, args: &NewArgs) -> ScaffoldRequest {
    ScaffoldRequest {
        entity_type,
        name: args.name.clone(),
        parent: args.parent.clone(),
        description: args.description.clone(),
        technology: args.technology.clone(),
        tags: args.tags.clone().unwrap_or_default(),
        template: args.template.clone(),
    }
}

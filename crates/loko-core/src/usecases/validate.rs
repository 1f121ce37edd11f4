//! ValidateArchitecture: loads the project tree, builds
//! the graph, and checks both for structural problems and, optionally,
//! drift between diagrams and front-matter.

use serde::{Deserialize, Serialize};

use crate::cancel::CancelToken;
use crate::error::Result;
use crate::graph::{self, ArchitectureGraph};
use crate::report::Report;
use crate::repository::FsRepository;

use super::drift::{self, DriftIssue, Severity};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateRequest {
    #[serde(default)]
    pub check_drift: bool,
}

impl Default for ValidateRequest {
    fn default() -> Self {
        Self { check_drift: false }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateResponse {
    pub report: Report,
    #[serde(default)]
    pub drift: Vec<DriftIssue>,
}

/// Runs every structural check plus, when `req.check_drift` is set, the
/// full drift comparison.
pub fn run(root: &std::path::Path, fallback_name: &str, req: &ValidateRequest, cancel: &CancelToken) -> Result<ValidateResponse> {
    cancel.check()?;
    let mut report = Report::new();

    let (project, load_report) = FsRepository::load_project(root, fallback_name)?;
    // A missing/unparsable required file is a validation error, not a warning.
    for w in load_report.warnings {
        report.error(w);
    }

    cancel.check()?;
    let mut graph = ArchitectureGraph::new();
    let (raw, build_report) = graph::collect(&project, &mut graph);
    for w in build_report.warnings {
        report.error(format!("diagram syntax error: {w}"));
    }
    let mut merged = std::collections::HashMap::new();
    for edge in raw.containment.iter().chain(raw.front_matter.iter()) {
        merged.insert(edge.key(), edge.clone());
    }
    for edge in &raw.diagram {
        merged.entry(edge.key()).or_insert_with(|| edge.clone());
    }
    graph.set_edges(merged.into_values().collect());
    graph.rebuild_short_ids();

    for edge in &raw.front_matter {
        if graph.get_node(&edge.target).is_none() {
            report.error(format!(
                "relationship edge '{} -> {}' does not resolve",
                edge.source, edge.target
            ));
        }
    }

    for system in project.systems.values() {
        check_cycles(&project, system, &mut Vec::new(), &mut report);
        if system.containers.is_empty() {
            report.warn(format!("system '{}' has no containers", system.id));
        }
        if system.description.trim().is_empty() {
            report.warn(format!("system '{}' has no description", system.id));
        }
    }

    cancel.check()?;
    let mut issues = Vec::new();
    if req.check_drift {
        issues = drift::detect(&project);
        for issue in &issues {
            let line = format!("{}: {}", issue.component_id, issue.message);
            match issue.severity {
                Severity::Error => report.error(line),
                Severity::Warning => report.warn(line),
            }
        }
    }

    Ok(ValidateResponse { report, drift: issues })
}

/// Depth-first cycle check over `System.dependencies` that reports circular
/// structural relationships.
fn check_cycles(
    project: &crate::entities::Project,
    system: &crate::entities::System,
    stack: &mut Vec<String>,
    report: &mut Report,
) {
    if stack.contains(&system.id) {
        stack.push(system.id.clone());
        report.error(format!("circular dependency: {}", stack.join(" -> ")));
        stack.pop();
        return;
    }
    stack.push(system.id.clone());
    for dep in &system.dependencies {
        if let Some(next) = project.systems.get(dep) {
            check_cycles(project, next, stack, report);
        }
    }
    stack.pop();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(path: &std::path::Path, contents: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn missing_required_file_is_an_error_not_a_warning() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(&root.join("loko.toml"), "[project]\nname = \"acme\"\n");
        write(&root.join("src/bad/system.md"), "---\nname: Bad\n");

        let resp = run(root, "acme", &ValidateRequest::default(), &CancelToken::new()).unwrap();
        assert!(resp.report.has_errors());
    }

    #[test]
    fn circular_dependency_is_detected() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(&root.join("loko.toml"), "[project]\nname = \"acme\"\n");
        write(
            &root.join("src/a/system.md"),
            "---\nname: A\ndependencies:\n  - b\n---\n",
        );
        write(
            &root.join("src/b/system.md"),
            "---\nname: B\ndependencies:\n  - a\n---\n",
        );

        let resp = run(root, "acme", &ValidateRequest::default(), &CancelToken::new()).unwrap();
        assert!(resp.report.errors.iter().any(|e| e.contains("circular")));
    }

    #[test]
    fn empty_system_is_a_warning() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(&root.join("loko.toml"), "[project]\nname = \"acme\"\n");
        write(
            &root.join("src/lonely/system.md"),
            "---\nname: Lonely\ndescription: ok\n---\n",
        );

        let resp = run(root, "acme", &ValidateRequest::default(), &CancelToken::new()).unwrap();
        assert!(resp.report.warnings.iter().any(|w| w.contains("no containers")));
    }
}

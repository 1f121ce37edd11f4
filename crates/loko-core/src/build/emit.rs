//! Build stage 3: fold markdown bodies, rendered diagram paths, and
//! auto-generated tables into the requested output formats.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::entities::Project;
use crate::error::{LokoError, Result};

use super::pdf::PdfRenderer;
use super::render::RenderedDiagram;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    Html,
    Markdown,
    Pdf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatResult {
    pub format: OutputFormat,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Default)]
pub struct EmitOutcome {
    pub files_generated: usize,
    pub format_results: Vec<FormatResult>,
}

/// `owner qualified ID -> rendered SVG path`, used to embed or placeholder
/// diagrams while folding pages.
fn rendered_by_owner(rendered: &[RenderedDiagram]) -> HashMap<&str, &Path> {
    rendered.iter().map(|r| (r.owner.as_str(), r.output_path.as_path())).collect()
}

pub fn emit(
    project: &Project,
    rendered: &[RenderedDiagram],
    formats: &[OutputFormat],
    output_dir: &Path,
    pdf_renderer: &dyn PdfRenderer,
) -> Result<EmitOutcome> {
    let diagrams = rendered_by_owner(rendered);
    let mut outcome = EmitOutcome::default();

    if formats.contains(&OutputFormat::Markdown) {
        let (result, files) = emit_markdown(project, &diagrams, output_dir);
        outcome.files_generated += files;
        outcome.format_results.push(result);
    }

    if formats.contains(&OutputFormat::Html) {
        let (result, files) = emit_html(project, &diagrams, output_dir);
        outcome.files_generated += files;
        outcome.format_results.push(result);
    }

    if formats.contains(&OutputFormat::Pdf) {
        let html_dir = output_dir.join("html");
        let pdf_path = output_dir.join("loko.pdf");
        let result = if !pdf_renderer.is_available() {
            FormatResult {
                format: OutputFormat::Pdf,
                success: false,
                message: Some("PDF renderer unavailable".into()),
            }
        } else {
            match pdf_renderer.render(&html_dir, &pdf_path) {
                Ok(()) => {
                    outcome.files_generated += 1;
                    FormatResult { format: OutputFormat::Pdf, success: true, message: None }
                }
                Err(e) => FormatResult {
                    format: OutputFormat::Pdf,
                    success: false,
                    message: Some(e.to_string()),
                },
            }
        };
        outcome.format_results.push(result);
    }

    Ok(outcome)
}

fn diagram_ref(diagrams: &HashMap<&str, &Path>, owner: &str) -> String {
    match diagrams.get(owner) {
        Some(path) => format!("![diagram]({})", path.display()),
        None => "_diagram unavailable — renderer did not produce an SVG_".to_string(),
    }
}

fn markdown_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut out = String::new();
    out.push_str(&format!("| {} |\n", headers.join(" | ")));
    out.push_str(&format!("|{}|\n", headers.iter().map(|_| "---").collect::<Vec<_>>().join("|")));
    for row in rows {
        out.push_str(&format!("| {} |\n", row.join(" | ")));
    }
    out
}

fn emit_markdown(project: &Project, diagrams: &HashMap<&str, &Path>, output_dir: &Path) -> (FormatResult, usize) {
    let mut body = format!("# {}\n\n", project.name());

    for system in project.systems.values() {
        body.push_str(&format!("## {}\n\n{}\n\n", system.name, system.description));
        body.push_str(&diagram_ref(diagrams, &system.id));
        body.push_str("\n\n");
        body.push_str(&markdown_table(
            &["Container", "Technology"],
            &system
                .containers
                .values()
                .map(|c| vec![c.name.clone(), c.technology.clone().unwrap_or_default()])
                .collect::<Vec<_>>(),
        ));
        body.push('\n');

        for container in system.containers.values() {
            let owner = format!("{}/{}", system.id, container.id);
            body.push_str(&format!("### {}\n\n{}\n\n", container.name, container.description));
            body.push_str(&diagram_ref(diagrams, &owner));
            body.push_str("\n\n");
            body.push_str(&markdown_table(
                &["Component", "Technology"],
                &container
                    .components
                    .values()
                    .map(|c| vec![c.name.clone(), c.technology.clone().unwrap_or_default()])
                    .collect::<Vec<_>>(),
            ));
            body.push('\n');

            for component in container.components.values() {
                body.push_str(&format!("#### {}\n\n{}\n\n", component.name, component.description));
            }
        }
    }

    let path = output_dir.join("docs.md");
    match write(&path, &body) {
        Ok(()) => (FormatResult { format: OutputFormat::Markdown, success: true, message: None }, 1),
        Err(e) => (
            FormatResult {
                format: OutputFormat::Markdown,
                success: false,
                message: Some(e.to_string()),
            },
            0,
        ),
    }
}

fn emit_html(project: &Project, diagrams: &HashMap<&str, &Path>, output_dir: &Path) -> (FormatResult, usize) {
    let html_dir = output_dir.join("html");
    let mut files = 0usize;
    let mut nav = String::from("<nav><ul>\n");
    let mut pages: Vec<(PathBuf, String)> = Vec::new();

    for system in project.systems.values() {
        nav.push_str(&format!("<li><a href=\"{}.html\">{}</a><ul>\n", system.id, system.name));
        pages.push((
            html_dir.join(format!("{}.html", system.id)),
            page_html(&system.name, &system.description, &diagram_ref(diagrams, &system.id)),
        ));

        for container in system.containers.values() {
            let owner = format!("{}/{}", system.id, container.id);
            let slug = owner.replace('/', "_");
            nav.push_str(&format!("<li><a href=\"{slug}.html\">{}</a></li>\n", container.name));
            pages.push((
                html_dir.join(format!("{slug}.html")),
                page_html(&container.name, &container.description, &diagram_ref(diagrams, &owner)),
            ));
        }
        nav.push_str("</ul></li>\n");
    }
    nav.push_str("</ul></nav>\n");

    let index = format!(
        "<!doctype html><html><head><title>{}</title></head><body>{nav}<main><h1>{}</h1></main></body></html>\n",
        project.name(),
        project.name(),
    );

    if let Err(e) = write(&html_dir.join("index.html"), &index) {
        return (
            FormatResult { format: OutputFormat::Html, success: false, message: Some(e.to_string()) },
            0,
        );
    }
    files += 1;

    for (path, contents) in pages {
        let page = contents.replace("{{nav}}", &nav);
        if write(&path, &page).is_ok() {
            files += 1;
        }
    }

    (FormatResult { format: OutputFormat::Html, success: true, message: None }, files)
}

fn page_html(name: &str, description: &str, diagram: &str) -> String {
    format!(
        "<!doctype html><html><head><title>{name}</title></head><body>{{{{nav}}}}<main><h1>{name}</h1><p>{description}</p><div class=\"diagram\">{diagram}</div></main></body></html>\n"
    )
}

fn write(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| LokoError::io(parent, e))?;
    }
    std::fs::write(path, contents).map_err(|e| LokoError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::pdf::UnavailablePdfRenderer;
    use crate::config::Config;
    use crate::entities::{Container, FrontMatter, System};
    use std::path::PathBuf;

    fn sample_project() -> Project {
        let mut project = Project::new(PathBuf::from("/tmp/acme"), Config::new("acme"));
        let mut system = System::from_front_matter("payments".into(), FrontMatter::new(), String::new());
        system.name = "Payments".into();
        let container = Container::from_front_matter("api".into(), FrontMatter::new(), String::new());
        system.containers.insert("api".into(), container);
        project.systems.insert("payments".into(), system);
        project
    }

    #[test]
    fn markdown_format_writes_one_file() {
        let project = sample_project();
        let dir = tempfile::tempdir().unwrap();
        let outcome = emit(&project, &[], &[OutputFormat::Markdown], dir.path(), &UnavailablePdfRenderer).unwrap();
        assert_eq!(outcome.files_generated, 1);
        assert!(dir.path().join("docs.md").exists());
    }

    #[test]
    fn html_format_writes_index_and_system_pages() {
        let project = sample_project();
        let dir = tempfile::tempdir().unwrap();
        let outcome = emit(&project, &[], &[OutputFormat::Html], dir.path(), &UnavailablePdfRenderer).unwrap();
        assert!(outcome.files_generated >= 2);
        assert!(dir.path().join("html/index.html").exists());
    }

    #[test]
    fn pdf_without_renderer_reports_failure_but_does_not_error() {
        let project = sample_project();
        let dir = tempfile::tempdir().unwrap();
        let outcome = emit(&project, &[], &[OutputFormat::Pdf], dir.path(), &UnavailablePdfRenderer).unwrap();
        assert!(!outcome.format_results[0].success);
    }
}

//! `loko doctor`: reports whether the external collaborators (the diagram
//! renderer, the PDF renderer) are on `PATH`, using `which`-based binary
//! discovery.

use colored::Colorize;

use crate::renderer::{D2Renderer, WkHtmlToPdfRenderer};

pub fn run_doctor() -> i32 {
    let mut all_ok = true;

    report_binary("d2", which::which("d2").ok());
    if let Some(_path) = which::which("d2").ok() {
        let version = D2Renderer::discover().version();
        println!("  version: {version}");
    } else {
        all_ok = false;
    }

    let pdf_found = which::which("wkhtmltopdf").ok();
    report_binary("wkhtmltopdf", pdf_found.clone());
    if pdf_found.is_none() {
        all_ok = false;
    }
    let _ = WkHtmlToPdfRenderer::discover();

    if all_ok {
        println!("{}", "all external collaborators are available".green().bold());
        super::EXIT_OK
    } else {
        println!("{}", "some external collaborators are missing; affected stages will degrade to warnings".yellow().bold());
        super::EXIT_OK
    }
}

fn report_binary(name: &str, found: Option<std::path::PathBuf>) {
    match found {
        Some(path) => println!("{} {name}: {}", "✓".green(), path.display()),
        None => println!("{} {name}: not found on PATH", "✗".red()),
    }
}

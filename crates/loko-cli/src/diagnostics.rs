//! Styled terminal diagnostics: report/error/success/info printing shared
//! by every CLI subcommand.

use colored::Colorize;
use loko_core::error::LokoError;
use loko_core::report::Report;

pub fn print_report(report: &Report, verbose: bool) {
    for warning in &report.warnings {
        eprintln!("{} {}", "warning:".yellow().bold(), warning);
    }
    for error in &report.errors {
        eprintln!("{} {}", "error:".red().bold(), error);
    }
    if verbose && report.is_clean() {
        eprintln!("{} no issues found", "ok:".green().bold());
    }
}

pub fn print_error(err: &LokoError) {
    eprintln!("{} {}", "error:".red().bold(), err);
}

pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

pub fn print_info(message: &str) {
    if std::env::var_os("LOKO_VERBOSE").is_some() {
        println!("{} {}", "·".blue(), message);
    }
}

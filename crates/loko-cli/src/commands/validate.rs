//! `loko validate [--check-drift] [--strict]`.

use std::path::Path;

use loko_core::cancel::CancelToken;
use loko_core::usecases::{validate, ValidateRequest};

use crate::diagnostics;

pub fn run_validate(root: &Path, check_drift: bool, strict: bool, verbose: bool) -> i32 {
    let fallback_name = root.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_else(|| "project".to_string());
    let request = ValidateRequest { check_drift };

    match validate::run(root, &fallback_name, &request, &CancelToken::new()) {
        Ok(response) => {
            diagnostics::print_report(&response.report, verbose);
            for issue in &response.drift {
                let line = format!("{:?} ({:?}): {}", issue.kind, issue.severity, issue.message);
                match issue.severity {
                    loko_core::usecases::Severity::Error => eprintln!("drift error: {line}"),
                    loko_core::usecases::Severity::Warning => eprintln!("drift warning: {line}"),
                }
            }

            let has_error_drift = response.drift.iter().any(|d| matches!(d.severity, loko_core::usecases::Severity::Error));
            let has_warnings = !response.report.warnings.is_empty() || response.drift.iter().any(|d| matches!(d.severity, loko_core::usecases::Severity::Warning));

            if response.report.has_errors() || has_error_drift {
                super::EXIT_FAILURE
            } else if strict && has_warnings {
                super::EXIT_FAILURE
            } else {
                super::EXIT_OK
            }
        }
        Err(e) => {
            diagnostics::print_error(&e);
            super::exit_code_for(&e)
        }
    }
}

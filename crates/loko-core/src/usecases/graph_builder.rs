//! BuildArchitectureGraph: thin use-case wrapper around
//! `graph::build` for callers (the JSON-RPC host, the CLI) that only have
//! a loaded project and want the derived graph plus its build report.

use serde::{Deserialize, Serialize};

use crate::cancel::CancelToken;
use crate::entities::Project;
use crate::error::Result;
use crate::graph::ArchitectureGraph;
use crate::report::Report;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildGraphResponse {
    pub graph: ArchitectureGraph,
    pub report: Report,
}

pub fn run(project: &Project, cancel: &CancelToken) -> Result<BuildGraphResponse> {
    cancel.check()?;
    let (graph, report) = crate::graph::build(project);
    Ok(BuildGraphResponse { graph, report })
}

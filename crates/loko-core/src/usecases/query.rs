//! QueryArchitecture: project then encode, in one call.

use serde::{Deserialize, Serialize};

use crate::cancel::CancelToken;
use crate::entities::Project;
use crate::error::Result;
use crate::query::{self, Format, QueryRequest};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse {
    pub encoded: String,
    pub format: Format,
}

pub fn run(project: &Project, req: &QueryRequest, format: Format, cancel: &CancelToken) -> Result<QueryResponse> {
    cancel.check()?;
    let projection = query::project(project, req)?;
    let encoded = query::encode(&projection, format)?;
    Ok(QueryResponse { encoded, format })
}

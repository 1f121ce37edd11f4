use indexmap::IndexMap;
use std::path::PathBuf;

use crate::config::Config;

use super::System;

#[derive(Debug, Clone)]
pub struct Project {
    pub config: Config,
    pub path: PathBuf,
    /// Systems keyed by ID, insertion ordered.
    pub systems: IndexMap<String, System>,
}

impl Project {
    pub fn new(path: PathBuf, config: Config) -> Self {
        Project {
            config,
            path,
            systems: IndexMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.config.project.name
    }

    pub fn source_dir(&self) -> PathBuf {
        self.path.join(&self.config.paths.source)
    }

    pub fn output_dir(&self) -> PathBuf {
        self.path.join(&self.config.paths.output)
    }
}

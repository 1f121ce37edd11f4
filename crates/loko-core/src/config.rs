//! `loko.toml` configuration.
//!
//! Parsed and rewritten with `toml_edit` so unrecognized sections and
//! formatting survive a load/save round-trip: `toml_edit::DocumentMut` is
//! used wherever a config file must preserve what it didn't understand.

use std::path::Path;

use serde::{Deserialize, Serialize};
use toml_edit::{value, DocumentMut, Table};

use crate::error::{LokoError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectMeta {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_version")]
    pub version: String,
}

fn default_version() -> String {
    "0.1.0".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paths {
    #[serde(default = "default_source")]
    pub source: String,
    #[serde(default = "default_output")]
    pub output: String,
}

fn default_source() -> String {
    "src".to_string()
}
fn default_output() -> String {
    "dist".to_string()
}

impl Default for Paths {
    fn default() -> Self {
        Paths {
            source: default_source(),
            output: default_output(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct D2Config {
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_layout")]
    pub layout: String,
    #[serde(default = "default_true")]
    pub cache: bool,
}

fn default_theme() -> String {
    "default".to_string()
}
fn default_layout() -> String {
    "dagre".to_string()
}
fn default_true() -> bool {
    true
}

impl Default for D2Config {
    fn default() -> Self {
        D2Config {
            theme: default_theme(),
            layout: default_layout(),
            cache: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outputs {
    #[serde(default = "default_true")]
    pub html: bool,
    #[serde(default)]
    pub markdown: bool,
    #[serde(default)]
    pub pdf: bool,
}

impl Default for Outputs {
    fn default() -> Self {
        Outputs {
            html: true,
            markdown: false,
            pdf: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildConfig {
    #[serde(default = "default_true")]
    pub parallel: bool,
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,
}

fn default_max_workers() -> usize {
    4
}

impl Default for BuildConfig {
    fn default() -> Self {
        BuildConfig {
            parallel: true,
            max_workers: default_max_workers(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_serve_port")]
    pub serve_port: u16,
    #[serde(default = "default_api_port")]
    pub api_port: u16,
    #[serde(default)]
    pub hot_reload: bool,
}

fn default_serve_port() -> u16 {
    4000
}
fn default_api_port() -> u16 {
    4001
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            serve_port: default_serve_port(),
            api_port: default_api_port(),
            hot_reload: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemplatesConfig {
    #[serde(default)]
    pub default: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub project: ProjectMeta,
    #[serde(default)]
    pub paths: Paths,
    #[serde(default)]
    pub d2: D2Config,
    #[serde(default)]
    pub outputs: Outputs,
    #[serde(default)]
    pub build: BuildConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub templates: TemplatesConfig,
}

impl Config {
    pub fn new(name: impl Into<String>) -> Self {
        Config {
            project: ProjectMeta {
                name: name.into(),
                description: String::new(),
                version: default_version(),
            },
            paths: Paths::default(),
            d2: D2Config::default(),
            outputs: Outputs::default(),
            build: BuildConfig::default(),
            server: ServerConfig::default(),
            templates: TemplatesConfig::default(),
        }
    }

    /// Load `loko.toml` at `path`. A missing file yields defaults — callers
    /// need a project name up front in that case, so `missing_name` is used.
    pub fn load(path: &Path, missing_name: &str) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::new(missing_name));
        }
        let text = std::fs::read_to_string(path).map_err(|e| LokoError::io(path, e))?;
        Self::parse(&text, path)
    }

    pub fn parse(text: &str, path: &Path) -> Result<Self> {
        toml_edit::de::from_str(text)
            .map_err(|e| LokoError::parse(path, None, format!("invalid config: {e}")))
    }

    /// Rewrite `loko.toml`, preserving unrecognized top-level keys by
    /// loading the existing document (if any) and overlaying recognized
    /// sections onto it rather than emitting a fresh file from scratch.
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut doc: DocumentMut = if path.exists() {
            std::fs::read_to_string(path)
                .map_err(|e| LokoError::io(path, e))?
                .parse()
                .map_err(|e| LokoError::parse(path, None, format!("invalid TOML: {e}")))?
        } else {
            DocumentMut::new()
        };

        set_table(&mut doc, "project", |t| {
            t["name"] = value(self.project.name.clone());
            t["description"] = value(self.project.description.clone());
            t["version"] = value(self.project.version.clone());
        });
        set_table(&mut doc, "paths", |t| {
            t["source"] = value(self.paths.source.clone());
            t["output"] = value(self.paths.output.clone());
        });
        set_table(&mut doc, "d2", |t| {
            t["theme"] = value(self.d2.theme.clone());
            t["layout"] = value(self.d2.layout.clone());
            t["cache"] = value(self.d2.cache);
        });
        set_table(&mut doc, "outputs", |t| {
            t["html"] = value(self.outputs.html);
            t["markdown"] = value(self.outputs.markdown);
            t["pdf"] = value(self.outputs.pdf);
        });
        set_table(&mut doc, "build", |t| {
            t["parallel"] = value(self.build.parallel);
            t["max_workers"] = value(self.build.max_workers as i64);
        });
        set_table(&mut doc, "server", |t| {
            t["serve_port"] = value(self.server.serve_port as i64);
            t["api_port"] = value(self.server.api_port as i64);
            t["hot_reload"] = value(self.server.hot_reload);
        });
        if let Some(default_template) = &self.templates.default {
            set_table(&mut doc, "templates", |t| {
                t["default"] = value(default_template.clone());
            });
        }

        let tmp = path.with_extension("toml.tmp");
        std::fs::write(&tmp, doc.to_string()).map_err(|e| LokoError::io(&tmp, e))?;
        std::fs::rename(&tmp, path).map_err(|e| LokoError::io(path, e))?;
        Ok(())
    }

    /// Apply `LOKO_*` environment variable overrides.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(theme) = std::env::var("LOKO_D2_THEME") {
            self.d2.theme = theme;
        }
        if let Ok(layout) = std::env::var("LOKO_D2_LAYOUT") {
            self.d2.layout = layout;
        }
        if let Ok(out) = std::env::var("LOKO_OUTPUT_DIR") {
            self.paths.output = out;
        }
        if let Ok(port) = std::env::var("LOKO_SERVER_SERVE_PORT") {
            if let Ok(port) = port.parse() {
                self.server.serve_port = port;
            }
        }
    }
}

fn set_table(doc: &mut DocumentMut, name: &str, f: impl FnOnce(&mut Table)) {
    if !doc.contains_table(name) {
        doc[name] = toml_edit::table();
    }
    if let Some(table) = doc[name].as_table_mut() {
        f(table);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let c = Config::new("acme");
        assert_eq!(c.paths.source, "src");
        assert_eq!(c.paths.output, "dist");
        assert_eq!(c.build.max_workers, 4);
        assert!(c.outputs.html);
        assert!(!c.outputs.pdf);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("loko.toml");
        let config = Config::load(&path, "acme").unwrap();
        assert_eq!(config.project.name, "acme");
    }

    #[test]
    fn save_then_load_roundtrips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("loko.toml");
        let mut config = Config::new("acme");
        config.d2.theme = "neutral".to_string();
        config.save(&path).unwrap();

        let loaded = Config::load(&path, "ignored").unwrap();
        assert_eq!(loaded.project.name, "acme");
        assert_eq!(loaded.d2.theme, "neutral");
    }

    #[test]
    fn save_preserves_unknown_sections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("loko.toml");
        std::fs::write(
            &path,
            "[project]\nname = \"acme\"\nversion = \"0.1.0\"\ndescription = \"\"\n\n[mystery]\nkeep = true\n",
        )
        .unwrap();

        let config = Config::load(&path, "acme").unwrap();
        config.save(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("[mystery]"));
        assert!(text.contains("keep = true"));
    }

    #[test]
    fn env_overrides_apply() {
        std::env::set_var("LOKO_D2_THEME", "dark");
        let mut config = Config::new("acme");
        config.apply_env_overrides();
        assert_eq!(config.d2.theme, "dark");
        std::env::remove_var("LOKO_D2_THEME");
    }
}

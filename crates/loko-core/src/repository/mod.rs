//! Project repository: all filesystem I/O for the project tree.

pub mod frontmatter;

use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::entities::{Component, Container, Diagram, Project, System};
use crate::error::{LokoError, Result};
use crate::id::is_valid_slug;
use crate::report::Report;

const CONFIG_FILE: &str = "loko.toml";

/// Filesystem-backed implementation of the project repository contract.
pub struct FsRepository;

impl FsRepository {
    /// Atomic write: write to a unique temp file, then rename over `path`.
    /// Creates parent directories as needed.
    fn write_atomic(path: &Path, contents: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| LokoError::io(parent, e))?;
        }
        let mut tmp_name = path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        tmp_name.push(format!(".tmp-{}", std::process::id()));
        let tmp = path.with_file_name(tmp_name);
        std::fs::write(&tmp, contents).map_err(|e| LokoError::io(&tmp, e))?;
        std::fs::rename(&tmp, path).map_err(|e| LokoError::io(path, e))?;
        Ok(())
    }

    pub fn config_path(root: &Path) -> PathBuf {
        root.join(CONFIG_FILE)
    }

    pub fn load_config(root: &Path, fallback_name: &str) -> Result<Config> {
        let mut config = Config::load(&Self::config_path(root), fallback_name)?;
        config.apply_env_overrides();
        Ok(config)
    }

    pub fn save_config(root: &Path, config: &Config) -> Result<()> {
        config.save(&Self::config_path(root))
    }

    /// Loads the whole project tree. Per-entity parse failures are logged as
    /// warnings on the returned report and that entity is skipped — sibling
    /// loading always continues.
    pub fn load_project(root: &Path, fallback_name: &str) -> Result<(Project, Report)> {
        let config = Self::load_config(root, fallback_name)?;
        let mut project = Project::new(root.to_path_buf(), config);
        let mut report = Report::new();

        let src_dir = project.source_dir();
        if !src_dir.exists() {
            return Ok((project, report));
        }

        for system_id in Self::list_child_dirs(&src_dir)? {
            match Self::load_system(root, &project.config.paths.source, &system_id) {
                Ok(system) => {
                    project.systems.insert(system_id, system);
                }
                Err(e) => report.warn(format!("skipping system '{system_id}': {e}")),
            }
        }

        Ok((project, report))
    }

    fn list_child_dirs(dir: &Path) -> Result<Vec<String>> {
        let mut names = Vec::new();
        let entries = std::fs::read_dir(dir).map_err(|e| LokoError::io(dir, e))?;
        for entry in entries {
            let entry = entry.map_err(|e| LokoError::io(dir, e))?;
            if entry.path().is_dir() {
                if let Some(name) = entry.file_name().to_str() {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    fn system_dir(root: &Path, source: &str, id: &str) -> PathBuf {
        root.join(source).join(id)
    }

    fn container_dir(root: &Path, source: &str, system_id: &str, id: &str) -> PathBuf {
        Self::system_dir(root, source, system_id).join(id)
    }

    fn component_dir(
        root: &Path,
        source: &str,
        system_id: &str,
        container_id: &str,
        id: &str,
    ) -> PathBuf {
        Self::container_dir(root, source, system_id, container_id).join(id)
    }

    pub fn load_system(root: &Path, source: &str, id: &str) -> Result<System> {
        let dir = Self::system_dir(root, source, id);
        let md_path = dir.join("system.md");
        let (fm, body) = Self::read_entity_md(&md_path, id)?;
        let mut system = System::from_front_matter(id.to_string(), fm, body);
        system.diagram = Self::load_system_diagram(root, source, id)?;

        for container_id in Self::list_child_dirs(&dir).unwrap_or_default() {
            match Self::load_container(root, source, id, &container_id) {
                Ok(container) => {
                    system.containers.insert(container_id, container);
                }
                Err(e) if is_parse_or_notfound(&e) => {
                    // malformed/empty child directory: skip, don't abort siblings
                    let _ = e;
                }
                Err(e) => return Err(e),
            }
        }
        Ok(system)
    }

    pub fn load_container(root: &Path, source: &str, system_id: &str, id: &str) -> Result<Container> {
        let dir = Self::container_dir(root, source, system_id, id);
        let md_path = dir.join("container.md");
        let (fm, body) = Self::read_entity_md(&md_path, id)?;
        let mut container = Container::from_front_matter(id.to_string(), fm, body);

        let d2_path = dir.join("container.d2");
        if d2_path.exists() {
            let src = std::fs::read_to_string(&d2_path).map_err(|e| LokoError::io(&d2_path, e))?;
            container.diagram = Some(Diagram::new(src));
        }

        for component_id in Self::list_child_dirs(&dir).unwrap_or_default() {
            match Self::load_component(root, source, system_id, id, &component_id) {
                Ok(component) => {
                    container.components.insert(component_id, component);
                }
                Err(e) if is_parse_or_notfound(&e) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(container)
    }

    pub fn load_component(
        root: &Path,
        source: &str,
        system_id: &str,
        container_id: &str,
        id: &str,
    ) -> Result<Component> {
        let dir = Self::component_dir(root, source, system_id, container_id, id);
        let md_path = dir.join("component.md");
        let (fm, body) = Self::read_entity_md(&md_path, id)?;
        let mut component = Component::from_front_matter(id.to_string(), fm, body);
        component.diagram = Self::load_component_diagram(root, source, system_id, container_id, id)?;
        Ok(component)
    }

    /// Reads a component/container's own diagram source, named
    /// `<componentID>.d2` for components.
    pub fn load_component_diagram(
        root: &Path,
        source: &str,
        system_id: &str,
        container_id: &str,
        id: &str,
    ) -> Result<Option<Diagram>> {
        let dir = Self::component_dir(root, source, system_id, container_id, id);
        let d2_path = dir.join(format!("{id}.d2"));
        if !d2_path.exists() {
            return Ok(None);
        }
        let src = std::fs::read_to_string(&d2_path).map_err(|e| LokoError::io(&d2_path, e))?;
        Ok(Some(Diagram::new(src)))
    }

    /// Reads the system's own top-level diagram (`system.d2`), if present.
    pub fn load_system_diagram(root: &Path, source: &str, id: &str) -> Result<Option<Diagram>> {
        let path = Self::system_dir(root, source, id).join("system.d2");
        if !path.exists() {
            return Ok(None);
        }
        let src = std::fs::read_to_string(&path).map_err(|e| LokoError::io(&path, e))?;
        Ok(Some(Diagram::new(src)))
    }

    fn read_entity_md(
        path: &Path,
        fallback_name: &str,
    ) -> Result<(crate::entities::FrontMatter, String)> {
        if !path.exists() {
            return Err(LokoError::NotFound(path.display().to_string()));
        }
        let text = std::fs::read_to_string(path).map_err(|e| LokoError::io(path, e))?;
        let (mut fm, body) = frontmatter::parse(&text, path)?;
        if fm.get("name").is_none() {
            fm.insert(
                "name",
                crate::entities::FrontMatterValue::Scalar(fallback_name.to_string()),
            );
        }
        Ok((fm, body))
    }

    pub fn save_system(root: &Path, source: &str, system: &System) -> Result<()> {
        validate_name(&system.id)?;
        let dir = Self::system_dir(root, source, &system.id);
        let fm = system.to_front_matter();
        let text = frontmatter::serialize(&fm, &system.body);
        Self::write_atomic(&dir.join("system.md"), &text)?;
        if let Some(diagram) = &system.diagram {
            Self::write_atomic(&dir.join("system.d2"), &diagram.source)?;
        }
        Ok(())
    }

    pub fn save_container(
        root: &Path,
        source: &str,
        system_id: &str,
        container: &Container,
    ) -> Result<()> {
        validate_name(&container.id)?;
        let dir = Self::container_dir(root, source, system_id, &container.id);
        let fm = container.to_front_matter();
        let text = frontmatter::serialize(&fm, &container.body);
        Self::write_atomic(&dir.join("container.md"), &text)?;
        if let Some(diagram) = &container.diagram {
            Self::write_atomic(&dir.join("container.d2"), &diagram.source)?;
        }
        Ok(())
    }

    pub fn save_component(
        root: &Path,
        source: &str,
        system_id: &str,
        container_id: &str,
        component: &Component,
    ) -> Result<()> {
        validate_name(&component.id)?;
        let dir = Self::component_dir(root, source, system_id, container_id, &component.id);
        let fm = component.to_front_matter();
        let text = frontmatter::serialize(&fm, &component.body);
        Self::write_atomic(&dir.join("component.md"), &text)?;
        if let Some(diagram) = &component.diagram {
            Self::write_atomic(&dir.join(format!("{}.d2", component.id)), &diagram.source)?;
        }
        Ok(())
    }

    pub fn save_diagram_source(path: &Path, source: &str) -> Result<()> {
        Self::write_atomic(path, source)
    }

    pub fn list_systems(root: &Path, source: &str) -> Result<Vec<String>> {
        Self::list_child_dirs(&root.join(source))
    }

    pub fn delete_system(root: &Path, source: &str, id: &str) -> Result<()> {
        let dir = Self::system_dir(root, source, id);
        if dir.exists() {
            std::fs::remove_dir_all(&dir).map_err(|e| LokoError::io(&dir, e))?;
        }
        Ok(())
    }

    pub fn delete_container(root: &Path, source: &str, system_id: &str, id: &str) -> Result<()> {
        let dir = Self::container_dir(root, source, system_id, id);
        if dir.exists() {
            std::fs::remove_dir_all(&dir).map_err(|e| LokoError::io(&dir, e))?;
        }
        Ok(())
    }

    pub fn delete_component(
        root: &Path,
        source: &str,
        system_id: &str,
        container_id: &str,
        id: &str,
    ) -> Result<()> {
        let dir = Self::component_dir(root, source, system_id, container_id, id);
        if dir.exists() {
            std::fs::remove_dir_all(&dir).map_err(|e| LokoError::io(&dir, e))?;
        }
        Ok(())
    }
}

fn validate_name(id: &str) -> Result<()> {
    if !is_valid_slug(id) {
        return Err(LokoError::InvalidName(id.to_string()));
    }
    Ok(())
}

fn is_parse_or_notfound(e: &LokoError) -> bool {
    matches!(e, LokoError::NotFound(_) | LokoError::ParseError { .. })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(path: &Path, contents: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn load_project_builds_full_tree() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(
            &root.join("loko.toml"),
            "[project]\nname = \"acme\"\nversion = \"0.1.0\"\ndescription = \"\"\n",
        );
        write(
            &root.join("src/payments/system.md"),
            "---\nname: Payments\ndescription: Handles money\n---\n",
        );
        write(
            &root.join("src/payments/api/container.md"),
            "---\nname: API\ntechnology: Go + Fiber\n---\n",
        );
        write(
            &root.join("src/payments/api/charge/component.md"),
            "---\nname: Charge\ntechnology: Lambda\nrelationships:\n  b: reads\n---\n",
        );

        let (project, report) = FsRepository::load_project(root, "acme").unwrap();
        assert!(report.errors.is_empty());
        let system = project.systems.get("payments").unwrap();
        assert_eq!(system.name, "Payments");
        let container = system.containers.get("api").unwrap();
        assert_eq!(container.technology.as_deref(), Some("Go + Fiber"));
        let component = container.components.get("charge").unwrap();
        assert_eq!(component.relationships.len(), 1);
    }

    #[test]
    fn load_project_skips_malformed_entity_but_continues() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(&root.join("loko.toml"), "[project]\nname = \"acme\"\n");
        write(
            &root.join("src/good/system.md"),
            "---\nname: Good\n---\n",
        );
        write(
            &root.join("src/bad/system.md"),
            "---\nname: Bad\n", // unterminated fence
        );

        let (project, report) = FsRepository::load_project(root, "acme").unwrap();
        assert!(project.systems.contains_key("good"));
        assert!(!project.systems.contains_key("bad"));
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn save_system_is_atomic_and_roundtrips() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        let mut system = System::from_front_matter(
            "payments".to_string(),
            crate::entities::FrontMatter::new(),
            String::new(),
        );
        system.name = "Payments".to_string();
        system.description = "Handles money".to_string();
        FsRepository::save_system(root, "src", &system).unwrap();

        let loaded = FsRepository::load_system(root, "src", "payments").unwrap();
        assert_eq!(loaded.name, "Payments");
        assert_eq!(loaded.description, "Handles money");
    }

    #[test]
    fn save_rejects_invalid_name() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        let mut system = System::from_front_matter(
            "Not Valid".to_string(),
            crate::entities::FrontMatter::new(),
            String::new(),
        );
        system.id = "Not Valid".to_string();
        let err = FsRepository::save_system(root, "src", &system).unwrap_err();
        assert!(matches!(err, LokoError::InvalidName(_)));
    }
}

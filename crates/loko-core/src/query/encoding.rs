//! JSON and tabular encodings of a `Projection`.
//!
//! The tabular format is written directly against each projection's typed
//! shape (not via a generic `serde_json::Value` walk) so field order is
//! exactly the struct's declaration order regardless of the JSON map's
//! iteration order.

use serde::{Deserialize, Serialize};

use crate::error::{LokoError, Result};

use super::projection::{
    ComponentFull, ContainerFull, FullProjection, Projection, StructureProjection, SummaryProjection,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Format {
    Json,
    Tabular,
}

pub fn encode(projection: &Projection, format: Format) -> Result<String> {
    match format {
        Format::Json => serde_json::to_string_pretty(projection)
            .map_err(|e| LokoError::InvalidArgument(format!("failed to encode projection: {e}"))),
        Format::Tabular => Ok(encode_tabular(projection)),
    }
}

fn encode_tabular(projection: &Projection) -> String {
    let mut out = String::new();
    match projection {
        Projection::Summary(s) => write_summary(&mut out, s),
        Projection::Structure(s) => write_structure(&mut out, s),
        Projection::Full(f) => write_full(&mut out, f, 0),
    }
    out
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str("  ");
    }
}

fn scalar(out: &mut String, depth: usize, key: &str, value: impl std::fmt::Display) {
    indent(out, depth);
    out.push_str(key);
    out.push(' ');
    out.push_str(&value.to_string());
    out.push('\n');
}

fn array_header(out: &mut String, depth: usize, name: &str, count: usize, fields: &[&str]) {
    indent(out, depth);
    out.push_str(&format!("{name}[{count}]{{{}}}\n", fields.join(",")));
}

fn row(out: &mut String, depth: usize, values: &[String]) {
    indent(out, depth);
    out.push_str(&values.join(","));
    out.push('\n');
}

fn write_summary(out: &mut String, s: &SummaryProjection) {
    scalar(out, 0, "systems", s.systems);
    scalar(out, 0, "containers", s.containers);
    scalar(out, 0, "components", s.components);
    scalar(out, 0, "diagrams", s.diagrams);
    array_header(out, 0, "system_names", s.system_names.len(), &["name"]);
    for name in &s.system_names {
        row(out, 0, &[name.clone()]);
    }
}

fn write_structure(out: &mut String, s: &StructureProjection) {
    array_header(out, 0, "systems", s.systems.len(), &["id", "name"]);
    for system in &s.systems {
        row(out, 0, &[system.id.clone(), system.name.clone()]);
        array_header(out, 1, "containers", system.containers.len(), &["id", "name", "technology"]);
        for container in &system.containers {
            row(
                out,
                1,
                &[
                    container.id.clone(),
                    container.name.clone(),
                    container.technology.clone().unwrap_or_default(),
                ],
            );
        }
    }
}

fn write_full(out: &mut String, projection: &FullProjection, depth: usize) {
    match projection {
        FullProjection::System(system) => {
            scalar(out, depth, "id", &system.id);
            scalar(out, depth, "name", &system.name);
            scalar(out, depth, "description", &system.description);
            array_header(out, depth, "containers", system.containers.len(), &["id", "name"]);
            for container in &system.containers {
                row(out, depth, &[container.id.clone(), container.name.clone()]);
                write_container_body(out, container, depth + 1);
            }
        }
        FullProjection::Container(container) => {
            scalar(out, depth, "id", &container.id);
            scalar(out, depth, "name", &container.name);
            scalar(out, depth, "description", &container.description);
            write_container_body(out, container, depth);
        }
        FullProjection::Component(component) => write_component_body(out, component, depth),
    }
}

fn write_container_body(out: &mut String, container: &ContainerFull, depth: usize) {
    array_header(out, depth, "components", container.components.len(), &["id", "name"]);
    for component in &container.components {
        row(out, depth, &[component.id.clone(), component.name.clone()]);
        write_component_body(out, component, depth + 1);
    }
}

fn write_component_body(out: &mut String, component: &ComponentFull, depth: usize) {
    scalar(out, depth, "technology", component.technology.clone().unwrap_or_default());
    array_header(out, depth, "relationships", component.relationships.len(), &["target", "label", "type"]);
    for rel in &component.relationships {
        row(out, depth, &[rel.target.clone(), rel.label.clone(), rel.edge_type.clone()]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::projection::SummaryProjection;

    #[test]
    fn tabular_summary_has_scalar_lines_and_array_header() {
        let projection = Projection::Summary(SummaryProjection {
            systems: 2,
            containers: 3,
            components: 5,
            diagrams: 4,
            system_names: vec!["Payments".into(), "Orders".into()],
        });
        let out = encode(&projection, Format::Tabular).unwrap();
        assert!(out.contains("systems 2"));
        assert!(out.contains("system_names[2]{name}"));
        assert!(out.contains("Payments"));
    }

    #[test]
    fn json_encoding_round_trips_through_serde_value() {
        let projection = Projection::Summary(SummaryProjection {
            systems: 1,
            containers: 0,
            components: 0,
            diagrams: 0,
            system_names: vec!["Payments".into()],
        });
        let out = encode(&projection, Format::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["systems"], 1);
    }
}

//! Scaffold preview: wraps a not-yet-saved component's name/technology and
//! its container's name into a minimal diagram stub for immediate render
//! feedback.

/// Builds a one-node diagram source suitable for immediate rendering. Not
/// saved to disk — only used to give the scaffold flow a preview SVG before
/// the real diagram is authored.
pub fn stub_source(component_name: &str, technology: Option<&str>, container_name: &str) -> String {
    let label = match technology {
        Some(tech) if !tech.is_empty() => format!("{component_name}\\n[{tech}]"),
        _ => component_name.to_string(),
    };
    format!(
        "{container} {{\n  preview: \"{label}\"\n}}\n",
        container = slug_or_quote(container_name),
        label = label,
    )
}

fn slug_or_quote(name: &str) -> String {
    if name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') && !name.is_empty() {
        name.to_string()
    } else {
        format!("\"{name}\"")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stub_includes_technology() {
        let src = stub_source("Charge", Some("Lambda"), "api");
        assert!(src.contains("Charge"));
        assert!(src.contains("Lambda"));
        assert!(src.starts_with("api {"));
    }

    #[test]
    fn stub_without_technology() {
        let src = stub_source("Charge", None, "api");
        assert!(src.contains("preview: \"Charge\""));
    }
}

//! The variable set recognized by `{{Name}}` placeholders.

use indexmap::IndexMap;

#[derive(Debug, Clone, Default)]
pub struct TemplateVars(IndexMap<&'static str, String>);

impl TemplateVars {
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    pub fn set(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.0.insert(key, value.into());
        self
    }

    pub fn set_opt(self, key: &'static str, value: Option<&str>) -> Self {
        self.set(key, value.unwrap_or_default())
    }

    /// Substitutes every `{{Name}}` occurrence found in `self`'s variable
    /// set; unknown placeholders are left untouched and render literally.
    pub fn render(&self, template: &str) -> String {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;
        loop {
            match rest.find("{{") {
                None => {
                    out.push_str(rest);
                    break;
                }
                Some(start) => {
                    out.push_str(&rest[..start]);
                    let after = &rest[start + 2..];
                    match after.find("}}") {
                        None => {
                            out.push_str(&rest[start..]);
                            break;
                        }
                        Some(end) => {
                            let name = &after[..end];
                            match self.0.get(name) {
                                Some(value) => out.push_str(value),
                                None => {
                                    out.push_str("{{");
                                    out.push_str(name);
                                    out.push_str("}}");
                                }
                            }
                            rest = &after[end + 2..];
                        }
                    }
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_known_variables() {
        let vars = TemplateVars::new().set("SystemName", "Payments");
        assert_eq!(vars.render("# {{SystemName}}"), "# Payments");
    }

    #[test]
    fn unknown_variables_render_literally() {
        let vars = TemplateVars::new().set("SystemName", "Payments");
        assert_eq!(vars.render("{{Mystery}}"), "{{Mystery}}");
    }

    #[test]
    fn set_opt_defaults_to_empty() {
        let vars = TemplateVars::new().set_opt("Database", None);
        assert_eq!(vars.render("{{Database}}"), "");
    }
}

//! Slug IDs and qualified-ID helpers.

/// Lowercases `name` and replaces runs of non `[a-z0-9]` characters with a
/// single `-`, trimming leading/trailing hyphens.
pub fn slugify(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut last_was_sep = true; // suppress leading hyphen
    for ch in name.chars() {
        let lower = ch.to_ascii_lowercase();
        if lower.is_ascii_alphanumeric() {
            out.push(lower);
            last_was_sep = false;
        } else if !last_was_sep {
            out.push('-');
            last_was_sep = true;
        }
    }
    while out.ends_with('-') {
        out.pop();
    }
    out
}

/// True if `id` is already a well-formed slug (lowercase alphanumerics and
/// single hyphens, no leading/trailing/doubled hyphen).
pub fn is_valid_slug(id: &str) -> bool {
    if id.is_empty() || id.starts_with('-') || id.ends_with('-') || id.contains("--") {
        return false;
    }
    id.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

/// Builds a qualified ID from ancestor slugs, e.g. `["payments", "api"]` ->
/// `"payments/api"`.
pub fn qualify(segments: &[&str]) -> String {
    segments.join("/")
}

/// The last path segment of a qualified ID (the "short ID").
pub fn short_id(qualified: &str) -> &str {
    qualified.rsplit('/').next().unwrap_or(qualified)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_basic() {
        assert_eq!(slugify("Payments API"), "payments-api");
        assert_eq!(slugify("Charge!!"), "charge");
        assert_eq!(slugify("  leading"), "leading");
        assert_eq!(slugify("multi   space"), "multi-space");
    }

    #[test]
    fn valid_slug_rules() {
        assert!(is_valid_slug("api-lambda"));
        assert!(!is_valid_slug("-api"));
        assert!(!is_valid_slug("api-"));
        assert!(!is_valid_slug("api--lambda"));
        assert!(!is_valid_slug("API"));
    }

    #[test]
    fn short_id_is_last_segment() {
        assert_eq!(short_id("payments/api/charge"), "charge");
        assert_eq!(short_id("payments"), "payments");
    }
}

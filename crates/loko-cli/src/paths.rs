//! Resolution of loko's config/data/cache directories from XDG-style
//! environment variables, with an `LOKO_CONFIG_HOME` override.
//!
//! `LOKO_CONFIG_HOME` takes priority over the generic `XDG_*` variables,
//! which in turn take priority over the OS-appropriate default from `dirs`.

use std::path::PathBuf;

pub fn config_home() -> PathBuf {
    if let Some(p) = std::env::var_os("LOKO_CONFIG_HOME") {
        return PathBuf::from(p);
    }
    if let Some(p) = std::env::var_os("XDG_CONFIG_HOME") {
        return PathBuf::from(p).join("loko");
    }
    dirs::config_dir().unwrap_or_else(std::env::temp_dir).join("loko")
}

pub fn data_home() -> PathBuf {
    if let Some(p) = std::env::var_os("XDG_DATA_HOME") {
        return PathBuf::from(p).join("loko");
    }
    dirs::data_dir().unwrap_or_else(std::env::temp_dir).join("loko")
}

pub fn cache_home() -> PathBuf {
    if let Some(p) = std::env::var_os("XDG_CACHE_HOME") {
        return PathBuf::from(p).join("loko");
    }
    dirs::cache_dir().unwrap_or_else(std::env::temp_dir).join("loko")
}

/// `LOKO_TEMPLATE_DIR`, if set, overrides the template search root ahead of
/// any on-disk or embedded pack.
pub fn template_override_dir() -> Option<PathBuf> {
    std::env::var_os("LOKO_TEMPLATE_DIR").map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loko_config_home_takes_priority() {
        std::env::set_var("LOKO_CONFIG_HOME", "/tmp/loko-test-config");
        assert_eq!(config_home(), PathBuf::from("/tmp/loko-test-config"));
        std::env::remove_var("LOKO_CONFIG_HOME");
    }
}

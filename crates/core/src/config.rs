//! Configuration discovery and loading.
//!
//! Both binaries layer their settings the same way: CLI flags beat
//! environment variables, which beat a TOML config file, which beats the
//! built-in defaults. This module handles the file part: finding it in the
//! standard locations and parsing it.

use std::env;
use std::fs;
use std::path::PathBuf;

use serde::de::DeserializeOwned;

use crate::APP_NAME;

/// Where the active configuration came from.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigSource {
    /// Path given explicitly via a CLI flag or env var
    Explicit(PathBuf),
    /// Found in the current working directory
    CurrentDir(PathBuf),
    /// Found under $XDG_CONFIG_HOME (or ~/.config) in the app directory
    XdgConfig(PathBuf),
    /// Found under /etc/meteo-trends/
    System(PathBuf),
    /// No config file anywhere, running on defaults
    Defaults,
}

impl ConfigSource {
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            ConfigSource::Explicit(p)
            | ConfigSource::CurrentDir(p)
            | ConfigSource::XdgConfig(p)
            | ConfigSource::System(p) => Some(p),
            ConfigSource::Defaults => None,
        }
    }
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.path() {
            Some(p) => write!(f, "{}", p.display()),
            None => write!(f, "(defaults)"),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Read(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Locate a config file, checking in order: the `env_var` override, the
/// current directory, the XDG config directory, then `/etc/meteo-trends/`.
/// `filename` is the per-binary name, e.g. `pipeline.toml`.
pub fn find_config_file(env_var: &str, filename: &str) -> ConfigSource {
    if let Ok(path) = env::var(env_var) {
        let p = PathBuf::from(&path);
        if p.exists() {
            return ConfigSource::Explicit(p);
        }
    }

    let local = PathBuf::from(filename);
    if local.exists() {
        return ConfigSource::CurrentDir(local);
    }

    let xdg = xdg_config_path(filename);
    if xdg.exists() {
        return ConfigSource::XdgConfig(xdg);
    }

    let system = PathBuf::from(format!("/etc/{}/{}", APP_NAME, filename));
    if system.exists() {
        return ConfigSource::System(system);
    }

    ConfigSource::Defaults
}

fn xdg_config_path(filename: &str) -> PathBuf {
    let base = match env::var("XDG_CONFIG_HOME") {
        Ok(xdg) => PathBuf::from(xdg),
        // No HOME either means the path simply won't exist, which is fine
        Err(_) => PathBuf::from(env::var("HOME").unwrap_or_default()).join(".config"),
    };
    base.join(APP_NAME).join(filename)
}

/// Parse the TOML file behind `source` into `T`. A `Defaults` source
/// yields `T::default()` without touching the filesystem.
pub fn load_config<T: DeserializeOwned + Default>(source: &ConfigSource) -> Result<T, ConfigError> {
    match source.path() {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            Ok(toml::from_str(&content)?)
        }
        None => Ok(T::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[derive(Default, serde::Deserialize, PartialEq, Debug)]
    struct Dummy {
        value: Option<String>,
    }

    #[test]
    fn test_config_source_display() {
        let source = ConfigSource::CurrentDir(PathBuf::from("pipeline.toml"));
        assert_eq!(format!("{}", source), "pipeline.toml");

        let source = ConfigSource::Defaults;
        assert_eq!(format!("{}", source), "(defaults)");
    }

    #[test]
    fn test_load_config_defaults_when_missing() {
        let config: Dummy = load_config(&ConfigSource::Defaults).unwrap();
        assert_eq!(config, Dummy::default());
    }

    #[test]
    fn test_load_config_reads_explicit_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "value = \"hello\"").unwrap();

        let source = ConfigSource::Explicit(file.path().to_path_buf());
        let config: Dummy = load_config(&source).unwrap();
        assert_eq!(config.value.as_deref(), Some("hello"));
    }

    #[test]
    fn test_load_config_surfaces_parse_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "value = [not toml").unwrap();

        let source = ConfigSource::Explicit(file.path().to_path_buf());
        let result: Result<Dummy, _> = load_config(&source);
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_config_surfaces_read_errors() {
        let source = ConfigSource::Explicit(PathBuf::from("/no/such/meteo.toml"));
        let result: Result<Dummy, _> = load_config(&source);
        assert!(matches!(result, Err(ConfigError::Read(_))));
    }
}

//! Configuration loading from disk.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::schema::ProxyConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Why a configuration file could not be turned into a [`ProxyConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ProxyConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config: ProxyConfig = toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_valid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "port = 9100\nregistry = \"http://registry:8081\"").unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.port, 9100);
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/nonexistent/proxy.toml")).unwrap_err();
        assert!(matches!(&err, ConfigError::Io { path, .. } if path == Path::new("/nonexistent/proxy.toml")));
        assert!(err.to_string().contains("/nonexistent/proxy.toml"));
    }

    #[test]
    fn test_unparsable_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "port = \"eighty\"").unwrap();
        assert!(matches!(load_config(file.path()), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_invalid_registry() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "registry = \"registry without scheme\"").unwrap();

        let err = load_config(file.path()).unwrap_err();
        assert!(err.to_string().starts_with("Validation failed: cannot parse registry url"));
    }
}

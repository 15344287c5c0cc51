//! Configuration loading from disk.

use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::schema::BalancerConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Values supplied on the command line that replace file settings.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    /// Replaces the configured backend list when non-empty.
    pub backends: Vec<String>,
    pub bind_address: Option<String>,
}

impl Overrides {
    pub fn apply(self, config: &mut BalancerConfig) {
        if !self.backends.is_empty() {
            config.backends = self.backends;
        }
        if let Some(bind) = self.bind_address {
            config.listener.bind_address = bind;
        }
    }
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<BalancerConfig, ConfigError> {
    let config = read_config(path)?;
    checked(config)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<BalancerConfig, ConfigError> {
    checked(toml::from_str(content)?)
}

/// Build the effective configuration: file (or defaults), then overrides,
/// then a single validation pass.
pub fn resolve_config(path: Option<&Path>, overrides: Overrides) -> Result<BalancerConfig, ConfigError> {
    let mut config = match path {
        Some(path) => read_config(path)?,
        None => BalancerConfig::default(),
    };
    overrides.apply(&mut config);
    checked(config)
}

/// Read a TOML file without validating it.
fn read_config(path: &Path) -> Result<BalancerConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

fn checked(config: BalancerConfig) -> Result<BalancerConfig, ConfigError> {
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.backends, vec!["http://localhost:8000".to_string()]);
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert_eq!(config.health_check.interval_secs, 10);
        assert_eq!(config.health_check.timeout_secs, 3);
        assert_eq!(config.health_check.path, "/health");
        assert!(!config.observability.metrics_enabled);
    }

    #[test]
    fn partial_document_keeps_other_defaults() {
        let config = parse_config(
            r#"
            backends = ["http://10.0.0.1:8000", "http://10.0.0.2:8000"]

            [health_check]
            interval_secs = 2
            "#,
        )
        .unwrap();

        assert_eq!(config.backends.len(), 2);
        assert_eq!(config.health_check.interval_secs, 2);
        assert_eq!(config.health_check.timeout_secs, 3);
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
    }

    #[test]
    fn syntax_error_is_parse_error() {
        let err = parse_config("backends = [").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn semantic_error_is_validation_error() {
        let err = parse_config("[health_check]\ntimeout_secs = 0\n").unwrap_err();
        match err {
            ConfigError::Validation(errors) => {
                assert_eq!(errors, vec![ValidationError::ZeroTimeout]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    fn write_temp(name: &str, content: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("rr-balancer-{}-{}.toml", name, std::process::id()));
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn overrides_complete_an_incomplete_file() {
        let path = write_temp(
            "incomplete",
            "backends = []\n\n[listener]\nbind_address = \"to-be-replaced\"\n",
        );

        let config = resolve_config(
            Some(&path),
            Overrides {
                backends: vec!["http://10.0.0.9:8000".into()],
                bind_address: Some("127.0.0.1:9999".into()),
            },
        )
        .unwrap();
        assert_eq!(config.backends, vec!["http://10.0.0.9:8000".to_string()]);
        assert_eq!(config.listener.bind_address, "127.0.0.1:9999");

        let err = resolve_config(Some(&path), Overrides::default()).unwrap_err();
        match err {
            ConfigError::Validation(errors) => assert_eq!(
                errors,
                vec![
                    ValidationError::BindAddress("to-be-replaced".into()),
                    ValidationError::NoBackends,
                ]
            ),
            other => panic!("unexpected error: {other}"),
        }

        fs::remove_file(path).unwrap();
    }

    #[test]
    fn backend_override_replaces_file_list() {
        let path = write_temp("replace", "backends = [\"http://10.0.0.1:8000\", \"http://10.0.0.2:8000\"]\n");

        let config = resolve_config(
            Some(&path),
            Overrides {
                backends: vec!["http://10.0.0.3:8000".into()],
                bind_address: None,
            },
        )
        .unwrap();
        assert_eq!(config.backends, vec!["http://10.0.0.3:8000".to_string()]);
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");

        fs::remove_file(path).unwrap();
    }

    #[test]
    fn no_file_means_defaults_plus_overrides() {
        let config = resolve_config(
            None,
            Overrides {
                backends: Vec::new(),
                bind_address: Some("127.0.0.1:0".into()),
            },
        )
        .unwrap();
        assert_eq!(config.backends, BalancerConfig::default().backends);
        assert_eq!(config.listener.bind_address, "127.0.0.1:0");
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_config(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}

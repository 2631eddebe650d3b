use std::env;

use url::Url;

use crate::application::services::pipeline_commands::CommandSpec;
use crate::application::services::pipeline_orchestrator::PipelineCommands;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_POOL_SIZE: u32 = 10;
pub const DEFAULT_EXTRACTION_COMMAND: &str = "python3 core/scripts/extract_data.py";
pub const DEFAULT_GRAPH_COMMAND: &str = "python3 core/scripts/create_graph.py";
pub const DEFAULT_API_URL: &str = "http://localhost:3000";
pub const DEFAULT_UPLOAD_BODY_LIMIT_MB: usize = 250;

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid { key: &'static str, message: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "{} must be set", key),
            ConfigError::Invalid { key, message } => write!(f, "Invalid {}: {}", key, message),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Process-wide settings read once at start-up.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub database_pool_size: u32,
    pub port: u16,
    pub extraction_command: CommandSpec,
    pub graph_command: CommandSpec,
    pub api_url: Url,
    pub upload_body_limit_mb: usize,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let database_url = value("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let port = parse_or("PORT", value("PORT"), DEFAULT_PORT)?;
        let database_pool_size =
            parse_or("DATABASE_POOL_SIZE", value("DATABASE_POOL_SIZE"), DEFAULT_POOL_SIZE)?;
        if database_pool_size == 0 {
            return Err(ConfigError::Invalid {
                key: "DATABASE_POOL_SIZE",
                message: "must be at least 1".to_string(),
            });
        }
        let upload_body_limit_mb = parse_or(
            "UPLOAD_BODY_LIMIT_MB",
            value("UPLOAD_BODY_LIMIT_MB"),
            DEFAULT_UPLOAD_BODY_LIMIT_MB,
        )?;

        let extraction_command = command(
            "EXTRACTION_COMMAND",
            value("EXTRACTION_COMMAND"),
            DEFAULT_EXTRACTION_COMMAND,
        )?;
        let graph_command = command(
            "GRAPH_COMMAND",
            value("GRAPH_COMMAND"),
            DEFAULT_GRAPH_COMMAND,
        )?;

        let raw_api_url = value("PIPELINE_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let api_url = Url::parse(raw_api_url.trim()).map_err(|e| ConfigError::Invalid {
            key: "PIPELINE_API_URL",
            message: e.to_string(),
        })?;
        if !matches!(api_url.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid {
                key: "PIPELINE_API_URL",
                message: format!("unsupported scheme '{}'", api_url.scheme()),
            });
        }

        Ok(Self {
            database_url,
            database_pool_size,
            port,
            extraction_command,
            graph_command,
            api_url,
            upload_body_limit_mb,
        })
    }

    pub fn pipeline_commands(&self) -> PipelineCommands {
        PipelineCommands {
            extraction: self.extraction_command.clone(),
            graph: self.graph_command.clone(),
            api_url: self.api_url.as_str().trim_end_matches('/').to_string(),
        }
    }

    pub fn upload_body_limit_bytes(&self) -> usize {
        self.upload_body_limit_mb * 1024 * 1024
    }
}

fn parse_or<T>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        Some(v) => v.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            message: e.to_string(),
        }),
        None => Ok(default),
    }
}

fn command(
    key: &'static str,
    raw: Option<String>,
    default: &str,
) -> Result<CommandSpec, ConfigError> {
    CommandSpec::parse(raw.as_deref().unwrap_or(default))
        .map_err(|message| ConfigError::Invalid { key, message })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[("DATABASE_URL", "postgres://localhost/docgraph")]).unwrap();

        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.database_pool_size, DEFAULT_POOL_SIZE);
        assert_eq!(config.extraction_command.program, "python3");
        assert_eq!(
            config.extraction_command.leading_args,
            vec!["core/scripts/extract_data.py"]
        );
        assert_eq!(config.upload_body_limit_bytes(), 250 * 1024 * 1024);
        assert_eq!(config.pipeline_commands().api_url, "http://localhost:3000");
    }

    #[test]
    fn test_database_url_is_required() {
        assert!(matches!(
            config(&[]),
            Err(ConfigError::Missing("DATABASE_URL"))
        ));
        assert!(matches!(
            config(&[("DATABASE_URL", "  ")]),
            Err(ConfigError::Missing("DATABASE_URL"))
        ));
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("DATABASE_URL", "postgres://db/docgraph"),
            ("PORT", "8080"),
            ("GRAPH_COMMAND", "/opt/pipeline/bin/create-graph --verbose"),
            ("PIPELINE_API_URL", "https://pipeline.internal:9000/"),
        ])
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.graph_command.program, "/opt/pipeline/bin/create-graph");
        assert_eq!(config.graph_command.leading_args, vec!["--verbose"]);
        assert_eq!(
            config.pipeline_commands().api_url,
            "https://pipeline.internal:9000"
        );
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let base = ("DATABASE_URL", "postgres://db/docgraph");

        assert!(matches!(
            config(&[base, ("PORT", "eighty")]),
            Err(ConfigError::Invalid { key: "PORT", .. })
        ));
        assert!(matches!(
            config(&[base, ("PIPELINE_API_URL", "not a url")]),
            Err(ConfigError::Invalid { key: "PIPELINE_API_URL", .. })
        ));
        assert!(matches!(
            config(&[base, ("PIPELINE_API_URL", "ftp://files.example.com")]),
            Err(ConfigError::Invalid { key: "PIPELINE_API_URL", .. })
        ));
        assert!(matches!(
            config(&[base, ("DATABASE_POOL_SIZE", "0")]),
            Err(ConfigError::Invalid { key: "DATABASE_POOL_SIZE", .. })
        ));
    }
}

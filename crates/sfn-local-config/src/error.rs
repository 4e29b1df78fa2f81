use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading a project. All of them happen before any
/// process is started or any request is sent.
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to read {}: {source}", path.display())]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("unsupported project file format: {}", path.display())]
  UnsupportedFormat { path: PathBuf },

  #[error("invalid YAML: {0}")]
  Yaml(#[from] serde_yaml::Error),

  #[error("invalid project document: {0}")]
  Json(#[from] serde_json::Error),

  #[error("unsupported YAML value: {0}")]
  UnsupportedYaml(String),

  #[error("missing required field: {0}")]
  MissingField(&'static str),

  #[error("Step Functions Local: missing accountId")]
  MissingAccountId,

  #[error("Step Functions Local: missing region")]
  MissingRegion,

  #[error("invalid lambdaEndpoint '{endpoint}': {source}")]
  InvalidEndpoint {
    endpoint: String,
    #[source]
    source: url::ParseError,
  },
}

use thiserror::Error;

/// Error code the control API returns for an unknown state machine.
pub const STATE_MACHINE_DOES_NOT_EXIST: &str = "StateMachineDoesNotExist";

#[derive(Debug, Error)]
pub enum RegistryError {
  #[error("state machine not found: {arn}")]
  NotFound { arn: String },

  #[error("{code}: {message} (status {status})")]
  Api {
    status: u16,
    code: String,
    message: String,
  },

  #[error("HTTP error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("failed to decode control API payload: {0}")]
  Decode(#[from] serde_json::Error),

  #[error("invalid control endpoint '{endpoint}': {source}")]
  InvalidEndpoint {
    endpoint: String,
    #[source]
    source: url::ParseError,
  },
}

impl RegistryError {
  pub fn is_not_found(&self) -> bool {
    match self {
      RegistryError::NotFound { .. } => true,
      RegistryError::Api { code, .. } => code == STATE_MACHINE_DOES_NOT_EXIST,
      _ => false,
    }
  }
}

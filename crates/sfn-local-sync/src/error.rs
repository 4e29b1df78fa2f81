use std::time::Duration;

use sfn_local_registry::RegistryError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
  #[error("registry error: {0}")]
  Registry(#[from] RegistryError),

  #[error(
    "state machines still registered after {passes} drain passes ({elapsed:?}): {}",
    remaining.join(", ")
  )]
  ConvergenceTimeout {
    passes: u32,
    elapsed: Duration,
    remaining: Vec<String>,
  },

  #[error("malformed state machine ARN: {arn}")]
  MalformedArn { arn: String },

  #[error("duplicate state machine name: {name}")]
  DuplicateName { name: String },

  #[error("failed to serialize definition: {0}")]
  Serialize(#[from] serde_json::Error),
}

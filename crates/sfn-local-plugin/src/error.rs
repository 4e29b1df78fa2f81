use sfn_local_config::ConfigError;
use sfn_local_emulator::EmulatorError;
use sfn_local_registry::RegistryError;
use sfn_local_resolver::ResolveError;
use sfn_local_sync::SyncError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PluginError {
  #[error("configuration error: {0}")]
  Config(#[from] ConfigError),

  #[error("state machine '{state_machine}': {source}")]
  Resolve {
    state_machine: String,
    #[source]
    source: ResolveError,
  },

  #[error("Step Functions Local: {0}")]
  Emulator(#[from] EmulatorError),

  #[error("control API: {0}")]
  Registry(#[from] RegistryError),

  #[error("synchronization failed: {0}")]
  Sync(#[from] SyncError),

  #[error("unknown hook: {0}")]
  UnknownHook(String),
}

use std::path::PathBuf;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use sfn_local_definition::{Fields, StateMachineDefinition};
use sfn_local_resolver::TaskResourceOverrides;

/// Raw shape of the project document. Only the sections sfn-local reads are
/// declared; everything else is ignored.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProjectFile {
  pub service: Option<ServiceName>,
  #[serde(default)]
  pub provider: ProviderSection,
  #[serde(default)]
  pub custom: CustomSection,
  pub step_functions: Option<StepFunctionsSection>,
}

/// `service: name` or `service: { name: name }`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum ServiceName {
  Name(String),
  Object { name: String },
}

impl ServiceName {
  pub fn into_name(self) -> String {
    match self {
      ServiceName::Name(name) | ServiceName::Object { name } => name,
    }
  }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ProviderSection {
  pub stage: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct CustomSection {
  #[serde(rename = "stepFunctionsLocal")]
  pub step_functions_local: Option<LocalSettingsFile>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct StepFunctionsSection {
  #[serde(rename = "stateMachines")]
  pub state_machines: Option<IndexMap<String, StateMachineEntry>>,
}

/// Account ids are often written unquoted in YAML.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum AccountId {
  Text(String),
  Number(u64),
}

impl AccountId {
  pub fn into_string(self) -> String {
    match self {
      AccountId::Text(text) => text,
      AccountId::Number(number) => number.to_string(),
    }
  }
}

/// `custom.stepFunctionsLocal` as written. Validated into [`crate::LocalSettings`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LocalSettingsFile {
  pub account_id: Option<AccountId>,
  pub region: Option<String>,
  pub lambda_endpoint: Option<String>,
  pub path: Option<PathBuf>,
  #[serde(rename = "TaskResourceMapping")]
  pub task_resource_mapping: Option<TaskResourceOverrides>,
  pub start_step_functions_local_app: Option<bool>,
  pub wait_to_start: Option<bool>,
  pub port: Option<u16>,
  pub wait_time_scale: Option<f64>,
  pub ready_timeout_ms: Option<u64>,
  pub ready_poll_interval_ms: Option<u64>,
  pub drain_backoff_ms: Option<u64>,
  pub drain_timeout_ms: Option<u64>,
  pub max_drain_passes: Option<u32>,
}

/// One entry of `stepFunctions.stateMachines`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateMachineEntry {
  /// Explicit state machine name; the map key is used when absent.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub name: Option<String>,

  pub definition: StateMachineDefinition,

  /// Deployment-only settings (`events`, `role`, `loggingConfig`, ...).
  #[serde(flatten)]
  pub extra: Fields,
}

impl StateMachineEntry {
  pub fn new(definition: StateMachineDefinition) -> Self {
    Self {
      name: None,
      definition,
      extra: Fields::new(),
    }
  }

  /// The name the state machine is registered under.
  pub fn registered_name<'a>(&'a self, key: &'a str) -> &'a str {
    self.name.as_deref().unwrap_or(key)
  }
}

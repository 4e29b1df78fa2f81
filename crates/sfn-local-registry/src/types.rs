use serde::{Deserialize, Serialize};

/// One entry of a `ListStateMachines` page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateMachineSummary {
  pub state_machine_arn: String,
  pub name: String,
  #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
  pub machine_type: Option<String>,
  /// Seconds since the epoch.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub creation_date: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateMachinePage {
  #[serde(default)]
  pub state_machines: Vec<StateMachineSummary>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub next_token: Option<String>,
}

/// `CreateStateMachine` input. `definition` is the serialized JSON document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateStateMachine {
  pub name: String,
  pub definition: String,
  pub role_arn: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedStateMachine {
  pub state_machine_arn: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub creation_date: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateMachineDescription {
  pub state_machine_arn: String,
  pub name: String,
  pub definition: String,
  pub role_arn: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub status: Option<String>,
  #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
  pub machine_type: Option<String>,
}

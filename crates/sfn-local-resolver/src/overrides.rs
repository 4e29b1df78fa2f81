use std::collections::HashSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use sfn_local_definition::StateMachineDefinition;
use tracing::debug;

/// Operator supplied `TaskResourceMapping`: state name -> literal resource ARN.
///
/// Overrides are applied after symbolic resolution and win over it. A state
/// only has its `Resource` replaced when it already has one; an override never
/// adds a `Resource` to a state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskResourceOverrides {
  mapping: IndexMap<String, String>,
}

impl TaskResourceOverrides {
  pub fn new(mapping: IndexMap<String, String>) -> Self {
    Self { mapping }
  }

  pub fn is_empty(&self) -> bool {
    self.mapping.is_empty()
  }

  /// Apply the overrides to every state at every depth.
  ///
  /// Returns the updated definition and the names of the states that were
  /// overridden.
  pub fn apply(&self, mut definition: StateMachineDefinition) -> (StateMachineDefinition, Vec<String>) {
    let mut applied = Vec::new();
    if self.mapping.is_empty() {
      return (definition, applied);
    }

    definition.visit_states_mut(&mut |name, state| {
      if let Some(arn) = self.mapping.get(name)
        && state.replace_resource(arn)
      {
        debug!(state = %name, resource = %arn, "applied task resource override");
        applied.push(name.to_string());
      }
    });

    (definition, applied)
  }

  /// Mapping keys that did not override anything in `applied`.
  pub fn unmatched_keys<'a, I>(&'a self, applied: I) -> Vec<&'a str>
  where
    I: IntoIterator<Item = &'a str>,
  {
    let applied: HashSet<&str> = applied.into_iter().collect();
    self
      .mapping
      .keys()
      .map(String::as_str)
      .filter(|key| !applied.contains(key))
      .collect()
  }
}

impl FromIterator<(String, String)> for TaskResourceOverrides {
  fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
    Self::new(iter.into_iter().collect())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;
  use sfn_local_definition::TaskResource;

  fn overrides(pairs: &[(&str, &str)]) -> TaskResourceOverrides {
    pairs
      .iter()
      .map(|(k, v)| (k.to_string(), v.to_string()))
      .collect()
  }

  #[test]
  fn test_override_replaces_matching_task_only() {
    let definition: StateMachineDefinition = serde_json::from_value(json!({
      "StartAt": "FirstState",
      "States": {
        "FirstState": { "Type": "Task", "Resource": "arn:resolved:first", "Next": "FinalState" },
        "FinalState": { "Type": "Task", "Resource": "arn:resolved:final", "End": true }
      }
    }))
    .unwrap();

    let (definition, applied) =
      overrides(&[("FirstState", "arn:override:hello")]).apply(definition);

    assert_eq!(applied, vec!["FirstState"]);
    assert_eq!(
      definition.get_state("FirstState").unwrap().resource(),
      Some(&TaskResource::Arn("arn:override:hello".to_string()))
    );
    assert_eq!(
      definition.get_state("FinalState").unwrap().resource(),
      Some(&TaskResource::Arn("arn:resolved:final".to_string()))
    );
  }

  #[test]
  fn test_override_never_adds_resource() {
    let definition: StateMachineDefinition = serde_json::from_value(json!({
      "StartAt": "pause",
      "States": { "pause": { "Type": "Wait", "Seconds": 1, "End": true } }
    }))
    .unwrap();

    let (updated, applied) = overrides(&[("pause", "arn:override")]).apply(definition.clone());

    assert!(applied.is_empty());
    assert_eq!(updated, definition);
  }

  #[test]
  fn test_override_only_touches_resource_field() {
    // A state named like a mapping key whose Parameters happen to contain a
    // "Resource" key must keep its Parameters intact.
    let definition: StateMachineDefinition = serde_json::from_value(json!({
      "StartAt": "call",
      "States": {
        "call": {
          "Type": "Task",
          "Resource": "arn:resolved",
          "Parameters": { "Resource": "keep-me" },
          "End": true
        }
      }
    }))
    .unwrap();

    let (definition, _) = overrides(&[("call", "arn:override")]).apply(definition);
    let state = definition.get_state("call").unwrap();

    assert_eq!(state.resource().and_then(TaskResource::as_arn), Some("arn:override"));
    assert_eq!(state.fields()["Parameters"]["Resource"], "keep-me");
  }

  #[test]
  fn test_unmatched_keys() {
    let mapping = overrides(&[("a", "arn:1"), ("b", "arn:2")]);
    assert_eq!(mapping.unmatched_keys(["a"]), vec!["b"]);
  }
}

use sfn_local_definition::{State, StateMachineDefinition, States, TaskResource};
use tracing::debug;

use crate::error::ResolveError;

/// Resolver turns the symbolic task resources of a definition into literal ARNs.
pub trait Resolver: Send + Sync {
  /// Resolve a definition.
  ///
  /// The definition is consumed and a resolved copy is returned, so callers
  /// never observe a half-resolved tree.
  fn resolve(&self, definition: StateMachineDefinition)
  -> Result<StateMachineDefinition, ResolveError>;
}

/// Where the referenced functions live locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveContext {
  /// ARN partition, `aws` unless running against a different partition.
  pub partition: String,
  pub region: String,
  pub account_id: String,
  /// Serverless service name.
  pub service: String,
  /// Serverless stage.
  pub stage: String,
}

impl ResolveContext {
  pub fn new(
    region: impl Into<String>,
    account_id: impl Into<String>,
    service: impl Into<String>,
    stage: impl Into<String>,
  ) -> Self {
    Self {
      partition: "aws".to_string(),
      region: region.into(),
      account_id: account_id.into(),
      service: service.into(),
      stage: stage.into(),
    }
  }

  /// ARN of the function deployed for `logical_id`, following the serverless
  /// `{service}-{stage}-{function}` naming convention.
  pub fn function_arn(&self, logical_id: &str) -> String {
    format!(
      "arn:{}:lambda:{}:{}:function:{}-{}-{}",
      self.partition, self.region, self.account_id, self.service, self.stage, logical_id
    )
  }
}

/// Resolver that maps `Fn::GetAtt` task resources to local Lambda function ARNs.
#[derive(Debug, Clone)]
pub struct ArnResolver {
  context: ResolveContext,
}

impl ArnResolver {
  pub fn new(context: ResolveContext) -> Self {
    Self { context }
  }

  pub fn context(&self) -> &ResolveContext {
    &self.context
  }

  /// Resolve every task of a `States` map, recursing into Map and Parallel states.
  fn resolve_states(&self, states: &mut States) -> Result<(), ResolveError> {
    for (name, state) in states.iter_mut() {
      match state {
        State::Task(task) => {
          if let Some(TaskResource::GetAtt { logical_id, .. }) = &task.resource {
            if logical_id.is_empty() {
              return Err(ResolveError::EmptyLogicalId {
                state: name.clone(),
              });
            }
            let arn = self.context.function_arn(logical_id);
            debug!(state = %name, resource = %arn, "resolved task resource");
            task.resource = Some(TaskResource::Arn(arn));
          }
        }
        State::Map(_) | State::Parallel(_) => {
          for branch in state.branches_mut() {
            self.resolve_states(&mut branch.states)?;
          }
        }
        _ => {}
      }
    }
    Ok(())
  }
}

impl Resolver for ArnResolver {
  fn resolve(
    &self,
    mut definition: StateMachineDefinition,
  ) -> Result<StateMachineDefinition, ResolveError> {
    definition.validate()?;
    self.resolve_states(&mut definition.states)?;
    Ok(definition)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn context() -> ResolveContext {
    ResolveContext::new("us-east-1", "101010101010", "local-step-function", "dev")
  }

  fn definition(value: serde_json::Value) -> StateMachineDefinition {
    serde_json::from_value(value).unwrap()
  }

  #[test]
  fn test_function_arn_naming() {
    assert_eq!(
      context().function_arn("hello"),
      "arn:aws:lambda:us-east-1:101010101010:function:local-step-function-dev-hello"
    );
  }

  #[test]
  fn test_resolve_top_level_task() {
    let resolver = ArnResolver::new(context());
    let resolved = resolver
      .resolve(definition(json!({
        "StartAt": "hello",
        "States": {
          "hello": {
            "Type": "Task",
            "Resource": { "Fn::GetAtt": ["hello", "Arn"] },
            "ResultPath": "$.out",
            "End": true
          }
        }
      })))
      .unwrap();

    let state = resolved.get_state("hello").unwrap();
    assert_eq!(
      state.resource().and_then(TaskResource::as_arn),
      Some("arn:aws:lambda:us-east-1:101010101010:function:local-step-function-dev-hello")
    );
    assert_eq!(state.fields()["ResultPath"], "$.out");
  }

  #[test]
  fn test_literal_resources_are_untouched() {
    let resolver = ArnResolver::new(context());
    let input = definition(json!({
      "StartAt": "call",
      "States": {
        "call": {
          "Type": "Task",
          "Resource": "arn:aws:states:::sqs:sendMessage",
          "Next": "done"
        },
        "done": { "Type": "Succeed" }
      }
    }));

    let resolved = resolver.resolve(input.clone()).unwrap();
    assert_eq!(resolved, input);
  }

  #[test]
  fn test_invalid_definition_is_rejected() {
    let resolver = ArnResolver::new(context());
    let result = resolver.resolve(definition(json!({
      "StartAt": "missing",
      "States": { "a": { "Type": "Succeed" } }
    })));

    assert!(matches!(result, Err(ResolveError::InvalidDefinition(_))));
  }

  #[test]
  fn test_empty_logical_id_is_rejected() {
    let resolver = ArnResolver::new(context());
    let input = StateMachineDefinition::new("a").with_state(
      "a",
      State::Task(sfn_local_definition::TaskState {
        resource: Some(TaskResource::get_att("", "Arn")),
        fields: Default::default(),
      }),
    );

    assert!(matches!(
      resolver.resolve(input),
      Err(ResolveError::EmptyLogicalId { .. })
    ));
  }
}

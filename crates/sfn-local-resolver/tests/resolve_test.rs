//! Resolution over nested definitions, combined with overrides.

use serde_json::{Value, json};
use sfn_local_definition::{StateMachineDefinition, TaskResource};
use sfn_local_resolver::{ArnResolver, ResolveContext, Resolver, TaskResourceOverrides};

const HELLO_ARN: &str = "arn:aws:lambda:us-east-1:101010101010:function:local-step-function-dev-hello";

fn resolver() -> ArnResolver {
  ArnResolver::new(ResolveContext::new(
    "us-east-1",
    "101010101010",
    "local-step-function",
    "dev",
  ))
}

fn get_att(name: &str) -> Value {
  json!({ "Fn::GetAtt": [name, "Arn"] })
}

/// A Map whose iterator holds a Parallel whose branches hold tasks, next to a
/// top-level task and a few opaque states.
fn nested_definition() -> StateMachineDefinition {
  serde_json::from_value(json!({
    "Comment": "nested",
    "StartAt": "prepare",
    "States": {
      "prepare": { "Type": "Task", "Resource": get_att("prepare"), "Next": "each" },
      "each": {
        "Type": "Map",
        "ItemsPath": "$.items",
        "Iterator": {
          "StartAt": "fan_out",
          "States": {
            "fan_out": {
              "Type": "Parallel",
              "End": true,
              "Branches": [
                {
                  "StartAt": "left",
                  "States": { "left": { "Type": "Task", "Resource": get_att("left"), "End": true } }
                },
                {
                  "StartAt": "right",
                  "States": {
                    "right": { "Type": "Task", "Resource": get_att("right"), "Next": "right_done" },
                    "right_done": { "Type": "Pass", "End": true }
                  }
                }
              ]
            }
          }
        },
        "Next": "decide"
      },
      "decide": {
        "Type": "Choice",
        "Choices": [{ "Variable": "$.ok", "BooleanEquals": true, "Next": "done" }],
        "Default": "failed"
      },
      "done": { "Type": "Succeed" },
      "failed": { "Type": "Fail", "Cause": "not ok" }
    }
  }))
  .unwrap()
}

fn collect_resources(definition: &StateMachineDefinition) -> Vec<(String, TaskResource)> {
  let mut definition = definition.clone();
  let mut resources = Vec::new();
  definition.visit_states_mut(&mut |name, state| {
    if let Some(resource) = state.resource() {
      resources.push((name.to_string(), resource.clone()));
    }
  });
  resources
}

#[test]
fn test_resolves_tasks_at_every_depth() {
  let resolved = resolver().resolve(nested_definition()).unwrap();
  let resources = collect_resources(&resolved);

  assert_eq!(resources.len(), 4);
  for (name, resource) in resources {
    let expected = format!(
      "arn:aws:lambda:us-east-1:101010101010:function:local-step-function-dev-{}",
      name
    );
    assert_eq!(resource, TaskResource::Arn(expected));
  }
}

#[test]
fn test_resolution_is_idempotent() {
  let once = resolver().resolve(nested_definition()).unwrap();
  let twice = resolver().resolve(once.clone()).unwrap();

  assert_eq!(once, twice);
}

#[test]
fn test_definition_without_references_is_unchanged() {
  let input: StateMachineDefinition = serde_json::from_value(json!({
    "StartAt": "wait",
    "States": {
      "wait": { "Type": "Wait", "Seconds": 3, "Next": "call" },
      "call": { "Type": "Task", "Resource": HELLO_ARN, "End": true }
    }
  }))
  .unwrap();

  let resolved = resolver().resolve(input.clone()).unwrap();
  assert_eq!(
    serde_json::to_value(&resolved).unwrap(),
    serde_json::to_value(&input).unwrap()
  );
}

#[test]
fn test_opaque_states_pass_through() {
  let resolved = resolver().resolve(nested_definition()).unwrap();
  let original = nested_definition();

  for name in ["decide", "done", "failed"] {
    assert_eq!(resolved.get_state(name), original.get_state(name));
  }
  assert_eq!(resolved.comment.as_deref(), Some("nested"));
}

#[test]
fn test_override_wins_over_resolution_inside_branch() {
  let resolved = resolver().resolve(nested_definition()).unwrap();
  let overrides: TaskResourceOverrides = [("right".to_string(), "arn:custom:right".to_string())]
    .into_iter()
    .collect();

  let (updated, applied) = overrides.apply(resolved);
  assert_eq!(applied, vec!["right"]);

  let resources = collect_resources(&updated);
  let right = resources.iter().find(|(name, _)| name == "right").unwrap();
  let left = resources.iter().find(|(name, _)| name == "left").unwrap();

  assert_eq!(right.1, TaskResource::Arn("arn:custom:right".to_string()));
  assert_eq!(
    left.1,
    TaskResource::Arn(
      "arn:aws:lambda:us-east-1:101010101010:function:local-step-function-dev-left".to_string()
    )
  );
}

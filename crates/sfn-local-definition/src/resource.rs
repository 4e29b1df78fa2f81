use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::DefinitionError;

const GET_ATT: &str = "Fn::GetAtt";

/// The `Resource` of a `Task` state.
///
/// In a serverless project a task usually points at a function of the same
/// service through `Fn::GetAtt`, which only has a meaning once deployed.
/// Locally that reference has to be turned into a literal ARN.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub enum TaskResource {
  /// A literal resource identifier, e.g. `arn:aws:lambda:...`.
  Arn(String),

  /// `{"Fn::GetAtt": ["hello", "Arn"]}` or `{"Fn::GetAtt": "hello.Arn"}`.
  GetAtt {
    logical_id: String,
    attribute: String,
  },

  /// Any other value (other intrinsics, nested objects). Passed through untouched.
  Other(Value),
}

impl TaskResource {
  /// Build a `Fn::GetAtt` reference.
  pub fn get_att(logical_id: impl Into<String>, attribute: impl Into<String>) -> Self {
    Self::GetAtt {
      logical_id: logical_id.into(),
      attribute: attribute.into(),
    }
  }

  /// The literal identifier, if this resource is one.
  pub fn as_arn(&self) -> Option<&str> {
    match self {
      Self::Arn(arn) => Some(arn),
      _ => None,
    }
  }

  /// The referenced logical id of a `Fn::GetAtt` resource.
  pub fn logical_id(&self) -> Option<&str> {
    match self {
      Self::GetAtt { logical_id, .. } => Some(logical_id),
      _ => None,
    }
  }

  fn parse_get_att(value: Value) -> Result<Self, DefinitionError> {
    match value {
      Value::String(dotted) => match dotted.split_once('.') {
        Some((logical_id, attribute)) if !logical_id.is_empty() && !attribute.is_empty() => {
          Ok(Self::get_att(logical_id, attribute))
        }
        _ => Err(DefinitionError::InvalidGetAtt {
          message: format!("expected \"LogicalId.Attribute\", got \"{}\"", dotted),
        }),
      },
      Value::Array(items) => {
        let parts: Vec<&str> = items.iter().filter_map(Value::as_str).collect();
        match parts.as_slice() {
          [logical_id, attribute] if parts.len() == items.len() && !logical_id.is_empty() => {
            Ok(Self::get_att(*logical_id, *attribute))
          }
          _ => Err(DefinitionError::InvalidGetAtt {
            message: format!(
              "expected [LogicalId, Attribute], got {}",
              Value::Array(items)
            ),
          }),
        }
      }
      other => Err(DefinitionError::InvalidGetAtt {
        message: format!("unsupported argument {}", other),
      }),
    }
  }
}

impl TryFrom<Value> for TaskResource {
  type Error = DefinitionError;

  fn try_from(value: Value) -> Result<Self, Self::Error> {
    match value {
      Value::String(arn) => Ok(Self::Arn(arn)),
      Value::Object(mut object) if object.len() == 1 && object.contains_key(GET_ATT) => {
        let argument = object.remove(GET_ATT).unwrap_or(Value::Null);
        Self::parse_get_att(argument)
      }
      other => Ok(Self::Other(other)),
    }
  }
}

impl From<TaskResource> for Value {
  fn from(resource: TaskResource) -> Self {
    match resource {
      TaskResource::Arn(arn) => Value::String(arn),
      TaskResource::GetAtt {
        logical_id,
        attribute,
      } => serde_json::json!({ GET_ATT: [logical_id, attribute] }),
      TaskResource::Other(value) => value,
    }
  }
}

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::definition::Branch;
use crate::error::DefinitionError;
use crate::resource::TaskResource;

/// Opaque state fields, kept in document order.
pub type Fields = serde_json::Map<String, Value>;

const TYPE: &str = "Type";
const RESOURCE: &str = "Resource";
const ITERATOR: &str = "Iterator";
const ITEM_PROCESSOR: &str = "ItemProcessor";
const BRANCHES: &str = "Branches";

/// A single state of a state machine, tagged by its `Type`.
///
/// The `Fields` of each variant hold everything except `Type` and the fields
/// lifted into typed members.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub enum State {
  Task(TaskState),
  Map(MapState),
  Parallel(ParallelState),
  Wait(Fields),
  Choice(Fields),
  Succeed(Fields),
  Fail(Fields),
  Pass(Fields),
  /// A state type this crate does not know about.
  Other { state_type: String, fields: Fields },
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TaskState {
  pub resource: Option<TaskResource>,
  pub fields: Fields,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MapState {
  /// Legacy `Iterator` sub-machine.
  pub iterator: Option<Branch>,
  /// `ItemProcessor` sub-machine.
  pub item_processor: Option<Branch>,
  pub fields: Fields,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParallelState {
  pub branches: Vec<Branch>,
  pub fields: Fields,
}

impl State {
  /// The `Type` tag as written in the document.
  pub fn state_type(&self) -> &str {
    match self {
      State::Task(_) => "Task",
      State::Map(_) => "Map",
      State::Parallel(_) => "Parallel",
      State::Wait(_) => "Wait",
      State::Choice(_) => "Choice",
      State::Succeed(_) => "Succeed",
      State::Fail(_) => "Fail",
      State::Pass(_) => "Pass",
      State::Other { state_type, .. } => state_type.as_str(),
    }
  }

  /// The remaining untyped fields of the state.
  pub fn fields(&self) -> &Fields {
    match self {
      State::Task(task) => &task.fields,
      State::Map(map) => &map.fields,
      State::Parallel(parallel) => &parallel.fields,
      State::Wait(fields)
      | State::Choice(fields)
      | State::Succeed(fields)
      | State::Fail(fields)
      | State::Pass(fields)
      | State::Other { fields, .. } => fields,
    }
  }

  /// The `Next` transition, if any.
  pub fn next(&self) -> Option<&str> {
    self.fields().get("Next").and_then(Value::as_str)
  }

  /// Every state name this state may transition to.
  ///
  /// For `Choice` states this covers `Default` and every `Choices[].Next`.
  pub fn transitions(&self) -> Vec<&str> {
    let mut targets: Vec<&str> = self.next().into_iter().collect();
    if let State::Choice(fields) = self {
      if let Some(default) = fields.get("Default").and_then(Value::as_str) {
        targets.push(default);
      }
      if let Some(choices) = fields.get("Choices").and_then(Value::as_array) {
        targets.extend(
          choices
            .iter()
            .filter_map(|choice| choice.get("Next").and_then(Value::as_str)),
        );
      }
    }
    targets
  }

  /// The task resource, for `Task` states.
  pub fn resource(&self) -> Option<&TaskResource> {
    match self {
      State::Task(task) => task.resource.as_ref(),
      _ => None,
    }
  }

  /// Whether the state carries a `Resource` field at all.
  pub fn has_resource(&self) -> bool {
    match self {
      State::Task(task) => task.resource.is_some(),
      other => other.fields().contains_key(RESOURCE),
    }
  }

  /// Replace the `Resource` with a literal identifier.
  ///
  /// Does nothing and returns `false` when the state has no `Resource`.
  pub fn replace_resource(&mut self, arn: &str) -> bool {
    match self {
      State::Task(task) => match task.resource.as_mut() {
        Some(resource) => {
          *resource = TaskResource::Arn(arn.to_string());
          true
        }
        None => false,
      },
      State::Map(MapState { fields, .. })
      | State::Parallel(ParallelState { fields, .. })
      | State::Wait(fields)
      | State::Choice(fields)
      | State::Succeed(fields)
      | State::Fail(fields)
      | State::Pass(fields)
      | State::Other { fields, .. } => match fields.get_mut(RESOURCE) {
        Some(resource) => {
          *resource = Value::String(arn.to_string());
          true
        }
        None => false,
      },
    }
  }

  /// Nested sub-machines: Map iterators / item processors and Parallel branches.
  pub fn branches(&self) -> Vec<&Branch> {
    match self {
      State::Map(map) => map.iterator.iter().chain(map.item_processor.iter()).collect(),
      State::Parallel(parallel) => parallel.branches.iter().collect(),
      _ => Vec::new(),
    }
  }

  /// Mutable access to nested sub-machines.
  pub fn branches_mut(&mut self) -> Vec<&mut Branch> {
    match self {
      State::Map(map) => map
        .iterator
        .iter_mut()
        .chain(map.item_processor.iter_mut())
        .collect(),
      State::Parallel(parallel) => parallel.branches.iter_mut().collect(),
      _ => Vec::new(),
    }
  }
}

fn take_branch(
  fields: &mut Fields,
  state_type: &str,
  key: &str,
) -> Result<Option<Branch>, DefinitionError> {
  fields
    .remove(key)
    .map(|value| {
      serde_json::from_value(value).map_err(|e| DefinitionError::InvalidField {
        state_type: state_type.to_string(),
        field: key.to_string(),
        message: e.to_string(),
      })
    })
    .transpose()
}

impl TryFrom<Value> for State {
  type Error = DefinitionError;

  fn try_from(value: Value) -> Result<Self, Self::Error> {
    let Value::Object(mut fields) = value else {
      return Err(DefinitionError::NotAnObject);
    };

    let state_type = match fields.remove(TYPE) {
      Some(Value::String(state_type)) => state_type,
      Some(other) => {
        return Err(DefinitionError::InvalidType {
          found: other.to_string(),
        });
      }
      None => return Err(DefinitionError::MissingType),
    };

    let state = match state_type.as_str() {
      "Task" => {
        let resource = fields
          .remove(RESOURCE)
          .map(TaskResource::try_from)
          .transpose()?;
        State::Task(TaskState { resource, fields })
      }
      "Map" => {
        let iterator = take_branch(&mut fields, "Map", ITERATOR)?;
        let item_processor = take_branch(&mut fields, "Map", ITEM_PROCESSOR)?;
        State::Map(MapState {
          iterator,
          item_processor,
          fields,
        })
      }
      "Parallel" => {
        let branches = match fields.remove(BRANCHES) {
          Some(value) => {
            serde_json::from_value(value).map_err(|e| DefinitionError::InvalidField {
              state_type: "Parallel".to_string(),
              field: BRANCHES.to_string(),
              message: e.to_string(),
            })?
          }
          None => Vec::new(),
        };
        State::Parallel(ParallelState { branches, fields })
      }
      "Wait" => State::Wait(fields),
      "Choice" => State::Choice(fields),
      "Succeed" => State::Succeed(fields),
      "Fail" => State::Fail(fields),
      "Pass" => State::Pass(fields),
      _ => State::Other { state_type, fields },
    };

    Ok(state)
  }
}

fn branch_to_value(branch: Branch) -> Value {
  // Serializing our own types into a Value cannot fail.
  serde_json::to_value(branch).unwrap_or(Value::Null)
}

impl From<State> for Value {
  fn from(state: State) -> Self {
    let mut object = Fields::new();
    object.insert(TYPE.to_string(), Value::String(state.state_type().to_string()));

    let rest = match state {
      State::Task(TaskState { resource, fields }) => {
        if let Some(resource) = resource {
          object.insert(RESOURCE.to_string(), resource.into());
        }
        fields
      }
      State::Map(MapState {
        iterator,
        item_processor,
        fields,
      }) => {
        if let Some(iterator) = iterator {
          object.insert(ITERATOR.to_string(), branch_to_value(iterator));
        }
        if let Some(processor) = item_processor {
          object.insert(ITEM_PROCESSOR.to_string(), branch_to_value(processor));
        }
        fields
      }
      State::Parallel(ParallelState { branches, fields }) => {
        let branches = branches.into_iter().map(branch_to_value).collect();
        object.insert(BRANCHES.to_string(), Value::Array(branches));
        fields
      }
      State::Wait(fields)
      | State::Choice(fields)
      | State::Succeed(fields)
      | State::Fail(fields)
      | State::Pass(fields)
      | State::Other { fields, .. } => fields,
    };

    object.extend(rest);
    Value::Object(object)
  }
}

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::DefinitionError;
use crate::state::{Fields, State};

/// States of a (sub-)machine keyed by state name, in document order.
pub type States = IndexMap<String, State>;

/// A state machine document: `Comment`, `StartAt` and `States`.
///
/// The same shape is used for Parallel branches and Map iterators, see [`Branch`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateMachineDefinition {
  #[serde(rename = "Comment", default, skip_serializing_if = "Option::is_none")]
  pub comment: Option<String>,

  #[serde(rename = "StartAt")]
  pub start_at: String,

  #[serde(rename = "States")]
  pub states: States,

  /// Other top-level fields (`TimeoutSeconds`, `Version`, `ProcessorConfig`, ...).
  #[serde(flatten)]
  pub fields: Fields,
}

/// A nested sub-machine of a Parallel or Map state.
pub type Branch = StateMachineDefinition;

impl StateMachineDefinition {
  pub fn new(start_at: impl Into<String>) -> Self {
    Self {
      comment: None,
      start_at: start_at.into(),
      states: States::new(),
      fields: Fields::new(),
    }
  }

  /// Add a state, builder style.
  pub fn with_state(mut self, name: impl Into<String>, state: State) -> Self {
    self.states.insert(name.into(), state);
    self
  }

  /// Get a top-level state by name.
  pub fn get_state(&self, name: &str) -> Option<&State> {
    self.states.get(name)
  }

  /// Serialize the definition the way the control API expects it.
  pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
    serde_json::to_string(self)
  }

  /// Check that `StartAt` and every transition name a state of the same
  /// `States` map, recursing into nested sub-machines.
  pub fn validate(&self) -> Result<(), DefinitionError> {
    if !self.states.contains_key(&self.start_at) {
      return Err(DefinitionError::UnknownStartAt {
        start_at: self.start_at.clone(),
      });
    }

    for (name, state) in &self.states {
      for next in state.transitions() {
        if !self.states.contains_key(next) {
          return Err(DefinitionError::UnknownNext {
            state: name.clone(),
            next: next.to_string(),
          });
        }
      }

      for branch in state.branches() {
        branch.validate()?;
      }
    }

    Ok(())
  }

  /// Visit every state at every depth, depth-first in document order.
  pub fn visit_states_mut<F>(&mut self, visit: &mut F)
  where
    F: FnMut(&str, &mut State),
  {
    for (name, state) in self.states.iter_mut() {
      visit(name, &mut *state);
      for branch in state.branches_mut() {
        branch.visit_states_mut(visit);
      }
    }
  }
}

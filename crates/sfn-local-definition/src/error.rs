use thiserror::Error;

#[derive(Debug, Error)]
pub enum DefinitionError {
  #[error("state must be a JSON object")]
  NotAnObject,

  #[error("state is missing its \"Type\" field")]
  MissingType,

  #[error("state \"Type\" must be a string, got {found}")]
  InvalidType { found: String },

  #[error("invalid Fn::GetAtt reference: {message}")]
  InvalidGetAtt { message: String },

  #[error("invalid {field} in {state_type} state: {message}")]
  InvalidField {
    state_type: String,
    field: String,
    message: String,
  },

  #[error("StartAt '{start_at}' does not name a state")]
  UnknownStartAt { start_at: String },

  #[error("state '{state}' transitions to unknown state '{next}'")]
  UnknownNext { state: String, next: String },
}

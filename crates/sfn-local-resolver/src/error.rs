use sfn_local_definition::DefinitionError;
use thiserror::Error;

/// Errors that can occur while resolving a state machine definition.
#[derive(Debug, Error)]
pub enum ResolveError {
  /// The definition is structurally invalid (unknown StartAt or transition).
  #[error("invalid definition: {0}")]
  InvalidDefinition(#[from] DefinitionError),

  /// A `Fn::GetAtt` reference names an empty logical resource.
  #[error("state '{state}' references an empty logical resource")]
  EmptyLogicalId { state: String },
}

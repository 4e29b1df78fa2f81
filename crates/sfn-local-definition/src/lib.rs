//! sfn-local Definition
//!
//! This crate provides the typed representation of an Amazon States Language
//! document as it appears in a serverless project.
//!
//! Only the parts of a state that sfn-local acts on are modelled explicitly:
//! - `Task` states expose their `Resource` as a [`TaskResource`]
//! - `Map` states expose their nested iterator / item processor
//! - `Parallel` states expose their branches
//!
//! Every other field (and every unknown state type) is kept as an opaque JSON
//! payload so that a definition survives a load/serialize cycle unchanged.

mod definition;
mod error;
mod resource;
mod state;

pub use definition::{Branch, StateMachineDefinition, States};
pub use error::DefinitionError;
pub use resource::TaskResource;
pub use state::{Fields, MapState, ParallelState, State, TaskState};

//! sfn-local Registry
//!
//! Client side of the Step Functions Local control API. The
//! [`StateMachineRegistry`] trait covers the four operations sfn-local needs;
//! [`HttpStateMachineRegistry`] speaks the AWS JSON 1.0 protocol to a running
//! emulator and [`InMemoryStateMachineRegistry`] keeps records in memory, with
//! optionally delayed deletions, for tests and dry runs.

mod error;
mod http;
mod memory;
mod registry;
mod types;

pub use error::RegistryError;
pub use http::HttpStateMachineRegistry;
pub use memory::InMemoryStateMachineRegistry;
pub use registry::StateMachineRegistry;
pub use types::{
  CreateStateMachine, CreatedStateMachine, StateMachineDescription, StateMachinePage,
  StateMachineSummary,
};

//! sfn-local Config
//!
//! Loads the parts of a serverless project that sfn-local needs:
//! - `stepFunctions.stateMachines`: the state machine definitions to register
//! - `custom.stepFunctionsLocal`: how to run Step Functions Local
//! - `service` and `provider.stage`: used to name local Lambda functions
//!
//! Projects can be written in YAML (`serverless.yml`) or JSON. YAML short-form
//! intrinsics such as `!GetAtt hello.Arn` are expanded to their long form.
//! Serverless variables (`${...}`) are not interpolated.

mod error;
mod loader;
mod project;
mod settings;
mod yaml;

pub use error::ConfigError;
pub use loader::{LoadOptions, Project, ProjectFormat, load_project, parse_project};
pub use project::StateMachineEntry;
pub use settings::LocalSettings;

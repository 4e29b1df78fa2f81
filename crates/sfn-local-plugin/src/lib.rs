//! sfn-local Plugin
//!
//! Ties the pieces together behind the two lifecycle hooks of the host:
//!
//! - `offline:start:init`: install and start Step Functions Local, resolve the
//!   project's state machines and synchronize them
//! - `before:offline:start:end`: stop Step Functions Local and remove the
//!   published identifiers
//!
//! # Example
//!
//! ```ignore
//! use sfn_local_config::{LoadOptions, load_project};
//! use sfn_local_plugin::{Hook, StepFunctionsLocalPlugin};
//!
//! let project = load_project("serverless.yml", &LoadOptions::default())?;
//! let mut plugin = StepFunctionsLocalPlugin::new(project)?;
//!
//! plugin.handle(Hook::OfflineStartInit).await?;
//! // ... run local functions ...
//! plugin.handle(Hook::BeforeOfflineStartEnd).await?;
//! ```

mod error;
mod hooks;
mod plugin;
mod prepare;

pub use error::PluginError;
pub use hooks::Hook;
pub use plugin::{StepFunctionsLocalPlugin, emulator_config, sync_options};
pub use prepare::prepare_targets;

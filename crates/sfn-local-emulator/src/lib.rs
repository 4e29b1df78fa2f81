//! sfn-local Emulator
//!
//! Lifecycle of the Step Functions Local process: installing the distribution,
//! spawning it, waiting for its control port and tearing it down.

mod config;
mod emulator;
mod error;
mod install;
mod port;

pub use config::{DEFAULT_DOWNLOAD_URL, DEFAULT_PORT, EmulatorConfig, JAR_NAME};
pub use emulator::Emulator;
pub use error::EmulatorError;
pub use install::install;
pub use port::wait_for_port;

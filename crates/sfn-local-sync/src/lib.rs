//! sfn-local Sync
//!
//! Brings the registry of a running Step Functions Local in line with a set of
//! state machine definitions:
//!
//! 1. **Drain**: delete every registered state machine that carries one of the
//!    target names, rescanning until none is visible any more.
//! 2. **Register**: create all targets concurrently.
//! 3. **Publish**: write `OFFLINE_STEP_FUNCTIONS_ARN_{name}` for each created
//!    state machine into a [`KvStore`](sfn_local_host_kv::KvStore).

mod error;
mod events;
mod naming;
mod synchronizer;

pub use error::SyncError;
pub use events::{ChannelNotifier, DrainPhase, NoopNotifier, SyncEvent, SyncNotifier};
pub use naming::{ARN_ENV_PREFIX, published_key, role_arn, state_machine_name};
pub use synchronizer::{CreatedRecord, SyncOptions, SyncReport, SyncTarget, Synchronizer};

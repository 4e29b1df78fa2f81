use async_trait::async_trait;

use crate::error::RegistryError;
use crate::types::{
  CreateStateMachine, CreatedStateMachine, StateMachineDescription, StateMachinePage,
  StateMachineSummary,
};

/// The emulator's registry of state machines.
///
/// Deletion is eventually consistent: a deleted record may keep showing up in
/// listings for a while.
#[async_trait]
pub trait StateMachineRegistry: Send + Sync {
  /// List one page of records. Pass the previous page's `next_token` to continue.
  async fn list_state_machines(
    &self,
    next_token: Option<String>,
  ) -> Result<StateMachinePage, RegistryError>;

  /// Request deletion of a record. Unknown ARNs fail with [`RegistryError::NotFound`].
  async fn delete_state_machine(&self, arn: &str) -> Result<(), RegistryError>;

  async fn create_state_machine(
    &self,
    request: CreateStateMachine,
  ) -> Result<CreatedStateMachine, RegistryError>;

  async fn describe_state_machine(&self, arn: &str)
  -> Result<StateMachineDescription, RegistryError>;

  /// List every record, following `next_token` until the last page.
  async fn list_all(&self) -> Result<Vec<StateMachineSummary>, RegistryError> {
    let mut records = Vec::new();
    let mut next_token = None;

    loop {
      let page = self.list_state_machines(next_token).await?;
      records.extend(page.state_machines);

      match page.next_token {
        Some(token) if !token.is_empty() => next_token = Some(token),
        _ => return Ok(records),
      }
    }
  }
}

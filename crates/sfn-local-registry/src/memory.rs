use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::RegistryError;
use crate::registry::StateMachineRegistry;
use crate::types::{
  CreateStateMachine, CreatedStateMachine, StateMachineDescription, StateMachinePage,
  StateMachineSummary,
};

const STANDARD: &str = "STANDARD";

#[derive(Debug, Clone)]
struct Record {
  arn: String,
  name: String,
  definition: String,
  role_arn: String,
  creation_date: f64,
  /// Full listings the record stays visible for after deletion. `None` while live.
  deleting: Option<u32>,
}

#[derive(Debug, Default)]
struct Inner {
  records: Vec<Record>,
  list_calls: usize,
  delete_calls: usize,
  create_calls: usize,
}

/// State machine registry held in memory.
///
/// Behaves like Step Functions Local: ARNs follow
/// `arn:aws:states:{region}:{account}:stateMachine:{name}`, listings are paged
/// and deleted records can stay visible for a number of listings
/// ([`with_visibility_lag`](Self::with_visibility_lag)). Creating a record
/// whose name is still being deleted fails with `StateMachineDeleting`.
#[derive(Debug)]
pub struct InMemoryStateMachineRegistry {
  region: String,
  account_id: String,
  page_size: usize,
  visibility_lag: u32,
  sticky_deletes: bool,
  inner: Mutex<Inner>,
}

impl InMemoryStateMachineRegistry {
  pub fn new(region: impl Into<String>, account_id: impl Into<String>) -> Self {
    Self {
      region: region.into(),
      account_id: account_id.into(),
      page_size: 100,
      visibility_lag: 0,
      sticky_deletes: false,
      inner: Mutex::new(Inner::default()),
    }
  }

  /// Maximum records per listing page.
  pub fn with_page_size(mut self, page_size: usize) -> Self {
    self.page_size = page_size.max(1);
    self
  }

  /// Keep deleted records visible for `passes` full listings.
  pub fn with_visibility_lag(mut self, passes: u32) -> Self {
    self.visibility_lag = passes;
    self
  }

  /// Deleted records never disappear from listings.
  pub fn with_sticky_deletes(mut self) -> Self {
    self.sticky_deletes = true;
    self
  }

  pub fn arn_for(&self, name: &str) -> String {
    format!(
      "arn:aws:states:{}:{}:stateMachine:{}",
      self.region, self.account_id, name
    )
  }

  /// Register a record directly, bypassing call accounting.
  pub async fn insert(&self, name: &str, definition: &str) -> String {
    let arn = self.arn_for(name);
    let mut inner = self.inner.lock().await;
    inner.records.push(Record {
      arn: arn.clone(),
      name: name.to_string(),
      definition: definition.to_string(),
      role_arn: String::new(),
      creation_date: now(),
      deleting: None,
    });
    arn
  }

  /// Names of the live records, in creation order.
  pub async fn names(&self) -> Vec<String> {
    let inner = self.inner.lock().await;
    inner
      .records
      .iter()
      .filter(|record| record.deleting.is_none())
      .map(|record| record.name.clone())
      .collect()
  }

  pub async fn list_calls(&self) -> usize {
    self.inner.lock().await.list_calls
  }

  pub async fn delete_calls(&self) -> usize {
    self.inner.lock().await.delete_calls
  }

  pub async fn create_calls(&self) -> usize {
    self.inner.lock().await.create_calls
  }
}

fn now() -> f64 {
  SystemTime::now()
    .duration_since(UNIX_EPOCH)
    .map(|elapsed| elapsed.as_secs_f64())
    .unwrap_or_default()
}

#[async_trait]
impl StateMachineRegistry for InMemoryStateMachineRegistry {
  async fn list_state_machines(
    &self,
    next_token: Option<String>,
  ) -> Result<StateMachinePage, RegistryError> {
    let mut inner = self.inner.lock().await;
    inner.list_calls += 1;

    let start = match next_token {
      Some(token) => token.parse::<usize>().map_err(|_| RegistryError::Api {
        status: 400,
        code: "InvalidToken".to_string(),
        message: format!("invalid next token: {}", token),
      })?,
      None => {
        // A new listing ages every pending deletion by one pass.
        if !self.sticky_deletes {
          inner.records.retain_mut(|record| match record.deleting {
            Some(0) => false,
            Some(ref mut remaining) => {
              *remaining -= 1;
              true
            }
            None => true,
          });
        }
        0
      }
    };

    let state_machines: Vec<StateMachineSummary> = inner
      .records
      .iter()
      .skip(start)
      .take(self.page_size)
      .map(|record| StateMachineSummary {
        state_machine_arn: record.arn.clone(),
        name: record.name.clone(),
        machine_type: Some(STANDARD.to_string()),
        creation_date: Some(record.creation_date),
      })
      .collect();

    let end = start + state_machines.len();
    let next_token = (end < inner.records.len()).then(|| end.to_string());

    Ok(StateMachinePage {
      state_machines,
      next_token,
    })
  }

  async fn delete_state_machine(&self, arn: &str) -> Result<(), RegistryError> {
    let mut inner = self.inner.lock().await;
    inner.delete_calls += 1;

    let Some(index) = inner.records.iter().position(|record| record.arn == arn) else {
      return Err(RegistryError::NotFound {
        arn: arn.to_string(),
      });
    };

    if self.visibility_lag == 0 && !self.sticky_deletes {
      inner.records.remove(index);
    } else if inner.records[index].deleting.is_none() {
      inner.records[index].deleting = Some(self.visibility_lag);
    }
    Ok(())
  }

  async fn create_state_machine(
    &self,
    request: CreateStateMachine,
  ) -> Result<CreatedStateMachine, RegistryError> {
    let mut inner = self.inner.lock().await;
    inner.create_calls += 1;

    if let Some(existing) = inner.records.iter().find(|r| r.name == request.name) {
      let code = if existing.deleting.is_some() {
        "StateMachineDeleting"
      } else {
        "StateMachineAlreadyExists"
      };
      return Err(RegistryError::Api {
        status: 400,
        code: code.to_string(),
        message: format!("State Machine Already Exists: '{}'", existing.arn),
      });
    }

    let record = Record {
      arn: self.arn_for(&request.name),
      name: request.name,
      definition: request.definition,
      role_arn: request.role_arn,
      creation_date: now(),
      deleting: None,
    };
    let created = CreatedStateMachine {
      state_machine_arn: record.arn.clone(),
      creation_date: Some(record.creation_date),
    };
    inner.records.push(record);
    Ok(created)
  }

  async fn describe_state_machine(
    &self,
    arn: &str,
  ) -> Result<StateMachineDescription, RegistryError> {
    let inner = self.inner.lock().await;
    let record = inner
      .records
      .iter()
      .find(|record| record.arn == arn)
      .ok_or_else(|| RegistryError::NotFound {
        arn: arn.to_string(),
      })?;

    let status = if record.deleting.is_some() {
      "DELETING"
    } else {
      "ACTIVE"
    };

    Ok(StateMachineDescription {
      state_machine_arn: record.arn.clone(),
      name: record.name.clone(),
      definition: record.definition.clone(),
      role_arn: record.role_arn.clone(),
      status: Some(status.to_string()),
      machine_type: Some(STANDARD.to_string()),
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn request(name: &str) -> CreateStateMachine {
    CreateStateMachine {
      name: name.to_string(),
      definition: "{}".to_string(),
      role_arn: "arn:aws:iam::1:role/DummyRole".to_string(),
    }
  }

  #[tokio::test]
  async fn test_create_describe_delete() {
    let registry = InMemoryStateMachineRegistry::new("us-east-1", "1");

    let created = registry.create_state_machine(request("A")).await.unwrap();
    assert_eq!(
      created.state_machine_arn,
      "arn:aws:states:us-east-1:1:stateMachine:A"
    );

    let described = registry
      .describe_state_machine(&created.state_machine_arn)
      .await
      .unwrap();
    assert_eq!(described.name, "A");
    assert_eq!(described.status.as_deref(), Some("ACTIVE"));

    registry
      .delete_state_machine(&created.state_machine_arn)
      .await
      .unwrap();
    assert!(registry.names().await.is_empty());

    let err = registry
      .delete_state_machine(&created.state_machine_arn)
      .await
      .unwrap_err();
    assert!(err.is_not_found());
  }

  #[tokio::test]
  async fn test_duplicate_name_is_rejected() {
    let registry = InMemoryStateMachineRegistry::new("us-east-1", "1");
    registry.create_state_machine(request("A")).await.unwrap();

    let err = registry.create_state_machine(request("A")).await.unwrap_err();
    assert!(matches!(err, RegistryError::Api { ref code, .. } if code == "StateMachineAlreadyExists"));
  }

  #[tokio::test]
  async fn test_paging_follows_next_token() {
    let registry = InMemoryStateMachineRegistry::new("us-east-1", "1").with_page_size(2);
    for name in ["a", "b", "c", "d", "e"] {
      registry.insert(name, "{}").await;
    }

    let first = registry.list_state_machines(None).await.unwrap();
    assert_eq!(first.state_machines.len(), 2);
    assert_eq!(first.next_token.as_deref(), Some("2"));

    let all = registry.list_all().await.unwrap();
    let names: Vec<_> = all.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["a", "b", "c", "d", "e"]);
  }

  #[tokio::test]
  async fn test_deleted_record_stays_visible_for_lag() {
    let registry = InMemoryStateMachineRegistry::new("us-east-1", "1").with_visibility_lag(2);
    let arn = registry.insert("A", "{}").await;

    registry.delete_state_machine(&arn).await.unwrap();

    assert_eq!(registry.list_all().await.unwrap().len(), 1);
    let err = registry.create_state_machine(request("A")).await.unwrap_err();
    assert!(matches!(err, RegistryError::Api { ref code, .. } if code == "StateMachineDeleting"));

    assert_eq!(registry.list_all().await.unwrap().len(), 1);
    assert!(registry.list_all().await.unwrap().is_empty());
    registry.create_state_machine(request("A")).await.unwrap();
  }
}

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use futures::future::try_join_all;
use sfn_local_definition::StateMachineDefinition;
use sfn_local_host_kv::KvStore;
use sfn_local_registry::{CreateStateMachine, StateMachineRegistry};
use tokio::time::{Instant, sleep};
use tracing::{debug, error, info, warn};

use crate::error::SyncError;
use crate::events::{DrainPhase, NoopNotifier, SyncEvent, SyncNotifier};
use crate::naming::{published_key, role_arn, state_machine_name};

/// A state machine to register.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncTarget {
  pub name: String,
  pub definition: StateMachineDefinition,
}

impl SyncTarget {
  pub fn new(name: impl Into<String>, definition: StateMachineDefinition) -> Self {
    Self {
      name: name.into(),
      definition,
    }
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SyncOptions {
  pub account_id: String,
  /// Pause between a deleting pass and the next scan.
  pub drain_backoff: Duration,
  pub drain_timeout: Duration,
  pub max_drain_passes: u32,
}

impl SyncOptions {
  pub fn new(account_id: impl Into<String>) -> Self {
    Self {
      account_id: account_id.into(),
      drain_backoff: Duration::from_secs(1),
      drain_timeout: Duration::from_secs(60),
      max_drain_passes: 30,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedRecord {
  pub name: String,
  pub arn: String,
}

/// Outcome of a synchronization run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
  /// Scanning passes of the drain phase, including the final empty one.
  pub drain_passes: u32,
  /// ARNs a delete was issued for, without repeats.
  pub deleted: Vec<String>,
  pub created: Vec<CreatedRecord>,
  /// Keys written to the store.
  pub published: Vec<String>,
}

/// Drains, registers and publishes state machines against a registry.
pub struct Synchronizer<N: SyncNotifier = NoopNotifier> {
  registry: Arc<dyn StateMachineRegistry>,
  options: SyncOptions,
  notifier: N,
}

impl Synchronizer<NoopNotifier> {
  pub fn new(registry: Arc<dyn StateMachineRegistry>, options: SyncOptions) -> Self {
    Self::with_notifier(registry, options, NoopNotifier)
  }
}

impl<N: SyncNotifier> Synchronizer<N> {
  pub fn with_notifier(
    registry: Arc<dyn StateMachineRegistry>,
    options: SyncOptions,
    notifier: N,
  ) -> Self {
    Self {
      registry,
      options,
      notifier,
    }
  }

  pub fn options(&self) -> &SyncOptions {
    &self.options
  }

  /// Replace the registered generation of `targets` and publish the new ARNs.
  pub async fn sync(
    &self,
    targets: Vec<SyncTarget>,
    store: &mut dyn KvStore,
  ) -> Result<SyncReport, SyncError> {
    let mut names = HashSet::new();
    for target in &targets {
      if !names.insert(target.name.as_str()) {
        return Err(SyncError::DuplicateName {
          name: target.name.clone(),
        });
      }
    }

    let (drain_passes, deleted) = self.drain(&names).await?;
    let created = self.register(&targets).await?;
    let published = self.publish(&created, store).await?;

    info!(
      drain_passes,
      deleted = deleted.len(),
      created = created.len(),
      "state machines synchronized"
    );

    Ok(SyncReport {
      drain_passes,
      deleted,
      created,
      published,
    })
  }

  /// Delete every record carrying one of `names` until a scan finds none.
  async fn drain(&self, names: &HashSet<&str>) -> Result<(u32, Vec<String>), SyncError> {
    let started = Instant::now();
    let mut deleted: Vec<String> = Vec::new();
    let mut pass = 0;

    loop {
      pass += 1;
      self.phase(pass, DrainPhase::Scanning);

      let matches: Vec<_> = self
        .registry
        .list_all()
        .await?
        .into_iter()
        .filter(|record| names.contains(record.name.as_str()))
        .collect();

      if matches.is_empty() {
        self.phase(pass, DrainPhase::Done);
        return Ok((pass, deleted));
      }

      // The first pass always deletes; the bounds apply to rescans.
      if pass > 1
        && (pass >= self.options.max_drain_passes || started.elapsed() >= self.options.drain_timeout)
      {
        let mut remaining: Vec<String> = matches.into_iter().map(|record| record.name).collect();
        remaining.sort();
        remaining.dedup();
        return Err(SyncError::ConvergenceTimeout {
          passes: pass,
          elapsed: started.elapsed(),
          remaining,
        });
      }

      self.phase(pass, DrainPhase::Deleting);
      for record in matches {
        match self
          .registry
          .delete_state_machine(&record.state_machine_arn)
          .await
        {
          Ok(()) => debug!(arn = %record.state_machine_arn, "deleted state machine"),
          Err(err) if err.is_not_found() => {
            debug!(arn = %record.state_machine_arn, "state machine already gone");
          }
          Err(err) => return Err(err.into()),
        }

        if !deleted.contains(&record.state_machine_arn) {
          self.notifier.notify(SyncEvent::Deleted {
            arn: record.state_machine_arn.clone(),
          });
          deleted.push(record.state_machine_arn);
        }
      }

      self.phase(pass, DrainPhase::Backoff);
      sleep(self.options.drain_backoff).await;
    }
  }

  /// Create every target concurrently.
  async fn register(&self, targets: &[SyncTarget]) -> Result<Vec<CreatedRecord>, SyncError> {
    let role_arn = role_arn(&self.options.account_id);

    let requests = targets
      .iter()
      .map(|target| -> Result<CreateStateMachine, SyncError> {
        Ok(CreateStateMachine {
          name: target.name.clone(),
          definition: target.definition.to_json_string()?,
          role_arn: role_arn.clone(),
        })
      })
      .collect::<Result<Vec<_>, SyncError>>()?;

    let created = try_join_all(requests.into_iter().map(|request| async move {
      let name = request.name.clone();
      match self.registry.create_state_machine(request).await {
        Ok(output) => {
          info!(state_machine = %name, arn = %output.state_machine_arn, "created state machine");
          self.notifier.notify(SyncEvent::Created {
            name: name.clone(),
            arn: output.state_machine_arn.clone(),
          });
          Ok(CreatedRecord {
            name,
            arn: output.state_machine_arn,
          })
        }
        Err(err) => {
          error!(state_machine = %name, error = %err, "failed to create state machine");
          Err(SyncError::from(err))
        }
      }
    }))
    .await?;

    Ok(created)
  }

  async fn publish(
    &self,
    created: &[CreatedRecord],
    store: &mut dyn KvStore,
  ) -> Result<Vec<String>, SyncError> {
    let mut published = Vec::with_capacity(created.len());

    for record in created {
      let name = state_machine_name(&record.arn)?;
      if name != record.name {
        warn!(
          state_machine = %record.name,
          arn = %record.arn,
          "registered ARN names a different state machine"
        );
      }

      let key = published_key(name);
      store.set(&key, record.arn.clone()).await;
      debug!(key = %key, arn = %record.arn, "published state machine ARN");
      self.notifier.notify(SyncEvent::Published {
        key: key.clone(),
        arn: record.arn.clone(),
      });
      published.push(key);
    }

    Ok(published)
  }

  fn phase(&self, pass: u32, phase: DrainPhase) {
    debug!(pass, ?phase, "drain");
    self.notifier.notify(SyncEvent::Drain { pass, phase });
  }
}

use std::sync::Arc;

use sfn_local_config::{LocalSettings, Project};
use sfn_local_emulator::{Emulator, EmulatorConfig};
use sfn_local_host_kv::{InMemoryKvStore, KvStore};
use sfn_local_registry::{HttpStateMachineRegistry, StateMachineRegistry};
use sfn_local_sync::{ARN_ENV_PREFIX, SyncOptions, SyncReport, Synchronizer};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::error::PluginError;
use crate::hooks::Hook;
use crate::prepare::prepare_targets;

/// Emulator settings derived from `custom.stepFunctionsLocal`.
pub fn emulator_config(settings: &LocalSettings) -> EmulatorConfig {
  let mut config = EmulatorConfig::new(settings.install_path.clone(), settings.region.clone());
  config.port = settings.port;
  config.wait_time_scale = settings.wait_time_scale;
  config.managed = settings.start_app;
  config.ready_poll_interval = settings.ready_poll_interval;
  config.ready_timeout = settings.ready_timeout;
  config
}

pub fn sync_options(settings: &LocalSettings) -> SyncOptions {
  let mut options = SyncOptions::new(settings.account_id.clone());
  options.drain_backoff = settings.drain_backoff;
  options.drain_timeout = settings.drain_timeout;
  options.max_drain_passes = settings.max_drain_passes;
  options
}

struct DetachedStartup {
  cancel: CancellationToken,
  task: JoinHandle<()>,
}

/// Runs Step Functions Local for one project.
pub struct StepFunctionsLocalPlugin {
  project: Arc<Project>,
  registry: Arc<dyn StateMachineRegistry>,
  emulator: Arc<Mutex<Emulator>>,
  store: Arc<Mutex<InMemoryKvStore>>,
  detached: Option<DetachedStartup>,
}

impl StepFunctionsLocalPlugin {
  /// Create a plugin talking to Step Functions Local on the configured port.
  pub fn new(project: Project) -> Result<Self, PluginError> {
    let registry = HttpStateMachineRegistry::new(&project.settings.control_endpoint())?;
    Ok(Self::with_registry(project, Arc::new(registry)))
  }

  pub fn with_registry(project: Project, registry: Arc<dyn StateMachineRegistry>) -> Self {
    let emulator = Emulator::new(emulator_config(&project.settings));
    Self {
      project: Arc::new(project),
      registry,
      emulator: Arc::new(Mutex::new(emulator)),
      store: Arc::new(Mutex::new(InMemoryKvStore::new())),
      detached: None,
    }
  }

  pub fn project(&self) -> &Project {
    &self.project
  }

  /// Published `OFFLINE_STEP_FUNCTIONS_ARN_*` identifiers.
  pub fn store(&self) -> Arc<Mutex<InMemoryKvStore>> {
    Arc::clone(&self.store)
  }

  pub async fn handle(&mut self, hook: Hook) -> Result<(), PluginError> {
    info!(hook = %hook, "handling hook");
    match hook {
      Hook::OfflineStartInit => self.start().await.map(|_| ()),
      Hook::BeforeOfflineStartEnd => self.shutdown().await,
    }
  }

  /// Start Step Functions Local and synchronize the project's state machines.
  ///
  /// With `waitToStart: false` the work runs in the background and `None` is
  /// returned right away; failures are then only logged.
  pub async fn start(&mut self) -> Result<Option<SyncReport>, PluginError> {
    if self.project.settings.wait_to_start {
      let report = startup(
        Arc::clone(&self.project),
        Arc::clone(&self.registry),
        Arc::clone(&self.emulator),
        Arc::clone(&self.store),
      )
      .await?;
      return Ok(Some(report));
    }

    if self.detached.is_some() {
      warn!("startup already running in the background");
      return Ok(None);
    }

    let cancel = CancellationToken::new();
    let task = tokio::spawn({
      let cancel = cancel.clone();
      let startup = startup(
        Arc::clone(&self.project),
        Arc::clone(&self.registry),
        Arc::clone(&self.emulator),
        Arc::clone(&self.store),
      );
      async move {
        tokio::select! {
          result = startup => {
            if let Err(err) = result {
              error!(error = %err, "Step Functions Local startup failed");
            }
          }
          _ = cancel.cancelled() => warn!("Step Functions Local startup cancelled"),
        }
      }
    });

    info!("starting Step Functions Local in the background");
    self.detached = Some(DetachedStartup { cancel, task });
    Ok(None)
  }

  /// Stop Step Functions Local and remove the published identifiers.
  ///
  /// Entries the host added under other keys are left alone.
  pub async fn shutdown(&mut self) -> Result<(), PluginError> {
    if let Some(detached) = self.detached.take() {
      detached.cancel.cancel();
      if let Err(err) = detached.task.await {
        warn!(error = %err, "background startup task failed");
      }
    }

    self.emulator.lock().await.stop().await?;
    let mut store = self.store.lock().await;
    let entries = store.entries().await;
    for (key, _) in entries {
      if key.starts_with(ARN_ENV_PREFIX) {
        store.delete(&key).await;
        debug!(key = %key, "removed state machine ARN");
      }
    }
    info!("Step Functions Local stopped");
    Ok(())
  }
}

async fn startup(
  project: Arc<Project>,
  registry: Arc<dyn StateMachineRegistry>,
  emulator: Arc<Mutex<Emulator>>,
  store: Arc<Mutex<InMemoryKvStore>>,
) -> Result<SyncReport, PluginError> {
  let settings = &project.settings;
  let targets = prepare_targets(&project)?;

  if settings.start_app {
    let mut emulator = emulator.lock().await;
    emulator.install().await?;
    let lambda_endpoint = settings.lambda_endpoint.as_str().trim_end_matches('/');
    emulator.start(&settings.account_id, lambda_endpoint).await?;
    emulator.await_ready().await?;
  }

  let synchronizer = Synchronizer::new(registry, sync_options(settings));
  let mut store = store.lock().await;
  let report = synchronizer.sync(targets, &mut *store).await?;

  for (key, arn) in store.entries().await {
    info!(key = %key, arn = %arn, "state machine available");
  }
  Ok(report)
}

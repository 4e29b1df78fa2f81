use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use sfn_local_config::{LoadOptions, Project, load_project};
use sfn_local_emulator::Emulator;
use sfn_local_host_kv::{InMemoryKvStore, KvStore};
use sfn_local_plugin::{
  Hook, StepFunctionsLocalPlugin, emulator_config, prepare_targets, sync_options,
};
use sfn_local_registry::HttpStateMachineRegistry;
use sfn_local_sync::Synchronizer;

/// sfn-local - Run AWS Step Functions Local against a serverless project
#[derive(Parser)]
#[command(name = "sfn-local")]
#[command(version, about, long_about = None)]
struct Cli {
  /// Path to the project file (YAML or JSON)
  #[arg(long, global = true, default_value = "serverless.yml")]
  config: PathBuf,

  /// Stage used to name local functions (default: provider.stage or "dev")
  #[arg(long, global = true)]
  stage: Option<String>,

  /// Region, overriding custom.stepFunctionsLocal.region
  #[arg(long, global = true)]
  region: Option<String>,

  /// Enable debug logging
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Start Step Functions Local, register the state machines and wait
  Start {
    /// Write the published ARNs to this file as KEY=VALUE lines
    #[arg(long)]
    env_file: Option<PathBuf>,

    /// Command to run with the published ARNs in its environment
    #[arg(last = true)]
    command: Vec<String>,
  },

  /// Register the state machines with an already running Step Functions Local
  Sync,

  /// Print the resolved state machine definitions
  Resolve,

  /// Download Step Functions Local if it is not installed yet
  Install,
}

fn main() -> Result<()> {
  let cli = Cli::parse();
  init_tracing(cli.verbose);

  let options = LoadOptions {
    stage: cli.stage,
    region: cli.region,
  };
  let project = load_project(&cli.config, &options)
    .with_context(|| format!("failed to load project: {}", cli.config.display()))?;

  let rt = tokio::runtime::Runtime::new()?;
  match cli.command {
    Commands::Start { env_file, command } => rt.block_on(start(project, env_file, command)),
    Commands::Sync => rt.block_on(sync(project)),
    Commands::Resolve => resolve(&project),
    Commands::Install => rt.block_on(install(&project)),
  }
}

fn init_tracing(verbose: bool) {
  let level = if verbose { "debug" } else { "info" };
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
    .with_writer(std::io::stderr)
    .init();
}

async fn start(project: Project, env_file: Option<PathBuf>, command: Vec<String>) -> Result<()> {
  let detached = !project.settings.wait_to_start;
  let mut plugin =
    StepFunctionsLocalPlugin::new(project).context("failed to create Step Functions Local plugin")?;

  plugin
    .handle(Hook::OfflineStartInit)
    .await
    .context("failed to start Step Functions Local")?;

  if detached && (env_file.is_some() || !command.is_empty()) {
    warn!("waitToStart is false; state machine ARNs may not be published yet");
  }

  let store = plugin.store();
  let entries = store.lock().await.entries().await;

  if let Some(path) = &env_file {
    write_env_file(path, &store.lock().await.to_env_lines()).await?;
  }

  let outcome = if command.is_empty() {
    info!("press Ctrl-C to stop");
    tokio::signal::ctrl_c()
      .await
      .context("failed to listen for Ctrl-C")?;
    Ok(None)
  } else {
    run_command(&command, &entries).await
  };

  plugin
    .handle(Hook::BeforeOfflineStartEnd)
    .await
    .context("failed to stop Step Functions Local")?;

  match outcome? {
    Some(status) if !status.success() => bail!("command exited with {}", status),
    _ => Ok(()),
  }
}

/// Run `command` until it exits or Ctrl-C is pressed.
async fn run_command(command: &[String], env: &[(String, String)]) -> Result<Option<ExitStatus>> {
  let (program, args) = command
    .split_first()
    .context("no command given")?;

  info!(program = %program, "running command");
  let mut child = tokio::process::Command::new(program)
    .args(args)
    .envs(env.iter().map(|(key, value)| (key.as_str(), value.as_str())))
    .kill_on_drop(true)
    .spawn()
    .with_context(|| format!("failed to run {}", program))?;

  tokio::select! {
    status = child.wait() => Ok(Some(status?)),
    _ = tokio::signal::ctrl_c() => {
      info!("interrupted");
      child.kill().await?;
      Ok(None)
    }
  }
}

async fn write_env_file(path: &Path, content: &str) -> Result<()> {
  tokio::fs::write(path, content)
    .await
    .with_context(|| format!("failed to write env file: {}", path.display()))?;
  info!(path = %path.display(), "wrote state machine ARNs");
  Ok(())
}

async fn sync(project: Project) -> Result<()> {
  let targets = prepare_targets(&project)?;
  let registry = HttpStateMachineRegistry::new(&project.settings.control_endpoint())
    .context("failed to create control API client")?;

  let synchronizer = Synchronizer::new(Arc::new(registry), sync_options(&project.settings));
  let mut store = InMemoryKvStore::new();
  synchronizer
    .sync(targets, &mut store)
    .await
    .context("failed to synchronize state machines")?;

  print!("{}", store.to_env_lines());
  Ok(())
}

fn resolve(project: &Project) -> Result<()> {
  let mut output = serde_json::Map::new();
  for target in prepare_targets(project)? {
    output.insert(target.name, serde_json::to_value(&target.definition)?);
  }

  println!("{}", serde_json::to_string_pretty(&output)?);
  Ok(())
}

async fn install(project: &Project) -> Result<()> {
  let emulator = Emulator::new(emulator_config(&project.settings));
  let installed = emulator
    .install()
    .await
    .context("failed to install Step Functions Local")?;

  if !installed {
    info!(
      path = %emulator.config().jar_path().display(),
      "Step Functions Local is already installed"
    );
  }
  Ok(())
}

use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::net::TcpStream;
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep};
use tracing::{debug, info, warn};

use crate::config::{EmulatorConfig, JAR_NAME};
use crate::error::EmulatorError;
use crate::install;
use crate::port::wait_for_port;

const COMPONENT: &str = "step-functions-local";

/// Controls one Step Functions Local process.
///
/// The spawned process is killed when the controller is dropped.
pub struct Emulator {
  config: EmulatorConfig,
  child: Option<Child>,
  output: Vec<JoinHandle<()>>,
}

impl Emulator {
  pub fn new(config: EmulatorConfig) -> Self {
    Self {
      config,
      child: None,
      output: Vec::new(),
    }
  }

  pub fn config(&self) -> &EmulatorConfig {
    &self.config
  }

  pub fn is_running(&self) -> bool {
    self.child.is_some()
  }

  /// Install the distribution when it is missing.
  pub async fn install(&self) -> Result<bool, EmulatorError> {
    install::install(&self.config).await
  }

  /// Arguments passed to `java`.
  pub fn args(&self, account_id: &str, lambda_endpoint: &str) -> Vec<String> {
    let mut args = vec![
      "-jar".to_string(),
      JAR_NAME.to_string(),
      "--lambda-endpoint".to_string(),
      lambda_endpoint.to_string(),
      "--aws-account".to_string(),
      account_id.to_string(),
      "--region".to_string(),
      self.config.region.clone(),
    ];
    if let Some(scale) = self.config.wait_time_scale {
      args.push("--wait-time-scale".to_string());
      args.push(scale.to_string());
    }
    args
  }

  /// Spawn Step Functions Local. Does nothing when not managed or already running.
  pub async fn start(&mut self, account_id: &str, lambda_endpoint: &str) -> Result<(), EmulatorError> {
    if !self.config.managed {
      info!(
        port = self.config.port,
        "using an already running Step Functions Local"
      );
      return Ok(());
    }
    if self.child.is_some() {
      debug!("Step Functions Local already started");
      return Ok(());
    }

    let args = self.args(account_id, lambda_endpoint);
    debug!(program = %self.config.java_bin, ?args, "spawning Step Functions Local");

    let mut child = Command::new(&self.config.java_bin)
      .args(&args)
      .current_dir(&self.config.install_dir)
      .stdin(Stdio::null())
      .stdout(Stdio::piped())
      .stderr(Stdio::piped())
      .kill_on_drop(true)
      .spawn()
      .map_err(|source| EmulatorError::Spawn {
        program: self.config.java_bin.clone(),
        source,
      })?;

    info!(pid = ?child.id(), port = self.config.port, "started Step Functions Local");

    if let Some(stdout) = child.stdout.take() {
      self.output.push(forward(stdout, false));
    }
    if let Some(stderr) = child.stderr.take() {
      self.output.push(forward(stderr, true));
    }
    self.child = Some(child);
    Ok(())
  }

  /// Wait until the control port accepts connections.
  ///
  /// Fails early when the spawned process exits first.
  pub async fn await_ready(&mut self) -> Result<(), EmulatorError> {
    let port = self.config.port;
    let timeout = self.config.ready_timeout;
    if self.child.is_none() {
      return wait_for_port(port, self.config.ready_poll_interval, timeout).await;
    }

    let deadline = Instant::now() + timeout;

    loop {
      if TcpStream::connect(("127.0.0.1", port)).await.is_ok() {
        info!(port, "Step Functions Local is ready");
        return Ok(());
      }

      if let Some(child) = self.child.as_mut()
        && let Some(status) = child.try_wait()?
      {
        self.child = None;
        return Err(EmulatorError::Exited {
          status: status.to_string(),
        });
      }

      if Instant::now() + self.config.ready_poll_interval > deadline {
        return Err(EmulatorError::StartupTimeout { port, timeout });
      }
      sleep(self.config.ready_poll_interval).await;
    }
  }

  /// Kill and reap the spawned process. No-op when nothing was spawned.
  pub async fn stop(&mut self) -> Result<(), EmulatorError> {
    let Some(mut child) = self.child.take() else {
      return Ok(());
    };

    info!(pid = ?child.id(), "stopping Step Functions Local");
    child.kill().await?;
    for handle in self.output.drain(..) {
      handle.abort();
    }
    Ok(())
  }
}

/// Forward a process stream to the log, line by line.
fn forward<R>(stream: R, is_stderr: bool) -> JoinHandle<()>
where
  R: AsyncRead + Unpin + Send + 'static,
{
  tokio::spawn(async move {
    let mut lines = BufReader::new(stream).lines();
    loop {
      match lines.next_line().await {
        Ok(Some(line)) if is_stderr => warn!(component = COMPONENT, "{}", line),
        Ok(Some(line)) => info!(component = COMPONENT, "{}", line),
        Ok(None) => break,
        Err(err) => {
          warn!(component = COMPONENT, error = %err, "failed to read output");
          break;
        }
      }
    }
  })
}

use std::path::{Path, PathBuf};
use std::time::Duration;

pub const JAR_NAME: &str = "StepFunctionsLocal.jar";
pub const DEFAULT_DOWNLOAD_URL: &str =
  "https://s3.amazonaws.com/stepfunctionslocal/StepFunctionsLocal.zip";
pub const DEFAULT_PORT: u16 = 8083;

/// How to run Step Functions Local.
#[derive(Debug, Clone, PartialEq)]
pub struct EmulatorConfig {
  /// Directory holding `StepFunctionsLocal.jar`.
  pub install_dir: PathBuf,
  pub region: String,
  pub port: u16,
  pub wait_time_scale: Option<f64>,
  /// Spawn the process; otherwise an already running instance is assumed.
  pub managed: bool,
  pub java_bin: String,
  pub download_url: String,
  pub ready_poll_interval: Duration,
  pub ready_timeout: Duration,
}

impl EmulatorConfig {
  pub fn new(install_dir: impl Into<PathBuf>, region: impl Into<String>) -> Self {
    Self {
      install_dir: install_dir.into(),
      region: region.into(),
      port: DEFAULT_PORT,
      wait_time_scale: None,
      managed: true,
      java_bin: "java".to_string(),
      download_url: DEFAULT_DOWNLOAD_URL.to_string(),
      ready_poll_interval: Duration::from_millis(200),
      ready_timeout: Duration::from_secs(10),
    }
  }

  pub fn jar_path(&self) -> PathBuf {
    self.install_dir.join(JAR_NAME)
  }

  pub fn install_dir(&self) -> &Path {
    &self.install_dir
  }
}

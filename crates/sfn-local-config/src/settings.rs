use std::path::PathBuf;
use std::time::Duration;

use sfn_local_resolver::TaskResourceOverrides;
use url::Url;

use crate::error::ConfigError;
use crate::project::LocalSettingsFile;

pub const DEFAULT_LAMBDA_ENDPOINT: &str = "http://localhost:4000";
pub const DEFAULT_INSTALL_PATH: &str = "./.step-functions-local";
pub const DEFAULT_PORT: u16 = 8083;
const DEFAULT_READY_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_READY_POLL_INTERVAL_MS: u64 = 200;
const DEFAULT_DRAIN_BACKOFF_MS: u64 = 1_000;
const DEFAULT_DRAIN_TIMEOUT_MS: u64 = 60_000;
const DEFAULT_MAX_DRAIN_PASSES: u32 = 30;

/// Validated `custom.stepFunctionsLocal` settings.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalSettings {
  pub account_id: String,
  pub region: String,
  /// Endpoint Step Functions Local calls to invoke Lambda functions.
  pub lambda_endpoint: Url,
  /// Directory holding the Step Functions Local distribution.
  pub install_path: PathBuf,
  pub task_resource_mapping: TaskResourceOverrides,
  /// Spawn Step Functions Local; otherwise an already running instance is used.
  pub start_app: bool,
  /// Block startup until registration completes; otherwise run it detached.
  pub wait_to_start: bool,
  pub port: u16,
  pub wait_time_scale: Option<f64>,
  pub ready_timeout: Duration,
  pub ready_poll_interval: Duration,
  pub drain_backoff: Duration,
  pub drain_timeout: Duration,
  pub max_drain_passes: u32,
}

impl LocalSettings {
  /// Validate raw settings. `region` takes precedence over the file's region.
  pub(crate) fn from_file(
    file: Option<LocalSettingsFile>,
    region: Option<String>,
  ) -> Result<Self, ConfigError> {
    let file = file.unwrap_or_default();

    let account_id = file
      .account_id
      .map(|id| id.into_string())
      .filter(|id| !id.is_empty())
      .ok_or(ConfigError::MissingAccountId)?;

    let region = region
      .or(file.region)
      .filter(|region| !region.is_empty())
      .ok_or(ConfigError::MissingRegion)?;

    let endpoint = file
      .lambda_endpoint
      .unwrap_or_else(|| DEFAULT_LAMBDA_ENDPOINT.to_string());
    let lambda_endpoint =
      Url::parse(&endpoint).map_err(|source| ConfigError::InvalidEndpoint { endpoint, source })?;

    Ok(Self {
      account_id,
      region,
      lambda_endpoint,
      install_path: file
        .path
        .unwrap_or_else(|| PathBuf::from(DEFAULT_INSTALL_PATH)),
      task_resource_mapping: file.task_resource_mapping.unwrap_or_default(),
      start_app: file.start_step_functions_local_app.unwrap_or(true),
      wait_to_start: file.wait_to_start.unwrap_or(true),
      port: file.port.unwrap_or(DEFAULT_PORT),
      wait_time_scale: file.wait_time_scale,
      ready_timeout: Duration::from_millis(
        file.ready_timeout_ms.unwrap_or(DEFAULT_READY_TIMEOUT_MS),
      ),
      ready_poll_interval: Duration::from_millis(
        file
          .ready_poll_interval_ms
          .unwrap_or(DEFAULT_READY_POLL_INTERVAL_MS),
      ),
      drain_backoff: Duration::from_millis(
        file.drain_backoff_ms.unwrap_or(DEFAULT_DRAIN_BACKOFF_MS),
      ),
      drain_timeout: Duration::from_millis(
        file.drain_timeout_ms.unwrap_or(DEFAULT_DRAIN_TIMEOUT_MS),
      ),
      max_drain_passes: file.max_drain_passes.unwrap_or(DEFAULT_MAX_DRAIN_PASSES),
    })
  }

  /// Base URL of the Step Functions Local control API.
  pub fn control_endpoint(&self) -> String {
    format!("http://localhost:{}", self.port)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::project::AccountId;

  fn file() -> LocalSettingsFile {
    LocalSettingsFile {
      account_id: Some(AccountId::Number(101010101010)),
      region: Some("us-east-1".to_string()),
      ..Default::default()
    }
  }

  #[test]
  fn test_defaults() {
    let settings = LocalSettings::from_file(Some(file()), None).unwrap();

    assert_eq!(settings.account_id, "101010101010");
    assert_eq!(settings.region, "us-east-1");
    assert_eq!(settings.lambda_endpoint.as_str(), "http://localhost:4000/");
    assert_eq!(settings.install_path, PathBuf::from("./.step-functions-local"));
    assert!(settings.task_resource_mapping.is_empty());
    assert!(settings.start_app);
    assert!(settings.wait_to_start);
    assert_eq!(settings.port, 8083);
    assert_eq!(settings.ready_timeout, Duration::from_secs(10));
    assert_eq!(settings.ready_poll_interval, Duration::from_millis(200));
    assert_eq!(settings.drain_backoff, Duration::from_secs(1));
    assert_eq!(settings.control_endpoint(), "http://localhost:8083");
  }

  #[test]
  fn test_missing_account_id() {
    let mut raw = file();
    raw.account_id = None;
    assert!(matches!(
      LocalSettings::from_file(Some(raw), None),
      Err(ConfigError::MissingAccountId)
    ));
  }

  #[test]
  fn test_missing_block_reports_account_first() {
    assert!(matches!(
      LocalSettings::from_file(None, None),
      Err(ConfigError::MissingAccountId)
    ));
  }

  #[test]
  fn test_missing_region() {
    let mut raw = file();
    raw.region = None;
    assert!(matches!(
      LocalSettings::from_file(Some(raw), None),
      Err(ConfigError::MissingRegion)
    ));
  }

  #[test]
  fn test_region_override() {
    let settings = LocalSettings::from_file(Some(file()), Some("eu-west-1".to_string())).unwrap();
    assert_eq!(settings.region, "eu-west-1");
  }

  #[test]
  fn test_invalid_lambda_endpoint() {
    let mut raw = file();
    raw.lambda_endpoint = Some("not a url".to_string());
    assert!(matches!(
      LocalSettings::from_file(Some(raw), None),
      Err(ConfigError::InvalidEndpoint { .. })
    ));
  }
}

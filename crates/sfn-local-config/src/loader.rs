use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use sfn_local_resolver::{ResolveContext, TaskResourceOverrides};
use tracing::debug;

use crate::error::ConfigError;
use crate::project::{ProjectFile, StateMachineEntry};
use crate::settings::LocalSettings;
use crate::yaml;

const DEFAULT_STAGE: &str = "dev";

/// Values supplied on the command line that win over the project file.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
  pub stage: Option<String>,
  pub region: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectFormat {
  Yaml,
  Json,
}

impl ProjectFormat {
  /// Pick the format from a file extension.
  pub fn from_path(path: &Path) -> Option<Self> {
    match path.extension().and_then(|ext| ext.to_str()) {
      Some("yml") | Some("yaml") => Some(ProjectFormat::Yaml),
      Some("json") => Some(ProjectFormat::Json),
      _ => None,
    }
  }
}

/// A loaded serverless project.
#[derive(Debug, Clone)]
pub struct Project {
  pub service: String,
  pub stage: String,
  pub settings: LocalSettings,
  /// State machines keyed by their project key, in declaration order.
  pub state_machines: IndexMap<String, StateMachineEntry>,
  /// File the project was loaded from, if any.
  pub source: Option<PathBuf>,
}

impl Project {
  /// Context used to turn `Fn::GetAtt` references into local function ARNs.
  pub fn resolve_context(&self) -> ResolveContext {
    ResolveContext::new(
      self.settings.region.clone(),
      self.settings.account_id.clone(),
      self.service.clone(),
      self.stage.clone(),
    )
  }

  pub fn overrides(&self) -> &TaskResourceOverrides {
    &self.settings.task_resource_mapping
  }
}

/// Load a project from disk.
pub fn load_project(path: impl AsRef<Path>, options: &LoadOptions) -> Result<Project, ConfigError> {
  let path = path.as_ref();
  let format = ProjectFormat::from_path(path).ok_or_else(|| ConfigError::UnsupportedFormat {
    path: path.to_path_buf(),
  })?;

  let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
    path: path.to_path_buf(),
    source,
  })?;

  let mut project = parse_project(&content, format, options)?;
  project.source = Some(path.to_path_buf());
  debug!(
    path = %path.display(),
    state_machines = project.state_machines.len(),
    "loaded project"
  );
  Ok(project)
}

/// Parse a project document.
pub fn parse_project(
  content: &str,
  format: ProjectFormat,
  options: &LoadOptions,
) -> Result<Project, ConfigError> {
  let document = match format {
    ProjectFormat::Yaml => {
      let mut value: serde_yaml::Value = serde_yaml::from_str(content)?;
      value.apply_merge()?;
      yaml::to_json(value)?
    }
    ProjectFormat::Json => serde_json::from_str(content)?,
  };
  let file: ProjectFile = serde_json::from_value(document)?;

  let service = file
    .service
    .map(|service| service.into_name())
    .filter(|name| !name.is_empty())
    .ok_or(ConfigError::MissingField("service"))?;

  let stage = options
    .stage
    .clone()
    .or(file.provider.stage)
    .unwrap_or_else(|| DEFAULT_STAGE.to_string());

  let settings = LocalSettings::from_file(file.custom.step_functions_local, options.region.clone())?;

  let state_machines = file
    .step_functions
    .and_then(|section| section.state_machines)
    .ok_or(ConfigError::MissingField("stepFunctions.stateMachines"))?;

  Ok(Project {
    service,
    stage,
    settings,
    state_machines,
    source: None,
  })
}

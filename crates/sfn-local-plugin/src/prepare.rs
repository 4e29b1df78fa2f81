use sfn_local_config::Project;
use sfn_local_resolver::{ArnResolver, Resolver};
use sfn_local_sync::SyncTarget;
use tracing::{debug, warn};

use crate::error::PluginError;

/// Resolve every state machine of `project` and apply its task resource mapping.
pub fn prepare_targets(project: &Project) -> Result<Vec<SyncTarget>, PluginError> {
  let resolver = ArnResolver::new(project.resolve_context());
  let overrides = project.overrides();
  let mut applied: Vec<String> = Vec::new();
  let mut targets = Vec::with_capacity(project.state_machines.len());

  for (key, entry) in &project.state_machines {
    let name = entry.registered_name(key);
    let resolved =
      resolver
        .resolve(entry.definition.clone())
        .map_err(|source| PluginError::Resolve {
          state_machine: name.to_string(),
          source,
        })?;

    let (definition, overridden) = overrides.apply(resolved);
    debug!(state_machine = %name, overridden = overridden.len(), "prepared definition");
    applied.extend(overridden);
    targets.push(SyncTarget::new(name, definition));
  }

  for key in overrides.unmatched_keys(applied.iter().map(String::as_str)) {
    warn!(state = %key, "TaskResourceMapping entry matches no task state");
  }

  Ok(targets)
}

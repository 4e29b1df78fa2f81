use std::fmt;
use std::str::FromStr;

use crate::error::PluginError;

/// Host lifecycle hooks the plugin reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hook {
  /// `offline:start:init`
  OfflineStartInit,
  /// `before:offline:start:end`
  BeforeOfflineStartEnd,
}

impl Hook {
  pub const ALL: [Hook; 2] = [Hook::OfflineStartInit, Hook::BeforeOfflineStartEnd];

  pub const fn name(&self) -> &'static str {
    match self {
      Hook::OfflineStartInit => "offline:start:init",
      Hook::BeforeOfflineStartEnd => "before:offline:start:end",
    }
  }
}

impl fmt::Display for Hook {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

impl FromStr for Hook {
  type Err = PluginError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Hook::ALL
      .into_iter()
      .find(|hook| hook.name() == s)
      .ok_or_else(|| PluginError::UnknownHook(s.to_string()))
  }
}

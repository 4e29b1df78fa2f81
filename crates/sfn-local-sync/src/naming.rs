use crate::error::SyncError;

/// Prefix of the published identifier keys.
pub const ARN_ENV_PREFIX: &str = "OFFLINE_STEP_FUNCTIONS_ARN_";

/// Role attached to every registered state machine. Step Functions Local does
/// not check it.
pub fn role_arn(account_id: &str) -> String {
  format!("arn:aws:iam::{}:role/DummyRole", account_id)
}

pub fn published_key(name: &str) -> String {
  format!("{}{}", ARN_ENV_PREFIX, name)
}

/// Name part of `arn:partition:states:region:account:stateMachine:NAME`.
pub fn state_machine_name(arn: &str) -> Result<&str, SyncError> {
  let parts: Vec<&str> = arn.split(':').collect();
  match parts.as_slice() {
    ["arn", _, "states", _, _, "stateMachine", name, ..] if !name.is_empty() => Ok(*name),
    _ => Err(SyncError::MalformedArn {
      arn: arn.to_string(),
    }),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_state_machine_name() {
    assert_eq!(
      state_machine_name("arn:aws:states:us-east-1:101010101010:stateMachine:WaitMachine").unwrap(),
      "WaitMachine"
    );
  }

  #[test]
  fn test_state_machine_name_ignores_version_suffix() {
    assert_eq!(
      state_machine_name("arn:aws:states:us-east-1:1:stateMachine:A:3").unwrap(),
      "A"
    );
  }

  #[test]
  fn test_malformed_arn() {
    for arn in ["", "WaitMachine", "arn:aws:states:us-east-1:1:stateMachine:", "arn:aws:lambda:us-east-1:1:function:f"] {
      assert!(
        matches!(state_machine_name(arn), Err(SyncError::MalformedArn { .. })),
        "{arn}"
      );
    }
  }

  #[test]
  fn test_role_and_key() {
    assert_eq!(role_arn("101010101010"), "arn:aws:iam::101010101010:role/DummyRole");
    assert_eq!(
      published_key("WaitMachine"),
      "OFFLINE_STEP_FUNCTIONS_ARN_WaitMachine"
    );
  }
}

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::RegistryError;
use crate::registry::StateMachineRegistry;
use crate::types::{
  CreateStateMachine, CreatedStateMachine, StateMachineDescription, StateMachinePage,
};

const AMZ_JSON: &str = "application/x-amz-json-1.0";
const AMZ_TARGET: &str = "X-Amz-Target";
const TARGET_PREFIX: &str = "AWSStepFunctions";

/// Control API client for a running Step Functions Local instance.
///
/// Requests are not signed; Step Functions Local accepts anonymous calls.
pub struct HttpStateMachineRegistry {
  client: Client,
  endpoint: Url,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ListInput {
  #[serde(skip_serializing_if = "Option::is_none")]
  next_token: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ArnInput<'a> {
  state_machine_arn: &'a str,
}

#[derive(Deserialize)]
struct Empty {}

#[derive(Deserialize)]
struct ErrorBody {
  #[serde(rename = "__type")]
  error_type: Option<String>,
  #[serde(alias = "Message")]
  message: Option<String>,
}

impl HttpStateMachineRegistry {
  /// Create a client for the control API at `endpoint`, e.g. `http://localhost:8083`.
  pub fn new(endpoint: &str) -> Result<Self, RegistryError> {
    let url = Url::parse(endpoint).map_err(|source| RegistryError::InvalidEndpoint {
      endpoint: endpoint.to_string(),
      source,
    })?;

    let client = Client::builder().timeout(Duration::from_secs(30)).build()?;

    Ok(Self {
      client,
      endpoint: url,
    })
  }

  pub fn endpoint(&self) -> &Url {
    &self.endpoint
  }

  async fn call<I: Serialize, O: DeserializeOwned>(
    &self,
    operation: &str,
    input: &I,
  ) -> Result<O, RegistryError> {
    let body = serde_json::to_vec(input)?;
    debug!(operation, endpoint = %self.endpoint, "control API request");

    let response = self
      .client
      .post(self.endpoint.clone())
      .header(CONTENT_TYPE, AMZ_JSON)
      .header(AMZ_TARGET, format!("{}.{}", TARGET_PREFIX, operation))
      .body(body)
      .send()
      .await?;

    let status = response.status();
    let bytes = response.bytes().await?;

    if status.is_success() {
      let bytes: &[u8] = if bytes.is_empty() { b"{}" } else { &bytes };
      Ok(serde_json::from_slice(bytes)?)
    } else {
      Err(api_error(status.as_u16(), &bytes))
    }
  }
}

/// Decode an AWS JSON error body. `__type` may carry a namespace prefix
/// (`com.amazonaws.swf.base.model#StateMachineDoesNotExist`).
fn api_error(status: u16, body: &[u8]) -> RegistryError {
  let parsed: Option<ErrorBody> = serde_json::from_slice(body).ok();
  let (error_type, message) = match parsed {
    Some(parsed) => (parsed.error_type, parsed.message),
    None => (None, None),
  };

  let code = error_type
    .as_deref()
    .map(|t| t.rsplit('#').next().unwrap_or(t))
    .map(|t| t.split(':').next().unwrap_or(t))
    .unwrap_or("Unknown")
    .to_string();
  let message = message.unwrap_or_else(|| String::from_utf8_lossy(body).into_owned());

  RegistryError::Api {
    status,
    code,
    message,
  }
}

fn not_found(arn: &str, err: RegistryError) -> RegistryError {
  if err.is_not_found() {
    RegistryError::NotFound {
      arn: arn.to_string(),
    }
  } else {
    err
  }
}

#[async_trait]
impl StateMachineRegistry for HttpStateMachineRegistry {
  async fn list_state_machines(
    &self,
    next_token: Option<String>,
  ) -> Result<StateMachinePage, RegistryError> {
    self.call("ListStateMachines", &ListInput { next_token }).await
  }

  async fn delete_state_machine(&self, arn: &str) -> Result<(), RegistryError> {
    let input = ArnInput {
      state_machine_arn: arn,
    };
    self
      .call::<_, Empty>("DeleteStateMachine", &input)
      .await
      .map(|_| ())
      .map_err(|err| not_found(arn, err))
  }

  async fn create_state_machine(
    &self,
    request: CreateStateMachine,
  ) -> Result<CreatedStateMachine, RegistryError> {
    self.call("CreateStateMachine", &request).await
  }

  async fn describe_state_machine(
    &self,
    arn: &str,
  ) -> Result<StateMachineDescription, RegistryError> {
    let input = ArnInput {
      state_machine_arn: arn,
    };
    self
      .call("DescribeStateMachine", &input)
      .await
      .map_err(|err| not_found(arn, err))
  }
}

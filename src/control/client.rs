use super::types::{
    CanStopResult, EventRequest, InitRequest, TransitionRequest, TransitionResult, WorkflowState,
};
use super::{ControlError, WorkflowControl};
use crate::shared::logging::HookLog;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

pub const READ_TIMEOUT: Duration = Duration::from_secs(3);
pub const MUTATE_TIMEOUT: Duration = Duration::from_secs(5);

/// Memoryless HTTP wrapper around the workflow daemon. No retries, no cache.
#[derive(Debug, Clone)]
pub struct ControlClient {
    base_url: String,
    read_agent: ureq::Agent,
    mutate_agent: ureq::Agent,
    log: HookLog,
}

enum Reply {
    Success(ureq::Response),
    Rejected(u16, ureq::Response),
}

impl ControlClient {
    pub fn new(base_url: &str, log: HookLog) -> Self {
        Self::with_timeouts(base_url, log, READ_TIMEOUT, MUTATE_TIMEOUT)
    }

    pub fn with_timeouts(
        base_url: &str,
        log: HookLog,
        read_timeout: Duration,
        mutate_timeout: Duration,
    ) -> Self {
        Self {
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            read_agent: ureq::AgentBuilder::new().timeout(read_timeout).build(),
            mutate_agent: ureq::AgentBuilder::new().timeout(mutate_timeout).build(),
            log,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str, query: &[(&str, &str)]) -> String {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        if query.is_empty() {
            return url;
        }
        let encoded = query
            .iter()
            .map(|(k, v)| format!("{k}={}", urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        format!("{url}?{encoded}")
    }

    fn get(&self, url: &str) -> Result<Reply, ControlError> {
        classify(url, self.read_agent.get(url).call())
    }

    fn post<B: Serialize>(
        &self,
        agent: &ureq::Agent,
        url: &str,
        body: &B,
    ) -> Result<Reply, ControlError> {
        let body = serde_json::to_value(body).map_err(|e| ControlError::Decode {
            url: url.to_string(),
            reason: format!("request body could not be encoded: {e}"),
        })?;
        classify(url, agent.post(url).send_json(body))
    }

    fn unavailable(&self, event: &str, err: &ControlError) {
        self.log.warn(event, &err.to_string());
    }
}

fn classify(
    url: &str,
    result: Result<ureq::Response, ureq::Error>,
) -> Result<Reply, ControlError> {
    match result {
        Ok(response) if (200..300).contains(&response.status()) => Ok(Reply::Success(response)),
        Ok(response) => Ok(Reply::Rejected(response.status(), response)),
        Err(ureq::Error::Status(status, response)) => Ok(Reply::Rejected(status, response)),
        Err(err) => Err(ControlError::Transport {
            url: url.to_string(),
            reason: err.to_string(),
        }),
    }
}

fn decode<T: DeserializeOwned>(url: &str, response: ureq::Response) -> Result<T, ControlError> {
    response
        .into_json::<T>()
        .map_err(|e| ControlError::Decode {
            url: url.to_string(),
            reason: e.to_string(),
        })
}

fn expect_success(url: &str, reply: Reply) -> Result<ureq::Response, ControlError> {
    match reply {
        Reply::Success(response) => Ok(response),
        Reply::Rejected(status, _) => Err(ControlError::UnexpectedStatus {
            url: url.to_string(),
            status,
        }),
    }
}

/// Status bodies without a workflow id, or flagged inactive, mean nothing is
/// being tracked.
fn workflow_from_status_body(body: Value, url: &str) -> Result<WorkflowState, ControlError> {
    if body.get("active").and_then(Value::as_bool) == Some(false) {
        return Err(ControlError::NoActiveWorkflow);
    }
    let state: WorkflowState = serde_json::from_value(body).map_err(|e| ControlError::Decode {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    if state.workflow_id.trim().is_empty() {
        return Err(ControlError::NoActiveWorkflow);
    }
    Ok(state)
}

impl WorkflowControl for ControlClient {
    fn init_workflow(&self, request: &InitRequest) -> Result<WorkflowState, ControlError> {
        let url = self.endpoint("workflow/init", &[]);
        let result = self
            .post(&self.mutate_agent, &url, request)
            .and_then(|reply| expect_success(&url, reply))
            .and_then(|response| decode::<Value>(&url, response))
            .and_then(|body| workflow_from_status_body(body, &url));
        if let Err(err) = &result {
            self.unavailable("init_unavailable", err);
        }
        result
    }

    fn get_status(&self, workflow_id: &str) -> Result<WorkflowState, ControlError> {
        if workflow_id.trim().is_empty() {
            return Err(ControlError::NoActiveWorkflow);
        }
        let url = self.endpoint("workflow/status", &[("workflow_id", workflow_id)]);
        let result = match self.get(&url) {
            Ok(Reply::Rejected(404, _)) => Err(ControlError::NoActiveWorkflow),
            Ok(reply) => expect_success(&url, reply)
                .and_then(|response| decode::<Value>(&url, response))
                .and_then(|body| workflow_from_status_body(body, &url)),
            Err(err) => Err(err),
        };
        match &result {
            Err(ControlError::NoActiveWorkflow) | Ok(_) => {}
            Err(err) => self.unavailable("status_unavailable", err),
        }
        result
    }

    fn transition(&self, request: &TransitionRequest) -> TransitionResult {
        let url = self.endpoint("workflow/transition", &[]);
        match self.post(&self.mutate_agent, &url, request) {
            Ok(Reply::Success(response)) => decode::<TransitionResult>(&url, response)
                .unwrap_or_else(|err| {
                    self.unavailable("transition_unavailable", &err);
                    TransitionResult::failed(format!("Daemon unavailable: {err}"))
                }),
            Ok(Reply::Rejected(status, response)) => {
                match decode::<TransitionResult>(&url, response) {
                    Ok(mut result) => {
                        result.success = false;
                        if result.message.trim().is_empty() {
                            result.message = format!("Transition rejected with status {status}");
                        }
                        result
                    }
                    Err(_) => {
                        let err = ControlError::UnexpectedStatus { url, status };
                        self.unavailable("transition_unavailable", &err);
                        TransitionResult::failed(format!("Daemon unavailable: {err}"))
                    }
                }
            }
            Err(err) => {
                self.unavailable("transition_unavailable", &err);
                TransitionResult::failed(format!("Daemon unavailable: {err}"))
            }
        }
    }

    fn can_stop(&self, workflow_id: &str) -> CanStopResult {
        if workflow_id.trim().is_empty() {
            return CanStopResult::allowed("No active workflow");
        }
        let url = self.endpoint("workflow/can-stop", &[("workflow_id", workflow_id)]);
        let result = self
            .get(&url)
            .and_then(|reply| expect_success(&url, reply))
            .and_then(|response| decode::<CanStopResult>(&url, response));
        match result {
            Ok(result) => result,
            Err(err) => {
                self.unavailable("can_stop_unavailable", &err);
                CanStopResult::allowed(format!("Daemon check failed: {err}"))
            }
        }
    }

    fn record_event(&self, request: &EventRequest) -> bool {
        let url = self.endpoint("event/record", &[]);
        let result = self
            .post(&self.read_agent, &url, request)
            .and_then(|reply| expect_success(&url, reply));
        match result {
            Ok(_) => true,
            Err(err) => {
                self.unavailable("event_record_failed", &err);
                false
            }
        }
    }
}

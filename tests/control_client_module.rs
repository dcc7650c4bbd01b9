use phasegate::control::{
    ControlClient, ControlError, EventRequest, InitRequest, PhaseStatus, TransitionRequest,
    WorkflowControl,
};
use phasegate::shared::logging::HookLog;
use serde_json::{Map, Value};
use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
struct RecordedRequest {
    method: String,
    path: String,
    body: String,
}

struct MockDaemon {
    base_url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockDaemon {
    fn start<F>(responder: F) -> Self
    where
        F: Fn(&str, &str) -> (u16, String) + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind mock daemon");
        let addr = listener.local_addr().expect("local addr");
        let requests = Arc::new(Mutex::new(Vec::new()));
        let requests_for_thread = Arc::clone(&requests);

        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else {
                    continue;
                };
                let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));
                let mut request_line = String::new();
                reader
                    .read_line(&mut request_line)
                    .expect("read request line");
                let mut parts = request_line.split_whitespace();
                let method = parts.next().unwrap_or("GET").to_string();
                let path = parts.next().unwrap_or("/").to_string();

                let mut content_length = 0usize;
                loop {
                    let mut line = String::new();
                    reader.read_line(&mut line).expect("read header");
                    if line == "\r\n" || line.is_empty() {
                        break;
                    }
                    if line.to_ascii_lowercase().starts_with("content-length:") {
                        content_length = line
                            .split_once(':')
                            .map(|(_, v)| v.trim().parse::<usize>().unwrap_or(0))
                            .unwrap_or(0);
                    }
                }
                let mut body = vec![0_u8; content_length];
                if content_length > 0 {
                    reader.read_exact(&mut body).expect("read body");
                }
                let body = String::from_utf8_lossy(&body).to_string();

                requests_for_thread
                    .lock()
                    .expect("lock requests")
                    .push(RecordedRequest {
                        method: method.clone(),
                        path: path.clone(),
                        body,
                    });

                let (status, response_body) = responder(&method, &path);
                let response = format!(
                    "HTTP/1.1 {status} Mock\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    response_body.len(),
                    response_body
                );
                stream
                    .write_all(response.as_bytes())
                    .expect("write response");
            }
        });

        Self {
            base_url: format!("http://{addr}"),
            requests,
        }
    }

    fn client(&self) -> ControlClient {
        ControlClient::new(&self.base_url, HookLog::disabled("test"))
    }

    fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().expect("lock requests").clone()
    }
}

fn body_json(request: &RecordedRequest) -> Value {
    serde_json::from_str(&request.body).expect("request body json")
}

fn unreachable_client() -> ControlClient {
    ControlClient::new("http://127.0.0.1:1", HookLog::disabled("test"))
}

#[test]
fn init_posts_request_and_decodes_state() {
    let daemon = MockDaemon::start(|_, _| {
        (
            200,
            serde_json::json!({
                "workflow_id": "wf-42",
                "command": "plan",
                "workflow_type": "planning",
                "phases": ["discover", "design"],
                "final_phase": "schema-check",
                "current_phase": "discover",
                "phase_status": "agent_required",
                "allowed_next_phases": ["design"],
                "is_dispatcher": false,
                "required_agent": "discover-agent",
                "metadata": null
            })
            .to_string(),
        )
    });
    let mut metadata = Map::new();
    metadata.insert("source".to_string(), Value::from("workflow_hook"));

    let state = daemon
        .client()
        .init_workflow(&InitRequest {
            command: "plan".to_string(),
            session_id: Some("sess-1".to_string()),
            workspace_root: "/repo".to_string(),
            task: Some("add a login page".to_string()),
            metadata,
        })
        .expect("init");
    assert_eq!(state.workflow_id, "wf-42");
    assert_eq!(state.phase_status, PhaseStatus::AgentRequired);
    assert_eq!(state.total_phases(), 3);

    let requests = daemon.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, "POST");
    assert_eq!(requests[0].path, "/workflow/init");
    let body = body_json(&requests[0]);
    assert_eq!(body["command"], "plan");
    assert_eq!(body["task"], "add a login page");
    assert_eq!(body["workspace_root"], "/repo");
    assert_eq!(body["metadata"]["source"], "workflow_hook");
}

#[test]
fn status_addresses_workflow_by_id_and_maps_sentinels() {
    let daemon = MockDaemon::start(|_, path| {
        if path.contains("wf-missing") {
            (404, r#"{"detail":"not found"}"#.to_string())
        } else if path.contains("wf-inactive") {
            (200, r#"{"active":false}"#.to_string())
        } else if path.contains("wf-broken") {
            (500, "oops".to_string())
        } else {
            (
                200,
                r#"{"workflow_id":"wf 1","current_phase":"router","phase_status":"agent_running","is_dispatcher":true}"#
                    .to_string(),
            )
        }
    });
    let client = daemon.client();

    let state = client.get_status("wf 1").expect("status");
    assert!(state.is_dispatcher);
    assert_eq!(state.phase_status, PhaseStatus::AgentRunning);
    assert_eq!(daemon.requests()[0].path, "/workflow/status?workflow_id=wf%201");

    assert!(matches!(
        client.get_status("wf-missing"),
        Err(ControlError::NoActiveWorkflow)
    ));
    assert!(matches!(
        client.get_status("wf-inactive"),
        Err(ControlError::NoActiveWorkflow)
    ));
    assert!(matches!(
        client.get_status("wf-broken"),
        Err(ControlError::UnexpectedStatus { status: 500, .. })
    ));
}

fn transition_request(to_phase: &str) -> TransitionRequest {
    TransitionRequest {
        workflow_id: "wf-1".to_string(),
        session_id: None,
        from_phase: "discover".to_string(),
        to_phase: to_phase.to_string(),
        evidence: Map::new(),
        conditions_met: vec!["tests_pass".to_string()],
        commit_sha: None,
    }
}

#[test]
fn transition_surfaces_daemon_rejections_verbatim() {
    let daemon = MockDaemon::start(|_, _| {
        (
            409,
            r#"{"success":true,"message":"Stale transition: phase already advanced","missing_conditions":["lint_clean"]}"#
                .to_string(),
        )
    });
    let result = daemon.client().transition(&transition_request("design"));
    assert!(!result.success);
    assert_eq!(result.message, "Stale transition: phase already advanced");
    assert_eq!(result.missing_conditions, vec!["lint_clean"]);

    let body = body_json(&daemon.requests()[0]);
    assert_eq!(body["to_phase"], "design");
    assert_eq!(body["conditions_met"][0], "tests_pass");
}

#[test]
fn transition_success_and_undecodable_errors() {
    let daemon = MockDaemon::start(|_, _| {
        (
            200,
            r#"{"success":true,"message":"ok","new_phase":"design","new_status":"agent_required"}"#
                .to_string(),
        )
    });
    let result = daemon.client().transition(&transition_request("design"));
    assert!(result.success);
    assert_eq!(result.new_phase.as_deref(), Some("design"));

    let broken = MockDaemon::start(|_, _| (502, "bad gateway".to_string()));
    let result = broken.client().transition(&transition_request("design"));
    assert!(!result.success);
    assert!(result.message.starts_with("Daemon unavailable"));
}

#[test]
fn can_stop_and_record_event_follow_their_defaults() {
    let daemon = MockDaemon::start(|_, path| {
        if path.starts_with("/workflow/can-stop?workflow_id=wf-open") {
            (200, r#"{"can_stop":false,"reason":"Phase design incomplete"}"#.to_string())
        } else if path.starts_with("/workflow/can-stop") {
            (200, r#"{"reason":"done"}"#.to_string())
        } else {
            (200, r#"{"ok":true}"#.to_string())
        }
    });
    let client = daemon.client();

    let verdict = client.can_stop("wf-open");
    assert!(!verdict.can_stop);
    assert_eq!(verdict.reason, "Phase design incomplete");
    assert!(client.can_stop("wf-closed").can_stop);

    assert!(client.record_event(&EventRequest {
        workflow_id: "wf-open".to_string(),
        event_type: "agent_completed".to_string(),
        phase: "design".to_string(),
        agent: Some("design-agent".to_string()),
        data: Map::new(),
    }));
    let requests = daemon.requests();
    let event = requests
        .iter()
        .find(|r| r.path == "/event/record")
        .expect("event request");
    assert_eq!(body_json(event)["event_type"], "agent_completed");
    assert_eq!(body_json(event)["agent"], "design-agent");
}

#[test]
fn unreachable_daemon_fails_open_everywhere() {
    let client = unreachable_client();
    assert!(matches!(
        client.get_status("wf-1"),
        Err(ControlError::Transport { .. })
    ));
    let verdict = client.can_stop("wf-1");
    assert!(verdict.can_stop);
    assert!(verdict.reason.starts_with("Daemon check failed"));
    assert!(!client.transition(&transition_request("design")).success);
    assert!(!client.record_agent_event("wf-1", "agent_started", "discover", None));
}

#[test]
fn slow_daemon_resolves_within_the_timeout() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    thread::spawn(move || {
        let _held: Vec<_> = listener.incoming().take(1).collect();
        thread::sleep(Duration::from_secs(5));
    });
    let client = ControlClient::with_timeouts(
        &format!("http://{addr}"),
        HookLog::disabled("test"),
        Duration::from_millis(200),
        Duration::from_millis(200),
    );

    let started = Instant::now();
    assert!(client.get_status("wf-1").is_err());
    assert!(started.elapsed() < Duration::from_secs(3));
}

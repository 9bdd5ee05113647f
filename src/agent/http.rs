use std::fmt::Display;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, RwLock,
};

use async_trait::async_trait;
use futures::{Stream, StreamExt};
use reqwest::header::ACCEPT;
use serde::Serialize;
use uuid::Uuid;

use crate::error::TransportError;
use crate::models::RecipeSession;
use crate::session::SessionStore;

use super::channel::{AgentChannel, AgentMessage};
use super::events::{parse_event_line, AgentEvent, ParsedLine};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_error, log_info, log_warn};

const AGENT_PATH: &str = "/copilotkit";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RunAgentInput<'a> {
    thread_id: String,
    run_id: String,
    state: RecipeSession,
    messages: Vec<&'a AgentMessage>,
    tools: Vec<serde_json::Value>,
    context: Vec<serde_json::Value>,
    forwarded_props: serde_json::Value,
}

/// Agent channel over the backend's AG-UI endpoint. Each dispatch starts a
/// run; the run's event stream is drained in the background and every
/// state snapshot it carries is pushed into the session store in arrival
/// order.
pub struct HttpAgentChannel {
    client: reqwest::Client,
    endpoint: String,
    store: SessionStore,
    runs_in_flight: Arc<AtomicUsize>,
    thread_id: RwLock<Option<String>>,
}

impl HttpAgentChannel {
    pub fn new(backend_url: &str, store: SessionStore) -> Self {
        Self::with_client(reqwest::Client::new(), backend_url, store)
    }

    pub fn with_client(client: reqwest::Client, backend_url: &str, store: SessionStore) -> Self {
        Self {
            client,
            endpoint: format!("{}{}", backend_url.trim_end_matches('/'), AGENT_PATH),
            store,
            runs_in_flight: Arc::new(AtomicUsize::new(0)),
            thread_id: RwLock::new(None),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn current_thread(&self) -> String {
        let guard = match self.thread_id.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string())
    }

    fn finish_run(counter: &AtomicUsize) {
        // Never wrap below zero even if a run is finished twice.
        let _ = counter.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
    }
}

#[async_trait]
impl AgentChannel for HttpAgentChannel {
    async fn dispatch(&self, message: &AgentMessage) -> Result<(), TransportError> {
        let state = self.store.current();
        let context = state
            .agent_summary()
            .map(|summary| serde_json::json!({"description": "Current recipe", "value": summary}))
            .into_iter()
            .collect();
        let input = RunAgentInput {
            thread_id: self.current_thread(),
            run_id: Uuid::new_v4().to_string(),
            state,
            messages: vec![message],
            tools: Vec::new(),
            context,
            forwarded_props: serde_json::json!({}),
        };

        self.runs_in_flight.fetch_add(1, Ordering::SeqCst);

        let response = match self
            .client
            .post(&self.endpoint)
            .header(ACCEPT, "text/event-stream")
            .json(&input)
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => {
                Self::finish_run(&self.runs_in_flight);
                log_error!("agent dispatch to {} failed: {err}", self.endpoint);
                return Err(TransportError::request("Agent request", err));
            }
        };

        if !response.status().is_success() {
            Self::finish_run(&self.runs_in_flight);
            let status = response.status();
            log_error!("agent dispatch rejected with {status}");
            return Err(TransportError::status(
                "Agent request",
                status.canonical_reason().unwrap_or(status.as_str()),
            ));
        }

        log_info!("agent run {} accepted", input.run_id);

        let store = self.store.clone();
        let counter = self.runs_in_flight.clone();
        tokio::spawn(async move {
            drain_run_stream(response.bytes_stream(), &store).await;
            Self::finish_run(&counter);
        });

        Ok(())
    }

    fn is_busy(&self) -> bool {
        self.runs_in_flight.load(Ordering::SeqCst) > 0
    }

    fn bind_thread(&self, thread_id: &str) {
        let mut guard = match self.thread_id.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = Some(thread_id.to_string());
    }
}

/// Split a run's byte stream into lines and apply each one in order. A
/// transport error ends the drain; whatever was applied before it stays.
async fn drain_run_stream<S, B, E>(stream: S, store: &SessionStore)
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    E: Display,
{
    futures::pin_mut!(stream);
    let mut buffer: Vec<u8> = Vec::new();

    while let Some(chunk) = stream.next().await {
        match chunk {
            Ok(bytes) => buffer.extend_from_slice(bytes.as_ref()),
            Err(err) => {
                log_error!("agent run stream broke off: {err}");
                return;
            }
        }

        while let Some(newline) = buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = buffer.drain(..=newline).collect();
            apply_line(&String::from_utf8_lossy(&line), store);
        }
    }

    if !buffer.is_empty() {
        apply_line(&String::from_utf8_lossy(&buffer), store);
    }
}

fn apply_line(line: &str, store: &SessionStore) {
    match parse_event_line(line) {
        ParsedLine::Event(AgentEvent::RunStarted {}) => {
            log_info!("agent run started");
        }
        ParsedLine::Event(AgentEvent::StateSnapshot { snapshot }) => {
            if store.replace_external(snapshot) {
                log_info!("adopted agent state snapshot");
            }
        }
        ParsedLine::Event(AgentEvent::RunError { message }) => {
            log_error!("agent run failed: {message}");
        }
        ParsedLine::Event(_) | ParsedLine::Skip => {}
        ParsedLine::Malformed(err) => {
            log_warn!("ignoring malformed agent event: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Recipe, RecipeStep};

    #[test]
    fn test_endpoint_joins_backend_url() {
        let channel = HttpAgentChannel::new("http://localhost:8000/", SessionStore::new());
        assert_eq!(channel.endpoint(), "http://localhost:8000/copilotkit");
        assert!(!channel.is_busy());
    }

    #[test]
    fn test_snapshot_lines_replace_store() {
        let store = SessionStore::new();
        let session = RecipeSession::with_recipe(Recipe {
            title: "Rice".into(),
            servings: 2,
            steps: vec![RecipeStep::new(1, "Rinse")],
            ..Recipe::default()
        });
        let line = format!(
            "data: {}",
            serde_json::json!({"type": "STATE_SNAPSHOT", "snapshot": session})
        );

        apply_line(&line, &store);
        assert_eq!(store.current(), session);

        // A snapshot that breaks the data model is dropped.
        let broken = r#"data: {"type":"STATE_SNAPSHOT","snapshot":{"recipe":null,"current_step":4}}"#;
        apply_line(broken, &store);
        assert_eq!(store.current(), session);
    }

    fn rice(title: &str) -> RecipeSession {
        RecipeSession::with_recipe(Recipe {
            title: title.into(),
            servings: 2,
            steps: vec![RecipeStep::new(1, "Rinse")],
            ..Recipe::default()
        })
    }

    fn snapshot_line(session: &RecipeSession) -> String {
        format!(
            "data: {}\n",
            serde_json::json!({"type": "STATE_SNAPSHOT", "snapshot": session})
        )
    }

    #[tokio::test]
    async fn test_drain_applies_snapshots_in_arrival_order() {
        let store = SessionStore::new();
        let first = snapshot_line(&rice("First"));
        let (head, tail) = first.split_at(first.len() / 2);
        let broken = "data: {\"type\":\"STATE_SNAPSHOT\",\"snapshot\":{\"recipe\":null,\"current_step\":4}}\n";
        let second = snapshot_line(&rice("Second"));
        // The final snapshot arrives without a terminating newline.
        let last = snapshot_line(&rice("Last"));
        let last = last.trim_end().to_string();

        let chunks: Vec<Result<Vec<u8>, std::io::Error>> = vec![
            Ok(b"data: {\"type\":\"RUN_STARTED\",\"threadId\":\"t\",\"runId\":\"r\"}\n".to_vec()),
            Ok(head.as_bytes().to_vec()),
            Ok(tail.as_bytes().to_vec()),
            Ok(broken.as_bytes().to_vec()),
            Ok(format!(": keep-alive\n{second}").into_bytes()),
            Ok(last.into_bytes()),
        ];
        drain_run_stream(futures::stream::iter(chunks), &store).await;

        assert_eq!(store.current(), rice("Last"));
    }

    #[tokio::test]
    async fn test_drain_stops_at_stream_error() {
        let store = SessionStore::new();
        let chunks: Vec<Result<Vec<u8>, std::io::Error>> = vec![
            Ok(snapshot_line(&rice("Before")).into_bytes()),
            Err(std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset")),
            Ok(snapshot_line(&rice("After")).into_bytes()),
        ];
        drain_run_stream(futures::stream::iter(chunks), &store).await;

        assert_eq!(store.current(), rice("Before"));
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_transport_error() {
        // Port 9 (discard) on localhost is closed in test environments.
        let channel = HttpAgentChannel::new("http://127.0.0.1:9", SessionStore::new());
        let result = channel.dispatch(&AgentMessage::user("Next step.")).await;
        assert!(matches!(result, Err(TransportError::Request { .. })));
        assert!(!channel.is_busy());
    }

    #[test]
    fn test_bound_thread_is_reused() {
        let channel = HttpAgentChannel::new("http://localhost:8000", SessionStore::new());
        channel.bind_thread("thread-1");
        assert_eq!(channel.current_thread(), "thread-1");
    }
}

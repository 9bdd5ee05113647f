//! Server-sent events emitted by an agent run.

use serde::Deserialize;

use crate::models::RecipeSession;

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AgentEvent {
    RunStarted {},
    StateSnapshot { snapshot: RecipeSession },
    RunFinished {},
    RunError {
        #[serde(default)]
        message: String,
    },
    /// Text deltas, tool calls and anything newer than this client.
    #[serde(other)]
    Other,
}

#[derive(Debug)]
pub enum ParsedLine {
    Event(AgentEvent),
    Skip,
    Malformed(serde_json::Error),
}

/// Parse one line of the run stream. Accepts `data: {...}` SSE framing as
/// well as bare JSON lines.
pub fn parse_event_line(line: &str) -> ParsedLine {
    let line = line.trim();
    if line.is_empty() || line.starts_with(':') {
        return ParsedLine::Skip;
    }

    let payload = match line.strip_prefix("data:") {
        Some(rest) => rest.trim_start(),
        None if line.starts_with('{') => line,
        // `event:`, `id:`, `retry:` fields carry nothing we act on.
        None => return ParsedLine::Skip,
    };

    match serde_json::from_str::<AgentEvent>(payload) {
        Ok(event) => ParsedLine::Event(event),
        Err(err) => ParsedLine::Malformed(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_state_snapshot() {
        let line = r#"data: {"type":"STATE_SNAPSHOT","snapshot":{"recipe":null,"current_step":0}}"#;
        match parse_event_line(line) {
            ParsedLine::Event(AgentEvent::StateSnapshot { snapshot }) => {
                assert!(snapshot.recipe.is_none());
            }
            other => panic!("unexpected parse result: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_events_are_tolerated() {
        let line = r#"data: {"type":"TEXT_MESSAGE_CONTENT","messageId":"m1","delta":"Hi"}"#;
        assert!(matches!(
            parse_event_line(line),
            ParsedLine::Event(AgentEvent::Other)
        ));

        let line = r#"{"type":"RUN_FINISHED","threadId":"t","runId":"r"}"#;
        assert!(matches!(
            parse_event_line(line),
            ParsedLine::Event(AgentEvent::RunFinished {})
        ));
    }

    #[test]
    fn test_framing_lines_are_skipped() {
        assert!(matches!(parse_event_line(""), ParsedLine::Skip));
        assert!(matches!(parse_event_line(": keep-alive"), ParsedLine::Skip));
        assert!(matches!(parse_event_line("event: message"), ParsedLine::Skip));
        assert!(matches!(
            parse_event_line("data: {not json"),
            ParsedLine::Malformed(_)
        ));
    }

    #[test]
    fn test_run_error_message() {
        let line = r#"data: {"type":"RUN_ERROR","message":"model overloaded"}"#;
        match parse_event_line(line) {
            ParsedLine::Event(AgentEvent::RunError { message }) => {
                assert_eq!(message, "model overloaded")
            }
            other => panic!("unexpected parse result: {other:?}"),
        }
    }
}

use crate::protocol::ServerFrame;
use crate::session::state::{LogEntry, LogKind, Role, SessionState};

/// Apply one decoded server frame to the session state.
///
/// Each frame type maps to exactly one mutation. `response` and `error`
/// terminate the current turn (thinking off, caption cleared); `status`,
/// `thought` and `tool_call` mark the turn as in flight. Unknown frame
/// types are invisible to this client version.
pub fn apply_frame(state: &mut SessionState, frame: ServerFrame) {
    match frame {
        ServerFrame::System { content } => {
            state.push_message(Role::System, content);
        }
        ServerFrame::Response { content } => {
            state.push_message(Role::Assistant, content);
            state.thinking = false;
            state.status_text.clear();
        }
        ServerFrame::Status { content } => {
            state.thinking = true;
            state.status_text = content;
        }
        ServerFrame::Thought { content } => {
            state.thinking = true;
            if !content.is_empty() {
                state.status_text = content.clone();
            }
            state.log.push(LogEntry {
                kind: LogKind::Thought,
                content,
                tool: None,
                sql: None,
            });
        }
        ServerFrame::ToolCall { content, tool, sql } => {
            state.thinking = true;
            if !content.is_empty() {
                state.status_text = content.clone();
            }
            state.log.push(LogEntry {
                kind: LogKind::ToolCall,
                content,
                tool,
                sql,
            });
        }
        ServerFrame::Error { content } => {
            state.push_message(Role::Error, content);
            state.thinking = false;
            state.status_text.clear();
        }
        ServerFrame::Unknown => {
            tracing::debug!("ignoring frame with unrecognized type");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::decode_frame;
    use crate::session::state::ConnectionStatus;

    fn apply_raw(state: &mut SessionState, raw: &str) {
        apply_frame(state, decode_frame(raw).unwrap());
    }

    #[test]
    fn test_system_frame_appends_system_message() {
        let mut state = SessionState::new();
        apply_raw(&mut state, r#"{"type":"system","content":"agent ready"}"#);

        assert_eq!(state.transcript.len(), 2);
        assert_eq!(state.transcript[1].role, Role::System);
        assert_eq!(state.transcript[1].content, "agent ready");
        assert!(!state.thinking);
    }

    #[test]
    fn test_status_frame_sets_thinking_and_caption_only() {
        let mut state = SessionState::new();
        apply_raw(&mut state, r#"{"type":"status","content":"思考中"}"#);

        assert!(state.thinking);
        assert_eq!(state.status_text, "思考中");
        assert_eq!(state.transcript.len(), 1);
        assert!(state.log.is_empty());
    }

    #[test]
    fn test_full_turn_sequence() {
        let mut state = SessionState::new();
        state.begin_turn("表里有几条记录？");

        apply_raw(&mut state, r#"{"type":"status","content":"思考中"}"#);
        assert!(state.thinking);

        apply_raw(
            &mut state,
            r#"{"type":"tool_call","tool":"sql_exec","sql":"SELECT 1","content":"running query"}"#,
        );
        assert!(state.thinking);
        assert_eq!(state.log.len(), 1);
        assert_eq!(state.log[0].kind, LogKind::ToolCall);
        assert_eq!(state.log[0].tool.as_deref(), Some("sql_exec"));
        assert_eq!(state.log[0].sql.as_deref(), Some("SELECT 1"));
        assert_eq!(state.status_text, "running query");

        apply_raw(&mut state, r#"{"type":"response","content":"结果是 1"}"#);
        assert!(!state.thinking);
        assert!(state.status_text.is_empty());
        let last = state.transcript.last().unwrap();
        assert_eq!(last.role, Role::Assistant);
        assert_eq!(last.content, "结果是 1");
        // The execution log survives until the next turn starts.
        assert_eq!(state.log.len(), 1);
    }

    #[test]
    fn test_thought_frames_accumulate_in_arrival_order() {
        let mut state = SessionState::new();
        apply_raw(&mut state, r#"{"type":"thought","content":"first"}"#);
        apply_raw(&mut state, r#"{"type":"thought","content":"second"}"#);
        apply_raw(&mut state, r#"{"type":"thought","content":"third"}"#);

        let contents: Vec<&str> = state.log.iter().map(|e| e.content.as_str()).collect();
        assert_eq!(contents, vec!["first", "second", "third"]);
        assert_eq!(state.status_text, "third");
    }

    #[test]
    fn test_thought_without_content_keeps_previous_caption() {
        let mut state = SessionState::new();
        apply_raw(&mut state, r#"{"type":"status","content":"analyzing schema"}"#);
        apply_raw(&mut state, r#"{"type":"thought"}"#);

        assert_eq!(state.status_text, "analyzing schema");
        assert_eq!(state.log.len(), 1);
    }

    #[test]
    fn test_error_frame_terminates_turn() {
        let mut state = SessionState::new();
        apply_raw(&mut state, r#"{"type":"status","content":"busy"}"#);
        apply_raw(&mut state, r#"{"type":"error","content":"query failed"}"#);

        assert!(!state.thinking);
        assert!(state.status_text.is_empty());
        let last = state.transcript.last().unwrap();
        assert_eq!(last.role, Role::Error);
        assert_eq!(last.content, "query failed");
    }

    #[test]
    fn test_unknown_frame_mutates_nothing() {
        let mut state = SessionState::new();
        let before_transcript = state.transcript.len();
        apply_raw(&mut state, r#"{"type":"bogus"}"#);

        assert_eq!(state.transcript.len(), before_transcript);
        assert!(state.log.is_empty());
        assert!(!state.thinking);
        assert_eq!(state.status, ConnectionStatus::Disconnected);
    }
}

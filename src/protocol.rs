use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Chat socket wire messages.
///
/// The backend speaks JSON text frames in both directions. A single
/// malformed frame must never take the session down, so decoding returns a
/// `Result` and the caller discards failures with a diagnostic trace.

/// Client → server: a free-text user query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientFrame {
    pub content: String,
}

/// Server → client, discriminated by the `type` field.
///
/// Frames may carry a `status` caption string alongside `content`; dispatch
/// only consumes `content`, so the extra field is ignored here. Types this
/// client does not know decode as `Unknown` and are dropped by the
/// dispatcher, which keeps newer servers from crashing older clients.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerFrame {
    System {
        #[serde(default)]
        content: String,
    },
    Response {
        #[serde(default)]
        content: String,
    },
    Status {
        #[serde(default)]
        content: String,
    },
    Thought {
        #[serde(default)]
        content: String,
    },
    ToolCall {
        #[serde(default)]
        content: String,
        #[serde(default)]
        tool: Option<String>,
        #[serde(default)]
        sql: Option<String>,
    },
    Error {
        #[serde(default)]
        content: String,
    },
    #[serde(other)]
    Unknown,
}

pub fn encode_user_message(content: &str) -> Result<String> {
    let frame = ClientFrame {
        content: content.to_string(),
    };
    Ok(serde_json::to_string(&frame)?)
}

pub fn decode_frame(raw: &str) -> Result<ServerFrame> {
    Ok(serde_json::from_str(raw)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_user_message() {
        let raw = encode_user_message("show me all users").unwrap();
        assert_eq!(raw, r#"{"content":"show me all users"}"#);
    }

    #[test]
    fn test_decode_response_frame() {
        let frame =
            decode_frame(r#"{"type":"response","content":"done","status":"ready"}"#).unwrap();
        assert_eq!(
            frame,
            ServerFrame::Response {
                content: "done".to_string()
            }
        );
    }

    #[test]
    fn test_decode_tool_call_frame() {
        let frame = decode_frame(
            r#"{"type":"tool_call","content":"running query","tool":"sql_exec","sql":"SELECT 1"}"#,
        )
        .unwrap();
        assert_eq!(
            frame,
            ServerFrame::ToolCall {
                content: "running query".to_string(),
                tool: Some("sql_exec".to_string()),
                sql: Some("SELECT 1".to_string()),
            }
        );
    }

    #[test]
    fn test_decode_tool_call_without_optional_fields() {
        let frame = decode_frame(r#"{"type":"tool_call"}"#).unwrap();
        assert_eq!(
            frame,
            ServerFrame::ToolCall {
                content: String::new(),
                tool: None,
                sql: None,
            }
        );
    }

    #[test]
    fn test_unrecognized_type_decodes_as_unknown() {
        let frame = decode_frame(r#"{"type":"bogus","content":"whatever"}"#).unwrap();
        assert_eq!(frame, ServerFrame::Unknown);
    }

    #[test]
    fn test_non_json_payload_is_an_error() {
        assert!(decode_frame("not json at all").is_err());
    }

    #[test]
    fn test_payload_without_type_is_an_error() {
        assert!(decode_frame(r#"{"content":"missing discriminator"}"#).is_err());
    }
}

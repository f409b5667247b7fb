use crate::error::{CopilotError, Result};

/// Fixed path of the chat channel on the backend.
const CHAT_SOCKET_PATH: &str = "/ws/chat";

/// Root of the one-shot REST endpoints.
const API_ROOT_PATH: &str = "/api/v1";

/// Where the backend lives. The WebSocket URL is always derived from the
/// HTTP base so the socket scheme mirrors the transport of the base URL
/// (`https` pages talk `wss`, plain `http` talks `ws`).
#[derive(Debug, Clone)]
pub struct EndpointConfig {
    base_url: String,
}

impl EndpointConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// REST root, e.g. `http://localhost:8000/api/v1`.
    pub fn api_root(&self) -> String {
        format!("{}{}", self.base_url, API_ROOT_PATH)
    }

    /// Chat socket URL, e.g. `ws://localhost:8000/ws/chat`.
    pub fn chat_socket_url(&self) -> Result<String> {
        let rest = if let Some(rest) = self.base_url.strip_prefix("https://") {
            format!("wss://{}", rest)
        } else if let Some(rest) = self.base_url.strip_prefix("http://") {
            format!("ws://{}", rest)
        } else {
            return Err(CopilotError::Config(format!(
                "server URL must start with http:// or https://, got '{}'",
                self.base_url
            )));
        };
        Ok(format!("{}{}", rest, CHAT_SOCKET_PATH))
    }
}

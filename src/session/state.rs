/// Welcome message seeded into every new transcript.
pub const WELCOME_MESSAGE: &str = "欢迎使用数据库副驾驶！请连接数据库开始查询。";

/// Caption shown between dispatching a query and the first server status.
pub const PREPARING_CAPTION: &str = "正在准备查询...";

/// Lifecycle of the single chat socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Disconnected,
    Connecting,
    Connected,
    Error,
}

impl ConnectionStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Error => "error",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
    System,
    Error,
}

/// One conversation entry. Immutable once appended.
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogKind {
    Thought,
    ToolCall,
}

/// One intermediate reasoning or tool-execution step of the current turn.
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub kind: LogKind,
    pub content: String,
    pub tool: Option<String>,
    pub sql: Option<String>,
}

/// The observable state of a single chat session.
///
/// Exactly one owner mutates this (the controller loop, via the dispatcher);
/// everyone else reads cloned snapshots. `log` holds only the most recent
/// turn's entries and is cleared when a new turn starts.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub transcript: Vec<ChatMessage>,
    pub log: Vec<LogEntry>,
    pub thinking: bool,
    pub status: ConnectionStatus,
    pub status_text: String,
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            transcript: vec![ChatMessage {
                role: Role::System,
                content: WELCOME_MESSAGE.to_string(),
            }],
            log: Vec::new(),
            thinking: false,
            status: ConnectionStatus::Disconnected,
            status_text: String::new(),
        }
    }

    pub fn push_message(&mut self, role: Role, content: impl Into<String>) {
        self.transcript.push(ChatMessage {
            role,
            content: content.into(),
        });
    }

    /// Start a new turn: append the user's message optimistically, reset the
    /// execution log and show the preparing caption. `thinking` stays false
    /// until the server acknowledges with a status/thought/tool_call frame.
    pub fn begin_turn(&mut self, query: &str) {
        self.push_message(Role::User, query);
        self.log.clear();
        self.status_text = PREPARING_CAPTION.to_string();
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

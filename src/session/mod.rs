mod dispatch;
mod state;

pub use dispatch::apply_frame;
pub use state::{
    ChatMessage, ConnectionStatus, LogEntry, LogKind, Role, SessionState, PREPARING_CAPTION,
    WELCOME_MESSAGE,
};

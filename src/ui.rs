use crate::session::{ChatMessage, ConnectionStatus, LogEntry, LogKind, Role, SessionState};
use colored::Colorize;

/// Incremental terminal renderer over session state snapshots.
///
/// Keeps cursors into the transcript and the execution log so that each
/// snapshot only prints what is new since the previous one.
pub struct UI {
    transcript_cursor: usize,
    log_cursor: usize,
    last_status: Option<ConnectionStatus>,
    last_caption: String,
}

impl UI {
    pub fn new() -> Self {
        Self {
            transcript_cursor: 0,
            log_cursor: 0,
            last_status: None,
            last_caption: String::new(),
        }
    }

    pub fn render(&mut self, state: &SessionState) {
        if self.last_status != Some(state.status) {
            Self::print_status(state.status);
            self.last_status = Some(state.status);
        }

        // A shrunken log means a new turn began.
        if state.log.len() < self.log_cursor {
            self.log_cursor = 0;
        }
        for entry in &state.log[self.log_cursor..] {
            Self::print_log_entry(entry);
        }
        self.log_cursor = state.log.len();

        for message in &state.transcript[self.transcript_cursor..] {
            Self::print_message(message);
        }
        self.transcript_cursor = state.transcript.len();

        if state.thinking && !state.status_text.is_empty() && state.status_text != self.last_caption
        {
            println!("{}", format!("… {}", state.status_text).dimmed());
        }
        self.last_caption = state.status_text.clone();
    }

    fn print_status(status: ConnectionStatus) {
        let label = match status {
            ConnectionStatus::Connected => "[connected]".bright_green(),
            ConnectionStatus::Connecting => "[connecting…]".bright_yellow(),
            ConnectionStatus::Disconnected => "[disconnected]".dimmed(),
            ConnectionStatus::Error => "[connection error]".bright_red(),
        };
        println!("{}", label);
        if matches!(
            status,
            ConnectionStatus::Disconnected | ConnectionStatus::Error
        ) {
            println!("{}", "type /reconnect to reopen the session".dimmed());
        }
    }

    fn print_message(message: &ChatMessage) {
        match message.role {
            // The user's own line is already on screen.
            Role::User => {}
            Role::Assistant => {
                println!("{}", "Assistant:".bright_blue().bold());
                println!("{}\n", message.content);
            }
            Role::System => {
                println!("{} {}", "System:".bright_cyan().bold(), message.content);
            }
            Role::Error => {
                println!("{} {}", "Error:".bright_red().bold(), message.content);
            }
        }
    }

    fn print_log_entry(entry: &LogEntry) {
        match entry.kind {
            LogKind::Thought => {
                println!("{}", format!("  • {}", entry.content).dimmed());
            }
            LogKind::ToolCall => {
                let tool = entry.tool.as_deref().unwrap_or("tool");
                println!(
                    "  {} {} {}",
                    "•".dimmed(),
                    tool.bright_yellow(),
                    entry.content.dimmed()
                );
                if let Some(sql) = &entry.sql {
                    println!("{}", format!("    {}", sql).dimmed());
                }
            }
        }
    }

    pub fn print_error(text: &str) {
        eprintln!("{} {}", "Error:".bright_red().bold(), text);
    }

    pub fn print_success(text: &str) {
        println!("{} {}", "Success:".bright_green().bold(), text);
    }

    pub fn print_info(text: &str) {
        println!("{}", text.dimmed());
    }

    pub fn print_goodbye() {
        println!("{}", "Goodbye!".bright_cyan());
    }
}

impl Default for UI {
    fn default() -> Self {
        Self::new()
    }
}

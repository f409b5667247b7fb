use crate::api::{ApiClient, DatabaseConfig};
use crate::controller::SessionHandle;
use crate::error::{CopilotError, Result};
use crate::session::{ConnectionStatus, Role};
use crate::ui::UI;
use colored::Colorize;
use std::path::Path;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Interactive loop: plain lines become chat queries, `/`-prefixed lines
/// become commands against the one-shot REST endpoints or the session.
pub struct Repl {
    handle: SessionHandle,
    api: ApiClient,
    ui: UI,
}

impl Repl {
    pub fn new(handle: SessionHandle, api: ApiClient) -> Self {
        Self {
            handle,
            api,
            ui: UI::new(),
        }
    }

    pub async fn run(mut self) -> Result<()> {
        let mut state_rx = self.handle.subscribe();
        let snapshot = state_rx.borrow_and_update().clone();
        self.ui.render(&snapshot);
        UI::print_info("type a question, or /help for commands");

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            tokio::select! {
                changed = state_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let snapshot = state_rx.borrow_and_update().clone();
                    self.ui.render(&snapshot);
                }
                line = lines.next_line() => match line? {
                    Some(line) => {
                        if !self.handle_line(line.trim()).await {
                            break;
                        }
                    }
                    None => break,
                },
            }
        }

        self.handle.shutdown().await;
        Ok(())
    }

    /// Send one question, print the full exchange, exit.
    pub async fn run_single_prompt(mut self, prompt: &str) -> Result<()> {
        let mut state_rx = self.handle.subscribe();

        let connected = tokio::time::timeout(CONNECT_TIMEOUT, async {
            loop {
                match state_rx.borrow_and_update().status {
                    ConnectionStatus::Connected => return true,
                    ConnectionStatus::Error => return false,
                    _ => {}
                }
                if state_rx.changed().await.is_err() {
                    return false;
                }
            }
        })
        .await
        .unwrap_or(false);

        if !connected {
            self.handle.shutdown().await;
            return Err(CopilotError::Api(
                "could not connect to the copilot backend".to_string(),
            ));
        }

        let baseline = state_rx.borrow().transcript.len();
        self.handle.send_message(prompt).await;

        loop {
            if state_rx.changed().await.is_err() {
                break;
            }
            let snapshot = state_rx.borrow_and_update().clone();
            self.ui.render(&snapshot);
            let terminated = snapshot.transcript.len() > baseline
                && snapshot
                    .transcript
                    .last()
                    .map(|m| matches!(m.role, Role::Assistant | Role::Error))
                    .unwrap_or(false);
            if terminated || snapshot.status != ConnectionStatus::Connected {
                break;
            }
        }

        self.handle.shutdown().await;
        Ok(())
    }

    async fn handle_line(&mut self, line: &str) -> bool {
        if line.is_empty() {
            return true;
        }
        if let Some(command) = line.strip_prefix('/') {
            return self.handle_command(command).await;
        }
        self.handle.send_message(line).await;
        true
    }

    async fn handle_command(&mut self, command: &str) -> bool {
        let mut parts = command.split_whitespace();
        let name = parts.next().unwrap_or("");
        let args: Vec<&str> = parts.collect();

        match name {
            "quit" | "exit" => {
                UI::print_goodbye();
                return false;
            }
            "reconnect" => self.handle.reconnect().await,
            "health" => self.show_health().await,
            "tables" => self.show_tables().await,
            "testdb" => self.test_db_config(&args).await,
            "config" => self.save_db_config(&args).await,
            "upload" => self.upload(&args).await,
            "help" => Self::print_help(),
            other => UI::print_error(&format!("unknown command '/{}', try /help", other)),
        }
        true
    }

    async fn show_health(&self) {
        match self.api.health().await {
            Ok(reply) => UI::print_success(&format!("backend is {}", reply.status)),
            Err(e) => UI::print_error(&e.to_string()),
        }
    }

    async fn show_tables(&self) {
        match self.api.list_tables().await {
            Ok(reply) if reply.success => {
                if reply.tables.is_empty() {
                    UI::print_info("no tables found");
                } else {
                    println!("{}", "Tables:".bright_cyan().bold());
                    for table in &reply.tables {
                        println!("  {}", table);
                    }
                }
            }
            Ok(reply) => UI::print_error(reply.error.as_deref().unwrap_or("unknown error")),
            Err(e) => UI::print_error(&e.to_string()),
        }
    }

    async fn test_db_config(&self, args: &[&str]) {
        match Self::parse_db_config(args) {
            Ok(config) => match self.api.test_db_config(&config).await {
                Ok(reply) if reply.success => {
                    UI::print_success(reply.message.as_deref().unwrap_or("connection ok"));
                }
                Ok(reply) => UI::print_error(reply.error.as_deref().unwrap_or("connection failed")),
                Err(e) => UI::print_error(&e.to_string()),
            },
            Err(e) => UI::print_error(&e.to_string()),
        }
    }

    async fn save_db_config(&self, args: &[&str]) {
        match Self::parse_db_config(args) {
            Ok(config) => match self.api.save_db_config(&config).await {
                Ok(reply) if reply.success => {
                    UI::print_success(reply.message.as_deref().unwrap_or("config saved"));
                }
                Ok(reply) => UI::print_error(reply.error.as_deref().unwrap_or("save failed")),
                Err(e) => UI::print_error(&e.to_string()),
            },
            Err(e) => UI::print_error(&e.to_string()),
        }
    }

    async fn upload(&self, args: &[&str]) {
        let Some(path) = args.first() else {
            UI::print_error("usage: /upload <path>");
            return;
        };
        match self.api.upload(Path::new(path)).await {
            Ok(reply) => UI::print_success(&format!("{} ({})", reply.message, reply.filename)),
            Err(e) => UI::print_error(&e.to_string()),
        }
    }

    fn parse_db_config(args: &[&str]) -> Result<DatabaseConfig> {
        let mut config = DatabaseConfig::default();
        for arg in args {
            let (key, value) = arg.split_once('=').ok_or_else(|| {
                CopilotError::Config(format!("expected key=value, got '{}'", arg))
            })?;
            match key {
                "host" => config.host = value.to_string(),
                "port" => {
                    config.port = value.parse().map_err(|_| {
                        CopilotError::Config(format!("invalid port '{}'", value))
                    })?;
                }
                "user" => config.user = value.to_string(),
                "password" => config.password = value.to_string(),
                "database" => config.database = value.to_string(),
                other => {
                    return Err(CopilotError::Config(format!(
                        "unknown setting '{}' (host, port, user, password, database)",
                        other
                    )));
                }
            }
        }
        Ok(config)
    }

    fn print_help() {
        println!("{}", "Commands:".bright_cyan().bold());
        println!("  /tables                     list tables in the configured database");
        println!("  /config key=value ...       save database settings (host, port, user, password, database)");
        println!("  /testdb key=value ...       test database settings without saving");
        println!("  /upload <path>              upload a file for import");
        println!("  /health                     check the backend");
        println!("  /reconnect                  reopen the chat session");
        println!("  /quit                       exit");
    }
}

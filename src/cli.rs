use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "dbcopilot",
    about = "An interactive terminal client for a natural-language database copilot",
    long_about = "dbcopilot talks to a database copilot backend: type a question, the \
backend agent translates it to SQL, executes it and streams back its reasoning and the \
result. Database settings, table listing and file upload are available as slash commands.",
    version
)]
pub struct Cli {
    /// Base URL of the copilot backend
    #[arg(long, env = "DBCOPILOT_SERVER", default_value = "http://localhost:8000")]
    pub server: String,

    /// Initial question to send (if not provided, starts the interactive loop)
    #[arg(short, long)]
    pub prompt: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

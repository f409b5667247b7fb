mod api;
mod cli;
mod config;
mod connection;
mod controller;
mod error;
mod protocol;
mod repl;
mod session;
mod ui;

use api::ApiClient;
use clap::Parser;
use cli::Cli;
use colored::Colorize;
use config::EndpointConfig;
use error::Result;
use repl::Repl;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .init();

    let endpoint = EndpointConfig::new(cli.server);
    println!(
        "{} {}",
        "Server:".bright_cyan(),
        endpoint.base_url().dimmed()
    );
    println!();

    let api = match ApiClient::new(&endpoint) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("{} {}", "Error:".bright_red().bold(), e);
            std::process::exit(1);
        }
    };

    let handle = match controller::spawn(&endpoint) {
        Ok(handle) => handle,
        Err(e) => {
            eprintln!("{} {}", "Error:".bright_red().bold(), e);
            std::process::exit(1);
        }
    };

    let repl = Repl::new(handle, api);
    if let Some(prompt) = cli.prompt {
        repl.run_single_prompt(&prompt).await?;
    } else {
        repl.run().await?;
    }

    Ok(())
}

use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, BufRead, Write};
use tracing::info;

use contacts_mcp::config::Config;
use contacts_mcp::logging;
use contacts_mcp::server::McpServer;
use contacts_mcp::tools::ToolRegistry;

fn main() -> Result<()> {
    let config = Config::parse();
    logging::init(&config.log_level);

    let registry = ToolRegistry::new(config.context()).context("failed to build tool registry")?;
    let mut server = McpServer::new(registry);
    info!(base_url = %config.base_url, "contacts-mcp listening on stdio");

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let response = server.handle_request(&line);
        if let Some(resp) = response {
            writeln!(stdout, "{}", resp)?;
            stdout.flush()?;
        }
    }

    info!("stdin closed, shutting down");
    Ok(())
}

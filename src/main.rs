//! HDB3 Chat Server - Entry Point
//!
//! Starts the ChatServer actor, opens the listener, and runs the server
//! console on stdin.

use std::env;

use tokio::sync::mpsc;
use tracing::error;
use tracing_subscriber::EnvFilter;

use hdb3_chat::{run_console, AdminCommand, ChatServer, ServerCommand};

/// Interface the listener binds on
const DEFAULT_HOST: &str = "127.0.0.1";

/// Default listening port (changeable at runtime with #setport)
const DEFAULT_PORT: u16 = 5555;

/// Channel buffer size for server commands
const CHANNEL_BUFFER_SIZE: usize = 256;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging with environment filter
    // Use RUST_LOG env var to control log level
    // e.g., RUST_LOG=debug or RUST_LOG=hdb3_chat=trace
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("hdb3_chat=info")),
        )
        .init();

    // Get listening port from command line or use default
    let port: u16 = match env::args().nth(1) {
        Some(arg) => arg.parse()?,
        None => DEFAULT_PORT,
    };

    // Create ChatServer actor channel and start
    let (cmd_tx, cmd_rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
    let server = ChatServer::new(cmd_rx, cmd_tx.clone(), DEFAULT_HOST.to_string(), port);
    let server_task = tokio::spawn(server.run());

    // Open the listener before handing the console over to the operator
    if cmd_tx
        .send(ServerCommand::Admin(AdminCommand::Start))
        .await
        .is_err()
    {
        error!("ChatServer actor unavailable at startup");
        return Ok(());
    }

    tokio::spawn(run_console(cmd_tx));

    // Run until #quit
    server_task.await?;

    Ok(())
}

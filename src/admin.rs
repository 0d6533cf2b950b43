//! Server console commands
//!
//! The operator controls the server from stdin: lines starting with '#'
//! are administrative commands, anything else is broadcast to all clients
//! as a server message.

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{error, warn};

use crate::error::ConsoleError;
use crate::server::ServerCommand;

/// Administrative command from the server console
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminCommand {
    /// Shut the server down
    Quit,
    /// Stop accepting new connections
    Stop,
    /// Stop listening and disconnect every client
    Close,
    /// Start accepting connections on the configured port
    Start,
    /// Change the listening port (requires a closed server)
    SetPort(u16),
    /// Report the configured port
    GetPort,
    /// Send a server message to all clients
    Broadcast(String),
}

/// Parse one console line
///
/// Command names are case-insensitive. Non-'#' lines become broadcasts.
pub fn parse_line(line: &str) -> Result<AdminCommand, ConsoleError> {
    if !line.starts_with('#') {
        return Ok(AdminCommand::Broadcast(line.to_string()));
    }

    let mut parts = line.split_whitespace();
    let command = parts.next().unwrap_or("#").to_lowercase();

    match command.as_str() {
        "#quit" => Ok(AdminCommand::Quit),
        "#stop" => Ok(AdminCommand::Stop),
        "#close" => Ok(AdminCommand::Close),
        "#start" => Ok(AdminCommand::Start),
        "#getport" => Ok(AdminCommand::GetPort),
        "#setport" => {
            let arg = parts.next().ok_or(ConsoleError::MissingPort)?;
            let port = arg
                .parse()
                .map_err(|_| ConsoleError::InvalidPort(arg.to_string()))?;
            Ok(AdminCommand::SetPort(port))
        }
        other => Err(ConsoleError::UnknownCommand(other.to_string())),
    }
}

/// Read console lines from stdin and forward them to the server actor
///
/// Runs until stdin closes or the server channel drops. Parse errors are
/// logged and skipped.
pub async fn run_console(cmd_tx: mpsc::Sender<ServerCommand>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                match parse_line(line) {
                    Ok(cmd) => {
                        if cmd_tx.send(ServerCommand::Admin(cmd)).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => warn!("{e}"),
                }
            }
            Ok(None) => break,
            Err(e) => {
                error!("console read error: {e}");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!(parse_line("#quit"), Ok(AdminCommand::Quit));
        assert_eq!(parse_line("#stop"), Ok(AdminCommand::Stop));
        assert_eq!(parse_line("#close"), Ok(AdminCommand::Close));
        assert_eq!(parse_line("#start"), Ok(AdminCommand::Start));
        assert_eq!(parse_line("#getport"), Ok(AdminCommand::GetPort));
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(parse_line("#QUIT"), Ok(AdminCommand::Quit));
        assert_eq!(parse_line("#SetPort 9000"), Ok(AdminCommand::SetPort(9000)));
    }

    #[test]
    fn test_parse_setport() {
        assert_eq!(parse_line("#setport 5555"), Ok(AdminCommand::SetPort(5555)));
        assert_eq!(parse_line("#setport"), Err(ConsoleError::MissingPort));
        assert_eq!(
            parse_line("#setport abc"),
            Err(ConsoleError::InvalidPort("abc".to_string()))
        );
        assert_eq!(
            parse_line("#setport 99999"),
            Err(ConsoleError::InvalidPort("99999".to_string()))
        );
    }

    #[test]
    fn test_parse_unknown_command() {
        assert_eq!(
            parse_line("#restart"),
            Err(ConsoleError::UnknownCommand("#restart".to_string()))
        );
    }

    #[test]
    fn test_plain_lines_broadcast() {
        assert_eq!(
            parse_line("maintenance in 5 minutes"),
            Ok(AdminCommand::Broadcast("maintenance in 5 minutes".to_string()))
        );
    }
}

//! Message protocol definitions
//!
//! JSON-based bidirectional message protocol using Serde's tagged enum
//! for type-safe serialization/deserialization. Coding-mode tokens and
//! coded text travel inside ordinary `Chat` content.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Client → Server message
///
/// All messages from client to server. Uses tagged enum with snake_case naming.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Set the login id (once per connection)
    Login { login_id: String },
    /// Send a chat line; mode tokens and coded text use this too
    Chat { content: String },
    /// Announce departure to the other clients
    Logoff,
}

/// Server → Client message
///
/// All messages from server to client. Uses tagged enum with snake_case naming.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Connection successful, client ID issued
    Connected { client_id: String },
    /// Server-wide notice (logon/logoff announcements, warnings, prompts)
    Notice { content: String },
    /// Chat line from another client
    Chat { from: String, content: String },
    /// Coding mode switched on or off for this connection
    ModeChanged {
        active: bool,
        reason: ModeChangeReason,
    },
    /// Result of decoding a message received while coding mode is on
    Decoded { content: String },
    /// Error occurred
    Error { code: ErrorCode, message: String },
}

/// Why the coding mode changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModeChangeReason {
    /// A mode token was received
    Requested,
    /// A message failed the codec alphabet gate while the mode was on
    InvalidInput,
}

/// Error codes for ServerMessage::Error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Attempted to chat without a login id
    LoginRequired,
    /// Attempted to set a second login id
    LoginAlreadySet,
    /// Invalid message format or login id
    InvalidMessage,
    /// Internal error
    Internal,
}

/// Convert AppError to ServerMessage for client notification
impl From<AppError> for ServerMessage {
    fn from(err: AppError) -> Self {
        let (code, message) = match &err {
            AppError::LoginRequired => (
                ErrorCode::LoginRequired,
                "set a login id before chatting".to_string(),
            ),
            AppError::LoginAlreadySet => (
                ErrorCode::LoginAlreadySet,
                "you cannot set another login".to_string(),
            ),
            AppError::InvalidLogin(raw) => (
                ErrorCode::InvalidMessage,
                format!("'{}' is not a valid login id", raw),
            ),
            AppError::Json(e) => (
                ErrorCode::InvalidMessage,
                format!("Invalid message format: {}", e),
            ),
            // Fatal errors are not typically converted (connection closes)
            _ => (ErrorCode::Internal, "Internal error".to_string()),
        };
        ServerMessage::Error { code, message }
    }
}

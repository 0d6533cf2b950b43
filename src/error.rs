//! Error types for the chat server
//!
//! Defines application-level errors, message send errors, and console
//! parse errors. Uses thiserror for ergonomic error definitions.
//!
//! Alphabet violations in coding mode are deliberately absent here: a
//! message that fails the codec gate is handled by dropping out of coding
//! mode, never by raising an error.

use thiserror::Error;

/// Application-level errors
///
/// Covers both fatal errors (connection termination) and
/// business errors (send error message to client).
#[derive(Debug, Error)]
pub enum AppError {
    /// WebSocket protocol error (fatal)
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// JSON serialization/deserialization error
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error (fatal)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Channel send error (fatal - internal channel broken)
    #[error("Channel send error")]
    ChannelSend,

    /// Client tried to chat before setting a login id
    #[error("Login required")]
    LoginRequired,

    /// Client tried to set a second login id
    #[error("Login already set")]
    LoginAlreadySet,

    /// Login id is empty or contains whitespace
    #[error("Invalid login id: {0:?}")]
    InvalidLogin(String),
}

/// Message send errors
///
/// Occurs when attempting to send messages through closed channels.
#[derive(Debug, Error)]
pub enum SendError {
    /// The receiving end of the channel has been closed
    #[error("Channel closed")]
    ChannelClosed,
}

/// Console command parse errors
///
/// Reported to the operator via logging; never fatal.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConsoleError {
    /// #setport given without a port argument
    #[error("enter a port number after the command (#setport <port>)")]
    MissingPort,

    /// #setport argument is not a valid port number
    #[error("'{0}' is not a valid port number")]
    InvalidPort(String),

    /// Unrecognized '#' command
    #[error("'{0}' is not a valid command, try another one")]
    UnknownCommand(String),
}

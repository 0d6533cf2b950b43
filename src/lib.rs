//! HDB3 Chat Server Library
//!
//! A WebSocket chat server whose distinguishing feature is a line-coding
//! mode: clients can switch their connection into HDB3 coding, after
//! which chat lines are treated as coded pulse sequences and decoded on
//! receipt.
//!
//! # Features
//! - HDB3 (High-Density Bipolar 3) codec built atop AMI line coding
//! - Per-connection coding mode with `hdb3` / `hdb3off` chat tokens
//! - Alphabet gates that drop out of coding mode on non-codeable input
//! - Login names and broadcast of logon/logoff notices and chat
//! - Server console: #start, #stop, #close, #setport, #getport, #quit
//!
//! # Architecture
//! Uses the Actor pattern with `mpsc` channels:
//! - `ChatServer` is the central actor managing all sessions and the
//!   accept loop
//! - Each connection has a `handler` task communicating with the server
//! - The codec is pure and synchronous; each call owns its scan state,
//!   so nothing in it needs locks
//!
//! # Example
//! ```
//! use hdb3_chat::{hdb3, CodingMode, Direction, Routing};
//!
//! assert_eq!(hdb3::encode("110000"), "+-+B00+V");
//! assert_eq!(hdb3::decode("+-+B00+V"), "110000");
//!
//! let (mode, routed) = CodingMode::Off.route(Direction::Encode, "hdb3");
//! assert_eq!(routed, Routing::Activated);
//! assert!(mode.is_on());
//! ```

pub mod admin;
pub mod ami;
pub mod error;
pub mod handler;
pub mod hdb3;
pub mod message;
pub mod mode;
pub mod server;
pub mod session;
pub mod types;
pub mod validate;

// Re-export main types for convenience
pub use admin::{run_console, AdminCommand};
pub use error::{AppError, ConsoleError, SendError};
pub use handler::handle_connection;
pub use message::{ClientMessage, ErrorCode, ModeChangeReason, ServerMessage};
pub use mode::{CodingMode, Direction, Routing, MODE_OFF_TOKEN, MODE_ON_TOKEN};
pub use server::{ChatServer, ServerCommand};
pub use session::Session;
pub use types::{ClientId, LoginId};

//! Per-connection session state
//!
//! Holds everything the server tracks for one connected client: identity,
//! login name, the outbound message channel, and the connection's own
//! coding mode. The mode belongs to exactly one session; switching it for
//! one client never affects another.

use tokio::sync::mpsc;

use crate::error::SendError;
use crate::message::ServerMessage;
use crate::mode::CodingMode;
use crate::types::{ClientId, LoginId};

/// Connected client session
#[derive(Debug)]
pub struct Session {
    /// Unique identifier for this connection
    pub id: ClientId,
    /// Login name (None before the login message)
    pub login: Option<LoginId>,
    /// Server → Client message channel
    pub sender: mpsc::Sender<ServerMessage>,
    /// Line-coding mode; every connection starts with it off
    mode: CodingMode,
}

impl Session {
    /// Create a new session with the given ID and sender channel
    pub fn new(id: ClientId, sender: mpsc::Sender<ServerMessage>) -> Self {
        Self {
            id,
            login: None,
            sender,
            mode: CodingMode::Off,
        }
    }

    /// Send a message to this client
    ///
    /// Returns an error if the channel is closed (client disconnected).
    pub async fn send(&self, msg: ServerMessage) -> Result<(), SendError> {
        self.sender
            .send(msg)
            .await
            .map_err(|_| SendError::ChannelClosed)
    }

    /// Display name: the login id if set, otherwise "anonymous"
    pub fn display_name(&self) -> &str {
        self.login.as_ref().map(LoginId::as_str).unwrap_or("anonymous")
    }

    pub fn has_login(&self) -> bool {
        self.login.is_some()
    }

    pub fn set_login(&mut self, login: LoginId) {
        self.login = Some(login);
    }

    pub fn mode(&self) -> CodingMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: CodingMode) {
        self.mode = mode;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_session_defaults() {
        let (tx, _rx) = mpsc::channel(32);
        let session = Session::new(ClientId::new(), tx);

        assert!(session.login.is_none());
        assert!(!session.mode().is_on());
        assert_eq!(session.display_name(), "anonymous");
    }

    #[tokio::test]
    async fn test_session_login() {
        let (tx, _rx) = mpsc::channel(32);
        let mut session = Session::new(ClientId::new(), tx);

        assert!(!session.has_login());

        session.set_login(LoginId::new("alice").unwrap());

        assert!(session.has_login());
        assert_eq!(session.display_name(), "alice");
    }

    #[tokio::test]
    async fn test_session_mode_is_owned() {
        let (tx, _rx) = mpsc::channel(32);
        let mut a = Session::new(ClientId::new(), tx.clone());
        let mut b = Session::new(ClientId::new(), tx);

        a.set_mode(CodingMode::On);
        assert!(a.mode().is_on());
        assert!(!b.mode().is_on());

        b.set_mode(CodingMode::On);
        a.set_mode(CodingMode::Off);
        assert!(b.mode().is_on());
    }
}

//! ChatServer Actor implementation
//!
//! The central actor owning all state: the client registry with each
//! connection's session (login + coding mode) and the TCP accept loop.
//! Uses the Actor pattern with mpsc channels for message passing; no
//! locks, every state change goes through the command channel.

use std::collections::HashMap;

use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::admin::AdminCommand;
use crate::error::AppError;
use crate::handler::handle_connection;
use crate::message::{ModeChangeReason, ServerMessage};
use crate::mode::{Direction, Routing};
use crate::session::Session;
use crate::types::{ClientId, LoginId};

/// Commands sent from handlers and the console to the ChatServer actor
#[derive(Debug)]
pub enum ServerCommand {
    /// New client connected
    Connect {
        client_id: ClientId,
        sender: mpsc::Sender<ServerMessage>,
    },
    /// Client disconnected
    Disconnect { client_id: ClientId },
    /// Set client's login id
    Login {
        client_id: ClientId,
        login_id: String,
    },
    /// Chat line from a client (mode tokens and coded text included)
    Chat {
        client_id: ClientId,
        content: String,
    },
    /// Client announces departure
    Logoff { client_id: ClientId },
    /// Console command from the operator
    Admin(AdminCommand),
}

/// The main ChatServer actor
///
/// Manages all sessions and the listener lifecycle, processing commands
/// from connection handlers and the server console.
pub struct ChatServer {
    /// All connected clients: ClientId -> Session
    clients: HashMap<ClientId, Session>,
    /// Command receiver channel
    receiver: mpsc::Receiver<ServerCommand>,
    /// Command sender handed to the accept loop for new connections
    cmd_tx: mpsc::Sender<ServerCommand>,
    /// Interface to bind on
    host: String,
    /// Port to bind on (changeable via #setport while closed)
    port: u16,
    /// Running accept loop, if listening
    listener: Option<JoinHandle<()>>,
    /// Set by #quit; breaks the run loop
    shutdown: bool,
}

impl ChatServer {
    /// Create a new ChatServer
    ///
    /// `cmd_tx` must be the sender side of `receiver`; the actor clones it
    /// into the accept loop so new connections can register themselves.
    pub fn new(
        receiver: mpsc::Receiver<ServerCommand>,
        cmd_tx: mpsc::Sender<ServerCommand>,
        host: String,
        port: u16,
    ) -> Self {
        Self {
            clients: HashMap::new(),
            receiver,
            cmd_tx,
            host,
            port,
            listener: None,
            shutdown: false,
        }
    }

    /// Run the ChatServer event loop
    ///
    /// Continuously receives and processes commands until a quit command
    /// arrives or all senders are dropped.
    pub async fn run(mut self) {
        info!("ChatServer started");

        while let Some(cmd) = self.receiver.recv().await {
            self.handle_command(cmd).await;
            if self.shutdown {
                break;
            }
        }

        self.stop_listening(false).await;
        info!("ChatServer shut down");
    }

    /// Process a single command
    async fn handle_command(&mut self, cmd: ServerCommand) {
        match cmd {
            ServerCommand::Connect { client_id, sender } => {
                self.handle_connect(client_id, sender).await;
            }
            ServerCommand::Disconnect { client_id } => {
                self.handle_disconnect(client_id).await;
            }
            ServerCommand::Login {
                client_id,
                login_id,
            } => {
                self.handle_login(client_id, login_id).await;
            }
            ServerCommand::Chat { client_id, content } => {
                self.handle_chat(client_id, content).await;
            }
            ServerCommand::Logoff { client_id } => {
                self.handle_logoff(client_id).await;
            }
            ServerCommand::Admin(cmd) => {
                self.handle_admin(cmd).await;
            }
        }
    }

    /// Handle new client connection
    async fn handle_connect(&mut self, client_id: ClientId, sender: mpsc::Sender<ServerMessage>) {
        info!("Client {} connected", client_id);
        self.clients.insert(client_id, Session::new(client_id, sender));
        debug!("Total clients: {}", self.clients.len());
    }

    /// Handle client disconnection
    async fn handle_disconnect(&mut self, client_id: ClientId) {
        if let Some(session) = self.clients.remove(&client_id) {
            info!("{} has disconnected", session.display_name());
        }
        debug!("Total clients: {}", self.clients.len());
    }

    /// Handle the login message
    ///
    /// The login id is set once per connection; a second attempt gets an
    /// error and the connection is closed, matching the one-login policy.
    async fn handle_login(&mut self, client_id: ClientId, login_id: String) {
        let Some(session) = self.clients.get_mut(&client_id) else {
            return;
        };

        if session.has_login() {
            warn!("Client {} tried to set a second login", client_id);
            let _ = session.send(AppError::LoginAlreadySet.into()).await;
            // Dropping the session closes the outbound channel and with it
            // the connection, after the buffered error is delivered.
            self.clients.remove(&client_id);
            return;
        }

        let Some(login) = LoginId::new(&login_id) else {
            let _ = session.send(AppError::InvalidLogin(login_id).into()).await;
            return;
        };

        session.set_login(login.clone());
        info!("{} has logged on", login);

        self.broadcast(ServerMessage::Notice {
            content: format!("{} has logged on.", login),
        })
        .await;
    }

    /// Handle a chat line
    ///
    /// Requires a login. The line is routed through the connection's mode
    /// controller in the decode direction: the client is the coding side
    /// of the link, the server restores what it sent.
    async fn handle_chat(&mut self, client_id: ClientId, content: String) {
        let Some(session) = self.clients.get_mut(&client_id) else {
            return;
        };

        if !session.has_login() {
            let _ = session.send(AppError::LoginRequired.into()).await;
            return;
        }

        let from = session.display_name().to_string();
        let (next_mode, routed) = session.mode().route(Direction::Decode, &content);
        session.set_mode(next_mode);

        match routed {
            Routing::Activated => {
                let _ = session
                    .send(ServerMessage::ModeChanged {
                        active: true,
                        reason: ModeChangeReason::Requested,
                    })
                    .await;
                let _ = session
                    .send(ServerMessage::Notice {
                        content: "Please send a coded message to be decoded:".to_string(),
                    })
                    .await;
                info!("Client {} switched coding mode on", client_id);
            }
            Routing::Deactivated => {
                let _ = session
                    .send(ServerMessage::ModeChanged {
                        active: false,
                        reason: ModeChangeReason::Requested,
                    })
                    .await;
                info!("Client {} switched coding mode off", client_id);
            }
            Routing::Transformed(decoded) => {
                info!("Decoded message from {}: {}", from, decoded);
                let _ = session.send(ServerMessage::Decoded { content: decoded }).await;
            }
            Routing::Rejected(original) => {
                // The peer learns about the forced deactivation before the
                // untouched message is forwarded.
                warn!("Message from {} is not codeable, coding mode forced off", from);
                let _ = session
                    .send(ServerMessage::ModeChanged {
                        active: false,
                        reason: ModeChangeReason::InvalidInput,
                    })
                    .await;
                self.broadcast(ServerMessage::Chat {
                    from,
                    content: original,
                })
                .await;
            }
            Routing::Passthrough(text) => {
                info!("Message received from {}: {}", from, text);
                self.broadcast(ServerMessage::Chat {
                    from,
                    content: text,
                })
                .await;
            }
        }
    }

    /// Handle the logoff announcement
    async fn handle_logoff(&mut self, client_id: ClientId) {
        let Some(session) = self.clients.get(&client_id) else {
            return;
        };
        if !session.has_login() {
            return;
        }

        let name = session.display_name().to_string();
        info!("{} has disconnected", name);
        self.broadcast(ServerMessage::Notice {
            content: format!("{} has disconnected.", name),
        })
        .await;
    }

    /// Handle a console command
    async fn handle_admin(&mut self, cmd: AdminCommand) {
        match cmd {
            AdminCommand::Quit => {
                info!("Shutting down");
                self.stop_listening(false).await;
                self.clients.clear();
                self.shutdown = true;
            }
            AdminCommand::Stop => {
                self.stop_listening(true).await;
            }
            AdminCommand::Close => {
                self.stop_listening(true).await;
                info!("Disconnecting {} client(s)", self.clients.len());
                self.clients.clear();
            }
            AdminCommand::Start => {
                self.start_listening().await;
            }
            AdminCommand::SetPort(port) => {
                if self.is_listening() || !self.clients.is_empty() {
                    warn!("close the server before changing the port");
                } else {
                    self.port = port;
                    info!("Port set to: {}", self.port);
                }
            }
            AdminCommand::GetPort => {
                info!("Port: {}", self.port);
            }
            AdminCommand::Broadcast(text) => {
                let line = format!("SERVER MSG> {}", text);
                info!("{}", line);
                self.broadcast(ServerMessage::Notice { content: line }).await;
            }
        }
    }

    /// Bind the configured address and spawn the accept loop
    async fn start_listening(&mut self) {
        if self.is_listening() {
            warn!("already listening; stop the server first");
            return;
        }

        let addr = format!("{}:{}", self.host, self.port);
        match TcpListener::bind(&addr).await {
            Ok(listener) => {
                info!("Server listening for connections on {}", addr);
                let cmd_tx = self.cmd_tx.clone();
                self.listener = Some(tokio::spawn(accept_loop(listener, cmd_tx)));
            }
            Err(e) => error!("failed to bind {}: {}", addr, e),
        }
    }

    /// Abort the accept loop; optionally warn connected clients
    async fn stop_listening(&mut self, notify: bool) {
        let Some(handle) = self.listener.take() else {
            return;
        };
        handle.abort();
        info!("Server has stopped listening for connections");

        if notify {
            self.broadcast(ServerMessage::Notice {
                content: "WARNING - the server has stopped listening for connections"
                    .to_string(),
            })
            .await;
        }
    }

    fn is_listening(&self) -> bool {
        self.listener.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Send a message to every connected client
    async fn broadcast(&self, msg: ServerMessage) {
        for session in self.clients.values() {
            let _ = session.send(msg.clone()).await;
        }
    }
}

/// Accept connections and spawn a handler task per client
async fn accept_loop(listener: TcpListener, cmd_tx: mpsc::Sender<ServerCommand>) {
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                info!("New connection from {}", addr);
                let cmd_tx = cmd_tx.clone();
                tokio::spawn(async move {
                    if let Err(e) = handle_connection(stream, cmd_tx).await {
                        error!("Connection handler error: {}", e);
                    }
                });
            }
            Err(e) => {
                error!("Failed to accept connection: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Actor plus a fake connected client for driving commands directly
    fn server() -> (ChatServer, mpsc::Sender<ServerCommand>) {
        let (cmd_tx, cmd_rx) = mpsc::channel(8);
        let server = ChatServer::new(cmd_rx, cmd_tx.clone(), "127.0.0.1".to_string(), 5555);
        (server, cmd_tx)
    }

    async fn connect(server: &mut ChatServer) -> (ClientId, mpsc::Receiver<ServerMessage>) {
        let id = ClientId::new();
        let (tx, rx) = mpsc::channel(8);
        server
            .handle_command(ServerCommand::Connect {
                client_id: id,
                sender: tx,
            })
            .await;
        (id, rx)
    }

    async fn login(server: &mut ChatServer, id: ClientId, name: &str) {
        server
            .handle_command(ServerCommand::Login {
                client_id: id,
                login_id: name.to_string(),
            })
            .await;
    }

    #[tokio::test]
    async fn test_login_broadcasts_notice() {
        let (mut server, _tx) = server();
        let (alice, mut alice_rx) = connect(&mut server).await;
        let (_bob, mut bob_rx) = connect(&mut server).await;

        login(&mut server, alice, "alice").await;

        for rx in [&mut alice_rx, &mut bob_rx] {
            match rx.try_recv().unwrap() {
                ServerMessage::Notice { content } => {
                    assert_eq!(content, "alice has logged on.")
                }
                other => panic!("unexpected message: {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn test_second_login_closes_connection() {
        let (mut server, _tx) = server();
        let (alice, mut alice_rx) = connect(&mut server).await;
        login(&mut server, alice, "alice").await;
        let _ = alice_rx.try_recv();

        login(&mut server, alice, "mallory").await;

        match alice_rx.try_recv().unwrap() {
            ServerMessage::Error { code, .. } => {
                assert_eq!(code, crate::message::ErrorCode::LoginAlreadySet)
            }
            other => panic!("unexpected message: {other:?}"),
        }
        // Session removed: the sender side is gone.
        assert!(server.clients.is_empty());
    }

    #[tokio::test]
    async fn test_chat_requires_login() {
        let (mut server, _tx) = server();
        let (alice, mut alice_rx) = connect(&mut server).await;

        server
            .handle_command(ServerCommand::Chat {
                client_id: alice,
                content: "hello".to_string(),
            })
            .await;

        match alice_rx.try_recv().unwrap() {
            ServerMessage::Error { code, .. } => {
                assert_eq!(code, crate::message::ErrorCode::LoginRequired)
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_plain_chat_is_broadcast() {
        let (mut server, _tx) = server();
        let (alice, mut alice_rx) = connect(&mut server).await;
        let (bob, mut bob_rx) = connect(&mut server).await;
        login(&mut server, alice, "alice").await;
        login(&mut server, bob, "bob").await;
        while alice_rx.try_recv().is_ok() {}
        while bob_rx.try_recv().is_ok() {}

        server
            .handle_command(ServerCommand::Chat {
                client_id: alice,
                content: "hello".to_string(),
            })
            .await;

        match bob_rx.try_recv().unwrap() {
            ServerMessage::Chat { from, content } => {
                assert_eq!(from, "alice");
                assert_eq!(content, "hello");
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_coding_mode_decodes_chat() {
        let (mut server, _tx) = server();
        let (alice, mut alice_rx) = connect(&mut server).await;
        login(&mut server, alice, "alice").await;
        while alice_rx.try_recv().is_ok() {}

        server
            .handle_command(ServerCommand::Chat {
                client_id: alice,
                content: "hdb3".to_string(),
            })
            .await;

        match alice_rx.try_recv().unwrap() {
            ServerMessage::ModeChanged { active, reason } => {
                assert!(active);
                assert_eq!(reason, ModeChangeReason::Requested);
            }
            other => panic!("unexpected message: {other:?}"),
        }
        // Prompt notice follows the acknowledgement.
        assert!(matches!(
            alice_rx.try_recv().unwrap(),
            ServerMessage::Notice { .. }
        ));

        server
            .handle_command(ServerCommand::Chat {
                client_id: alice,
                content: "-B00-V".to_string(),
            })
            .await;

        match alice_rx.try_recv().unwrap() {
            ServerMessage::Decoded { content } => assert_eq!(content, "0000"),
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_invalid_message_forces_mode_off_then_forwards() {
        let (mut server, _tx) = server();
        let (alice, mut alice_rx) = connect(&mut server).await;
        login(&mut server, alice, "alice").await;
        while alice_rx.try_recv().is_ok() {}

        server
            .handle_command(ServerCommand::Chat {
                client_id: alice,
                content: "hdb3".to_string(),
            })
            .await;
        while alice_rx.try_recv().is_ok() {}

        server
            .handle_command(ServerCommand::Chat {
                client_id: alice,
                content: "abc".to_string(),
            })
            .await;

        // Forced-off notification arrives before the forwarded original.
        match alice_rx.try_recv().unwrap() {
            ServerMessage::ModeChanged { active, reason } => {
                assert!(!active);
                assert_eq!(reason, ModeChangeReason::InvalidInput);
            }
            other => panic!("unexpected message: {other:?}"),
        }
        match alice_rx.try_recv().unwrap() {
            ServerMessage::Chat { from, content } => {
                assert_eq!(from, "alice");
                assert_eq!(content, "abc");
            }
            other => panic!("unexpected message: {other:?}"),
        }

        // Mode stayed off: the next line is plain chat again.
        server
            .handle_command(ServerCommand::Chat {
                client_id: alice,
                content: "0101".to_string(),
            })
            .await;
        assert!(matches!(
            alice_rx.try_recv().unwrap(),
            ServerMessage::Chat { .. }
        ));
    }

    #[tokio::test]
    async fn test_logoff_broadcasts_notice() {
        let (mut server, _tx) = server();
        let (alice, mut alice_rx) = connect(&mut server).await;
        let (bob, mut bob_rx) = connect(&mut server).await;
        login(&mut server, alice, "alice").await;
        login(&mut server, bob, "bob").await;
        while alice_rx.try_recv().is_ok() {}
        while bob_rx.try_recv().is_ok() {}

        server
            .handle_command(ServerCommand::Logoff { client_id: alice })
            .await;

        match bob_rx.try_recv().unwrap() {
            ServerMessage::Notice { content } => {
                assert_eq!(content, "alice has disconnected.")
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_admin_close_disconnects_clients() {
        let (mut server, _tx) = server();
        let (_alice, _alice_rx) = connect(&mut server).await;

        server
            .handle_command(ServerCommand::Admin(AdminCommand::Close))
            .await;

        assert!(server.clients.is_empty());
    }

    #[tokio::test]
    async fn test_admin_setport_requires_closed_server() {
        let (mut server, _tx) = server();
        let (_alice, _alice_rx) = connect(&mut server).await;

        server
            .handle_command(ServerCommand::Admin(AdminCommand::SetPort(9000)))
            .await;
        assert_eq!(server.port, 5555);

        server
            .handle_command(ServerCommand::Admin(AdminCommand::Close))
            .await;
        server
            .handle_command(ServerCommand::Admin(AdminCommand::SetPort(9000)))
            .await;
        assert_eq!(server.port, 9000);
    }

    #[tokio::test]
    async fn test_admin_quit_sets_shutdown() {
        let (mut server, _tx) = server();
        server
            .handle_command(ServerCommand::Admin(AdminCommand::Quit))
            .await;
        assert!(server.shutdown);
    }
}

//! Authenticated sessions with a device.
//!
//! A [`Session`] owns one stream connection at a time. It is created from a [`SessionConfig`]
//! without touching the network, then moves through a short lifecycle:
//!
//! ```text
//!  new() ──connect()──▶ Connected ──/login──▶ Authenticated ──call()*──▶ disconnect()
//!                           │                      │
//!                           └──── !trap ───────────┴──▶ Disconnected
//! ```
//!
//! Every [`connect`](Session::connect) performs a fresh TCP (or TLS) connection and login;
//! nothing survives [`disconnect`](Session::disconnect).
//!
//! # Errors
//!
//! Failures are reported as a [`SessionError`] so callers can tell apart a rejected login, a
//! failed command, a device-initiated shutdown and a broken transport without inspecting
//! messages. Only [`SessionError::Command`] leaves the session connected, and only when the
//! device closed the command with `!done`. After any other error raised by [`call`](Session::call)
//! the session is already disconnected and must be reconnected.
//!
//! # Concurrency
//!
//! `call` needs `&mut self` because the reply loop owns the stream until it sees `!done`. Use a
//! separate `Session` per thread for concurrent commands.
//!
//! # Example
//! ```no_run
//! use rosapi::{Request, Session, SessionConfig};
//!
//! let config = SessionConfig::new("192.168.88.1", "admin", "").with_tls(true);
//! let mut session = Session::new(config);
//! session.connect()?;
//!
//! let request = Request::new("/interface/print")?.with_filter("type=ether");
//! for row in session.call(&request)? {
//!     println!("{}", row["name"]);
//! }
//!
//! session.disconnect();
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
mod config;
mod connection;
mod stream;

use log::info;
use thiserror::Error;

use crate::protocol::{ReplyRow, Request, RequestError, TransportError};

pub use config::{DEFAULT_PORT, DEFAULT_TIMEOUT, DEFAULT_TLS_PORT, SessionConfig};
pub use connection::Connection;
pub use stream::Stream;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("authentication failed: {message}")]
    Authentication {
        message: String,
        sentence: Vec<String>,
    },

    #[error("command failed: {message}")]
    Command {
        message: String,
        sentence: Vec<String>,
    },

    #[error("fatal error, connection closed by device: {}", sentence.join(" "))]
    Fatal { sentence: Vec<String> },

    #[error("unexpected reply: {}", sentence.join(" "))]
    UnexpectedReply { sentence: Vec<String> },

    #[error("session is not connected")]
    NotConnected,

    #[error(transparent)]
    InvalidRequest(#[from] RequestError),

    #[error("transport failure: {0}")]
    Transport(#[from] TransportError),
}

impl SessionError {
    /// Whether the session remains connected and usable after this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, SessionError::Command { .. })
    }
}

/// A single connection to a device.
pub struct Session {
    config: SessionConfig,
    connection: Option<Connection<Stream>>,
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            connection: None,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    /// Opens the transport and logs in. An existing connection is closed first.
    pub fn connect(&mut self) -> Result<(), SessionError> {
        self.disconnect();

        info!(
            "connecting to {}:{} (tls: {})",
            self.config.host,
            self.config.port(),
            self.config.tls
        );
        let mut connection = Connection::new(Stream::open(&self.config)?);

        if let Err(e) = connection.login(&self.config.username, &self.config.password) {
            connection.into_inner().shutdown();
            return Err(e);
        }

        info!("authenticated to {} as {}", self.config.host, self.config.username);
        self.connection = Some(connection);
        Ok(())
    }

    /// Closes the transport. Does nothing when already disconnected.
    pub fn disconnect(&mut self) {
        if let Some(connection) = self.connection.take() {
            connection.into_inner().shutdown();
            info!("disconnected from {}", self.config.host);
        }
    }

    /// Runs one command and returns its rows in the order received.
    pub fn call(&mut self, request: &Request) -> Result<Vec<ReplyRow>, SessionError> {
        let connection = self.connection.as_mut().ok_or(SessionError::NotConnected)?;

        let result = connection.call(request);
        if let Err(e) = &result {
            if !e.is_recoverable() || !connection.is_usable() {
                info!("dropping connection to {} after: {e}", self.config.host);
                self.disconnect();
            }
        }
        result
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.disconnect();
    }
}

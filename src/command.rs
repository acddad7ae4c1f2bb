//! Textual command parsing.
//!
//! This module defines the [`Command`] enum, which encapsulates one line typed at the
//! interactive prompt. A line is either a control command (starting with `.`) or an API
//! command written the same way it appears on the wire, words separated by whitespace:
//!
//! ```text
//! /interface/print =.proplist=name,type ?type=ether
//! ```
//!
//! - The first word is the command path and must start with `/`.
//! - `=key=value` words become attributes.
//! - `?predicate` words become query filters, in the order given.
//!
//! # Example
//! ```rust
//! use rosapi::{Command, Request};
//!
//! let cmd: Command = "/ip/address/print ?interface=ether1".try_into().unwrap();
//! let expected = Request::new("/ip/address/print").unwrap().with_filter("interface=ether1");
//! assert_eq!(cmd, Command::Call(expected));
//! ```
use thiserror::Error;

use crate::protocol::{Request, RequestError};

/// List of possible error that a command line can throw.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("unrecognized command '{0}'")]
    UnrecognizedCommand(String),

    #[error("invalid argument '{word}', {reason}")]
    InvalidArgument { word: String, reason: String },

    #[error(transparent)]
    InvalidRequest(#[from] RequestError),

    #[error("no command provided")]
    Empty,
}

/// High-level user supplied commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Close the session and leave the prompt, `.exit`
    Exit,
    /// Send an API command to the device
    Call(Request),
}

impl TryFrom<&str> for Command {
    type Error = CommandError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let mut words = value.split_whitespace();

        match words.next() {
            None => Err(CommandError::Empty),
            Some(".exit") => Ok(Command::Exit),
            Some(s) if s.starts_with('.') => Err(CommandError::UnrecognizedCommand(s.to_string())),
            Some(path) => {
                let mut request = Request::new(path)?;
                for word in words {
                    request = apply_word(request, word)?;
                }
                Ok(Command::Call(request))
            }
        }
    }
}

fn apply_word(request: Request, word: &str) -> Result<Request, CommandError> {
    if let Some(predicate) = word.strip_prefix('?') {
        return Ok(request.with_filter(predicate));
    }

    let attr = word.strip_prefix('=').unwrap_or(word);
    match attr.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok(request.with_attribute(key, value)),
        _ => Err(CommandError::InvalidArgument {
            word: word.to_string(),
            reason: "expected '=key=value' or '?predicate'".to_string(),
        }),
    }
}

/// Parses a `key=value` pair given on the command line.
pub fn parse_attribute(s: &str) -> Result<(String, String), CommandError> {
    let attr = s.strip_prefix('=').unwrap_or(s);
    match attr.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(CommandError::InvalidArgument {
            word: s.to_string(),
            reason: "expected 'key=value'".to_string(),
        }),
    }
}

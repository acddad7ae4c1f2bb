use std::io::{Read, Write};

use log::{debug, trace, warn};

use crate::protocol::{ProtocolTransport, ReplyRow, Request, Response, redacted};

use super::SessionError;

/// Login and command execution over an already open stream.
pub struct Connection<T: Read + Write> {
    transport: ProtocolTransport<T>,
    usable: bool,
}

impl<T: Read + Write> Connection<T> {
    pub fn new(stream: T) -> Self {
        Self {
            transport: ProtocolTransport::new(stream),
            usable: true,
        }
    }

    /// False once a call has failed in a way that leaves the stream unreadable.
    pub fn is_usable(&self) -> bool {
        self.usable
    }

    pub fn into_inner(self) -> T {
        self.transport.into_inner()
    }

    /// Sends `/login` and reads a single reply sentence; only `!trap` fails.
    pub fn login(&mut self, username: &str, password: &str) -> Result<(), SessionError> {
        self.send(&Request::login(username, password))?;

        let reply = self.transport.read_sentence()?;
        match Response::parse(reply) {
            Some(Response::Trap { message, sentence }) => {
                Err(SessionError::Authentication { message, sentence })
            }
            Some(Response::Fatal { sentence }) => Err(SessionError::Fatal { sentence }),
            _ => {
                debug!("logged in as {username}");
                Ok(())
            }
        }
    }

    /// Sends `request` and collects `!re` rows until `!done`.
    ///
    /// A `!trap` is held until the command's closing `!done` arrives so the
    /// stream stays aligned for the next call. Rows already received are
    /// discarded when the command fails. If the stream fails while draining,
    /// the held trap is still returned and the connection is marked unusable.
    pub fn call(&mut self, request: &Request) -> Result<Vec<ReplyRow>, SessionError> {
        self.send(request)?;

        let mut rows = Vec::new();
        let mut trap: Option<SessionError> = None;
        loop {
            let sentence = match self.transport.read_sentence() {
                Ok(sentence) => sentence,
                Err(e) => {
                    self.usable = false;
                    if let Some(err) = trap {
                        warn!("stream failed before {} completed: {e}", request.command());
                        return Err(err);
                    }
                    return Err(e.into());
                }
            };
            let Some(resp) = Response::parse(sentence) else {
                trace!("skipping empty sentence");
                continue;
            };

            match resp {
                Response::Row(row) if trap.is_none() => rows.push(row),
                Response::Row(_) | Response::Empty => {}
                Response::Done => break,
                Response::Trap { message, sentence } => {
                    debug!("{} trapped: {message}", request.command());
                    trap.get_or_insert(SessionError::Command { message, sentence });
                }
                Response::Fatal { sentence } => return Err(SessionError::Fatal { sentence }),
                Response::Unexpected { sentence } => {
                    return Err(SessionError::UnexpectedReply { sentence });
                }
            }
        }

        if let Some(err) = trap {
            return Err(err);
        }

        debug!("{} returned {} rows", request.command(), rows.len());
        Ok(rows)
    }

    fn send(&mut self, request: &Request) -> Result<(), SessionError> {
        let words = request.to_words();
        debug!("sending sentence: {:?}", redacted(&words));
        self.transport.write_sentence(&words)?;
        Ok(())
    }
}

//! RouterOS API wire protocol.
//!
//! This module defines how commands and replies are framed on the stream shared with a
//! device. It knows nothing about sockets or sessions: everything operates on any type
//! implementing [`Read`](std::io::Read) + [`Write`](std::io::Write).
//!
//! # Overview
//!
//! The protocol exchanges *sentences*. A sentence is an ordered list of *words*, and a word is
//! a UTF-8 string prefixed by its byte length. A zero-length word terminates the sentence.
//!
//! ```text
//!   Len   Word               Len   Word              Len   Word      End
//! +-----+------------------+-----+-----------------+-----+---------+-----+
//! | 16  | /interface/print | 11  | ?type=ether     | 3   | !re ... |  0  |
//! +-----+------------------+-----+-----------------+-----+---------+-----+
//!  1-5B      N bytes        1-5B     N bytes
//! ```
//!
//! The length prefix is self-describing; see [`encode_length`] for the exact table.
//!
//! # Key Components
//!
//! - [`ProtocolTransport`]: Word and sentence reader/writer over a byte stream.
//! - [`Request`]: An outbound command sentence (`/path`, `=key=value`, `?predicate`).
//! - [`Response`]: An inbound sentence classified by its reply tag.
//!
//! # Reply Tags
//!
//! | Tag      | Meaning                                   |
//! |----------|-------------------------------------------|
//! | `!re`    | One data row                              |
//! | `!empty` | Query matched nothing, `!done` follows    |
//! | `!done`  | Command completed                         |
//! | `!trap`  | Command failed, connection still usable   |
//! | `!fatal` | Device is closing the connection          |
//!
//! # See Also
//!
//! - [`session`](crate::session): Login handshake and the command reply loop.
mod length;
mod request;
mod response;
mod transport;

pub use length::{decode_length, encode_length};
pub use request::{Request, RequestError};
pub use response::{ReplyRow, Response, parse_row, trap_message};
pub use transport::{ProtocolTransport, TransportError};

pub(crate) use request::redacted;

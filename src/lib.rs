pub mod cli;
pub mod command;
pub mod protocol;
pub mod session;

pub use command::{Command, CommandError};
pub use protocol::{ReplyRow, Request, RequestError, TransportError};
pub use session::{Session, SessionConfig, SessionError};

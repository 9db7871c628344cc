//! Host Protocol Implementation
//!
//! Line-oriented text protocol spoken with the head unit over the serial
//! link. Inbound lines look like `!CMD:VALUE\n`, outbound lines like
//! `!RESP:VALUE\n`.

mod command;
mod error;
mod framer;
mod response;

pub use command::{Command, CommandKind, ConfigRequest};
pub use error::{ErrorCode, ProtocolError};
pub use framer::{CommandFramer, LineFramer};
pub use response::{Response, ResponseKind};

/// Wire constants shared by framer and encoder
pub mod wire {
    /// Leading character of every protocol line
    pub const SENTINEL: u8 = b'!';
    /// Line terminator
    pub const DELIMITER: u8 = b'\n';
    /// Token/value separator
    pub const SEPARATOR: char = ':';
    /// Width of a command token
    pub const TOKEN_LEN: usize = 3;
    /// Maximum characters kept from a command value
    pub const MAX_VALUE_LEN: usize = 31;
    /// Maximum bytes of a line in progress (excluding the delimiter)
    pub const MAX_LINE_LEN: usize = 64;
}

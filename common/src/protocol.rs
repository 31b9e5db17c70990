use chrono::{DateTime, Local};
use std::borrow::Cow;
use std::fmt;

pub const DEFAULT_PORT: u16 = 8080;

/// Size of the single read each side performs. Not a protocol limit: longer
/// messages are truncated by the read, never reassembled.
pub const BUFFER_SIZE: usize = 1024;

pub const SERVER_GREETING: &str = "Hello from the server";

/// The message a client sends once per connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientGreeting {
    sent_at: DateTime<Local>,
}

impl ClientGreeting {
    pub const PREFIX: &str = "Hello from client at ";
    const TIMESTAMP_FORMAT: &str = "%a %b %e %H:%M:%S %Y";

    pub fn now() -> Self {
        Self::at(Local::now())
    }

    pub const fn at(sent_at: DateTime<Local>) -> Self {
        Self { sent_at }
    }

    pub const fn sent_at(&self) -> DateTime<Local> {
        self.sent_at
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.to_string().into_bytes()
    }
}

impl fmt::Display for ClientGreeting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}",
            Self::PREFIX,
            self.sent_at.format(Self::TIMESTAMP_FORMAT)
        )
    }
}

/// Text view of the first `len` bytes of `buf`.
///
/// `len` is the count returned by the read and is clamped to the buffer, so
/// stale bytes past it are never shown. Invalid UTF-8 is replaced rather than
/// rejected since the wire carries raw bytes.
pub fn decode_message(buf: &[u8], len: usize) -> Cow<'_, str> {
    String::from_utf8_lossy(&buf[..len.min(buf.len())])
}

//! Per-item error type for batch dispatch

use std::any::Any;

/// Error from transforming a single source item.
///
/// Never crosses the batch boundary: the dispatcher turns it into an
/// [`ItemFailure`](crate::dispatch::ItemFailure) and carries on.
#[derive(Debug)]
pub enum ItemError {
    Io(std::io::Error),
    /// Document could not be decoded by the transformation
    Parse(String),
    /// Transformation panicked
    Panic(String),
    /// Record came back keyed to a different source than it was produced for
    IdentifierMismatch { expected: String, found: String },
}

impl std::fmt::Display for ItemError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO: {e}"),
            Self::Parse(msg) => write!(f, "parse: {msg}"),
            Self::Panic(msg) => write!(f, "panicked: {msg}"),
            Self::IdentifierMismatch { expected, found } => {
                write!(f, "record keyed to {found:?}, expected {expected:?}")
            }
        }
    }
}

impl std::error::Error for ItemError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ItemError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl ItemError {
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Convert a `catch_unwind` payload. `panic!` payloads are `&str` or `String`.
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let msg = match payload.downcast::<String>() {
            Ok(s) => *s,
            Err(payload) => match payload.downcast::<&'static str>() {
                Ok(s) => (*s).to_string(),
                Err(_) => "non-string panic payload".to_string(),
            },
        };
        Self::Panic(msg)
    }
}

//! App-level error taxonomy surfaced to the presentation layer.

use asana_api::AsanaError;
use serde::Serialize;
use std::fmt;

/// The categories presentation needs to distinguish. Anything the user can't
/// act on specifically collapses into `Transport`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    /// Credential missing or rejected by the remote API (401/403).
    Unauthenticated,
    /// Project id did not resolve (404).
    NotFound,
    /// Network, timeout or parse failure.
    Transport,
    /// Malformed local input, e.g. a non-numeric project id.
    InvalidInput,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ErrorKind::Unauthenticated => "not authenticated",
            ErrorKind::NotFound => "not found",
            ErrorKind::Transport => "transport failure",
            ErrorKind::InvalidInput => "invalid input",
        };
        f.write_str(text)
    }
}

impl From<&AsanaError> for ErrorKind {
    fn from(err: &AsanaError) -> Self {
        match err {
            AsanaError::Authentication(_) => ErrorKind::Unauthenticated,
            AsanaError::NotFound(_) => ErrorKind::NotFound,
            _ => ErrorKind::Transport,
        }
    }
}

impl From<AsanaError> for ErrorKind {
    fn from(err: AsanaError) -> Self {
        ErrorKind::from(&err)
    }
}

/// Errors that can occur while talking to the game backend.
///
/// This is the only failure kind the roster and deck components see:
/// every collaborator collapses its failures into one of these variants.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The backend answered with a non-success status.
    ///
    /// Displays the backend's `detail` message when it sent one,
    /// otherwise `HTTP Error <status>`.
    #[error("{}", http_message(.status, .detail))]
    Http { status: u16, detail: Option<String> },

    /// The request never got an answer (DNS, refused, reset, timeout).
    #[error("network error: {0}")]
    Network(String),

    /// The backend answered but the body could not be decoded.
    #[error("malformed response: {0}")]
    Malformed(String),

    /// The push connection was closed.
    #[error("connection closed: {0}")]
    ConnectionClosed(String),

    /// Registering a push listener failed.
    #[error("subscribe failed: {0}")]
    Subscribe(String),
}

impl TransportError {
    /// Shorthand for an [`Http`](Self::Http) error.
    pub fn http(status: u16, detail: Option<impl Into<String>>) -> Self {
        Self::Http {
            status,
            detail: detail.map(Into::into),
        }
    }

    /// The human-readable message the remote provided, if any.
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Http { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }
}

impl From<cardroom_protocol::ProtocolError> for TransportError {
    fn from(err: cardroom_protocol::ProtocolError) -> Self {
        Self::Malformed(err.to_string())
    }
}

fn http_message(status: &u16, detail: &Option<String>) -> String {
    match detail {
        Some(detail) => detail.clone(),
        None => format!("HTTP Error {status}"),
    }
}

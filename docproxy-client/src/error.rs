use thiserror::Error as ThisError;

/// Errors raised by a document-database client.
///
/// `AutoReconnect` is the only transient kind: the connection dropped and the
/// client is re-establishing it in the background. Everything else is a
/// genuine failure of the request itself.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum ClientError {
    #[error("Connection lost, reconnecting: {0}")]
    AutoReconnect(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    #[error("'{0}' object is not callable")]
    NotCallable(String),

    #[error("'{owner}' has no member '{name}'")]
    NoSuchMember { owner: String, name: String },

    #[error("Operation failed with code {code}: {message}")]
    OperationFailure { code: i32, message: String },
}

impl ClientError {
    pub fn is_auto_reconnect(&self) -> bool {
        matches!(self, ClientError::AutoReconnect(_))
    }
}

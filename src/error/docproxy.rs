use docproxy_client::ClientError;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum DocProxyError {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("Operation '{operation}' failed after {attempts} attempts: {source}")]
    RetriesExhausted {
        operation: String,
        attempts: usize,
        #[source]
        source: ClientError,
    },

    #[error("Configuration error: {0}")]
    Config(Box<figment::Error>),
}

impl DocProxyError {
    /// True when the failure came from repeated transient disconnects rather
    /// than from the request itself.
    pub fn is_exhausted(&self) -> bool {
        matches!(self, DocProxyError::RetriesExhausted { .. })
    }
}

mod docproxy;

pub use docproxy::DocProxyError;
pub use docproxy_client::ClientError;

pub trait IsRetryable {
    fn is_retryable(&self) -> bool;
}

impl IsRetryable for ClientError {
    /// Only a dropped connection that the client is re-establishing is worth
    /// another attempt.
    fn is_retryable(&self) -> bool {
        self.is_auto_reconnect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_auto_reconnect_is_retryable() {
        assert!(ClientError::AutoReconnect("reset by peer".to_string()).is_retryable());
        assert!(!ClientError::Auth("bad password".to_string()).is_retryable());
        assert!(!ClientError::NotFound("users".to_string()).is_retryable());
        assert!(
            !ClientError::OperationFailure {
                code: 11600,
                message: "interrupted at shutdown".to_string(),
            }
            .is_retryable()
        );
    }
}

use docproxy_client::ClientError;
use serde_json::Value;

use crate::error::DocProxyError;

/// Result of a retried call that did not hit a fatal error.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T = Value> {
    Success(T),
    /// Every attempt failed transiently.
    Exhausted {
        operation: String,
        attempts: usize,
        last_error: ClientError,
    },
}

impl<T> Outcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self, Outcome::Exhausted { .. })
    }

    /// The value on success, `None` once retries ran out.
    pub fn into_option(self) -> Option<T> {
        match self {
            Outcome::Success(value) => Some(value),
            Outcome::Exhausted { .. } => None,
        }
    }

    /// Surfaces exhaustion as [`DocProxyError::RetriesExhausted`].
    pub fn into_result(self) -> Result<T, DocProxyError> {
        match self {
            Outcome::Success(value) => Ok(value),
            Outcome::Exhausted {
                operation,
                attempts,
                last_error,
            } => Err(DocProxyError::RetriesExhausted {
                operation,
                attempts,
                source: last_error,
            }),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Success(value) => Outcome::Success(f(value)),
            Outcome::Exhausted {
                operation,
                attempts,
                last_error,
            } => Outcome::Exhausted {
                operation,
                attempts,
                last_error,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exhausted() -> Outcome<u32> {
        Outcome::Exhausted {
            operation: "app.users.find".to_string(),
            attempts: 5,
            last_error: ClientError::AutoReconnect("primary stepped down".to_string()),
        }
    }

    #[test]
    fn exhausted_maps_to_none() {
        assert_eq!(exhausted().into_option(), None);
        assert_eq!(Outcome::Success(7).into_option(), Some(7));
    }

    #[test]
    fn exhausted_surfaces_as_error() {
        let err = exhausted().into_result().unwrap_err();

        assert!(err.is_exhausted());
        assert_eq!(
            err.to_string(),
            "Operation 'app.users.find' failed after 5 attempts: \
             Connection lost, reconnecting: primary stepped down"
        );
    }

    #[test]
    fn map_keeps_exhaustion_details() {
        let mapped = exhausted().map(|n| n * 2);
        assert!(mapped.is_exhausted());
        assert!(!mapped.is_success());
        assert_eq!(Outcome::Success(2).map(|n| n * 2), Outcome::Success(4));
    }
}

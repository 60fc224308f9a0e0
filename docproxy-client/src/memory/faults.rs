use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;

use crate::ClientError;

#[derive(Debug, Default)]
struct FaultState {
    transient_remaining: usize,
    disconnected: bool,
    fatal: Option<ClientError>,
    calls: usize,
}

/// Failure injection shared by every handle of one client.
#[derive(Debug, Default)]
pub struct FaultPlan {
    state: Mutex<FaultState>,
}

impl FaultPlan {
    fn lock(&self) -> MutexGuard<'_, FaultState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The next `count` operation calls fail with `AutoReconnect`.
    pub fn disconnect_next(&self, count: usize) {
        self.lock().transient_remaining = count;
    }

    /// Every call fails with `AutoReconnect` until [`FaultPlan::reconnect`].
    pub fn disconnect(&self) {
        self.lock().disconnected = true;
    }

    pub fn reconnect(&self) {
        let mut state = self.lock();
        state.disconnected = false;
        state.transient_remaining = 0;
    }

    /// The next call fails once with `error`.
    pub fn fail_next_with(&self, error: ClientError) {
        self.lock().fatal = Some(error);
    }

    pub fn is_connected(&self) -> bool {
        let state = self.lock();
        !state.disconnected && state.transient_remaining == 0
    }

    /// Operation calls observed so far, failed ones included.
    pub fn calls(&self) -> usize {
        self.lock().calls
    }

    pub(crate) fn check(&self, operation: &str) -> Result<(), ClientError> {
        let mut state = self.lock();
        state.calls += 1;

        if let Some(error) = state.fatal.take() {
            debug!(operation, %error, "Injected failure");
            return Err(error);
        }

        if state.disconnected || state.transient_remaining > 0 {
            state.transient_remaining = state.transient_remaining.saturating_sub(1);
            debug!(operation, "Injected disconnect");
            return Err(ClientError::AutoReconnect(format!(
                "connection closed during {operation}"
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disconnect_next_fails_exact_count() {
        let plan = FaultPlan::default();
        plan.disconnect_next(2);

        assert!(plan.check("op").is_err());
        assert!(plan.check("op").is_err());
        assert!(plan.check("op").is_ok());
        assert_eq!(plan.calls(), 3);
    }

    #[test]
    fn injected_fatal_error_wins_over_disconnect() {
        let plan = FaultPlan::default();
        plan.disconnect();
        plan.fail_next_with(ClientError::Auth("bad credentials".to_string()));

        assert_eq!(
            plan.check("op"),
            Err(ClientError::Auth("bad credentials".to_string()))
        );
        assert!(matches!(plan.check("op"), Err(ClientError::AutoReconnect(_))));

        plan.reconnect();
        assert!(plan.is_connected());
        assert!(plan.check("op").is_ok());
    }
}

use docproxy_client::{CallArgs, ClientError, Member};
use serde_json::Value;
use std::{fmt, sync::Arc};
use tracing::debug;

use super::{Outcome, RetryPolicy, Sleeper};
use crate::error::DocProxyError;
use crate::utils::logging::with_pretty_json_debug;

/// A bound operation whose every invocation runs under a [`RetryPolicy`].
#[derive(Clone)]
pub struct RetryingOperation {
    target: Member,
    path: Arc<str>,
    policy: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
}

impl RetryingOperation {
    pub fn new(
        target: Member,
        path: impl Into<Arc<str>>,
        policy: RetryPolicy,
        sleeper: Arc<dyn Sleeper>,
    ) -> Self {
        Self {
            target,
            path: path.into(),
            policy,
            sleeper,
        }
    }

    /// Access path used in log fields, e.g. `app.users.find`.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn target(&self) -> &Member {
        &self.target
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Invokes the operation. Non-transient errors come back as `Err`
    /// unchanged; running out of attempts comes back as
    /// [`Outcome::Exhausted`].
    pub fn call(&self, args: &CallArgs) -> Result<Outcome, ClientError> {
        with_pretty_json_debug(args, |pretty_args| {
            debug!(operation = %self.path, args = %pretty_args, "Invoking operation");
        });

        self.policy
            .execute(&self.path, self.sleeper.as_ref(), || self.target.call(args))
    }

    /// Like [`RetryingOperation::call`], but exhaustion is an error.
    pub fn call_strict(&self, args: &CallArgs) -> Result<Value, DocProxyError> {
        self.call(args)?.into_result()
    }
}

impl fmt::Debug for RetryingOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryingOperation")
            .field("path", &self.path)
            .field("target", &self.target)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

use docproxy_client::{CallArgs, ClientError};

use super::Proxy;
use crate::retry::{Outcome, RetryingOperation};

/// What a member access on a [`Proxy`] resolved to.
#[derive(Debug, Clone)]
pub enum Access {
    /// A known operation, retried on transient disconnects.
    Operation(RetryingOperation),
    /// Anything else, navigable further.
    Resource(Proxy),
}

impl Access {
    pub fn is_operation(&self) -> bool {
        matches!(self, Access::Operation(_))
    }

    pub fn is_resource(&self) -> bool {
        matches!(self, Access::Resource(_))
    }

    pub fn into_operation(self) -> Option<RetryingOperation> {
        match self {
            Access::Operation(op) => Some(op),
            Access::Resource(_) => None,
        }
    }

    pub fn into_proxy(self) -> Option<Proxy> {
        match self {
            Access::Resource(proxy) => Some(proxy),
            Access::Operation(_) => None,
        }
    }

    pub fn path(&self) -> &str {
        match self {
            Access::Operation(op) => op.path(),
            Access::Resource(proxy) => proxy.path(),
        }
    }

    /// Operations are invoked with retries; resources receive a plain
    /// direct call.
    pub fn call(&self, args: &CallArgs) -> Result<Outcome, ClientError> {
        match self {
            Access::Operation(op) => op.call(args),
            Access::Resource(proxy) => proxy.call(args).map(Outcome::Success),
        }
    }
}

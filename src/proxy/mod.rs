//! Transparent proxy over a client object.
//!
//! A [`Proxy`] stands in for a connection, database or collection handle.
//! Member access is classified against the shared [`OperationSet`]: known
//! operation names come back as [`RetryingOperation`]s, everything else as a
//! fresh nested proxy. Nothing is cached; each access builds a new wrapper.

mod access;

pub use access::Access;

use docproxy_client::{CallArgs, ClientError, DeclaresSurface, Member, Resource};
use serde_json::Value;
use std::{fmt, sync::Arc};
use tracing::trace;

use crate::operations::OperationSet;
use crate::retry::{RetryPolicy, RetryingOperation, Sleeper, ThreadSleeper};

#[derive(Clone)]
pub struct Proxy {
    target: Member,
    path: Arc<str>,
    operations: Arc<OperationSet>,
    policy: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
}

impl Proxy {
    /// Wraps `root` with the default retry policy and a blocking sleeper.
    pub fn new(root: Arc<dyn Resource>, operations: Arc<OperationSet>) -> Self {
        Self {
            target: Member::Resource(root),
            path: Arc::from(""),
            operations,
            policy: RetryPolicy::default(),
            sleeper: Arc::new(ThreadSleeper),
        }
    }

    /// Wraps a client, introspecting its declared surface for the operation
    /// set. Do this once per client and clone the proxy afterwards.
    pub fn for_client<C>(client: Arc<C>) -> Self
    where
        C: Resource + DeclaresSurface + 'static,
    {
        let operations = Arc::new(OperationSet::introspect(client.as_ref()));
        Self::new(client, operations)
    }

    #[must_use]
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Dotted access path from the root proxy; empty for the root itself.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn target(&self) -> &Member {
        &self.target
    }

    pub fn operations(&self) -> &OperationSet {
        &self.operations
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Member access: a retried operation if `name` is a known operation,
    /// otherwise a nested proxy.
    pub fn get(&self, name: &str) -> Access {
        let member = self.target.member(name);
        let path = self.child_path(name);

        if self.operations.contains(name) {
            trace!(path = %path, "Member classified as operation");
            Access::Operation(RetryingOperation::new(
                member,
                path,
                self.policy,
                self.sleeper.clone(),
            ))
        } else {
            trace!(path = %path, "Member classified as resource");
            Access::Resource(self.child(member, path))
        }
    }

    /// Indexed access: always a nested proxy, even for operation names.
    pub fn index(&self, key: &str) -> Proxy {
        self.child(self.target.member(key), self.child_path(key))
    }

    /// Walks a dotted chain such as `app.users.find`. Every segment but the
    /// last is navigated as a sub-resource; the last one is classified like
    /// [`Proxy::get`]. Navigating past an operation yields a missing member
    /// that fails when invoked.
    pub fn resolve(&self, path: &str) -> Access {
        let mut segments = path.split('.').filter(|s| !s.is_empty()).peekable();
        let mut current = self.clone();

        while let Some(segment) = segments.next() {
            if segments.peek().is_none() {
                return current.get(segment);
            }
            current = current.index(segment);
        }

        Access::Resource(current)
    }

    /// Forwards a call to the wrapped object itself, without retries.
    pub fn call(&self, args: &CallArgs) -> Result<Value, ClientError> {
        self.target.call(args)
    }

    pub fn members(&self) -> Vec<String> {
        self.target.members()
    }

    /// A proxy is always live, whatever the state of the connection behind
    /// it.
    pub fn is_live(&self) -> bool {
        true
    }

    fn child(&self, target: Member, path: String) -> Proxy {
        Proxy {
            target,
            path: path.into(),
            operations: self.operations.clone(),
            policy: self.policy,
            sleeper: self.sleeper.clone(),
        }
    }

    fn child_path(&self, name: &str) -> String {
        if self.path.is_empty() {
            name.to_string()
        } else {
            format!("{}.{name}", self.path)
        }
    }
}

impl fmt::Display for Proxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.target.describe())
    }
}

impl fmt::Debug for Proxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Proxy")
            .field("path", &self.path)
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}

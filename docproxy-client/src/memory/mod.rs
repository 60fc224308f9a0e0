//! In-memory document client.
//!
//! Mirrors the shape of a networked client: a connection selects databases,
//! a database selects collections, and every call goes through a shared
//! [`FaultPlan`] so tests can simulate dropped connections.

mod collection;
mod connection;
mod database;
mod faults;

pub use collection::MemoryCollection;
pub use connection::MemoryClient;
pub use database::MemoryDatabase;
pub use faults::FaultPlan;

use serde_json::{Map, Value};
use std::{
    collections::BTreeMap,
    sync::{
        Arc, Mutex, MutexGuard, PoisonError,
        atomic::{AtomicU64, Ordering},
    },
};

use crate::{CallArgs, ClientError, Operation};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Names exported from the client's top-level namespace.
pub const MODULE_EXPORTS: &[&str] = &["connect", "version"];

pub fn connect() -> Arc<MemoryClient> {
    Arc::new(MemoryClient::new("localhost"))
}

type Collections = BTreeMap<String, Vec<Value>>;

pub(crate) struct Store {
    host: String,
    databases: Mutex<BTreeMap<String, Collections>>,
    faults: FaultPlan,
    next_id: AtomicU64,
}

impl Store {
    fn new(host: &str) -> Self {
        Self {
            host: host.to_string(),
            databases: Mutex::new(BTreeMap::new()),
            faults: FaultPlan::default(),
            next_id: AtomicU64::new(1),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, Collections>> {
        self.databases.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }
}

type Handler = Box<dyn Fn(&CallArgs) -> Result<Value, ClientError> + Send + Sync>;

/// Operation bound to one handle. Every invocation consults the fault plan
/// before touching data.
struct BoundOp {
    store: Arc<Store>,
    name: String,
    handler: Handler,
}

impl Operation for BoundOp {
    fn name(&self) -> &str {
        &self.name
    }

    fn invoke(&self, args: &CallArgs) -> Result<Value, ClientError> {
        self.store.faults.check(&self.name)?;
        (self.handler)(args)
    }
}

fn bind<F>(store: &Arc<Store>, name: String, handler: F) -> Arc<dyn Operation>
where
    F: Fn(&CallArgs) -> Result<Value, ClientError> + Send + Sync + 'static,
{
    Arc::new(BoundOp {
        store: store.clone(),
        name,
        handler: Box::new(handler),
    })
}

fn object_arg(
    args: &CallArgs,
    index: usize,
    name: &str,
) -> Result<Map<String, Value>, ClientError> {
    match args.lookup(index, name) {
        None | Some(Value::Null) => Ok(Map::new()),
        Some(Value::Object(map)) => Ok(map.clone()),
        Some(other) => Err(ClientError::InvalidArgument(format!(
            "{name} must be an object, got {other}"
        ))),
    }
}

fn string_arg<'a>(
    args: &'a CallArgs,
    index: usize,
    name: &str,
) -> Result<&'a str, ClientError> {
    args.lookup(index, name)
        .and_then(Value::as_str)
        .ok_or_else(|| ClientError::InvalidArgument(format!("{name} must be a string")))
}

/// Top-level field equality.
fn matches(document: &Value, filter: &Map<String, Value>) -> bool {
    filter
        .iter()
        .all(|(field, expected)| document.get(field) == Some(expected))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_filter_matches_everything() {
        assert!(matches(&json!({"a": 1}), &Map::new()));
    }

    #[test]
    fn filter_compares_top_level_fields() {
        let filter = json!({"name": "ada", "age": 36});
        let filter = filter.as_object().expect("object");

        assert!(matches(&json!({"name": "ada", "age": 36, "x": 1}), filter));
        assert!(!matches(&json!({"name": "ada"}), filter));
    }

    #[test]
    fn object_arg_rejects_scalars() {
        let args = CallArgs::one(3);
        assert!(matches!(
            object_arg(&args, 0, "filter"),
            Err(ClientError::InvalidArgument(_))
        ));
    }
}

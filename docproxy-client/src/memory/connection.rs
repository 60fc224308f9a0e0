use serde_json::{Value, json};
use std::sync::Arc;

use super::{FaultPlan, MODULE_EXPORTS, MemoryDatabase, Store, VERSION, bind, string_arg};
use crate::{
    CallArgs, ClientError, DeclaresSurface, Member, Resource, TypeSurface,
    memory::{collection::COLLECTION_OPERATIONS, database::DATABASE_OPERATIONS},
};

pub(crate) const CLIENT_OPERATIONS: &[&str] =
    &["list_database_names", "drop_database", "server_info", "close"];

/// Connection handle of the in-memory client. Cheap to clone; clones share
/// data and faults.
#[derive(Clone)]
pub struct MemoryClient {
    store: Arc<Store>,
}

impl MemoryClient {
    pub fn new(host: &str) -> Self {
        Self {
            store: Arc::new(Store::new(host)),
        }
    }

    pub fn faults(&self) -> &FaultPlan {
        &self.store.faults
    }

    pub fn database(&self, name: &str) -> MemoryDatabase {
        MemoryDatabase::new(self.store.clone(), name)
    }

    fn list_database_names(&self, _args: &CallArgs) -> Result<Value, ClientError> {
        Ok(json!(self.store.lock().keys().collect::<Vec<_>>()))
    }

    fn drop_database(&self, args: &CallArgs) -> Result<Value, ClientError> {
        let name = string_arg(args, 0, "name")?;
        self.store.lock().remove(name);
        Ok(Value::Null)
    }

    fn server_info(&self, _args: &CallArgs) -> Result<Value, ClientError> {
        Ok(json!({ "version": VERSION, "host": self.store.host, "ok": 1 }))
    }

    fn close(&self, _args: &CallArgs) -> Result<Value, ClientError> {
        Ok(Value::Null)
    }
}

impl Resource for MemoryClient {
    fn type_name(&self) -> &'static str {
        "MemoryClient"
    }

    fn member(&self, name: &str) -> Member {
        let handler: fn(&MemoryClient, &CallArgs) -> Result<Value, ClientError> = match name {
            "list_database_names" => MemoryClient::list_database_names,
            "drop_database" => MemoryClient::drop_database,
            "server_info" => MemoryClient::server_info,
            "close" => MemoryClient::close,
            _ => return Member::Resource(Arc::new(self.database(name))),
        };

        let this = self.clone();
        Member::Operation(bind(&self.store, name.to_string(), move |args| {
            handler(&this, args)
        }))
    }

    fn members(&self) -> Vec<String> {
        let mut names: Vec<String> = CLIENT_OPERATIONS.iter().map(|s| s.to_string()).collect();
        names.extend(self.store.lock().keys().cloned());
        names.sort();
        names
    }

    fn describe(&self) -> String {
        format!("MemoryClient(host='{}')", self.store.host)
    }
}

impl DeclaresSurface for MemoryClient {
    fn surface(&self) -> Vec<TypeSurface> {
        vec![
            TypeSurface::new("MemoryClient", CLIENT_OPERATIONS),
            TypeSurface::new("MemoryDatabase", DATABASE_OPERATIONS),
            TypeSurface::new("MemoryCollection", COLLECTION_OPERATIONS),
            TypeSurface::new("module", MODULE_EXPORTS),
        ]
    }
}

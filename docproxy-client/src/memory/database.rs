use serde_json::{Value, json};
use std::sync::Arc;

use super::{MemoryCollection, Store, bind, string_arg};
use crate::{CallArgs, ClientError, Member, Resource};

pub(crate) const DATABASE_OPERATIONS: &[&str] = &[
    "list_collection_names",
    "create_collection",
    "drop_collection",
    "command",
];

#[derive(Clone)]
pub struct MemoryDatabase {
    store: Arc<Store>,
    name: String,
}

impl MemoryDatabase {
    pub(crate) fn new(store: Arc<Store>, name: &str) -> Self {
        Self {
            store,
            name: name.to_string(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn collection(&self, name: &str) -> MemoryCollection {
        MemoryCollection::new(self.store.clone(), &self.name, name)
    }

    fn list_collection_names(&self, _args: &CallArgs) -> Result<Value, ClientError> {
        let databases = self.store.lock();
        let names: Vec<&String> = databases
            .get(&self.name)
            .map(|collections| collections.keys().collect())
            .unwrap_or_default();
        Ok(json!(names))
    }

    fn create_collection(&self, args: &CallArgs) -> Result<Value, ClientError> {
        let name = string_arg(args, 0, "name")?;
        let mut databases = self.store.lock();
        let collections = databases.entry(self.name.clone()).or_default();
        if collections.contains_key(name) {
            return Err(ClientError::OperationFailure {
                code: 48,
                message: format!("collection {}.{name} already exists", self.name),
            });
        }
        collections.insert(name.to_string(), Vec::new());
        Ok(json!({ "ok": 1 }))
    }

    fn drop_collection(&self, args: &CallArgs) -> Result<Value, ClientError> {
        let name = string_arg(args, 0, "name")?;
        if let Some(collections) = self.store.lock().get_mut(&self.name) {
            collections.remove(name);
        }
        Ok(json!({ "ok": 1 }))
    }

    /// Only `ping` is understood, as a bare string or `{"ping": 1}`.
    fn command(&self, args: &CallArgs) -> Result<Value, ClientError> {
        let command = match args.lookup(0, "command") {
            Some(Value::String(name)) => name.as_str(),
            Some(Value::Object(doc)) => doc.keys().next().map_or("", String::as_str),
            _ => "",
        };

        match command {
            "ping" => Ok(json!({ "ok": 1 })),
            other => Err(ClientError::OperationFailure {
                code: 59,
                message: format!("no such command: '{other}'"),
            }),
        }
    }
}

impl Resource for MemoryDatabase {
    fn type_name(&self) -> &'static str {
        "MemoryDatabase"
    }

    fn member(&self, name: &str) -> Member {
        let handler: fn(&MemoryDatabase, &CallArgs) -> Result<Value, ClientError> = match name {
            "list_collection_names" => MemoryDatabase::list_collection_names,
            "create_collection" => MemoryDatabase::create_collection,
            "drop_collection" => MemoryDatabase::drop_collection,
            "command" => MemoryDatabase::command,
            _ => return Member::Resource(Arc::new(self.collection(name))),
        };

        let this = self.clone();
        Member::Operation(bind(
            &self.store,
            format!("{}.{name}", self.name),
            move |args| handler(&this, args),
        ))
    }

    fn members(&self) -> Vec<String> {
        let mut names: Vec<String> = DATABASE_OPERATIONS.iter().map(|s| s.to_string()).collect();
        if let Some(collections) = self.store.lock().get(&self.name) {
            names.extend(collections.keys().cloned());
        }
        names.sort();
        names
    }

    fn describe(&self) -> String {
        format!("MemoryDatabase(host='{}', name='{}')", self.store.host, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryClient;

    #[test]
    fn create_collection_twice_fails() {
        let db = MemoryClient::new("localhost").database("app");
        let create = db.member("create_collection");

        assert!(create.call(&CallArgs::one("users")).is_ok());
        assert!(matches!(
            create.call(&CallArgs::one("users")),
            Err(ClientError::OperationFailure { code: 48, .. })
        ));
        assert_eq!(
            db.member("list_collection_names").call(&CallArgs::new()),
            Ok(json!(["users"]))
        );
    }

    #[test]
    fn command_accepts_ping_only() {
        let db = MemoryClient::new("localhost").database("admin");
        let command = db.member("command");

        assert_eq!(
            command.call(&CallArgs::one(json!({"ping": 1}))),
            Ok(json!({"ok": 1}))
        );
        assert!(command.call(&CallArgs::one("shutdown")).is_err());
    }
}

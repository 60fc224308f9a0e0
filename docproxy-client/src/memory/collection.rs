use serde_json::{Map, Value, json};
use std::sync::Arc;

use super::{Store, bind, matches, object_arg};
use crate::{CallArgs, ClientError, Member, Resource};

pub(crate) const COLLECTION_OPERATIONS: &[&str] = &[
    "find",
    "find_one",
    "insert_one",
    "insert_many",
    "update_one",
    "delete_one",
    "delete_many",
    "count_documents",
    "drop",
];

#[derive(Clone)]
pub struct MemoryCollection {
    store: Arc<Store>,
    database: String,
    name: String,
}

impl MemoryCollection {
    pub(crate) fn new(store: Arc<Store>, database: &str, name: &str) -> Self {
        Self {
            store,
            database: database.to_string(),
            name: name.to_string(),
        }
    }

    pub fn full_name(&self) -> String {
        format!("{}.{}", self.database, self.name)
    }

    fn with_documents<T>(&self, f: impl FnOnce(&mut Vec<Value>) -> T) -> T {
        let mut databases = self.store.lock();
        let documents = databases
            .entry(self.database.clone())
            .or_default()
            .entry(self.name.clone())
            .or_default();
        f(documents)
    }

    fn read_documents<T>(&self, f: impl FnOnce(&[Value]) -> T) -> T {
        let databases = self.store.lock();
        let documents = databases
            .get(&self.database)
            .and_then(|collections| collections.get(&self.name))
            .map_or(&[][..], Vec::as_slice);
        f(documents)
    }

    fn find(&self, args: &CallArgs) -> Result<Value, ClientError> {
        let filter = object_arg(args, 0, "filter")?;
        let found: Vec<Value> = self.read_documents(|docs| {
            docs.iter()
                .filter(|doc| matches(doc, &filter))
                .cloned()
                .collect()
        });
        Ok(Value::Array(found))
    }

    fn find_one(&self, args: &CallArgs) -> Result<Value, ClientError> {
        let filter = object_arg(args, 0, "filter")?;
        Ok(self.read_documents(|docs| {
            docs.iter()
                .find(|doc| matches(doc, &filter))
                .cloned()
                .unwrap_or(Value::Null)
        }))
    }

    fn insert_one(&self, args: &CallArgs) -> Result<Value, ClientError> {
        let document = match args.lookup(0, "document") {
            Some(Value::Object(doc)) => doc.clone(),
            _ => {
                return Err(ClientError::InvalidArgument(
                    "document must be an object".to_string(),
                ));
            }
        };
        let id = self.with_documents(|docs| self.insert(docs, document))?;
        Ok(json!({ "inserted_id": id }))
    }

    fn insert_many(&self, args: &CallArgs) -> Result<Value, ClientError> {
        let Some(Value::Array(batch)) = args.lookup(0, "documents") else {
            return Err(ClientError::InvalidArgument(
                "documents must be an array".to_string(),
            ));
        };
        let batch = batch
            .iter()
            .map(|doc| match doc {
                Value::Object(map) => Ok(map.clone()),
                other => Err(ClientError::InvalidArgument(format!(
                    "document must be an object, got {other}"
                ))),
            })
            .collect::<Result<Vec<_>, _>>()?;

        let ids = self.with_documents(|docs| {
            batch
                .into_iter()
                .map(|doc| self.insert(docs, doc))
                .collect::<Result<Vec<_>, _>>()
        })?;
        Ok(json!({ "inserted_ids": ids }))
    }

    fn update_one(&self, args: &CallArgs) -> Result<Value, ClientError> {
        let filter = object_arg(args, 0, "filter")?;
        let update = object_arg(args, 1, "update")?;
        let upsert = args
            .lookup(2, "upsert")
            .and_then(Value::as_bool)
            .unwrap_or(false);

        let Some(Value::Object(set)) = update.get("$set") else {
            return Err(ClientError::InvalidArgument(
                "update must contain a $set document".to_string(),
            ));
        };
        if update.len() > 1 {
            return Err(ClientError::InvalidArgument(
                "only $set is supported".to_string(),
            ));
        }

        self.with_documents(|docs| {
            if let Some(Value::Object(doc)) = docs.iter_mut().find(|doc| matches(doc, &filter)) {
                let before = doc.clone();
                doc.extend(set.iter().map(|(k, v)| (k.clone(), v.clone())));
                let modified = usize::from(*doc != before);
                return Ok(json!({ "matched_count": 1, "modified_count": modified }));
            }

            if !upsert {
                return Ok(json!({ "matched_count": 0, "modified_count": 0 }));
            }

            let mut doc = filter.clone();
            doc.extend(set.iter().map(|(k, v)| (k.clone(), v.clone())));
            let id = self.insert(docs, doc)?;
            Ok(json!({ "matched_count": 0, "modified_count": 0, "upserted_id": id }))
        })
    }

    fn delete_one(&self, args: &CallArgs) -> Result<Value, ClientError> {
        let filter = object_arg(args, 0, "filter")?;
        let deleted = self.with_documents(|docs| {
            match docs.iter().position(|doc| matches(doc, &filter)) {
                Some(index) => {
                    docs.remove(index);
                    1
                }
                None => 0,
            }
        });
        Ok(json!({ "deleted_count": deleted }))
    }

    fn delete_many(&self, args: &CallArgs) -> Result<Value, ClientError> {
        let filter = object_arg(args, 0, "filter")?;
        let deleted = self.with_documents(|docs| {
            let before = docs.len();
            docs.retain(|doc| !matches(doc, &filter));
            before - docs.len()
        });
        Ok(json!({ "deleted_count": deleted }))
    }

    fn count_documents(&self, args: &CallArgs) -> Result<Value, ClientError> {
        let filter = object_arg(args, 0, "filter")?;
        let count = self.read_documents(|docs| {
            docs.iter().filter(|doc| matches(doc, &filter)).count()
        });
        Ok(json!(count))
    }

    fn drop(&self, _args: &CallArgs) -> Result<Value, ClientError> {
        if let Some(collections) = self.store.lock().get_mut(&self.database) {
            collections.remove(&self.name);
        }
        Ok(Value::Null)
    }

    /// Appends `document`, assigning `_id` when absent.
    fn insert(
        &self,
        docs: &mut Vec<Value>,
        mut document: Map<String, Value>,
    ) -> Result<Value, ClientError> {
        let id = document
            .entry("_id")
            .or_insert_with(|| json!(self.store.next_id()))
            .clone();

        if docs.iter().any(|doc| doc.get("_id") == Some(&id)) {
            return Err(ClientError::DuplicateKey(format!(
                "{} _id {id}",
                self.full_name()
            )));
        }

        docs.push(Value::Object(document));
        Ok(id)
    }
}

impl Resource for MemoryCollection {
    fn type_name(&self) -> &'static str {
        "MemoryCollection"
    }

    fn member(&self, name: &str) -> Member {
        let handler: fn(&MemoryCollection, &CallArgs) -> Result<Value, ClientError> = match name {
            "find" => MemoryCollection::find,
            "find_one" => MemoryCollection::find_one,
            "insert_one" => MemoryCollection::insert_one,
            "insert_many" => MemoryCollection::insert_many,
            "update_one" => MemoryCollection::update_one,
            "delete_one" => MemoryCollection::delete_one,
            "delete_many" => MemoryCollection::delete_many,
            "count_documents" => MemoryCollection::count_documents,
            "drop" => MemoryCollection::drop,
            // Dotted sub-collection, e.g. `fs.files`.
            _ => {
                let sub = format!("{}.{name}", self.name);
                return Member::Resource(Arc::new(Self::new(
                    self.store.clone(),
                    &self.database,
                    &sub,
                )));
            }
        };

        let this = self.clone();
        Member::Operation(bind(
            &self.store,
            format!("{}.{name}", self.full_name()),
            move |args| handler(&this, args),
        ))
    }

    fn members(&self) -> Vec<String> {
        COLLECTION_OPERATIONS.iter().map(|s| s.to_string()).collect()
    }

    fn describe(&self) -> String {
        format!(
            "MemoryCollection(host='{}', name='{}')",
            self.store.host,
            self.full_name()
        )
    }
}

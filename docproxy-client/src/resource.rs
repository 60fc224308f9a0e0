use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::{fmt, sync::Arc};

use crate::ClientError;

/// Positional and keyword arguments passed to an operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CallArgs {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    positional: Vec<Value>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    keyword: Map<String, Value>,
}

impl CallArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arguments holding a single positional value.
    pub fn one(value: impl Into<Value>) -> Self {
        Self::new().arg(value)
    }

    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    pub fn kwarg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.keyword.insert(name.into(), value.into());
        self
    }

    pub fn positional(&self) -> &[Value] {
        &self.positional
    }

    pub fn keyword(&self) -> &Map<String, Value> {
        &self.keyword
    }

    /// Looks up a parameter passed either at `index` or by `name`.
    /// The keyword form wins when both are present.
    pub fn lookup(&self, index: usize, name: &str) -> Option<&Value> {
        self.keyword
            .get(name)
            .or_else(|| self.positional.get(index))
    }

    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.keyword.is_empty()
    }
}

/// A bound, directly invokable database action.
pub trait Operation: Send + Sync {
    /// Qualified name, e.g. `app.users.find`.
    fn name(&self) -> &str;

    fn invoke(&self, args: &CallArgs) -> Result<Value, ClientError>;
}

/// A navigable client object: a connection, database or collection handle.
pub trait Resource: Send + Sync {
    fn type_name(&self) -> &'static str;

    /// Member lookup by name. Never fails: unknown names resolve to whatever
    /// the client considers a sub-resource, or to [`Member::Missing`].
    fn member(&self, name: &str) -> Member;

    /// Names currently reachable on this object.
    fn members(&self) -> Vec<String>;

    fn describe(&self) -> String;

    /// Invoked when the resource itself is called. Most resources are not
    /// callable.
    fn call(&self, _args: &CallArgs) -> Result<Value, ClientError> {
        Err(ClientError::NotCallable(self.type_name().to_string()))
    }
}

/// Result of a member lookup.
#[derive(Clone)]
pub enum Member {
    Operation(Arc<dyn Operation>),
    Resource(Arc<dyn Resource>),
    /// A lookup that found nothing. The failure is reported when the member
    /// is invoked.
    Missing { owner: String, name: String },
}

impl Member {
    pub fn call(&self, args: &CallArgs) -> Result<Value, ClientError> {
        match self {
            Member::Operation(op) => op.invoke(args),
            Member::Resource(resource) => resource.call(args),
            Member::Missing { owner, name } => Err(ClientError::NoSuchMember {
                owner: owner.clone(),
                name: name.clone(),
            }),
        }
    }

    pub fn member(&self, name: &str) -> Member {
        match self {
            Member::Resource(resource) => resource.member(name),
            Member::Operation(op) => Member::Missing {
                owner: op.name().to_string(),
                name: name.to_string(),
            },
            Member::Missing { owner, name: missing } => Member::Missing {
                owner: format!("{owner}.{missing}"),
                name: name.to_string(),
            },
        }
    }

    pub fn members(&self) -> Vec<String> {
        match self {
            Member::Resource(resource) => resource.members(),
            Member::Operation(_) | Member::Missing { .. } => Vec::new(),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Member::Operation(op) => format!("<operation {}>", op.name()),
            Member::Resource(resource) => resource.describe(),
            Member::Missing { owner, name } => format!("<missing {owner}.{name}>"),
        }
    }

    pub fn is_operation(&self) -> bool {
        matches!(self, Member::Operation(_))
    }
}

impl fmt::Debug for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

impl<R: Resource + 'static> From<Arc<R>> for Member {
    fn from(resource: Arc<R>) -> Self {
        Member::Resource(resource)
    }
}

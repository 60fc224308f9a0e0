//! Known-operation classifier.
//!
//! Collects the member names a client declares as directly invokable. The
//! proxy consults this set on every member access to choose between wrapping
//! the member as a retried operation or as a navigable sub-resource.

use ahash::AHashSet;
use docproxy_client::DeclaresSurface;
use tracing::debug;

/// Immutable set of operation names, built once per client and shared by
/// every proxy derived from the same root.
#[derive(Debug, Clone, Default)]
pub struct OperationSet {
    names: AHashSet<String>,
}

impl OperationSet {
    /// Builds the set from every public member the client declares on its
    /// connection type, sub-resource types and top-level namespace.
    pub fn introspect<C>(client: &C) -> Self
    where
        C: DeclaresSurface + ?Sized,
    {
        let surface = client.surface();
        let names: AHashSet<String> = surface
            .iter()
            .flat_map(|ty| ty.members.iter().copied())
            .filter(|name| is_public(name))
            .map(str::to_owned)
            .collect();

        debug!(
            types = surface.len(),
            operations = names.len(),
            "Built known-operation set"
        );

        Self { names }
    }

    /// Builds the set from an explicit list, taken as-is.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Names in lexical order.
    pub fn sorted(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.names.iter().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

fn is_public(name: &str) -> bool {
    !name.is_empty() && !name.starts_with('_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use docproxy_client::TypeSurface;

    struct FakeClient;

    impl DeclaresSurface for FakeClient {
        fn surface(&self) -> Vec<TypeSurface> {
            vec![
                TypeSurface::new("Connection", &["server_info", "_private", "close"]),
                TypeSurface::new("Collection", &["find", "close"]),
                TypeSurface::new("module", &["", "version"]),
            ]
        }
    }

    #[test]
    fn introspect_unions_public_names() {
        let ops = OperationSet::introspect(&FakeClient);

        assert_eq!(ops.sorted(), ["close", "find", "server_info", "version"]);
        assert!(!ops.contains("_private"));
    }

    #[test]
    fn from_names_keeps_names_verbatim() {
        let ops = OperationSet::from_names(["find", "_raw"]);

        assert_eq!(ops.len(), 2);
        assert!(ops.contains("_raw"));
        assert!(!ops.contains("insert_one"));
    }

    #[test]
    fn memory_client_surface_is_classified() {
        let client = docproxy_client::memory::connect();
        let ops = OperationSet::introspect(client.as_ref());

        for name in ["find", "insert_one", "server_info", "command", "connect"] {
            assert!(ops.contains(name), "{name} should be an operation");
        }
        assert!(!ops.contains("users"));
    }
}

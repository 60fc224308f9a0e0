/// Public member names declared by one exposed client type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSurface {
    pub type_name: &'static str,
    pub members: Vec<&'static str>,
}

impl TypeSurface {
    pub fn new(type_name: &'static str, members: &[&'static str]) -> Self {
        Self {
            type_name,
            members: members.to_vec(),
        }
    }
}

/// Implemented by a client to describe its callable surface: the connection
/// type, every sub-resource type, and the top-level namespace.
pub trait DeclaresSurface {
    fn surface(&self) -> Vec<TypeSurface>;
}

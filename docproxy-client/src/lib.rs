pub mod error;
pub mod memory;
pub mod resource;
pub mod surface;

pub use error::ClientError;
pub use resource::{CallArgs, Member, Operation, Resource};
pub use surface::{DeclaresSurface, TypeSurface};

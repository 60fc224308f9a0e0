mod operation;
mod outcome;
mod policy;
mod sleeper;

pub use operation::RetryingOperation;
pub use outcome::Outcome;
pub use policy::{RetryPolicy, TransientPredicate};
pub use sleeper::{RecordingSleeper, Sleeper, ThreadSleeper};

pub mod config;
pub mod error;
pub mod operations;
pub mod proxy;
pub mod retry;
pub(crate) mod utils;

pub use docproxy_client as client;
pub use docproxy_client::{CallArgs, ClientError};
pub use error::{DocProxyError, IsRetryable};
pub use operations::OperationSet;
pub use proxy::{Access, Proxy};
pub use retry::{Outcome, RetryPolicy, RetryingOperation};

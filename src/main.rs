use docproxy::client::memory;
use docproxy::{CallArgs, Outcome, Proxy, RetryPolicy};
use mimalloc::MiMalloc;
use serde_json::json;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = &docproxy::config::CONFIG;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cfg.basic.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_level(true)
                .with_target(false),
        )
        .init();

    info!(
        loglevel = %cfg.basic.loglevel,
        max_attempts = cfg.retry.max_attempts,
        base_delay_ms = cfg.retry.base_delay_ms,
        factor = cfg.retry.factor,
        "Loaded configuration"
    );

    let client = memory::connect();
    let proxy =
        Proxy::for_client(client.clone()).with_policy(RetryPolicy::from_config(&cfg.retry));
    info!(
        client = %proxy,
        operations = proxy.operations().len(),
        "Proxy ready"
    );

    let users = proxy.index("demo").index("users");

    // Short outage: the first two attempts hit a dropped connection.
    client.faults().disconnect_next(2);
    let inserted = users
        .get("insert_one")
        .call(&CallArgs::one(json!({ "name": "ada", "lang": "rust" })))?
        .into_result()?;
    info!(result = %inserted, "insert_one completed");

    let found = users
        .get("find")
        .call(&CallArgs::one(json!({ "lang": "rust" })))?;
    match found {
        Outcome::Success(docs) => info!(documents = %docs, "find completed"),
        Outcome::Exhausted { attempts, .. } => warn!(attempts, "find gave up"),
    }

    // Fatal errors are not retried.
    if let Err(error) = users
        .get("insert_one")
        .call(&CallArgs::one(json!({ "_id": inserted["inserted_id"], "name": "dup" })))
    {
        warn!(%error, "Duplicate insert rejected without retry");
    }

    let count = proxy
        .resolve("demo.users.count_documents")
        .call(&CallArgs::new())?
        .into_option();
    info!(count = ?count, "Done");

    Ok(())
}

#![allow(dead_code)]

use docproxy::client::memory::{self, MemoryClient};
use docproxy::retry::RecordingSleeper;
use docproxy::{Proxy, RetryPolicy};
use std::{
    fmt,
    sync::{Arc, Mutex},
    time::Duration,
};
use tracing::{
    Event, Level, Subscriber,
    field::{Field, Visit},
};
use tracing_subscriber::{
    Layer,
    layer::{Context, SubscriberExt},
    registry::Registry,
};

pub const RETRY_MESSAGE: &str = "Transient disconnect, retrying operation";
pub const EXHAUSTED_MESSAGE: &str = "Operation permanently failed after exhausting retries";

pub struct Fixture {
    pub client: Arc<MemoryClient>,
    pub proxy: Proxy,
    pub sleeper: Arc<RecordingSleeper>,
}

/// Memory client behind a proxy with the default schedule (1s base, x2, 5
/// attempts) and a sleeper that records instead of blocking.
pub fn fixture() -> Fixture {
    let client = memory::connect();
    let sleeper = Arc::new(RecordingSleeper::default());
    let proxy = Proxy::for_client(client.clone())
        .with_policy(RetryPolicy::new(5, Duration::from_secs(1)))
        .with_sleeper(sleeper.clone());
    Fixture {
        client,
        proxy,
        sleeper,
    }
}

pub fn secs(values: &[u64]) -> Vec<Duration> {
    values.iter().copied().map(Duration::from_secs).collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct CapturedEvent {
    pub level: Level,
    pub message: String,
}

#[derive(Clone, Default)]
pub struct CaptureLayer {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl CaptureLayer {
    pub fn events(&self) -> Vec<CapturedEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn count(&self, message: &str) -> usize {
        self.events()
            .iter()
            .filter(|event| event.message == message)
            .count()
    }
}

struct MessageVisitor(String);

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{value:?}");
        }
    }
}

impl<S: Subscriber> Layer<S> for CaptureLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = MessageVisitor(String::new());
        event.record(&mut visitor);
        self.events.lock().unwrap().push(CapturedEvent {
            level: *event.metadata().level(),
            message: visitor.0,
        });
    }
}

/// Runs `f` with a subscriber that records every event emitted on this thread.
pub fn capture_events<T>(f: impl FnOnce() -> T) -> (T, CaptureLayer) {
    let layer = CaptureLayer::default();
    let subscriber = Registry::default().with(layer.clone());
    let result = tracing::subscriber::with_default(subscriber, f);
    (result, layer)
}

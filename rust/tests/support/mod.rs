#![allow(dead_code)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use flume::Receiver;
use huddle_core::calling::InMemoryCallingService;
use huddle_core::{Action, ActionDispatch, AppState, CallingMiddlewareHandler, MiddlewareConfig};

/// A middleware wired to an in-memory service, with the dispatch receiver
/// exposed so tests can read exactly what was dispatched.
pub struct Rig {
    pub service: InMemoryCallingService,
    pub middleware: CallingMiddlewareHandler,
    pub dispatch: ActionDispatch,
    pub rx: Receiver<Action>,
}

impl Rig {
    /// Must be called from inside a tokio runtime.
    pub fn new() -> Self {
        Self::with_config(MiddlewareConfig::default())
    }

    pub fn with_config(config: MiddlewareConfig) -> Self {
        let service = InMemoryCallingService::with_event_capacity(config.event_capacity);
        let middleware = CallingMiddlewareHandler::new(
            Arc::new(service.clone()),
            tokio::runtime::Handle::current(),
            config,
        );
        let (dispatch, rx) = ActionDispatch::channel();
        Self {
            service,
            middleware,
            dispatch,
            rx,
        }
    }

    /// Starts the call and attaches the bridge.
    pub async fn start(&self) {
        self.middleware
            .start_call(&AppState::empty(), &self.dispatch)
            .await
            .expect("start task");
        assert!(self.middleware.subscriptions().is_active());
    }

    pub fn drain(&self) -> Vec<Action> {
        self.rx.drain().collect()
    }

    pub fn drain_tags(&self) -> Vec<&'static str> {
        self.rx.drain().map(|a| a.tag()).collect()
    }
}

/// Lets spawned bridge tasks run. Under a paused clock this also advances
/// time by `ms`.
pub async fn settle(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

/// Polls `f` on real time; for multi-threaded store tests.
pub async fn wait_until(what: &str, timeout: Duration, mut f: impl FnMut() -> bool) {
    let start = Instant::now();
    while start.elapsed() < timeout {
        if f() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("{what}: condition not met within {timeout:?}");
}

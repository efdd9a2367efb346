use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::thread;

use flume::Receiver;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::actions::Action;
use crate::dispatch::ActionDispatch;
use crate::middleware::CallingMiddlewareHandler;
use crate::state::AppState;

/// Produces the next snapshot for an action. Owned by the store actor.
pub trait Reducer: Send + 'static {
    fn reduce(&mut self, state: &AppState, action: &Action) -> AppState;
}

impl<F> Reducer for F
where
    F: FnMut(&AppState, &Action) -> AppState + Send + 'static,
{
    fn reduce(&mut self, state: &AppState, action: &Action) -> AppState {
        self(state, action)
    }
}

pub trait StateReconciler: Send + Sync + 'static {
    fn reconcile(&self, update: StateUpdate);
}

/// Full snapshot after one reduced action.
#[derive(Debug, Clone, PartialEq)]
pub struct StateUpdate {
    pub rev: u64,
    pub action: &'static str,
    pub state: AppState,
}

pub struct Store;

impl Store {
    /// Starts the store actor on `runtime`. Every action goes to the
    /// middleware with the pre-reduction snapshot, then through the reducer.
    pub fn spawn(
        initial: AppState,
        reducer: impl Reducer,
        middleware: CallingMiddlewareHandler,
        runtime: &Handle,
    ) -> StoreHandle {
        let (dispatch, action_rx) = ActionDispatch::channel();
        let (update_tx, update_rx) = flume::unbounded();
        let shared_state = Arc::new(RwLock::new(initial.clone()));

        let mut actor = StoreActor {
            state: initial,
            rev: 0,
            reducer,
            middleware: middleware.clone(),
            dispatch: dispatch.clone(),
            shared_state: shared_state.clone(),
            update_tx,
        };
        let task = runtime.spawn(async move {
            while let Ok(action) = action_rx.recv_async().await {
                actor.handle_action(action);
            }
        });

        StoreHandle {
            dispatch,
            update_rx,
            listening: AtomicBool::new(false),
            shared_state,
            middleware,
            actor: task,
        }
    }
}

struct StoreActor<R> {
    state: AppState,
    rev: u64,
    reducer: R,
    middleware: CallingMiddlewareHandler,
    dispatch: ActionDispatch,
    shared_state: Arc<RwLock<AppState>>,
    update_tx: flume::Sender<StateUpdate>,
}

impl<R: Reducer> StoreActor<R> {
    fn handle_action(&mut self, action: Action) {
        let tag = action.tag();
        tracing::info!(action = tag, "dispatch");

        // Handlers run detached; the store does not wait for them.
        let _ = self
            .middleware
            .handle_action(&action, &self.state, &self.dispatch);

        let next = self.reducer.reduce(&self.state, &action);
        if next == self.state {
            return;
        }
        self.state = next;
        self.rev += 1;
        self.commit_state_snapshot();
        let _ = self.update_tx.send(StateUpdate {
            rev: self.rev,
            action: tag,
            state: self.state.clone(),
        });
    }

    fn commit_state_snapshot(&self) {
        match self.shared_state.write() {
            Ok(mut g) => *g = self.state.clone(),
            Err(poison) => *poison.into_inner() = self.state.clone(),
        }
    }
}

/// Caller-facing side of a running store.
pub struct StoreHandle {
    dispatch: ActionDispatch,
    update_rx: Receiver<StateUpdate>,
    listening: AtomicBool,
    shared_state: Arc<RwLock<AppState>>,
    middleware: CallingMiddlewareHandler,
    actor: JoinHandle<()>,
}

impl StoreHandle {
    pub fn state(&self) -> AppState {
        match self.shared_state.read() {
            Ok(g) => g.clone(),
            Err(poison) => poison.into_inner().clone(),
        }
    }

    /// Never blocks the caller.
    pub fn dispatch(&self, action: impl Into<Action>) {
        self.dispatch.dispatch(action);
    }

    pub fn dispatcher(&self) -> ActionDispatch {
        self.dispatch.clone()
    }

    pub fn middleware(&self) -> &CallingMiddlewareHandler {
        &self.middleware
    }

    /// Forwards every state update to `reconciler` on a dedicated thread.
    /// Only the first listener is attached.
    pub fn listen_for_updates(&self, reconciler: Box<dyn StateReconciler>) {
        if self
            .listening
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            tracing::warn!("state listener already attached");
            return;
        }

        let rx = self.update_rx.clone();
        thread::spawn(move || {
            while let Ok(update) = rx.recv() {
                reconciler.reconcile(update);
            }
        });
    }
}

impl Drop for StoreHandle {
    fn drop(&mut self) {
        self.middleware.subscriptions().cancel();
        self.actor.abort();
    }
}

//! Stages that sit between a service push stream and the dispatch sink.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use tokio::sync::broadcast::{self, error::RecvError};
use tokio::time::Instant;

use crate::actions::Action;
use crate::dispatch::ActionDispatch;

/// Liveness of one subscription session. Sends hold the read side and
/// closing takes the write side, so no send can straddle a close.
#[derive(Debug, Clone)]
pub(crate) struct SessionGate(Arc<RwLock<bool>>);

impl SessionGate {
    pub(crate) fn open() -> Self {
        Self(Arc::new(RwLock::new(true)))
    }

    pub(crate) fn is_open(&self) -> bool {
        *self.read()
    }

    /// Returns whether the gate was still open.
    pub(crate) fn close(&self) -> bool {
        std::mem::replace(&mut *self.write(), false)
    }

    fn read(&self) -> RwLockReadGuard<'_, bool> {
        match self.0.read() {
            Ok(guard) => guard,
            Err(poison) => poison.into_inner(),
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, bool> {
        match self.0.write() {
            Ok(guard) => guard,
            Err(poison) => poison.into_inner(),
        }
    }
}

/// Dispatch handle that goes quiet once its session is torn down.
#[derive(Debug, Clone)]
pub(crate) struct BridgeSink {
    dispatch: ActionDispatch,
    gate: SessionGate,
}

impl BridgeSink {
    pub(crate) fn new(dispatch: ActionDispatch, gate: SessionGate) -> Self {
        Self { dispatch, gate }
    }

    pub(crate) fn is_alive(&self) -> bool {
        self.gate.is_open()
    }

    /// False when the session is gone (or the store is); callers stop.
    pub(crate) fn send(&self, action: impl Into<Action>) -> bool {
        let open = self.gate.read();
        if !*open {
            return false;
        }
        self.dispatch.dispatch(action)
    }

    /// Closes the session and dispatches its final actions in one step.
    /// Nothing sent through any clone of this sink can follow them.
    pub(crate) fn finish(&self, actions: impl IntoIterator<Item = Action>) -> bool {
        let mut open = self.gate.write();
        if !*open {
            return false;
        }
        *open = false;
        for action in actions {
            self.dispatch.dispatch(action);
        }
        true
    }
}

/// Passes a value only when it differs from the last one passed.
#[derive(Debug)]
pub(crate) struct Distinct<T> {
    last: Option<T>,
}

impl<T: Clone + PartialEq> Distinct<T> {
    pub(crate) fn new() -> Self {
        Self { last: None }
    }

    pub(crate) fn accept(&mut self, value: T) -> Option<T> {
        if self.last.as_ref() == Some(&value) {
            return None;
        }
        self.last = Some(value.clone());
        Some(value)
    }
}

/// Next value from a broadcast stream. Lagged gaps are skipped (the next
/// value is still the freshest); `None` once the sender is gone.
pub(crate) async fn recv_next<T: Clone>(
    rx: &mut broadcast::Receiver<T>,
    stream: &'static str,
) -> Option<T> {
    loop {
        match rx.recv().await {
            Ok(value) => return Some(value),
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(stream, skipped, "calling event stream lagged");
            }
            Err(RecvError::Closed) => return None,
        }
    }
}

/// Forwards every value that differs from its predecessor. `emit` returning
/// false ends the stage.
pub(crate) async fn forward_distinct<T, F>(
    mut rx: broadcast::Receiver<T>,
    stream: &'static str,
    mut emit: F,
) where
    T: Clone + PartialEq,
    F: FnMut(T) -> bool,
{
    let mut distinct = Distinct::new();
    while let Some(value) = recv_next(&mut rx, stream).await {
        if let Some(value) = distinct.accept(value) {
            if !emit(value) {
                return;
            }
        }
    }
}

/// Trailing-edge coalescing window: the first value opens a window of
/// `window`, later values replace the pending one, and the latest value is
/// emitted once when the window closes. A pending value is flushed if the
/// stream ends mid-window.
pub(crate) async fn forward_throttled<T, F>(
    mut rx: broadcast::Receiver<T>,
    stream: &'static str,
    window: Duration,
    mut emit: F,
) where
    T: Clone,
    F: FnMut(T) -> bool,
{
    let mut pending: Option<T> = None;
    let mut deadline: Option<Instant> = None;

    loop {
        let received = match deadline {
            Some(at) => tokio::select! {
                biased;
                value = recv_next(&mut rx, stream) => Some(value),
                _ = tokio::time::sleep_until(at) => None,
            },
            None => Some(recv_next(&mut rx, stream).await),
        };

        match received {
            Some(Some(value)) => {
                pending = Some(value);
                if deadline.is_none() {
                    deadline = Some(Instant::now() + window);
                }
            }
            Some(None) => {
                if let Some(value) = pending.take() {
                    emit(value);
                }
                return;
            }
            None => {
                deadline = None;
                if let Some(value) = pending.take() {
                    if !emit(value) {
                        return;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::LifecycleAction;

    fn collector<T: Send + 'static>() -> (flume::Sender<T>, flume::Receiver<T>) {
        flume::unbounded()
    }

    #[test]
    fn distinct_drops_repeats_only() {
        let mut d = Distinct::new();
        assert_eq!(d.accept(1), Some(1));
        assert_eq!(d.accept(1), None);
        assert_eq!(d.accept(2), Some(2));
        assert_eq!(d.accept(1), Some(1));
    }

    #[tokio::test(start_paused = true)]
    async fn burst_within_window_collapses_to_latest() {
        let (tx, rx) = broadcast::channel(16);
        let (out_tx, out_rx) = collector();
        let task = tokio::spawn(forward_throttled(
            rx,
            "test",
            Duration::from_millis(500),
            move |v: u32| out_tx.send(v).is_ok(),
        ));

        for v in 1..=5 {
            tx.send(v).expect("send");
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        assert!(out_rx.try_recv().is_err());

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(out_rx.try_recv(), Ok(5));
        assert!(out_rx.try_recv().is_err());

        tx.send(9).expect("send");
        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(out_rx.try_recv(), Ok(9));

        drop(tx);
        task.await.expect("stage ends with its stream");
    }

    #[tokio::test(start_paused = true)]
    async fn pending_value_flushes_when_stream_closes() {
        let (tx, rx) = broadcast::channel(16);
        let (out_tx, out_rx) = collector();
        let task = tokio::spawn(forward_throttled(
            rx,
            "test",
            Duration::from_secs(10),
            move |v: &'static str| out_tx.send(v).is_ok(),
        ));
        tx.send("a").expect("send");
        tx.send("b").expect("send");
        drop(tx);
        task.await.expect("stage ends");
        assert_eq!(out_rx.try_recv(), Ok("b"));
    }

    #[tokio::test]
    async fn forward_distinct_stops_when_emit_refuses() {
        let (tx, rx) = broadcast::channel(16);
        let (out_tx, out_rx) = collector();
        for v in [true, true, false, false, true] {
            tx.send(v).expect("send");
        }
        drop(tx);

        let mut budget = 2;
        forward_distinct(rx, "test", move |v: bool| {
            budget -= 1;
            out_tx.send(v).is_ok() && budget > 0
        })
        .await;

        assert_eq!(out_rx.drain().collect::<Vec<_>>(), vec![true, false]);
    }

    #[tokio::test]
    async fn sink_is_silent_after_liveness_drops() {
        let (dispatch, rx) = ActionDispatch::channel();
        let gate = SessionGate::open();
        let sink = BridgeSink::new(dispatch, gate.clone());
        assert!(sink.send(Action::CompositeExit));
        assert!(gate.close());
        assert!(!gate.close());
        assert!(!sink.send(Action::CompositeExit));
        assert_eq!(rx.drain().count(), 1);
    }

    #[test]
    fn finish_is_the_last_thing_any_clone_sends() {
        let (dispatch, rx) = ActionDispatch::channel();
        let sink = BridgeSink::new(dispatch, SessionGate::open());
        let stream_sink = sink.clone();

        let senders: Vec<_> = (0..4)
            .map(|_| {
                let stream_sink = stream_sink.clone();
                std::thread::spawn(move || {
                    while stream_sink.send(LifecycleAction::ForegroundEntered) {}
                })
            })
            .collect();
        std::thread::sleep(Duration::from_millis(5));
        assert!(sink.finish([Action::CompositeExit]));
        for sender in senders {
            sender.join().expect("sender thread");
        }

        assert!(!sink.finish([Action::CompositeExit]));
        assert!(!stream_sink.is_alive());
        let actions: Vec<_> = rx.drain().collect();
        assert_eq!(actions.last(), Some(&Action::CompositeExit));
        assert_eq!(
            actions.iter().filter(|a| **a == Action::CompositeExit).count(),
            1
        );
    }
}

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use huddle_calling::{CallInfo, CallingEventStreams, CallingService, CallingStatus};
use tokio::runtime::Handle;
use tokio::task::AbortHandle;

use crate::actions::{
    Action, CallDiagnosticAction, CallingAction, ErrorAction, LocalUserAction,
    RemoteParticipantsAction,
};
use crate::dispatch::ActionDispatch;

use super::streams::{forward_distinct, forward_throttled, recv_next, BridgeSink, SessionGate};
use super::CallingMiddlewareHandler;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubscriptionError {
    #[error("call subscriptions already installed (session {0})")]
    AlreadyInstalled(u64),
}

#[derive(Debug)]
struct ActiveSession {
    id: u64,
    gate: SessionGate,
    tasks: Vec<AbortHandle>,
}

/// The per-call set of stream subscriptions. At most one session is active;
/// teardown happens once per session.
#[derive(Debug, Clone, Default)]
pub struct CallSubscriptions {
    slot: Arc<Mutex<Option<ActiveSession>>>,
    next_id: Arc<AtomicU64>,
}

impl CallSubscriptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.lock().is_some()
    }

    /// Id of the active session, if any.
    pub fn session_id(&self) -> Option<u64> {
        self.lock().as_ref().map(|s| s.id)
    }

    /// Runs `attach` with a fresh session id and liveness flag and keeps the
    /// returned task handles. Fails without calling `attach` when a session
    /// is already active.
    pub(crate) fn install<F>(&self, attach: F) -> Result<u64, SubscriptionError>
    where
        F: FnOnce(u64, SessionGate) -> Vec<AbortHandle>,
    {
        let mut slot = self.lock();
        if let Some(active) = slot.as_ref() {
            return Err(SubscriptionError::AlreadyInstalled(active.id));
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let gate = SessionGate::open();
        let tasks = attach(id, gate.clone());
        *slot = Some(ActiveSession { id, gate, tasks });
        Ok(id)
    }

    /// Tears down whatever session is active. Returns whether there was one.
    pub fn cancel(&self) -> bool {
        let taken = self.lock().take();
        Self::teardown(taken)
    }

    /// Tears down only if `id` is still the active session, so a late task
    /// from an old session cannot cancel its successor.
    pub(crate) fn cancel_session(&self, id: u64) -> bool {
        let taken = {
            let mut slot = self.lock();
            match slot.as_ref() {
                Some(active) if active.id == id => slot.take(),
                _ => None,
            }
        };
        Self::teardown(taken)
    }

    fn teardown(session: Option<ActiveSession>) -> bool {
        let Some(session) = session else {
            return false;
        };
        session.gate.close();
        for task in &session.tasks {
            task.abort();
        }
        tracing::info!(session = session.id, "call subscriptions torn down");
        true
    }

    fn lock(&self) -> MutexGuard<'_, Option<ActiveSession>> {
        match self.slot.lock() {
            Ok(guard) => guard,
            Err(poison) => poison.into_inner(),
        }
    }
}

impl CallingMiddlewareHandler {
    /// Attaches every service push stream for the current call. Called once
    /// per session, right after the call started.
    pub(crate) fn subscribe_on_calling_events(
        &self,
        dispatch: &ActionDispatch,
    ) -> Result<u64, SubscriptionError> {
        self.subscriptions.install(|session, gate| {
            let sink = BridgeSink::new(dispatch.clone(), gate);
            let streams = self.service.events();
            let tasks = self.attach_streams(session, streams, sink);
            tracing::info!(session, streams = tasks.len(), "call subscriptions installed");
            tasks
        })
    }

    fn attach_streams(
        &self,
        session: u64,
        streams: CallingEventStreams,
        sink: BridgeSink,
    ) -> Vec<AbortHandle> {
        let CallingEventStreams {
            call_info,
            participants,
            recording_active,
            transcription_active,
            local_user_muted,
            call_id,
            dominant_speakers,
            participant_role,
            network_diagnostics,
            network_quality_diagnostics,
            media_diagnostics,
            capabilities_changed,
        } = streams;
        let rt = &self.runtime;
        let mut tasks = Vec::with_capacity(12);

        {
            let sink = sink.clone();
            let window = self.config.participants_throttle();
            tasks.push(
                rt.spawn(forward_throttled(participants, "participants", window, move |list| {
                    sink.send(RemoteParticipantsAction::ParticipantListUpdated { participants: list })
                }))
                .abort_handle(),
            );
        }

        {
            let sink = sink.clone();
            let subscriptions = self.subscriptions.clone();
            tasks.push(
                rt.spawn(async move {
                    let mut rx = call_info;
                    while let Some(info) = recv_next(&mut rx, "call_info").await {
                        if !on_call_info(&sink, &subscriptions, session, info) {
                            return;
                        }
                    }
                })
                .abort_handle(),
            );
        }

        {
            let sink = sink.clone();
            tasks.push(
                rt.spawn(forward_distinct(recording_active, "recording", move |active| {
                    sink.send(CallingAction::RecordingStateUpdated {
                        is_recording_active: active,
                    })
                }))
                .abort_handle(),
            );
        }

        {
            let sink = sink.clone();
            tasks.push(
                rt.spawn(forward_distinct(transcription_active, "transcription", move |active| {
                    sink.send(CallingAction::TranscriptionStateUpdated {
                        is_transcription_active: active,
                    })
                }))
                .abort_handle(),
            );
        }

        {
            let sink = sink.clone();
            tasks.push(
                rt.spawn(forward_distinct(local_user_muted, "local_mute", move |is_muted| {
                    sink.send(LocalUserAction::MicrophoneMuteStateUpdated { is_muted })
                }))
                .abort_handle(),
            );
        }

        {
            let sink = sink.clone();
            tasks.push(
                rt.spawn(forward_distinct(call_id, "call_id", move |call_id| {
                    sink.send(CallingAction::CallIdUpdated { call_id })
                }))
                .abort_handle(),
            );
        }

        {
            let sink = sink.clone();
            let window = self.config.dominant_speakers_throttle();
            tasks.push(
                rt.spawn(forward_throttled(
                    dominant_speakers,
                    "dominant_speakers",
                    window,
                    move |speakers| {
                        sink.send(RemoteParticipantsAction::DominantSpeakersUpdated { speakers })
                    },
                ))
                .abort_handle(),
            );
        }

        {
            let sink = sink.clone();
            tasks.push(
                rt.spawn(forward_distinct(participant_role, "participant_role", move |role| {
                    sink.send(LocalUserAction::ParticipantRoleChanged {
                        participant_role: role,
                    })
                }))
                .abort_handle(),
            );
        }

        {
            let sink = sink.clone();
            tasks.push(
                rt.spawn(forward_distinct(network_diagnostics, "network_diag", move |diagnostic| {
                    sink.send(CallDiagnosticAction::Network { diagnostic })
                }))
                .abort_handle(),
            );
        }

        {
            let sink = sink.clone();
            tasks.push(
                rt.spawn(forward_distinct(
                    network_quality_diagnostics,
                    "network_quality_diag",
                    move |diagnostic| sink.send(CallDiagnosticAction::NetworkQuality { diagnostic }),
                ))
                .abort_handle(),
            );
        }

        {
            let sink = sink.clone();
            tasks.push(
                rt.spawn(forward_distinct(media_diagnostics, "media_diag", move |diagnostic| {
                    sink.send(CallDiagnosticAction::Media { diagnostic })
                }))
                .abort_handle(),
            );
        }

        {
            let runtime = rt.clone();
            let service = self.service.clone();
            tasks.push(
                rt.spawn(forward_distinct(
                    capabilities_changed,
                    "capabilities_changed",
                    move |_notice| {
                        if !sink.is_alive() {
                            return false;
                        }
                        spawn_capabilities_fetch(&runtime, service.clone(), sink.clone());
                        true
                    },
                ))
                .abort_handle(),
            );
        }

        tasks
    }

}

/// The fetch is not tied to the session's tasks; the sink drops its result
/// if the session ended meanwhile.
fn spawn_capabilities_fetch(runtime: &Handle, service: Arc<dyn CallingService>, sink: BridgeSink) {
    runtime.spawn(async move {
        match service.capabilities().await {
            Ok(capabilities) => {
                sink.send(LocalUserAction::CapabilitiesUpdated { capabilities });
            }
            Err(err) => {
                tracing::error!(%err, "fetching capabilities failed");
            }
        }
    });
}

/// Status branch of the call-info stream. Returns false once the session
/// is over.
fn on_call_info(
    sink: &BridgeSink,
    subscriptions: &CallSubscriptions,
    session: u64,
    info: CallInfo,
) -> bool {
    tracing::debug!(session, status = %info.status, "call status");
    if !sink.send(CallingAction::StateUpdated {
        status: info.status,
    }) {
        return false;
    }

    let last = match info.internal_error {
        Some(internal_error) => {
            tracing::warn!(session, code = %internal_error, "call status carried an error");
            Action::Error(ErrorAction::StatusErrorAndCallReset { internal_error })
        }
        None if info.status == CallingStatus::Disconnected => Action::CompositeExit,
        None => return true,
    };
    sink.finish([last]);
    subscriptions.cancel_session(session);
    false
}

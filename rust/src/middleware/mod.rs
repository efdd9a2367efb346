//! Action-dispatch middleware: runs calling operations for intent actions and
//! bridges service push streams into the action stream.

mod audio;
mod call;
mod camera;
mod capabilities;
mod diagnostics;
mod lifecycle;
mod lobby;
mod streams;
mod subscription;

use std::future::Future;
use std::sync::Arc;

use huddle_calling::{CallCompositeInternalError, CallingService, CallingServiceError};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::actions::{
    Action, AudioSessionAction, CallDiagnosticAction, CallingAction, ErrorAction,
    LifecycleAction, LocalUserAction, PermissionAction, RemoteParticipantsAction,
    ToastNotificationAction,
};
use crate::capabilities::CapabilitiesManager;
use crate::config::MiddlewareConfig;
use crate::dispatch::ActionDispatch;
use crate::errors::{internal_error_for_failure, CallCompositeError};
use crate::state::AppState;

pub use camera::CAMERA_SETTLE_DELAY;
pub use subscription::{CallSubscriptions, SubscriptionError};

/// Completion signal of one handler invocation. Dropping it does not cancel
/// the handler.
pub type HandlerTask = JoinHandle<()>;

#[derive(Clone)]
pub struct CallingMiddlewareHandler {
    service: Arc<dyn CallingService>,
    runtime: Handle,
    capabilities: CapabilitiesManager,
    config: MiddlewareConfig,
    subscriptions: CallSubscriptions,
}

impl std::fmt::Debug for CallingMiddlewareHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallingMiddlewareHandler")
            .field("config", &self.config)
            .field("subscriptions", &self.subscriptions)
            .finish_non_exhaustive()
    }
}

impl CallingMiddlewareHandler {
    pub fn new(service: Arc<dyn CallingService>, runtime: Handle, config: MiddlewareConfig) -> Self {
        Self {
            capabilities: CapabilitiesManager::new(config.capabilities_change_notification_mode),
            service,
            runtime,
            config,
            subscriptions: CallSubscriptions::new(),
        }
    }

    pub fn subscriptions(&self) -> &CallSubscriptions {
        &self.subscriptions
    }

    /// Starts the handler for an intent action. Outcome actions and anything
    /// the middleware does not handle return `None`.
    pub fn handle_action(
        &self,
        action: &Action,
        state: &AppState,
        dispatch: &ActionDispatch,
    ) -> Option<HandlerTask> {
        let task = match action {
            Action::Calling(a) => match a {
                CallingAction::SetupCall => self.setup_call(state, dispatch),
                CallingAction::CallStartRequested => self.start_call(state, dispatch),
                CallingAction::CallEndRequested => self.end_call(state, dispatch),
                CallingAction::HoldRequested => self.hold_call(state, dispatch),
                CallingAction::ResumeRequested => self.resume_call(state, dispatch),
                _ => return None,
            },
            Action::LocalUser(a) => match a {
                LocalUserAction::CameraPreviewOnTriggered => {
                    self.request_camera_preview_on(state, dispatch)
                }
                LocalUserAction::CameraOnTriggered => self.request_camera_on(state, dispatch),
                LocalUserAction::CameraOffTriggered => self.request_camera_off(state, dispatch),
                LocalUserAction::CameraPauseTriggered => self.request_camera_pause(state, dispatch),
                LocalUserAction::CameraSwitchTriggered => {
                    self.request_camera_switch(state, dispatch)
                }
                LocalUserAction::MicrophoneOffTriggered => {
                    self.request_microphone_mute(state, dispatch)
                }
                LocalUserAction::MicrophoneOnTriggered => {
                    self.request_microphone_unmute(state, dispatch)
                }
                LocalUserAction::CapabilitiesUpdated { capabilities } => {
                    self.capabilities_updated(state, dispatch, capabilities.clone())
                }
                _ => return None,
            },
            Action::Permission(PermissionAction::CameraPermissionUpdated { .. }) => {
                self.on_camera_permission_is_set(state, dispatch)
            }
            Action::RemoteParticipants(a) => match a {
                RemoteParticipantsAction::AdmitAll => {
                    self.admit_all_lobby_participants(state, dispatch)
                }
                RemoteParticipantsAction::DeclineAll => {
                    self.decline_all_lobby_participants(state, dispatch)
                }
                RemoteParticipantsAction::Admit { participant_id } => {
                    self.admit_lobby_participant(state, dispatch, participant_id.clone())
                }
                RemoteParticipantsAction::Decline { participant_id } => {
                    self.decline_lobby_participant(state, dispatch, participant_id.clone())
                }
                RemoteParticipantsAction::Remove { participant_id } => {
                    self.remove_participant(state, dispatch, participant_id.clone())
                }
                _ => return None,
            },
            Action::CallDiagnostic(a) => match *a {
                CallDiagnosticAction::Network { diagnostic } => {
                    self.on_network_call_diagnostics_updated(state, dispatch, diagnostic)
                }
                CallDiagnosticAction::NetworkQuality { diagnostic } => {
                    self.on_network_quality_call_diagnostics_updated(state, dispatch, diagnostic)
                }
                CallDiagnosticAction::Media { diagnostic } => {
                    self.on_media_call_diagnostics_updated(state, dispatch, diagnostic)
                }
                _ => return None,
            },
            Action::ToastNotification(ToastNotificationAction::DismissNotification) => {
                self.dismiss_notification(state, dispatch)
            }
            Action::Lifecycle(a) => match a {
                LifecycleAction::BackgroundEntered => self.enter_background(state, dispatch),
                LifecycleAction::ForegroundEntered => self.enter_foreground(state, dispatch),
                LifecycleAction::WillTerminate => self.will_terminate(state, dispatch),
            },
            Action::AudioSession(AudioSessionAction::Interrupted) => {
                self.audio_session_interrupted(state, dispatch)
            }
            _ => return None,
        };
        tracing::debug!(action = action.tag(), "middleware handler started");
        Some(task)
    }

    /// Spawns a handler body on the middleware runtime with owned copies of
    /// the snapshot and dispatch handle.
    fn spawn<F, Fut>(&self, state: &AppState, dispatch: &ActionDispatch, body: F) -> HandlerTask
    where
        F: FnOnce(Self, AppState, ActionDispatch) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let fut = body(self.clone(), state.clone(), dispatch.clone());
        self.runtime.spawn(fut)
    }
}

/// Reports a failed call-level operation. Fatal codes end the composite;
/// the rest are surfaced and the call continues.
fn dispatch_operation_failure(
    dispatch: &ActionDispatch,
    attempted: CallCompositeInternalError,
    err: CallingServiceError,
) {
    let internal_error = internal_error_for_failure(attempted, &err);
    tracing::warn!(code = %internal_error, %err, "calling operation failed");
    let error = CallCompositeError::new(internal_error, Some(err));
    let action = if internal_error.is_fatal() {
        ErrorAction::FatalErrorUpdated {
            internal_error,
            error,
        }
    } else {
        ErrorAction::OperationFailed {
            internal_error,
            error,
        }
    };
    dispatch.dispatch(action);
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use flume::Receiver;
    use huddle_calling::InMemoryCallingService;

    use super::CallingMiddlewareHandler;
    use crate::actions::Action;
    use crate::config::MiddlewareConfig;
    use crate::dispatch::ActionDispatch;

    pub(crate) struct Harness {
        pub service: InMemoryCallingService,
        pub middleware: CallingMiddlewareHandler,
        pub dispatch: ActionDispatch,
        pub rx: Receiver<Action>,
    }

    impl Harness {
        /// Must be called inside a tokio runtime.
        pub(crate) fn new() -> Self {
            Self::with_config(MiddlewareConfig::default())
        }

        pub(crate) fn with_config(config: MiddlewareConfig) -> Self {
            let service = InMemoryCallingService::new();
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

        pub(crate) fn drain(&self) -> Vec<Action> {
            self.rx.drain().collect()
        }
    }
}

use huddle_calling::{CallCompositeInternalError, CallingStatus};

use crate::actions::CallingAction;
use crate::dispatch::ActionDispatch;
use crate::state::{
    AppState, AudioOperationalStatus, CameraOperationalStatus, OperationStatus,
};

use super::{dispatch_operation_failure, CallingMiddlewareHandler, HandlerTask};

impl CallingMiddlewareHandler {
    pub fn setup_call(&self, state: &AppState, dispatch: &ActionDispatch) -> HandlerTask {
        self.spawn(state, dispatch, |this, state, dispatch| async move {
            this.run_setup_call(&state, &dispatch).await
        })
    }

    pub fn start_call(&self, state: &AppState, dispatch: &ActionDispatch) -> HandlerTask {
        self.spawn(state, dispatch, |this, state, dispatch| async move {
            this.run_start_call(&state, &dispatch).await
        })
    }

    pub fn end_call(&self, state: &AppState, dispatch: &ActionDispatch) -> HandlerTask {
        self.spawn(state, dispatch, |this, state, dispatch| async move {
            this.run_end_call(&state, &dispatch).await
        })
    }

    pub fn hold_call(&self, state: &AppState, dispatch: &ActionDispatch) -> HandlerTask {
        self.spawn(state, dispatch, |this, state, dispatch| async move {
            this.run_hold_call(&state, &dispatch).await
        })
    }

    pub fn resume_call(&self, state: &AppState, dispatch: &ActionDispatch) -> HandlerTask {
        self.spawn(state, dispatch, |this, state, dispatch| async move {
            this.run_resume_call(&state, &dispatch).await
        })
    }

    async fn run_setup_call(&self, state: &AppState, dispatch: &ActionDispatch) {
        if let Err(err) = self.service.setup_call().await {
            dispatch_operation_failure(dispatch, CallCompositeInternalError::CallJoinFailed, err);
            return;
        }

        if state.default_user.camera_on && state.error.internal_error.is_none() {
            self.run_camera_preview_on(state, dispatch).await;
        }
        if state.calling.operation_status == OperationStatus::SkipSetupRequested {
            dispatch.dispatch(CallingAction::CallStartRequested);
        }
    }

    async fn run_start_call(&self, state: &AppState, dispatch: &ActionDispatch) {
        let camera_on = state.local_user.camera.operation == CameraOperationalStatus::On;
        let audio_on = state.local_user.audio.operation == AudioOperationalStatus::On;
        tracing::info!(camera_on, audio_on, "starting call");

        match self.service.start_call(camera_on, audio_on).await {
            Ok(()) => {
                if let Err(err) = self.subscribe_on_calling_events(dispatch) {
                    tracing::warn!(%err, "call started with subscriptions still attached");
                }
            }
            Err(err) => {
                dispatch_operation_failure(dispatch, CallCompositeInternalError::CallJoinFailed, err)
            }
        }
    }

    async fn run_end_call(&self, _state: &AppState, dispatch: &ActionDispatch) {
        match self.service.end_call().await {
            Ok(()) => {
                dispatch.dispatch(CallingAction::CallEnded);
            }
            Err(err) => {
                dispatch_operation_failure(dispatch, CallCompositeInternalError::CallEndFailed, err);
                dispatch.dispatch(CallingAction::RequestFailed);
            }
        }
    }

    async fn run_hold_call(&self, state: &AppState, dispatch: &ActionDispatch) {
        if state.calling.status != CallingStatus::Connected {
            return;
        }
        match self.service.hold_call().await {
            Ok(()) => self.run_camera_pause(state, dispatch).await,
            Err(err) => {
                dispatch_operation_failure(dispatch, CallCompositeInternalError::CallHoldFailed, err)
            }
        }
    }

    async fn run_resume_call(&self, state: &AppState, dispatch: &ActionDispatch) {
        if state.calling.status != CallingStatus::LocalHold {
            return;
        }
        match self.service.resume_call().await {
            Ok(()) => {
                if state.local_user.camera.operation == CameraOperationalStatus::Paused {
                    self.run_camera_on(state, dispatch).await;
                }
            }
            Err(err) => dispatch_operation_failure(
                dispatch,
                CallCompositeInternalError::CallResumeFailed,
                err,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use huddle_calling::{
        CallingServiceError, CallingServiceErrorKind, ServiceCall, ServiceOp,
    };

    use super::*;
    use crate::actions::{Action, ErrorAction, LocalUserAction};
    use crate::middleware::test_support::Harness;
    use crate::state::AppPermissionStatus;

    fn connected() -> AppState {
        let mut state = AppState::empty();
        state.calling.status = CallingStatus::Connected;
        state
    }

    #[tokio::test]
    async fn setup_with_camera_preference_previews_then_starts() {
        let h = Harness::new();
        let mut state = AppState::empty();
        state.default_user.camera_on = true;
        state.permissions.camera = AppPermissionStatus::Granted;
        state.calling.operation_status = OperationStatus::SkipSetupRequested;

        h.middleware.setup_call(&state, &h.dispatch).await.expect("task");

        assert_eq!(
            h.service.calls(),
            vec![ServiceCall::SetupCall, ServiceCall::CameraPreviewOn]
        );
        let actions = h.drain();
        assert!(matches!(
            &actions[..],
            [
                Action::LocalUser(LocalUserAction::CameraOnSucceeded { .. }),
                Action::Calling(CallingAction::CallStartRequested),
            ]
        ));
    }

    #[tokio::test]
    async fn setup_skips_preview_when_error_is_pending() {
        let h = Harness::new();
        let mut state = AppState::empty();
        state.default_user.camera_on = true;
        state.error.internal_error = Some(CallCompositeInternalError::CallJoinFailed);

        h.middleware.setup_call(&state, &h.dispatch).await.expect("task");

        assert_eq!(h.service.calls(), vec![ServiceCall::SetupCall]);
        assert!(h.drain().is_empty());
    }

    #[tokio::test]
    async fn setup_failure_is_a_fatal_join_error() {
        let h = Harness::new();
        h.service.fail(
            ServiceOp::SetupCall,
            CallingServiceError::new(CallingServiceErrorKind::NetworkUnavailable, "offline"),
        );

        h.middleware
            .setup_call(&AppState::empty(), &h.dispatch)
            .await
            .expect("task");

        match &h.drain()[..] {
            [Action::Error(ErrorAction::FatalErrorUpdated {
                internal_error,
                error,
            })] => {
                assert_eq!(
                    *internal_error,
                    CallCompositeInternalError::NetworkConnectionNotAvailable
                );
                assert_eq!(
                    error.cause.as_ref().map(|c| c.kind),
                    Some(CallingServiceErrorKind::NetworkUnavailable)
                );
            }
            other => panic!("unexpected actions: {other:?}"),
        }
    }

    #[tokio::test]
    async fn start_call_passes_local_media_preferences() {
        let h = Harness::new();
        let mut state = AppState::empty();
        state.local_user.audio.operation = AudioOperationalStatus::On;

        h.middleware.start_call(&state, &h.dispatch).await.expect("task");

        assert_eq!(
            h.service.calls(),
            vec![ServiceCall::StartCall {
                camera_preferred: false,
                audio_preferred: true,
            }]
        );
        assert!(h.middleware.subscriptions().is_active());
        assert!(h.drain().is_empty());
    }

    #[tokio::test]
    async fn start_call_failure_does_not_attach_streams() {
        let h = Harness::new();
        h.service.fail(
            ServiceOp::StartCall,
            CallingServiceError::new(CallingServiceErrorKind::MicrophonePermissionDenied, "mic"),
        );

        h.middleware
            .start_call(&AppState::empty(), &h.dispatch)
            .await
            .expect("task");

        assert!(!h.middleware.subscriptions().is_active());
        assert!(matches!(
            &h.drain()[..],
            [Action::Error(ErrorAction::FatalErrorUpdated {
                internal_error: CallCompositeInternalError::CallJoinFailedByMicPermission,
                ..
            })]
        ));
    }

    #[tokio::test]
    async fn second_start_keeps_the_first_session() {
        let h = Harness::new();
        h.middleware
            .start_call(&AppState::empty(), &h.dispatch)
            .await
            .expect("task");
        let session = h.middleware.subscriptions().session_id();

        h.middleware
            .start_call(&AppState::empty(), &h.dispatch)
            .await
            .expect("task");

        assert_eq!(h.middleware.subscriptions().session_id(), session);
        assert_eq!(h.service.hub().call_info_receivers(), 1);
    }

    #[tokio::test]
    async fn end_call_failure_reports_and_unblocks() {
        let h = Harness::new();
        h.service
            .fail(ServiceOp::EndCall, CallingServiceError::unknown("boom"));

        h.middleware
            .end_call(&connected(), &h.dispatch)
            .await
            .expect("task");

        assert!(matches!(
            &h.drain()[..],
            [
                Action::Error(ErrorAction::OperationFailed {
                    internal_error: CallCompositeInternalError::CallEndFailed,
                    ..
                }),
                Action::Calling(CallingAction::RequestFailed),
            ]
        ));
    }

    #[tokio::test]
    async fn end_call_success() {
        let h = Harness::new();
        h.middleware
            .end_call(&connected(), &h.dispatch)
            .await
            .expect("task");
        assert_eq!(h.drain(), vec![Action::Calling(CallingAction::CallEnded)]);
    }

    #[tokio::test]
    async fn hold_outside_connected_is_a_no_op() {
        let h = Harness::new();
        for status in [
            CallingStatus::None,
            CallingStatus::Connecting,
            CallingStatus::LocalHold,
            CallingStatus::InLobby,
            CallingStatus::Disconnected,
        ] {
            let mut state = AppState::empty();
            state.calling.status = status;
            h.middleware.hold_call(&state, &h.dispatch).await.expect("task");
        }
        assert!(h.service.calls().is_empty());
        assert!(h.drain().is_empty());
    }

    #[tokio::test]
    async fn hold_pauses_a_live_camera() {
        let h = Harness::new();
        let mut state = connected();
        state.local_user.camera.operation = CameraOperationalStatus::On;

        h.middleware.hold_call(&state, &h.dispatch).await.expect("task");

        assert_eq!(
            h.service.calls(),
            vec![ServiceCall::HoldCall, ServiceCall::StopLocalVideo]
        );
        assert_eq!(
            h.drain(),
            vec![Action::LocalUser(LocalUserAction::CameraPausedSucceeded)]
        );
    }

    #[tokio::test]
    async fn hold_failure_is_not_fatal() {
        let h = Harness::new();
        h.service
            .fail(ServiceOp::HoldCall, CallingServiceError::unknown("nope"));
        h.middleware
            .hold_call(&connected(), &h.dispatch)
            .await
            .expect("task");
        assert!(matches!(
            &h.drain()[..],
            [Action::Error(ErrorAction::OperationFailed {
                internal_error: CallCompositeInternalError::CallHoldFailed,
                ..
            })]
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn resume_restarts_a_paused_camera() {
        let h = Harness::new();
        let mut state = AppState::empty();
        state.calling.status = CallingStatus::LocalHold;
        state.local_user.camera.operation = CameraOperationalStatus::Paused;
        state.permissions.camera = AppPermissionStatus::Granted;

        h.middleware.resume_call(&state, &h.dispatch).await.expect("task");

        assert_eq!(
            h.service.calls(),
            vec![ServiceCall::ResumeCall, ServiceCall::StartLocalVideo]
        );
        assert!(matches!(
            &h.drain()[..],
            [Action::LocalUser(LocalUserAction::CameraOnSucceeded { .. })]
        ));
    }

    #[tokio::test]
    async fn resume_requires_local_hold() {
        let h = Harness::new();
        h.middleware
            .resume_call(&connected(), &h.dispatch)
            .await
            .expect("task");
        assert!(h.service.calls().is_empty());
    }
}

use std::time::Duration;

use huddle_calling::CallingStatus;

use crate::actions::{LocalUserAction, PermissionAction};
use crate::dispatch::ActionDispatch;
use crate::state::{
    AppPermissionStatus, AppState, CameraOperationalStatus, CameraTransmissionStatus,
    NavigationStatus,
};

use super::{CallingMiddlewareHandler, HandlerTask};

/// Wait after the service reports a started or switched camera before
/// announcing it, so the first frames are rendered.
pub const CAMERA_SETTLE_DELAY: Duration = Duration::from_secs(1);

/// Permission gate for operations that acquire the camera. Returns true when
/// the operation may proceed.
fn camera_permission_gate(state: &AppState, dispatch: &ActionDispatch) -> bool {
    match state.permissions.camera {
        AppPermissionStatus::NotAsked => {
            dispatch.dispatch(PermissionAction::CameraPermissionRequested);
            false
        }
        AppPermissionStatus::Denied => {
            dispatch.dispatch(LocalUserAction::CameraOffTriggered);
            false
        }
        AppPermissionStatus::Unknown
        | AppPermissionStatus::Requesting
        | AppPermissionStatus::Granted => true,
    }
}

impl CallingMiddlewareHandler {
    pub fn request_camera_preview_on(
        &self,
        state: &AppState,
        dispatch: &ActionDispatch,
    ) -> HandlerTask {
        self.spawn(state, dispatch, |this, state, dispatch| async move {
            this.run_camera_preview_on(&state, &dispatch).await
        })
    }

    pub fn request_camera_on(&self, state: &AppState, dispatch: &ActionDispatch) -> HandlerTask {
        self.spawn(state, dispatch, |this, state, dispatch| async move {
            this.run_camera_on(&state, &dispatch).await
        })
    }

    pub fn request_camera_off(&self, state: &AppState, dispatch: &ActionDispatch) -> HandlerTask {
        self.spawn(state, dispatch, |this, state, dispatch| async move {
            this.run_camera_off(&state, &dispatch).await
        })
    }

    pub fn request_camera_pause(&self, state: &AppState, dispatch: &ActionDispatch) -> HandlerTask {
        self.spawn(state, dispatch, |this, state, dispatch| async move {
            this.run_camera_pause(&state, &dispatch).await
        })
    }

    pub fn request_camera_switch(
        &self,
        state: &AppState,
        dispatch: &ActionDispatch,
    ) -> HandlerTask {
        self.spawn(state, dispatch, |this, state, dispatch| async move {
            this.run_camera_switch(&state, &dispatch).await
        })
    }

    pub fn on_camera_permission_is_set(
        &self,
        state: &AppState,
        dispatch: &ActionDispatch,
    ) -> HandlerTask {
        self.spawn(state, dispatch, |_this, state, dispatch| async move {
            if state.permissions.camera != AppPermissionStatus::Requesting {
                return;
            }
            let next = match state.local_user.camera.transmission {
                CameraTransmissionStatus::Local
                    if state.navigation.status != NavigationStatus::InCall =>
                {
                    LocalUserAction::CameraPreviewOnTriggered
                }
                CameraTransmissionStatus::Local | CameraTransmissionStatus::Remote => {
                    LocalUserAction::CameraOnTriggered
                }
            };
            dispatch.dispatch(next);
        })
    }

    pub(super) async fn run_camera_preview_on(&self, state: &AppState, dispatch: &ActionDispatch) {
        if !camera_permission_gate(state, dispatch) {
            return;
        }
        match self.service.request_camera_preview_on().await {
            Ok(video_stream_id) => {
                dispatch.dispatch(LocalUserAction::CameraOnSucceeded { video_stream_id });
            }
            Err(error) => {
                dispatch.dispatch(LocalUserAction::CameraOnFailed { error });
            }
        }
    }

    pub(super) async fn run_camera_on(&self, state: &AppState, dispatch: &ActionDispatch) {
        if !camera_permission_gate(state, dispatch) {
            return;
        }
        match self.service.start_local_video_stream().await {
            Ok(video_stream_id) => {
                tokio::time::sleep(CAMERA_SETTLE_DELAY).await;
                dispatch.dispatch(LocalUserAction::CameraOnSucceeded { video_stream_id });
            }
            Err(error) => {
                dispatch.dispatch(LocalUserAction::CameraOnFailed { error });
            }
        }
    }

    pub(super) async fn run_camera_off(&self, _state: &AppState, dispatch: &ActionDispatch) {
        match self.service.stop_local_video_stream().await {
            Ok(()) => {
                dispatch.dispatch(LocalUserAction::CameraOffSucceeded);
            }
            Err(error) => {
                dispatch.dispatch(LocalUserAction::CameraOffFailed { error });
            }
        }
    }

    pub(super) async fn run_camera_pause(&self, state: &AppState, dispatch: &ActionDispatch) {
        if state.calling.status != CallingStatus::Connected
            || state.local_user.camera.operation != CameraOperationalStatus::On
        {
            return;
        }
        match self.service.stop_local_video_stream().await {
            Ok(()) => {
                dispatch.dispatch(LocalUserAction::CameraPausedSucceeded);
            }
            Err(error) => {
                dispatch.dispatch(LocalUserAction::CameraPausedFailed { error });
            }
        }
    }

    async fn run_camera_switch(&self, state: &AppState, dispatch: &ActionDispatch) {
        if !camera_permission_gate(state, dispatch) {
            return;
        }
        let previous_camera = state.local_user.camera.device;
        match self.service.switch_camera().await {
            Ok(camera_device) => {
                tokio::time::sleep(CAMERA_SETTLE_DELAY).await;
                dispatch.dispatch(LocalUserAction::CameraSwitchSucceeded { camera_device });
            }
            Err(error) => {
                dispatch.dispatch(LocalUserAction::CameraSwitchFailed {
                    previous_camera,
                    error,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use huddle_calling::{CallingServiceError, CameraDevice, ServiceCall, ServiceOp};
    use tokio::time::Instant;

    use super::*;
    use crate::actions::Action;
    use crate::middleware::test_support::Harness;

    fn granted() -> AppState {
        let mut state = AppState::empty();
        state.permissions.camera = AppPermissionStatus::Granted;
        state
    }

    #[tokio::test]
    async fn denied_permission_never_touches_the_camera() {
        let h = Harness::new();
        let mut state = AppState::empty();
        state.permissions.camera = AppPermissionStatus::Denied;

        h.middleware.request_camera_on(&state, &h.dispatch).await.expect("task");
        h.middleware
            .request_camera_preview_on(&state, &h.dispatch)
            .await
            .expect("task");
        h.middleware
            .request_camera_switch(&state, &h.dispatch)
            .await
            .expect("task");

        assert!(h.service.calls().is_empty());
        assert_eq!(
            h.drain(),
            vec![Action::LocalUser(LocalUserAction::CameraOffTriggered); 3]
        );
    }

    #[tokio::test]
    async fn unasked_permission_requests_it() {
        let h = Harness::new();
        let mut state = AppState::empty();
        state.permissions.camera = AppPermissionStatus::NotAsked;

        h.middleware.request_camera_on(&state, &h.dispatch).await.expect("task");

        assert!(h.service.calls().is_empty());
        assert_eq!(
            h.drain(),
            vec![Action::Permission(PermissionAction::CameraPermissionRequested)]
        );
    }

    #[tokio::test]
    async fn camera_off_ignores_permission() {
        let h = Harness::new();
        let mut state = AppState::empty();
        state.permissions.camera = AppPermissionStatus::Denied;

        h.middleware.request_camera_off(&state, &h.dispatch).await.expect("task");

        assert_eq!(h.service.calls(), vec![ServiceCall::StopLocalVideo]);
        assert_eq!(
            h.drain(),
            vec![Action::LocalUser(LocalUserAction::CameraOffSucceeded)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn camera_on_waits_for_the_settle_delay() {
        let h = Harness::new();
        let started = Instant::now();

        h.middleware
            .request_camera_on(&granted(), &h.dispatch)
            .await
            .expect("task");

        assert!(started.elapsed() >= CAMERA_SETTLE_DELAY);
        assert!(matches!(
            &h.drain()[..],
            [Action::LocalUser(LocalUserAction::CameraOnSucceeded { video_stream_id })]
                if video_stream_id.as_str().starts_with("local-")
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn preview_has_no_settle_delay() {
        let h = Harness::new();
        let started = Instant::now();
        h.middleware
            .request_camera_preview_on(&granted(), &h.dispatch)
            .await
            .expect("task");
        assert!(started.elapsed() < CAMERA_SETTLE_DELAY);
    }

    #[tokio::test(start_paused = true)]
    async fn camera_on_failure_skips_the_delay() {
        let h = Harness::new();
        h.service
            .fail(ServiceOp::StartLocalVideo, CallingServiceError::unknown("busy"));
        let started = Instant::now();

        h.middleware
            .request_camera_on(&granted(), &h.dispatch)
            .await
            .expect("task");

        assert!(started.elapsed() < CAMERA_SETTLE_DELAY);
        assert!(matches!(
            &h.drain()[..],
            [Action::LocalUser(LocalUserAction::CameraOnFailed { .. })]
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn switch_reports_new_device_or_previous_on_failure() {
        let h = Harness::new();
        h.middleware
            .request_camera_switch(&granted(), &h.dispatch)
            .await
            .expect("task");
        assert_eq!(
            h.drain(),
            vec![Action::LocalUser(LocalUserAction::CameraSwitchSucceeded {
                camera_device: CameraDevice::Back
            })]
        );

        h.service
            .fail(ServiceOp::SwitchCamera, CallingServiceError::unknown("stuck"));
        let mut state = granted();
        state.local_user.camera.device = CameraDevice::Back;
        h.middleware
            .request_camera_switch(&state, &h.dispatch)
            .await
            .expect("task");
        assert!(matches!(
            &h.drain()[..],
            [Action::LocalUser(LocalUserAction::CameraSwitchFailed {
                previous_camera: CameraDevice::Back,
                ..
            })]
        ));
    }

    #[tokio::test]
    async fn pause_requires_connected_with_camera_on() {
        let h = Harness::new();
        let mut state = AppState::empty();
        state.local_user.camera.operation = CameraOperationalStatus::On;
        h.middleware
            .request_camera_pause(&state, &h.dispatch)
            .await
            .expect("task");
        assert!(h.service.calls().is_empty());

        state.calling.status = CallingStatus::Connected;
        h.service
            .fail(ServiceOp::StopLocalVideo, CallingServiceError::unknown("x"));
        h.middleware
            .request_camera_pause(&state, &h.dispatch)
            .await
            .expect("task");
        assert!(matches!(
            &h.drain()[..],
            [Action::LocalUser(LocalUserAction::CameraPausedFailed { .. })]
        ));
    }

    #[tokio::test]
    async fn permission_result_picks_preview_or_camera_on() {
        let h = Harness::new();
        let mut state = AppState::empty();
        state.permissions.camera = AppPermissionStatus::Requesting;

        h.middleware
            .on_camera_permission_is_set(&state, &h.dispatch)
            .await
            .expect("task");
        state.navigation.status = NavigationStatus::InCall;
        h.middleware
            .on_camera_permission_is_set(&state, &h.dispatch)
            .await
            .expect("task");
        state.navigation.status = NavigationStatus::Setup;
        state.local_user.camera.transmission = CameraTransmissionStatus::Remote;
        h.middleware
            .on_camera_permission_is_set(&state, &h.dispatch)
            .await
            .expect("task");
        state.permissions.camera = AppPermissionStatus::Granted;
        h.middleware
            .on_camera_permission_is_set(&state, &h.dispatch)
            .await
            .expect("task");

        assert_eq!(
            h.drain(),
            vec![
                Action::LocalUser(LocalUserAction::CameraPreviewOnTriggered),
                Action::LocalUser(LocalUserAction::CameraOnTriggered),
                Action::LocalUser(LocalUserAction::CameraOnTriggered),
            ]
        );
        assert!(h.service.calls().is_empty());
    }
}

use huddle_calling::{CallingStatus, CapabilityKind, CapabilitySet};

use crate::actions::{LocalUserAction, ToastNotificationAction};
use crate::dispatch::ActionDispatch;
use crate::state::{AppState, AudioOperationalStatus, CameraOperationalStatus, OperationStatus};

use super::{CallingMiddlewareHandler, HandlerTask};

impl CallingMiddlewareHandler {
    /// Reconciles local media with a freshly fetched capability set. The set
    /// held in `state` is the previous one; empty means this is the first.
    pub fn capabilities_updated(
        &self,
        state: &AppState,
        dispatch: &ActionDispatch,
        capabilities: CapabilitySet,
    ) -> HandlerTask {
        self.spawn(state, dispatch, |this, state, dispatch| async move {
            this.run_capabilities_updated(&state, &dispatch, &capabilities).await
        })
    }

    async fn run_capabilities_updated(
        &self,
        state: &AppState,
        dispatch: &ActionDispatch,
        capabilities: &CapabilitySet,
    ) {
        if state.calling.status == CallingStatus::Disconnected {
            return;
        }
        let previous = &state.local_user.capabilities;
        let is_initial = previous.is_empty();
        // An unchanged set while a forced-off is in flight was already handled.
        let unchanged = !is_initial && previous == capabilities;
        let manager = &self.capabilities;
        let camera = state.local_user.camera.operation;
        let audio = state.local_user.audio.operation;

        if !manager.has_capability(capabilities, CapabilityKind::TurnVideoOn)
            && camera != CameraOperationalStatus::Off
            && !(unchanged && camera == CameraOperationalStatus::Pending)
        {
            dispatch.dispatch(LocalUserAction::CameraOffTriggered);
        } else if is_initial
            && state.calling.operation_status == OperationStatus::SkipSetupRequested
        {
            self.run_camera_on(state, dispatch).await;
        }

        if !manager.has_capability(capabilities, CapabilityKind::UnmuteMicrophone)
            && audio != AudioOperationalStatus::Off
            && !(unchanged && audio == AudioOperationalStatus::Pending)
        {
            dispatch.dispatch(LocalUserAction::MicrophoneOffTriggered);
        }

        if !is_initial {
            if let Some(kind) = manager.change_notification(previous, capabilities) {
                dispatch.dispatch(ToastNotificationAction::ShowNotification { kind });
            }
        }
    }
}

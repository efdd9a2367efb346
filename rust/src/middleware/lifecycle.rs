use huddle_calling::CallingStatus;

use crate::actions::CallingAction;
use crate::dispatch::ActionDispatch;
use crate::state::{AppState, AppStatus, CameraOperationalStatus};

use super::{CallingMiddlewareHandler, HandlerTask};

impl CallingMiddlewareHandler {
    pub fn enter_background(&self, state: &AppState, dispatch: &ActionDispatch) -> HandlerTask {
        self.spawn(state, dispatch, |this, state, dispatch| async move {
            this.run_camera_pause(&state, &dispatch).await
        })
    }

    pub fn enter_foreground(&self, state: &AppState, dispatch: &ActionDispatch) -> HandlerTask {
        self.spawn(state, dispatch, |this, state, dispatch| async move {
            if state.lifecycle.status != AppStatus::Background
                || state.calling.status != CallingStatus::Connected
                || state.local_user.camera.operation != CameraOperationalStatus::Paused
            {
                return;
            }
            this.run_camera_on(&state, &dispatch).await
        })
    }

    pub fn will_terminate(&self, state: &AppState, dispatch: &ActionDispatch) -> HandlerTask {
        self.spawn(state, dispatch, |_this, state, dispatch| async move {
            if state.calling.status == CallingStatus::Connected {
                dispatch.dispatch(CallingAction::CallEndRequested);
            }
        })
    }

    pub fn audio_session_interrupted(
        &self,
        state: &AppState,
        dispatch: &ActionDispatch,
    ) -> HandlerTask {
        self.spawn(state, dispatch, |_this, state, dispatch| async move {
            if state.calling.status == CallingStatus::Connected {
                dispatch.dispatch(CallingAction::HoldRequested);
            }
        })
    }
}

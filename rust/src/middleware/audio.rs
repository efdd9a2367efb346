use crate::actions::LocalUserAction;
use crate::dispatch::ActionDispatch;
use crate::state::AppState;

use super::{CallingMiddlewareHandler, HandlerTask};

// Success is confirmed by the mute stream, so only failures dispatch here.

impl CallingMiddlewareHandler {
    pub fn request_microphone_mute(
        &self,
        state: &AppState,
        dispatch: &ActionDispatch,
    ) -> HandlerTask {
        self.spawn(state, dispatch, |this, _state, dispatch| async move {
            if let Err(error) = this.service.mute_local_mic().await {
                dispatch.dispatch(LocalUserAction::MicrophoneOffFailed { error });
            }
        })
    }

    pub fn request_microphone_unmute(
        &self,
        state: &AppState,
        dispatch: &ActionDispatch,
    ) -> HandlerTask {
        self.spawn(state, dispatch, |this, _state, dispatch| async move {
            if let Err(error) = this.service.unmute_local_mic().await {
                dispatch.dispatch(LocalUserAction::MicrophoneOnFailed { error });
            }
        })
    }
}

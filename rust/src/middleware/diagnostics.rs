use huddle_calling::{
    MediaDiagnostic, MediaDiagnosticModel, NetworkDiagnosticModel, NetworkQualityDiagnosticModel,
};

use crate::actions::ToastNotificationAction;
use crate::diagnostics::{dismiss_action, media_toast, network_quality_toast, network_toast};
use crate::dispatch::ActionDispatch;
use crate::state::AppState;

use super::{CallingMiddlewareHandler, HandlerTask};

impl CallingMiddlewareHandler {
    pub fn on_network_quality_call_diagnostics_updated(
        &self,
        state: &AppState,
        dispatch: &ActionDispatch,
        model: NetworkQualityDiagnosticModel,
    ) -> HandlerTask {
        self.spawn(state, dispatch, move |_this, _state, dispatch| async move {
            if model.value.is_degraded() {
                dispatch.dispatch(ToastNotificationAction::ShowNotification {
                    kind: network_quality_toast(model.diagnostic),
                });
            } else {
                dispatch.dispatch(ToastNotificationAction::DismissNotification);
            }
        })
    }

    pub fn on_network_call_diagnostics_updated(
        &self,
        state: &AppState,
        dispatch: &ActionDispatch,
        model: NetworkDiagnosticModel,
    ) -> HandlerTask {
        self.spawn(state, dispatch, move |_this, _state, dispatch| async move {
            if model.value {
                dispatch.dispatch(ToastNotificationAction::ShowNotification {
                    kind: network_toast(model.diagnostic),
                });
            }
        })
    }

    pub fn on_media_call_diagnostics_updated(
        &self,
        state: &AppState,
        dispatch: &ActionDispatch,
        model: MediaDiagnosticModel,
    ) -> HandlerTask {
        self.spawn(state, dispatch, move |_this, _state, dispatch| async move {
            let Some(kind) = media_toast(model.diagnostic) else {
                return;
            };
            if model.value {
                dispatch.dispatch(ToastNotificationAction::ShowNotification { kind });
            } else if model.diagnostic == MediaDiagnostic::SpeakingWhileMicrophoneIsMuted {
                dispatch.dispatch(ToastNotificationAction::DismissNotification);
            }
        })
    }

    pub fn dismiss_notification(&self, state: &AppState, dispatch: &ActionDispatch) -> HandlerTask {
        self.spawn(state, dispatch, |_this, state, dispatch| async move {
            if let Some(action) = state.toast.status.and_then(dismiss_action) {
                dispatch.dispatch(action);
            }
        })
    }
}

use huddle_calling::{CallingServiceError, CallingStatus};

use crate::actions::RemoteParticipantsAction;
use crate::dispatch::ActionDispatch;
use crate::errors::LobbyErrorCode;
use crate::state::AppState;

use super::{CallingMiddlewareHandler, HandlerTask};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LobbyDecision {
    Admit,
    Decline,
}

impl LobbyDecision {
    fn as_str(self) -> &'static str {
        match self {
            Self::Admit => "admit",
            Self::Decline => "decline",
        }
    }
}

fn dispatch_lobby_error(dispatch: &ActionDispatch, err: &CallingServiceError) {
    let error_code = LobbyErrorCode::from_service_error(err);
    tracing::warn!(?error_code, %err, "lobby operation failed");
    dispatch.dispatch(RemoteParticipantsAction::LobbyError { error_code });
}

impl CallingMiddlewareHandler {
    pub fn admit_all_lobby_participants(
        &self,
        state: &AppState,
        dispatch: &ActionDispatch,
    ) -> HandlerTask {
        self.spawn(state, dispatch, |this, state, dispatch| async move {
            this.run_lobby_all(&state, &dispatch, LobbyDecision::Admit).await
        })
    }

    pub fn decline_all_lobby_participants(
        &self,
        state: &AppState,
        dispatch: &ActionDispatch,
    ) -> HandlerTask {
        self.spawn(state, dispatch, |this, state, dispatch| async move {
            this.run_lobby_all(&state, &dispatch, LobbyDecision::Decline).await
        })
    }

    pub fn admit_lobby_participant(
        &self,
        state: &AppState,
        dispatch: &ActionDispatch,
        participant_id: String,
    ) -> HandlerTask {
        self.spawn(state, dispatch, |this, state, dispatch| async move {
            if state.calling.status != CallingStatus::Connected {
                return;
            }
            this.run_lobby_one(&dispatch, &participant_id, LobbyDecision::Admit).await
        })
    }

    pub fn decline_lobby_participant(
        &self,
        state: &AppState,
        dispatch: &ActionDispatch,
        participant_id: String,
    ) -> HandlerTask {
        self.spawn(state, dispatch, |this, state, dispatch| async move {
            if state.calling.status != CallingStatus::Connected {
                return;
            }
            this.run_lobby_one(&dispatch, &participant_id, LobbyDecision::Decline).await
        })
    }

    pub fn remove_participant(
        &self,
        state: &AppState,
        dispatch: &ActionDispatch,
        participant_id: String,
    ) -> HandlerTask {
        self.spawn(state, dispatch, |this, state, dispatch| async move {
            if state.calling.status != CallingStatus::Connected {
                return;
            }
            if let Err(err) = this.service.remove_participant(&participant_id).await {
                tracing::warn!(%err, "remove participant failed");
                dispatch.dispatch(RemoteParticipantsAction::RemoveParticipantError);
            }
        })
    }

    /// One participant at a time, in list order; a failure is reported and
    /// the loop moves on.
    async fn run_lobby_all(
        &self,
        state: &AppState,
        dispatch: &ActionDispatch,
        decision: LobbyDecision,
    ) {
        if state.calling.status != CallingStatus::Connected {
            return;
        }
        let waiting = state.lobby_participant_ids();
        tracing::info!(decision = decision.as_str(), count = waiting.len(), "lobby bulk operation");
        for participant_id in &waiting {
            self.run_lobby_one(dispatch, participant_id, decision).await;
        }
    }

    async fn run_lobby_one(
        &self,
        dispatch: &ActionDispatch,
        participant_id: &str,
        decision: LobbyDecision,
    ) {
        let result = match decision {
            LobbyDecision::Admit => self.service.admit_lobby_participant(participant_id).await,
            LobbyDecision::Decline => self.service.decline_lobby_participant(participant_id).await,
        };
        if let Err(err) = result {
            dispatch_lobby_error(dispatch, &err);
        }
    }
}

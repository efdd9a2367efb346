#[path = "support/mod.rs"]
mod support;

use std::sync::Arc;
use std::time::Duration;

use huddle_core::calling::{
    CallInfo, CallingServiceError, CallingServiceErrorKind, CallingStatus,
    InMemoryCallingService, ParticipantInfo, ParticipantStatus, ServiceCall, ServiceOp,
};
use huddle_core::{
    Action, AppState, CallingAction, CallingMiddlewareHandler, LobbyErrorCode, MiddlewareConfig,
    NavigationStatus, RemoteParticipantsAction, Store, StoreHandle,
};

use support::wait_until;

const TIMEOUT: Duration = Duration::from_secs(5);

/// Just enough state merging to drive a call through the store.
fn reduce(state: &AppState, action: &Action) -> AppState {
    let mut next = state.clone();
    match action {
        Action::Calling(CallingAction::StateUpdated { status }) => {
            next.calling.status = *status;
            if *status == CallingStatus::Connected {
                next.navigation.status = NavigationStatus::InCall;
            }
        }
        Action::RemoteParticipants(RemoteParticipantsAction::ParticipantListUpdated {
            participants,
        }) => next.remote_participants.participants = participants.clone(),
        Action::RemoteParticipants(RemoteParticipantsAction::LobbyError { error_code }) => {
            next.remote_participants.lobby_error = Some(*error_code)
        }
        Action::CompositeExit => next.navigation.status = NavigationStatus::Exit,
        _ => {}
    }
    next
}

fn spawn_store(service: &InMemoryCallingService) -> StoreHandle {
    let config = MiddlewareConfig {
        participants_throttle_ms: 20,
        dominant_speakers_throttle_ms: 20,
        ..MiddlewareConfig::default()
    };
    let runtime = tokio::runtime::Handle::current();
    let middleware =
        CallingMiddlewareHandler::new(Arc::new(service.clone()), runtime.clone(), config);
    Store::spawn(AppState::empty(), reduce, middleware, &runtime)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn lobby_round_trip_through_the_store() {
    let service = InMemoryCallingService::new();
    service.fail_participant(
        "carol",
        CallingServiceError::new(CallingServiceErrorKind::LobbyDisabledByConfiguration, "off"),
    );
    let store = spawn_store(&service);

    store.dispatch(CallingAction::CallStartRequested);
    wait_until("bridge attached", TIMEOUT, || {
        store.middleware().subscriptions().is_active()
    })
    .await;

    let hub = service.hub();
    hub.publish_call_info(CallInfo::new(CallingStatus::Connected));
    hub.publish_participants(vec![
        ParticipantInfo::new("alice", ParticipantStatus::InLobby),
        ParticipantInfo::new("bob", ParticipantStatus::Connected),
        ParticipantInfo::new("carol", ParticipantStatus::InLobby),
    ]);
    wait_until("lobby visible", TIMEOUT, || {
        let state = store.state();
        state.is_connected() && state.lobby_participant_ids().len() == 2
    })
    .await;

    store.dispatch(RemoteParticipantsAction::DeclineAll);
    wait_until("lobby error reduced", TIMEOUT, || {
        store.state().remote_participants.lobby_error.is_some()
    })
    .await;

    assert_eq!(
        service.calls_of(ServiceOp::DeclineLobbyParticipant),
        vec![
            ServiceCall::DeclineLobbyParticipant("alice".into()),
            ServiceCall::DeclineLobbyParticipant("carol".into()),
        ]
    );
    assert_eq!(
        store.state().remote_participants.lobby_error,
        Some(LobbyErrorCode::LobbyDisabledByConfigurations)
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn remote_disconnect_navigates_to_exit() {
    let service = InMemoryCallingService::new();
    let store = spawn_store(&service);

    store.dispatch(CallingAction::CallStartRequested);
    wait_until("bridge attached", TIMEOUT, || {
        store.middleware().subscriptions().is_active()
    })
    .await;

    let hub = service.hub();
    hub.publish_call_info(CallInfo::new(CallingStatus::Connected));
    wait_until("in call", TIMEOUT, || {
        store.state().navigation.status == NavigationStatus::InCall
    })
    .await;

    hub.publish_call_info(CallInfo::new(CallingStatus::Disconnected));
    wait_until("exited", TIMEOUT, || {
        store.state().navigation.status == NavigationStatus::Exit
    })
    .await;
    wait_until("bridge detached", TIMEOUT, || hub.call_info_receivers() == 0).await;
    assert!(!store.middleware().subscriptions().is_active());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn hold_request_outside_call_never_reaches_the_service() {
    let service = InMemoryCallingService::new();
    let store = spawn_store(&service);

    store.dispatch(CallingAction::HoldRequested);
    store.dispatch(CallingAction::ResumeRequested);
    store.dispatch(CallingAction::CallEndRequested);
    wait_until("end call issued", TIMEOUT, || {
        !service.calls_of(ServiceOp::EndCall).is_empty()
    })
    .await;

    assert_eq!(service.calls(), vec![ServiceCall::EndCall]);
}

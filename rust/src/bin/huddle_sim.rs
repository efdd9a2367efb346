use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{bail, Context};
use clap::Parser;
use huddle_core::calling::{
    CallInfo, CallingServiceError, CallingServiceErrorKind, CallingStatus,
    CapabilitiesChangeNotice, CapabilityKind, CapabilityResolutionReason, InMemoryCallingService,
    ParticipantCapability, ParticipantInfo, ParticipantStatus, ServiceOp,
};
use huddle_core::{
    Action, AppState, CallingAction, CallingMiddlewareHandler, LocalUserAction, MiddlewareConfig,
    NavigationStatus, RemoteParticipantsAction, StateReconciler, StateUpdate, Store, StoreHandle,
    ToastNotificationAction,
};

/// Runs a scripted call against the in-memory calling service and logs every
/// action the store reduces.
#[derive(Debug, Parser)]
#[command(name = "huddle-sim")]
struct Args {
    /// Participants waiting in the lobby when the call connects.
    #[arg(long, default_value_t = 3)]
    lobby: usize,

    /// Make every lobby decline fail.
    #[arg(long)]
    fail_declines: bool,

    /// Directory holding huddle_config.json.
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

struct LogReconciler;

impl StateReconciler for LogReconciler {
    fn reconcile(&self, update: StateUpdate) {
        tracing::info!(
            rev = update.rev,
            action = update.action,
            status = %update.state.calling.status,
            participants = update.state.remote_participants.participants.len(),
            "state"
        );
    }
}

fn reduce(state: &AppState, action: &Action) -> AppState {
    let mut next = state.clone();
    match action {
        Action::Calling(CallingAction::StateUpdated { status }) => {
            next.calling.status = *status;
            if *status == CallingStatus::Connected {
                next.navigation.status = NavigationStatus::InCall;
            }
        }
        Action::Calling(CallingAction::CallIdUpdated { call_id }) => {
            next.calling.call_id = Some(call_id.clone())
        }
        Action::RemoteParticipants(RemoteParticipantsAction::ParticipantListUpdated {
            participants,
        }) => next.remote_participants.participants = participants.clone(),
        Action::RemoteParticipants(RemoteParticipantsAction::LobbyError { error_code }) => {
            next.remote_participants.lobby_error = Some(*error_code)
        }
        Action::LocalUser(LocalUserAction::CapabilitiesUpdated { capabilities }) => {
            next.local_user.capabilities = capabilities.clone()
        }
        Action::ToastNotification(ToastNotificationAction::ShowNotification { kind }) => {
            next.toast.status = Some(*kind)
        }
        Action::CompositeExit => next.navigation.status = NavigationStatus::Exit,
        _ => {}
    }
    next
}

async fn wait_for(
    store: &StoreHandle,
    what: &str,
    timeout: Duration,
    f: impl Fn(&AppState) -> bool,
) -> anyhow::Result<()> {
    let start = Instant::now();
    while start.elapsed() < timeout {
        if f(&store.state()) {
            return Ok(());
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    bail!("{what}: not reached within {timeout:?}")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    huddle_core::logging::init_logging();
    let args = Args::parse();

    let config = match &args.data_dir {
        Some(dir) => huddle_core::load_middleware_config(dir),
        None => MiddlewareConfig::default().with_env_overrides(),
    };
    tracing::info!(?config, lobby = args.lobby, fail_declines = args.fail_declines, "huddle-sim starting");

    let service = InMemoryCallingService::with_event_capacity(config.event_capacity);
    service.set_capabilities(
        [
            CapabilityKind::TurnVideoOn,
            CapabilityKind::UnmuteMicrophone,
            CapabilityKind::ManageLobby,
        ]
        .into_iter()
        .map(ParticipantCapability::capable)
        .collect(),
    );
    if args.fail_declines {
        service.fail(
            ServiceOp::DeclineLobbyParticipant,
            CallingServiceError::new(
                CallingServiceErrorKind::LobbyMeetingRoleNotAllowed,
                "simulated decline failure",
            ),
        );
    }

    let settle = config.participants_throttle() + Duration::from_millis(500);
    let runtime = tokio::runtime::Handle::current();
    let middleware = CallingMiddlewareHandler::new(Arc::new(service.clone()), runtime.clone(), config);
    let store = Store::spawn(AppState::empty(), reduce, middleware, &runtime);
    store.listen_for_updates(Box::new(LogReconciler));

    store.dispatch(CallingAction::SetupCall);
    store.dispatch(CallingAction::CallStartRequested);
    let deadline = Instant::now() + Duration::from_secs(5);
    while !store.middleware().subscriptions().is_active() {
        if Instant::now() > deadline {
            bail!("call subscriptions never attached");
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    let hub = service.hub();
    hub.publish_call_info(CallInfo::new(CallingStatus::Connecting));
    hub.publish_call_id("sim-call-1");
    hub.publish_call_info(CallInfo::new(CallingStatus::Connected));
    let mut participants: Vec<_> = (0..args.lobby)
        .map(|i| ParticipantInfo::new(format!("guest-{i}"), ParticipantStatus::InLobby))
        .collect();
    participants.push(ParticipantInfo::new("host", ParticipantStatus::Connected));
    hub.publish_participants(participants);
    hub.publish_capabilities_changed(CapabilitiesChangeNotice {
        changed: vec![ParticipantCapability::capable(CapabilityKind::ManageLobby)],
        reason: CapabilityResolutionReason::Capable,
    });

    wait_for(&store, "lobby populated", settle, |s| {
        s.is_connected() && s.lobby_participant_ids().len() == args.lobby
    })
    .await
    .context("waiting for participant list")?;

    store.dispatch(RemoteParticipantsAction::DeclineAll);
    tokio::time::sleep(Duration::from_millis(200)).await;

    store.dispatch(CallingAction::CallEndRequested);
    hub.publish_call_info(CallInfo::new(CallingStatus::Disconnected));
    wait_for(&store, "composite exit", Duration::from_secs(5), |s| {
        s.navigation.status == NavigationStatus::Exit
    })
    .await?;

    let final_state = store.state();
    tracing::info!(
        service_calls = service.calls().len(),
        declines = service.calls_of(ServiceOp::DeclineLobbyParticipant).len(),
        lobby_error = ?final_state.remote_participants.lobby_error,
        call_id = ?final_state.calling.call_id,
        "huddle-sim finished"
    );
    Ok(())
}

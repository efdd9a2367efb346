use huddle_calling::{
    CallCompositeInternalError, CallingServiceError, CallingStatus, CameraDevice, CapabilitySet,
    MediaDiagnostic, MediaDiagnosticModel, NetworkDiagnostic, NetworkDiagnosticModel,
    NetworkQualityDiagnostic, NetworkQualityDiagnosticModel, ParticipantInfo, ParticipantRole,
    VideoStreamId,
};

use crate::errors::{CallCompositeError, LobbyErrorCode};
use crate::state::{AppPermissionStatus, ToastNotificationKind};

/// Everything that can change `AppState`. Intents (`*Requested`,
/// `*Triggered`) are routed to middleware handlers; outcomes are reduced.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Calling(CallingAction),
    LocalUser(LocalUserAction),
    Permission(PermissionAction),
    RemoteParticipants(RemoteParticipantsAction),
    ToastNotification(ToastNotificationAction),
    CallDiagnostic(CallDiagnosticAction),
    Lifecycle(LifecycleAction),
    AudioSession(AudioSessionAction),
    Error(ErrorAction),
    /// Leave the composite entirely (terminal disconnect on the happy path).
    CompositeExit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallingAction {
    SetupCall,
    CallStartRequested,
    CallEndRequested,
    CallEnded,
    /// An awaited request failed; unblocks UI waiting on it.
    RequestFailed,
    HoldRequested,
    ResumeRequested,
    StateUpdated { status: CallingStatus },
    RecordingStateUpdated { is_recording_active: bool },
    TranscriptionStateUpdated { is_transcription_active: bool },
    CallIdUpdated { call_id: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocalUserAction {
    CameraPreviewOnTriggered,
    CameraOnTriggered,
    CameraOffTriggered,
    CameraPauseTriggered,
    CameraSwitchTriggered,
    CameraOnSucceeded { video_stream_id: VideoStreamId },
    CameraOnFailed { error: CallingServiceError },
    CameraOffSucceeded,
    CameraOffFailed { error: CallingServiceError },
    CameraPausedSucceeded,
    CameraPausedFailed { error: CallingServiceError },
    CameraSwitchSucceeded { camera_device: CameraDevice },
    CameraSwitchFailed {
        previous_camera: CameraDevice,
        error: CallingServiceError,
    },
    MicrophoneOnTriggered,
    MicrophoneOffTriggered,
    MicrophoneOnFailed { error: CallingServiceError },
    MicrophoneOffFailed { error: CallingServiceError },
    MicrophoneMuteStateUpdated { is_muted: bool },
    ParticipantRoleChanged { participant_role: ParticipantRole },
    CapabilitiesUpdated { capabilities: CapabilitySet },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PermissionAction {
    CameraPermissionRequested,
    AudioPermissionRequested,
    CameraPermissionUpdated { permission: AppPermissionStatus },
    AudioPermissionUpdated { permission: AppPermissionStatus },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteParticipantsAction {
    ParticipantListUpdated { participants: Vec<ParticipantInfo> },
    DominantSpeakersUpdated { speakers: Vec<String> },
    AdmitAll,
    DeclineAll,
    Admit { participant_id: String },
    Decline { participant_id: String },
    LobbyError { error_code: LobbyErrorCode },
    Remove { participant_id: String },
    RemoveParticipantError,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastNotificationAction {
    ShowNotification { kind: ToastNotificationKind },
    DismissNotification,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallDiagnosticAction {
    Network { diagnostic: NetworkDiagnosticModel },
    NetworkQuality { diagnostic: NetworkQualityDiagnosticModel },
    Media { diagnostic: MediaDiagnosticModel },
    DismissNetwork { diagnostic: NetworkDiagnostic },
    DismissNetworkQuality { diagnostic: NetworkQualityDiagnostic },
    DismissMedia { diagnostic: MediaDiagnostic },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleAction {
    ForegroundEntered,
    BackgroundEntered,
    WillTerminate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioSessionAction {
    Interrupted,
    InterruptEnded,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ErrorAction {
    /// Join-family failure; the call cannot continue.
    FatalErrorUpdated {
        internal_error: CallCompositeInternalError,
        error: CallCompositeError,
    },
    /// A non-fatal operation failed (end, hold, resume).
    OperationFailed {
        internal_error: CallCompositeInternalError,
        error: CallCompositeError,
    },
    /// The status stream reported a session-fatal error; subscriptions are
    /// being torn down.
    StatusErrorAndCallReset {
        internal_error: CallCompositeInternalError,
    },
}

impl Action {
    /// Log-safe action tag (payloads can carry participant names).
    pub fn tag(&self) -> &'static str {
        match self {
            Action::Calling(a) => match a {
                CallingAction::SetupCall => "Calling.SetupCall",
                CallingAction::CallStartRequested => "Calling.CallStartRequested",
                CallingAction::CallEndRequested => "Calling.CallEndRequested",
                CallingAction::CallEnded => "Calling.CallEnded",
                CallingAction::RequestFailed => "Calling.RequestFailed",
                CallingAction::HoldRequested => "Calling.HoldRequested",
                CallingAction::ResumeRequested => "Calling.ResumeRequested",
                CallingAction::StateUpdated { .. } => "Calling.StateUpdated",
                CallingAction::RecordingStateUpdated { .. } => "Calling.RecordingStateUpdated",
                CallingAction::TranscriptionStateUpdated { .. } => {
                    "Calling.TranscriptionStateUpdated"
                }
                CallingAction::CallIdUpdated { .. } => "Calling.CallIdUpdated",
            },
            Action::LocalUser(a) => match a {
                LocalUserAction::CameraPreviewOnTriggered => "LocalUser.CameraPreviewOnTriggered",
                LocalUserAction::CameraOnTriggered => "LocalUser.CameraOnTriggered",
                LocalUserAction::CameraOffTriggered => "LocalUser.CameraOffTriggered",
                LocalUserAction::CameraPauseTriggered => "LocalUser.CameraPauseTriggered",
                LocalUserAction::CameraSwitchTriggered => "LocalUser.CameraSwitchTriggered",
                LocalUserAction::CameraOnSucceeded { .. } => "LocalUser.CameraOnSucceeded",
                LocalUserAction::CameraOnFailed { .. } => "LocalUser.CameraOnFailed",
                LocalUserAction::CameraOffSucceeded => "LocalUser.CameraOffSucceeded",
                LocalUserAction::CameraOffFailed { .. } => "LocalUser.CameraOffFailed",
                LocalUserAction::CameraPausedSucceeded => "LocalUser.CameraPausedSucceeded",
                LocalUserAction::CameraPausedFailed { .. } => "LocalUser.CameraPausedFailed",
                LocalUserAction::CameraSwitchSucceeded { .. } => "LocalUser.CameraSwitchSucceeded",
                LocalUserAction::CameraSwitchFailed { .. } => "LocalUser.CameraSwitchFailed",
                LocalUserAction::MicrophoneOnTriggered => "LocalUser.MicrophoneOnTriggered",
                LocalUserAction::MicrophoneOffTriggered => "LocalUser.MicrophoneOffTriggered",
                LocalUserAction::MicrophoneOnFailed { .. } => "LocalUser.MicrophoneOnFailed",
                LocalUserAction::MicrophoneOffFailed { .. } => "LocalUser.MicrophoneOffFailed",
                LocalUserAction::MicrophoneMuteStateUpdated { .. } => {
                    "LocalUser.MicrophoneMuteStateUpdated"
                }
                LocalUserAction::ParticipantRoleChanged { .. } => "LocalUser.ParticipantRoleChanged",
                LocalUserAction::CapabilitiesUpdated { .. } => "LocalUser.CapabilitiesUpdated",
            },
            Action::Permission(a) => match a {
                PermissionAction::CameraPermissionRequested => "Permission.CameraPermissionRequested",
                PermissionAction::AudioPermissionRequested => "Permission.AudioPermissionRequested",
                PermissionAction::CameraPermissionUpdated { .. } => {
                    "Permission.CameraPermissionUpdated"
                }
                PermissionAction::AudioPermissionUpdated { .. } => {
                    "Permission.AudioPermissionUpdated"
                }
            },
            Action::RemoteParticipants(a) => match a {
                RemoteParticipantsAction::ParticipantListUpdated { .. } => {
                    "RemoteParticipants.ParticipantListUpdated"
                }
                RemoteParticipantsAction::DominantSpeakersUpdated { .. } => {
                    "RemoteParticipants.DominantSpeakersUpdated"
                }
                RemoteParticipantsAction::AdmitAll => "RemoteParticipants.AdmitAll",
                RemoteParticipantsAction::DeclineAll => "RemoteParticipants.DeclineAll",
                RemoteParticipantsAction::Admit { .. } => "RemoteParticipants.Admit",
                RemoteParticipantsAction::Decline { .. } => "RemoteParticipants.Decline",
                RemoteParticipantsAction::LobbyError { .. } => "RemoteParticipants.LobbyError",
                RemoteParticipantsAction::Remove { .. } => "RemoteParticipants.Remove",
                RemoteParticipantsAction::RemoveParticipantError => {
                    "RemoteParticipants.RemoveParticipantError"
                }
            },
            Action::ToastNotification(a) => match a {
                ToastNotificationAction::ShowNotification { .. } => {
                    "ToastNotification.ShowNotification"
                }
                ToastNotificationAction::DismissNotification => {
                    "ToastNotification.DismissNotification"
                }
            },
            Action::CallDiagnostic(a) => match a {
                CallDiagnosticAction::Network { .. } => "CallDiagnostic.Network",
                CallDiagnosticAction::NetworkQuality { .. } => "CallDiagnostic.NetworkQuality",
                CallDiagnosticAction::Media { .. } => "CallDiagnostic.Media",
                CallDiagnosticAction::DismissNetwork { .. } => "CallDiagnostic.DismissNetwork",
                CallDiagnosticAction::DismissNetworkQuality { .. } => {
                    "CallDiagnostic.DismissNetworkQuality"
                }
                CallDiagnosticAction::DismissMedia { .. } => "CallDiagnostic.DismissMedia",
            },
            Action::Lifecycle(a) => match a {
                LifecycleAction::ForegroundEntered => "Lifecycle.ForegroundEntered",
                LifecycleAction::BackgroundEntered => "Lifecycle.BackgroundEntered",
                LifecycleAction::WillTerminate => "Lifecycle.WillTerminate",
            },
            Action::AudioSession(a) => match a {
                AudioSessionAction::Interrupted => "AudioSession.Interrupted",
                AudioSessionAction::InterruptEnded => "AudioSession.InterruptEnded",
            },
            Action::Error(a) => match a {
                ErrorAction::FatalErrorUpdated { .. } => "Error.FatalErrorUpdated",
                ErrorAction::OperationFailed { .. } => "Error.OperationFailed",
                ErrorAction::StatusErrorAndCallReset { .. } => "Error.StatusErrorAndCallReset",
            },
            Action::CompositeExit => "CompositeExit",
        }
    }
}

impl From<CallingAction> for Action {
    fn from(a: CallingAction) -> Self {
        Action::Calling(a)
    }
}

impl From<LocalUserAction> for Action {
    fn from(a: LocalUserAction) -> Self {
        Action::LocalUser(a)
    }
}

impl From<PermissionAction> for Action {
    fn from(a: PermissionAction) -> Self {
        Action::Permission(a)
    }
}

impl From<RemoteParticipantsAction> for Action {
    fn from(a: RemoteParticipantsAction) -> Self {
        Action::RemoteParticipants(a)
    }
}

impl From<ToastNotificationAction> for Action {
    fn from(a: ToastNotificationAction) -> Self {
        Action::ToastNotification(a)
    }
}

impl From<CallDiagnosticAction> for Action {
    fn from(a: CallDiagnosticAction) -> Self {
        Action::CallDiagnostic(a)
    }
}

impl From<LifecycleAction> for Action {
    fn from(a: LifecycleAction) -> Self {
        Action::Lifecycle(a)
    }
}

impl From<AudioSessionAction> for Action {
    fn from(a: AudioSessionAction) -> Self {
        Action::AudioSession(a)
    }
}

impl From<ErrorAction> for Action {
    fn from(a: ErrorAction) -> Self {
        Action::Error(a)
    }
}

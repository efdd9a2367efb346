use huddle_calling::{
    CallCompositeInternalError, CallingStatus, CameraDevice, CapabilitySet, ParticipantInfo,
    ParticipantRole,
};

use crate::errors::{CallCompositeError, LobbyErrorCode};

/// Immutable snapshot of everything the middleware may read. Produced by the
/// reducer once per dispatch cycle; never mutated by handlers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    pub calling: CallingState,
    pub local_user: LocalUserState,
    pub default_user: DefaultUserState,
    pub permissions: PermissionState,
    pub remote_participants: RemoteParticipantsState,
    pub lifecycle: LifeCycleState,
    pub navigation: NavigationState,
    pub toast: ToastNotificationState,
    pub error: ErrorState,
}

impl AppState {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_connected(&self) -> bool {
        self.calling.status == CallingStatus::Connected
    }

    /// User identifiers of remote participants waiting in the lobby, in list
    /// order.
    pub fn lobby_participant_ids(&self) -> Vec<String> {
        self.remote_participants
            .participants
            .iter()
            .filter(|p| p.is_in_lobby())
            .map(|p| p.user_identifier.clone())
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OperationStatus {
    #[default]
    None,
    /// The host skipped the setup screen; start the call as soon as setup
    /// completes.
    SkipSetupRequested,
    CallEndRequested,
    CallEnded,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallingState {
    pub status: CallingStatus,
    pub operation_status: OperationStatus,
    pub call_id: Option<String>,
    pub is_recording_active: bool,
    pub is_transcription_active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CameraOperationalStatus {
    On,
    #[default]
    Off,
    Paused,
    Pending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CameraTransmissionStatus {
    #[default]
    Local,
    Remote,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CameraState {
    pub operation: CameraOperationalStatus,
    pub device: CameraDevice,
    pub transmission: CameraTransmissionStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AudioOperationalStatus {
    On,
    #[default]
    Off,
    Pending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AudioDeviceType {
    #[default]
    Receiver,
    Speaker,
    Bluetooth,
    Headphones,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AudioState {
    pub operation: AudioOperationalStatus,
    pub device: AudioDeviceType,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalUserState {
    pub camera: CameraState,
    pub audio: AudioState,
    pub display_name: Option<String>,
    pub local_video_stream_id: Option<String>,
    pub capabilities: CapabilitySet,
    pub participant_role: ParticipantRole,
}

/// Preferences picked on the setup screen before a call exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DefaultUserState {
    pub camera_on: bool,
    pub audio_on: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppPermissionStatus {
    #[default]
    Unknown,
    NotAsked,
    Requesting,
    Granted,
    Denied,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PermissionState {
    pub camera: AppPermissionStatus,
    pub audio: AppPermissionStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteParticipantsState {
    pub participants: Vec<ParticipantInfo>,
    pub dominant_speakers: Vec<String>,
    pub lobby_error: Option<LobbyErrorCode>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppStatus {
    #[default]
    Foreground,
    Background,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LifeCycleState {
    pub status: AppStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NavigationStatus {
    #[default]
    Setup,
    InCall,
    Exit,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NavigationState {
    pub status: NavigationStatus,
}

/// Toasts the calling screen can show. All but the two capability-change
/// kinds are dismissed through a typed diagnostic action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToastNotificationKind {
    NetworkReceiveQuality,
    NetworkReconnectionQuality,
    NetworkSendQuality,
    NetworkUnavailable,
    NetworkRelaysUnreachable,
    SpeakingWhileMicrophoneIsMuted,
    CameraStartFailed,
    CameraStartTimedOut,
    SomeFeaturesLost,
    SomeFeaturesGained,
}

impl ToastNotificationKind {
    pub const ALL: [ToastNotificationKind; 10] = [
        Self::NetworkReceiveQuality,
        Self::NetworkReconnectionQuality,
        Self::NetworkSendQuality,
        Self::NetworkUnavailable,
        Self::NetworkRelaysUnreachable,
        Self::SpeakingWhileMicrophoneIsMuted,
        Self::CameraStartFailed,
        Self::CameraStartTimedOut,
        Self::SomeFeaturesLost,
        Self::SomeFeaturesGained,
    ];
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ToastNotificationState {
    pub status: Option<ToastNotificationKind>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErrorState {
    pub internal_error: Option<CallCompositeInternalError>,
    pub error: Option<CallCompositeError>,
}

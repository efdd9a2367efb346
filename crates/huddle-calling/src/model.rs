use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

/// Call status as reported by the calling service.
///
/// `Disconnected` is terminal for a call session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CallingStatus {
    #[default]
    None,
    EarlyMedia,
    Connecting,
    Ringing,
    Connected,
    LocalHold,
    RemoteHold,
    InLobby,
    Disconnecting,
    Disconnected,
}

impl CallingStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::EarlyMedia => "early_media",
            Self::Connecting => "connecting",
            Self::Ringing => "ringing",
            Self::Connected => "connected",
            Self::LocalHold => "local_hold",
            Self::RemoteHold => "remote_hold",
            Self::InLobby => "in_lobby",
            Self::Disconnecting => "disconnecting",
            Self::Disconnected => "disconnected",
        }
    }
}

impl Display for CallingStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Session-fatal conditions the service attaches to a status update, and the
/// operation failures the middleware reports for attempted operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallCompositeInternalError {
    CallJoinFailed,
    CallJoinFailedByMicPermission,
    NetworkConnectionNotAvailable,
    CallEndFailed,
    CallHoldFailed,
    CallResumeFailed,
    CallEvicted,
    CallDenied,
}

impl CallCompositeInternalError {
    /// Fatal errors end the composite session; the rest are reported and the
    /// call carries on.
    pub fn is_fatal(self) -> bool {
        matches!(
            self,
            Self::CallJoinFailed
                | Self::CallJoinFailedByMicPermission
                | Self::NetworkConnectionNotAvailable
                | Self::CallEvicted
                | Self::CallDenied
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::CallJoinFailed => "callJoin",
            Self::CallJoinFailedByMicPermission => "callJoinFailedByMicPermission",
            Self::NetworkConnectionNotAvailable => "networkConnectionNotAvailable",
            Self::CallEndFailed => "callEnd",
            Self::CallHoldFailed => "callHold",
            Self::CallResumeFailed => "callResume",
            Self::CallEvicted => "callEvicted",
            Self::CallDenied => "callDenied",
        }
    }
}

impl Display for CallCompositeInternalError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One emission of the call-info stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallInfo {
    pub status: CallingStatus,
    pub internal_error: Option<CallCompositeInternalError>,
}

impl CallInfo {
    pub fn new(status: CallingStatus) -> Self {
        Self {
            status,
            internal_error: None,
        }
    }

    pub fn with_error(status: CallingStatus, internal_error: CallCompositeInternalError) -> Self {
        Self {
            status,
            internal_error: Some(internal_error),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CameraDevice {
    #[default]
    Front,
    Back,
}

impl CameraDevice {
    pub fn toggled(self) -> Self {
        match self {
            Self::Front => Self::Back,
            Self::Back => Self::Front,
        }
    }
}

/// Identifier of a rendered local video stream.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VideoStreamId(pub String);

impl VideoStreamId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for VideoStreamId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ParticipantStatus {
    #[default]
    Idle,
    Connecting,
    Ringing,
    Connected,
    Hold,
    InLobby,
    Disconnected,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VideoStreamInfo {
    pub stream_id: String,
    pub is_screen_share: bool,
}

/// Remote participant as the service reports it. Treated as opaque beyond
/// the identifier and status.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParticipantInfo {
    pub user_identifier: String,
    pub display_name: String,
    pub is_muted: bool,
    pub is_speaking: bool,
    pub status: ParticipantStatus,
    pub camera_video_stream: Option<VideoStreamInfo>,
    pub screen_share_video_stream: Option<VideoStreamInfo>,
}

impl ParticipantInfo {
    pub fn new(user_identifier: impl Into<String>, status: ParticipantStatus) -> Self {
        let user_identifier = user_identifier.into();
        Self {
            display_name: user_identifier.clone(),
            user_identifier,
            status,
            ..Self::default()
        }
    }

    pub fn is_in_lobby(&self) -> bool {
        matches!(self.status, ParticipantStatus::InLobby)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ParticipantRole {
    #[default]
    Uninitialized,
    Attendee,
    Consumer,
    Presenter,
    Organizer,
    CoOrganizer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CapabilityKind {
    AddCommunicationUser,
    ManageLobby,
    RemoveParticipant,
    ShareScreen,
    SpotlightParticipant,
    TurnVideoOn,
    UnmuteMicrophone,
    ViewAttendees,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum CapabilityResolutionReason {
    #[default]
    Capable,
    CapabilityNotApplicable,
    ClientRestricted,
    MeetingRestricted,
    RoleRestricted,
    NotCapable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParticipantCapability {
    pub kind: CapabilityKind,
    pub reason: CapabilityResolutionReason,
}

impl ParticipantCapability {
    pub fn capable(kind: CapabilityKind) -> Self {
        Self {
            kind,
            reason: CapabilityResolutionReason::Capable,
        }
    }
}

/// The set of capabilities currently granted to the local participant.
pub type CapabilitySet = BTreeSet<ParticipantCapability>;

/// Notice that the capability set changed server-side. The payload only
/// names what changed; the current set is fetched separately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilitiesChangeNotice {
    pub changed: Vec<ParticipantCapability>,
    pub reason: CapabilityResolutionReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NetworkQualityDiagnostic {
    NetworkReceiveQuality,
    NetworkReconnectionQuality,
    NetworkSendQuality,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticQuality {
    Unknown,
    Good,
    Poor,
    Bad,
}

impl DiagnosticQuality {
    /// Graded quality collapses to show/dismiss: poor and bad show.
    pub fn is_degraded(self) -> bool {
        matches!(self, Self::Poor | Self::Bad)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NetworkQualityDiagnosticModel {
    pub diagnostic: NetworkQualityDiagnostic,
    pub value: DiagnosticQuality,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NetworkDiagnostic {
    NetworkUnavailable,
    NetworkRelaysUnreachable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NetworkDiagnosticModel {
    pub diagnostic: NetworkDiagnostic,
    pub value: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaDiagnostic {
    SpeakingWhileMicrophoneIsMuted,
    CameraStartFailed,
    CameraStartTimedOut,
    CameraFrozen,
    CameraPermissionDenied,
    MicrophoneNotFunctioning,
    NoMicrophoneDevicesAvailable,
    NoSpeakerDevicesAvailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MediaDiagnosticModel {
    pub diagnostic: MediaDiagnostic,
    pub value: bool,
}

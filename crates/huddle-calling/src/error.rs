/// Failure categories a calling service reports. The middleware maps these to
/// typed actions; it never inspects the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallingServiceErrorKind {
    NetworkUnavailable,
    MicrophonePermissionDenied,
    CameraUnavailable,
    CallNotFound,
    InvalidState,
    LobbyDisabledByConfiguration,
    LobbyConversationTypeNotSupported,
    LobbyMeetingRoleNotAllowed,
    ParticipantNotFound,
    RemoveParticipantFailed,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind:?}: {message}")]
pub struct CallingServiceError {
    pub kind: CallingServiceErrorKind,
    pub message: String,
}

impl CallingServiceError {
    pub fn new(kind: CallingServiceErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(CallingServiceErrorKind::Unknown, message)
    }
}

pub type ServiceResult<T> = Result<T, CallingServiceError>;

use huddle_calling::{CallCompositeInternalError, CallingServiceError, CallingServiceErrorKind};

/// Error detail carried by error actions: the composite-level code plus the
/// service failure that caused it, when there was one.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{code}")]
pub struct CallCompositeError {
    pub code: CallCompositeInternalError,
    #[source]
    pub cause: Option<CallingServiceError>,
}

impl CallCompositeError {
    pub fn new(code: CallCompositeInternalError, cause: Option<CallingServiceError>) -> Self {
        Self { code, cause }
    }
}

/// Refines the code for a failed operation using what the service reported.
///
/// The attempted operation decides the family; only join failures have more
/// specific codes.
pub fn internal_error_for_failure(
    attempted: CallCompositeInternalError,
    err: &CallingServiceError,
) -> CallCompositeInternalError {
    match (attempted, err.kind) {
        (CallCompositeInternalError::CallJoinFailed, CallingServiceErrorKind::NetworkUnavailable) => {
            CallCompositeInternalError::NetworkConnectionNotAvailable
        }
        (
            CallCompositeInternalError::CallJoinFailed,
            CallingServiceErrorKind::MicrophonePermissionDenied,
        ) => CallCompositeInternalError::CallJoinFailedByMicPermission,
        (attempted, _) => attempted,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LobbyErrorCode {
    LobbyDisabledByConfigurations,
    LobbyConversationTypeNotSupported,
    LobbyMeetingRoleNotAllowed,
    RemoveParticipantOperationFailure,
    UnknownError,
}

impl LobbyErrorCode {
    /// Total mapping; anything without a lobby-specific meaning is
    /// `UnknownError`.
    pub fn from_service_error(err: &CallingServiceError) -> Self {
        match err.kind {
            CallingServiceErrorKind::LobbyDisabledByConfiguration => {
                Self::LobbyDisabledByConfigurations
            }
            CallingServiceErrorKind::LobbyConversationTypeNotSupported => {
                Self::LobbyConversationTypeNotSupported
            }
            CallingServiceErrorKind::LobbyMeetingRoleNotAllowed => Self::LobbyMeetingRoleNotAllowed,
            CallingServiceErrorKind::ParticipantNotFound
            | CallingServiceErrorKind::RemoveParticipantFailed => {
                Self::RemoveParticipantOperationFailure
            }
            CallingServiceErrorKind::NetworkUnavailable
            | CallingServiceErrorKind::MicrophonePermissionDenied
            | CallingServiceErrorKind::CameraUnavailable
            | CallingServiceErrorKind::CallNotFound
            | CallingServiceErrorKind::InvalidState
            | CallingServiceErrorKind::Unknown => Self::UnknownError,
        }
    }
}

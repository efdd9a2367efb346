//! Diagnostic kind <-> toast kind <-> dismiss action tables.

use huddle_calling::{MediaDiagnostic, NetworkDiagnostic, NetworkQualityDiagnostic};

use crate::actions::CallDiagnosticAction;
use crate::state::ToastNotificationKind;

pub fn network_quality_toast(diagnostic: NetworkQualityDiagnostic) -> ToastNotificationKind {
    match diagnostic {
        NetworkQualityDiagnostic::NetworkReceiveQuality => {
            ToastNotificationKind::NetworkReceiveQuality
        }
        NetworkQualityDiagnostic::NetworkReconnectionQuality => {
            ToastNotificationKind::NetworkReconnectionQuality
        }
        NetworkQualityDiagnostic::NetworkSendQuality => ToastNotificationKind::NetworkSendQuality,
    }
}

pub fn network_toast(diagnostic: NetworkDiagnostic) -> ToastNotificationKind {
    match diagnostic {
        NetworkDiagnostic::NetworkUnavailable => ToastNotificationKind::NetworkUnavailable,
        NetworkDiagnostic::NetworkRelaysUnreachable => {
            ToastNotificationKind::NetworkRelaysUnreachable
        }
    }
}

/// `None` for media diagnostics the calling screen does not surface.
pub fn media_toast(diagnostic: MediaDiagnostic) -> Option<ToastNotificationKind> {
    match diagnostic {
        MediaDiagnostic::SpeakingWhileMicrophoneIsMuted => {
            Some(ToastNotificationKind::SpeakingWhileMicrophoneIsMuted)
        }
        MediaDiagnostic::CameraStartFailed => Some(ToastNotificationKind::CameraStartFailed),
        MediaDiagnostic::CameraStartTimedOut => Some(ToastNotificationKind::CameraStartTimedOut),
        MediaDiagnostic::CameraFrozen
        | MediaDiagnostic::CameraPermissionDenied
        | MediaDiagnostic::MicrophoneNotFunctioning
        | MediaDiagnostic::NoMicrophoneDevicesAvailable
        | MediaDiagnostic::NoSpeakerDevicesAvailable => None,
    }
}

/// The typed dismiss action for a displayed toast. Capability-change toasts
/// have none.
pub fn dismiss_action(kind: ToastNotificationKind) -> Option<CallDiagnosticAction> {
    let action = match kind {
        ToastNotificationKind::NetworkReceiveQuality => CallDiagnosticAction::DismissNetworkQuality {
            diagnostic: NetworkQualityDiagnostic::NetworkReceiveQuality,
        },
        ToastNotificationKind::NetworkReconnectionQuality => {
            CallDiagnosticAction::DismissNetworkQuality {
                diagnostic: NetworkQualityDiagnostic::NetworkReconnectionQuality,
            }
        }
        ToastNotificationKind::NetworkSendQuality => CallDiagnosticAction::DismissNetworkQuality {
            diagnostic: NetworkQualityDiagnostic::NetworkSendQuality,
        },
        ToastNotificationKind::NetworkUnavailable => CallDiagnosticAction::DismissNetwork {
            diagnostic: NetworkDiagnostic::NetworkUnavailable,
        },
        ToastNotificationKind::NetworkRelaysUnreachable => CallDiagnosticAction::DismissNetwork {
            diagnostic: NetworkDiagnostic::NetworkRelaysUnreachable,
        },
        ToastNotificationKind::SpeakingWhileMicrophoneIsMuted => {
            CallDiagnosticAction::DismissMedia {
                diagnostic: MediaDiagnostic::SpeakingWhileMicrophoneIsMuted,
            }
        }
        ToastNotificationKind::CameraStartFailed => CallDiagnosticAction::DismissMedia {
            diagnostic: MediaDiagnostic::CameraStartFailed,
        },
        ToastNotificationKind::CameraStartTimedOut => CallDiagnosticAction::DismissMedia {
            diagnostic: MediaDiagnostic::CameraStartTimedOut,
        },
        ToastNotificationKind::SomeFeaturesLost | ToastNotificationKind::SomeFeaturesGained => {
            return None;
        }
    };
    Some(action)
}

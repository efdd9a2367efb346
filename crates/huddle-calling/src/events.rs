use tokio::sync::broadcast;

use crate::model::{
    CallInfo, CapabilitiesChangeNotice, MediaDiagnosticModel, NetworkDiagnosticModel,
    NetworkQualityDiagnosticModel, ParticipantInfo, ParticipantRole,
};

pub const DEFAULT_EVENT_CAPACITY: usize = 64;

/// One receiver per push stream, handed out by `CallingService::events`.
///
/// Receivers only observe values published after they were created.
#[derive(Debug)]
pub struct CallingEventStreams {
    pub call_info: broadcast::Receiver<CallInfo>,
    pub participants: broadcast::Receiver<Vec<ParticipantInfo>>,
    pub recording_active: broadcast::Receiver<bool>,
    pub transcription_active: broadcast::Receiver<bool>,
    pub local_user_muted: broadcast::Receiver<bool>,
    pub call_id: broadcast::Receiver<String>,
    pub dominant_speakers: broadcast::Receiver<Vec<String>>,
    pub participant_role: broadcast::Receiver<ParticipantRole>,
    pub network_diagnostics: broadcast::Receiver<NetworkDiagnosticModel>,
    pub network_quality_diagnostics: broadcast::Receiver<NetworkQualityDiagnosticModel>,
    pub media_diagnostics: broadcast::Receiver<MediaDiagnosticModel>,
    pub capabilities_changed: broadcast::Receiver<CapabilitiesChangeNotice>,
}

/// Fan-out point for service-originated events. A service implementation
/// owns one hub and publishes into it from its SDK callbacks.
#[derive(Debug, Clone)]
pub struct CallingEventHub {
    call_info: broadcast::Sender<CallInfo>,
    participants: broadcast::Sender<Vec<ParticipantInfo>>,
    recording_active: broadcast::Sender<bool>,
    transcription_active: broadcast::Sender<bool>,
    local_user_muted: broadcast::Sender<bool>,
    call_id: broadcast::Sender<String>,
    dominant_speakers: broadcast::Sender<Vec<String>>,
    participant_role: broadcast::Sender<ParticipantRole>,
    network_diagnostics: broadcast::Sender<NetworkDiagnosticModel>,
    network_quality_diagnostics: broadcast::Sender<NetworkQualityDiagnosticModel>,
    media_diagnostics: broadcast::Sender<MediaDiagnosticModel>,
    capabilities_changed: broadcast::Sender<CapabilitiesChangeNotice>,
}

impl Default for CallingEventHub {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}

impl CallingEventHub {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            call_info: broadcast::channel(capacity).0,
            participants: broadcast::channel(capacity).0,
            recording_active: broadcast::channel(capacity).0,
            transcription_active: broadcast::channel(capacity).0,
            local_user_muted: broadcast::channel(capacity).0,
            call_id: broadcast::channel(capacity).0,
            dominant_speakers: broadcast::channel(capacity).0,
            participant_role: broadcast::channel(capacity).0,
            network_diagnostics: broadcast::channel(capacity).0,
            network_quality_diagnostics: broadcast::channel(capacity).0,
            media_diagnostics: broadcast::channel(capacity).0,
            capabilities_changed: broadcast::channel(capacity).0,
        }
    }

    pub fn subscribe(&self) -> CallingEventStreams {
        CallingEventStreams {
            call_info: self.call_info.subscribe(),
            participants: self.participants.subscribe(),
            recording_active: self.recording_active.subscribe(),
            transcription_active: self.transcription_active.subscribe(),
            local_user_muted: self.local_user_muted.subscribe(),
            call_id: self.call_id.subscribe(),
            dominant_speakers: self.dominant_speakers.subscribe(),
            participant_role: self.participant_role.subscribe(),
            network_diagnostics: self.network_diagnostics.subscribe(),
            network_quality_diagnostics: self.network_quality_diagnostics.subscribe(),
            media_diagnostics: self.media_diagnostics.subscribe(),
            capabilities_changed: self.capabilities_changed.subscribe(),
        }
    }

    // Each publish returns the number of live receivers; zero is not an error,
    // the bridge may simply not be attached yet.

    pub fn publish_call_info(&self, info: CallInfo) -> usize {
        self.call_info.send(info).unwrap_or(0)
    }

    pub fn publish_participants(&self, participants: Vec<ParticipantInfo>) -> usize {
        self.participants.send(participants).unwrap_or(0)
    }

    pub fn publish_recording_active(&self, active: bool) -> usize {
        self.recording_active.send(active).unwrap_or(0)
    }

    pub fn publish_transcription_active(&self, active: bool) -> usize {
        self.transcription_active.send(active).unwrap_or(0)
    }

    pub fn publish_local_user_muted(&self, muted: bool) -> usize {
        self.local_user_muted.send(muted).unwrap_or(0)
    }

    pub fn publish_call_id(&self, call_id: impl Into<String>) -> usize {
        self.call_id.send(call_id.into()).unwrap_or(0)
    }

    pub fn publish_dominant_speakers(&self, speakers: Vec<String>) -> usize {
        self.dominant_speakers.send(speakers).unwrap_or(0)
    }

    pub fn publish_participant_role(&self, role: ParticipantRole) -> usize {
        self.participant_role.send(role).unwrap_or(0)
    }

    pub fn publish_network_diagnostic(&self, model: NetworkDiagnosticModel) -> usize {
        self.network_diagnostics.send(model).unwrap_or(0)
    }

    pub fn publish_network_quality_diagnostic(&self, model: NetworkQualityDiagnosticModel) -> usize {
        self.network_quality_diagnostics.send(model).unwrap_or(0)
    }

    pub fn publish_media_diagnostic(&self, model: MediaDiagnosticModel) -> usize {
        self.media_diagnostics.send(model).unwrap_or(0)
    }

    pub fn publish_capabilities_changed(&self, notice: CapabilitiesChangeNotice) -> usize {
        self.capabilities_changed.send(notice).unwrap_or(0)
    }

    /// Number of attached call-info receivers. Tests use this to observe
    /// bridge attach/teardown.
    pub fn call_info_receivers(&self) -> usize {
        self.call_info.receiver_count()
    }
}

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{CallingServiceError, ServiceResult};
use crate::events::{CallingEventHub, CallingEventStreams};
use crate::model::{CameraDevice, CapabilitySet, VideoStreamId};
use crate::service::CallingService;

/// Operation names, used to script failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceOp {
    SetupCall,
    StartCall,
    EndCall,
    HoldCall,
    ResumeCall,
    CameraPreviewOn,
    StartLocalVideo,
    StopLocalVideo,
    SwitchCamera,
    MuteMic,
    UnmuteMic,
    AdmitLobbyParticipant,
    DeclineLobbyParticipant,
    RemoveParticipant,
    Capabilities,
}

/// A recorded invocation, in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceCall {
    SetupCall,
    StartCall {
        camera_preferred: bool,
        audio_preferred: bool,
    },
    EndCall,
    HoldCall,
    ResumeCall,
    CameraPreviewOn,
    StartLocalVideo,
    StopLocalVideo,
    SwitchCamera,
    MuteMic,
    UnmuteMic,
    AdmitLobbyParticipant(String),
    DeclineLobbyParticipant(String),
    RemoveParticipant(String),
    Capabilities,
}

impl ServiceCall {
    pub fn op(&self) -> ServiceOp {
        match self {
            Self::SetupCall => ServiceOp::SetupCall,
            Self::StartCall { .. } => ServiceOp::StartCall,
            Self::EndCall => ServiceOp::EndCall,
            Self::HoldCall => ServiceOp::HoldCall,
            Self::ResumeCall => ServiceOp::ResumeCall,
            Self::CameraPreviewOn => ServiceOp::CameraPreviewOn,
            Self::StartLocalVideo => ServiceOp::StartLocalVideo,
            Self::StopLocalVideo => ServiceOp::StopLocalVideo,
            Self::SwitchCamera => ServiceOp::SwitchCamera,
            Self::MuteMic => ServiceOp::MuteMic,
            Self::UnmuteMic => ServiceOp::UnmuteMic,
            Self::AdmitLobbyParticipant(_) => ServiceOp::AdmitLobbyParticipant,
            Self::DeclineLobbyParticipant(_) => ServiceOp::DeclineLobbyParticipant,
            Self::RemoveParticipant(_) => ServiceOp::RemoveParticipant,
            Self::Capabilities => ServiceOp::Capabilities,
        }
    }

    fn participant_id(&self) -> Option<&str> {
        match self {
            Self::AdmitLobbyParticipant(id)
            | Self::DeclineLobbyParticipant(id)
            | Self::RemoveParticipant(id) => Some(id),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
struct InMemoryState {
    calls: Vec<ServiceCall>,
    failures: HashMap<ServiceOp, CallingServiceError>,
    participant_failures: HashMap<String, CallingServiceError>,
    capabilities: CapabilitySet,
    camera: CameraDevice,
    latency: Duration,
    in_flight: usize,
    max_in_flight: usize,
    next_stream_seq: u64,
}

/// In-process calling service: records every call, fails on demand, and
/// publishes events through its own hub. Shared handles see the same state.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCallingService {
    state: Arc<Mutex<InMemoryState>>,
    hub: CallingEventHub,
}

impl InMemoryCallingService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_event_capacity(capacity: usize) -> Self {
        Self {
            state: Arc::default(),
            hub: CallingEventHub::new(capacity),
        }
    }

    pub fn hub(&self) -> &CallingEventHub {
        &self.hub
    }

    /// Every subsequent call of `op` fails with `error` until cleared.
    pub fn fail(&self, op: ServiceOp, error: CallingServiceError) {
        self.lock().failures.insert(op, error);
    }

    /// Lobby and removal calls for this participant fail with `error`.
    pub fn fail_participant(&self, participant_id: impl Into<String>, error: CallingServiceError) {
        self.lock()
            .participant_failures
            .insert(participant_id.into(), error);
    }

    /// Every call sleeps this long before completing.
    pub fn set_latency(&self, latency: Duration) {
        self.lock().latency = latency;
    }

    pub fn set_capabilities(&self, capabilities: CapabilitySet) {
        self.lock().capabilities = capabilities;
    }

    pub fn calls(&self) -> Vec<ServiceCall> {
        self.lock().calls.clone()
    }

    pub fn calls_of(&self, op: ServiceOp) -> Vec<ServiceCall> {
        self.lock()
            .calls
            .iter()
            .filter(|call| call.op() == op)
            .cloned()
            .collect()
    }

    pub fn max_in_flight(&self) -> usize {
        self.lock().max_in_flight
    }

    fn lock(&self) -> MutexGuard<'_, InMemoryState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poison) => poison.into_inner(),
        }
    }

    async fn invoke(&self, call: ServiceCall) -> ServiceResult<()> {
        let (latency, failure) = {
            let mut state = self.lock();
            let failure = call
                .participant_id()
                .and_then(|id| state.participant_failures.get(id).cloned())
                .or_else(|| state.failures.get(&call.op()).cloned());
            tracing::debug!(op = ?call.op(), scripted_failure = failure.is_some(), "calling service invoked");
            state.calls.push(call);
            state.in_flight += 1;
            state.max_in_flight = state.max_in_flight.max(state.in_flight);
            (state.latency, failure)
        };

        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        self.lock().in_flight -= 1;
        match failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn next_stream_id(&self, prefix: &str) -> VideoStreamId {
        let mut state = self.lock();
        state.next_stream_seq += 1;
        VideoStreamId(format!("{prefix}-{}", state.next_stream_seq))
    }
}

#[async_trait]
impl CallingService for InMemoryCallingService {
    async fn setup_call(&self) -> ServiceResult<()> {
        self.invoke(ServiceCall::SetupCall).await
    }

    async fn start_call(&self, camera_preferred: bool, audio_preferred: bool) -> ServiceResult<()> {
        self.invoke(ServiceCall::StartCall {
            camera_preferred,
            audio_preferred,
        })
        .await
    }

    async fn end_call(&self) -> ServiceResult<()> {
        self.invoke(ServiceCall::EndCall).await
    }

    async fn hold_call(&self) -> ServiceResult<()> {
        self.invoke(ServiceCall::HoldCall).await
    }

    async fn resume_call(&self) -> ServiceResult<()> {
        self.invoke(ServiceCall::ResumeCall).await
    }

    async fn request_camera_preview_on(&self) -> ServiceResult<VideoStreamId> {
        self.invoke(ServiceCall::CameraPreviewOn).await?;
        Ok(self.next_stream_id("preview"))
    }

    async fn start_local_video_stream(&self) -> ServiceResult<VideoStreamId> {
        self.invoke(ServiceCall::StartLocalVideo).await?;
        Ok(self.next_stream_id("local"))
    }

    async fn stop_local_video_stream(&self) -> ServiceResult<()> {
        self.invoke(ServiceCall::StopLocalVideo).await
    }

    async fn switch_camera(&self) -> ServiceResult<CameraDevice> {
        self.invoke(ServiceCall::SwitchCamera).await?;
        let mut state = self.lock();
        state.camera = state.camera.toggled();
        Ok(state.camera)
    }

    async fn mute_local_mic(&self) -> ServiceResult<()> {
        self.invoke(ServiceCall::MuteMic).await
    }

    async fn unmute_local_mic(&self) -> ServiceResult<()> {
        self.invoke(ServiceCall::UnmuteMic).await
    }

    async fn admit_lobby_participant(&self, participant_id: &str) -> ServiceResult<()> {
        self.invoke(ServiceCall::AdmitLobbyParticipant(participant_id.to_string()))
            .await
    }

    async fn decline_lobby_participant(&self, participant_id: &str) -> ServiceResult<()> {
        self.invoke(ServiceCall::DeclineLobbyParticipant(
            participant_id.to_string(),
        ))
        .await
    }

    async fn remove_participant(&self, participant_id: &str) -> ServiceResult<()> {
        self.invoke(ServiceCall::RemoveParticipant(participant_id.to_string()))
            .await
    }

    async fn capabilities(&self) -> ServiceResult<CapabilitySet> {
        self.invoke(ServiceCall::Capabilities).await?;
        Ok(self.lock().capabilities.clone())
    }

    fn events(&self) -> CallingEventStreams {
        self.hub.subscribe()
    }
}

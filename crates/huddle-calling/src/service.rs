use async_trait::async_trait;

use crate::error::ServiceResult;
use crate::events::CallingEventStreams;
use crate::model::{CameraDevice, CapabilitySet, VideoStreamId};

/// The calling SDK as the middleware sees it: imperative async operations
/// plus a set of push streams. Implementations must be cheap to share across
/// tasks; every method may be called concurrently.
#[async_trait]
pub trait CallingService: Send + Sync + 'static {
    async fn setup_call(&self) -> ServiceResult<()>;

    async fn start_call(&self, camera_preferred: bool, audio_preferred: bool) -> ServiceResult<()>;

    async fn end_call(&self) -> ServiceResult<()>;

    async fn hold_call(&self) -> ServiceResult<()>;

    async fn resume_call(&self) -> ServiceResult<()>;

    /// Starts the local camera for the setup-screen preview only.
    async fn request_camera_preview_on(&self) -> ServiceResult<VideoStreamId>;

    async fn start_local_video_stream(&self) -> ServiceResult<VideoStreamId>;

    async fn stop_local_video_stream(&self) -> ServiceResult<()>;

    /// Returns the camera that is active after the switch.
    async fn switch_camera(&self) -> ServiceResult<CameraDevice>;

    async fn mute_local_mic(&self) -> ServiceResult<()>;

    async fn unmute_local_mic(&self) -> ServiceResult<()>;

    async fn admit_lobby_participant(&self, participant_id: &str) -> ServiceResult<()>;

    async fn decline_lobby_participant(&self, participant_id: &str) -> ServiceResult<()>;

    async fn remove_participant(&self, participant_id: &str) -> ServiceResult<()>;

    async fn capabilities(&self) -> ServiceResult<CapabilitySet>;

    /// Fresh receivers for every push stream.
    fn events(&self) -> CallingEventStreams;
}

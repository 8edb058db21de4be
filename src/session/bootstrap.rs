//! Session start-up
//!
//! Before the stream is opened the preset's display name is fetched and the
//! backend is asked to load the preset's model. Neither call can stop the
//! session from starting.

use async_trait::async_trait;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

use super::controller::SessionController;
use super::{SessionEvent, SessionHandle, SessionUpdate};
use crate::api::{ActivationStatus, ApiClient, ApiError};
use crate::types::config::InvalidUrl;
use crate::types::ConsoleConfig;

/// REST calls a session needs before its stream opens
#[async_trait]
pub trait PresetBackend: Send + Sync {
    async fn fetch_display_name(&self, preset_id: i64) -> Result<String, ApiError>;

    async fn activate(&self, preset_id: i64) -> Result<ActivationStatus, ApiError>;
}

#[async_trait]
impl PresetBackend for ApiClient {
    async fn fetch_display_name(&self, preset_id: i64) -> Result<String, ApiError> {
        let preset = self.get_preset(preset_id).await?;
        Ok(preset.public_name().to_string())
    }

    async fn activate(&self, preset_id: i64) -> Result<ActivationStatus, ApiError> {
        self.activate_preset(preset_id).await
    }
}

/// A started session, ready to be driven
pub struct ChatSession {
    pub preset_id: i64,
    /// Header shown above the transcript
    pub display_name: String,
    /// `None` when the activation call failed
    pub activation: Option<ActivationStatus>,
    pub controller: SessionController,
    pub handle: SessionHandle,
    pub events: UnboundedReceiver<SessionEvent>,
}

impl ChatSession {
    /// Split into the parts the front end and the event loop need
    pub fn into_parts(
        self,
    ) -> (
        SessionController,
        SessionHandle,
        UnboundedReceiver<SessionEvent>,
    ) {
        (self.controller, self.handle, self.events)
    }
}

/// Run the prerequisite calls for `preset_id`, then start connecting
///
/// Only an unusable backend address is an error; REST failures degrade to
/// the fallback label and a warning.
pub async fn start_session<B: PresetBackend + ?Sized>(
    backend: &B,
    preset_id: i64,
    config: &ConsoleConfig,
    updates: UnboundedSender<SessionUpdate>,
) -> Result<ChatSession, InvalidUrl> {
    let endpoint = config.inference_ws_url()?;

    let display_name = match backend.fetch_display_name(preset_id).await {
        Ok(name) => name,
        Err(e) => {
            tracing::warn!("Failed to fetch preset {}: {}", preset_id, e);
            config.fallback_preset_label.clone()
        }
    };

    let activation = match backend.activate(preset_id).await {
        Ok(status) => {
            tracing::info!("Preset {} activation: {}", preset_id, status.status);
            Some(status)
        }
        Err(e) => {
            tracing::warn!("Failed to activate preset {}: {}", preset_id, e);
            None
        }
    };

    let (controller, handle, events) =
        SessionController::connect(endpoint.as_str(), config.watchdog_deadline(), updates);

    Ok(ChatSession {
        preset_id,
        display_name,
        activation,
        controller,
        handle,
        events,
    })
}

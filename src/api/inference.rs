//! Inference runtime endpoints
//!
//! The backend answers 200 with an `{"error": ...}` body for soft failures
//! (unknown preset, nothing loaded), so bodies are inspected, not just statuses.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{ApiClient, ApiError};

/// Reply of `POST /inference/load/{preset_id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivationStatus {
    /// `"loaded"` or `"preset updated"` when the call took effect
    pub status: String,
    #[serde(default)]
    pub model: Option<Value>,
    #[serde(default)]
    pub preset: Option<Value>,
}

/// The model currently held by the runtime
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentModel {
    pub id: i64,
    pub model_name: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Reply<T> {
    Failed { error: String },
    Ok(T),
}

impl<T> Reply<T> {
    fn into_result(self) -> Result<T, String> {
        match self {
            Reply::Failed { error } => Err(error),
            Reply::Ok(value) => Ok(value),
        }
    }
}

#[derive(Deserialize)]
struct StopReply {
    status: String,
}

impl ApiClient {
    /// Ask the backend to make this preset's model active
    pub async fn activate_preset(&self, preset_id: i64) -> Result<ActivationStatus, ApiError> {
        let reply: Reply<ActivationStatus> = self
            .post_empty(&format!("inference/load/{}", preset_id))
            .await?;
        reply.into_result().map_err(ApiError::Backend)
    }

    /// `None` when no model is loaded
    pub async fn current_model(&self) -> Result<Option<CurrentModel>, ApiError> {
        let reply: Reply<CurrentModel> = self.get_json("inference/current_model").await?;
        match reply.into_result() {
            Ok(model) => Ok(Some(model)),
            Err(reason) => {
                tracing::debug!("No current model: {}", reason);
                Ok(None)
            }
        }
    }

    pub async fn stop_model(&self) -> Result<String, ApiError> {
        let reply: StopReply = self.post_empty("inference/stop").await?;
        Ok(reply.status)
    }
}

//! Preset endpoints

use reqwest::Method;

use super::{ApiClient, ApiError};
use crate::types::{NewPreset, PresetRecord};

impl ApiClient {
    pub async fn list_presets(&self) -> Result<Vec<PresetRecord>, ApiError> {
        self.get_json("presets/").await
    }

    pub async fn get_preset(&self, id: i64) -> Result<PresetRecord, ApiError> {
        self.get_json(&format!("presets/{}", id)).await
    }

    /// The backend rejects presets whose model id is unknown (404)
    pub async fn create_preset(&self, preset: &NewPreset) -> Result<PresetRecord, ApiError> {
        self.send_json(Method::POST, "presets/", preset).await
    }

    pub async fn update_preset(&self, id: i64, preset: &NewPreset) -> Result<PresetRecord, ApiError> {
        self.send_json(Method::PUT, &format!("presets/{}", id), preset)
            .await
    }

    pub async fn delete_preset(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&format!("presets/{}", id)).await
    }
}

//! Model endpoints

use reqwest::Method;

use super::{ApiClient, ApiError};
use crate::types::{ModelRecord, NewModel};

impl ApiClient {
    pub async fn list_models(&self) -> Result<Vec<ModelRecord>, ApiError> {
        self.get_json("models/").await
    }

    pub async fn get_model(&self, id: i64) -> Result<ModelRecord, ApiError> {
        self.get_json(&format!("models/{}", id)).await
    }

    pub async fn model_exists(&self, id: i64) -> Result<bool, ApiError> {
        self.exists(&format!("models/{}", id)).await
    }

    /// The backend resolves the size from HuggingFace and answers 400 for unknown references
    pub async fn create_model(&self, model: &NewModel) -> Result<ModelRecord, ApiError> {
        self.send_json(Method::POST, "models/", model).await
    }

    pub async fn update_model(&self, id: i64, model: &NewModel) -> Result<ModelRecord, ApiError> {
        self.send_json(Method::PUT, &format!("models/{}", id), model)
            .await
    }

    pub async fn delete_model(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&format!("models/{}", id)).await
    }
}

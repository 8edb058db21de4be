//! Community catalog
//!
//! Presets shared on a remote catalog can be imported into the local backend,
//! and local presets can be exported to it. Either way the referenced model is
//! created on the receiving side first when it is missing there.

use std::collections::HashMap;

use reqwest::Method;

use super::{ApiClient, ApiError};
use crate::types::{ModelRecord, PresetRecord};

/// A catalog entry with its model name resolved for display
#[derive(Debug, Clone)]
pub struct CommunityPreset {
    pub preset: PresetRecord,
    pub model_name: String,
}

pub struct CommunityClient {
    remote: ApiClient,
}

impl CommunityClient {
    pub fn new(remote: ApiClient) -> Self {
        Self { remote }
    }

    pub fn remote(&self) -> &ApiClient {
        &self.remote
    }

    /// List catalog presets, resolving each distinct model once
    pub async fn list_presets(&self) -> Result<Vec<CommunityPreset>, ApiError> {
        let presets = self.remote.list_presets().await?;
        let mut names: HashMap<i64, String> = HashMap::new();

        let mut listed = Vec::with_capacity(presets.len());
        for preset in presets {
            let model_id = preset.model_id();
            if !names.contains_key(&model_id) {
                let name = match self.remote.get_model(model_id).await {
                    Ok(model) => model.model_name,
                    Err(e) => {
                        tracing::warn!("Community model {} unavailable: {}", model_id, e);
                        "Unknown".to_string()
                    }
                };
                names.insert(model_id, name);
            }
            let model_name = names.get(&model_id).cloned().unwrap_or_default();
            listed.push(CommunityPreset { preset, model_name });
        }
        Ok(listed)
    }

    /// Copy a catalog preset into the local backend
    ///
    /// A local model with the same name and reference is reused; otherwise the
    /// remote model is created locally first.
    pub async fn import_preset(
        &self,
        local: &ApiClient,
        preset: &PresetRecord,
    ) -> Result<PresetRecord, ApiError> {
        let remote_model = self.remote.get_model(preset.model_id()).await?;
        let local_models = local.list_models().await?;

        let target_model_id = match find_same_model(&local_models, &remote_model) {
            Some(existing) => {
                tracing::debug!("Reusing local model {} for import", existing.id);
                existing.id
            }
            None => {
                let created = local.create_model(&remote_model.to_new()).await?;
                tracing::info!("Created local model {} ({})", created.id, created.model_name);
                created.id
            }
        };

        let imported = local.create_preset(&preset.retarget(target_model_id)).await?;
        tracing::info!(
            "Imported community preset '{}' as local preset {}",
            imported.public_name(),
            imported.id
        );
        Ok(imported)
    }

    pub async fn import_preset_by_id(
        &self,
        local: &ApiClient,
        remote_preset_id: i64,
    ) -> Result<PresetRecord, ApiError> {
        let preset = self.remote.get_preset(remote_preset_id).await?;
        self.import_preset(local, &preset).await
    }

    /// Publish a local preset to the catalog
    ///
    /// The model is uploaded first when the catalog has no model under the
    /// preset's model id.
    pub async fn export_preset(
        &self,
        local: &ApiClient,
        local_preset_id: i64,
    ) -> Result<PresetRecord, ApiError> {
        let preset = local.get_preset(local_preset_id).await?;
        let model = local.get_model(preset.model_id()).await?;

        let target_model_id = if self.remote.model_exists(model.id).await? {
            model.id
        } else {
            let uploaded: ModelRecord = self
                .remote
                .send_json(Method::POST, "models/", &model.to_new())
                .await?;
            tracing::info!("Uploaded model '{}' to community", uploaded.model_name);
            uploaded.id
        };

        let published = self
            .remote
            .create_preset(&preset.retarget(target_model_id))
            .await?;
        tracing::info!("Exported preset '{}' to community", published.public_name());
        Ok(published)
    }
}

fn find_same_model<'a>(models: &'a [ModelRecord], wanted: &ModelRecord) -> Option<&'a ModelRecord> {
    models.iter().find(|m| m.same_model_as(wanted))
}

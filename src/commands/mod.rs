pub mod chat;
pub mod community;
pub mod config;
pub mod inference;
pub mod models;
pub mod presets;

use anyhow::{Context as _, Result};

use llm_manager::api::{ApiClient, CommunityClient};
use llm_manager::storage::settings::load_settings;
use llm_manager::types::ConsoleConfig;

pub use community::CommunityAction;
pub use config::ConfigAction;
pub use inference::InferenceAction;
pub use models::ModelAction;
pub use presets::PresetAction;

/// Settings and clients shared by every command
pub struct Context {
    pub config: ConsoleConfig,
    pub api: ApiClient,
}

impl Context {
    /// Load saved settings and apply command-line overrides
    pub fn load(base_url: Option<String>, community_url: Option<String>) -> Result<Self> {
        let mut config = load_settings();
        if let Some(url) = base_url {
            config.api_base_url = url;
        }
        if let Some(url) = community_url {
            config.community_base_url = url;
        }
        config.validate();

        let api = ApiClient::new(&config.api_base_url, config.request_timeout())
            .context("Invalid backend address")?;
        Ok(Self { config, api })
    }

    pub fn community(&self) -> Result<CommunityClient> {
        let remote = ApiClient::new(&self.config.community_base_url, self.config.request_timeout())
            .context("Invalid community catalog address")?;
        Ok(CommunityClient::new(remote))
    }
}

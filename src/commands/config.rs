use anyhow::{Context as _, Result};
use clap::Subcommand;

use llm_manager::storage::settings::save_settings;

use super::Context;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the effective settings
    Show,
    /// Persist the effective settings, including command-line overrides
    Save,
}

pub fn run(ctx: &Context, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let json = serde_json::to_string_pretty(&ctx.config)?;
            println!("{}", json);
            match ctx.config.inference_ws_url() {
                Ok(url) => println!("inference stream: {}", url),
                Err(e) => println!("inference stream: {}", e),
            }
        }
        ConfigAction::Save => {
            let path = save_settings(&ctx.config).context("Failed to save settings")?;
            println!("Saved settings to {}", path.display());
        }
    }
    Ok(())
}

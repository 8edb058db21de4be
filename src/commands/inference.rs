use anyhow::{Context as _, Result};
use clap::Subcommand;

use llm_manager::ui::tables;

use super::Context;

#[derive(Subcommand)]
pub enum InferenceAction {
    /// Show the loaded model
    Current,
    /// Unload the current model
    Stop,
    /// Load the model of a preset
    Load { preset_id: i64 },
}

pub async fn run(ctx: &Context, action: InferenceAction) -> Result<()> {
    match action {
        InferenceAction::Current => {
            let current = ctx
                .api
                .current_model()
                .await
                .context("Failed to query the inference runtime")?;
            print!("{}", tables::current_model_line(current.as_ref()));
        }
        InferenceAction::Stop => {
            let status = ctx.api.stop_model().await.context("Failed to stop the model")?;
            println!("{}", status);
        }
        InferenceAction::Load { preset_id } => {
            let activation = ctx
                .api
                .activate_preset(preset_id)
                .await
                .context("Failed to load preset")?;
            println!("Preset {}: {}", preset_id, activation.status);
        }
    }
    Ok(())
}

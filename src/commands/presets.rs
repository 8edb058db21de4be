use anyhow::{Context as _, Result};
use clap::{Args, Subcommand};

use llm_manager::types::NewPreset;
use llm_manager::ui::tables;

use super::Context;

#[derive(Subcommand)]
pub enum PresetAction {
    /// List all presets
    List,
    /// Show one preset
    Show { id: i64 },
    /// Create a preset
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        model_id: i64,
        #[command(flatten)]
        fields: PresetFields,
    },
    /// Change fields of a preset, keeping the others
    Update {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        model_id: Option<i64>,
        #[command(flatten)]
        fields: PresetFields,
    },
    /// Delete a preset
    Delete { id: i64 },
}

#[derive(Args)]
pub struct PresetFields {
    #[arg(long)]
    bot_name: Option<String>,
    #[arg(long)]
    task: Option<String>,
    #[arg(long)]
    constraints: Option<String>,
    #[arg(long)]
    temperature: Option<f64>,
    #[arg(long)]
    repetition_penalty: Option<f64>,
    #[arg(long)]
    top_p: Option<f64>,
    #[arg(long)]
    top_k: Option<f64>,
}

impl PresetFields {
    fn apply(self, preset: &mut NewPreset) {
        if let Some(v) = self.bot_name {
            preset.bot_name = v;
        }
        if let Some(v) = self.task {
            preset.task = v;
        }
        if let Some(v) = self.constraints {
            preset.costraints = v;
        }
        if let Some(v) = self.temperature {
            preset.temperature = v;
        }
        if let Some(v) = self.repetition_penalty {
            preset.repetition_penalty = v;
        }
        if let Some(v) = self.top_p {
            preset.top_p = v;
        }
        if let Some(v) = self.top_k {
            preset.top_k = v;
        }
    }
}

pub async fn run(ctx: &Context, action: PresetAction) -> Result<()> {
    match action {
        PresetAction::List => {
            let presets = ctx.api.list_presets().await.context("Failed to list presets")?;
            print!("{}", tables::presets_table(&presets));
        }
        PresetAction::Show { id } => {
            let preset = ctx.api.get_preset(id).await.context("Failed to fetch preset")?;
            print!("{}", tables::preset_detail(&preset));
        }
        PresetAction::Create {
            name,
            model_id,
            fields,
        } => {
            let mut preset = NewPreset::new(name, model_id);
            fields.apply(&mut preset);
            let created = ctx
                .api
                .create_preset(&preset)
                .await
                .context("Failed to create preset")?;
            println!("Created preset {} ({})", created.id, created.public_name());
        }
        PresetAction::Update {
            id,
            name,
            model_id,
            fields,
        } => {
            let mut preset = ctx
                .api
                .get_preset(id)
                .await
                .context("Failed to fetch preset")?
                .fields;
            if let Some(name) = name {
                preset.public_name = name;
            }
            if let Some(model_id) = model_id {
                preset.model_id = model_id;
            }
            fields.apply(&mut preset);
            let updated = ctx
                .api
                .update_preset(id, &preset)
                .await
                .context("Failed to update preset")?;
            print!("{}", tables::preset_detail(&updated));
        }
        PresetAction::Delete { id } => {
            ctx.api.delete_preset(id).await.context("Failed to delete preset")?;
            println!("Deleted preset {}", id);
        }
    }
    Ok(())
}

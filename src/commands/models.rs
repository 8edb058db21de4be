use anyhow::{Context as _, Result};
use clap::Subcommand;

use llm_manager::types::NewModel;
use llm_manager::ui::tables;

use super::Context;

#[derive(Subcommand)]
pub enum ModelAction {
    /// List all models
    List,
    /// Show one model
    Show { id: i64 },
    /// Register a HuggingFace model
    Create {
        #[arg(long)]
        name: String,
        /// HuggingFace repository, e.g. `org/model-GGUF`
        #[arg(long)]
        reference: String,
    },
    /// Rename a model or change its reference
    Update {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        reference: Option<String>,
    },
    /// Delete a model
    Delete { id: i64 },
}

pub async fn run(ctx: &Context, action: ModelAction) -> Result<()> {
    match action {
        ModelAction::List => {
            let models = ctx.api.list_models().await.context("Failed to list models")?;
            print!("{}", tables::models_table(&models));
        }
        ModelAction::Show { id } => {
            let model = ctx.api.get_model(id).await.context("Failed to fetch model")?;
            print!("{}", tables::model_detail(&model));
        }
        ModelAction::Create { name, reference } => {
            let model = NewModel {
                model_name: name,
                huggin_face_refference: reference,
            };
            let created = ctx
                .api
                .create_model(&model)
                .await
                .context("Failed to create model")?;
            print!("{}", tables::model_detail(&created));
        }
        ModelAction::Update {
            id,
            name,
            reference,
        } => {
            let mut model = ctx
                .api
                .get_model(id)
                .await
                .context("Failed to fetch model")?
                .to_new();
            if let Some(name) = name {
                model.model_name = name;
            }
            if let Some(reference) = reference {
                model.huggin_face_refference = reference;
            }
            let updated = ctx
                .api
                .update_model(id, &model)
                .await
                .context("Failed to update model")?;
            print!("{}", tables::model_detail(&updated));
        }
        ModelAction::Delete { id } => {
            ctx.api.delete_model(id).await.context("Failed to delete model")?;
            println!("Deleted model {}", id);
        }
    }
    Ok(())
}

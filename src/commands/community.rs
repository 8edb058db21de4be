use anyhow::{Context as _, Result};
use clap::Subcommand;

use llm_manager::ui::tables;

use super::Context;

#[derive(Subcommand)]
pub enum CommunityAction {
    /// List presets in the catalog
    List,
    /// Copy a catalog preset into the local backend
    Import { remote_id: i64 },
    /// Publish a local preset to the catalog
    Export { local_id: i64 },
}

pub async fn run(ctx: &Context, action: CommunityAction) -> Result<()> {
    let community = ctx.community()?;

    match action {
        CommunityAction::List => {
            let presets = community
                .list_presets()
                .await
                .context("Failed to list community presets")?;
            print!("{}", tables::community_table(&presets));
        }
        CommunityAction::Import { remote_id } => {
            let imported = community
                .import_preset_by_id(&ctx.api, remote_id)
                .await
                .context("Import failed")?;
            println!(
                "Imported '{}' as local preset {}",
                imported.public_name(),
                imported.id
            );
        }
        CommunityAction::Export { local_id } => {
            let published = community
                .export_preset(&ctx.api, local_id)
                .await
                .context("Export failed")?;
            println!(
                "Published '{}' as community preset {}",
                published.public_name(),
                published.id
            );
        }
    }
    Ok(())
}

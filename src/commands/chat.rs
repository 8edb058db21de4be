use anyhow::{Context as _, Result};
use tokio::io::BufReader;
use tokio::sync::mpsc;

use llm_manager::session::start_session;
use llm_manager::types::Role;
use llm_manager::ui::run_chat;

use super::Context;

pub async fn run(ctx: &Context, preset_id: i64) -> Result<()> {
    let (updates_tx, updates_rx) = mpsc::unbounded_channel();
    let session = start_session(&ctx.api, preset_id, &ctx.config, updates_tx)
        .await
        .context("Cannot start chat session")?;

    let transcript = run_chat(
        session,
        updates_rx,
        BufReader::new(tokio::io::stdin()),
        std::io::stdout(),
    )
    .await
    .context("Chat output failed")?;

    let replies = transcript
        .messages()
        .iter()
        .filter(|m| m.role == Role::Assistant)
        .count();
    tracing::info!("Chat ended after {} replies", replies);
    Ok(())
}

//! Chat view
//!
//! Drives one session in the terminal: stdin lines become submits, session
//! updates are drawn as they arrive. A line is read only while input is
//! unlocked, so lines typed or piped ahead wait for the current reply.

pub mod input;
pub mod message;

use std::io::Write;

use tokio::io::AsyncBufRead;
use tokio::sync::mpsc::{self, UnboundedReceiver};

use crate::session::{ChatSession, SessionUpdate, Transcript};
use input::forward_input;
use message::{Flow, MessageRenderer};

/// Run the chat until the user quits or the stream becomes unusable
///
/// Returns the final transcript.
pub async fn run_chat<R, W>(
    session: ChatSession,
    mut updates: UnboundedReceiver<SessionUpdate>,
    reader: R,
    out: W,
) -> std::io::Result<Transcript>
where
    R: AsyncBufRead + Unpin + Send + 'static,
    W: Write,
{
    let mut renderer = MessageRenderer::new(out);
    renderer.header(&session.display_name)?;

    let (controller, handle, events) = session.into_parts();
    let session_task = tokio::spawn(controller.run(events));
    let (turns_tx, turns_rx) = mpsc::unbounded_channel();
    let input_task = tokio::spawn(forward_input(reader, handle.clone(), turns_rx));

    while let Some(update) = updates.recv().await {
        let flow = renderer.render(&update)?;
        if update == SessionUpdate::InputUnlocked {
            let _ = turns_tx.send(());
        }
        if flow == Flow::Stop {
            break;
        }
    }

    handle.teardown();
    input_task.abort();

    match session_task.await {
        Ok(transcript) => Ok(transcript),
        Err(e) => {
            tracing::error!("Session task failed: {}", e);
            Ok(Transcript::new())
        }
    }
}

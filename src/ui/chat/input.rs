//! Line input for the chat view

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc::UnboundedReceiver;

use crate::session::SessionHandle;

/// One line typed by the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputLine {
    Submit(String),
    Quit,
    Blank,
}

pub fn parse_line(line: &str) -> InputLine {
    let trimmed = line.trim();
    match trimmed {
        "" => InputLine::Blank,
        "/quit" | "/exit" | "/q" => InputLine::Quit,
        _ => InputLine::Submit(trimmed.to_string()),
    }
}

/// Forward typed lines to the session until quit or end of input
///
/// A line is read only after the session has granted a turn through
/// `turns` (one per input unlock), so piped input waits for the connection
/// and for each reply. End of input tears the session down once the last
/// reply has finished. Returns the number of submits forwarded.
pub async fn forward_input<R>(
    reader: R,
    handle: SessionHandle,
    mut turns: UnboundedReceiver<()>,
) -> usize
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut forwarded = 0;

    'turns: while turns.recv().await.is_some() {
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => match parse_line(&line) {
                    InputLine::Submit(text) => {
                        if !handle.submit(text) {
                            break 'turns;
                        }
                        forwarded += 1;
                        break;
                    }
                    InputLine::Quit => break 'turns,
                    InputLine::Blank => {}
                },
                Ok(None) => break 'turns,
                Err(e) => {
                    tracing::warn!("Failed to read input: {}", e);
                    break 'turns;
                }
            }
        }
    }

    handle.teardown();
    forwarded
}

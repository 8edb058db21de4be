//! Transcript rendering for the terminal
//!
//! Replies are printed as they stream: the assistant prefix when the
//! placeholder appears, then each applied fragment in place.

use std::io::{self, Write};

use crate::session::SessionUpdate;
use crate::types::{Message, Role};

pub const PROMPT: &str = "you> ";

/// What the chat loop should do after an update was drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// The session cannot be used any more
    Stop,
}

pub struct MessageRenderer<W: Write> {
    out: W,
    /// A reply line is open and has not been terminated yet
    mid_reply: bool,
    input_locked: bool,
}

impl<W: Write> MessageRenderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            mid_reply: false,
            input_locked: true,
        }
    }

    pub fn input_locked(&self) -> bool {
        self.input_locked
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn end_reply_line(&mut self) -> io::Result<()> {
        if self.mid_reply {
            writeln!(self.out)?;
            self.mid_reply = false;
        }
        Ok(())
    }

    pub fn header(&mut self, display_name: &str) -> io::Result<()> {
        writeln!(self.out, "=== {} ===", display_name)?;
        writeln!(self.out, "Type a message and press Enter. /quit leaves the chat.")?;
        self.out.flush()
    }

    fn message(&mut self, message: &Message) -> io::Result<()> {
        match message.role {
            // Already visible as the line the user typed
            Role::User => Ok(()),
            Role::Assistant => {
                self.end_reply_line()?;
                write!(self.out, "{}> {}", message.role.label(), message.content)?;
                self.mid_reply = true;
                Ok(())
            }
        }
    }

    pub fn render(&mut self, update: &SessionUpdate) -> io::Result<Flow> {
        let flow = match update {
            SessionUpdate::Connected => {
                writeln!(self.out, "[connected]")?;
                Flow::Continue
            }
            SessionUpdate::ConnectionFailed(reason) => {
                self.end_reply_line()?;
                writeln!(self.out, "[error] could not reach the inference stream: {}", reason)?;
                Flow::Stop
            }
            SessionUpdate::Disconnected => {
                self.end_reply_line()?;
                writeln!(self.out, "[disconnected by backend]")?;
                Flow::Stop
            }
            SessionUpdate::MessageAppended { message, .. } => {
                self.message(message)?;
                Flow::Continue
            }
            SessionUpdate::ReplyExtended { fragment, .. } => {
                write!(self.out, "{}", fragment)?;
                Flow::Continue
            }
            SessionUpdate::InputLocked => {
                self.input_locked = true;
                Flow::Continue
            }
            SessionUpdate::InputUnlocked => {
                self.input_locked = false;
                self.end_reply_line()?;
                write!(self.out, "{}", PROMPT)?;
                Flow::Continue
            }
            SessionUpdate::Closed => {
                self.end_reply_line()?;
                Flow::Stop
            }
        };
        self.out.flush()?;
        Ok(flow)
    }
}

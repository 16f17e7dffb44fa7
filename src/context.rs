//! Chat surface context.
//!
//! DESIGN
//! ======
//! `ChatContext` owns everything a chat handler touches: the outbound side of
//! the connection, the credential store, and the message list. The event loop
//! in `main` is its only caller, so handlers take `&mut self` and no locking
//! is involved.

#[cfg(test)]
#[path = "context_test.rs"]
mod context_test;

use tracing::{debug, info};

use crate::config::TimestampStyle;
use crate::error::ClientError;
use crate::net::socket::{ConnectionEvent, Outbound};
use crate::services::commands::{self, Input, LocalCommand};
use crate::services::session::{self, Surface};
use crate::state::credentials::CredentialStore;
use crate::state::messages::MessageList;

/// What a submitted line did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dispatch {
    /// Blank input.
    Ignored,
    /// Handed to the connection.
    Sent,
    /// Not connected; the text was discarded.
    Dropped,
    /// Handled entirely client-side.
    Local,
    /// Leave the chat surface.
    Redirect(Surface),
}

pub struct ChatContext<O, S> {
    outbound: O,
    store: S,
    list: MessageList,
}

impl<O: Outbound, S: CredentialStore> ChatContext<O, S> {
    #[must_use]
    pub fn new(outbound: O, store: S, timestamp_style: TimestampStyle) -> Self {
        Self { outbound, store, list: MessageList::new(timestamp_style) }
    }

    #[must_use]
    pub fn list(&self) -> &MessageList {
        &self.list
    }

    #[must_use]
    pub fn outbound(&self) -> &O {
        &self.outbound
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn handle_event(&mut self, event: ConnectionEvent) {
        match event {
            ConnectionEvent::Connected => info!("chat connected"),
            ConnectionEvent::Disconnected => info!("chat disconnected; reconnecting"),
            ConnectionEvent::Backlog(backlog) => {
                debug!(count = backlog.messages.len(), "rendering backlog");
                self.list.render_backlog(&backlog);
            }
            ConnectionEvent::Inbound(message) => self.list.render_inbound(&message),
        }
    }

    /// Handle the committed input line. `input` is emptied whatever happens.
    ///
    /// Plain text is only sent; it shows up in the list once the server
    /// echoes it back.
    ///
    /// # Errors
    ///
    /// Credential store failures during `/logout`.
    pub fn submit(&mut self, input: &mut String) -> Result<Dispatch, ClientError> {
        let line = std::mem::take(input);
        match commands::parse_input(&line) {
            Input::Empty => Ok(Dispatch::Ignored),
            Input::Send(text) => {
                if self.outbound.send(&text) {
                    Ok(Dispatch::Sent)
                } else {
                    Ok(Dispatch::Dropped)
                }
            }
            Input::Local(command) => self.run_local(command),
        }
    }

    fn run_local(&mut self, command: LocalCommand) -> Result<Dispatch, ClientError> {
        match command {
            LocalCommand::Logout => return Ok(Dispatch::Redirect(session::logout(&mut self.store)?)),
            LocalCommand::Clear => self.list.clear(),
            LocalCommand::Color(value) => {
                let text = commands::color_confirmation(&value);
                self.list.push_local(text, Some(value));
            }
            LocalCommand::Help => self.list.push_local(commands::HELP_TEXT, None),
            LocalCommand::Invalid(text) => {
                debug!(command = %text, "unknown local command");
                self.list.push_local(commands::INVALID_COMMAND, None);
            }
        }
        Ok(Dispatch::Local)
    }
}

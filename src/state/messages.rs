//! Rendered message list.
//!
//! DESIGN
//! ======
//! `MessageList` is the on-screen transcript: an append-only sequence of
//! formatted entries plus a scroll anchor. Entries appear in exactly the
//! order events arrive (backlog first, then live messages); nothing is
//! reordered or deduplicated. Every append anchors the view at the bottom,
//! `clear` empties it and anchors at the top.
//!
//! The terminal front end reads the list through `entries` and `generation`;
//! the list itself never touches stdout.

#[cfg(test)]
#[path = "messages_test.rs"]
mod messages_test;

use crate::config::TimestampStyle;
use crate::net::types::{Backlog, Message};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryKind {
    /// `<author> at <timestamp>: <text>`
    Chat,
    /// Server notice rendered as bare text.
    Notice,
    /// Produced client-side by a local command.
    Local,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry {
    pub text: String,
    pub kind: EntryKind,
    /// CSS colour value requested by `/color`.
    pub color: Option<String>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Scroll {
    #[default]
    Top,
    Bottom,
}

#[derive(Debug, Default)]
pub struct MessageList {
    entries: Vec<Entry>,
    scroll: Scroll,
    timestamp_style: TimestampStyle,
    generation: u64,
}

impl MessageList {
    #[must_use]
    pub fn new(timestamp_style: TimestampStyle) -> Self {
        Self { timestamp_style, ..Self::default() }
    }

    #[must_use]
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    #[must_use]
    pub fn scroll(&self) -> Scroll {
        self.scroll
    }

    /// Bumped by every `clear`, so a reader can tell a refilled list from
    /// one that only grew.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Append the backlog oldest first, each as a chat line.
    pub fn render_backlog(&mut self, backlog: &Backlog) {
        for message in &backlog.messages {
            let text = format_chat(message, self.timestamp_style);
            self.entries.push(Entry { text, kind: EntryKind::Chat, color: None });
        }
        self.scroll = Scroll::Bottom;
    }

    /// Append one live message. Notices drop the author and timestamp.
    pub fn render_inbound(&mut self, message: &Message) {
        let entry = if message.kind.is_notice() {
            Entry { text: message.message.clone(), kind: EntryKind::Notice, color: None }
        } else {
            Entry { text: format_chat(message, self.timestamp_style), kind: EntryKind::Chat, color: None }
        };
        self.push(entry);
    }

    /// Append a client-side line.
    pub fn push_local(&mut self, text: impl Into<String>, color: Option<String>) {
        self.push(Entry { text: text.into(), kind: EntryKind::Local, color });
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.scroll = Scroll::Top;
        self.generation = self.generation.wrapping_add(1);
    }

    fn push(&mut self, entry: Entry) {
        self.entries.push(entry);
        self.scroll = Scroll::Bottom;
    }
}

#[must_use]
pub fn format_chat(message: &Message, style: TimestampStyle) -> String {
    format!(
        "{} at {}: {}",
        message.author_name(),
        format_timestamp(&message.timestamp, style),
        message.message
    )
}

/// `TimeOfDay` keeps what follows the first space (`10:00:00` of
/// `2024-01-01 10:00:00`); strings without a date part pass through.
#[must_use]
pub fn format_timestamp(timestamp: &str, style: TimestampStyle) -> &str {
    match style {
        TimestampStyle::Full => timestamp,
        TimestampStyle::TimeOfDay => timestamp.split_once(' ').map_or(timestamp, |(_, time)| time),
    }
}

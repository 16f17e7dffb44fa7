use super::*;
use std::cell::RefCell;

use crate::net::types::{Author, Backlog, Message, MessageKind};
use crate::state::credentials::MemoryStore;
use crate::state::messages::EntryKind;

#[derive(Default)]
struct Recorder {
    sent: RefCell<Vec<String>>,
    offline: bool,
}

impl Outbound for Recorder {
    fn send(&self, text: &str) -> bool {
        if self.offline {
            return false;
        }
        self.sent.borrow_mut().push(text.to_owned());
        true
    }
}

fn context() -> ChatContext<Recorder, MemoryStore> {
    let mut store = MemoryStore::new();
    store.set("abc").unwrap();
    ChatContext::new(Recorder::default(), store, TimestampStyle::Full)
}

fn submit(ctx: &mut ChatContext<Recorder, MemoryStore>, line: &str) -> Dispatch {
    let mut input = line.to_owned();
    let outcome = ctx.submit(&mut input).unwrap();
    assert!(input.is_empty(), "input should be cleared after {line:?}");
    outcome
}

fn chat(author: &str, text: &str) -> Message {
    Message {
        id: None,
        author: Author::Name(author.into()),
        username: None,
        message: text.into(),
        timestamp: "2024-01-01 10:00:00".into(),
        kind: MessageKind::Normal,
        channel: None,
        ephemeral: false,
    }
}

// =============================================================
// Outbound dispatch
// =============================================================

#[test]
fn plain_text_sends_once_and_leaves_list_alone() {
    let mut ctx = context();
    assert_eq!(submit(&mut ctx, "hello"), Dispatch::Sent);
    assert_eq!(*ctx.outbound().sent.borrow(), vec!["hello".to_owned()]);
    assert!(ctx.list().entries().is_empty());
}

#[test]
fn offline_send_reports_dropped() {
    let mut ctx = ChatContext::new(Recorder { offline: true, ..Recorder::default() }, MemoryStore::new(), TimestampStyle::Full);
    assert_eq!(submit(&mut ctx, "hello"), Dispatch::Dropped);
    assert!(ctx.list().entries().is_empty());
}

#[test]
fn blank_line_is_ignored() {
    let mut ctx = context();
    assert_eq!(submit(&mut ctx, "   "), Dispatch::Ignored);
    assert!(ctx.outbound().sent.borrow().is_empty());
}

#[test]
fn color_renders_styled_confirmation_without_sending() {
    let mut ctx = context();
    assert_eq!(submit(&mut ctx, "/color red"), Dispatch::Local);
    assert!(ctx.outbound().sent.borrow().is_empty());

    let entry = &ctx.list().entries()[0];
    assert_eq!(entry.text, "Changed color to red");
    assert_eq!(entry.color.as_deref(), Some("red"));
    assert_eq!(entry.kind, EntryKind::Local);
}

#[test]
fn logout_clears_token_and_redirects_without_sending() {
    let mut ctx = context();
    assert_eq!(submit(&mut ctx, "/logout"), Dispatch::Redirect(Surface::Login));
    assert_eq!(ctx.store().get().unwrap(), None);
    assert!(ctx.outbound().sent.borrow().is_empty());
}

#[test]
fn clear_empties_rendered_list() {
    let mut ctx = context();
    ctx.handle_event(ConnectionEvent::Inbound(chat("alice", "hi")));
    assert_eq!(submit(&mut ctx, "/clear"), Dispatch::Local);
    assert!(ctx.list().entries().is_empty());
}

#[test]
fn help_and_invalid_render_locally() {
    let mut ctx = context();
    submit(&mut ctx, "/help");
    submit(&mut ctx, "/nope");
    let texts: Vec<&str> = ctx.list().entries().iter().map(|e| e.text.as_str()).collect();
    assert_eq!(texts, vec![commands::HELP_TEXT, commands::INVALID_COMMAND]);
    assert!(ctx.outbound().sent.borrow().is_empty());
}

// =============================================================
// Inbound events
// =============================================================

#[test]
fn backlog_then_inbound_render_in_order() {
    let mut ctx = context();
    ctx.handle_event(ConnectionEvent::Connected);
    ctx.handle_event(ConnectionEvent::Backlog(Backlog { messages: vec![chat("alice", "old")] }));
    ctx.handle_event(ConnectionEvent::Inbound(chat("bob", "new")));
    ctx.handle_event(ConnectionEvent::Disconnected);

    let texts: Vec<&str> = ctx.list().entries().iter().map(|e| e.text.as_str()).collect();
    assert_eq!(
        texts,
        vec!["alice at 2024-01-01 10:00:00: old", "bob at 2024-01-01 10:00:00: new"]
    );
}

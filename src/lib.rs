//! Terminal chat client.
//!
//! SYSTEM CONTEXT
//! ==============
//! `services::session` decides which surface runs (login, signup, chat);
//! on the chat surface `net::socket` keeps one authenticated websocket open,
//! `context::ChatContext` applies connection events and submitted lines to
//! `state::messages::MessageList`, and `terminal` prints the list.

pub mod config;
pub mod context;
pub mod error;
pub mod net;
pub mod prompt;
pub mod services;
pub mod state;
pub mod terminal;

//! Networking: REST calls and the realtime websocket.
//!
//! SYSTEM CONTEXT
//! ==============
//! `api` handles login/signup/validate, `socket` owns the websocket
//! lifecycle, `wire` is its JSON envelope, `backoff` its reconnect schedule,
//! and `types` the message records the server pushes.

pub mod api;
pub mod backoff;
pub mod socket;
pub mod types;
pub mod wire;

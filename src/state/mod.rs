//! Client-side state: the stored session token and the rendered transcript.

pub mod credentials;
pub mod messages;

//! Wire DTOs pushed by the message server.
//!
//! DESIGN
//! ======
//! The server is the only producer of these records; the client reads them
//! and never mutates them. Decoding is lenient about optional fields so
//! older and newer server revisions both render.
//!
//! Message kinds are canonical string tags (`message`, `command`, `error`,
//! `user_connect`, `user_disconnect`). Servers that send numeric kinds are
//! mapped by position in that list (`0..=4`).

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use serde::{Deserialize, Deserializer, Serialize};

/// Public profile attached to messages authored by a registered user.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub username: String,
    #[serde(default)]
    pub displayname: Option<String>,
    #[serde(default)]
    pub permissions: Option<u64>,
    #[serde(default)]
    pub creation_date: Option<String>,
}

/// Message author: a structured user or a raw name such as `"Server"`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Author {
    User(UserRecord),
    Name(String),
}

impl Default for Author {
    fn default() -> Self {
        Self::Name(String::new())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize)]
pub enum MessageKind {
    /// Ordinary chat line.
    #[default]
    #[serde(rename = "message")]
    Normal,
    #[serde(rename = "command")]
    Command,
    #[serde(rename = "error")]
    Error,
    #[serde(rename = "user_connect")]
    UserConnect,
    #[serde(rename = "user_disconnect")]
    UserDisconnect,
}

impl MessageKind {
    const ORDER: [Self; 5] = [Self::Normal, Self::Command, Self::Error, Self::UserConnect, Self::UserDisconnect];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "message",
            Self::Command => "command",
            Self::Error => "error",
            Self::UserConnect => "user_connect",
            Self::UserDisconnect => "user_disconnect",
        }
    }

    /// System notices render as bare text, without author or timestamp.
    #[must_use]
    pub fn is_notice(self) -> bool {
        !matches!(self, Self::Normal)
    }

    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "normal" => Some(Self::Normal),
            tag => Self::ORDER.into_iter().find(|kind| kind.as_str() == tag),
        }
    }

    #[must_use]
    pub fn from_code(code: u64) -> Option<Self> {
        usize::try_from(code).ok().and_then(|idx| Self::ORDER.get(idx).copied())
    }
}

impl<'de> Deserialize<'de> for MessageKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Tag(String),
            Code(u64),
        }

        // Unknown kinds still carry readable text, so they render as chat.
        let kind = match Raw::deserialize(deserializer)? {
            Raw::Tag(tag) => Self::from_tag(&tag),
            Raw::Code(code) => Self::from_code(code),
        };
        Ok(kind.unwrap_or_default())
    }
}

/// A single chat message as delivered by `message` and `previous_messages`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub author: Author,
    /// Top-level username some server revisions send alongside `author`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    pub message: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default, rename = "type")]
    pub kind: MessageKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    #[serde(default)]
    pub ephemeral: bool,
}

impl Message {
    /// Name shown for the author: the user's display name when present,
    /// otherwise a username, otherwise the raw author string.
    #[must_use]
    pub fn author_name(&self) -> &str {
        match &self.author {
            Author::User(user) => {
                if let Some(name) = user.displayname.as_deref().filter(|n| !n.is_empty()) {
                    return name;
                }
                self.username
                    .as_deref()
                    .filter(|n| !n.is_empty())
                    .unwrap_or(&user.username)
            }
            Author::Name(name) if name.is_empty() => self.username.as_deref().unwrap_or_default(),
            Author::Name(name) => name,
        }
    }
}

/// Payload of the `previous_messages` event, oldest first.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Backlog {
    #[serde(default)]
    pub messages: Vec<Message>,
}

//! Input line classification.
//!
//! A trimmed line starting with `/` is a local command and never leaves the
//! client. Everything else, including server-side `~` commands, is sent
//! verbatim.

#[cfg(test)]
#[path = "commands_test.rs"]
mod commands_test;

pub const COMMAND_PREFIX: char = '/';

pub const INVALID_COMMAND: &str =
    "Invalid command. Type /help for a list of client-side commands or ~help for a list of server-wide commands.";

pub const HELP_TEXT: &str = "Commands:
logout - /logout - logs the user out
clear - /clear - empties the on-screen messages
color - /color <css color> - shows a confirmation line in that color
help - /help - shows this list of commands";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LocalCommand {
    Logout,
    Clear,
    Color(String),
    Help,
    /// Unrecognised command text, without the prefix.
    Invalid(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Input {
    /// Blank line; nothing to do.
    Empty,
    Local(LocalCommand),
    /// Text for the server, exactly as typed.
    Send(String),
}

#[must_use]
pub fn parse_input(raw: &str) -> Input {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Input::Empty;
    }
    match trimmed.strip_prefix(COMMAND_PREFIX) {
        Some(command) => Input::Local(parse_command(command)),
        None => Input::Send(raw.to_owned()),
    }
}

fn parse_command(command: &str) -> LocalCommand {
    let (name, args) = command
        .split_once(char::is_whitespace)
        .map_or((command, ""), |(name, args)| (name, args.trim()));

    match (name, args) {
        ("logout", "") => LocalCommand::Logout,
        ("clear", "") => LocalCommand::Clear,
        ("help", "") => LocalCommand::Help,
        ("color", value) if !value.is_empty() => LocalCommand::Color(value.to_owned()),
        _ => LocalCommand::Invalid(command.to_owned()),
    }
}

#[must_use]
pub fn color_confirmation(value: &str) -> String {
    format!("Changed color to {value}")
}

//! Prints the message list to a terminal.
//!
//! `TerminalView` remembers how much of the list it has already written and
//! only appends what is new, so "scroll to the latest entry" is simply the
//! terminal's own behaviour. A `clear` in the list (new generation) clears
//! the screen and reprints whatever the list holds now.

#[cfg(test)]
#[path = "terminal_test.rs"]
mod terminal_test;

use std::io::{self, Write};

use crossterm::cursor::MoveTo;
use crossterm::queue;
use crossterm::style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor};
use crossterm::terminal::{Clear, ClearType};

use crate::state::messages::{Entry, EntryKind, MessageList};

pub struct TerminalView<W> {
    out: W,
    ansi: bool,
    printed: usize,
    generation: u64,
}

impl<W: Write> TerminalView<W> {
    pub fn new(out: W, ansi: bool) -> Self {
        Self { out, ansi, printed: 0, generation: 0 }
    }

    /// Write entries added since the last sync.
    ///
    /// # Errors
    ///
    /// Write failures on the underlying stream.
    pub fn sync(&mut self, list: &MessageList) -> io::Result<()> {
        if list.generation() != self.generation {
            self.generation = list.generation();
            self.printed = 0;
            if self.ansi {
                queue!(self.out, Clear(ClearType::All), MoveTo(0, 0))?;
            }
        }

        for entry in list.entries().iter().skip(self.printed) {
            self.write_entry(entry)?;
        }
        self.printed = list.entries().len();
        self.out.flush()
    }

    fn write_entry(&mut self, entry: &Entry) -> io::Result<()> {
        let color = entry.color.as_deref().and_then(css_color);
        match (self.ansi, color, entry.kind) {
            (true, Some(color), _) => queue!(self.out, SetForegroundColor(color), Print(&entry.text), ResetColor)?,
            (true, None, EntryKind::Notice) => queue!(
                self.out,
                SetAttribute(Attribute::Dim),
                Print(&entry.text),
                SetAttribute(Attribute::Reset)
            )?,
            _ => queue!(self.out, Print(&entry.text))?,
        }
        writeln!(self.out)
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Terminal colour for a CSS colour value: `#rgb`, `#rrggbb`, `rgb(r, g, b)`
/// or one of the basic colour names. `None` when not understood.
#[must_use]
pub fn css_color(value: &str) -> Option<Color> {
    let value = value.trim().to_ascii_lowercase();
    if let Some(hex) = value.strip_prefix('#') {
        return parse_hex(hex);
    }
    if let Some(args) = value.strip_prefix("rgb(").and_then(|v| v.strip_suffix(')')) {
        return parse_rgb_args(args);
    }
    Color::try_from(value.replace("gray", "grey").as_str()).ok()
}

fn parse_hex(hex: &str) -> Option<Color> {
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    let (r, g, b) = match hex.len() {
        3 => {
            let mut out = [0_u8; 3];
            for (slot, digit) in out.iter_mut().zip(hex.chars()) {
                *slot = u8::try_from(digit.to_digit(16)?).ok()? * 17;
            }
            (out[0], out[1], out[2])
        }
        6 => (channel(hex.get(0..2)?)?, channel(hex.get(2..4)?)?, channel(hex.get(4..6)?)?),
        _ => return None,
    };
    Some(Color::Rgb { r, g, b })
}

fn parse_rgb_args(args: &str) -> Option<Color> {
    let channels: Vec<u8> = args.split(',').map(|c| c.trim().parse().ok()).collect::<Option<_>>()?;
    match channels[..] {
        [r, g, b] => Some(Color::Rgb { r, g, b }),
        _ => None,
    }
}

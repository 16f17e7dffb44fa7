//! Line prompts for the login and signup surfaces.
//!
//! Plain answers come from an async line reader. Secrets are read with
//! terminal echo off through `rpassword` when the input is a terminal; piped
//! input (scripts, tests) is read as an ordinary line.

#[cfg(test)]
#[path = "prompt_test.rs"]
mod prompt_test;

use std::io::{self, IsTerminal, Write};

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines, Stdin};

use crate::error::ClientError;

pub struct Prompt<R> {
    lines: Lines<R>,
    interactive: bool,
}

impl Prompt<BufReader<Stdin>> {
    /// Prompt over the process stdin; secrets are hidden when it is a terminal.
    #[must_use]
    pub fn stdin() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()), io::stdin().is_terminal())
    }
}

impl<R: AsyncBufRead + Unpin> Prompt<R> {
    #[must_use]
    pub fn new(reader: R, interactive: bool) -> Self {
        Self { lines: reader.lines(), interactive }
    }

    /// Next input line, `None` at end of input. Cancel safe, so it can sit in
    /// a `select!` next to the connection events.
    ///
    /// # Errors
    ///
    /// Read failures on the input.
    pub async fn next_line(&mut self) -> Result<Option<String>, ClientError> {
        Ok(self.lines.next_line().await?)
    }

    /// Print `label` and read one line; `None` at end of input.
    ///
    /// # Errors
    ///
    /// Read or write failures on the terminal.
    pub async fn ask(&mut self, label: &str) -> Result<Option<String>, ClientError> {
        print!("{label}");
        io::stdout().flush()?;
        self.next_line().await
    }

    /// Like [`Prompt::ask`], without echoing what is typed.
    ///
    /// # Errors
    ///
    /// Read or write failures on the terminal.
    pub async fn ask_secret(&mut self, label: &str) -> Result<Option<String>, ClientError> {
        if !self.interactive {
            return self.ask(label).await;
        }
        let label = label.to_owned();
        let secret = tokio::task::spawn_blocking(move || rpassword::prompt_password(label))
            .await
            .map_err(io::Error::other)??;
        Ok(Some(secret))
    }
}

// src/display/terminal.rs
//! Terminal rendering of status lines

use super::MAX_LINES;
use crate::error::Result;
use crossterm::{
    execute,
    style::{Color, Print, ResetColor, SetForegroundColor},
};
use std::io::{self, Write};

/// How the first line of a block should be highlighted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Good,
    Warning,
    Error,
}

impl Tone {
    /// Tone for a persisted status label
    pub fn for_status(status: &str) -> Self {
        if status == "fix" {
            Tone::Good
        } else if status.starts_with("transport_error") {
            Tone::Error
        } else {
            Tone::Warning
        }
    }

    fn color(self) -> Color {
        match self {
            Tone::Good => Color::Green,
            Tone::Warning => Color::Yellow,
            Tone::Error => Color::Red,
        }
    }
}

pub struct TerminalDisplay;

impl TerminalDisplay {
    pub fn new() -> Self {
        Self
    }

    /// Print up to `MAX_LINES` lines to stdout, the first one coloured
    pub fn show(&self, lines: &[String], tone: Tone) -> Result<()> {
        let mut stdout = io::stdout();
        self.render(&mut stdout, lines, tone)?;
        stdout.flush()?;
        Ok(())
    }

    fn render(&self, out: &mut impl Write, lines: &[String], tone: Tone) -> Result<()> {
        let mut lines = lines.iter().take(MAX_LINES);

        if let Some(first) = lines.next() {
            execute!(
                out,
                SetForegroundColor(tone.color()),
                Print(first),
                Print("\n"),
                ResetColor
            )?;
        }

        for line in lines {
            execute!(out, Print(format!("  {}\n", line)))?;
        }

        Ok(())
    }
}

impl Default for TerminalDisplay {
    fn default() -> Self {
        Self::new()
    }
}

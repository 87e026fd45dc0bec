use std::fmt::Display;
use std::io::{BufRead, Write};
use std::str::FromStr;

use crate::error::{DietError, Result};

pub const DEFAULT_MAX_ATTEMPTS: usize = 3;

/// Line-oriented prompts over any reader/writer pair.
///
/// Invalid numbers are re-asked in a loop up to `max_attempts` times; after
/// that, or at end of input, the caller gets `InvalidInput`.
pub struct Prompter<R, W> {
    reader: R,
    writer: W,
    max_attempts: usize,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader,
            writer,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn writer(&mut self) -> &mut W {
        &mut self.writer
    }

    pub fn say(&mut self, message: impl Display) -> Result<()> {
        writeln!(self.writer, "{}", message)?;
        Ok(())
    }

    /// Ask for one line, returned trimmed.
    pub fn line(&mut self, prompt: &str) -> Result<String> {
        write!(self.writer, "{}", prompt)?;
        self.writer.flush()?;

        let mut buf = String::new();
        if self.reader.read_line(&mut buf)? == 0 {
            return Err(DietError::InvalidInput("unexpected end of input".to_string()));
        }
        Ok(buf.trim().to_string())
    }

    pub fn number<T: FromStr>(&mut self, prompt: &str) -> Result<T> {
        for _ in 0..self.max_attempts {
            let answer = self.line(prompt)?;
            match answer.parse::<T>() {
                Ok(value) => return Ok(value),
                Err(_) => self.say("Please enter a valid number.")?,
            }
        }
        Err(DietError::InvalidInput(format!(
            "no valid number after {} attempts",
            self.max_attempts
        )))
    }

    /// A 1-based pick from a list of `count` options.
    pub fn choice(&mut self, prompt: &str, count: usize) -> Result<usize> {
        let picked: usize = self.number(prompt)?;
        if picked == 0 || picked > count {
            return Err(DietError::not_found("selection", picked));
        }
        Ok(picked)
    }

    /// `yes` or `y`, case-insensitive.
    pub fn confirm(&mut self, prompt: &str) -> Result<bool> {
        let answer = self.line(prompt)?.to_lowercase();
        Ok(answer == "yes" || answer == "y")
    }

    /// Units consumed. Blank or non-numeric answers count as one.
    pub fn quantity(&mut self, prompt: &str) -> Result<u32> {
        Ok(self.line(prompt)?.parse().unwrap_or(1))
    }
}

//! Terminal implementations of the `OutputSink` and `InputSink` ports.

use std::io::{BufRead as _, Write as _};

use anyhow::{Result, anyhow};
use futures_util::FutureExt as _;
use futures_util::future::BoxFuture;
use owo_colors::OwoColorize as _;
use tokio::sync::{Mutex, mpsc};

use crate::application::ports::{InputSink, OutputSink, Prompt};
use crate::output::{OutputContext, Styles};

/// Writes run progress to stdout and errors to stderr.
///
/// Progress is suppressed with `--quiet` or `--json`; errors never are.
pub struct TerminalOutput {
    styles: Styles,
    show_progress: bool,
}

impl TerminalOutput {
    #[must_use]
    pub fn new(ctx: &OutputContext) -> Self {
        Self {
            styles: ctx.styles.clone(),
            show_progress: ctx.show_progress(),
        }
    }

    /// Highlights the summary lines.
    #[must_use]
    pub fn paint(&self, line: &str) -> String {
        if line.starts_with("Plan:") || line.starts_with("No changes.") {
            line.style(self.styles.bold).to_string()
        } else if line.starts_with("Apply complete!") {
            line.style(self.styles.success).to_string()
        } else if line == "Policy Result: false" || line.starts_with("Lock timeout") {
            line.style(self.styles.warning).to_string()
        } else if line.ends_with("using the UI or API.") {
            line.style(self.styles.info).to_string()
        } else {
            line.to_string()
        }
    }
}

impl OutputSink for TerminalOutput {
    fn output(&self, line: &str) {
        if self.show_progress {
            println!("{}", self.paint(line));
        }
    }

    fn error(&self, line: &str) {
        if let Some(rest) = line.strip_prefix("Error:") {
            eprintln!("{}{rest}", "Error:".style(self.styles.error));
        } else {
            eprintln!("{line}");
        }
    }

    fn flush(&self) {
        let _ = std::io::stdout().lock().flush();
        let _ = std::io::stderr().lock().flush();
    }
}

/// Reads answers from stdin, one line per prompt.
///
/// Lines are read by a background thread into a channel, so an `ask` that
/// loses a race is dropped without swallowing the next line.
pub struct TerminalInput {
    styles: Styles,
    lines: Mutex<mpsc::UnboundedReceiver<String>>,
}

impl TerminalInput {
    /// Starts the stdin reader.
    #[must_use]
    pub fn spawn(ctx: &OutputContext) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        std::thread::spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else { break };
                if tx.send(line).is_err() {
                    break;
                }
            }
        });
        Self {
            styles: ctx.styles.clone(),
            lines: Mutex::new(rx),
        }
    }

    async fn read_answer(&self, prompt: &Prompt) -> Result<String> {
        eprintln!();
        eprintln!("{}", prompt.query.style(self.styles.prompt));
        for line in prompt.description.lines() {
            eprintln!("  {line}");
        }
        eprint!("\n  {} ", "Enter a value:".style(self.styles.bold));
        let _ = std::io::stderr().lock().flush();

        let mut lines = self.lines.lock().await;
        let answer = lines
            .recv()
            .await
            .ok_or_else(|| anyhow!("no input available for prompt \"{}\"", prompt.id))?;
        eprintln!();
        Ok(answer.trim().to_string())
    }
}

impl InputSink for TerminalInput {
    fn ask<'a>(&'a self, prompt: &'a Prompt) -> BoxFuture<'a, Result<String>> {
        self.read_answer(prompt).boxed()
    }
}

//! Output styles using owo-colors stylesheet pattern

use owo_colors::Style;

/// Centralized stylesheet for CLI output colors.
#[derive(Default, Clone)]
pub struct Styles {
    /// Success messages and apply summaries (green)
    pub success: Style,
    /// Warnings and failed policy verdicts (yellow)
    pub warning: Style,
    /// Error messages (red)
    pub error: Style,
    /// Info messages (blue)
    pub info: Style,
    /// Dimmed/secondary text
    pub dim: Style,
    /// Bold text, used for plan summaries
    pub bold: Style,
    /// Prompt questions
    pub prompt: Style,
}

impl Styles {
    /// Apply colors to the stylesheet.
    pub fn colorize(&mut self) {
        self.success = Style::new().green().bold();
        self.warning = Style::new().yellow();
        self.error = Style::new().red().bold();
        self.info = Style::new().blue();
        self.dim = Style::new().dimmed();
        self.bold = Style::new().bold();
        self.prompt = Style::new().bold().cyan();
    }
}

//! Progress spinners.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use super::theme::UpkeepTheme;
use super::SpinnerHandle;

/// A progress spinner for downloads and installs.
pub struct ProgressSpinner {
    bar: ProgressBar,
    theme: UpkeepTheme,
    /// Print the final line instead of drawing it on the bar.
    echo: bool,
}

impl ProgressSpinner {
    /// Create a new spinner with a message.
    pub fn new(message: &str, theme: UpkeepTheme) -> Self {
        let bar = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .template("{spinner:.cyan} {msg}")
        {
            bar.set_style(style);
        }
        bar.set_message(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(80));

        Self {
            bar,
            theme,
            echo: false,
        }
    }

    /// Create a spinner that doesn't show (for quiet mode).
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
            theme: UpkeepTheme::plain(),
            echo: false,
        }
    }

    /// No animation, but the final line is printed (for piped output).
    pub fn detached(theme: UpkeepTheme) -> Self {
        Self {
            bar: ProgressBar::hidden(),
            theme,
            echo: true,
        }
    }

    fn finish_with(&mut self, line: String) {
        if self.echo {
            self.bar.finish_and_clear();
            println!("{}", line);
            return;
        }
        if let Ok(style) = ProgressStyle::default_spinner().template("{msg}") {
            self.bar.set_style(style);
        }
        self.bar.finish_with_message(line);
    }
}

impl SpinnerHandle for ProgressSpinner {
    fn set_message(&mut self, msg: &str) {
        self.bar.set_message(msg.to_string());
    }

    fn finish_success(&mut self, msg: &str) {
        let line = self.theme.format_success(msg);
        self.finish_with(line);
    }

    fn finish_error(&mut self, msg: &str) {
        let line = self.theme.format_error(msg);
        if self.bar.is_hidden() && !self.echo {
            // Errors are shown even in quiet mode.
            self.bar.finish_and_clear();
            eprintln!("{}", line);
            return;
        }
        self.finish_with(line);
    }
}

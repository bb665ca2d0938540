//! Terminal UI.

use console::Term;
use std::io::Write;

use crate::error::{Result, UpkeepError};

use super::{
    prompt_user, OutputMode, ProgressSpinner, Prompt, PromptResult, SpinnerHandle, UpkeepTheme,
    UserInterface,
};

/// Terminal UI implementation.
///
/// Status goes to stdout and errors to stderr. When stdout is not a
/// terminal, prompts fail instead of blocking.
pub struct TerminalUI {
    term: Term,
    err_term: Term,
    theme: UpkeepTheme,
    mode: OutputMode,
}

impl TerminalUI {
    pub fn new(mode: OutputMode, colors: bool) -> Self {
        Self {
            term: Term::stdout(),
            err_term: Term::stderr(),
            theme: UpkeepTheme::for_colors(colors),
            mode,
        }
    }

    pub fn theme(&self) -> &UpkeepTheme {
        &self.theme
    }
}

/// Create the terminal UI for the given mode.
pub fn create_ui(mode: OutputMode, colors: bool) -> Box<dyn UserInterface> {
    Box::new(TerminalUI::new(mode, colors))
}

impl UserInterface for TerminalUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        if self.mode.shows_status() {
            writeln!(self.term, "{}", msg).ok();
        }
    }

    fn success(&mut self, msg: &str) {
        if self.mode.shows_status() {
            writeln!(self.term, "{}", self.theme.format_success(msg)).ok();
        }
    }

    fn warning(&mut self, msg: &str) {
        if self.mode.shows_status() {
            writeln!(self.term, "{}", self.theme.format_warning(msg)).ok();
        }
    }

    fn error(&mut self, msg: &str) {
        writeln!(self.err_term, "{}", self.theme.format_error(msg)).ok();
    }

    fn prompt(&mut self, prompt: &Prompt) -> Result<PromptResult> {
        if !self.is_interactive() {
            return Err(UpkeepError::Other(anyhow::anyhow!(
                "Cannot prompt '{}' without a terminal",
                prompt.question
            )));
        }
        prompt_user(prompt, &self.term)
    }

    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle> {
        if !self.mode.shows_spinners() {
            Box::new(ProgressSpinner::hidden())
        } else if self.is_interactive() {
            Box::new(ProgressSpinner::new(message, self.theme.clone()))
        } else {
            Box::new(ProgressSpinner::detached(self.theme.clone()))
        }
    }

    fn show_header(&mut self, title: &str) {
        if self.mode.shows_status() {
            writeln!(self.term, "\n{}\n", self.theme.format_header(title)).ok();
        }
    }

    fn is_interactive(&self) -> bool {
        self.term.is_term()
    }
}

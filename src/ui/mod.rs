//! Terminal user interface.
//!
//! This module provides:
//! - [`UserInterface`] trait for UI abstraction
//! - [`TerminalUI`] for terminal usage, interactive or not
//! - [`MockUI`] capturing output for tests
//! - Prompts, spinners, and tables
//!
//! # Example
//!
//! ```
//! use upkeep::ui::{MockUI, UserInterface};
//!
//! let mut ui = MockUI::new();
//! ui.show_header("Checking components");
//! ui.success("widget is up to date");
//! assert_eq!(ui.successes(), ["widget is up to date"]);
//! ```

pub mod mock;
pub mod output;
pub mod prompts;
pub mod spinner;
pub mod table;
pub mod terminal;
pub mod theme;

pub use mock::MockUI;
pub use output::OutputMode;
pub use prompts::{parse_yes, prompt_user};
pub use spinner::ProgressSpinner;
pub use table::Table;
pub use terminal::{create_ui, TerminalUI};
pub use theme::{should_use_colors, UpkeepTheme};

use crate::error::Result;

/// Trait for user interface interactions.
///
/// This trait allows mocking the UI in tests.
pub trait UserInterface {
    /// Get the current output mode.
    fn output_mode(&self) -> OutputMode;

    /// Display a message to the user.
    fn message(&mut self, msg: &str);

    /// Display a success message.
    fn success(&mut self, msg: &str);

    /// Display a warning message.
    fn warning(&mut self, msg: &str);

    /// Display an error message. Shown in every mode.
    fn error(&mut self, msg: &str);

    /// Show a prompt and get user input.
    fn prompt(&mut self, prompt: &Prompt) -> Result<PromptResult>;

    /// Start a spinner for an operation.
    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle>;

    /// Show a header/banner.
    fn show_header(&mut self, title: &str);

    /// Check if running in interactive mode.
    fn is_interactive(&self) -> bool;
}

/// Handle for controlling a spinner.
pub trait SpinnerHandle {
    /// Update the spinner message.
    fn set_message(&mut self, msg: &str);

    /// Mark the operation as successful.
    fn finish_success(&mut self, msg: &str);

    /// Mark the operation as failed.
    fn finish_error(&mut self, msg: &str);
}

/// A prompt to show to the user.
#[derive(Debug, Clone)]
pub struct Prompt {
    /// Unique key for the prompt (used by [`MockUI`] responses).
    pub key: String,
    /// The question to display.
    pub question: String,
    pub prompt_type: PromptType,
    /// Default value if user just presses enter.
    pub default: Option<String>,
}

impl Prompt {
    /// A yes/no question defaulting to no.
    pub fn confirm(key: &str, question: impl Into<String>) -> Self {
        Self {
            key: key.to_string(),
            question: question.into(),
            prompt_type: PromptType::Confirm,
            default: Some("no".to_string()),
        }
    }
}

/// The type of prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptType {
    /// Yes/no confirmation.
    Confirm,
    /// Free-form text input.
    Input,
}

/// Result of a prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptResult {
    Bool(bool),
    String(String),
}

impl PromptResult {
    pub fn as_string(&self) -> String {
        match self {
            Self::Bool(b) => b.to_string(),
            Self::String(s) => s.clone(),
        }
    }

    /// Get as bool if this is a Bool result.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            Self::String(_) => None,
        }
    }
}

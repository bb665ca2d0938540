//! Mock UI implementation for testing.
//!
//! `MockUI` implements the `UserInterface` trait and captures all
//! interactions for later assertion. Prompt answers are configured per key.
//!
//! # Example
//!
//! ```
//! use upkeep::ui::{MockUI, Prompt, UserInterface};
//!
//! let mut ui = MockUI::new();
//! ui.set_prompt_response("reinstall", "yes");
//!
//! let answer = ui.prompt(&Prompt::confirm("reinstall", "Reinstall widget?")).unwrap();
//! assert_eq!(answer.as_bool(), Some(true));
//! assert_eq!(ui.prompts_shown(), ["reinstall"]);
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::error::Result;

use super::{parse_yes, OutputMode, Prompt, PromptResult, PromptType, SpinnerHandle, UserInterface};

/// Mock UI implementation for testing.
#[derive(Debug, Default)]
pub struct MockUI {
    mode: OutputMode,
    interactive: bool,
    messages: Vec<String>,
    successes: Vec<String>,
    warnings: Vec<String>,
    errors: Vec<String>,
    headers: Vec<String>,
    spinners: Arc<Mutex<Vec<String>>>,
    prompt_responses: HashMap<String, String>,
    prompts_shown: Vec<String>,
}

impl MockUI {
    /// Create a new MockUI with Normal output mode.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new MockUI with a specific output mode.
    pub fn with_mode(mode: OutputMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    /// Set a response for a prompt key.
    pub fn set_prompt_response(&mut self, key: &str, response: &str) {
        self.prompt_responses
            .insert(key.to_string(), response.to_string());
    }

    pub fn set_interactive(&mut self, interactive: bool) {
        self.interactive = interactive;
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn successes(&self) -> &[String] {
        &self.successes
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Spinner messages and their final lines, in order.
    pub fn spinner_events(&self) -> Vec<String> {
        self.spinners.lock().map(|s| s.clone()).unwrap_or_default()
    }

    /// Keys of prompts that were shown.
    pub fn prompts_shown(&self) -> &[String] {
        &self.prompts_shown
    }

    /// True if any captured line (of any kind) contains `text`.
    pub fn has_output(&self, text: &str) -> bool {
        self.messages
            .iter()
            .chain(&self.successes)
            .chain(&self.warnings)
            .chain(&self.errors)
            .chain(&self.spinner_events())
            .any(|line| line.contains(text))
    }
}

impl UserInterface for MockUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        self.messages.push(msg.to_string());
    }

    fn success(&mut self, msg: &str) {
        self.successes.push(msg.to_string());
    }

    fn warning(&mut self, msg: &str) {
        self.warnings.push(msg.to_string());
    }

    fn error(&mut self, msg: &str) {
        self.errors.push(msg.to_string());
    }

    fn prompt(&mut self, prompt: &Prompt) -> Result<PromptResult> {
        self.prompts_shown.push(prompt.key.clone());
        let response = self
            .prompt_responses
            .get(&prompt.key)
            .cloned()
            .or_else(|| prompt.default.clone())
            .unwrap_or_default();

        Ok(match prompt.prompt_type {
            PromptType::Confirm => PromptResult::Bool(parse_yes(&response)),
            PromptType::Input => PromptResult::String(response),
        })
    }

    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle> {
        if let Ok(mut events) = self.spinners.lock() {
            events.push(format!("start: {}", message));
        }
        Box::new(MockSpinner {
            events: Arc::clone(&self.spinners),
        })
    }

    fn show_header(&mut self, title: &str) {
        self.headers.push(title.to_string());
    }

    fn is_interactive(&self) -> bool {
        self.interactive
    }
}

/// Spinner that records its lifecycle into the owning [`MockUI`].
#[derive(Debug)]
pub struct MockSpinner {
    events: Arc<Mutex<Vec<String>>>,
}

impl MockSpinner {
    fn push(&self, event: String) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

impl SpinnerHandle for MockSpinner {
    fn set_message(&mut self, msg: &str) {
        self.push(format!("message: {}", msg));
    }

    fn finish_success(&mut self, msg: &str) {
        self.push(format!("success: {}", msg));
    }

    fn finish_error(&mut self, msg: &str) {
        self.push(format!("error: {}", msg));
    }
}

//! Interactive prompts.

use console::{style, Term};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input};

use crate::error::{Result, UpkeepError};

use super::{Prompt, PromptResult, PromptType};

/// Convert dialoguer errors to UpkeepError.
fn map_dialoguer_err(e: dialoguer::Error) -> UpkeepError {
    UpkeepError::Io(e.into())
}

/// Dialoguer theme without the default yellow `?` prefix.
fn prompt_theme() -> ColorfulTheme {
    ColorfulTheme {
        prompt_prefix: style("".to_string()),
        ..ColorfulTheme::default()
    }
}

/// Prompt the user for input.
pub fn prompt_user(prompt: &Prompt, term: &Term) -> Result<PromptResult> {
    match &prompt.prompt_type {
        PromptType::Confirm => prompt_confirm(prompt, term),
        PromptType::Input => prompt_input(prompt, term),
    }
}

fn prompt_confirm(prompt: &Prompt, term: &Term) -> Result<PromptResult> {
    let default = prompt
        .default
        .as_deref()
        .map(parse_yes)
        .unwrap_or(false);

    let result = Confirm::with_theme(&prompt_theme())
        .with_prompt(&prompt.question)
        .default(default)
        .interact_on(term)
        .map_err(map_dialoguer_err)?;

    Ok(PromptResult::Bool(result))
}

fn prompt_input(prompt: &Prompt, term: &Term) -> Result<PromptResult> {
    let theme = prompt_theme();
    let input = Input::<String>::with_theme(&theme).with_prompt(&prompt.question);

    let result: String = match &prompt.default {
        Some(default) => input
            .default(default.clone())
            .interact_on(term)
            .map_err(map_dialoguer_err)?,
        None => input.interact_on(term).map_err(map_dialoguer_err)?,
    };

    Ok(PromptResult::String(result))
}

/// Interpret a textual yes/no answer.
pub fn parse_yes(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "true" | "y" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_affirmative_answers() {
        assert!(parse_yes("y"));
        assert!(parse_yes("Yes"));
        assert!(parse_yes("true"));
        assert!(!parse_yes("no"));
        assert!(!parse_yes(""));
    }
}

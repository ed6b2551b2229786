use anyhow::Result;
use dialoguer::Select;
use is_terminal::IsTerminal;
use log::warn;

use crate::admin::Confirmation;

/// Interactive confirmation prompt using arrow-key navigable selection
///
/// # Arguments
/// * `prompt` - The question to ask the user
/// * `default_yes` - Whether "Yes" should be the default selection (index 0)
///
/// # Returns
/// * `Ok(true)` if user selects "Yes"
/// * `Ok(false)` if user selects "No"
pub fn prompt_confirmation(prompt: &str, default_yes: bool) -> Result<bool> {
    let items = vec!["Yes", "No"];
    let default_index = if default_yes { 0 } else { 1 };

    let selection = Select::new()
        .with_prompt(prompt)
        .items(&items)
        .default(default_index)
        .interact()?;

    Ok(selection == 0)
}

pub fn confirm(prompt: &str, default_yes: bool) -> Result<bool> {
    prompt_confirmation(prompt, default_yes)
}

/// Confirmation gate for destructive commands run from the terminal.
///
/// `--force` answers yes. Without a terminal there is nobody to ask, so the
/// answer is no.
pub struct PromptConfirmation {
    force: bool,
}

impl PromptConfirmation {
    pub fn new(force: bool) -> Self {
        Self { force }
    }
}

impl Confirmation for PromptConfirmation {
    fn confirm(&self, prompt: &str) -> bool {
        if self.force {
            return true;
        }
        if !std::io::stdin().is_terminal() {
            warn!("No terminal to confirm '{}', use --force", prompt);
            return false;
        }
        match prompt_confirmation(prompt, false) {
            Ok(answer) => answer,
            Err(e) => {
                warn!("Confirmation prompt failed: {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_force_skips_the_prompt() {
        assert!(PromptConfirmation::new(true).confirm("Supprimer ?"));
    }
}

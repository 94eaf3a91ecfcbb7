//! Approval gate in front of irreversible batches.

use crate::error::{DriveError, Result};

/// Decides whether a batch may be sent.
///
/// Returning `Ok(false)` aborts the operation.
pub trait Confirmation {
    fn confirm(&mut self, prompt: &str) -> Result<bool>;
}

/// Any `FnMut(&str) -> Result<bool>` works as a gate, which keeps scripted
/// answers cheap to set up.
impl<F> Confirmation for F
where
    F: FnMut(&str) -> Result<bool>,
{
    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        self(prompt)
    }
}

/// Asks on the terminal, defaulting to "no".
#[derive(Debug, Default)]
pub struct TerminalPrompt;

impl Confirmation for TerminalPrompt {
    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        dialoguer::Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()
            .map_err(|e| DriveError::PromptError(e.to_string()))
    }
}

use dialoguer::Confirm as Prompt;

use crate::error::{AiCommitError, Result};

/// Yes/no question put to the user.
pub trait Confirm {
   fn confirm(&self, message: &str, default: bool) -> Result<bool>;
}

/// Prompts on the controlling terminal.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalConfirm;

impl Confirm for TerminalConfirm {
   fn confirm(&self, message: &str, default: bool) -> Result<bool> {
      Prompt::new()
         .with_prompt(message)
         .default(default)
         .interact()
         .map_err(|e| AiCommitError::application(format!("Failed to read confirmation: {e}")))
   }
}

/// Fixed answer, for non-interactive runs and tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedAnswer(pub bool);

impl Confirm for FixedAnswer {
   fn confirm(&self, _message: &str, _default: bool) -> Result<bool> {
      Ok(self.0)
   }
}

impl<T: Confirm + ?Sized> Confirm for &T {
   fn confirm(&self, message: &str, default: bool) -> Result<bool> {
      (**self).confirm(message, default)
   }
}

impl<T: Confirm + ?Sized> Confirm for Box<T> {
   fn confirm(&self, message: &str, default: bool) -> Result<bool> {
      (**self).confirm(message, default)
   }
}

#[cfg(test)]
mod tests {
   use super::*;

   #[test]
   fn test_fixed_answer() {
      assert!(FixedAnswer(true).confirm("go?", false).unwrap());
      assert!(!FixedAnswer(false).confirm("go?", true).unwrap());
   }

   #[test]
   fn test_boxed_confirm_delegates() {
      let boxed: Box<dyn Confirm> = Box::new(FixedAnswer(true));
      assert!(boxed.confirm("go?", false).unwrap());
   }
}

//! Token counting and the pre-flight size/cost check.
//!
//! Counting falls back in order:
//! 1. tiktoken BPE for the configured model
//! 2. tiktoken `cl100k_base`
//! 3. Character estimate (4 chars ≈ 1 token)

use std::fmt;

use tiktoken_rs::{CoreBPE, cl100k_base, get_bpe_from_model};

use crate::{
   error::Result,
   interact::Confirm,
   style::{self, Logger, icons},
};

/// Prompts above this many tokens are never sent.
pub const MAX_TOKENS: usize = 12_000;
/// Estimated price in dollars per 1,000 prompt tokens.
pub const FEE_PER_1K_TOKENS: f64 = 0.02;
/// Estimated price in dollars per requested completion.
pub const FEE_COMPLETION: f64 = 0.001;

/// Token counter with cascading fallback.
pub struct TokenCounter {
   model:    String,
   tiktoken: Option<CoreBPE>,
}

impl fmt::Debug for TokenCounter {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      f.debug_struct("TokenCounter")
         .field("model", &self.model)
         .field("has_tiktoken", &self.tiktoken.is_some())
         .finish()
   }
}

impl TokenCounter {
   pub fn new(model: &str) -> Self {
      // OpenRouter ids carry a vendor prefix ("openai/gpt-4o").
      let bare = model.rsplit('/').next().unwrap_or(model);
      let tiktoken = get_bpe_from_model(bare).or_else(|_| cl100k_base()).ok();
      Self { model: model.to_string(), tiktoken }
   }

   /// Character estimate only; used when no BPE table is wanted.
   pub fn estimate_only(model: &str) -> Self {
      Self { model: model.to_string(), tiktoken: None }
   }

   pub fn count(&self, text: &str) -> usize {
      if let Some(ref encoder) = self.tiktoken {
         encoder.encode_with_special_tokens(text).len()
      } else {
         text.len().div_ceil(4)
      }
   }
}

/// Gate run before every API call. `Ok(false)` vetoes the call.
pub trait Preflight {
   fn check(&self, prompt: &str, completions: u32) -> Result<bool>;
}

/// Lets every prompt through.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPreflight;

impl Preflight for NoPreflight {
   fn check(&self, _prompt: &str, _completions: u32) -> Result<bool> {
      Ok(true)
   }
}

/// Estimated dollar cost of sending `tokens` prompt tokens for `completions`
/// completions.
pub fn estimate_fee(tokens: usize, completions: u32) -> f64 {
   (tokens as f64 / 1000.0).mul_add(FEE_PER_1K_TOKENS, f64::from(completions) * FEE_COMPLETION)
}

/// Rejects oversize prompts and, when `filter_fee` is set, asks the user to
/// accept the estimated cost.
pub struct CostFilter<C> {
   counter:    TokenCounter,
   filter_fee: bool,
   confirm:    C,
   log:        Logger,
}

impl<C: Confirm> CostFilter<C> {
   pub const fn new(counter: TokenCounter, filter_fee: bool, confirm: C, log: Logger) -> Self {
      Self { counter, filter_fee, confirm, log }
   }
}

impl<C: Confirm> Preflight for CostFilter<C> {
   fn check(&self, prompt: &str, completions: u32) -> Result<bool> {
      let tokens = self.counter.count(prompt);
      self.log.debug(&format!("Prompt size: {tokens} tokens"));

      if tokens > MAX_TOKENS {
         self.log.warn(&format!(
            "The commit diff is too large for the ChatGPT API. Max {MAX_TOKENS} tokens, got \
             {tokens}"
         ));
         return Ok(false);
      }

      if !self.filter_fee {
         return Ok(true);
      }

      let fee = estimate_fee(tokens, completions);
      eprintln!(
         "{} {} {}",
         style::info(icons::INFO),
         style::bold(&format!("Estimated cost: ${fee:.5}")),
         style::dim(&format!("({tokens} tokens, {completions} completion(s))"))
      );
      self.confirm.confirm("Do you want to continue?", true)
   }
}

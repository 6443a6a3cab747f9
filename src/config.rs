use std::collections::HashMap;

use crate::{
   error::{AiCommitError, ErrorCode, Result},
   templates::PromptTemplate,
   types::Args,
};

/// Snapshot of the process environment (after `.env` loading).
pub type Env = HashMap<String, String>;

pub const DEFAULT_MODEL: &str = "openrouter/auto";
pub const DEFAULT_PROMPT: &str = "v04";
pub const DEFAULT_UNIFIED: u8 = 1;
pub const MAX_UNIFIED: u8 = 10;
pub const VALID_PROMPTS: &[&str] = &["v03", "v04", "v03s", "v04s"];

/// API key variables, in precedence order.
pub const API_KEY_VARS: &[&str] = &["OPENROUTER_API_KEY", "OPENAI_API_KEY"];
/// Model override variables, in precedence order.
pub const MODEL_VARS: &[&str] = &["OPENROUTER_MODEL", "OPENAI_MODEL"];

pub const ENV_VERBOSE: &str = "AI_COMMIT_VERBOSE";
pub const ENV_FORCE: &str = "AI_COMMIT_FORCE";
pub const ENV_FILTER_FEE: &str = "AI_COMMIT_FILTER_FEE";
pub const ENV_UNIFIED: &str = "AI_COMMIT_UNIFIED";
pub const ENV_ALL: &str = "AI_COMMIT_ALL";
pub const ENV_RELEASE: &str = "AI_COMMIT_RELEASE";
pub const ENV_PROMPT: &str = "AI_COMMIT_PROMPT";

/// Run parameters, resolved once from CLI arguments and the environment. CLI
/// values win over environment values.
#[derive(Debug, Clone)]
pub struct Config {
   api_key:    Option<String>,
   model:      String,
   prompt:     String,
   unified:    u8,
   verbose:    bool,
   force:      bool,
   filter_fee: bool,
   all:        bool,
   release:    bool,
}

impl Config {
   pub fn load(args: &Args, env: &Env) -> Self {
      let var = |name: &str| env.get(name).map(String::as_str);

      let api_key = args
         .api_key
         .as_deref()
         .into_iter()
         .chain(API_KEY_VARS.iter().filter_map(|name| var(*name)))
         .find(|key| !key.trim().is_empty())
         .map(|key| key.trim().to_string());

      let model = args
         .model
         .as_deref()
         .into_iter()
         .chain(MODEL_VARS.iter().filter_map(|name| var(*name)))
         .find(|model| !model.is_empty())
         .unwrap_or(DEFAULT_MODEL)
         .to_string();

      let prompt = args
         .prompt
         .as_deref()
         .filter(|p| !p.is_empty())
         .or_else(|| var(ENV_PROMPT))
         .unwrap_or(DEFAULT_PROMPT)
         .to_string();

      let unified = parse_unified(
         args
            .unified
            .as_deref()
            .filter(|u| !u.is_empty())
            .or_else(|| var(ENV_UNIFIED)),
      );

      Self {
         api_key,
         model,
         prompt,
         unified,
         verbose: args.verbose || parse_bool(var(ENV_VERBOSE)),
         force: args.force || parse_bool(var(ENV_FORCE)),
         filter_fee: args.filter_fee || parse_bool(var(ENV_FILTER_FEE)),
         all: args.all || parse_bool(var(ENV_ALL)),
         release: args.release || parse_bool(var(ENV_RELEASE)),
      }
   }

   /// Load from parsed CLI arguments and the current process environment.
   pub fn from_process(args: &Args) -> Self {
      let env: Env = std::env::vars().collect();
      Self::load(args, &env)
   }

   pub fn api_key(&self) -> Result<&str> {
      self.api_key.as_deref().ok_or_else(|| {
         AiCommitError::configuration(
            ErrorCode::ConfigurationMissing,
            "OPENAI_API_KEY or OPENROUTER_API_KEY environment variable is required and must be a \
             non-empty string",
         )
      })
   }

   pub fn model(&self) -> &str {
      &self.model
   }

   /// Selected prompt template. Errors when the configured name is not one of
   /// [`VALID_PROMPTS`].
   pub fn prompt(&self) -> Result<PromptTemplate> {
      if !VALID_PROMPTS.contains(&self.prompt.as_str()) {
         return Err(AiCommitError::configuration(
            ErrorCode::ConfigurationInvalid,
            format!(
               "Invalid prompt version: {}. Valid options are: {}",
               self.prompt,
               VALID_PROMPTS.join(", ")
            ),
         ));
      }
      self.prompt.parse().map_err(|e: AiCommitError| {
         AiCommitError::configuration(ErrorCode::ConfigurationInvalid, e.to_string())
      })
   }

   pub const fn unified(&self) -> u8 {
      self.unified
   }

   pub const fn verbose(&self) -> bool {
      self.verbose
   }

   pub const fn force(&self) -> bool {
      self.force
   }

   pub const fn filter_fee(&self) -> bool {
      self.filter_fee
   }

   pub const fn all(&self) -> bool {
      self.all
   }

   pub const fn release(&self) -> bool {
      self.release
   }

   /// Check required settings. `Ok(false)` means a configuration error was
   /// found; any other failure propagates.
   pub fn validate(&self) -> Result<bool> {
      match self.require_valid() {
         Ok(()) => Ok(true),
         Err(AiCommitError::Configuration { .. }) => Ok(false),
         Err(e) => Err(e),
      }
   }

   /// Like [`Self::validate`], but returns the first configuration error.
   pub fn require_valid(&self) -> Result<()> {
      self.api_key()?;
      self.prompt()?;
      Ok(())
   }
}

/// `true` only for the literal string `"true"` (any case).
fn parse_bool(value: Option<&str>) -> bool {
   value.is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
}

/// Base-10 context width. Missing, malformed or negative values fall back to
/// [`DEFAULT_UNIFIED`]; large values are capped at [`MAX_UNIFIED`].
fn parse_unified(value: Option<&str>) -> u8 {
   match value.map(|v| v.trim().parse::<i64>()) {
      Some(Ok(n)) if n >= 0 => n.min(i64::from(MAX_UNIFIED)) as u8,
      _ => DEFAULT_UNIFIED,
   }
}

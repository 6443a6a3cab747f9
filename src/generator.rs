use crate::{
   api::ChatClient,
   error::{AiCommitError, ErrorCategory, ErrorCode, Result},
   style::Logger,
   templates::{DescriptionList, PromptTemplate, PromptVersion, release_summary_prompt},
   tokens::{NoPreflight, Preflight},
};

pub const MAX_DIFF_CHARS: usize = 100_000;
pub const MAX_RESPONSE_CHARS: usize = 50_000;
pub const MAX_COMMITS_CHARS: usize = 50_000;
pub const WRAP_WIDTH: usize = 90;

/// Turns staged diffs into commit messages and commit lists into release
/// summaries.
pub struct CommitGenerator<C> {
   client:    C,
   preflight: Box<dyn Preflight>,
   log:       Logger,
}

impl<C: ChatClient> CommitGenerator<C> {
   pub fn new(client: C, verbose: bool) -> Self {
      Self { client, preflight: Box::new(NoPreflight), log: Logger::new(verbose) }
   }

   #[must_use]
   pub fn with_preflight(mut self, preflight: impl Preflight + 'static) -> Self {
      self.preflight = Box::new(preflight);
      self
   }

   pub const fn client(&self) -> &C {
      &self.client
   }

   /// Select a template by version name (`v03`, `v04`) and list suffix (`""`
   /// or `"s"`).
   pub fn get_prompts(version: &str, suffix: &str) -> Result<PromptTemplate> {
      Ok(PromptTemplate::new(version.parse()?, DescriptionList::from_suffix(suffix)?))
   }

   /// Commit message for one diff using `template` as given. `Ok(None)` means
   /// the pre-flight check vetoed the request.
   pub fn generate_single_commit(
      &self,
      git_diff: &str,
      template: PromptTemplate,
   ) -> Result<Option<String>> {
      check_text(git_diff, MAX_DIFF_CHARS, "gitDiff", "Git diff")?;
      self.complete(&template.render(git_diff))
   }

   /// Commit message for a diff spanning several files; always asks for a
   /// per-file description list.
   pub fn generate_single_commit_all(
      &self,
      git_diff: &str,
      version: PromptVersion,
   ) -> Result<Option<String>> {
      self.generate_single_commit(git_diff, PromptTemplate::new(version, DescriptionList::PerFile))
   }

   fn complete(&self, prompt: &str) -> Result<Option<String>> {
      self.log.debug(&format!("Prompt:\n{prompt}"));

      if !self.preflight.check(prompt, 1)? {
         return Ok(None);
      }

      self.log.info(&format!("Requesting commit message from {}", self.client.model()));
      let raw = self
         .client
         .send_message(prompt)
         .map_err(|e| wrap_api_error("Failed to generate commit message", e))?;
      process_response(&raw).map(Some)
   }

   /// One-line release summary for newline-separated commit subjects.
   pub fn generate_release_summary(&self, commits_text: &str) -> Result<String> {
      check_text(commits_text, MAX_COMMITS_CHARS, "commitsText", "Commits text")?;

      let prompt = release_summary_prompt(commits_text);
      self.log.debug(&format!("Prompt:\n{prompt}"));

      let raw = self
         .client
         .send_message(&prompt)
         .map_err(|e| wrap_api_error("Failed to generate release summary", e))?;

      let unfenced = strip_fences(&raw.replace('"', ""));
      let summary = unfenced.lines().next().unwrap_or_default().trim();
      if summary.is_empty() {
         return Err(AiCommitError::api(
            ErrorCode::ApiInvalidResponse,
            "Release summary came back empty",
            None,
         ));
      }
      Ok(summary.to_string())
   }
}

/// Api failures surface as Validation errors; a rate limit keeps its code.
fn wrap_api_error(context: &str, e: AiCommitError) -> AiCommitError {
   if e.category() == ErrorCategory::Api {
      AiCommitError::wrap_validation(context, e)
   } else {
      e
   }
}

fn check_text(text: &str, max: usize, field: &str, label: &str) -> Result<()> {
   if text.trim().is_empty() {
      return Err(AiCommitError::validation(
         ErrorCode::ValidationRequired,
         format!("{label} is required and must be a non-empty string"),
         Some(field),
      ));
   }
   let len = text.chars().count();
   if len > max {
      return Err(AiCommitError::validation(
         ErrorCode::ValidationLength,
         format!("{label} is too large ({len} characters, max {max})"),
         Some(field),
      ));
   }
   Ok(())
}

/// Wrap, drop code fence lines, trim.
pub fn process_response(text: &str) -> Result<String> {
   check_text(text, MAX_RESPONSE_CHARS, "text", "Response text")?;
   Ok(strip_fences(&split90(text)))
}

/// A line holding only a fence marker, optionally tagged with a language.
fn is_fence_line(line: &str) -> bool {
   line.trim().strip_prefix("```").is_some_and(|tag| {
      tag.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '+' | '_' | '.'))
   })
}

/// Remove every fence line, wherever it sits in the reply.
fn strip_fences(text: &str) -> String {
   text
      .lines()
      .filter(|line| !is_fence_line(line))
      .collect::<Vec<_>>()
      .join("\n")
      .trim()
      .to_string()
}

/// Greedy word wrap at [`WRAP_WIDTH`] columns, line by line.
///
/// Blank lines survive. Each line keeps its indentation and continuation lines
/// get two more spaces. A single word wider than the limit stays whole.
pub fn split90(text: &str) -> String {
   text.lines().map(wrap_line).collect::<Vec<_>>().join("\n")
}

fn wrap_line(line: &str) -> String {
   let body = line.trim_start();
   if body.is_empty() {
      return String::new();
   }
   let indent = &line[..line.len() - body.len()];
   let continuation = format!("{indent}  ");

   let mut lines = Vec::new();
   let mut current = indent.to_string();
   let mut width = indent.chars().count();
   let mut started = false;

   for word in body.split_whitespace() {
      let word_width = word.chars().count();
      if started && width + 1 + word_width > WRAP_WIDTH {
         lines.push(std::mem::replace(&mut current, continuation.clone()));
         width = continuation.chars().count();
         started = false;
      }
      if started {
         current.push(' ');
         width += 1;
      }
      current.push_str(word);
      width += word_width;
      started = true;
   }
   lines.push(current);
   lines.join("\n")
}

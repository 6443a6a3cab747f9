//! Conventional-commit lint for generated messages.
//!
//! Findings are advisory: the app prints them in verbose mode and commits
//! anyway.

use std::fmt;

pub const VALID_TYPES: &[&str] = &[
   "feat", "fix", "docs", "style", "refactor", "test", "chore", "perf", "ci", "build", "revert",
   "wip", "workflow",
];

/// Accepted gitmoji per type; the first entry is the one suggested.
const GITMOJIS: &[(&str, &[&str])] = &[
   ("feat", &["\u{2728}", "\u{1F680}"]),
   ("fix", &["\u{1F41B}"]),
   ("docs", &["\u{1F4DD}"]),
   ("style", &["\u{1F3A8}"]),
   ("refactor", &["\u{267B}\u{FE0F}"]),
   ("test", &["\u{1F9EA}", "\u{2705}"]),
   ("chore", &["\u{1F527}"]),
   ("perf", &["\u{26A1}"]),
   ("ci", &["\u{1F477}"]),
   ("build", &["\u{1F6E0}\u{FE0F}"]),
   ("revert", &["\u{1F5D1}\u{FE0F}", "\u{23EA}"]),
   ("wip", &["\u{1F6A7}"]),
   ("workflow", &["\u{2699}\u{FE0F}"]),
];

const IMPERATIVE_VERBS: &[&str] = &[
   "add", "update", "fix", "remove", "delete", "create", "implement", "refactor", "optimize",
   "improve", "enhance", "change", "modify", "rename", "move", "copy", "install", "uninstall",
   "build", "test", "run", "start", "stop", "restart", "deploy", "release", "document", "style",
   "format", "lint", "validate", "check", "verify", "ensure", "make", "compile", "bundle",
   "minify", "uglify", "process", "generate", "write", "read", "parse", "serialize",
   "deserialize", "connect", "disconnect", "open", "close", "lock", "unlock", "enable", "disable",
   "bump", "merge", "revert", "simplify", "split", "handle", "support", "use", "clean", "drop",
   "replace", "extract", "introduce", "upgrade", "downgrade", "adjust", "allow", "prevent",
];

const TO_IMPERATIVE: &[(&str, &str)] = &[
   ("added", "Add"),
   ("adds", "Add"),
   ("changes", "Change"),
   ("changed", "Change"),
   ("creating", "Create"),
   ("created", "Create"),
   ("deleting", "Delete"),
   ("deleted", "Delete"),
   ("fixing", "Fix"),
   ("fixed", "Fix"),
   ("fixes", "Fix"),
   ("installing", "Install"),
   ("installed", "Install"),
   ("removing", "Remove"),
   ("removed", "Remove"),
   ("updating", "Update"),
   ("updated", "Update"),
   ("updates", "Update"),
];

const FORBIDDEN_WORDS: &[&str] = &["fixme", "hack", "todo", "bug"];

/// Lint thresholds and requirements.
#[derive(Debug, Clone, Copy)]
pub struct LintOptions {
   pub require_gitmoji:    bool,
   pub require_scope:      bool,
   pub max_length:         usize,
   pub subject_max_length: usize,
}

impl Default for LintOptions {
   fn default() -> Self {
      Self { require_gitmoji: false, require_scope: false, max_length: 72, subject_max_length: 50 }
   }
}

/// Pieces of a commit message's first line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedMessage {
   pub commit_type:     Option<String>,
   pub scope:           Option<String>,
   pub subject:         Option<String>,
   pub gitmoji:         Option<String>,
   pub has_description: bool,
}

impl fmt::Display for ParsedMessage {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      match (&self.commit_type, &self.scope) {
         (Some(t), Some(s)) => write!(f, "{t}({s}): ")?,
         (Some(t), None) => write!(f, "{t}: ")?,
         _ => {},
      }
      if let Some(gitmoji) = &self.gitmoji {
         write!(f, "{gitmoji} - ")?;
      }
      if let Some(subject) = &self.subject {
         f.write_str(subject)?;
      }
      Ok(())
   }
}

/// Outcome of [`validate_message`].
#[derive(Debug, Clone, Default)]
pub struct LintReport {
   pub errors: Vec<String>,
   pub parsed: ParsedMessage,
}

impl LintReport {
   pub fn is_valid(&self) -> bool {
      self.errors.is_empty()
   }
}

fn is_gitmoji(token: &str) -> bool {
   !token.is_empty() && token.chars().all(|c| !c.is_ascii() && !c.is_alphanumeric())
}

fn accepted_gitmojis(commit_type: &str) -> Option<&'static [&'static str]> {
   GITMOJIS
      .iter()
      .find(|(t, _)| *t == commit_type)
      .map(|(_, icons)| *icons)
}

fn same_icon(a: &str, b: &str) -> bool {
   a.trim_end_matches('\u{FE0F}') == b.trim_end_matches('\u{FE0F}')
}

/// Split off a leading gitmoji token.
fn take_gitmoji(text: &str) -> (Option<String>, &str) {
   let text = text.trim_start();
   match text.split_once(char::is_whitespace) {
      Some((head, rest)) if is_gitmoji(head) => (Some(head.to_string()), rest.trim_start()),
      None if is_gitmoji(text) => (Some(text.to_string()), ""),
      _ => (None, text),
   }
}

/// Parse `[gitmoji] type(scope): [gitmoji] [- ]subject` plus an optional body
/// after a blank line.
pub fn parse(message: &str) -> ParsedMessage {
   let message = message.trim();
   let (head, body) = match message.split_once("\n\n") {
      Some((head, body)) => (head, Some(body)),
      None => (message, None),
   };
   let first_line = head.lines().next().unwrap_or_default();

   let mut parsed = ParsedMessage {
      has_description: body.is_some_and(|b| !b.trim().is_empty()),
      ..ParsedMessage::default()
   };

   let (leading, rest) = take_gitmoji(first_line);
   parsed.gitmoji = leading;

   let Some((prefix, after)) = rest.split_once(':') else {
      let subject = rest.trim();
      parsed.subject = (!subject.is_empty()).then(|| subject.to_string());
      return parsed;
   };

   let prefix = prefix.trim();
   let (commit_type, scope) = match prefix.split_once('(') {
      Some((t, s)) if s.ends_with(')') => (t, Some(&s[..s.len() - 1])),
      _ => (prefix, None),
   };
   parsed.commit_type = (!commit_type.is_empty()).then(|| commit_type.to_string());
   parsed.scope = scope.filter(|s| !s.is_empty()).map(str::to_string);

   let (inner, subject) = take_gitmoji(after);
   if parsed.gitmoji.is_none() {
      parsed.gitmoji = inner;
   }
   let subject = subject.trim_start_matches('-').trim();
   parsed.subject = (!subject.is_empty()).then(|| subject.to_string());
   parsed
}

/// Whether `text` starts with a known imperative verb.
pub fn is_imperative_mood(text: &str) -> bool {
   text
      .split_whitespace()
      .next()
      .is_some_and(|w| IMPERATIVE_VERBS.contains(&w.to_lowercase().as_str()))
}

/// Rewrite a leading past/progressive verb into the imperative, when known.
pub fn to_imperative(text: &str) -> String {
   let Some(first) = text.split_whitespace().next() else {
      return text.to_string();
   };
   let lower = first.to_lowercase();
   match TO_IMPERATIVE.iter().find(|(from, _)| *from == lower) {
      Some((_, to)) => {
         let start = text.len() - text.trim_start().len();
         format!("{to}{}", &text[start + first.len()..])
      },
      None => text.to_string(),
   }
}

fn capitalized(s: &str) -> String {
   let mut chars = s.chars();
   chars
      .next()
      .map(|c| c.to_uppercase().chain(chars).collect())
      .unwrap_or_default()
}

/// Lint the first line of `message`.
pub fn validate_message(message: &str, options: &LintOptions) -> LintReport {
   let trimmed = message.trim();
   if trimmed.is_empty() {
      return LintReport {
         errors: vec!["Commit message cannot be empty".to_string()],
         parsed: ParsedMessage::default(),
      };
   }

   let parsed = parse(trimmed);
   let mut errors = Vec::new();

   match parsed.commit_type.as_deref() {
      None => errors.push("Commit type is required".to_string()),
      Some(t) if !VALID_TYPES.contains(&t) => errors.push(format!(
         "Invalid commit type: {t}. Valid types are: {}",
         VALID_TYPES.join(", ")
      )),
      Some(_) => {},
   }

   if options.require_scope && parsed.scope.is_none() {
      errors.push("Scope is required but not provided".to_string());
   }
   if options.require_gitmoji && parsed.gitmoji.is_none() {
      errors.push("Gitmoji is required but not provided".to_string());
   }

   if let (Some(gitmoji), Some(t)) = (&parsed.gitmoji, &parsed.commit_type)
      && let Some(accepted) = accepted_gitmojis(t)
      && !accepted.iter().any(|icon| same_icon(icon, gitmoji))
   {
      errors.push(format!(
         "Gitmoji {gitmoji} does not match commit type {t}. Expected: {}",
         accepted[0]
      ));
   }

   match parsed.subject.as_deref() {
      None => errors.push("Commit subject is required".to_string()),
      Some(subject) => {
         let len = subject.chars().count();
         if len > options.subject_max_length {
            errors.push(format!(
               "Subject is too long ({len} chars). Maximum is {} characters",
               options.subject_max_length
            ));
         }
         if !is_imperative_mood(subject) {
            errors.push(
               "Subject should be in imperative mood (e.g., \"Add feature\" not \"Added feature\")"
                  .to_string(),
            );
         }
         if subject.chars().next().is_some_and(char::is_lowercase) {
            errors.push("Subject should start with a capital letter".to_string());
         }
         if subject.ends_with('.') {
            errors.push("Subject should not end with a period".to_string());
         }
      },
   }

   let first_line = trimmed.lines().next().unwrap_or_default();
   let first_len = first_line.chars().count();
   if first_len > options.max_length {
      errors.push(format!(
         "Commit message is too long ({first_len} chars). Maximum is {} characters",
         options.max_length
      ));
   }

   let lower = trimmed.to_lowercase();
   let found: Vec<&str> = FORBIDDEN_WORDS
      .iter()
      .copied()
      .filter(|word| lower.split(|c: char| !c.is_alphanumeric()).any(|w| w == *word))
      .collect();
   if !found.is_empty() {
      errors.push(format!("Commit message contains forbidden words: {}", found.join(", ")));
   }

   LintReport { errors, parsed }
}

/// Human-readable hints for `message`, errors first.
pub fn suggest_improvements(message: &str) -> Vec<String> {
   let report = validate_message(message, &LintOptions::default());
   let parsed = &report.parsed;
   let mut hints: Vec<String> = report
      .errors
      .iter()
      .map(|e| format!("\u{274C} {e}"))
      .collect();

   if parsed.gitmoji.is_none()
      && let Some(accepted) = parsed.commit_type.as_deref().and_then(accepted_gitmojis)
   {
      hints.push(format!("\u{2728} Consider adding gitmoji: {}", accepted[0]));
   }

   if parsed.scope.is_none()
      && let Some(t) = parsed.commit_type.as_deref()
      && ["feat", "fix", "docs", "style", "refactor"].contains(&t)
   {
      hints.push(format!("\u{1F4DD} Consider adding scope: {t}(<scope>): <subject>"));
   }

   if let Some(subject) = parsed.subject.as_deref() {
      if !is_imperative_mood(subject) {
         let rewritten = to_imperative(subject);
         if rewritten != subject {
            hints.push(format!("\u{1F3AF} Use imperative mood: \"{rewritten}\""));
         }
      }
      if subject.chars().next().is_some_and(char::is_lowercase) {
         hints.push(format!("\u{1F524} Capitalize subject: \"{}\"", capitalized(subject)));
      }
   }

   hints
}

#[cfg(test)]
mod tests {
   use super::*;

   #[test]
   fn test_parse_generated_format() {
      let parsed = parse("feat(api): \u{1F680} - Add retry hint\n\n- Added hint");
      assert_eq!(parsed.commit_type.as_deref(), Some("feat"));
      assert_eq!(parsed.scope.as_deref(), Some("api"));
      assert_eq!(parsed.gitmoji.as_deref(), Some("\u{1F680}"));
      assert_eq!(parsed.subject.as_deref(), Some("Add retry hint"));
      assert!(parsed.has_description);
   }

   #[test]
   fn test_parse_leading_gitmoji_and_no_scope() {
      let parsed = parse("\u{1F41B} fix: Handle empty diff");
      assert_eq!(parsed.gitmoji.as_deref(), Some("\u{1F41B}"));
      assert_eq!(parsed.commit_type.as_deref(), Some("fix"));
      assert_eq!(parsed.scope, None);
      assert_eq!(parsed.subject.as_deref(), Some("Handle empty diff"));
      assert!(!parsed.has_description);
   }

   #[test]
   fn test_parse_deletion_message() {
      let parsed = parse("chore(bar.js):  - File deleted");
      assert_eq!(parsed.commit_type.as_deref(), Some("chore"));
      assert_eq!(parsed.scope.as_deref(), Some("bar.js"));
      assert_eq!(parsed.gitmoji, None);
      assert_eq!(parsed.subject.as_deref(), Some("File deleted"));
   }

   #[test]
   fn test_parse_without_type() {
      let parsed = parse("Update readme");
      assert_eq!(parsed.commit_type, None);
      assert_eq!(parsed.subject.as_deref(), Some("Update readme"));
   }

   #[test]
   fn test_valid_message() {
      let report = validate_message("fix(git): \u{1F41B} - Fix tag parsing", &LintOptions::default());
      assert!(report.is_valid(), "{:?}", report.errors);
   }

   #[test]
   fn test_variation_selector_ignored() {
      let report = validate_message("refactor: \u{267B} - Simplify parser", &LintOptions::default());
      assert!(report.is_valid(), "{:?}", report.errors);
   }

   #[test]
   fn test_invalid_type_and_mismatched_gitmoji() {
      let report = validate_message("feature: \u{1F41B} - Add x", &LintOptions::default());
      assert!(report.errors.iter().any(|e| e.starts_with("Invalid commit type")));

      let report = validate_message("docs: \u{1F41B} - Document x", &LintOptions::default());
      assert!(report.errors.iter().any(|e| e.contains("does not match commit type docs")));
   }

   #[test]
   fn test_subject_rules() {
      let report = validate_message("feat: added the thing.", &LintOptions::default());
      let errors = report.errors.join("\n");
      assert!(errors.contains("imperative mood"));
      assert!(errors.contains("capital letter"));
      assert!(errors.contains("period"));
   }

   #[test]
   fn test_length_limits() {
      let subject = format!("Add {}", "x".repeat(70));
      let report = validate_message(&format!("feat: {subject}"), &LintOptions::default());
      assert!(report.errors.iter().any(|e| e.starts_with("Subject is too long")));
      assert!(report.errors.iter().any(|e| e.starts_with("Commit message is too long")));
   }

   #[test]
   fn test_forbidden_words_match_whole_words() {
      let report = validate_message("fix: Fix bug in parser", &LintOptions::default());
      assert!(report.errors.iter().any(|e| e.contains("forbidden words: bug")));

      let report = validate_message("chore: Add debug logging", &LintOptions::default());
      assert!(!report.errors.iter().any(|e| e.contains("forbidden")));
   }

   #[test]
   fn test_required_scope_and_gitmoji() {
      let options = LintOptions { require_scope: true, require_gitmoji: true, ..Default::default() };
      let report = validate_message("feat: Add x", &options);
      assert!(report.errors.iter().any(|e| e.starts_with("Scope is required")));
      assert!(report.errors.iter().any(|e| e.starts_with("Gitmoji is required")));
   }

   #[test]
   fn test_empty_message() {
      let report = validate_message("  \n", &LintOptions::default());
      assert!(!report.is_valid());
      assert_eq!(report.parsed, ParsedMessage::default());
   }

   #[test]
   fn test_to_imperative() {
      assert_eq!(to_imperative("added retry"), "Add retry");
      assert_eq!(to_imperative("Fixed crash on start"), "Fix crash on start");
      assert_eq!(to_imperative("Refine docs"), "Refine docs");
      assert_eq!(to_imperative(""), "");
   }

   #[test]
   fn test_suggestions() {
      let hints = suggest_improvements("feat: updated readme");
      assert!(hints.iter().any(|h| h.contains("Consider adding gitmoji: \u{2728}")));
      assert!(hints.iter().any(|h| h.contains("Consider adding scope")));
      assert!(hints.iter().any(|h| h.contains("\"Update readme\"")));
      assert!(hints.iter().any(|h| h.contains("Capitalize subject: \"Updated readme\"")));
   }

   #[test]
   fn test_display_rebuilds_first_line() {
      let parsed = parse("fix(git): \u{1F41B} - Fix tag parsing");
      assert_eq!(parsed.to_string(), "fix(git): \u{1F41B} - Fix tag parsing");
   }
}

//! Prompt templates sent to the chat model.
//!
//! Two template families exist. `v03` fences the template and diff with dashed
//! `-------Begin-…-------` tags, `v04` with `[name]='''` blocks. Each family
//! ends with one of two description-list instructions.

use std::{fmt, str::FromStr};

use crate::error::{AiCommitError, ErrorCode, Result};

/// Template family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PromptVersion {
   V03,
   #[default]
   V04,
}

impl PromptVersion {
   pub const ALL: [Self; 2] = [Self::V03, Self::V04];

   pub const fn as_str(self) -> &'static str {
      match self {
         Self::V03 => "v03",
         Self::V04 => "v04",
      }
   }
}

impl FromStr for PromptVersion {
   type Err = AiCommitError;

   fn from_str(s: &str) -> Result<Self> {
      match s {
         "v03" => Ok(Self::V03),
         "v04" => Ok(Self::V04),
         other => Err(AiCommitError::validation(
            ErrorCode::ValidationInvalidFormat,
            format!("Invalid prompt version: {other}. Valid options are: v03, v04"),
            Some("version"),
         )),
      }
   }
}

/// Closing instruction: one description list for the whole diff, or one list
/// per file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DescriptionList {
   #[default]
   Single,
   PerFile,
}

impl DescriptionList {
   pub const fn suffix(self) -> &'static str {
      match self {
         Self::Single => "",
         Self::PerFile => "s",
      }
   }

   pub fn from_suffix(suffix: &str) -> Result<Self> {
      match suffix {
         "" => Ok(Self::Single),
         "s" => Ok(Self::PerFile),
         other => Err(AiCommitError::validation(
            ErrorCode::ValidationInvalidFormat,
            format!("Invalid prompt suffix: {other}. Valid options are: '', 's'"),
            Some("suffix"),
         )),
      }
   }

   const fn instruction(self) -> &'static str {
      match self {
         Self::Single => {
            "- Ensure, using bullet points, to list all changes, updates, additions, and \
             deletions made in the git diff in detail and include nothing else: <description>"
         },
         Self::PerFile => {
            "- Ensure that the description is a list with all changes, updates, additions, and \
             deletions made for each file in the git diff in detail, using bullet points and \
             nothing else!: <description>"
         },
      }
   }
}

/// A fully selected template: family plus closing instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PromptTemplate {
   pub version: PromptVersion,
   pub list:    DescriptionList,
}

impl PromptTemplate {
   pub const fn new(version: PromptVersion, list: DescriptionList) -> Self {
      Self { version, list }
   }

   /// Render the template around `git_diff`, one entry per prompt line.
   pub fn lines(&self, git_diff: &str) -> Vec<String> {
      let mut lines = match self.version {
         PromptVersion::V03 => v03_head(git_diff),
         PromptVersion::V04 => v04_head(git_diff),
      };
      lines.extend(ANALYSIS_INSTRUCTIONS.iter().map(|s| (*s).to_string()));
      lines.push(self.list.instruction().to_string());
      lines
   }

   /// Render the template around `git_diff` as a single prompt string.
   pub fn render(&self, git_diff: &str) -> String {
      self.lines(git_diff).join("\n")
   }
}

impl fmt::Display for PromptTemplate {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      write!(f, "{}{}", self.version.as_str(), self.list.suffix())
   }
}

/// Parses the combined `v03`, `v04`, `v03s`, `v04s` form.
impl FromStr for PromptTemplate {
   type Err = AiCommitError;

   fn from_str(s: &str) -> Result<Self> {
      let (version, suffix) = match s.strip_suffix('s') {
         Some(version) => (version, "s"),
         None => (s, ""),
      };
      Ok(Self::new(version.parse()?, DescriptionList::from_suffix(suffix)?))
   }
}

fn dashed(tag: &str) -> String {
   format!("{0}{tag}{0}", "-".repeat(7))
}

const PREAMBLE: &str = "Remember that the goal of a commit message is to provide a clear and \
                        concise summary of the changes made, which will be helpful for future \
                        developers who are working on the project.";

fn v03_head(git_diff: &str) -> Vec<String> {
   vec![
      "Please provide a conventional commit message following this template:".to_string(),
      dashed("Begin-Template"),
      "<type>(scope): <gitmoji> - <subject>".to_string(),
      String::new(),
      "<description>".to_string(),
      dashed("End-Template"),
      "Given the following git diff:".to_string(),
      dashed("Begin-GitDiff"),
      git_diff.to_string(),
      dashed("End-GitDiff"),
      PREAMBLE.to_string(),
   ]
}

fn v04_head(git_diff: &str) -> Vec<String> {
   vec![
      "Please provide a conventional commit message following this [template]:".to_string(),
      "[template]='''".to_string(),
      "<type>(scope): <gitmoji> - <subject>".to_string(),
      String::new(),
      "<description>".to_string(),
      "'''".to_string(),
      "Given the following [git diff]:".to_string(),
      "[git diff]='''".to_string(),
      git_diff.to_string(),
      "'''".to_string(),
      PREAMBLE.to_string(),
   ]
}

const ANALYSIS_INSTRUCTIONS: &[&str] = &[
   "Analyze the given git diff and make sure to:",
   "- Identify the type of changes made in the diff, such as `feat`, `fix`, `docs`, `style`, \
    `refactor`, `test`, or `chore`: <type>",
   "- If necessary, select a scope from files, directories, or topics: <scope>",
   "- Choose a gitmoji icon character that corresponds to the type of changes made in the \
    diff, such as \u{1F680} for `feat`, \u{1F41B} for `fix`, \u{1F4DD} for `docs`, \u{1F3A8} \
    for `style`, \u{267B}\u{FE0F} for `refactor`, \u{1F9EA} for `test`, or \u{1F527} for \
    `chore`: <gitmoji>",
   "- Ensure that the subject begins with an imperative verb and is no longer than 40 \
    characters: <subject>",
];

/// Release-summary prompt over newline-joined commit subjects.
pub fn release_summary_prompt(commits_text: &str) -> String {
   format!(
      "Craft a concise, imperative sentence (less than 80 characters) that distills the essence \
       of the previous release, based on a thorough analysis of the Git commit messages. What \
       key features, bug fixes, or improvements can be highlighted in a single, action-oriented \
       statement? Consider the tone and style of the sentence, ensuring it's clear, concise, and \
       engaging for developers and users alike. Provide a sentence that begins with a verb like \
       'Fix', 'Improve', 'Enhance', or 'Optimize', and includes relevant details from the commit \
       messages:\n[Git commits]\n{commits_text}"
   )
}

use std::fmt;

use clap::Parser;

// === CLI ===

#[derive(Parser, Debug, Default, Clone)]
#[command(
   name = "ai-commit",
   version,
   about = "Generate conventional commit messages for staged changes with an LLM"
)]
pub struct Args {
   /// Commit all staged files with a single message instead of one per file
   #[arg(long, short = 'a')]
   pub all: bool,

   /// Skip every confirmation prompt
   #[arg(long, short = 'f')]
   pub force: bool,

   /// Tag a release with an AI-written summary of the commits since the last
   /// tag
   #[arg(long, short = 'r')]
   pub release: bool,

   /// Lines of context in the staged diff (0-10, default 1)
   #[arg(long, short = 'u', value_name = "N", allow_hyphen_values = true)]
   pub unified: Option<String>,

   /// Prompt template: v03, v04, v03s or v04s (default v04)
   #[arg(long, value_name = "VERSION")]
   pub prompt: Option<String>,

   /// API key (falls back to OPENROUTER_API_KEY, then OPENAI_API_KEY)
   #[arg(long = "api-key", alias = "apiKey", value_name = "KEY")]
   pub api_key: Option<String>,

   /// Model identifier (default: openrouter/auto)
   #[arg(long, short = 'm')]
   pub model: Option<String>,

   /// Print prompts, git commands and lint hints
   #[arg(long, short = 'v')]
   pub verbose: bool,

   /// Show the estimated API cost and ask before each request
   #[arg(long = "filter-fee", alias = "filterFee")]
   pub filter_fee: bool,
}

// === Staged files ===

/// Status letter from `git diff --cached --name-status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
   Added,
   Modified,
   Deleted,
   Renamed,
   Copied,
   TypeChanged,
   Unmerged,
   Unknown(char),
}

impl FileStatus {
   /// Parse the leading letter; rename/copy similarity scores are ignored.
   pub fn from_code(code: &str) -> Option<Self> {
      let letter = code.trim().chars().next()?.to_ascii_uppercase();
      Some(match letter {
         'A' => Self::Added,
         'M' => Self::Modified,
         'D' => Self::Deleted,
         'R' => Self::Renamed,
         'C' => Self::Copied,
         'T' => Self::TypeChanged,
         'U' => Self::Unmerged,
         other => Self::Unknown(other),
      })
   }

   pub const fn letter(self) -> char {
      match self {
         Self::Added => 'A',
         Self::Modified => 'M',
         Self::Deleted => 'D',
         Self::Renamed => 'R',
         Self::Copied => 'C',
         Self::TypeChanged => 'T',
         Self::Unmerged => 'U',
         Self::Unknown(c) => c,
      }
   }
}

/// One staged path. Renames and copies remember their source path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedFile {
   pub status: FileStatus,
   pub path:   String,
   pub from:   Option<String>,
}

impl StagedFile {
   /// Parse `git diff --name-status -z` output: NUL-separated records of a
   /// status field followed by one path, or two for renames and copies.
   pub fn parse_records(output: &str) -> Vec<Self> {
      let mut fields = output.split('\0');
      let mut files = Vec::new();

      while let Some(code) = fields.next() {
         let Some(status) = FileStatus::from_code(code) else {
            continue;
         };
         let Some(first) = fields.next().filter(|p| !p.is_empty()) else {
            break;
         };
         let file = if matches!(status, FileStatus::Renamed | FileStatus::Copied) {
            let Some(to) = fields.next().filter(|p| !p.is_empty()) else {
               break;
            };
            Self { status, path: to.to_string(), from: Some(first.to_string()) }
         } else {
            Self { status, path: first.to_string(), from: None }
         };
         files.push(file);
      }
      files
   }

   pub const fn is_deleted(&self) -> bool {
      matches!(self.status, FileStatus::Deleted)
   }

   /// Paths a commit for this entry has to include.
   pub fn pathspecs(&self) -> Vec<&str> {
      match &self.from {
         Some(from) if matches!(self.status, FileStatus::Renamed) => {
            vec![from.as_str(), self.path.as_str()]
         },
         _ => vec![self.path.as_str()],
      }
   }
}

impl fmt::Display for StagedFile {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      match &self.from {
         Some(from) => write!(f, "{}\t{from}\t{}", self.status.letter(), self.path),
         None => write!(f, "{}\t{}", self.status.letter(), self.path),
      }
   }
}

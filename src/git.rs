use std::{
   io::Write,
   path::{Path, PathBuf},
   process::{Command, Stdio},
};

use semver::Version;

use crate::{
   error::{AiCommitError, ErrorCode, Result},
   sanitize::{
      escape_git_arg, is_valid_file_path, is_valid_git_ref, is_valid_unified_value,
      sanitize_shell_input,
   },
   style::Logger,
   types::StagedFile,
};

/// Typed wrapper over the git subprocess calls this tool needs.
///
/// git is always spawned with an argument vector, never through a shell, and
/// every argument that comes from outside the program is validated first.
#[derive(Debug, Clone)]
pub struct GitOperations {
   dir: PathBuf,
   log: Logger,
}

impl Default for GitOperations {
   fn default() -> Self {
      Self::new(".")
   }
}

impl GitOperations {
   pub fn new(dir: impl Into<PathBuf>) -> Self {
      Self { dir: dir.into(), log: Logger::default() }
   }

   pub const fn with_logger(mut self, log: Logger) -> Self {
      self.log = log;
      self
   }

   pub fn dir(&self) -> &Path {
      &self.dir
   }

   /// Render a command line for traces and error messages.
   fn render(args: &[&str]) -> String {
      let mut line = String::from("git");
      for arg in args {
         line.push(' ');
         if arg.is_empty() || arg.contains(char::is_whitespace) || arg.contains('"') {
            line.push('"');
            line.push_str(&escape_git_arg(arg));
            line.push('"');
         } else {
            line.push_str(arg);
         }
      }
      line
   }

   /// Shell-pasteable command line for the verbose trace.
   fn trace(args: &[&str]) -> String {
      let mut line = String::from("git");
      for arg in args {
         line.push(' ');
         line.push_str(&sanitize_shell_input(arg, false));
      }
      line
   }

   /// Run git and return stdout. Spawn failures and non-zero exits become a
   /// Git error carrying `code`.
   fn run(&self, args: &[&str], code: ErrorCode, stdin: Option<&str>) -> Result<String> {
      let rendered = Self::render(args);
      self.log.debug(&Self::trace(args));

      let mut cmd = Command::new("git");
      cmd.args(args)
         .current_dir(&self.dir)
         .stdout(Stdio::piped())
         .stderr(Stdio::piped());
      if stdin.is_some() {
         cmd.stdin(Stdio::piped());
      } else {
         cmd.stdin(Stdio::null());
      }

      let spawn_err = |e: std::io::Error| {
         AiCommitError::git(code, format!("Failed to run {rendered}: {e}"), Some(&rendered))
      };

      let mut child = cmd.spawn().map_err(spawn_err)?;
      if let (Some(input), Some(mut pipe)) = (stdin, child.stdin.take()) {
         pipe.write_all(input.as_bytes()).map_err(spawn_err)?;
      }
      let output = child.wait_with_output().map_err(spawn_err)?;

      if !output.status.success() {
         let stderr = String::from_utf8_lossy(&output.stderr);
         return Err(AiCommitError::git(
            code,
            format!("{} failed: {}", rendered, stderr.trim()),
            Some(&rendered),
         ));
      }

      Ok(String::from_utf8_lossy(&output.stdout).into_owned())
   }

   fn reject(what: &str, value: &str, code: ErrorCode) -> AiCommitError {
      AiCommitError::git(code, format!("Refusing unsafe {what}: {value:?}"), None)
   }

   fn check_ref(reference: &str) -> Result<()> {
      if is_valid_git_ref(reference) {
         Ok(())
      } else {
         Err(Self::reject("git reference", reference, ErrorCode::SecurityInjectionAttempt))
      }
   }

   fn check_path(path: &str) -> Result<()> {
      if is_valid_file_path(path) {
         Ok(())
      } else {
         Err(Self::reject("file path", path, ErrorCode::SecurityInjectionAttempt))
      }
   }

   /// Ensure we are inside a work tree, then move the process into the
   /// repository root. Returns the root.
   pub fn find_git_root(&mut self) -> Result<PathBuf> {
      self
         .run(&["rev-parse", "--is-inside-work-tree"], ErrorCode::GitNotRepository, None)
         .map_err(|_| {
            AiCommitError::git(
               ErrorCode::GitNotRepository,
               "You are not inside a Git repository.",
               Some("git rev-parse --is-inside-work-tree"),
            )
         })?;

      let start = if self.dir.is_absolute() {
         self.dir.clone()
      } else {
         std::env::current_dir()?.join(&self.dir)
      };

      let Some(root) = repo_root(&start) else {
         return Err(AiCommitError::git(
            ErrorCode::GitNotRepository,
            "Unable to find the root of the Git repository.",
            None,
         ));
      };

      std::env::set_current_dir(&root).map_err(|e| {
         AiCommitError::git(
            ErrorCode::GitError,
            format!("Failed to change directory to {}: {e}", root.display()),
            None,
         )
      })?;
      self.log.info(&format!("Changed working directory to: {}", root.display()));
      self.dir.clone_from(&root);
      Ok(root)
   }

   /// Best-effort check; any failure reads as "not a repository".
   pub fn is_inside_git_repository(&self) -> bool {
      self
         .run(&["rev-parse", "--is-inside-work-tree"], ErrorCode::GitNotRepository, None)
         .is_ok_and(|out| out.trim() == "true")
   }

   /// Most recent reachable tag as a clean semantic version, or `None` when
   /// there is no tag, it is not semver, or the lookup fails.
   pub fn get_latest_tag(&self) -> Option<String> {
      self.get_latest_tag_name().as_deref().and_then(clean_version)
   }

   /// Most recent reachable tag exactly as named in the repository.
   pub fn get_latest_tag_name(&self) -> Option<String> {
      let tag = self
         .run(&["describe", "--tags", "--abbrev=0"], ErrorCode::GitLogFailed, None)
         .ok()?;
      let tag = tag.trim();
      (!tag.is_empty()).then(|| tag.to_string())
   }

   /// Oldest commit reachable from HEAD since `tag`, or since the beginning of
   /// history when `tag` is `None`.
   pub fn get_latest_commit(&self, tag: Option<&str>) -> Result<Option<String>> {
      let range = match tag {
         Some(tag) => {
            Self::check_ref(tag)?;
            format!("{tag}..HEAD")
         },
         None => "HEAD".to_string(),
      };
      let out = self.run(&["log", &range, "--pretty=format:%H"], ErrorCode::GitLogFailed, None)?;
      Ok(out
         .lines()
         .map(str::trim)
         .rfind(|line| !line.is_empty())
         .map(str::to_string))
   }

   /// Subjects of the commits after `since` (exclusive) up to HEAD, one per
   /// line.
   pub fn get_commits_text(&self, since: &str) -> Result<String> {
      Self::check_ref(since)?;
      let range = format!("{since}..HEAD");
      let out = self.run(&["log", &range, "--pretty=format:%s"], ErrorCode::GitLogFailed, None)?;
      Ok(out.trim().to_string())
   }

   /// Subject line of a single commit.
   pub fn get_commit_subject(&self, hash: &str) -> Result<String> {
      Self::check_ref(hash)?;
      let out =
         self.run(&["log", "-1", "--pretty=format:%s", hash], ErrorCode::GitLogFailed, None)?;
      Ok(out.trim().to_string())
   }

   /// Staged entries in the order git reports them; empty when nothing is
   /// staged. Paths come back verbatim, never C-quoted.
   pub fn get_staged_files(&self) -> Result<Vec<StagedFile>> {
      let out = self.run(
         &["-c", "core.quotePath=false", "diff", "--cached", "--name-status", "-z"],
         ErrorCode::GitStagingFailed,
         None,
      )?;
      Ok(StagedFile::parse_records(&out))
   }

   /// Staged diff with `unified` lines of context, for one file or for the
   /// whole index.
   pub fn get_staged_diff(&self, file: Option<&str>, unified: u8) -> Result<String> {
      if !is_valid_unified_value(unified) {
         return Err(Self::reject(
            "diff context",
            &unified.to_string(),
            ErrorCode::SecurityInvalidInput,
         ));
      }
      let context = format!("-U{unified}");
      let mut args = vec!["diff", context.as_str(), "--staged"];
      if let Some(file) = file {
         Self::check_path(file)?;
         args.extend(["--", file]);
      }
      let out = self.run(&args, ErrorCode::GitDiffFailed, None)?;
      Ok(out.trim().to_string())
   }

   /// Commit `file` (or everything staged, as `.`) with `message` piped on
   /// stdin.
   pub fn commit(&self, message: &str, file: Option<&str>) -> Result<()> {
      self.commit_paths(message, &[file.unwrap_or(".")])
   }

   /// Commit several paths at once (a rename needs both sides).
   pub fn commit_paths(&self, message: &str, paths: &[&str]) -> Result<()> {
      if message.trim().is_empty() {
         return Err(AiCommitError::validation(
            ErrorCode::ValidationRequired,
            "Commit message is required",
            Some("message"),
         ));
      }
      for path in paths {
         Self::check_path(path)?;
      }

      let mut args = vec!["commit", "-F", "-", "--"];
      args.extend_from_slice(paths);

      self.log.step(&format!("Committing {} ...", paths.join(", ")));
      self.run(&args, ErrorCode::GitCommitFailed, Some(message))?;
      self.log.success("Commit successful!");
      Ok(())
   }

   /// Create the annotated release tag `tag` with `message`.
   pub fn create_release_tag(&self, tag: &str, message: &str) -> Result<()> {
      Self::check_ref(tag)?;
      if message.trim().is_empty() {
         return Err(AiCommitError::validation(
            ErrorCode::ValidationRequired,
            "Release message is required",
            Some("message"),
         ));
      }
      self.run(&["tag", "-a", tag, "-m", message], ErrorCode::GitTagFailed, None)?;
      Ok(())
   }
}

/// Nearest directory at or above `start` holding a `.git` entry. The
/// filesystem root itself is never a candidate.
fn repo_root(start: &Path) -> Option<PathBuf> {
   start
      .ancestors()
      .take_while(|dir| dir.parent().is_some())
      .find(|dir| dir.join(".git").exists())
      .map(Path::to_path_buf)
}

/// Normalize a tag such as `v1.2.3` to `1.2.3`. Non-semver tags yield `None`.
pub fn clean_version(tag: &str) -> Option<String> {
   let trimmed = tag.trim().trim_start_matches(['=', 'v', 'V']).trim();
   Version::parse(trimmed).ok().map(|v| v.to_string())
}

/// Next release tag: patch bump of a three-part version, `0.0.0` when there is
/// no previous tag.
pub fn next_tag(latest: Option<&str>) -> String {
   let Some(tag) = latest else {
      return "0.0.0".to_string();
   };
   let parts: Vec<&str> = tag.split('.').collect();
   if parts.len() != 3 {
      return tag.to_string();
   }
   let number = |s: &str| -> u64 {
      let digits: String = s.chars().take_while(char::is_ascii_digit).collect();
      digits.parse().unwrap_or(0)
   };
   format!("{}.{}.{}", number(parts[0]), number(parts[1]), number(parts[2]) + 1)
}

//! Shared helpers for integration tests: throwaway git repositories and a
//! scripted chat client.
#![allow(dead_code, reason = "not every test file uses every helper")]

use std::{cell::RefCell, fs, path::Path, process::Command, rc::Rc};

use ai_commit::{
   AiCommitError, Args, Config, ErrorCode, Result, api::ChatClient, config::Env,
   interact::Confirm,
};
use tempfile::TempDir;

/// Run git in `dir`, panicking with stderr on failure. Returns stdout.
pub fn git(dir: &Path, args: &[&str]) -> String {
   let output = Command::new("git")
      .args(args)
      .current_dir(dir)
      .output()
      .expect("failed to spawn git");
   assert!(
      output.status.success(),
      "git {args:?} failed: {}",
      String::from_utf8_lossy(&output.stderr)
   );
   String::from_utf8_lossy(&output.stdout).into_owned()
}

/// Empty repository with a local identity and signing disabled.
pub fn init_repo() -> TempDir {
   let dir = tempfile::tempdir().expect("failed to create temp dir");
   let path = dir.path();
   git(path, &["init", "-q"]);
   git(path, &["config", "user.name", "Test User"]);
   git(path, &["config", "user.email", "test@example.com"]);
   git(path, &["config", "commit.gpgsign", "false"]);
   git(path, &["config", "tag.gpgsign", "false"]);
   dir
}

pub fn write(dir: &Path, name: &str, contents: &str) {
   let file = dir.join(name);
   if let Some(parent) = file.parent() {
      fs::create_dir_all(parent).expect("failed to create parent dir");
   }
   fs::write(file, contents).expect("failed to write file");
}

/// Stage `files` and commit them with `message`.
pub fn commit_files(dir: &Path, files: &[(&str, &str)], message: &str) {
   for (name, contents) in files {
      write(dir, name, contents);
      git(dir, &["add", name]);
   }
   git(dir, &["commit", "-q", "-m", message]);
}

/// Commit subjects, newest first.
pub fn subjects(dir: &Path) -> Vec<String> {
   git(dir, &["log", "--pretty=format:%s"])
      .lines()
      .map(str::to_string)
      .collect()
}

/// Config with a dummy key plus whatever `args` sets.
pub fn config(args: Args) -> Config {
   let env: Env = [("OPENROUTER_API_KEY".to_string(), "test-key".to_string())]
      .into_iter()
      .collect();
   Config::load(&args, &env)
}

/// Chat client that replies with canned text and records every prompt.
#[derive(Clone)]
pub struct ScriptedClient {
   reply:       std::result::Result<String, ErrorCode>,
   pub prompts: Rc<RefCell<Vec<String>>>,
}

impl ScriptedClient {
   pub fn replying(text: &str) -> Self {
      Self { reply: Ok(text.to_string()), prompts: Rc::default() }
   }

   pub fn failing(code: ErrorCode) -> Self {
      Self { reply: Err(code), prompts: Rc::default() }
   }

   pub fn calls(&self) -> usize {
      self.prompts.borrow().len()
   }
}

impl ChatClient for ScriptedClient {
   fn model(&self) -> &str {
      "test/scripted"
   }

   fn send_message(&self, text: &str) -> Result<String> {
      self.prompts.borrow_mut().push(text.to_string());
      self
         .reply
         .clone()
         .map_err(|code| AiCommitError::api(code, code.message(), None))
   }
}

/// Answers every question the same way and counts how often it was asked.
#[derive(Clone, Default)]
pub struct CountingConfirm {
   answer:    bool,
   pub asked: Rc<RefCell<Vec<String>>>,
}

impl CountingConfirm {
   pub fn answering(answer: bool) -> Self {
      Self { answer, asked: Rc::default() }
   }
}

impl Confirm for CountingConfirm {
   fn confirm(&self, message: &str, _default: bool) -> Result<bool> {
      self.asked.borrow_mut().push(message.to_string());
      Ok(self.answer)
   }
}

use std::fmt;

use crate::{
   api::ChatClient,
   config::Config,
   error::{AiCommitError, ErrorCode, Result},
   generator::CommitGenerator,
   git::{GitOperations, clean_version, next_tag},
   interact::Confirm,
   style::{self, Logger, icons},
   templates::PromptTemplate,
   types::StagedFile,
   validation::suggest_improvements,
};

/// How a successful run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
   Committed { count: usize },
   Released { tag: String },
   NothingToRelease,
}

impl fmt::Display for Outcome {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      match self {
         Self::Committed { count: 1 } => f.write_str("Created 1 commit"),
         Self::Committed { count } => write!(f, "Created {count} commits"),
         Self::Released { tag } => write!(f, "Tagged release {tag}"),
         Self::NothingToRelease => f.write_str("Nothing to release"),
      }
   }
}

/// Message used for a staged deletion; no model call is made for it.
pub fn deletion_message(path: &str) -> String {
   format!("chore({path}):  - File deleted")
}

/// One run: validate config, move to the repository root, then either tag a
/// release or commit staged changes.
pub struct App<C, K> {
   config:    Config,
   git:       GitOperations,
   generator: CommitGenerator<C>,
   confirm:   K,
   log:       Logger,
}

impl<C: ChatClient, K: Confirm> App<C, K> {
   pub fn new(
      config: Config,
      git: GitOperations,
      generator: CommitGenerator<C>,
      confirm: K,
   ) -> Self {
      let log = Logger::new(config.verbose());
      Self { config, git, generator, confirm, log }
   }

   pub fn run(&mut self) -> Result<Outcome> {
      self.config.require_valid()?;
      self.log.debug(&format!(
         "model={} prompt={} unified={} all={} force={} release={} filter_fee={}",
         self.config.model(),
         self.config.prompt()?,
         self.config.unified(),
         self.config.all(),
         self.config.force(),
         self.config.release(),
         self.config.filter_fee()
      ));

      self.git.find_git_root()?;

      if self.config.release() {
         self.release_flow()
      } else if self.config.all() {
         self.commit_all()
      } else {
         self.commit_each()
      }
   }

   /// Ask unless forced; a "no" aborts the whole run.
   fn confirm_or_abort(&self, question: &str, aborted: &str) -> Result<()> {
      if self.config.force() || self.confirm.confirm(question, true)? {
         Ok(())
      } else {
         Err(AiCommitError::Aborted(aborted.to_string()))
      }
   }

   fn present(&self, title: &str, message: &str) {
      println!("{}", style::boxed_message(title, message, style::term_width()));
      if self.log.verbose() {
         for hint in suggest_improvements(message) {
            self.log.info(&hint);
         }
      }
   }

   fn release_flow(&self) -> Result<Outcome> {
      let tag_name = self.git.get_latest_tag_name();
      let version = tag_name.as_deref().and_then(clean_version);
      let since = tag_name.as_deref().filter(|_| version.is_some());
      self.log.info(&format!("Latest release: {}", version.as_deref().unwrap_or("none")));

      let Some(oldest) = self.git.get_latest_commit(since)? else {
         self.log.warn("No commits since the last release, nothing to tag");
         return Ok(Outcome::NothingToRelease);
      };

      let mut subjects = Vec::new();
      let newer = self.git.get_commits_text(&oldest)?;
      if !newer.is_empty() {
         subjects.push(newer);
      }
      subjects.push(self.git.get_commit_subject(&oldest)?);
      let commits_text = subjects.join("\n");
      self.log.debug(&format!("Commits since last release:\n{commits_text}"));

      eprintln!(
         "{} Summarizing release with {}",
         icons::ROBOT,
         style::model(self.generator.client().model())
      );
      let summary = self.generator.generate_release_summary(&commits_text)?;
      let tag = next_tag(version.as_deref());

      println!("{} {} {}", style::bold(&tag), icons::ARROW, summary);
      self.confirm_or_abort("Do you want to continue?", "Release aborted by user")?;

      self.git.create_release_tag(&tag, &summary)?;
      self.log.success(&format!("{} Created release tag {tag}", icons::ROCKET));
      Ok(Outcome::Released { tag })
   }

   fn commit_all(&self) -> Result<Outcome> {
      let version = self.config.prompt()?.version;
      let diff = self.git.get_staged_diff(None, self.config.unified())?;
      if diff.is_empty() {
         return Err(AiCommitError::git(
            ErrorCode::GitNoChanges,
            "No staged changes to commit",
            None,
         ));
      }

      eprintln!(
         "{} Generating commit message with {}",
         icons::ROBOT,
         style::model(self.generator.client().model())
      );
      let Some(message) = self.generator.generate_single_commit_all(&diff, version)? else {
         return Err(AiCommitError::application("Commit message generation was cancelled"));
      };

      self.present("Commit message", &message);
      self.confirm_or_abort("Do you want to continue?", "Commit aborted by user")?;

      self.git.commit(&message, None)?;
      Ok(Outcome::Committed { count: 1 })
   }

   fn commit_each(&self) -> Result<Outcome> {
      let template = self.config.prompt()?;
      let files = self.git.get_staged_files()?;
      if files.is_empty() {
         return Err(AiCommitError::git(
            ErrorCode::GitNoChanges,
            "No staged changes to commit",
            None,
         ));
      }
      self.log.info(&format!("{} staged file(s)", files.len()));

      let mut count = 0;
      for file in &files {
         self.commit_file(file, template)?;
         count += 1;
      }
      Ok(Outcome::Committed { count })
   }

   fn commit_file(&self, file: &StagedFile, template: PromptTemplate) -> Result<()> {
      if file.is_deleted() {
         self.log.step(&format!("{} deleted", file.path));
         return self.git.commit_paths(&deletion_message(&file.path), &file.pathspecs());
      }

      let diff = self.git.get_staged_diff(Some(&file.path), self.config.unified())?;
      if diff.is_empty() {
         return Err(AiCommitError::git(
            ErrorCode::GitNoChanges,
            format!("No staged changes found for {}", file.path),
            None,
         ));
      }

      eprintln!(
         "{} Generating commit message for {} with {}",
         icons::ROBOT,
         style::bold(&file.path),
         style::model(self.generator.client().model())
      );
      let Some(message) = self.generator.generate_single_commit(&diff, template)? else {
         return Err(AiCommitError::application(format!(
            "Commit message generation was cancelled for {}",
            file.path
         )));
      };

      self.present(&file.path, &message);
      self.confirm_or_abort(
         &format!("Do you want to continue with commit for {}?", file.path),
         &format!("Commit aborted by user at {}", file.path),
      )?;

      self.git.commit_paths(&message, &file.pathspecs())
   }
}

use std::process::ExitCode;

use ai_commit::{
   App, Args, Config, Outcome, Result,
   api::ApiClient,
   generator::CommitGenerator,
   git::GitOperations,
   interact::TerminalConfirm,
   style::Logger,
   tokens::{CostFilter, TokenCounter},
};
use clap::Parser;

fn run(config: Config, log: Logger) -> Result<Outcome> {
   config.require_valid()?;

   let client = ApiClient::new(config.api_key()?, Some(config.model()))?;
   let preflight =
      CostFilter::new(TokenCounter::new(config.model()), config.filter_fee(), TerminalConfirm, log);
   let generator = CommitGenerator::new(client, config.verbose()).with_preflight(preflight);
   let git = GitOperations::default().with_logger(log);

   App::new(config, git, generator, TerminalConfirm).run()
}

fn main() -> ExitCode {
   // A missing .env file is fine
   dotenvy::dotenv().ok();

   let args = Args::parse();
   let config = Config::from_process(&args);
   let log = Logger::new(config.verbose());

   match run(config, log) {
      Ok(outcome) => {
         log.success(&outcome.to_string());
         ExitCode::SUCCESS
      },
      Err(e) => {
         if e.is_aborted() {
            log.warn(&e.to_string());
         } else {
            log.error(&e.to_string());
            log.debug(&format!("{} [{}]", e.code(), e.category()));
         }
         let code = u8::try_from(e.exit_code()).unwrap_or(1);
         ExitCode::from(code)
      },
   }
}

use std::fmt;

use thiserror::Error;

/// Numeric error codes, grouped by domain in the thousands digit:
/// 1 application, 2 configuration, 3 git, 4 api, 5 validation, 6 security.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ErrorCode {
   ApplicationError           = 1000,
   ApplicationInitFailed      = 1001,
   ApplicationShutdownFailed  = 1002,
   ApplicationTimeout         = 1003,

   ConfigurationError         = 2000,
   ConfigurationMissing       = 2001,
   ConfigurationInvalid       = 2002,
   ConfigurationFileNotFound  = 2003,
   ConfigurationParseError    = 2004,
   ConfigurationEnvVarMissing = 2005,

   GitError                   = 3000,
   GitNotRepository           = 3001,
   GitNoChanges               = 3002,
   GitCommitFailed            = 3003,
   GitTagFailed               = 3004,
   GitDiffFailed              = 3005,
   GitLogFailed               = 3006,
   GitStagingFailed           = 3007,
   GitCommandTimeout          = 3008,
   GitInvalidRef              = 3009,

   ApiError                   = 4000,
   ApiConnectionFailed        = 4001,
   ApiTimeout                 = 4002,
   ApiRateLimit               = 4003,
   ApiAuthFailed              = 4004,
   ApiInvalidResponse         = 4005,
   ApiServiceUnavailable      = 4006,

   ValidationError            = 5000,
   ValidationRequired         = 5001,
   ValidationInvalidFormat    = 5002,
   ValidationLength           = 5003,
   ValidationType             = 5004,
   ValidationRange            = 5005,
   ValidationPattern          = 5006,

   SecurityError              = 6000,
   SecurityInjectionAttempt   = 6001,
   SecurityInvalidInput       = 6002,
   SecurityPermissionDenied   = 6003,
   SecurityTokenInvalid       = 6004,
   SecurityAuthRequired       = 6005,
}

/// Coarse error category derived from an [`ErrorCode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
   Application,
   Configuration,
   Git,
   Api,
   Validation,
   Security,
}

impl ErrorCategory {
   pub const fn as_str(self) -> &'static str {
      match self {
         Self::Application => "application",
         Self::Configuration => "configuration",
         Self::Git => "git",
         Self::Api => "api",
         Self::Validation => "validation",
         Self::Security => "security",
      }
   }
}

impl fmt::Display for ErrorCategory {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      f.write_str(self.as_str())
   }
}

impl ErrorCode {
   pub const fn as_u16(self) -> u16 {
      self as u16
   }

   pub const fn category(self) -> ErrorCategory {
      match self.as_u16() {
         1000..=1999 => ErrorCategory::Application,
         2000..=2999 => ErrorCategory::Configuration,
         3000..=3999 => ErrorCategory::Git,
         4000..=4999 => ErrorCategory::Api,
         5000..=5999 => ErrorCategory::Validation,
         _ => ErrorCategory::Security,
      }
   }

   /// Only remote and subprocess failures are worth another attempt.
   pub const fn is_retryable(self) -> bool {
      matches!(self.category(), ErrorCategory::Api | ErrorCategory::Git)
   }

   /// HTTP-equivalent status for reporting.
   pub const fn http_status(self) -> u16 {
      match self.category() {
         ErrorCategory::Application => 500,
         ErrorCategory::Configuration | ErrorCategory::Git => 400,
         ErrorCategory::Api => {
            if matches!(self, Self::ApiRateLimit) {
               429
            } else {
               500
            }
         },
         ErrorCategory::Validation => 422,
         ErrorCategory::Security => 403,
      }
   }

   pub const fn message(self) -> &'static str {
      match self {
         Self::ApplicationError => "Application error occurred",
         Self::ApplicationInitFailed => "Failed to initialize application",
         Self::ApplicationShutdownFailed => "Failed to shutdown application gracefully",
         Self::ApplicationTimeout => "Operation timed out",
         Self::ConfigurationError => "Configuration error occurred",
         Self::ConfigurationMissing => "Required configuration is missing",
         Self::ConfigurationInvalid => "Configuration is invalid",
         Self::ConfigurationFileNotFound => "Configuration file not found",
         Self::ConfigurationParseError => "Failed to parse configuration",
         Self::ConfigurationEnvVarMissing => "Required environment variable is missing",
         Self::GitError => "Git operation failed",
         Self::GitNotRepository => "Not a git repository",
         Self::GitNoChanges => "No changes to commit",
         Self::GitCommitFailed => "Failed to commit changes",
         Self::GitTagFailed => "Failed to create tag",
         Self::GitDiffFailed => "Failed to generate diff",
         Self::GitLogFailed => "Failed to get git log",
         Self::GitStagingFailed => "Failed to get staged files",
         Self::GitCommandTimeout => "Git command timed out",
         Self::GitInvalidRef => "Invalid git reference",
         Self::ApiError => "API operation failed",
         Self::ApiConnectionFailed => "Failed to connect to API",
         Self::ApiTimeout => "API request timed out",
         Self::ApiRateLimit => "API rate limit exceeded",
         Self::ApiAuthFailed => "API authentication failed",
         Self::ApiInvalidResponse => "Invalid API response",
         Self::ApiServiceUnavailable => "API service unavailable",
         Self::ValidationError => "Validation failed",
         Self::ValidationRequired => "Required field is missing",
         Self::ValidationInvalidFormat => "Invalid format",
         Self::ValidationLength => "Invalid length",
         Self::ValidationType => "Invalid type",
         Self::ValidationRange => "Value out of range",
         Self::ValidationPattern => "Value does not match required pattern",
         Self::SecurityError => "Security error occurred",
         Self::SecurityInjectionAttempt => "Potential command injection detected",
         Self::SecurityInvalidInput => "Invalid input for security validation",
         Self::SecurityPermissionDenied => "Permission denied",
         Self::SecurityTokenInvalid => "Invalid security token",
         Self::SecurityAuthRequired => "Authentication required",
      }
   }
}

impl fmt::Display for ErrorCode {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      write!(f, "E{}", self.as_u16())
   }
}

/// Process exit codes, one per category.
pub mod exit_code {
   pub const SUCCESS: i32 = 0;
   pub const GENERIC: i32 = 1;
   pub const GIT: i32 = 2;
   pub const API: i32 = 3;
   pub const CONFIGURATION: i32 = 4;
   pub const SECURITY: i32 = 5;
   pub const ABORTED: i32 = 6;
}

#[derive(Debug, Error)]
pub enum AiCommitError {
   #[error("{message}")]
   Configuration { code: ErrorCode, message: String },

   #[error("{message}")]
   Git {
      code:    ErrorCode,
      message: String,
      command: Option<String>,
   },

   #[error("{message}")]
   Api {
      code:    ErrorCode,
      message: String,
      status:  Option<u16>,
   },

   #[error("{message}")]
   Validation {
      code:    ErrorCode,
      message: String,
      field:   Option<String>,
      #[source]
      source:  Option<Box<Self>>,
   },

   #[error("{message}")]
   Application { code: ErrorCode, message: String },

   #[error("{0}")]
   Aborted(String),

   #[error("IO error: {0}")]
   Io(#[from] std::io::Error),

   #[error("JSON error: {0}")]
   Json(#[from] serde_json::Error),
}

impl AiCommitError {
   pub fn configuration(code: ErrorCode, message: impl Into<String>) -> Self {
      Self::Configuration { code, message: message.into() }
   }

   pub fn git(code: ErrorCode, message: impl Into<String>, command: Option<&str>) -> Self {
      Self::Git { code, message: message.into(), command: command.map(String::from) }
   }

   pub fn api(code: ErrorCode, message: impl Into<String>, status: Option<u16>) -> Self {
      Self::Api { code, message: message.into(), status }
   }

   pub fn validation(code: ErrorCode, message: impl Into<String>, field: Option<&str>) -> Self {
      Self::Validation {
         code,
         message: message.into(),
         field: field.map(String::from),
         source: None,
      }
   }

   pub fn application(message: impl Into<String>) -> Self {
      Self::Application { code: ErrorCode::ApplicationError, message: message.into() }
   }

   /// Wrap an error crossing into the validation layer, keeping the rate-limit
   /// code visible to callers.
   pub fn wrap_validation(context: &str, source: Self) -> Self {
      let code = if source.code() == ErrorCode::ApiRateLimit {
         ErrorCode::ApiRateLimit
      } else {
         ErrorCode::ValidationError
      };
      Self::Validation {
         code,
         message: format!("{context}: {source}"),
         field: None,
         source: Some(Box::new(source)),
      }
   }

   pub fn code(&self) -> ErrorCode {
      match self {
         Self::Configuration { code, .. }
         | Self::Git { code, .. }
         | Self::Api { code, .. }
         | Self::Validation { code, .. }
         | Self::Application { code, .. } => *code,
         Self::Aborted(_) => ErrorCode::ApplicationError,
         Self::Io(_) => ErrorCode::ApplicationError,
         Self::Json(_) => ErrorCode::ApiInvalidResponse,
      }
   }

   /// Category of the raising layer. Git rejections of unsafe input carry a
   /// security code and report as [`ErrorCategory::Security`].
   pub fn category(&self) -> ErrorCategory {
      match self {
         Self::Configuration { .. } => ErrorCategory::Configuration,
         Self::Git { code, .. } => match code.category() {
            ErrorCategory::Security => ErrorCategory::Security,
            _ => ErrorCategory::Git,
         },
         Self::Api { .. } => ErrorCategory::Api,
         Self::Validation { .. } => ErrorCategory::Validation,
         Self::Application { .. } | Self::Aborted(_) | Self::Io(_) => ErrorCategory::Application,
         Self::Json(_) => ErrorCategory::Api,
      }
   }

   pub const fn is_aborted(&self) -> bool {
      matches!(self, Self::Aborted(_))
   }

   pub fn is_retryable(&self) -> bool {
      self.code().is_retryable()
   }

   pub fn exit_code(&self) -> i32 {
      if self.is_aborted() {
         return exit_code::ABORTED;
      }
      match self.category() {
         ErrorCategory::Configuration => exit_code::CONFIGURATION,
         ErrorCategory::Git => exit_code::GIT,
         ErrorCategory::Api => exit_code::API,
         ErrorCategory::Security => exit_code::SECURITY,
         ErrorCategory::Application | ErrorCategory::Validation => exit_code::GENERIC,
      }
   }
}

pub type Result<T> = std::result::Result<T, AiCommitError>;

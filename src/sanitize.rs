//! Guards for strings that end up on a git command line.
//!
//! Every git ref, tag, path, and context width derived from user input or
//! repository state passes one of these checks before [`crate::git`] hands it
//! to a subprocess.

const SHELL_METACHARACTERS: &[char] =
   &[';', '&', '|', '`', '$', '(', ')', '{', '}', '[', ']', '<', '>'];

/// Validate a git ref or tag name.
///
/// Accepts `[A-Za-z0-9._/-]` only. Rejects a leading `.` or `-`, a trailing
/// `.`, `-` or `/`, any `..`, and whitespace.
pub fn is_valid_git_ref(input: &str) -> bool {
   if input.is_empty() {
      return false;
   }
   if input.starts_with(['.', '-']) || input.ends_with(['.', '-', '/']) {
      return false;
   }
   if input.contains("..") || input.contains(' ') {
      return false;
   }
   input
      .chars()
      .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '/' | '-'))
}

/// Anything that can be offered as a unified-context width.
pub trait UnifiedValue {
   fn parse_unified(&self) -> Option<i64>;
}

impl UnifiedValue for i64 {
   fn parse_unified(&self) -> Option<i64> {
      Some(*self)
   }
}

impl UnifiedValue for i32 {
   fn parse_unified(&self) -> Option<i64> {
      Some(i64::from(*self))
   }
}

impl UnifiedValue for u8 {
   fn parse_unified(&self) -> Option<i64> {
      Some(i64::from(*self))
   }
}

impl UnifiedValue for u32 {
   fn parse_unified(&self) -> Option<i64> {
      Some(i64::from(*self))
   }
}

impl UnifiedValue for &str {
   fn parse_unified(&self) -> Option<i64> {
      self.trim().parse().ok()
   }
}

impl UnifiedValue for String {
   fn parse_unified(&self) -> Option<i64> {
      self.as_str().parse_unified()
   }
}

/// Validate a `-U<n>` context width: an integer in `0..=10`.
pub fn is_valid_unified_value<V: UnifiedValue>(input: V) -> bool {
   input
      .parse_unified()
      .is_some_and(|n| (0..=10).contains(&n))
}

/// Validate a repository-relative path before it is used as a pathspec.
pub fn is_valid_file_path(input: &str) -> bool {
   if input.chars().any(|c| c.is_ascii_control()) {
      return false;
   }
   if input.contains("../") || input.ends_with("..") {
      return false;
   }
   if input.trim_end().ends_with('/') {
      return false;
   }
   if input.trim() != input {
      return false;
   }
   !input.contains(SHELL_METACHARACTERS)
}

/// Escape double quotes for embedding in a double-quoted git argument.
///
/// Not idempotent: escaping twice doubles the backslashes, so escape each value
/// exactly once at the point it is rendered.
pub fn escape_git_arg(input: &str) -> String {
   input.replace('"', "\\\"")
}

/// Strip control characters and backslash-escape shell metacharacters.
///
/// Spaces are escaped too unless `allow_spaces` is set.
pub fn sanitize_shell_input(input: &str, allow_spaces: bool) -> String {
   const ESCAPED: &[char] = &[
      '"', '\'', '`', '$', '&', ';', '>', '<', '|', '(', ')', '\\', '[', ']', '{', '}',
   ];

   let mut out = String::with_capacity(input.len());
   for c in input.chars().filter(|c| !c.is_ascii_control()) {
      if ESCAPED.contains(&c) || (c == ' ' && !allow_spaces) {
         out.push('\\');
      }
      out.push(c);
   }
   out
}

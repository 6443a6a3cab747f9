//! Terminal styling and console logging.
//!
//! Respects `NO_COLOR` environment variable and terminal capabilities.

use std::sync::OnceLock;

use owo_colors::OwoColorize;

/// Whether color output is enabled (cached on first call).
static COLOR_ENABLED: OnceLock<bool> = OnceLock::new();

/// Check if colors should be used.
pub fn colors_enabled() -> bool {
   *COLOR_ENABLED.get_or_init(|| {
      // NO_COLOR takes precedence (https://no-color.org/)
      if std::env::var("NO_COLOR").is_ok() {
         return false;
      }
      supports_color::on(supports_color::Stream::Stdout).is_some_and(|level| level.has_basic)
   })
}

// === Color Palette ===

/// Success: checkmarks, completed actions (green + bold).
pub fn success(s: &str) -> String {
   if colors_enabled() {
      s.green().bold().to_string()
   } else {
      s.to_string()
   }
}

/// Warning: non-fatal issues (yellow).
pub fn warning(s: &str) -> String {
   if colors_enabled() {
      s.yellow().to_string()
   } else {
      s.to_string()
   }
}

/// Error: failures, hard errors (red + bold).
pub fn error(s: &str) -> String {
   if colors_enabled() {
      s.red().bold().to_string()
   } else {
      s.to_string()
   }
}

/// Info: informational messages (cyan).
pub fn info(s: &str) -> String {
   if colors_enabled() {
      s.cyan().to_string()
   } else {
      s.to_string()
   }
}

/// Dim: less important details, prompts and command traces.
pub fn dim(s: &str) -> String {
   if colors_enabled() {
      s.dimmed().to_string()
   } else {
      s.to_string()
   }
}

/// Bold: headers, key values.
pub fn bold(s: &str) -> String {
   if colors_enabled() {
      s.bold().to_string()
   } else {
      s.to_string()
   }
}

/// Model name styling (magenta).
pub fn model(s: &str) -> String {
   if colors_enabled() {
      s.magenta().to_string()
   } else {
      s.to_string()
   }
}

/// Get terminal width, capped at 120 columns.
pub fn term_width() -> usize {
   terminal_size::terminal_size()
      .map_or(80, |(w, _)| w.0 as usize)
      .min(120)
}

// === Unicode Box Drawing ===

pub mod box_chars {
   pub const TOP_LEFT: char = '\u{256D}';
   pub const TOP_RIGHT: char = '\u{256E}';
   pub const BOTTOM_LEFT: char = '\u{2570}';
   pub const BOTTOM_RIGHT: char = '\u{256F}';
   pub const HORIZONTAL: char = '\u{2500}';
   pub const VERTICAL: char = '\u{2502}';
}

/// Render a box-framed message. Lines wider than the box are word-wrapped so
/// the preview always shows the full text.
pub fn boxed_message(title: &str, content: &str, width: usize) -> String {
   use box_chars::*;

   let mut out = String::new();
   let inner_width = width.saturating_sub(4); // "│ " and " │"

   let title_len = title.chars().count();
   let border_width = width.saturating_sub(2);
   let padding = border_width.saturating_sub(title_len + 2);
   let left_pad = padding / 2;
   let right_pad = padding - left_pad;

   out.push(TOP_LEFT);
   out.push_str(&HORIZONTAL.to_string().repeat(left_pad));
   out.push(' ');
   out.push_str(&bold(title));
   out.push(' ');
   out.push_str(&HORIZONTAL.to_string().repeat(right_pad));
   out.push(TOP_RIGHT);
   out.push('\n');

   for line in content.lines() {
      for shown in wrap_line(line, inner_width) {
         let pad = inner_width.saturating_sub(shown.chars().count());
         out.push(VERTICAL);
         out.push(' ');
         out.push_str(&shown);
         out.push_str(&" ".repeat(pad));
         out.push(' ');
         out.push(VERTICAL);
         out.push('\n');
      }
   }

   out.push(BOTTOM_LEFT);
   out.push_str(&HORIZONTAL.to_string().repeat(border_width));
   out.push(BOTTOM_RIGHT);

   out
}

/// Word-wrap one line to `max_width` columns, keeping its indentation.
/// Words longer than the available width are split.
fn wrap_line(line: &str, max_width: usize) -> Vec<String> {
   if max_width == 0 {
      return vec![line.to_string()];
   }
   let body = line.trim_start();
   if body.is_empty() {
      return vec![String::new()];
   }

   let indent: String = line[..line.len() - body.len()].chars().take(max_width / 2).collect();
   let base = indent.chars().count();
   let mut lines = Vec::new();
   let mut current = indent.clone();
   let mut width = base;

   for word in body.split_whitespace() {
      let chars: Vec<char> = word.chars().collect();
      for piece in chars.chunks(max_width - base) {
         if width > base && width + 1 + piece.len() > max_width {
            // Word doesn't fit - start new line
            lines.push(std::mem::replace(&mut current, indent.clone()));
            width = base;
         }
         if width > base {
            current.push(' ');
            width += 1;
         }
         current.extend(piece);
         width += piece.len();
      }
   }

   lines.push(current);
   lines
}

// === Status Icons ===

pub mod icons {
   pub const SUCCESS: &str = "\u{2713}";
   pub const WARNING: &str = "\u{26A0}";
   pub const ERROR: &str = "\u{2717}";
   pub const INFO: &str = "\u{2139}";
   pub const ARROW: &str = "\u{2192}";
   pub const ROBOT: &str = "\u{1F916}";
   pub const ROCKET: &str = "\u{1F680}";
}

// === Logger ===

/// Console logger. `info` and `debug` are only shown in verbose mode; warnings
/// and errors always go to stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct Logger {
   verbose: bool,
}

impl Logger {
   pub const fn new(verbose: bool) -> Self {
      Self { verbose }
   }

   pub const fn verbose(&self) -> bool {
      self.verbose
   }

   pub fn info(&self, msg: &str) {
      if self.verbose {
         eprintln!("{} {msg}", info(icons::INFO));
      }
   }

   pub fn debug(&self, msg: &str) {
      if self.verbose {
         eprintln!("{}", dim(&format!("[DEBUG] {msg}")));
      }
   }

   pub fn warn(&self, msg: &str) {
      eprintln!("{} {}", warning(icons::WARNING), warning(msg));
   }

   pub fn error(&self, msg: &str) {
      eprintln!("{} {}", error(icons::ERROR), error(msg));
   }

   /// Progress line shown regardless of verbosity.
   pub fn step(&self, msg: &str) {
      eprintln!("{} {msg}", info(icons::ARROW));
   }

   pub fn success(&self, msg: &str) {
      eprintln!("{} {msg}", success(icons::SUCCESS));
   }
}

#[cfg(test)]
mod tests {
   use super::*;

   #[test]
   fn test_boxed_message_frames_every_line() {
      let out = boxed_message("Title", "first\nsecond", 30);
      let lines: Vec<&str> = out.lines().collect();
      assert_eq!(lines.len(), 4);
      assert!(lines[0].starts_with(box_chars::TOP_LEFT));
      assert!(lines[1].contains("first"));
      assert!(lines[2].contains("second"));
      assert!(lines[3].starts_with(box_chars::BOTTOM_LEFT));
   }

   #[test]
   fn test_boxed_message_wraps_wide_lines() {
      let text = "- Moved the retry loop into the client and documented every branch of it";
      let out = boxed_message("T", text, 30);
      let body: Vec<&str> = out.lines().skip(1).take_while(|l| !l.starts_with(box_chars::BOTTOM_LEFT)).collect();

      assert!(body.len() > 1);
      assert!(body.iter().all(|l| l.chars().count() == 30), "{body:?}");
      assert!(!out.contains('\u{2026}'));

      let words: Vec<&str> = body
         .iter()
         .flat_map(|l| l.trim_matches(box_chars::VERTICAL).split_whitespace())
         .collect();
      assert_eq!(words, text.split_whitespace().collect::<Vec<_>>());
   }

   #[test]
   fn test_wrap_line_keeps_indent_and_splits_long_words() {
      assert_eq!(wrap_line("  - alpha beta gamma", 12), vec!["  - alpha", "  beta gamma"]);
      assert_eq!(wrap_line(&"x".repeat(25), 10), vec!["x".repeat(10), "x".repeat(10), "x".repeat(5)]);
      assert_eq!(wrap_line("", 10), vec![String::new()]);
      assert_eq!(wrap_line("short", 0), vec!["short".to_string()]);
   }

   #[test]
   fn test_logger_verbose_flag() {
      assert!(Logger::new(true).verbose());
      assert!(!Logger::default().verbose());
   }
}

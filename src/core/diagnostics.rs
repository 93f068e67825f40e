//! Purpose: Split captured stderr text into ordered warning and error messages.
//! Exports: `ClassifiedDiagnostics`, `Mode`, `LineKind`, `scan_line`, `classify`.
//! Role: Pure line classifier used by the call wrapper; knows nothing about descriptors.
//! Invariants: Each message lands in exactly one list; lists keep first-observed order.
//! Invariants: A marker line flushes both accumulators before switching mode.
//! Invariants: Blank (all-whitespace) messages are never reported.
use serde::Serialize;

use crate::core::text::{skip_chars, starts_with_ignore_case};

const ERROR_MARKER: &str = "error:";
const WARNING_MARKER: &str = "warning:";
// Marker plus the separating space.
const ERROR_PREFIX_CHARS: usize = 7;
const WARNING_PREFIX_CHARS: usize = 9;

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct ClassifiedDiagnostics {
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl ClassifiedDiagnostics {
    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty() && self.errors.is_empty()
    }
}

/// Which accumulator continuation lines are appended to.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Mode {
    InWarning,
    #[default]
    InError,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LineKind<'a> {
    /// An `Error:` marker; carries the text after the fixed-width prefix.
    Error(&'a str),
    /// A `Warning:` marker; carries the text after the fixed-width prefix.
    Warning(&'a str),
    Continuation(&'a str),
}

pub fn scan_line(line: &str) -> LineKind<'_> {
    if starts_with_ignore_case(line, ERROR_MARKER) {
        LineKind::Error(skip_chars(line, ERROR_PREFIX_CHARS))
    } else if starts_with_ignore_case(line, WARNING_MARKER) {
        LineKind::Warning(skip_chars(line, WARNING_PREFIX_CHARS))
    } else {
        LineKind::Continuation(line)
    }
}

/// Classifies a block of captured stderr text.
///
/// Text before the first marker belongs to the initial `InError` mode, so a
/// block without any marker is reported as a single error.
pub fn classify(text: &str) -> ClassifiedDiagnostics {
    let mut classifier = Classifier::default();
    for line in text.lines() {
        classifier.step(scan_line(line));
    }
    classifier.finish()
}

#[derive(Default)]
struct Classifier {
    mode: Mode,
    warning: String,
    error: String,
    out: ClassifiedDiagnostics,
}

impl Classifier {
    fn step(&mut self, line: LineKind<'_>) {
        match line {
            LineKind::Error(rest) => {
                self.flush();
                self.mode = Mode::InError;
                push_line(&mut self.error, rest);
            }
            LineKind::Warning(rest) => {
                self.flush();
                self.mode = Mode::InWarning;
                push_line(&mut self.warning, rest);
            }
            LineKind::Continuation(line) => match self.mode {
                Mode::InWarning => push_line(&mut self.warning, line),
                Mode::InError => push_line(&mut self.error, line),
            },
        }
    }

    fn flush(&mut self) {
        flush_into(&mut self.warning, &mut self.out.warnings);
        flush_into(&mut self.error, &mut self.out.errors);
    }

    fn finish(mut self) -> ClassifiedDiagnostics {
        self.flush();
        self.out
    }
}

fn push_line(buf: &mut String, line: &str) {
    buf.push_str(line);
    buf.push('\n');
}

fn flush_into(buf: &mut String, list: &mut Vec<String>) {
    let message = buf.trim();
    if !message.is_empty() {
        list.push(message.to_string());
    }
    buf.clear();
}

#[cfg(test)]
mod tests {
    use super::{LineKind, classify, scan_line};

    #[test]
    fn consecutive_errors_are_separate_messages() {
        let out = classify("Error: a\nError: b\n");
        assert_eq!(out.errors, vec!["a", "b"]);
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn error_marker_flushes_pending_warning() {
        let out = classify("Warning: w1\nError: e1\nmore e1\n");
        assert_eq!(out.warnings, vec!["w1"]);
        assert_eq!(out.errors, vec!["e1\nmore e1"]);
    }

    #[test]
    fn unmarked_text_is_one_error_at_end_of_input() {
        let out = classify("segmentation fault\n  in module foo\n");
        assert!(out.warnings.is_empty());
        assert_eq!(out.errors, vec!["segmentation fault\n  in module foo"]);
    }

    #[test]
    fn empty_and_blank_input_yield_nothing() {
        assert!(classify("").is_empty());
        assert!(classify("\n   \n\t\n").is_empty());
        assert!(classify("Warning: \nError:\n").is_empty());
    }

    #[test]
    fn markers_are_case_insensitive() {
        let out = classify("WARNING: loud\nerror: quiet\nwArNiNg: mixed\n");
        assert_eq!(out.warnings, vec!["loud", "mixed"]);
        assert_eq!(out.errors, vec!["quiet"]);
    }

    #[test]
    fn interleaved_blocks_keep_order_within_each_list() {
        let text = "Warning: w1\ncont w1\nError: e1\nWarning: w2\nError: e2\n  detail\n";
        let out = classify(text);
        assert_eq!(out.warnings, vec!["w1\ncont w1", "w2"]);
        assert_eq!(out.errors, vec!["e1", "e2\n  detail"]);
    }

    #[test]
    fn preamble_before_warning_is_flushed_as_error() {
        let out = classify("ocarina: starting\nWarning: unused property\n");
        assert_eq!(out.errors, vec!["ocarina: starting"]);
        assert_eq!(out.warnings, vec!["unused property"]);
    }

    #[test]
    fn marker_must_start_the_line() {
        assert_eq!(
            scan_line("  Error: indented"),
            LineKind::Continuation("  Error: indented")
        );
        assert_eq!(scan_line("Error: x"), LineKind::Error("x"));
        assert_eq!(scan_line("Warning: y"), LineKind::Warning("y"));
        assert_eq!(scan_line("Error:"), LineKind::Error(""));
    }

    #[test]
    fn crlf_lines_are_handled() {
        let out = classify("Error: a\r\nmore\r\n");
        assert_eq!(out.errors, vec!["a\nmore"]);
    }
}

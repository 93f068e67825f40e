//! Purpose: Represent native-engine failures and pull the user-facing message out of them.
//! Exports: `Fault`, `extract_message`.
//! Role: Tagged boundary for native failures; the wrapper never sees raw exception objects.
//! Invariants: Extraction starts at a `Message:` line and stops at the traceback marker.
//! Invariants: Text without a `Message:` line yields an empty message.
use std::fmt;

use crate::core::text::{skip_chars, starts_with_ignore_case};

const MESSAGE_MARKER: &str = "message:";
const TRACEBACK_MARKER: &str = "call stack traceback locations:";
const PREFIX_WIDTH: usize = 9;

/// A failure signaled by a native entry point, kept as the engine rendered it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Fault {
    text: String,
}

impl Fault {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn message(&self) -> String {
        extract_message(&self.text)
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl std::error::Error for Fault {}

/// Returns the `Message:` section of a rendered fault, one line per source line.
///
/// Every kept line loses a fixed nine-column prefix: the `Message: ` marker on
/// the first line and the matching blank indentation on continuation lines.
/// Continuation lines that are not indented are kept whole.
pub fn extract_message(text: &str) -> String {
    let mut keep = false;
    let mut message = String::new();
    for line in text.lines() {
        if starts_with_ignore_case(line, TRACEBACK_MARKER) {
            break;
        }
        if starts_with_ignore_case(line, MESSAGE_MARKER) {
            keep = true;
            message.push_str(skip_chars(line, PREFIX_WIDTH));
            message.push('\n');
        } else if keep {
            message.push_str(strip_indent(line));
            message.push('\n');
        }
    }
    message
}

fn strip_indent(line: &str) -> &str {
    let indent = line
        .char_indices()
        .take(PREFIX_WIDTH)
        .take_while(|(_, ch)| ch.is_whitespace())
        .count();
    if indent == PREFIX_WIDTH {
        skip_chars(line, PREFIX_WIDTH)
    } else {
        line
    }
}

#[cfg(test)]
mod tests {
    use super::{Fault, extract_message};

    #[test]
    fn message_stops_at_traceback() {
        let text = "raised ocarina.load_error\nMessage: bad thing\nhappened\nCall stack traceback locations:\n0x4021a8 0x402f10\n";
        assert_eq!(extract_message(text), "bad thing\nhappened\n");
    }

    #[test]
    fn missing_message_marker_is_empty() {
        let text = "raised CONSTRAINT_ERROR\nCall stack traceback locations:\n0x1\n";
        assert_eq!(extract_message(text), "");
        assert_eq!(extract_message(""), "");
    }

    #[test]
    fn marker_is_case_insensitive() {
        let text = "MESSAGE: upper\ncall STACK traceback locations:\nignored\n";
        assert_eq!(extract_message(text), "upper\n");
    }

    #[test]
    fn aligned_continuation_lines_lose_the_prefix() {
        let text = "Message: first line\n         second line\n  short indent\n";
        assert_eq!(
            extract_message(text),
            "first line\nsecond line\n  short indent\n"
        );
    }

    #[test]
    fn lines_after_traceback_are_never_read() {
        let text = "Call stack traceback locations:\nMessage: too late\n";
        assert_eq!(extract_message(text), "");
    }

    #[test]
    fn fault_exposes_text_and_message() {
        let fault = Fault::new("Message: cannot find root system\n");
        assert_eq!(fault.text(), "Message: cannot find root system\n");
        assert_eq!(fault.message(), "cannot find root system\n");
        assert_eq!(fault.to_string(), fault.text());
    }
}

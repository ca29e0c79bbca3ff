//! Terminal error rendering.
//!
//! Every compile error is rendered as an [`ariadne`] report: the message,
//! the quoted source line, and an underline beneath the offending span.
//! Spans are line/column pairs; this module converts them to the
//! character offsets ariadne indexes by. When a report cannot be printed
//! (or an error carries no span), a plain `eprintln!` fallback keeps the
//! message visible.

use std::ops::Range;

use ariadne::{Color, Config, IndexType, Label, Report, ReportKind, Source};
use pell::token::Span;

use crate::driver::CompileError;

/// Converts a span into a character range into the whole source.
fn char_range(source: &str, span: Span) -> Range<usize> {
    let mut offset = 0;
    for (index, line) in source.lines().enumerate() {
        let line_chars = line.chars().count();
        if index + 1 == span.line {
            let start = offset + span.start.min(line_chars);
            let end = offset + (span.end + 1).min(line_chars.max(1));
            return start..end.max(start + 1);
        }
        offset += line_chars + 1;
    }
    let total = source.chars().count();
    total.saturating_sub(1)..total.max(1)
}

/// Prints one report with an underlined span.
fn print_span_report(
    filename: &str,
    source: &str,
    span: Span,
    message: &str,
) -> std::io::Result<()> {
    let range = char_range(source, span);
    Report::build(ReportKind::Error, (filename, range.clone()))
        .with_config(Config::default().with_index_type(IndexType::Char))
        .with_message(format!("Error on line {}: {}", span.line, message))
        .with_label(
            Label::new((filename, range))
                .with_message(message)
                .with_color(Color::Red),
        )
        .finish()
        .eprint((filename, Source::from(source)))
}

/// Prints one error, falling back to plain output when the fancy report
/// cannot be rendered.
fn report_one(filename: &str, source: &str, span: Option<Span>, message: &str) {
    let Some(span) = span else {
        eprintln!("Error: {}", message);
        return;
    };

    if let Err(report_error) = print_span_report(filename, source, span, message) {
        eprintln!("Error on line {}: {}", span.line, message);
        eprintln!("(Failed to display detailed error report: {})", report_error);
    }
}

/// Renders a compile error (or error list) to stderr.
pub(crate) fn report_error(filename: &str, source: &str, error: &CompileError) {
    match error {
        CompileError::Parse(errors) => {
            for error in errors {
                report_one(filename, source, Some(error.span), &error.message);
            }
        }
        CompileError::Type(errors) => {
            for error in errors {
                report_one(filename, source, error.span, &error.message);
            }
        }
        CompileError::Codegen(error) => {
            report_one(filename, source, error.span, &error.message);
        }
        CompileError::FileRead { .. }
        | CompileError::FileWrite { .. }
        | CompileError::CompilerNotFound
        | CompileError::CompilerSpawn(_) => {
            eprintln!("Error: {}", error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_range_on_first_line() {
        let source = "abc def\nghi";
        let span = Span::new(4, 6, 1);
        assert_eq!(char_range(source, span), 4..7);
    }

    #[test]
    fn test_char_range_on_later_line() {
        let source = "abc\ndef";
        let span = Span::new(0, 2, 2);
        // Line 2 starts at offset 4.
        assert_eq!(char_range(source, span), 4..7);
    }

    #[test]
    fn test_char_range_clamps_to_line() {
        let source = "ab";
        let span = Span::new(0, 10, 1);
        assert_eq!(char_range(source, span), 0..2);
    }

    #[test]
    fn test_char_range_past_last_line() {
        let source = "ab\ncd";
        let span = Span::new(0, 0, 9);
        let range = char_range(source, span);
        assert!(range.end <= source.chars().count().max(1));
        assert!(range.start < range.end);
    }
}

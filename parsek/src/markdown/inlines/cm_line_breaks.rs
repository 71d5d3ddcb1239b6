// CommonMark hard and soft line breaks
//
// Hard: two or more trailing spaces, or a backslash, before the line
// ending. Soft: at most one space or tab before the line ending. The text
// fallback backtracks over trailing whitespace so this parser gets to see
// it.

use crate::combinator::{ParseResult, Parser, ParserInput};
use crate::highlight::{HighlightContext, HighlightKind};
use crate::markdown::ast::Inline;
use crate::markdown::blocks::MdParser;

pub(crate) fn line_break() -> MdParser<Inline> {
    Parser::new(|input: ParserInput<char, HighlightContext>| {
        let tokens = input.tokens();
        let start = input.index();

        // Backslash-hard-break
        if tokens.get(start) == Some(&'\\') {
            if let Some(after) = line_ending_at(tokens, start + 1) {
                input
                    .context()
                    .emit(start..after, HighlightKind::HardBreak);
                return ParseResult::success(Inline::HardBreak, input.at_index(after));
            }
            return ParseResult::failure("line break", input);
        }

        let mut i = start;
        let mut spaces = 0;
        while tokens.get(i) == Some(&' ') {
            spaces += 1;
            i += 1;
        }
        // A single tab only softens the break.
        let mut tabbed = false;
        if spaces == 0 && tokens.get(i) == Some(&'\t') {
            tabbed = true;
            i += 1;
        }
        match line_ending_at(tokens, i) {
            Some(after) => {
                if spaces >= 2 && !tabbed {
                    input
                        .context()
                        .emit(start..after, HighlightKind::HardBreak);
                    ParseResult::success(Inline::HardBreak, input.at_index(after))
                } else if spaces <= 1 || tabbed {
                    input
                        .context()
                        .emit(start..after, HighlightKind::SoftBreak);
                    ParseResult::success(Inline::SoftBreak, input.at_index(after))
                } else {
                    ParseResult::failure("line break", input)
                }
            }
            None => ParseResult::failure("line break", input),
        }
    })
}

/// Index past a line ending at `i`, if one starts there.
fn line_ending_at(tokens: &[char], i: usize) -> Option<usize> {
    match tokens.get(i) {
        Some('\n') => Some(i + 1),
        Some('\r') => {
            if tokens.get(i + 1) == Some(&'\n') {
                Some(i + 2)
            } else {
                Some(i + 1)
            }
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combinator::ParserInput;
    use crate::highlight::HighlightContext;

    fn parse_break(text: &str) -> Option<(Inline, usize)> {
        let input = ParserInput::from_text(text, HighlightContext::default());
        line_break()
            .parse(input)
            .into_success()
            .map(|(inline, next)| (inline, next.index()))
    }

    #[test]
    fn smoke_test_hard_break_spaces() {
        assert_eq!(parse_break("  \nx"), Some((Inline::HardBreak, 3)));
        assert_eq!(parse_break("    \nx"), Some((Inline::HardBreak, 5)));
    }

    #[test]
    fn smoke_test_hard_break_backslash() {
        assert_eq!(parse_break("\\\nx"), Some((Inline::HardBreak, 2)));
        assert_eq!(parse_break("\\\r\nx"), Some((Inline::HardBreak, 3)));
    }

    #[test]
    fn smoke_test_soft_break() {
        assert_eq!(parse_break("\nx"), Some((Inline::SoftBreak, 1)));
        assert_eq!(parse_break(" \nx"), Some((Inline::SoftBreak, 2)));
        assert_eq!(parse_break("\t\nx"), Some((Inline::SoftBreak, 2)));
    }

    #[test]
    fn smoke_test_not_a_break() {
        assert_eq!(parse_break("x"), None);
        assert_eq!(parse_break("  x"), None);
        assert_eq!(parse_break("\\x"), None);
    }
}

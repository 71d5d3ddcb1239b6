// CommonMark backslash escape
//
// A backslash escapes only ASCII punctuation; the escaped char becomes
// literal text. Backslashes before anything else fall through to the text
// or line-break parsers.

use crate::combinator::text::is_ascii_punctuation;
use crate::combinator::{ParseResult, Parser};
use crate::highlight::{tag, HighlightKind};
use crate::markdown::ast::Inline;
use crate::markdown::blocks::MdParser;

pub(crate) fn backslash_escape() -> MdParser<Inline> {
    tag(
        HighlightKind::EscapeSequence,
        &Parser::new(|input| {
            if input.current() != Some(&'\\') {
                return ParseResult::failure("backslash escape", input);
            }
            match input.peek(1) {
                Some(&c) if is_ascii_punctuation(c) => {
                    let next = input.advance_by(2);
                    ParseResult::success(
                        Inline::Text {
                            literal: c.to_string(),
                        },
                        next,
                    )
                }
                _ => ParseResult::failure("backslash escape", input),
            }
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combinator::ParserInput;
    use crate::highlight::HighlightContext;

    fn parse_escape(text: &str) -> Option<Inline> {
        let input = ParserInput::from_text(text, HighlightContext::default());
        backslash_escape()
            .parse(input)
            .into_success()
            .map(|(inline, _)| inline)
    }

    #[test]
    fn smoke_test_escaped_punctuation() {
        assert_eq!(parse_escape("\\*x"), Some(Inline::text("*")));
        assert_eq!(parse_escape("\\["), Some(Inline::text("[")));
    }

    #[test]
    fn smoke_test_non_punctuation_not_escaped() {
        assert_eq!(parse_escape("\\a"), None);
        assert_eq!(parse_escape("\\ "), None);
        assert_eq!(parse_escape("\\"), None);
    }
}

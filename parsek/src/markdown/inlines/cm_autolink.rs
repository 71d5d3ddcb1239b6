// CommonMark autolinks
//
// `<scheme:...>` with a 2-32 char scheme and no spaces, controls or angle
// brackets in the body, or `<email>` per the CommonMark address grammar.

use std::sync::OnceLock;

use regex::Regex;

use crate::combinator::{ParseResult, Parser};
use crate::highlight::{tag, HighlightKind};
use crate::markdown::ast::Inline;
use crate::markdown::blocks::MdParser;

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
        )
        .unwrap()
    })
}

pub(crate) fn autolink() -> MdParser<Inline> {
    tag(
        HighlightKind::AutolinkUrl,
        &Parser::new(|input| {
            let tokens = input.tokens();
            let start = input.index();
            if tokens.get(start) != Some(&'<') {
                return ParseResult::failure("autolink", input);
            }
            let mut i = start + 1;
            let mut body = String::new();
            loop {
                match tokens.get(i) {
                    Some('>') => break,
                    Some(&c) if c == '<' || c == ' ' || c.is_control() => {
                        return ParseResult::failure("autolink", input)
                    }
                    Some(&c) => {
                        body.push(c);
                        i += 1;
                    }
                    None => return ParseResult::failure("autolink", input),
                }
            }
            if !is_absolute_uri(&body) && !email_regex().is_match(&body) {
                return ParseResult::failure("autolink", input);
            }
            let next = input.at_index(i + 1);
            ParseResult::success(Inline::Autolink { url: body }, next)
        }),
    )
}

/// Scheme of 2-32 chars (letter first, then letters, digits, `+`, `.`, `-`),
/// a colon, and a body free of whitespace and angle brackets.
fn is_absolute_uri(body: &str) -> bool {
    let Some(colon) = body.find(':') else {
        return false;
    };
    let scheme = &body[..colon];
    let len = scheme.chars().count();
    if !(2..=32).contains(&len) {
        return false;
    }
    let mut chars = scheme.chars();
    if !chars.next().is_some_and(|c| c.is_ascii_alphabetic()) {
        return false;
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '.' | '-'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combinator::ParserInput;
    use crate::highlight::HighlightContext;

    fn parse_autolink(text: &str) -> Option<String> {
        let input = ParserInput::from_text(text, HighlightContext::default());
        autolink()
            .parse(input)
            .into_success()
            .map(|(inline, _)| match inline {
                Inline::Autolink { url } => url,
                other => panic!("expected autolink, got {:?}", other),
            })
    }

    #[test]
    fn smoke_test_uri_autolink() {
        assert_eq!(
            parse_autolink("<https://example.com/a?b=c>"),
            Some("https://example.com/a?b=c".into())
        );
        assert_eq!(parse_autolink("<irc://foo.bar:2233/baz>").is_some(), true);
    }

    #[test]
    fn smoke_test_email_autolink() {
        assert_eq!(
            parse_autolink("<foo@bar.example.com>"),
            Some("foo@bar.example.com".into())
        );
    }

    #[test]
    fn smoke_test_rejects() {
        assert_eq!(parse_autolink("<not a link>"), None);
        assert_eq!(parse_autolink("<x:rest>"), None);
        assert_eq!(parse_autolink("<https://unclosed"), None);
        assert_eq!(parse_autolink("plain"), None);
    }
}

// CommonMark entity and numeric character references
//
// Recognition is syntactic: a named reference is 1-100 alphanumerics, a
// decimal reference 1-7 digits, a hex reference 1-6 hex digits. Entities
// stay literal in the AST; nothing here decodes them.

use crate::combinator::{ParseResult, Parser};
use crate::highlight::{tag, HighlightKind};
use crate::markdown::ast::Inline;
use crate::markdown::blocks::MdParser;

pub(crate) fn html_entity() -> MdParser<Inline> {
    tag(
        HighlightKind::EntityRef,
        &Parser::new(|input| {
            let tokens = input.tokens();
            let start = input.index();
            if tokens.get(start) != Some(&'&') {
                return ParseResult::failure("HTML entity", input);
            }
            let end = match scan_entity(tokens, start) {
                Some(end) => end,
                None => return ParseResult::failure("HTML entity", input),
            };
            let literal: String = tokens[start..end].iter().collect();
            let next = input.at_index(end);
            ParseResult::success(Inline::HtmlEntity { literal }, next)
        }),
    )
}

/// Index past the `;` of the reference starting at `&`, if well-formed.
fn scan_entity(tokens: &[char], start: usize) -> Option<usize> {
    let mut i = start + 1;
    if tokens.get(i) == Some(&'#') {
        i += 1;
        if matches!(tokens.get(i), Some('x') | Some('X')) {
            i += 1;
            let digits_start = i;
            while tokens.get(i).is_some_and(|c| c.is_ascii_hexdigit()) {
                i += 1;
            }
            let count = i - digits_start;
            if !(1..=6).contains(&count) || tokens.get(i) != Some(&';') {
                return None;
            }
            return Some(i + 1);
        }
        let digits_start = i;
        while tokens.get(i).is_some_and(|c| c.is_ascii_digit()) {
            i += 1;
        }
        let count = i - digits_start;
        if !(1..=7).contains(&count) || tokens.get(i) != Some(&';') {
            return None;
        }
        return Some(i + 1);
    }
    let name_start = i;
    while tokens.get(i).is_some_and(|c| c.is_ascii_alphanumeric()) {
        i += 1;
    }
    let count = i - name_start;
    if !(1..=100).contains(&count) || tokens.get(i) != Some(&';') {
        return None;
    }
    Some(i + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combinator::ParserInput;
    use crate::highlight::HighlightContext;

    fn parse_entity(text: &str) -> Option<String> {
        let input = ParserInput::from_text(text, HighlightContext::default());
        html_entity()
            .parse(input)
            .into_success()
            .map(|(inline, _)| match inline {
                Inline::HtmlEntity { literal } => literal,
                other => panic!("expected entity, got {:?}", other),
            })
    }

    #[test]
    fn smoke_test_named_entity() {
        assert_eq!(parse_entity("&amp; x"), Some("&amp;".into()));
        assert_eq!(parse_entity("&copy;"), Some("&copy;".into()));
    }

    #[test]
    fn smoke_test_numeric_entities() {
        assert_eq!(parse_entity("&#169;"), Some("&#169;".into()));
        assert_eq!(parse_entity("&#xA9;"), Some("&#xA9;".into()));
        assert_eq!(parse_entity("&#X22;"), Some("&#X22;".into()));
    }

    #[test]
    fn smoke_test_rejects_malformed() {
        assert_eq!(parse_entity("&;"), None);
        assert_eq!(parse_entity("&amp"), None);
        assert_eq!(parse_entity("&#12345678;"), None);
        assert_eq!(parse_entity("&#x1234567;"), None);
        assert_eq!(parse_entity("& amp;"), None);
    }
}

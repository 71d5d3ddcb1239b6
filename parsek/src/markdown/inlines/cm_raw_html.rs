// CommonMark inline raw HTML
//
// Open tags, closing tags, comments, processing instructions, declarations
// (`<!` + uppercase) and CDATA sections pass through as literal spans. The
// tag grammars are shared with HTML block type 7 classification.

use std::sync::OnceLock;

use regex::Regex;

use crate::combinator::{ParseResult, Parser};
use crate::highlight::{tag, HighlightKind};
use crate::markdown::ast::Inline;
use crate::markdown::blocks::MdParser;

// Open tag: tag name, attributes with optional quoted/unquoted values,
// optional `/`, `>`. Whitespace may include line endings.
const OPEN_TAG: &str = concat!(
    r#"^<[A-Za-z][A-Za-z0-9-]*"#,
    r#"(?:[ \t\r\n]+[A-Za-z_:][A-Za-z0-9_.:-]*"#,
    r#"(?:[ \t\r\n]*=[ \t\r\n]*(?:[^ \t\r\n"'=<>`]+|'[^']*'|"[^"]*"))?)*"#,
    r#"[ \t\r\n]*/?>"#
);
const CLOSE_TAG: &str = r"^</[A-Za-z][A-Za-z0-9-]*[ \t\r\n]*>";

pub(crate) fn open_tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(OPEN_TAG).unwrap())
}

pub(crate) fn close_tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(CLOSE_TAG).unwrap())
}

pub(crate) fn raw_html() -> MdParser<Inline> {
    tag(
        HighlightKind::RawHtml,
        &Parser::new(|input| {
            if input.current() != Some(&'<') {
                return ParseResult::failure("raw HTML", input);
            }
            let rest: String = input.remaining().iter().collect();
            match scan_raw_html(&rest) {
                Some(len_bytes) => {
                    let literal = rest[..len_bytes].to_string();
                    let consumed = literal.chars().count();
                    let next = input.advance_by(consumed);
                    ParseResult::success(Inline::RawHtml { literal }, next)
                }
                None => ParseResult::failure("raw HTML", input),
            }
        }),
    )
}

/// Byte length of the raw-HTML construct at the start of `text`, if any.
fn scan_raw_html(text: &str) -> Option<usize> {
    // Comments, including the degenerate forms.
    if text.starts_with("<!-->") {
        return Some(5);
    }
    if text.starts_with("<!--->") {
        return Some(6);
    }
    if let Some(rest) = text.strip_prefix("<!--") {
        return rest.find("-->").map(|i| 4 + i + 3);
    }
    // CDATA before declarations: both start with `<!`.
    if let Some(rest) = text.strip_prefix("<![CDATA[") {
        return rest.find("]]>").map(|i| 9 + i + 3);
    }
    if let Some(rest) = text.strip_prefix("<?") {
        return rest.find("?>").map(|i| 2 + i + 2);
    }
    if let Some(rest) = text.strip_prefix("<!") {
        if rest.chars().next().is_some_and(|c| c.is_ascii_uppercase()) {
            return rest.find('>').map(|i| 2 + i + 1);
        }
        return None;
    }
    if let Some(m) = close_tag_regex().find(text) {
        return Some(m.end());
    }
    open_tag_regex().find(text).map(|m| m.end())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combinator::ParserInput;
    use crate::highlight::HighlightContext;

    fn parse_raw(text: &str) -> Option<String> {
        let input = ParserInput::from_text(text, HighlightContext::default());
        raw_html()
            .parse(input)
            .into_success()
            .map(|(inline, _)| match inline {
                Inline::RawHtml { literal } => literal,
                other => panic!("expected raw html, got {:?}", other),
            })
    }

    #[test]
    fn smoke_test_open_tags() {
        assert_eq!(parse_raw("<a>x"), Some("<a>".into()));
        assert_eq!(parse_raw("<b2 data-x=\"1\">"), Some("<b2 data-x=\"1\">".into()));
        assert_eq!(parse_raw("<input disabled />"), Some("<input disabled />".into()));
        assert_eq!(parse_raw("<a foo='bar'>"), Some("<a foo='bar'>".into()));
    }

    #[test]
    fn smoke_test_close_tag() {
        assert_eq!(parse_raw("</span>rest"), Some("</span>".into()));
    }

    #[test]
    fn smoke_test_comment() {
        assert_eq!(parse_raw("<!-- hi -->"), Some("<!-- hi -->".into()));
        assert_eq!(parse_raw("<!-->"), Some("<!-->".into()));
    }

    #[test]
    fn smoke_test_processing_instruction_and_declaration() {
        assert_eq!(parse_raw("<?php ?>"), Some("<?php ?>".into()));
        assert_eq!(parse_raw("<!DOCTYPE html>"), Some("<!DOCTYPE html>".into()));
        assert_eq!(parse_raw("<!doctype html>"), None);
    }

    #[test]
    fn smoke_test_cdata() {
        assert_eq!(parse_raw("<![CDATA[>&<]]>"), Some("<![CDATA[>&<]]>".into()));
    }

    #[test]
    fn smoke_test_rejects_malformed() {
        assert_eq!(parse_raw("<1bad>"), None);
        assert_eq!(parse_raw("< a>"), None);
        assert_eq!(parse_raw("<a foo=>"), None);
        assert_eq!(parse_raw("plain"), None);
    }
}

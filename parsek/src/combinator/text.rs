// Character and text primitives over char tokens
//
// Each primitive is a small labelled parser. Character classes follow the
// CommonMark 0.31.2 definitions: ASCII punctuation by range, Unicode
// punctuation as general categories P and S plus ASCII punctuation, Unicode
// whitespace as category Zs plus tab, line feed, form feed and carriage
// return. Indentation math uses a 4-column tab stop.

use unicode_general_category::{get_general_category, GeneralCategory};

use crate::combinator::input::ParserInput;
use crate::combinator::parser::{satisfy, Parser};
use crate::combinator::result::ParseResult;

pub const TAB_STOP: usize = 4;

pub fn is_ascii_punctuation(c: char) -> bool {
    matches!(c, '!'..='/' | ':'..='@' | '['..='`' | '{'..='~')
}

pub fn is_punctuation_or_symbol(c: char) -> bool {
    matches!(
        get_general_category(c),
        GeneralCategory::ConnectorPunctuation
            | GeneralCategory::DashPunctuation
            | GeneralCategory::OpenPunctuation
            | GeneralCategory::ClosePunctuation
            | GeneralCategory::InitialPunctuation
            | GeneralCategory::FinalPunctuation
            | GeneralCategory::OtherPunctuation
            | GeneralCategory::MathSymbol
            | GeneralCategory::CurrencySymbol
            | GeneralCategory::ModifierSymbol
            | GeneralCategory::OtherSymbol
    )
}

/// CommonMark "Unicode punctuation": ASCII punctuation or categories P and S.
pub fn is_unicode_punctuation(c: char) -> bool {
    is_ascii_punctuation(c) || is_punctuation_or_symbol(c)
}

/// CommonMark "Unicode whitespace": category Zs or tab, LF, FF, CR.
pub fn is_unicode_whitespace(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\u{000C}' | '\r')
        || get_general_category(c) == GeneralCategory::SpaceSeparator
}

pub fn ch<U: Clone + 'static>(expected: char) -> Parser<char, U, char> {
    satisfy(move |c: &char| *c == expected).label(&format!("'{}'", expected))
}

pub fn one_of<U: Clone + 'static>(set: &str) -> Parser<char, U, char> {
    let label = format!("one of {:?}", set);
    let set: Vec<char> = set.chars().collect();
    satisfy(move |c: &char| set.contains(c)).label(&label)
}

/// Match an exact character sequence, like a string tag.
pub fn literal<U: Clone + 'static>(expected: &str) -> Parser<char, U, String> {
    let chars: Vec<char> = expected.chars().collect();
    let text = expected.to_string();
    Parser::new(move |input| {
        for (offset, expected_char) in chars.iter().enumerate() {
            if input.peek(offset) != Some(expected_char) {
                return ParseResult::failure(format!("Expected {:?}", text), input);
            }
        }
        let next = input.advance_by(chars.len());
        ParseResult::success(text.clone(), next)
    })
}

pub fn digit<U: Clone + 'static>() -> Parser<char, U, char> {
    satisfy(|c: &char| c.is_ascii_digit()).label("digit")
}

pub fn hex_digit<U: Clone + 'static>() -> Parser<char, U, char> {
    satisfy(|c: &char| c.is_ascii_hexdigit()).label("hex digit")
}

pub fn letter<U: Clone + 'static>() -> Parser<char, U, char> {
    satisfy(|c: &char| c.is_alphabetic()).label("letter")
}

pub fn space<U: Clone + 'static>() -> Parser<char, U, char> {
    satisfy(|c: &char| *c == ' ').label("space")
}

pub fn tab<U: Clone + 'static>() -> Parser<char, U, char> {
    satisfy(|c: &char| *c == '\t').label("tab")
}

pub fn space_or_tab<U: Clone + 'static>() -> Parser<char, U, char> {
    satisfy(|c: &char| *c == ' ' || *c == '\t').label("space or tab")
}

pub fn ascii_punctuation<U: Clone + 'static>() -> Parser<char, U, char> {
    satisfy(|c: &char| is_ascii_punctuation(*c)).label("ASCII punctuation")
}

pub fn unicode_punctuation<U: Clone + 'static>() -> Parser<char, U, char> {
    satisfy(|c: &char| is_unicode_punctuation(*c)).label("Unicode punctuation")
}

pub fn unicode_whitespace<U: Clone + 'static>() -> Parser<char, U, char> {
    satisfy(|c: &char| is_unicode_whitespace(*c)).label("Unicode whitespace")
}

/// Matches `\n`, `\r\n` or a lone `\r`; always yields `'\n'`.
pub fn line_ending<U: Clone + 'static>() -> Parser<char, U, char> {
    Parser::new(|input| match input.current() {
        Some('\n') => {
            let next = input.advance();
            ParseResult::success('\n', next)
        }
        Some('\r') => {
            let next = if input.peek(1) == Some(&'\n') {
                input.advance_by(2)
            } else {
                input.advance()
            };
            ParseResult::success('\n', next)
        }
        _ => ParseResult::failure("line ending", input),
    })
}

/// `(space|tab)*` followed by a line ending, or by end of input so the last
/// line of a file may be blank without a trailing newline.
pub fn blank_line<U: Clone + 'static>() -> Parser<char, U, ()> {
    Parser::new(|input: ParserInput<char, U>| {
        let mut offset = 0;
        while matches!(input.peek(offset), Some(' ') | Some('\t')) {
            offset += 1;
        }
        match input.peek(offset) {
            Some('\n') => ParseResult::success((), input.advance_by(offset + 1)),
            Some('\r') => {
                let extra = if input.peek(offset + 1) == Some(&'\n') { 2 } else { 1 };
                ParseResult::success((), input.advance_by(offset + extra))
            }
            Some(_) => ParseResult::failure("blank line", input),
            None => ParseResult::success((), input.advance_by(offset)),
        }
    })
}

/// Consume up to, but not past, the next line ending (or end of input).
/// Never fails; may consume nothing.
pub fn rest_of_line<U: Clone + 'static>() -> Parser<char, U, String> {
    Parser::new(|input: ParserInput<char, U>| {
        let tokens = input.tokens();
        let mut end = input.index();
        while end < tokens.len() && tokens[end] != '\n' && tokens[end] != '\r' {
            end += 1;
        }
        let value: String = tokens[input.index()..end].iter().collect();
        let next = input.at_index(end);
        ParseResult::success(value, next)
    })
}

/// Exactly `n` spaces.
pub fn indent<U: Clone + 'static>(n: usize) -> Parser<char, U, ()> {
    space().repeat(n).map(|_| ()).label("indentation")
}

/// Zero to three spaces; yields the count.
pub fn up_to_3_spaces<U: Clone + 'static>() -> Parser<char, U, usize> {
    Parser::new(|input: ParserInput<char, U>| {
        let mut count = 0;
        while count < 3 && input.peek(count) == Some(&' ') {
            count += 1;
        }
        ParseResult::success(count, input.advance_by(count))
    })
}

/// Decimal integer. The digit run carries the syntactic label "integer"; the
/// range check reports its own domain message, which outer labels must not
/// clobber.
pub fn integer<U: Clone + 'static>() -> Parser<char, U, i64> {
    digit().many1().label("integer").bind(|digits| {
        let text: String = digits.into_iter().collect();
        match text.parse::<i64>() {
            Ok(value) => Parser::pure(value),
            Err(_) => Parser::fail_with(&format!("Integer out of range: {}", text)),
        }
    })
}

/// Width of the leading whitespace of `line`, expanding tabs to 4-column
/// stops.
pub fn indentation_width(line: &str) -> usize {
    let mut columns = 0;
    for c in line.chars() {
        match c {
            ' ' => columns += 1,
            '\t' => columns += TAB_STOP - (columns % TAB_STOP),
            _ => break,
        }
    }
    columns
}

/// Remove up to `columns` columns of leading whitespace from `line`. A tab
/// that straddles the boundary is replaced by the spaces left over past it.
pub fn strip_columns(line: &str, columns: usize) -> String {
    strip_columns_from(line, columns, 0)
}

/// As `strip_columns`, with tab stops measured from `start_col` (used when
/// the text begins mid-line, e.g. after a list marker).
pub fn strip_columns_from(line: &str, columns: usize, start_col: usize) -> String {
    let mut removed = 0;
    let mut chars = line.chars();
    loop {
        if removed >= columns {
            return chars.as_str().to_string();
        }
        let rest = chars.as_str();
        match chars.next() {
            Some(' ') => removed += 1,
            Some('\t') => {
                let width = TAB_STOP - ((start_col + removed) % TAB_STOP);
                if removed + width > columns {
                    let overshoot = removed + width - columns;
                    let mut out = " ".repeat(overshoot);
                    out.push_str(chars.as_str());
                    return out;
                }
                removed += width;
            }
            _ => return rest.to_string(),
        }
    }
}

// CommonMark code span
//
// An opening backtick run of length N closes only on a run of exactly N;
// runs of other lengths are content. Line endings in the content become
// spaces, and one leading plus one trailing space are stripped when the
// content has both and is not all spaces.

use crate::combinator::{ParseResult, Parser, ParserInput};
use crate::highlight::{HighlightContext, HighlightKind};
use crate::markdown::ast::Inline;
use crate::markdown::blocks::MdParser;

pub(crate) fn code_span() -> MdParser<Inline> {
    Parser::new(|input: ParserInput<char, HighlightContext>| {
        let tokens = input.tokens();
        let start = input.index();
        if tokens.get(start) != Some(&'`') {
            return ParseResult::failure("code span", input);
        }
        let mut open_end = start;
        while tokens.get(open_end) == Some(&'`') {
            open_end += 1;
        }
        let open_len = open_end - start;

        // Find a closing run of exactly open_len.
        let mut i = open_end;
        let close_start = loop {
            if i >= tokens.len() {
                return ParseResult::failure("code span", input);
            }
            if tokens[i] == '`' {
                let run_start = i;
                while tokens.get(i) == Some(&'`') {
                    i += 1;
                }
                if i - run_start == open_len {
                    break run_start;
                }
            } else {
                i += 1;
            }
        };

        let raw: String = tokens[open_end..close_start].iter().collect();
        let literal = normalize_content(&raw);
        log::debug!("code span ({} backticks): {:?}", open_len, literal);

        let context = input.context().clone();
        context.emit(start..open_end, HighlightKind::CodeSpanDelimiter);
        context.emit(open_end..close_start, HighlightKind::CodeSpanContent);
        context.emit(
            close_start..close_start + open_len,
            HighlightKind::CodeSpanDelimiter,
        );

        let next = input.at_index(close_start + open_len);
        ParseResult::success(Inline::CodeSpan { literal }, next)
    })
}

fn normalize_content(raw: &str) -> String {
    // Line endings become single spaces.
    let mut content = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                content.push(' ');
            }
            '\n' => content.push(' '),
            other => content.push(other),
        }
    }
    // Strip one space from both ends when both are spaces and the content is
    // not only spaces.
    let stripped = content.starts_with(' ')
        && content.ends_with(' ')
        && content.chars().count() >= 2
        && !content.chars().all(|c| c == ' ');
    if stripped {
        let mut chars = content.chars();
        chars.next();
        chars.next_back();
        chars.as_str().to_string()
    } else {
        content
    }
}

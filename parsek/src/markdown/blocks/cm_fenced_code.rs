// CommonMark fenced code block
//
// An opening fence of three or more backticks or tildes after 0-3 spaces of
// indent N; content lines have up to N columns of indentation removed; the
// closing fence needs at least the opening length of the same character and
// nothing else on its line. An unterminated block runs to end of input.

use crate::combinator::text::strip_columns;
use crate::combinator::{ParseResult, Parser, ParserInput};
use crate::highlight::{HighlightContext, HighlightKind};
use crate::markdown::ast::Block;
use crate::markdown::blocks::{line_at, MdParser};

pub(crate) fn fenced_code() -> MdParser<Block> {
    Parser::new(|input: ParserInput<char, HighlightContext>| {
        let tokens = input.tokens();
        let start = input.index();
        let first = line_at(tokens, start);
        let chars: Vec<char> = first.text.chars().collect();

        let mut i = 0;
        while i < chars.len() && chars[i] == ' ' {
            i += 1;
        }
        if i > 3 {
            return ParseResult::failure("fenced code block", input);
        }
        let indent = i;
        let fence_char = match chars.get(i) {
            Some(&c) if c == '`' || c == '~' => c,
            _ => return ParseResult::failure("fenced code block", input),
        };
        let fence_start = i;
        while i < chars.len() && chars[i] == fence_char {
            i += 1;
        }
        let fence_len = i - fence_start;
        if fence_len < 3 {
            return ParseResult::failure("fenced code block", input);
        }

        let info_raw: String = chars[i..].iter().collect();
        let info_trimmed = info_raw.trim();
        if fence_char == '`' && info_trimmed.contains('`') {
            return ParseResult::failure("fenced code block", input);
        }
        let info = if info_trimmed.is_empty() {
            None
        } else {
            Some(info_trimmed.to_string())
        };

        let context = input.context().clone();
        context.emit(
            start + fence_start..start + fence_start + fence_len,
            HighlightKind::CodeFence,
        );
        if info.is_some() {
            let info_lead = info_raw.len() - info_raw.trim_start().len();
            let info_begin = start + i + info_raw[..info_lead].chars().count();
            context.emit(
                info_begin..info_begin + info_trimmed.chars().count(),
                HighlightKind::CodeInfo,
            );
        }

        let mut pos = first.next_start;
        let content_start = pos;
        let mut literal = String::new();
        let mut end = pos;
        let mut content_end = pos;

        while pos < tokens.len() {
            let line = line_at(tokens, pos);
            if let Some(close_run) = closing_fence_run(&line.text, fence_char, fence_len) {
                context.emit(
                    pos + close_run.0..pos + close_run.0 + close_run.1,
                    HighlightKind::CodeFence,
                );
                end = line.next_start;
                break;
            }
            literal.push_str(&strip_columns(&line.text, indent));
            literal.push('\n');
            pos = line.next_start;
            content_end = pos;
            end = pos;
        }

        if content_end > content_start {
            context.emit(content_start..content_end, HighlightKind::CodeContent);
        }
        log::debug!(
            "fenced code block ({:?}): {} bytes",
            info,
            literal.len()
        );

        let next = input.at_index(end);
        ParseResult::success(Block::FencedCodeBlock { info, literal }, next)
    })
}

/// Offset and length of a valid closing fence run within `line`, if any.
fn closing_fence_run(line: &str, fence_char: char, min_len: usize) -> Option<(usize, usize)> {
    let chars: Vec<char> = line.chars().collect();
    let mut i = 0;
    while i < chars.len() && chars[i] == ' ' {
        i += 1;
    }
    if i > 3 {
        return None;
    }
    let run_start = i;
    while i < chars.len() && chars[i] == fence_char {
        i += 1;
    }
    let run_len = i - run_start;
    if run_len < min_len {
        return None;
    }
    if chars[i..].iter().all(|&c| c == ' ' || c == '\t') {
        Some((run_start, run_len))
    } else {
        None
    }
}

pub(crate) fn is_opening_fence_line(line: &str) -> bool {
    let trimmed = line.trim_start_matches(' ');
    if line.len() - trimmed.len() > 3 {
        return false;
    }
    let fence_char = match trimmed.chars().next() {
        Some(c @ ('`' | '~')) => c,
        _ => return false,
    };
    let run = trimmed.chars().take_while(|&c| c == fence_char).count();
    if run < 3 {
        return false;
    }
    // A backtick fence may not carry backticks in its info string.
    fence_char == '~' || !trimmed[run..].contains('`')
}

// CommonMark paragraph and setext heading
//
// One accumulator handles both: non-blank lines are collected, and before a
// line is taken as content it is tested as a setext underline. The underline
// test runs first so `---` under text becomes a level-2 heading rather than
// interrupting the paragraph as a thematic break. Content is staged raw; the
// driver runs the inline pass later.

use crate::combinator::{ParseResult, Parser, ParserInput};
use crate::highlight::{HighlightContext, HighlightKind};
use crate::markdown::ast::{Block, InlineContent};
use crate::markdown::blocks::{can_interrupt_paragraph, is_blank, line_at, MdParser};

pub(crate) fn paragraph_or_setext() -> MdParser<Block> {
    Parser::new(|input: ParserInput<char, HighlightContext>| {
        let tokens = input.tokens();
        let mut pos = input.index();
        let mut lines: Vec<String> = Vec::new();
        let mut consumed = pos;

        while pos < tokens.len() {
            let line = line_at(tokens, pos);
            if is_blank(&line.text) {
                break;
            }
            if lines.is_empty() {
                // A paragraph cannot open on an indented-code line; the
                // alternative order normally prevents this, inner contexts
                // keep the guard honest.
                lines.push(line.text.trim_start().to_string());
            } else {
                if let Some(level) = setext_underline_level(&line.text) {
                    let raw = finish_content(lines);
                    log::debug!("setext heading level {}: {:?}", level, raw);
                    input
                        .context()
                        .emit(pos..line.content_end, HighlightKind::HeadingMarker);
                    let next = input.at_index(line.next_start);
                    return ParseResult::success(
                        Block::Heading {
                            level,
                            content: InlineContent::raw(raw),
                        },
                        next,
                    );
                }
                if can_interrupt_paragraph(&line.text) {
                    break;
                }
                lines.push(line.text.trim_start().to_string());
            }
            consumed = line.next_start;
            pos = line.next_start;
        }

        if lines.is_empty() {
            return ParseResult::failure("paragraph", input);
        }
        let raw = finish_content(lines);
        log::debug!("paragraph: {:?}", crate::markdown::safe_preview(&raw, 40));
        let next = input.at_index(consumed);
        ParseResult::success(
            Block::Paragraph {
                content: InlineContent::raw(raw),
            },
            next,
        )
    })
}

/// Join collected lines; trailing whitespace on the final line never carries
/// meaning (no break follows it).
fn finish_content(lines: Vec<String>) -> String {
    let joined = lines.join("\n");
    joined.trim_end().to_string()
}

/// `Some(1)` for an `=` underline, `Some(2)` for `-`, otherwise `None`.
pub(crate) fn setext_underline_level(line: &str) -> Option<u8> {
    let trimmed = line.trim_start_matches(' ');
    if line.len() - trimmed.len() > 3 {
        return None;
    }
    let marker = match trimmed.chars().next() {
        Some(c @ ('=' | '-')) => c,
        _ => return None,
    };
    let run = trimmed.chars().take_while(|&c| c == marker).count();
    if trimmed[run..].chars().all(|c| c == ' ' || c == '\t') {
        Some(if marker == '=' { 1 } else { 2 })
    } else {
        None
    }
}

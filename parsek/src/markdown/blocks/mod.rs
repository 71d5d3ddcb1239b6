// Block-level grammar: alternative ordering and shared line machinery
//
// The alternative order is load-bearing: thematic break before list so
// `- - -` is a break and not a bullet item, list before the setext/paragraph
// accumulator so `---` after a bullet item is not misread as an underline,
// and the reference definition before the paragraph fallback.

use std::rc::Rc;

use crate::combinator::text::blank_line;
use crate::combinator::{choice, ParseResult, Parser, ParserInput};
use crate::highlight::HighlightContext;
use crate::markdown::ast::{Block, InlineContent};

pub mod cm_atx_heading;
pub mod cm_blockquote;
pub mod cm_fenced_code;
pub mod cm_html_block;
pub mod cm_indented_code;
pub mod cm_link_reference;
pub mod cm_list;
pub mod cm_paragraph;
pub mod cm_thematic_break;

pub(crate) type MdParser<V> = Parser<char, HighlightContext, V>;
pub(crate) type MdInput = ParserInput<char, HighlightContext>;

/// Deferred handle on the top-level block parser, so containers can recurse
/// into it while being one of its alternatives.
pub(crate) type BlockFactory = Rc<dyn Fn() -> MdParser<Block>>;

/// The top-level block alternative.
pub(crate) fn block() -> MdParser<Block> {
    let factory: BlockFactory = Rc::new(block);
    choice(vec![
        blank_line().map(|_| Block::BlankLine),
        cm_fenced_code::fenced_code(),
        cm_html_block::html_block(),
        cm_atx_heading::atx_heading(),
        cm_thematic_break::thematic_break(),
        cm_list::list(factory.clone()),
        cm_blockquote::block_quote(factory),
        cm_indented_code::indented_code(),
        cm_link_reference::link_reference_definition(),
        cm_paragraph::paragraph_or_setext(),
    ])
}

/// One physical line of the input, by char index.
pub(crate) struct Line {
    pub text: String,
    /// Index just past the line content, before any line ending.
    pub content_end: usize,
    /// Index past the line ending (== `content_end` at end of input).
    pub next_start: usize,
}

pub(crate) fn line_at(tokens: &[char], start: usize) -> Line {
    let mut end = start;
    while end < tokens.len() && tokens[end] != '\n' && tokens[end] != '\r' {
        end += 1;
    }
    let mut next = end;
    if next < tokens.len() {
        if tokens[next] == '\r' && tokens.get(next + 1) == Some(&'\n') {
            next += 2;
        } else {
            next += 1;
        }
    }
    Line {
        text: tokens[start..end].iter().collect(),
        content_end: end,
        next_start: next,
    }
}

pub(crate) fn is_blank(line: &str) -> bool {
    line.chars().all(|c| c == ' ' || c == '\t')
}

/// Constructs that may cut a paragraph (and therefore end lazy
/// continuation): ATX headings, fences, thematic breaks, block quotes,
/// list items that can interrupt, and HTML block types 1-6.
pub(crate) fn can_interrupt_paragraph(line: &str) -> bool {
    cm_atx_heading::is_atx_heading_line(line)
        || cm_fenced_code::is_opening_fence_line(line)
        || cm_thematic_break::is_thematic_break_line(line)
        || cm_blockquote::is_block_quote_line(line)
        || cm_list::interrupts_paragraph(line)
        || cm_html_block::interrupts_paragraph(line)
}

/// Run the block parser from `factory` repeatedly over `text`, the recursive
/// entry used by containers and the document driver. Total: an unparseable
/// line (which should not arise, the paragraph fallback is total) degrades
/// to a raw paragraph instead of aborting the sequence.
pub(crate) fn parse_block_sequence(factory: &BlockFactory, text: &str, context: HighlightContext) -> Vec<Block> {
    let parser = factory();
    let mut input = ParserInput::from_text(text, context);
    let mut blocks = Vec::new();
    while !input.at_end() {
        match parser.parse(input.clone()) {
            ParseResult::Success { value, next } => {
                if next.index() == input.index() {
                    log::warn!("block parser made no progress at index {}", next.index());
                    break;
                }
                blocks.push(value);
                input = next;
            }
            ParseResult::Failure { message, index, .. } => {
                log::warn!("no block matched at index {}: {}", index, message);
                let line = line_at(input.tokens(), input.index());
                blocks.push(Block::Paragraph {
                    content: InlineContent::raw(line.text),
                });
                input = input.at_index(line.next_start.max(input.index() + 1));
            }
        }
    }
    blocks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smoke_test_line_at_endings() {
        let toks: Vec<char> = "ab\r\ncd".chars().collect();
        let line = line_at(&toks, 0);
        assert_eq!(line.text, "ab");
        assert_eq!(line.content_end, 2);
        assert_eq!(line.next_start, 4);

        let last = line_at(&toks, 4);
        assert_eq!(last.text, "cd");
        assert_eq!(last.next_start, 6);
    }

    #[test]
    fn smoke_test_can_interrupt_paragraph() {
        assert!(can_interrupt_paragraph("# heading"));
        assert!(can_interrupt_paragraph("```"));
        assert!(can_interrupt_paragraph("> quote"));
        assert!(can_interrupt_paragraph("- item"));
        assert!(can_interrupt_paragraph("***"));
        assert!(!can_interrupt_paragraph("plain text"));
        // Ordered lists interrupt only when starting at 1.
        assert!(can_interrupt_paragraph("1. item"));
        assert!(!can_interrupt_paragraph("2. item"));
    }
}

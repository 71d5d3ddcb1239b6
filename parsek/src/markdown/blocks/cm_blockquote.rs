// CommonMark block quote
//
// A marked line is 0-3 spaces, `>`, and an optional following space. A
// non-blank unmarked line continues the quote lazily as long as it could
// not open a block of its own. Blank lines terminate. The stripped content
// is re-parsed by the block pipeline obtained from the injected factory,
// which is what lets containers nest mutually.

use crate::combinator::{ParseResult, Parser, ParserInput};
use crate::highlight::{HighlightContext, HighlightKind};
use crate::markdown::ast::Block;
use crate::markdown::blocks::{
    can_interrupt_paragraph, is_blank, line_at, parse_block_sequence, BlockFactory, MdParser,
};

pub(crate) fn block_quote(factory: BlockFactory) -> MdParser<Block> {
    Parser::new(move |input: ParserInput<char, HighlightContext>| {
        let tokens = input.tokens();
        let mut pos = input.index();
        let mut inner = String::new();
        let mut any_marked = false;
        let mut consumed = pos;

        while pos < tokens.len() {
            let line = line_at(tokens, pos);
            if is_blank(&line.text) {
                break;
            }
            if let Some((rest, marker_offset)) = strip_quote_marker(&line.text) {
                input.context().emit(
                    pos + marker_offset..pos + marker_offset + 1,
                    HighlightKind::BlockquoteMarker,
                );
                any_marked = true;
                inner.push_str(&rest);
                inner.push('\n');
            } else if any_marked && !can_interrupt_paragraph(&line.text) {
                // Lazy continuation
                inner.push_str(line.text.trim_start());
                inner.push('\n');
            } else {
                break;
            }
            consumed = line.next_start;
            pos = line.next_start;
        }

        if !any_marked {
            return ParseResult::failure("block quote", input);
        }
        log::debug!("block quote: {} bytes of content", inner.len());

        let blocks = parse_block_sequence(&factory, &inner, input.context().clone());
        let next = input.at_index(consumed);
        ParseResult::success(Block::BlockQuote { blocks }, next)
    })
}

/// Strip `0-3 spaces, '>', optional space`; yields the rest of the line and
/// the marker's char offset.
fn strip_quote_marker(line: &str) -> Option<(String, usize)> {
    let mut chars = line.chars();
    let mut offset = 0;
    loop {
        match chars.next() {
            Some(' ') if offset < 3 => offset += 1,
            Some('>') => {
                let rest = chars.as_str();
                let rest = rest.strip_prefix(' ').unwrap_or(rest);
                return Some((rest.to_string(), offset));
            }
            _ => return None,
        }
    }
}

pub(crate) fn is_block_quote_line(line: &str) -> bool {
    let trimmed = line.trim_start_matches(' ');
    line.len() - trimmed.len() <= 3 && trimmed.starts_with('>')
}

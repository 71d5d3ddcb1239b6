// CommonMark indented code block
//
// Greedy over lines indented by at least four columns. Blank lines inside
// are tentative: they join the block only when another indented line
// follows, so trailing blanks are left for the enclosing context.

use crate::combinator::text::{indentation_width, strip_columns};
use crate::combinator::{ParseResult, Parser, ParserInput};
use crate::highlight::{HighlightContext, HighlightKind};
use crate::markdown::ast::Block;
use crate::markdown::blocks::{is_blank, line_at, MdParser};

pub(crate) fn indented_code() -> MdParser<Block> {
    Parser::new(|input: ParserInput<char, HighlightContext>| {
        let tokens = input.tokens();
        let mut pos = input.index();
        let mut literal = String::new();
        let mut pending_blanks: Vec<String> = Vec::new();
        let mut consumed = pos;
        let mut any_line = false;

        while pos < tokens.len() {
            let line = line_at(tokens, pos);
            if is_blank(&line.text) {
                if !any_line {
                    break;
                }
                pending_blanks.push(strip_columns(&line.text, 4));
                pos = line.next_start;
                continue;
            }
            if indentation_width(&line.text) < 4 {
                break;
            }
            for blank in pending_blanks.drain(..) {
                literal.push_str(&blank);
                literal.push('\n');
            }
            literal.push_str(&strip_columns(&line.text, 4));
            literal.push('\n');
            any_line = true;
            consumed = line.next_start;
            pos = line.next_start;
        }

        if !any_line {
            return ParseResult::failure("indented code block", input);
        }
        log::debug!("indented code block: {} bytes", literal.len());

        input
            .context()
            .emit(input.index()..consumed, HighlightKind::CodeContent);
        let next = input.at_index(consumed);
        ParseResult::success(Block::IndentedCodeBlock { literal }, next)
    })
}

// Text fallback
//
// Batches runs of characters no other inline parser can start on. When the
// run ends at a line ending, trailing spaces and tabs are handed back so
// the line-break parser can tell hard from soft. A lone starter char that
// no parser accepted is consumed one char at a time.

use crate::highlight::HighlightKind;
use crate::markdown::ast::Inline;
use crate::markdown::blocks::MdInput;

// Chars some inline parser might claim; a text run stops before them.
const STARTERS: &[char] = &[
    '\\', '&', '`', '<', '[', ']', '!', '*', '_', '\n', '\r', ' ', '\t',
];

fn is_starter(c: char) -> bool {
    STARTERS.contains(&c)
}

/// Consume one batch of plain text. Total: always advances by at least one
/// char.
pub(crate) fn text_fallback(input: &MdInput) -> (Inline, MdInput) {
    let tokens = input.tokens();
    let start = input.index();
    let mut end = start;
    while end < tokens.len() {
        let c = tokens[end];
        if c == ' ' || c == '\t' {
            // Whitespace is safe unless it runs into a line ending, where
            // the break parser needs it.
            let mut probe = end;
            while probe < tokens.len() && (tokens[probe] == ' ' || tokens[probe] == '\t') {
                probe += 1;
            }
            if probe >= tokens.len() {
                end = probe;
                continue;
            }
            if tokens[probe] == '\n' || tokens[probe] == '\r' {
                break;
            }
            end = probe;
            continue;
        }
        if is_starter(c) {
            break;
        }
        end += 1;
    }
    if end == start {
        // The starter at this position matched nothing; it is literal.
        end = start + 1;
    }
    let literal: String = tokens[start..end].iter().collect();
    input
        .context()
        .emit(start..end, HighlightKind::PlainText);
    (Inline::Text { literal }, input.at_index(end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combinator::ParserInput;
    use crate::highlight::HighlightContext;

    fn fallback(text: &str) -> (String, usize) {
        let input = ParserInput::from_text(text, HighlightContext::default());
        let (inline, next) = text_fallback(&input);
        match inline {
            Inline::Text { literal } => (literal, next.index()),
            other => panic!("expected text, got {:?}", other),
        }
    }

    #[test]
    fn smoke_test_batches_plain_run() {
        assert_eq!(fallback("plain text*em"), ("plain text".into(), 10));
    }

    #[test]
    fn smoke_test_trailing_spaces_left_for_break_parser() {
        assert_eq!(fallback("word  \nnext"), ("word".into(), 4));
    }

    #[test]
    fn smoke_test_single_starter_consumed() {
        assert_eq!(fallback("*rest"), ("*".into(), 1));
        assert_eq!(fallback("[x"), ("[".into(), 1));
    }

    #[test]
    fn smoke_test_trailing_spaces_at_eof_kept() {
        assert_eq!(fallback("word  "), ("word  ".into(), 6));
    }
}

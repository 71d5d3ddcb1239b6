// CommonMark link reference definition
//
// `[label]:` then destination, then an optional title separated by
// whitespace. Whitespace around the destination may contain at most one
// line ending. A title that fails to parse on its own line does not sink
// the definition; a malformed title on the destination line does.

use crate::combinator::{ParseResult, Parser, ParserInput};
use crate::highlight::{HighlightContext, HighlightKind};
use crate::markdown::ast::Block;
use crate::markdown::blocks::MdParser;
use crate::markdown::link::{
    scan_destination, scan_ref_label, scan_title, skip_spaces_tabs, skip_ws_max_one_newline,
};

pub(crate) fn link_reference_definition() -> MdParser<Block> {
    Parser::new(|input: ParserInput<char, HighlightContext>| {
        let tokens = input.tokens();
        let start = input.index();

        let mut i = start;
        let mut spaces = 0;
        while tokens.get(i) == Some(&' ') && spaces < 4 {
            i += 1;
            spaces += 1;
        }
        if spaces > 3 {
            return ParseResult::failure("link reference definition", input);
        }

        let (label, after_label) = match scan_ref_label(tokens, i) {
            Some(found) => found,
            None => return ParseResult::failure("link reference definition", input),
        };
        if tokens.get(after_label) != Some(&':') {
            return ParseResult::failure("link reference definition", input);
        }
        let after_colon = after_label + 1;

        let dest_start = match skip_ws_max_one_newline(tokens, after_colon) {
            Some(i) => i,
            None => return ParseResult::failure("link reference definition", input),
        };
        let (destination, after_dest) = match scan_destination(tokens, dest_start) {
            Some(found) => found,
            None => return ParseResult::failure("link reference definition", input),
        };

        // Title attempt: whitespace (with at most one line ending), a title,
        // then only trailing whitespace on its line.
        let mut title = None;
        let mut end = None;
        let mut title_range = None;
        if let Some(title_start) = skip_ws_max_one_newline(tokens, after_dest) {
            if title_start > after_dest {
                if let Some((t, after_title)) = scan_title(tokens, title_start) {
                    let trailing = skip_spaces_tabs(tokens, after_title);
                    if let Some(after_eol) = at_line_end(tokens, trailing) {
                        title = Some(t);
                        title_range = Some(title_start..after_title);
                        end = Some(after_eol);
                    }
                }
            }
        }
        // No (valid) title: the destination must end its line.
        if end.is_none() {
            let trailing = skip_spaces_tabs(tokens, after_dest);
            match at_line_end(tokens, trailing) {
                Some(after_eol) => end = Some(after_eol),
                None => return ParseResult::failure("link reference definition", input),
            }
        }
        let end = match end {
            Some(end) => end,
            None => return ParseResult::failure("link reference definition", input),
        };

        log::debug!("link reference definition: [{}] -> {}", label, destination);
        let context = input.context().clone();
        context.emit(dest_start..after_dest, HighlightKind::LinkDestination);
        if let Some(range) = title_range {
            context.emit(range, HighlightKind::LinkTitle);
        }

        let next = input.at_index(end);
        ParseResult::success(
            Block::LinkReferenceDefinition {
                label,
                destination,
                title,
            },
            next,
        )
    })
}

/// Index past the line ending at `i`, `Some(i)` at end of input, `None` when
/// a non-terminator character sits there.
fn at_line_end(tokens: &[char], i: usize) -> Option<usize> {
    match tokens.get(i) {
        None => Some(i),
        Some('\n') => Some(i + 1),
        Some('\r') => {
            if tokens.get(i + 1) == Some(&'\n') {
                Some(i + 2)
            } else {
                Some(i + 1)
            }
        }
        Some(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combinator::ParserInput;
    use crate::highlight::HighlightContext;

    fn parse_definition(text: &str) -> Option<(String, String, Option<String>, usize)> {
        let input = ParserInput::from_text(text, HighlightContext::default());
        match link_reference_definition().parse(input) {
            ParseResult::Success { value, next } => match value {
                Block::LinkReferenceDefinition {
                    label,
                    destination,
                    title,
                } => Some((label, destination, title, next.index())),
                _ => None,
            },
            ParseResult::Failure { .. } => None,
        }
    }

    #[test]
    fn smoke_test_definition_with_title() {
        let (label, dest, title, _) =
            parse_definition("[foo]: /url \"t\"\n").expect("definition");
        assert_eq!(label, "foo");
        assert_eq!(dest, "/url");
        assert_eq!(title.as_deref(), Some("t"));
    }

    #[test]
    fn smoke_test_definition_without_title() {
        let (_, dest, title, _) = parse_definition("[foo]: /url\n").expect("definition");
        assert_eq!(dest, "/url");
        assert_eq!(title, None);
    }

    #[test]
    fn smoke_test_definition_angle_destination() {
        let (_, dest, _, _) = parse_definition("[foo]: </my url>\n").expect("definition");
        assert_eq!(dest, "/my url");
    }

    #[test]
    fn smoke_test_destination_on_next_line() {
        let (_, dest, _, _) = parse_definition("[foo]:\n   /url\n").expect("definition");
        assert_eq!(dest, "/url");
    }

    #[test]
    fn smoke_test_title_on_next_line() {
        let (_, _, title, _) =
            parse_definition("[foo]: /url\n  \"title\"\n").expect("definition");
        assert_eq!(title.as_deref(), Some("title"));
    }

    #[test]
    fn smoke_test_invalid_title_on_next_line_falls_back() {
        // The would-be title line is left for the paragraph parser.
        let (_, dest, title, end) =
            parse_definition("[foo]: /url\n\"broken\n").expect("definition");
        assert_eq!(dest, "/url");
        assert_eq!(title, None);
        assert_eq!(end, 12);
    }

    #[test]
    fn smoke_test_garbage_after_destination_rejected() {
        assert!(parse_definition("[foo]: /url junk\n").is_none());
    }

    #[test]
    fn smoke_test_indent_limit() {
        assert!(parse_definition("   [a]: /x\n").is_some());
        assert!(parse_definition("    [a]: /x\n").is_none());
    }
}

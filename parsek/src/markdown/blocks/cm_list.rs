// CommonMark list items and lists
//
// The content column W of an item is leading + marker length + the spaces
// after the marker, except that five or more spaces give the marker just
// one (the rest is first-line content, which is how code blocks start
// inside items). Continuation lines carry at least W columns and are
// stripped by W. Blank lines are absorbed only when a continuation
// follows; one between items makes the list loose.

use crate::combinator::text::{indentation_width, strip_columns, strip_columns_from};
use crate::combinator::{ParseResult, Parser, ParserInput};
use crate::highlight::{HighlightContext, HighlightKind};
use crate::markdown::ast::{Block, ListItem};
use crate::markdown::blocks::cm_thematic_break::is_thematic_break_line;
use crate::markdown::blocks::{
    is_blank, line_at, parse_block_sequence, BlockFactory, MdParser,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ListMarker {
    Bullet(char),
    Ordered { number: u64, delimiter: char },
}

impl ListMarker {
    /// Same marker kind and same character/delimiter.
    fn compatible(&self, other: &ListMarker) -> bool {
        match (self, other) {
            (ListMarker::Bullet(a), ListMarker::Bullet(b)) => a == b,
            (
                ListMarker::Ordered { delimiter: a, .. },
                ListMarker::Ordered { delimiter: b, .. },
            ) => a == b,
            _ => false,
        }
    }
}

pub(crate) struct MarkerScan {
    pub marker: ListMarker,
    /// W: minimum indentation of continuation lines.
    pub content_col: usize,
    /// `None` when nothing but whitespace follows the marker.
    pub first_line_content: Option<String>,
    /// Char offset of the marker within the line.
    pub marker_offset: usize,
    pub marker_len: usize,
}

pub(crate) fn scan_marker(line: &str) -> Option<MarkerScan> {
    let chars: Vec<char> = line.chars().collect();
    let mut i = 0;
    while i < chars.len() && chars[i] == ' ' && i < 4 {
        i += 1;
    }
    let leading = i;
    if leading > 3 {
        return None;
    }

    let marker_offset = i;
    let (marker, marker_len) = match chars.get(i) {
        Some(&c) if c == '-' || c == '+' || c == '*' => (ListMarker::Bullet(c), 1),
        Some(c) if c.is_ascii_digit() => {
            let digit_start = i;
            let mut j = i;
            while j < chars.len() && chars[j].is_ascii_digit() {
                j += 1;
            }
            if j - digit_start > 9 {
                return None;
            }
            let delimiter = match chars.get(j) {
                Some(&d) if d == '.' || d == ')' => d,
                _ => return None,
            };
            let number: u64 = chars[digit_start..j]
                .iter()
                .collect::<String>()
                .parse()
                .ok()?;
            (ListMarker::Ordered { number, delimiter }, j - digit_start + 1)
        }
        _ => return None,
    };

    let after = marker_offset + marker_len;
    let rest: String = chars[after..].iter().collect();
    if rest.trim().is_empty() {
        // Empty first line: one column belongs to the marker.
        return Some(MarkerScan {
            marker,
            content_col: leading + marker_len + 1,
            first_line_content: None,
            marker_offset,
            marker_len,
        });
    }
    let first = rest.chars().next()?;
    if first != ' ' && first != '\t' {
        return None;
    }

    let marker_col = leading + marker_len;
    let spaces_after = ws_width_from(&rest, marker_col);
    let (content_col, content) = if spaces_after >= 5 {
        // Only one space belongs to the marker; the rest opens indented
        // content on the first line.
        (
            marker_col + 1,
            strip_columns_from(&rest, 1, marker_col),
        )
    } else {
        (
            marker_col + spaces_after,
            strip_columns_from(&rest, spaces_after, marker_col),
        )
    };
    Some(MarkerScan {
        marker,
        content_col,
        first_line_content: Some(content),
        marker_offset,
        marker_len,
    })
}

/// Columns of leading whitespace in `s`, with tab stops measured from
/// `start_col`.
fn ws_width_from(s: &str, start_col: usize) -> usize {
    let mut col = start_col;
    for c in s.chars() {
        match c {
            ' ' => col += 1,
            '\t' => col += 4 - col % 4,
            _ => break,
        }
    }
    col - start_col
}

struct ItemScan {
    marker: ListMarker,
    content: String,
    internally_blank: bool,
    end: usize,
    marker_range: (usize, usize),
}

fn parse_item(tokens: &[char], start: usize) -> Option<ItemScan> {
    let first = line_at(tokens, start);
    // `* * *` and friends are thematic breaks, never items.
    if is_thematic_break_line(&first.text) {
        return None;
    }
    let scan = scan_marker(&first.text)?;
    let w = scan.content_col;
    let empty_first = scan.first_line_content.is_none();
    let mut content = String::new();
    if let Some(first_content) = &scan.first_line_content {
        content.push_str(first_content);
        content.push('\n');
    }
    let marker_range = (
        start + scan.marker_offset,
        start + scan.marker_offset + scan.marker_len,
    );

    let mut pos = first.next_start;
    let mut consumed = first.next_start;
    let mut pending_blanks = 0usize;
    let mut internally_blank = false;

    // An item whose first line is empty cannot also start with a blank line.
    if empty_first && pos < tokens.len() && is_blank(&line_at(tokens, pos).text) {
        return Some(ItemScan {
            marker: scan.marker,
            content,
            internally_blank,
            end: consumed,
            marker_range,
        });
    }

    while pos < tokens.len() {
        let line = line_at(tokens, pos);
        if is_blank(&line.text) {
            pending_blanks += 1;
            pos = line.next_start;
            continue;
        }
        if indentation_width(&line.text) < w {
            break;
        }
        if pending_blanks > 0 {
            for _ in 0..pending_blanks {
                content.push('\n');
            }
            pending_blanks = 0;
            internally_blank = true;
        }
        content.push_str(&strip_columns(&line.text, w));
        content.push('\n');
        consumed = line.next_start;
        pos = line.next_start;
    }

    Some(ItemScan {
        marker: scan.marker,
        content,
        internally_blank,
        end: consumed,
        marker_range,
    })
}

pub(crate) fn list(factory: BlockFactory) -> MdParser<Block> {
    Parser::new(move |input: ParserInput<char, HighlightContext>| {
        let tokens = input.tokens();
        let first = match parse_item(tokens, input.index()) {
            Some(item) => item,
            None => return ParseResult::failure("list", input),
        };
        let marker = first.marker.clone();
        let mut loose = first.internally_blank;
        let mut consumed = first.end;
        let mut raw_items = vec![first];

        loop {
            // Blank lines between items are consumed only when a compatible
            // item follows.
            let mut pos = consumed;
            let mut saw_blank = false;
            while pos < tokens.len() {
                let line = line_at(tokens, pos);
                if is_blank(&line.text) {
                    saw_blank = true;
                    pos = line.next_start;
                } else {
                    break;
                }
            }
            if pos >= tokens.len() {
                break;
            }
            let line = line_at(tokens, pos);
            if is_thematic_break_line(&line.text) {
                break;
            }
            let compatible = scan_marker(&line.text)
                .map(|peek| marker.compatible(&peek.marker))
                .unwrap_or(false);
            if !compatible {
                break;
            }
            let item = match parse_item(tokens, pos) {
                Some(item) => item,
                None => break,
            };
            if saw_blank || item.internally_blank {
                loose = true;
            }
            consumed = item.end;
            raw_items.push(item);
        }

        log::debug!(
            "list ({:?}): {} item(s), loose={}",
            marker,
            raw_items.len(),
            loose
        );
        let context = input.context().clone();
        let mut items = Vec::with_capacity(raw_items.len());
        for raw in &raw_items {
            context.emit(
                raw.marker_range.0..raw.marker_range.1,
                HighlightKind::ListMarker,
            );
            items.push(ListItem {
                blocks: parse_block_sequence(&factory, &raw.content, context.clone()),
            });
        }

        let block = match marker {
            ListMarker::Bullet(c) => Block::BulletList {
                tight: !loose,
                marker: c,
                items,
            },
            ListMarker::Ordered { number, delimiter } => Block::OrderedList {
                tight: !loose,
                start: number,
                delimiter,
                items,
            },
        };
        let next = input.at_index(consumed);
        ParseResult::success(block, next)
    })
}

/// A list item line can cut a paragraph when it has real first-line content
/// and, for ordered markers, starts at 1.
pub(crate) fn interrupts_paragraph(line: &str) -> bool {
    match scan_marker(line) {
        Some(scan) => match (&scan.marker, &scan.first_line_content) {
            (_, None) => false,
            (ListMarker::Ordered { number, .. }, Some(_)) => *number == 1,
            (ListMarker::Bullet(_), Some(_)) => true,
        },
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combinator::ParserInput;
    use crate::highlight::HighlightContext;
    use crate::markdown::ast::InlineContent;
    use crate::markdown::blocks::block;
    use std::rc::Rc;

    fn parse_list(text: &str) -> Option<(Block, usize)> {
        let factory: BlockFactory = Rc::new(block);
        let input = ParserInput::from_text(text, HighlightContext::default());
        list(factory)
            .parse(input)
            .into_success()
            .map(|(block, next)| (block, next.index()))
    }

    fn paragraph(text: &str) -> Block {
        Block::Paragraph {
            content: InlineContent::raw(text),
        }
    }

    #[test]
    fn smoke_test_scan_marker_shapes() {
        let scan = scan_marker("- item").expect("bullet");
        assert_eq!(scan.marker, ListMarker::Bullet('-'));
        assert_eq!(scan.content_col, 2);
        assert_eq!(scan.first_line_content.as_deref(), Some("item"));

        let scan = scan_marker("12. item").expect("ordered");
        assert_eq!(
            scan.marker,
            ListMarker::Ordered {
                number: 12,
                delimiter: '.'
            }
        );
        assert_eq!(scan.content_col, 5);

        assert!(scan_marker("-item").is_none());
        assert!(scan_marker("1234567890. ten digits").is_none());
        assert!(scan_marker("    - deep").is_none());
    }

    #[test]
    fn smoke_test_marker_with_five_spaces_keeps_one() {
        let scan = scan_marker("-     code").expect("bullet");
        assert_eq!(scan.content_col, 2);
        assert_eq!(scan.first_line_content.as_deref(), Some("    code"));
    }

    #[test]
    fn smoke_test_empty_item_column() {
        let scan = scan_marker("-").expect("bullet");
        assert_eq!(scan.content_col, 2);
        assert!(scan.first_line_content.is_none());
    }

    #[test]
    fn smoke_test_tight_list() {
        let (block, _) = parse_list("- a\n- b\n").expect("list");
        assert_eq!(
            block,
            Block::BulletList {
                tight: true,
                marker: '-',
                items: vec![
                    ListItem {
                        blocks: vec![paragraph("a")]
                    },
                    ListItem {
                        blocks: vec![paragraph("b")]
                    },
                ],
            }
        );
    }

    #[test]
    fn smoke_test_blank_between_items_makes_loose() {
        let (block, _) = parse_list("- a\n- b\n\n- c\n").expect("list");
        match block {
            Block::BulletList { tight, items, .. } => {
                assert!(!tight);
                assert_eq!(items.len(), 3);
            }
            other => panic!("expected bullet list, got {:?}", other),
        }
    }

    #[test]
    fn smoke_test_continuation_line_joins_item() {
        let (block, _) = parse_list("- a\n  b\n").expect("list");
        match block {
            Block::BulletList { items, .. } => {
                assert_eq!(items[0].blocks, vec![paragraph("a\nb")]);
            }
            other => panic!("expected bullet list, got {:?}", other),
        }
    }

    #[test]
    fn smoke_test_internal_blank_makes_loose() {
        let (block, _) = parse_list("- a\n\n  b\n").expect("list");
        match block {
            Block::BulletList { tight, items, .. } => {
                assert!(!tight);
                assert_eq!(items.len(), 1);
            }
            other => panic!("expected bullet list, got {:?}", other),
        }
    }

    #[test]
    fn smoke_test_incompatible_marker_ends_list() {
        let (block, end) = parse_list("- a\n+ b\n").expect("list");
        match block {
            Block::BulletList { marker, items, .. } => {
                assert_eq!(marker, '-');
                assert_eq!(items.len(), 1);
            }
            other => panic!("expected bullet list, got {:?}", other),
        }
        assert_eq!(end, 4);
    }

    #[test]
    fn smoke_test_ordered_start_and_delimiter() {
        let (block, _) = parse_list("3) x\n4) y\n").expect("list");
        match block {
            Block::OrderedList {
                start,
                delimiter,
                items,
                ..
            } => {
                assert_eq!(start, 3);
                assert_eq!(delimiter, ')');
                assert_eq!(items.len(), 2);
            }
            other => panic!("expected ordered list, got {:?}", other),
        }
    }

    #[test]
    fn smoke_test_indented_code_in_item() {
        let (block, _) = parse_list("- a\n\n      code\n").expect("list");
        match block {
            Block::BulletList { items, .. } => {
                // Blank lines survive collection; the driver prunes them.
                assert_eq!(
                    items[0].blocks,
                    vec![
                        paragraph("a"),
                        Block::BlankLine,
                        Block::IndentedCodeBlock {
                            literal: "code\n".into()
                        }
                    ]
                );
            }
            other => panic!("expected bullet list, got {:?}", other),
        }
    }

    #[test]
    fn smoke_test_trailing_blanks_not_consumed() {
        let (_, end) = parse_list("- a\n\n\nplain\n").expect("list");
        assert_eq!(end, 4);
    }

    #[test]
    fn smoke_test_thematic_break_not_an_item() {
        assert!(parse_list("- - -\n").is_none());
    }

    #[test]
    fn smoke_test_empty_item() {
        let (block, _) = parse_list("-\n- b\n").expect("list");
        match block {
            Block::BulletList { items, .. } => {
                assert!(items[0].blocks.is_empty());
                assert_eq!(items[1].blocks, vec![paragraph("b")]);
            }
            other => panic!("expected bullet list, got {:?}", other),
        }
    }
}

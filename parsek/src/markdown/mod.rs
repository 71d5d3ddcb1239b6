// CommonMark document driver: two-pass orchestration
//
// Pass one applies the block grammar until end of input. Link reference
// definitions are then collected (first definition wins), the staged raw
// text in paragraphs and headings is re-parsed as inlines against the
// reference map, and structural nodes are pruned. The driver is total: any
// non-empty input yields a document, an empty input yields an empty one.

use std::cell::RefCell;
use std::rc::Rc;

pub mod ast;
pub mod blocks;
pub mod inlines;
pub mod link;
pub mod refmap;

pub use ast::{Block, Document, Inline, InlineContent, ListItem};
pub use refmap::{normalize_label, LinkReference, ReferenceMap, ResolveReference};

use crate::highlight::{HighlightContext, HighlightSink};
use blocks::{block, parse_block_sequence, BlockFactory};
use inlines::InlineCtx;

/// Parse a CommonMark document.
pub fn parse(text: &str) -> Document {
    parse_with_context(text, HighlightContext::default())
}

/// Parse a CommonMark document, reporting highlight spans to `sink`.
pub fn parse_with_highlights(text: &str, sink: Rc<RefCell<dyn HighlightSink>>) -> Document {
    parse_with_context(text, HighlightContext::new(sink))
}

fn parse_with_context(text: &str, context: HighlightContext) -> Document {
    log::info!("parse: {} bytes", text.len());
    let prepared = sanitize(text);

    let factory: BlockFactory = Rc::new(block);
    let mut blocks = parse_block_sequence(&factory, &prepared, context.clone());

    let mut references = ReferenceMap::new();
    collect_references(&blocks, &mut references);
    log::debug!("collected {} link reference(s)", references.len());

    let ctx = InlineCtx {
        resolver: Rc::new(references),
        highlight: context,
    };
    resolve_inlines(&mut blocks, &ctx);
    let blocks = prune(blocks);

    log::info!("parse complete: {} top-level block(s)", blocks.len());
    Document { blocks }
}

/// Parse a fragment of inline content against an external resolver.
pub fn parse_inlines<R: ResolveReference + 'static>(text: &str, resolver: R) -> Vec<Inline> {
    let ctx = InlineCtx {
        resolver: Rc::new(resolver),
        highlight: HighlightContext::default(),
    };
    inlines::parse_inline_text(text, &ctx)
}

/// As `parse_inlines`, reporting highlight spans to `sink`. Offsets are
/// relative to `text`.
pub fn parse_inlines_with_highlights<R: ResolveReference + 'static>(
    text: &str,
    resolver: R,
    sink: Rc<RefCell<dyn HighlightSink>>,
) -> Vec<Inline> {
    let ctx = InlineCtx {
        resolver: Rc::new(resolver),
        highlight: HighlightContext::new(sink),
    };
    inlines::parse_inline_text(text, &ctx)
}

/// Concatenate the `Text` leaves of the document; line breaks count as
/// newlines. Paragraph content survives a parse → render → parse round
/// trip up to line-ending normalisation.
pub fn render_plain(document: &Document) -> String {
    let mut out = String::new();
    render_blocks(&document.blocks, &mut out);
    out
}

fn render_blocks(blocks: &[Block], out: &mut String) {
    for block in blocks {
        match block {
            Block::Paragraph { content } | Block::Heading { content, .. } => {
                if !out.is_empty() && !out.ends_with('\n') {
                    out.push('\n');
                }
                match content {
                    InlineContent::Parsed(inlines) => render_inlines(inlines, out),
                    InlineContent::Raw(raw) => out.push_str(raw),
                }
            }
            Block::BlockQuote { blocks } => render_blocks(blocks, out),
            Block::BulletList { items, .. } | Block::OrderedList { items, .. } => {
                for item in items {
                    render_blocks(&item.blocks, out);
                }
            }
            _ => {}
        }
    }
}

fn render_inlines(inlines: &[Inline], out: &mut String) {
    for inline in inlines {
        match inline {
            Inline::Text { literal } => out.push_str(literal),
            Inline::SoftBreak | Inline::HardBreak => out.push('\n'),
            Inline::Emphasis { children }
            | Inline::StrongEmphasis { children }
            | Inline::Link { children, .. } => render_inlines(children, out),
            _ => {}
        }
    }
}

/// Truncate `text` for log output without splitting a char.
pub fn safe_preview(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let mut preview: String = text.chars().take(max_chars).collect();
        preview.push('…');
        preview
    }
}

/// U+0000 is never passed through; it becomes the replacement character.
fn sanitize(text: &str) -> String {
    if text.contains('\0') {
        text.replace('\0', "\u{FFFD}")
    } else {
        text.to_string()
    }
}

fn collect_references(blocks: &[Block], references: &mut ReferenceMap) {
    ast::walk_blocks(blocks, &mut |block| {
        if let Block::LinkReferenceDefinition {
            label,
            destination,
            title,
        } = block
        {
            references.insert(label, destination.clone(), title.clone());
        }
    });
}

fn resolve_inlines(blocks: &mut [Block], ctx: &InlineCtx) {
    for block in blocks {
        match block {
            Block::Paragraph { content } | Block::Heading { content, .. } => {
                if let InlineContent::Raw(raw) = content {
                    let parsed = inlines::parse_inline_text(raw, ctx);
                    *content = InlineContent::Parsed(parsed);
                }
            }
            Block::BlockQuote { blocks } => resolve_inlines(blocks, ctx),
            Block::BulletList { items, .. } | Block::OrderedList { items, .. } => {
                for item in items {
                    resolve_inlines(&mut item.blocks, ctx);
                }
            }
            _ => {}
        }
    }
}

/// Drop the structural nodes: blank lines and reference definitions never
/// appear in the finished document.
fn prune(blocks: Vec<Block>) -> Vec<Block> {
    blocks
        .into_iter()
        .filter_map(|block| match block {
            Block::BlankLine | Block::LinkReferenceDefinition { .. } => None,
            Block::BlockQuote { blocks } => Some(Block::BlockQuote {
                blocks: prune(blocks),
            }),
            Block::BulletList {
                tight,
                marker,
                items,
            } => Some(Block::BulletList {
                tight,
                marker,
                items: prune_items(items),
            }),
            Block::OrderedList {
                tight,
                start,
                delimiter,
                items,
            } => Some(Block::OrderedList {
                tight,
                start,
                delimiter,
                items: prune_items(items),
            }),
            other => Some(other),
        })
        .collect()
}

fn prune_items(items: Vec<ListItem>) -> Vec<ListItem> {
    items
        .into_iter()
        .map(|item| ListItem {
            blocks: prune(item.blocks),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smoke_test_empty_input_is_empty_document() {
        assert_eq!(parse(""), Document::new());
    }

    #[test]
    fn smoke_test_nul_replaced() {
        let doc = parse("a\0b\n");
        match &doc.blocks[0] {
            Block::Paragraph {
                content: InlineContent::Parsed(inlines),
            } => assert_eq!(inlines, &vec![Inline::text("a\u{FFFD}b")]),
            other => panic!("expected paragraph, got {:?}", other),
        }
    }

    #[test]
    fn smoke_test_no_structural_nodes_after_parse() {
        let doc = parse("[a]: /x\n\npara\n\n- item\n\n  more\n");
        let mut count = 0;
        doc.walk(&mut |block| {
            if matches!(
                block,
                Block::BlankLine | Block::LinkReferenceDefinition { .. }
            ) {
                count += 1;
            }
        });
        assert_eq!(count, 0);
    }

    #[test]
    fn smoke_test_safe_preview() {
        assert_eq!(safe_preview("short", 10), "short");
        assert_eq!(safe_preview("abcdef", 3), "abc…");
    }
}

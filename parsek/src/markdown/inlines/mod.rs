// Inline tokenizer pipeline
//
// Raw text staged by the block pass is tokenised one element at a time, in
// a fixed priority order; delimiter runs and a text fallback close the
// loop. The finished stream then goes through the emphasis walk and text
// runs are merged.

use std::rc::Rc;

use crate::combinator::ParserInput;
use crate::highlight::HighlightContext;
use crate::markdown::ast::Inline;
use crate::markdown::blocks::MdParser;
use crate::markdown::refmap::ResolveReference;

pub mod cm_autolink;
pub mod cm_backslash_escape;
pub mod cm_code_span;
pub mod cm_emphasis;
pub mod cm_entity;
pub mod cm_line_breaks;
pub mod cm_link;
pub mod cm_raw_html;
pub mod cm_text;

/// One element of the flat stream the tokenizer produces: finished inline
/// content, or a delimiter run awaiting the emphasis walk.
#[derive(Debug, Clone)]
pub(crate) enum InlineToken {
    Node(Inline),
    Delim {
        ch: char,
        count: usize,
        can_open: bool,
        can_close: bool,
    },
}

/// Ambient state of one inline pass: the reference resolver and the
/// highlight context.
#[derive(Clone)]
pub(crate) struct InlineCtx {
    pub resolver: Rc<dyn ResolveReference>,
    pub highlight: HighlightContext,
}

/// Parse `text` into the final inline sequence.
pub(crate) fn parse_inline_text(text: &str, ctx: &InlineCtx) -> Vec<Inline> {
    let stream = tokenize(text, ctx);
    merge_adjacent_text(cm_emphasis::process_delimiters(stream))
}

/// One token per step: each parser is tried in order at the current
/// position, then delimiter runs, then the text fallback (which always
/// makes progress).
pub(crate) fn tokenize(text: &str, ctx: &InlineCtx) -> Vec<InlineToken> {
    let parsers: Vec<MdParser<Inline>> = vec![
        cm_backslash_escape::backslash_escape(),
        cm_entity::html_entity(),
        cm_code_span::code_span(),
        cm_autolink::autolink(),
        cm_raw_html::raw_html(),
        cm_line_breaks::line_break(),
        cm_link::image(ctx.clone()),
        cm_link::link(ctx.clone()),
    ];

    let mut input = ParserInput::from_text(text, ctx.highlight.clone());
    let mut stream = Vec::new();
    'next_token: while !input.at_end() {
        for parser in &parsers {
            if let Some((inline, next)) = parser.parse(input.clone()).into_success() {
                if next.index() > input.index() {
                    stream.push(InlineToken::Node(inline));
                    input = next;
                    continue 'next_token;
                }
            }
        }
        if let Some((token, next)) = cm_emphasis::scan_delimiter_run(&input) {
            stream.push(token);
            input = next;
            continue;
        }
        let (inline, next) = cm_text::text_fallback(&input);
        stream.push(InlineToken::Node(inline));
        input = next;
    }
    stream
}

/// Merge neighbouring `Text` nodes, recursively; the emphasis walk and the
/// single-char fallback both leave fragments behind.
pub(crate) fn merge_adjacent_text(inlines: Vec<Inline>) -> Vec<Inline> {
    let mut merged: Vec<Inline> = Vec::with_capacity(inlines.len());
    for inline in inlines {
        let inline = match inline {
            Inline::Emphasis { children } => Inline::Emphasis {
                children: merge_adjacent_text(children),
            },
            Inline::StrongEmphasis { children } => Inline::StrongEmphasis {
                children: merge_adjacent_text(children),
            },
            Inline::Link {
                destination,
                title,
                children,
            } => Inline::Link {
                destination,
                title,
                children: merge_adjacent_text(children),
            },
            other => other,
        };
        match (merged.last_mut(), inline) {
            (
                Some(Inline::Text { literal: previous }),
                Inline::Text { literal },
            ) => previous.push_str(&literal),
            (_, inline) => merged.push(inline),
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown::refmap::ReferenceMap;

    fn plain_ctx() -> InlineCtx {
        InlineCtx {
            resolver: Rc::new(ReferenceMap::new()),
            highlight: HighlightContext::default(),
        }
    }

    fn parse(text: &str) -> Vec<Inline> {
        parse_inline_text(text, &plain_ctx())
    }

    #[test]
    fn smoke_test_plain_text_single_node() {
        assert_eq!(parse("just words"), vec![Inline::text("just words")]);
    }

    #[test]
    fn smoke_test_emphasis_pipeline() {
        assert_eq!(
            parse("*foo*"),
            vec![Inline::Emphasis {
                children: vec![Inline::text("foo")]
            }]
        );
    }

    #[test]
    fn smoke_test_code_span_beats_emphasis() {
        assert_eq!(
            parse("`*not em*`"),
            vec![Inline::CodeSpan {
                literal: "*not em*".into()
            }]
        );
    }

    #[test]
    fn smoke_test_escaped_star_is_literal() {
        assert_eq!(parse("\\*foo\\*"), vec![Inline::text("*foo*")]);
    }

    #[test]
    fn smoke_test_soft_and_hard_breaks() {
        assert_eq!(
            parse("a\nb"),
            vec![Inline::text("a"), Inline::SoftBreak, Inline::text("b")]
        );
        assert_eq!(
            parse("a  \nb"),
            vec![Inline::text("a"), Inline::HardBreak, Inline::text("b")]
        );
    }

    #[test]
    fn smoke_test_unmatched_bracket_is_text() {
        assert_eq!(parse("[not a link"), vec![Inline::text("[not a link")]);
    }

    #[test]
    fn smoke_test_mixed_stream() {
        assert_eq!(
            parse("a `b` &amp; <https://x.co> d"),
            vec![
                Inline::text("a "),
                Inline::CodeSpan { literal: "b".into() },
                Inline::text(" "),
                Inline::HtmlEntity {
                    literal: "&amp;".into()
                },
                Inline::text(" "),
                Inline::Autolink {
                    url: "https://x.co".into()
                },
                Inline::text(" d"),
            ]
        );
    }
}

// CommonMark links and images
//
// After the bracketed text, four suffix forms are tried: inline
// `(dest title?)`, full reference `[label]`, collapsed `[]`, and the bare
// shortcut. Reference forms resolve against the installed resolver; a miss
// fails the whole construct so the bracket falls back to literal text.
// Link text re-enters the full inline pipeline; image alt text stays raw.

use std::ops::Range;

use crate::combinator::{ParseResult, Parser};
use crate::highlight::{HighlightContext, HighlightKind};
use crate::markdown::ast::Inline;
use crate::markdown::blocks::MdParser;
use crate::markdown::inlines::{parse_inline_text, InlineCtx};
use crate::markdown::link::{
    scan_bracketed_text, scan_destination, scan_ref_label, scan_title, skip_ws_max_one_newline,
};
use crate::markdown::refmap::normalize_label;

pub(crate) fn link(ctx: InlineCtx) -> MdParser<Inline> {
    Parser::new(move |input| {
        if input.current() != Some(&'[') {
            return ParseResult::failure("link", input);
        }
        match scan_link_at(input.tokens(), input.index(), &ctx, false) {
            Some((inline, end, spans)) => {
                emit_all(input.context(), spans);
                let next = input.at_index(end);
                ParseResult::success(inline, next)
            }
            None => ParseResult::failure("link", input),
        }
    })
}

pub(crate) fn image(ctx: InlineCtx) -> MdParser<Inline> {
    Parser::new(move |input| {
        if input.current() != Some(&'!') || input.peek(1) != Some(&'[') {
            return ParseResult::failure("image", input);
        }
        match scan_link_at(input.tokens(), input.index() + 1, &ctx, true) {
            Some((inline, end, mut spans)) => {
                spans.push((input.index()..input.index() + 2, HighlightKind::ImageMarker));
                emit_all(input.context(), spans);
                let next = input.at_index(end);
                ParseResult::success(inline, next)
            }
            None => ParseResult::failure("image", input),
        }
    })
}

type PendingSpans = Vec<(Range<usize>, HighlightKind)>;

fn emit_all(context: &HighlightContext, spans: PendingSpans) {
    for (range, kind) in spans {
        context.emit(range, kind);
    }
}

/// Scan a link (or the bracketed part of an image) whose `[` sits at
/// `start`. Returns the inline node, the index past the construct, and the
/// highlight spans to emit on success.
fn scan_link_at(
    tokens: &[char],
    start: usize,
    ctx: &InlineCtx,
    as_image: bool,
) -> Option<(Inline, usize, PendingSpans)> {
    let (text, after_text) = scan_bracketed_text(tokens, start)?;
    let mut spans: PendingSpans = vec![
        (start..start + 1, HighlightKind::LinkBracket),
        (after_text - 1..after_text, HighlightKind::LinkBracket),
    ];

    // Inline form
    if tokens.get(after_text) == Some(&'(') {
        if let Some((destination, title, end, inline_spans)) =
            scan_inline_suffix(tokens, after_text)
        {
            spans.extend(inline_spans);
            return Some((
                build(ctx, as_image, &text, destination, title),
                end,
                spans,
            ));
        }
    }

    // Full and collapsed references
    if tokens.get(after_text) == Some(&'[') {
        if tokens.get(after_text + 1) == Some(&']') {
            let reference = ctx.resolver.resolve(&normalize_label(&text))?;
            return Some((
                build(ctx, as_image, &text, reference.destination, reference.title),
                after_text + 2,
                spans,
            ));
        }
        if let Some((label, after_label)) = scan_ref_label(tokens, after_text) {
            let reference = ctx.resolver.resolve(&normalize_label(&label))?;
            return Some((
                build(ctx, as_image, &text, reference.destination, reference.title),
                after_label,
                spans,
            ));
        }
    }

    // Shortcut reference
    let reference = ctx.resolver.resolve(&normalize_label(&text))?;
    Some((
        build(ctx, as_image, &text, reference.destination, reference.title),
        after_text,
        spans,
    ))
}

/// `(` ws? dest? (ws title)? ws? `)` with at most one line ending inside
/// each whitespace run.
fn scan_inline_suffix(
    tokens: &[char],
    open_paren: usize,
) -> Option<(String, Option<String>, usize, PendingSpans)> {
    let mut spans: PendingSpans =
        vec![(open_paren..open_paren + 1, HighlightKind::LinkParen)];
    let mut i = skip_ws_max_one_newline(tokens, open_paren + 1)?;

    let (destination, after_dest) = match scan_destination(tokens, i) {
        Some((destination, after)) => {
            spans.push((i..after, HighlightKind::LinkDestination));
            (destination, after)
        }
        None => (String::new(), i),
    };
    i = after_dest;

    let mut title = None;
    let after_ws = skip_ws_max_one_newline(tokens, i)?;
    if after_ws > i {
        if let Some((found, after_title)) = scan_title(tokens, after_ws) {
            spans.push((after_ws..after_title, HighlightKind::LinkTitle));
            title = Some(found);
            i = skip_ws_max_one_newline(tokens, after_title)?;
        } else {
            i = after_ws;
        }
    } else {
        i = after_ws;
    }

    if tokens.get(i) != Some(&')') {
        return None;
    }
    spans.push((i..i + 1, HighlightKind::LinkParen));
    Some((destination, title, i + 1, spans))
}

fn build(
    ctx: &InlineCtx,
    as_image: bool,
    text: &str,
    destination: String,
    title: Option<String>,
) -> Inline {
    if as_image {
        Inline::Image {
            destination,
            title,
            alt: text.to_string(),
        }
    } else {
        Inline::Link {
            destination,
            title,
            children: parse_inline_text(text, ctx),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combinator::ParserInput;
    use crate::markdown::refmap::ReferenceMap;
    use std::rc::Rc;

    fn ctx_with(map: ReferenceMap) -> InlineCtx {
        InlineCtx {
            resolver: Rc::new(map),
            highlight: HighlightContext::default(),
        }
    }

    fn parse_link(text: &str, ctx: &InlineCtx) -> Option<(Inline, usize)> {
        let input = ParserInput::from_text(text, HighlightContext::default());
        link(ctx.clone())
            .parse(input)
            .into_success()
            .map(|(inline, next)| (inline, next.index()))
    }

    #[test]
    fn smoke_test_inline_link() {
        let ctx = ctx_with(ReferenceMap::new());
        let (inline, end) = parse_link("[text](/url \"title\") rest", &ctx).expect("link");
        assert_eq!(
            inline,
            Inline::Link {
                destination: "/url".into(),
                title: Some("title".into()),
                children: vec![Inline::text("text")],
            }
        );
        assert_eq!(end, 20);
    }

    #[test]
    fn smoke_test_inline_link_empty_destination() {
        let ctx = ctx_with(ReferenceMap::new());
        let (inline, _) = parse_link("[a]()", &ctx).expect("link");
        assert_eq!(
            inline,
            Inline::Link {
                destination: String::new(),
                title: None,
                children: vec![Inline::text("a")],
            }
        );
    }

    #[test]
    fn smoke_test_full_reference() {
        let mut map = ReferenceMap::new();
        map.insert("label", "/url".into(), None);
        let ctx = ctx_with(map);
        let (inline, end) = parse_link("[text][label]", &ctx).expect("link");
        assert_eq!(
            inline,
            Inline::Link {
                destination: "/url".into(),
                title: None,
                children: vec![Inline::text("text")],
            }
        );
        assert_eq!(end, 13);
    }

    #[test]
    fn smoke_test_collapsed_and_shortcut() {
        let mut map = ReferenceMap::new();
        map.insert("Foo", "/url".into(), Some("t".into()));
        let ctx = ctx_with(map);

        let (collapsed, _) = parse_link("[foo][]", &ctx).expect("collapsed");
        let (shortcut, end) = parse_link("[foo] after", &ctx).expect("shortcut");
        assert_eq!(collapsed, shortcut);
        assert_eq!(end, 5);
    }

    #[test]
    fn smoke_test_unresolved_reference_fails() {
        let ctx = ctx_with(ReferenceMap::new());
        assert!(parse_link("[missing][nope]", &ctx).is_none());
        assert!(parse_link("[missing]", &ctx).is_none());
    }

    #[test]
    fn smoke_test_nested_emphasis_in_link_text() {
        let ctx = ctx_with(ReferenceMap::new());
        let (inline, _) = parse_link("[*em*](/u)", &ctx).expect("link");
        assert_eq!(
            inline,
            Inline::Link {
                destination: "/u".into(),
                title: None,
                children: vec![Inline::Emphasis {
                    children: vec![Inline::text("em")]
                }],
            }
        );
    }

    #[test]
    fn smoke_test_image_alt_stays_raw() {
        let ctx = ctx_with(ReferenceMap::new());
        let input = ParserInput::from_text("![*alt*](/img)", HighlightContext::default());
        let (inline, _) = image(ctx).parse(input).into_success().expect("image");
        assert_eq!(
            inline,
            Inline::Image {
                destination: "/img".into(),
                title: None,
                alt: "*alt*".into(),
            }
        );
    }

    #[test]
    fn smoke_test_malformed_inline_falls_back_to_shortcut() {
        let mut map = ReferenceMap::new();
        map.insert("a", "/x".into(), None);
        let ctx = ctx_with(map);
        let (inline, end) = parse_link("[a](oops", &ctx).expect("shortcut");
        assert_eq!(
            inline,
            Inline::Link {
                destination: "/x".into(),
                title: None,
                children: vec![Inline::text("a")],
            }
        );
        assert_eq!(end, 3);
    }
}

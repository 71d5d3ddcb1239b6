// Highlight sink: token kinds emitted as tagged parsers succeed
//
// The sink rides in the user-context slot of the input view, so the engine
// threads it through every combinator without interpreting it. A wrapper
// built with `tag` contributes no parsing logic: it runs the inner parser
// and, only on success, reports the consumed range. Inner wrappers finish
// before outer ones, so spans arrive innermost-first.

use std::cell::RefCell;
use std::ops::Range;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::combinator::{ParseResult, Parser, ParserInput};

/// One kind per syntactic construct the parser can attribute a range to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HighlightKind {
    HeadingMarker,
    HeadingText,
    CodeFence,
    CodeInfo,
    CodeContent,
    EmphasisMarker,
    StrongMarker,
    LinkBracket,
    LinkParen,
    ImageMarker,
    LinkDestination,
    LinkTitle,
    BlockquoteMarker,
    ListMarker,
    EscapeSequence,
    EntityRef,
    CodeSpanDelimiter,
    CodeSpanContent,
    HardBreak,
    SoftBreak,
    AutolinkUrl,
    RawHtml,
    PlainText,
    HtmlBlock,
}

pub trait HighlightSink {
    fn emit(&mut self, range: Range<usize>, kind: HighlightKind);
}

/// Sink that records every span in order of arrival.
#[derive(Default)]
pub struct SpanCollector {
    pub spans: Vec<(Range<usize>, HighlightKind)>,
}

impl HighlightSink for SpanCollector {
    fn emit(&mut self, range: Range<usize>, kind: HighlightKind) {
        self.spans.push((range, kind));
    }
}

/// User-context value carried through every markdown parser. `Default` is
/// the disabled state, which costs nothing at parse time.
#[derive(Clone, Default)]
pub struct HighlightContext {
    sink: Option<Rc<RefCell<dyn HighlightSink>>>,
}

impl HighlightContext {
    pub fn new(sink: Rc<RefCell<dyn HighlightSink>>) -> Self {
        Self { sink: Some(sink) }
    }

    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        self.sink.is_some()
    }

    pub fn emit(&self, range: Range<usize>, kind: HighlightKind) {
        if let Some(sink) = &self.sink {
            sink.borrow_mut().emit(range, kind);
        }
    }
}

/// Wrap `parser` so its consumed range is reported as `kind` on success.
pub fn tag<V: 'static>(
    kind: HighlightKind,
    parser: &Parser<char, HighlightContext, V>,
) -> Parser<char, HighlightContext, V> {
    let inner = parser.clone();
    Parser::new(move |input: ParserInput<char, HighlightContext>| {
        let start = input.index();
        let context = input.context().clone();
        match inner.parse(input) {
            ParseResult::Success { value, next } => {
                context.emit(start..next.index(), kind);
                ParseResult::Success { value, next }
            }
            failure @ ParseResult::Failure { .. } => failure,
        }
    })
}

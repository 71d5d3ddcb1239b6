// Parsek - parser combinator toolkit with a CommonMark 0.31.2 parser built on top

// Core modules: combinator engine → markdown grammar → highlight surface
pub mod combinator;
pub mod highlight;
pub mod markdown;

// Re-export main API
pub use combinator::{ParseResult, Parser, ParserInput};
pub use highlight::{tag, HighlightContext, HighlightKind, HighlightSink, SpanCollector};
pub use markdown::{
    parse, parse_inlines, parse_inlines_with_highlights, parse_with_highlights, render_plain,
};

// Re-export commonly used types
pub use markdown::{Block, Document, Inline, InlineContent, ListItem};
pub use markdown::{normalize_label, LinkReference, ReferenceMap, ResolveReference};
pub use markdown::safe_preview;

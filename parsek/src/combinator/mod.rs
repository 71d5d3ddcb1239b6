// Combinator engine: immutable input view, two-variant result sum, parser algebra
//
// Everything in here is generic over the token type `T` and an opaque
// user-context `U` that is threaded through unchanged. The CommonMark layer
// instantiates `T = char` and uses `U` for the highlight sink.

pub mod input;
pub mod parser;
pub mod result;
pub mod text;

pub use input::ParserInput;
pub use parser::{
    any_token, between, choice, eof, not, satisfy, sep_by, sep_by1, sequence, Parser,
};
pub use result::ParseResult;

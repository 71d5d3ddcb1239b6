// Two-variant parse result sum
//
// A failure records the index at which matching stopped; it never implies
// consumption, so callers are free to retry alternatives from the failed
// view's position.

use crate::combinator::input::ParserInput;

pub enum ParseResult<T, U, V> {
    Success {
        value: V,
        /// The view past everything the parser consumed. Carries both the
        /// next index and the shared token storage.
        next: ParserInput<T, U>,
    },
    Failure {
        message: String,
        index: usize,
        input: ParserInput<T, U>,
    },
}

impl<T, U, V> ParseResult<T, U, V> {
    pub fn success(value: V, next: ParserInput<T, U>) -> Self {
        ParseResult::Success { value, next }
    }

    /// Failure located at the view's current index.
    pub fn failure(message: impl Into<String>, input: ParserInput<T, U>) -> Self {
        let index = input.index();
        ParseResult::Failure {
            message: message.into(),
            index,
            input,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ParseResult::Success { .. })
    }

    pub fn into_success(self) -> Option<(V, ParserInput<T, U>)> {
        match self {
            ParseResult::Success { value, next } => Some((value, next)),
            ParseResult::Failure { .. } => None,
        }
    }

    pub fn failure_message(&self) -> Option<&str> {
        match self {
            ParseResult::Failure { message, .. } => Some(message),
            ParseResult::Success { .. } => None,
        }
    }

    pub fn failure_index(&self) -> Option<usize> {
        match self {
            ParseResult::Failure { index, .. } => Some(*index),
            ParseResult::Success { .. } => None,
        }
    }

    pub fn map_value<W>(self, f: impl FnOnce(V) -> W) -> ParseResult<T, U, W> {
        match self {
            ParseResult::Success { value, next } => ParseResult::Success {
                value: f(value),
                next,
            },
            ParseResult::Failure {
                message,
                index,
                input,
            } => ParseResult::Failure {
                message,
                index,
                input,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smoke_test_failure_records_index() {
        let input = ParserInput::from_text("abc", ()).advance();
        let result: ParseResult<char, (), ()> = ParseResult::failure("boom", input);
        assert_eq!(result.failure_index(), Some(1));
        assert_eq!(result.failure_message(), Some("boom"));
    }

    #[test]
    fn smoke_test_map_value() {
        let input = ParserInput::from_text("a", ());
        let result = ParseResult::success(1u32, input).map_value(|n| n + 1);
        assert!(matches!(result, ParseResult::Success { value: 2, .. }));
    }
}

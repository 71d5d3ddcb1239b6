// Immutable position-aware input view
//
// A view is the triple (tokens, index, user-context). Advancing never copies
// the token storage: views share it through an `Rc` and only the index moves.
// The user-context is opaque to the engine; combinators clone it along with
// the view and never look inside.

use std::rc::Rc;

pub struct ParserInput<T, U> {
    tokens: Rc<[T]>,
    index: usize,
    context: U,
}

impl<T, U: Clone> Clone for ParserInput<T, U> {
    fn clone(&self) -> Self {
        Self {
            tokens: Rc::clone(&self.tokens),
            index: self.index,
            context: self.context.clone(),
        }
    }
}

impl<T, U> ParserInput<T, U> {
    pub fn new(tokens: impl Into<Rc<[T]>>, context: U) -> Self {
        Self {
            tokens: tokens.into(),
            index: 0,
            context,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// True iff the cursor sits past the last token.
    pub fn at_end(&self) -> bool {
        self.index == self.tokens.len()
    }

    pub fn tokens(&self) -> &[T] {
        &self.tokens
    }

    /// The token under the cursor, if any.
    pub fn current(&self) -> Option<&T> {
        self.tokens.get(self.index)
    }

    /// The token `offset` positions ahead of the cursor.
    pub fn peek(&self, offset: usize) -> Option<&T> {
        self.tokens.get(self.index + offset)
    }

    /// Unconsumed suffix of the token sequence.
    pub fn remaining(&self) -> &[T] {
        &self.tokens[self.index..]
    }

    pub fn context(&self) -> &U {
        &self.context
    }
}

impl<T, U: Clone> ParserInput<T, U> {
    /// A new view one token further in, sharing storage and context.
    pub fn advance(&self) -> Self {
        self.advance_by(1)
    }

    /// A new view `n` tokens further in, clamped to the end of input.
    pub fn advance_by(&self, n: usize) -> Self {
        self.at_index(self.index + n)
    }

    /// A new view positioned at `index`, clamped to the end of input.
    pub fn at_index(&self, index: usize) -> Self {
        Self {
            tokens: Rc::clone(&self.tokens),
            index: index.min(self.tokens.len()),
            context: self.context.clone(),
        }
    }
}

impl<U> ParserInput<char, U> {
    /// Build a char-token view over `text`.
    pub fn from_text(text: &str, context: U) -> Self {
        Self::new(text.chars().collect::<Vec<char>>(), context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smoke_test_advance_shares_tokens() {
        let input = ParserInput::from_text("abc", ());
        let next = input.advance();
        assert_eq!(input.index(), 0);
        assert_eq!(next.index(), 1);
        assert_eq!(next.current(), Some(&'b'));
        assert_eq!(input.tokens().len(), next.tokens().len());
    }

    #[test]
    fn smoke_test_at_end() {
        let input = ParserInput::from_text("x", ());
        assert!(!input.at_end());
        assert!(input.advance().at_end());
        assert!(input.advance_by(10).at_end());
    }

    #[test]
    fn smoke_test_empty_input() {
        let input: ParserInput<char, ()> = ParserInput::from_text("", ());
        assert!(input.at_end());
        assert_eq!(input.current(), None);
    }
}

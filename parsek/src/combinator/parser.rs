// Parser algebra
//
// A parser is a pure function from an input view to a parse result, held
// behind a cloneable `Rc` so grammars can reuse sub-parsers freely. The
// failure-propagation policy lives entirely in this file: `or` keeps the
// failure that reached further (ties go to the second branch), `label`
// rewrites only the message, and `many` never fails.

use std::fmt;
use std::rc::Rc;

use crate::combinator::input::ParserInput;
use crate::combinator::result::ParseResult;

pub struct Parser<T, U, V> {
    run: Rc<dyn Fn(ParserInput<T, U>) -> ParseResult<T, U, V>>,
}

impl<T, U, V> Clone for Parser<T, U, V> {
    fn clone(&self) -> Self {
        Self {
            run: Rc::clone(&self.run),
        }
    }
}

impl<T: 'static, U: Clone + 'static, V: 'static> Parser<T, U, V> {
    pub fn new(run: impl Fn(ParserInput<T, U>) -> ParseResult<T, U, V> + 'static) -> Self {
        Self { run: Rc::new(run) }
    }

    pub fn parse(&self, input: ParserInput<T, U>) -> ParseResult<T, U, V> {
        (self.run)(input)
    }

    /// Succeeds with `value` without consuming anything.
    pub fn pure(value: V) -> Self
    where
        V: Clone,
    {
        Parser::new(move |input| ParseResult::success(value.clone(), input))
    }

    /// Always fails with `message` at the current index.
    pub fn fail_with(message: &str) -> Self {
        let message = message.to_string();
        Parser::new(move |input| ParseResult::failure(message.clone(), input))
    }

    /// Transform the success value; the consumed extent is untouched.
    pub fn map<W: 'static>(&self, f: impl Fn(V) -> W + 'static) -> Parser<T, U, W> {
        let inner = self.clone();
        Parser::new(move |input| inner.parse(input).map_value(&f))
    }

    /// Monadic sequencing: on success, `f(value)` picks the parser that
    /// continues from the consumed position.
    pub fn bind<W: 'static>(
        &self,
        f: impl Fn(V) -> Parser<T, U, W> + 'static,
    ) -> Parser<T, U, W> {
        let inner = self.clone();
        Parser::new(move |input| match inner.parse(input) {
            ParseResult::Success { value, next } => f(value).parse(next),
            ParseResult::Failure {
                message,
                index,
                input,
            } => ParseResult::Failure {
                message,
                index,
                input,
            },
        })
    }

    /// Run `self` then `other`, pairing the values.
    pub fn and<W: 'static>(&self, other: &Parser<T, U, W>) -> Parser<T, U, (V, W)> {
        let a = self.clone();
        let b = other.clone();
        Parser::new(move |input| match a.parse(input) {
            ParseResult::Success { value: va, next } => match b.parse(next) {
                ParseResult::Success { value: vb, next } => {
                    ParseResult::success((va, vb), next)
                }
                ParseResult::Failure {
                    message,
                    index,
                    input,
                } => ParseResult::Failure {
                    message,
                    index,
                    input,
                },
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
        })
    }

    /// Sequence keeping only the second value.
    pub fn then<W: 'static>(&self, other: &Parser<T, U, W>) -> Parser<T, U, W> {
        self.and(other).map(|(_, w)| w)
    }

    /// Sequence keeping only the first value.
    pub fn skip<W: 'static>(&self, other: &Parser<T, U, W>) -> Parser<T, U, V> {
        self.and(other).map(|(v, _)| v)
    }

    /// Ordered choice. `other` runs from the original position only when
    /// `self` failed. When both fail, the failure that reached the larger
    /// index wins; on a tie the second branch's failure is returned (kept
    /// deliberately, observable only through the message).
    pub fn or(&self, other: &Self) -> Self {
        let a = self.clone();
        let b = other.clone();
        Parser::new(move |input| match a.parse(input.clone()) {
            success @ ParseResult::Success { .. } => success,
            ParseResult::Failure {
                message: a_message,
                index: a_index,
                ..
            } => match b.parse(input) {
                success @ ParseResult::Success { .. } => success,
                ParseResult::Failure {
                    message: b_message,
                    index: b_index,
                    input,
                } => {
                    if a_index > b_index {
                        ParseResult::Failure {
                            message: a_message,
                            index: a_index,
                            input,
                        }
                    } else {
                        ParseResult::Failure {
                            message: b_message,
                            index: b_index,
                            input,
                        }
                    }
                }
            },
        })
    }

    /// Never fails; a failed attempt yields `None` without consuming.
    pub fn optional(&self) -> Parser<T, U, Option<V>> {
        let inner = self.clone();
        Parser::new(move |input| match inner.parse(input.clone()) {
            ParseResult::Success { value, next } => ParseResult::success(Some(value), next),
            ParseResult::Failure { .. } => ParseResult::success(None, input),
        })
    }

    /// Zero-or-more. Total: stops at the first failure without consuming the
    /// failed extent. A success that consumed nothing also stops collection,
    /// so zero-width parsers cannot loop.
    pub fn many(&self) -> Parser<T, U, Vec<V>> {
        let inner = self.clone();
        Parser::new(move |input| {
            let mut values = Vec::new();
            let mut current = input;
            loop {
                let before = current.index();
                match inner.parse(current.clone()) {
                    ParseResult::Success { value, next } => {
                        values.push(value);
                        let progressed = next.index() > before;
                        current = next;
                        if !progressed {
                            break;
                        }
                    }
                    ParseResult::Failure { .. } => break,
                }
            }
            ParseResult::success(values, current)
        })
    }

    /// One-or-more; fails iff the first attempt fails.
    pub fn many1(&self) -> Parser<T, U, Vec<V>> {
        let first = self.clone();
        let rest = self.many();
        first.and(&rest).map(|(head, mut tail)| {
            let mut values = Vec::with_capacity(tail.len() + 1);
            values.push(head);
            values.append(&mut tail);
            values
        })
    }

    /// Exactly `n` applications in sequence.
    pub fn repeat(&self, n: usize) -> Parser<T, U, Vec<V>> {
        let inner = self.clone();
        Parser::new(move |input| {
            let mut values = Vec::with_capacity(n);
            let mut current = input;
            for _ in 0..n {
                match inner.parse(current) {
                    ParseResult::Success { value, next } => {
                        values.push(value);
                        current = next;
                    }
                    ParseResult::Failure {
                        message,
                        index,
                        input,
                    } => {
                        return ParseResult::Failure {
                            message,
                            index,
                            input,
                        }
                    }
                }
            }
            ParseResult::success(values, current)
        })
    }

    /// Run without consuming: the value is produced but the returned view
    /// stays at the original index. Failure propagates unchanged.
    pub fn look_ahead(&self) -> Self {
        let inner = self.clone();
        Parser::new(move |input| match inner.parse(input.clone()) {
            ParseResult::Success { value, .. } => ParseResult::success(value, input),
            failure @ ParseResult::Failure { .. } => failure,
        })
    }

    /// Replace the failure message, keeping the failure index. Applies only
    /// to the wrapped parser; compose validation stages after `label` (via
    /// `bind`) so domain messages survive.
    pub fn label(&self, message: &str) -> Self {
        let inner = self.clone();
        let message = message.to_string();
        Parser::new(move |input| match inner.parse(input) {
            success @ ParseResult::Success { .. } => success,
            ParseResult::Failure { index, input, .. } => ParseResult::Failure {
                message: message.clone(),
                index,
                input,
            },
        })
    }
}

/// Consume one token iff the predicate holds.
pub fn satisfy<T, U>(pred: impl Fn(&T) -> bool + 'static) -> Parser<T, U, T>
where
    T: Clone + fmt::Debug + 'static,
    U: Clone + 'static,
{
    Parser::new(move |input| match input.current().cloned() {
        None => ParseResult::failure("Unexpected end of input", input),
        Some(token) if pred(&token) => {
            let next = input.advance();
            ParseResult::success(token, next)
        }
        Some(token) => {
            let message = format!("Unexpected {:?} at index {}", token, input.index());
            ParseResult::failure(message, input)
        }
    })
}

/// Consume any single token; fails only at end of input.
pub fn any_token<T: Clone + 'static, U: Clone + 'static>() -> Parser<T, U, T> {
    Parser::new(move |input| match input.current().cloned() {
        None => ParseResult::failure("Unexpected end of input", input),
        Some(token) => {
            let next = input.advance();
            ParseResult::success(token, next)
        }
    })
}

/// Succeeds with `()` exactly at end of input.
pub fn eof<T: 'static, U: Clone + 'static>() -> Parser<T, U, ()> {
    Parser::new(|input| {
        if input.at_end() {
            ParseResult::success((), input)
        } else {
            ParseResult::failure("Expected end of input", input)
        }
    })
}

/// Negative lookahead: succeeds with `()` iff `parser` fails; never consumes.
pub fn not<T: 'static, U: Clone + 'static, V: 'static>(
    parser: &Parser<T, U, V>,
) -> Parser<T, U, ()> {
    let inner = parser.clone();
    Parser::new(move |input| match inner.parse(input.clone()) {
        ParseResult::Success { .. } => ParseResult::failure("Negated parser matched", input),
        ParseResult::Failure { .. } => ParseResult::success((), input),
    })
}

/// Run every parser in order, collecting the values.
pub fn sequence<T: 'static, U: Clone + 'static, V: 'static>(
    parsers: Vec<Parser<T, U, V>>,
) -> Parser<T, U, Vec<V>> {
    Parser::new(move |input| {
        let mut values = Vec::with_capacity(parsers.len());
        let mut current = input;
        for parser in &parsers {
            match parser.parse(current) {
                ParseResult::Success { value, next } => {
                    values.push(value);
                    current = next;
                }
                ParseResult::Failure {
                    message,
                    index,
                    input,
                } => {
                    return ParseResult::Failure {
                        message,
                        index,
                        input,
                    }
                }
            }
        }
        ParseResult::success(values, current)
    })
}

/// Folded ordered choice over a list; an empty list fails outright. The
/// furthest-index rule matches folded `or`s: later branches win ties.
pub fn choice<T: 'static, U: Clone + 'static, V: 'static>(
    parsers: Vec<Parser<T, U, V>>,
) -> Parser<T, U, V> {
    Parser::new(move |input| {
        let mut best: Option<(String, usize)> = None;
        for parser in &parsers {
            match parser.parse(input.clone()) {
                success @ ParseResult::Success { .. } => return success,
                ParseResult::Failure { message, index, .. } => {
                    let further = match &best {
                        None => true,
                        Some((_, best_index)) => index >= *best_index,
                    };
                    if further {
                        best = Some((message, index));
                    }
                }
            }
        }
        match best {
            Some((message, index)) => ParseResult::Failure {
                message,
                index,
                input,
            },
            None => ParseResult::failure("No alternatives", input),
        }
    })
}

/// `open`, then `inner`, then `close`; yields `inner`'s value.
pub fn between<T: 'static, U: Clone + 'static, A: 'static, B: 'static, V: 'static>(
    open: &Parser<T, U, A>,
    close: &Parser<T, U, B>,
    inner: &Parser<T, U, V>,
) -> Parser<T, U, V> {
    open.then(inner).skip(close)
}

/// `item (sep item)*`. A separator not followed by an item is left
/// unconsumed: each trailing step is tried as one `sep`+`item` unit.
pub fn sep_by1<T: 'static, U: Clone + 'static, V: 'static, S: 'static>(
    item: &Parser<T, U, V>,
    sep: &Parser<T, U, S>,
) -> Parser<T, U, Vec<V>> {
    let rest = sep.then(item).many();
    item.and(&rest).map(|(head, mut tail)| {
        let mut values = Vec::with_capacity(tail.len() + 1);
        values.push(head);
        values.append(&mut tail);
        values
    })
}

/// `sep_by1` or the empty list.
pub fn sep_by<T: 'static, U: Clone + 'static, V: 'static, S: 'static>(
    item: &Parser<T, U, V>,
    sep: &Parser<T, U, S>,
) -> Parser<T, U, Vec<V>> {
    sep_by1(item, sep)
        .optional()
        .map(|values| values.unwrap_or_default())
}

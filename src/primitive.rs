//! Rule primitives that match individual tokens.
//!
//! *“For a moment, nothing happened. Then, after a second or so, nothing continued to happen.”*
//!
//! Primitives are the leaves of a grammar: every other rule is eventually built out of these.

use super::*;

/// A rule that accepts a single token satisfying `predicate`, producing the token itself.
///
/// On empty input the rule fails with "Unexpected end of input"; on a token the predicate rejects it fails with
/// "Unexpected: <token>" without consuming anything.
///
/// # Examples
///
/// ```
/// # use bramble::prelude::*;
/// let digit = terminal(|c: &char| c.is_ascii_digit());
///
/// assert_eq!(parse(&digit, "7".chars().collect::<Vec<_>>()), Ok('7'));
/// assert_eq!(
///     parse(&digit, vec!['x']).unwrap_err().messages(),
///     vec!["Unexpected: x"],
/// );
/// ```
#[track_caller]
pub fn terminal<T, F>(predicate: F) -> Rule<T, T>
where
    T: Clone + 'static,
    F: Fn(&T) -> bool + Send + Sync + 'static,
{
    Rule::from_kind(
        "terminal",
        Kind::Terminal(Arc::new(move |token: &T| {
            if predicate(token) {
                Some(token.clone())
            } else {
                None
            }
        })),
    )
}

/// A rule that accepts a single token for which `f` produces a value, yielding that value.
///
/// This is the typed form of [`terminal`]: it both tests the token and extracts what it carries.
///
/// # Examples
///
/// ```
/// # use bramble::prelude::*;
/// #[derive(Clone, Debug, PartialEq)]
/// enum Token { Int(i64), Plus }
///
/// let int = select(|t: &Token| match t {
///     Token::Int(x) => Some(*x),
///     _ => None,
/// });
///
/// assert_eq!(parse(&int, vec![Token::Int(42)]), Ok(42));
/// ```
#[track_caller]
pub fn select<T, R, F>(f: F) -> Rule<T, R>
where
    T: Clone + 'static,
    R: Clone + 'static,
    F: Fn(&T) -> Option<R> + Send + Sync + 'static,
{
    Rule::from_kind("select", Kind::Terminal(Arc::new(f)))
}

/// A rule that accepts a single token equal to `expected`.
#[track_caller]
pub fn just<T>(expected: T) -> Rule<T, T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    Rule::from_kind(
        "just",
        Kind::Terminal(Arc::new(move |token: &T| {
            if *token == expected {
                Some(token.clone())
            } else {
                None
            }
        })),
    )
}

/// A rule that accepts any single token. It only fails at the end of the input.
#[track_caller]
pub fn any<T: Clone + 'static>() -> Rule<T, T> {
    Rule::from_kind("any", Kind::Terminal(Arc::new(|token: &T| Some(token.clone()))))
}

/// A rule that always succeeds without consuming anything.
#[track_caller]
pub fn epsilon<T: Clone + 'static>() -> Rule<T, ()> {
    Rule::from_kind("epsilon", Kind::Epsilon(Arc::new(|| ())))
}

/// A rule that succeeds, without consuming anything, only when the input is exhausted.
///
/// Otherwise it fails with "Expected end of input, found: <token>".
#[track_caller]
pub fn end_of_input<T: Clone + 'static>() -> Rule<T, ()> {
    Rule::from_kind("end_of_input", Kind::EndOfInput(Arc::new(|| ())))
}

pub(crate) fn match_terminal<T: Clone + 'static, R: Clone + 'static>(
    matcher: &(dyn Fn(&T) -> Option<R> + Send + Sync),
    consumed: usize,
    input: LazyList<T>,
) -> Outcomes<T, R> {
    let result = match &input {
        LazyList::Empty => PartialResult::failure(ParseError::unexpected_end(consumed), LazyList::Empty),
        LazyList::NonEmpty(tokens) => match matcher(tokens.head()) {
            Some(value) => PartialResult::success(consumed + 1, value, tokens.tail().clone()),
            None => PartialResult::failure(ParseError::unexpected(consumed, tokens.head().clone()), input.clone()),
        },
    };
    NonEmpty::single(result)
}

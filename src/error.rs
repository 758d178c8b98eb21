//! Error types produced while parsing.
//!
//! Parse failures are ordinary values: they flow through a rule's outcome stream alongside successes and are reduced
//! to the furthest-progress set by [`Parser::parse`]. Left recursion is reported the same way, with
//! [`Reason::LeftRecursion`], so a defective grammar never loops forever.

use super::*;

/// The reason a [`ParseError`] was produced.
#[derive(Clone, Debug, PartialEq)]
pub enum Reason {
    /// A token was found that the rule did not accept.
    Unexpected,
    /// The rule needed a token but the input was exhausted.
    UnexpectedEndOfInput,
    /// The input should have been exhausted, but a token was found.
    ExpectedEndOfInput,
    /// The rule was re-entered at the same position on its own call path.
    LeftRecursion {
        /// The rule that was re-entered.
        rule: RuleInfo,
    },
}

/// A single parse failure.
///
/// The human-readable message is only rendered when asked for, see [`ParseError::message`].
#[derive(Clone, Debug, PartialEq)]
pub struct ParseError<T> {
    consumed: usize,
    found: Option<T>,
    reason: Reason,
}

impl<T> ParseError<T> {
    pub(crate) fn unexpected(consumed: usize, found: T) -> Self {
        Self {
            consumed,
            found: Some(found),
            reason: Reason::Unexpected,
        }
    }

    pub(crate) fn unexpected_end(consumed: usize) -> Self {
        Self {
            consumed,
            found: None,
            reason: Reason::UnexpectedEndOfInput,
        }
    }

    pub(crate) fn expected_end(consumed: usize, found: T) -> Self {
        Self {
            consumed,
            found: Some(found),
            reason: Reason::ExpectedEndOfInput,
        }
    }

    pub(crate) fn left_recursion(consumed: usize, rule: RuleInfo) -> Self {
        Self {
            consumed,
            found: None,
            reason: Reason::LeftRecursion { rule },
        }
    }

    /// The number of tokens consumed before the failure.
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    /// The offending token, if there was one.
    pub fn found(&self) -> Option<&T> {
        self.found.as_ref()
    }

    /// Why the failure happened.
    pub fn reason(&self) -> &Reason {
        &self.reason
    }

    /// Returns `true` if this error reports a left-recursive grammar rather than bad input.
    pub fn is_left_recursion(&self) -> bool {
        matches!(self.reason, Reason::LeftRecursion { .. })
    }

    /// Render the human-readable message for this error.
    pub fn message(&self) -> String
    where
        T: fmt::Display,
    {
        self.to_string()
    }

    /// Map the offending token to another type.
    pub fn map_token<U>(self, f: impl FnOnce(T) -> U) -> ParseError<U> {
        ParseError {
            consumed: self.consumed,
            found: self.found.map(f),
            reason: self.reason,
        }
    }
}

struct Found<'a, T>(&'a Option<T>);

impl<T: fmt::Display> fmt::Display for Found<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(token) => fmt::Display::fmt(token, f),
            None => write!(f, "end of input"),
        }
    }
}

impl<T: fmt::Display> fmt::Display for ParseError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reason {
            Reason::Unexpected => write!(f, "Unexpected: {}", Found(&self.found)),
            Reason::UnexpectedEndOfInput => write!(f, "Unexpected end of input"),
            Reason::ExpectedEndOfInput => write!(f, "Expected end of input, found: {}", Found(&self.found)),
            Reason::LeftRecursion { .. } => write!(f, "Left recursion detected"),
        }
    }
}

impl<T: fmt::Debug + fmt::Display> std::error::Error for ParseError<T> {}

/// A non-empty list of parse failures, all of which made the same (furthest) progress through the input.
#[derive(Clone, Debug, PartialEq)]
pub struct ParseErrors<T> {
    first: ParseError<T>,
    rest: Vec<ParseError<T>>,
}

impl<T> ParseErrors<T> {
    pub(crate) fn new(first: ParseError<T>) -> Self {
        Self {
            first,
            rest: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, error: ParseError<T>) {
        self.rest.push(error);
    }

    /// Fold another failure into this set, keeping only the failures that made the most progress.
    pub(crate) fn merge(self, error: ParseError<T>) -> Self {
        match error.consumed.cmp(&self.first.consumed) {
            Ordering::Greater => Self::new(error),
            Ordering::Equal => {
                let mut this = self;
                this.push(error);
                this
            }
            Ordering::Less => self,
        }
    }

    /// The first failure encountered.
    pub fn first(&self) -> &ParseError<T> {
        &self.first
    }

    /// The number of failures. Never zero.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        1 + self.rest.len()
    }

    /// How far through the input every failure in this set got.
    pub fn consumed(&self) -> usize {
        self.first.consumed
    }

    /// Returns `true` if this set reports a left-recursive grammar rather than bad input.
    pub fn is_left_recursion(&self) -> bool {
        self.first.is_left_recursion()
    }

    /// Iterate over the failures in the order they were produced.
    pub fn iter(&self) -> impl Iterator<Item = &ParseError<T>> + '_ {
        core::iter::once(&self.first).chain(self.rest.iter())
    }

    /// Render the message of every failure.
    pub fn messages(&self) -> Vec<String>
    where
        T: fmt::Display,
    {
        self.iter().map(ParseError::message).collect()
    }

    /// Convert this set into a plain vector of failures.
    pub fn into_vec(self) -> Vec<ParseError<T>> {
        let mut errors = Vec::with_capacity(self.len());
        errors.push(self.first);
        errors.extend(self.rest);
        errors
    }
}

impl<T> IntoIterator for ParseErrors<T> {
    type Item = ParseError<T>;
    type IntoIter = std::vec::IntoIter<ParseError<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.into_vec().into_iter()
    }
}

impl<T: fmt::Display> fmt::Display for ParseErrors<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", error)?;
        }
        Ok(())
    }
}

impl<T: fmt::Debug + fmt::Display> std::error::Error for ParseErrors<T> {}

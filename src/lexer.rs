//! A longest-match, regex-driven tokenizer.
//!
//! *“Ford carried on counting quietly. This is about the most aggressive thing you can do to a computer, the
//! equivalent of going up to a human being and saying "Blood...blood...blood...blood..."”*
//!
//! A [`Tokenizer`] holds an ordered list of patterns, each paired with a constructor. At every offset of the input,
//! each pattern is tried anchored at that offset; the longest match wins, and among matches of equal length the
//! pattern declared first wins. The winning constructor turns the match into a token.

use super::*;

use crate::position::{PositionTracker, Positioned};
use regex_automata::{
    meta::{BuildError, Regex},
    util::captures::Captures,
    Anchored, Input,
};

/// The text matched by a pattern, passed to the pattern's constructor.
pub struct Lexeme<'a> {
    haystack: &'a str,
    span: Range<usize>,
    captures: &'a Captures,
}

impl<'a> Lexeme<'a> {
    /// The matched text.
    pub fn as_str(&self) -> &'a str {
        &self.haystack[self.span.clone()]
    }

    /// The byte range of the matched text within the input.
    pub fn span(&self) -> Range<usize> {
        self.span.clone()
    }

    /// The text matched by the capture group with the given index, if it participated in the match.
    ///
    /// Group `0` is the whole match.
    pub fn group(&self, index: usize) -> Option<&'a str> {
        self.captures
            .get_group(index)
            .map(|span| &self.haystack[span.range()])
    }

    /// The text matched by the capture group with the given name, if it participated in the match.
    pub fn name(&self, name: &str) -> Option<&'a str> {
        self.captures
            .get_group_by_name(name)
            .map(|span| &self.haystack[span.range()])
    }
}

type Constructor<T> = Box<dyn Fn(&Lexeme<'_>) -> T + Send + Sync>;

struct Pattern<T> {
    regex: Regex,
    build: Constructor<T>,
}

struct Inner<K, T> {
    tracker: K,
    patterns: Vec<Pattern<T>>,
}

/// Turns text into a sequence of [`Positioned`] tokens. See the [module-level documentation](self).
///
/// Tokenizers are immutable once built: one can be shared between threads and reused for any number of inputs.
///
/// # Examples
///
/// ```
/// # use bramble::prelude::*;
/// #[derive(Clone, Debug, PartialEq)]
/// enum Token { Reserved, Ident(String), Space }
///
/// let tokenizer = Tokenizer::builder(CharOffset)
///     .pattern("reserved", |_| Token::Reserved)
///     .pattern(r"\w+", |m| Token::Ident(m.as_str().to_string()))
///     .pattern(r"\s+", |_| Token::Space)
///     .build()
///     .unwrap();
///
/// let tokens: Vec<_> = tokenizer.tokenize_values("reserved reservednot").collect::<Result<_, _>>().unwrap();
/// assert_eq!(tokens, vec![Token::Reserved, Token::Space, Token::Ident("reservednot".to_string())]);
/// ```
pub struct Tokenizer<K, T> {
    inner: Arc<Inner<K, T>>,
}

impl<K, T> Clone for Tokenizer<K, T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<K: PositionTracker, T> Tokenizer<K, T> {
    /// Start building a tokenizer that tracks positions with `tracker`.
    pub fn builder(tracker: K) -> TokenizerBuilder<K, T> {
        TokenizerBuilder {
            tracker,
            patterns: Vec::new(),
        }
    }

    /// Tokenize `input`, lazily.
    ///
    /// The returned iterator yields an error, and then stops, if it reaches text that no pattern matches or if the
    /// longest match is empty.
    pub fn tokenize(&self, input: impl Into<Arc<str>>) -> Tokens<K, T> {
        Tokens {
            tokenizer: self.clone(),
            input: input.into(),
            offset: 0,
            position: Some(self.inner.tracker.start()),
        }
    }

    /// Tokenize `input`, lazily, discarding positions.
    pub fn tokenize_values(
        &self,
        input: impl Into<Arc<str>>,
    ) -> impl Iterator<Item = Result<T, LexError<K::Position>>> {
        self.tokenize(input)
            .map(|token| token.map(Positioned::into_value))
    }

    // The index of the winning pattern and the end of its match, if any pattern matches at `offset`.
    fn longest_match(&self, haystack: &str, offset: usize) -> Option<(usize, usize)> {
        let input = Input::new(haystack).range(offset..).anchored(Anchored::Yes);
        let mut best: Option<(usize, usize)> = None;
        for (index, pattern) in self.inner.patterns.iter().enumerate() {
            if let Some(found) = pattern.regex.search(&input) {
                // Strictly longer only, so that earlier patterns win ties.
                if best.map_or(true, |(_, end)| found.end() > end) {
                    best = Some((index, found.end()));
                }
            }
        }
        best
    }

    fn build(&self, index: usize, haystack: &str, offset: usize, end: usize) -> T {
        let pattern = &self.inner.patterns[index];
        let mut captures = pattern.regex.create_captures();
        let input = Input::new(haystack).range(offset..).anchored(Anchored::Yes);
        pattern.regex.search_captures(&input, &mut captures);
        (pattern.build)(&Lexeme {
            haystack,
            span: offset..end,
            captures: &captures,
        })
    }
}

impl<K, T> fmt::Debug for Tokenizer<K, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tokenizer")
            .field("patterns", &self.inner.patterns.len())
            .finish()
    }
}

/// See [`Tokenizer::builder`].
pub struct TokenizerBuilder<K, T> {
    tracker: K,
    patterns: Vec<(String, Constructor<T>)>,
}

impl<K: PositionTracker, T> TokenizerBuilder<K, T> {
    /// Add a pattern, with lower priority than every pattern added before it.
    ///
    /// `build` turns text matched by the pattern into a token.
    pub fn pattern<F>(mut self, pattern: &str, build: F) -> Self
    where
        F: Fn(&Lexeme<'_>) -> T + Send + Sync + 'static,
    {
        self.patterns.push((pattern.to_string(), Box::new(build)));
        self
    }

    /// Compile every pattern.
    pub fn build(self) -> Result<Tokenizer<K, T>, PatternError> {
        let patterns = self
            .patterns
            .into_iter()
            .enumerate()
            .map(|(index, (pattern, build))| match Regex::new(&pattern) {
                Ok(regex) => Ok(Pattern { regex, build }),
                Err(source) => Err(PatternError {
                    index,
                    pattern,
                    source,
                }),
            })
            .collect::<Result<_, _>>()?;
        Ok(Tokenizer {
            inner: Arc::new(Inner {
                tracker: self.tracker,
                patterns,
            }),
        })
    }
}

/// A lazy sequence of tokens. See [`Tokenizer::tokenize`].
pub struct Tokens<K: PositionTracker, T> {
    tokenizer: Tokenizer<K, T>,
    input: Arc<str>,
    offset: usize,
    // `None` once the input is exhausted or an error has been produced.
    position: Option<K::Position>,
}

impl<K: PositionTracker, T> Iterator for Tokens<K, T> {
    type Item = Result<Positioned<K::Position, T>, LexError<K::Position>>;

    fn next(&mut self) -> Option<Self::Item> {
        let start = self.position.take()?;
        let offset = self.offset;
        if offset >= self.input.len() {
            return None;
        }
        let (index, end) = match self.tokenizer.longest_match(&self.input, offset) {
            Some((pattern, end)) if end == offset => {
                return Some(Err(LexError {
                    offset,
                    position: start,
                    kind: LexErrorKind::EmptyMatch { pattern },
                }));
            }
            Some(found) => found,
            None => {
                return Some(Err(LexError {
                    offset,
                    position: start,
                    kind: LexErrorKind::NoMatch,
                }))
            }
        };
        let value = self.tokenizer.build(index, &self.input, offset, end);
        let end_position = self.tokenizer.inner.tracker.next(&start, &self.input[offset..end]);
        self.offset = end;
        self.position = Some(end_position.clone());
        Some(Ok(Positioned {
            start,
            value,
            end: end_position,
        }))
    }
}

impl<K: PositionTracker, T> core::iter::FusedIterator for Tokens<K, T> {}

/// The ways in which tokenizing can fail.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LexErrorKind {
    /// No pattern matches the text at the offset.
    NoMatch,
    /// The longest match at the offset is empty, so tokenizing could not make progress.
    EmptyMatch {
        /// The index of the pattern that produced the empty match.
        pattern: usize,
    },
}

/// An error produced while tokenizing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LexError<P> {
    /// The byte offset at which tokenizing failed.
    pub offset: usize,
    /// The tracked position at which tokenizing failed.
    pub position: P,
    /// What went wrong.
    pub kind: LexErrorKind,
}

impl<P> fmt::Display for LexError<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            LexErrorKind::NoMatch => write!(f, "no pattern matches at offset {}", self.offset),
            LexErrorKind::EmptyMatch { pattern } => write!(
                f,
                "pattern #{} matches the empty string at offset {}",
                pattern, self.offset
            ),
        }
    }
}

impl<P: fmt::Debug> std::error::Error for LexError<P> {}

/// A pattern given to a [`TokenizerBuilder`] could not be compiled.
#[derive(Debug)]
pub struct PatternError {
    /// The position of the pattern in the order patterns were added.
    pub index: usize,
    /// The pattern.
    pub pattern: String,
    /// Why it could not be compiled.
    pub source: BuildError,
}

impl fmt::Display for PatternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid pattern #{} `{}`: {}", self.index, self.pattern, self.source)
    }
}

impl std::error::Error for PatternError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

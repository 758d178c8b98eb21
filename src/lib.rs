#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]
#![deny(missing_docs)]
#![allow(clippy::type_complexity)]

/// Static analysis of rule graphs (nullability and left recursion).
pub mod analysis;
/// Combinators that extend and combine existing rules.
pub mod combinator;
/// Utilities for debugging grammars.
pub mod debug;
/// Cycle detection and the call wrapper every rule invocation goes through.
pub mod engine;
/// Error types produced while parsing.
pub mod error;
/// Lazily-extended, memoized linked lists.
pub mod lazy;
/// A longest-match, regex-driven tokenizer.
#[cfg(feature = "regex")]
#[cfg_attr(docsrs, doc(cfg(feature = "regex")))]
pub mod lexer;
/// The top-level parse entry points.
pub mod parser;
/// Pluggable position tracking for tokens.
pub mod position;
/// Rule primitives that match individual tokens.
pub mod primitive;
/// Recursive rules (rules that include themselves within their patterns).
pub mod recursive;
/// The rule graph and its outcome types.
pub mod rule;
/// Sequences of rules whose values are combined by a constructor.
pub mod sequence;

pub use crate::{
    error::{ParseError, ParseErrors, Reason},
    lazy::{LazyList, NonEmpty},
    parser::{parse, Parser},
    rule::{PartialResult, Rule, RuleId, RuleInfo},
};

use crate::{
    debug::{ParseEvent, Session},
    engine::{call, Breadcrumbs},
    rule::{Adapter, Erased, Kind, Outcomes, Shape},
};

use std::{
    borrow::Cow,
    cell::{Cell, OnceCell, RefCell},
    cmp::Ordering,
    fmt,
    ops::Range,
    panic::Location,
    rc::Rc,
    sync::{Arc, Weak},
};

/// Commonly used functions, traits and types.
pub mod prelude {
    #[cfg(feature = "either")]
    pub use super::combinator::either;
    #[cfg(feature = "regex")]
    pub use super::lexer::{Lexeme, Tokenizer};
    pub use super::{
        combinator::{one_of, optional, repeat},
        parser::{parse, Parser},
        position::{ByteOffset, CharOffset, LineCol, NoPosition, PositionTracker, Positioned},
        primitive::{any, end_of_input, epsilon, just, select, terminal},
        recursive::{declare, lazy, recursive},
        sequence::seq,
        ParseError, ParseErrors, Rule,
    };
}

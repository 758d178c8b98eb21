//! The rule graph and its outcome types.
//!
//! *“In the beginning the Universe was created. This has made a lot of people very angry and been widely regarded as a
//! bad move.”*
//!
//! A [`Rule`] is a cheaply clonable handle to an immutable node of a grammar. Rules are built once (see the
//! [`primitive`](crate::primitive), [`combinator`](crate::combinator) and [`sequence`](crate::sequence) modules) and can
//! then be shared between any number of parses, on any number of threads.

use super::*;

use core::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

/// A stable identifier assigned to every rule when it is constructed.
///
/// Clones of a rule share its identifier.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RuleId(u64);

impl RuleId {
    pub(crate) fn fresh() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        Self(NEXT.fetch_add(1, AtomicOrdering::Relaxed))
    }

    /// The raw value of this identifier.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Information about a specific rule, used for debugging and error reporting.
#[derive(Clone, Debug)]
pub struct RuleInfo {
    id: RuleId,
    kind: &'static str,
    label: Option<Cow<'static, str>>,
    location: &'static Location<'static>,
}

impl RuleInfo {
    #[track_caller]
    pub(crate) fn new(kind: &'static str) -> Self {
        Self {
            id: RuleId::fresh(),
            kind,
            label: None,
            location: Location::caller(),
        }
    }

    /// The identifier of the rule.
    pub fn id(&self) -> RuleId {
        self.id
    }

    /// The kind of rule (`terminal`, `seq`, `one_of`, etc.).
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// The label given to the rule with [`Rule::labelled`], if any.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// The location in the source code at which the rule was constructed.
    pub fn location(&self) -> &'static Location<'static> {
        self.location
    }
}

impl PartialEq for RuleInfo {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl fmt::Display for RuleInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.label {
            Some(label) => write!(f, "{}", label),
            None => write!(f, "{}{}", self.kind, self.id),
        }
    }
}

/// The result of invoking a rule at some position: how far it got, what it produced, and the input that remains.
pub struct PartialResult<T, R> {
    /// The number of tokens consumed from the start of the input.
    pub consumed: usize,
    /// The value produced, or the reason the rule failed.
    pub outcome: Result<R, ParseError<T>>,
    /// The input that has not been consumed.
    pub remaining: LazyList<T>,
}

impl<T: Clone, R: Clone> Clone for PartialResult<T, R> {
    fn clone(&self) -> Self {
        Self {
            consumed: self.consumed,
            outcome: self.outcome.clone(),
            remaining: self.remaining.clone(),
        }
    }
}

impl<T: fmt::Debug, R: fmt::Debug> fmt::Debug for PartialResult<T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PartialResult")
            .field("consumed", &self.consumed)
            .field("outcome", &self.outcome)
            .finish()
    }
}

impl<T, R> PartialResult<T, R> {
    /// A successful outcome.
    pub fn success(consumed: usize, value: R, remaining: LazyList<T>) -> Self {
        Self {
            consumed,
            outcome: Ok(value),
            remaining,
        }
    }

    /// A failed outcome, positioned where the error occurred.
    pub fn failure(error: ParseError<T>, remaining: LazyList<T>) -> Self {
        Self {
            consumed: error.consumed(),
            outcome: Err(error),
            remaining,
        }
    }

    /// Returns `true` if this outcome is a success.
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    /// Transform the value of a successful outcome, leaving failures untouched.
    pub fn map<U>(self, f: impl FnOnce(R) -> U) -> PartialResult<T, U> {
        PartialResult {
            consumed: self.consumed,
            outcome: self.outcome.map(f),
            remaining: self.remaining,
        }
    }
}

/// The outcome stream of a rule invocation. Never empty.
pub type Outcomes<T, R> = NonEmpty<PartialResult<T, R>>;

// Type-changing nodes (maps and sequences) hide their inner rule types behind this trait.
pub(crate) trait Adapter<T, R>: Send + Sync {
    fn partial_parse(&self, consumed: usize, crumbs: &Breadcrumbs, input: LazyList<T>) -> Outcomes<T, R>;

    fn children(&self) -> Vec<Arc<dyn Erased>>;
}

// A view of a rule with its token and output types erased, for graph analysis.
pub(crate) trait Erased: Send + Sync {
    fn info(&self) -> &RuleInfo;

    fn shape(&self) -> Shape;
}

/// A rule with its token and output types erased, for walking a grammar without knowing its types.
#[derive(Clone)]
pub struct AnyRule(pub(crate) Arc<dyn Erased>);

impl AnyRule {
    /// Information about the rule.
    pub fn info(&self) -> &RuleInfo {
        self.0.info()
    }
}

pub(crate) enum Shape {
    Leaf { nullable: bool },
    Choice(Vec<Arc<dyn Erased>>),
    Chain(Vec<Arc<dyn Erased>>),
}

pub(crate) enum Kind<T, R> {
    Terminal(Arc<dyn Fn(&T) -> Option<R> + Send + Sync>),
    Epsilon(Arc<dyn Fn() -> R + Send + Sync>),
    EndOfInput(Arc<dyn Fn() -> R + Send + Sync>),
    Map(Arc<dyn Adapter<T, R>>),
    Lazy(recursive::LazyHandle<T, R>),
    Alternative(Arc<[Rule<T, R>]>),
    Sequence(Arc<dyn Adapter<T, R>>),
}

impl<T, R> Clone for Kind<T, R> {
    fn clone(&self) -> Self {
        match self {
            Self::Terminal(f) => Self::Terminal(f.clone()),
            Self::Epsilon(f) => Self::Epsilon(f.clone()),
            Self::EndOfInput(f) => Self::EndOfInput(f.clone()),
            Self::Map(a) => Self::Map(a.clone()),
            Self::Lazy(h) => Self::Lazy(h.clone()),
            Self::Alternative(rules) => Self::Alternative(rules.clone()),
            Self::Sequence(a) => Self::Sequence(a.clone()),
        }
    }
}

pub(crate) struct Node<T, R> {
    info: RuleInfo,
    kind: Kind<T, R>,
}

/// A node in a grammar that matches a prefix of a token stream of `T`s and produces an `R`.
///
/// Rules are immutable and cheap to clone: clones share the same node (and the same [`RuleId`]).
pub struct Rule<T, R> {
    node: Arc<Node<T, R>>,
}

impl<T, R> Clone for Rule<T, R> {
    fn clone(&self) -> Self {
        Self {
            node: self.node.clone(),
        }
    }
}

impl<T, R> fmt::Debug for Rule<T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rule({} at {})", self.node.info, self.node.info.location)
    }
}

impl<T, R> Rule<T, R> {
    #[track_caller]
    pub(crate) fn from_kind(name: &'static str, kind: Kind<T, R>) -> Self {
        Self::from_info(RuleInfo::new(name), kind)
    }

    pub(crate) fn from_info(info: RuleInfo, kind: Kind<T, R>) -> Self {
        Self {
            node: Arc::new(Node { info, kind }),
        }
    }

    pub(crate) fn kind(&self) -> &Kind<T, R> {
        &self.node.kind
    }

    /// Information about this rule.
    pub fn info(&self) -> &RuleInfo {
        &self.node.info
    }

    /// The identifier of this rule.
    pub fn id(&self) -> RuleId {
        self.node.info.id
    }

    /// Give this rule a name, used when debugging and when reporting left recursion.
    ///
    /// The labelled rule is the same rule under a new name: it shares this rule's [`RuleId`].
    pub fn labelled(self, label: impl Into<Cow<'static, str>>) -> Self {
        let info = RuleInfo {
            label: Some(label.into()),
            ..self.node.info.clone()
        };
        Self::from_info(info, self.node.kind.clone())
    }
}

impl<T: Clone + 'static, R: Clone + 'static> Rule<T, R> {
    /// Match this rule against `input`, having already consumed `consumed` tokens, producing every candidate outcome.
    ///
    /// Most users want [`Parser::parse`] instead. This is the operation every rule exposes to the engine: outcomes are
    /// produced lazily and in a deterministic order, and there is always at least one.
    pub fn partial_parse(&self, consumed: usize, crumbs: &Breadcrumbs, input: LazyList<T>) -> Outcomes<T, R> {
        match &self.node.kind {
            Kind::Terminal(matcher) => primitive::match_terminal(matcher.as_ref(), consumed, input),
            Kind::Epsilon(value) => NonEmpty::single(PartialResult::success(consumed, value(), input)),
            Kind::EndOfInput(value) => NonEmpty::single(match input.head().cloned() {
                None => PartialResult::success(consumed, value(), input),
                Some(token) => PartialResult::failure(ParseError::expected_end(consumed, token), input),
            }),
            Kind::Map(adapter) | Kind::Sequence(adapter) => adapter.partial_parse(consumed, crumbs, input),
            Kind::Lazy(handle) => call(&handle.target(), consumed, crumbs, input),
            Kind::Alternative(rules) => combinator::alternatives(rules.clone(), 0, consumed, crumbs.clone(), input),
        }
    }

    /// Produce every outcome of this rule on the given input, starting from scratch.
    pub fn outcomes<I>(&self, tokens: I) -> Outcomes<T, R>
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: 'static,
    {
        call(self, 0, &Breadcrumbs::new(), LazyList::lazy(tokens))
    }

    pub(crate) fn erase(&self) -> Arc<dyn Erased> {
        self.node.clone()
    }

    /// Erase the token and output types of this rule.
    pub fn to_any(&self) -> AnyRule {
        AnyRule(self.erase())
    }
}

impl<T: Clone + 'static, R: Clone + 'static> Erased for Node<T, R> {
    fn info(&self) -> &RuleInfo {
        &self.info
    }

    fn shape(&self) -> Shape {
        match &self.kind {
            Kind::Terminal(_) | Kind::EndOfInput(_) => Shape::Leaf { nullable: false },
            Kind::Epsilon(_) => Shape::Leaf { nullable: true },
            Kind::Map(adapter) | Kind::Sequence(adapter) => Shape::Chain(adapter.children()),
            Kind::Lazy(handle) => Shape::Chain(vec![handle.target().erase()]),
            Kind::Alternative(rules) => Shape::Choice(rules.iter().map(Rule::erase).collect()),
        }
    }
}

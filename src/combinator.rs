//! Combinators that extend and combine existing rules.
//!
//! *“So long, and thanks for all the fish.”*

use super::*;

use crate::{primitive::epsilon, sequence::seq};

struct MapAdapter<T, R, F> {
    inner: Rule<T, R>,
    f: Arc<F>,
}

impl<T, R, U, F> Adapter<T, U> for MapAdapter<T, R, F>
where
    T: Clone + 'static,
    R: Clone + 'static,
    U: Clone + 'static,
    F: Fn(R) -> U + Send + Sync + 'static,
{
    fn partial_parse(&self, consumed: usize, crumbs: &Breadcrumbs, input: LazyList<T>) -> Outcomes<T, U> {
        let f = self.f.clone();
        call(&self.inner, consumed, crumbs, input).map(move |result| result.clone().map(|value| f(value)))
    }

    fn children(&self) -> Vec<Arc<dyn Erased>> {
        vec![self.inner.erase()]
    }
}

impl<T: Clone + 'static, R: Clone + 'static> Rule<T, R> {
    /// Map the value of this rule to another value. Failures pass through untouched.
    ///
    /// # Examples
    ///
    /// ```
    /// # use bramble::prelude::*;
    /// let digit = terminal(|c: &char| c.is_ascii_digit()).map(|c| c as u32 - '0' as u32);
    ///
    /// assert_eq!(parse(&digit, vec!['4']), Ok(4));
    /// ```
    #[track_caller]
    pub fn map<U, F>(self, f: F) -> Rule<T, U>
    where
        U: Clone + 'static,
        F: Fn(R) -> U + Send + Sync + 'static,
    {
        Rule::from_kind(
            "map",
            Kind::Map(Arc::new(MapAdapter {
                inner: self,
                f: Arc::new(f),
            })),
        )
    }

    /// Replace the value of this rule with a constant.
    #[track_caller]
    pub fn to<U>(self, value: U) -> Rule<T, U>
    where
        U: Clone + Send + Sync + 'static,
    {
        self.map(move |_| value.clone())
    }

    /// Try this rule, then `other`, at the same position. See [`one_of`].
    #[track_caller]
    pub fn or(self, other: Rule<T, R>) -> Rule<T, R> {
        one_of([self, other])
    }

    /// Match this rule followed by `other`, producing both values.
    #[track_caller]
    pub fn then<S: Clone + 'static>(self, other: Rule<T, S>) -> Rule<T, (R, S)> {
        seq((self, other), |pair| pair)
    }
}

/// A rule that tries every one of `rules` at the same position, in order.
///
/// Unlike a conventional ordered choice, every alternative contributes its outcomes: the outcomes of the first rule
/// come first, then those of the second, and so on. Later alternatives are only tried once the consumer walks past
/// the outcomes of earlier ones, so the first success is found without evaluating the rest.
///
/// # Panics
///
/// Panics if `rules` is empty.
///
/// # Examples
///
/// ```
/// # use bramble::prelude::*;
/// let ab = one_of([just('a'), just('b')]);
///
/// assert_eq!(parse(&ab, vec!['b']), Ok('b'));
/// ```
#[track_caller]
pub fn one_of<T, R, I>(rules: I) -> Rule<T, R>
where
    T: Clone + 'static,
    R: Clone + 'static,
    I: IntoIterator<Item = Rule<T, R>>,
{
    let rules: Arc<[Rule<T, R>]> = rules.into_iter().collect();
    assert!(!rules.is_empty(), "one_of requires at least one alternative");
    Rule::from_kind("one_of", Kind::Alternative(rules))
}

pub(crate) fn alternatives<T: Clone + 'static, R: Clone + 'static>(
    rules: Arc<[Rule<T, R>]>,
    index: usize,
    consumed: usize,
    crumbs: Breadcrumbs,
    input: LazyList<T>,
) -> Outcomes<T, R> {
    let first = call(&rules[index], consumed, &crumbs, input.clone());
    if index + 1 == rules.len() {
        first
    } else {
        first.concat(move || LazyList::NonEmpty(alternatives(rules, index + 1, consumed, crumbs, input)))
    }
}

/// A rule that optionally matches `rule`.
///
/// The empty match is produced first, then every match of `rule`.
#[track_caller]
pub fn optional<T, R>(rule: Rule<T, R>) -> Rule<T, Option<R>>
where
    T: Clone + 'static,
    R: Clone + 'static,
{
    one_of([epsilon().map(|()| None), rule.map(Some)])
}

/// A rule that matches `rule` zero or more times, producing the values in order.
///
/// Every number of repetitions is a candidate outcome, shortest first. Follow it with something that constrains the
/// length (such as [`end_of_input`](crate::primitive::end_of_input)) to pick a particular one.
///
/// Walking to the outcome with `k` repetitions costs time proportional to `k` plus the work `rule` does, so long runs
/// stay cheap. A success of `rule` that consumes nothing would repeat forever, and is reported as
/// [`Reason::LeftRecursion`] instead.
///
/// # Examples
///
/// ```
/// # use bramble::prelude::*;
/// let digits = seq(
///     (repeat(terminal(|c: &char| c.is_ascii_digit())), end_of_input()),
///     |(digits, ())| digits.into_iter().collect::<String>(),
/// );
///
/// assert_eq!(parse(&digits, "123".chars().collect::<Vec<_>>()), Ok("123".to_string()));
/// ```
#[track_caller]
pub fn repeat<T, R>(rule: Rule<T, R>) -> Rule<T, Vec<R>>
where
    T: Clone + 'static,
    R: Clone + 'static,
{
    let info = RuleInfo::new("repeat");
    let more = Rule::from_info(
        info.clone(),
        Kind::Map(Arc::new(RepeatAdapter {
            inner: rule,
            info,
        })),
    );
    one_of([epsilon().map(|()| Vec::new()), more])
}

// One or more repetitions, walked depth-first without nesting outcome streams.
struct RepeatAdapter<T, R> {
    inner: Rule<T, R>,
    info: RuleInfo,
}

impl<T: Clone + 'static, R: Clone + 'static> Adapter<T, Vec<R>> for RepeatAdapter<T, R> {
    fn partial_parse(&self, consumed: usize, crumbs: &Breadcrumbs, input: LazyList<T>) -> Outcomes<T, Vec<R>> {
        let mut walk = Repetitions {
            inner: self.inner.clone(),
            info: self.info.clone(),
            crumbs: crumbs.clone(),
            values: Vec::new(),
            stack: vec![Frame::Start {
                depth: 0,
                consumed,
                input,
            }],
        };
        let first = walk
            .next()
            .expect("every rule invocation produces at least one outcome");
        NonEmpty::new(first, move || LazyList::lazy(walk))
    }

    fn children(&self) -> Vec<Arc<dyn Erased>> {
        vec![self.inner.erase()]
    }
}

// `depth` is the number of values matched before the frame's position.
enum Frame<T, R> {
    // `inner` has not been tried at this position yet.
    Start {
        depth: usize,
        consumed: usize,
        input: LazyList<T>,
    },
    // Walking the outcomes of `inner`. `visited` once the head has been yielded.
    Walk {
        depth: usize,
        start: usize,
        outcomes: Outcomes<T, R>,
        visited: bool,
    },
}

struct Repetitions<T, R> {
    inner: Rule<T, R>,
    info: RuleInfo,
    crumbs: Breadcrumbs,
    // The values along the current path. Frames at depth `d` only touch `values[d..]`.
    values: Vec<R>,
    stack: Vec<Frame<T, R>>,
}

impl<T: Clone + 'static, R: Clone + 'static> Iterator for Repetitions<T, R> {
    type Item = PartialResult<T, Vec<R>>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.stack.pop()? {
                Frame::Start {
                    depth,
                    consumed,
                    input,
                } => {
                    let outcomes = call(&self.inner, consumed, &self.crumbs, input);
                    self.stack.push(Frame::Walk {
                        depth,
                        start: consumed,
                        outcomes,
                        visited: false,
                    });
                }
                Frame::Walk {
                    depth,
                    start,
                    outcomes,
                    visited: true,
                } => {
                    if let LazyList::NonEmpty(rest) = outcomes.tail() {
                        self.stack.push(Frame::Walk {
                            depth,
                            start,
                            outcomes: rest.clone(),
                            visited: false,
                        });
                    }
                }
                Frame::Walk {
                    depth,
                    start,
                    outcomes,
                    visited: false,
                } => {
                    let result = outcomes.head().clone();
                    self.stack.push(Frame::Walk {
                        depth,
                        start,
                        outcomes,
                        visited: true,
                    });
                    return Some(match result.outcome {
                        Err(error) => PartialResult::failure(error, result.remaining),
                        Ok(_) if result.consumed == start => PartialResult::failure(
                            ParseError::left_recursion(start, self.info.clone()),
                            result.remaining,
                        ),
                        Ok(value) => {
                            self.values.truncate(depth);
                            self.values.push(value);
                            self.stack.push(Frame::Start {
                                depth: depth + 1,
                                consumed: result.consumed,
                                input: result.remaining.clone(),
                            });
                            PartialResult::success(result.consumed, self.values.clone(), result.remaining)
                        }
                    });
                }
            }
        }
    }
}

/// A rule that matches either `left` or `right`, recording which one matched.
#[cfg(feature = "either")]
#[cfg_attr(docsrs, doc(cfg(feature = "either")))]
#[track_caller]
pub fn either<T, L, R>(left: Rule<T, L>, right: Rule<T, R>) -> Rule<T, ::either::Either<L, R>>
where
    T: Clone + 'static,
    L: Clone + 'static,
    R: Clone + 'static,
{
    one_of([left.map(::either::Either::Left), right.map(::either::Either::Right)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitive::{any, end_of_input, just, select, terminal};

    fn values<R: Clone + 'static>(outcomes: Outcomes<char, R>) -> Vec<Result<R, usize>> {
        outcomes
            .iter()
            .map(|result| result.outcome.clone().map_err(|e| e.consumed()))
            .collect()
    }

    #[test]
    fn alternatives_keep_declaration_order() {
        let a = terminal(|c: &char| c.is_alphabetic()).to(1);
        let b = terminal(|c: &char| c.is_lowercase()).to(2);
        assert_eq!(values(one_of([a.clone(), b.clone()]).outcomes(vec!['x'])), vec![Ok(1), Ok(2)]);
        assert_eq!(values(b.or(a).outcomes(vec!['x'])), vec![Ok(2), Ok(1)]);
    }

    #[test]
    fn optional_produces_empty_first() {
        let maybe = optional(just('x'));
        assert_eq!(values(maybe.outcomes(vec!['x'])), vec![Ok(None), Ok(Some('x'))]);
        assert_eq!(values(maybe.outcomes(vec!['y'])), vec![Ok(None), Err(0)]);
    }

    #[test]
    fn repeat_yields_every_prefix() {
        let many = repeat(just('a'));
        assert_eq!(
            values(many.outcomes(vec!['a', 'a', 'b'])),
            vec![Ok(vec![]), Ok(vec!['a']), Ok(vec!['a', 'a']), Err(2)],
        );
    }

    #[test]
    fn repeat_walks_ambiguous_items_depth_first() {
        let item = one_of([just('a').to(1), seq((just('a'), just('a')), |_| 2)]);
        let sums: Vec<_> = repeat(item)
            .outcomes(vec!['a', 'a'])
            .iter()
            .filter_map(|result| result.outcome.clone().ok())
            .collect();
        assert_eq!(sums, vec![vec![], vec![1], vec![1, 1], vec![2]]);
    }

    #[test]
    fn long_repetitions_stay_cheap() {
        let count = seq((repeat(just('a')), end_of_input()), |(many, ())| many.len());
        assert_eq!(crate::parser::parse(&count, vec!['a'; 10_000]), Ok(10_000));
    }

    #[test]
    fn repeating_an_empty_match_is_reported() {
        let rule = seq((repeat(epsilon::<char>()), end_of_input()), |_| ());
        let errors = crate::parser::parse(&rule, vec!['a']).unwrap_err();
        assert!(errors.is_left_recursion());
    }

    #[test]
    fn then_pairs() {
        let pair = just('a').then(any());
        assert_eq!(values(pair.outcomes(vec!['a', 'z'])), vec![Ok(('a', 'z'))]);
    }

    #[cfg(feature = "either")]
    #[test]
    fn either_records_side() {
        use ::either::Either;
        let rule = either(just('a'), select(|c: &char| c.to_digit(10)));
        assert_eq!(values(rule.outcomes(vec!['3'])), vec![Err(0), Ok(Either::Right(3))]);
    }

    #[test]
    #[should_panic]
    fn empty_one_of_panics() {
        one_of::<char, (), _>([]);
    }
}

//! Sequences of rules whose values are combined by a constructor.
//!
//! *“The ships hung in the sky in much the same way that bricks don't.”*
//!
//! [`seq`] matches a tuple of between one and eight rules one after another. Sub-rules may be ambiguous, in which case
//! the sequence produces every combination of their outcomes, in order.

use super::*;

use crate::rule::AnyRule;

/// A heterogeneous list of rules, nested as `(Rule<T, A>, (Rule<T, B>, ()))`.
///
/// This is an implementation detail of [`seq`]; you should not need to name it.
pub trait RuleList<T>: Clone + Send + Sync + 'static {
    /// The values produced by the rules, nested in the same way as the rules themselves.
    type Values: Clone + 'static;

    #[doc(hidden)]
    fn chain(&self, consumed: usize, crumbs: &Breadcrumbs, input: LazyList<T>) -> Outcomes<T, Self::Values>;

    #[doc(hidden)]
    fn erase_into(&self, out: &mut Vec<AnyRule>);
}

impl<T: Clone + 'static> RuleList<T> for () {
    type Values = ();

    fn chain(&self, consumed: usize, _: &Breadcrumbs, input: LazyList<T>) -> Outcomes<T, ()> {
        NonEmpty::single(PartialResult::success(consumed, (), input))
    }

    fn erase_into(&self, _: &mut Vec<AnyRule>) {}
}

impl<T, A, Rest> RuleList<T> for (Rule<T, A>, Rest)
where
    T: Clone + 'static,
    A: Clone + 'static,
    Rest: RuleList<T>,
{
    type Values = (A, Rest::Values);

    fn chain(&self, consumed: usize, crumbs: &Breadcrumbs, input: LazyList<T>) -> Outcomes<T, Self::Values> {
        let rest = self.1.clone();
        let crumbs = crumbs.clone();
        call(&self.0, consumed, &crumbs, input).flat_map(move |first| match &first.outcome {
            // Failures are forwarded as-is, without trying the rest of the sequence.
            Err(error) => NonEmpty::single(PartialResult::failure(error.clone(), first.remaining.clone())),
            Ok(value) => {
                let value = value.clone();
                rest.chain(first.consumed, &crumbs, first.remaining.clone())
                    .map(move |next| next.clone().map(|values| (value.clone(), values)))
            }
        })
    }

    fn erase_into(&self, out: &mut Vec<AnyRule>) {
        out.push(self.0.to_any());
        self.1.erase_into(out);
    }
}

/// A tuple of rules that can be matched in sequence with [`seq`].
///
/// Implemented for tuples of one to eight rules over the same token type.
pub trait Rules<T> {
    /// The nested form of the rules.
    type List: RuleList<T>;
    /// The flat tuple of values the rules produce.
    type Output;

    #[doc(hidden)]
    fn into_list(self) -> Self::List;

    #[doc(hidden)]
    fn flatten(values: <Self::List as RuleList<T>>::Values) -> Self::Output;
}

macro_rules! nest_ty {
    ($t:ty;) => { () };
    ($t:ty; $head:ident $(, $rest:ident)*) => { (Rule<$t, $head>, nest_ty!($t; $($rest),*)) };
}

macro_rules! nest {
    () => { () };
    ($head:ident $(, $rest:ident)*) => { ($head, nest!($($rest),*)) };
}

macro_rules! impl_rules_for_tuple {
    ($($ty:ident $var:ident),+) => {
        impl<T: Clone + 'static, $($ty: Clone + 'static),+> Rules<T> for ($(Rule<T, $ty>,)+) {
            type List = nest_ty!(T; $($ty),+);
            type Output = ($($ty,)+);

            fn into_list(self) -> Self::List {
                let ($($var,)+) = self;
                nest!($($var),+)
            }

            fn flatten(values: <Self::List as RuleList<T>>::Values) -> Self::Output {
                let nest!($($var),+) = values;
                ($($var,)+)
            }
        }
    };
}

impl_rules_for_tuple!(A a);
impl_rules_for_tuple!(A a, B b);
impl_rules_for_tuple!(A a, B b, C c);
impl_rules_for_tuple!(A a, B b, C c, D d);
impl_rules_for_tuple!(A a, B b, C c, D d, E e);
impl_rules_for_tuple!(A a, B b, C c, D d, E e, F f);
impl_rules_for_tuple!(A a, B b, C c, D d, E e, F f, G g);
impl_rules_for_tuple!(A a, B b, C c, D d, E e, F f, G g, H h);

struct SeqAdapter<L, G> {
    rules: L,
    build: Arc<G>,
}

impl<T, Z, L, G> Adapter<T, Z> for SeqAdapter<L, G>
where
    T: Clone + 'static,
    Z: Clone + 'static,
    L: RuleList<T>,
    G: Fn(L::Values) -> Z + Send + Sync + 'static,
{
    fn partial_parse(&self, consumed: usize, crumbs: &Breadcrumbs, input: LazyList<T>) -> Outcomes<T, Z> {
        let build = self.build.clone();
        self.rules
            .chain(consumed, crumbs, input)
            .map(move |result| result.clone().map(|values| build(values)))
    }

    fn children(&self) -> Vec<Arc<dyn Erased>> {
        let mut children = Vec::new();
        self.rules.erase_into(&mut children);
        children.into_iter().map(|rule| rule.0).collect()
    }
}

/// A rule that matches each of `rules` in turn, combining their values with `build`.
///
/// For every outcome of the first rule: a failure is forwarded unchanged; a success continues with the second rule
/// from where the first left off, and so on. Once every rule has succeeded, `build` receives their values as a flat
/// tuple. The outcomes of an ambiguous sequence are every combination of its sub-rules' outcomes, ordered by the
/// first rule, then the second, and so on.
///
/// # Examples
///
/// ```
/// # use bramble::prelude::*;
/// let digit = select(|c: &char| c.to_digit(10));
/// let sum = seq((digit.clone(), just('+'), digit), |(a, _, b)| a + b);
///
/// assert_eq!(parse(&sum, vec!['3', '+', '4']), Ok(7));
/// assert_eq!(parse(&sum, vec!['3', '-', '4']).unwrap_err().messages(), vec!["Unexpected: -"]);
/// ```
#[track_caller]
pub fn seq<T, S, Z, F>(rules: S, build: F) -> Rule<T, Z>
where
    T: Clone + 'static,
    S: Rules<T>,
    Z: Clone + 'static,
    F: Fn(S::Output) -> Z + Send + Sync + 'static,
{
    let build = move |values: <S::List as RuleList<T>>::Values| build(S::flatten(values));
    Rule::from_kind(
        "seq",
        Kind::Sequence(Arc::new(SeqAdapter {
            rules: rules.into_list(),
            build: Arc::new(build),
        })),
    )
}

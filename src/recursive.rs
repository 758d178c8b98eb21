//! Recursive rules (rules that include themselves within their patterns).
//!
//! *“Arthur blinked at the screens and felt he was missing something important. Suddenly he realized what it was.”*
//!
//! The [`recursive()`] function covers most cases, but sometimes it's necessary to control the declaration and
//! definition of rules more carefully, particularly for mutually-recursive rules. In such cases, [`declare()`] and
//! [`Rule::define`] allow for this. [`lazy()`] defers building a rule until it is first needed.

use super::*;

pub(crate) struct LazyRef<T, R> {
    target: spin::Once<Rule<T, R>>,
    supplier: Option<Box<dyn Fn() -> Rule<T, R> + Send + Sync>>,
}

pub(crate) enum LazyHandle<T, R> {
    Owned(Arc<LazyRef<T, R>>),
    // Self-references inside a `recursive` definition, so the definition doesn't keep itself alive.
    Unowned(Weak<LazyRef<T, R>>),
}

impl<T, R> Clone for LazyHandle<T, R> {
    fn clone(&self) -> Self {
        match self {
            Self::Owned(x) => Self::Owned(x.clone()),
            Self::Unowned(x) => Self::Unowned(x.clone()),
        }
    }
}

impl<T, R> LazyHandle<T, R> {
    fn cell(&self) -> Arc<LazyRef<T, R>> {
        match self {
            Self::Owned(x) => x.clone(),
            Self::Unowned(x) => x.upgrade().expect("Recursive rule used before being defined"),
        }
    }

    // Resolves the rule this handle stands for, running the supplier the first time if there is one.
    pub(crate) fn target(&self) -> Rule<T, R> {
        let cell = self.cell();
        let rule = match &cell.supplier {
            Some(supplier) => cell.target.call_once(|| supplier()),
            None => cell.target.get().expect("Rule used before being defined"),
        };
        rule.clone()
    }
}

/// Construct a recursive rule (i.e: a rule that may contain itself as part of its pattern).
///
/// The given function must create the rule. The rule must not be used to parse input before this function returns.
///
/// # Examples
///
/// ```
/// # use bramble::prelude::*;
/// #[derive(Clone, Debug, PartialEq)]
/// enum Tree {
///     Leaf,
///     Branch(Box<Tree>),
/// }
///
/// // Nested parentheses around an `x`
/// let tree = recursive(|tree| one_of([
///     just('x').to(Tree::Leaf),
///     seq((just('('), tree, just(')')), |(_, inner, _)| Tree::Branch(Box::new(inner))),
/// ]));
/// let whole = seq((tree, end_of_input()), |(tree, ())| tree);
///
/// assert_eq!(parse(&whole, vec!['x']), Ok(Tree::Leaf));
/// assert_eq!(
///     parse(&whole, "((x))".chars().collect::<Vec<_>>()),
///     Ok(Tree::Branch(Box::new(Tree::Branch(Box::new(Tree::Leaf))))),
/// );
/// ```
#[track_caller]
pub fn recursive<T, R, F>(f: F) -> Rule<T, R>
where
    T: Clone + 'static,
    R: Clone + 'static,
    F: FnOnce(Rule<T, R>) -> Rule<T, R>,
{
    let info = RuleInfo::new("recursive");
    let cell = Arc::new_cyclic(|this| {
        let this = Rule::from_info(info.clone(), Kind::Lazy(LazyHandle::Unowned(this.clone())));
        LazyRef {
            target: spin::Once::initialized(f(this)),
            supplier: None,
        }
    });
    Rule::from_info(info, Kind::Lazy(LazyHandle::Owned(cell)))
}

/// A rule that is built by `supplier` the first time it is needed, and reused from then on.
///
/// This allows a rule to refer to rules that are defined after it. Resolution happens at most once, even if several
/// threads race to use the rule for the first time.
#[track_caller]
pub fn lazy<T, R, F>(supplier: F) -> Rule<T, R>
where
    T: Clone + 'static,
    R: Clone + 'static,
    F: Fn() -> Rule<T, R> + Send + Sync + 'static,
{
    Rule::from_kind(
        "lazy",
        Kind::Lazy(LazyHandle::Owned(Arc::new(LazyRef {
            target: spin::Once::new(),
            supplier: Some(Box::new(supplier)),
        }))),
    )
}

/// Declare the existence of a rule, allowing it to be used to build other rules before it is defined.
///
/// This should be followed by **exactly one** call to [`Rule::define`] before the rule is used for parsing.
///
/// # Examples
///
/// ```
/// # use bramble::prelude::*;
/// // A right-recursive chain of '+', counted
/// let chain = declare();
/// chain.define(one_of([
///     seq((just('+'), chain.clone()), |(_, n): (char, usize)| n + 1),
///     end_of_input().to(0),
/// ]));
///
/// assert_eq!(parse(&chain, vec!['+', '+', '+']), Ok(3));
/// ```
#[track_caller]
pub fn declare<T, R>() -> Rule<T, R>
where
    T: Clone + 'static,
    R: Clone + 'static,
{
    Rule::from_kind(
        "declare",
        Kind::Lazy(LazyHandle::Owned(Arc::new(LazyRef {
            target: spin::Once::new(),
            supplier: None,
        }))),
    )
}

impl<T: Clone + 'static, R: Clone + 'static> Rule<T, R> {
    /// Define a rule created with [`declare`].
    ///
    /// # Panics
    ///
    /// Panics if this rule was not created with [`declare`], or if it has already been defined.
    pub fn define(&self, rule: Rule<T, R>) {
        let cell = match self.kind() {
            Kind::Lazy(handle) => handle.cell(),
            _ => panic!("Only declared rules can be defined"),
        };
        assert!(cell.supplier.is_none(), "Only declared rules can be defined");
        let mut rule = Some(rule);
        cell.target
            .call_once(|| rule.take().expect("definition consumed more than once"));
        assert!(rule.is_none(), "Rule defined more than once");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        combinator::one_of,
        primitive::{end_of_input, just},
        sequence::seq,
    };

    fn depth() -> Rule<char, usize> {
        recursive(|nested| {
            one_of([
                just('x').to(0),
                seq((just('['), nested, just(']')), |(_, n, _)| n + 1),
            ])
        })
    }

    #[test]
    fn recursive_nesting() {
        let whole = seq((depth(), end_of_input()), |(n, ())| n);
        let input: Vec<char> = "[[[x]]]".chars().collect();
        assert_eq!(whole.outcomes(input).iter().find_map(|r| r.outcome.clone().ok()), Some(3));
    }

    #[test]
    fn self_reference_shares_identity() {
        let rule = depth();
        let Kind::Lazy(handle) = rule.kind() else { panic!("expected a lazy rule") };
        let body = handle.target();
        let Kind::Alternative(alternatives) = body.kind() else { panic!("expected alternatives") };
        let Kind::Sequence(adapter) = alternatives[1].kind() else { panic!("expected a sequence") };
        let children = adapter.children();
        assert_eq!(children[1].info().id(), rule.id());
    }

    #[test]
    fn lazy_resolves_once() {
        use core::sync::atomic::{AtomicUsize, Ordering};
        static BUILT: AtomicUsize = AtomicUsize::new(0);
        let rule = lazy(|| {
            BUILT.fetch_add(1, Ordering::SeqCst);
            just('a')
        });
        for _ in 0..3 {
            assert_eq!(rule.outcomes(vec!['a']).head().outcome, Ok('a'));
        }
        assert_eq!(BUILT.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn mutual_recursion() {
        // even := 'a' odd | end ; odd := 'a' even
        let even: Rule<char, usize> = declare();
        let odd: Rule<char, usize> = declare();
        even.define(one_of([
            seq((just('a'), odd.clone()), |(_, n)| n + 1),
            end_of_input().to(0),
        ]));
        odd.define(seq((just('a'), even.clone()), |(_, n)| n + 1));

        let first = |input: Vec<char>| {
            even.outcomes(input)
                .iter()
                .find_map(|r| r.outcome.clone().ok())
        };
        assert_eq!(first(vec!['a', 'a']), Some(2));
        assert_eq!(first(vec!['a', 'a', 'a']), None);
    }

    #[test]
    #[should_panic]
    fn define_twice_panics() {
        let rule: Rule<char, char> = declare();
        rule.define(just('a'));
        rule.define(just('b'));
    }

    #[test]
    #[should_panic]
    fn undefined_rule_panics() {
        let rule: Rule<char, char> = declare();
        rule.outcomes(vec!['a']);
    }
}

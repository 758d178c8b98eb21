//! The top-level parse entry points.
//!
//! *“The Answer to the Great Question... Of Life, the Universe and Everything... Is... Forty-two.”*
//!
//! A root rule produces a lazy stream of candidate outcomes. Parsing walks that stream in order and stops at the first
//! success, so later alternatives are never evaluated once something matches. If nothing matches, the failures that got
//! furthest through the input are returned.

use super::*;

use crate::analysis::{Analysis, Properties};

/// A grammar ready for parsing: a root rule, plus the properties of every rule reachable from it.
///
/// # Examples
///
/// ```
/// # use bramble::prelude::*;
/// let digit = select(|c: &char| c.to_digit(10));
/// let number = seq((repeat(digit), end_of_input()), |(digits, ())| {
///     digits.into_iter().fold(0, |n, d| n * 10 + d)
/// });
/// let parser = Parser::new(number);
///
/// assert_eq!(parser.parse("1234".chars().collect::<Vec<_>>()), Ok(1234));
/// assert!(parser.left_recursive_rules().is_empty());
/// ```
pub struct Parser<T, R> {
    root: Rule<T, R>,
    analysis: Analysis,
}

impl<T: Clone + 'static, R: Clone + 'static> Parser<T, R> {
    /// Analyse the grammar reachable from `root`.
    ///
    /// # Panics
    ///
    /// Panics if the grammar contains a [declared](crate::recursive::declare) rule that was never defined.
    pub fn new(root: Rule<T, R>) -> Self {
        let analysis = Analysis::of(root.erase());
        Self { root, analysis }
    }

    /// The root rule.
    pub fn root(&self) -> &Rule<T, R> {
        &self.root
    }

    /// The properties of `rule`, or `None` if it is not reachable from the root.
    pub fn properties<U, V>(&self, rule: &Rule<U, V>) -> Option<Properties> {
        self.analysis.properties(rule.id())
    }

    /// Every rule that can reach itself without consuming any tokens, in order of construction.
    ///
    /// Parsing with such a grammar reports [`Reason::LeftRecursion`] whenever the engine walks into the cycle.
    pub fn left_recursive_rules(&self) -> Vec<&RuleInfo> {
        self.analysis.left_recursive()
    }

    /// Parse a sequence of tokens, yielding the first successful outcome or the furthest failures.
    pub fn parse<I>(&self, tokens: I) -> Result<R, ParseErrors<T>>
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: 'static,
    {
        reduce(&self.root, LazyList::lazy(tokens), &Breadcrumbs::new())
    }

    /// Parse a sequence of tokens, also returning a trace of every rule invocation.
    ///
    /// You'll probably want to make sure that this doesn't end up in production code: it exists only to help you debug
    /// your grammar.
    pub fn parse_traced<I>(&self, tokens: I) -> (Result<R, ParseErrors<T>>, Vec<ParseEvent>)
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: 'static,
    {
        let session = Rc::new(Session::recording());
        let result = reduce(
            &self.root,
            LazyList::lazy(tokens),
            &Breadcrumbs::with_session(session.clone()),
        );
        (result, session.take())
    }

    /// Parse a sequence of tokens, printing a trace of every rule invocation to stdout.
    ///
    /// You'll probably want to make sure that this doesn't end up in production code: it exists only to help you debug
    /// your grammar. Additionally, its output format is quite likely to change in future versions.
    pub fn parse_verbose<I>(&self, tokens: I) -> Result<R, ParseErrors<T>>
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: 'static,
    {
        let (result, events) = self.parse_traced(tokens);
        debug::print(&events);
        result
    }
}

/// Parse a sequence of tokens with `rule`, without analysing the grammar first.
///
/// See [`Parser::parse`].
pub fn parse<T, R, I>(rule: &Rule<T, R>, tokens: I) -> Result<R, ParseErrors<T>>
where
    T: Clone + 'static,
    R: Clone + 'static,
    I: IntoIterator<Item = T>,
    I::IntoIter: 'static,
{
    reduce(rule, LazyList::lazy(tokens), &Breadcrumbs::new())
}

fn reduce<T: Clone + 'static, R: Clone + 'static>(
    root: &Rule<T, R>,
    input: LazyList<T>,
    crumbs: &Breadcrumbs,
) -> Result<R, ParseErrors<T>> {
    let mut furthest: Option<ParseErrors<T>> = None;
    let mut outcomes = call(root, 0, crumbs, input);
    loop {
        match &outcomes.head().outcome {
            Ok(value) => return Ok(value.clone()),
            // A defective grammar: nothing after this can be trusted.
            Err(error) if error.is_left_recursion() => return Err(ParseErrors::new(error.clone())),
            Err(error) => {
                furthest = Some(match furthest.take() {
                    Some(errors) => errors.merge(error.clone()),
                    None => ParseErrors::new(error.clone()),
                });
            }
        }
        outcomes = match outcomes.tail() {
            LazyList::NonEmpty(rest) => rest.clone(),
            LazyList::Empty => break,
        };
    }
    Err(furthest.expect("Parsing failed, but no errors were emitted. This is troubling, to say the least."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        combinator::one_of,
        primitive::{any, end_of_input, just},
        sequence::seq,
    };

    #[test]
    fn first_success_wins() {
        let a = one_of([just('x').to(1), any().to(2)]);
        assert_eq!(parse(&a, vec!['x']), Ok(1));
        assert_eq!(parse(&a, vec!['y']), Ok(2));
    }

    #[test]
    fn later_alternatives_are_not_evaluated() {
        let unreachable = any().map(|_| -> u8 { panic!("evaluated") });
        let rule = one_of([just('x').to(0u8), unreachable]);
        assert_eq!(parse(&rule, vec!['x']), Ok(0));
    }

    #[test]
    fn furthest_failures_are_kept() {
        let short = seq((any(), any(), just('!')), |_| ());
        let long = seq((any(), any(), any(), any(), just('!')), |_| ());
        let rule = seq((one_of([short, long]), end_of_input()), |_| ());
        let errors = parse(&rule, vec!['a', 'b', 'c', 'd', 'e']).unwrap_err();
        assert_eq!(errors.consumed(), 4);
        assert_eq!(errors.messages(), vec!["Unexpected: e"]);
    }

    #[test]
    fn traced_parse_records_entries() {
        let parser = Parser::new(seq((just('a'), end_of_input()), |_| ()).labelled("root"));
        let (result, events) = parser.parse_traced(vec!['a']);
        assert_eq!(result, Ok(()));
        assert_eq!(events[0].to_string().split(' ').nth(1), Some("root"));
        assert_eq!(events[0].depth(), 0);
        assert!(events.iter().any(|event| event.depth() == 1));
    }
}

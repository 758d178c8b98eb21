//! Cycle detection and the call wrapper every rule invocation goes through.
//!
//! Every time one rule invokes another it does so through [`call`], which records a breadcrumb of `(rule, consumed)`
//! on the current call path. Re-entering a rule at the position it was already entered at, without having consumed
//! anything in between, is the signature of left recursion: instead of recursing forever the engine yields a single
//! [`Reason::LeftRecursion`](crate::Reason::LeftRecursion) failure.

use super::*;

struct Crumb {
    rule: RuleId,
    consumed: usize,
    depth: usize,
    parent: Option<Rc<Crumb>>,
}

/// The chain of rules on the current call path, each with the position it was entered at.
///
/// Breadcrumbs are persistent: pushing shares the existing chain, so sibling branches of an alternative or sequence
/// only ever observe their own ancestors.
#[derive(Clone)]
pub struct Breadcrumbs {
    last: Option<Rc<Crumb>>,
    session: Rc<Session>,
}

impl Default for Breadcrumbs {
    fn default() -> Self {
        Self::new()
    }
}

impl Breadcrumbs {
    /// An empty call path that records no debugging events.
    pub fn new() -> Self {
        Self::with_session(Rc::new(Session::silent()))
    }

    pub(crate) fn with_session(session: Rc<Session>) -> Self {
        Self {
            last: None,
            session,
        }
    }

    /// The number of rules on the call path.
    pub fn depth(&self) -> usize {
        self.last.as_ref().map_or(0, |crumb| crumb.depth)
    }

    /// Returns `true` if `rule` is on the call path, having been entered after exactly `consumed` tokens.
    pub fn contains(&self, rule: RuleId, consumed: usize) -> bool {
        let mut next = self.last.as_deref();
        while let Some(crumb) = next {
            // Positions never decrease along a call path, so nothing further up can match.
            if crumb.consumed < consumed {
                return false;
            }
            if crumb.rule == rule && crumb.consumed == consumed {
                return true;
            }
            next = crumb.parent.as_deref();
        }
        false
    }

    pub(crate) fn push(&self, rule: RuleId, consumed: usize) -> Self {
        Self {
            last: Some(Rc::new(Crumb {
                rule,
                consumed,
                depth: self.depth() + 1,
                parent: self.last.clone(),
            })),
            session: self.session.clone(),
        }
    }

    pub(crate) fn session(&self) -> &Session {
        &self.session
    }
}

/// Invoke `rule` after `consumed` tokens, extending the call path.
///
/// If `rule` was already entered at this position on the current call path, a single left recursion failure is
/// produced instead.
pub fn call<T: Clone + 'static, R: Clone + 'static>(
    rule: &Rule<T, R>,
    consumed: usize,
    crumbs: &Breadcrumbs,
    input: LazyList<T>,
) -> Outcomes<T, R> {
    let info = rule.info();
    if crumbs.contains(info.id(), consumed) {
        crumbs.session().emit_with(|| ParseEvent::LeftRecursion {
            rule: info.clone(),
            consumed,
            depth: crumbs.depth(),
        });
        return NonEmpty::single(PartialResult::failure(
            ParseError::left_recursion(consumed, info.clone()),
            input,
        ));
    }

    crumbs.session().emit_with(|| ParseEvent::Enter {
        rule: info.clone(),
        consumed,
        depth: crumbs.depth(),
    });
    let crumbs = crumbs.push(info.id(), consumed);
    grow(|| rule.partial_parse(consumed, &crumbs, input))
}

#[cfg(feature = "stacker")]
pub(crate) fn grow<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(1024 * 64, 1024 * 1024, f)
}

#[cfg(not(feature = "stacker"))]
pub(crate) fn grow<R>(f: impl FnOnce() -> R) -> R {
    f()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn siblings_do_not_see_each_other() {
        let a = RuleId::fresh();
        let b = RuleId::fresh();
        let root = Breadcrumbs::new().push(a, 0);
        let left = root.push(b, 0);
        let right = root.push(a, 1);
        assert!(left.contains(b, 0));
        assert!(!right.contains(b, 0));
        assert!(right.contains(a, 0));
        assert!(right.contains(a, 1));
        assert!(!root.contains(a, 1));
        assert_eq!(right.depth(), 2);
    }

    #[test]
    fn lookup_stops_at_earlier_positions() {
        let a = RuleId::fresh();
        let crumbs = Breadcrumbs::new().push(a, 0).push(a, 2).push(a, 5);
        assert!(crumbs.contains(a, 2));
        assert!(!crumbs.contains(a, 3));
        assert!(!crumbs.contains(a, 7));
    }
}

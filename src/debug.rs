//! Utilities for debugging grammars.
//!
//! *“Time is an illusion. Lunchtime doubly so.”*
//!
//! [`Parser::parse_traced`] records a [`ParseEvent`] every time a rule is entered, and [`Parser::parse_verbose`]
//! prints those events as an indented trace. Ordinary parses record nothing.

use super::*;

/// An event that occurred during parsing.
#[derive(Clone, Debug, PartialEq)]
pub enum ParseEvent {
    /// A rule was entered.
    Enter {
        /// The rule.
        rule: RuleInfo,
        /// The number of tokens consumed before the rule was entered.
        consumed: usize,
        /// The length of the call path leading to the rule.
        depth: usize,
    },
    /// A rule was re-entered at the same position on its own call path, and was not invoked.
    LeftRecursion {
        /// The rule.
        rule: RuleInfo,
        /// The position at which the rule was re-entered.
        consumed: usize,
        /// The length of the call path leading to the rule.
        depth: usize,
    },
}

impl ParseEvent {
    /// The rule this event concerns.
    pub fn rule(&self) -> &RuleInfo {
        match self {
            Self::Enter { rule, .. } | Self::LeftRecursion { rule, .. } => rule,
        }
    }

    /// The length of the call path at which this event occurred.
    pub fn depth(&self) -> usize {
        match self {
            Self::Enter { depth, .. } | Self::LeftRecursion { depth, .. } => *depth,
        }
    }
}

impl fmt::Display for ParseEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Enter { rule, consumed, .. } => write!(
                f,
                "Entered {} at token {} (line {} in {})",
                rule,
                consumed,
                rule.location().line(),
                rule.location().file(),
            ),
            Self::LeftRecursion { rule, consumed, .. } => write!(
                f,
                "Left recursion into {} at token {} (line {} in {})",
                rule,
                consumed,
                rule.location().line(),
                rule.location().file(),
            ),
        }
    }
}

// Shared by every breadcrumb chain of a single parse.
pub(crate) struct Session {
    events: Option<RefCell<Vec<ParseEvent>>>,
}

impl Session {
    pub(crate) fn silent() -> Self {
        Self { events: None }
    }

    pub(crate) fn recording() -> Self {
        Self {
            events: Some(RefCell::new(Vec::new())),
        }
    }

    pub(crate) fn emit_with(&self, f: impl FnOnce() -> ParseEvent) {
        if let Some(events) = &self.events {
            events.borrow_mut().push(f());
        }
    }

    pub(crate) fn take(&self) -> Vec<ParseEvent> {
        self.events
            .as_ref()
            .map(|events| events.take())
            .unwrap_or_default()
    }
}

/// Print a trace of events to stdout, indented by call depth.
pub fn print(events: &[ParseEvent]) {
    for event in events {
        for _ in 0..event.depth() * 4 {
            print!(" ");
        }
        println!("{}", event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn silent_sessions_record_nothing() {
        let session = Session::silent();
        session.emit_with(|| unreachable!());
        assert!(session.take().is_empty());
    }

    #[test]
    fn recording_sessions_keep_order() {
        let session = Session::recording();
        for consumed in 0..3 {
            session.emit_with(|| ParseEvent::Enter {
                rule: RuleInfo::new("test"),
                consumed,
                depth: consumed,
            });
        }
        let events = session.take();
        assert_eq!(events.iter().map(ParseEvent::depth).collect::<Vec<_>>(), vec![0, 1, 2]);
        assert!(events[0].to_string().starts_with("Entered test#"));
        assert!(session.take().is_empty());
    }
}

//! Static analysis of rule graphs (nullability and left recursion).
//!
//! Properties are computed once, when a [`Parser`] is built, over the whole graph reachable from its root rule.
//! Nullability is computed as a least fixed point, so rules that can only be shown to match nothing through a cycle
//! of lazy references are still found.

use super::*;

use hashbrown::{HashMap, HashSet};

/// Facts about a rule, computed once per grammar.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Properties {
    /// Whether the rule can succeed without consuming any tokens.
    pub nullable: bool,
    /// Whether the rule can reach itself without consuming any tokens.
    ///
    /// Such a rule is reported with [`Reason::LeftRecursion`] whenever the engine walks into the cycle.
    pub left_recursive: bool,
}

enum Edges {
    Leaf(bool),
    // Any one child is matched.
    Choice(Vec<RuleId>),
    // Every child is matched, in order.
    Chain(Vec<RuleId>),
}

struct Entry {
    info: RuleInfo,
    edges: Edges,
    props: Properties,
}

pub(crate) struct Analysis {
    table: HashMap<RuleId, Entry>,
}

impl Analysis {
    pub(crate) fn of(root: Arc<dyn Erased>) -> Self {
        let mut table = HashMap::new();
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            let id = node.info().id();
            if table.contains_key(&id) {
                continue;
            }
            let mut visit = |children: Vec<Arc<dyn Erased>>| {
                children
                    .into_iter()
                    .map(|child| {
                        let id = child.info().id();
                        stack.push(child);
                        id
                    })
                    .collect()
            };
            let edges = match node.shape() {
                Shape::Leaf { nullable } => Edges::Leaf(nullable),
                Shape::Choice(children) => Edges::Choice(visit(children)),
                Shape::Chain(children) => Edges::Chain(visit(children)),
            };
            table.insert(
                id,
                Entry {
                    info: node.info().clone(),
                    edges,
                    props: Properties::default(),
                },
            );
        }

        let mut analysis = Self { table };
        analysis.solve_nullable();
        analysis.mark_left_recursion();
        analysis
    }

    pub(crate) fn properties(&self, id: RuleId) -> Option<Properties> {
        self.table.get(&id).map(|entry| entry.props)
    }

    pub(crate) fn left_recursive(&self) -> Vec<&RuleInfo> {
        let mut rules: Vec<_> = self
            .table
            .values()
            .filter(|entry| entry.props.left_recursive)
            .map(|entry| &entry.info)
            .collect();
        rules.sort_by_key(|info| info.id());
        rules
    }

    fn nullable(&self, id: RuleId) -> bool {
        self.table.get(&id).map_or(false, |entry| entry.props.nullable)
    }

    // Every rule starts out non-nullable and can only flip to nullable, so this terminates.
    fn solve_nullable(&mut self) {
        let ids: Vec<RuleId> = self.table.keys().copied().collect();
        loop {
            let mut changed = false;
            for id in &ids {
                if self.nullable(*id) {
                    continue;
                }
                let nullable = match &self.table[id].edges {
                    Edges::Leaf(nullable) => *nullable,
                    Edges::Choice(children) => children.iter().any(|child| self.nullable(*child)),
                    Edges::Chain(children) => children.iter().all(|child| self.nullable(*child)),
                };
                if nullable {
                    if let Some(entry) = self.table.get_mut(id) {
                        entry.props.nullable = true;
                        changed = true;
                    }
                }
            }
            if !changed {
                break;
            }
        }
    }

    // The rules that may be entered at the same position as `id`.
    fn leftmost(&self, id: RuleId) -> Vec<RuleId> {
        match self.table.get(&id).map(|entry| &entry.edges) {
            None | Some(Edges::Leaf(_)) => Vec::new(),
            Some(Edges::Choice(children)) => children.clone(),
            Some(Edges::Chain(children)) => {
                let mut leftmost = Vec::new();
                for child in children {
                    leftmost.push(*child);
                    if !self.nullable(*child) {
                        break;
                    }
                }
                leftmost
            }
        }
    }

    fn reaches_itself(&self, start: RuleId) -> bool {
        let mut seen = HashSet::new();
        let mut stack = self.leftmost(start);
        while let Some(id) = stack.pop() {
            if id == start {
                return true;
            }
            if seen.insert(id) {
                stack.extend(self.leftmost(id));
            }
        }
        false
    }

    fn mark_left_recursion(&mut self) {
        let recursive: Vec<RuleId> = self
            .table
            .keys()
            .copied()
            .filter(|id| self.reaches_itself(*id))
            .collect();
        for id in recursive {
            if let Some(entry) = self.table.get_mut(&id) {
                entry.props.left_recursive = true;
            }
        }
    }
}

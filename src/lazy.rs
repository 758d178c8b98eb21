//! Lazily-extended, memoized linked lists.
//!
//! *“The Guide is definitive. Reality is frequently inaccurate.”*
//!
//! A [`LazyList`] is the substrate for both the remaining input of a parse and the stream of candidate outcomes a rule
//! produces. Tails are computed on first access and then memoized, so many backtracking branches can walk the same
//! unconsumed suffix without ever recomputing it.

use super::*;

type Thunk<T> = Box<dyn FnOnce() -> LazyList<T>>;

struct Link<T> {
    head: T,
    tail: OnceCell<LazyList<T>>,
    pending: Cell<Option<Thunk<T>>>,
}

/// A lazy list that is known to contain at least one element.
///
/// Rules always produce at least one outcome, so their outcome streams are represented with this type.
pub struct NonEmpty<T>(Rc<Link<T>>);

/// A persistent singly linked list whose tails are computed on demand and memoized.
pub enum LazyList<T> {
    /// The empty list.
    Empty,
    /// A list with at least one element.
    NonEmpty(NonEmpty<T>),
}

impl<T> Clone for NonEmpty<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T> Clone for LazyList<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Empty => Self::Empty,
            Self::NonEmpty(list) => Self::NonEmpty(list.clone()),
        }
    }
}

impl<T> Default for LazyList<T> {
    fn default() -> Self {
        Self::Empty
    }
}

impl<T: 'static> NonEmpty<T> {
    /// Create a list from its first element and a function that computes the rest of it.
    ///
    /// The function is run at most once, the first time the tail is requested.
    pub fn new(head: T, tail: impl FnOnce() -> LazyList<T> + 'static) -> Self {
        Self(Rc::new(Link {
            head,
            tail: OnceCell::new(),
            pending: Cell::new(Some(Box::new(tail))),
        }))
    }

    /// Create a list with exactly one element.
    pub fn single(head: T) -> Self {
        Self::cons(head, LazyList::Empty)
    }

    /// Create a list from its first element and an already-computed tail.
    pub fn cons(head: T, tail: LazyList<T>) -> Self {
        Self(Rc::new(Link {
            head,
            tail: OnceCell::from(tail),
            pending: Cell::new(None),
        }))
    }

    /// The first element of the list.
    pub fn head(&self) -> &T {
        &self.0.head
    }

    /// The rest of the list, computing it if this is the first time it has been requested.
    ///
    /// # Panics
    ///
    /// Panics if the tail is requested while it is being computed (i.e: the list is defined in terms of itself).
    pub fn tail(&self) -> &LazyList<T> {
        self.0.tail.get_or_init(|| {
            let thunk = self
                .0
                .pending
                .take()
                .expect("lazy list tail forced while it was being computed");
            engine::grow(thunk)
        })
    }

    /// Returns `true` if the tail of this node has already been computed.
    pub fn is_forced(&self) -> bool {
        self.0.tail.get().is_some()
    }

    /// Lazily apply a function to every element of the list.
    ///
    /// The function is applied to the head immediately and to the remaining elements as they are requested.
    pub fn map<U: 'static>(&self, f: impl Fn(&T) -> U + 'static) -> NonEmpty<U> {
        self.map_shared(Rc::new(f))
    }

    fn map_shared<U: 'static>(&self, f: Rc<dyn Fn(&T) -> U>) -> NonEmpty<U> {
        let head = f(self.head());
        let this = self.clone();
        NonEmpty::new(head, move || match this.tail() {
            LazyList::Empty => LazyList::Empty,
            LazyList::NonEmpty(rest) => LazyList::NonEmpty(rest.map_shared(f)),
        })
    }

    /// Append the list produced by `that` to the end of this one.
    ///
    /// `that` is only run once the consumer walks past the last element of this list.
    pub fn concat(&self, that: impl FnOnce() -> LazyList<T> + 'static) -> NonEmpty<T>
    where
        T: Clone,
    {
        let this = self.clone();
        NonEmpty::new(self.head().clone(), move || this.tail().clone().concat(that))
    }

    /// Lazily replace every element with the list produced by `f`, flattening the results in order.
    pub fn flat_map<U: Clone + 'static>(&self, f: impl Fn(&T) -> NonEmpty<U> + 'static) -> NonEmpty<U> {
        self.flat_map_shared(Rc::new(f))
    }

    fn flat_map_shared<U: Clone + 'static>(&self, f: Rc<dyn Fn(&T) -> NonEmpty<U>>) -> NonEmpty<U> {
        let this = self.clone();
        let rest = f.clone();
        f(self.head()).concat(move || match this.tail() {
            LazyList::Empty => LazyList::Empty,
            LazyList::NonEmpty(tail) => LazyList::NonEmpty(tail.flat_map_shared(rest)),
        })
    }

    /// Iterate over references to the elements of the list, forcing tails as required.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter { next: Some(self) }
    }
}

impl<T: 'static> LazyList<T> {
    /// Create a lazy list that pulls its elements from an iterator on demand.
    ///
    /// Each element is pulled exactly once, no matter how many times the list is traversed.
    pub fn lazy<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: 'static,
    {
        Self::pull(iter.into_iter())
    }

    fn pull<I: Iterator<Item = T> + 'static>(mut iter: I) -> Self {
        match iter.next() {
            Some(head) => Self::NonEmpty(NonEmpty::new(head, move || Self::pull(iter))),
            None => Self::Empty,
        }
    }

    /// Returns `true` if the list contains no elements.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// The first element of the list, if any.
    pub fn head(&self) -> Option<&T> {
        match self {
            Self::Empty => None,
            Self::NonEmpty(list) => Some(list.head()),
        }
    }

    /// The rest of the list, if it is non-empty.
    pub fn tail(&self) -> Option<&LazyList<T>> {
        match self {
            Self::Empty => None,
            Self::NonEmpty(list) => Some(list.tail()),
        }
    }

    /// See [`NonEmpty::map`].
    pub fn map<U: 'static>(&self, f: impl Fn(&T) -> U + 'static) -> LazyList<U> {
        match self {
            Self::Empty => LazyList::Empty,
            Self::NonEmpty(list) => LazyList::NonEmpty(list.map(f)),
        }
    }

    /// Append the list produced by `that` to the end of this one.
    ///
    /// Appending to an empty list returns the appended list untouched, without wrapping it.
    pub fn concat(self, that: impl FnOnce() -> LazyList<T> + 'static) -> LazyList<T>
    where
        T: Clone,
    {
        match self {
            Self::Empty => that(),
            Self::NonEmpty(list) => Self::NonEmpty(list.concat(that)),
        }
    }

    /// Iterate over references to the elements of the list, forcing tails as required.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            next: match self {
                Self::Empty => None,
                Self::NonEmpty(list) => Some(list),
            },
        }
    }

    /// Force the whole list, collecting clones of its elements.
    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.iter().cloned().collect()
    }
}

impl<T: 'static> From<NonEmpty<T>> for LazyList<T> {
    fn from(list: NonEmpty<T>) -> Self {
        Self::NonEmpty(list)
    }
}

impl<T: 'static> From<Vec<T>> for LazyList<T> {
    fn from(items: Vec<T>) -> Self {
        items.into_iter().collect()
    }
}

impl<T: 'static> FromIterator<T> for LazyList<T> {
    /// Eagerly build a list from the items of an iterator. See [`LazyList::lazy`] for the lazy equivalent.
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let items: Vec<T> = iter.into_iter().collect();
        items
            .into_iter()
            .rev()
            .fold(Self::Empty, |tail, head| Self::NonEmpty(NonEmpty::cons(head, tail)))
    }
}

/// See [`LazyList::iter`].
pub struct Iter<'a, T> {
    next: Option<&'a NonEmpty<T>>,
}

impl<'a, T: 'static> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let list = self.next.take()?;
        if let LazyList::NonEmpty(rest) = list.tail() {
            self.next = Some(rest);
        }
        Some(list.head())
    }
}

impl<'a, T: 'static> IntoIterator for &'a LazyList<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// An owning iterator over the elements of a [`LazyList`], yielding clones.
pub struct IntoIter<T>(LazyList<T>);

impl<T: Clone + 'static> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        let (head, tail) = match &self.0 {
            LazyList::Empty => return None,
            LazyList::NonEmpty(list) => (list.head().clone(), list.tail().clone()),
        };
        self.0 = tail;
        Some(head)
    }
}

impl<T: Clone + 'static> IntoIterator for LazyList<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter(self)
    }
}

impl<T: fmt::Debug> fmt::Debug for LazyList<T> {
    /// Shows the elements that have been computed so far, followed by `..` if the rest is still pending.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut list = f.debug_list();
        let mut next = self;
        while let LazyList::NonEmpty(node) = next {
            list.entry(&node.0.head);
            match node.0.tail.get() {
                Some(tail) => next = tail,
                None => {
                    list.entry(&format_args!(".."));
                    break;
                }
            }
        }
        list.finish()
    }
}

impl<T: fmt::Debug> fmt::Debug for NonEmpty<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(&LazyList::NonEmpty(self.clone()), f)
    }
}

impl<T> Drop for NonEmpty<T> {
    // Unlink uniquely-owned tails one at a time so that long lists don't blow the stack when dropped.
    fn drop(&mut self) {
        let mut tail = match Rc::get_mut(&mut self.0) {
            Some(link) => link.tail.take(),
            None => return,
        };
        while let Some(LazyList::NonEmpty(mut node)) = tail {
            tail = match Rc::get_mut(&mut node.0) {
                Some(link) => link.tail.take(),
                None => None,
            };
        }
    }
}

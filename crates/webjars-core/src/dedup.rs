//! Deduplicating iteration over an ordered list of sources.

use std::collections::HashSet;
use std::hash::Hash;

/// Lazily chains several iterators, yielding each key only once.
///
/// Sources are drained in order. An element whose key was already produced
/// by an earlier element is skipped, so the first source wins. At most one
/// produced-but-unconsumed element is buffered (see [`DedupChain::peek`]).
///
/// The chain is finite when its sources are, and cannot be restarted.
///
/// # Example
///
/// ```rust
/// use webjars_core::DedupChain;
///
/// let first = vec!["a.js", "b.js"];
/// let second = vec!["b.js", "c.js"];
/// let merged: Vec<_> = DedupChain::new([first.into_iter(), second.into_iter()], |s: &&str| *s)
///     .collect();
/// assert_eq!(merged, vec!["a.js", "b.js", "c.js"]);
/// ```
pub struct DedupChain<I, K, F>
where
    I: Iterator,
{
    sources: std::vec::IntoIter<I>,
    current: Option<I>,
    key: F,
    seen: HashSet<K>,
    lookahead: Option<I::Item>,
}

impl<I, K, F> DedupChain<I, K, F>
where
    I: Iterator,
    K: Eq + Hash,
    F: FnMut(&I::Item) -> K,
{
    /// Creates a chain over `sources`, deduplicating by `key`.
    pub fn new(sources: impl IntoIterator<Item = I>, key: F) -> Self {
        let mut sources = sources.into_iter().collect::<Vec<_>>().into_iter();
        let current = sources.next();
        Self {
            sources,
            current,
            key,
            seen: HashSet::new(),
            lookahead: None,
        }
    }

    /// Returns the next element without consuming it.
    pub fn peek(&mut self) -> Option<&I::Item> {
        if self.lookahead.is_none() {
            self.lookahead = self.advance();
        }
        self.lookahead.as_ref()
    }

    fn advance(&mut self) -> Option<I::Item> {
        loop {
            let source = self.current.as_mut()?;
            match source.next() {
                Some(item) => {
                    if self.seen.insert((self.key)(&item)) {
                        return Some(item);
                    }
                }
                None => self.current = self.sources.next(),
            }
        }
    }
}

impl<I, K, F> Iterator for DedupChain<I, K, F>
where
    I: Iterator,
    K: Eq + Hash,
    F: FnMut(&I::Item) -> K,
{
    type Item = I::Item;

    fn next(&mut self) -> Option<Self::Item> {
        self.lookahead.take().or_else(|| self.advance())
    }
}

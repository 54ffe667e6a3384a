//! Vocabulary membership.
//!
//! The encoder never owns or loads a vocabulary; it only asks whether a
//! byte-level symbol is a known token. Anything that can answer that question
//! implements [`Vocabulary`]: sets of token strings, `token → id` maps as found
//! in `vocab.json` files, shared handles, or a plain predicate.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::hash::BuildHasher;
use std::sync::Arc;

/// Read-only membership test over byte-level symbols.
///
/// Implementations must be total and must answer the same way for the whole
/// lifetime of an encoder that uses them. A `Sync` implementation lets one
/// encoder be shared across threads.
pub trait Vocabulary {
    fn contains(&self, symbol: &str) -> bool;
}

impl<T: Vocabulary + ?Sized> Vocabulary for &T {
    #[inline]
    fn contains(&self, symbol: &str) -> bool {
        (**self).contains(symbol)
    }
}

impl<T: Vocabulary + ?Sized> Vocabulary for Arc<T> {
    #[inline]
    fn contains(&self, symbol: &str) -> bool {
        (**self).contains(symbol)
    }
}

impl<T: Vocabulary + ?Sized> Vocabulary for Box<T> {
    #[inline]
    fn contains(&self, symbol: &str) -> bool {
        (**self).contains(symbol)
    }
}

impl<S: BuildHasher> Vocabulary for HashSet<String, S> {
    #[inline]
    fn contains(&self, symbol: &str) -> bool {
        HashSet::contains(self, symbol)
    }
}

impl Vocabulary for BTreeSet<String> {
    #[inline]
    fn contains(&self, symbol: &str) -> bool {
        BTreeSet::contains(self, symbol)
    }
}

impl<V, S: BuildHasher> Vocabulary for HashMap<String, V, S> {
    #[inline]
    fn contains(&self, symbol: &str) -> bool {
        self.contains_key(symbol)
    }
}

impl<V> Vocabulary for BTreeMap<String, V> {
    #[inline]
    fn contains(&self, symbol: &str) -> bool {
        self.contains_key(symbol)
    }
}

/// Adapts a predicate into a [`Vocabulary`].
///
/// ```
/// use glossbpe::{FnVocabulary, Vocabulary};
///
/// let short_only = FnVocabulary(|s: &str| s.chars().count() <= 2);
/// assert!(short_only.contains("ab"));
/// assert!(!short_only.contains("abc"));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct FnVocabulary<F>(pub F);

impl<F: Fn(&str) -> bool> Vocabulary for FnVocabulary<F> {
    #[inline]
    fn contains(&self, symbol: &str) -> bool {
        (self.0)(symbol)
    }
}

//! Merge-priority table and its reverse.
//!
//! The [`MergeTable`] maps an adjacent symbol pair to the rank at which the
//! merge was learned; lower ranks merge first. The [`ReverseMergeTable`] maps
//! a merged string back to the pair that produced it and is only consulted
//! when an over-merged symbol has to be split again.

use rustc_hash::FxHashMap;
use std::convert::Infallible;
use std::fmt;

use super::encoder::EncoderError;

/// Merge priority. Lower values merge earlier.
pub type Rank = u32;

/// An ordered pair of adjacent symbols. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pair {
    left: String,
    right: String,
}

impl Pair {
    pub fn new(left: impl Into<String>, right: impl Into<String>) -> Self {
        Self {
            left: left.into(),
            right: right.into(),
        }
    }

    pub fn left(&self) -> &str {
        &self.left
    }

    pub fn right(&self) -> &str {
        &self.right
    }

    /// The symbol produced by merging this pair.
    pub fn merged(&self) -> String {
        let mut merged = String::with_capacity(self.left.len() + self.right.len());
        merged.push_str(&self.left);
        merged.push_str(&self.right);
        merged
    }
}

impl<L: Into<String>, R: Into<String>> From<(L, R)> for Pair {
    fn from((left, right): (L, R)) -> Self {
        Self::new(left, right)
    }
}

impl fmt::Display for Pair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:?}, {:?})", self.left, self.right)
    }
}

/// Immutable pair → rank mapping.
///
/// Stored as `left → (right → rank)` so lookups borrow `&str` from the
/// symbols being merged instead of allocating a key per probe.
#[derive(Debug, Clone, Default)]
pub struct MergeTable {
    ranks: FxHashMap<String, FxHashMap<String, Rank>>,
    len: usize,
}

impl MergeTable {
    /// Build a table from pairs with explicit ranks.
    ///
    /// If a pair is listed more than once the lowest rank is kept. Pairs with
    /// an empty side are ignored.
    pub fn from_ranks<I, P>(ranks: I) -> Self
    where
        I: IntoIterator<Item = (P, Rank)>,
        P: Into<Pair>,
    {
        let mut table = Self::default();
        for (pair, rank) in ranks {
            table.insert(pair.into(), rank);
        }
        table
    }

    /// Build a table from merges in learned order; a merge's position is its rank.
    ///
    /// If a pair is listed more than once its first position is kept.
    pub fn from_merges<I, P>(merges: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Pair>,
    {
        Self::from_ranks(merges.into_iter().zip(0..))
    }

    fn insert(&mut self, pair: Pair, rank: Rank) {
        // symbols are never empty, so such a merge could never fire
        if pair.left.is_empty() || pair.right.is_empty() {
            tracing::debug!(pair = %pair, rank, "skipping merge with an empty side");
            return;
        }
        let rights = self.ranks.entry(pair.left).or_default();
        match rights.get_mut(&pair.right) {
            Some(existing) => *existing = (*existing).min(rank),
            None => {
                rights.insert(pair.right, rank);
                self.len += 1;
            }
        }
    }

    /// Rank of merging `left` followed by `right`, if that merge was learned.
    #[inline]
    pub fn rank(&self, left: &str, right: &str) -> Option<Rank> {
        self.ranks.get(left)?.get(right).copied()
    }

    pub fn contains(&self, left: &str, right: &str) -> bool {
        self.rank(left, right).is_some()
    }

    /// Number of distinct pairs.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Iterate over `(left, right, rank)` in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, Rank)> + '_ {
        self.ranks.iter().flat_map(|(left, rights)| {
            rights
                .iter()
                .map(move |(right, &rank)| (left.as_str(), right.as_str(), rank))
        })
    }

    /// All pairs sorted by ascending rank, ties broken by pair order.
    pub fn sorted_by_rank(&self) -> Vec<(Pair, Rank)> {
        let mut pairs: Vec<(Pair, Rank)> = self
            .iter()
            .map(|(left, right, rank)| (Pair::new(left, right), rank))
            .collect();
        pairs.sort_unstable_by(|(pa, ra), (pb, rb)| ra.cmp(rb).then_with(|| pa.cmp(pb)));
        pairs
    }
}

/// What to do when two merge pairs concatenate to the same string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CollisionPolicy {
    /// Keep the pair with the higher rank, silently.
    #[default]
    LastWriteWins,
    /// Keep the pair with the higher rank and log each collision.
    Warn,
    /// Refuse to build the table.
    Reject,
}

/// Merged string → originating pair.
#[derive(Debug, Clone, Default)]
pub struct ReverseMergeTable {
    origins: FxHashMap<String, Pair>,
    collisions: usize,
}

impl ReverseMergeTable {
    /// Derive the reverse table with last-write-wins on collisions.
    ///
    /// Merges are visited in ascending rank order, so when two pairs produce
    /// the same string the higher-ranked one is kept.
    pub fn new(merges: &MergeTable) -> Self {
        match Self::derive(merges, |_, _, _| Ok::<(), Infallible>(())) {
            Ok(table) => table,
            Err(never) => match never {},
        }
    }

    /// Derive the reverse table, resolving collisions according to `policy`.
    pub fn build(merges: &MergeTable, policy: CollisionPolicy) -> Result<Self, EncoderError> {
        Self::derive(merges, |merged, previous, pair| match policy {
            CollisionPolicy::LastWriteWins => Ok(()),
            CollisionPolicy::Warn => {
                tracing::warn!(
                    merged = %merged,
                    kept = %pair,
                    dropped = %previous,
                    "merge pairs collide in reverse table"
                );
                Ok(())
            }
            CollisionPolicy::Reject => Err(EncoderError::ReverseMergeCollision {
                merged: merged.to_owned(),
                first: previous.clone(),
                second: pair.clone(),
            }),
        })
    }

    fn derive<E>(
        merges: &MergeTable,
        mut on_collision: impl FnMut(&str, &Pair, &Pair) -> Result<(), E>,
    ) -> Result<Self, E> {
        let mut origins: FxHashMap<String, Pair> = FxHashMap::default();
        origins.reserve(merges.len());
        let mut collisions = 0;

        for (pair, _) in merges.sorted_by_rank() {
            let merged = pair.merged();
            if let Some(previous) = origins.get(&merged) {
                on_collision(&merged, previous, &pair)?;
                collisions += 1;
            }
            origins.insert(merged, pair);
        }

        Ok(Self {
            origins,
            collisions,
        })
    }

    /// The pair that produced `merged`, or `None` for an irreducible symbol.
    #[inline]
    pub fn origin(&self, merged: &str) -> Option<&Pair> {
        self.origins.get(merged)
    }

    pub fn contains(&self, merged: &str) -> bool {
        self.origins.contains_key(merged)
    }

    pub fn len(&self) -> usize {
        self.origins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.origins.is_empty()
    }

    /// How many pairs were overwritten while building.
    pub fn collisions(&self) -> usize {
        self.collisions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_lookup() {
        let table = MergeTable::from_ranks([(("t", "h"), 0), (("th", "e"), 1)]);
        assert_eq!(table.rank("t", "h"), Some(0));
        assert_eq!(table.rank("th", "e"), Some(1));
        assert_eq!(table.rank("h", "t"), None);
        assert_eq!(table.rank("e", "th"), None);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_from_merges_assigns_positions() {
        let table = MergeTable::from_merges([("a", "b"), ("ab", "c"), ("x", "y")]);
        assert_eq!(table.rank("a", "b"), Some(0));
        assert_eq!(table.rank("ab", "c"), Some(1));
        assert_eq!(table.rank("x", "y"), Some(2));
    }

    #[test]
    fn test_duplicate_pair_keeps_lowest_rank() {
        let table = MergeTable::from_merges([("a", "b"), ("c", "d"), ("a", "b")]);
        assert_eq!(table.rank("a", "b"), Some(0));
        assert_eq!(table.len(), 2);

        let table = MergeTable::from_ranks([(("a", "b"), 7), (("a", "b"), 3)]);
        assert_eq!(table.rank("a", "b"), Some(3));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_empty_side_ignored() {
        let table = MergeTable::from_merges([("", "abc"), ("a", "b")]);
        assert_eq!(table.len(), 1);
        assert_eq!(table.rank("", "abc"), None);
        assert_eq!(table.rank("a", "b"), Some(1));
    }

    #[test]
    fn test_sorted_by_rank() {
        let table = MergeTable::from_ranks([(("b", "c"), 5), (("a", "b"), 2), (("c", "d"), 9)]);
        let ranks: Vec<Rank> = table.sorted_by_rank().into_iter().map(|(_, r)| r).collect();
        assert_eq!(ranks, vec![2, 5, 9]);
    }

    #[test]
    fn test_reverse_table_covers_every_pair() {
        let table = MergeTable::from_merges([("t", "h"), ("th", "e"), ("Ġ", "the")]);
        let reverse = ReverseMergeTable::build(&table, CollisionPolicy::default()).unwrap();
        for (left, right, _) in table.iter() {
            let merged = format!("{left}{right}");
            assert_eq!(reverse.origin(&merged), Some(&Pair::new(left, right)));
        }
        assert_eq!(reverse.len(), 3);
        assert!(reverse.origin("t").is_none());
    }

    #[test]
    fn test_collision_last_write_wins() {
        // "abc" can come from (a, bc) or (ab, c)
        let table = MergeTable::from_ranks([(("ab", "c"), 4), (("a", "bc"), 1)]);
        let reverse = ReverseMergeTable::build(&table, CollisionPolicy::LastWriteWins).unwrap();
        assert_eq!(reverse.origin("abc"), Some(&Pair::new("ab", "c")));
        assert_eq!(reverse.collisions(), 1);

        let infallible = ReverseMergeTable::new(&table);
        assert_eq!(infallible.origin("abc"), Some(&Pair::new("ab", "c")));
    }

    #[test]
    fn test_collision_warn_keeps_later_pair() {
        let table = MergeTable::from_ranks([(("ab", "c"), 1), (("a", "bc"), 4)]);
        let reverse = ReverseMergeTable::build(&table, CollisionPolicy::Warn).unwrap();
        assert_eq!(reverse.origin("abc"), Some(&Pair::new("a", "bc")));
    }

    #[test]
    fn test_collision_reject() {
        let table = MergeTable::from_ranks([(("ab", "c"), 1), (("a", "bc"), 4)]);
        let err = ReverseMergeTable::build(&table, CollisionPolicy::Reject).unwrap_err();
        match err {
            EncoderError::ReverseMergeCollision {
                merged,
                first,
                second,
            } => {
                assert_eq!(merged, "abc");
                assert_eq!(first, Pair::new("ab", "c"));
                assert_eq!(second, Pair::new("a", "bc"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_pair_display_and_merge() {
        let pair = Pair::from(("Ġ", "the"));
        assert_eq!((pair.left(), pair.right()), ("Ġ", "the"));
        assert_eq!(pair.merged(), "Ġthe");
        assert_eq!(pair.to_string(), "(\"Ġ\", \"the\")");
    }
}

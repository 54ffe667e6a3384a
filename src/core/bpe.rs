//! The two halves of byte-level BPE encoding for a single token.
//!
//! [`byte_pair_merge`] greedily applies the lowest-ranked adjacent merge until
//! none applies. [`split_to_vocab`] then walks the reverse merge table to
//! undo merges whose result is not in the vocabulary.

use super::merges::{MergeTable, Rank, ReverseMergeTable};
use super::vocab::Vocabulary;

/// Counters describing the work done for one encode call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EncodeStats {
    /// Merge-loop rounds that rewrote the symbol sequence.
    pub merges_applied: usize,
    /// Symbols decomposed through the reverse merge table.
    pub backtrack_splits: usize,
}

impl EncodeStats {
    /// Whether any output token came from undoing a merge.
    pub fn backtracked(&self) -> bool {
        self.backtrack_splits > 0
    }
}

/// Index of the left-most adjacent pair with the lowest rank, if any pair is ranked.
fn select_pair(symbols: &[String], merges: &MergeTable) -> Option<usize> {
    let mut best: Option<(Rank, usize)> = None;
    for (i, window) in symbols.windows(2).enumerate() {
        let Some(rank) = merges.rank(&window[0], &window[1]) else {
            continue;
        };
        // strict: an equal rank further right never displaces the current pick
        if best.map_or(true, |(best_rank, _)| rank < best_rank) {
            best = Some((rank, i));
        }
    }
    best.map(|(_, i)| i)
}

/// Rewrite `symbols` in one left-to-right pass, joining every non-overlapping
/// occurrence of `left` immediately followed by `right`.
fn apply_merge(symbols: Vec<String>, left: &str, right: &str) -> Vec<String> {
    let mut merged = Vec::with_capacity(symbols.len());
    let mut iter = symbols.into_iter().peekable();
    while let Some(mut symbol) = iter.next() {
        if symbol == left {
            if let Some(next) = iter.next_if(|next| next == right) {
                symbol.push_str(&next);
            }
        }
        merged.push(symbol);
    }
    merged
}

/// Run the merge loop over initial symbols.
///
/// Each round picks the left-most pair of minimum rank and merges every
/// occurrence of it. The loop stops when fewer than two symbols remain or no
/// adjacent pair is ranked. Every round shrinks the sequence, so at most
/// `symbols.len() - 1` rounds run.
pub fn byte_pair_merge(
    mut symbols: Vec<String>,
    merges: &MergeTable,
    stats: &mut EncodeStats,
) -> Vec<String> {
    while symbols.len() >= 2 {
        let Some(index) = select_pair(&symbols, merges) else {
            break;
        };
        let left = symbols[index].clone();
        let right = symbols[index + 1].clone();
        symbols = apply_merge(symbols, &left, &right);
        stats.merges_applied += 1;
    }
    symbols
}

/// Replace every symbol missing from `vocab` with the smallest pieces that
/// are either in `vocab` or cannot be split any further.
///
/// Symbols without an entry in `reverse` are irreducible and are emitted
/// unchanged, known to the vocabulary or not, so nothing is ever dropped.
pub fn split_to_vocab<V: Vocabulary + ?Sized>(
    symbols: Vec<String>,
    vocab: &V,
    reverse: &ReverseMergeTable,
    stats: &mut EncodeStats,
) -> Vec<String> {
    let mut tokens = Vec::with_capacity(symbols.len());
    for symbol in symbols {
        if vocab.contains(&symbol) {
            tokens.push(symbol);
        } else {
            split_symbol(&symbol, vocab, reverse, &mut tokens, stats);
        }
    }
    tokens
}

fn split_symbol<V: Vocabulary + ?Sized>(
    symbol: &str,
    vocab: &V,
    reverse: &ReverseMergeTable,
    out: &mut Vec<String>,
    stats: &mut EncodeStats,
) {
    let Some(pair) = reverse.origin(symbol) else {
        out.push(symbol.to_owned());
        return;
    };
    stats.backtrack_splits += 1;

    for side in [pair.left(), pair.right()] {
        if vocab.contains(side) {
            out.push(side.to_owned());
        } else {
            split_symbol(side, vocab, reverse, out, stats);
        }
    }
}

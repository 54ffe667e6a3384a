//! Shared fixtures for integration tests.
//!
//! The merge list is the head of the GPT-2 merge table, which is enough to
//! exercise rank ordering, space handling and backtracking on short words.

#![allow(dead_code)]

use glossbpe::{byte_level_encode, Encoder, MergeTable};
use rustc_hash::FxHashSet;

/// First GPT-2 merges, in learned order (position = rank).
pub const GPT2_HEAD_MERGES: &[(&str, &str)] = &[
    ("Ġ", "t"),
    ("Ġ", "a"),
    ("h", "e"),
    ("i", "n"),
    ("r", "e"),
    ("o", "n"),
    ("Ġt", "he"),
    ("e", "r"),
    ("Ġ", "s"),
    ("a", "t"),
    ("Ġ", "w"),
    ("Ġ", "o"),
    ("e", "n"),
    ("Ġ", "c"),
    ("i", "t"),
    ("i", "s"),
    ("a", "n"),
    ("o", "r"),
    ("e", "s"),
    ("Ġ", "b"),
    ("e", "d"),
    ("Ġ", "f"),
    ("in", "g"),
];

pub fn gpt2_head_merges() -> MergeTable {
    MergeTable::from_merges(GPT2_HEAD_MERGES.iter().copied())
}

/// Every single-byte symbol plus every merge result, minus `missing`.
pub fn gpt2_head_vocab(missing: &[&str]) -> FxHashSet<String> {
    let bytes = (0u8..=255).map(|b| byte_level_encode(&[b]));
    let merged = GPT2_HEAD_MERGES.iter().map(|(l, r)| format!("{l}{r}"));
    bytes
        .chain(merged)
        .filter(|token| !missing.contains(&token.as_str()))
        .collect()
}

pub fn create_gpt2_head_encoder() -> Encoder<FxHashSet<String>> {
    Encoder::new(gpt2_head_vocab(&[]), gpt2_head_merges())
}

pub fn vocab(tokens: &[&str]) -> FxHashSet<String> {
    tokens.iter().map(|s| s.to_string()).collect()
}

//! Core encoding engine for glossbpe.
//!
//! This module contains the byte-level BPE encoder and the tables it reads:
//! - Byte-level alphabet mapping every byte to a printable character
//! - Glossary splitting that keeps protected strings whole
//! - Merge-rank table and its reverse for undoing merges
//! - Vocabulary membership trait
//! - Main encoder with an optional sharded LRU cache
//!
//! # Architecture
//!
//! - [`Encoder`]: Owns the merge tables and drives the pipeline
//! - [`byte_level`]: Byte ↔ character alphabet
//! - [`Glossary`]: Aho-Corasick matcher for protected strings
//! - [`MergeTable`] / [`ReverseMergeTable`]: Pair → rank and merged string → pair
//! - [`Vocabulary`]: Membership oracle supplied by the caller
//! - [`byte_pair_merge`] / [`split_to_vocab`]: The merge loop and the backtracking split
//!
//! Every table is read-only after construction, so an [`Encoder`] can be
//! shared across threads.

mod bpe;
pub mod byte_level;
mod cache;
mod encoder;
mod glossary;
mod merges;
mod vocab;

pub use bpe::{byte_pair_merge, split_to_vocab, EncodeStats};
pub use byte_level::{byte_level_decode, byte_level_encode};
pub use cache::DEFAULT_CACHE_SIZE;
pub use encoder::{Encoder, EncoderError, EncoderOptions};
pub use glossary::{Glossary, DEFAULT_GLOSSARY};
pub use merges::{CollisionPolicy, MergeTable, Pair, Rank, ReverseMergeTable};
pub use vocab::{FnVocabulary, Vocabulary};

pub mod core;
#[cfg(feature = "python")]
mod python;

pub use core::{
    byte_level_decode, byte_level_encode, byte_pair_merge, split_to_vocab, CollisionPolicy,
    EncodeStats, Encoder, EncoderError, EncoderOptions, FnVocabulary, Glossary, MergeTable, Pair,
    Rank, ReverseMergeTable, Vocabulary, DEFAULT_CACHE_SIZE, DEFAULT_GLOSSARY,
};

use thiserror::Error;

use super::bpe::{byte_pair_merge, split_to_vocab, EncodeStats};
use super::byte_level::byte_level_encode;
use super::cache::EncodeCache;
use super::glossary::Glossary;
use super::merges::{CollisionPolicy, MergeTable, Pair, ReverseMergeTable};
use super::vocab::Vocabulary;

#[derive(Error, Debug)]
pub enum EncoderError {
    #[error("Glossary entries must not be empty")]
    EmptyGlossaryEntry,
    #[error("Aho-Corasick build error: {0}")]
    AhoCorasickError(#[from] aho_corasick::BuildError),
    #[error("Merge pairs {first} and {second} both produce {merged:?}")]
    ReverseMergeCollision {
        merged: String,
        first: Pair,
        second: Pair,
    },
}

/// Construction options for [`Encoder::with_options`].
///
/// ```
/// use glossbpe::{CollisionPolicy, EncoderOptions, DEFAULT_CACHE_SIZE};
///
/// let options = EncoderOptions::default()
///     .cache_size(DEFAULT_CACHE_SIZE)
///     .glossary(["e.g", "i.e"])
///     .collision_policy(CollisionPolicy::Warn);
/// assert_eq!(options.cache_size, DEFAULT_CACHE_SIZE);
/// ```
#[derive(Debug, Clone, Default)]
pub struct EncoderOptions {
    /// Capacity of the result cache; 0 disables it.
    pub cache_size: usize,
    /// Protected entries. `None` uses [`DEFAULT_GLOSSARY`](crate::DEFAULT_GLOSSARY).
    pub glossary: Option<Vec<String>>,
    /// How to treat merges that concatenate to the same string.
    pub collision_policy: CollisionPolicy,
}

impl EncoderOptions {
    pub fn cache_size(mut self, cache_size: usize) -> Self {
        self.cache_size = cache_size;
        self
    }

    pub fn glossary<I, S>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.glossary = Some(entries.into_iter().map(Into::into).collect());
        self
    }

    pub fn collision_policy(mut self, policy: CollisionPolicy) -> Self {
        self.collision_policy = policy;
        self
    }
}

/// Byte-level BPE encoder over a fixed merge table and vocabulary.
///
/// Encoding a token runs four stages:
///
/// 1. map its UTF-8 bytes onto the byte-level alphabet,
/// 2. split the result into characters, keeping glossary entries whole,
/// 3. merge adjacent symbols by ascending merge rank,
/// 4. split any merged symbol the vocabulary does not know back into known
///    (or irreducible) pieces.
///
/// The encoder never changes after construction, so `encode` is a pure
/// function of its input and one instance can serve many threads when the
/// vocabulary is `Sync`. The optional cache does not change results.
///
/// # Example
///
/// ```
/// use std::collections::HashSet;
/// use glossbpe::{Encoder, MergeTable};
///
/// let vocab: HashSet<String> = ["t", "h", "e"].iter().map(|s| s.to_string()).collect();
/// let merges = MergeTable::from_merges([("t", "h"), ("th", "e")]);
/// let encoder = Encoder::new(vocab, merges);
///
/// // "the" is merged, then split back because the vocabulary lacks it
/// assert_eq!(encoder.encode("the"), vec!["t", "h", "e"]);
/// ```
pub struct Encoder<V> {
    vocab: V,
    merges: MergeTable,
    reverse: ReverseMergeTable,
    glossary: Option<Glossary>,
    cache: Option<EncodeCache>,
}

impl<V: Vocabulary> Encoder<V> {
    /// Create an encoder with the default glossary, no cache, and
    /// last-write-wins resolution of reverse-merge collisions.
    pub fn new(vocab: V, merges: MergeTable) -> Self {
        let reverse = ReverseMergeTable::new(&merges);
        log_built(&merges, &reverse, Glossary::default_ref(), 0);
        Self {
            vocab,
            merges,
            reverse,
            glossary: None,
            cache: None,
        }
    }

    /// Create an encoder with explicit options.
    ///
    /// Fails if the glossary cannot be compiled, or if `options.collision_policy`
    /// is [`CollisionPolicy::Reject`] and two merges produce the same string.
    pub fn with_options(
        vocab: V,
        merges: MergeTable,
        options: EncoderOptions,
    ) -> Result<Self, EncoderError> {
        let reverse = ReverseMergeTable::build(&merges, options.collision_policy)?;
        let glossary = options.glossary.map(Glossary::new).transpose()?;
        let cache = EncodeCache::new(options.cache_size);

        log_built(
            &merges,
            &reverse,
            glossary.as_ref().unwrap_or(Glossary::default_ref()),
            options.cache_size,
        );

        Ok(Self {
            vocab,
            merges,
            reverse,
            glossary,
            cache,
        })
    }

    /// Replace the result cache with one of `cache_size` entries (0 disables it).
    pub fn with_cache(mut self, cache_size: usize) -> Self {
        self.cache = EncodeCache::new(cache_size);
        self
    }

    /// Encode one token into byte-level subword symbols.
    ///
    /// Total over all inputs; the empty string encodes to an empty sequence.
    pub fn encode(&self, token: &str) -> Vec<String> {
        self.encode_bytes(token.as_bytes())
    }

    /// Encode raw bytes, which need not be valid UTF-8.
    pub fn encode_bytes(&self, bytes: &[u8]) -> Vec<String> {
        match &self.cache {
            Some(cache) => cache.get_or_compute(bytes, || self.encode_uncached(bytes).0),
            None => self.encode_uncached(bytes).0,
        }
    }

    /// Encode one token and report how much merging and backtracking it took.
    ///
    /// Always bypasses the cache so the counters describe real work.
    pub fn encode_with_stats(&self, token: &str) -> (Vec<String>, EncodeStats) {
        self.encode_uncached(token.as_bytes())
    }

    fn encode_uncached(&self, bytes: &[u8]) -> (Vec<String>, EncodeStats) {
        let mut stats = EncodeStats::default();
        if bytes.is_empty() {
            return (Vec::new(), stats);
        }

        let text = byte_level_encode(bytes);
        let symbols: Vec<String> = self
            .glossary()
            .split(&text)
            .into_iter()
            .map(str::to_owned)
            .collect();
        let merged = byte_pair_merge(symbols, &self.merges, &mut stats);
        let tokens = split_to_vocab(merged, &self.vocab, &self.reverse, &mut stats);

        if stats.backtracked() {
            tracing::trace!(
                token = %text,
                backtrack_splits = stats.backtrack_splits,
                "split over-merged symbols"
            );
        }
        (tokens, stats)
    }

    pub fn vocabulary(&self) -> &V {
        &self.vocab
    }

    pub fn merge_table(&self) -> &MergeTable {
        &self.merges
    }

    pub fn reverse_merge_table(&self) -> &ReverseMergeTable {
        &self.reverse
    }

    /// The glossary in use: a custom one, or the process-wide default.
    pub fn glossary(&self) -> &Glossary {
        self.glossary.as_ref().unwrap_or(Glossary::default_ref())
    }

    /// Number of cached entries (0 when caching is off).
    pub fn cache_len(&self) -> usize {
        self.cache.as_ref().map_or(0, EncodeCache::len)
    }

    /// Configured cache capacity (0 when caching is off).
    pub fn cache_capacity(&self) -> usize {
        self.cache.as_ref().map_or(0, EncodeCache::capacity)
    }

    /// Clear the encoding cache.
    pub fn clear_cache(&self) {
        if let Some(cache) = &self.cache {
            cache.clear();
        }
    }
}

fn log_built(
    merges: &MergeTable,
    reverse: &ReverseMergeTable,
    glossary: &Glossary,
    cache_size: usize,
) {
    tracing::debug!(
        merges = merges.len(),
        reverse_entries = reverse.len(),
        reverse_collisions = reverse.collisions(),
        glossary_entries = glossary.len(),
        cache_size,
        "built BPE encoder"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::byte_level::byte_level_decode;
    use rustc_hash::FxHashSet;

    fn vocab(tokens: &[&str]) -> FxHashSet<String> {
        tokens.iter().map(|s| s.to_string()).collect()
    }

    fn the_merges() -> MergeTable {
        MergeTable::from_ranks([(("t", "h"), 0), (("th", "e"), 1)])
    }

    #[test]
    fn test_encode_known_word() {
        let encoder = Encoder::new(vocab(&["the", "t", "h", "e"]), the_merges());
        assert_eq!(encoder.encode("the"), vec!["the"]);
    }

    #[test]
    fn test_encode_backtracks_unknown_word() {
        let encoder = Encoder::new(vocab(&["t", "h", "e"]), the_merges());
        let (tokens, stats) = encoder.encode_with_stats("the");
        assert_eq!(tokens, vec!["t", "h", "e"]);
        assert_eq!(stats.merges_applied, 2);
        assert_eq!(stats.backtrack_splits, 2);
    }

    #[test]
    fn test_encode_empty() {
        let encoder = Encoder::new(vocab(&[]), the_merges());
        assert!(encoder.encode("").is_empty());
        assert!(encoder.encode_bytes(&[]).is_empty());
    }

    #[test]
    fn test_glossary_entry_survives_merges() {
        let merges = MergeTable::from_merges([("e", "."), (".", "g")]);
        let encoder = Encoder::new(vocab(&[]), merges);
        let (tokens, stats) = encoder.encode_with_stats("e.g");
        assert_eq!(tokens, vec!["e.g"]);
        assert_eq!(stats.merges_applied, 0);
    }

    #[test]
    fn test_glossary_fragment_merges_with_neighbours() {
        let merges = MergeTable::from_merges([("x", "e.g")]);
        let encoder = Encoder::new(vocab(&["xe.g"]), merges);
        assert_eq!(encoder.encode("xe.g"), vec!["xe.g"]);
    }

    #[test]
    fn test_space_is_byte_mapped() {
        let merges = MergeTable::from_merges([("Ġ", "t"), ("Ġt", "h"), ("Ġth", "e")]);
        let encoder = Encoder::new(vocab(&["Ġthe"]), merges);
        assert_eq!(encoder.encode(" the"), vec!["Ġthe"]);
    }

    #[test]
    fn test_binary_input_roundtrips() {
        let encoder = Encoder::new(vocab(&[]), the_merges());
        let bytes = [0u8, 0xff, 0x80, b't', b'h'];
        let tokens = encoder.encode_bytes(&bytes);
        assert_eq!(tokens.len(), 5);
        assert_eq!(byte_level_decode(&tokens.concat()).unwrap(), bytes);
    }

    #[test]
    fn test_custom_glossary() {
        let options = EncoderOptions::default().glossary(["th"]);
        let encoder = Encoder::with_options(vocab(&[]), the_merges(), options).unwrap();
        assert_eq!(encoder.glossary().entries(), ["th"]);
        // "th" arrives pre-joined, so the (t, h) merge never applies but (th, e) still does
        let (tokens, stats) = encoder.encode_with_stats("the");
        // the glossary only bars merging; "the" and "th" are absent from the
        // vocabulary, so the reverse merge table splits both back down
        assert_eq!(tokens, vec!["t", "h", "e"]);
        assert_eq!(stats.merges_applied, 1);
        assert_eq!(stats.backtrack_splits, 2);
    }

    #[test]
    fn test_invalid_glossary() {
        let options = EncoderOptions::default().glossary([""]);
        assert!(matches!(
            Encoder::with_options(vocab(&[]), the_merges(), options),
            Err(EncoderError::EmptyGlossaryEntry)
        ));
    }

    #[test]
    fn test_reject_collisions() {
        let merges = MergeTable::from_merges([("a", "bc"), ("ab", "c")]);
        let options = EncoderOptions::default().collision_policy(CollisionPolicy::Reject);
        let err = Encoder::with_options(vocab(&[]), merges, options)
            .err()
            .unwrap();
        assert!(matches!(err, EncoderError::ReverseMergeCollision { .. }));
        assert!(err.to_string().contains("\"abc\""));
    }

    #[test]
    fn test_cache_works() {
        let encoder = Encoder::new(vocab(&["t", "h", "e"]), the_merges()).with_cache(16);
        let tokens1 = encoder.encode("the");
        let tokens2 = encoder.encode("the");
        assert_eq!(tokens1, tokens2);
        assert_eq!(encoder.cache_len(), 1);
        assert_eq!(encoder.cache_capacity(), 16);
    }

    #[test]
    fn test_clear_cache() {
        let options = EncoderOptions::default().cache_size(16);
        let encoder = Encoder::with_options(vocab(&[]), the_merges(), options).unwrap();
        encoder.encode("the");
        assert!(encoder.cache_len() > 0);
        encoder.clear_cache();
        assert_eq!(encoder.cache_len(), 0);
    }

    #[test]
    fn test_cache_disabled_by_default() {
        let encoder = Encoder::new(vocab(&[]), the_merges());
        encoder.encode("the");
        assert_eq!(encoder.cache_len(), 0);
        assert_eq!(encoder.cache_capacity(), 0);
    }

    #[test]
    fn test_encoder_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Encoder<FxHashSet<String>>>();
    }
}

//! Python bindings for the glossbpe encoder.
//!
//! This module provides PyO3 wrappers around the core Rust encoder.
//!
//! # Example
//!
//! ```python
//! import json
//! from glossbpe import Encoder
//!
//! vocab = json.load(open("vocab.json"))          # token -> id
//! merges = [tuple(line.split()) for line in open("merges.txt")][1:]
//!
//! encoder = Encoder(vocab, merges, cache_size=4096)
//! encoder.encode(" Hello")   # ['ĠHello']
//! ```

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use rustc_hash::FxHashSet;

use crate::core::{
    byte_level_encode, CollisionPolicy, EncodeStats, Encoder, EncoderOptions, MergeTable,
};

/// Python wrapper for the Rust Encoder.
#[pyclass(name = "Encoder")]
pub struct PyEncoder {
    inner: Encoder<FxHashSet<String>>,
}

#[pymethods]
impl PyEncoder {
    /// Create a new encoder.
    ///
    /// Args:
    ///     vocab: Iterable of known byte-level tokens (a list, a set, or a
    ///         vocab.json dict, whose keys are used)
    ///     merges: List of (left, right) pairs in learned order
    ///     cache_size: Result cache capacity, 0 disables caching (default: 0)
    ///     glossary: Protected strings, None for the built-in list
    ///     collision_policy: "last_write_wins", "warn" or "reject"
    #[new]
    #[pyo3(signature = (vocab, merges, cache_size=0, glossary=None, collision_policy="last_write_wins"))]
    fn new(
        vocab: &Bound<'_, PyAny>,
        merges: Vec<(String, String)>,
        cache_size: usize,
        glossary: Option<Vec<String>>,
        collision_policy: &str,
    ) -> PyResult<Self> {
        let vocab = parse_vocab(vocab)?;
        let mut options = EncoderOptions::default()
            .cache_size(cache_size)
            .collision_policy(parse_collision_policy(collision_policy)?);
        if let Some(entries) = glossary {
            options = options.glossary(entries);
        }

        let inner = Encoder::with_options(vocab, MergeTable::from_merges(merges), options)
            .map_err(|e| PyValueError::new_err(e.to_string()))?;

        Ok(Self { inner })
    }

    /// Encode one token into byte-level subword strings.
    fn encode(&self, token: &str) -> Vec<String> {
        self.inner.encode(token)
    }

    /// Encode raw bytes into byte-level subword strings.
    fn encode_bytes(&self, data: &[u8]) -> Vec<String> {
        self.inner.encode_bytes(data)
    }

    /// Encode one token and return (tokens, stats), bypassing the cache.
    fn encode_with_stats(&self, token: &str) -> (Vec<String>, PyEncodeStats) {
        let (tokens, stats) = self.inner.encode_with_stats(token);
        (tokens, stats.into())
    }

    /// Number of learned merges.
    #[getter]
    fn num_merges(&self) -> usize {
        self.inner.merge_table().len()
    }

    /// Number of tokens in the vocabulary.
    #[getter]
    fn vocab_size(&self) -> usize {
        self.inner.vocabulary().len()
    }

    /// Glossary entries in priority order.
    #[getter]
    fn glossary(&self) -> Vec<String> {
        self.inner.glossary().entries().to_vec()
    }

    /// Clear the encoding cache.
    fn clear_cache(&self) {
        self.inner.clear_cache();
    }

    /// Get the number of entries in the cache.
    #[getter]
    fn cache_len(&self) -> usize {
        self.inner.cache_len()
    }

    /// String representation.
    fn __repr__(&self) -> String {
        format!(
            "Encoder(vocab_size={}, num_merges={}, cache_size={})",
            self.inner.vocabulary().len(),
            self.inner.merge_table().len(),
            self.inner.cache_capacity()
        )
    }
}

/// Work counters for one encode call.
#[pyclass(name = "EncodeStats", frozen)]
#[derive(Clone, Copy)]
pub struct PyEncodeStats {
    #[pyo3(get)]
    merges_applied: usize,
    #[pyo3(get)]
    backtrack_splits: usize,
}

#[pymethods]
impl PyEncodeStats {
    fn __repr__(&self) -> String {
        format!(
            "EncodeStats(merges_applied={}, backtrack_splits={})",
            self.merges_applied, self.backtrack_splits
        )
    }
}

impl From<EncodeStats> for PyEncodeStats {
    fn from(stats: EncodeStats) -> Self {
        Self {
            merges_applied: stats.merges_applied,
            backtrack_splits: stats.backtrack_splits,
        }
    }
}

/// Map raw bytes onto the byte-level alphabet.
#[pyfunction]
#[pyo3(name = "byte_level_encode")]
pub fn py_byte_level_encode(data: &[u8]) -> String {
    byte_level_encode(data)
}

/// Collect vocabulary tokens from any Python iterable of strings.
fn parse_vocab(vocab: &Bound<'_, PyAny>) -> PyResult<FxHashSet<String>> {
    let mut result = FxHashSet::default();
    for item in vocab.try_iter()? {
        let token: String = item?.extract()?;
        result.insert(token);
    }
    Ok(result)
}

fn parse_collision_policy(name: &str) -> PyResult<CollisionPolicy> {
    match name {
        "last_write_wins" => Ok(CollisionPolicy::LastWriteWins),
        "warn" => Ok(CollisionPolicy::Warn),
        "reject" => Ok(CollisionPolicy::Reject),
        _ => Err(PyValueError::new_err(format!(
            "Unknown collision policy: {}. Expected last_write_wins, warn or reject",
            name
        ))),
    }
}

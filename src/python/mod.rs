mod bindings;

use crate::core::DEFAULT_GLOSSARY;
pub use bindings::{PyEncodeStats, PyEncoder};

use pyo3::prelude::*;

/// glossbpe - byte-level BPE encoder with glossary protection
///
/// - Byte-level alphabet so any input bytes can be encoded
/// - Aho-Corasick matching for protected glossary strings
/// - Rank-ordered merge loop with left-most tie breaking
/// - Vocabulary-aware backtracking over a reverse merge table
/// - Optional sharded LRU cache for repeated tokens
#[pymodule]
fn _core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyEncoder>()?;
    m.add_class::<PyEncodeStats>()?;
    m.add_function(wrap_pyfunction!(bindings::py_byte_level_encode, m)?)?;
    m.add("DEFAULT_GLOSSARY", DEFAULT_GLOSSARY.to_vec())?;
    Ok(())
}

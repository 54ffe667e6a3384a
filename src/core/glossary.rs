//! Glossary-aware splitting of byte-level text into initial BPE symbols.
//!
//! A glossary is a list of protected multi-character strings. Wherever one of
//! them occurs in the input it becomes a single fragment; every other position
//! becomes a one-character fragment. Since the merge loop only ever joins
//! fragments, a protected entry can never be broken apart later on.
//!
//! Matching uses an Aho-Corasick automaton with leftmost-first semantics, so
//! when two entries could start at the same position the one listed first wins,
//! the same as a regex alternation over the entries.

use aho_corasick::{AhoCorasick, MatchKind};
use std::sync::LazyLock;

use super::byte_level::byte_level_encode;
use super::encoder::EncoderError;

/// Protected strings used when no custom glossary is supplied.
pub const DEFAULT_GLOSSARY: &[&str] = &[
    "e.g", "i.e", "&amp;", "&#124;", "&lt;", "&gt;", "&apos;", "&quot;", "&#91;", "&#93;",
];

static DEFAULT: LazyLock<Glossary> = LazyLock::new(|| {
    Glossary::new(DEFAULT_GLOSSARY.iter().copied()).unwrap_or_else(|err| {
        tracing::warn!(error = %err, "default glossary failed to compile, protection disabled");
        Glossary::empty()
    })
});

/// Compiled glossary matcher.
#[derive(Debug, Clone)]
pub struct Glossary {
    /// Entries in their original (unmapped) form, in priority order.
    entries: Vec<String>,
    /// Automaton over the byte-level form of `entries`. `None` when empty.
    matcher: Option<AhoCorasick>,
}

impl Glossary {
    /// Compile a glossary from its entries.
    ///
    /// Entries are given as plain text and are mapped onto the byte-level
    /// alphabet before compiling, so they match text produced by
    /// [`byte_level_encode`]. Earlier entries take precedence on overlap.
    pub fn new<I, S>(entries: I) -> Result<Self, EncoderError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entries: Vec<String> = entries.into_iter().map(Into::into).collect();
        if entries.iter().any(String::is_empty) {
            return Err(EncoderError::EmptyGlossaryEntry);
        }
        if entries.is_empty() {
            return Ok(Self::empty());
        }

        let patterns: Vec<String> = entries
            .iter()
            .map(|entry| byte_level_encode(entry.as_bytes()))
            .collect();
        let matcher = AhoCorasick::builder()
            .match_kind(MatchKind::LeftmostFirst)
            .build(&patterns)?;

        Ok(Self {
            entries,
            matcher: Some(matcher),
        })
    }

    /// A glossary with no protected entries; splitting is purely per character.
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
            matcher: None,
        }
    }

    /// The process-wide glossary built from [`DEFAULT_GLOSSARY`].
    pub fn default_ref() -> &'static Glossary {
        &DEFAULT
    }

    /// Protected entries in priority order.
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Split byte-level `text` into an ordered partition of fragments.
    ///
    /// Glossary occurrences come out whole; everything else comes out one
    /// character at a time. Concatenating the result yields `text` again.
    pub fn split<'t>(&self, text: &'t str) -> Vec<&'t str> {
        let mut fragments = Vec::with_capacity(text.len());
        let mut last_end = 0;

        if let Some(matcher) = &self.matcher {
            for m in matcher.find_iter(text) {
                push_chars(&text[last_end..m.start()], &mut fragments);
                fragments.push(&text[m.start()..m.end()]);
                last_end = m.end();
            }
        }
        push_chars(&text[last_end..], &mut fragments);

        fragments
    }
}

fn push_chars<'t>(text: &'t str, out: &mut Vec<&'t str>) {
    out.extend(
        text.char_indices()
            .map(|(i, ch)| &text[i..i + ch.len_utf8()]),
    );
}

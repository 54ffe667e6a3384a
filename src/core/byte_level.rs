//! Byte-level alphabet for GPT-2 style BPE.
//!
//! Every byte value (0-255) is assigned a distinct printable Unicode character so
//! that arbitrary input, binary content included, can be handled as an ordinary
//! string by the merge machinery and recovered exactly afterwards.
//!
//! # Mapping Strategy
//!
//! Bytes that already render as visible glyphs map to the code point with the
//! same numeric value:
//!
//! - Bytes 33-126 (`!` to `~`)
//! - Bytes 161-172 (`¡` to `¬`)
//! - Bytes 174-255 (`®` to `ÿ`)
//!
//! Every other byte (0-32, 127-160, 173) is assigned the next free code point
//! starting at U+0100, in ascending byte order. Space (0x20) therefore becomes
//! `Ġ` (U+0120) and newline (0x0A) becomes `Ċ` (U+010A).
//!
//! # Example
//!
//! ```
//! use glossbpe::byte_level_encode;
//!
//! assert_eq!(byte_level_encode(b" hello"), "\u{120}hello");
//! ```

use rustc_hash::FxHashMap;
use std::sync::LazyLock;

/// First code point handed out to bytes that are not printable on their own.
const FIRST_REMAPPED_CODE_POINT: u32 = 256;

/// Whether a byte is printable as-is and keeps its own code point.
const fn is_printable_byte(b: u8) -> bool {
    matches!(b, 33..=126 | 161..=172 | 174..=255)
}

const fn build_byte_to_char() -> [char; 256] {
    let mut mapping = ['\0'; 256];
    let mut next_code_point = FIRST_REMAPPED_CODE_POINT;
    let mut b = 0usize;
    while b < 256 {
        let byte = b as u8;
        mapping[b] = if is_printable_byte(byte) {
            byte as char
        } else {
            let ch = match char::from_u32(next_code_point) {
                Some(ch) => ch,
                None => panic!("remapped byte code point is not a scalar value"),
            };
            next_code_point += 1;
            ch
        };
        b += 1;
    }
    mapping
}

/// Byte to character table (256 entries), fixed at compile time.
static BYTE_TO_CHAR: [char; 256] = build_byte_to_char();

/// Character to byte table, the inverse of [`BYTE_TO_CHAR`].
static CHAR_TO_BYTE: LazyLock<FxHashMap<char, u8>> = LazyLock::new(|| {
    BYTE_TO_CHAR
        .iter()
        .enumerate()
        .map(|(byte, &ch)| (ch, byte as u8))
        .collect()
});

/// Map raw bytes onto the byte-level alphabet.
///
/// The output holds exactly one character per input byte.
#[inline]
pub fn byte_level_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| BYTE_TO_CHAR[b as usize]).collect()
}

/// Map a byte-level string back to the raw bytes it was built from.
///
/// Returns `None` if `text` contains a character outside the byte-level alphabet.
/// This is the inverse of the alphabet only; it knows nothing about tokens.
#[inline]
pub fn byte_level_decode(text: &str) -> Option<Vec<u8>> {
    text.chars()
        .map(|ch| CHAR_TO_BYTE.get(&ch).copied())
        .collect()
}

/// Check if a character is part of the byte-level alphabet.
#[inline]
pub fn is_byte_level_char(ch: char) -> bool {
    CHAR_TO_BYTE.contains_key(&ch)
}

/// Get the byte-level character for a specific byte value.
#[inline]
pub fn get_byte_level_char(byte: u8) -> char {
    BYTE_TO_CHAR[byte as usize]
}

/// Get the byte value for a byte-level character.
#[inline]
pub fn get_byte_level_byte(ch: char) -> Option<u8> {
    CHAR_TO_BYTE.get(&ch).copied()
}

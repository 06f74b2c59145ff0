//! Invitation code generation and input normalisation.
//!
//! Codes are drawn uniformly from a 32-symbol uppercase alphabet that
//! omits the look-alike glyphs `0`, `O`, `1` and `I`. Six symbols give
//! 2^30 possible codes.

use rand::Rng;

pub const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

pub const MIN_CODE_LENGTH: usize = 6;

/// Generate a fresh code from the thread-local CSPRNG.
pub fn generate_code(length: usize) -> String {
    let mut rng = rand::rng();
    (0..length.max(MIN_CODE_LENGTH))
        .map(|_| char::from(CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())]))
        .collect()
}

/// Normalise user input: trim surrounding whitespace and uppercase.
///
/// Returns `None` when the result cannot be a code of `length` symbols.
pub fn normalize_code(input: &str, length: usize) -> Option<String> {
    let code = input.trim().to_ascii_uppercase();
    let well_formed = code.len() == length.max(MIN_CODE_LENGTH)
        && code.bytes().all(|b| CODE_ALPHABET.contains(&b));
    well_formed.then_some(code)
}

/// A well-formed store key that is never issued, since `0` is outside
/// the alphabet.
pub fn unissued_code(length: usize) -> String {
    "0".repeat(length.max(MIN_CODE_LENGTH))
}

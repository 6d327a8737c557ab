//! Word tokenizer used for both chunks and queries.
//!
//! Text is lowercased, then split into maximal runs of token characters:
//! ASCII letters and digits plus the Spanish accented vowels and `ñ`.
//! Anything else (punctuation, whitespace, other scripts) is a separator.

use std::collections::HashSet;

/// Returns the set of unique normalized tokens in `text`.
///
/// ```rust
/// use docchat_core::tokenize::tokenize;
///
/// let tokens = tokenize("¿Qué es la Niñez? 2024");
/// assert!(tokens.contains("qué"));
/// assert!(tokens.contains("niñez"));
/// assert!(tokens.contains("2024"));
/// assert_eq!(tokens.len(), 5);
/// ```
pub fn tokenize(text: &str) -> HashSet<String> {
    let lowered = text.to_lowercase();
    lowered
        .split(|c: char| !is_token_char(c))
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

fn is_token_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, 'á' | 'é' | 'í' | 'ó' | 'ú' | 'ñ')
}

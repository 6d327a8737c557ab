//! Word-overlap ranker.
//!
//! Scores each chunk by the number of distinct query tokens it contains
//! (`|query ∩ chunk|`). There is no term-frequency or rarity weighting and
//! no stemming, so very common short words can dominate short queries.
//!
//! # Algorithm
//!
//! 1. Tokenize the query. An empty token set falls back to the first `k`
//!    chunks in document order.
//! 2. Score every chunk by token-set intersection size.
//! 3. Stable-sort positions by score, descending; equal scores keep
//!    document order.
//! 4. Drop chunks with score 0 and chunks whose text was already selected
//!    (a repetitive document can produce identical windows), then keep the
//!    first `k`.
//! 5. If nothing is left, fall back to the first `k` distinct chunks in
//!    document order.

use std::collections::HashSet;

use crate::index::Index;
use crate::tokenize::tokenize;

/// One ranked chunk with its position in the index and its overlap score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedChunk<'a> {
    /// Position of the chunk in document order.
    pub position: usize,
    /// Number of distinct query tokens found in the chunk (0 for fallback
    /// results).
    pub score: usize,
    pub text: &'a str,
}

/// Return up to `k` chunk contents most relevant to `query`, best first.
///
/// ```rust
/// use docchat_core::{rank, ChunkConfig, Index};
///
/// let cfg = ChunkConfig::new(20, 5).unwrap();
/// let index = Index::build("The cat sat. The dog ran. The cat ran.", &cfg);
/// assert_eq!(rank("sat", &index, 1), vec!["The cat sat. The dog"]);
/// ```
pub fn rank<'a>(query: &str, index: &'a Index, k: usize) -> Vec<&'a str> {
    rank_scored(query, index, k)
        .into_iter()
        .map(|r| r.text)
        .collect()
}

/// Like [`rank`], but keeps each result's position and score.
pub fn rank_scored<'a>(query: &str, index: &'a Index, k: usize) -> Vec<RankedChunk<'a>> {
    let query_tokens = tokenize(query);
    if query_tokens.is_empty() {
        return leading(index, k);
    }

    let mut scored: Vec<(usize, usize)> = index
        .token_sets()
        .iter()
        .enumerate()
        .map(|(position, tokens)| (position, overlap(&query_tokens, tokens)))
        .collect();
    // Stable: equal scores stay in document order.
    scored.sort_by(|a, b| b.1.cmp(&a.1));

    let mut seen = HashSet::new();
    let top: Vec<RankedChunk<'a>> = scored
        .into_iter()
        .filter(|&(_, score)| score > 0)
        .map(|(position, score)| RankedChunk {
            position,
            score,
            text: index.chunks()[position].as_str(),
        })
        .filter(|r| seen.insert(r.text))
        .take(k)
        .collect();

    tracing::debug!(
        query_tokens = query_tokens.len(),
        chunks = index.len(),
        hits = top.len(),
        "ranked chunks"
    );

    if top.is_empty() {
        leading(index, k)
    } else {
        top
    }
}

fn overlap(query: &HashSet<String>, chunk: &HashSet<String>) -> usize {
    // Iterate the smaller set.
    if query.len() <= chunk.len() {
        query.iter().filter(|t| chunk.contains(*t)).count()
    } else {
        chunk.iter().filter(|t| query.contains(*t)).count()
    }
}

/// First `k` distinct chunks in document order, unscored.
fn leading(index: &Index, k: usize) -> Vec<RankedChunk<'_>> {
    let mut seen = HashSet::new();
    index
        .chunks()
        .iter()
        .enumerate()
        .filter(|&(_, text)| seen.insert(text.as_str()))
        .take(k)
        .map(|(position, text)| RankedChunk {
            position,
            score: 0,
            text: text.as_str(),
        })
        .collect()
}

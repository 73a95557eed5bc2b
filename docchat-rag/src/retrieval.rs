//! Cosine similarity scoring and top-k chunk selection.

use crate::document::{Chunk, ScoredChunk};

/// Separator placed between chunk texts when building an answer context.
pub const CONTEXT_SEPARATOR: &str = "\n\n";

/// Compute cosine similarity between two vectors.
///
/// Sums are accumulated in `f64` so large or tiny components neither
/// overflow nor underflow. Returns `0.0` ("no signal") if either vector has
/// zero magnitude, the vectors have different lengths, or the result is not
/// finite (for example when an embedding contains `NaN`).
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    let (mut dot, mut norm_a, mut norm_b) = (0.0f64, 0.0f64, 0.0f64);
    for (&x, &y) in a.iter().zip(b) {
        let (x, y) = (f64::from(x), f64::from(y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    let score = dot / (norm_a.sqrt() * norm_b.sqrt());
    if score.is_finite() { score.clamp(-1.0, 1.0) as f32 } else { 0.0 }
}

/// Score every embedded chunk against `query` and return the `k` best,
/// ordered by descending score.
///
/// Chunks without an embedding are skipped. Chunks with equal scores keep
/// their input order.
pub fn top_k(query: &[f32], chunks: &[Chunk], k: usize) -> Vec<ScoredChunk> {
    let mut scored: Vec<ScoredChunk> = chunks
        .iter()
        .filter_map(|chunk| {
            let embedding = chunk.embedding.as_deref()?;
            Some(ScoredChunk {
                chunk_id: chunk.id.clone(),
                document_id: chunk.document_id.clone(),
                text: chunk.text.clone(),
                score: cosine_similarity(query, embedding),
            })
        })
        .collect();

    // `sort_by` is stable, which gives the tie-break on input order.
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored.truncate(k);
    scored
}

/// Join retrieved chunk texts, in the given order, into a single context block.
pub fn build_context(results: &[ScoredChunk]) -> String {
    results.iter().map(|r| r.text.as_str()).collect::<Vec<_>>().join(CONTEXT_SEPARATOR)
}

//! Vector similarity utilities shared by every collection backend.

use ragdock_core::ScoredText;

/// Compute cosine similarity between two vectors.
///
/// Returns a value in [-1, 1] where 1 = identical, 0 = orthogonal, -1 = opposite.
/// Returns 0.0 if the lengths differ or either vector is empty or zero.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;

    for (x, y) in a.iter().zip(b.iter()) {
        let x = *x as f64;
        let y = *y as f64;
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom < 1e-10 {
        return 0.0;
    }

    (dot / denom) as f32
}

/// A stored passage paired with its embedding, in insertion order.
pub struct Candidate {
    pub hit: ScoredText,
    pub embedding: Vec<f32>,
}

/// Rank candidates by cosine similarity to `query` and keep the best `k`.
///
/// The sort is stable, so equal scores keep insertion order.
pub fn rank_by_similarity(candidates: Vec<Candidate>, query: &[f32], k: usize) -> Vec<ScoredText> {
    if k == 0 {
        return Vec::new();
    }

    let mut scored: Vec<ScoredText> = candidates
        .into_iter()
        .map(|c| {
            let mut hit = c.hit;
            hit.score = cosine_similarity(&c.embedding, query);
            hit
        })
        .collect();

    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(k);
    scored
}

/// Check that every embedding in a batch has the same, non-zero dimension.
///
/// Returns that dimension, or `None` for an empty batch.
pub fn batch_dimension<'a>(
    mut embeddings: impl Iterator<Item = &'a [f32]>,
) -> Result<Option<usize>, String> {
    let Some(first) = embeddings.next() else {
        return Ok(None);
    };
    if first.is_empty() {
        return Err("empty embedding".into());
    }
    let dim = first.len();
    for (i, e) in embeddings.enumerate() {
        if e.len() != dim {
            return Err(format!(
                "embedding {} has dimension {}, expected {dim}",
                i + 1,
                e.len()
            ));
        }
    }
    Ok(Some(dim))
}

/// Serialize an embedding vector to little-endian bytes.
pub fn embedding_to_blob(embedding: &[f32]) -> Vec<u8> {
    embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
}

/// Inverse of [`embedding_to_blob`]; trailing partial values are dropped.
pub fn blob_to_embedding(blob: &[u8]) -> Vec<f32> {
    blob.chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}

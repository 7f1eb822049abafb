//! Similarity and distance computation for embeddings.

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::EntityId;
use crate::error::{EmbeddingError, Result};

/// Compute the cosine similarity between two embeddings.
///
/// Returns a value between -1.0 and 1.0, where:
/// - 1.0 means identical direction
/// - 0.0 means orthogonal vectors
/// - -1.0 means opposite vectors
///
/// A zero-magnitude vector is treated as orthogonal to everything.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32> {
    if a.len() != b.len() {
        return Err(EmbeddingError::DimensionMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let magnitude_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let magnitude_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if magnitude_a == 0.0 || magnitude_b == 0.0 {
        return Ok(0.0);
    }

    Ok((dot_product / (magnitude_a * magnitude_b)).clamp(-1.0, 1.0))
}

/// Compute the cosine distance (`1 - cosine similarity`) between two
/// embeddings, in `[0, 2]`.
pub fn cosine_distance(a: &[f32], b: &[f32]) -> Result<f32> {
    Ok(1.0 - cosine_similarity(a, b)?)
}

/// Normalize an embedding to unit length.
pub fn normalize(embedding: &mut [f32]) {
    let magnitude: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
    if magnitude > 0.0 {
        for x in embedding.iter_mut() {
            *x /= magnitude;
        }
    }
}

/// One answer of a nearest-neighbour query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Neighbor {
    /// Surrogate id of the matched record.
    pub id: EntityId,

    /// Cosine distance to the query vector.
    pub distance: f32,
}

impl Neighbor {
    pub fn new(id: EntityId, distance: f32) -> Self {
        Self { id, distance }
    }
}

/// Find the `k` candidates closest to `query`, ascending by cosine distance.
///
/// Ties are broken by id so the ordering is stable across runs.
pub fn nearest_k<'a, I>(query: &[f32], candidates: I, k: usize) -> Result<Vec<Neighbor>>
where
    I: IntoIterator<Item = (EntityId, &'a [f32])>,
{
    if k == 0 {
        return Ok(Vec::new());
    }

    let mut scored: Vec<(OrderedFloat<f32>, EntityId)> = Vec::new();
    for (id, embedding) in candidates {
        let distance = cosine_distance(query, embedding)?;
        scored.push((OrderedFloat(distance), id));
    }

    scored.sort();
    scored.truncate(k);

    Ok(scored
        .into_iter()
        .map(|(distance, id)| Neighbor::new(id, distance.0))
        .collect())
}

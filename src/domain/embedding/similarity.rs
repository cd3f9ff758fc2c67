//! Vector similarity functions

/// Norms below this are treated as zero vectors
pub const NORM_EPSILON: f64 = 1e-10;

/// Minimum similarity for a vector-store match to be returned
pub const DEFAULT_SIMILARITY_THRESHOLD: f32 = 0.1;

/// Calculate cosine similarity between two vectors
///
/// Degenerate inputs score a neutral `0.0` instead of failing: vectors of
/// different length, empty vectors, and vectors whose L2 norm is below
/// [`NORM_EPSILON`]. Callers that care about the mismatch case should
/// compare lengths themselves and log it.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot_product = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;

    for (x, y) in a.iter().zip(b.iter()) {
        let (x, y) = (*x as f64, *y as f64);
        dot_product += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let norm_a = norm_a.sqrt();
    let norm_b = norm_b.sqrt();

    if norm_a < NORM_EPSILON || norm_b < NORM_EPSILON {
        return 0.0;
    }

    (dot_product / (norm_a * norm_b)).clamp(-1.0, 1.0) as f32
}

/// Scale a vector to unit length in place; zero vectors are left untouched
pub fn normalize(vector: &mut [f32]) {
    let magnitude = vector.iter().map(|v| v * v).sum::<f32>().sqrt();

    if magnitude > 0.0 {
        for v in vector.iter_mut() {
            *v /= magnitude;
        }
    }
}

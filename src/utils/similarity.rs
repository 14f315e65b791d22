//! Vector similarity over min-hash signatures.

use ndarray::Array1;

/// Compute the cosine similarity between two unsigned integer vectors.
///
/// Signatures are treated as integer vectors with f64 accumulation.
/// Returns `0.0` for empty slices or mismatched lengths. Bit-identical
/// vectors score exactly `1.0` — the equality short-circuit avoids a
/// floating-point round trip, so the duplicate classifier can rely on
/// `== 1.0` meaning "same signature".
pub fn cosine_similarity(a: &[u32], b: &[u32]) -> f64 {
    if a.is_empty() || b.is_empty() || a.len() != b.len() {
        return 0.0;
    }
    if a == b {
        return 1.0;
    }

    let a = Array1::from_iter(a.iter().map(|&v| f64::from(v)));
    let b = Array1::from_iter(b.iter().map(|&v| f64::from(v)));

    let dot = a.dot(&b);
    let norm_a = a.dot(&a).sqrt();
    let norm_b = b.dot(&b).sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}

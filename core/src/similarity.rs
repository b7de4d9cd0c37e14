/// Cosine similarity, or `None` when either vector has zero magnitude.
pub fn cosine(a: &[f64], b: &[f64]) -> Option<f64> {
    debug_assert_eq!(a.len(), b.len());
    let mut dot = 0.0;
    let mut norm_a = 0.0;
    let mut norm_b = 0.0;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return None;
    }
    Some(dot / (norm_a.sqrt() * norm_b.sqrt()))
}

pub fn is_zero(v: &[f64]) -> bool {
    v.iter().all(|&x| x == 0.0)
}

/// Stable descending sort by score; equal scores keep their input order.
pub fn sort_descending<T>(scored: &mut [(T, f64)]) {
    scored.sort_by(|a, b| b.1.total_cmp(&a.1));
}

//! Coarse stage: nearest neighbours over K-dimensional topic vectors.

use crate::corpus::Corpus;
use crate::error::{Error, Result};
use crate::similarity::{cosine, is_zero, sort_descending};

/// Rank every other document by topic-vector cosine similarity to the query.
///
/// Returns at most `n` entries, never including the query itself. Ties keep
/// corpus ingestion order.
pub fn rank_by_topic<'c>(corpus: &'c Corpus, query_id: &str, n: usize) -> Result<Vec<(&'c str, f64)>> {
    let query = corpus.get(query_id)?;
    let mut scored: Vec<(&'c str, f64)> = Vec::with_capacity(corpus.len());
    for doc in corpus.iter() {
        let score = cosine(&query.theta, &doc.theta).ok_or_else(|| {
            let culprit = if is_zero(&query.theta) { query_id } else { doc.doc_id.as_str() };
            Error::DegenerateVector(culprit.to_string())
        })?;
        scored.push((doc.doc_id.as_str(), score));
    }
    sort_descending(&mut scored);
    scored.retain(|(id, _)| *id != query_id);
    scored.truncate(n);
    tracing::debug!(query_id, candidates = scored.len(), "ranked by topic");
    Ok(scored)
}

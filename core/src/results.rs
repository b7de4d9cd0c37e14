use crate::error::{Error, Result};
use crate::similarity::sort_descending;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriorityHit {
    pub doc_id: String,
    pub topic_score: f64,
    pub tfidf_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecondaryHit {
    pub doc_id: String,
    pub topic_score: f64,
}

/// Ranking for one query. Priority hits are presented before secondary ones.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RankingResult {
    /// Preferred-work candidates by TF-IDF score, descending.
    pub priority: Vec<PriorityHit>,
    /// Remaining candidates by topic score, descending.
    pub secondary: Vec<SecondaryHit>,
}

/// Merge both stages' scores.
///
/// Priority ids without a TF-IDF score were dropped by the zero-vector guard
/// and stay absent; they are never demoted to secondary. Secondary ids never
/// get a TF-IDF score.
pub fn assemble(
    topic_scores: &[(&str, f64)],
    priority_ids: &[&str],
    secondary_ids: &[&str],
    tfidf_scores: &[(&str, f64)],
) -> Result<RankingResult> {
    let topic: HashMap<&str, f64> = topic_scores.iter().copied().collect();
    let topic_score = |id: &str| {
        topic
            .get(id)
            .copied()
            .ok_or_else(|| Error::DocumentNotFound(format!("{id} has no topic score")))
    };

    let tfidf: HashMap<&str, f64> = tfidf_scores.iter().copied().collect();
    let mut priority: Vec<(&str, f64)> = priority_ids
        .iter()
        .filter_map(|&id| tfidf.get(id).map(|&s| (id, s)))
        .collect();
    sort_descending(&mut priority);
    let priority = priority
        .into_iter()
        .map(|(id, tfidf_score)| {
            topic_score(id).map(|topic_score| PriorityHit { doc_id: id.to_string(), topic_score, tfidf_score })
        })
        .collect::<Result<Vec<_>>>()?;

    let mut secondary: Vec<(&str, f64)> = secondary_ids
        .iter()
        .map(|&id| topic_score(id).map(|s| (id, s)))
        .collect::<Result<Vec<_>>>()?;
    sort_descending(&mut secondary);
    let secondary = secondary
        .into_iter()
        .map(|(id, topic_score)| SecondaryHit { doc_id: id.to_string(), topic_score })
        .collect();

    Ok(RankingResult { priority, secondary })
}

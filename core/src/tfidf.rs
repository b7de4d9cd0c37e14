//! Fine stage: TF-IDF vectors over the reduced vocabulary.
//!
//! Vectors have one dimension per reduced-vocabulary term, so this stage is
//! only ever run on the small priority bucket, never the whole corpus.

use crate::corpus::Corpus;
use crate::error::Result;
use crate::similarity::{cosine, is_zero, sort_descending};
use crate::vocab::VocabularyIndex;
use std::collections::HashMap;

pub struct TfIdfVectorizer<'a> {
    corpus: &'a Corpus,
    vocab: &'a VocabularyIndex,
}

impl<'a> TfIdfVectorizer<'a> {
    pub fn new(corpus: &'a Corpus, vocab: &'a VocabularyIndex) -> Self {
        Self { corpus, vocab }
    }

    /// Dense TF-IDF vector of a document, `|reduced_vocab|` long.
    ///
    /// `tf = count / doc_token_count`; terms outside the reduced vocabulary
    /// contribute nothing.
    pub fn vectorize(&self, doc_id: &str) -> Result<Vec<f64>> {
        let doc = self.corpus.get(doc_id)?;
        let mut vector = vec![0.0; self.vocab.dimensions()];
        if doc.tokens.is_empty() {
            return Ok(vector);
        }

        let mut counts: HashMap<&str, u32> = HashMap::new();
        for token in &doc.tokens {
            *counts.entry(token.as_str()).or_insert(0) += 1;
        }
        let total = doc.tokens.len() as f64;
        for (term, count) in counts {
            if let (Some(dim), Some(idf)) = (self.vocab.dimension(term), self.vocab.idf(term)) {
                vector[dim as usize] = count as f64 / total * idf;
            }
        }
        Ok(vector)
    }

    /// Rerank candidates by TF-IDF cosine similarity to the query, descending.
    ///
    /// Candidates whose vector is all zeros are left out. If the query's own
    /// vector is all zeros, every remaining candidate scores 0.0 and keeps
    /// its input order.
    pub fn rerank<'c>(&self, query_id: &str, candidate_ids: &[&'c str]) -> Result<Vec<(&'c str, f64)>> {
        let query = self.vectorize(query_id)?;
        let mut scored: Vec<(&'c str, f64)> = Vec::with_capacity(candidate_ids.len());
        let mut skipped = 0usize;
        for &id in candidate_ids {
            let candidate = self.vectorize(id)?;
            if is_zero(&candidate) {
                skipped += 1;
                continue;
            }
            scored.push((id, cosine(&query, &candidate).unwrap_or(0.0)));
        }
        sort_descending(&mut scored);
        tracing::debug!(query_id, reranked = scored.len(), skipped, "reranked by tf-idf");
        Ok(scored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VocabularyConfig;
    use crate::error::Error;
    use crate::tables::ThetaRow;

    fn fixture(texts: &[(&str, &str)]) -> (Corpus, VocabularyIndex) {
        let rows = texts
            .iter()
            .map(|(id, t)| ThetaRow { doc_id: id.to_string(), segmented_text: t.to_string(), theta: vec![1.0] })
            .collect();
        let corpus = Corpus::from_rows(rows, &HashMap::new(), &HashMap::new()).unwrap();
        let config = VocabularyConfig {
            stopwords: vec!["iti".into()],
            error_tokens: vec![],
            too_rare_cutoff: 0.0,
            too_common_cutoff: 1.0,
        };
        let vocab = VocabularyIndex::build(&corpus, &config);
        (corpus, vocab)
    }

    #[test]
    fn vector_weights_are_tf_times_idf() {
        let (c, v) = fixture(&[("A_1", "x x y iti"), ("B_1", "y"), ("C_1", "z")]);
        let t = TfIdfVectorizer::new(&c, &v);
        let vec = t.vectorize("A_1").unwrap();
        assert_eq!(v.reduced_vocab, vec!["x", "y", "z"]);
        assert_eq!(vec.len(), 3);
        assert!((vec[0] - 0.5 * 3f64.ln()).abs() < 1e-12);
        assert!((vec[1] - 0.25 * 1.5f64.ln()).abs() < 1e-12);
        assert_eq!(vec[2], 0.0);
    }

    #[test]
    fn vectorize_is_reproducible() {
        let (c, v) = fixture(&[("A_1", "p q r p"), ("B_1", "q s")]);
        let t = TfIdfVectorizer::new(&c, &v);
        assert_eq!(t.vectorize("A_1").unwrap(), t.vectorize("A_1").unwrap());
    }

    #[test]
    fn stopword_only_document_is_excluded() {
        let (c, v) = fixture(&[("Q_1", "a b"), ("S_1", "iti"), ("T_1", "a c")]);
        let t = TfIdfVectorizer::new(&c, &v);
        assert!(is_zero(&t.vectorize("S_1").unwrap()));
        let ranked = t.rerank("Q_1", &["S_1", "T_1"]).unwrap();
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].0, "T_1");
    }

    #[test]
    fn ranks_by_shared_terms() {
        let (c, v) = fixture(&[("Q_1", "a b c"), ("X_1", "d e"), ("Y_1", "a b c"), ("Z_1", "a d")]);
        let t = TfIdfVectorizer::new(&c, &v);
        let ranked = t.rerank("Q_1", &["X_1", "Z_1", "Y_1"]).unwrap();
        let ids: Vec<_> = ranked.iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, vec!["Y_1", "Z_1", "X_1"]);
        assert!((ranked[0].1 - 1.0).abs() < 1e-12);
        assert_eq!(ranked[2].1, 0.0);
    }

    #[test]
    fn ties_keep_input_order() {
        let (c, v) = fixture(&[("Q_1", "a"), ("B_1", "a"), ("C_1", "a b"), ("D_1", "a"), ("E_1", "e")]);
        let t = TfIdfVectorizer::new(&c, &v);
        let ranked = t.rerank("Q_1", &["D_1", "C_1", "B_1"]).unwrap();
        let ids: Vec<_> = ranked.iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, vec!["D_1", "B_1", "C_1"]);
    }

    #[test]
    fn zero_query_scores_everything_zero() {
        let (c, v) = fixture(&[("Q_1", "iti"), ("A_1", "a"), ("B_1", "b")]);
        let t = TfIdfVectorizer::new(&c, &v);
        let ranked = t.rerank("Q_1", &["B_1", "A_1"]).unwrap();
        assert_eq!(ranked, vec![("B_1", 0.0), ("A_1", 0.0)]);
    }

    #[test]
    fn unknown_candidate_is_not_found() {
        let (c, v) = fixture(&[("Q_1", "a")]);
        let t = TfIdfVectorizer::new(&c, &v);
        assert!(matches!(t.rerank("Q_1", &["N_1"]), Err(Error::DocumentNotFound(_))));
    }
}

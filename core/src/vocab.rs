use crate::config::VocabularyConfig;
use crate::corpus::Corpus;
use crate::TermId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use unicode_normalization::UnicodeNormalization;

/// Corpus vocabulary statistics, built once and never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VocabularyIndex {
    /// Every distinct token, sorted.
    pub full_vocab: Vec<String>,
    /// Number of documents containing each term at least once.
    pub doc_freq: HashMap<String, u32>,
    /// `ln(num_docs / doc_freq)` per term.
    pub idf: HashMap<String, f64>,
    /// Sorted TF-IDF dimensions; a term's rank here is its vector index.
    pub reduced_vocab: Vec<String>,
    dimensions: HashMap<String, TermId>,
    num_docs: u32,
    /// Settings the reduced vocabulary was filtered with.
    config: VocabularyConfig,
}

impl VocabularyIndex {
    pub fn build(corpus: &Corpus, config: &VocabularyConfig) -> Self {
        let num_docs = corpus.len() as u32;

        let mut df: BTreeMap<&str, u32> = BTreeMap::new();
        for doc in corpus.iter() {
            let unique: HashSet<&str> = doc.tokens.iter().map(String::as_str).collect();
            for term in unique {
                *df.entry(term).or_insert(0) += 1;
            }
        }

        let n = num_docs as f64;
        // Tokens are NFC, so the exclusion lists must be too
        let excluded: HashSet<String> = config
            .stopwords
            .iter()
            .chain(config.error_tokens.iter())
            .map(|t| t.nfc().collect())
            .collect();

        let mut full_vocab = Vec::with_capacity(df.len());
        let mut doc_freq = HashMap::with_capacity(df.len());
        let mut idf = HashMap::with_capacity(df.len());
        let mut reduced_vocab = Vec::new();
        for (term, count) in df {
            let ratio = count as f64 / n;
            if !excluded.contains(term) && ratio >= config.too_rare_cutoff && ratio <= config.too_common_cutoff {
                reduced_vocab.push(term.to_string());
            }
            full_vocab.push(term.to_string());
            doc_freq.insert(term.to_string(), count);
            idf.insert(term.to_string(), (n / count as f64).ln());
        }

        let dimensions = reduced_vocab
            .iter()
            .enumerate()
            .map(|(i, t)| (t.clone(), i as TermId))
            .collect();

        tracing::info!(
            num_docs,
            full_vocab = full_vocab.len(),
            reduced_vocab = reduced_vocab.len(),
            "built vocabulary index"
        );
        Self { full_vocab, doc_freq, idf, reduced_vocab, dimensions, num_docs, config: config.clone() }
    }

    pub fn num_docs(&self) -> u32 {
        self.num_docs
    }

    pub fn config(&self) -> &VocabularyConfig {
        &self.config
    }

    /// TF-IDF vector length.
    pub fn dimensions(&self) -> usize {
        self.reduced_vocab.len()
    }

    /// Vector index of a term, if it belongs to the reduced vocabulary.
    pub fn dimension(&self, term: &str) -> Option<TermId> {
        self.dimensions.get(term).copied()
    }

    pub fn idf(&self, term: &str) -> Option<f64> {
        self.idf.get(term).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::ThetaRow;

    fn corpus(texts: &[&str]) -> Corpus {
        let rows = texts
            .iter()
            .enumerate()
            .map(|(i, t)| ThetaRow { doc_id: format!("W_{i}"), segmented_text: t.to_string(), theta: vec![1.0] })
            .collect();
        Corpus::from_rows(rows, &HashMap::new(), &HashMap::new()).unwrap()
    }

    fn open_band() -> VocabularyConfig {
        VocabularyConfig {
            stopwords: vec!["iti".into()],
            error_tokens: vec![")".into()],
            too_rare_cutoff: 0.0,
            too_common_cutoff: 1.0,
        }
    }

    #[test]
    fn counts_presence_not_occurrences() {
        let v = VocabularyIndex::build(&corpus(&["a a a b", "b c", "c"]), &open_band());
        assert_eq!(v.full_vocab, vec!["a", "b", "c"]);
        assert_eq!(v.doc_freq["a"], 1);
        assert_eq!(v.doc_freq["b"], 2);
        assert!((v.idf("a").unwrap() - 3f64.ln()).abs() < 1e-12);
        assert!((v.idf("b").unwrap() - 1.5f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn reduced_vocab_drops_stopwords_and_error_tokens() {
        let v = VocabularyIndex::build(&corpus(&["iti a )", "b iti"]), &open_band());
        assert_eq!(v.full_vocab, vec![")", "a", "b", "iti"]);
        assert_eq!(v.reduced_vocab, vec!["a", "b"]);
        assert_eq!(v.dimension("a"), Some(0));
        assert_eq!(v.dimension("b"), Some(1));
        assert_eq!(v.dimension("iti"), None);
    }

    #[test]
    fn reduced_vocab_applies_frequency_band() {
        // "common" appears in 4/4 docs, "rare" in 1/4, "mid" in 2/4.
        let texts = ["common rare mid", "common mid", "common", "common"];
        let config = VocabularyConfig { too_rare_cutoff: 0.3, too_common_cutoff: 0.9, ..open_band() };
        let v = VocabularyIndex::build(&corpus(&texts), &config);
        assert_eq!(v.reduced_vocab, vec!["mid"]);
    }

    #[test]
    fn band_edges_are_inclusive() {
        let config = VocabularyConfig { too_rare_cutoff: 0.5, too_common_cutoff: 0.5, ..open_band() };
        let v = VocabularyIndex::build(&corpus(&["x y", "x"]), &config);
        assert_eq!(v.reduced_vocab, vec!["y"]);
    }

    #[test]
    fn decomposed_stopwords_match_composed_tokens() {
        // "va" + combining macron is "vā" once normalized
        let config = VocabularyConfig { stopwords: vec!["va\u{0304}".into()], ..open_band() };
        let v = VocabularyIndex::build(&corpus(&["vā a", "vā b"]), &config);
        assert!(v.full_vocab.contains(&"vā".to_string()));
        assert_eq!(v.reduced_vocab, vec!["a", "b"]);
    }

    #[test]
    fn remembers_its_settings() {
        let config = VocabularyConfig { too_rare_cutoff: 0.25, ..open_band() };
        let v = VocabularyIndex::build(&corpus(&["a"]), &config);
        assert_eq!(v.config(), &config);
    }
}

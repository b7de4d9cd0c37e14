use crate::config::Config;
use crate::corpus::{Corpus, DocLinks};
use crate::docid::parse_doc_id;
use crate::error::{Error, Result};
use crate::results::{assemble, RankingResult};
use crate::tables::{PhiTable, ThetaRow};
use crate::tfidf::TfIdfVectorizer;
use crate::topic::rank_by_topic;
use crate::vocab::VocabularyIndex;
use crate::works::{partition, WorkPeriods};
use serde::Serialize;
use std::collections::HashMap;

/// Everything a query needs, built once at startup and then only read.
///
/// Queries take `&self` and allocate their own working state, so one
/// context can be shared across any number of concurrent queries.
#[derive(Debug)]
pub struct QueryContext {
    pub corpus: Corpus,
    pub vocab: VocabularyIndex,
    pub phi: PhiTable,
    pub works: WorkPeriods,
    pub config: Config,
}

/// Presentation-facing view of one document.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentView {
    pub doc_id: String,
    /// `None` when the id does not follow the `work_locator` grammar.
    pub work_abbrev: Option<String>,
    pub locator: Option<String>,
    /// Chronological tier of the work; 0 is the earliest.
    pub work_tier: Option<usize>,
    pub section: Option<String>,
    pub prev: String,
    pub next: String,
    pub original_text: Option<String>,
    pub segmented_text: String,
    /// `(topic_index, weight)` of the dominant topics.
    pub top_topics: Vec<(usize, f64)>,
}

impl QueryContext {
    pub fn new(corpus: Corpus, vocab: VocabularyIndex, phi: PhiTable, config: Config) -> Result<Self> {
        config.validate()?;
        if !phi.phis.is_empty() && phi.num_topics() != corpus.num_topics() {
            return Err(Error::config(format!(
                "phi has {} topics but theta has {}",
                phi.num_topics(),
                corpus.num_topics()
            )));
        }
        if vocab.num_docs() as usize != corpus.len() {
            return Err(Error::config(format!(
                "vocabulary built over {} documents, corpus has {}",
                vocab.num_docs(),
                corpus.len()
            )));
        }
        if vocab.config() != &config.vocabulary {
            return Err(Error::config(
                "vocabulary settings differ from the ones the index was built with; rebuild the index",
            ));
        }
        let works = WorkPeriods::from_config(&config.works);
        Ok(Self { corpus, vocab, phi, works, config })
    }

    /// Build the corpus and vocabulary from parsed tables.
    pub fn build(
        rows: Vec<ThetaRow>,
        phi: PhiTable,
        sections: &HashMap<String, String>,
        original_texts: &HashMap<String, String>,
        config: Config,
    ) -> Result<Self> {
        config.validate()?;
        let corpus = Corpus::from_rows(rows, sections, original_texts)?;
        let vocab = VocabularyIndex::build(&corpus, &config.vocabulary);
        tracing::info!(num_docs = corpus.len(), num_topics = corpus.num_topics(), "built query context");
        Self::new(corpus, vocab, phi, config)
    }

    /// Documents most similar to `query_id`, using the configured candidate pool.
    pub fn closest_docs(&self, query_id: &str) -> Result<RankingResult> {
        self.closest_docs_with(query_id, self.config.search.candidate_pool)
    }

    /// Topic ranking over the whole corpus, prioritization of the top `n`,
    /// then TF-IDF reranking of the priority bucket only.
    pub fn closest_docs_with(&self, query_id: &str, n: usize) -> Result<RankingResult> {
        let topic_scores = rank_by_topic(&self.corpus, query_id, n)?;
        let candidate_ids: Vec<&str> = topic_scores.iter().map(|(id, _)| *id).collect();
        let (priority_ids, secondary_ids) = partition(&candidate_ids, self.works.preferred())?;
        tracing::debug!(
            query_id,
            priority = priority_ids.len(),
            secondary = secondary_ids.len(),
            "partitioned candidates"
        );
        let tfidf_scores = self.vectorizer().rerank(query_id, &priority_ids)?;
        assemble(&topic_scores, &priority_ids, &secondary_ids, &tfidf_scores)
    }

    pub fn vectorizer(&self) -> TfIdfVectorizer<'_> {
        TfIdfVectorizer::new(&self.corpus, &self.vocab)
    }

    pub fn links(&self, doc_id: &str) -> Result<&DocLinks> {
        self.corpus.links(doc_id)
    }

    pub fn top_topics(&self, doc_id: &str) -> Result<Vec<(usize, f64)>> {
        let search = &self.config.search;
        self.corpus.top_topics(doc_id, search.top_topics_max, search.top_topics_threshold)
    }

    pub fn document_view(&self, doc_id: &str) -> Result<DocumentView> {
        let doc = self.corpus.get(doc_id)?;
        let parsed = parse_doc_id(doc_id).ok();
        Ok(DocumentView {
            doc_id: doc.doc_id.clone(),
            work_abbrev: parsed.as_ref().map(|p| p.work_abbrev.to_string()),
            locator: parsed.as_ref().map(|p| p.locator.to_string()),
            work_tier: parsed.as_ref().and_then(|p| self.works.tier(p.work_abbrev)),
            section: doc.section.clone(),
            prev: doc.links.prev.clone(),
            next: doc.links.next.clone(),
            original_text: doc.original_text.clone(),
            segmented_text: doc.segmented_text.clone(),
            top_topics: self.top_topics(doc_id)?,
        })
    }

    pub fn topic_labels(&self) -> &[String] {
        &self.phi.topic_labels
    }

    /// `P(term | topic)` for each topic, if the term was modeled.
    pub fn phi(&self, term: &str) -> Option<&[f64]> {
        self.phi.get(term)
    }
}

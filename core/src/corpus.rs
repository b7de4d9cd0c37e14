use crate::error::{Error, Result};
use crate::tables::ThetaRow;
use crate::tokenizer::tokenize;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Neighbours of a document in ingestion order; the sequence wraps around.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocLinks {
    pub prev: String,
    pub next: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub doc_id: String,
    pub tokens: Vec<String>,
    pub segmented_text: String,
    /// Unsegmented text with original punctuation, when the side file has it.
    pub original_text: Option<String>,
    pub theta: Vec<f64>,
    pub section: Option<String>,
    pub links: DocLinks,
}

/// Documents in ingestion order. Read-only once built.
///
/// Ingestion order is the canonical tie-break order for every ranking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Corpus {
    docs: Vec<Document>,
    positions: HashMap<String, usize>,
    num_topics: usize,
}

impl Corpus {
    /// Build from theta rows, linking each document to its neighbours.
    pub fn from_rows(
        rows: Vec<ThetaRow>,
        sections: &HashMap<String, String>,
        original_texts: &HashMap<String, String>,
    ) -> Result<Self> {
        let n = rows.len();
        if n == 0 {
            return Err(Error::config("corpus has no documents"));
        }
        let ids: Vec<String> = rows.iter().map(|r| r.doc_id.clone()).collect();
        let num_topics = rows[0].theta.len();

        let mut docs: Vec<Document> = Vec::with_capacity(n);
        let mut positions: HashMap<String, usize> = HashMap::with_capacity(n);
        for (i, row) in rows.into_iter().enumerate() {
            if row.theta.len() != num_topics {
                return Err(Error::config(format!(
                    "{}: expected {num_topics} topic weights, found {}",
                    row.doc_id,
                    row.theta.len()
                )));
            }
            if positions.insert(row.doc_id.clone(), i).is_some() {
                return Err(Error::config(format!("duplicate doc id {}", row.doc_id)));
            }
            let links = DocLinks { prev: ids[(i + n - 1) % n].clone(), next: ids[(i + 1) % n].clone() };
            docs.push(Document {
                tokens: tokenize(&row.segmented_text),
                section: sections.get(&row.doc_id).cloned(),
                original_text: original_texts.get(&row.doc_id).cloned(),
                doc_id: row.doc_id,
                segmented_text: row.segmented_text,
                theta: row.theta,
                links,
            });
        }

        for (label, side) in [("section label", sections), ("original text", original_texts)] {
            let unknown = side.keys().filter(|id| !positions.contains_key(*id)).count();
            if unknown > 0 {
                tracing::warn!(unknown, "{label} entries name doc ids absent from the corpus");
            }
        }

        Ok(Self { docs, positions, num_topics })
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    /// Topic count `K` shared by every theta vector.
    pub fn num_topics(&self) -> usize {
        self.num_topics
    }

    pub fn iter(&self) -> impl Iterator<Item = &Document> {
        self.docs.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.docs.iter().map(|d| d.doc_id.as_str())
    }

    pub fn position(&self, doc_id: &str) -> Option<usize> {
        self.positions.get(doc_id).copied()
    }

    pub fn get(&self, doc_id: &str) -> Result<&Document> {
        self.position(doc_id)
            .map(|i| &self.docs[i])
            .ok_or_else(|| Error::DocumentNotFound(doc_id.to_string()))
    }

    pub fn links(&self, doc_id: &str) -> Result<&DocLinks> {
        Ok(&self.get(doc_id)?.links)
    }

    /// The `max_n` heaviest topics of a document that reach `threshold`,
    /// heaviest first; ties keep topic order.
    pub fn top_topics(&self, doc_id: &str, max_n: usize, threshold: f64) -> Result<Vec<(usize, f64)>> {
        let theta = &self.get(doc_id)?.theta;
        let mut indices: Vec<usize> = (0..theta.len()).collect();
        indices.sort_by(|&a, &b| theta[b].total_cmp(&theta[a]));
        Ok(indices
            .into_iter()
            .take(max_n)
            .filter(|&i| theta[i] >= threshold)
            .map(|i| (i, theta[i]))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: &str, text: &str, theta: &[f64]) -> ThetaRow {
        ThetaRow { doc_id: id.into(), segmented_text: text.into(), theta: theta.to_vec() }
    }

    fn abc() -> Corpus {
        let rows = vec![row("A_1", "a b", &[0.5, 0.5]), row("B_1", "b", &[0.5, 0.5]), row("C_1", "c", &[0.5, 0.5])];
        Corpus::from_rows(rows, &HashMap::new(), &HashMap::new()).unwrap()
    }

    #[test]
    fn links_form_one_cycle() {
        let c = abc();
        let l = |id: &str| c.links(id).unwrap().clone();
        assert_eq!(l("A_1"), DocLinks { prev: "C_1".into(), next: "B_1".into() });
        assert_eq!(l("B_1"), DocLinks { prev: "A_1".into(), next: "C_1".into() });
        assert_eq!(l("C_1"), DocLinks { prev: "B_1".into(), next: "A_1".into() });

        let mut seen = vec!["A_1".to_string()];
        let mut cur = c.links("A_1").unwrap().next.clone();
        while cur != "A_1" {
            seen.push(cur.clone());
            cur = c.links(&cur).unwrap().next.clone();
        }
        assert_eq!(seen.len(), c.len());
    }

    #[test]
    fn single_document_links_to_itself() {
        let c = Corpus::from_rows(vec![row("A_1", "a", &[1.0])], &HashMap::new(), &HashMap::new()).unwrap();
        assert_eq!(c.links("A_1").unwrap(), &DocLinks { prev: "A_1".into(), next: "A_1".into() });
    }

    #[test]
    fn empty_corpus_is_rejected() {
        let err = Corpus::from_rows(vec![], &HashMap::new(), &HashMap::new()).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn attaches_side_files() {
        let sections = HashMap::from([("B_1".to_string(), "pratyakṣa".to_string())]);
        let originals = HashMap::from([("B_1".to_string(), "b.".to_string()), ("Z_9".to_string(), "z".to_string())]);
        let rows = vec![row("A_1", "a", &[1.0]), row("B_1", "b", &[1.0])];
        let c = Corpus::from_rows(rows, &sections, &originals).unwrap();
        assert_eq!(c.get("B_1").unwrap().section.as_deref(), Some("pratyakṣa"));
        assert_eq!(c.get("B_1").unwrap().original_text.as_deref(), Some("b."));
        assert!(c.get("A_1").unwrap().section.is_none());
    }

    #[test]
    fn unknown_id_is_not_found() {
        assert!(matches!(abc().get("Q_1"), Err(Error::DocumentNotFound(_))));
    }

    #[test]
    fn top_topics_filters_and_orders() {
        let rows = vec![row("A_1", "a", &[0.02, 0.5, 0.1, 0.1, 0.28])];
        let c = Corpus::from_rows(rows, &HashMap::new(), &HashMap::new()).unwrap();
        assert_eq!(c.top_topics("A_1", 5, 0.03).unwrap(), vec![(1, 0.5), (4, 0.28), (2, 0.1), (3, 0.1)]);
        assert_eq!(c.top_topics("A_1", 2, 0.03).unwrap(), vec![(1, 0.5), (4, 0.28)]);
    }
}

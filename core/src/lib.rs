//! Two-stage "similar documents" retrieval over a segmented corpus.
//!
//! A coarse pass ranks every document by cosine similarity of its
//! precomputed topic distribution; the candidates are then split by the
//! chronology of their source work, and only the preferred bucket is
//! reranked with TF-IDF vectors over the reduced vocabulary.

pub mod config;
pub mod context;
pub mod corpus;
pub mod docid;
pub mod error;
pub mod persist;
pub mod results;
pub mod similarity;
pub mod tables;
pub mod tfidf;
pub mod tokenizer;
pub mod topic;
pub mod vocab;
pub mod works;

pub use config::Config;
pub use context::{DocumentView, QueryContext};
pub use corpus::{Corpus, DocLinks, Document};
pub use docid::{parse_doc_id, ParsedDocId};
pub use error::{Error, Result};
pub use results::{assemble, PriorityHit, RankingResult, SecondaryHit};
pub use tables::{PhiTable, ThetaRow};
pub use vocab::VocabularyIndex;
pub use works::{partition, WorkPeriods};

/// Index of a term within the reduced vocabulary, i.e. a TF-IDF dimension.
pub type TermId = u32;

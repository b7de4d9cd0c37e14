use crate::config::Config;
use crate::context::QueryContext;
use crate::corpus::Corpus;
use crate::error::{Error, Result};
use crate::tables::PhiTable;
use crate::vocab::VocabularyIndex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs::{create_dir_all, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

pub const SNAPSHOT_VERSION: u32 = 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaFile {
    pub num_docs: u32,
    pub num_topics: u32,
    pub full_vocab: u32,
    pub reduced_vocab: u32,
    pub created_at: String,
    pub version: u32,
}

impl MetaFile {
    pub fn describe(ctx: &QueryContext, created_at: String) -> Self {
        Self {
            num_docs: ctx.corpus.len() as u32,
            num_topics: ctx.corpus.num_topics() as u32,
            full_vocab: ctx.vocab.full_vocab.len() as u32,
            reduced_vocab: ctx.vocab.reduced_vocab.len() as u32,
            created_at,
            version: SNAPSHOT_VERSION,
        }
    }
}

pub struct IndexPaths {
    pub root: PathBuf,
}

impl IndexPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    fn corpus(&self) -> PathBuf { self.root.join("corpus.bin") }
    fn vocab(&self) -> PathBuf { self.root.join("vocab.bin") }
    fn phi(&self) -> PathBuf { self.root.join("phi.bin") }
    fn config(&self) -> PathBuf { self.root.join("config.toml") }
    fn meta(&self) -> PathBuf { self.root.join("meta.json") }
}

fn save_bin<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let mut f = BufWriter::new(File::create(path)?);
    bincode::serialize_into(&mut f, value)?;
    f.flush()?;
    Ok(())
}

fn load_bin<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let f = File::open(path).map_err(|e| Error::config(format!("cannot open {}: {e}", path.display())))?;
    Ok(bincode::deserialize_from(BufReader::new(f))?)
}

pub fn save_corpus(paths: &IndexPaths, corpus: &Corpus) -> Result<()> {
    create_dir_all(&paths.root)?;
    save_bin(&paths.corpus(), corpus)
}

pub fn load_corpus(paths: &IndexPaths) -> Result<Corpus> {
    load_bin(&paths.corpus())
}

pub fn save_vocab(paths: &IndexPaths, vocab: &VocabularyIndex) -> Result<()> {
    create_dir_all(&paths.root)?;
    save_bin(&paths.vocab(), vocab)
}

pub fn load_vocab(paths: &IndexPaths) -> Result<VocabularyIndex> {
    load_bin(&paths.vocab())
}

pub fn save_phi(paths: &IndexPaths, phi: &PhiTable) -> Result<()> {
    create_dir_all(&paths.root)?;
    save_bin(&paths.phi(), phi)
}

pub fn load_phi(paths: &IndexPaths) -> Result<PhiTable> {
    load_bin(&paths.phi())
}

pub fn save_config(paths: &IndexPaths, config: &Config) -> Result<()> {
    create_dir_all(&paths.root)?;
    let mut f = File::create(paths.config())?;
    f.write_all(config.to_toml_string()?.as_bytes())?;
    Ok(())
}

pub fn load_config(paths: &IndexPaths) -> Result<Config> {
    Config::load(Some(paths.config().as_path()))
}

pub fn save_meta(paths: &IndexPaths, meta: &MetaFile) -> Result<()> {
    create_dir_all(&paths.root)?;
    let mut f = File::create(paths.meta())?;
    let json = serde_json::to_string_pretty(meta)?;
    f.write_all(json.as_bytes())?;
    Ok(())
}

pub fn load_meta(paths: &IndexPaths) -> Result<MetaFile> {
    let mut f = File::open(paths.meta())
        .map_err(|e| Error::config(format!("cannot open {}: {e}", paths.meta().display())))?;
    let mut buf = String::new();
    f.read_to_string(&mut buf)?;
    let meta: MetaFile = serde_json::from_str(&buf)?;
    Ok(meta)
}

/// Write every part of a built context, then its meta file.
pub fn save_snapshot(paths: &IndexPaths, ctx: &QueryContext, meta: &MetaFile) -> Result<()> {
    save_corpus(paths, &ctx.corpus)?;
    save_vocab(paths, &ctx.vocab)?;
    save_phi(paths, &ctx.phi)?;
    save_config(paths, &ctx.config)?;
    save_meta(paths, meta)?;
    Ok(())
}

/// Load a snapshot written by [`save_snapshot`] and check it against its meta file.
pub fn load_snapshot(paths: &IndexPaths) -> Result<(QueryContext, MetaFile)> {
    let meta = load_meta(paths)?;
    if meta.version != SNAPSHOT_VERSION {
        return Err(Error::config(format!(
            "snapshot version {} is not supported (expected {SNAPSHOT_VERSION})",
            meta.version
        )));
    }
    let corpus = load_corpus(paths)?;
    if meta.num_docs as usize != corpus.len() || meta.num_topics as usize != corpus.num_topics() {
        return Err(Error::config(format!(
            "meta.json describes {} docs x {} topics, corpus has {} x {}",
            meta.num_docs,
            meta.num_topics,
            corpus.len(),
            corpus.num_topics()
        )));
    }
    let vocab = load_vocab(paths)?;
    let phi = load_phi(paths)?;
    let config = load_config(paths)?;
    let ctx = QueryContext::new(corpus, vocab, phi, config)?;
    tracing::info!(root = %paths.root.display(), num_docs = meta.num_docs, "loaded snapshot");
    Ok((ctx, meta))
}

//! Parsers for the precomputed topic-model tables and JSON side files.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

/// Characters the theta export is known to leak into cells.
const THETA_ARTIFACTS: &[char] = &['*', '='];
const THETA_HEADER_ROWS: usize = 2;

/// One document row of the theta table.
#[derive(Debug, Clone, PartialEq)]
pub struct ThetaRow {
    pub doc_id: String,
    pub segmented_text: String,
    pub theta: Vec<f64>,
}

/// Per-term topic probabilities, `P(word | topic)`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PhiTable {
    pub topic_labels: Vec<String>,
    pub phis: HashMap<String, Vec<f64>>,
}

impl PhiTable {
    pub fn num_topics(&self) -> usize {
        self.topic_labels.len()
    }

    pub fn get(&self, term: &str) -> Option<&[f64]> {
        self.phis.get(term).map(Vec::as_slice)
    }
}

/// Split into rows and drop the single trailing blank row, if any.
fn table_rows(text: &str) -> Vec<&str> {
    let mut rows: Vec<&str> = text.split('\n').map(|r| r.strip_suffix('\r').unwrap_or(r)).collect();
    if rows.last().is_some_and(|r| r.trim().is_empty()) {
        rows.pop();
    }
    rows
}

fn parse_floats<'a>(cells: impl Iterator<Item = &'a str>, line: usize, table: &str) -> Result<Vec<f64>> {
    cells
        .map(|c| {
            let value = c
                .trim()
                .parse::<f64>()
                .map_err(|_| Error::config(format!("{table} line {line}: unparseable float {c:?}")))?;
            if !value.is_finite() {
                return Err(Error::config(format!("{table} line {line}: non-finite value {c:?}")));
            }
            Ok(value)
        })
        .collect()
}

/// Parse the tab-separated theta table.
///
/// Layout: two header rows, then `seq \t doc_id \t text \t theta_1 .. theta_K`
/// per document, then a blank row. Rows keep ingestion order.
pub fn parse_theta(text: &str) -> Result<Vec<ThetaRow>> {
    let cleaned: String = text.chars().filter(|c| !THETA_ARTIFACTS.contains(c)).collect();
    let rows = table_rows(&cleaned);
    if rows.len() <= THETA_HEADER_ROWS {
        return Err(Error::config("theta table has no document rows"));
    }

    let mut out: Vec<ThetaRow> = Vec::with_capacity(rows.len() - THETA_HEADER_ROWS);
    let mut seen: HashSet<String> = HashSet::new();
    let mut num_topics: Option<usize> = None;
    for (i, row) in rows.iter().enumerate().skip(THETA_HEADER_ROWS) {
        let line = i + 1;
        let cells: Vec<&str> = row.split('\t').collect();
        if cells.len() < 4 {
            return Err(Error::config(format!(
                "theta line {line}: expected at least 4 columns, found {}",
                cells.len()
            )));
        }
        let doc_id = cells[1].trim().to_string();
        if doc_id.is_empty() {
            return Err(Error::config(format!("theta line {line}: empty doc id")));
        }
        let theta = parse_floats(cells[3..].iter().copied(), line, "theta")?;
        if let Some(w) = theta.iter().find(|w| **w < 0.0) {
            return Err(Error::config(format!("theta line {line}: negative topic weight {w}")));
        }
        match num_topics {
            None => num_topics = Some(theta.len()),
            Some(k) if k != theta.len() => {
                return Err(Error::config(format!(
                    "theta line {line}: expected {k} topic weights, found {}",
                    theta.len()
                )));
            }
            Some(_) => {}
        }
        if !seen.insert(doc_id.clone()) {
            return Err(Error::config(format!("theta line {line}: duplicate doc id {doc_id}")));
        }
        out.push(ThetaRow { doc_id, segmented_text: cells[2].to_string(), theta });
    }
    Ok(out)
}

/// Parse the comma-separated phi table: a header of topic labels (after a
/// corner cell), then `term, phi_1 .. phi_K` per row.
pub fn parse_phi(text: &str) -> Result<PhiTable> {
    let cleaned = text.replace('"', "");
    let rows = table_rows(&cleaned);
    let (header, body) = rows
        .split_first()
        .ok_or_else(|| Error::config("phi table is empty"))?;
    let topic_labels: Vec<String> = header.split(',').skip(1).map(|s| s.trim().to_string()).collect();
    if topic_labels.is_empty() {
        return Err(Error::config("phi header has no topic labels"));
    }

    let mut phis: HashMap<String, Vec<f64>> = HashMap::with_capacity(body.len());
    for (i, row) in body.iter().enumerate() {
        let line = i + 2;
        let mut cells = row.split(',');
        let term = cells.next().unwrap_or_default().to_string();
        let values = parse_floats(cells, line, "phi")?;
        if values.len() != topic_labels.len() {
            return Err(Error::config(format!(
                "phi line {line}: expected {} values, found {}",
                topic_labels.len(),
                values.len()
            )));
        }
        phis.insert(term, values);
    }
    Ok(PhiTable { topic_labels, phis })
}

pub fn load_theta(path: &Path) -> Result<Vec<ThetaRow>> {
    parse_theta(&read_table(path)?)
}

pub fn load_phi(path: &Path) -> Result<PhiTable> {
    parse_phi(&read_table(path)?)
}

/// Load a JSON object mapping doc id to a string (section labels, original text).
pub fn load_side_file(path: &Path) -> Result<HashMap<String, String>> {
    let text = read_table(path)?;
    let map: HashMap<String, String> = serde_json::from_str(&text)
        .map_err(|e| Error::config(format!("{}: {e}", path.display())))?;
    Ok(map)
}

fn read_table(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| Error::config(format!("cannot read {}: {e}", path.display())))
}

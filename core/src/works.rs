//! Chronological work metadata and candidate prioritization.

use crate::config::WorksConfig;
use crate::docid::parse_doc_id;
use crate::error::Result;
use std::collections::HashSet;

/// Work abbreviations grouped into chronological tiers, earliest first.
#[derive(Debug, Clone)]
pub struct WorkPeriods {
    periods: Vec<HashSet<String>>,
    preferred: HashSet<String>,
}

impl WorkPeriods {
    /// The first `preferred_tiers` periods together form the preferred set.
    pub fn new(periods: &[Vec<String>], preferred_tiers: usize) -> Self {
        let periods: Vec<HashSet<String>> = periods.iter().map(|p| p.iter().cloned().collect()).collect();
        let preferred = periods.iter().take(preferred_tiers).flatten().cloned().collect();
        Self { periods, preferred }
    }

    pub fn from_config(config: &WorksConfig) -> Self {
        Self::new(&config.periods, config.preferred_tiers)
    }

    pub fn preferred(&self) -> &HashSet<String> {
        &self.preferred
    }

    /// Earliest tier (0-based) listing the work, if any.
    pub fn tier(&self, work_abbrev: &str) -> Option<usize> {
        self.periods.iter().position(|p| p.contains(work_abbrev))
    }
}

/// Split candidates into `(priority, secondary)` by whether their work is
/// preferred. Input order is kept within each bucket; nothing is dropped.
pub fn partition<'a>(
    candidate_ids: &[&'a str],
    preferred: &HashSet<String>,
) -> Result<(Vec<&'a str>, Vec<&'a str>)> {
    let mut priority = Vec::new();
    let mut secondary = Vec::new();
    for &id in candidate_ids {
        let parsed = parse_doc_id(id)?;
        if preferred.contains(parsed.work_abbrev) {
            priority.push(id);
        } else {
            secondary.push(id);
        }
    }
    Ok((priority, secondary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn periods() -> WorkPeriods {
        let p = |ws: &[&str]| ws.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        WorkPeriods::new(&[p(&["NS", "PDhS"]), p(&["PV"]), p(&["NBhū"])], 2)
    }

    #[test]
    fn preferred_is_union_of_leading_tiers() {
        let w = periods();
        assert_eq!(w.preferred().len(), 3);
        assert!(w.preferred().contains("PV"));
        assert!(!w.preferred().contains("NBhū"));
        assert_eq!(w.tier("NBhū"), Some(2));
        assert_eq!(w.tier("XYZ"), None);
    }

    #[test]
    fn merged_id_goes_to_priority() {
        let w = periods();
        let (p, s) = partition(&["PDhS_175,1_175,4"], w.preferred()).unwrap();
        assert_eq!(p, vec!["PDhS_175,1_175,4"]);
        assert!(s.is_empty());
    }

    #[test]
    fn split_is_disjoint_exhaustive_and_ordered() {
        let w = periods();
        let ids = ["NBhū_1", "NS_1.1.1", "XYZ_4", "PV_2.3", "NS_1.1.2^a", "NBhū_2"];
        let (p, s) = partition(&ids, w.preferred()).unwrap();
        assert_eq!(p, vec!["NS_1.1.1", "PV_2.3", "NS_1.1.2^a"]);
        assert_eq!(s, vec!["NBhū_1", "XYZ_4", "NBhū_2"]);
        assert_eq!(p.len() + s.len(), ids.len());
        assert!(p.iter().all(|id| !s.contains(id)));
    }

    #[test]
    fn work_match_is_exact() {
        let w = periods();
        let (p, s) = partition(&["NSx_1", "N_1"], w.preferred()).unwrap();
        assert!(p.is_empty());
        assert_eq!(s.len(), 2);
    }

    #[test]
    fn malformed_id_fails() {
        let w = periods();
        assert!(matches!(partition(&["NS_1", "broken"], w.preferred()), Err(Error::MalformedDocId(_))));
    }
}

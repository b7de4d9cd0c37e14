//! Startup configuration.
//!
//! Every field has a default, so an empty TOML file is a valid config:
//! ```toml
//! [vocabulary]
//! stopwords = ["iti", "na", "ca"]
//! too_rare_cutoff = 0.002
//! too_common_cutoff = 0.27
//!
//! [works]
//! periods = [["NS", "NBh"], ["PV", "PVSV"], ["NBhū"]]
//! preferred_tiers = 2
//!
//! [search]
//! candidate_pool = 750
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub vocabulary: VocabularyConfig,

    #[serde(default)]
    pub works: WorksConfig,

    #[serde(default)]
    pub search: SearchConfig,
}

/// Controls which terms become TF-IDF dimensions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VocabularyConfig {
    /// Terms excluded from topic modeling; never a TF-IDF dimension.
    #[serde(default = "default_stopwords")]
    pub stopwords: Vec<String>,

    /// Known segmentation artifacts present in the data.
    #[serde(default = "default_error_tokens")]
    pub error_tokens: Vec<String>,

    /// Terms in a smaller share of documents than this are dropped.
    #[serde(default = "default_too_rare_cutoff")]
    pub too_rare_cutoff: f64,

    /// Terms in a larger share of documents than this are dropped.
    #[serde(default = "default_too_common_cutoff")]
    pub too_common_cutoff: f64,
}

impl Default for VocabularyConfig {
    fn default() -> Self {
        Self {
            stopwords: default_stopwords(),
            error_tokens: default_error_tokens(),
            too_rare_cutoff: default_too_rare_cutoff(),
            too_common_cutoff: default_too_common_cutoff(),
        }
    }
}

fn default_stopwords() -> Vec<String> {
    ["iti", "na", "ca", "api", "eva", "tad", "tvāt", "tat", "hi", "ādi", "tu", "vā"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_error_tokens() -> Vec<String> {
    [":", "*tat", "eva*", "*atha", ")"].iter().map(|s| s.to_string()).collect()
}

fn default_too_rare_cutoff() -> f64 {
    0.002
}

fn default_too_common_cutoff() -> f64 {
    0.27
}

/// Chronological tiers of source works, earliest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorksConfig {
    #[serde(default = "default_periods")]
    pub periods: Vec<Vec<String>>,

    /// How many leading tiers count as preferred for fine reranking.
    #[serde(default = "default_preferred_tiers")]
    pub preferred_tiers: usize,
}

impl Default for WorksConfig {
    fn default() -> Self {
        Self { periods: default_periods(), preferred_tiers: default_preferred_tiers() }
    }
}

fn default_periods() -> Vec<Vec<String>> {
    let tiers: [&[&str]; 4] = [
        // pre-Dharmakīrti
        &[
            "AP", "PSV", "NS", "SK", "MS", "VS", "MMK", "ViVy", "YSBh", "PDhS", "YD", "NPS",
            "TriṃśBh", "NV", "ViṃśV", "NBh",
        ],
        // Candrakīrti and Dharmakīrti through Prajñākaragupta and Jayarāśi
        &[
            "PPad", "HB", "NB", "PV", "PVSV", "PVin", "SAS", "SP", "VN", "NBṬ", "TUS", "PSṬ", "ŚV",
            "PVA", "YD",
        ],
        &["NBhū", "VSṬ", "NyKal", "NM", "VyV"],
        &["ŚVK", "AvNir"],
    ];
    tiers
        .iter()
        .map(|tier| tier.iter().map(|s| s.to_string()).collect())
        .collect()
}

fn default_preferred_tiers() -> usize {
    2
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Number of topic-similarity candidates passed to prioritization.
    #[serde(default = "default_candidate_pool")]
    pub candidate_pool: usize,

    #[serde(default = "default_top_topics_max")]
    pub top_topics_max: usize,

    #[serde(default = "default_top_topics_threshold")]
    pub top_topics_threshold: f64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            candidate_pool: default_candidate_pool(),
            top_topics_max: default_top_topics_max(),
            top_topics_threshold: default_top_topics_threshold(),
        }
    }
}

fn default_candidate_pool() -> usize {
    750
}

fn default_top_topics_max() -> usize {
    5
}

fn default_top_topics_threshold() -> f64 {
    0.03
}

impl Config {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file, or return defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let content = std::fs::read_to_string(path).map_err(|e| {
                    Error::config(format!("cannot read config {}: {e}", path.display()))
                })?;
                let config = Self::from_toml_str(&content)?;
                tracing::debug!(path = %path.display(), "loaded config");
                Ok(config)
            }
            None => Ok(Self::default()),
        }
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        let v = &self.vocabulary;
        for (name, value) in [("too_rare_cutoff", v.too_rare_cutoff), ("too_common_cutoff", v.too_common_cutoff)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::config(format!("{name} must be within [0, 1], got {value}")));
            }
        }
        if v.too_rare_cutoff > v.too_common_cutoff {
            return Err(Error::config(format!(
                "too_rare_cutoff ({}) exceeds too_common_cutoff ({})",
                v.too_rare_cutoff, v.too_common_cutoff
            )));
        }
        if self.works.preferred_tiers > self.works.periods.len() {
            return Err(Error::config(format!(
                "preferred_tiers ({}) exceeds the number of periods ({})",
                self.works.preferred_tiers,
                self.works.periods.len()
            )));
        }
        if self.search.candidate_pool == 0 {
            return Err(Error::config("candidate_pool must be positive"));
        }
        Ok(())
    }
}

//! Dataset store: the faux feelings worksheet, loaded once and read-only afterwards
//!
//! Sources are either local files or `http(s)://` URLs. Each is fetched exactly
//! once: no retry, no timeout, no cancellation.

use crate::error::LoadError;
use crate::types::FauxFeelingRecord;
use indexmap::IndexSet;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

/// Where a static resource lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    File(PathBuf),
    Url(String),
}

impl Source {
    /// Interpret a config value: anything starting with http:// or https:// is a URL
    pub fn parse(value: &str) -> Self {
        if value.starts_with("http://") || value.starts_with("https://") {
            Source::Url(value.to_string())
        } else {
            Source::File(PathBuf::from(value))
        }
    }

    /// Whether a local file source is present; URLs are assumed reachable
    pub fn exists(&self) -> bool {
        match self {
            Source::File(path) => path.exists(),
            Source::Url(_) => true,
        }
    }

    /// Read the whole resource as text
    pub async fn read_text(&self) -> Result<String, LoadError> {
        let name = self.to_string();
        match self {
            Source::File(path) => tokio::fs::read_to_string(path)
                .await
                .map_err(|e| LoadError::read(&name, e)),
            Source::Url(url) => {
                let response = reqwest::get(url)
                    .await
                    .map_err(|e| LoadError::fetch(&name, e))?;
                if !response.status().is_success() {
                    return Err(LoadError::fetch(
                        &name,
                        format!("HTTP error! status: {}", response.status()),
                    ));
                }
                response.text().await.map_err(|e| LoadError::fetch(&name, e))
            }
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::File(path) => write!(f, "{}", path.display()),
            Source::Url(url) => f.write_str(url),
        }
    }
}

/// All faux feeling records, indexed by label
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<FauxFeelingRecord>,
    by_label: HashMap<String, usize>,
    needs: IndexSet<String>,
    fingerprint: String,
}

impl Dataset {
    pub fn new(records: Vec<FauxFeelingRecord>) -> Self {
        let mut by_label = HashMap::new();
        let mut needs = IndexSet::new();
        let mut hasher = Sha256::new();

        for (idx, record) in records.iter().enumerate() {
            // Duplicate labels: the first record wins
            by_label.entry(record.faux_feeling.clone()).or_insert(idx);
            for need in &record.needs {
                needs.insert(need.clone());
            }
            hasher.update(record.faux_feeling.as_bytes());
            hasher.update([0u8]);
            for item in record.feelings.iter().chain(record.needs.iter()) {
                hasher.update(item.as_bytes());
                hasher.update([0u8]);
            }
            hasher.update([1u8]);
        }

        Self {
            records,
            by_label,
            needs,
            fingerprint: hex::encode(hasher.finalize()),
        }
    }

    /// Parse the worksheet JSON (an array of records)
    pub fn from_json(source_name: &str, json: &str) -> Result<Self, LoadError> {
        let records: Vec<FauxFeelingRecord> =
            serde_json::from_str(json).map_err(|e| LoadError::parse(source_name, e))?;
        Ok(Self::new(records))
    }

    /// Fetch and parse the worksheet
    pub async fn load(source: &Source) -> Result<Self, LoadError> {
        let text = source.read_text().await?;
        let dataset = Self::from_json(&source.to_string(), &text)?;
        tracing::info!(
            "Loaded {} faux feelings from {} (fingerprint {})",
            dataset.len(),
            source,
            &dataset.fingerprint[..12]
        );
        Ok(dataset)
    }

    pub fn records(&self) -> &[FauxFeelingRecord] {
        &self.records
    }

    /// Look up a record by its exact label
    pub fn find(&self, faux_feeling: &str) -> Option<&FauxFeelingRecord> {
        self.by_label.get(faux_feeling).map(|&idx| &self.records[idx])
    }

    pub fn contains(&self, faux_feeling: &str) -> bool {
        self.by_label.contains_key(faux_feeling)
    }

    /// Whether any record lists this need (exact match)
    pub fn has_need(&self, need: &str) -> bool {
        self.needs.contains(need)
    }

    /// Every feeling across all records, as written, in dataset order
    pub fn feelings(&self) -> impl Iterator<Item = &str> {
        self.records
            .iter()
            .flat_map(|r| r.feelings.iter().map(|s| s.as_str()))
    }

    /// SHA-256 over the record contents, hex encoded
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

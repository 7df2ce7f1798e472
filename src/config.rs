//! Configuration
//!
//! Resolved with precedence CLI flags > environment > config file > defaults.
//! The config file is `<data_dir>/config.json` and is optional.

use crate::dataset::Source;
use crate::types::{GraphGatingMode, SynonymConflictPolicy};
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DATASET_FILE: &str = "faux-feelings-worksheet.json";
pub const SYNONYMS_FILE: &str = "synonyms.json";
pub const CATEGORIES_FILE: &str = "categories.json";
pub const CONFIG_FILE: &str = "config.json";
pub const DEFAULT_PORT: u16 = 3100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub data_dir: PathBuf,
    /// Path or URL of the faux feelings worksheet
    pub dataset: String,
    pub synonyms: Option<String>,
    pub categories: Option<String>,
    pub graph_gating: GraphGatingMode,
    pub synonym_conflicts: SynonymConflictPolicy,
    pub port: u16,
}

/// Everything the config file may set; absent keys fall through to defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    dataset: Option<String>,
    synonyms: Option<String>,
    categories: Option<String>,
    graph_gating: Option<GraphGatingMode>,
    synonym_conflicts: Option<SynonymConflictPolicy>,
    port: Option<u16>,
}

/// Default data directory: XDG data dir on Linux, ~/Library/Application Support on macOS
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("feelings-iceberg")
}

impl Config {
    /// Defaults rooted at `data_dir`
    pub fn with_data_dir(data_dir: &Path) -> Self {
        Self {
            data_dir: data_dir.to_path_buf(),
            dataset: data_dir.join(DATASET_FILE).to_string_lossy().into_owned(),
            synonyms: Some(data_dir.join(SYNONYMS_FILE).to_string_lossy().into_owned()),
            categories: Some(data_dir.join(CATEGORIES_FILE).to_string_lossy().into_owned()),
            graph_gating: GraphGatingMode::default(),
            synonym_conflicts: SynonymConflictPolicy::default(),
            port: DEFAULT_PORT,
        }
    }

    /// Resolve from CLI args and the process environment
    pub fn load(args: &[String]) -> Result<Self> {
        Self::resolve(args, |key| std::env::var(key).ok())
    }

    /// Resolve with an injectable environment lookup
    pub fn resolve<F>(args: &[String], env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let data_dir = flag(args, "--data-dir")
            .or_else(|| env("ICEBERG_DATA_DIR"))
            .map(PathBuf::from)
            .unwrap_or_else(default_data_dir);

        let mut config = Self::with_data_dir(&data_dir);

        let file_path = data_dir.join(CONFIG_FILE);
        if file_path.exists() {
            let text = std::fs::read_to_string(&file_path)
                .with_context(|| format!("Failed to read config from {:?}", file_path))?;
            let file: FileConfig = serde_json::from_str(&text)
                .with_context(|| format!("Invalid config file {:?}", file_path))?;
            config.apply_file(file);
            tracing::debug!("Applied config file {:?}", file_path);
        }

        config.apply_overrides(|key| {
            env(&format!("ICEBERG_{}", key.to_uppercase().replace('-', "_")))
        })?;
        config.apply_overrides(|key| flag(args, &format!("--{}", key)))?;

        Ok(config)
    }

    fn apply_file(&mut self, file: FileConfig) {
        if let Some(dataset) = file.dataset {
            self.dataset = dataset;
        }
        if file.synonyms.is_some() {
            self.synonyms = file.synonyms;
        }
        if file.categories.is_some() {
            self.categories = file.categories;
        }
        if let Some(mode) = file.graph_gating {
            self.graph_gating = mode;
        }
        if let Some(policy) = file.synonym_conflicts {
            self.synonym_conflicts = policy;
        }
        if let Some(port) = file.port {
            self.port = port;
        }
    }

    /// Apply one layer of string overrides keyed by flag name (`gating`, `port`, ...)
    fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dataset) = lookup("dataset") {
            self.dataset = dataset;
        }
        if let Some(synonyms) = lookup("synonyms") {
            self.synonyms = Some(synonyms);
        }
        if let Some(categories) = lookup("categories") {
            self.categories = Some(categories);
        }
        if let Some(mode) = lookup("gating").or_else(|| lookup("graph-gating")) {
            self.graph_gating = mode.parse().map_err(|e: String| anyhow!(e))?;
        }
        if let Some(policy) = lookup("synonym-conflicts") {
            self.synonym_conflicts = policy.parse().map_err(|e: String| anyhow!(e))?;
        }
        if let Some(port) = lookup("port") {
            self.port = port
                .parse()
                .with_context(|| format!("invalid port '{}'", port))?;
        }
        Ok(())
    }

    pub fn dataset_source(&self) -> Source {
        Source::parse(&self.dataset)
    }

    pub fn synonyms_source(&self) -> Option<Source> {
        self.synonyms.as_deref().map(Source::parse)
    }

    pub fn categories_source(&self) -> Option<Source> {
        self.categories.as_deref().map(Source::parse)
    }
}

/// Value of a `--name=value` flag
fn flag(args: &[String], name: &str) -> Option<String> {
    let prefix = format!("{}=", name);
    args.iter()
        .find_map(|a| a.strip_prefix(&prefix).map(|v| v.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_defaults_rooted_in_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let dir_flag = format!("--data-dir={}", dir.path().display());
        let config = Config::resolve(&args(&[dir_flag.as_str()]), no_env).unwrap();

        assert_eq!(config.data_dir, dir.path());
        assert!(config.dataset.ends_with(DATASET_FILE));
        assert_eq!(config.graph_gating, GraphGatingMode::FauxOnly);
        assert_eq!(config.synonym_conflicts, SynonymConflictPolicy::Fail);
        assert_eq!(config.port, DEFAULT_PORT);
        assert!(matches!(config.dataset_source(), Source::File(_)));
    }

    #[test]
    fn test_precedence_cli_over_env_over_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            r#"{"graph_gating": "all-dimensions", "port": 4000, "synonym_conflicts": "warn"}"#,
        )
        .unwrap();

        let env: HashMap<&str, &str> = HashMap::from([
            ("ICEBERG_DATA_DIR", dir.path().to_str().unwrap()),
            ("ICEBERG_PORT", "5000"),
        ]);
        let lookup = |k: &str| env.get(k).map(|v| v.to_string());

        let config = Config::resolve(&args(&[]), lookup).unwrap();
        assert_eq!(config.graph_gating, GraphGatingMode::AllDimensions);
        assert_eq!(config.synonym_conflicts, SynonymConflictPolicy::Warn);
        assert_eq!(config.port, 5000);

        let config =
            Config::resolve(&args(&["--port=6000", "--gating=faux-only"]), lookup).unwrap();
        assert_eq!(config.port, 6000);
        assert_eq!(config.graph_gating, GraphGatingMode::FauxOnly);
    }

    #[test]
    fn test_url_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let dir_flag = format!("--data-dir={}", dir.path().display());
        let config = Config::resolve(
            &args(&[dir_flag.as_str(), "--dataset=https://example.org/worksheet.json"]),
            no_env,
        )
        .unwrap();
        assert!(matches!(config.dataset_source(), Source::Url(_)));
    }

    #[test]
    fn test_invalid_values_are_errors() {
        let dir = tempfile::tempdir().unwrap();
        let dir_flag = format!("--data-dir={}", dir.path().display());
        let err = Config::resolve(&args(&[dir_flag.as_str(), "--gating=sometimes"]), no_env)
            .unwrap_err();
        assert!(err.to_string().contains("sometimes"));
        assert!(Config::resolve(&args(&[dir_flag.as_str(), "--port=high"]), no_env).is_err());
    }

    #[test]
    fn test_unknown_file_keys_rejected() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), r#"{"gatting": "faux-only"}"#).unwrap();
        let dir_flag = format!("--data-dir={}", dir.path().display());
        assert!(Config::resolve(&args(&[dir_flag.as_str()]), no_env).is_err());
    }
}

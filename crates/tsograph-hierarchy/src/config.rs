//! Enrichment configuration loaded from TOML
//!
//! ```toml
//! prune_threshold = 3
//! reduce = true
//! aggregatable_classes = ["IfcPipeSegment", "IfcDuctSegment"]
//!
//! [[rules.functional]]
//! label = "Heating System"
//! patterns = ['h_[\w\- ]*']
//!
//! [[rules.functional.technical]]
//! label = "Supply System"
//! patterns = ['[\w\- ]*vl[\w\- ]*']
//! ```

use crate::error::{ConfigError, RuleError};
use crate::rules::{NamingRules, RuleTables};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tsograph_core::{TopologyReducer, DEFAULT_AGGREGATABLE_CLASSES};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichConfig {
    /// Regions with at most this many components are dropped; 0 keeps everything.
    #[serde(default)]
    pub prune_threshold: usize,
    #[serde(default)]
    pub reduce: bool,
    #[serde(default = "default_aggregatable_classes")]
    pub aggregatable_classes: Vec<String>,
    /// Replaces the built-in naming tables when present.
    #[serde(default)]
    pub rules: Option<RuleTables>,
}

fn default_aggregatable_classes() -> Vec<String> {
    DEFAULT_AGGREGATABLE_CLASSES.iter().map(|c| c.to_string()).collect()
}

impl Default for EnrichConfig {
    fn default() -> Self {
        Self {
            prune_threshold: 0,
            reduce: false,
            aggregatable_classes: default_aggregatable_classes(),
            rules: None,
        }
    }
}

impl EnrichConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Compile the configured rule tables, or the built-in ones.
    pub fn naming_rules(&self) -> Result<NamingRules, RuleError> {
        match &self.rules {
            Some(tables) => NamingRules::from_tables(tables),
            None => NamingRules::standard(),
        }
    }

    pub fn reducer(&self) -> TopologyReducer {
        TopologyReducer::new(self.aggregatable_classes.iter().cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::FunctionalKind;

    #[test]
    fn empty_file_gives_defaults() {
        let config = EnrichConfig::from_toml_str("").unwrap();
        assert_eq!(config, EnrichConfig::default());
        assert!(config.reducer().is_aggregatable("IfcDuctFitting"));
    }

    #[test]
    fn rule_tables_keep_file_order() {
        let config = EnrichConfig::from_toml_str(
            r#"
prune_threshold = 2

[[rules.functional]]
label = "Cooling System"
patterns = ['[\w\- ]*kalt[\w\- ]*']

[[rules.functional.technical]]
label = "Return System"
patterns = ['[\w\- ]*rl[\w\- ]*']

[[rules.functional.technical]]
label = "Supply System"
patterns = ['[\w\- ]*vl[\w\- ]*']
"#,
        )
        .unwrap();

        assert_eq!(config.prune_threshold, 2);
        let rules = config.naming_rules().unwrap();
        assert_eq!(rules.functional_matches("Kaltwasser VL"), vec![FunctionalKind::Cooling]);
        let cooling = rules.rule_for(FunctionalKind::Cooling).unwrap();
        let labels: Vec<&str> = cooling.technical().iter().map(|t| t.label()).collect();
        assert_eq!(labels, vec!["Return System", "Supply System"]);
    }

    #[test]
    fn unknown_label_is_a_parse_error() {
        let err = EnrichConfig::from_toml_str(
            r#"
[[rules.functional]]
label = "Steam System"
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = EnrichConfig::load(Path::new("/nonexistent/tsograph.toml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/tsograph.toml"));
    }
}

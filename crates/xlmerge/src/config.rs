//! Run configuration.

use serde::{Deserialize, Serialize};

/// Configuration for one merge run, deserializable from `config.yaml`:
///
/// ```yaml
/// auto_size_columns: true
/// sources:
///   - january.xlsx
///   - february.xls
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MergeConfig {
    /// Resize header-indexed output columns to fit their content
    #[serde(default)]
    pub auto_size_columns: bool,

    /// Input files in merge order
    #[serde(default)]
    pub sources: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_are_empty() {
        let config = MergeConfig::default();
        assert!(!config.auto_size_columns);
        assert!(config.sources.is_empty());
    }

    #[test]
    fn parses_yaml() {
        let yaml = "auto_size_columns: true\nsources:\n  - a.xlsx\n  - b.xls\n";
        let config: MergeConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(config.auto_size_columns);
        assert_eq!(config.sources, vec!["a.xlsx", "b.xls"]);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: MergeConfig = serde_yaml::from_str("sources: [x.xlsx]").unwrap();
        assert!(!config.auto_size_columns);
        assert_eq!(config.sources, vec!["x.xlsx"]);
    }
}

//! Analysis configuration.
//!
//! Loaded from YAML; every field is optional.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::frontend::ClassPath;

pub const DEFAULT_MAX_PARAMETERS: usize = 7;
pub const DEFAULT_METHOD_NAME_FORMAT: &str = "^[a-z][a-zA-Z0-9]*$";

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct AnalysisConfig {
    #[serde(default)]
    pub version: String,
    /// Rule keys (`S107` or `java:S107`) the runner does not instantiate
    #[serde(default)]
    pub disabled_rules: Vec<String>,
    /// Analyze units in parallel (default: true)
    #[serde(default)]
    pub parallel: Option<bool>,
    /// Extra YAML class path files merged over the embedded JDK subset
    #[serde(default)]
    pub class_path: Vec<PathBuf>,
    #[serde(default)]
    pub rules: RulesConfig,
    #[serde(default)]
    pub filters: FiltersConfig,
}

impl AnalysisConfig {
    /// Parse a configuration from a YAML file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> anyhow::Result<Self> {
        let config: AnalysisConfig = serde_yaml::from_str(content)?;
        Ok(config)
    }

    pub fn is_parallel(&self) -> bool {
        self.parallel.unwrap_or(true)
    }

    pub fn is_rule_enabled(&self, key: &str) -> bool {
        !self
            .disabled_rules
            .iter()
            .any(|r| crate::filters::rule_name(r) == crate::filters::rule_name(key))
    }

    /// The embedded JDK subset merged with every configured class path file.
    pub fn load_class_path(&self) -> anyhow::Result<ClassPath> {
        let mut class_path = ClassPath::jdk();
        for path in &self.class_path {
            let extra = ClassPath::parse_file(path)
                .map_err(|e| anyhow::anyhow!("class path {}: {}", path.display(), e))?;
            class_path.merge(extra);
        }
        Ok(class_path)
    }

    /// Check the configuration for errors serde cannot catch.
    pub fn validate(&self) -> anyhow::Result<()> {
        if let Some(format) = &self.rules.bad_method_name.format {
            regex::Regex::new(format)
                .map_err(|e| anyhow::anyhow!("invalid bad_method_name format {:?}: {}", format, e))?;
        }
        if self.rules.too_many_parameters.max == Some(0) {
            anyhow::bail!("too_many_parameters max must be positive");
        }
        Ok(())
    }
}

/// Per-rule settings.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct RulesConfig {
    #[serde(default)]
    pub too_many_parameters: TooManyParametersConfig,
    #[serde(default)]
    pub bad_method_name: BadMethodNameConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct TooManyParametersConfig {
    /// Largest accepted parameter count (default: 7)
    #[serde(default)]
    pub max: Option<usize>,
}

impl TooManyParametersConfig {
    pub fn max(&self) -> usize {
        self.max.unwrap_or(DEFAULT_MAX_PARAMETERS)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct BadMethodNameConfig {
    #[serde(default)]
    pub format: Option<String>,
}

impl BadMethodNameConfig {
    pub fn format(&self) -> &str {
        self.format.as_deref().unwrap_or(DEFAULT_METHOD_NAME_FORMAT)
    }
}

/// Issue filter settings.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct FiltersConfig {
    #[serde(default)]
    pub framework: FrameworkFilterConfig,
    /// Honor `@SuppressWarnings` (default: true)
    #[serde(default)]
    pub suppress_warnings: Option<bool>,
    /// Honor `semacheck:` comments (default: true)
    #[serde(default)]
    pub inline_comments: Option<bool>,
}

impl FiltersConfig {
    pub fn suppress_warnings_enabled(&self) -> bool {
        self.suppress_warnings.unwrap_or(true)
    }

    pub fn inline_comments_enabled(&self) -> bool {
        self.inline_comments.unwrap_or(true)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct FrameworkFilterConfig {
    #[serde(default)]
    pub enabled: Option<bool>,
    /// Method annotations that exempt a method from the parameter count rule
    #[serde(default)]
    pub method_annotation_exceptions: Vec<String>,
    /// Class annotations that exempt constructors from the parameter count rule
    #[serde(default)]
    pub class_annotation_exceptions: Vec<String>,
}

impl FrameworkFilterConfig {
    pub fn is_enabled(&self) -> bool {
        self.enabled.unwrap_or(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_config() {
        let yaml = r#"
version: "1.0"
disabled_rules:
  - java:S1258
parallel: false
rules:
  too_many_parameters:
    max: 4
filters:
  framework:
    method_annotation_exceptions:
      - com.acme.Endpoint
  inline_comments: false
"#;
        let config = AnalysisConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.version, "1.0");
        assert!(!config.is_parallel());
        assert!(!config.is_rule_enabled("S1258"));
        assert!(config.is_rule_enabled("S107"));
        assert_eq!(config.rules.too_many_parameters.max(), 4);
        assert_eq!(config.rules.bad_method_name.format(), DEFAULT_METHOD_NAME_FORMAT);
        assert!(config.filters.framework.is_enabled());
        assert_eq!(
            config.filters.framework.method_annotation_exceptions,
            vec!["com.acme.Endpoint".to_string()]
        );
        assert!(config.filters.suppress_warnings_enabled());
        assert!(!config.filters.inline_comments_enabled());
        config.validate().unwrap();
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = AnalysisConfig::from_yaml_str("{}").unwrap();
        assert!(config.is_parallel());
        assert_eq!(config.rules.too_many_parameters.max(), DEFAULT_MAX_PARAMETERS);
        assert!(config.disabled_rules.is_empty());
    }

    #[test]
    fn test_validate_rejects_bad_regex() {
        let yaml = "rules:\n  bad_method_name:\n    format: \"[a-z\"\n";
        let config = AnalysisConfig::from_yaml_str(yaml).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_file_and_class_path() {
        let temp = TempDir::new().unwrap();
        let class_path = temp.path().join("spring.yaml");
        std::fs::write(
            &class_path,
            "types:\n  - name: org.springframework.stereotype.Component\n    kind: annotation\n",
        )
        .unwrap();
        let config_path = temp.path().join("semacheck.yaml");
        std::fs::write(
            &config_path,
            format!("class_path:\n  - {}\n", class_path.display()),
        )
        .unwrap();

        let config = AnalysisConfig::parse_file(&config_path).unwrap();
        let loaded = config.load_class_path().unwrap();
        assert!(loaded.contains("org.springframework.stereotype.Component"));
        assert!(loaded.contains("java.lang.Object"));
    }

    #[test]
    fn test_missing_class_path_file_is_an_error() {
        let config = AnalysisConfig {
            class_path: vec![PathBuf::from("/nonexistent/semacheck-classpath.yaml")],
            ..Default::default()
        };
        assert!(config.load_class_path().is_err());
    }
}

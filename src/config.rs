//! Analysis configuration.

use crate::error::Error;

/// Knobs for resolution, validation and workspace loading.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "kebab-case"))]
pub struct AnalysisConfig {
    /// Rule names to skip, e.g. `"orphan-detection"`.
    pub disabled_rules: Vec<String>,
    /// Children per element before the complexity rule reports it.
    pub max_children: usize,
    /// Outgoing relations per element before the complexity rule reports it.
    pub max_outgoing_relations: usize,
    /// Extension of architecture files, without the dot.
    pub file_extension: String,
    /// Resolve otherwise unknown names against top-level elements of every
    /// indexed file.
    pub workspace_fallback: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            disabled_rules: Vec::new(),
            max_children: 20,
            max_outgoing_relations: 12,
            file_extension: "arch".to_string(),
            workspace_fallback: true,
        }
    }
}

impl AnalysisConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_disabled_rule(mut self, rule: impl Into<String>) -> Self {
        self.disabled_rules.push(rule.into());
        self
    }

    pub fn with_max_children(mut self, max: usize) -> Self {
        self.max_children = max;
        self
    }

    pub fn with_max_outgoing_relations(mut self, max: usize) -> Self {
        self.max_outgoing_relations = max;
        self
    }

    pub fn with_file_extension(mut self, extension: impl Into<String>) -> Self {
        self.file_extension = extension.into().trim_start_matches('.').to_string();
        self
    }

    pub fn with_workspace_fallback(mut self, enabled: bool) -> Self {
        self.workspace_fallback = enabled;
        self
    }

    pub fn is_rule_enabled(&self, rule: &str) -> bool {
        !self.disabled_rules.iter().any(|r| r == rule)
    }

    /// Whether `path` has the configured architecture file extension.
    pub fn matches_extension(&self, path: &std::path::Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(&self.file_extension))
    }

    /// Load from TOML. Missing keys keep their defaults.
    #[cfg(feature = "serde")]
    pub fn from_toml_str(text: &str) -> Result<Self, Error> {
        toml::from_str(text).map_err(|e| Error::config(e.to_string()))
    }

    /// Reject values no analysis can work with.
    pub fn validate(&self) -> Result<(), Error> {
        if self.file_extension.is_empty() {
            return Err(Error::config("file extension must not be empty"));
        }
        if self.max_children == 0 || self.max_outgoing_relations == 0 {
            return Err(Error::config("complexity thresholds must be positive"));
        }
        Ok(())
    }
}

//! Compiler options
//!
//! Options are plain serde data so hosts can keep them in YAML next to the
//! project they compile.

use crate::error::{CompileError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Which components a document starts with before its directives apply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeMode {
    /// Every registered descriptor is in scope; directives narrow or extend it
    #[default]
    All,
    /// Nothing is in scope until an `@addTagHelper` adds it
    Directives,
}

/// Compiler options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerOptions {
    /// How the initial component scope is formed
    pub scope_mode: ScopeMode,
    /// Run syntax tree passes
    pub enable_syntax_passes: bool,
    /// Run IR passes
    pub enable_optimization: bool,
    /// Tag prefix in effect before any `@tagHelperPrefix`
    pub default_tag_prefix: Option<String>,
    /// File name of import documents looked up in parent directories
    pub import_file_name: String,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            scope_mode: ScopeMode::All,
            enable_syntax_passes: true,
            enable_optimization: true,
            default_tag_prefix: None,
            import_file_name: "_Imports.stencil".to_string(),
        }
    }
}

impl CompilerOptions {
    /// Create options with defaults
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scope_mode(mut self, scope_mode: ScopeMode) -> Self {
        self.scope_mode = scope_mode;
        self
    }

    pub fn with_default_tag_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.default_tag_prefix = Some(prefix.into());
        self
    }

    pub fn with_optimization(mut self, enabled: bool) -> Self {
        self.enable_optimization = enabled;
        self
    }

    pub fn with_syntax_passes(mut self, enabled: bool) -> Self {
        self.enable_syntax_passes = enabled;
        self
    }

    /// Parse options from YAML; missing fields take their defaults
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| CompileError::Config(e.to_string()))
    }

    /// Load options from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| CompileError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_yaml_str(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = CompilerOptions::default();
        assert_eq!(options.scope_mode, ScopeMode::All);
        assert!(options.enable_syntax_passes);
        assert!(options.enable_optimization);
        assert_eq!(options.import_file_name, "_Imports.stencil");
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let options = CompilerOptions::from_yaml_str(
            "scope_mode: directives\ndefault_tag_prefix: \"th:\"\n",
        )
        .unwrap();
        assert_eq!(options.scope_mode, ScopeMode::Directives);
        assert_eq!(options.default_tag_prefix.as_deref(), Some("th:"));
        assert!(options.enable_optimization);
    }

    #[test]
    fn test_invalid_yaml_is_config_error() {
        let err = CompilerOptions::from_yaml_str("scope_mode: sometimes").unwrap_err();
        assert!(matches!(err, CompileError::Config(_)));
    }
}

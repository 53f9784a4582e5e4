//! Pipeline configuration.
//!
//! ```yaml
//! # every field is optional
//! max_include_depth: 16
//! container_tag: span
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{RenderError, Result};

/// Default bound on nested includes.
pub const DEFAULT_MAX_INCLUDE_DEPTH: usize = 32;

/// Default tag for structural wrapper elements.
pub const DEFAULT_CONTAINER_TAG: &str = "div";

/// Tunables for [`RenderingPipeline`](crate::RenderingPipeline) and
/// [`BlueprintMaterializer`](crate::BlueprintMaterializer).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// How many includes may be nested, counting the top-level blueprint.
    pub max_include_depth: usize,
    /// Tag used for the wrapper element emitted by multi-child conditionals
    /// and repeats.
    pub container_tag: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_include_depth: DEFAULT_MAX_INCLUDE_DEPTH,
            container_tag: DEFAULT_CONTAINER_TAG.to_string(),
        }
    }
}

impl PipelineConfig {
    /// Parses a config from YAML. Missing fields take their defaults.
    ///
    /// # Example
    ///
    /// ```rust
    /// use blueprint_render::PipelineConfig;
    ///
    /// let config = PipelineConfig::from_yaml("container_tag: span").unwrap();
    /// assert_eq!(config.container_tag, "span");
    /// assert_eq!(config.max_include_depth, 32);
    /// ```
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        // a document holding only comments parses as null, not as a map
        let value: serde_yaml::Value = serde_yaml::from_str(yaml)?;
        if value.is_null() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_value(value)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a YAML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| RenderError::Config(format!("failed to read {}: {}", path.display(), e)))?;
        Self::from_yaml(&content)
    }

    pub fn with_max_include_depth(mut self, depth: usize) -> Self {
        self.max_include_depth = depth;
        self
    }

    pub fn with_container_tag(mut self, tag: impl Into<String>) -> Self {
        self.container_tag = tag.into();
        self
    }

    /// Checks that the include depth is at least 1 and the container tag is
    /// not blank.
    pub fn validate(&self) -> Result<()> {
        if self.max_include_depth == 0 {
            return Err(RenderError::Config(
                "max_include_depth must be at least 1".to_string(),
            ));
        }
        if self.container_tag.trim().is_empty() {
            return Err(RenderError::Config("container_tag must not be empty".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.max_include_depth, 32);
        assert_eq!(config.container_tag, "div");
    }

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(PipelineConfig::from_yaml("").unwrap(), PipelineConfig::default());
        assert_eq!(
            PipelineConfig::from_yaml("# nothing\n").unwrap(),
            PipelineConfig::default()
        );
    }

    #[test]
    fn test_partial_yaml() {
        let config = PipelineConfig::from_yaml("max_include_depth: 4").unwrap();
        assert_eq!(config.max_include_depth, 4);
        assert_eq!(config.container_tag, "div");
    }

    #[test]
    fn test_validate_builder_values() {
        assert!(PipelineConfig::default().validate().is_ok());
        assert!(matches!(
            PipelineConfig::default().with_max_include_depth(0).validate(),
            Err(RenderError::Config(_))
        ));
        assert!(matches!(
            PipelineConfig::default().with_container_tag("  ").validate(),
            Err(RenderError::Config(_))
        ));
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            PipelineConfig::from_yaml("max_include_depth: 0"),
            Err(RenderError::Config(_))
        ));
        assert!(matches!(
            PipelineConfig::from_yaml("container_tag: ''"),
            Err(RenderError::Config(_))
        ));
        assert!(matches!(
            PipelineConfig::from_yaml("unknown: 1"),
            Err(RenderError::Config(_))
        ));
        assert!(matches!(
            PipelineConfig::from_yaml("max_include_depth: lots"),
            Err(RenderError::Config(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let err = PipelineConfig::load("/definitely/not/here.yaml").unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }

    #[test]
    fn test_builders() {
        let config = PipelineConfig::default()
            .with_max_include_depth(2)
            .with_container_tag("section");
        assert_eq!(config.max_include_depth, 2);
        assert_eq!(config.container_tag, "section");
    }
}

use std::path::Path;

use metanet_core::SimplificationMethod;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::util::check_range;

/// Hard bounds on traversal limits.
pub const DEPTH_BOUNDS: (u32, u32) = (0, 100);
pub const PATHS_BOUNDS: (u32, u32) = (1, 100);

/// Explorer settings, read from TOML. Every field has a default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Whether compartment identity distinguishes metabolites.
    pub compartmentalization: bool,
    /// How simplified metabolites are drawn.
    pub simplification: SimplificationMethod,
    pub filters: Filters,
    pub traversal: TraversalLimits,
    /// Derive reaction behaviors from participants when loading a model.
    pub derive_behaviors: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            compartmentalization: false,
            simplification: SimplificationMethod::Omission,
            filters: Filters::default(),
            traversal: TraversalLimits::default(),
            derive_behaviors: true,
        }
    }
}

/// Value-set filters: `"*"` for everything, or a comma-separated list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Filters {
    pub compartments: String,
    pub processes: String,
}

impl Default for Filters {
    fn default() -> Self {
        Self {
            compartments: "*".to_string(),
            processes: "*".to_string(),
        }
    }
}

impl Filters {
    pub fn compartment_filter(&self) -> Filter {
        parse_filter(&self.compartments)
    }

    pub fn process_filter(&self) -> Filter {
        parse_filter(&self.processes)
    }
}

/// Upper bounds on traversal requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraversalLimits {
    pub max_depth: u32,
    pub max_paths: u32,
}

impl Default for TraversalLimits {
    fn default() -> Self {
        Self {
            max_depth: 10,
            max_paths: 10,
        }
    }
}

impl Settings {
    /// Read settings from a TOML file, or defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let settings = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path)?;
                let settings: Settings = toml::from_str(&text)?;
                debug!(path = %path.display(), "loaded settings");
                settings
            }
            None => Settings::default(),
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        check_range(
            "traversal.max_depth",
            i64::from(self.traversal.max_depth),
            DEPTH_BOUNDS,
        )?;
        check_range(
            "traversal.max_paths",
            i64::from(self.traversal.max_paths),
            PATHS_BOUNDS,
        )?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    All,
    Set(Vec<String>),
}

pub fn parse_filter(value: &str) -> Filter {
    if value.trim() == "*" {
        Filter::All
    } else {
        Filter::Set(
            value.split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        )
    }
}

pub fn matches_filter(name: &str, filter: &Filter) -> bool {
    match filter {
        Filter::All => true,
        Filter::Set(names) => names.iter().any(|n| n == name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExplorerError;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert!(!settings.compartmentalization);
        assert_eq!(settings.simplification, SimplificationMethod::Omission);
        assert_eq!(settings.traversal.max_depth, 10);
        assert_eq!(settings.traversal.max_paths, 10);
        assert!(settings.derive_behaviors);
        assert_eq!(settings.filters.compartment_filter(), Filter::All);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            compartmentalization = true
            simplification = "replication"

            [filters]
            processes = "glycolysis, tca"
            "#,
        )
        .unwrap();
        assert!(settings.compartmentalization);
        assert_eq!(settings.simplification, SimplificationMethod::Replication);
        assert_eq!(settings.filters.compartments, "*");
        assert_eq!(
            settings.filters.process_filter(),
            Filter::Set(vec!["glycolysis".to_string(), "tca".to_string()])
        );
        assert_eq!(settings.traversal, TraversalLimits::default());
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let mut settings = Settings::default();
        settings.traversal.max_paths = 0;
        match settings.validate() {
            Err(ExplorerError::Limit { parameter, value, .. }) => {
                assert_eq!(parameter, "traversal.max_paths");
                assert_eq!(value, 0);
            }
            other => panic!("expected limit error, got {:?}", other),
        }
        settings.traversal.max_paths = 5;
        settings.traversal.max_depth = 101;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_parse_filter() {
        assert_eq!(parse_filter(" * "), Filter::All);
        assert_eq!(parse_filter("c, ,m"), Filter::Set(vec!["c".into(), "m".into()]));
        assert_eq!(parse_filter(""), Filter::Set(Vec::new()));
    }

    #[test]
    fn test_matches_filter() {
        assert!(matches_filter("c", &Filter::All));
        let filter = parse_filter("c,m");
        assert!(matches_filter("m", &filter));
        assert!(!matches_filter("e", &filter));
    }
}

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{Result, SiftError};
use crate::filter::FieldOptions;
use crate::value::FilterValue;

/// Per-view filter setup from sift.toml: field defaults, custom fragment
/// templates, and an always-applied constraints string.
#[derive(Debug, Deserialize, Serialize, Default, Clone)]
pub struct ViewConfig {
    #[serde(default)]
    pub defaults: BTreeMap<String, toml::Value>,
    #[serde(default)]
    pub templates: BTreeMap<String, String>,
    pub constraints: Option<String>,
}

impl ViewConfig {
    /// Build registration options for a field from this view's config.
    pub fn field_options(&self, field: &str) -> FieldOptions {
        let mut opts = FieldOptions::new();
        if let Some(template) = self.templates.get(field) {
            opts = opts.template(template.clone());
        }
        if let Some(value) = self.defaults.get(field) {
            opts = opts.default_to(value_from_toml(value));
        }
        opts
    }

    pub fn constraints(&self) -> &str {
        self.constraints.as_deref().unwrap_or("")
    }
}

/// Top-level config file structure: one `[view."<path>"]` table per list
/// view, keyed by request path.
#[derive(Debug, Deserialize, Serialize, Default, Clone)]
pub struct FilterConfig {
    #[serde(default)]
    pub view: BTreeMap<String, ViewConfig>,
}

impl FilterConfig {
    /// Load config from the given path. Returns default if file doesn't
    /// exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(FilterConfig::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: FilterConfig =
            toml::from_str(&content).map_err(|source| SiftError::ConfigParse {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(config)
    }

    /// Get the view config for a request path.
    pub fn view(&self, path: &str) -> Option<&ViewConfig> {
        self.view.get(path)
    }
}

fn value_from_toml(value: &toml::Value) -> FilterValue {
    match value {
        toml::Value::Integer(n) => FilterValue::Int(*n),
        toml::Value::String(s) => FilterValue::from_raw(s),
        toml::Value::Array(items) => {
            let strings: Vec<String> = items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect();
            FilterValue::from_list(&strings)
        }
        other => FilterValue::from_raw(&other.to_string()),
    }
}

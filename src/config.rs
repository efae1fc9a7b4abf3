use crate::core::query::ProviderContext;
use crate::error::ConfigError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_QUIET_PERIOD_MS: u64 = 500;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct SelectorConfig {
    pub label: String,
    pub help_text: String,
    pub required: bool,
    /// Keystroke quiet period before the provider is called.
    pub quiet_period_ms: u64,
    /// Delay before a blur closes the panel. Falls back to the quiet period.
    pub blur_close_delay_ms: Option<u64>,
    pub selected_id: Option<String>,
    pub search_string: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            label: "Parent Account".to_string(),
            help_text: "Start your search using some text input".to_string(),
            required: false,
            quiet_period_ms: DEFAULT_QUIET_PERIOD_MS,
            blur_close_delay_ms: None,
            selected_id: None,
            search_string: String::new(),
        }
    }
}

impl SelectorConfig {
    pub fn quiet_period(&self) -> Duration {
        Duration::from_millis(self.quiet_period_ms)
    }

    pub fn blur_close_delay(&self) -> Duration {
        Duration::from_millis(self.blur_close_delay_ms.unwrap_or(self.quiet_period_ms))
    }

    pub fn with_selected_id(mut self, selected_id: impl Into<String>) -> Self {
        self.selected_id = Some(selected_id.into());
        self
    }

    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn with_quiet_period_ms(mut self, quiet_period_ms: u64) -> Self {
        self.quiet_period_ms = quiet_period_ms;
        self
    }
}

/// Everything one lookup needs from a config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupConfig {
    pub selector: SelectorConfig,
    pub context: ProviderContext,
}

impl LookupConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        load_document(path)
    }
}

/// Reads a YAML document, or JSON when the extension says so.
pub fn load_document<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        serde_json::from_str(&text).map_err(|source| ConfigError::ParseJson {
            path: path.to_path_buf(),
            source,
        })
    } else {
        serde_yaml::from_str(&text).map_err(|source| ConfigError::ParseYaml {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Input placeholder for an object, e.g. `Search Accounts...`.
pub fn placeholder_for(object_api_name: &str) -> String {
    if object_api_name.eq_ignore_ascii_case("opportunity") {
        return "Search Opportunities...".to_string();
    }

    let mut chars = object_api_name.chars();
    let capitalized = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
        None => String::new(),
    };
    format!("Search {capitalized}s...")
}

#[cfg(test)]
mod tests {
    use super::{LookupConfig, SelectorConfig, load_document, placeholder_for};
    use crate::error::ConfigError;
    use std::time::Duration;

    #[test]
    fn placeholder_pluralizes_object_name() {
        assert_eq!(placeholder_for("account"), "Search Accounts...");
        assert_eq!(placeholder_for("Contact"), "Search Contacts...");
        assert_eq!(placeholder_for("OPPORTUNITY"), "Search Opportunities...");
    }

    #[test]
    fn blur_delay_defaults_to_quiet_period() {
        let config = SelectorConfig::default().with_quiet_period_ms(250);
        assert_eq!(config.blur_close_delay(), Duration::from_millis(250));

        let config = SelectorConfig {
            blur_close_delay_ms: Some(80),
            ..config
        };
        assert_eq!(config.blur_close_delay(), Duration::from_millis(80));
    }

    #[test]
    fn partial_yaml_fills_defaults() {
        let yaml = "selector:\n  required: true\ncontext:\n  object_api_name: Contact\n";
        let config: LookupConfig = serde_yaml::from_str(yaml).expect("parse");
        assert!(config.selector.required);
        assert_eq!(config.selector.quiet_period_ms, 500);
        assert_eq!(config.context.object_api_name, "Contact");
        assert_eq!(config.context.field_api_name, "Name");
    }

    #[test]
    fn missing_file_reports_read_error() {
        let path = std::env::temp_dir().join("steply-lookup-missing-config.yaml");
        let err = load_document::<LookupConfig>(&path).expect_err("missing file");
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn json_extension_uses_json_parser() {
        let path = std::env::temp_dir().join(format!(
            "steply-lookup-config-{}.json",
            std::process::id()
        ));
        std::fs::write(&path, r#"{"selector":{"label":"Owner"}}"#).expect("write");
        let config = LookupConfig::load(&path).expect("load");
        let _ = std::fs::remove_file(&path);
        assert_eq!(config.selector.label, "Owner");
    }
}

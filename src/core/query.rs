use crate::core::record::Candidate;
use crate::error::ProviderError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Caller-supplied filter parameters forwarded to the record provider.
///
/// The selector clones this into every query and never reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct ProviderContext {
    pub object_api_name: String,
    pub field_api_name: String,
    pub other_field_api_name: String,
    pub parent_record_id: Option<String>,
    pub parent_field_api_name: Option<String>,
    pub include_closed: bool,
    pub extra: IndexMap<String, String>,
}

impl Default for ProviderContext {
    fn default() -> Self {
        Self {
            object_api_name: "Account".to_string(),
            field_api_name: "Name".to_string(),
            other_field_api_name: "Industry".to_string(),
            parent_record_id: None,
            parent_field_api_name: None,
            include_closed: false,
            extra: IndexMap::new(),
        }
    }
}

impl ProviderContext {
    pub fn new(object_api_name: impl Into<String>) -> Self {
        Self {
            object_api_name: object_api_name.into(),
            ..Self::default()
        }
    }

    pub fn with_fields(
        mut self,
        field_api_name: impl Into<String>,
        other_field_api_name: impl Into<String>,
    ) -> Self {
        self.field_api_name = field_api_name.into();
        self.other_field_api_name = other_field_api_name.into();
        self
    }

    pub fn with_parent(
        mut self,
        parent_field_api_name: impl Into<String>,
        parent_record_id: impl Into<String>,
    ) -> Self {
        self.parent_field_api_name = Some(parent_field_api_name.into());
        self.parent_record_id = Some(parent_record_id.into());
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

/// Immutable snapshot of what the provider is asked for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchQuery {
    pub query_text: String,
    pub selected_id: Option<String>,
    pub context: ProviderContext,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryPurpose {
    /// Populate the dropdown.
    Search,
    /// Resolve the display label of the initial selection.
    LoadSelectedLabel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub seq: u64,
    pub purpose: QueryPurpose,
    pub query: SearchQuery,
}

impl SearchRequest {
    pub fn complete(&self, outcome: Result<Vec<Candidate>, ProviderError>) -> SearchCompletion {
        SearchCompletion {
            seq: self.seq,
            purpose: self.purpose,
            selected_id: self.query.selected_id.clone(),
            outcome,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchCompletion {
    pub seq: u64,
    pub purpose: QueryPurpose,
    /// Selection id at dispatch time.
    pub selected_id: Option<String>,
    pub outcome: Result<Vec<Candidate>, ProviderError>,
}

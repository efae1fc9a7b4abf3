use crate::config::load_document;
use crate::core::query::{ProviderContext, SearchQuery};
use crate::core::record::Candidate;
use crate::error::{ConfigError, ProviderError};
use crate::provider::RecordProvider;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

const DEFAULT_LIMIT: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub id: String,
    pub object: String,
    #[serde(default)]
    pub fields: IndexMap<String, String>,
}

impl StoredRecord {
    pub fn new(id: impl Into<String>, object: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            object: object.into(),
            fields: IndexMap::new(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    fn to_candidate(&self, context: &ProviderContext) -> Option<Candidate> {
        let primary = self.fields.get(&context.field_api_name)?;
        let secondary = self
            .fields
            .get(&context.other_field_api_name)
            .cloned()
            .unwrap_or_default();
        Some(Candidate::new(self.id.clone(), primary.clone(), secondary))
    }

    fn matches_scope(&self, context: &ProviderContext) -> bool {
        if !self.object.eq_ignore_ascii_case(&context.object_api_name) {
            return false;
        }
        match (&context.parent_field_api_name, &context.parent_record_id) {
            (Some(field), Some(parent_id)) => self.fields.get(field) == Some(parent_id),
            _ => true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordStore {
    #[serde(default)]
    pub records: Vec<StoredRecord>,
}

impl RecordStore {
    pub fn new(records: Vec<StoredRecord>) -> Self {
        Self { records }
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        load_document(path)
    }
}

/// Record provider backed by a fixed record list.
#[derive(Debug, Clone)]
pub struct InMemoryProvider {
    store: RecordStore,
    limit: usize,
    failing_queries: HashSet<String>,
}

impl InMemoryProvider {
    pub fn new(store: RecordStore) -> Self {
        Self {
            store,
            limit: DEFAULT_LIMIT,
            failing_queries: HashSet::new(),
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit.max(1);
        self
    }

    /// Makes searches for exactly `query_text` fail as unavailable.
    pub fn with_failing_query(mut self, query_text: impl Into<String>) -> Self {
        self.failing_queries.insert(query_text.into());
        self
    }

    pub fn records(&self) -> &[StoredRecord] {
        self.store.records.as_slice()
    }
}

impl RecordProvider for InMemoryProvider {
    fn search(&self, query: &SearchQuery) -> Result<Vec<Candidate>, ProviderError> {
        if self.failing_queries.contains(&query.query_text) {
            return Err(ProviderError::Unavailable(format!(
                "simulated failure for '{}'",
                query.query_text
            )));
        }

        let context = &query.context;
        let scoped = self
            .store
            .records
            .iter()
            .filter(|record| record.matches_scope(context));

        let needle = query.query_text.trim().to_lowercase();
        if needle.is_empty()
            && let Some(selected_id) = query.selected_id.as_deref()
        {
            return Ok(scoped
                .filter(|record| record.id == selected_id)
                .filter_map(|record| record.to_candidate(context))
                .take(1)
                .collect());
        }

        Ok(scoped
            .filter_map(|record| record.to_candidate(context))
            .filter(|candidate| candidate.primary_label.to_lowercase().contains(&needle))
            .take(self.limit)
            .collect())
    }
}

//! Scripted interaction replay on a virtual clock.

use crate::config::{LookupConfig, load_document};
use crate::core::record::{Candidate, SelectionNotification, SelectionState};
use crate::core::selector::Selector;
use crate::error::{ConfigError, ReplayError};
use crate::provider::{DeferredDispatcher, InMemoryProvider, LatencyPolicy, RecordStore};
use crate::runtime::event::SelectorInput;
use crate::runtime::runner::Runtime;
use crate::sink::RecordingSink;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::debug;

fn default_settle_ms() -> u64 {
    2_000
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayStep {
    pub at_ms: u64,
    pub input: SelectorInput,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayScript {
    #[serde(default)]
    pub latency_ms: u64,
    /// Per-query-text latency overrides.
    #[serde(default)]
    pub query_latency_ms: IndexMap<String, u64>,
    #[serde(default)]
    pub failing_queries: Vec<String>,
    /// Time allowed after the last step for timers and responses to land.
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,
    pub steps: Vec<ReplayStep>,
}

impl ReplayScript {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        load_document(path)
    }

    pub fn latency(&self) -> LatencyPolicy {
        self.query_latency_ms.iter().fold(
            LatencyPolicy::fixed(Duration::from_millis(self.latency_ms)),
            |policy, (query, ms)| policy.with_query(query.clone(), Duration::from_millis(*ms)),
        )
    }

    fn check_order(&self) -> Result<(), ReplayError> {
        let mut previous_ms = 0u64;
        for (index, step) in self.steps.iter().enumerate() {
            if step.at_ms < previous_ms {
                return Err(ReplayError::OutOfOrder {
                    index,
                    at_ms: step.at_ms,
                    previous_ms,
                });
            }
            previous_ms = step.at_ms;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplayReport {
    pub provider_calls: usize,
    pub notifications: Vec<SelectionNotification>,
    pub selection: SelectionState,
    pub query_text: String,
    pub open: bool,
    pub candidates: Vec<Candidate>,
    pub validation_error: Option<String>,
}

pub fn run_replay(
    config: &LookupConfig,
    store: RecordStore,
    script: &ReplayScript,
) -> Result<ReplayReport, ReplayError> {
    script.check_order()?;

    let provider = script
        .failing_queries
        .iter()
        .fold(InMemoryProvider::new(store), |provider, query| {
            provider.with_failing_query(query.clone())
        });
    let dispatcher = DeferredDispatcher::new(provider, script.latency());
    let selector = Selector::new(&config.selector, config.context.clone());
    let mut runtime = Runtime::new(selector, dispatcher, RecordingSink::new());

    let start = Instant::now();
    let mut now = start;
    runtime.start(now);

    for step in &script.steps {
        now = runtime.advance(now, start + Duration::from_millis(step.at_ms));
        debug!(at_ms = step.at_ms, input = ?step.input, "replaying input");
        runtime.input(step.input.clone(), now);
        runtime.pump(now);
    }

    let last_ms = script.steps.last().map(|step| step.at_ms).unwrap_or(0);
    runtime.advance(
        now,
        start + Duration::from_millis(last_ms.saturating_add(script.settle_ms)),
    );

    let selector = runtime.selector();
    let report = ReplayReport {
        provider_calls: runtime.provider_calls(),
        notifications: runtime.sink().notifications().to_vec(),
        selection: selector.selection().clone(),
        query_text: selector.query_text().to_string(),
        open: selector.is_open(),
        candidates: selector.panel().candidates().to_vec(),
        validation_error: selector.validate().err().map(|err| err.to_string()),
    };
    Ok(report)
}

pub mod executor;
pub mod memory;

use crate::core::query::{SearchCompletion, SearchQuery, SearchRequest};
use crate::core::record::Candidate;
use crate::error::ProviderError;
use std::time::Instant;

pub use executor::{DeferredDispatcher, LatencyPolicy, ThreadedDispatcher};
pub use memory::{InMemoryProvider, RecordStore, StoredRecord};

/// External search backend.
///
/// Implementations must be safe to call from a worker thread and must not
/// rely on call order: the selector may have several queries in flight.
pub trait RecordProvider: Send + Sync {
    fn search(&self, query: &SearchQuery) -> Result<Vec<Candidate>, ProviderError>;
}

/// Adapts a closure into a provider.
pub fn provider_fn<F>(search: F) -> FnProvider<F>
where
    F: Fn(&SearchQuery) -> Result<Vec<Candidate>, ProviderError> + Send + Sync,
{
    FnProvider(search)
}

pub struct FnProvider<F>(F);

impl<F> RecordProvider for FnProvider<F>
where
    F: Fn(&SearchQuery) -> Result<Vec<Candidate>, ProviderError> + Send + Sync,
{
    fn search(&self, query: &SearchQuery) -> Result<Vec<Candidate>, ProviderError> {
        (self.0)(query)
    }
}

/// Runs provider calls off the event loop and hands completions back.
pub trait SearchDispatcher {
    fn dispatch(&mut self, request: SearchRequest, now: Instant);

    /// Completions available at `now`, in arrival order.
    fn drain_ready(&mut self, now: Instant) -> Vec<SearchCompletion>;

    /// Earliest instant a pending completion becomes available, when known.
    fn next_ready(&self) -> Option<Instant> {
        None
    }

    fn in_flight(&self) -> usize;
}

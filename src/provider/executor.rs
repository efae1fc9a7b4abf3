use crate::core::query::{SearchCompletion, SearchRequest};
use crate::error::ProviderError;
use crate::provider::{RecordProvider, SearchDispatcher};
use indexmap::IndexMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::time::{Duration, Instant};
use tracing::trace;

/// Runs every provider call on its own worker thread.
pub struct ThreadedDispatcher<P> {
    provider: Arc<P>,
    completion_tx: Sender<SearchCompletion>,
    completion_rx: Receiver<SearchCompletion>,
    in_flight: usize,
}

impl<P: RecordProvider + 'static> ThreadedDispatcher<P> {
    pub fn new(provider: P) -> Self {
        Self::from_shared(Arc::new(provider))
    }

    pub fn from_shared(provider: Arc<P>) -> Self {
        let (completion_tx, completion_rx) = mpsc::channel::<SearchCompletion>();
        Self {
            provider,
            completion_tx,
            completion_rx,
            in_flight: 0,
        }
    }
}

impl<P: RecordProvider + 'static> SearchDispatcher for ThreadedDispatcher<P> {
    fn dispatch(&mut self, request: SearchRequest, _now: Instant) {
        let provider = Arc::clone(&self.provider);
        let completion_tx = self.completion_tx.clone();
        self.in_flight = self.in_flight.saturating_add(1);
        std::thread::spawn(move || {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| provider.search(&request.query)))
                .unwrap_or(Err(ProviderError::Disconnected));
            trace!(seq = request.seq, "provider call finished");
            let _ = completion_tx.send(request.complete(outcome));
        });
    }

    fn drain_ready(&mut self, _now: Instant) -> Vec<SearchCompletion> {
        let mut out = Vec::<SearchCompletion>::new();
        loop {
            match self.completion_rx.try_recv() {
                Ok(completion) => out.push(completion),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        self.in_flight = self.in_flight.saturating_sub(out.len());
        out
    }

    fn in_flight(&self) -> usize {
        self.in_flight
    }
}

/// Simulated round-trip time per query text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LatencyPolicy {
    pub default: Duration,
    pub per_query: IndexMap<String, Duration>,
}

impl LatencyPolicy {
    pub fn fixed(default: Duration) -> Self {
        Self {
            default,
            per_query: IndexMap::new(),
        }
    }

    pub fn with_query(mut self, query_text: impl Into<String>, latency: Duration) -> Self {
        self.per_query.insert(query_text.into(), latency);
        self
    }

    pub fn for_query(&self, query_text: &str) -> Duration {
        self.per_query
            .get(query_text)
            .copied()
            .unwrap_or(self.default)
    }
}

struct PendingCompletion {
    ready_at: Instant,
    order: u64,
    completion: SearchCompletion,
}

/// Answers on the caller's thread but holds each completion back until the
/// runtime clock passes its simulated latency. Completions can therefore
/// arrive out of dispatch order, deterministically.
pub struct DeferredDispatcher<P> {
    provider: P,
    latency: LatencyPolicy,
    pending: Vec<PendingCompletion>,
    next_order: u64,
}

impl<P: RecordProvider> DeferredDispatcher<P> {
    pub fn new(provider: P, latency: LatencyPolicy) -> Self {
        Self {
            provider,
            latency,
            pending: Vec::new(),
            next_order: 0,
        }
    }

    pub fn immediate(provider: P) -> Self {
        Self::new(provider, LatencyPolicy::default())
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }
}

impl<P: RecordProvider> SearchDispatcher for DeferredDispatcher<P> {
    fn dispatch(&mut self, request: SearchRequest, now: Instant) {
        let latency = self.latency.for_query(&request.query.query_text);
        let outcome = self.provider.search(&request.query);
        let order = self.next_order;
        self.next_order = self.next_order.wrapping_add(1);
        trace!(seq = request.seq, ?latency, "deferred provider call queued");
        self.pending.push(PendingCompletion {
            ready_at: now + latency,
            order,
            completion: request.complete(outcome),
        });
    }

    fn drain_ready(&mut self, now: Instant) -> Vec<SearchCompletion> {
        let mut ready = Vec::new();
        let mut idx = 0usize;
        while idx < self.pending.len() {
            if self.pending[idx].ready_at <= now {
                ready.push(self.pending.swap_remove(idx));
            } else {
                idx += 1;
            }
        }
        ready.sort_by_key(|pending| (pending.ready_at, pending.order));
        ready.into_iter().map(|pending| pending.completion).collect()
    }

    fn next_ready(&self) -> Option<Instant> {
        self.pending.iter().map(|pending| pending.ready_at).min()
    }

    fn in_flight(&self) -> usize {
        self.pending.len()
    }
}

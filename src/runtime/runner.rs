use crate::core::selector::Selector;
use crate::provider::SearchDispatcher;
use crate::runtime::effect::Effect;
use crate::runtime::event::{SelectorEvent, SelectorInput, TimerKey};
use crate::runtime::scheduler::Scheduler;
use crate::sink::SelectionSink;
use std::time::{Duration, Instant};
use tracing::debug;

/// Drives one selector: applies its effects and feeds timer firings and
/// provider completions back in, one event at a time.
pub struct Runtime<D, S> {
    selector: Selector,
    scheduler: Scheduler<TimerKey, SelectorEvent>,
    dispatcher: D,
    sink: S,
    provider_calls: usize,
    render_requested: bool,
}

impl<D: SearchDispatcher, S: SelectionSink> Runtime<D, S> {
    pub fn new(selector: Selector, dispatcher: D, sink: S) -> Self {
        Self {
            selector,
            scheduler: Scheduler::new(),
            dispatcher,
            sink,
            provider_calls: 0,
            render_requested: true,
        }
    }

    pub fn start(&mut self, now: Instant) {
        let effects = self.selector.initialize();
        self.apply_effects(effects, now);
    }

    pub fn input(&mut self, input: SelectorInput, now: Instant) {
        self.dispatch_event(SelectorEvent::Input(input), now);
    }

    /// Delivers everything that is due at `now`. Returns true when the view
    /// should be redrawn.
    pub fn pump(&mut self, now: Instant) -> bool {
        loop {
            let mut events = self.scheduler.drain_ready(now);
            events.extend(
                self.dispatcher
                    .drain_ready(now)
                    .into_iter()
                    .map(SelectorEvent::SearchCompleted),
            );
            if events.is_empty() {
                break;
            }
            for event in events {
                self.dispatch_event(event, now);
            }
        }
        self.take_render_request()
    }

    /// Steps a virtual clock from `from` to `to`, pumping at every timer or
    /// completion deadline on the way. Returns the clock value reached.
    pub fn advance(&mut self, from: Instant, to: Instant) -> Instant {
        let mut now = from;
        self.pump(now);
        while let Some(next) = self.next_deadline() {
            if next > to {
                break;
            }
            now = next.max(now);
            self.pump(now);
        }
        self.pump(to);
        to
    }

    pub fn poll_timeout(&self, now: Instant, default_timeout: Duration) -> Duration {
        let timeout = self.scheduler.poll_timeout(now, default_timeout);
        match self.dispatcher.next_ready() {
            Some(ready_at) => timeout.min(ready_at.saturating_duration_since(now)),
            None => timeout,
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.scheduler.next_due(), self.dispatcher.next_ready()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    pub fn shutdown(&mut self, now: Instant) {
        let effects = self.selector.disconnect();
        self.apply_effects(effects, now);
    }

    pub fn take_render_request(&mut self) -> bool {
        std::mem::take(&mut self.render_requested)
    }

    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    pub fn dispatcher(&self) -> &D {
        &self.dispatcher
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    pub fn provider_calls(&self) -> usize {
        self.provider_calls
    }

    pub fn is_idle(&self) -> bool {
        self.scheduler.pending_count() == 0 && self.dispatcher.in_flight() == 0
    }

    fn dispatch_event(&mut self, event: SelectorEvent, now: Instant) {
        let effects = self.selector.handle(event);
        self.apply_effects(effects, now);
    }

    fn apply_effects(&mut self, effects: Vec<Effect>, now: Instant) {
        for effect in effects {
            match effect {
                Effect::Schedule(command) => self.scheduler.schedule(command, now),
                Effect::Search(request) => {
                    debug!(seq = request.seq, purpose = ?request.purpose, "provider call");
                    self.provider_calls += 1;
                    self.dispatcher.dispatch(request, now);
                }
                Effect::Notify(notification) => self.sink.selection_changed(&notification),
                Effect::RequestRender => self.render_requested = true,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Runtime;
    use crate::config::SelectorConfig;
    use crate::core::query::{ProviderContext, SearchQuery};
    use crate::core::record::{Candidate, SelectionNotification};
    use crate::core::selector::Selector;
    use crate::error::ProviderError;
    use crate::provider::{
        DeferredDispatcher, FnProvider, InMemoryProvider, LatencyPolicy, RecordStore,
        StoredRecord, provider_fn,
    };
    use crate::runtime::event::SelectorInput;
    use crate::sink::RecordingSink;
    use proptest::prelude::*;
    use std::sync::{Arc, Mutex};
    use std::time::{Duration, Instant};

    type SearchFn = Box<dyn Fn(&SearchQuery) -> Result<Vec<Candidate>, ProviderError> + Send + Sync>;

    struct Harness<P: crate::provider::RecordProvider> {
        runtime: Runtime<DeferredDispatcher<P>, RecordingSink>,
        start: Instant,
        now: Instant,
    }

    impl<P: crate::provider::RecordProvider> Harness<P> {
        fn new(config: SelectorConfig, dispatcher: DeferredDispatcher<P>) -> Self {
            let start = Instant::now();
            let selector = Selector::new(&config, ProviderContext::new("Account"));
            let mut runtime = Runtime::new(selector, dispatcher, RecordingSink::new());
            runtime.start(start);
            Self {
                runtime,
                start,
                now: start,
            }
        }

        fn at(&mut self, ms: u64) -> &mut Self {
            let target = self.start + Duration::from_millis(ms);
            self.now = self.runtime.advance(self.now, target);
            self
        }

        fn send(&mut self, input: SelectorInput) -> &mut Self {
            self.runtime.input(input, self.now);
            self.runtime.pump(self.now);
            self
        }

        fn type_text(&mut self, text: &str) -> &mut Self {
            self.send(SelectorInput::TextChanged {
                value: text.to_string(),
            })
        }

        fn labels(&self) -> Vec<String> {
            self.runtime
                .selector()
                .panel()
                .candidates()
                .iter()
                .map(|candidate| candidate.primary_label.clone())
                .collect()
        }
    }

    fn store() -> RecordStore {
        RecordStore::new(vec![
            StoredRecord::new("1", "Account").with_field("Name", "Acme Corp"),
            StoredRecord::new("2", "Account").with_field("Name", "Acorn Ltd"),
            StoredRecord::new("3", "Account").with_field("Name", "Globex"),
        ])
    }

    fn recorded_queries() -> (Arc<Mutex<Vec<String>>>, FnProvider<SearchFn>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&seen);
        let search: SearchFn = Box::new(move |query: &SearchQuery| {
            if let Ok(mut log) = log.lock() {
                log.push(query.query_text.clone());
            }
            Ok(vec![Candidate::new("1", "Acme Corp", "")])
        });
        (seen, provider_fn(search))
    }

    #[test]
    fn acme_scenario_end_to_end() {
        let provider = InMemoryProvider::new(store());
        let mut h = Harness::new(
            SelectorConfig::default(),
            DeferredDispatcher::new(provider, LatencyPolicy::fixed(Duration::from_millis(40))),
        );

        h.type_text("Acme");
        h.at(499);
        assert_eq!(h.runtime.provider_calls(), 0);

        h.at(500);
        assert_eq!(h.runtime.provider_calls(), 1);
        assert!(!h.runtime.selector().is_open());

        h.at(540);
        assert_eq!(h.labels(), vec!["Acme Corp".to_string()]);

        h.send(SelectorInput::Activate { index: 0 });
        let selection = h.runtime.selector().selection();
        assert_eq!(selection.selected_id(), Some("1"));
        assert_eq!(selection.selected_label(), Some("Acme Corp"));
        assert!(!h.runtime.selector().is_open());
        assert_eq!(
            h.runtime.sink().notifications(),
            &[SelectionNotification::Selected {
                candidate: Candidate::new("1", "Acme Corp", "")
            }]
        );
    }

    #[test]
    fn rapid_queries_coalesce_into_final_text() {
        let (seen, provider) = recorded_queries();
        let mut h = Harness::new(
            SelectorConfig::default(),
            DeferredDispatcher::immediate(provider),
        );

        h.type_text("Ac");
        h.at(200).type_text("Acme");
        h.at(2_000);

        assert_eq!(h.runtime.provider_calls(), 1);
        let seen = seen.lock().expect("lock").clone();
        assert_eq!(seen, vec!["Acme".to_string()]);
    }

    #[test]
    fn slow_stale_response_does_not_clobber_newer_one() {
        let provider = InMemoryProvider::new(store());
        let latency = LatencyPolicy::fixed(Duration::from_millis(20))
            .with_query("Ac", Duration::from_millis(1_000));
        let mut h = Harness::new(SelectorConfig::default(), DeferredDispatcher::new(provider, latency));

        h.type_text("Ac");
        h.at(500);
        h.at(600).type_text("Acme");
        h.at(1_120);
        assert_eq!(h.labels(), vec!["Acme Corp".to_string()]);

        h.at(1_600);
        assert_eq!(h.runtime.provider_calls(), 2);
        assert_eq!(h.labels(), vec!["Acme Corp".to_string()]);
        assert!(h.runtime.is_idle());
    }

    #[test]
    fn in_flight_result_still_renders_while_typing_continues() {
        let provider = InMemoryProvider::new(store());
        let latency = LatencyPolicy::fixed(Duration::from_millis(100));
        let mut h = Harness::new(SelectorConfig::default(), DeferredDispatcher::new(provider, latency));

        h.type_text("Ac");
        h.at(500);
        h.at(550).type_text("Acm");
        h.at(600);
        assert_eq!(h.labels().len(), 2);
    }

    #[test]
    fn blur_then_click_inside_keeps_panel_open() {
        let provider = InMemoryProvider::new(store());
        let mut h = Harness::new(SelectorConfig::default(), DeferredDispatcher::immediate(provider));

        h.type_text("Ac");
        h.at(500);
        assert!(h.runtime.selector().is_open());

        h.send(SelectorInput::Blur);
        h.at(700).send(SelectorInput::PointerDownInPanel);
        h.at(1_100);

        assert!(h.runtime.selector().is_open());
    }

    #[test]
    fn blur_without_click_closes_after_delay() {
        let provider = InMemoryProvider::new(store());
        let mut h = Harness::new(SelectorConfig::default(), DeferredDispatcher::immediate(provider));

        h.type_text("Ac");
        h.at(500).send(SelectorInput::Blur);
        h.at(999);
        assert!(h.runtime.selector().is_open());

        h.at(1_000);
        assert!(!h.runtime.selector().is_open());
        assert!(h.runtime.sink().notifications().is_empty());
    }

    #[test]
    fn click_race_selects_once_and_stays_closed() {
        let provider = InMemoryProvider::new(store());
        let mut h = Harness::new(SelectorConfig::default(), DeferredDispatcher::immediate(provider));

        h.type_text("Glo");
        h.at(500);
        h.send(SelectorInput::PointerDownInPanel)
            .send(SelectorInput::Blur)
            .send(SelectorInput::Activate { index: 0 });
        h.at(2_000);

        assert!(!h.runtime.selector().is_open());
        assert_eq!(h.runtime.sink().notifications().len(), 1);
        assert_eq!(h.runtime.selector().selection().selected_id(), Some("3"));
    }

    #[test]
    fn clear_emits_single_cleared_notification() {
        let provider = InMemoryProvider::new(store());
        let config = SelectorConfig::default().with_selected_id("2");
        let mut h = Harness::new(config, DeferredDispatcher::immediate(provider));
        h.at(0);
        assert_eq!(
            h.runtime.selector().selection().selected_label(),
            Some("Acorn Ltd")
        );
        assert!(!h.runtime.selector().is_open());

        h.send(SelectorInput::Clear);

        assert!(h.runtime.selector().selection().is_empty());
        assert_eq!(
            h.runtime.sink().notifications(),
            &[SelectionNotification::Cleared]
        );
    }

    #[test]
    fn refocusing_a_settled_selection_keeps_panel_closed() {
        let provider = InMemoryProvider::new(store());
        let mut h = Harness::new(SelectorConfig::default(), DeferredDispatcher::immediate(provider));

        h.type_text("Acme");
        h.at(500);
        h.send(SelectorInput::Activate { index: 0 })
            .send(SelectorInput::Blur);
        h.at(1_200);
        h.send(SelectorInput::Focus);
        h.at(2_200);

        assert!(!h.runtime.selector().is_open());
        assert_eq!(h.runtime.provider_calls(), 1);
        assert_eq!(h.runtime.selector().selection().selected_id(), Some("1"));
    }

    #[test]
    fn preselected_record_focused_on_start_stays_closed() {
        let provider = InMemoryProvider::new(store());
        let config = SelectorConfig::default().with_selected_id("1");
        let mut h = Harness::new(config, DeferredDispatcher::immediate(provider));

        h.send(SelectorInput::Focus);
        h.at(600);

        let selector = h.runtime.selector();
        assert_eq!(selector.selection().selected_label(), Some("Acme Corp"));
        assert!(!selector.is_open());
        assert!(selector.panel().candidates().is_empty());
        assert_eq!(h.runtime.provider_calls(), 1);
    }

    #[test]
    fn provider_failure_leaves_empty_researchable_panel() {
        let provider = InMemoryProvider::new(store()).with_failing_query("Ac");
        let mut h = Harness::new(SelectorConfig::default(), DeferredDispatcher::immediate(provider));

        h.type_text("Ac");
        h.at(500);
        assert!(!h.runtime.selector().is_open());
        assert_eq!(h.runtime.provider_calls(), 1);

        h.at(2_000);
        assert_eq!(h.runtime.provider_calls(), 1);

        h.type_text("Acm");
        h.at(2_500);
        assert_eq!(h.labels(), vec!["Acme Corp".to_string()]);
    }

    #[test]
    fn shutdown_drops_pending_timers() {
        let provider = InMemoryProvider::new(store());
        let mut h = Harness::new(SelectorConfig::default(), DeferredDispatcher::immediate(provider));

        h.type_text("Ac");
        let now = h.now;
        h.runtime.shutdown(now);
        h.at(2_000);

        assert_eq!(h.runtime.provider_calls(), 0);
        assert!(h.runtime.is_idle());
    }

    proptest! {
        #[test]
        fn any_burst_within_quiet_period_calls_provider_once(
            texts in proptest::collection::vec("[a-zA-Z ]{0,8}", 1..12),
            gaps in proptest::collection::vec(0u64..500, 12),
        ) {
            let (seen, provider) = recorded_queries();
            let mut h = Harness::new(SelectorConfig::default(), DeferredDispatcher::immediate(provider));

            let mut at = 0u64;
            for (text, gap) in texts.iter().zip(gaps.iter()) {
                at += gap;
                h.at(at).type_text(text);
            }
            h.at(at + 2_000);

            prop_assert_eq!(h.runtime.provider_calls(), 1);
            let seen = seen.lock().expect("lock").clone();
            prop_assert_eq!(seen, vec![texts.last().cloned().unwrap_or_default()]);
        }
    }
}

use crate::config::SelectorConfig;
use crate::core::panel::{BlurOutcome, PanelState};
use crate::core::query::{
    ProviderContext, QueryPurpose, SearchCompletion, SearchQuery, SearchRequest,
};
use crate::core::record::{Candidate, SelectionNotification, SelectionState};
use crate::error::ValidationError;
use crate::runtime::effect::Effect;
use crate::runtime::event::{SelectorEvent, SelectorInput, TimerHandle, TimerKey};
use crate::runtime::scheduler::SchedulerCommand;
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default)]
struct TimerSlots {
    search: Option<TimerHandle>,
    blur_close: Option<TimerHandle>,
    next_token: u64,
}

impl TimerSlots {
    fn slot_mut(&mut self, key: TimerKey) -> &mut Option<TimerHandle> {
        match key {
            TimerKey::Search => &mut self.search,
            TimerKey::BlurClose => &mut self.blur_close,
        }
    }

    fn live(&self, key: TimerKey) -> Option<TimerHandle> {
        match key {
            TimerKey::Search => self.search,
            TimerKey::BlurClose => self.blur_close,
        }
    }

    fn arm(&mut self, key: TimerKey) -> TimerHandle {
        self.next_token = self.next_token.wrapping_add(1);
        let handle = TimerHandle {
            key,
            token: self.next_token,
        };
        *self.slot_mut(key) = Some(handle);
        handle
    }

    fn take_if_live(&mut self, handle: TimerHandle) -> bool {
        let slot = self.slot_mut(handle.key);
        if *slot == Some(handle) {
            *slot = None;
            return true;
        }
        false
    }

    fn cancel(&mut self, key: TimerKey) -> bool {
        self.slot_mut(key).take().is_some()
    }
}

/// Incremental search selector state machine.
///
/// Every handler consumes one event and returns the effects the runtime must
/// apply. Nothing here blocks, sleeps, or touches the provider directly.
#[derive(Debug, Clone)]
pub struct Selector {
    label: String,
    required: bool,
    quiet_period: Duration,
    blur_close_delay: Duration,
    context: ProviderContext,
    query_text: String,
    selection: SelectionState,
    panel: PanelState,
    focused: bool,
    sequence: u64,
    latest_search: Option<u64>,
    last_search_failed: bool,
    pending_label_load: Option<u64>,
    timers: TimerSlots,
}

impl Selector {
    pub fn new(config: &SelectorConfig, context: ProviderContext) -> Self {
        Self {
            label: config.label.clone(),
            required: config.required,
            quiet_period: config.quiet_period(),
            blur_close_delay: config.blur_close_delay(),
            context,
            query_text: config.search_string.clone(),
            selection: SelectionState::with_id(config.selected_id.clone()),
            panel: PanelState::new(),
            focused: false,
            sequence: 0,
            latest_search: None,
            last_search_failed: false,
            pending_label_load: None,
            timers: TimerSlots::default(),
        }
    }

    /// Resolves the label of a preselected record. Only fires when a record
    /// id was supplied and nothing has been typed yet.
    pub fn initialize(&mut self) -> Vec<Effect> {
        if self.selection.is_empty()
            || !self.query_text.is_empty()
            || self.pending_label_load.is_some()
        {
            return vec![];
        }

        let request = self.next_request(QueryPurpose::LoadSelectedLabel);
        self.pending_label_load = Some(request.seq);
        debug!(seq = request.seq, "loading label for preselected record");
        vec![Effect::Search(request)]
    }

    pub fn handle(&mut self, event: SelectorEvent) -> Vec<Effect> {
        match event {
            SelectorEvent::Input(input) => self.handle_input(input),
            SelectorEvent::TimerFired(handle) => self.on_timer_fire(handle),
            SelectorEvent::SearchCompleted(completion) => self.on_search_completed(completion),
        }
    }

    pub fn handle_input(&mut self, input: SelectorInput) -> Vec<Effect> {
        match input {
            SelectorInput::TextChanged { value } => self.on_query_text_changed(value),
            SelectorInput::Focus => self.on_focus(),
            SelectorInput::Blur => self.on_blur(),
            SelectorInput::PointerDownInPanel => self.on_pointer_down_in_panel(),
            SelectorInput::Activate { index } => self.activate(index),
            SelectorInput::Clear => self.clear_selection(),
        }
    }

    // -----------------------------------------------------------------------
    // Debounce
    // -----------------------------------------------------------------------

    pub fn on_query_text_changed(&mut self, text: impl Into<String>) -> Vec<Effect> {
        self.query_text = text.into();
        vec![self.rearm(TimerKey::Search), Effect::RequestRender]
    }

    pub fn on_timer_fire(&mut self, handle: TimerHandle) -> Vec<Effect> {
        if !self.timers.take_if_live(handle) {
            debug!(?handle, "ignoring superseded timer");
            return vec![];
        }

        match handle.key {
            TimerKey::Search => {
                let request = self.next_request(QueryPurpose::Search);
                self.latest_search = Some(request.seq);
                debug!(
                    seq = request.seq,
                    query = request.query.query_text.as_str(),
                    "dispatching record search"
                );
                vec![Effect::Search(request)]
            }
            TimerKey::BlurClose => match self.panel.evaluate_blur_close() {
                BlurOutcome::Closed => vec![Effect::RequestRender],
                BlurOutcome::KeptOpen => {
                    debug!("blur close suppressed by click inside panel");
                    vec![]
                }
                BlurOutcome::AlreadyClosed => vec![],
            },
        }
    }

    /// Drops the pending search firing, if any.
    pub fn cancel_pending_search(&mut self) -> Vec<Effect> {
        self.cancel(TimerKey::Search).into_iter().collect()
    }

    /// Drops every pending timer, e.g. when the host tears the selector down.
    pub fn disconnect(&mut self) -> Vec<Effect> {
        [TimerKey::Search, TimerKey::BlurClose]
            .into_iter()
            .filter_map(|key| self.cancel(key))
            .collect()
    }

    // -----------------------------------------------------------------------
    // Reconciliation
    // -----------------------------------------------------------------------

    pub fn on_search_completed(&mut self, completion: SearchCompletion) -> Vec<Effect> {
        match completion.purpose {
            QueryPurpose::Search => self.reconcile_search(completion),
            QueryPurpose::LoadSelectedLabel => self.reconcile_label(completion),
        }
    }

    fn reconcile_search(&mut self, completion: SearchCompletion) -> Vec<Effect> {
        if self.latest_search != Some(completion.seq) {
            debug!(
                seq = completion.seq,
                latest = ?self.latest_search,
                "discarding stale search response"
            );
            return vec![];
        }

        match completion.outcome {
            Ok(candidates) => {
                self.last_search_failed = false;
                self.panel.replace(candidates);
                debug!(
                    seq = completion.seq,
                    count = self.panel.candidates().len(),
                    "search results applied"
                );
            }
            Err(err) => {
                warn!(seq = completion.seq, error = %err, "record search failed");
                self.last_search_failed = true;
                self.panel.clear();
            }
        }
        vec![Effect::RequestRender]
    }

    fn reconcile_label(&mut self, completion: SearchCompletion) -> Vec<Effect> {
        if self.pending_label_load != Some(completion.seq) {
            debug!(seq = completion.seq, "discarding stale label load");
            return vec![];
        }
        self.pending_label_load = None;

        // Selecting or clearing drops the pending load, so the selection is
        // still the one the request was built from.
        let selected_id = self
            .selection
            .selected_id()
            .map(ToOwned::to_owned)
            .unwrap_or_default();
        match completion.outcome {
            Ok(candidates) => {
                let mut well_formed = candidates.iter().filter(|c| c.is_well_formed());
                let label = well_formed
                    .clone()
                    .find(|candidate| candidate.id == selected_id)
                    .or_else(|| well_formed.next())
                    .map(|candidate| candidate.primary_label.clone());
                match label {
                    Some(label) => {
                        self.selection.set_label(label);
                        vec![Effect::RequestRender]
                    }
                    None => {
                        debug!(id = selected_id.as_str(), "no record found for selection");
                        vec![]
                    }
                }
            }
            Err(err) => {
                warn!(id = selected_id.as_str(), error = %err, "label load failed");
                vec![]
            }
        }
    }

    // -----------------------------------------------------------------------
    // Open / close
    // -----------------------------------------------------------------------

    pub fn on_blur(&mut self) -> Vec<Effect> {
        self.focused = false;
        vec![self.rearm(TimerKey::BlurClose)]
    }

    /// Regaining focus keeps the panel. The current query is re-run only when
    /// nothing is selected or the last search failed; a settled selection
    /// stays closed until the user types again.
    pub fn on_focus(&mut self) -> Vec<Effect> {
        self.focused = true;
        let mut effects: Vec<Effect> = self.cancel(TimerKey::BlurClose).into_iter().collect();
        if self.selection.is_empty() || self.last_search_failed {
            effects.push(self.rearm(TimerKey::Search));
        }
        effects
    }

    pub fn on_pointer_down_in_panel(&mut self) -> Vec<Effect> {
        self.panel.suppress_close();
        vec![]
    }

    // -----------------------------------------------------------------------
    // Selection
    // -----------------------------------------------------------------------

    pub fn select_candidate(&mut self, candidate: Candidate) -> Vec<Effect> {
        self.selection.select(&candidate);
        self.panel.clear();
        self.pending_label_load = None;
        info!(id = candidate.id.as_str(), "record selected");
        vec![
            Effect::Notify(SelectionNotification::Selected { candidate }),
            Effect::RequestRender,
        ]
    }

    pub fn activate(&mut self, index: usize) -> Vec<Effect> {
        let Some(candidate) = self.panel.candidate(index).cloned() else {
            debug!(index, "activation outside candidate list ignored");
            return vec![];
        };
        self.select_candidate(candidate)
    }

    pub fn clear_selection(&mut self) -> Vec<Effect> {
        self.selection.clear();
        self.panel.clear();
        self.pending_label_load = None;
        info!("selection cleared");
        vec![
            Effect::Notify(SelectionNotification::Cleared),
            Effect::RequestRender,
        ]
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.required && self.selection.is_empty() {
            return Err(ValidationError::Required {
                label: self.label.clone(),
            });
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn label(&self) -> &str {
        self.label.as_str()
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn context(&self) -> &ProviderContext {
        &self.context
    }

    pub fn query_text(&self) -> &str {
        self.query_text.as_str()
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn panel(&self) -> &PanelState {
        &self.panel
    }

    pub fn is_open(&self) -> bool {
        self.panel.is_open()
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn latest_search_seq(&self) -> Option<u64> {
        self.latest_search
    }

    pub fn live_timer(&self, key: TimerKey) -> Option<TimerHandle> {
        self.timers.live(key)
    }

    pub fn current_query(&self) -> SearchQuery {
        SearchQuery {
            query_text: self.query_text.clone(),
            selected_id: self.selection.selected_id().map(ToOwned::to_owned),
            context: self.context.clone(),
        }
    }

    fn next_request(&mut self, purpose: QueryPurpose) -> SearchRequest {
        self.sequence = self.sequence.saturating_add(1);
        SearchRequest {
            seq: self.sequence,
            purpose,
            query: self.current_query(),
        }
    }

    fn rearm(&mut self, key: TimerKey) -> Effect {
        let handle = self.timers.arm(key);
        let delay = match key {
            TimerKey::Search => self.quiet_period,
            TimerKey::BlurClose => self.blur_close_delay,
        };
        Effect::Schedule(SchedulerCommand::Debounce {
            key,
            delay,
            event: SelectorEvent::TimerFired(handle),
        })
    }

    fn cancel(&mut self, key: TimerKey) -> Option<Effect> {
        self.timers
            .cancel(key)
            .then_some(Effect::Schedule(SchedulerCommand::Cancel { key }))
    }
}

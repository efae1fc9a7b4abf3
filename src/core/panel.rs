use crate::core::record::Candidate;

/// Guard consulted by the delayed blur-close check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CloseGuard {
    #[default]
    Armed,
    /// A pointer went down inside the panel since the last evaluation.
    Suppressed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlurOutcome {
    Closed,
    KeptOpen,
    AlreadyClosed,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PanelState {
    candidates: Vec<Candidate>,
    guard: CloseGuard,
}

impl PanelState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn candidates(&self) -> &[Candidate] {
        self.candidates.as_slice()
    }

    pub fn candidate(&self, index: usize) -> Option<&Candidate> {
        self.candidates.get(index)
    }

    pub fn is_open(&self) -> bool {
        !self.candidates.is_empty()
    }

    pub fn guard(&self) -> CloseGuard {
        self.guard
    }

    pub(crate) fn replace(&mut self, candidates: Vec<Candidate>) {
        self.candidates = candidates
            .into_iter()
            .filter(Candidate::is_well_formed)
            .collect();
    }

    pub(crate) fn clear(&mut self) {
        self.candidates.clear();
    }

    pub(crate) fn suppress_close(&mut self) {
        self.guard = CloseGuard::Suppressed;
    }

    /// Delayed blur-close transition. The guard is re-armed whatever the
    /// outcome.
    pub(crate) fn evaluate_blur_close(&mut self) -> BlurOutcome {
        let guard = std::mem::take(&mut self.guard);
        if !self.is_open() {
            return BlurOutcome::AlreadyClosed;
        }
        match guard {
            CloseGuard::Suppressed => BlurOutcome::KeptOpen,
            CloseGuard::Armed => {
                self.candidates.clear();
                BlurOutcome::Closed
            }
        }
    }
}

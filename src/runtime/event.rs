use crate::core::query::SearchCompletion;
use serde::{Deserialize, Serialize};

/// Inbound user interaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SelectorInput {
    TextChanged { value: String },
    Focus,
    Blur,
    /// Pointer went down inside the panel bounds.
    PointerDownInPanel,
    /// Candidate at `index` in the open panel was activated.
    Activate { index: usize },
    Clear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKey {
    Search,
    BlurClose,
}

/// Identifies one scheduled firing. A newer handle for the same key
/// supersedes the older one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle {
    pub key: TimerKey,
    pub token: u64,
}

/// Everything the selector reacts to, serialized through one queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorEvent {
    Input(SelectorInput),
    TimerFired(TimerHandle),
    SearchCompleted(SearchCompletion),
}

impl From<SelectorInput> for SelectorEvent {
    fn from(input: SelectorInput) -> Self {
        Self::Input(input)
    }
}

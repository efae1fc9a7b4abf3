use serde::{Deserialize, Serialize};

/// One searchable record surfaced in the dropdown.
///
/// Only record providers build these; the selector stores and clears them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub id: String,
    pub primary_label: String,
    #[serde(default)]
    pub secondary_label: String,
}

impl Candidate {
    pub fn new(
        id: impl Into<String>,
        primary_label: impl Into<String>,
        secondary_label: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            primary_label: primary_label.into(),
            secondary_label: secondary_label.into(),
        }
    }

    pub(crate) fn is_well_formed(&self) -> bool {
        !self.id.trim().is_empty()
    }
}

/// What is currently chosen. Changed only by explicit selection, explicit
/// clear, or the one-shot label load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionState {
    selected_id: Option<String>,
    selected_label: Option<String>,
}

impl SelectionState {
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn with_id(id: Option<String>) -> Self {
        Self {
            selected_id: id.filter(|id| !id.is_empty()),
            selected_label: None,
        }
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected_id.as_deref()
    }

    pub fn selected_label(&self) -> Option<&str> {
        self.selected_label.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.selected_id.is_none()
    }

    pub(crate) fn select(&mut self, candidate: &Candidate) {
        self.selected_id = Some(candidate.id.clone());
        self.selected_label = Some(candidate.primary_label.clone());
    }

    pub(crate) fn set_label(&mut self, label: String) {
        self.selected_label = Some(label);
    }

    pub(crate) fn clear(&mut self) {
        self.selected_id = None;
        self.selected_label = None;
    }
}

/// Outbound event handed to the selection sink, once per change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SelectionNotification {
    Selected {
        #[serde(flatten)]
        candidate: Candidate,
    },
    /// The user explicitly removed the selection.
    Cleared,
}

impl SelectionNotification {
    pub fn selected_id(&self) -> Option<&str> {
        match self {
            Self::Selected { candidate } => Some(candidate.id.as_str()),
            Self::Cleared => None,
        }
    }
}

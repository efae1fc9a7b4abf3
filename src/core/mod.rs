pub mod panel;
pub mod query;
pub mod record;
pub mod selector;

pub use panel::{BlurOutcome, CloseGuard, PanelState};
pub use query::{ProviderContext, QueryPurpose, SearchCompletion, SearchQuery, SearchRequest};
pub use record::{Candidate, SelectionNotification, SelectionState};
pub use selector::Selector;

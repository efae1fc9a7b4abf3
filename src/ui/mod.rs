pub mod view;

pub use view::{Hit, LineStyle, LookupView, ViewFrame, ViewLine};

pub mod config;
pub mod core;
pub mod error;
pub mod interactive;
pub mod logging;
pub mod provider;
pub mod replay;
pub mod runtime;
pub mod sink;
pub mod terminal;
pub mod ui;

pub use config::{LookupConfig, SelectorConfig};
pub use core::selector::Selector;
pub use error::{AppError, ProviderError};
pub use runtime::Runtime;

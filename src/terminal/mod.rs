pub mod backend;

pub use backend::{KeyCode, KeyEvent, Terminal, TerminalEvent};

pub mod effect;
pub mod event;
pub mod runner;
pub mod scheduler;

pub use effect::Effect;
pub use event::{SelectorEvent, SelectorInput, TimerHandle, TimerKey};
pub use runner::Runtime;
pub use scheduler::{Scheduler, SchedulerCommand};

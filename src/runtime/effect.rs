use crate::core::query::SearchRequest;
use crate::core::record::SelectionNotification;
use crate::runtime::event::{SelectorEvent, TimerKey};
use crate::runtime::scheduler::SchedulerCommand;

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Schedule(SchedulerCommand<TimerKey, SelectorEvent>),
    Search(SearchRequest),
    Notify(SelectionNotification),
    RequestRender,
}

//! Terminal front end: one lookup field driven by keyboard and mouse.

use crate::config::LookupConfig;
use crate::core::record::{SelectionNotification, SelectionState};
use crate::core::selector::Selector;
use crate::error::AppError;
use crate::provider::{InMemoryProvider, RecordStore, ThreadedDispatcher};
use crate::runtime::event::SelectorInput;
use crate::runtime::runner::Runtime;
use crate::sink::RecordingSink;
use crate::terminal::{KeyCode, KeyEvent, Terminal, TerminalEvent};
use crate::ui::view::{Hit, LookupView};
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::{debug, info};

const IDLE_POLL: Duration = Duration::from_millis(120);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InteractiveOutcome {
    pub notifications: Vec<SelectionNotification>,
    pub selection: SelectionState,
    pub validation_error: Option<String>,
}

type LiveRuntime = Runtime<ThreadedDispatcher<InMemoryProvider>, RecordingSink>;

/// Translates terminal events into selector inputs. Holds the typed text and
/// the highlighted row, which the selector does not own.
#[derive(Debug)]
struct Controller {
    view: LookupView,
    query: String,
    pressed: Option<usize>,
    quit: bool,
}

impl Controller {
    fn new(config: &LookupConfig) -> Self {
        Self {
            view: LookupView::new(config),
            query: config.selector.search_string.clone(),
            pressed: None,
            quit: false,
        }
    }

    fn translate(&mut self, selector: &Selector, event: TerminalEvent) -> Vec<SelectorInput> {
        match event {
            TerminalEvent::Key(key) => self.translate_key(selector, key),
            TerminalEvent::MouseDown { row, .. } => match self.view.hit_test(selector, row) {
                Hit::Input => {
                    self.pressed = None;
                    vec![SelectorInput::Focus]
                }
                // The input loses focus before the click lands.
                Hit::Candidate(index) => {
                    self.pressed = Some(index);
                    vec![SelectorInput::PointerDownInPanel, SelectorInput::Blur]
                }
                Hit::Outside => {
                    self.pressed = None;
                    if selector.is_focused() {
                        vec![SelectorInput::Blur]
                    } else {
                        vec![]
                    }
                }
            },
            TerminalEvent::MouseUp { row, .. } => {
                let pressed = self.pressed.take();
                match self.view.hit_test(selector, row) {
                    Hit::Candidate(index) if pressed == Some(index) => {
                        vec![SelectorInput::Activate { index }]
                    }
                    _ => vec![],
                }
            }
            TerminalEvent::Resize { .. } | TerminalEvent::Tick => vec![],
        }
    }

    fn translate_key(&mut self, selector: &Selector, key: KeyEvent) -> Vec<SelectorInput> {
        let candidates = selector.panel().candidates().len();
        match key.code {
            KeyCode::Esc => {
                self.quit = true;
                vec![]
            }
            KeyCode::Char('c') if key.ctrl => {
                self.quit = true;
                vec![]
            }
            KeyCode::Char(ch) if !key.ctrl => {
                self.query.push(ch);
                self.typed(selector)
            }
            KeyCode::Backspace => {
                if self.query.pop().is_none() {
                    return vec![];
                }
                self.typed(selector)
            }
            KeyCode::Delete => vec![SelectorInput::Clear],
            KeyCode::Up => {
                self.view.move_highlight(-1, candidates);
                vec![]
            }
            KeyCode::Down => {
                self.view.move_highlight(1, candidates);
                vec![]
            }
            KeyCode::Enter if candidates > 0 => vec![SelectorInput::Activate {
                index: self.view.highlighted(),
            }],
            KeyCode::Tab | KeyCode::BackTab => {
                if selector.is_focused() {
                    vec![SelectorInput::Blur]
                } else {
                    vec![SelectorInput::Focus]
                }
            }
            _ => vec![],
        }
    }

    fn typed(&self, selector: &Selector) -> Vec<SelectorInput> {
        let mut inputs = Vec::with_capacity(2);
        if !selector.is_focused() {
            inputs.push(SelectorInput::Focus);
        }
        inputs.push(SelectorInput::TextChanged {
            value: self.query.clone(),
        });
        inputs
    }
}

pub fn run_interactive(
    config: &LookupConfig,
    store: RecordStore,
) -> Result<InteractiveOutcome, AppError> {
    let selector = Selector::new(&config.selector, config.context.clone());
    let dispatcher = ThreadedDispatcher::new(InMemoryProvider::new(store));
    let mut runtime = Runtime::new(selector, dispatcher, RecordingSink::new());
    let mut controller = Controller::new(config);

    let mut terminal = Terminal::new()?;
    terminal.enter()?;
    let result = event_loop(&mut terminal, &mut runtime, &mut controller);
    let restored = terminal.exit();
    result?;
    restored?;

    runtime.shutdown(Instant::now());
    let selector = runtime.selector();
    let selection = selector.selection().clone();
    let validation_error = selector.validate().err().map(|err| err.to_string());
    info!(provider_calls = runtime.provider_calls(), "interactive session ended");

    Ok(InteractiveOutcome {
        notifications: runtime.into_sink().into_notifications(),
        selection,
        validation_error,
    })
}

fn event_loop(
    terminal: &mut Terminal,
    runtime: &mut LiveRuntime,
    controller: &mut Controller,
) -> Result<(), AppError> {
    runtime.start(Instant::now());
    runtime.input(SelectorInput::Focus, Instant::now());
    let mut render_requested = true;

    while !controller.quit {
        let now = Instant::now();
        render_requested |= runtime.pump(now);

        if render_requested {
            let selector = runtime.selector();
            controller
                .view
                .clamp_highlight(selector.panel().candidates().len());
            terminal.render(&controller.view.frame(selector))?;
            render_requested = false;
        }

        let event = terminal.poll_event(runtime.poll_timeout(now, IDLE_POLL))?;
        if !matches!(event, TerminalEvent::Tick) {
            render_requested = true;
        }

        let inputs = controller.translate(runtime.selector(), event);
        for input in inputs {
            debug!(?input, "terminal input");
            runtime.input(input, Instant::now());
        }
        // Validation surfaces once the field has been left.
        let selector = runtime.selector();
        let message = (!selector.is_focused())
            .then(|| selector.validate().err().map(|err| err.to_string()))
            .flatten();
        controller.view.set_message(message);
    }
    Ok(())
}

use crate::config::{LookupConfig, placeholder_for};
use crate::core::selector::Selector;
use unicode_width::UnicodeWidthStr;

const INPUT_ROW: u16 = 1;
const PANEL_TOP: u16 = 2;
const PROMPT: &str = "> ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Plain,
    Dim,
    Highlight,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewLine {
    pub text: String,
    pub style: LineStyle,
}

impl ViewLine {
    fn new(text: impl Into<String>, style: LineStyle) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewFrame {
    pub lines: Vec<ViewLine>,
    /// (col, row) of the text cursor.
    pub cursor: Option<(u16, u16)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    Input,
    Candidate(usize),
    Outside,
}

/// Plain line layout: label, input, candidate rows, selection, help.
#[derive(Debug, Clone)]
pub struct LookupView {
    placeholder: String,
    help_text: String,
    highlighted: usize,
    message: Option<String>,
}

impl LookupView {
    pub fn new(config: &LookupConfig) -> Self {
        Self {
            placeholder: placeholder_for(&config.context.object_api_name),
            help_text: config.selector.help_text.clone(),
            highlighted: 0,
            message: None,
        }
    }

    pub fn highlighted(&self) -> usize {
        self.highlighted
    }

    pub fn move_highlight(&mut self, delta: isize, len: usize) {
        if len == 0 {
            self.highlighted = 0;
            return;
        }
        let last = len as isize - 1;
        self.highlighted = (self.highlighted as isize + delta).clamp(0, last) as usize;
    }

    pub fn clamp_highlight(&mut self, len: usize) {
        self.highlighted = self.highlighted.min(len.saturating_sub(1));
    }

    pub fn set_message(&mut self, message: Option<String>) {
        self.message = message;
    }

    pub fn frame(&self, selector: &Selector) -> ViewFrame {
        let mut lines = Vec::new();

        let mut title = selector.label().to_string();
        if selector.is_required() {
            title.push_str(" *");
        }
        lines.push(ViewLine::new(title, LineStyle::Plain));

        let query = selector.query_text();
        if query.is_empty() {
            lines.push(ViewLine::new(
                format!("{PROMPT}{}", self.placeholder),
                LineStyle::Dim,
            ));
        } else {
            lines.push(ViewLine::new(format!("{PROMPT}{query}"), LineStyle::Plain));
        }

        for (index, candidate) in selector.panel().candidates().iter().enumerate() {
            let marker = if index == self.highlighted { "› " } else { "  " };
            let mut text = format!("{marker}{}", candidate.primary_label);
            if !candidate.secondary_label.is_empty() {
                text.push_str(" · ");
                text.push_str(&candidate.secondary_label);
            }
            let style = if index == self.highlighted {
                LineStyle::Highlight
            } else {
                LineStyle::Plain
            };
            lines.push(ViewLine::new(text, style));
        }

        let selection = selector.selection();
        if let Some(id) = selection.selected_id() {
            let shown = selection.selected_label().unwrap_or(id);
            lines.push(ViewLine::new(
                format!("Selected: {shown}  (Del to clear)"),
                LineStyle::Plain,
            ));
        }

        lines.push(ViewLine::new(self.help_text.clone(), LineStyle::Dim));
        if let Some(message) = &self.message {
            lines.push(ViewLine::new(message.clone(), LineStyle::Error));
        }

        let cursor = selector.is_focused().then(|| {
            let col = PROMPT.width() + query.width();
            (u16::try_from(col).unwrap_or(u16::MAX), INPUT_ROW)
        });

        ViewFrame { lines, cursor }
    }

    pub fn hit_test(&self, selector: &Selector, row: u16) -> Hit {
        if row == INPUT_ROW {
            return Hit::Input;
        }
        let count = selector.panel().candidates().len();
        match row.checked_sub(PANEL_TOP).map(usize::from) {
            Some(index) if index < count => Hit::Candidate(index),
            _ => Hit::Outside,
        }
    }
}

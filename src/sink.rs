use crate::core::record::SelectionNotification;
use std::io::Write;
use tracing::error;

/// Receives one notification per selection change.
pub trait SelectionSink {
    fn selection_changed(&mut self, notification: &SelectionNotification);
}

#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    notifications: Vec<SelectionNotification>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> &[SelectionNotification] {
        self.notifications.as_slice()
    }

    pub fn last(&self) -> Option<&SelectionNotification> {
        self.notifications.last()
    }

    pub fn into_notifications(self) -> Vec<SelectionNotification> {
        self.notifications
    }
}

impl SelectionSink for RecordingSink {
    fn selection_changed(&mut self, notification: &SelectionNotification) {
        self.notifications.push(notification.clone());
    }
}

/// Writes each notification as one JSON line.
pub struct JsonLinesSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> SelectionSink for JsonLinesSink<W> {
    fn selection_changed(&mut self, notification: &SelectionNotification) {
        let written = serde_json::to_writer(&mut self.writer, notification)
            .map_err(std::io::Error::from)
            .and_then(|()| self.writer.write_all(b"\n"))
            .and_then(|()| self.writer.flush());
        if let Err(err) = written {
            error!(error = %err, "failed to write selection notification");
        }
    }
}

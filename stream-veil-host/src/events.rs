//! Event sinks bridging access events to host messaging surfaces.

use std::sync::mpsc;
use std::sync::Arc;

use parking_lot::Mutex;

use stream_veil_core::{AccessEvent, AccessEventSink};

/// Writes each event to the log.
pub struct LogEventSink;

impl AccessEventSink for LogEventSink {
    fn notify(&self, event: &AccessEvent) {
        log::info!(target: "stream_veil::events", "{}", event.to_json());
    }
}

/// Ships events as JSON lines over an in-process channel, the shape a
/// privileged companion surface consumes. Send failures are swallowed —
/// the acquisition path never depends on a listener being present.
pub struct ChannelEventSink {
    tx: Mutex<mpsc::Sender<String>>,
}

impl ChannelEventSink {
    pub fn channel() -> (Arc<Self>, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel();
        (
            Arc::new(Self {
                tx: Mutex::new(tx),
            }),
            rx,
        )
    }
}

impl AccessEventSink for ChannelEventSink {
    fn notify(&self, event: &AccessEvent) {
        let _ = self.tx.lock().send(event.to_json());
    }
}

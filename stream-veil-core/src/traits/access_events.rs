use crate::models::events::AccessEvent;

/// Observer for informational access events.
///
/// Implementations forward to whatever messaging surface the host provides
/// (a channel, a log, a privileged companion process). Called from the
/// acquisition flow's thread; must not block. The core never reads anything
/// back from a sink.
pub trait AccessEventSink: Send + Sync {
    fn notify(&self, event: &AccessEvent);
}

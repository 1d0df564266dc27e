//! The substituted media-acquisition entry point.
//!
//! Decorates the platform's `MediaAcquisition` with the scrambling pipeline:
//! every audio acquisition comes back as the transformed stream, the raw
//! stream is registered, revoked, and hard-stopped, and failures fail
//! closed — a consumer never silently receives unscrambled audio.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::{Condvar, Mutex, RwLock};

use crate::models::constraints::AccessConstraints;
use crate::models::error::AcquireError;
use crate::models::events::AccessEvent;
use crate::models::stream::SharedStream;
use crate::session::context::AudioSubsystem;
use crate::session::graph::RenderGraph;
use crate::session::registry::StreamRegistry;
use crate::traits::access_events::AccessEventSink;
use crate::traits::media_acquisition::MediaAcquisition;

/// Cooperative cancellation for one in-flight request.
///
/// Checked after every suspension point; cancelling after completion has no
/// effect on the delivered stream.
#[derive(Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Read-only view of the currently substituted stream, shared with the
/// sink binding guard.
#[derive(Clone)]
pub struct CurrentStreamHandle(Arc<RwLock<Option<SharedStream>>>);

impl CurrentStreamHandle {
    pub fn get(&self) -> Option<SharedStream> {
        self.0.read().clone()
    }
}

/// Result cell shared between the leading acquisition and any callers that
/// arrived while it was in flight.
#[derive(Default)]
struct Flight {
    done: bool,
    result: Option<Result<SharedStream, AcquireError>>,
}

type SharedFlight = Arc<(Mutex<Flight>, Condvar)>;

struct InterceptState {
    graph: Option<RenderGraph>,
    in_flight: Option<SharedFlight>,
}

/// Drop-in replacement for the platform acquisition entry point.
///
/// Implements `MediaAcquisition` itself; inject it wherever the underlying
/// primitive would be injected and the wrapped primitive becomes
/// unreachable from consumer code.
pub struct AcquisitionInterceptor<A: MediaAcquisition> {
    inner: A,
    subsystem: Arc<AudioSubsystem>,
    registry: Arc<StreamRegistry>,
    events: Option<Arc<dyn AccessEventSink>>,
    state: Mutex<InterceptState>,
    current: Arc<RwLock<Option<SharedStream>>>,
}

impl<A: MediaAcquisition> AcquisitionInterceptor<A> {
    pub fn new(inner: A, subsystem: Arc<AudioSubsystem>, registry: Arc<StreamRegistry>) -> Self {
        Self {
            inner,
            subsystem,
            registry,
            events: None,
            state: Mutex::new(InterceptState {
                graph: None,
                in_flight: None,
            }),
            current: Arc::new(RwLock::new(None)),
        }
    }

    pub fn with_event_sink(mut self, sink: Arc<dyn AccessEventSink>) -> Self {
        self.events = Some(sink);
        self
    }

    /// Handle for observers that need the current transformed stream.
    pub fn current_stream_handle(&self) -> CurrentStreamHandle {
        CurrentStreamHandle(Arc::clone(&self.current))
    }

    /// Tear down the active pipeline, if any, ending the transformed
    /// stream and emitting an end-of-access event.
    pub fn release(&self) {
        let graph = {
            let mut state = self.state.lock();
            *self.current.write() = None;
            state.graph.take()
        };
        if let Some(mut graph) = graph {
            let id = graph.transformed().id();
            graph.teardown();
            self.emit(AccessEvent::ended(id));
        }
    }

    /// Acquire with a cancellation token. See `MediaAcquisition::acquire`
    /// for the uncancellable form.
    pub fn acquire_with_cancel(
        &self,
        constraints: &AccessConstraints,
        cancel: &CancelToken,
    ) -> Result<SharedStream, AcquireError> {
        self.emit(AccessEvent::requested(constraints));

        // Video-only and no-media requests are none of our business.
        if !constraints.wants_audio {
            return self.inner.acquire(constraints);
        }

        let flight = loop {
            let mut state = self.state.lock();

            if let Some(graph) = &state.graph {
                if graph.is_alive() {
                    let stream = graph.transformed();
                    log::debug!("reusing transformed stream {}", stream.id());
                    return Ok(stream);
                }
                // The previous pipeline ended; replace it.
                state.graph = None;
                *self.current.write() = None;
            }

            if let Some(in_flight) = &state.in_flight {
                // Another acquisition is mid-build: await its result rather
                // than starting a redundant one.
                let in_flight = Arc::clone(in_flight);
                drop(state);
                let (cell, ready) = &*in_flight;
                let mut flight = cell.lock();
                while !flight.done {
                    ready.wait(&mut flight);
                }
                match flight.result.clone() {
                    Some(result) => return result,
                    // A finished flight always carries a result; retry if not.
                    None => continue,
                }
            }

            let flight: SharedFlight = Arc::new((Mutex::new(Flight::default()), Condvar::new()));
            state.in_flight = Some(Arc::clone(&flight));
            break flight;
        };

        let outcome = match self.build_pipeline(constraints, cancel) {
            Ok((stream, graph)) => {
                let mut state = self.state.lock();
                state.graph = Some(graph);
                state.in_flight = None;
                *self.current.write() = Some(Arc::clone(&stream));
                Ok(stream)
            }
            Err(err) => {
                // Clear the slot so the failure does not poison later calls.
                self.state.lock().in_flight = None;
                self.emit(AccessEvent::denied(err.to_string()));
                Err(err)
            }
        };

        let (cell, ready) = &*flight;
        let mut flight = cell.lock();
        flight.done = true;
        flight.result = Some(outcome.clone());
        ready.notify_all();

        outcome
    }

    /// The leader's path: context → platform acquisition → graph →
    /// registration and revocation.
    fn build_pipeline(
        &self,
        constraints: &AccessConstraints,
        cancel: &CancelToken,
    ) -> Result<(SharedStream, RenderGraph), AcquireError> {
        self.subsystem.ensure_ready()?;
        if cancel.is_cancelled() {
            return Err(AcquireError::Cancelled);
        }

        let raw = self.inner.acquire(constraints)?;
        if cancel.is_cancelled() {
            Self::stop_all(&raw);
            return Err(AcquireError::Cancelled);
        }

        let graph = match RenderGraph::build(&raw, &self.subsystem) {
            Ok(graph) => graph,
            Err(err) => {
                // Fail closed, and do not leave a live raw capture behind.
                Self::stop_all(&raw);
                return Err(err.into());
            }
        };
        if cancel.is_cancelled() {
            Self::stop_all(&raw);
            return Err(AcquireError::Cancelled);
        }

        let transformed = graph.transformed();
        self.registry.register(&transformed, &raw);
        self.registry.revoke_raw(transformed.id());

        // Hard revoke at the source. Tracks carried into the transformed
        // stream (video passthrough) stay live.
        for track in raw.tracks() {
            if !transformed.contains_track(track.id()) {
                track.stop();
            }
        }

        self.emit(AccessEvent::substituted(transformed.id(), raw.id()));
        log::info!(
            "acquisition substituted: raw {} replaced by transformed {}",
            raw.id(),
            transformed.id()
        );
        Ok((transformed, graph))
    }

    fn stop_all(stream: &SharedStream) {
        for track in stream.tracks() {
            track.stop();
        }
    }

    fn emit(&self, event: AccessEvent) {
        if let Some(sink) = &self.events {
            sink.notify(&event);
        }
    }
}

impl<A: MediaAcquisition> MediaAcquisition for AcquisitionInterceptor<A> {
    fn acquire(&self, constraints: &AccessConstraints) -> Result<SharedStream, AcquireError> {
        self.acquire_with_cancel(constraints, &CancelToken::new())
    }
}

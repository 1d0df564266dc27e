//! Presentation sinks and the binding guard.
//!
//! A consumer can attach a stream to a sink two ways: through the direct
//! property-setting path, or through a declarative attribute mutation that
//! is only observable after the fact. The guard covers both — it interposes
//! on the property path before the underlying setter runs, and it subscribes
//! to the host's attachment events to correct attribute-path bindings post
//! hoc.

use std::fmt;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::models::stream::{MediaTrack, SharedStream, TrackKind};
use crate::processing::ring_buffer::SampleRing;
use crate::session::interceptor::CurrentStreamHandle;

/// Stable identity of a presentation sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SinkId(uuid::Uuid);

impl SinkId {
    fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl fmt::Display for SinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Which path an attachment came through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachPath {
    /// Direct property assignment; runs through the interposer first.
    Property,
    /// Declarative attribute mutation; observed after the store.
    Attribute,
}

struct Binding {
    stream: SharedStream,
    subscription: Option<(Arc<MediaTrack>, u64)>,
}

struct Meter {
    ring: SampleRing,
    rms: f32,
    peak: f32,
}

/// An audible/visible output element a stream can be bound to.
///
/// Sinks meter what they actually receive: binding subscribes to the bound
/// stream's first live audio track and keeps a bounded history of rendered
/// samples plus RMS/peak levels.
pub struct MediaSink {
    id: SinkId,
    label: String,
    bound: RwLock<Option<Binding>>,
    meter: Arc<Mutex<Meter>>,
}

impl MediaSink {
    fn new(label: impl Into<String>, history: usize) -> Arc<Self> {
        Arc::new(Self {
            id: SinkId::new(),
            label: label.into(),
            bound: RwLock::new(None),
            meter: Arc::new(Mutex::new(Meter {
                ring: SampleRing::new(history),
                rms: 0.0,
                peak: 0.0,
            })),
        })
    }

    pub fn id(&self) -> SinkId {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn bound_stream(&self) -> Option<SharedStream> {
        self.bound.read().as_ref().map(|b| Arc::clone(&b.stream))
    }

    /// Samples this sink has rendered, oldest first.
    pub fn rendered(&self) -> Vec<f32> {
        self.meter.lock().ring.snapshot()
    }

    /// Most recent block's (RMS, peak) levels.
    pub fn levels(&self) -> (f32, f32) {
        let meter = self.meter.lock();
        (meter.rms, meter.peak)
    }

    fn attach(&self, stream: SharedStream) {
        let mut bound = self.bound.write();
        if let Some(previous) = bound.take() {
            if let Some((track, sub)) = previous.subscription {
                track.unsubscribe(sub);
            }
        }

        let subscription = stream
            .tracks()
            .iter()
            .find(|t| t.kind() == TrackKind::Audio && !t.is_stopped())
            .map(|track| {
                let meter = Arc::clone(&self.meter);
                let sub = track.subscribe(Arc::new(move |samples: &[f32]| {
                    let mut meter = meter.lock();
                    meter.ring.write(samples);
                    meter.rms = rms(samples);
                    meter.peak = peak(samples);
                }));
                (Arc::clone(track), sub)
            });

        *bound = Some(Binding {
            stream,
            subscription,
        });
    }
}

fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_sq: f32 = samples.iter().map(|s| s * s).sum();
    (sum_sq / samples.len() as f32).sqrt()
}

fn peak(samples: &[f32]) -> f32 {
    samples.iter().map(|s| s.abs()).fold(0.0f32, f32::max)
}

/// Rewrites the stream being attached through the property path.
pub type AttachInterposer = Arc<dyn Fn(SharedStream) -> SharedStream + Send + Sync>;

/// Subscriber to sink-attachment events.
pub trait AttachmentObserver: Send + Sync {
    fn on_attached(&self, host: &SinkHost, sink: &Arc<MediaSink>, path: AttachPath);
}

/// The presentation layer: owns sinks and the attachment event interface.
pub struct SinkHost {
    sinks: RwLock<Vec<Arc<MediaSink>>>,
    interposer: RwLock<Option<AttachInterposer>>,
    observers: RwLock<Vec<Arc<dyn AttachmentObserver>>>,
    history: usize,
}

impl SinkHost {
    pub fn new() -> Self {
        Self::with_history(48_000)
    }

    /// `history` sizes each sink's rendered-sample ring.
    pub fn with_history(history: usize) -> Self {
        Self {
            sinks: RwLock::new(Vec::new()),
            interposer: RwLock::new(None),
            observers: RwLock::new(Vec::new()),
            history,
        }
    }

    pub fn create_sink(&self, label: impl Into<String>) -> Arc<MediaSink> {
        let sink = MediaSink::new(label, self.history);
        self.sinks.write().push(Arc::clone(&sink));
        sink
    }

    pub fn sinks(&self) -> Vec<Arc<MediaSink>> {
        self.sinks.read().clone()
    }

    /// Install the property-path rewrite hook. One slot; last install wins.
    pub fn set_interposer(&self, interposer: AttachInterposer) {
        *self.interposer.write() = Some(interposer);
    }

    pub fn subscribe(&self, observer: Arc<dyn AttachmentObserver>) {
        self.observers.write().push(observer);
    }

    /// Direct property-setting path: the interposer sees the stream before
    /// the underlying setter does.
    pub fn bind(&self, sink: &Arc<MediaSink>, stream: SharedStream) {
        let stream = {
            let interposer = self.interposer.read();
            match interposer.as_ref() {
                Some(rewrite) => rewrite(stream),
                None => stream,
            }
        };
        sink.attach(stream);
        self.notify(sink, AttachPath::Property);
    }

    /// Declarative attribute path: the store happens first, observers get a
    /// chance to correct it afterwards.
    pub fn bind_declarative(&self, sink: &Arc<MediaSink>, stream: SharedStream) {
        sink.attach(stream);
        self.notify(sink, AttachPath::Attribute);
    }

    fn notify(&self, sink: &Arc<MediaSink>, path: AttachPath) {
        let observers: Vec<_> = self.observers.read().clone();
        for observer in observers {
            observer.on_attached(self, sink, path);
        }
    }
}

impl Default for SinkHost {
    fn default() -> Self {
        Self::new()
    }
}

/// Keeps every sink pointed at the current transformed stream.
///
/// If no transformed stream exists yet (no audio acquisition has completed),
/// attachments pass through unmodified so video-only flows are not degraded.
pub struct SinkBindingGuard {
    current: CurrentStreamHandle,
}

impl SinkBindingGuard {
    pub fn new(current: CurrentStreamHandle) -> Arc<Self> {
        Arc::new(Self { current })
    }

    /// Hook both enforcement points up to a host.
    pub fn install(self: Arc<Self>, host: &SinkHost) {
        let current = self.current.clone();
        host.set_interposer(Arc::new(move |supplied| substitute(&current, supplied)));
        host.subscribe(self as Arc<dyn AttachmentObserver>);
    }
}

fn substitute(current: &CurrentStreamHandle, supplied: SharedStream) -> SharedStream {
    if !supplied.is_live() {
        return supplied;
    }
    match current.get() {
        Some(transformed) => {
            if transformed.id() != supplied.id() {
                log::debug!(
                    "sink attachment rewritten: {} -> {}",
                    supplied.id(),
                    transformed.id()
                );
            }
            transformed
        }
        None => supplied,
    }
}

impl AttachmentObserver for SinkBindingGuard {
    fn on_attached(&self, host: &SinkHost, sink: &Arc<MediaSink>, path: AttachPath) {
        // The property path already went through the interposer.
        if path != AttachPath::Attribute {
            return;
        }
        let Some(bound) = sink.bound_stream() else {
            return;
        };
        let Some(transformed) = self.current.get() else {
            return;
        };
        if bound.id() == transformed.id() || !bound.is_live() {
            return;
        }
        log::debug!(
            "correcting attribute-path binding on sink {}: {} -> {}",
            sink.id(),
            bound.id(),
            transformed.id()
        );
        host.bind(sink, transformed);
    }
}

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Callback invoked when an audio block is available on a track.
///
/// Fires on the producing thread (the capture/real-time thread) — keep
/// processing minimal and never block.
pub type SampleCallback = Arc<dyn Fn(&[f32]) + Send + Sync + 'static>;

/// Stable identity of a media stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StreamId(uuid::Uuid);

impl StreamId {
    fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Stable identity of a media track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TrackId(uuid::Uuid);

impl TrackId {
    fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Kind of a media track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackKind {
    Audio,
    Video,
}

/// Fan-out hub for audio samples on a single track.
///
/// Producers push interleaved mono f32 blocks; every subscriber sees every
/// block, on the producer's thread.
struct TrackFeed {
    subscribers: RwLock<Vec<(u64, SampleCallback)>>,
    next_id: AtomicU64,
}

impl TrackFeed {
    fn new() -> Self {
        Self {
            subscribers: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    fn subscribe(&self, callback: SampleCallback) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.subscribers.write().push((id, callback));
        id
    }

    fn unsubscribe(&self, id: u64) {
        self.subscribers.write().retain(|(sub_id, _)| *sub_id != id);
    }

    fn push(&self, samples: &[f32]) {
        for (_, callback) in self.subscribers.read().iter() {
            callback(samples);
        }
    }
}

/// One live media track.
///
/// `stop()` is monotonic: once stopped a track never becomes live again.
/// Stopping is a signal to the producer — capture loops poll `is_stopped()`
/// and halt, and `push_samples` drops blocks arriving after the stop.
pub struct MediaTrack {
    id: TrackId,
    kind: TrackKind,
    label: String,
    stopped: AtomicBool,
    feed: TrackFeed,
}

impl MediaTrack {
    pub fn audio(label: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            id: TrackId::new(),
            kind: TrackKind::Audio,
            label: label.into(),
            stopped: AtomicBool::new(false),
            feed: TrackFeed::new(),
        })
    }

    pub fn video(label: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            id: TrackId::new(),
            kind: TrackKind::Video,
            label: label.into(),
            stopped: AtomicBool::new(false),
            feed: TrackFeed::new(),
        })
    }

    pub fn id(&self) -> TrackId {
        self.id
    }

    pub fn kind(&self) -> TrackKind {
        self.kind
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    /// Permanently end this track.
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }

    /// Receive blocks delivered to this track. Returns a subscription id
    /// for `unsubscribe`.
    pub fn subscribe(&self, callback: SampleCallback) -> u64 {
        self.feed.subscribe(callback)
    }

    pub fn unsubscribe(&self, subscription: u64) {
        self.feed.unsubscribe(subscription);
    }

    /// Deliver one block of samples to all subscribers.
    ///
    /// Blocks pushed after `stop()` are dropped.
    pub fn push_samples(&self, samples: &[f32]) {
        if self.is_stopped() || samples.is_empty() {
            return;
        }
        self.feed.push(samples);
    }
}

impl fmt::Debug for MediaTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaTrack")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("label", &self.label)
            .field("stopped", &self.is_stopped())
            .finish()
    }
}

/// A stream handle: an identity plus an ordered set of tracks.
///
/// Streams are shared by reference (`SharedStream`); identity comparisons go
/// through `id()`. Track enumeration is deliberately not public here — the
/// one public enumeration path is `StreamRegistry::tracks_of`, which is where
/// revocation is enforced.
pub struct MediaStream {
    id: StreamId,
    tracks: Vec<Arc<MediaTrack>>,
}

/// The canonical shared handle to a stream.
pub type SharedStream = Arc<MediaStream>;

impl MediaStream {
    pub fn new(tracks: Vec<Arc<MediaTrack>>) -> SharedStream {
        Arc::new(Self {
            id: StreamId::new(),
            tracks,
        })
    }

    pub fn id(&self) -> StreamId {
        self.id
    }

    /// Whether any track is still live.
    pub fn is_live(&self) -> bool {
        self.tracks.iter().any(|t| !t.is_stopped())
    }

    pub(crate) fn tracks(&self) -> &[Arc<MediaTrack>] {
        &self.tracks
    }

    pub(crate) fn contains_track(&self, id: TrackId) -> bool {
        self.tracks.iter().any(|t| t.id() == id)
    }
}

impl fmt::Debug for MediaStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaStream")
            .field("id", &self.id)
            .field("tracks", &self.tracks)
            .finish()
    }
}

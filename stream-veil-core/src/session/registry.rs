//! Raw ↔ transformed stream bookkeeping and revocation.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::models::stream::{MediaTrack, SharedStream, StreamId};

struct Entry {
    raw_id: StreamId,
    revoked: bool,
}

/// Maps each transformed stream to its raw counterpart and enforces
/// "never expose raw tracks".
///
/// Entries are keyed by stable stream id, inserted at build time and kept
/// for the life of the session — nothing here is reclaimed behind the
/// caller's back. Revocation is one-way.
pub struct StreamRegistry {
    entries: RwLock<HashMap<StreamId, Entry>>,
}

impl StreamRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            entries: RwLock::new(HashMap::new()),
        })
    }

    /// Record the raw counterpart of a transformed stream.
    pub fn register(&self, transformed: &SharedStream, raw: &SharedStream) {
        log::debug!("registered transformed {} -> raw {}", transformed.id(), raw.id());
        self.entries.write().insert(
            transformed.id(),
            Entry {
                raw_id: raw.id(),
                revoked: false,
            },
        );
    }

    /// Permanently block track enumeration on the raw counterpart of
    /// `transformed_id`. Irreversible for the life of the entry.
    pub fn revoke_raw(&self, transformed_id: StreamId) {
        if let Some(entry) = self.entries.write().get_mut(&transformed_id) {
            entry.revoked = true;
            log::debug!("raw {} revoked", entry.raw_id);
        }
    }

    pub fn is_revoked(&self, transformed_id: StreamId) -> bool {
        self.entries
            .read()
            .get(&transformed_id)
            .map(|e| e.revoked)
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// The single public track-enumeration path for any stream handle.
    ///
    /// A handle that is the raw counterpart of a revoked entry enumerates
    /// empty, whatever its actual track set; unregistered streams pass
    /// through unmodified.
    pub fn tracks_of(&self, stream: &SharedStream) -> Vec<Arc<MediaTrack>> {
        let blocked = self
            .entries
            .read()
            .values()
            .any(|e| e.revoked && e.raw_id == stream.id());
        if blocked {
            return Vec::new();
        }
        stream.tracks().to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::stream::{MediaStream, MediaTrack};

    #[test]
    fn unregistered_streams_enumerate_normally() {
        let registry = StreamRegistry::new();
        let stream = MediaStream::new(vec![MediaTrack::audio("mic")]);

        assert_eq!(registry.tracks_of(&stream).len(), 1);
    }

    #[test]
    fn revocation_empties_raw_enumeration() {
        let registry = StreamRegistry::new();
        let raw = MediaStream::new(vec![MediaTrack::audio("mic")]);
        let transformed = MediaStream::new(vec![MediaTrack::audio("scrambled")]);

        registry.register(&transformed, &raw);
        assert!(!registry.is_revoked(transformed.id()));
        assert_eq!(registry.tracks_of(&raw).len(), 1);

        registry.revoke_raw(transformed.id());
        assert!(registry.is_revoked(transformed.id()));
        assert!(registry.tracks_of(&raw).is_empty());

        // The transformed side still enumerates its own tracks.
        assert_eq!(registry.tracks_of(&transformed).len(), 1);
    }

    #[test]
    fn revocation_is_permanent() {
        let registry = StreamRegistry::new();
        let raw = MediaStream::new(vec![MediaTrack::audio("mic")]);
        let transformed = MediaStream::new(vec![MediaTrack::audio("scrambled")]);

        registry.register(&transformed, &raw);
        registry.revoke_raw(transformed.id());
        // Re-registering a different pair does not resurrect the raw side.
        let other = MediaStream::new(vec![MediaTrack::audio("other")]);
        registry.register(&other, &MediaStream::new(vec![]));

        assert!(registry.tracks_of(&raw).is_empty());
    }

    #[test]
    fn revoking_unknown_id_is_a_no_op() {
        let registry = StreamRegistry::new();
        let stream = MediaStream::new(vec![MediaTrack::audio("mic")]);
        registry.revoke_raw(stream.id());

        assert!(registry.is_empty());
        assert_eq!(registry.tracks_of(&stream).len(), 1);
    }
}

//! In-memory permission store.

use std::collections::HashMap;

use parking_lot::RwLock;

use stream_veil_core::{PermissionState, PermissionStore};

/// `PermissionStore` backed by a process-local map.
///
/// Suitable for tests and single-process hosts; durable stores implement
/// the same trait.
#[derive(Default)]
pub struct MemoryPermissionStore {
    states: RwLock<HashMap<String, PermissionState>>,
}

impl MemoryPermissionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PermissionStore for MemoryPermissionStore {
    fn get(&self, capability: &str) -> Option<PermissionState> {
        self.states.read().get(capability).copied()
    }

    fn set(&self, capability: &str, state: PermissionState) {
        log::debug!("permission '{capability}' set to {state:?}");
        self.states.write().insert(capability.to_string(), state);
    }
}

use serde::{Deserialize, Serialize};

/// Capability key for microphone access.
pub const CAP_MICROPHONE: &str = "microphone";
/// Capability key for camera access.
pub const CAP_CAMERA: &str = "camera";

/// A stored consent decision for one capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionState {
    Granted,
    Denied,
    Prompt,
}

/// Key-value store of prior consent decisions.
///
/// Consulted by acquisition backends to skip redundant prompts; a stored
/// `Granted` short-circuits the prompt entirely. The store itself is an
/// external collaborator — this is only its interface.
pub trait PermissionStore: Send + Sync {
    fn get(&self, capability: &str) -> Option<PermissionState>;
    fn set(&self, capability: &str, state: PermissionState);
}

//! The host's media-acquisition backend.

use std::sync::Arc;

use stream_veil_core::{
    AccessConstraints, AcquireError, MediaAcquisition, MediaStream, MediaTrack, PermissionState,
    PermissionStore, SharedStream, CAP_CAMERA, CAP_MICROPHONE,
};

use crate::device::ToneMicrophone;

/// What to do when a capability has no stored decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptPolicy {
    Grant,
    Deny,
}

/// In-process `MediaAcquisition` implementation.
///
/// Consults the permission store before touching any device: a stored grant
/// skips the prompt entirely, a stored denial refuses without prompting, and
/// anything else falls back to the prompt policy (whose outcome is then
/// stored for next time).
pub struct HostAcquisition {
    permissions: Arc<dyn PermissionStore>,
    prompt: PromptPolicy,
    microphone: ToneMicrophone,
}

impl HostAcquisition {
    pub fn new(permissions: Arc<dyn PermissionStore>, prompt: PromptPolicy) -> Self {
        Self {
            permissions,
            prompt,
            microphone: ToneMicrophone::default(),
        }
    }

    pub fn with_microphone(mut self, microphone: ToneMicrophone) -> Self {
        self.microphone = microphone;
        self
    }

    fn authorize(&self, capability: &str) -> Result<(), AcquireError> {
        match self.permissions.get(capability) {
            Some(PermissionState::Granted) => {
                log::debug!("{capability} already granted, skipping prompt");
                Ok(())
            }
            Some(PermissionState::Denied) => Err(AcquireError::Denied),
            Some(PermissionState::Prompt) | None => match self.prompt {
                PromptPolicy::Grant => {
                    self.permissions.set(capability, PermissionState::Granted);
                    Ok(())
                }
                PromptPolicy::Deny => {
                    self.permissions.set(capability, PermissionState::Denied);
                    Err(AcquireError::Denied)
                }
            },
        }
    }
}

impl MediaAcquisition for HostAcquisition {
    fn acquire(&self, constraints: &AccessConstraints) -> Result<SharedStream, AcquireError> {
        if !constraints.wants_audio && !constraints.wants_video {
            return Err(AcquireError::Platform("no capability requested".into()));
        }

        if constraints.wants_audio {
            self.authorize(CAP_MICROPHONE)?;
        }
        if constraints.wants_video {
            self.authorize(CAP_CAMERA)?;
        }

        let mut tracks = Vec::new();
        if constraints.wants_audio {
            let track = MediaTrack::audio("synthetic-mic");
            self.microphone
                .start(Arc::clone(&track))
                .map_err(|e| AcquireError::Platform(e.to_string()))?;
            tracks.push(track);
        }
        if constraints.wants_video {
            tracks.push(MediaTrack::video("synthetic-cam"));
        }

        let stream = MediaStream::new(tracks);
        log::info!("host acquisition delivered stream {}", stream.id());
        Ok(stream)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permissions::MemoryPermissionStore;

    fn store() -> Arc<MemoryPermissionStore> {
        Arc::new(MemoryPermissionStore::new())
    }

    #[test]
    fn stored_denial_refuses_without_prompting() {
        let permissions = store();
        permissions.set(CAP_MICROPHONE, PermissionState::Denied);
        // Even a granting prompt policy cannot override a stored denial.
        let acquisition =
            HostAcquisition::new(Arc::clone(&permissions) as Arc<dyn PermissionStore>, PromptPolicy::Grant);

        let err = acquisition.acquire(&AccessConstraints::audio()).unwrap_err();
        assert_eq!(err, AcquireError::Denied);
    }

    #[test]
    fn stored_grant_skips_the_prompt() {
        let permissions = store();
        permissions.set(CAP_MICROPHONE, PermissionState::Granted);
        let acquisition =
            HostAcquisition::new(Arc::clone(&permissions) as Arc<dyn PermissionStore>, PromptPolicy::Deny);

        // A denying prompt never fires because the grant is already stored.
        let stream = acquisition.acquire(&AccessConstraints::audio()).unwrap();
        assert!(stream.is_live());
        for track in stream_veil_core::StreamRegistry::new().tracks_of(&stream) {
            track.stop();
        }
    }

    #[test]
    fn prompt_outcome_is_persisted() {
        let permissions = store();
        let acquisition =
            HostAcquisition::new(Arc::clone(&permissions) as Arc<dyn PermissionStore>, PromptPolicy::Deny);

        assert!(acquisition.acquire(&AccessConstraints::video()).is_err());
        assert_eq!(
            permissions.get(CAP_CAMERA),
            Some(PermissionState::Denied)
        );
    }

    #[test]
    fn no_capability_is_a_platform_error() {
        let acquisition =
            HostAcquisition::new(store() as Arc<dyn PermissionStore>, PromptPolicy::Grant);

        assert!(matches!(
            acquisition.acquire(&AccessConstraints::none()),
            Err(AcquireError::Platform(_))
        ));
    }

    #[test]
    fn video_only_needs_no_microphone_grant() {
        let permissions = store();
        permissions.set(CAP_MICROPHONE, PermissionState::Denied);
        permissions.set(CAP_CAMERA, PermissionState::Granted);
        let acquisition =
            HostAcquisition::new(Arc::clone(&permissions) as Arc<dyn PermissionStore>, PromptPolicy::Deny);

        let stream = acquisition.acquire(&AccessConstraints::video()).unwrap();
        assert!(stream.is_live());
    }
}

//! The real-time rendering context and its lifecycle.
//!
//! The platform only allows a rendering context to start producing audio
//! from within a user-originated event, so activation is gated on
//! `notify_user_gesture`. Callers that arrive earlier block until the first
//! gesture lands.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Condvar, Mutex, RwLock};

use crate::models::config::VeilConfig;
use crate::models::error::ContextError;
use crate::models::state::ContextState;
use crate::processing::scrambler::{ProcessorFactory, ScramblerFactory};

struct ContextInner {
    state: ContextState,
    gesture_seen: bool,
}

/// Owner of the process-wide rendering context.
///
/// Explicitly constructed and passed by handle to everything that needs it;
/// there is no ambient global. `ensure_ready` is idempotent and safe to call
/// from any number of threads — all callers converge on the same readiness
/// state without duplicate construction.
pub struct AudioSubsystem {
    config: VeilConfig,
    inner: Mutex<ContextInner>,
    ready: Condvar,
    processors: RwLock<HashMap<String, Arc<dyn ProcessorFactory>>>,
}

impl AudioSubsystem {
    pub fn new(config: VeilConfig) -> Arc<Self> {
        Arc::new(Self {
            config,
            inner: Mutex::new(ContextInner {
                state: ContextState::Uninitialized,
                gesture_seen: false,
            }),
            ready: Condvar::new(),
            processors: RwLock::new(HashMap::new()),
        })
    }

    pub fn config(&self) -> &VeilConfig {
        &self.config
    }

    pub fn state(&self) -> ContextState {
        self.inner.lock().state
    }

    /// Bring the context to `Running`, constructing it on first use.
    ///
    /// Blocks until a user gesture has been observed when the context has
    /// never been activated. Resumes automatically from `Suspended`.
    pub fn ensure_ready(&self) -> Result<(), ContextError> {
        let mut inner = self.inner.lock();
        loop {
            match inner.state {
                ContextState::Running => return Ok(()),
                ContextState::Suspended => {
                    inner.state = ContextState::Running;
                    log::debug!("rendering context resumed");
                    return Ok(());
                }
                ContextState::Uninitialized => {
                    if inner.gesture_seen {
                        return self.activate(&mut inner);
                    }
                    log::debug!("waiting for user gesture before activating rendering context");
                    self.ready.wait(&mut inner);
                }
            }
        }
    }

    /// Record that a user-originated event occurred. The first gesture
    /// activates the context and wakes anyone blocked in `ensure_ready`.
    pub fn notify_user_gesture(&self) {
        let mut inner = self.inner.lock();
        inner.gesture_seen = true;
        if inner.state.is_uninitialized() {
            if let Err(err) = self.activate(&mut inner) {
                log::error!("context activation from gesture failed: {err}");
            }
        }
        self.ready.notify_all();
    }

    /// Platform-driven suspension (backgrounding). `ensure_ready` resumes.
    pub fn suspend(&self) {
        let mut inner = self.inner.lock();
        if inner.state.is_running() {
            inner.state = ContextState::Suspended;
            log::debug!("rendering context suspended");
        }
    }

    fn activate(&self, inner: &mut ContextInner) -> Result<(), ContextError> {
        self.config
            .validate()
            .map_err(ContextError::Unavailable)?;

        // A short muted probe unlocks audio output on platforms that demand
        // a first render inside the gesture's call stack.
        let probe = unlock_probe(self.config.sample_rate);
        log::debug!("rendering context activated ({} probe samples)", probe.len());

        inner.state = ContextState::Running;
        self.ready.notify_all();
        Ok(())
    }

    /// Register a transform processor factory under a name, the way a
    /// worklet module registers its processors. Last registration wins.
    pub fn register_processor(&self, name: impl Into<String>, factory: Arc<dyn ProcessorFactory>) {
        let name = name.into();
        log::debug!("processor '{name}' registered");
        self.processors.write().insert(name, factory);
    }

    /// Register the built-in scrambler under the configured processor name.
    pub fn install_default_processor(&self) {
        self.register_processor(self.config.processor.clone(), Arc::new(ScramblerFactory));
    }

    pub(crate) fn processor_factory(&self, name: &str) -> Option<Arc<dyn ProcessorFactory>> {
        self.processors.read().get(name).cloned()
    }
}

/// Synthesize the silent unlock probe: a short tone rendered through zero
/// gain. The result is all-zero by construction; what matters is that a
/// render happened.
fn unlock_probe(sample_rate: f64) -> Vec<f32> {
    let frames = (sample_rate * 0.1) as usize;
    let step = 2.0 * std::f32::consts::PI * 440.0 / sample_rate as f32;
    let mut phase = 0.0f32;
    let mut out = Vec::with_capacity(frames);
    for _ in 0..frames {
        out.push(phase.sin() * 0.0);
        phase += step;
    }
    out
}

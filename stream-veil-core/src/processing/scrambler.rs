//! Per-sample audio scrambling.
//!
//! Runs on the capture thread's real-time callback: every function on the
//! hot path is total, allocation-free, and does not branch on sample values
//! beyond the final clamp.

use crate::models::config::{ScramblePolicy, VeilConfig};

/// Deterministic noise generator (SplitMix64 step function).
///
/// Per-node cost: 16 bytes (state + seed). No external PRNG, no allocation.
/// The seed is kept so a node can be reset to reproduce its exact output.
#[derive(Debug, Clone)]
pub struct NoiseSource {
    state: u64,
    seed: u64,
}

impl NoiseSource {
    pub fn new(seed: u64) -> Self {
        Self { state: seed, seed }
    }

    #[inline(always)]
    fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Uniform sample in `[-1, 1)`.
    #[inline(always)]
    pub fn next_symmetric(&mut self) -> f32 {
        // 24 high-quality mantissa bits are plenty for audio noise.
        let bits = (self.next_u64() >> 40) as f32;
        bits / (1u64 << 23) as f32 - 1.0
    }

    /// Rewind to the original seed.
    pub fn reset(&mut self) {
        self.state = self.seed;
    }
}

/// A block-in, block-out sample transform.
///
/// Implementations run on the real-time callback; they must complete in
/// bounded time regardless of input values.
pub trait BlockProcessor: Send {
    /// Fill `output` from `input`. Both slices have the same length.
    fn process(&mut self, input: &[f32], output: &mut [f32]);
}

/// Creates processor instances for render-graph chains.
///
/// Factories are registered by name on the `AudioSubsystem`; graph
/// construction looks the configured name up and fails closed if it is
/// missing.
pub trait ProcessorFactory: Send + Sync {
    fn create(&self, config: &VeilConfig) -> Box<dyn BlockProcessor>;
}

/// The built-in scrambler: additive bounded noise or full inversion.
#[derive(Debug, Clone)]
pub struct SampleScrambler {
    policy: ScramblePolicy,
    noise: NoiseSource,
}

impl SampleScrambler {
    pub fn new(policy: ScramblePolicy, seed: u64) -> Self {
        Self {
            policy,
            noise: NoiseSource::new(seed),
        }
    }
}

impl BlockProcessor for SampleScrambler {
    fn process(&mut self, input: &[f32], output: &mut [f32]) {
        debug_assert_eq!(input.len(), output.len());
        match self.policy {
            ScramblePolicy::AdditiveNoise { magnitude } => {
                for (out, &sample) in output.iter_mut().zip(input) {
                    let noise = self.noise.next_symmetric() * magnitude;
                    *out = (sample + noise).clamp(-1.0, 1.0);
                }
            }
            ScramblePolicy::Invert => {
                for (out, &sample) in output.iter_mut().zip(input) {
                    *out = -sample;
                }
            }
        }
    }
}

/// Factory for the built-in scrambler.
pub struct ScramblerFactory;

impl ProcessorFactory for ScramblerFactory {
    fn create(&self, config: &VeilConfig) -> Box<dyn BlockProcessor> {
        Box::new(SampleScrambler::new(config.scramble, config.noise_seed))
    }
}

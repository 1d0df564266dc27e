use serde::{Deserialize, Serialize};

/// How audio samples are perturbed on the real-time path.
///
/// Two policies are supported; which one is active is configuration, not a
/// compile-time choice.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum ScramblePolicy {
    /// `out[i] = clamp(in[i] + noise, -1, 1)` with noise drawn i.i.d. from a
    /// symmetric distribution in `[-magnitude, magnitude]`.
    AdditiveNoise { magnitude: f32 },
    /// `out[i] = -in[i]`. Applying the policy twice restores the input.
    Invert,
}

/// Configuration for the audio subsystem and its scrambling pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VeilConfig {
    /// Rendering sample rate in Hz (default: 48000).
    pub sample_rate: f64,

    /// Largest block the scrambler processes in one pass. Sizes the
    /// per-chain scratch buffer so the real-time path never allocates.
    pub max_block: usize,

    /// Name the transform processor is registered under in the subsystem.
    /// Graph construction fails closed if no processor with this name has
    /// been registered.
    pub processor: String,

    pub scramble: ScramblePolicy,

    /// Seed for the noise generator. Identical seeds produce bit-identical
    /// output for identical input.
    pub noise_seed: u64,
}

impl VeilConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.sample_rate <= 0.0 {
            return Err("sample rate must be positive".into());
        }
        if self.max_block == 0 {
            return Err("max block must be nonzero".into());
        }
        if self.processor.is_empty() {
            return Err("processor name must not be empty".into());
        }
        if let ScramblePolicy::AdditiveNoise { magnitude } = self.scramble {
            if !(magnitude > 0.0 && magnitude <= 0.1) {
                return Err(format!(
                    "noise magnitude must be in (0, 0.1], got {magnitude}"
                ));
            }
        }
        Ok(())
    }
}

impl Default for VeilConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48000.0,
            max_block: 4096,
            processor: "scrambler".into(),
            scramble: ScramblePolicy::AdditiveNoise { magnitude: 0.1 },
            noise_seed: 0x5eed_0d10,
        }
    }
}

//! The source → scrambler → sink pipeline.
//!
//! One chain is wired per raw audio track so the output stream is
//! structurally identical to the raw one: same track count, same kinds.
//! Scrambling happens inside the raw track's delivery callback — the
//! capture thread's clock domain — with a preallocated scratch buffer, so
//! the real-time path never allocates.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::models::error::BuildError;
use crate::models::stream::{MediaStream, MediaTrack, SampleCallback, SharedStream, TrackKind};
use crate::processing::scrambler::BlockProcessor;
use crate::session::context::AudioSubsystem;

/// A subscription on a raw audio track; the graph's entry node.
struct SourceBinding {
    track: Arc<MediaTrack>,
    subscription: u64,
}

/// The graph's exit node: owns the output track the consumer sees.
struct SinkNode {
    out: Arc<MediaTrack>,
}

/// One source → scrambler → sink run. The scrambler itself lives inside the
/// source's callback closure; a chain never exists without both endpoints.
struct Chain {
    source: SourceBinding,
    sink: SinkNode,
}

/// Per-chain processing state shared with the capture thread.
struct ScramblerNode {
    processor: Box<dyn BlockProcessor>,
    scratch: Vec<f32>,
}

/// A running transform pipeline bound to one rendering context.
///
/// Owns the node lifecycle: dropping the graph detaches every source
/// subscription and ends the output tracks.
pub struct RenderGraph {
    chains: Vec<Chain>,
    output: SharedStream,
}

impl std::fmt::Debug for RenderGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderGraph")
            .field("chains", &self.chains.len())
            .finish()
    }
}

impl RenderGraph {
    /// Wire `raw` through the configured transform processor.
    ///
    /// Fails closed: a missing processor registration aborts the build and
    /// no stream is produced. Raw video tracks are carried into the output
    /// untouched.
    pub fn build(raw: &SharedStream, subsystem: &AudioSubsystem) -> Result<Self, BuildError> {
        let config = subsystem.config();
        let factory = subsystem
            .processor_factory(&config.processor)
            .ok_or_else(|| BuildError::TransformUnavailable(config.processor.clone()))?;

        let audio_tracks: Vec<Arc<MediaTrack>> = raw
            .tracks()
            .iter()
            .filter(|t| t.kind() == TrackKind::Audio)
            .cloned()
            .collect();
        if audio_tracks.is_empty() {
            return Err(BuildError::MissingAudioTrack);
        }

        let mut chains = Vec::with_capacity(audio_tracks.len());
        let mut out_tracks = Vec::new();

        for track in audio_tracks {
            let out = MediaTrack::audio(format!("scrambled:{}", track.label()));
            let node = Mutex::new(ScramblerNode {
                processor: factory.create(config),
                scratch: vec![0.0; config.max_block.max(1)],
            });

            let out_for_callback = Arc::clone(&out);
            let callback: SampleCallback = Arc::new(move |samples: &[f32]| {
                let mut guard = node.lock();
                let ScramblerNode { processor, scratch } = &mut *guard;
                for chunk in samples.chunks(scratch.len()) {
                    let scratch = &mut scratch[..chunk.len()];
                    processor.process(chunk, scratch);
                    out_for_callback.push_samples(scratch);
                }
            });

            let subscription = track.subscribe(callback);
            log::debug!(
                "chain wired: {} -> scrambler -> {}",
                track.id(),
                out.id()
            );

            chains.push(Chain {
                source: SourceBinding {
                    track,
                    subscription,
                },
                sink: SinkNode {
                    out: Arc::clone(&out),
                },
            });
            out_tracks.push(out);
        }

        // Video passes through by reference; interception only substitutes
        // the stream object, it does not degrade video here.
        for track in raw.tracks() {
            if track.kind() == TrackKind::Video {
                out_tracks.push(Arc::clone(track));
            }
        }

        let output = MediaStream::new(out_tracks);
        log::info!(
            "render graph built: raw {} -> transformed {}",
            raw.id(),
            output.id()
        );

        Ok(Self { chains, output })
    }

    /// The stream the consumer observes.
    pub fn transformed(&self) -> SharedStream {
        Arc::clone(&self.output)
    }

    /// Whether the output still has a live audio track.
    pub fn is_alive(&self) -> bool {
        self.chains.iter().any(|c| !c.sink.out.is_stopped())
    }

    /// Detach every source subscription and end the output tracks.
    pub fn teardown(&mut self) {
        for chain in self.chains.drain(..) {
            chain.source.track.unsubscribe(chain.source.subscription);
            chain.sink.out.stop();
        }
    }
}

impl Drop for RenderGraph {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::config::{ScramblePolicy, VeilConfig};
    use crate::models::stream::MediaStream;
    use parking_lot::Mutex as PlMutex;

    fn ready_subsystem(config: VeilConfig) -> Arc<AudioSubsystem> {
        let subsystem = AudioSubsystem::new(config);
        subsystem.install_default_processor();
        subsystem.notify_user_gesture();
        subsystem
    }

    fn collect_output(track: &Arc<MediaTrack>) -> Arc<PlMutex<Vec<f32>>> {
        let collected = Arc::new(PlMutex::new(Vec::new()));
        let sink = Arc::clone(&collected);
        track.subscribe(Arc::new(move |samples| {
            sink.lock().extend_from_slice(samples);
        }));
        collected
    }

    #[test]
    fn build_fails_without_registered_processor() {
        let subsystem = AudioSubsystem::new(VeilConfig::default());
        subsystem.notify_user_gesture();
        let raw = MediaStream::new(vec![MediaTrack::audio("mic")]);

        let err = RenderGraph::build(&raw, &subsystem).unwrap_err();
        assert_eq!(err, BuildError::TransformUnavailable("scrambler".into()));
    }

    #[test]
    fn build_fails_without_audio_track() {
        let subsystem = ready_subsystem(VeilConfig::default());
        let raw = MediaStream::new(vec![MediaTrack::video("cam")]);

        let err = RenderGraph::build(&raw, &subsystem).unwrap_err();
        assert_eq!(err, BuildError::MissingAudioTrack);
    }

    #[test]
    fn output_matches_raw_track_shape() {
        let subsystem = ready_subsystem(VeilConfig::default());
        let raw = MediaStream::new(vec![
            MediaTrack::audio("mic-a"),
            MediaTrack::audio("mic-b"),
            MediaTrack::video("cam"),
        ]);

        let graph = RenderGraph::build(&raw, &subsystem).unwrap();
        let out = graph.transformed();

        let audio = out
            .tracks()
            .iter()
            .filter(|t| t.kind() == TrackKind::Audio)
            .count();
        let video = out
            .tracks()
            .iter()
            .filter(|t| t.kind() == TrackKind::Video)
            .count();
        assert_eq!((audio, video), (2, 1));
        assert_ne!(out.id(), raw.id());
    }

    #[test]
    fn samples_are_scrambled_on_the_way_through() {
        let subsystem = ready_subsystem(VeilConfig::default());
        let mic = MediaTrack::audio("mic");
        let raw = MediaStream::new(vec![Arc::clone(&mic)]);

        let graph = RenderGraph::build(&raw, &subsystem).unwrap();
        let out_track = Arc::clone(&graph.transformed().tracks()[0]);
        let collected = collect_output(&out_track);

        let input: Vec<f32> = (0..256).map(|i| (i as f32 * 0.05).sin() * 0.4).collect();
        mic.push_samples(&input);

        let output = collected.lock().clone();
        assert_eq!(output.len(), input.len());
        let changed = input
            .iter()
            .zip(&output)
            .filter(|(a, b)| (*a - *b).abs() > 1e-4)
            .count();
        assert!(changed > 200, "only {changed} samples perturbed");
        assert!(output.iter().all(|s| s.abs() <= 1.0));
    }

    #[test]
    fn inversion_through_graph_round_trips() {
        let config = VeilConfig {
            scramble: ScramblePolicy::Invert,
            ..VeilConfig::default()
        };
        let subsystem = ready_subsystem(config);
        let mic = MediaTrack::audio("mic");
        let raw = MediaStream::new(vec![Arc::clone(&mic)]);

        let graph = RenderGraph::build(&raw, &subsystem).unwrap();
        let out_track = Arc::clone(&graph.transformed().tracks()[0]);
        let collected = collect_output(&out_track);

        let input = vec![0.25f32, -0.5, 0.75];
        mic.push_samples(&input);

        let inverted = collected.lock().clone();
        assert_eq!(inverted, vec![-0.25, 0.5, -0.75]);
    }

    #[test]
    fn blocks_larger_than_scratch_are_chunked() {
        let config = VeilConfig {
            max_block: 64,
            scramble: ScramblePolicy::Invert,
            ..VeilConfig::default()
        };
        let subsystem = ready_subsystem(config);
        let mic = MediaTrack::audio("mic");
        let raw = MediaStream::new(vec![Arc::clone(&mic)]);

        let graph = RenderGraph::build(&raw, &subsystem).unwrap();
        let out_track = Arc::clone(&graph.transformed().tracks()[0]);
        let collected = collect_output(&out_track);

        let input = vec![0.5f32; 200];
        mic.push_samples(&input);

        let output = collected.lock().clone();
        assert_eq!(output.len(), 200);
        assert!(output.iter().all(|&s| s == -0.5));
    }

    #[test]
    fn teardown_detaches_and_ends_output() {
        let subsystem = ready_subsystem(VeilConfig::default());
        let mic = MediaTrack::audio("mic");
        let raw = MediaStream::new(vec![Arc::clone(&mic)]);

        let mut graph = RenderGraph::build(&raw, &subsystem).unwrap();
        let out = graph.transformed();
        assert!(graph.is_alive());

        graph.teardown();
        assert!(!graph.is_alive());
        assert!(out.tracks().iter().all(|t| t.is_stopped()));

        // Pushing into the raw track no longer reaches anything.
        let collected = collect_output(&out.tracks()[0]);
        mic.push_samples(&[0.1; 32]);
        assert!(collected.lock().is_empty());
    }
}

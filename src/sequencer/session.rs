// Sequencer session - The one object owning all drum machine state
// UI actions go through its methods; outputs are reported to an observer

use super::SequencerError;
use super::composer::PatternComposer;
use super::pattern::{PatternName, PatternTable, StepPattern, Track};
use super::tempo::Tempo;
use super::transport::{StepHandler, Transport};
use super::trigger::{PlaybackTrigger, SamplePlayer};
use std::sync::Arc;

/// Receives the outputs the host UI renders
///
/// `step` is called from the transport thread once per tick, after playback.
pub trait SequencerObserver: Send + Sync {
    fn step(&self, _step: usize) {}

    fn pattern_changed(&self, _track: Track, _pattern: &StepPattern) {}

    fn cleared(&self) {}
}

/// Observer that ignores everything
pub struct NullObserver;

impl SequencerObserver for NullObserver {}

/// Tick work: playback first, then the highlight
struct StepDriver {
    trigger: PlaybackTrigger,
    observer: Arc<dyn SequencerObserver>,
}

impl StepHandler for StepDriver {
    fn on_step(&mut self, step: usize) {
        let hits = self.trigger.trigger(step);
        if !hits.is_empty() {
            log::trace!("Step {:2}: {:?}", step, hits);
        }
        self.observer.step(step);
    }
}

pub struct Sequencer {
    composer: PatternComposer,
    trigger: PlaybackTrigger,
    transport: Transport,
    observer: Arc<dyn SequencerObserver>,
}

impl Sequencer {
    pub fn new(table: PatternTable, observer: Arc<dyn SequencerObserver>) -> Self {
        Self::with_tempo(table, Tempo::default(), observer)
    }

    pub fn with_tempo(
        table: PatternTable,
        tempo: Tempo,
        observer: Arc<dyn SequencerObserver>,
    ) -> Self {
        let composer = PatternComposer::new(table);
        let trigger = PlaybackTrigger::new(composer.shared());
        let driver = StepDriver {
            trigger: trigger.clone(),
            observer: Arc::clone(&observer),
        };

        Self {
            composer,
            trigger,
            transport: Transport::with_tempo(tempo, driver),
            observer,
        }
    }

    /// Flip a sub-pattern of a track and recompute its effective pattern
    /// Returns whether the sub-pattern is enabled afterwards
    pub fn toggle(&mut self, track: Track, name: PatternName) -> bool {
        let enabled = self.composer.toggle(track, name);
        let pattern = self.composer.effective(track);
        log::debug!(
            "{} {} {} -> {}",
            if enabled { "Enabled" } else { "Disabled" },
            track,
            name,
            pattern
        );
        self.observer.pattern_changed(track, &pattern);
        enabled
    }

    /// [`Sequencer::toggle`] for textual identifiers from an external boundary
    pub fn toggle_by_name(&mut self, track: &str, name: &str) -> Result<bool, SequencerError> {
        let track: Track = track.parse()?;
        let name: PatternName = name.parse()?;
        Ok(self.toggle(track, name))
    }

    /// Disable every sub-pattern on every track
    pub fn clear_all(&mut self) {
        self.composer.clear_all();
        log::debug!("Cleared all patterns");
        self.observer.cleared();
    }

    /// Start (or restart) at `bpm`
    pub fn start(&mut self, bpm: f64) -> Result<(), SequencerError> {
        self.transport.start(bpm)
    }

    /// Start (or restart) at the current tempo
    pub fn play(&mut self) {
        self.transport.play();
    }

    pub fn stop(&mut self) {
        self.transport.stop();
    }

    pub fn set_tempo(&mut self, bpm: f64) -> Result<(), SequencerError> {
        self.transport.set_tempo(bpm)
    }

    pub fn is_running(&self) -> bool {
        self.transport.is_running()
    }

    pub fn bpm(&self) -> f64 {
        self.transport.bpm()
    }

    pub fn tempo(&self) -> Tempo {
        self.transport.tempo()
    }

    pub fn is_enabled(&self, track: Track, name: PatternName) -> bool {
        self.composer.is_enabled(track, name)
    }

    pub fn effective_pattern(&self, track: Track) -> StepPattern {
        self.composer.effective(track)
    }

    pub fn bind_sample(&self, track: Track, sample: Arc<dyn SamplePlayer>) {
        self.trigger.bind(track, sample);
    }

    pub fn has_sample(&self, track: Track) -> bool {
        self.trigger.is_bound(track)
    }
}

// Playback trigger - Restarts the samples of every track that hits on a step

use super::composer::SharedPatterns;
use super::pattern::Track;
use std::sync::{Arc, PoisonError, RwLock};

/// A retriggerable sample resource
pub trait SamplePlayer: Send + Sync {
    /// Move the playhead to `frame`
    fn set_position(&self, frame: usize);

    /// Start playback from the current playhead
    fn play(&self);
}

type SampleSlots = [Option<Arc<dyn SamplePlayer>>; 4];

/// Per-track sample bindings plus the effective patterns they follow
///
/// Cloning yields another handle onto the same bindings.
#[derive(Clone)]
pub struct PlaybackTrigger {
    patterns: SharedPatterns,
    samples: Arc<RwLock<SampleSlots>>,
}

impl PlaybackTrigger {
    pub fn new(patterns: SharedPatterns) -> Self {
        Self {
            patterns,
            samples: Arc::new(RwLock::new([None, None, None, None])),
        }
    }

    /// Bind a sample to a track, replacing any previous binding
    pub fn bind(&self, track: Track, sample: Arc<dyn SamplePlayer>) {
        let mut samples = self.samples.write().unwrap_or_else(PoisonError::into_inner);
        samples[track.index()] = Some(sample);
    }

    pub fn is_bound(&self, track: Track) -> bool {
        let samples = self.samples.read().unwrap_or_else(PoisonError::into_inner);
        samples[track.index()].is_some()
    }

    /// Retrigger every bound track whose effective pattern hits on `step`
    ///
    /// Returns the tracks that hit, including unbound ones that were skipped.
    pub fn trigger(&self, step: usize) -> Vec<Track> {
        let patterns = self.patterns.snapshot();
        let samples = self.samples.read().unwrap_or_else(PoisonError::into_inner);

        let mut hits = Vec::new();
        for track in Track::ALL {
            if !patterns[track.index()].is_hit(step) {
                continue;
            }
            hits.push(track);

            if let Some(sample) = &samples[track.index()] {
                sample.set_position(0);
                sample.play();
            }
        }
        hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequencer::{PatternComposer, PatternName};
    use std::sync::Mutex;

    /// Records calls as (track, action) pairs
    struct FakeSample {
        track: Track,
        calls: Arc<Mutex<Vec<(Track, &'static str)>>>,
    }

    impl SamplePlayer for FakeSample {
        fn set_position(&self, frame: usize) {
            assert_eq!(frame, 0);
            self.calls.lock().unwrap().push((self.track, "rewind"));
        }

        fn play(&self) {
            self.calls.lock().unwrap().push((self.track, "play"));
        }
    }

    fn bind_fake(
        trigger: &PlaybackTrigger,
        track: Track,
        calls: &Arc<Mutex<Vec<(Track, &'static str)>>>,
    ) {
        trigger.bind(
            track,
            Arc::new(FakeSample {
                track,
                calls: Arc::clone(calls),
            }),
        );
    }

    #[test]
    fn test_hits_rewind_then_play() {
        let mut composer = PatternComposer::default();
        composer.toggle(Track::Kick, PatternName::Pattern2);
        let trigger = PlaybackTrigger::new(composer.shared());
        let calls = Arc::new(Mutex::new(Vec::new()));
        bind_fake(&trigger, Track::Kick, &calls);

        assert_eq!(trigger.trigger(4), vec![Track::Kick]);
        assert_eq!(
            *calls.lock().unwrap(),
            vec![(Track::Kick, "rewind"), (Track::Kick, "play")]
        );
    }

    #[test]
    fn test_rests_do_not_play() {
        let mut composer = PatternComposer::default();
        composer.toggle(Track::Kick, PatternName::Pattern2);
        let trigger = PlaybackTrigger::new(composer.shared());
        let calls = Arc::new(Mutex::new(Vec::new()));
        bind_fake(&trigger, Track::Kick, &calls);

        assert!(trigger.trigger(1).is_empty());
        assert!(calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_unbound_track_is_skipped() {
        let mut composer = PatternComposer::default();
        composer.toggle(Track::Kick, PatternName::Pattern2);
        composer.toggle(Track::Snare, PatternName::Pattern1);
        let trigger = PlaybackTrigger::new(composer.shared());
        let calls = Arc::new(Mutex::new(Vec::new()));
        bind_fake(&trigger, Track::Snare, &calls);

        assert_eq!(trigger.trigger(4), vec![Track::Kick, Track::Snare]);
        assert_eq!(
            *calls.lock().unwrap(),
            vec![(Track::Snare, "rewind"), (Track::Snare, "play")]
        );
    }

    #[test]
    fn test_retrigger_on_consecutive_hits() {
        let mut composer = PatternComposer::default();
        composer.toggle(Track::ClosedHat, PatternName::Pattern3);
        let trigger = PlaybackTrigger::new(composer.shared());
        let calls = Arc::new(Mutex::new(Vec::new()));
        bind_fake(&trigger, Track::ClosedHat, &calls);

        trigger.trigger(0);
        trigger.trigger(1);
        let plays = calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, action)| *action == "play")
            .count();
        assert_eq!(plays, 2);
    }

    #[test]
    fn test_bind_is_shared_between_clones() {
        let composer = PatternComposer::default();
        let trigger = PlaybackTrigger::new(composer.shared());
        let calls = Arc::new(Mutex::new(Vec::new()));

        assert!(!trigger.is_bound(Track::OpenHat));
        bind_fake(&trigger, Track::OpenHat, &calls);
        assert!(trigger.clone().is_bound(Track::OpenHat));
        assert!(!trigger.is_bound(Track::Kick));
    }
}

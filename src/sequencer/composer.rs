// Pattern composer - Merges enabled sub-patterns into one effective pattern per track
// Effective patterns are published to a shared table read by the transport thread

use super::pattern::{PatternName, PatternTable, StepPattern, Track};
use std::sync::{Arc, PoisonError, RwLock};

/// Effective patterns shared between the control side and the timer thread
///
/// Only the composer writes; ticks take a read snapshot of all tracks at once.
#[derive(Debug, Clone, Default)]
pub struct SharedPatterns {
    inner: Arc<RwLock<[StepPattern; 4]>>,
}

impl SharedPatterns {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of all effective patterns, indexed by [`Track::index`]
    pub fn snapshot(&self) -> [StepPattern; 4] {
        *self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self, track: Track) -> StepPattern {
        self.snapshot()[track.index()]
    }

    fn set(&self, track: Track, pattern: StepPattern) {
        let mut patterns = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        patterns[track.index()] = pattern;
    }

    fn reset(&self) {
        let mut patterns = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        *patterns = [StepPattern::EMPTY; 4];
    }
}

/// Toggle state plus the derivation of effective patterns
pub struct PatternComposer {
    table: PatternTable,
    enabled: [[bool; 3]; 4],
    shared: SharedPatterns,
}

impl PatternComposer {
    pub fn new(table: PatternTable) -> Self {
        Self {
            table,
            enabled: [[false; 3]; 4],
            shared: SharedPatterns::new(),
        }
    }

    /// Handle to the published effective patterns
    pub fn shared(&self) -> SharedPatterns {
        self.shared.clone()
    }

    pub fn is_enabled(&self, track: Track, name: PatternName) -> bool {
        self.enabled[track.index()][name.index()]
    }

    /// Flip membership of (track, name) and recompute the track
    /// Returns whether the sub-pattern is enabled afterwards
    pub fn toggle(&mut self, track: Track, name: PatternName) -> bool {
        let slot = &mut self.enabled[track.index()][name.index()];
        *slot = !*slot;
        let now_enabled = *slot;
        self.recompute(track);
        now_enabled
    }

    /// OR every enabled sub-pattern of `track` and publish the result
    /// Other tracks are left untouched
    pub fn recompute(&mut self, track: Track) -> StepPattern {
        let combined = PatternName::ALL
            .into_iter()
            .filter(|name| self.is_enabled(track, *name))
            .fold(StepPattern::EMPTY, |acc, name| {
                acc.union(self.table.get(track, name))
            });

        self.shared.set(track, combined);
        combined
    }

    /// Disable every sub-pattern and reset all effective patterns to rests
    pub fn clear_all(&mut self) {
        self.enabled = [[false; 3]; 4];
        self.shared.reset();
    }

    /// Currently published effective pattern of a track
    pub fn effective(&self, track: Track) -> StepPattern {
        self.shared.get(track)
    }
}

impl Default for PatternComposer {
    fn default() -> Self {
        Self::new(PatternTable::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_enabled_patterns_is_empty() {
        let mut composer = PatternComposer::default();
        for track in Track::ALL {
            assert_eq!(composer.recompute(track), StepPattern::EMPTY);
        }
    }

    #[test]
    fn test_single_pattern_is_copied() {
        let mut composer = PatternComposer::default();
        composer.toggle(Track::Snare, PatternName::Pattern2);
        assert_eq!(
            composer.effective(Track::Snare).to_string(),
            "--x----x--x----x"
        );
    }

    #[test]
    fn test_all_patterns_are_or_folded() {
        let mut composer = PatternComposer::default();
        for name in PatternName::ALL {
            composer.toggle(Track::OpenHat, name);
        }
        // No hits overlap between the three
        assert_eq!(
            composer.effective(Track::OpenHat).to_string(),
            "-x--x--x--x-x---"
        );
    }

    #[test]
    fn test_colliding_hits_stay_single() {
        let mut composer = PatternComposer::default();
        composer.toggle(Track::Snare, PatternName::Pattern1);
        composer.toggle(Track::Snare, PatternName::Pattern3);
        // pattern1 and pattern3 are identical for the snare
        assert_eq!(
            composer.effective(Track::Snare).to_string(),
            "----x-------x---"
        );
    }

    #[test]
    fn test_toggle_twice_disables() {
        let mut composer = PatternComposer::default();
        assert!(composer.toggle(Track::Kick, PatternName::Pattern1));
        assert!(!composer.toggle(Track::Kick, PatternName::Pattern1));
        assert!(composer.effective(Track::Kick).is_empty());
        assert!(!composer.is_enabled(Track::Kick, PatternName::Pattern1));
    }

    #[test]
    fn test_toggle_leaves_other_tracks_alone() {
        let mut composer = PatternComposer::default();
        composer.toggle(Track::Kick, PatternName::Pattern2);
        composer.toggle(Track::ClosedHat, PatternName::Pattern1);
        composer.toggle(Track::ClosedHat, PatternName::Pattern1);

        assert_eq!(
            composer.effective(Track::Kick).to_string(),
            "x---x---x---x---"
        );
        assert!(composer.effective(Track::ClosedHat).is_empty());
    }

    #[test]
    fn test_clear_all_resets_everything() {
        let mut composer = PatternComposer::default();
        for track in Track::ALL {
            composer.toggle(track, PatternName::Pattern3);
        }
        composer.clear_all();

        for track in Track::ALL {
            assert!(composer.effective(track).is_empty());
            assert_eq!(composer.recompute(track), StepPattern::EMPTY);
            assert!(!composer.is_enabled(track, PatternName::Pattern3));
        }
    }

    #[test]
    fn test_shared_handle_sees_updates() {
        let mut composer = PatternComposer::default();
        let shared = composer.shared();
        composer.toggle(Track::ClosedHat, PatternName::Pattern3);
        assert_eq!(shared.get(Track::ClosedHat).hit_count(), 16);
        assert!(shared.snapshot()[Track::Kick.index()].is_empty());
    }
}

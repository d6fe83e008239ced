// Pattern - Tracks, sub-pattern names, 16-step patterns and the pattern table
// The table is built once at startup and never mutated afterwards

use super::SequencerError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of steps in the loop (one bar of sixteenth notes)
pub const STEPS: usize = 16;

/// Percussion voice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Track {
    Kick,
    Snare,
    ClosedHat,
    OpenHat,
}

impl Track {
    /// All tracks, in display order
    pub const ALL: [Track; 4] = [Track::Kick, Track::Snare, Track::ClosedHat, Track::OpenHat];

    /// Identifier used in config files, CLI arguments and sample file names
    pub fn name(&self) -> &'static str {
        match self {
            Track::Kick => "kick",
            Track::Snare => "snare",
            Track::ClosedHat => "closedhat",
            Track::OpenHat => "openhat",
        }
    }

    /// Human readable label for the UI
    pub fn label(&self) -> &'static str {
        match self {
            Track::Kick => "Kick",
            Track::Snare => "Snare",
            Track::ClosedHat => "Closed hat",
            Track::OpenHat => "Open hat",
        }
    }

    /// Position of the track in [`Track::ALL`]
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Track {
    type Err = SequencerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Track::ALL
            .into_iter()
            .find(|track| track.name() == s)
            .ok_or_else(|| SequencerError::InvalidIdentifier(s.to_string()))
    }
}

/// One of the three predefined rhythmic variations of a track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternName {
    Pattern1,
    Pattern2,
    Pattern3,
}

impl PatternName {
    pub const ALL: [PatternName; 3] = [
        PatternName::Pattern1,
        PatternName::Pattern2,
        PatternName::Pattern3,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            PatternName::Pattern1 => "pattern1",
            PatternName::Pattern2 => "pattern2",
            PatternName::Pattern3 => "pattern3",
        }
    }

    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for PatternName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PatternName {
    type Err = SequencerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PatternName::ALL
            .into_iter()
            .find(|name| name.name() == s)
            .ok_or_else(|| SequencerError::InvalidIdentifier(s.to_string()))
    }
}

/// A 16-step hit/rest sequence
///
/// Text form: `x` or `X` is a hit, `-` or `.` is a rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct StepPattern {
    steps: [bool; STEPS],
}

impl StepPattern {
    /// All rests
    pub const EMPTY: StepPattern = StepPattern {
        steps: [false; STEPS],
    };

    /// Parse the 16-character text form
    pub fn parse(text: &str) -> Result<Self, SequencerError> {
        let chars: Vec<char> = text.chars().collect();
        if chars.len() != STEPS {
            return Err(SequencerError::InvalidPattern {
                pattern: text.to_string(),
                reason: format!("expected {} steps, got {}", STEPS, chars.len()),
            });
        }

        let mut steps = [false; STEPS];
        for (i, ch) in chars.into_iter().enumerate() {
            steps[i] = match ch {
                'x' | 'X' => true,
                '-' | '.' => false,
                other => {
                    return Err(SequencerError::InvalidPattern {
                        pattern: text.to_string(),
                        reason: format!("unexpected character '{}' at step {}", other, i),
                    });
                }
            };
        }

        Ok(Self { steps })
    }

    /// Whether `step` is a hit. Out-of-range steps are rests.
    pub fn is_hit(&self, step: usize) -> bool {
        step < STEPS && self.steps[step]
    }

    /// Step-wise logical OR
    pub fn union(&self, other: &StepPattern) -> StepPattern {
        let mut steps = self.steps;
        for (step, hit) in steps.iter_mut().zip(other.steps.iter()) {
            *step |= *hit;
        }
        StepPattern { steps }
    }

    pub fn is_empty(&self) -> bool {
        !self.steps.iter().any(|hit| *hit)
    }

    pub fn hit_count(&self) -> usize {
        self.steps.iter().filter(|hit| **hit).count()
    }
}

impl FromStr for StepPattern {
    type Err = SequencerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StepPattern::parse(s)
    }
}

impl fmt::Display for StepPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for hit in &self.steps {
            f.write_str(if *hit { "x" } else { "-" })?;
        }
        Ok(())
    }
}

/// The built-in table, one row per track in [`Track::ALL`] order
const DEFAULT_TABLE: [[&str; 3]; 4] = [
    ["x------xx-x---x-", "x---x---x---x---", "xx----xx--------"],
    ["----x-------x---", "--x----x--x----x", "----x-------x---"],
    ["x-x-x-x-x-x-x-x-", "--x--x-x--x--x-x", "xxxxxxxxxxxxxxxx"],
    ["-x--------------", "----x-------x---", "-------x--x-----"],
];

/// Immutable lookup of the three sub-patterns of every track
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternTable {
    patterns: [[StepPattern; 3]; 4],
}

impl PatternTable {
    /// Start from the defaults and replace the given entries
    pub fn with_overrides<I>(overrides: I) -> Self
    where
        I: IntoIterator<Item = (Track, PatternName, StepPattern)>,
    {
        let mut table = Self::default();
        for (track, name, pattern) in overrides {
            table.patterns[track.index()][name.index()] = pattern;
        }
        table
    }

    pub fn get(&self, track: Track, name: PatternName) -> &StepPattern {
        &self.patterns[track.index()][name.index()]
    }
}

impl Default for PatternTable {
    fn default() -> Self {
        let mut patterns = [[StepPattern::EMPTY; 3]; 4];
        for (row, texts) in patterns.iter_mut().zip(DEFAULT_TABLE.iter()) {
            for (slot, text) in row.iter_mut().zip(texts.iter()) {
                // The built-in strings are covered by test_default_table_parses
                *slot = StepPattern::parse(text).unwrap_or(StepPattern::EMPTY);
            }
        }
        Self { patterns }
    }
}

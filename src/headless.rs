// Headless runner - Plays the loop for a fixed number of bars and prints each step

use crate::messaging::{EventConsumer, SequencerEvent};
use crate::sequencer::{STEPS, Sequencer, Track};
use ringbuf::traits::Consumer;
use std::thread;
use std::time::{Duration, Instant};

/// One printed line per played step: step number plus the tracks that hit
pub fn format_step_line(sequencer: &Sequencer, step: usize) -> String {
    let hits: Vec<&str> = Track::ALL
        .into_iter()
        .filter(|track| sequencer.effective_pattern(*track).is_hit(step))
        .map(|track| track.name())
        .collect();

    let marker = if step % 4 == 0 { '|' } else { ' ' };
    format!("{}{:2}  {}", marker, step + 1, hits.join(" "))
}

/// Generous upper bound so a stalled timer cannot hang the process
///
/// `None` when the bound is too far away to represent.
fn run_deadline(interval: Duration, total_steps: usize) -> Option<Instant> {
    u32::try_from(total_steps + 8)
        .ok()
        .and_then(|ticks| interval.checked_mul(ticks))
        .and_then(|budget| budget.checked_add(Duration::from_secs(2)))
        .and_then(|budget| Instant::now().checked_add(budget))
}

/// Run `bars` full loops at the sequencer's tempo, then stop
///
/// Returns the number of steps played.
pub fn run(sequencer: &mut Sequencer, events: &mut EventConsumer, bars: u32) -> usize {
    let total_steps = bars as usize * STEPS;
    let interval = sequencer.tempo().step_interval();
    let deadline = run_deadline(interval, total_steps);

    sequencer.play();

    let mut played = 0;
    while played < total_steps && deadline.is_none_or(|deadline| Instant::now() < deadline) {
        while let Some(event) = events.try_pop() {
            match event {
                SequencerEvent::Step(step) => {
                    println!("{}", format_step_line(sequencer, step));
                    played += 1;
                    if played == total_steps {
                        break;
                    }
                }
                SequencerEvent::PatternChanged(track, pattern) => {
                    log::debug!("{} -> {}", track, pattern);
                }
                SequencerEvent::Cleared => {}
            }
        }
        thread::sleep(Duration::from_millis(2));
    }

    sequencer.stop();
    if played < total_steps {
        log::warn!("Played {} of {} steps before the deadline", played, total_steps);
    }
    played
}

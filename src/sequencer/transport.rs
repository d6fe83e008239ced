// Transport - Play/stop control and the step clock
// Ticks run on a dedicated timer thread; stop() joins it so no tick can fire afterwards

use super::SequencerError;
use super::pattern::STEPS;
use super::tempo::Tempo;
use crossbeam_channel::{Sender, TryRecvError, bounded, select, tick};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};

/// Work performed on every tick for the current step
pub trait StepHandler: Send {
    fn on_step(&mut self, step: usize);
}

impl<F> StepHandler for F
where
    F: FnMut(usize) + Send,
{
    fn on_step(&mut self, step: usize) {
        self(step)
    }
}

type SharedHandler = Arc<Mutex<Box<dyn StepHandler>>>;

/// Running timer thread and its cancellation channel
struct TimerWorker {
    stop_tx: Sender<()>,
    handle: JoinHandle<()>,
}

/// Transport controller
/// Owns the tempo and at most one timer thread; each run counts steps from 0
pub struct Transport {
    tempo: Tempo,
    handler: SharedHandler,
    worker: Option<TimerWorker>,
}

impl Transport {
    /// Create a stopped transport at the default tempo
    pub fn new<H>(handler: H) -> Self
    where
        H: StepHandler + 'static,
    {
        Self::with_tempo(Tempo::default(), handler)
    }

    pub fn with_tempo<H>(tempo: Tempo, handler: H) -> Self
    where
        H: StepHandler + 'static,
    {
        let handler: Box<dyn StepHandler> = Box::new(handler);
        Self {
            tempo,
            handler: Arc::new(Mutex::new(handler)),
            worker: None,
        }
    }

    /// Start (or restart) the loop at `bpm`
    ///
    /// An invalid tempo is rejected before anything changes.
    pub fn start(&mut self, bpm: f64) -> Result<(), SequencerError> {
        let tempo = Tempo::new(bpm)?;
        self.stop();
        self.tempo = tempo;
        self.launch();
        Ok(())
    }

    /// Start (or restart) the loop at the current tempo
    pub fn play(&mut self) {
        self.stop();
        self.launch();
    }

    /// Cancel the timer. Calling it while stopped is a no-op.
    pub fn stop(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };

        // A disconnected channel stops the thread as well
        let _ = worker.stop_tx.send(());
        if worker.handle.join().is_err() {
            log::error!("Transport timer thread panicked");
        }
        log::debug!("Transport stopped");
    }

    /// Change the tempo; a running loop restarts at step 0 with the new interval
    pub fn set_tempo(&mut self, bpm: f64) -> Result<(), SequencerError> {
        let tempo = Tempo::new(bpm)?;
        if self.is_running() {
            self.start(bpm)
        } else {
            self.tempo = tempo;
            Ok(())
        }
    }

    pub fn tempo(&self) -> Tempo {
        self.tempo
    }

    pub fn bpm(&self) -> f64 {
        self.tempo.bpm()
    }

    pub fn is_running(&self) -> bool {
        self.worker.is_some()
    }

    fn launch(&mut self) {
        let interval = self.tempo.step_interval();
        let (stop_tx, stop_rx) = bounded::<()>(1);
        let handler = Arc::clone(&self.handler);

        let handle = thread::spawn(move || {
            let ticker = tick(interval);
            let mut step = 0;
            loop {
                select! {
                    recv(stop_rx) -> _ => break,
                    recv(ticker) -> _ => {
                        // A stop request wins over a tick that became ready at the same time
                        if !matches!(stop_rx.try_recv(), Err(TryRecvError::Empty)) {
                            break;
                        }

                        handler
                            .lock()
                            .unwrap_or_else(PoisonError::into_inner)
                            .on_step(step);
                        step = (step + 1) % STEPS;
                    }
                }
            }
        });

        log::info!(
            "Transport started at {} ({:.1} ms per step)",
            self.tempo,
            self.tempo.step_interval_ms()
        );
        self.worker = Some(TimerWorker { stop_tx, handle });
    }
}

impl Drop for Transport {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    type TickLog = Arc<Mutex<Vec<(usize, Instant)>>>;

    fn recording_transport() -> (Transport, TickLog) {
        let log: TickLog = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        let transport = Transport::new(move |step: usize| {
            sink.lock().unwrap().push((step, Instant::now()));
        });
        (transport, log)
    }

    fn wait_for_ticks(log: &TickLog, count: usize) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while log.lock().unwrap().len() < count {
            assert!(Instant::now() < deadline, "timed out waiting for ticks");
            thread::sleep(Duration::from_millis(2));
        }
    }

    #[test]
    fn test_new_transport_is_stopped() {
        let (transport, _) = recording_transport();
        assert!(!transport.is_running());
        assert_eq!(transport.bpm(), 100.0);
    }

    #[test]
    fn test_steps_advance_from_zero() {
        let (mut transport, log) = recording_transport();
        transport.start(600.0).unwrap();
        assert!(transport.is_running());
        wait_for_ticks(&log, 5);
        transport.stop();

        let steps: Vec<usize> = log.lock().unwrap().iter().map(|(s, _)| *s).collect();
        for (i, step) in steps.iter().enumerate() {
            assert_eq!(*step, i % STEPS);
        }
    }

    #[test]
    fn test_tick_spacing_follows_tempo() {
        let (mut transport, log) = recording_transport();
        let started = Instant::now();
        transport.start(600.0).unwrap();
        wait_for_ticks(&log, 9);
        transport.stop();

        let interval = Duration::from_millis(25);
        let ticks = log.lock().unwrap().clone();
        assert!(ticks[0].1.duration_since(started) >= interval - Duration::from_millis(1));

        // Average spacing over eight gaps, not early and not twice as slow
        let gaps = ticks.len() as u32 - 1;
        let average = ticks[ticks.len() - 1].1.duration_since(ticks[0].1) / gaps;
        assert!(average + Duration::from_millis(3) >= interval, "too fast: {:?}", average);
        assert!(average < interval * 2, "too slow: {:?}", average);
    }

    #[test]
    fn test_wraps_after_sixteen_steps() {
        let (mut transport, log) = recording_transport();
        transport.start(2400.0).unwrap();
        wait_for_ticks(&log, STEPS + 2);
        transport.stop();

        let ticks = log.lock().unwrap();
        assert_eq!(ticks[STEPS - 1].0, STEPS - 1);
        assert_eq!(ticks[STEPS].0, 0);
        assert_eq!(ticks[STEPS + 1].0, 1);
    }

    #[test]
    fn test_no_ticks_after_stop() {
        let (mut transport, log) = recording_transport();
        transport.start(600.0).unwrap();
        wait_for_ticks(&log, 2);
        transport.stop();
        assert!(!transport.is_running());

        let count = log.lock().unwrap().len();
        thread::sleep(Duration::from_millis(100));
        assert_eq!(log.lock().unwrap().len(), count);
    }

    #[test]
    fn test_stop_is_idempotent() {
        let (mut transport, _) = recording_transport();
        transport.stop();
        transport.start(300.0).unwrap();
        transport.stop();
        transport.stop();
        assert!(!transport.is_running());
    }

    #[test]
    fn test_second_start_restarts_at_zero() {
        let (mut transport, log) = recording_transport();
        transport.start(600.0).unwrap();
        wait_for_ticks(&log, 3);
        transport.start(600.0).unwrap();
        let boundary = log.lock().unwrap().len();

        wait_for_ticks(&log, boundary + 1);
        transport.stop();
        assert_eq!(log.lock().unwrap()[boundary].0, 0);
    }

    #[test]
    fn test_set_tempo_while_running_restarts() {
        let (mut transport, log) = recording_transport();
        transport.start(600.0).unwrap();
        wait_for_ticks(&log, 3);
        transport.set_tempo(1200.0).unwrap();
        let boundary = log.lock().unwrap().len();

        assert!(transport.is_running());
        assert_eq!(transport.bpm(), 1200.0);
        assert!((transport.tempo().step_interval().as_secs_f64() - 0.0125).abs() < 1e-9);

        wait_for_ticks(&log, boundary + 2);
        transport.stop();
        let ticks = log.lock().unwrap();
        assert_eq!(ticks[boundary].0, 0);
        assert_eq!(ticks[boundary + 1].0, 1);
    }

    #[test]
    fn test_set_tempo_while_stopped_does_not_start() {
        let (mut transport, log) = recording_transport();
        transport.set_tempo(140.0).unwrap();
        assert!(!transport.is_running());
        assert_eq!(transport.bpm(), 140.0);
        thread::sleep(Duration::from_millis(150));
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn test_invalid_tempo_leaves_state_unchanged() {
        let (mut transport, _) = recording_transport();
        transport.start(120.0).unwrap();

        assert_eq!(transport.start(0.0), Err(SequencerError::InvalidTempo(0.0)));
        assert_eq!(
            transport.set_tempo(-5.0),
            Err(SequencerError::InvalidTempo(-5.0))
        );
        assert!(transport.set_tempo(f64::NAN).is_err());

        assert!(transport.is_running());
        assert_eq!(transport.bpm(), 120.0);
        transport.stop();
    }

    #[test]
    fn test_play_uses_current_tempo() {
        let (mut transport, log) = recording_transport();
        transport.set_tempo(900.0).unwrap();
        transport.play();
        assert!(transport.is_running());
        wait_for_ticks(&log, 1);
        transport.stop();
        assert_eq!(log.lock().unwrap()[0].0, 0);
    }
}

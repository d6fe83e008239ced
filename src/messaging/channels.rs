// Communication channels lock-free
// The transport thread and the UI thread exchange events through a ring buffer

use crate::messaging::event::SequencerEvent;
use crate::sequencer::{SequencerObserver, StepPattern, Track};
use ringbuf::traits::{Producer, Split};
use ringbuf::HeapRb;
use std::sync::{Mutex, PoisonError};

pub type EventProducer = ringbuf::HeapProd<SequencerEvent>;
pub type EventConsumer = ringbuf::HeapCons<SequencerEvent>;

pub fn create_event_channel(capacity: usize) -> (EventProducer, EventConsumer) {
    let rb = HeapRb::<SequencerEvent>::new(capacity);
    rb.split()
}

/// Observer forwarding every sequencer output into an event channel
///
/// Events are dropped when the consumer falls behind and the buffer is full.
pub struct ChannelObserver {
    tx: Mutex<EventProducer>,
}

impl ChannelObserver {
    pub fn new(tx: EventProducer) -> Self {
        Self { tx: Mutex::new(tx) }
    }

    fn push(&self, event: SequencerEvent) {
        let mut tx = self.tx.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(dropped) = tx.try_push(event) {
            log::trace!("Event channel full, dropped {:?}", dropped);
        }
    }
}

impl SequencerObserver for ChannelObserver {
    fn step(&self, step: usize) {
        self.push(SequencerEvent::Step(step));
    }

    fn pattern_changed(&self, track: Track, pattern: &StepPattern) {
        self.push(SequencerEvent::PatternChanged(track, *pattern));
    }

    fn cleared(&self) {
        self.push(SequencerEvent::Cleared);
    }
}

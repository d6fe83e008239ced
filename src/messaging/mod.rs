// Messaging module - Events from the sequencer core to the UI

pub mod channels;
pub mod event;

pub use channels::{ChannelObserver, EventConsumer, EventProducer, create_event_channel};
pub use event::SequencerEvent;

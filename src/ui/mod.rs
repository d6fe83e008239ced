// UI module - egui front end for the sequencer

pub mod app;

pub use app::DrumMachineApp;

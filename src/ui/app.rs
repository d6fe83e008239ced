// Main UI App - Drum machine window
// Mirrors sequencer state every frame; all changes go through the Sequencer

use crate::audio::{AudioEngine, SharedGain};
use crate::messaging::{EventConsumer, SequencerEvent};
use crate::sequencer::{PatternName, STEPS, Sequencer, Track};
use eframe::egui;
use ringbuf::traits::Consumer;
use std::time::Duration;

const BPM_RANGE: std::ops::RangeInclusive<f64> = 40.0..=240.0;

pub struct DrumMachineApp {
    sequencer: Sequencer,
    events: EventConsumer,
    bpm_ui: f64,
    master: SharedGain,
    volume_ui: f32,
    highlighted_step: Option<usize>,
    status: Option<String>,
    // Keeps the output stream alive for the lifetime of the window
    engine: Option<AudioEngine>,
}

impl DrumMachineApp {
    pub fn new(
        sequencer: Sequencer,
        events: EventConsumer,
        master: SharedGain,
        engine: Option<AudioEngine>,
    ) -> Self {
        let bpm_ui = sequencer.bpm();
        let volume_ui = master.get();
        Self {
            sequencer,
            events,
            bpm_ui,
            master,
            volume_ui,
            highlighted_step: None,
            status: None,
            engine,
        }
    }

    fn drain_events(&mut self) {
        let running = self.sequencer.is_running();
        while let Some(event) = self.events.try_pop() {
            match event {
                // Steps queued before a stop must not light the grid again
                SequencerEvent::Step(step) if running => self.highlighted_step = Some(step),
                SequencerEvent::Step(_) => {}
                SequencerEvent::Cleared => self.status = Some("Cleared".to_string()),
                SequencerEvent::PatternChanged(..) => {}
            }
        }
    }

    /// Stop the transport and discard highlights still in flight
    fn stop(&mut self) {
        self.sequencer.stop();
        self.drain_events();
        self.highlighted_step = None;
    }

    fn draw_transport(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            if ui.button("▶ Play").clicked() {
                self.sequencer.play();
                self.status = None;
            }
            if ui.button("■ Stop").clicked() {
                self.stop();
            }
            if ui.button("Clear").clicked() {
                self.sequencer.clear_all();
            }

            ui.add_space(20.0);

            let slider = egui::Slider::new(&mut self.bpm_ui, BPM_RANGE)
                .text("BPM")
                .integer();
            if ui.add(slider).changed() {
                if let Err(e) = self.sequencer.set_tempo(self.bpm_ui) {
                    self.status = Some(e.to_string());
                    self.bpm_ui = self.sequencer.bpm();
                }
            }

            let volume = egui::Slider::new(&mut self.volume_ui, 0.0..=1.0).text("Volume");
            if ui.add(volume).changed() {
                self.master.set(self.volume_ui);
            }
        });
    }

    fn draw_track(&mut self, ui: &mut egui::Ui, track: Track) {
        ui.horizontal(|ui| {
            let label = if self.sequencer.has_sample(track) {
                egui::RichText::new(track.label())
            } else {
                egui::RichText::new(format!("{} (muted)", track.label())).weak()
            };
            ui.add_sized([110.0, 20.0], egui::Label::new(label));

            for name in PatternName::ALL {
                let enabled = self.sequencer.is_enabled(track, name);
                let text = format!("{}", name.index() + 1);
                if ui.selectable_label(enabled, text).clicked() {
                    self.sequencer.toggle(track, name);
                }
            }

            ui.add_space(12.0);

            let pattern = self.sequencer.effective_pattern(track);
            for step in 0..STEPS {
                let color = match (pattern.is_hit(step), self.highlighted_step == Some(step)) {
                    (true, true) => egui::Color32::from_rgb(255, 200, 80),
                    (true, false) => egui::Color32::from_rgb(220, 120, 40),
                    (false, true) => egui::Color32::from_gray(110),
                    (false, false) => egui::Color32::from_gray(50),
                };
                draw_cell(ui, color, step);
            }

            if !pattern.is_empty() {
                ui.weak(format!("{} hits", pattern.hit_count()));
            }
        });
    }

    fn draw_step_strip(&self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.add_sized([110.0, 20.0], egui::Label::new("Step"));
            // Align with the cells below the three toggle buttons
            ui.add_space(3.0 * 24.0 + 12.0);
            for step in 0..STEPS {
                let color = if self.highlighted_step == Some(step) {
                    egui::Color32::from_rgb(100, 200, 255)
                } else {
                    egui::Color32::from_gray(35)
                };
                draw_cell(ui, color, step);
            }
        });
    }

    fn draw_status_bar(&self, ui: &mut egui::Ui) {
        ui.separator();
        ui.horizontal(|ui| {
            let transport = if self.sequencer.is_running() {
                format!("Playing at {:.0} BPM", self.sequencer.bpm())
            } else {
                "Stopped".to_string()
            };
            ui.label(transport);

            ui.separator();
            match &self.engine {
                Some(engine) => ui.label(format!(
                    "Output: {} ({} Hz, {} ch)",
                    engine.device_name(),
                    engine.sample_rate(),
                    engine.channels()
                )),
                None => ui.colored_label(egui::Color32::from_rgb(255, 165, 0), "No audio output"),
            };

            if let Some(status) = &self.status {
                ui.separator();
                ui.label(status);
            }
        });
    }
}

fn draw_cell(ui: &mut egui::Ui, color: egui::Color32, step: usize) {
    let (rect, _) = ui.allocate_exact_size(egui::vec2(18.0, 18.0), egui::Sense::hover());
    ui.painter().rect_filled(rect, 3.0, color);
    if step % 4 == 3 {
        ui.add_space(6.0);
    }
}

impl eframe::App for DrumMachineApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_events();

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("stepbeat");
            ui.separator();

            self.draw_transport(ui);
            ui.add_space(10.0);

            for track in Track::ALL {
                self.draw_track(ui, track);
            }
            ui.add_space(6.0);
            self.draw_step_strip(ui);

            self.draw_status_bar(ui);
        });

        // Keep the highlight moving while playing
        if self.sequencer.is_running() {
            ctx.request_repaint_after(Duration::from_millis(16));
        }
    }
}

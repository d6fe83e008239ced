use clap::Parser;
use env_logger::Env;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use stepbeat::ui::DrumMachineApp;
use stepbeat::{
    AudioEngine, ChannelObserver, Config, DrumKit, SharedGain, Sequencer, create_event_channel,
};

// Sized for several seconds of steps at the fastest slider tempo, so a slow
// UI frame never drops a highlight
const EVENT_RINGBUFFER_CAPACITY: usize = 256;

#[derive(Parser)]
#[command(name = "stepbeat")]
#[command(author, version, about = "16-step sample drum machine", long_about = None)]
struct Cli {
    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Initial tempo, overrides the configuration
    #[arg(short, long)]
    bpm: Option<f64>,

    /// Sample directory, overrides the configuration
    #[arg(short, long)]
    samples: Option<PathBuf>,

    /// Print steps to the terminal instead of opening a window
    #[arg(long)]
    headless: bool,

    /// Loops to play in headless mode
    #[arg(long, default_value = "4")]
    bars: u32,

    /// Sub-pattern to enable at startup, as track:pattern (repeatable)
    #[arg(short, long, value_name = "TRACK:PATTERN")]
    enable: Vec<String>,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn load_config(cli: &Cli) -> Result<Config, Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from_file(path)?,
        None => Config::default(),
    };

    if let Some(bpm) = cli.bpm {
        config.bpm = bpm;
    }
    if let Some(dir) = &cli.samples {
        config.sample_dir = dir.clone();
    }
    config.validate()?;
    Ok(config)
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(&cli)?;

    let (event_tx, mut event_rx) = create_event_channel(EVENT_RINGBUFFER_CAPACITY);
    let observer = Arc::new(ChannelObserver::new(event_tx));
    let mut sequencer = Sequencer::with_tempo(config.pattern_table()?, config.tempo()?, observer);

    for entry in &cli.enable {
        let (track, name) = entry
            .split_once(':')
            .ok_or_else(|| format!("Expected TRACK:PATTERN, got '{}'", entry))?;
        sequencer.toggle_by_name(track, name)?;
    }

    let kit = DrumKit::load(config.sample_paths()?, 1.0);
    kit.bind_to(&sequencer);
    let muted = kit.muted_tracks();
    if !muted.is_empty() {
        log::warn!("Muted tracks: {:?}", muted);
    }

    let master = SharedGain::new(config.master_volume);
    let engine = match AudioEngine::start(&kit, master.clone()) {
        Ok(engine) => Some(engine),
        Err(e) => {
            log::warn!("Audio output unavailable, running silent: {}", e);
            None
        }
    };

    if cli.headless {
        let played = stepbeat::headless::run(&mut sequencer, &mut event_rx, cli.bars);
        log::info!("Played {} steps", played);
        drop(engine);
        return Ok(());
    }

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([760.0, 260.0])
            .with_title("stepbeat"),
        ..Default::default()
    };

    eframe::run_native(
        "stepbeat",
        native_options,
        Box::new(move |_cc| {
            Ok(Box::new(DrumMachineApp::new(
                sequencer, event_rx, master, engine,
            )))
        }),
    )?;
    Ok(())
}

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use jitterplay::audio::{FrameSource, WavFrameSource};
use jitterplay::config::{AudioConfig, BufferDuration, PlayoutConfig, RendererConfig};
use jitterplay::save_wav;
use jitterplay::simulation::{
    ArrivalConfig, SessionReport, arrival_times, simulate_session, split_frames, utterances,
};

#[derive(Parser, Debug)]
#[command(name = "simulate_jitter")]
#[command(about = "Run the jitter buffer against simulated network delivery")]
struct Args {
    /// Mono WAV file to stream (synthetic utterances if omitted)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// TOML configuration file ([audio], [renderer], [arrival] sections)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Base seed for reproducibility
    #[arg(short, long)]
    seed: Option<u64>,

    /// Number of sessions to run (seed is incremented per session)
    #[arg(short, long, default_value_t = 1)]
    trials: u32,

    /// Network jitter standard deviation
    #[arg(long)]
    jitter: Option<BufferDuration>,

    /// Probability that a frame is held back by a stall
    #[arg(long)]
    stall_probability: Option<f32>,

    /// Length of a stall
    #[arg(long)]
    stall: Option<BufferDuration>,

    /// Initial lookahead before playback starts
    #[arg(long)]
    initial_buffer: Option<BufferDuration>,

    /// Emit JSON instead of text
    #[arg(long)]
    json: bool,

    /// Write the rendered output of the last session to a WAV file
    #[arg(long)]
    dump_audio: Option<PathBuf>,

    /// Increase output verbosity
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct SimulationFile {
    audio: AudioConfig,
    renderer: RendererConfig,
    arrival: ArrivalConfig,
}

fn load_config(path: &PathBuf) -> Result<(PlayoutConfig, ArrivalConfig)> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let file: SimulationFile = toml::from_str(&content).context("Failed to parse config file")?;
    let config = PlayoutConfig {
        audio: file.audio,
        renderer: file.renderer,
    };
    Ok((config, file.arrival))
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let (mut config, mut arrival) = match args.config {
        Some(ref path) => load_config(path)?,
        None => (PlayoutConfig::default(), ArrivalConfig::default()),
    };

    if let Some(jitter) = args.jitter {
        arrival.jitter_ms = jitter.as_ms();
    }
    if let Some(p) = args.stall_probability {
        arrival.stall_probability = p;
    }
    if let Some(stall) = args.stall {
        arrival.stall_ms = stall.as_ms();
    }
    if let Some(initial) = args.initial_buffer {
        config.renderer.initial_buffer_ms = initial.as_ms();
    }
    arrival.frame_ms = config.audio.frame_ms;

    let signal = match args.input {
        Some(ref path) => read_signal(path, &mut config)?,
        None => utterances(5, 2.0, 0.5, config.audio.sample_rate),
    };
    config.validate()?;

    let frames = split_frames(&signal, config.audio.frame_samples());
    let base_seed = args.seed.unwrap_or_else(rand::random::<u64>);

    let mut reports = Vec::new();
    for trial in 0..args.trials.max(1) {
        let seed = base_seed.wrapping_add(trial as u64);
        let arrivals = arrival_times(&arrival.clone().with_seed(seed), frames.len())?;
        let report = simulate_session(&frames, &arrivals, &config)?;
        log::info!(
            "Trial {} (seed {}): {} underruns, {} drops",
            trial,
            seed,
            report.transitions.underruns,
            report.transitions.overflow_drops
        );
        reports.push(report);
    }

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&reports).context("Failed to serialize report")?
        );
    } else {
        for report in &reports {
            print_text(report);
        }
    }

    if let (Some(path), Some(report)) = (&args.dump_audio, reports.last()) {
        save_wav(&path.to_string_lossy(), &report.output, report.sample_rate)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("Wrote {}", path.display());
    }

    Ok(())
}

fn read_signal(path: &PathBuf, config: &mut PlayoutConfig) -> Result<Vec<f32>> {
    let mut source = WavFrameSource::new(path, config.audio.frame_samples())
        .with_context(|| format!("Failed to open {}", path.display()))?;
    config.audio.sample_rate = source.sample_rate();
    let mut signal = Vec::with_capacity(source.remaining());
    while let Some(frame) = source.next_frame()? {
        signal.extend(frame);
    }
    Ok(signal)
}

fn print_text(report: &SessionReport) {
    println!("{}", "=".repeat(55));
    println!(
        "Duration: {:.2}s, pushed {:.2}s, rendered {:.2}s",
        report.duration_s,
        report.pushed_samples as f64 / report.sample_rate as f64,
        report.rendered_samples as f64 / report.sample_rate as f64
    );
    println!(
        "Starts: {}, underruns: {}, overflow drops: {} ({} samples)",
        report.transitions.resumed,
        report.transitions.underruns,
        report.transitions.overflow_drops,
        report.transitions.dropped_samples
    );
    println!(
        "Final buffers: partial {:.1}ms, max {:.1}ms",
        report.final_partial_buffer_ms, report.final_max_buffer_ms
    );
    match report.delay {
        Some(ref d) => println!(
            "Delay: mean {:.1}ms, std {:.1}ms, min {:.1}ms, max {:.1}ms",
            d.mean * 1000.0,
            d.std_dev * 1000.0,
            d.min * 1000.0,
            d.max * 1000.0
        ),
        None => println!("Delay: no frames delivered"),
    }
}

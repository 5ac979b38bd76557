use anyhow::Context;
use clap::Parser;
use crossbeam_channel::RecvTimeoutError;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use jitterplay::audio::{AudioPlayback, FrameSource, WavFrameSource, promote_to_real_time};
use jitterplay::config::{BufferDuration, PlayoutConfig};
use jitterplay::output::{OutputFormat, create_formatter};
use jitterplay::renderer::{AudioRenderer, LogObserver, MicClock};
use jitterplay::{RendererHandle, render_channel};

#[derive(Parser, Debug)]
#[command(name = "jitterplay")]
#[command(about = "Play a mono WAV file through the adaptive jitter buffer", long_about = None)]
struct Args {
    /// Mono WAV file to play
    file: PathBuf,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Telemetry output format
    #[arg(short = 'f', long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Increase output verbosity
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Output device name (default device if omitted)
    #[arg(short, long)]
    device: Option<String>,

    /// Frame size handed to the renderer (e.g. "40ms")
    #[arg(long)]
    frame: Option<BufferDuration>,

    /// Initial lookahead before playback starts (e.g. "80ms")
    #[arg(long)]
    initial_buffer: Option<BufferDuration>,

    /// Extra lookahead after the initial threshold
    #[arg(long)]
    partial_buffer: Option<BufferDuration>,

    /// Buffered audio beyond which the oldest samples are dropped
    #[arg(long)]
    max_buffer: Option<BufferDuration>,

    /// Deliver frames in bursts of this many, like a stalling network
    #[arg(long, default_value_t = 1)]
    burst: usize,

    /// Print every Nth telemetry record
    #[arg(long, default_value_t = 10)]
    every: usize,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let mut config = match args.config {
        Some(ref path) => PlayoutConfig::from_file(path)
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None => PlayoutConfig::default(),
    };
    apply_overrides(&mut config, &args);

    let mut source = WavFrameSource::new(&args.file, 1)
        .with_context(|| format!("Failed to open {}", args.file.display()))?;
    if source.sample_rate() != config.audio.sample_rate {
        log::info!(
            "Using file sample rate {} Hz instead of {} Hz",
            source.sample_rate(),
            config.audio.sample_rate
        );
        config.audio.sample_rate = source.sample_rate();
    }
    config.validate()?;

    let sample_rate = config.audio.sample_rate;
    let frame_size = config.audio.frame_samples();
    source.set_frame_size(frame_size);

    println!("=== jitterplay ===");
    println!("File: {}", args.file.display());
    println!("Sample rate: {} Hz", sample_rate);
    println!("Frame: {:.1}ms ({} samples)", config.audio.frame_ms, frame_size);
    println!(
        "Buffers: initial {}ms, partial {}ms, max {}ms",
        config.renderer.initial_buffer_ms,
        config.renderer.partial_buffer_ms,
        config.renderer.max_buffer_ms
    );
    println!();

    let renderer = AudioRenderer::with_observer(
        &config.renderer,
        sample_rate,
        LogObserver::new(sample_rate),
    )?;
    let (handle, engine, telemetry_rx) = render_channel(renderer, config.audio.block_size, 64);
    let _playback = AudioPlayback::new(&config.audio, engine)?;

    let frame_duration = Duration::from_secs_f32(frame_size as f32 / sample_rate as f32);
    let burst = args.burst.max(1);
    let block_size = config.audio.block_size;
    let producer = thread::spawn(move || {
        let _rt_handle = promote_to_real_time(block_size, sample_rate);
        feed(source, handle, frame_duration, burst)
    });

    let formatter = create_formatter(args.format, args.verbose > 0);
    if let Some(header) = formatter.header() {
        println!("{}", header);
    }

    let every = args.every.max(1);
    let mut count = 0usize;
    loop {
        match telemetry_rx.recv_timeout(Duration::from_millis(200)) {
            Ok(telemetry) => {
                if count % every == 0 {
                    println!("{}", formatter.format(&telemetry));
                }
                count += 1;
            }
            Err(RecvTimeoutError::Timeout) => {
                if producer.is_finished() {
                    break;
                }
            }
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    match producer.join() {
        Ok(result) => result?,
        Err(_) => anyhow::bail!("Frame producer panicked"),
    }

    // Let the tail of the buffer play out
    let tail_ms = config.renderer.initial_buffer_ms + config.renderer.partial_buffer_cap_ms + 200.0;
    thread::sleep(Duration::from_secs_f32(tail_ms / 1000.0));

    Ok(())
}

fn apply_overrides(config: &mut PlayoutConfig, args: &Args) {
    if let Some(ref device) = args.device {
        config.audio.device = Some(device.clone());
    }
    if let Some(frame) = args.frame {
        config.audio.frame_ms = frame.as_ms();
    }
    if let Some(initial) = args.initial_buffer {
        config.renderer.initial_buffer_ms = initial.as_ms();
    }
    if let Some(partial) = args.partial_buffer {
        config.renderer.partial_buffer_ms = partial.as_ms();
        config.renderer.partial_buffer_cap_ms = config
            .renderer
            .partial_buffer_cap_ms
            .max(partial.as_ms());
    }
    if let Some(max) = args.max_buffer {
        config.renderer.max_buffer_ms = max.as_ms();
    }
}

/// Send frames at real-time pace, `burst` at a time
fn feed(
    mut source: WavFrameSource,
    handle: RendererHandle,
    frame_duration: Duration,
    burst: usize,
) -> anyhow::Result<()> {
    let mut clock = MicClock::new(source.sample_rate());
    let mut pending = Vec::with_capacity(burst);

    while let Some(frame) = source.next_frame()? {
        pending.push(frame);
        if pending.len() < burst {
            continue;
        }
        thread::sleep(frame_duration * burst as u32);
        for frame in pending.drain(..) {
            clock.advance(frame.len() as u64);
            handle.push_frame(frame, clock.duration_secs())?;
        }
        handle.release_spent_frames();
    }

    for frame in pending.drain(..) {
        clock.advance(frame.len() as u64);
        handle.push_frame(frame, clock.duration_secs())?;
    }

    log::info!("All frames delivered ({:.1}s)", clock.duration_secs());
    Ok(())
}

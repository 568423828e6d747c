use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use log::info;

use light_simulator::{RenderSettings, Session};

/// Renders a 2D light scene to an image file.
#[derive(Parser, Debug)]
#[command(author, version, about = "2D photon tracer")]
struct Cli {
    /// Scene description (JSON)
    scene: PathBuf,

    #[arg(long, default_value_t = 800)]
    width: usize,

    #[arg(long, default_value_t = 600)]
    height: usize,

    /// Total photon budget, split evenly across the threads
    #[arg(long, default_value_t = 1_000_000)]
    photons: usize,

    #[arg(long, default_value_t = 4)]
    threads: usize,

    /// Brightness multiplier applied when converting to 8 bit colour
    #[arg(long, default_value_t = 1.0)]
    exposure: f64,

    #[arg(short, long, default_value = "render.png")]
    output: PathBuf,

    /// Seed for reproducible renders
    #[arg(long)]
    seed: Option<u64>,

    /// Interval between progress reports, in milliseconds
    #[arg(long, default_value_t = 250)]
    poll_ms: u64,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    if cli.width == 0 || cli.height == 0 {
        return Err(anyhow!("width and height must be positive"));
    }
    if cli.threads == 0 {
        return Err(anyhow!("threads must be at least 1"));
    }
    if !(cli.exposure >= 0.0) {
        return Err(anyhow!("exposure must not be negative"));
    }

    let mut session = Session::new(RenderSettings {
        width: cli.width,
        height: cli.height,
        photons: cli.photons,
        threads: cli.threads,
        exposure: cli.exposure,
        seed: cli.seed,
    });
    session
        .load_scene_file(&cli.scene)
        .with_context(|| format!("loading {}", cli.scene.display()))?;

    let started = Instant::now();
    session.start_render().context("starting render")?;
    let poll = Duration::from_millis(cli.poll_ms.max(1));
    while session.is_rendering() {
        thread::sleep(poll);
        let progress = session.update();
        info!("{:5.1}%", progress * 100.0);
    }
    info!("rendered in {:.2?}", started.elapsed());

    session
        .export(&cli.output)
        .with_context(|| format!("writing {}", cli.output.display()))?;
    Ok(())
}

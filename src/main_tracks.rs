use anyhow::Result;
use clap::Parser;
use log::info;
use std::time::Instant;

use rice_racer::{
    config::GameConfig,
    track::Axis,
};

#[derive(Parser)]
#[command(name = "rice-racer-tracks")]
#[command(about = "Builds every configured track and reports its size")]
struct Args {
    /// Track definitions file
    #[arg(short, long, default_value = "tracks.toml")]
    tracks: String,

    /// Race settings file
    #[arg(short, long, default_value = "race.toml")]
    race: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_default_env()
        .filter_level(if args.verbose { log::LevelFilter::Debug } else { log::LevelFilter::Info })
        .init();

    let config = GameConfig::load_from_files(&args.tracks, &args.race)?;

    for definition in &config.tracks.tracks {
        let start = Instant::now();
        let track = definition.build()?;
        let elapsed = start.elapsed();

        let bounds = track.bounds();
        info!(
            "{:<12} {} laps, {:>4} control points, {:>5} segments, {:>6.0}m, {:.0}x{:.0}x{:.0}m, built in {:.2}ms",
            track.name,
            track.laps,
            track.control_points().len(),
            track.len(),
            track.length_m(),
            bounds.extent(Axis::X),
            bounds.extent(Axis::Y),
            bounds.extent(Axis::Z),
            elapsed.as_secs_f64() * 1000.0
        );
    }

    Ok(())
}

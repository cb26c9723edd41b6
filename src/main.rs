use anyhow::{Result, anyhow};
use clap::Parser;
use log::info;

use rice_racer::{
    config::GameConfig,
    graphics::ImageCatalogue,
    session::{GameSession, GameState, KeyPress},
    simulation::InputSnapshot,
};

#[derive(Parser)]
#[command(name = "rice-racer")]
#[command(about = "Headless pseudo-3D racing: drives the player car round a track and reports the result")]
struct Args {
    /// Track definitions file
    #[arg(short, long, default_value = "tracks.toml")]
    tracks: String,

    /// Race settings file
    #[arg(short, long, default_value = "race.toml")]
    race: String,

    /// Name of the track to race on, the first one by default
    #[arg(short = 'n', long)]
    track: Option<String>,

    /// Random seed for reproducible races, overriding the race settings
    #[arg(short, long)]
    seed: Option<u64>,

    /// Give up after this many frames
    #[arg(short, long, default_value_t = 60 * 60 * 20)]
    max_frames: u64,

    /// Enable verbose logging for detailed race progress
    #[arg(short, long)]
    verbose: bool,
}

/// Keeps the throttle down and steers back towards the centre line.
fn autopilot(lateral: f32) -> InputSnapshot {
    InputSnapshot {
        accelerate: true,
        brake: false,
        steer_left: lateral > 0.5,
        steer_right: lateral < -0.5,
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_default_env()
        .filter_level(if args.verbose { log::LevelFilter::Debug } else { log::LevelFilter::Info })
        .init();
    info!("Starting Rice Racer");

    let mut config = GameConfig::load_from_files(&args.tracks, &args.race)?;
    if args.seed.is_some() {
        config.race.random.seed = args.seed;
    }
    let fps = config.race.timing.fps;
    let tick = config.race.timing.tick_s();
    info!("Loaded {} tracks: {}", config.tracks.tracks.len(), config.tracks.names().join(", "));

    let target = match &args.track {
        Some(name) => config
            .tracks
            .tracks
            .iter()
            .position(|track| track.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| anyhow!("No track named '{}', choose from {}", name, config.tracks.names().join(", ")))?,
        None => 0,
    };

    let images = ImageCatalogue::with_default((64, 64));
    let mut session = GameSession::new(config);

    while session.state() == GameState::BuildTracks {
        session.frame_after(tick, &images)?;
    }
    while session.selected_index() != target {
        session.key_pressed(KeyPress::Right, &images);
    }
    session.key_pressed(KeyPress::Select, &images);

    let mut frames = 0;
    while session.state() != GameState::PostRace && frames < args.max_frames {
        let lateral = session.race().and_then(|race| race.human()).map_or(0.0, |car| car.position.x);
        session.set_input(autopilot(lateral));

        let frame = session.frame_after(tick, &images)?;
        frames += 1;

        if frames % (fps as u64 * 5) == 0 {
            if let Some(race) = session.race() {
                if let Some(car) = race.human() {
                    info!(
                        "Frame {} ({:.0} fps): lap {}, position {}, {:.0} mph, drawing {} sprites",
                        frames,
                        session.timer().fps(),
                        race.lap(car),
                        race.race_position(car.id),
                        car.speed_mph(),
                        frame.draw.map_or(0, |draw| draw.sprites.len())
                    );
                }
            }
        }
    }

    match session.finishing_position() {
        Some(_) => info!("{}", session.message().unwrap_or_default()),
        None => info!("Gave up after {} frames", frames),
    }

    if let Some(race) = session.race() {
        for entry in race.standings_table() {
            info!(
                "{:>2}. {:<10} lap {} {}",
                entry.position,
                entry.name,
                entry.lap,
                entry.gap_m.map_or(String::new(), |gap| format!("+{:.1}m", gap))
            );
        }
    }

    Ok(())
}

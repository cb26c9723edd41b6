use anyhow::Result;
use rice_racer::config::GameConfig;
use rice_racer::graphics::ImageCatalogue;
use rice_racer::session::{
    engine_sample, ordinal_suffix, GameSession, GameState, KeyPress, MusicCue, ENGINE_SAMPLES,
};
use rice_racer::simulation::{FrameTimer, InputSnapshot, SpriteImage, CAR_FORWARD_VELOCITY_MAX_MS};

const TRACKS: &str = r#"
[[track]]
name = "Oval"
laps = 2

[[track.points]]
position = [0.0, 0.0, 0.0]
tangent = [0.0, 0.0, 100.0]

[[track.points]]
position = [100.0, 0.0, 0.0]
tangent = [0.0, 0.0, -100.0]

[[track]]
name = "Small Oval"
laps = 1

[[track.points]]
position = [0.0, 0.0, 0.0]
tangent = [0.0, 0.0, 40.0]

[[track.points]]
position = [40.0, 0.0, 0.0]
tangent = [0.0, 0.0, -40.0]
"#;

const RACE: &str = r#"
[roster]
players = ["Racer X", "Joe", "Scott"]

[random]
seed = 5
"#;

const TICK: f32 = 1.0 / 60.0;

fn session() -> Result<GameSession> {
    Ok(GameSession::new(GameConfig::from_toml(TRACKS, RACE)?))
}

/// Builds every track and lands on the introduction screen.
fn introduced(images: &ImageCatalogue) -> Result<GameSession> {
    let mut session = session()?;
    while session.state() == GameState::BuildTracks {
        session.frame_after(TICK, images)?;
    }
    Ok(session)
}

/// Starts a race on the selected track and runs the count-in to the end.
fn racing(images: &ImageCatalogue) -> Result<GameSession> {
    let mut session = introduced(images)?;
    session.key_pressed(KeyPress::Select, images);
    for _ in 0..400 {
        if session.state() == GameState::Race {
            break;
        }
        session.frame_after(TICK, images)?;
    }
    assert_eq!(session.state(), GameState::Race);
    Ok(session)
}

#[test]
fn test_ordinal_suffixes() {
    let cases = [
        (1, "st"), (2, "nd"), (3, "rd"), (4, "th"), (5, "th"),
        (11, "th"), (12, "th"), (13, "th"), (21, "st"), (22, "nd"), (111, "th"),
    ];
    for (number, suffix) in cases {
        assert_eq!(ordinal_suffix(number), suffix, "{}", number);
    }
}

#[test]
fn test_engine_sample_follows_speed() {
    assert_eq!(engine_sample(0.0), 0);
    assert_eq!(engine_sample(-3.0), 0);
    assert_eq!(engine_sample(CAR_FORWARD_VELOCITY_MAX_MS / 2.0), ENGINE_SAMPLES / 2);
    assert_eq!(engine_sample(CAR_FORWARD_VELOCITY_MAX_MS), ENGINE_SAMPLES - 1);
    assert_eq!(engine_sample(CAR_FORWARD_VELOCITY_MAX_MS * 3.0), ENGINE_SAMPLES - 1);
}

#[test]
fn test_frame_timer_averages_recent_intervals() {
    let mut timer = FrameTimer::new(3);
    assert_eq!(timer.average_interval(), 0.0);
    assert_eq!(timer.fps(), 0.0);

    for interval in [0.1, 0.02, 0.02, 0.02] {
        timer.push_interval(interval);
    }
    assert!((timer.average_interval() - 0.02).abs() < 1e-6);
    assert!((timer.fps() - 50.0).abs() < 1e-3);
    assert!((timer.total_time() - 0.16).abs() < 1e-6);

    // A zero-sized window still holds the latest interval
    let mut single = FrameTimer::new(0);
    single.push_interval(0.5);
    single.push_interval(0.25);
    assert_eq!(single.average_interval(), 0.25);

    timer.reset();
    assert_eq!(timer.total_time(), 0.0);
    assert_eq!(timer.average_interval(), 0.0);
}

#[test]
fn test_tracks_build_one_per_frame() -> Result<()> {
    let images = ImageCatalogue::with_default((64, 64));
    let mut session = session()?;
    assert_eq!(session.state(), GameState::BuildTracks);
    assert_eq!(session.music_cue(), None);

    session.frame_after(TICK, &images)?;
    assert_eq!(session.tracks().len(), 1);
    assert_eq!(session.state(), GameState::BuildTracks);

    session.frame_after(TICK, &images)?;
    session.frame_after(TICK, &images)?;
    assert_eq!(session.state(), GameState::Introduction);
    assert_eq!(session.tracks().len(), 2);
    assert_eq!(session.build_log().len(), 2);
    assert!(session.build_log()[0].starts_with("Building track \"Oval\" ..."));
    assert_eq!(session.music_cue(), Some(MusicCue::Menu));
    assert!(session.overview().is_some());
    assert!(session.race().is_none());

    Ok(())
}

#[test]
fn test_introduction_cycles_tracks_and_spins_preview() -> Result<()> {
    let images = ImageCatalogue::with_default((64, 64));
    let mut session = introduced(&images)?;
    assert_eq!(session.selected_index(), 0);

    session.key_pressed(KeyPress::Right, &images);
    assert_eq!(session.selected_track().map(|track| track.name.as_str()), Some("Small Oval"));
    session.key_pressed(KeyPress::Right, &images);
    assert_eq!(session.selected_index(), 0);
    session.key_pressed(KeyPress::Left, &images);
    assert_eq!(session.selected_index(), 1);

    let before = session.preview_rotation();
    for _ in 0..10 {
        session.frame_after(TICK, &images)?;
    }
    assert!(session.preview_rotation() > before);

    Ok(())
}

#[test]
fn test_select_waits_for_images() -> Result<()> {
    let mut loading = ImageCatalogue::with_default((64, 64));
    loading.insert(SpriteImage::Backdrop, (0, 0));
    let mut session = introduced(&loading)?;

    session.key_pressed(KeyPress::Select, &loading);
    assert_eq!(session.state(), GameState::Introduction);

    loading.insert(SpriteImage::Backdrop, (3200, 360));
    session.key_pressed(KeyPress::Select, &loading);
    assert_eq!(session.state(), GameState::PreRace);
    assert_eq!(session.music_cue(), Some(MusicCue::Start));
    assert_eq!(session.message(), Some("Use Cursor Keys to Accelerate, Brake and Steer"));

    Ok(())
}

#[test]
fn test_count_in_holds_the_cars() -> Result<()> {
    let images = ImageCatalogue::with_default((64, 64));
    let mut session = introduced(&images)?;
    session.key_pressed(KeyPress::Select, &images);
    session.set_input(InputSnapshot {
        accelerate: true,
        ..InputSnapshot::default()
    });

    let frame = session.frame_after(TICK, &images)?;
    assert!(frame.tick.is_none());
    let draw = frame.draw.expect("count-in is drawn");
    assert!(draw.sprites.iter().any(|sprite| sprite.image == SpriteImage::StartMarker));
    assert!(!frame.map.is_empty());

    let mut frames = 1;
    while session.state() == GameState::PreRace && frames < 400 {
        let frame = session.frame_after(TICK, &images)?;
        if session.state() == GameState::PreRace {
            assert!(frame.tick.is_none());
        }
        frames += 1;
    }

    // 3.5 seconds of 60 frames a second
    assert!((205..=215).contains(&frames), "count-in took {} frames", frames);
    assert_eq!(session.state(), GameState::Race);
    assert_eq!(session.race().map(|race| race.ticks()), Some(0));
    assert_eq!(session.music_cue(), Some(MusicCue::Race(0)));
    assert_eq!(session.message(), None);

    let frame = session.frame_after(TICK, &images)?;
    assert!(frame.tick.is_some());
    assert_eq!(session.race().map(|race| race.ticks()), Some(1));
    let human = session.race().and_then(|race| race.human()).expect("human car");
    assert!(human.velocity.y > 0.0);

    Ok(())
}

#[test]
fn test_escape_returns_to_introduction() -> Result<()> {
    let images = ImageCatalogue::with_default((64, 64));
    let mut session = racing(&images)?;

    session.key_pressed(KeyPress::Escape, &images);
    assert_eq!(session.state(), GameState::Introduction);
    assert!(session.race().is_none());
    assert_eq!(session.music_cue(), Some(MusicCue::Menu));

    // Escape on the introduction screen does nothing
    session.key_pressed(KeyPress::Escape, &images);
    assert_eq!(session.state(), GameState::Introduction);

    Ok(())
}

#[test]
fn test_toggles_mute_and_hide() -> Result<()> {
    let images = ImageCatalogue::with_default((64, 64));
    let mut session = racing(&images)?;
    assert!(session.engine_sample().is_some());

    session.key_pressed(KeyPress::ToggleMap, &images);
    assert!(!session.show_map());
    let frame = session.frame_after(TICK, &images)?;
    assert!(frame.map.is_empty());

    session.key_pressed(KeyPress::ToggleSfx, &images);
    assert!(!session.sfx_enabled());
    assert_eq!(session.engine_sample(), None);

    session.key_pressed(KeyPress::ToggleMusic, &images);
    assert!(!session.music_enabled());
    assert_eq!(session.music_cue(), None);

    session.key_pressed(KeyPress::ToggleMusic, &images);
    assert_eq!(session.music_cue(), Some(MusicCue::Race(0)));
    session.key_pressed(KeyPress::ToggleMap, &images);
    let frame = session.frame_after(TICK, &images)?;
    assert_eq!(frame.map.len(), 3);

    Ok(())
}

#[test]
fn test_finishing_ends_the_race() -> Result<()> {
    let images = ImageCatalogue::with_default((64, 64));
    let mut session = racing(&images)?;

    let race = session.race_mut().expect("race is running");
    let length = race.track().len() as f32;
    let laps = race.track().laps as f32;
    let human_id = race.human().expect("human car").id;
    if let Some(human) = race.car_mut(human_id) {
        human.position.y = laps * length + 1.0;
    }

    let frame = session.frame_after(TICK, &images)?;
    assert_eq!(session.state(), GameState::PostRace);
    assert_eq!(session.finishing_position(), Some(1));
    assert_eq!(session.music_cue(), Some(MusicCue::Win));
    assert_eq!(
        frame.message.as_deref(),
        Some("You finished 1st - Press ESC to race again")
    );

    // The race carries on behind the result screen
    let ticks = session.race().map(|race| race.ticks());
    session.frame_after(TICK, &images)?;
    assert_eq!(session.race().map(|race| race.ticks()), ticks.map(|t| t + 1));
    assert_eq!(session.state(), GameState::PostRace);

    session.key_pressed(KeyPress::Escape, &images);
    assert_eq!(session.state(), GameState::Introduction);
    assert_eq!(session.finishing_position(), None);

    Ok(())
}

//! Game flow around a race: building tracks, choosing one, the count-in, the race itself and
//! the result screen. Audio and drawing stay with the host; each frame hands back what to
//! draw and what should be playing.

use crate::config::{GameConfig, TimingConfig, TrackDefinition};
use crate::graphics::{
    Canvas, DrawList, ImageSource, MapMarker, MiniMap, RaceRenderer, Rect, RenderDepth,
    TrackOverview,
};
use crate::simulation::{
    Car, FrameTimer, Height, InputSnapshot, Race, SpriteImage, SpriteOffset, TickReport,
    CAR_FORWARD_VELOCITY_MAX_MS, START_MARKER_SIZE_M,
};
use crate::track::{Track, TrackError, Vec3};
use std::f32::consts::PI;
use std::sync::Arc;

/// Height above its race position the camera starts the count-in from.
pub const PRE_RACE_HEIGHT_M: f32 = 15.0;
/// Distance ahead of the camera the start marker appears at.
pub const START_MARKER_DISTANCE_M: f32 = 20.0;
/// Turn rate of the track preview, radians per second.
pub const PREVIEW_ROTATION_RATE: f32 = PI / 3.0;
/// Number of pitched engine loops, lowest first.
pub const ENGINE_SAMPLES: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    BuildTracks,
    Introduction,
    PreRace,
    Race,
    PostRace,
}

/// Discrete key presses, as opposed to the held controls in `InputSnapshot`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPress {
    Left,
    Right,
    Select,
    Escape,
    ToggleMap,
    ToggleSfx,
    ToggleMusic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MusicCue {
    Menu,
    Start,
    /// One of the two race loops.
    Race(usize),
    Win,
    Lose,
}

/// Everything produced by one frame.
#[derive(Debug, Clone, Default)]
pub struct Frame {
    pub draw: Option<DrawList>,
    pub map: Vec<MapMarker>,
    pub message: Option<String>,
    pub tick: Option<TickReport>,
}

/// `st`, `nd`, `rd` or `th` for a finishing position.
pub fn ordinal_suffix(number: usize) -> &'static str {
    match (number % 10, number % 100) {
        (1, n) if n != 11 => "st",
        (2, n) if n != 12 => "nd",
        (3, n) if n != 13 => "rd",
        _ => "th",
    }
}

/// Index of the engine loop matching a forward speed.
pub fn engine_sample(forward_speed: f32) -> usize {
    let pitch = forward_speed / CAR_FORWARD_VELOCITY_MAX_MS * ENGINE_SAMPLES as f32;
    pitch.clamp(0.0, (ENGINE_SAMPLES - 1) as f32).floor() as usize
}

struct RaceScene {
    race: Race,
    renderer: RaceRenderer,
    minimap: MiniMap,
}

pub struct GameSession {
    definitions: Vec<TrackDefinition>,
    tracks: Vec<Arc<Track>>,
    players: Vec<String>,
    seed: Option<u64>,
    timing: TimingConfig,
    canvas: Canvas,

    state: GameState,
    selected: usize,
    overview: Option<TrackOverview>,
    preview_rotation: f32,
    scene: Option<RaceScene>,
    timer: FrameTimer,
    held: InputSnapshot,

    build_log: Vec<String>,
    message: Option<String>,
    finishing_position: Option<usize>,

    show_map: bool,
    sfx_enabled: bool,
    music_enabled: bool,
    music: Option<MusicCue>,
}

impl GameSession {
    pub fn new(config: GameConfig) -> Self {
        let canvas = Canvas::new(config.race.canvas.width as f32, config.race.canvas.height as f32);
        Self {
            definitions: config.tracks.tracks,
            tracks: Vec::new(),
            players: config.race.roster.players,
            seed: config.race.random.seed,
            timer: FrameTimer::new(config.race.timing.timing_samples),
            timing: config.race.timing,
            canvas,
            state: GameState::BuildTracks,
            selected: 0,
            overview: None,
            preview_rotation: 0.0,
            scene: None,
            held: InputSnapshot::default(),
            build_log: Vec::new(),
            message: None,
            finishing_position: None,
            show_map: true,
            sfx_enabled: true,
            music_enabled: true,
            music: None,
        }
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn tracks(&self) -> &[Arc<Track>] {
        &self.tracks
    }

    pub fn selected_track(&self) -> Option<&Arc<Track>> {
        self.tracks.get(self.selected)
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn race(&self) -> Option<&Race> {
        self.scene.as_ref().map(|scene| &scene.race)
    }

    pub fn race_mut(&mut self) -> Option<&mut Race> {
        self.scene.as_mut().map(|scene| &mut scene.race)
    }

    pub fn renderer(&self) -> Option<&RaceRenderer> {
        self.scene.as_ref().map(|scene| &scene.renderer)
    }

    pub fn minimap(&self) -> Option<&MiniMap> {
        self.scene.as_ref().map(|scene| &scene.minimap)
    }

    pub fn overview(&self) -> Option<&TrackOverview> {
        self.overview.as_ref()
    }

    pub fn preview_rotation(&self) -> f32 {
        self.preview_rotation
    }

    pub fn timer(&self) -> &FrameTimer {
        &self.timer
    }

    pub fn build_log(&self) -> &[String] {
        &self.build_log
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn finishing_position(&self) -> Option<usize> {
        self.finishing_position
    }

    pub fn show_map(&self) -> bool {
        self.show_map
    }

    pub fn sfx_enabled(&self) -> bool {
        self.sfx_enabled
    }

    pub fn music_enabled(&self) -> bool {
        self.music_enabled
    }

    /// Music that should be playing, `None` when muted or silent.
    pub fn music_cue(&self) -> Option<MusicCue> {
        self.music.filter(|_| self.music_enabled)
    }

    /// Engine loop to play, `None` outside a race or with effects muted.
    pub fn engine_sample(&self) -> Option<usize> {
        if !self.sfx_enabled || !matches!(self.state, GameState::Race | GameState::PostRace) {
            return None;
        }
        let car = self.race()?.human()?;
        Some(engine_sample(car.velocity.y))
    }

    /// Replaces the set of held driving controls.
    pub fn set_input(&mut self, input: InputSnapshot) {
        self.held = input;
    }

    pub fn key_pressed<I: ImageSource>(&mut self, key: KeyPress, images: &I) {
        match (self.state, key) {
            (GameState::Introduction, KeyPress::Left) => {
                let count = self.tracks.len().max(1);
                self.select_track((self.selected + count - 1) % count);
            }
            (GameState::Introduction, KeyPress::Right) => {
                let count = self.tracks.len().max(1);
                self.select_track((self.selected + 1) % count);
            }
            (GameState::Introduction, KeyPress::Select) => {
                let pending = images.pending();
                if pending == 0 {
                    self.start_race();
                } else {
                    log::info!("Waiting for {} images before starting", pending);
                }
            }
            (GameState::PreRace | GameState::Race | GameState::PostRace, KeyPress::Escape) => {
                self.show_introduction();
            }
            _ => {}
        }

        match key {
            KeyPress::ToggleMap => self.show_map = !self.show_map,
            KeyPress::ToggleSfx => self.sfx_enabled = !self.sfx_enabled,
            KeyPress::ToggleMusic => self.music_enabled = !self.music_enabled,
            _ => {}
        }
    }

    /// Runs one display frame, timed against the wall clock.
    pub fn frame<I: ImageSource>(&mut self, images: &I) -> Result<Frame, TrackError> {
        self.timer.record_frame();
        self.advance(images)
    }

    /// Runs one display frame as if `interval` seconds had passed since the last.
    pub fn frame_after<I: ImageSource>(&mut self, interval: f32, images: &I) -> Result<Frame, TrackError> {
        self.timer.push_interval(interval);
        self.advance(images)
    }

    fn advance<I: ImageSource>(&mut self, images: &I) -> Result<Frame, TrackError> {
        match self.state {
            GameState::BuildTracks => {
                self.build_next_track()?;
                Ok(Frame::default())
            }
            GameState::Introduction => {
                self.preview_rotation += self.timer.average_interval() * PREVIEW_ROTATION_RATE;
                if let Some(overview) = self.overview.as_mut() {
                    overview.set_rotation(self.preview_rotation);
                }
                Ok(Frame::default())
            }
            GameState::PreRace | GameState::Race | GameState::PostRace => Ok(self.race_frame(images)),
        }
    }

    /// Builds one track per frame so the host can show progress.
    fn build_next_track(&mut self) -> Result<(), TrackError> {
        let Some(definition) = self.definitions.get(self.tracks.len()) else {
            self.show_introduction();
            return Ok(());
        };

        let started = instant::Instant::now();
        let track = Track::build(definition.name.clone(), definition.laps, definition.control_points())?;
        let line = format!(
            "Building track \"{}\" ... {:.2} seconds",
            track.name,
            started.elapsed().as_secs_f32()
        );
        log::info!("{} ({} segments)", line, track.len());

        self.build_log.push(line);
        self.tracks.push(Arc::new(track));
        Ok(())
    }

    fn select_track(&mut self, index: usize) {
        self.selected = index;
        self.overview = self
            .tracks
            .get(index)
            .map(|track| TrackOverview::new(track, self.canvas));
        if let Some(track) = self.tracks.get(index) {
            log::debug!("Selected track '{}'", track.name);
        }
    }

    pub fn show_introduction(&mut self) {
        if self.state == GameState::BuildTracks {
            self.select_track(0);
        }
        log::info!("{:?} -> Introduction", self.state);

        self.state = GameState::Introduction;
        self.scene = None;
        self.message = None;
        self.finishing_position = None;
        self.music = Some(MusicCue::Menu);
    }

    pub fn start_race(&mut self) {
        let Some(track) = self.tracks.get(self.selected).cloned() else {
            log::warn!("No track to race on");
            return;
        };

        let cars = Car::roster(&self.players);
        let race = Race::new(cars, Arc::clone(&track), self.seed);
        let renderer = RaceRenderer::new(
            &track,
            self.canvas,
            RenderDepth::new(self.timing.fast_frame_s, self.timing.slow_frame_s),
        );
        let minimap = MiniMap::new(
            &track,
            Rect::new(
                self.canvas.width * 0.68,
                self.canvas.height * 0.05,
                self.canvas.width * 0.3,
                self.canvas.height * 0.3,
            ),
        );

        log::info!("{:?} -> PreRace on '{}'", self.state, track.name);

        self.scene = Some(RaceScene { race, renderer, minimap });
        self.state = GameState::PreRace;
        self.timer.reset();
        self.finishing_position = None;
        self.message = Some("Use Cursor Keys to Accelerate, Brake and Steer".to_string());
        self.music = Some(MusicCue::Start);
    }

    fn race_frame<I: ImageSource>(&mut self, images: &I) -> Frame {
        let average = self.timer.average_interval();
        let elapsed = self.timer.total_time();
        let tick_s = self.timing.tick_s();
        let Some(scene) = self.scene.as_mut() else {
            return Frame::default();
        };

        scene.renderer.depth.adjust(average);

        let mut tick = None;
        if matches!(self.state, GameState::Race | GameState::PostRace) {
            scene.race.apply_input(&self.held);
            if let Some(car) = scene.race.human() {
                scene.renderer.camera.bank(car);
            }
            tick = Some(scene.race.tick(tick_s));

            if self.state == GameState::Race {
                if let Some(place) = finishing_place(&scene.race) {
                    log::info!("Race finished in position {}", place);
                    self.state = GameState::PostRace;
                    self.finishing_position = Some(place);
                    self.message = Some(format!(
                        "You finished {}{} - Press ESC to race again",
                        place,
                        ordinal_suffix(place)
                    ));
                    self.music = Some(if place == 1 { MusicCue::Win } else { MusicCue::Lose });
                }
            }
        }

        scene.race.add_car_sprites();
        scene.renderer.follow_car(&scene.race, tick_s);

        if self.state == GameState::PreRace {
            let delta = elapsed / self.timing.pre_race_delay_s;
            if delta < 1.0 {
                count_in(scene, delta);
            } else {
                log::info!("PreRace -> Race");
                self.state = GameState::Race;
                self.music = Some(MusicCue::Race(self.selected % 2));
                self.message = None;
            }
        }

        let draw = scene.renderer.render(&scene.race, images);
        let map = if self.show_map {
            scene.minimap.markers(&scene.race)
        } else {
            Vec::new()
        };
        scene.race.clear_frame_sprites();

        Frame {
            draw: Some(draw),
            map,
            message: self.message.clone(),
            tick,
        }
    }
}

/// Lowers the camera towards the car and brings the start marker in as the count-in runs.
fn count_in(scene: &mut RaceScene, delta: f32) {
    let remaining = 1.0 - delta;
    scene.renderer.camera.position.y += PRE_RACE_HEIGHT_M * remaining;

    let Some(lateral) = scene.race.human().map(|car| car.position.x) else { return };
    let track_position = scene.renderer.camera_track_position(&scene.race) + 1.0;
    let height = scene.renderer.camera.position.y + 0.2;
    let (width, marker_height) = START_MARKER_SIZE_M;

    scene.race.add_frame_sprite(
        track_position,
        SpriteOffset::new(lateral, START_MARKER_DISTANCE_M * remaining, Height::Absolute(height)),
        Vec3::new(width, marker_height, 0.0),
        SpriteImage::StartMarker,
    );
}

/// Race position of the human car once it has completed every lap.
fn finishing_place(race: &Race) -> Option<usize> {
    let car = race.human()?;
    (race.lap(car) > race.track().laps as i32).then(|| race.race_position(car.id))
}

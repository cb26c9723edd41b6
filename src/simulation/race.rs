use super::{BehaviorEngine, Car, CarId, Collision, InputSnapshot, PhysicsEngine};
use super::constants::*;
use crate::track::{Point, Surface, Track, Vec3, TRACK_HEIGHT_M, TRACK_WIDTH_M, SEGMENT_SPACING_M};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Orientation {
    /// Always faces the camera.
    Billboard,
    /// Planar sprite facing along a world heading, in radians.
    Fixed(f32),
}

/// Image identifiers handed to the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpriteImage {
    Surface(Surface),
    Banner,
    Tree(u8),
    Car(u8),
    StartMarker,
    Backdrop,
}

/// Widths and heights of the six tree images, in metres.
pub const TREE_SIZES_M: [(f32, f32); 6] = [
    (5.94, 9.3),
    (6.59, 7.52),
    (5.73, 12.0),
    (7.4, 7.4),
    (6.2, 8.7),
    (2.5, 5.4),
];
pub const START_MARKER_SIZE_M: (f32, f32) = (4.43, 3.07);
pub const CAR_ANIMATION_FRAMES: i64 = 4;

#[derive(Debug, Clone, PartialEq)]
pub struct Sprite {
    pub position: Point,
    /// Width, height and depth; depth only matters for fixed orientations.
    pub size: Vec3,
    pub orientation: Orientation,
    pub image: SpriteImage,
}

impl Sprite {
    pub fn billboard(position: Point, width: f32, height: f32, image: SpriteImage) -> Self {
        Self {
            position,
            size: Vec3::new(width, height, 0.0),
            orientation: Orientation::Billboard,
            image,
        }
    }
}

/// A sprite attached to the segment whose bucket draws it.
#[derive(Debug, Clone, PartialEq)]
pub struct AnchoredSprite {
    pub segment: usize,
    pub sprite: Sprite,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Height {
    AboveTrack(f32),
    Absolute(f32),
}

/// Where a sprite sits relative to its anchor point on the centre line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpriteOffset {
    pub lateral: f32,
    pub along: f32,
    pub height: Height,
}

impl SpriteOffset {
    pub fn new(lateral: f32, along: f32, height: Height) -> Self {
        Self { lateral, along, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LapChange {
    pub car: CarId,
    pub lap: i32,
}

#[derive(Debug, Clone, Default)]
pub struct TickReport {
    pub collisions: Vec<Collision>,
    pub lap_changes: Vec<LapChange>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StandingEntry<'a> {
    pub position: usize,
    pub car: CarId,
    pub name: &'a str,
    pub lap: i32,
    /// Distance behind the car one place ahead.
    pub gap_m: Option<f32>,
}

/// Owns the roster, the built track and its sprites, and sequences each tick.
pub struct Race {
    track: Arc<Track>,
    cars: Vec<Car>,
    standings: Vec<CarId>,
    decorations: Vec<Vec<Sprite>>,
    frame_sprites: Vec<AnchoredSprite>,
    physics: PhysicsEngine,
    behavior: BehaviorEngine,
    /// Highest lap each car has reached.
    laps: Vec<i32>,
    rng: StdRng,
    ticks: u64,
}

impl Race {
    pub fn new(mut cars: Vec<Car>, track: Arc<Track>, seed: Option<u64>) -> Self {
        let mut rng = if let Some(seed) = seed {
            StdRng::seed_from_u64(seed)
        } else {
            StdRng::from_entropy()
        };

        let decorations = decorate(&track, &mut rng);
        place_on_grid(&mut cars, &mut rng);

        let behavior = BehaviorEngine::new(&mut cars, &track, &mut rng);
        let mut race = Self {
            laps: Vec::new(),
            standings: Vec::new(),
            track,
            cars,
            decorations,
            frame_sprites: Vec::new(),
            physics: PhysicsEngine::new(),
            behavior,
            rng,
            ticks: 0,
        };
        race.rank();
        race.laps = race.cars.iter().map(|car| race.lap(car)).collect();

        log::info!(
            "Race on '{}' ({} laps, {:.0}m): grid {}",
            race.track.name,
            race.track.laps,
            race.track.length_m(),
            race.standings
                .iter()
                .filter_map(|id| race.car(*id))
                .map(|car| car.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );

        race
    }

    /// Advances the race by `dt` seconds.
    pub fn tick(&mut self, dt: f32) -> TickReport {
        self.physics.apply_cornering_force(&mut self.cars, &self.track);
        self.physics.integrate(&mut self.cars, dt);
        let collisions = self.physics.process_collisions(&mut self.cars);
        self.physics.constrain_to_track(&mut self.cars);
        self.rank();
        self.behavior.update(&mut self.cars, &self.track, &mut self.rng);
        self.ticks += 1;

        let mut lap_changes = Vec::new();
        for (i, car) in self.cars.iter().enumerate() {
            // Collisions can shove a car back over the line; only a new best lap counts
            let lap = self.lap(car);
            if lap > self.laps[i] {
                log::debug!("{} is on lap {} after {} ticks", car.name, lap, self.ticks);
                self.laps[i] = lap;
                lap_changes.push(LapChange { car: car.id, lap });
            }
        }

        TickReport { collisions, lap_changes }
    }

    /// Sets the human car's acceleration from the held controls.
    pub fn apply_input(&mut self, input: &InputSnapshot) {
        if let Some(car) = self.cars.iter_mut().find(|car| car.is_human()) {
            car.acceleration = input.acceleration();
        }
    }

    /// Re-sorts standings: furthest along first, car id breaking ties.
    pub fn rank(&mut self) {
        let mut order: Vec<&Car> = self.cars.iter().collect();
        order.sort_by(|a, b| {
            b.position.y
                .total_cmp(&a.position.y)
                .then(a.id.cmp(&b.id))
        });
        self.standings = order.into_iter().map(|car| car.id).collect();
    }

    pub fn track(&self) -> &Track {
        &self.track
    }

    pub fn cars(&self) -> &[Car] {
        &self.cars
    }

    pub fn cars_mut(&mut self) -> &mut [Car] {
        &mut self.cars
    }

    pub fn car(&self, id: CarId) -> Option<&Car> {
        self.cars.iter().find(|car| car.id == id)
    }

    pub fn car_mut(&mut self, id: CarId) -> Option<&mut Car> {
        self.cars.iter_mut().find(|car| car.id == id)
    }

    pub fn human(&self) -> Option<&Car> {
        self.cars.iter().find(|car| car.is_human())
    }

    pub fn behavior(&self) -> &BehaviorEngine {
        &self.behavior
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn standings(&self) -> &[CarId] {
        &self.standings
    }

    /// 1-based lap; cars behind the start line on the grid report lap 0.
    pub fn lap(&self, car: &Car) -> i32 {
        1 + (car.position.y / self.track.len() as f32).floor() as i32
    }

    /// 1-based race position, 0 for an unknown car.
    pub fn race_position(&self, id: CarId) -> usize {
        self.standings
            .iter()
            .position(|standing| *standing == id)
            .map_or(0, |index| index + 1)
    }

    /// Position on the current lap, in `[0, track length)` segments.
    pub fn track_position(&self, car: &Car) -> f32 {
        car.position.y.rem_euclid(self.track.len() as f32)
    }

    /// Fraction of the current lap covered, in `[0, 1)`.
    pub fn lap_progress(&self, car: &Car) -> f32 {
        self.track_position(car) / self.track.len() as f32
    }

    pub fn standings_table(&self) -> Vec<StandingEntry<'_>> {
        let mut previous: Option<&Car> = None;
        let mut table = Vec::with_capacity(self.standings.len());

        for (index, id) in self.standings.iter().enumerate() {
            let Some(car) = self.car(*id) else { continue };
            table.push(StandingEntry {
                position: index + 1,
                car: car.id,
                name: &car.name,
                lap: self.lap(car),
                gap_m: previous.map(|ahead| (ahead.position.y - car.position.y) * SEGMENT_SPACING_M),
            });
            previous = Some(car);
        }

        table
    }

    /// Static decorations followed by this frame's dynamic sprites for one segment bucket.
    pub fn sprites_at(&self, segment: usize) -> impl Iterator<Item = &Sprite> + '_ {
        self.decorations
            .get(segment)
            .into_iter()
            .flatten()
            .chain(
                self.frame_sprites
                    .iter()
                    .filter(move |anchored| anchored.segment == segment)
                    .map(|anchored| &anchored.sprite),
            )
    }

    pub fn decorations(&self) -> &[Vec<Sprite>] {
        &self.decorations
    }

    pub fn frame_sprites(&self) -> &[AnchoredSprite] {
        &self.frame_sprites
    }

    /// Adds a sprite that lives until `clear_frame_sprites`.
    pub fn add_frame_sprite(
        &mut self,
        track_position: f32,
        offset: SpriteOffset,
        size: Vec3,
        image: SpriteImage,
    ) {
        let anchored = anchor_sprite(&self.track, track_position, offset, size, image);
        self.frame_sprites.push(anchored);
    }

    /// Adds one body sprite per car, sitting on the track surface.
    pub fn add_car_sprites(&mut self) {
        let height = TRACK_HEIGHT_M / 2.0 + CAR_HEIGHT_M / 2.0;
        let size = Vec3::new(CAR_WIDTH_M, CAR_HEIGHT_M, CAR_LENGTH_M);

        for i in 0..self.cars.len() {
            let car = &self.cars[i];
            let track_position = self.track_position(car);
            let offset = SpriteOffset::new(car.position.x, 0.0, Height::AboveTrack(height));
            let frame = ((car.position.y * 8.0).floor() as i64).rem_euclid(CAR_ANIMATION_FRAMES) as u8;
            self.add_frame_sprite(track_position, offset, size, SpriteImage::Car(frame));
        }
    }

    pub fn clear_frame_sprites(&mut self) {
        self.frame_sprites.clear();
    }
}

fn place_on_grid<R: Rng>(cars: &mut [Car], rng: &mut R) {
    let lateral = TRACK_WIDTH_M / 4.0;
    let step = -STARTING_GRID_SPACE_M / SEGMENT_SPACING_M;

    let mut order: Vec<usize> = (0..cars.len()).filter(|&i| !cars[i].is_human()).collect();
    order.shuffle(rng);
    order.extend((0..cars.len()).filter(|&i| cars[i].is_human()));

    for (slot, &index) in order.iter().enumerate() {
        let car = &mut cars[index];
        car.reset();
        car.position.x = if slot % 2 == 0 { -lateral } else { lateral };
        car.position.y = step * (slot + 1) as f32;
    }
}

/// Start banner on segment 0 plus trees scattered beside roughly a quarter of the segments.
fn decorate<R: Rng>(track: &Track, rng: &mut R) -> Vec<Vec<Sprite>> {
    let mut buckets: Vec<Vec<Sprite>> = vec![Vec::new(); track.len()];
    let verge_width = TRACK_WIDTH_M * 1.2;
    let verge = verge_width / 2.0;

    let banner_height = 2.0;
    let banner = anchor_sprite(
        track,
        0.0,
        SpriteOffset::new(0.0, 0.0, Height::AboveTrack(banner_height / 2.0)),
        Vec3::new(verge_width, banner_height, 0.0),
        SpriteImage::Banner,
    );
    buckets[banner.segment].push(banner.sprite);

    for segment in 0..track.len() {
        if rng.gen_range(0..4) != 0 {
            continue;
        }
        let kind = rng.gen_range(0..TREE_SIZES_M.len());
        let (width, height) = TREE_SIZES_M[kind];
        let mut x = rng.gen::<f32>() * 5.0 + verge;
        let z = rng.gen::<f32>();
        if rng.gen_range(0..2) == 0 {
            x = -x;
        }

        let tree = anchor_sprite(
            track,
            segment as f32,
            SpriteOffset::new(x, z, Height::Absolute(height / 2.0)),
            Vec3::new(width, height, 0.0),
            SpriteImage::Tree(kind as u8),
        );
        buckets[tree.segment].push(tree.sprite);
    }

    buckets
}

/// Places a billboard relative to the centre line at `track_position`, rotated into the
/// local heading.
pub fn anchor_sprite(
    track: &Track,
    track_position: f32,
    offset: SpriteOffset,
    size: Vec3,
    image: SpriteImage,
) -> AnchoredSprite {
    let segment = track.wrap_index(track_position.floor() as i64);
    let (centre, heading) = track.interpolate(track_position);
    let (sine, cosine) = heading.sin_cos();

    let x = offset.lateral * cosine + offset.along * sine;
    let z = offset.along * cosine - offset.lateral * sine;
    let y = match offset.height {
        Height::AboveTrack(y) => y + centre.y,
        Height::Absolute(y) => y,
    };

    AnchoredSprite {
        segment,
        sprite: Sprite {
            position: Point::new(centre.x + x, y, centre.z + z),
            size,
            orientation: Orientation::Billboard,
            image,
        },
    }
}

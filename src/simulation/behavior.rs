use super::{Car, CarId};
use super::constants::*;
use crate::track::{Track, SEGMENT_SPACING_M};
use rand::Rng;

/// What an AI driver needs to know about a neighbouring car.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbour {
    pub id: CarId,
    pub lateral: f32,
    pub longitudinal: f32,
    pub forward_speed: f32,
}

impl From<&Car> for Neighbour {
    fn from(car: &Car) -> Self {
        Self {
            id: car.id,
            lateral: car.position.x,
            longitudinal: car.position.y,
            forward_speed: car.velocity.y,
        }
    }
}

/// Decision state of one computer-controlled car.
#[derive(Debug, Clone, PartialEq)]
pub struct AiState {
    pub target_lateral: f32,
    /// Scales target speed, in `[0, 1]`.
    pub aggression: f32,
    /// Ticks until the next free re-evaluation.
    pub evaluate_countdown: i32,
    pub close_ahead: bool,
    pub close_behind: bool,
    pub overtaking: Option<CarId>,
}

impl AiState {
    pub fn new(car: &Car) -> Self {
        Self {
            target_lateral: car.position.x,
            aggression: AI_INITIAL_AGGRESSION,
            evaluate_countdown: 0,
            close_ahead: false,
            close_behind: false,
            overtaking: None,
        }
    }

    /// One decision step: read the neighbours, maybe commit to an overtake, then set the car's
    /// forward acceleration and lateral velocity.
    pub fn think<R: Rng>(
        &mut self,
        car: &mut Car,
        ahead: &Neighbour,
        behind: &Neighbour,
        track: &Track,
        rng: &mut R,
    ) {
        self.measure_gaps(car, ahead, behind, track);
        self.consider_overtaking(car, ahead);
        self.apply_forward_acceleration(car, track);
        self.apply_lateral_velocity(car);

        self.evaluate_countdown -= 1;
        if self.evaluate_countdown <= 0 {
            if !self.close_behind && !self.close_ahead {
                self.target_lateral = rng.gen::<f32>() * AI_WANDER_WIDTH_M - AI_WANDER_WIDTH_M / 2.0;
            }
            let jitter = rng.gen::<f32>() * 2.0 * AI_AGGRESSION_JITTER - AI_AGGRESSION_JITTER;
            self.aggression = (self.aggression + jitter).clamp(0.0, 1.0);
            self.evaluate_countdown =
                (rng.gen_range(0..AI_EVALUATE_SPREAD_TICKS) + AI_EVALUATE_MIN_TICKS) as i32;
        }
    }

    /// Cruising speed for the bend `AI_TRACK_LOOK_AHEAD` segments ahead.
    pub fn target_velocity(&self, car: &Car, track: &Track) -> f32 {
        let bend = track.bend_ahead(car.position.y, AI_TRACK_LOOK_AHEAD);
        CAR_FORWARD_VELOCITY_MAX_MS * (bend.abs() * AI_BEND_GAIN).min(1.0).cos() * self.aggression
    }

    fn measure_gaps(&mut self, car: &Car, ahead: &Neighbour, behind: &Neighbour, track: &Track) {
        self.close_ahead = gap_m(ahead.longitudinal, car.position.y, track) <= AI_OVERTAKING_DISTANCE_M;
        self.close_behind = gap_m(car.position.y, behind.longitudinal, track) <= CAR_LENGTH_M * 2.0;
    }

    fn consider_overtaking(&mut self, car: &Car, ahead: &Neighbour) {
        self.overtaking = None;

        if car.velocity.y <= ahead.forward_speed || !self.close_ahead || self.close_behind {
            return;
        }

        self.overtaking = Some(ahead.id);

        // Pass on the side of the track the leader is not on, and never pull back towards
        // the centre while the move is on.
        let clearance = 2.0 * CAR_WIDTH_M;
        if ahead.lateral >= 0.0 {
            self.target_lateral = self.target_lateral.min(ahead.lateral - clearance);
        } else {
            self.target_lateral = self.target_lateral.max(ahead.lateral + clearance);
        }
    }

    fn apply_forward_acceleration(&self, car: &mut Car, track: &Track) {
        let factor = if self.target_velocity(car, track) > car.velocity.y {
            1.0
        } else {
            -CAR_DECELERATION_FACTOR
        };
        car.acceleration.y = CAR_FORWARD_ACCELERATION_MSS * factor;
    }

    fn apply_lateral_velocity(&self, car: &mut Car) {
        let difference = self.target_lateral - car.position.x;
        car.velocity.x = if difference.abs() > AI_LATERAL_TOLERANCE_M {
            AI_LATERAL_SHUFFLE_MS.copysign(difference)
        } else {
            0.0
        };
    }
}

/// Whole-segment gap from `behind` up to `ahead`, wrapped onto one lap, in metres.
fn gap_m(ahead: f32, behind: f32, track: &Track) -> f32 {
    let segments = (ahead - behind).trunc() as i64;
    segments.rem_euclid(track.len() as i64) as f32 * SEGMENT_SPACING_M
}

/// Owns the decision state of every computer car, indexed by `CarId`.
pub struct BehaviorEngine {
    states: Vec<Option<AiState>>,
}

impl BehaviorEngine {
    /// Seeds each computer car's state with a first think against itself.
    pub fn new<R: Rng>(cars: &mut [Car], track: &Track, rng: &mut R) -> Self {
        let slots = cars.iter().map(|car| car.id.0 + 1).max().unwrap_or(0);
        let mut states: Vec<Option<AiState>> = vec![None; slots];

        for car in cars.iter_mut().filter(|car| !car.is_human()) {
            let mut state = AiState::new(car);
            let me = Neighbour::from(&*car);
            state.think(car, &me, &me, track, rng);
            states[car.id.0] = Some(state);
        }

        Self { states }
    }

    pub fn state(&self, id: CarId) -> Option<&AiState> {
        self.states.get(id.0).and_then(Option::as_ref)
    }

    /// Lets every computer car think, using physical order around the loop (not race order)
    /// to find who is directly ahead and behind.
    pub fn update<R: Rng>(&mut self, cars: &mut [Car], track: &Track, rng: &mut R) {
        if cars.is_empty() {
            return;
        }

        let length = track.len() as f32;
        let mut order: Vec<usize> = (0..cars.len()).collect();
        order.sort_by(|&a, &b| {
            let pa = cars[a].position.y.rem_euclid(length);
            let pb = cars[b].position.y.rem_euclid(length);
            pa.total_cmp(&pb).then(cars[a].id.cmp(&cars[b].id))
        });

        let neighbours: Vec<Neighbour> = order.iter().map(|&i| Neighbour::from(&cars[i])).collect();
        let count = order.len();

        for (rank, &index) in order.iter().enumerate() {
            let car = &mut cars[index];
            if car.is_human() {
                continue;
            }
            let Some(state) = self.states.get_mut(car.id.0).and_then(Option::as_mut) else {
                continue;
            };
            let ahead = neighbours[(rank + 1) % count];
            let behind = neighbours[(rank + count - 1) % count];
            state.think(car, &ahead, &behind, track, rng);
        }
    }
}

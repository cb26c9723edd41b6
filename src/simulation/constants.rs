//! Handling and AI tuning. Lateral values come first in each pair, longitudinal second.

use crate::track::TRACK_WIDTH_M;

pub const CAR_WIDTH_M: f32 = 1.0;
pub const CAR_HEIGHT_M: f32 = 0.7;
pub const CAR_LENGTH_M: f32 = 0.5;

pub const CAR_LATERAL_VELOCITY_MAX_MS: f32 = 14.0;
pub const CAR_FORWARD_VELOCITY_MAX_MS: f32 = 45.0;
pub const CAR_LATERAL_ACCELERATION_MSS: f32 = 80.0;
pub const CAR_FORWARD_ACCELERATION_MSS: f32 = 30.0;
/// Applied instead of the throttle curve whenever the car is not accelerating.
pub const CAR_DECELERATION_FACTOR: f32 = 2.5;
pub const CAR_CENTRIFUGAL_MSS: f32 = 80.0;

pub const CAR_LATERAL_DAMPING: f32 = 0.9;
pub const CAR_FORWARD_DAMPING: f32 = 0.96;
/// Lateral velocity is damped below this forward speed even while steering.
pub const CAR_LATERAL_DAMPING_SPEED_MS: f32 = 10.0;
pub const CAR_TRACK_EDGE_DAMPING: f32 = 0.85;

pub const COLLISION_RELAXATION: f32 = 0.8;
/// Share of the front car's velocity handed to the car that ran into it.
pub const COLLISION_REAR_RESTITUTION: f32 = 0.95;
/// Share of the rear car's velocity handed to the car that was hit.
pub const COLLISION_FRONT_RESTITUTION: f32 = 0.9;

pub const STARTING_GRID_SPACE_M: f32 = 1.2;

pub const AI_OVERTAKING_DISTANCE_M: f32 = 6.0;
pub const AI_LATERAL_SHUFFLE_MS: f32 = CAR_LATERAL_VELOCITY_MAX_MS * 0.4;
pub const AI_LATERAL_TOLERANCE_M: f32 = 0.1;
pub const AI_TRACK_LOOK_AHEAD: i64 = 10;
pub const AI_BEND_GAIN: f32 = 1.4;
pub const AI_INITIAL_AGGRESSION: f32 = 0.9;
pub const AI_AGGRESSION_JITTER: f32 = 0.02;
pub const AI_EVALUATE_MIN_TICKS: u32 = 60;
pub const AI_EVALUATE_SPREAD_TICKS: u32 = 60;
/// Width of the central band AI cars wander within.
pub const AI_WANDER_WIDTH_M: f32 = (TRACK_WIDTH_M - CAR_WIDTH_M) * 0.4;

pub const METRES_PER_SECOND_TO_MILES_PER_HOUR: f32 = 2.237;

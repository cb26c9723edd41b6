use super::{Car, CarId, Vec2};
use super::constants::*;
use crate::track::{Track, SEGMENT_SPACING_M, TRACK_WIDTH_M};
use std::f32::consts::PI;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionAxis {
    Lateral,
    Longitudinal,
}

/// A resolved car-car contact.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collision {
    pub first: CarId,
    pub second: CarId,
    pub axis: CollisionAxis,
    /// Signed minimum translation along `axis` in metres, from the first car's point of view.
    pub penetration: f32,
}

/// Car footprint in track space: lateral metres by longitudinal metres, with the track
/// unrolled into a straight line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackSpaceBox {
    pub min: Vec2,
    pub max: Vec2,
}

impl TrackSpaceBox {
    pub fn of(car: &Car) -> Self {
        let half = Vec2::new(CAR_WIDTH_M / 2.0, CAR_LENGTH_M / 2.0);
        let centre = Vec2::new(car.position.x, car.position.y * SEGMENT_SPACING_M);
        Self {
            min: centre - half,
            max: centre + half,
        }
    }

    /// Overlap depth along each axis, `None` when the boxes are apart on either axis.
    pub fn overlap(&self, other: &TrackSpaceBox) -> Option<Vec2> {
        let overlap = self.max.inf(&other.max) - self.min.sup(&other.min);
        if overlap.x < 0.0 || overlap.y < 0.0 {
            None
        } else {
            Some(overlap)
        }
    }
}

pub struct PhysicsEngine {
    lateral_limit: f32,
    relaxation: f32,
}

impl Default for PhysicsEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl PhysicsEngine {
    pub fn new() -> Self {
        Self {
            lateral_limit: TRACK_WIDTH_M / 2.0 - CAR_WIDTH_M / 2.0,
            relaxation: COLLISION_RELAXATION,
        }
    }

    /// Pushes the human car towards the outside of bends in proportion to speed.
    pub fn apply_cornering_force(&self, cars: &mut [Car], track: &Track) {
        for car in cars.iter_mut().filter(|car| car.is_human()) {
            let bend = track.turn_angle(car.position.y);
            car.acceleration.x -= car.velocity.y * bend * CAR_CENTRIFUGAL_MSS;
        }
    }

    pub fn integrate(&self, cars: &mut [Car], dt: f32) {
        let segments_per_metre = 1.0 / SEGMENT_SPACING_M;

        for car in cars.iter_mut() {
            let acc = car.acceleration;
            let vel = &mut car.velocity;

            car.position.x += vel.x * dt;
            car.position.y += vel.y * dt * segments_per_metre;

            // Steering bites harder as speed builds, up to half of top speed.
            let lateral_factor = (2.0 * vel.y / CAR_FORWARD_VELOCITY_MAX_MS).min(1.0);
            // Throttle fades towards top speed; braking and coasting use a fixed boost.
            let forward_factor = if acc.y > 0.0 {
                (vel.y / CAR_FORWARD_VELOCITY_MAX_MS * PI / 2.0).cos()
            } else {
                CAR_DECELERATION_FACTOR
            };

            vel.x += acc.x * dt * lateral_factor;
            vel.y += acc.y * dt * forward_factor;

            vel.x = vel.x.clamp(-CAR_LATERAL_VELOCITY_MAX_MS, CAR_LATERAL_VELOCITY_MAX_MS);
            vel.y = vel.y.clamp(0.0, CAR_FORWARD_VELOCITY_MAX_MS);

            if acc.x == 0.0 || vel.y < CAR_LATERAL_DAMPING_SPEED_MS {
                vel.x *= CAR_LATERAL_DAMPING;
            }
            if acc.y == 0.0 {
                vel.y *= CAR_FORWARD_DAMPING;
            }
        }
    }

    /// Separates every overlapping pair along its axis of least penetration.
    pub fn process_collisions(&self, cars: &mut [Car]) -> Vec<Collision> {
        let boxes: Vec<TrackSpaceBox> = cars.iter().map(TrackSpaceBox::of).collect();
        let mut collisions = Vec::new();

        for i in 0..cars.len() {
            for j in (i + 1)..cars.len() {
                let (a, b) = (&boxes[i], &boxes[j]);
                if a.overlap(b).is_none() {
                    continue;
                }

                // Distance each way the first car would have to move to clear the second.
                let push_right = b.max.x - a.min.x;
                let push_left = a.max.x - b.min.x;
                let push_forward = b.max.y - a.min.y;
                let push_back = a.max.y - b.min.y;

                let mtd_x = if push_right < push_left { push_right } else { -push_left };
                let mtd_z = if push_forward < push_back { push_forward } else { -push_back };

                let (axis, penetration) = if mtd_x.abs() < mtd_z.abs() {
                    (CollisionAxis::Lateral, mtd_x)
                } else {
                    (CollisionAxis::Longitudinal, mtd_z)
                };

                let (first, second) = pair_mut(cars, i, j);
                let shift = penetration * 0.5 * self.relaxation;
                match axis {
                    CollisionAxis::Lateral => {
                        first.position.x += shift;
                        second.position.x -= shift;
                    }
                    CollisionAxis::Longitudinal => {
                        let rear_is_first = first.position.y < second.position.y;
                        first.position.y += shift / SEGMENT_SPACING_M;
                        second.position.y -= shift / SEGMENT_SPACING_M;

                        let (rear, front) = if rear_is_first {
                            (first, second)
                        } else {
                            (second, first)
                        };
                        let rear_speed = rear.velocity.y;
                        rear.velocity.y = front.velocity.y * COLLISION_REAR_RESTITUTION;
                        front.velocity.y = rear_speed * COLLISION_FRONT_RESTITUTION;
                    }
                }

                log::trace!(
                    "Collision between car {} and car {}: {:?} {:.3}m",
                    i, j, axis, penetration
                );
                collisions.push(Collision {
                    first: cars[i].id,
                    second: cars[j].id,
                    axis,
                    penetration,
                });
            }
        }

        collisions
    }

    /// Keeps every car body between the barriers; touching one kills lateral speed and
    /// scrubs forward speed.
    pub fn constrain_to_track(&self, cars: &mut [Car]) {
        for car in cars.iter_mut() {
            let x = car.position.x;
            let clamped = x.clamp(-self.lateral_limit, self.lateral_limit);
            if clamped != x {
                car.position.x = clamped;
                car.velocity.x = 0.0;
                car.velocity.y *= CAR_TRACK_EDGE_DAMPING;
            }
        }
    }

    pub fn lateral_limit(&self) -> f32 {
        self.lateral_limit
    }
}

fn pair_mut(cars: &mut [Car], i: usize, j: usize) -> (&mut Car, &mut Car) {
    debug_assert!(i < j);
    let (head, tail) = cars.split_at_mut(j);
    (&mut head[i], &mut tail[0])
}

use nalgebra::Vector2;
use instant::Instant;
use std::collections::VecDeque;

pub mod behavior;
pub mod constants;
pub mod physics;
pub mod race;

pub use behavior::*;
pub use constants::*;
pub use physics::*;
pub use race::*;

/// `x` is lateral metres from the centre line, `y` is longitudinal progress in segments.
pub type Vec2 = Vector2<f32>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CarId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Controller {
    Human,
    Computer,
}

#[derive(Debug, Clone)]
pub struct Car {
    pub id: CarId,
    pub name: String,
    pub controller: Controller,
    pub position: Vec2,
    /// Metres per second on both axes.
    pub velocity: Vec2,
    pub acceleration: Vec2,
}

impl Car {
    pub fn new(id: CarId, name: impl Into<String>, controller: Controller) -> Self {
        Self {
            id,
            name: name.into(),
            controller,
            position: Vec2::zeros(),
            velocity: Vec2::zeros(),
            acceleration: Vec2::zeros(),
        }
    }

    /// Builds a roster where the first name is the human driver.
    pub fn roster<S: AsRef<str>>(names: &[S]) -> Vec<Car> {
        names
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let controller = if i == 0 { Controller::Human } else { Controller::Computer };
                Car::new(CarId(i), name.as_ref(), controller)
            })
            .collect()
    }

    pub fn reset(&mut self) {
        self.position = Vec2::zeros();
        self.velocity = Vec2::zeros();
        self.acceleration = Vec2::zeros();
    }

    pub fn is_human(&self) -> bool {
        self.controller == Controller::Human
    }

    pub fn lateral(&self) -> f32 {
        self.position.x
    }

    /// Progress along the track in segments; keeps growing across laps.
    pub fn longitudinal(&self) -> f32 {
        self.position.y
    }

    pub fn forward_speed(&self) -> f32 {
        self.velocity.y
    }

    pub fn speed_mph(&self) -> f32 {
        self.velocity.y * METRES_PER_SECOND_TO_MILES_PER_HOUR
    }
}

/// Controls held down during one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputSnapshot {
    pub accelerate: bool,
    pub brake: bool,
    pub steer_left: bool,
    pub steer_right: bool,
}

impl InputSnapshot {
    /// Opposing controls cancel out.
    pub fn acceleration(&self) -> Vec2 {
        let mut acc = Vec2::zeros();
        if self.steer_right {
            acc.x += CAR_LATERAL_ACCELERATION_MSS;
        }
        if self.steer_left {
            acc.x -= CAR_LATERAL_ACCELERATION_MSS;
        }
        if self.accelerate {
            acc.y += CAR_FORWARD_ACCELERATION_MSS;
        }
        if self.brake {
            acc.y -= CAR_FORWARD_ACCELERATION_MSS;
        }
        acc
    }
}

/// Rolling average of recent frame intervals.
#[derive(Debug)]
pub struct FrameTimer {
    intervals: VecDeque<f32>,
    max_samples: usize,
    last_frame: Option<Instant>,
    total: f32,
}

impl FrameTimer {
    pub fn new(max_samples: usize) -> Self {
        let max_samples = max_samples.max(1);
        Self {
            intervals: VecDeque::with_capacity(max_samples),
            max_samples,
            last_frame: None,
            total: 0.0,
        }
    }

    /// Records the wall-clock interval since the previous call.
    pub fn record_frame(&mut self) {
        let now = Instant::now();
        if let Some(last) = self.last_frame {
            self.push_interval(now.duration_since(last).as_secs_f32());
        }
        self.last_frame = Some(now);
    }

    pub fn push_interval(&mut self, interval: f32) {
        if self.intervals.len() >= self.max_samples {
            self.intervals.pop_front();
        }
        self.intervals.push_back(interval);
        self.total += interval;
    }

    pub fn average_interval(&self) -> f32 {
        if self.intervals.is_empty() {
            return 0.0;
        }
        self.intervals.iter().sum::<f32>() / self.intervals.len() as f32
    }

    /// Seconds covered by every interval recorded since the last reset.
    pub fn total_time(&self) -> f32 {
        self.total
    }

    pub fn fps(&self) -> f32 {
        let average = self.average_interval();
        if average <= 0.0 {
            return 0.0;
        }
        1.0 / average
    }

    pub fn reset(&mut self) {
        self.intervals.clear();
        self.last_frame = None;
        self.total = 0.0;
    }
}

use serde::{Deserialize, Serialize};
use anyhow::{Result, anyhow};
use super::Validate;
use crate::track::{ControlPoint, Surface, Track};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TracksConfig {
    #[serde(rename = "track")]
    pub tracks: Vec<TrackDefinition>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TrackDefinition {
    pub name: String,
    pub laps: u32,
    pub points: Vec<ControlPointDefinition>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ControlPointDefinition {
    pub position: [f32; 3],
    pub tangent: [f32; 3],
    /// Switches the ground texture from this point on
    #[serde(default)]
    pub surface: Option<Surface>,
}

impl ControlPointDefinition {
    pub fn to_control_point(&self) -> ControlPoint {
        let point = ControlPoint::new(self.position, self.tangent);
        match self.surface {
            Some(surface) => point.with_surface(surface),
            None => point,
        }
    }
}

impl TrackDefinition {
    pub fn control_points(&self) -> Vec<ControlPoint> {
        self.points.iter().map(ControlPointDefinition::to_control_point).collect()
    }

    pub fn build(&self) -> Result<Track> {
        Ok(Track::build(self.name.clone(), self.laps, self.control_points())?)
    }
}

impl TracksConfig {
    pub fn find(&self, name: &str) -> Option<&TrackDefinition> {
        self.tracks.iter().find(|track| track.name.eq_ignore_ascii_case(name))
    }

    pub fn names(&self) -> Vec<&str> {
        self.tracks.iter().map(|track| track.name.as_str()).collect()
    }
}

impl Validate for TracksConfig {
    fn validate(&self) -> Result<()> {
        if self.tracks.is_empty() {
            return Err(anyhow!("At least one track must be defined"));
        }

        for (i, track) in self.tracks.iter().enumerate() {
            if track.name.trim().is_empty() {
                return Err(anyhow!("Track {} has an empty name", i));
            }

            if self.tracks[..i].iter().any(|other| other.name.eq_ignore_ascii_case(&track.name)) {
                return Err(anyhow!("Track name '{}' is used more than once", track.name));
            }

            if track.laps == 0 {
                return Err(anyhow!("Track '{}' must have at least one lap", track.name));
            }

            if track.points.len() < 2 {
                return Err(anyhow!(
                    "Track '{}' needs at least 2 control points, got {}",
                    track.name,
                    track.points.len()
                ));
            }

            for (j, point) in track.points.iter().enumerate() {
                let finite = point.position.iter().chain(point.tangent.iter()).all(|v| v.is_finite());
                if !finite {
                    return Err(anyhow!("Control point {} of track '{}' must be finite", j, track.name));
                }
            }
        }

        Ok(())
    }
}

use anyhow::Result;

pub mod tracks;
pub mod settings;

pub use tracks::*;
pub use settings::*;

#[derive(Debug, Clone)]
pub struct GameConfig {
    pub tracks: TracksConfig,
    pub race: RaceConfig,
}

impl GameConfig {
    pub fn load_from_files(tracks_path: &str, race_path: &str) -> Result<Self> {
        let tracks_content = std::fs::read_to_string(tracks_path)?;
        let race_content = std::fs::read_to_string(race_path)?;

        Self::from_toml(&tracks_content, &race_content)
    }

    pub fn from_toml(tracks_content: &str, race_content: &str) -> Result<Self> {
        let tracks: TracksConfig = toml::from_str(tracks_content)?;
        let race: RaceConfig = toml::from_str(race_content)?;

        // Validate configurations
        tracks.validate()?;
        race.validate()?;

        Ok(GameConfig { tracks, race })
    }
}

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

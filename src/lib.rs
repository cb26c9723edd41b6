pub mod config;
pub mod track;
pub mod simulation;
pub mod graphics;
pub mod session;

pub use simulation::*;
pub use config::*;

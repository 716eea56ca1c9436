//! Configuration: environment settings and marketplace constants.

mod constants;
mod settings;

pub use constants::*;
pub use settings::Config;

pub mod config;
pub mod error;
pub mod game;
pub mod render;
pub mod rl;

pub use error::{Error, Result};

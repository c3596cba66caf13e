pub mod config;
pub mod delivery;
pub mod error;
pub mod menu;
pub mod parser;
pub mod session;

pub use error::{HarnessError, Result};

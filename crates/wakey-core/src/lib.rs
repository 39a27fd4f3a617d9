pub mod adapters;
pub mod clock;
pub mod config;
pub mod error;
pub mod io;
pub mod lighting;
pub mod orchestrator;
pub mod paths;
pub mod ramp;
pub mod schedule;
pub mod store;
pub mod types;

pub use error::{Result, WakeyError};
pub use orchestrator::Orchestrator;

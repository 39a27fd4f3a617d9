pub mod alarms;
pub mod config;
pub mod preview;
pub mod status;

use crate::types::Phase;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WakeyError {
    #[error("alarm not found: {0}")]
    AlarmNotFound(String),

    #[error("invalid time '{0}': expected HH:MM")]
    InvalidTime(String),

    #[error("invalid alarm: {0}")]
    InvalidAlarm(String),

    #[error("cannot {action} while {from}")]
    InvalidTransition { from: Phase, action: &'static str },

    #[error("not configured: {0}")]
    NotConfigured(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, WakeyError>;

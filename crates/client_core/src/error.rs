use std::path::PathBuf;

use shared::domain::ColorChannel;
use thiserror::Error;

pub const MISSING_CHANNEL_MESSAGE: &str = "Please select a file for each color channel.";
pub const COLORIZE_FALLBACK_MESSAGE: &str = "An error occurred during colorization.";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("missing channel files: {}", join_channels(.0))]
    MissingChannels(Vec<ColorChannel>),
    #[error("a colorize request is already in flight")]
    AlreadyInFlight,
}

fn join_channels(channels: &[ColorChannel]) -> String {
    channels
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Error)]
pub enum ColorizeError {
    #[error("processing service returned {status}: {}", .message.as_deref().unwrap_or("no error message"))]
    Service {
        status: u16,
        message: Option<String>,
    },
    #[error("colorize request failed: {0}")]
    Transport(String),
}

impl ColorizeError {
    /// Text surfaced to the operator: the service's own message when it sent
    /// one, otherwise the generic fallback.
    pub fn user_message(&self) -> String {
        match self {
            ColorizeError::Service {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => message.clone(),
            _ => COLORIZE_FALLBACK_MESSAGE.to_string(),
        }
    }
}

impl From<reqwest::Error> for ColorizeError {
    fn from(value: reqwest::Error) -> Self {
        ColorizeError::Transport(value.to_string())
    }
}

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("history request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("history service returned {0}")]
    Status(u16),
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("no processed image to export")]
    NothingToExport,
    #[error("remote image reference cannot be exported without a download: {0}")]
    RemoteReference(String),
    #[error("malformed data url: {0}")]
    MalformedDataUrl(String),
    #[error("failed to write '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

//! Client-side orchestration for three-channel colorization: channel
//! selection, the submission state machine, history sync and result export.

pub mod config;
pub mod controller;
pub mod error;
pub mod history;
pub mod projection;
pub mod selection;
pub mod session;
pub mod theme;
pub mod transport;

pub use controller::{
    AttemptId, Completion, Outcome, PendingSubmission, ProcessingResult, SubmissionController,
    SubmissionState,
};
pub use error::{ColorizeError, ExportError, HistoryError, SubmitError};
pub use history::HistorySync;
pub use projection::{ImagePane, MetadataPreview, ResultView};
pub use selection::{ChannelFile, ChannelSelection};
pub use session::{ColorizeSession, SessionEvent};
pub use theme::{Theme, ThemeSurface};
pub use transport::{ColorizeRequest, HistoryService, HttpServiceClient, ProcessingService};

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;

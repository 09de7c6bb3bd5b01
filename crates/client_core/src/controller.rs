//! Submission controller: the request lifecycle state machine.
//!
//! `Idle -> InFlight -> {Succeeded | Failed}`, and both outcomes are launch
//! points for the next attempt. Every accepted attempt ends in exactly one
//! [`Completion`], which the caller must hand to history sync.

use shared::{
    domain::Palette,
    protocol::{ColorizeResponse, ImageRef, Metadata},
};
use tracing::{info, warn};

use crate::{
    error::{ColorizeError, SubmitError, MISSING_CHANNEL_MESSAGE},
    selection::ChannelSelection,
    transport::ColorizeRequest,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmissionState {
    #[default]
    Idle,
    InFlight,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AttemptId(pub u64);

#[derive(Debug, Clone, PartialEq)]
pub struct ProcessingResult {
    pub image: ImageRef,
    pub metadata: Metadata,
}

impl From<ColorizeResponse> for ProcessingResult {
    fn from(value: ColorizeResponse) -> Self {
        Self {
            image: value.image_data,
            metadata: value.metadata,
        }
    }
}

/// An accepted submit: the frozen request plus the id its outcome must carry.
#[derive(Debug, Clone)]
pub struct PendingSubmission {
    pub attempt: AttemptId,
    pub request: ColorizeRequest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Succeeded,
    Failed,
}

/// Proof that one attempt concluded. Not `Clone`: consuming it is how the
/// single history refresh per attempt is enforced.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a completion must be passed to history sync"]
pub struct Completion {
    pub attempt: AttemptId,
    pub outcome: Outcome,
}

#[derive(Debug, Default)]
pub struct SubmissionController {
    state: SubmissionState,
    result: Option<ProcessingResult>,
    error_message: Option<String>,
    current_attempt: Option<AttemptId>,
    next_attempt: u64,
}

impl SubmissionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SubmissionState {
        self.state
    }

    pub fn result(&self) -> Option<&ProcessingResult> {
        self.result.as_ref()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn is_in_flight(&self) -> bool {
        self.state == SubmissionState::InFlight
    }

    /// Validates the selection and, if accepted, moves to `InFlight` and
    /// returns the request to dispatch. Rejections never change state.
    pub fn begin(
        &mut self,
        selection: &ChannelSelection,
        palette: Palette,
    ) -> Result<PendingSubmission, SubmitError> {
        if self.is_in_flight() {
            warn!("submit ignored: a colorize request is already in flight");
            return Err(SubmitError::AlreadyInFlight);
        }

        let channels = match selection.snapshot() {
            Ok(channels) => channels,
            Err(missing) => {
                info!(?missing, "submit rejected: incomplete channel selection");
                self.error_message = Some(MISSING_CHANNEL_MESSAGE.to_string());
                return Err(SubmitError::MissingChannels(missing));
            }
        };

        self.next_attempt += 1;
        let attempt = AttemptId(self.next_attempt);
        self.error_message = None;
        self.result = None;
        self.current_attempt = Some(attempt);
        self.state = SubmissionState::InFlight;
        info!(attempt = attempt.0, %palette, "submission in flight");

        Ok(PendingSubmission {
            attempt,
            request: ColorizeRequest { channels, palette },
        })
    }

    pub fn on_success(
        &mut self,
        attempt: AttemptId,
        response: ColorizeResponse,
    ) -> Option<Completion> {
        self.take_current(attempt)?;
        let result = ProcessingResult::from(response);
        info!(
            attempt = attempt.0,
            image = %result.image,
            metadata_entries = result.metadata.len(),
            "submission succeeded"
        );
        self.result = Some(result);
        self.state = SubmissionState::Succeeded;
        Some(Completion {
            attempt,
            outcome: Outcome::Succeeded,
        })
    }

    pub fn on_failure(&mut self, attempt: AttemptId, error: &ColorizeError) -> Option<Completion> {
        self.take_current(attempt)?;
        warn!(attempt = attempt.0, "submission failed: {error}");
        self.error_message = Some(error.user_message());
        self.state = SubmissionState::Failed;
        Some(Completion {
            attempt,
            outcome: Outcome::Failed,
        })
    }

    pub fn complete(
        &mut self,
        attempt: AttemptId,
        outcome: Result<ColorizeResponse, ColorizeError>,
    ) -> Option<Completion> {
        match outcome {
            Ok(response) => self.on_success(attempt, response),
            Err(error) => self.on_failure(attempt, &error),
        }
    }

    fn take_current(&mut self, attempt: AttemptId) -> Option<AttemptId> {
        if self.state != SubmissionState::InFlight || self.current_attempt != Some(attempt) {
            warn!(
                attempt = attempt.0,
                state = ?self.state,
                "ignoring outcome for an attempt that is not in flight"
            );
            return None;
        }
        self.current_attempt.take()
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;

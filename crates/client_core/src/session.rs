//! One operator session: selection, palette, controller, history and theme
//! wired to the services.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use shared::{
    domain::{ColorChannel, Palette},
    protocol::{ColorizeResponse, ImageRef},
};
use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::{
    controller::{AttemptId, PendingSubmission, ProcessingResult, SubmissionController, SubmissionState},
    error::{ColorizeError, ExportError, SubmitError},
    history::HistorySync,
    projection::{export_image, ResultView},
    selection::{ChannelFile, ChannelSelection},
    theme::{NoopThemeSurface, Theme, ThemeSurface},
    transport::{HistoryService, HttpServiceClient, ProcessingService},
};

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    StateChanged(SubmissionState),
    SubmissionRejected(SubmitError),
    ResultReady {
        image: ImageRef,
        metadata_entries: usize,
    },
    SubmissionFailed(String),
    HistoryUpdated {
        entries: usize,
    },
    ThemeChanged(Theme),
}

pub struct ColorizeSession {
    processing: Arc<dyn ProcessingService>,
    selection: ChannelSelection,
    palette: Palette,
    controller: SubmissionController,
    history: HistorySync,
    theme: Theme,
    theme_surface: Box<dyn ThemeSurface>,
    events: broadcast::Sender<SessionEvent>,
}

impl ColorizeSession {
    pub fn new(
        processing: Arc<dyn ProcessingService>,
        history_service: Arc<dyn HistoryService>,
    ) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            processing,
            selection: ChannelSelection::new(),
            palette: Palette::default(),
            controller: SubmissionController::new(),
            history: HistorySync::new(history_service),
            theme: Theme::default(),
            theme_surface: Box::new(NoopThemeSurface::default()),
            events,
        }
    }

    pub fn from_http(client: HttpServiceClient) -> Self {
        let client = Arc::new(client);
        Self::new(client.clone(), client)
    }

    pub fn with_theme_surface(mut self, surface: Box<dyn ThemeSurface>) -> Self {
        self.theme_surface = surface;
        self
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// First display of the session: applies the theme and performs the one
    /// unconditional history read.
    pub async fn mount(&mut self) {
        self.theme_surface.apply(self.theme);
        if self.history.mount().await {
            self.emit(SessionEvent::HistoryUpdated {
                entries: self.history.entries().len(),
            });
        }
    }

    pub fn set_channel(&mut self, channel: ColorChannel, file: ChannelFile) {
        debug!(%channel, file = file.filename(), "channel selected");
        self.selection.set(channel, file);
    }

    pub fn clear_channel(&mut self, channel: ColorChannel) {
        self.selection.clear(channel);
    }

    pub fn selection(&self) -> &ChannelSelection {
        &self.selection
    }

    pub fn set_palette(&mut self, palette: Palette) {
        self.palette = palette;
    }

    pub fn palette(&self) -> Palette {
        self.palette
    }

    pub fn state(&self) -> SubmissionState {
        self.controller.state()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.controller.error_message()
    }

    pub fn result(&self) -> Option<&ProcessingResult> {
        self.controller.result()
    }

    pub fn view(&self) -> ResultView<'_> {
        ResultView::project(self.controller.state(), self.controller.result())
    }

    pub fn history(&self) -> &HistorySync {
        &self.history
    }

    /// The processing service, for drivers that await the request themselves
    /// between [`begin_colorize`](Self::begin_colorize) and
    /// [`finish_colorize`](Self::finish_colorize).
    pub fn processing(&self) -> Arc<dyn ProcessingService> {
        self.processing.clone()
    }

    /// Submit half of the split API. The returned request is a snapshot;
    /// later channel changes only affect the next submission.
    pub fn begin_colorize(&mut self) -> Result<PendingSubmission, SubmitError> {
        match self.controller.begin(&self.selection, self.palette) {
            Ok(pending) => {
                self.emit(SessionEvent::StateChanged(SubmissionState::InFlight));
                Ok(pending)
            }
            Err(err) => {
                self.emit(SessionEvent::SubmissionRejected(err.clone()));
                Err(err)
            }
        }
    }

    /// Completion half of the split API: records the outcome and refreshes
    /// history once if the outcome belonged to the in-flight attempt.
    pub async fn finish_colorize(
        &mut self,
        attempt: AttemptId,
        outcome: Result<ColorizeResponse, ColorizeError>,
    ) -> SubmissionState {
        let Some(completion) = self.controller.complete(attempt, outcome) else {
            return self.controller.state();
        };

        let state = self.controller.state();
        self.emit(SessionEvent::StateChanged(state));
        if let Some(result) = self.controller.result() {
            self.emit(SessionEvent::ResultReady {
                image: result.image.clone(),
                metadata_entries: result.metadata.len(),
            });
        } else if let Some(message) = self.controller.error_message() {
            self.emit(SessionEvent::SubmissionFailed(message.to_string()));
        }

        if self.history.on_completion(completion).await {
            self.emit(SessionEvent::HistoryUpdated {
                entries: self.history.entries().len(),
            });
        }
        state
    }

    /// Submit and await the outcome in one step.
    pub async fn colorize(&mut self) -> SubmissionState {
        let pending = match self.begin_colorize() {
            Ok(pending) => pending,
            Err(_) => return self.controller.state(),
        };
        let outcome = self.processing.colorize(pending.request).await;
        self.finish_colorize(pending.attempt, outcome).await
    }

    /// Saves the current image into `dir`. Leaves every state field as is.
    pub async fn export(&self, dir: &Path) -> Result<PathBuf, ExportError> {
        let result = self.controller.result().ok_or(ExportError::NothingToExport)?;
        export_image(&result.image, dir).await
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn toggle_theme(&mut self) -> Theme {
        self.theme = self.theme.toggled();
        self.theme_surface.apply(self.theme);
        info!(theme = self.theme.class_name(), "theme changed");
        self.emit(SessionEvent::ThemeChanged(self.theme));
        self.theme
    }

    fn emit(&self, event: SessionEvent) {
        let _ = self.events.send(event);
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;

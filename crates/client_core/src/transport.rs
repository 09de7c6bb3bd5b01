//! Wire access to the processing and history services.

use async_trait::async_trait;
use reqwest::{
    multipart::{Form, Part},
    Client,
};
use shared::{
    domain::{ColorChannel, Palette},
    error::ErrorBody,
    protocol::{ColorizeResponse, HistoryEntry},
};
use tracing::{debug, info, warn};

use crate::{
    error::{ColorizeError, HistoryError},
    selection::ChannelSnapshot,
};

/// Everything one colorize call sends, frozen at submit time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorizeRequest {
    pub channels: ChannelSnapshot,
    pub palette: Palette,
}

impl ColorizeRequest {
    pub fn input_summary(&self) -> String {
        ColorChannel::ALL
            .iter()
            .map(|channel| self.channels.get(*channel).filename())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[async_trait]
pub trait ProcessingService: Send + Sync {
    async fn colorize(&self, request: ColorizeRequest) -> Result<ColorizeResponse, ColorizeError>;
}

#[async_trait]
pub trait HistoryService: Send + Sync {
    async fn fetch_history(&self) -> Result<Vec<HistoryEntry>, HistoryError>;
}

/// reqwest-backed client for both services, which share one base address.
#[derive(Clone)]
pub struct HttpServiceClient {
    http: Client,
    server_url: String,
}

impl HttpServiceClient {
    pub fn new(server_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), server_url)
    }

    pub fn with_client(http: Client, server_url: impl Into<String>) -> Self {
        let server_url = server_url.into().trim_end_matches('/').to_string();
        Self { http, server_url }
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    fn build_form(request: &ColorizeRequest) -> Result<Form, ColorizeError> {
        let mut form = Form::new();
        for channel in ColorChannel::ALL {
            let file = request.channels.get(channel);
            let part = Part::bytes(file.content().to_vec())
                .file_name(file.filename().to_string())
                .mime_str("application/octet-stream")?;
            form = form.part(channel.form_field(), part);
        }
        Ok(form.text("palette", request.palette.id()))
    }
}

#[async_trait]
impl ProcessingService for HttpServiceClient {
    async fn colorize(&self, request: ColorizeRequest) -> Result<ColorizeResponse, ColorizeError> {
        let form = Self::build_form(&request)?;
        info!(
            palette = %request.palette,
            inputs = %request.input_summary(),
            "colorize: dispatching request"
        );
        let res = self
            .http
            .post(format!("{}/colorize-layers", self.server_url))
            .multipart(form)
            .send()
            .await?;

        let status = res.status();
        if status.is_success() {
            let body: ColorizeResponse = res.json().await?;
            debug!(
                metadata_entries = body.metadata.len(),
                "colorize: response decoded"
            );
            return Ok(body);
        }

        let message = match res.json::<ErrorBody>().await {
            Ok(body) => body.message().map(str::to_string),
            Err(err) => {
                warn!("colorize: unreadable error body status={status}: {err}");
                None
            }
        };
        Err(ColorizeError::Service {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl HistoryService for HttpServiceClient {
    async fn fetch_history(&self) -> Result<Vec<HistoryEntry>, HistoryError> {
        let res = self
            .http
            .get(format!("{}/history", self.server_url))
            .send()
            .await?;
        let status = res.status();
        if !status.is_success() {
            return Err(HistoryError::Status(status.as_u16()));
        }
        Ok(res.json().await?)
    }
}

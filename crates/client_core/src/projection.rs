//! Display projection of the latest result, and local export.

use std::path::{Path, PathBuf};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::Value;
use shared::protocol::{ImageRef, Metadata};
use tracing::info;
use url::Url;

use crate::{
    controller::{ProcessingResult, SubmissionState},
    error::ExportError,
};

pub const METADATA_PREVIEW_LEN: usize = 15;
pub const FALLBACK_EXPORT_NAME: &str = "processed-image.png";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImagePane<'a> {
    Loading,
    Image(&'a ImageRef),
    Placeholder,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataPreview {
    pub entries: Vec<(String, String)>,
    pub total: usize,
}

impl MetadataPreview {
    pub fn from_metadata(metadata: &Metadata) -> Self {
        let entries = metadata
            .iter()
            .take(METADATA_PREVIEW_LEN)
            .map(|(key, value)| (key.clone(), display_value(value)))
            .collect();
        Self {
            entries,
            total: metadata.len(),
        }
    }

    /// True when entries beyond the preview exist ("...and more").
    pub fn truncated(&self) -> bool {
        self.total > self.entries.len()
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// What the surface renders for the current controller state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultView<'a> {
    pub pane: ImagePane<'a>,
    pub metadata: Option<MetadataPreview>,
    pub can_export: bool,
}

impl<'a> ResultView<'a> {
    pub fn project(state: SubmissionState, result: Option<&'a ProcessingResult>) -> Self {
        let pane = match (state, result) {
            (SubmissionState::InFlight, _) => ImagePane::Loading,
            (_, Some(result)) => ImagePane::Image(&result.image),
            (_, None) => ImagePane::Placeholder,
        };
        Self {
            pane,
            metadata: result.map(|result| MetadataPreview::from_metadata(&result.metadata)),
            can_export: result.is_some(),
        }
    }
}

/// Local file name for an image reference. `data:` URLs carry none.
pub fn derive_filename(image: &ImageRef) -> String {
    if image.is_data_url() {
        return FALLBACK_EXPORT_NAME.to_string();
    }
    let raw = image.as_str();
    let path = match Url::parse(raw) {
        Ok(url) => url.path().to_string(),
        Err(_) => raw.split(|c: char| c == '?' || c == '#').next().unwrap_or_default().to_string(),
    };
    path.rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .map(str::trim)
        .filter(|name| !name.is_empty() && *name != "." && *name != "..")
        .map(str::to_string)
        .unwrap_or_else(|| FALLBACK_EXPORT_NAME.to_string())
}

/// Writes the image into `dir` under its derived name. No network access:
/// remote references are refused.
pub async fn export_image(image: &ImageRef, dir: &Path) -> Result<PathBuf, ExportError> {
    let bytes = resolve_local_bytes(image).await?;
    let target = dir.join(derive_filename(image));
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|source| ExportError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    tokio::fs::write(&target, &bytes)
        .await
        .map_err(|source| ExportError::Io {
            path: target.clone(),
            source,
        })?;
    info!(path = %target.display(), bytes = bytes.len(), "exported image");
    Ok(target)
}

async fn resolve_local_bytes(image: &ImageRef) -> Result<Vec<u8>, ExportError> {
    if image.is_data_url() {
        return decode_data_url(image.as_str());
    }
    let source = match Url::parse(image.as_str()) {
        Ok(url) if url.scheme() == "file" => url
            .to_file_path()
            .map_err(|_| ExportError::RemoteReference(image.to_string()))?,
        // Single-letter schemes are Windows drive letters.
        Ok(url) if url.scheme().len() > 1 => {
            return Err(ExportError::RemoteReference(image.to_string()))
        }
        _ => PathBuf::from(image.as_str()),
    };
    match tokio::fs::read(&source).await {
        Ok(bytes) => Ok(bytes),
        Err(err) => Err(ExportError::Io {
            path: source,
            source: err,
        }),
    }
}

fn decode_data_url(raw: &str) -> Result<Vec<u8>, ExportError> {
    let (header, payload) = raw
        .split_once(',')
        .ok_or_else(|| ExportError::MalformedDataUrl("missing ',' separator".to_string()))?;
    if !header.to_ascii_lowercase().ends_with(";base64") {
        return Err(ExportError::MalformedDataUrl(format!(
            "unsupported encoding in '{header}'"
        )));
    }
    STANDARD
        .decode(payload.trim())
        .map_err(|err| ExportError::MalformedDataUrl(err.to_string()))
}

#[cfg(test)]
#[path = "tests/projection_tests.rs"]
mod tests;

//! Channel selection store: the three user-picked input files.

use std::{path::Path, sync::Arc};

use anyhow::{Context, Result};
use shared::domain::ColorChannel;
use tracing::{debug, warn};

const ACCEPTED_EXTENSIONS: [&str; 2] = ["fits", "fit"];

/// Opaque handle to one picked source file. Content is shared and immutable,
/// so cloning into a request snapshot is cheap and later slot replacement
/// cannot reach into it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelFile {
    filename: String,
    content: Arc<[u8]>,
}

impl ChannelFile {
    pub fn new(filename: impl Into<String>, content: impl Into<Arc<[u8]>>) -> Self {
        Self {
            filename: filename.into(),
            content: content.into(),
        }
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .with_context(|| format!("'{}' has no file name", path.display()))?;
        if !has_accepted_extension(path) {
            warn!(file = %path.display(), "channel file does not look like FITS (.fits/.fit)");
        }
        let content = tokio::fs::read(path)
            .await
            .with_context(|| format!("failed to read channel file '{}'", path.display()))?;
        debug!(file = %path.display(), bytes = content.len(), "loaded channel file");
        Ok(Self::new(filename, content))
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

fn has_accepted_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            ACCEPTED_EXTENSIONS
                .iter()
                .any(|accepted| ext.eq_ignore_ascii_case(accepted))
        })
}

/// All three files, taken at one instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelSnapshot {
    pub red: ChannelFile,
    pub green: ChannelFile,
    pub blue: ChannelFile,
}

impl ChannelSnapshot {
    pub fn get(&self, channel: ColorChannel) -> &ChannelFile {
        match channel {
            ColorChannel::Red => &self.red,
            ColorChannel::Green => &self.green,
            ColorChannel::Blue => &self.blue,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ChannelSelection {
    red: Option<ChannelFile>,
    green: Option<ChannelFile>,
    blue: Option<ChannelFile>,
}

impl ChannelSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces one slot. Returns the file previously held there.
    pub fn set(&mut self, channel: ColorChannel, file: ChannelFile) -> Option<ChannelFile> {
        self.slot_mut(channel).replace(file)
    }

    pub fn clear(&mut self, channel: ColorChannel) -> Option<ChannelFile> {
        self.slot_mut(channel).take()
    }

    pub fn get(&self, channel: ColorChannel) -> Option<&ChannelFile> {
        match channel {
            ColorChannel::Red => self.red.as_ref(),
            ColorChannel::Green => self.green.as_ref(),
            ColorChannel::Blue => self.blue.as_ref(),
        }
    }

    pub fn missing(&self) -> Vec<ColorChannel> {
        ColorChannel::ALL
            .into_iter()
            .filter(|channel| self.get(*channel).is_none())
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing().is_empty()
    }

    /// Copies the three files out, or names the empty slots.
    pub fn snapshot(&self) -> Result<ChannelSnapshot, Vec<ColorChannel>> {
        match (&self.red, &self.green, &self.blue) {
            (Some(red), Some(green), Some(blue)) => Ok(ChannelSnapshot {
                red: red.clone(),
                green: green.clone(),
                blue: blue.clone(),
            }),
            _ => Err(self.missing()),
        }
    }

    fn slot_mut(&mut self, channel: ColorChannel) -> &mut Option<ChannelFile> {
        match channel {
            ColorChannel::Red => &mut self.red,
            ColorChannel::Green => &mut self.green,
            ColorChannel::Blue => &mut self.blue,
        }
    }
}

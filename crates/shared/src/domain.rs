use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::UnknownPalette;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorChannel {
    Red,
    Green,
    Blue,
}

impl ColorChannel {
    pub const ALL: [ColorChannel; 3] = [ColorChannel::Red, ColorChannel::Green, ColorChannel::Blue];

    /// Multipart field name the processing service expects for this channel.
    pub fn form_field(self) -> &'static str {
        match self {
            ColorChannel::Red => "red_file",
            ColorChannel::Green => "green_file",
            ColorChannel::Blue => "blue_file",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ColorChannel::Red => "Red Channel",
            ColorChannel::Green => "Green Channel",
            ColorChannel::Blue => "Blue Channel",
        }
    }
}

impl fmt::Display for ColorChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColorChannel::Red => "red",
            ColorChannel::Green => "green",
            ColorChannel::Blue => "blue",
        };
        f.write_str(name)
    }
}

/// Which source channel index feeds each output color. Descriptive only; the
/// client forwards the palette id and never interprets the mapping itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelMapping {
    pub red_channel: u8,
    pub green_channel: u8,
    pub blue_channel: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Palette {
    Hubble,
    #[default]
    Natural,
    Custom,
}

impl Palette {
    pub const ALL: [Palette; 3] = [Palette::Hubble, Palette::Natural, Palette::Custom];

    pub fn id(self) -> &'static str {
        match self {
            Palette::Hubble => "hubble",
            Palette::Natural => "natural",
            Palette::Custom => "custom",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Palette::Hubble => "Hubble Palette (SHO)",
            Palette::Natural => "Natural Color (RGB)",
            Palette::Custom => "Custom BGR",
        }
    }

    pub fn mapping(self) -> ChannelMapping {
        let (red_channel, green_channel, blue_channel) = match self {
            Palette::Hubble => (2, 0, 1),
            Palette::Natural => (0, 1, 2),
            Palette::Custom => (2, 1, 0),
        };
        ChannelMapping {
            red_channel,
            green_channel,
            blue_channel,
        }
    }
}

impl fmt::Display for Palette {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Palette {
    type Err = UnknownPalette;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let needle = value.trim();
        Palette::ALL
            .into_iter()
            .find(|palette| palette.id().eq_ignore_ascii_case(needle))
            .ok_or_else(|| UnknownPalette(value.to_string()))
    }
}

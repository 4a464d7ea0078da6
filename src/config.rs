//! Configuration persistence for snapmark settings

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

/// RGBA pen color, stored in config files as `#RRGGBB` or `#RRGGBBAA`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ShapeColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Default for ShapeColor {
    fn default() -> Self {
        // #FF0000
        Self::rgb(255, 0, 0)
    }
}

impl ShapeColor {
    /// Opaque color from RGB components
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Convert to image crate RGBA format
    pub fn to_rgba_u8(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl FromStr for ShapeColor {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let hex = s.trim().trim_start_matches('#');
        if !hex.is_ascii() || (hex.len() != 6 && hex.len() != 8) {
            bail!("invalid color '{s}', expected #RRGGBB or #RRGGBBAA");
        }
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .with_context(|| format!("invalid color '{s}'"))
        };
        let a = if hex.len() == 8 { channel(6)? } else { 255 };
        Ok(Self {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
            a,
        })
    }
}

impl TryFrom<String> for ShapeColor {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<ShapeColor> for String {
    fn from(c: ShapeColor) -> Self {
        c.to_string()
    }
}

impl fmt::Display for ShapeColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)?;
        if self.a != 255 {
            write!(f, "{:02X}", self.a)?;
        }
        Ok(())
    }
}

/// Annotation tool selected in the editor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    #[default]
    Arrow,
    Rectangle,
    Text,
}

impl Tool {
    /// Whether this tool is driven by a pointer drag (as opposed to typing)
    pub fn is_drag_tool(self) -> bool {
        matches!(self, Tool::Arrow | Tool::Rectangle)
    }
}

/// Save location for screenshots (Pictures or Documents)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SaveLocation {
    #[default]
    Pictures,
    Documents,
}

impl SaveLocation {
    /// Resolve the directory, falling back to a folder under the home directory
    pub fn dir(self) -> Option<PathBuf> {
        match self {
            SaveLocation::Pictures => {
                dirs::picture_dir().or_else(|| dirs::home_dir().map(|h| h.join("Pictures")))
            }
            SaveLocation::Documents => {
                dirs::document_dir().or_else(|| dirs::home_dir().map(|h| h.join("Documents")))
            }
        }
    }
}

/// Raster output format for flattened screenshots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    #[default]
    Png,
    Jpeg,
}

impl ImageFormat {
    /// Get file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpg",
        }
    }

    /// Infer the format from a file extension, PNG when unknown or missing
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("jpg") | Some("jpeg") => ImageFormat::Jpeg,
            _ => ImageFormat::Png,
        }
    }
}

/// Video container format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Container {
    #[default]
    Mp4,
    Webm,
    Mkv,
}

impl Container {
    /// Get file extension for this container
    pub fn extension(&self) -> &'static str {
        match self {
            Container::Mp4 => "mp4",
            Container::Webm => "webm",
            Container::Mkv => "mkv",
        }
    }

    /// Get GStreamer muxer element name
    #[cfg_attr(not(feature = "screencast"), allow(dead_code))]
    pub fn muxer_element(&self) -> &'static str {
        match self {
            Container::Mp4 => "mp4mux",
            Container::Webm => "webmmux",
            Container::Mkv => "matroskamux",
        }
    }
}

/// Capture delays offered to the user, in seconds
pub const CAPTURE_DELAYS: [u32; 4] = [0, 3, 5, 10];

/// Application configuration persisted between sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapmarkConfig {
    /// Pen color for new annotations
    pub pen_color: ShapeColor,
    /// Stroke width for arrows and rectangles
    pub stroke_width: f32,
    /// Glyph height for text annotations
    pub font_size: f32,
    /// Tool active when the editor opens
    pub default_tool: Tool,
    /// Where to save screenshots (Pictures or Documents folder)
    pub save_location: SaveLocation,
    /// Format used when the output path does not decide it
    pub image_format: ImageFormat,
    /// Seconds to wait before capturing
    pub capture_delay: u32,
    /// Recording framerate
    pub video_framerate: u32,
    /// Video container format
    pub video_container: Container,
    /// Video encoder to use (None = auto-detect hardware encoder)
    pub video_encoder: Option<String>,
}

impl Default for SnapmarkConfig {
    fn default() -> Self {
        Self {
            pen_color: ShapeColor::default(),
            stroke_width: 2.0,
            font_size: 12.0,
            default_tool: Tool::Arrow,
            save_location: SaveLocation::Pictures,
            image_format: ImageFormat::Png,
            capture_delay: 0,
            video_framerate: 30,
            video_container: Container::Mp4,
            video_encoder: None,
        }
    }
}

impl SnapmarkConfig {
    /// Application directory name under the platform config dir
    pub const ID: &'static str = "snapmark";

    /// Default location of the config file
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(Self::ID).join("config.json"))
    }

    /// Load configuration from disk, or return defaults if unavailable
    pub fn load() -> Self {
        match Self::path() {
            Some(path) => Self::load_from(&path),
            None => {
                log::warn!("Could not determine config directory, using defaults");
                Self::default()
            }
        }
    }

    /// Load configuration from a specific file, or return defaults if unavailable
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match Self::read(path) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("Error loading config, using defaults: {:?}", err);
                Self::default()
            }
        }
    }

    fn read(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Save configuration to a specific file, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config dir: {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_parse_and_display() {
        let c: ShapeColor = "#FF0000".parse().unwrap();
        assert_eq!(c, ShapeColor::rgb(255, 0, 0));
        assert_eq!(c.to_string(), "#FF0000");

        let c: ShapeColor = "00ff0080".parse().unwrap();
        assert_eq!(c.to_rgba_u8(), [0, 255, 0, 128]);
        assert_eq!(c.to_string(), "#00FF0080");

        assert!("#12345".parse::<ShapeColor>().is_err());
        assert!("#GG0000".parse::<ShapeColor>().is_err());
    }

    #[test]
    fn test_drag_tools() {
        assert!(Tool::Arrow.is_drag_tool());
        assert!(Tool::Rectangle.is_drag_tool());
        assert!(!Tool::Text.is_drag_tool());
    }

    #[test]
    fn test_image_format_from_path() {
        assert_eq!(ImageFormat::from_path(Path::new("a.png")), ImageFormat::Png);
        assert_eq!(ImageFormat::from_path(Path::new("a.JPG")), ImageFormat::Jpeg);
        assert_eq!(ImageFormat::from_path(Path::new("a.jpeg")), ImageFormat::Jpeg);
        assert_eq!(ImageFormat::from_path(Path::new("noext")), ImageFormat::Png);
    }

    #[test]
    fn test_config_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = SnapmarkConfig {
            pen_color: ShapeColor::rgb(0, 128, 255),
            stroke_width: 5.0,
            default_tool: Tool::Text,
            video_container: Container::Mkv,
            ..Default::default()
        };
        config.save_to(&path).unwrap();

        assert_eq!(SnapmarkConfig::load_from(&path), config);
    }

    #[test]
    fn test_config_missing_fields_use_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r##"{ "pen_color": "#00FF00", "default_tool": "rectangle" }"##).unwrap();

        let config = SnapmarkConfig::load_from(&path);
        assert_eq!(config.pen_color, ShapeColor::rgb(0, 255, 0));
        assert_eq!(config.default_tool, Tool::Rectangle);
        assert_eq!(config.stroke_width, 2.0);
        assert_eq!(config.video_framerate, 30);
    }

    #[test]
    fn test_config_invalid_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "not json").unwrap();

        assert_eq!(SnapmarkConfig::load_from(&path), SnapmarkConfig::default());
        assert_eq!(
            SnapmarkConfig::load_from(&dir.path().join("missing.json")),
            SnapmarkConfig::default()
        );
    }
}

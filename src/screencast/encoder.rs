//! Video encoder detection and selection
//!
//! Hardware encoders are preferred over software ones, and only encoders
//! whose codec the chosen container can hold are considered.

use anyhow::Result;

use crate::config::Container;

/// Codec type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Codec {
    H264,
    H265,
    VP8,
    VP9,
}

impl Codec {
    pub fn name(&self) -> &'static str {
        match self {
            Codec::H264 => "H.264",
            Codec::H265 => "H.265",
            Codec::VP8 => "VP8",
            Codec::VP9 => "VP9",
        }
    }

    /// Whether `container` can hold a stream of this codec
    pub fn fits(&self, container: Container) -> bool {
        match container {
            Container::Mp4 => matches!(self, Codec::H264 | Codec::H265),
            Container::Webm => matches!(self, Codec::VP8 | Codec::VP9),
            Container::Mkv => true,
        }
    }
}

/// Information about an encoder element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncoderInfo {
    /// Human-readable name (e.g., "VA-API H.264")
    pub name: &'static str,
    /// GStreamer element name (e.g., "vaapih264enc")
    pub gst_element: &'static str,
    pub codec: Codec,
    pub hardware: bool,
    /// Lower is better
    pub priority: u8,
}

impl EncoderInfo {
    /// Display name with hardware/software indicator
    pub fn display_name(&self) -> String {
        let kind = if self.hardware { "Hardware" } else { "Software" };
        format!("{} ({})", self.name, kind)
    }
}

const fn encoder(
    name: &'static str,
    gst_element: &'static str,
    codec: Codec,
    hardware: bool,
    priority: u8,
) -> EncoderInfo {
    EncoderInfo {
        name,
        gst_element,
        codec,
        hardware,
        priority,
    }
}

/// Every encoder snapmark knows how to drive, best first
pub const CANDIDATES: [EncoderInfo; 9] = [
    // VA-API (Intel/AMD)
    encoder("VA-API H.264", "vaapih264enc", Codec::H264, true, 10),
    encoder("VA-API H.265", "vaapih265enc", Codec::H265, true, 11),
    encoder("VA-API VP9", "vaapivp9enc", Codec::VP9, true, 12),
    // NVENC (NVIDIA)
    encoder("NVENC H.264", "nvh264enc", Codec::H264, true, 20),
    encoder("NVENC H.265", "nvh265enc", Codec::H265, true, 21),
    // Software fallbacks
    encoder("x264 H.264", "x264enc", Codec::H264, false, 100),
    encoder("OpenH264", "openh264enc", Codec::H264, false, 101),
    encoder("VP9", "vp9enc", Codec::VP9, false, 102),
    encoder("VP8", "vp8enc", Codec::VP8, false, 103),
];

/// Pick the encoder to use for `container`
///
/// `requested` names a GStreamer element and wins when it is available and
/// fits the container; otherwise the best available candidate is used.
pub fn select_encoder(
    container: Container,
    requested: Option<&str>,
    available: impl Fn(&str) -> bool,
) -> Result<EncoderInfo> {
    let usable = CANDIDATES
        .iter()
        .filter(|e| e.codec.fits(container) && available(e.gst_element));

    if let Some(requested) = requested {
        if let Some(found) = usable.clone().find(|e| e.gst_element == requested) {
            return Ok(found.clone());
        }
        log::warn!(
            "Encoder '{}' is not available for {:?}, picking automatically",
            requested,
            container
        );
    }

    usable.min_by_key(|e| e.priority).cloned().ok_or_else(|| {
        anyhow::anyhow!(
            "No video encoder available for {:?}. Install GStreamer plugins for H.264 or VP9.",
            container
        )
    })
}

/// Detect available encoders for `container` and pick one
#[cfg(feature = "screencast")]
pub fn best_encoder(container: Container, requested: Option<&str>) -> Result<EncoderInfo> {
    use anyhow::Context;
    use gstreamer as gst;

    gst::init().context("Failed to initialize GStreamer")?;
    select_encoder(container, requested, |element| {
        gst::ElementFactory::find(element).is_some()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codec_name() {
        assert_eq!(Codec::H264.name(), "H.264");
        assert_eq!(Codec::H265.name(), "H.265");
        assert_eq!(Codec::VP8.name(), "VP8");
        assert_eq!(Codec::VP9.name(), "VP9");
    }

    #[test]
    fn test_encoder_info_display_name() {
        assert_eq!(CANDIDATES[0].display_name(), "VA-API H.264 (Hardware)");
        assert_eq!(CANDIDATES[5].display_name(), "x264 H.264 (Software)");
    }

    #[test]
    fn test_candidates_sorted_by_priority() {
        for pair in CANDIDATES.windows(2) {
            assert!(pair[0].priority < pair[1].priority);
        }
    }

    #[test]
    fn test_hardware_preferred() {
        let chosen = select_encoder(Container::Mp4, None, |_| true).unwrap();
        assert_eq!(chosen.gst_element, "vaapih264enc");

        let chosen = select_encoder(Container::Mp4, None, |e| e.ends_with("264enc") && !e.starts_with("vaapi")).unwrap();
        assert_eq!(chosen.gst_element, "nvh264enc");
    }

    #[test]
    fn test_container_filters_codecs() {
        let chosen = select_encoder(Container::Webm, None, |_| true).unwrap();
        assert_eq!(chosen.codec, Codec::VP9);

        let only_x264 = |e: &str| e == "x264enc";
        assert!(select_encoder(Container::Webm, None, only_x264).is_err());
        assert_eq!(
            select_encoder(Container::Mkv, None, only_x264).unwrap().gst_element,
            "x264enc"
        );
    }

    #[test]
    fn test_requested_encoder() {
        let chosen = select_encoder(Container::Mp4, Some("x264enc"), |_| true).unwrap();
        assert_eq!(chosen.gst_element, "x264enc");

        // Unusable request falls back to automatic choice
        let chosen = select_encoder(Container::Mp4, Some("vp8enc"), |_| true).unwrap();
        assert_eq!(chosen.gst_element, "vaapih264enc");
    }
}

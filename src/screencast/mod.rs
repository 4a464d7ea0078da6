//! Screen recording functionality
//!
//! Frames are captured on a background thread and encoded with GStreamer.
//! The recording never touches the annotation editor.

pub mod encoder;
#[cfg(feature = "screencast")]
mod pipeline;
mod recorder;

use anyhow::Result;
use image::RgbaImage;

pub use recorder::{Recording, RecordingSummary, start_recording};

/// Something that produces screen frames
pub trait FrameSource {
    fn grab(&mut self) -> Result<RgbaImage>;
}

/// Something that consumes frames of a fixed size
pub trait FrameSink {
    /// Accept one frame; `timestamp` is in nanoseconds from the first frame
    fn push_frame(&mut self, frame: &RgbaImage, timestamp: u64) -> Result<()>;

    /// Flush and close the output
    fn finish(&mut self) -> Result<()>;
}

#[cfg(all(feature = "capture", feature = "screencast"))]
pub use screen::ScreenRecording;

#[cfg(all(feature = "capture", feature = "screencast"))]
mod screen {
    use anyhow::{Context, Result};
    use std::path::{Path, PathBuf};
    use std::time::Duration;
    use tempfile::TempPath;

    use super::encoder::best_encoder;
    use super::pipeline::Pipeline;
    use super::{Recording, RecordingSummary, start_recording};
    use crate::capture::image::PrimaryMonitor;
    use crate::config::SnapmarkConfig;

    /// A recording of the primary monitor into a video file
    ///
    /// Frames go to a hidden temporary file next to the destination, which
    /// is moved into place when the recording finishes successfully and
    /// removed otherwise.
    pub struct ScreenRecording {
        recording: Recording,
        temp_path: TempPath,
        destination: PathBuf,
    }

    impl ScreenRecording {
        pub fn start(destination: &Path, config: &SnapmarkConfig) -> Result<Self> {
            let container = config.video_container;
            let encoder = best_encoder(container, config.video_encoder.as_deref())?;
            log::info!(
                "Using encoder: {} [{}]",
                encoder.display_name(),
                encoder.codec.name()
            );

            let dir = match destination.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent,
                _ => Path::new("."),
            };
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
            let temp_path = tempfile::Builder::new()
                .prefix(".snapmark-recording-")
                .suffix(&format!(".{}", container.extension()))
                .tempfile_in(dir)
                .with_context(|| format!("Failed to create temporary file in {}", dir.display()))?
                .into_temp_path();

            let output = temp_path.to_path_buf();
            let framerate = config.video_framerate;
            let recording = start_recording(
                PrimaryMonitor::open,
                move |width, height| {
                    Pipeline::new(&encoder, container, &output, width, height, framerate)
                },
                framerate,
            )?;

            Ok(Self {
                recording,
                temp_path,
                destination: destination.to_path_buf(),
            })
        }

        /// Outcome of a recording that ended on its own, if it has
        pub fn poll(&mut self, timeout: Duration) -> Option<Result<RecordingSummary>> {
            self.recording.wait_timeout(timeout)
        }

        /// Stop recording and move the video to its destination
        pub fn finish(self) -> Result<PathBuf> {
            let summary = self.recording.finish()?;
            self.temp_path
                .persist(&self.destination)
                .with_context(|| format!("Failed to move recording to {}", self.destination.display()))?;
            log::info!(
                "Saved {} frames ({}x{}) to {}",
                summary.frames,
                summary.width,
                summary.height,
                self.destination.display()
            );
            Ok(self.destination)
        }
    }
}

/// Default timestamped path for a new recording
#[cfg(all(feature = "capture", feature = "screencast"))]
pub fn get_video_path(container: crate::config::Container) -> Option<std::path::PathBuf> {
    let mut path = dirs::video_dir().or_else(|| dirs::home_dir().map(|h| h.join("Videos")))?;
    let name = chrono::Local::now()
        .format("screen_recording_%Y%m%d_%H%M%S")
        .to_string();
    path.push(format!("{}.{}", name, container.extension()));
    Some(path)
}

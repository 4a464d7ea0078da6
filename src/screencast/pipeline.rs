//! GStreamer pipeline encoding captured frames to a video file

use anyhow::{Context, Result};
use gstreamer as gst;
use gstreamer::prelude::*;
use gstreamer_app as gst_app;
use image::RgbaImage;
use std::path::{Path, PathBuf};

use super::FrameSink;
use super::encoder::EncoderInfo;
use crate::config::Container;

/// `appsrc ! videoconvert ! <encoder> ! <muxer> ! filesink`
pub struct Pipeline {
    pipeline: gst::Pipeline,
    appsrc: gst_app::AppSrc,
    output_path: PathBuf,
}

impl Pipeline {
    /// Create a new encoding pipeline for raw RGBA frames of a fixed size
    pub fn new(
        encoder: &EncoderInfo,
        container: Container,
        output_path: &Path,
        width: u32,
        height: u32,
        framerate: u32,
    ) -> Result<Self> {
        gst::init().context("Failed to initialize GStreamer")?;

        log::info!(
            "Creating pipeline: {}x{} @ {} fps, encoder={}, container={:?}",
            width,
            height,
            framerate,
            encoder.gst_element,
            container
        );

        let location = output_path
            .to_str()
            .with_context(|| format!("Output path is not valid UTF-8: {}", output_path.display()))?;

        let pipeline = gst::Pipeline::new();

        let appsrc = gst_app::AppSrc::builder()
            .name("screen-source")
            .is_live(true)
            .format(gst::Format::Time)
            .build();

        let videoconvert = gst::ElementFactory::make("videoconvert")
            .build()
            .context("Failed to create videoconvert element")?;

        let encoder_elem = gst::ElementFactory::make(encoder.gst_element)
            .build()
            .with_context(|| format!("Failed to create encoder: {}", encoder.gst_element))?;

        let muxer = gst::ElementFactory::make(container.muxer_element())
            .build()
            .with_context(|| format!("Failed to create muxer: {}", container.muxer_element()))?;

        let filesink = gst::ElementFactory::make("filesink")
            .property("location", location)
            .build()
            .context("Failed to create filesink element")?;

        let elements = [
            appsrc.upcast_ref(),
            &videoconvert,
            &encoder_elem,
            &muxer,
            &filesink,
        ];
        pipeline.add_many(elements)?;
        gst::Element::link_many(elements)?;

        let caps = gst::Caps::builder("video/x-raw")
            .field("format", "RGBA")
            .field("width", width as i32)
            .field("height", height as i32)
            .field("framerate", gst::Fraction::new(framerate as i32, 1))
            .build();
        appsrc.set_caps(Some(&caps));

        pipeline
            .set_state(gst::State::Playing)
            .context("Failed to start pipeline")?;

        Ok(Self {
            pipeline,
            appsrc,
            output_path: output_path.to_path_buf(),
        })
    }

    /// Verify that the output file exists and has data
    fn verify_output(&self) -> Result<()> {
        let metadata = std::fs::metadata(&self.output_path).with_context(|| {
            format!("Output file was not created: {}", self.output_path.display())
        })?;

        if metadata.len() == 0 {
            anyhow::bail!("Output file is empty: {}", self.output_path.display());
        }

        log::info!(
            "Output file verified: {} ({} bytes)",
            self.output_path.display(),
            metadata.len()
        );
        Ok(())
    }
}

impl FrameSink for Pipeline {
    fn push_frame(&mut self, frame: &RgbaImage, timestamp: u64) -> Result<()> {
        let data = frame.as_raw();
        let mut buffer =
            gst::Buffer::with_size(data.len()).context("Failed to allocate GStreamer buffer")?;

        {
            let buffer_mut = buffer
                .get_mut()
                .context("Freshly allocated buffer is not writable")?;
            buffer_mut.set_pts(gst::ClockTime::from_nseconds(timestamp));
            let mut map = buffer_mut
                .map_writable()
                .context("Failed to map buffer for writing")?;
            map.copy_from_slice(data);
        }

        self.appsrc
            .push_buffer(buffer)
            .map_err(|_| anyhow::anyhow!("Failed to push buffer to pipeline"))?;
        Ok(())
    }

    /// Signal end of stream and finalize the video file
    fn finish(&mut self) -> Result<()> {
        log::info!("Sending EOS signal to pipeline...");
        self.appsrc
            .end_of_stream()
            .map_err(|_| anyhow::anyhow!("Failed to send EOS"))?;

        let bus = self.pipeline.bus().context("Pipeline has no bus")?;
        let mut eos_received = false;
        for msg in bus.iter_timed(gst::ClockTime::from_seconds(30)) {
            use gst::MessageView;
            match msg.view() {
                MessageView::Eos(..) => {
                    eos_received = true;
                    break;
                }
                MessageView::Error(err) => {
                    let _ = self.pipeline.set_state(gst::State::Null);
                    anyhow::bail!(
                        "Pipeline error: {} ({})",
                        err.error(),
                        err.debug().unwrap_or_default()
                    );
                }
                _ => {}
            }
        }

        if !eos_received {
            log::warn!("EOS timeout reached, forcing pipeline shutdown");
        }

        self.pipeline
            .set_state(gst::State::Null)
            .context("Failed to stop pipeline")?;

        self.verify_output()
    }
}

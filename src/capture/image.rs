//! Full-screen capture of the primary monitor

use anyhow::Result;
use image::RgbaImage;

/// Capture the primary monitor at native resolution
///
/// Falls back to the first monitor when none reports itself as primary.
/// Failures are reported once; the caller decides what to tell the user.
#[cfg(feature = "capture")]
pub fn capture_primary_monitor() -> Result<RgbaImage> {
    use anyhow::Context;

    let monitor = primary_monitor()?;
    let image = monitor
        .capture_image()
        .context("Screen capture failed")?;
    log::debug!("Captured screen: {}x{} pixels", image.width(), image.height());
    Ok(image)
}

#[cfg(not(feature = "capture"))]
pub fn capture_primary_monitor() -> Result<RgbaImage> {
    anyhow::bail!("snapmark was built without screen capture support")
}

#[cfg(feature = "capture")]
fn primary_monitor() -> Result<xcap::Monitor> {
    use anyhow::Context;

    let monitors = xcap::Monitor::all().context("Failed to enumerate monitors")?;
    let mut fallback = None;
    for monitor in monitors {
        if monitor.is_primary().unwrap_or(false) {
            return Ok(monitor);
        }
        fallback.get_or_insert(monitor);
    }
    fallback.context("No monitor found")
}

/// Frame source recording the primary monitor
#[cfg(feature = "capture")]
pub struct PrimaryMonitor {
    monitor: xcap::Monitor,
}

#[cfg(feature = "capture")]
impl PrimaryMonitor {
    pub fn open() -> Result<Self> {
        Ok(Self {
            monitor: primary_monitor()?,
        })
    }
}

#[cfg(feature = "capture")]
impl crate::screencast::FrameSource for PrimaryMonitor {
    fn grab(&mut self) -> Result<RgbaImage> {
        use anyhow::Context;

        self.monitor
            .capture_image()
            .context("Failed to capture frame")
    }
}

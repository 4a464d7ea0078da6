//! Command-line host
//!
//! Each subcommand performs one operation from start to finish: capture (or
//! load) an image, replay editor input, save. Errors bubble up to `main`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};

use crate::annotations::draw_session::DrawState;
use crate::capture::{countdown, image::capture_primary_monitor};
use crate::config::{CAPTURE_DELAYS, Container, ImageFormat, ShapeColor, SnapmarkConfig, Tool};
use crate::screenshot;
use crate::session::messages::{InputEvent, parse_script};
use crate::session::state::Editor;

#[derive(Parser, Debug)]
#[command(
    name = "snapmark",
    version,
    about = "Capture the screen, annotate it with arrows, rectangles and text, record video"
)]
pub struct Cli {
    /// Raise log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
    /// Read and write settings from this file instead of the default one
    #[arg(long, global = true)]
    pub config_file: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Default log filter for the requested verbosity
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Capture the primary monitor, optionally annotate it, and save it
    Shot(ShotArgs),
    /// Annotate an existing image file
    Annotate(AnnotateArgs),
    /// Record the primary monitor to a video file
    Record(RecordArgs),
    /// Show or change the saved settings
    Config(ConfigArgs),
}

#[derive(Args, Debug)]
pub struct ShotArgs {
    /// Seconds to wait before capturing (0, 3, 5 or 10)
    #[arg(long, value_parser = parse_delay)]
    delay: Option<u32>,
    /// JSON file of editor input events to apply before saving
    #[arg(long)]
    script: Option<PathBuf>,
    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Args, Debug)]
pub struct AnnotateArgs {
    /// Image to annotate
    input: PathBuf,
    /// JSON file of editor input events
    #[arg(long)]
    script: PathBuf,
    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Args, Debug)]
struct OutputArgs {
    /// Where to save (default: timestamped file in the configured folder)
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Image format (default: from the output extension, then the settings)
    #[arg(long, value_parser = parse_format)]
    format: Option<ImageFormat>,
    /// Also save what the editor shows at the end, unfinished item included
    #[arg(long)]
    preview: Option<PathBuf>,
}

impl OutputArgs {
    /// Format to save in: flag, then a recognised extension, then the settings
    fn format(&self, config: &SnapmarkConfig) -> ImageFormat {
        if let Some(format) = self.format {
            return format;
        }
        match self.output.as_deref() {
            Some(path) if path.extension().is_some() => ImageFormat::from_path(path),
            _ => config.image_format,
        }
    }

    fn path(&self, config: &SnapmarkConfig, format: ImageFormat) -> Result<PathBuf> {
        match &self.output {
            Some(path) => Ok(path.clone()),
            None => screenshot::get_img_path(config.save_location, format)
                .context("Could not determine a folder to save the screenshot in"),
        }
    }
}

#[derive(Args, Debug)]
pub struct RecordArgs {
    /// Stop after this many seconds (default: when Enter is pressed)
    #[arg(long)]
    seconds: Option<u64>,
    /// Frames per second
    #[arg(long)]
    fps: Option<u32>,
    /// Container format (mp4, webm or mkv)
    #[arg(long, value_parser = parse_container)]
    container: Option<Container>,
    /// Where to save (default: timestamped file in the Videos folder)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Restore every setting to its default
    #[arg(long, action = ArgAction::SetTrue)]
    reset: bool,
    /// Print the settings file location and exit
    #[arg(long, action = ArgAction::SetTrue)]
    path: bool,
    /// Pen color as #RRGGBB or #RRGGBBAA
    #[arg(long)]
    color: Option<ShapeColor>,
    #[arg(long)]
    stroke_width: Option<f32>,
    #[arg(long)]
    font_size: Option<f32>,
    /// Tool active when editing starts (arrow, rectangle or text)
    #[arg(long, value_parser = parse_tool)]
    tool: Option<Tool>,
    /// Default capture delay in seconds (0, 3, 5 or 10)
    #[arg(long, value_parser = parse_delay)]
    delay: Option<u32>,
    /// Default image format (png or jpeg)
    #[arg(long, value_parser = parse_format)]
    format: Option<ImageFormat>,
}

impl ConfigArgs {
    /// Apply requested changes; returns whether anything changed
    fn apply(&self, config: &mut SnapmarkConfig) -> bool {
        let before = config.clone();
        if self.reset {
            *config = SnapmarkConfig::default();
        }
        if let Some(color) = self.color {
            config.pen_color = color;
        }
        if let Some(width) = self.stroke_width {
            config.stroke_width = width;
        }
        if let Some(size) = self.font_size {
            config.font_size = size;
        }
        if let Some(tool) = self.tool {
            config.default_tool = tool;
        }
        if let Some(delay) = self.delay {
            config.capture_delay = delay;
        }
        if let Some(format) = self.format {
            config.image_format = format;
        }
        *config != before
    }
}

fn parse_delay(s: &str) -> Result<u32, String> {
    let delay: u32 = s.parse().map_err(|_| format!("'{s}' is not a number"))?;
    if CAPTURE_DELAYS.contains(&delay) {
        Ok(delay)
    } else {
        Err(format!("delay must be one of {CAPTURE_DELAYS:?}"))
    }
}

fn parse_format(s: &str) -> Result<ImageFormat, String> {
    match s.to_ascii_lowercase().as_str() {
        "png" => Ok(ImageFormat::Png),
        "jpg" | "jpeg" => Ok(ImageFormat::Jpeg),
        _ => Err(format!("unknown image format '{s}' (expected png or jpeg)")),
    }
}

fn parse_container(s: &str) -> Result<Container, String> {
    match s.to_ascii_lowercase().as_str() {
        "mp4" => Ok(Container::Mp4),
        "webm" => Ok(Container::Webm),
        "mkv" => Ok(Container::Mkv),
        _ => Err(format!("unknown container '{s}' (expected mp4, webm or mkv)")),
    }
}

fn parse_tool(s: &str) -> Result<Tool, String> {
    match s.to_ascii_lowercase().as_str() {
        "arrow" => Ok(Tool::Arrow),
        "rectangle" | "rect" => Ok(Tool::Rectangle),
        "text" => Ok(Tool::Text),
        _ => Err(format!("unknown tool '{s}' (expected arrow, rectangle or text)")),
    }
}

pub(crate) fn run(cli: Cli) -> Result<()> {
    let config_path = match cli.config_file {
        Some(path) => Some(path),
        None => SnapmarkConfig::path(),
    };
    let config = match &config_path {
        Some(path) => SnapmarkConfig::load_from(path),
        None => SnapmarkConfig::load(),
    };

    match cli.command {
        Command::Shot(args) => shot(&args, &config),
        Command::Annotate(args) => annotate(&args, &config),
        Command::Record(args) => record(&args, config),
        Command::Config(args) => configure(&args, config, config_path.as_deref()),
    }
}

fn shot(args: &ShotArgs, config: &SnapmarkConfig) -> Result<()> {
    let delay = args.delay.unwrap_or(config.capture_delay);
    countdown::wait(delay, |remaining| {
        log::info!("Capturing in {remaining}...");
    });
    let image = capture_primary_monitor()?;

    let events = match &args.script {
        Some(script) => load_script(script)?,
        None => Vec::new(),
    };
    edit_and_save(Editor::new(image, config), events, &args.output, config)
}

fn annotate(args: &AnnotateArgs, config: &SnapmarkConfig) -> Result<()> {
    let image = image::open(&args.input)
        .with_context(|| format!("Failed to open image: {}", args.input.display()))?
        .to_rgba8();
    let events = load_script(&args.script)?;
    edit_and_save(Editor::new(image, config), events, &args.output, config)
}

fn load_script(path: &Path) -> Result<Vec<InputEvent>> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read script: {}", path.display()))?;
    parse_script(&json).with_context(|| format!("Invalid input script: {}", path.display()))
}

fn edit_and_save(
    mut editor: Editor,
    events: Vec<InputEvent>,
    output: &OutputArgs,
    config: &SnapmarkConfig,
) -> Result<()> {
    log::debug!("Replaying {} input events", events.len());
    editor.replay(events);

    let session = &editor.session;
    log::debug!(
        "Editor ended with tool {:?}, pen {}, stroke {}, font {}",
        session.tool(),
        session.pen_color(),
        session.stroke_width(),
        session.font_size()
    );
    match session.state() {
        DrawState::Idle => {}
        DrawState::Dragging { .. } => {
            log::warn!("Script ended mid-drag; the unfinished shape is not saved")
        }
        DrawState::Editing { buffer, .. } => {
            log::warn!("Script ended while typing; text {buffer:?} is not saved")
        }
    }

    if let Some(preview) = &output.preview {
        let format = ImageFormat::from_path(preview);
        screenshot::save_rgba(&editor.preview_image(), preview, format)?;
    }

    let format = output.format(config);
    let path = output.path(config, format)?;
    let (width, height) = editor.scene.base_image().dimensions();
    log::info!(
        "Saving {}x{} image with {} annotations",
        width,
        height,
        editor.scene.annotations().len()
    );
    editor.save(&path, format)?;
    println!("{}", path.display());
    Ok(())
}

#[cfg(all(feature = "capture", feature = "screencast"))]
fn record(args: &RecordArgs, mut config: SnapmarkConfig) -> Result<()> {
    use crate::screencast::{ScreenRecording, get_video_path};
    use std::io::BufRead;
    use std::time::{Duration, Instant};

    if let Some(fps) = args.fps {
        config.video_framerate = fps;
    }
    if let Some(container) = args.container {
        config.video_container = container;
    }
    let output = match &args.output {
        Some(path) => path.clone(),
        None => get_video_path(config.video_container)
            .context("Could not determine a folder to save the recording in")?,
    };

    let mut recording = ScreenRecording::start(&output, &config)?;

    let (enter_tx, enter_rx) = crossbeam_channel::bounded(1);
    std::thread::spawn(move || {
        let mut line = String::new();
        // EOF on stdin is not a request to stop
        if let Ok(n) = std::io::stdin().lock().read_line(&mut line)
            && n > 0
        {
            let _ = enter_tx.send(());
        }
    });

    let deadline = args.seconds.map(|s| Instant::now() + Duration::from_secs(s));
    match deadline {
        Some(_) => eprintln!("Recording to {} ...", output.display()),
        None => eprintln!("Recording to {}, press Enter to stop", output.display()),
    }

    loop {
        if let Some(outcome) = recording.poll(Duration::from_millis(100)) {
            return Err(match outcome {
                Ok(_) => anyhow::anyhow!("Recording stopped unexpectedly"),
                Err(e) => e,
            });
        }
        if enter_rx.try_recv().is_ok() || deadline.is_some_and(|d| Instant::now() >= d) {
            break;
        }
    }

    let path = recording.finish()?;
    println!("{}", path.display());
    Ok(())
}

#[cfg(not(all(feature = "capture", feature = "screencast")))]
fn record(_args: &RecordArgs, _config: SnapmarkConfig) -> Result<()> {
    anyhow::bail!("snapmark was built without screen recording support")
}

fn configure(args: &ConfigArgs, mut config: SnapmarkConfig, path: Option<&Path>) -> Result<()> {
    if args.path {
        let path = path.context("Could not determine config directory")?;
        println!("{}", path.display());
        return Ok(());
    }

    if args.apply(&mut config) {
        let path = path.context("Could not determine config directory for saving")?;
        config.save_to(path)?;
        log::info!("Saved settings to {}", path.display());
    }
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

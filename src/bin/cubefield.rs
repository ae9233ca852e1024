use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use cubefield::{
    Atlas, CubeField, DirectorySink, ExportConfig, FfmpegSink, FfmpegSinkConfig, FixedTime,
    Fps, FrameExporter, FrameSink, FsImageSource, GridSize, LayoutKind, LayoutParams,
    PreviewRenderer, PreviewSettings, RenderSurface, SceneFile, build_atlas, generate_layout,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "cubefield", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the scene at one instant as a PNG.
    Frame(FrameArgs),
    /// Export the scene frame by frame (PNG sequence, or MP4 via `ffmpeg` on PATH).
    Export(ExportArgs),
    /// Print a layout's unit positions as JSON.
    Layout(LayoutArgs),
}

#[derive(Parser, Debug)]
struct SurfaceArgs {
    /// Output width in pixels.
    #[arg(long, default_value_t = 640)]
    width: u32,

    /// Output height in pixels.
    #[arg(long, default_value_t = 360)]
    height: u32,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Scene JSON.
    #[arg(long)]
    scene: PathBuf,

    /// Timeline time in seconds.
    #[arg(long, default_value_t = 0.0)]
    time: f64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    #[command(flatten)]
    surface: SurfaceArgs,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ExportFormat {
    Png,
    Mp4,
}

#[derive(Parser, Debug)]
struct ExportArgs {
    /// Scene JSON.
    #[arg(long)]
    scene: PathBuf,

    /// Output directory (png) or file (mp4).
    #[arg(long)]
    out: PathBuf,

    /// Frame count; defaults to the scene duration at its fps, inclusive of the last frame.
    #[arg(long)]
    frames: Option<u64>,

    /// Override the scene frame rate.
    #[arg(long)]
    fps: Option<u32>,

    #[arg(long, value_enum, default_value_t = ExportFormat::Png)]
    format: ExportFormat,

    /// Pause before each capture, in milliseconds.
    #[arg(long, default_value_t = 0)]
    settle_ms: u64,

    #[command(flatten)]
    surface: SurfaceArgs,
}

#[derive(Parser, Debug)]
struct LayoutArgs {
    /// Layout name, e.g. `sphere` or `prolate_spheroidal`.
    #[arg(long)]
    kind: String,

    /// Grid edge length (1..=24).
    #[arg(long)]
    n: u32,

    #[arg(long, default_value_t = 1.0)]
    spacing: f32,

    #[arg(long, default_value_t = 1.0)]
    cube_size: f32,

    #[arg(long, default_value_t = 0.0)]
    start_hour: f64,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Export(args) => cmd_export(args),
        Command::Layout(args) => cmd_layout(args),
    }
}

/// Scene plus the atlas built from its images (relative paths resolve next to the scene).
fn load_scene(path: &Path) -> anyhow::Result<(SceneFile, Option<Atlas>)> {
    let scene = SceneFile::load(path)?;
    if scene.images.is_empty() {
        return Ok((scene, None));
    }
    let root = path.parent().unwrap_or_else(|| Path::new("."));
    let source = FsImageSource::new(root);
    let atlas = build_atlas(&scene.images, &source, scene.cell_px)?;
    let failed = atlas.failed_indices();
    if !failed.is_empty() {
        eprintln!("warning: {} image(s) failed to load: {failed:?}", failed.len());
    }
    Ok((scene, Some(atlas)))
}

fn make_surface(args: &SurfaceArgs, atlas: Option<&Atlas>) -> anyhow::Result<PreviewRenderer> {
    let settings = PreviewSettings {
        width: args.width,
        height: args.height,
        ..PreviewSettings::default()
    };
    let surface = match atlas {
        Some(atlas) => PreviewRenderer::with_atlas(settings, atlas)?,
        None => PreviewRenderer::new(settings, Vec::new())?,
    };
    Ok(surface)
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let (scene, atlas) = load_scene(&args.scene)?;
    let timeline = scene.timeline()?;
    let mut field = CubeField::new(scene.images.len());
    let mut surface = make_surface(&args.surface, atlas.as_ref())?;

    let sample = timeline.sample_with(&FixedTime(args.time));
    field.apply(&sample)?;
    surface.render(&field)?;
    let frame = surface
        .capture()?
        .context("renderer produced no image")?;

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    image::save_buffer_with_format(
        &args.out,
        &frame.data,
        frame.width,
        frame.height,
        image::ExtendedColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_export(args: ExportArgs) -> anyhow::Result<()> {
    let (scene, atlas) = load_scene(&args.scene)?;
    let timeline = scene.timeline()?;
    let fps = match args.fps {
        Some(f) => Fps::whole(f)?,
        None => scene.fps()?,
    };
    let total_frames = match args.frames {
        Some(n) => n,
        None => fps.secs_to_frames_ceil(scene.duration_secs()) + 1,
    };
    let mut field = CubeField::new(scene.images.len());
    let mut surface = make_surface(&args.surface, atlas.as_ref())?;

    let mut sink: Box<dyn FrameSink> = match args.format {
        ExportFormat::Png => Box::new(DirectorySink::new(&args.out)),
        ExportFormat::Mp4 => Box::new(FfmpegSink::new(FfmpegSinkConfig {
            bg_rgba: PreviewSettings::default().clear_rgba,
            ..FfmpegSinkConfig::new(&args.out)
        })),
    };

    let mut cfg = ExportConfig::new(scene.name.as_str(), total_frames, fps);
    cfg.settle_delay = Duration::from_millis(args.settle_ms);
    let exporter = FrameExporter::new(cfg);

    let mut last_decile = 0u64;
    let report = exporter.run(
        &timeline,
        &mut field,
        &mut surface,
        sink.as_mut(),
        &mut |p| {
            let decile = p.frames_done * 10 / p.total_frames.max(1);
            if decile > last_decile {
                last_decile = decile;
                eprintln!("export {:.0}%", p.percent());
            }
        },
    );
    let report = report.into_result()?;

    eprintln!(
        "wrote {} frame(s) to {} ({:?})",
        report.frames_written,
        args.out.display(),
        report.state
    );
    Ok(())
}

#[derive(serde::Serialize)]
struct LayoutDump {
    kind: LayoutKind,
    n: u32,
    count: usize,
    positions: Vec<[f32; 3]>,
}

fn cmd_layout(args: LayoutArgs) -> anyhow::Result<()> {
    let kind = LayoutKind::parse(&args.kind)
        .with_context(|| format!("unknown layout '{}'", args.kind))?;
    let n = GridSize::new(args.n)?;
    let params = LayoutParams::new(n, args.spacing, args.cube_size, args.start_hour);
    let count = n.instance_count();
    let flat = generate_layout(kind, count, &params);
    let dump = LayoutDump {
        kind,
        n: n.get(),
        count,
        positions: flat.chunks_exact(3).map(|p| [p[0], p[1], p[2]]).collect(),
    };
    println!("{}", serde_json::to_string_pretty(&dump)?);
    Ok(())
}

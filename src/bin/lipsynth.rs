use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use lipsynth::{
    AnimationJob, CancelToken, ExtractMode, FrameIndex, FrameSource, JobRequest, LipsyncConfig,
    PixelPoint, Rng64, StyleKind,
};

#[derive(Parser, Debug)]
#[command(name = "lipsynth", version, about = "Lip-sync a character image to an audio clip")]
struct Cli {
    /// More log output (-v info, -vv debug, -vvv trace). `RUST_LOG` takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// JSON config file; flags override its values.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the full lip-sync video (requires `ffmpeg` on PATH).
    Render(RenderArgs),
    /// Render a single frame as a PNG.
    Frame(FrameArgs),
    /// Print the extracted audio events as JSON.
    Events(EventsArgs),
    /// Print the located image regions as JSON.
    Locate(LocateArgs),
}

#[derive(Args, Debug)]
struct JobArgs {
    /// Character image (PNG or JPEG).
    #[arg(long)]
    image: PathBuf,

    /// Voice track (WAV, MP3, M4A, OGG, AAC or MP4).
    #[arg(long)]
    audio: PathBuf,

    /// two-part (canadian), two-part-amplitude, sprite (standard) or sliding-jaw (nutcracker).
    #[arg(long, value_parser = parse_style, default_value = "sprite")]
    style: StyleKind,

    /// Mouth position `x,y` in image pixels (sprite style only).
    #[arg(long, value_parser = parse_anchor)]
    anchor: Option<PixelPoint>,

    #[command(flatten)]
    overrides: Overrides,
}

#[derive(Args, Debug)]
struct Overrides {
    #[arg(long)]
    fps: Option<u32>,

    /// Seed for reproducible jitter.
    #[arg(long)]
    seed: Option<u64>,

    #[arg(long)]
    sprites_dir: Option<PathBuf>,

    /// Phoneme recognizer binary (Rhubarb).
    #[arg(long)]
    recognizer: Option<PathBuf>,

    #[arg(long)]
    ffmpeg: Option<PathBuf>,

    /// Override rayon worker threads.
    #[arg(long)]
    threads: Option<usize>,

    /// Frames rendered per parallel chunk.
    #[arg(long)]
    chunk_size: Option<usize>,

    /// Render frames on the calling thread only.
    #[arg(long, default_value_t = false)]
    sequential: bool,
}

#[derive(Args, Debug)]
struct RenderArgs {
    #[command(flatten)]
    job: JobArgs,

    /// Output MP4 path (default: `<output_dir>/talking_head_<id>.mp4`).
    #[arg(long)]
    out: Option<PathBuf>,

    /// Keep the job's work directory for inspection.
    #[arg(long, default_value_t = false)]
    keep_work_dir: bool,
}

#[derive(Args, Debug)]
struct FrameArgs {
    #[command(flatten)]
    job: JobArgs,

    /// Frame index (0-based).
    #[arg(long)]
    frame: u64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ModeArg {
    Phoneme,
    Energy,
    Amplitude,
}

impl From<ModeArg> for ExtractMode {
    fn from(m: ModeArg) -> Self {
        match m {
            ModeArg::Phoneme => ExtractMode::Phoneme,
            ModeArg::Energy => ExtractMode::Energy,
            ModeArg::Amplitude => ExtractMode::Amplitude,
        }
    }
}

#[derive(Args, Debug)]
struct EventsArgs {
    #[arg(long)]
    audio: PathBuf,

    #[arg(long, value_enum, default_value_t = ModeArg::Phoneme)]
    mode: ModeArg,

    /// Write JSON here instead of stdout.
    #[arg(long)]
    out: Option<PathBuf>,

    #[command(flatten)]
    overrides: Overrides,
}

#[derive(Args, Debug)]
struct LocateArgs {
    #[arg(long)]
    image: PathBuf,

    #[arg(long, value_parser = parse_style, default_value = "sprite")]
    style: StyleKind,

    #[arg(long, value_parser = parse_anchor)]
    anchor: Option<PixelPoint>,

    /// Write JSON here instead of stdout.
    #[arg(long)]
    out: Option<PathBuf>,
}

fn parse_style(s: &str) -> Result<StyleKind, String> {
    s.parse::<StyleKind>().map_err(|e| e.to_string())
}

fn parse_anchor(s: &str) -> Result<PixelPoint, String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected 'x,y', got '{s}'"))?;
    let x = x.trim().parse::<i32>().map_err(|e| format!("bad x in '{s}': {e}"))?;
    let y = y.trim().parse::<i32>().map_err(|e| format!("bad y in '{s}': {e}"))?;
    Ok(PixelPoint::new(x, y))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match &cli.config {
        Some(path) => LipsyncConfig::from_path(path)?,
        None => LipsyncConfig::default(),
    };
    match cli.cmd {
        Command::Render(args) => cmd_render(config, args),
        Command::Frame(args) => cmd_frame(config, args),
        Command::Events(args) => cmd_events(config, args),
        Command::Locate(args) => cmd_locate(args),
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("lipsynth={level}")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn apply_overrides(mut cfg: LipsyncConfig, o: &Overrides) -> anyhow::Result<LipsyncConfig> {
    if let Some(fps) = o.fps {
        cfg.fps = fps;
    }
    if let Some(seed) = o.seed {
        cfg.seed = Some(seed);
    }
    if let Some(dir) = &o.sprites_dir {
        cfg.sprites_dir = Some(dir.clone());
    }
    if let Some(p) = &o.recognizer {
        cfg.recognizer = p.clone();
    }
    if let Some(p) = &o.ffmpeg {
        cfg.ffmpeg = p.clone();
    }
    if let Some(n) = o.threads {
        cfg.render.threads = Some(n);
    }
    if let Some(n) = o.chunk_size {
        cfg.render.chunk_size = n;
    }
    if o.sequential {
        cfg.render.parallel = false;
    }
    cfg.validate()?;
    Ok(cfg)
}

fn build_job(
    config: LipsyncConfig,
    args: &JobArgs,
    out: Option<PathBuf>,
) -> anyhow::Result<AnimationJob> {
    let config = apply_overrides(config, &args.overrides)?;
    let mut request = JobRequest::new(&args.image, &args.audio, args.style);
    request.manual_anchor = args.anchor;
    request.output = out;
    Ok(AnimationJob::new(request, config)?)
}

fn write_json(out: Option<&Path>, value: &impl serde::Serialize) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value).context("serialize JSON")?;
    match out {
        Some(path) => {
            std::fs::write(path, json).with_context(|| format!("write '{}'", path.display()))?;
            eprintln!("wrote {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn cmd_render(config: LipsyncConfig, args: RenderArgs) -> anyhow::Result<()> {
    let mut job = build_job(config, &args.job, args.out)?;
    if args.keep_work_dir {
        job.keep_work_dir();
        eprintln!("work dir: {}", job.work_dir().display());
    }
    let output = job.run(&CancelToken::new())?;
    for w in &output.warnings {
        eprintln!("warning: {w}");
    }
    eprintln!(
        "wrote {} ({} frames, {:.2}s)",
        output.output.display(),
        output.frames,
        output.duration_secs
    );
    Ok(())
}

fn cmd_frame(config: LipsyncConfig, args: FrameArgs) -> anyhow::Result<()> {
    let job = build_job(config, &args.job, None)?;
    let prepared = job.prepare()?;
    let renderer = prepared.renderer();
    if args.frame >= renderer.frame_count() {
        anyhow::bail!(
            "frame {} is out of range (clip has {} frames)",
            args.frame,
            renderer.frame_count()
        );
    }
    let frame = renderer.render_frame(FrameIndex(args.frame))?;

    if let Some(parent) = args.out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    frame
        .save_with_format(&args.out, image::ImageFormat::Png)
        .with_context(|| format!("write png '{}'", args.out.display()))?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_events(config: LipsyncConfig, args: EventsArgs) -> anyhow::Result<()> {
    let config = apply_overrides(config, &args.overrides)?;
    let work_dir = lipsynth::pipeline::WorkDir::create(
        config
            .temp_root()
            .join(format!("lipsynth-events-{}", uuid::Uuid::new_v4())),
    )?;
    let mut rng = match config.seed {
        Some(seed) => Rng64::new(seed),
        None => Rng64::from_u128(uuid::Uuid::new_v4().as_u128()),
    };
    let events = lipsynth::audio::extract(
        &args.audio,
        args.mode.into(),
        &config.extract_options(work_dir.path()),
        &mut rng,
    )?;
    write_json(args.out.as_deref(), &events)
}

fn cmd_locate(args: LocateArgs) -> anyhow::Result<()> {
    let img = lipsynth::assets::load_character(&args.image)?;
    let style = lipsynth::create_style(args.style);
    let geometry = style.locate(&lipsynth::geometry::Locator::default(), &img, args.anchor);
    write_json(args.out.as_deref(), &geometry)
}

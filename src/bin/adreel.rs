use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use adreel::assets::media::{decode_audio_f32, probe_video};
use adreel::compose::format::{choose, probe_encoders};
use adreel::compose::state::{plan_timeline, summarize_timeline};
use adreel::studio::pipeline::run_composition;
use adreel::{
    AdreelConfig, Compositor, CompositorOpts, GeminiGateway, MediaAsset, OutputFormat, PollPolicy,
    ProductInfo, Studio, StudioPipeline, VoiceGender, VoiceStyle,
};

#[derive(Parser, Debug)]
#[command(name = "adreel", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List output formats and the one this machine would use.
    Formats(ConfigArgs),
    /// Show which clip (or freeze-frame) covers each part of the narration.
    Plan(ComposeArgs),
    /// Compose clips under a narration track (requires `ffmpeg`/`ffprobe` on PATH).
    Compose(ComposeArgs),
    /// Run the full studio against the Gemini API (reads `GEMINI_API_KEY`).
    Generate(GenerateArgs),
}

#[derive(Parser, Debug)]
struct ConfigArgs {
    /// Optional JSON config file.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct ComposeArgs {
    /// Clip files in playback order.
    #[arg(long = "clip", required = true)]
    clips: Vec<PathBuf>,

    /// Narration audio file.
    #[arg(long)]
    narration: PathBuf,

    /// Output directory.
    #[arg(long, default_value = "out")]
    out: PathBuf,

    #[command(flatten)]
    config: ConfigArgs,
}

#[derive(Parser, Debug)]
struct GenerateArgs {
    /// Product photo.
    #[arg(long)]
    product: PathBuf,

    /// Product name.
    #[arg(long)]
    name: String,

    /// Product description.
    #[arg(long)]
    description: String,

    /// Description of the model to generate.
    #[arg(long)]
    model_description: Option<String>,

    /// Use this model image instead of generating one.
    #[arg(long)]
    model_image: Option<PathBuf>,

    /// Narrator voice (`female`/`male`); detected from the model image when omitted.
    #[arg(long)]
    gender: Option<String>,

    /// Narration style (natural, cheerful, whisper, shout, calm).
    #[arg(long, default_value = "natural")]
    style: String,

    /// Output directory.
    #[arg(long, default_value = "out")]
    out: PathBuf,

    #[command(flatten)]
    config: ConfigArgs,
}

fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Formats(args) => cmd_formats(args),
        Command::Plan(args) => cmd_plan(args),
        Command::Compose(args) => cmd_compose(args),
        Command::Generate(args) => cmd_generate(args),
    }
}

fn load_config(args: &ConfigArgs) -> anyhow::Result<AdreelConfig> {
    match &args.config {
        Some(path) => Ok(AdreelConfig::from_path(path)?),
        None => Ok(AdreelConfig::default()),
    }
}

fn ensure_dir(dir: &Path) -> anyhow::Result<()> {
    std::fs::create_dir_all(dir).with_context(|| format!("create output dir '{}'", dir.display()))
}

fn compositor(cfg: &AdreelConfig, out: &Path) -> Compositor {
    Compositor::new(CompositorOpts::from_config(cfg, out.join(".adreel-work")))
}

fn cmd_formats(args: ConfigArgs) -> anyhow::Result<()> {
    let cfg = load_config(&args)?;
    let supported = probe_encoders();
    for format in [
        OutputFormat::Mp4H264Aac,
        OutputFormat::WebmVp9Opus,
        OutputFormat::WebmVp8Vorbis,
    ] {
        let (video, audio) = format.encoders();
        let mark = if format.is_supported_by(&supported) {
            "yes"
        } else {
            "no"
        };
        println!("{format:<16} {video}+{audio:<12} supported: {mark}");
    }
    match choose(&cfg.format_preference, &supported) {
        Some(f) => println!("selected: {f}"),
        None => anyhow::bail!("no supported output format on this machine"),
    }
    Ok(())
}

fn cmd_plan(args: ComposeArgs) -> anyhow::Result<()> {
    let cfg = load_config(&args.config)?;
    let clip_frames = args
        .clips
        .iter()
        .map(|p| -> anyhow::Result<u64> {
            let info = probe_video(p)?;
            Ok(cfg.fps.secs_to_frames_floor(info.duration_secs))
        })
        .collect::<anyhow::Result<Vec<u64>>>()?;
    let narration = decode_audio_f32(
        &args.narration,
        cfg.narration_sample_rate,
        cfg.narration_channels,
    )?;
    let total = cfg
        .fps
        .frames_covering_samples(narration.sample_frames(), narration.sample_rate);

    let plan = plan_timeline(&clip_frames, total)?;
    println!(
        "narration {:.2}s = {total} frames at {:.3} fps",
        narration.duration_secs(),
        cfg.fps.as_f64()
    );
    for seg in summarize_timeline(&plan) {
        let kind = if seg.frozen { "freeze" } else { "play" };
        println!(
            "{:>8.2}s - {:>8.2}s  clip {}  {kind}",
            cfg.fps.frames_to_secs(seg.start_frame),
            cfg.fps.frames_to_secs(seg.end_frame),
            seg.clip
        );
    }
    Ok(())
}

fn cmd_compose(args: ComposeArgs) -> anyhow::Result<()> {
    let cfg = load_config(&args.config)?;
    ensure_dir(&args.out)?;
    let clips: Vec<MediaAsset> = args.clips.iter().map(MediaAsset::file).collect();
    let narration = MediaAsset::file(&args.narration);

    let compositor = compositor(&cfg, &args.out);
    let video = compositor.compose_with_ffmpeg(&clips, &narration);
    remove_workdir(&compositor.opts().workdir);
    let video = video?;
    let path = video.write_to(&args.out, "ad")?;

    eprintln!(
        "wrote {} ({}, {} frames, {:.2}s)",
        path.display(),
        video.format,
        video.frames,
        video.duration_secs
    );
    Ok(())
}

/// Remove the compositor scratch directory, whatever the composition outcome.
fn remove_workdir(dir: &Path) {
    match std::fs::remove_dir_all(dir) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(path = %dir.display(), error = %e, "failed to remove workdir"),
    }
}

fn save(dir: &Path, stem: &str, asset: &MediaAsset) -> anyhow::Result<PathBuf> {
    let path = asset.materialize(dir, stem)?;
    tracing::info!(path = %path.display(), "saved");
    Ok(path)
}

fn cmd_generate(args: GenerateArgs) -> anyhow::Result<()> {
    let cfg = load_config(&args.config)?;
    ensure_dir(&args.out)?;
    let gateway = GeminiGateway::from_env(cfg.gateway.clone())?;
    let pipeline = StudioPipeline::new(&gateway, PollPolicy::from_config(&cfg.gateway));
    let rt = tokio::runtime::Runtime::new().context("start async runtime")?;
    let out = args.out.as_path();

    let mut studio = Studio::new();
    studio.set_product(ProductInfo {
        image: MediaAsset::read_file(&args.product)?,
        name: args.name.clone(),
        description: args.description.clone(),
    })?;
    studio.advance()?;

    match &args.model_image {
        Some(path) => studio.set_model(args.model_description.clone(), MediaAsset::read_file(path)?)?,
        None => rt.block_on(pipeline.generate_model(&mut studio, args.model_description.clone()))?,
    }
    if let Some(model) = studio.model_image() {
        save(out, "model", model)?;
    }
    studio.advance()?;

    rt.block_on(pipeline.generate_script(&mut studio))?;
    let voice = args.gender.as_deref().map(VoiceGender::parse);
    let style = VoiceStyle::parse(&args.style);
    rt.block_on(pipeline.generate_narration(&mut studio, voice, style))?;
    if let Some(script) = studio.script() {
        std::fs::write(out.join("script.txt"), format!("{script}\n"))
            .context("write script.txt")?;
    }
    if let Some(narration) = studio.narration() {
        save(out, "narration", narration)?;
    }
    studio.advance()?;

    rt.block_on(pipeline.generate_scene_images(&mut studio))?;
    for (i, image) in studio.scene_images().iter().enumerate() {
        save(out, &format!("scene_{}", i + 1), image)?;
    }
    let clips = rt.block_on(pipeline.generate_scene_clips(&mut studio, |slot, msg| {
        tracing::info!(clip = slot + 1, "{msg}");
    }));
    if let Err(e) = clips {
        if let Some(fallback) = studio.video_fallback() {
            let path = out.join("fallback_prompts.txt");
            std::fs::write(&path, fallback.to_text_file())
                .with_context(|| format!("write '{}'", path.display()))?;
            eprintln!("video quota exhausted; prompts written to {}", path.display());
        }
        return Err(e.into());
    }
    for (i, clip) in studio.scene_clips().iter().enumerate() {
        let Some(clip) = clip else { continue };
        save(out, &format!("clip_{}", i + 1), clip)?;
    }
    studio.advance()?;

    let compositor = compositor(&cfg, out);
    let composed = run_composition(&mut studio, |job| {
        compositor.compose_with_ffmpeg(job.clips.as_slice(), &job.narration)
    });
    remove_workdir(&compositor.opts().workdir);
    let composed = composed?;
    if let Some(video) = composed {
        let path = video.write_to(out, "ad")?;
        eprintln!("wrote {} ({}, {:.2}s)", path.display(), video.format, video.duration_secs);
    }

    let caption = rt.block_on(pipeline.generate_caption(&mut studio))?;
    std::fs::write(out.join("caption.txt"), caption.to_text_file()).context("write caption.txt")?;
    eprintln!("wrote {}", out.join("caption.txt").display());
    Ok(())
}

use std::fs;
use std::path::Path;

use anyhow::{ensure, Context, Result};
use clap::Parser;
use serde::Serialize;

use reelcaption::assemble::{FfmpegEncoder, VideoAssembler};
use reelcaption::chunking::{group_into_subtitles, SubtitleConfig};
use reelcaption::cli::{ChunkArgs, Cli, Command, RenderArgs, SpeakerArgs, SpeakersArgs, SubtitlesArgs};
use reelcaption::color::{ColorResolver, Palette};
use reelcaption::config::{AppConfig, RenderConfig};
use reelcaption::render::{FrameRenderer, RenderSnapshot, Typeface};
use reelcaption::speakers::{speaker_listing, unique_speakers, SpeakerSegmenter};
use reelcaption::transcript::CaptionJob;
use reelcaption::types::{RenderMode, SpeakerSegment, SpeakerStyle, Word};

#[derive(Serialize)]
struct SpeakerReport {
    words: Vec<Word>,
    segments: Vec<SpeakerSegment>,
    speakers: Vec<SpeakerStyle>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Speakers(args) => run_speakers(&args),
        Command::Subtitles(args) => run_subtitles(&args),
        Command::Render(args) => run_render(&args),
    }
}

// stdout carries JSON and progress, logs go to stderr
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_level.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn load_job(path: &Path) -> Result<CaptionJob> {
    ensure!(path.is_file(), "Job file does not exist: {:?}", path);
    CaptionJob::load(path).with_context(|| format!("Failed to load caption job {:?}", path))
}

fn segmenter(args: &SpeakerArgs) -> Result<SpeakerSegmenter> {
    SpeakerSegmenter::for_palette(args.pause_threshold, &Palette::detection_default())
        .context("Invalid speaker detection settings")
}

fn subtitle_config(args: &ChunkArgs) -> Result<SubtitleConfig> {
    ensure!(args.max_words > 0, "--max-words must be at least 1");
    ensure!(
        args.max_duration > 0.0,
        "--max-duration must be positive, got: {}",
        args.max_duration
    );
    Ok(SubtitleConfig::new(args.max_words, args.max_duration))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{rendered}");
    Ok(())
}

fn run_speakers(args: &SpeakersArgs) -> Result<()> {
    let job = load_job(&args.job)?;
    let detection = segmenter(&args.speakers)?.detect(&job.words);
    let speakers = speaker_listing(
        &unique_speakers(&detection.words),
        &Palette::detection_default(),
    );
    print_json(&SpeakerReport {
        words: detection.words,
        segments: detection.segments,
        speakers,
    })
}

fn run_subtitles(args: &SubtitlesArgs) -> Result<()> {
    let job = load_job(&args.job)?;
    let chunks = group_into_subtitles(&job.words, subtitle_config(&args.chunks)?);
    print_json(&chunks)
}

fn run_render(args: &RenderArgs) -> Result<()> {
    let source = args
        .media_source()
        .context("Provide a source via --video or --audio")?;
    ensure!(
        source.path().is_file(),
        "Source media does not exist: {:?}",
        source.path()
    );

    let mut job = load_job(&args.job)?;
    let mode = args.render_mode(&source);
    let background = args
        .background
        .as_deref()
        .unwrap_or(&job.style.background_color);
    let highlight = args
        .highlight
        .as_deref()
        .unwrap_or(&job.style.highlight_color);
    let config = RenderConfig::new(mode)
        .with_colors(background, highlight)
        .context("Invalid caption colors")?;
    let subtitles = subtitle_config(&args.chunks)?;
    let output = args.output_path(job.job_id.as_deref());

    println!("Reelcaption v{}", env!("CARGO_PKG_VERSION"));
    println!("Job:    {:?}", args.job);
    println!("Source: {:?}", source.path());
    println!("Output: {:?}", output);
    println!(
        "Mode:   {}",
        match mode {
            RenderMode::Karaoke => "karaoke",
            RenderMode::MovieSubtitle => "movie subtitles",
        }
    );

    if args.detect_speakers {
        println!("\n1. Detecting speakers...");
        let detection = segmenter(&args.speakers)?.detect(&job.words);
        println!(
            "   Found {} speakers across {} segments",
            unique_speakers(&detection.words).len(),
            detection.segments.len()
        );
        job.words = detection.words;
    } else {
        println!("\n1. Using speaker ids from the job document");
    }

    println!("\n2. Preparing renderer...");
    let app_config =
        AppConfig::from_override(args.assets_path.clone()).context("Failed to resolve assets")?;
    let face = Typeface::load(&app_config.font_candidates(args.font.as_deref()));
    if face.is_builtin() {
        println!("   No TrueType font found; using the built-in bitmap face");
    }
    let snapshot = RenderSnapshot::new(
        &job.words,
        job.overrides(),
        &ColorResolver::default(),
        subtitles,
    )
    .context("Failed to resolve speaker colors")?;
    println!(
        "   {} words, {} subtitle chunks",
        snapshot.words().len(),
        snapshot.chunks().len()
    );
    let renderer = FrameRenderer::new(config, face).context("Invalid render configuration")?;

    println!("\n3. Rendering and encoding...");
    let encoder = FfmpegEncoder::locate().context("Video encoder unavailable")?;
    if let Some(dir) = output.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory {:?}", dir))?;
    }
    let mut last_reported = -1i64;
    let summary = VideoAssembler::new(renderer, encoder)
        .assemble(&source, &snapshot, &output, |percent| {
            let step = (percent / 10.0).floor() as i64;
            if step > last_reported {
                last_reported = step;
                println!("   {:>3.0}%", percent);
            }
        })
        .with_context(|| format!("Failed to render {:?}", output))?;

    println!(
        "\n✓ Wrote {} frames ({:.2}s) to {:?}",
        summary.frame_count, summary.duration, summary.output
    );
    Ok(())
}

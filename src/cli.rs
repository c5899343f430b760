use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::assemble::MediaSource;
use crate::chunking::{DEFAULT_MAX_DURATION, DEFAULT_MAX_WORDS};
use crate::speakers::DEFAULT_PAUSE_THRESHOLD;
use crate::types::RenderMode;

#[derive(Parser, Debug)]
#[command(
    name = "reelcaption",
    version,
    about = "Render word-timed captions into a vertical video clip"
)]
pub struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(long, short, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Assign speakers by pause length and print words, segments and colors as JSON.
    Speakers(SpeakersArgs),
    /// Print subtitle chunks as JSON.
    Subtitles(SubtitlesArgs),
    /// Render the caption overlay and encode it with the source audio.
    Render(RenderArgs),
}

#[derive(Args, Debug, Clone)]
pub struct SpeakerArgs {
    /// Silence (seconds) that must be exceeded to switch speaker.
    #[arg(long = "pause-threshold", default_value_t = DEFAULT_PAUSE_THRESHOLD)]
    pub pause_threshold: f64,
}

#[derive(Args, Debug, Clone)]
pub struct ChunkArgs {
    /// Maximum words per subtitle.
    #[arg(long = "max-words", default_value_t = DEFAULT_MAX_WORDS)]
    pub max_words: usize,
    /// Maximum seconds a subtitle may span.
    #[arg(long = "max-duration", default_value_t = DEFAULT_MAX_DURATION)]
    pub max_duration: f64,
}

#[derive(Args, Debug, Clone)]
pub struct SpeakersArgs {
    /// Caption job JSON (words, optional speaker overrides and style).
    #[arg(value_name = "JOB")]
    pub job: PathBuf,
    #[command(flatten)]
    pub speakers: SpeakerArgs,
}

#[derive(Args, Debug, Clone)]
pub struct SubtitlesArgs {
    #[arg(value_name = "JOB")]
    pub job: PathBuf,
    #[command(flatten)]
    pub chunks: ChunkArgs,
}

#[derive(Args, Debug, Clone)]
#[group(required = true, multiple = false)]
pub struct SourceArgs {
    /// Source video; supplies duration and audio, captions use karaoke mode.
    #[arg(long)]
    pub video: Option<PathBuf>,
    /// Source audio; supplies duration and audio, captions use movie-subtitle mode.
    #[arg(long)]
    pub audio: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeArg {
    Karaoke,
    Movie,
}

impl From<ModeArg> for RenderMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Karaoke => RenderMode::Karaoke,
            ModeArg::Movie => RenderMode::MovieSubtitle,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct RenderArgs {
    #[arg(value_name = "JOB")]
    pub job: PathBuf,
    #[command(flatten)]
    pub source: SourceArgs,
    /// Output file; defaults to <OUTPUT_DIR>/<JOB_ID>_karaoke.mp4.
    #[arg(long, short)]
    pub output: Option<PathBuf>,
    #[arg(long = "output-dir", default_value = "outputs")]
    pub output_dir: PathBuf,
    /// Overrides the job document's id when naming the output.
    #[arg(long = "job-id")]
    pub job_id: Option<String>,
    /// Background color (#RRGGBB); overrides the job style.
    #[arg(long)]
    pub background: Option<String>,
    /// Active-word color (#RRGGBB); overrides the job style.
    #[arg(long)]
    pub highlight: Option<String>,
    /// Force a display mode instead of deriving it from the source kind.
    #[arg(long, value_enum)]
    pub mode: Option<ModeArg>,
    /// TrueType font used for captions.
    #[arg(long)]
    pub font: Option<PathBuf>,
    /// Optional override for the assets directory (fonts/ is searched).
    #[arg(long = "assets-path")]
    pub assets_path: Option<PathBuf>,
    /// Re-run pause-based speaker detection before rendering.
    #[arg(long = "detect-speakers")]
    pub detect_speakers: bool,
    #[command(flatten)]
    pub speakers: SpeakerArgs,
    #[command(flatten)]
    pub chunks: ChunkArgs,
}

impl RenderArgs {
    pub fn media_source(&self) -> Option<MediaSource> {
        match (&self.source.video, &self.source.audio) {
            (Some(video), _) => Some(MediaSource::Video(video.clone())),
            (None, Some(audio)) => Some(MediaSource::Audio(audio.clone())),
            (None, None) => None,
        }
    }

    pub fn render_mode(&self, source: &MediaSource) -> RenderMode {
        self.mode
            .map(RenderMode::from)
            .unwrap_or_else(|| source.implied_mode())
    }

    /// Explicit `--output`, else `<output_dir>/<id>_karaoke.mp4` where the id
    /// comes from `--job-id`, the job document, or the job file name.
    pub fn output_path(&self, document_id: Option<&str>) -> PathBuf {
        if let Some(path) = &self.output {
            return path.clone();
        }
        let id = self
            .job_id
            .as_deref()
            .or(document_id)
            .map(str::to_string)
            .unwrap_or_else(|| file_stem(&self.job));
        self.output_dir.join(format!("{id}_karaoke.mp4"))
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("job")
        .to_string()
}

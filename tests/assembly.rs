use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::Result;
use reelcaption::assemble::{
    CancelToken, EncodeSession, EncodeSpec, Encoder, MediaSource, VideoAssembler,
};
use reelcaption::chunking::SubtitleConfig;
use reelcaption::color::ColorResolver;
use reelcaption::config::RenderConfig;
use reelcaption::error::ReelError;
use reelcaption::render::{Frame, FrameRenderer, RenderSnapshot, Typeface};
use reelcaption::types::{RenderMode, Word};
use tempfile::tempdir;

#[derive(Debug, Default)]
struct Recording {
    spec: Option<EncodeSpec>,
    audio: Option<PathBuf>,
    audio_spec: Option<hound::WavSpec>,
    audio_peak: i16,
    output: Option<PathBuf>,
    frames: Vec<Frame>,
    finished: bool,
}

/// In-memory encoder; writes a marker file to its output on finish.
#[derive(Clone, Default)]
struct MemoryEncoder {
    recording: Arc<Mutex<Recording>>,
    fail_at_frame: Option<usize>,
}

struct MemorySession {
    recording: Arc<Mutex<Recording>>,
    output: PathBuf,
    fail_at_frame: Option<usize>,
}

impl Encoder for MemoryEncoder {
    type Session = MemorySession;

    fn open(
        &self,
        spec: &EncodeSpec,
        audio: Option<&Path>,
        output: &Path,
    ) -> reelcaption::Result<MemorySession> {
        let mut recording = self.recording.lock().unwrap();
        recording.spec = Some(*spec);
        recording.audio = audio.map(Path::to_path_buf);
        // staged audio only lives for the run, so inspect it while open
        if let Some(reader) = audio.and_then(|path| hound::WavReader::open(path).ok()) {
            recording.audio_spec = Some(reader.spec());
            recording.audio_peak = reader
                .into_samples::<i16>()
                .filter_map(|s| s.ok())
                .map(|s| s.saturating_abs())
                .max()
                .unwrap_or(0);
        }
        recording.output = Some(output.to_path_buf());
        Ok(MemorySession {
            recording: Arc::clone(&self.recording),
            output: output.to_path_buf(),
            fail_at_frame: self.fail_at_frame,
        })
    }
}

impl EncodeSession for MemorySession {
    fn write_frame(&mut self, frame: &Frame) -> reelcaption::Result<()> {
        let mut recording = self.recording.lock().unwrap();
        if Some(recording.frames.len()) == self.fail_at_frame {
            return Err(ReelError::Encode("disk full".to_string()));
        }
        recording.frames.push(frame.clone());
        Ok(())
    }

    fn finish(self) -> reelcaption::Result<()> {
        fs::write(&self.output, b"mp4")?;
        self.recording.lock().unwrap().finished = true;
        Ok(())
    }
}

fn small_config(mode: RenderMode) -> RenderConfig {
    let mut config = RenderConfig::new(mode).with_resolution(64, 96).with_fps(10);
    config.karaoke.font_size = 8.0;
    config.karaoke.highlight_font_size = 10.0;
    config.subtitle.font_size = 10.0;
    config.subtitle.bottom_offset = 10;
    config
}

fn renderer(mode: RenderMode) -> FrameRenderer {
    FrameRenderer::new(small_config(mode), Typeface::builtin()).unwrap()
}

fn snapshot(words: &[Word]) -> RenderSnapshot {
    RenderSnapshot::new(words, None, &ColorResolver::default(), SubtitleConfig::default()).unwrap()
}

fn sample_words() -> Vec<Word> {
    vec![
        Word::new("one", 0.0, 0.3),
        Word::new("two", 0.3, 0.6),
        Word::new("three.", 0.6, 0.9),
    ]
}

/// Tone written to every channel; odd channels carry the inverted wave.
fn write_tone(path: &Path, seconds: f32, channels: u16) -> Result<()> {
    let spec = hound::WavSpec {
        channels,
        sample_rate: 8_000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec)?;
    let total = (8_000.0 * seconds) as usize;
    for idx in 0..total {
        let t = idx as f32 / 8_000.0;
        let value = (t * 440.0 * std::f32::consts::TAU).sin() * 0.3;
        let sample = (value * i16::MAX as f32) as i16;
        for channel in 0..channels {
            writer.write_sample(if channel % 2 == 0 { sample } else { -sample })?;
        }
    }
    writer.finalize()?;
    Ok(())
}

#[test]
fn frames_arrive_in_order_and_output_is_placed() -> Result<()> {
    let dir = tempdir()?;
    let destination = dir.path().join("job_karaoke.mp4");
    let encoder = MemoryEncoder::default();
    let assembler =
        VideoAssembler::new(renderer(RenderMode::Karaoke), encoder.clone()).with_batch_size(3);
    let snap = snapshot(&sample_words());

    let mut progress = Vec::new();
    let summary = assembler.assemble_with_audio(
        Some(Path::new("audio.wav")),
        1.0,
        &snap,
        &destination,
        |p| progress.push(p),
    )?;

    assert_eq!(summary.frame_count, 10);
    assert_eq!(summary.output, destination);
    assert_eq!(fs::read(&destination)?, b"mp4");

    let recording = encoder.recording.lock().unwrap();
    assert!(recording.finished);
    assert_eq!(recording.audio.as_deref(), Some(Path::new("audio.wav")));
    let spec = recording.spec.unwrap();
    assert_eq!((spec.width, spec.height, spec.fps), (64, 96, 10));
    // the encoder writes beside the destination, never to it directly
    let staging = recording.output.clone().unwrap();
    assert_ne!(staging, destination);
    assert_eq!(staging.parent(), destination.parent());
    assert!(!staging.exists());

    let expected: Vec<Frame> = (0..10)
        .map(|i| assembler.renderer().render(i as f64 / 10.0, &snap))
        .collect();
    assert_eq!(recording.frames, expected);

    assert!(progress.windows(2).all(|w| w[0] <= w[1]));
    assert!(progress.iter().all(|p| (0.0..=100.0).contains(p)));
    assert_eq!(progress.last().copied(), Some(100.0));
    assert!(progress[..progress.len() - 1].iter().all(|&p| p < 100.0));
    Ok(())
}

#[test]
fn encoder_failure_leaves_no_output() -> Result<()> {
    let dir = tempdir()?;
    let destination = dir.path().join("clip.mp4");
    let encoder = MemoryEncoder {
        fail_at_frame: Some(4),
        ..MemoryEncoder::default()
    };
    let assembler = VideoAssembler::new(renderer(RenderMode::MovieSubtitle), encoder.clone())
        .with_batch_size(2);

    let mut last = 0.0;
    let err = assembler
        .assemble_with_audio(
            Some(Path::new("audio.wav")),
            1.0,
            &snapshot(&sample_words()),
            &destination,
            |p| last = p,
        )
        .unwrap_err();

    assert!(matches!(err, ReelError::Encode(_)));
    assert!(last < 100.0);
    assert!(!destination.exists());
    assert_eq!(fs::read_dir(dir.path())?.count(), 0);
    assert!(!encoder.recording.lock().unwrap().finished);
    Ok(())
}

#[test]
fn cancellation_stops_between_batches() -> Result<()> {
    let dir = tempdir()?;
    let destination = dir.path().join("clip.mp4");
    let encoder = MemoryEncoder::default();
    let cancel = CancelToken::new();
    let trigger = cancel.clone();
    let assembler = VideoAssembler::new(renderer(RenderMode::Karaoke), encoder.clone())
        .with_batch_size(2)
        .with_cancel_token(cancel);

    let err = assembler
        .assemble_with_audio(
            Some(Path::new("audio.wav")),
            2.0,
            &snapshot(&sample_words()),
            &destination,
            |_| trigger.cancel(),
        )
        .unwrap_err();

    assert!(matches!(err, ReelError::Cancelled));
    assert_eq!(encoder.recording.lock().unwrap().frames.len(), 2);
    assert!(!destination.exists());
    assert_eq!(fs::read_dir(dir.path())?.count(), 0);
    Ok(())
}

#[test]
fn empty_transcript_renders_background_for_whole_audio() -> Result<()> {
    let dir = tempdir()?;
    let audio_path = dir.path().join("tone.wav");
    write_tone(&audio_path, 0.5, 1)?;
    let destination = dir.path().join("out").join("silent_karaoke.mp4");

    let encoder = MemoryEncoder::default();
    let assembler = VideoAssembler::new(renderer(RenderMode::MovieSubtitle), encoder.clone());
    let summary = assembler.assemble(
        &MediaSource::Audio(audio_path),
        &snapshot(&[]),
        &destination,
        |_| {},
    )?;

    assert_eq!(summary.frame_count, 5);
    approx::assert_abs_diff_eq!(summary.duration, 0.5, epsilon = 1e-6);
    assert!(destination.exists());

    let recording = encoder.recording.lock().unwrap();
    let background = assembler.renderer().background();
    assert_eq!(recording.frames.len(), 5);
    assert!(recording.frames.iter().all(|frame| *frame == background));
    // staged audio is removed once assembly returns
    assert!(!recording.audio.as_ref().unwrap().exists());
    Ok(())
}

#[test]
fn undecodable_source_is_reported() -> Result<()> {
    let dir = tempdir()?;
    let bogus = dir.path().join("clip.mp4");
    fs::write(&bogus, b"definitely not media")?;
    let assembler = VideoAssembler::new(renderer(RenderMode::Karaoke), MemoryEncoder::default());

    let err = assembler
        .assemble(
            &MediaSource::Video(bogus),
            &snapshot(&sample_words()),
            &dir.path().join("out.mp4"),
            |_| {},
        )
        .unwrap_err();
    assert!(matches!(err, ReelError::MediaDecode { .. }));
    assert!(!dir.path().join("out.mp4").exists());
    Ok(())
}

#[test]
fn stereo_source_reaches_encoder_intact() -> Result<()> {
    let dir = tempdir()?;
    let audio_path = dir.path().join("phase.wav");
    write_tone(&audio_path, 0.4, 2)?;
    let destination = dir.path().join("phase_karaoke.mp4");

    let encoder = MemoryEncoder::default();
    let assembler = VideoAssembler::new(renderer(RenderMode::MovieSubtitle), encoder.clone());
    let summary = assembler.assemble(
        &MediaSource::Audio(audio_path),
        &snapshot(&sample_words()),
        &destination,
        |_| {},
    )?;

    approx::assert_abs_diff_eq!(summary.duration, 0.4, epsilon = 1e-6);
    let recording = encoder.recording.lock().unwrap();
    let spec = recording.audio_spec.expect("staged audio was readable");
    assert_eq!(spec.channels, 2);
    assert_eq!(spec.sample_rate, 8_000);
    // out-of-phase channels cancel if mixed down
    assert!(recording.audio_peak > 9_000);
    Ok(())
}

#[test]
fn clip_without_audio_is_encoded_over_silence() -> Result<()> {
    let dir = tempdir()?;
    let destination = dir.path().join("mute.mp4");
    let encoder = MemoryEncoder::default();
    let assembler = VideoAssembler::new(renderer(RenderMode::Karaoke), encoder.clone());

    let summary = assembler.assemble_with_audio(
        None,
        0.5,
        &snapshot(&sample_words()),
        &destination,
        |_| {},
    )?;

    assert_eq!(summary.frame_count, 5);
    assert!(destination.exists());
    let recording = encoder.recording.lock().unwrap();
    assert!(recording.audio.is_none());
    assert!(recording.audio_spec.is_none());
    assert!(recording.finished);
    Ok(())
}

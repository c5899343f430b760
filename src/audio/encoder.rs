use crate::error::{ReelError, Result};
use crate::types::AudioData;
use std::io::BufWriter;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

/// Decoded audio re-encoded as a temporary 16-bit WAV for the muxer.
///
/// The file lives exactly as long as this value; dropping it removes the
/// file on every exit path, including unwinding.
#[derive(Debug)]
pub struct StagedAudio {
    file: NamedTempFile,
    duration: f64,
}

impl StagedAudio {
    pub fn write(audio: &AudioData) -> Result<Self> {
        let file = tempfile::Builder::new()
            .prefix("reelcaption-audio-")
            .suffix(".wav")
            .tempfile()?;
        write_wav(audio, &file)?;
        debug!(
            path = %file.path().display(),
            samples = audio.samples.len(),
            sample_rate = audio.sample_rate,
            "staged audio for muxing"
        );
        Ok(Self {
            file,
            duration: audio.duration(),
        })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }
}

fn write_wav(audio: &AudioData, target: &NamedTempFile) -> Result<()> {
    let spec = hound::WavSpec {
        channels: audio.channels.max(1),
        sample_rate: audio.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let encode_err = |err: hound::Error| ReelError::Encode(format!("staging WAV: {err}"));

    let handle = target.reopen()?;
    let mut writer = hound::WavWriter::new(BufWriter::new(handle), spec).map_err(encode_err)?;

    for &sample in &audio.samples {
        let clamped = sample.clamp(-1.0, 1.0);
        writer
            .write_sample((clamped * 32767.0) as i16)
            .map_err(encode_err)?;
    }

    writer.finalize().map_err(encode_err)?;
    Ok(())
}

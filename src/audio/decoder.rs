use crate::error::{ReelError, Result};
use crate::types::AudioData;
use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, Track};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, warn};

/// What a source file yields: its audio track, if any, and the longest
/// duration any of its tracks declares.
#[derive(Debug, Clone)]
pub struct DecodedMedia {
    pub audio: Option<AudioData>,
    pub container_duration: Option<f64>,
}

/// Decode the first audio track of a media file, keeping its channel layout.
///
/// Fails with `MediaDecode` when the file has no audio track; use
/// [`decode_media`] for sources where audio is optional.
pub fn decode_audio<P: AsRef<Path>>(path: P) -> Result<AudioData> {
    let path = path.as_ref();
    decode_media(path)?
        .audio
        .ok_or_else(|| ReelError::media_decode(path, "no audio track found"))
}

/// Probe a media file and decode its first audio track when one exists.
///
/// Works for audio-only files and for video containers symphonia can demux
/// (MP4/MOV, MKV/WebM, ...). Video tracks are not decoded; they only
/// contribute their declared duration.
pub fn decode_media<P: AsRef<Path>>(path: P) -> Result<DecodedMedia> {
    let path = path.as_ref();
    let fail = |reason: &dyn std::fmt::Display| ReelError::media_decode(path, reason);

    let file = std::fs::File::open(path).map_err(|err| fail(&err))?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(extension) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(extension);
    }

    let probe_result = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|err| fail(&format!("unrecognized container: {err}")))?;

    let mut format = probe_result.format;
    let container_duration = container_duration(format.tracks());

    let Some(track) = audio_track(format.tracks()) else {
        debug!(
            path = %path.display(),
            duration = ?container_duration,
            "source has no audio track"
        );
        return Ok(DecodedMedia {
            audio: None,
            container_duration,
        });
    };

    let track_id = track.id;
    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or_else(|| fail(&"sample rate not specified"))?;
    let mut channels = track
        .codec_params
        .channels
        .map(|layout| layout.count() as u16)
        .unwrap_or(0);

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|err| fail(&format!("unsupported codec: {err}")))?;

    let mut samples = Vec::new();
    let mut skipped_packets = 0usize;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(err))
                if err.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(err) => return Err(fail(&format!("failed to read packet: {err}"))),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            // A corrupt frame is skipped rather than failing the whole clip.
            Err(SymphoniaError::DecodeError(reason)) => {
                skipped_packets += 1;
                debug!(reason, "skipping undecodable packet");
                continue;
            }
            Err(err) => return Err(fail(&format!("failed to decode packet: {err}"))),
        };

        let spec = *decoded.spec();
        let packet_channels = spec.channels.count().max(1) as u16;
        if channels == 0 {
            channels = packet_channels;
        } else if packet_channels != channels {
            return Err(fail(&format!(
                "channel count changed mid-stream ({channels} -> {packet_channels})"
            )));
        }
        let mut interleaved = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
        interleaved.copy_interleaved_ref(decoded);
        samples.extend_from_slice(interleaved.samples());
    }

    if skipped_packets > 0 {
        warn!(
            path = %path.display(),
            skipped_packets,
            "some audio packets could not be decoded"
        );
    }

    Ok(DecodedMedia {
        audio: Some(AudioData {
            samples,
            sample_rate,
            channels: channels.max(1),
        }),
        container_duration,
    })
}

fn audio_track(tracks: &[Track]) -> Option<&Track> {
    tracks
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
}

/// Longest duration declared by any track's time base and frame count.
fn container_duration(tracks: &[Track]) -> Option<f64> {
    tracks
        .iter()
        .filter_map(|track| {
            let params = &track.codec_params;
            let time = params.time_base?.calc_time(params.n_frames?);
            Some(time.seconds as f64 + time.frac)
        })
        .filter(|seconds| seconds.is_finite() && *seconds > 0.0)
        .reduce(f64::max)
}

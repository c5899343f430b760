use std::ffi::OsString;
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStderr, ChildStdin, Command, Stdio};
use std::thread::{self, JoinHandle};

use tracing::{debug, info, warn};

use crate::error::{ReelError, Result};
use crate::render::Frame;

use super::{EncodeSession, EncodeSpec, Encoder};

/// Diagnostics kept from the encoder's stderr for error reports.
const STDERR_TAIL: usize = 64 * 1024;

/// Encodes through an `ffmpeg` child process fed raw RGB24 frames on stdin.
#[derive(Debug, Clone)]
pub struct FfmpegEncoder {
    binary: PathBuf,
}

impl FfmpegEncoder {
    /// Find `ffmpeg` on PATH.
    pub fn locate() -> Result<Self> {
        let binary = which::which("ffmpeg").map_err(|_| ReelError::EncoderUnavailable)?;
        Ok(Self::with_binary(binary))
    }

    pub fn with_binary(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// H.264 video from stdin muxed with AAC audio from `audio`, or with
    /// generated silence when there is none. Output length is pinned to
    /// the clip duration.
    pub fn args(&self, spec: &EncodeSpec, audio: Option<&Path>, output: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = [
            "-hide_banner",
            "-loglevel",
            "error",
            "-nostats",
            "-y",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgb24",
        ]
        .iter()
        .map(OsString::from)
        .collect();
        args.push("-s".into());
        args.push(format!("{}x{}", spec.width, spec.height).into());
        args.push("-r".into());
        args.push(spec.fps.to_string().into());
        args.push("-i".into());
        args.push("-".into());
        match audio {
            Some(path) => {
                args.push("-i".into());
                args.push(path.as_os_str().to_os_string());
            }
            None => {
                for arg in [
                    "-f",
                    "lavfi",
                    "-i",
                    "anullsrc=channel_layout=stereo:sample_rate=48000",
                ] {
                    args.push(arg.into());
                }
            }
        }
        for arg in [
            "-map",
            "0:v:0",
            "-map",
            "1:a:0",
            "-c:v",
            "libx264",
            "-preset",
            "medium",
            "-pix_fmt",
            "yuv420p",
            "-c:a",
            "aac",
            "-b:a",
            "192k",
            "-movflags",
            "+faststart",
        ] {
            args.push(arg.into());
        }
        args.push("-t".into());
        args.push(format!("{:.3}", spec.duration).into());
        args.push("-f".into());
        args.push("mp4".into());
        args.push(output.as_os_str().to_os_string());
        args
    }
}

impl Encoder for FfmpegEncoder {
    type Session = FfmpegSession;

    fn open(
        &self,
        spec: &EncodeSpec,
        audio: Option<&Path>,
        output: &Path,
    ) -> Result<FfmpegSession> {
        let mut command = Command::new(&self.binary);
        command.args(self.args(spec, audio, output));
        let session = FfmpegSession::spawn(command, spec.frame_len())?;
        info!(
            binary = %self.binary.display(),
            size = %format!("{}x{}", spec.width, spec.height),
            fps = spec.fps,
            frames = spec.frame_count,
            silent = audio.is_none(),
            "spawned ffmpeg encoder"
        );
        Ok(session)
    }
}

pub struct FfmpegSession {
    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stderr: Option<JoinHandle<Vec<u8>>>,
    frame_len: usize,
}

impl FfmpegSession {
    /// Start `command` with piped stdio. Stderr is drained on a separate
    /// thread so a chatty encoder never stalls frame writes.
    pub(crate) fn spawn(mut command: Command, frame_len: usize) -> Result<Self> {
        let mut child = command
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| {
                if err.kind() == ErrorKind::NotFound {
                    ReelError::EncoderUnavailable
                } else {
                    ReelError::Encode(format!("failed to spawn ffmpeg: {err}"))
                }
            })?;
        let session = Self {
            stdin: child.stdin.take(),
            stderr: child.stderr.take().map(drain_stderr),
            child: Some(child),
            frame_len,
        };
        // dropping the session stops the child
        if session.stdin.is_none() {
            return Err(ReelError::Encode(
                "failed to capture ffmpeg stdin".to_string(),
            ));
        }
        Ok(session)
    }
}

fn drain_stderr(mut stderr: ChildStderr) -> JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut tail = Vec::new();
        let mut buf = [0u8; 8192];
        loop {
            match stderr.read(&mut buf) {
                Ok(0) | Err(_) => break,
                Ok(n) => {
                    tail.extend_from_slice(&buf[..n]);
                    if tail.len() > STDERR_TAIL {
                        let excess = tail.len() - STDERR_TAIL;
                        tail.drain(..excess);
                    }
                }
            }
        }
        tail
    })
}

impl EncodeSession for FfmpegSession {
    fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        if frame.as_bytes().len() != self.frame_len {
            return Err(ReelError::Encode(format!(
                "frame has {} bytes, encoder expects {}",
                frame.as_bytes().len(),
                self.frame_len
            )));
        }
        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| ReelError::Encode("ffmpeg stdin already closed".to_string()))?;
        stdin.write_all(frame.as_bytes()).map_err(|err| {
            if err.kind() == ErrorKind::BrokenPipe {
                ReelError::Encode("ffmpeg exited before all frames were written".to_string())
            } else {
                ReelError::Encode(format!("failed to write frame to ffmpeg: {err}"))
            }
        })
    }

    fn finish(mut self) -> Result<()> {
        if let Some(mut stdin) = self.stdin.take() {
            stdin
                .flush()
                .map_err(|err| ReelError::Encode(format!("failed to flush ffmpeg stdin: {err}")))?;
        }
        let mut child = self
            .child
            .take()
            .ok_or_else(|| ReelError::Encode("ffmpeg already finished".to_string()))?;
        let status = child
            .wait()
            .map_err(|err| ReelError::Encode(format!("failed waiting for ffmpeg: {err}")))?;
        let stderr = self
            .stderr
            .take()
            .and_then(|handle| handle.join().ok())
            .unwrap_or_default();
        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr);
            return Err(ReelError::Encode(format!(
                "ffmpeg failed with {}: {}",
                status,
                stderr.trim()
            )));
        }
        debug!("ffmpeg finished");
        Ok(())
    }
}

impl Drop for FfmpegSession {
    // Reached with a live child only when the run was abandoned.
    fn drop(&mut self) {
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            if let Err(err) = child.kill() {
                warn!(error = %err, "failed to stop abandoned ffmpeg process");
            }
            let _ = child.wait();
        }
    }
}

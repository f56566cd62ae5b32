use crate::common::upload::partial_path;
use crate::modules::movie::model::Quality;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;
use tracing::{debug, warn};

const STDERR_TAIL_LINES: usize = 20;

/// Target format for one derived rendition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenditionProfile {
    pub quality: Quality,
    pub width: u32,
    pub crf: u8,
    pub preset: &'static str,
}

impl RenditionProfile {
    pub const HD: Self = Self {
        quality: Quality::Hd,
        width: 1280,
        crf: 22,
        preset: "medium",
    };

    pub const SD: Self = Self {
        quality: Quality::Sd,
        width: 854,
        crf: 23,
        preset: "medium",
    };

    pub fn label(&self) -> &'static str {
        match self.quality {
            Quality::Hd => "HD (720p)",
            Quality::Sd => "SD (480p)",
            Quality::Source => "source",
        }
    }

    /// Encoder arguments producing a fragmented H.264/AAC MP4 at this profile's width.
    pub fn ffmpeg_args(&self, input: &Path, output: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = ["-hide_banner", "-nostdin", "-y", "-i"]
            .into_iter()
            .map(OsString::from)
            .collect();
        args.push(input.as_os_str().to_owned());
        for arg in [
            "-vf".to_string(),
            format!("scale={}:-2", self.width),
            "-c:v".into(),
            "libx264".into(),
            "-preset".into(),
            self.preset.into(),
            "-crf".into(),
            self.crf.to_string(),
            "-c:a".into(),
            "aac".into(),
            "-movflags".into(),
            "frag_keyframe+empty_moov".into(),
            "-f".into(),
            "mp4".into(),
            "-progress".into(),
            "pipe:1".into(),
            "-nostats".into(),
        ] {
            args.push(arg.into());
        }
        args.push(output.as_os_str().to_owned());
        args
    }
}

#[derive(Debug)]
pub struct EncodeRequest {
    pub input: PathBuf,
    pub output: PathBuf,
    pub profile: RenditionProfile,
}

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("input file not found: {0}")]
    MissingInput(PathBuf),

    #[error("failed to launch encoder: {0}")]
    Spawn(#[source] io::Error),

    #[error("encoder exited with {status}: {detail}")]
    Failed { status: String, detail: String },

    #[error("encoder timed out after {0:?}")]
    TimedOut(Duration),

    #[error("encoder io error: {0}")]
    Io(#[from] io::Error),
}

/// Produces one derived rendition from a source file.
///
/// Progress percentages (0-100) are sent on `progress` while the encode runs.
/// On success the returned path is the finished output; on failure no file is
/// left at `request.output`.
#[async_trait]
pub trait RenditionEncoder: Send + Sync {
    async fn encode(
        &self,
        request: EncodeRequest,
        progress: mpsc::Sender<f64>,
    ) -> Result<PathBuf, EncodeError>;
}

/// Runs the external `ffmpeg` binary.
#[derive(Debug, Clone)]
pub struct FfmpegEncoder {
    ffmpeg_path: String,
    ffprobe_path: String,
    timeout: Option<Duration>,
}

impl FfmpegEncoder {
    pub fn new(ffmpeg_path: impl Into<String>, ffprobe_path: impl Into<String>) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
            ffprobe_path: ffprobe_path.into(),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    async fn probe_duration(&self, input: &Path) -> Option<f64> {
        let output = Command::new(&self.ffprobe_path)
            .args([
                "-v",
                "error",
                "-show_entries",
                "format=duration",
                "-of",
                "default=noprint_wrappers=1:nokey=1",
            ])
            .arg(input)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await;

        match output {
            Ok(out) if out.status.success() => {
                let text = String::from_utf8_lossy(&out.stdout);
                text.trim().parse::<f64>().ok().filter(|d| *d > 0.0)
            }
            Ok(out) => {
                warn!(
                    "ffprobe failed for {}: {}",
                    input.display(),
                    String::from_utf8_lossy(&out.stderr).trim()
                );
                None
            }
            Err(e) => {
                warn!("Could not run ffprobe: {}", e);
                None
            }
        }
    }
}

#[async_trait]
impl RenditionEncoder for FfmpegEncoder {
    async fn encode(
        &self,
        request: EncodeRequest,
        progress: mpsc::Sender<f64>,
    ) -> Result<PathBuf, EncodeError> {
        let EncodeRequest {
            input,
            output,
            profile,
        } = request;

        if !tokio::fs::try_exists(&input).await.unwrap_or(false) {
            return Err(EncodeError::MissingInput(input));
        }
        if let Some(parent) = output.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let duration = self.probe_duration(&input).await;
        let partial = partial_path(&output);

        let mut child = Command::new(&self.ffmpeg_path)
            .args(profile.ffmpeg_args(&input, &partial))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(EncodeError::Spawn)?;

        debug!(
            "Encoding {} -> {} ({})",
            input.display(),
            output.display(),
            profile.label()
        );

        let progress_task = child
            .stdout
            .take()
            .map(|stdout| tokio::spawn(forward_progress(stdout, duration, progress)));
        let stderr_task = child.stderr.take().map(|stderr| tokio::spawn(stderr_tail(stderr)));

        let status = match self.timeout {
            Some(limit) => {
                let waited = tokio::time::timeout(limit, child.wait()).await;
                match waited {
                    Ok(status) => status?,
                    Err(_) => {
                        let _ = child.kill().await;
                        remove_partial(&partial).await;
                        return Err(EncodeError::TimedOut(limit));
                    }
                }
            }
            None => child.wait().await?,
        };

        if let Some(task) = progress_task {
            let _ = task.await;
        }
        let detail = match stderr_task {
            Some(task) => task.await.unwrap_or_default(),
            None => String::new(),
        };

        if !status.success() {
            remove_partial(&partial).await;
            return Err(EncodeError::Failed {
                status: status.to_string(),
                detail,
            });
        }

        if let Err(e) = tokio::fs::rename(&partial, &output).await {
            remove_partial(&partial).await;
            return Err(e.into());
        }
        Ok(output)
    }
}

async fn remove_partial(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        if e.kind() != io::ErrorKind::NotFound {
            warn!("Failed to remove partial output {}: {}", path.display(), e);
        }
    }
}

async fn forward_progress<R: AsyncRead + Unpin>(
    stdout: R,
    duration: Option<f64>,
    tx: mpsc::Sender<f64>,
) {
    let mut parser = ProgressParser::new(duration);
    let mut lines = BufReader::new(stdout).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        if let Some(percent) = parser.feed(&line) {
            if tx.send(percent).await.is_err() {
                break;
            }
        }
    }
}

async fn stderr_tail<R: AsyncRead + Unpin>(stderr: R) -> String {
    let mut tail = VecDeque::with_capacity(STDERR_TAIL_LINES);
    let mut lines = BufReader::new(stderr).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        if tail.len() == STDERR_TAIL_LINES {
            tail.pop_front();
        }
        tail.push_back(line);
    }
    Vec::from(tail).join("\n")
}

/// Turns `-progress` key/value lines into completion percentages.
#[derive(Debug)]
pub(crate) struct ProgressParser {
    duration_secs: Option<f64>,
}

impl ProgressParser {
    pub(crate) fn new(duration_secs: Option<f64>) -> Self {
        Self { duration_secs }
    }

    pub(crate) fn feed(&mut self, line: &str) -> Option<f64> {
        let (key, value) = line.trim().split_once('=')?;
        match key {
            // Despite the name, ffmpeg reports this field in microseconds.
            "out_time_ms" => {
                let micros = value.trim().parse::<f64>().ok()?;
                let total = self.duration_secs?;
                Some((micros / 1_000_000.0 / total * 100.0).clamp(0.0, 100.0))
            }
            "progress" if value.trim() == "end" => Some(100.0),
            _ => None,
        }
    }
}

use anyhow::Context as _;
use std::path::Path;

use crate::config::AudioConfig;
use crate::process::{self, Invocation, Runner};

pub const EPS: i64 = 1000 * 1000; // 1 second

/// Resamples `input` into a PCM wav file.
pub fn to_wav(ffmpeg: &Path, input: &Path, output: &Path, audio: &AudioConfig) -> Invocation {
    Invocation::new(ffmpeg)
        .args(["-y", "-i"])
        .arg(input)
        .arg("-ar")
        .arg(audio.sample_rate.to_string())
        .arg("-ac")
        .arg(audio.channels.to_string())
        .arg(output)
}

/// Copies `length` seconds of `input` starting at `start` into `output`.
pub fn cut(ffmpeg: &Path, input: &Path, start: f64, length: f64, output: &Path) -> Invocation {
    Invocation::new(ffmpeg)
        .args(["-y", "-ss"])
        .arg(format!("{:.3}", start))
        .arg("-i")
        .arg(input)
        .arg("-t")
        .arg(format!("{:.3}", length))
        .arg(output)
}

pub fn probe(ffprobe: &Path, media: &Path) -> Invocation {
    Invocation::new(ffprobe)
        .args([
            "-v",
            "error",
            "-show_entries",
            "format=duration",
            "-of",
            "default=noprint_wrappers=1:nokey=1",
        ])
        .arg(media)
}

/// Container duration of `media` in microseconds.
pub async fn duration_micro(
    runner: &dyn Runner,
    ffprobe: &Path,
    media: &Path,
) -> Result<i64, anyhow::Error> {
    let stdout = process::check_output(runner, &probe(ffprobe, media)).await?;
    parse_duration_micro(&stdout)
        .with_context(|| format!("failed to read duration of {}", media.display()))
}

fn parse_duration_micro(stdout: &[u8]) -> Result<i64, anyhow::Error> {
    let text = std::str::from_utf8(stdout)?.trim();
    let seconds: f64 = text
        .parse()
        .with_context(|| format!("unexpected ffprobe output {:?}", text))?;
    anyhow::ensure!(
        seconds.is_finite() && seconds >= 0.0,
        "unexpected duration {}",
        seconds
    );
    Ok((seconds * 1_000_000.0).round() as i64)
}

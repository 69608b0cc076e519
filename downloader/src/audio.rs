use anyhow::Context as _;
use log::info;

use crate::downloader::TwitchDownloader;
use crate::ffmpeg;
use crate::process::{self, Invocation};

/// Downloads the VOD's audio track and converts it to wav for transcription.
pub async fn fetch_audio(dl: &TwitchDownloader<'_>) -> Result<(), anyhow::Error> {
    info!(">>> Downloading audio for video ID: {}", dl.vod);
    let paths = &dl.paths;
    let tools = &dl.config.tools;
    crate::ensure_absent(&paths.wav)?;

    let download = Invocation::new(&tools.yt_dlp)
        .args(["--extract-audio", "--audio-format", "m4a", "-o"])
        .arg(&paths.audio_m4a)
        .arg("--ffmpeg-location")
        .arg(&tools.ffmpeg)
        .arg(dl.vod.url());
    process::check(dl.runner, &download)
        .await
        .context("audio download failed")?;
    info!("m4a file downloaded: {}", paths.audio_m4a.display());

    let convert = ffmpeg::to_wav(&tools.ffmpeg, &paths.audio_m4a, &paths.wav, &dl.config.audio);
    process::check(dl.runner, &convert)
        .await
        .context("wav conversion failed")?;
    info!("wav file converted: {}", paths.wav.display());

    let m4a_duration_micro =
        ffmpeg::duration_micro(dl.runner, &tools.ffprobe, &paths.audio_m4a).await?;
    let wav_duration_micro = ffmpeg::duration_micro(dl.runner, &tools.ffprobe, &paths.wav).await?;
    if (m4a_duration_micro - wav_duration_micro).abs() > ffmpeg::EPS {
        anyhow::bail!(
            "Duration mismatch: M4A {}, WAV {} (microsecond)",
            m4a_duration_micro,
            wav_duration_micro
        );
    }
    Ok(())
}

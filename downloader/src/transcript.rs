use anyhow::Context as _;
use log::info;
use std::path::Path;

use crate::downloader::TwitchDownloader;
use crate::ffmpeg;
use crate::process::{self, Invocation};

/// A recognised span of speech, in seconds from the start of the VOD.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

#[derive(serde::Serialize)]
struct TranscriptRow<'a> {
    time: String,
    text: &'a str,
}

/// Transcribes the wav file chunk by chunk and writes the transcript TSV.
/// Returns the number of segments written.
pub async fn transcribe_audio(dl: &TwitchDownloader<'_>) -> Result<usize, anyhow::Error> {
    info!(">>> Transcribing audio for video ID: {}", dl.vod);
    let paths = &dl.paths;
    let tools = &dl.config.tools;
    let settings = &dl.config.transcribe;
    crate::ensure_absent(&paths.transcript_tsv)?;

    let duration_micro = ffmpeg::duration_micro(dl.runner, &tools.ffprobe, &paths.wav).await?;
    let chunks = chunk_plan(duration_micro, i64::from(settings.chunk_seconds) * 1_000_000);
    let num_chunks = chunks.len();

    let workdir = tempfile::Builder::new()
        .prefix("transcribe-")
        .tempdir_in(&paths.dir)
        .with_context(|| format!("failed to create a work directory in {}", paths.dir.display()))?;

    let mut segments = Vec::new();
    for (idx, (offset_micro, length_micro)) in chunks.into_iter().enumerate() {
        info!("Transcribing chunk {}/{}", idx + 1, num_chunks);
        let offset = offset_micro as f64 / 1_000_000.0;
        let length = length_micro as f64 / 1_000_000.0;
        let chunk_path = workdir.path().join(format!("chunk_{:05}.wav", idx));
        let prefix = workdir.path().join(format!("chunk_{:05}", idx));

        let cut = ffmpeg::cut(&tools.ffmpeg, &paths.wav, offset, length, &chunk_path);
        process::check(dl.runner, &cut)
            .await
            .with_context(|| format!("failed to cut chunk {}", idx))?;

        let whisper = whisper_invocation(dl, &chunk_path, &prefix);
        process::check(dl.runner, &whisper)
            .await
            .with_context(|| format!("failed to transcribe chunk {}", idx))?;

        let tsv_path = prefix.with_extension("tsv");
        let body = std::fs::read_to_string(&tsv_path)
            .with_context(|| format!("failed to read {}", tsv_path.display()))?;
        segments.extend(
            parse_whisper_tsv(&body, offset)
                .with_context(|| format!("unexpected whisper output in {}", tsv_path.display()))?,
        );
    }

    if segments.is_empty() {
        info!("No transcript data found.");
        return Ok(0);
    }
    info!("Found {} transcript segments.", segments.len());
    segments.sort_by(|a, b| a.start.total_cmp(&b.start));
    let rows: Vec<_> = segments
        .iter()
        .map(|segment| TranscriptRow {
            time: format_timestamp(segment.start),
            text: &segment.text,
        })
        .collect();
    crate::write_tsv(&paths.transcript_tsv, &rows)?;
    info!("Transcript saved to {}", paths.transcript_tsv.display());
    Ok(rows.len())
}

/// Shortest tail worth its own chunk; anything shorter is dropped.
const MIN_CHUNK_MICRO: i64 = 1000;

/// `(offset, length)` pairs in microseconds covering `duration_micro`.
fn chunk_plan(duration_micro: i64, chunk_micro: i64) -> Vec<(i64, i64)> {
    let mut chunks = Vec::new();
    let mut offset = 0;
    while duration_micro - offset >= MIN_CHUNK_MICRO {
        let length = chunk_micro.min(duration_micro - offset);
        chunks.push((offset, length));
        offset += chunk_micro;
    }
    chunks
}

fn whisper_invocation(dl: &TwitchDownloader<'_>, chunk: &Path, prefix: &Path) -> Invocation {
    let settings = &dl.config.transcribe;
    Invocation::new(&dl.config.tools.whisper)
        .arg("-m")
        .arg(&settings.model)
        .arg("-l")
        .arg(&settings.language)
        .arg("-bs")
        .arg(settings.beam_size.to_string())
        .arg("-t")
        .arg(settings.threads.to_string())
        .arg("-otsv")
        .arg("-of")
        .arg(prefix)
        .arg("-f")
        .arg(chunk)
}

/// Parses whisper.cpp's `-otsv` output (`start`, `end` in milliseconds, then
/// text) and shifts it by `offset` seconds.
pub fn parse_whisper_tsv(body: &str, offset: f64) -> Result<Vec<Segment>, anyhow::Error> {
    let mut segments = Vec::new();
    for (lineno, line) in body.lines().enumerate() {
        if line.trim().is_empty() || (lineno == 0 && line.starts_with("start")) {
            continue;
        }
        let mut fields = line.splitn(3, '\t');
        let (start, end, text) = match (fields.next(), fields.next(), fields.next()) {
            (Some(start), Some(end), Some(text)) => (start, end, text),
            _ => anyhow::bail!("line {}: expected 3 tab-separated fields", lineno + 1),
        };
        let start: u64 = start
            .trim()
            .parse()
            .with_context(|| format!("line {}: bad start {:?}", lineno + 1, start))?;
        let end: u64 = end
            .trim()
            .parse()
            .with_context(|| format!("line {}: bad end {:?}", lineno + 1, end))?;
        segments.push(Segment {
            start: offset + start as f64 / 1000.0,
            end: offset + end as f64 / 1000.0,
            text: text.trim().to_owned(),
        });
    }
    Ok(segments)
}

/// `HH:MM:SS.mmm`
pub fn format_timestamp(seconds: f64) -> String {
    let hours = (seconds / 3600.0).floor();
    let rem = seconds - hours * 3600.0;
    let minutes = (rem / 60.0).floor();
    let secs = rem - minutes * 60.0;
    format!("{:02}:{:02}:{:06.3}", hours as u64, minutes as u64, secs)
}

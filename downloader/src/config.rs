use anyhow::Context as _;
use std::path::{Path, PathBuf};

const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(default)]
pub struct Config {
    pub tools: ToolsConfig,
    pub audio: AudioConfig,
    pub transcribe: TranscribeConfig,
}

/// Locations of the external binaries.
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub downloader: PathBuf,
    pub yt_dlp: PathBuf,
    pub ffmpeg: PathBuf,
    pub ffprobe: PathBuf,
    pub whisper: PathBuf,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            downloader: PathBuf::from("./TwitchDownloaderCLI"),
            yt_dlp: PathBuf::from("yt-dlp"),
            ffmpeg: PathBuf::from("./ffmpeg"),
            ffprobe: PathBuf::from("ffprobe"),
            whisper: PathBuf::from("whisper-cli"),
        }
    }
}

#[derive(Debug, Clone, serde::Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    pub sample_rate: u32,
    pub channels: u32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: 16000,
            channels: 1,
        }
    }
}

#[derive(Debug, Clone, serde::Deserialize)]
#[serde(default)]
pub struct TranscribeConfig {
    pub model: PathBuf,
    pub language: String,
    pub beam_size: u32,
    pub threads: u32,
    pub chunk_seconds: u32,
}

impl Default for TranscribeConfig {
    fn default() -> Self {
        Self {
            model: PathBuf::from("models/ggml-tiny.bin"),
            language: "en".to_owned(),
            beam_size: 1,
            threads: 4,
            chunk_seconds: 120,
        }
    }
}

/// Reads `path`, or `config.toml` when it exists, or falls back to defaults.
pub fn load_config(path: Option<&Path>) -> Result<Config, anyhow::Error> {
    let path = match path {
        Some(path) => path,
        None => {
            let path = Path::new(DEFAULT_CONFIG_PATH);
            if !path.exists() {
                log::debug!("{} not found, using built-in defaults", DEFAULT_CONFIG_PATH);
                return Ok(Config::default());
            }
            path
        }
    };
    let body = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_config(&body).with_context(|| format!("invalid config {}", path.display()))
}

pub fn parse_config(body: &str) -> Result<Config, anyhow::Error> {
    let config: Config = toml::from_str(body)?;
    anyhow::ensure!(
        config.transcribe.chunk_seconds > 0,
        "transcribe.chunk_seconds must be positive"
    );
    anyhow::ensure!(config.audio.sample_rate > 0, "audio.sample_rate must be positive");
    anyhow::ensure!(config.audio.channels > 0, "audio.channels must be positive");
    Ok(config)
}

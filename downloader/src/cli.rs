use std::ffi::OsString;
use std::path::PathBuf;

use crate::downloader::Stages;
use crate::vod::VodId;

/// Download a Twitch VOD's chat and audio, and transcribe the audio.
#[derive(clap::Parser, Debug)]
#[command(name = "twitch-downloader", version)]
pub struct Args {
    /// Twitch video ID (or VOD URL) to download
    #[arg(long = "video_id", visible_alias = "vod", value_name = "VOD_ID")]
    pub video_id: VodId,

    /// Directory to save the downloaded files under
    #[arg(
        long = "output_dir",
        visible_alias = "output",
        value_name = "DIR",
        default_value = "data"
    )]
    pub output_dir: PathBuf,

    /// Config file (defaults to ./config.toml when present)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Do not download the chat
    #[arg(long)]
    pub skip_chat: bool,

    /// Do not download or convert the audio
    #[arg(long)]
    pub skip_audio: bool,

    /// Do not transcribe the audio
    #[arg(long)]
    pub skip_transcript: bool,
}

impl Args {
    pub fn parse_from_env() -> Self {
        <Self as clap::Parser>::parse_from(normalize_legacy_flags(std::env::args_os()))
    }

    pub fn try_parse_from_args<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        <Self as clap::Parser>::try_parse_from(normalize_legacy_flags(args))
    }

    pub fn stages(&self) -> Stages {
        Stages {
            chat: !self.skip_chat,
            audio: !self.skip_audio,
            transcript: !self.skip_transcript,
        }
    }
}

const LEGACY_FLAGS: &[&str] = &["-vod", "-output"];

/// Rewrites `-vod`/`-output` (single dash, as the old script took them) to
/// their long forms. Arguments after `--` are left alone.
pub fn normalize_legacy_flags<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut options_ended = false;
    args.into_iter()
        .map(Into::into)
        .map(|arg| {
            if options_ended {
                return arg;
            }
            if arg == "--" {
                options_ended = true;
                return arg;
            }
            match arg.to_str() {
                Some(s) => {
                    let name = s.split('=').next().unwrap_or(s);
                    if LEGACY_FLAGS.contains(&name) {
                        OsString::from(format!("-{}", s))
                    } else {
                        arg
                    }
                }
                None => arg,
            }
        })
        .collect()
}

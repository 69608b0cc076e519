use anyhow::Context as _;
use std::path::Path;

use crate::config::Config;
use crate::process::Runner;
use crate::vod::{VodId, VodPaths};

/// Which steps of a run to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stages {
    pub chat: bool,
    pub audio: bool,
    pub transcript: bool,
}

impl Default for Stages {
    fn default() -> Self {
        Self {
            chat: true,
            audio: true,
            transcript: true,
        }
    }
}

/// Everything the stages need to work on one VOD.
pub struct TwitchDownloader<'a> {
    pub config: &'a Config,
    pub runner: &'a dyn Runner,
    pub vod: VodId,
    pub paths: VodPaths,
}

impl<'a> TwitchDownloader<'a> {
    pub fn new<P>(config: &'a Config, runner: &'a dyn Runner, vod: VodId, output_dir: P) -> Self
    where
        P: AsRef<Path>,
    {
        let paths = VodPaths::new(output_dir, &vod);
        Self {
            config,
            runner,
            vod,
            paths,
        }
    }

    /// Runs the selected stages in order, stopping at the first failure.
    pub async fn run(&self, stages: Stages) -> Result<(), anyhow::Error> {
        std::fs::create_dir_all(&self.paths.dir)
            .with_context(|| format!("failed to create {}", self.paths.dir.display()))?;

        if stages.chat {
            crate::chat::fetch_chat(self).await?;
        }
        if stages.audio {
            crate::audio::fetch_audio(self).await?;
        }
        if stages.transcript {
            crate::transcript::transcribe_audio(self).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::MockRunner;
    use crate::testing::{self, CHAT_HTML};
    use crate::ToolFailure;
    use mockall::Sequence;

    fn ext_is(invocation: &crate::process::Invocation, ext: &str) -> bool {
        testing::last_arg(invocation)
            .extension()
            .map_or(false, |e| e == ext)
    }

    #[tokio::test]
    async fn full_run_invokes_downloader_once_then_transcoder() {
        let dir = tempfile::tempdir().unwrap();
        let output_dir = dir.path().join("data");
        let config = Config::default();
        let m4a = output_dir.join("31337/31337.m4a");

        let mut seq = Sequence::new();
        let mut runner = MockRunner::new();
        runner
            .expect_run()
            .withf(|invocation, _| {
                invocation.program_name() == "TwitchDownloaderCLI"
                    && invocation.value_of("--id") == Some(std::ffi::OsStr::new("31337"))
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(|invocation, _| {
                std::fs::write(testing::path_after(invocation, "-o"), CHAT_HTML)?;
                testing::ok()
            });
        runner
            .expect_run()
            .withf(|invocation, _| invocation.program_name() == "yt-dlp")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| testing::ok());
        runner
            .expect_run()
            .withf(move |invocation, _| {
                invocation.program_name() == "ffmpeg"
                    && invocation.value_of("-ar").is_some()
                    && invocation.value_of("-i") == Some(m4a.as_os_str())
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| testing::ok());
        runner
            .expect_run()
            .withf(|invocation, _| invocation.program_name() == "ffprobe" && ext_is(invocation, "m4a"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| testing::ok_stdout("60.000000\n"));
        runner
            .expect_run()
            .withf(|invocation, _| invocation.program_name() == "ffprobe" && ext_is(invocation, "wav"))
            .times(2)
            .in_sequence(&mut seq)
            .returning(|_, _| testing::ok_stdout("60.000000\n"));
        runner
            .expect_run()
            .withf(|invocation, _| {
                invocation.program_name() == "ffmpeg" && invocation.value_of("-ss").is_some()
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| testing::ok());
        runner
            .expect_run()
            .withf(|invocation, _| invocation.program_name() == "whisper-cli")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|invocation, _| {
                let prefix = testing::path_after(invocation, "-of");
                std::fs::write(prefix.with_extension("tsv"), "start\tend\ttext\n0\t1000\t hi\n")?;
                testing::ok()
            });

        let dl = TwitchDownloader::new(&config, &runner, "31337".parse().unwrap(), &output_dir);
        dl.run(Stages::default()).await.unwrap();

        assert!(output_dir.join("31337/31337_chat.tsv").exists());
        assert!(output_dir.join("31337/31337_transcript.tsv").exists());
    }

    #[tokio::test]
    async fn skipped_stages_run_no_tools() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        let mut runner = MockRunner::new();
        runner
            .expect_run()
            .withf(|invocation, _| invocation.program_name() == "TwitchDownloaderCLI")
            .times(1)
            .returning(|invocation, _| {
                std::fs::write(testing::path_after(invocation, "-o"), CHAT_HTML)?;
                testing::ok()
            });
        let dl = TwitchDownloader::new(&config, &runner, "5".parse().unwrap(), dir.path());

        dl.run(Stages {
            chat: true,
            audio: false,
            transcript: false,
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn failure_stops_later_stages() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        let mut runner = MockRunner::new();
        runner
            .expect_run()
            .withf(|invocation, _| invocation.program_name() == "TwitchDownloaderCLI")
            .times(1)
            .returning(|_, _| testing::exit(7));
        let dl = TwitchDownloader::new(&config, &runner, "5".parse().unwrap(), dir.path());

        let err = dl.run(Stages::default()).await.unwrap_err();
        assert_eq!(crate::exit_code(&err), 7);
        assert!(err.downcast_ref::<ToolFailure>().is_some());
    }
}

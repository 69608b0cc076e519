pub mod audio;
pub mod chat;
pub mod cli;
pub mod config;
pub mod downloader;
pub mod ffmpeg;
pub mod process;
pub mod transcript;
pub mod vod;

#[cfg(test)]
mod testing;

pub use config::{load_config, Config};
pub use downloader::{Stages, TwitchDownloader};
pub use process::{Runner, SystemRunner, ToolFailure};
pub use vod::{VodId, VodPaths};

use anyhow::Context as _;
use std::path::{Path, PathBuf};

/// A stage's output is already on disk.
#[derive(Debug)]
pub struct AlreadyExists {
    pub path: PathBuf,
}

impl std::fmt::Display for AlreadyExists {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} already exists; delete it manually to run this step again",
            self.path.display()
        )
    }
}

impl std::error::Error for AlreadyExists {}

fn ensure_absent(path: &Path) -> Result<(), AlreadyExists> {
    if path.exists() {
        Err(AlreadyExists {
            path: path.to_owned(),
        })
    } else {
        Ok(())
    }
}

/// Writes `rows` as tab-separated values with a header line taken from the
/// field names.
fn write_tsv<S>(path: &Path, rows: &[S]) -> Result<(), anyhow::Error>
where
    S: serde::Serialize,
{
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer
        .flush()
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

/// Process exit status for an error returned by a run.
pub fn exit_code(error: &anyhow::Error) -> u8 {
    error
        .downcast_ref::<ToolFailure>()
        .map(ToolFailure::exit_code)
        .unwrap_or(1)
}

use anyhow::Context as _;
use std::ffi::{OsStr, OsString};
use std::path::PathBuf;

/// A single external program call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<OsString>,
}

impl Invocation {
    pub fn new<P>(program: P) -> Self
    where
        P: Into<PathBuf>,
    {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg<S>(mut self, arg: S) -> Self
    where
        S: AsRef<OsStr>,
    {
        self.args.push(arg.as_ref().to_owned());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_owned()));
        self
    }

    /// File name of the program, e.g. `ffmpeg` for `./bin/ffmpeg`.
    pub fn program_name(&self) -> String {
        self.program
            .file_name()
            .unwrap_or_else(|| self.program.as_os_str())
            .to_string_lossy()
            .into_owned()
    }

    /// Value following `flag` in the argument list.
    pub fn value_of(&self, flag: &str) -> Option<&OsStr> {
        self.args
            .iter()
            .position(|a| a == flag)
            .and_then(|i| self.args.get(i + 1))
            .map(OsString::as_os_str)
    }
}

impl std::fmt::Display for Invocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            let arg = arg.to_string_lossy();
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " {:?}", arg)?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

/// How a child process ended.
#[derive(Debug, Clone, Default)]
pub struct Finished {
    /// `None` when the process was terminated by a signal.
    pub code: Option<i32>,
    pub stdout: Vec<u8>,
}

impl Finished {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// An external tool ran and exited unsuccessfully.
#[derive(Debug)]
pub struct ToolFailure {
    pub program: String,
    pub code: Option<i32>,
}

impl ToolFailure {
    /// Exit status to hand back to our own caller.
    pub fn exit_code(&self) -> u8 {
        self.code
            .and_then(|c| u8::try_from(c).ok())
            .filter(|c| *c != 0)
            .unwrap_or(1)
    }
}

impl std::fmt::Display for ToolFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.code {
            Some(code) => write!(f, "{} exited with status {}", self.program, code),
            None => write!(f, "{} was terminated by a signal", self.program),
        }
    }
}

impl std::error::Error for ToolFailure {}

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait Runner: Send + Sync {
    /// Runs `invocation` to completion. stderr is always inherited; stdout is
    /// inherited too unless `capture_stdout` is set.
    async fn run(&self, invocation: &Invocation, capture_stdout: bool)
        -> anyhow::Result<Finished>;
}

/// Spawns real child processes.
pub struct SystemRunner;

#[async_trait::async_trait]
impl Runner for SystemRunner {
    async fn run(
        &self,
        invocation: &Invocation,
        capture_stdout: bool,
    ) -> anyhow::Result<Finished> {
        log::debug!("$ {}", invocation);
        let mut command = tokio::process::Command::new(&invocation.program);
        command.args(&invocation.args);
        if capture_stdout {
            let output = command
                .stderr(std::process::Stdio::inherit())
                .output()
                .await
                .with_context(|| format!("failed to run {}", invocation.program.display()))?;
            Ok(Finished {
                code: output.status.code(),
                stdout: output.stdout,
            })
        } else {
            let status = command
                .status()
                .await
                .with_context(|| format!("failed to run {}", invocation.program.display()))?;
            Ok(Finished {
                code: status.code(),
                stdout: Vec::new(),
            })
        }
    }
}

/// Runs `invocation` and fails with [`ToolFailure`] unless it exits 0.
pub async fn check(runner: &dyn Runner, invocation: &Invocation) -> anyhow::Result<()> {
    let finished = runner.run(invocation, false).await?;
    ensure_success(invocation, &finished)
}

/// Like [`check`], returning the captured stdout.
pub async fn check_output(
    runner: &dyn Runner,
    invocation: &Invocation,
) -> anyhow::Result<Vec<u8>> {
    let finished = runner.run(invocation, true).await?;
    ensure_success(invocation, &finished)?;
    Ok(finished.stdout)
}

fn ensure_success(invocation: &Invocation, finished: &Finished) -> anyhow::Result<()> {
    if finished.success() {
        Ok(())
    } else {
        Err(ToolFailure {
            program: invocation.program_name(),
            code: finished.code,
        }
        .into())
    }
}

//! Canned tool results and fixtures for `MockRunner` expectations.

use std::path::PathBuf;

use crate::process::{Finished, Invocation};

pub fn ok() -> anyhow::Result<Finished> {
    Ok(Finished {
        code: Some(0),
        stdout: Vec::new(),
    })
}

pub fn ok_stdout(stdout: &str) -> anyhow::Result<Finished> {
    Ok(Finished {
        code: Some(0),
        stdout: stdout.as_bytes().to_vec(),
    })
}

pub fn exit(code: i32) -> anyhow::Result<Finished> {
    Ok(Finished {
        code: Some(code),
        stdout: Vec::new(),
    })
}

/// Path given after `flag`.
pub fn path_after(invocation: &Invocation, flag: &str) -> PathBuf {
    PathBuf::from(invocation.value_of(flag).unwrap())
}

/// Last argument, which is the output file for ffmpeg and the input for ffprobe.
pub fn last_arg(invocation: &Invocation) -> PathBuf {
    PathBuf::from(invocation.args.last().unwrap())
}

pub const CHAT_HTML: &str = r#"<!DOCTYPE html>
<html>
<head><title>chat</title></head>
<body>
<pre class="comment-root">[0:00:05] <span class="comment-author">alice</span><span class="comment-message">: hello world</span></pre>
<pre class="comment-root">[0:01:17] <span class="comment-author"> bob </span><span class="comment-message">: gg: </span></pre>
<pre class="comment-root">[1:02:03] <span class="comment-message">: anonymous</span></pre>
<pre class="other">[9:99:99] <span class="comment-author">ignored</span></pre>
</body>
</html>
"#;

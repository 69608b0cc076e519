use std::path::{Path, PathBuf};

/// A Twitch video ID: a non-empty run of ASCII digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VodId(String);

impl VodId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn url(&self) -> String {
        format!("https://www.twitch.tv/videos/{}", self.0)
    }
}

impl std::str::FromStr for VodId {
    type Err = anyhow::Error;

    /// Accepts a bare ID or a `twitch.tv/videos/<id>` URL.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let pattern =
            regex::Regex::new(r"\A(?:(?:https?://)?(?:www\.|m\.)?twitch\.tv/videos/)?([0-9]+)/?\z")?;
        match pattern.captures(s.trim()) {
            Some(captures) => Ok(Self(captures[1].to_owned())),
            None => Err(anyhow::anyhow!(
                "invalid VOD ID {:?}: expected a numeric Twitch video ID",
                s
            )),
        }
    }
}

impl std::fmt::Display for VodId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where each artifact for one VOD lives under the output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VodPaths {
    pub dir: PathBuf,
    pub chat_html: PathBuf,
    pub chat_tsv: PathBuf,
    pub audio_m4a: PathBuf,
    pub wav: PathBuf,
    pub transcript_tsv: PathBuf,
}

impl VodPaths {
    pub fn new<P>(output_dir: P, id: &VodId) -> Self
    where
        P: AsRef<Path>,
    {
        let dir = output_dir.as_ref().join(id.as_str());
        Self {
            chat_html: dir.join(format!("{}_chat.html", id)),
            chat_tsv: dir.join(format!("{}_chat.tsv", id)),
            audio_m4a: dir.join(format!("{}.m4a", id)),
            wav: dir.join(format!("{}.wav", id)),
            transcript_tsv: dir.join(format!("{}_transcript.tsv", id)),
            dir,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_numeric_ids_and_urls() {
        let id: VodId = "2154221234".parse().unwrap();
        assert_eq!(id.as_str(), "2154221234");
        assert_eq!(id.url(), "https://www.twitch.tv/videos/2154221234");

        let id: VodId = "https://www.twitch.tv/videos/2154221234".parse().unwrap();
        assert_eq!(id.as_str(), "2154221234");
        let id: VodId = "twitch.tv/videos/77/".parse().unwrap();
        assert_eq!(id.as_str(), "77");
    }

    #[test]
    fn rejects_malformed_ids() {
        for input in [
            "",
            "   ",
            "abc",
            "12a4",
            "-5",
            "https://www.twitch.tv/clips/123",
            "١٢٣",
            "１２３",
            "https://www.twitch.tv/videos/１２３",
        ] {
            assert!(input.parse::<VodId>().is_err(), "{:?} accepted", input);
        }
    }

    #[test]
    fn paths_are_grouped_per_vod() {
        let id: VodId = "42".parse().unwrap();
        let paths = VodPaths::new("data", &id);
        assert_eq!(paths.dir, Path::new("data/42"));
        assert_eq!(paths.chat_html, Path::new("data/42/42_chat.html"));
        assert_eq!(paths.chat_tsv, Path::new("data/42/42_chat.tsv"));
        assert_eq!(paths.audio_m4a, Path::new("data/42/42.m4a"));
        assert_eq!(paths.wav, Path::new("data/42/42.wav"));
        assert_eq!(paths.transcript_tsv, Path::new("data/42/42_transcript.tsv"));
    }
}

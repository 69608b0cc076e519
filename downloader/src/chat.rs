use anyhow::Context as _;
use log::info;

use crate::downloader::TwitchDownloader;
use crate::process::{self, Invocation};

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ChatMessage {
    pub time: String,
    pub author: String,
    pub message: String,
}

/// Downloads the chat render and converts it to TSV. Returns the number of
/// messages written.
pub async fn fetch_chat(dl: &TwitchDownloader<'_>) -> Result<usize, anyhow::Error> {
    info!(">>> Downloading chat for video ID: {}", dl.vod);
    let paths = &dl.paths;
    crate::ensure_absent(&paths.chat_html)?;

    let download = Invocation::new(&dl.config.tools.downloader)
        .args(["chatdownload", "--id", dl.vod.as_str(), "-o"])
        .arg(&paths.chat_html);
    process::check(dl.runner, &download)
        .await
        .context("chat download failed")?;
    info!("Chat downloaded: {}", paths.chat_html.display());

    let html = std::fs::read_to_string(&paths.chat_html)
        .with_context(|| format!("failed to read {}", paths.chat_html.display()))?;
    let messages = parse_chat_html(&html)?;
    if messages.is_empty() {
        info!("No chat data found.");
    } else {
        info!("Found {} chat messages.", messages.len());
        crate::write_tsv(&paths.chat_tsv, &messages)?;
        info!("Chat data saved to {}", paths.chat_tsv.display());
    }
    Ok(messages.len())
}

/// Extracts messages from the downloader's HTML chat render.
pub fn parse_chat_html(html: &str) -> Result<Vec<ChatMessage>, anyhow::Error> {
    let root_sel = selector("pre.comment-root")?;
    let author_sel = selector("span.comment-author")?;
    let message_sel = selector("span.comment-message")?;

    let document = scraper::Html::parse_document(html);
    let messages = document
        .select(&root_sel)
        .map(|pre| {
            let text: String = pre.text().collect();
            let time = text
                .split(']')
                .next()
                .unwrap_or_default()
                .trim_matches('[')
                .to_owned();
            let author = pre
                .select(&author_sel)
                .next()
                .map(|span| span.text().collect::<String>().trim().to_owned())
                .unwrap_or_default();
            let message = pre
                .select(&message_sel)
                .next()
                .map(|span| {
                    span.text()
                        .collect::<String>()
                        .trim_matches(|c| c == ':' || c == ' ')
                        .to_owned()
                })
                .unwrap_or_default();
            ChatMessage {
                time,
                author,
                message,
            }
        })
        .collect();
    Ok(messages)
}

fn selector(css: &str) -> Result<scraper::Selector, anyhow::Error> {
    scraper::Selector::parse(css).map_err(|e| anyhow::anyhow!("invalid selector {}: {}", css, e))
}

//! HTTP-based TikTok downloader using the ssstik.io API.
//!
//! The extraction flow:
//! 1. Fetch the ssstik.io page and extract the `tt` form token
//! 2. POST the TikTok URL with the token to the extraction endpoint
//! 3. Pick the watermark-free link out of the returned HTML fragment
//! 4. Download the video bytes into the staging directory

use std::path::PathBuf;
use std::time::Duration;

use chrono::Utc;
use regex::Regex;
use thiserror::Error;
use tracing::{debug, info};

const BASE_URL: &str = "https://ssstik.io";
const PAGE_URL: &str = "https://ssstik.io/en-1";
const API_URL: &str = "https://ssstik.io/abc?url=dl";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:147.0) Gecko/20100101 Firefox/147.0";

/// Known HTML shapes the `tt` token shows up in.
const TOKEN_PATTERNS: [&str; 3] = [
    r#"(?i)name=['"]tt['"].*?value=['"]([^'"]+)['"]"#,
    r#"(?i)tt\s*[:=]\s*['"]([^'"]+)['"]"#,
    r#"(?i)data-tt=['"]([^'"]+)['"]"#,
];

/// Errors that can occur during video extraction.
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to load page: HTTP {0}")]
    PageFetch(u16),

    #[error("Could not find 'tt' token on the page")]
    TokenNotFound,

    #[error("Extraction API request failed: HTTP {0}")]
    ApiRequest(u16),

    #[error("No download link found in the response")]
    NoDownloadLink,

    #[error("Video download failed: HTTP {0}")]
    VideoFetch(u16),

    #[error("Failed to write video file: {0}")]
    Io(#[from] std::io::Error),
}

/// A successfully downloaded video staged on disk.
#[derive(Debug, Clone)]
pub struct DownloadedVideo {
    /// Path of the staged `.mp4` file.
    pub path: PathBuf,

    /// Video identifier extracted from the source URL.
    pub video_id: String,
}

/// HTTP-based TikTok downloader client.
pub struct SsstikClient {
    /// Shared HTTP client.
    http: reqwest::Client,

    /// Directory downloaded videos are staged in.
    download_dir: PathBuf,
}

impl SsstikClient {
    /// Creates a client staging downloads in the given directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the HTTP
    /// client cannot be built.
    pub fn new(download_dir: PathBuf) -> Result<Self, DownloadError> {
        std::fs::create_dir_all(&download_dir)?;

        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .redirect(reqwest::redirect::Policy::limited(10))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self { http, download_dir })
    }

    /// Downloads the video behind a TikTok URL into the staging directory.
    ///
    /// # Errors
    ///
    /// Returns an error if any step of the extraction flow fails.
    pub async fn download(&self, tiktok_url: &str) -> Result<DownloadedVideo, DownloadError> {
        let token = self.fetch_token().await?;
        let download_url = self.resolve_download_url(tiktok_url, &token).await?;

        debug!("Download URL: {}", truncate_for_log(&download_url, 80));

        let response = self
            .http
            .get(&download_url)
            .header("Referer", format!("{BASE_URL}/"))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(DownloadError::VideoFetch(response.status().as_u16()));
        }

        let bytes = response.bytes().await?;

        let video_id = extract_video_id(tiktok_url)
            .unwrap_or_else(|| Utc::now().format("%Y%m%d%H%M%S").to_string());
        let filename = format!(
            "ssstik_{video_id}_{}.mp4",
            Utc::now().format("%Y%m%d_%H%M%S")
        );
        let path = self.download_dir.join(filename);

        tokio::fs::write(&path, &bytes).await?;

        info!("Downloaded {} ({} bytes)", path.display(), bytes.len());

        Ok(DownloadedVideo { path, video_id })
    }

    /// Fetches the `tt` form token from the ssstik.io page.
    async fn fetch_token(&self) -> Result<String, DownloadError> {
        debug!("Fetching page token");

        let response = self.http.get(PAGE_URL).send().await?;

        if !response.status().is_success() {
            return Err(DownloadError::PageFetch(response.status().as_u16()));
        }

        let html = response.text().await?;
        extract_token(&html).ok_or(DownloadError::TokenNotFound)
    }

    /// Calls the extraction endpoint and picks a download link from the
    /// returned HTML fragment.
    async fn resolve_download_url(
        &self,
        tiktok_url: &str,
        token: &str,
    ) -> Result<String, DownloadError> {
        debug!("Calling ssstik.io extraction API");

        let form = [("id", tiktok_url), ("locale", "en"), ("tt", token)];

        let response = self
            .http
            .post(API_URL)
            .form(&form)
            .header("HX-Request", "true")
            .header("HX-Trigger", "_gcaptcha_pt")
            .header("HX-Target", "target")
            .header("HX-Current-URL", PAGE_URL)
            .header("Origin", BASE_URL)
            .header("Referer", PAGE_URL)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(DownloadError::ApiRequest(response.status().as_u16()));
        }

        let html = response.text().await?;
        extract_download_url(&html).ok_or(DownloadError::NoDownloadLink)
    }
}

impl std::fmt::Debug for SsstikClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SsstikClient")
            .field("download_dir", &self.download_dir)
            .finish_non_exhaustive()
    }
}

/// Extracts the `tt` token from the page HTML, trying each known shape.
fn extract_token(html: &str) -> Option<String> {
    TOKEN_PATTERNS
        .iter()
        .filter_map(|pattern| Regex::new(pattern).ok())
        .find_map(|re| {
            re.captures(html)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().to_owned())
        })
}

/// Picks the best download link out of the extraction response.
///
/// Links whose text mentions "without" or "no watermark" win; otherwise
/// the first `tikcdn.io`/`.mp4` link is used.
fn extract_download_url(html: &str) -> Option<String> {
    let anchor_re = Regex::new(r#"(?is)<a\s[^>]*href=["']([^"']+)["'][^>]*>(.*?)</a>"#).ok()?;

    let mut fallback: Option<String> = None;

    for caps in anchor_re.captures_iter(html) {
        let href = caps.get(1)?.as_str();
        let text = caps.get(2)?.as_str().to_lowercase();

        if !href.contains("tikcdn.io") && !href.contains(".mp4") {
            continue;
        }

        if text.contains("without") || text.contains("no watermark") {
            return Some(absolutize(href));
        }

        if fallback.is_none() {
            fallback = Some(absolutize(href));
        }
    }

    fallback
}

/// Makes scheme-relative and root-relative hrefs absolute.
fn absolutize(href: &str) -> String {
    if let Some(rest) = href.strip_prefix("//") {
        format!("https://{rest}")
    } else if href.starts_with('/') {
        format!("{BASE_URL}{href}")
    } else {
        href.to_owned()
    }
}

/// Extracts the numeric video ID from a TikTok URL.
fn extract_video_id(url: &str) -> Option<String> {
    let patterns = [r"/video/(\d+)", r"/v/(\d+)", r"(\d{19})"];

    patterns
        .iter()
        .filter_map(|pattern| Regex::new(pattern).ok())
        .find_map(|re| {
            re.captures(url)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().to_owned())
        })
}

/// Truncates a string for logging purposes.
fn truncate_for_log(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_owned()
    } else {
        format!("{}...", s.chars().take(max_len).collect::<String>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_token_input_tag() {
        let html = r#"<form><input type="hidden" name="tt" value="abc123XYZ"/></form>"#;
        assert_eq!(extract_token(html), Some("abc123XYZ".to_owned()));
    }

    #[test]
    fn test_extract_token_script_assignment() {
        let html = r#"<script>var tt = "d3adb33f";</script>"#;
        assert_eq!(extract_token(html), Some("d3adb33f".to_owned()));
    }

    #[test]
    fn test_extract_token_data_attribute() {
        let html = r#"<div data-tt="tok_42"></div>"#;
        assert_eq!(extract_token(html), Some("tok_42".to_owned()));
    }

    #[test]
    fn test_extract_token_missing() {
        assert_eq!(extract_token("<html><body>nothing here</body></html>"), None);
    }

    #[test]
    fn test_extract_download_url_prefers_no_watermark() {
        let html = r#"
            <a href="https://tikcdn.io/video/1?wm=1">Download with watermark</a>
            <a href="https://tikcdn.io/video/1">Without watermark</a>
        "#;
        assert_eq!(
            extract_download_url(html),
            Some("https://tikcdn.io/video/1".to_owned())
        );
    }

    #[test]
    fn test_extract_download_url_falls_back_to_first_match() {
        let html = r#"
            <a href="https://example.com/page">Some page</a>
            <a href="https://cdn.example.com/clip.mp4">Download</a>
        "#;
        assert_eq!(
            extract_download_url(html),
            Some("https://cdn.example.com/clip.mp4".to_owned())
        );
    }

    #[test]
    fn test_extract_download_url_none() {
        assert_eq!(extract_download_url(r#"<a href="https://x.io/a">hi</a>"#), None);
    }

    #[test]
    fn test_absolutize() {
        assert_eq!(
            absolutize("//tikcdn.io/video/1"),
            "https://tikcdn.io/video/1"
        );
        assert_eq!(absolutize("/dl/1.mp4"), "https://ssstik.io/dl/1.mp4");
        assert_eq!(
            absolutize("https://tikcdn.io/video/1"),
            "https://tikcdn.io/video/1"
        );
    }

    #[test]
    fn test_extract_video_id() {
        assert_eq!(
            extract_video_id("https://www.tiktok.com/@user/video/7123456789012345678"),
            Some("7123456789012345678".to_owned())
        );
        assert_eq!(
            extract_video_id("https://m.tiktok.com/v/6987654321098765432.html"),
            Some("6987654321098765432".to_owned())
        );
        assert_eq!(
            extract_video_id("https://vm.tiktok.com/ZMabcdef/"),
            None
        );
    }

    #[test]
    fn test_truncate_for_log() {
        assert_eq!(truncate_for_log("short", 10), "short");
        assert_eq!(truncate_for_log("Hello, World!", 5), "Hello...");
    }
}

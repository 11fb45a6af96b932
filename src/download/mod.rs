// Acquisition of the video and its subtitle tracks
//
// - Downloader: capability trait the workflow drives
// - YtDlp: implementation that shells out to yt-dlp

pub mod ytdlp;

use async_trait::async_trait;
use std::path::PathBuf;

use crate::config::DownloadConfig;
use crate::error::Result;

/// What to fetch and where to put it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    pub url: String,
    /// Format selectors, most preferred first
    pub format_chain: Vec<String>,
    /// Subtitle language tags to request
    pub subtitle_languages: Vec<String>,
    pub output_template: String,
    pub work_dir: PathBuf,
    /// Fetch subtitles only
    pub skip_video: bool,
}

/// Information reported about the downloaded media
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DownloadMetadata {
    pub title: Option<String>,
    pub height: Option<u32>,
    pub fps: Option<f64>,
}

/// Files left on disk by a download
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DownloadOutcome {
    pub video: Option<PathBuf>,
    pub subtitles: Vec<PathBuf>,
    pub metadata: DownloadMetadata,
}

/// Main trait for download operations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Downloader: Send + Sync {
    /// Download the media described by `request` into its working directory
    async fn download(&self, request: &DownloadRequest) -> Result<DownloadOutcome>;

    /// Check if the downloader is available
    async fn check_availability(&self) -> Result<()>;
}

/// Factory for creating downloader instances
pub struct DownloaderFactory;

impl DownloaderFactory {
    /// Create the default downloader implementation (yt-dlp based)
    pub fn create_downloader(config: DownloadConfig) -> Box<dyn Downloader> {
        Box::new(ytdlp::YtDlpDownloader::new(config))
    }
}

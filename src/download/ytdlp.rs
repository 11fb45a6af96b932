use async_trait::async_trait;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::config::DownloadConfig;
use crate::error::{Result, SubburnError};
use super::{DownloadMetadata, DownloadOutcome, DownloadRequest, Downloader};

/// The subset of yt-dlp's `--dump-single-json` output used here
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct YtDlpInfo {
    title: Option<String>,
    height: Option<u32>,
    fps: Option<f64>,
    #[serde(rename = "_filename")]
    filename: Option<PathBuf>,
    requested_downloads: Vec<YtDlpRequestedDownload>,
    requested_subtitles: Option<BTreeMap<String, YtDlpSubtitle>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct YtDlpRequestedDownload {
    filepath: Option<PathBuf>,
    height: Option<u32>,
    fps: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct YtDlpSubtitle {
    filepath: Option<PathBuf>,
}

/// Downloader that drives the yt-dlp command line tool
pub struct YtDlpDownloader {
    config: DownloadConfig,
}

impl YtDlpDownloader {
    pub fn new(config: DownloadConfig) -> Self {
        Self { config }
    }

    /// Arguments for one download; stdout carries the info JSON, progress goes to stderr
    fn build_args(request: &DownloadRequest) -> Vec<String> {
        let mut args = vec![
            "--no-playlist".to_string(),
            "-f".to_string(),
            request.format_chain.join("/"),
            "--write-subs".to_string(),
            "--sub-langs".to_string(),
            request.subtitle_languages.join(","),
            "--sub-format".to_string(),
            "srt/best".to_string(),
            "--convert-subs".to_string(),
            "srt".to_string(),
            "-P".to_string(),
            request.work_dir.to_string_lossy().to_string(),
            "-o".to_string(),
            request.output_template.clone(),
            "--dump-single-json".to_string(),
            "--no-simulate".to_string(),
            "--progress".to_string(),
        ];

        if request.skip_video {
            args.push("--skip-download".to_string());
        }

        args.push(request.url.clone());
        args
    }

    fn parse_output(stdout: &str) -> Result<DownloadOutcome> {
        // Only the last non-empty line is the JSON document
        let json_line = stdout
            .lines()
            .rev()
            .find(|line| !line.trim().is_empty())
            .ok_or_else(|| SubburnError::Download("yt-dlp produced no metadata".to_string()))?;

        let info: YtDlpInfo = serde_json::from_str(json_line)
            .map_err(|e| SubburnError::Download(format!("yt-dlp returned invalid JSON: {}", e)))?;

        let primary = info.requested_downloads.first();
        let video = primary
            .and_then(|download| download.filepath.clone())
            .or(info.filename);

        let subtitles = info
            .requested_subtitles
            .unwrap_or_default()
            .into_values()
            .filter_map(|sub| sub.filepath)
            .collect();

        Ok(DownloadOutcome {
            video,
            subtitles,
            metadata: DownloadMetadata {
                title: info.title,
                height: primary.and_then(|d| d.height).or(info.height),
                fps: primary.and_then(|d| d.fps).or(info.fps),
            },
        })
    }
}

#[async_trait]
impl Downloader for YtDlpDownloader {
    async fn download(&self, request: &DownloadRequest) -> Result<DownloadOutcome> {
        info!("Downloading {} into {}", request.url, request.work_dir.display());
        debug!("Format chain: {}", request.format_chain.join(" / "));
        debug!("Subtitle languages: {}", request.subtitle_languages.join(","));

        let args = Self::build_args(request);
        debug!("Executing {} {:?}", self.config.binary_path, args);

        let output = Command::new(&self.config.binary_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .output()
            .await
            .map_err(|e| SubburnError::Download(format!("Failed to run {}: {}", self.config.binary_path, e)))?;

        if !output.status.success() {
            return Err(SubburnError::Download(format!(
                "{} exited with {}",
                self.config.binary_path, output.status
            )));
        }

        let outcome = Self::parse_output(&String::from_utf8_lossy(&output.stdout))?;

        match &outcome.video {
            Some(video) => info!(
                "Downloaded video {} ({}p, {} fps)",
                video.display(),
                outcome.metadata.height.map(|h| h.to_string()).unwrap_or_else(|| "?".to_string()),
                outcome.metadata.fps.map(|f| f.to_string()).unwrap_or_else(|| "?".to_string()),
            ),
            None if !request.skip_video => warn!("yt-dlp did not report a video file"),
            None => {}
        }
        info!("yt-dlp reported {} subtitle file(s)", outcome.subtitles.len());

        Ok(outcome)
    }

    async fn check_availability(&self) -> Result<()> {
        let output = Command::new(&self.config.binary_path)
            .arg("--version")
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| SubburnError::Download(format!("Downloader not found: {}", e)))?;

        if output.status.success() {
            info!("yt-dlp {} is available", String::from_utf8_lossy(&output.stdout).trim());
            Ok(())
        } else {
            Err(SubburnError::Download("Downloader version check failed".to_string()))
        }
    }
}

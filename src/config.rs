use serde::{Deserialize, Serialize};
use std::path::Path;
use crate::error::{Result, SubburnError};
use crate::language::{LanguageEntry, LanguagePriority};

// Default values for fields that older config files may lack
fn default_transient_extensions() -> Vec<String> {
    vec!["part".to_string(), "ytdl".to_string(), "temp".to_string()]
}

fn default_request_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub download: DownloadConfig,
    pub languages: LanguageConfig,
    pub translate: TranslateConfig,
    pub layout: LayoutConfig,
    pub media: MediaConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadConfig {
    /// Path to the yt-dlp binary
    pub binary_path: String,
    /// Format selectors tried in order, joined with `/` for yt-dlp
    pub format_chain: Vec<String>,
    /// Output naming template handed to yt-dlp
    pub output_template: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguageConfig {
    /// Language code the subtitles are translated into
    pub target: String,
    /// Suffix appended to the title of translated artifacts (`<title>_<suffix>.srt`)
    pub target_suffix: String,
    /// Source languages in order of preference
    pub priority: Vec<LanguageEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslateConfig {
    /// Translation endpoint base URL
    pub endpoint: String,
    /// Texts longer than this many characters are split before translation
    pub chunk_size: usize,
    /// Pause between consecutive translation calls, in milliseconds
    pub pacing_ms: u64,
    /// Text written in place of an entry whose translation failed
    pub placeholder: String,
    /// HTTP request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Folder for source and burned videos, relative to the working directory
    pub video_dir: String,
    /// Folder for original and translated subtitles
    pub subtitle_dir: String,
    /// Folder for leftover download byproducts
    pub temp_dir: String,
    /// Extensions (without dot) of files treated as download byproducts
    #[serde(default = "default_transient_extensions")]
    pub transient_extensions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    /// Path to ffmpeg binary
    pub binary_path: String,
    /// Burn the translated subtitles into a new video after organizing
    pub burn_subtitles: bool,
    /// Container extension of the burned output video
    pub output_extension: String,
    /// Additional encoding options for subtitle burning
    /// Common options: ["-preset", "medium", "-crf", "23", "-pix_fmt", "yuv420p"]
    pub subtitle_options: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            download: DownloadConfig {
                binary_path: "yt-dlp".to_string(),
                format_chain: vec![
                    // Ultra HD with audio, HD with audio, any video with audio, best single file
                    "bv*[height>=2160]+ba".to_string(),
                    "bv*[height>=1080]+ba".to_string(),
                    "bv*+ba".to_string(),
                    "b".to_string(),
                ],
                output_template: "%(title)s.%(ext)s".to_string(),
            },
            languages: LanguageConfig {
                target: "km".to_string(),
                target_suffix: "kh".to_string(),
                priority: LanguagePriority::default().into_entries(),
            },
            translate: TranslateConfig {
                endpoint: "https://translate.googleapis.com".to_string(),
                chunk_size: 200,
                pacing_ms: 100,
                placeholder: "[Translation Error]".to_string(),
                request_timeout_secs: default_request_timeout_secs(),
            },
            layout: LayoutConfig {
                video_dir: "videos".to_string(),
                subtitle_dir: "subtitles".to_string(),
                temp_dir: "temp".to_string(),
                transient_extensions: default_transient_extensions(),
            },
            media: MediaConfig {
                binary_path: "ffmpeg".to_string(),
                burn_subtitles: true,
                output_extension: "mp4".to_string(),
                subtitle_options: vec![
                    // "-preset".to_string(), "medium".to_string(),
                    // "-crf".to_string(), "23".to_string(),
                ],
            },
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SubburnError::Config(format!("Failed to read config file: {}", e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| SubburnError::Config(format!("Failed to parse config file: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| SubburnError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| SubburnError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Language priority as the matcher consumes it
    pub fn priority(&self) -> LanguagePriority {
        LanguagePriority::new(self.languages.priority.clone())
    }

    fn validate(&self) -> Result<()> {
        if self.languages.priority.is_empty() {
            return Err(SubburnError::Config("languages.priority must not be empty".to_string()));
        }
        if self.translate.chunk_size == 0 {
            return Err(SubburnError::Config("translate.chunk_size must be greater than zero".to_string()));
        }
        if self.download.format_chain.is_empty() {
            return Err(SubburnError::Config("download.format_chain must not be empty".to_string()));
        }
        Ok(())
    }
}

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SubburnError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Download error: {0}")]
    Download(String),

    #[error("Translation error: {0}")]
    Translation(String),

    #[error("Subtitle format error: {0}")]
    Subtitle(String),

    #[error("Media processing error: {0}")]
    Media(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("No subtitles in a recognized language were found")]
    NoSubtitles,
}

pub type Result<T> = std::result::Result<T, SubburnError>;

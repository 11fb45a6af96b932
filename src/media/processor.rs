use async_trait::async_trait;
use std::path::Path;
use tracing::{debug, info};

use crate::config::MediaConfig;
use crate::error::{Result, SubburnError};
use super::{MediaCommandBuilder, MediaProcessorTrait};

/// Concrete implementation of media processor (FFmpeg-based)
pub struct MediaProcessorImpl {
    config: MediaConfig,
    command_builder: MediaCommandBuilder,
}

impl MediaProcessorImpl {
    /// Create a new media processor implementation
    pub fn new(config: MediaConfig) -> Self {
        let command_builder = MediaCommandBuilder::new(&config.binary_path);

        Self {
            config,
            command_builder,
        }
    }
}

#[async_trait]
impl MediaProcessorTrait for MediaProcessorImpl {
    async fn embed_subtitles(
        &self,
        video_path: &Path,
        subtitle_path: &Path,
        output_path: &Path,
    ) -> Result<()> {
        info!("Burning subtitles from {} into {} -> {}",
              subtitle_path.display(), video_path.display(), output_path.display());

        if !video_path.exists() {
            return Err(SubburnError::FileNotFound(video_path.display().to_string()));
        }
        if !subtitle_path.exists() {
            return Err(SubburnError::FileNotFound(subtitle_path.display().to_string()));
        }

        let command = self.command_builder.embed_subtitles(
            video_path,
            subtitle_path,
            output_path,
            &self.config.subtitle_options,
        );

        command.execute().await?;

        info!("Subtitle burning completed successfully");
        Ok(())
    }

    async fn check_availability(&self) -> Result<()> {
        self.command_builder
            .version_check()
            .execute()
            .await
            .map_err(|e| SubburnError::Media(format!("Media processor not available: {}", e)))?;

        info!("Media processor is available");
        Ok(())
    }

    async fn get_version_info(&self) -> Result<String> {
        debug!("Getting media processor version information");

        let stdout = self.command_builder.version_check().execute().await?;
        // The first line carries the version
        Ok(stdout.lines().next().unwrap_or("Unknown version").to_string())
    }
}

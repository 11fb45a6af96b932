use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::config::Config;
use crate::download::{DownloadOutcome, DownloadRequest, Downloader, DownloaderFactory};
use crate::error::{Result, SubburnError};
use crate::media::{MediaProcessorFactory, MediaProcessorTrait};
use crate::organizer::{ArtifactKind, ArtifactSet, OrganizeReport, Organizer};
use crate::selector::{self, SelectionResult};
use crate::subtitle::SubtitleDocument;
use crate::translate::{DocumentTranslator, TranslationReport, Translator, TranslatorFactory};

/// Which stages a run goes through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Download video and subtitles, translate, organize, optionally burn in
    Full,
    /// Download subtitles only, translate, organize
    SubtitlesOnly,
}

/// Where everything ended up after a run
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub title: String,
    pub source_language: String,
    pub translated_subtitle: Option<PathBuf>,
    pub video: Option<PathBuf>,
    pub output_video: Option<PathBuf>,
    pub translation: TranslationReport,
    pub organize: OrganizeReport,
}

pub struct Workflow {
    config: Config,
    work_dir: PathBuf,
    downloader: Box<dyn Downloader>,
    translator: Box<dyn Translator>,
    media: Box<dyn MediaProcessorTrait>,
}

impl Workflow {
    pub fn new<P: AsRef<Path>>(config: Config, work_dir: P) -> Result<Self> {
        let downloader = DownloaderFactory::create_downloader(config.download.clone());
        let translator = TranslatorFactory::create_translator(&config.translate)?;
        let media = MediaProcessorFactory::create_processor(config.media.clone());

        Ok(Self::from_parts(config, work_dir, downloader, translator, media))
    }

    /// Assemble a workflow from explicit collaborators
    pub fn from_parts<P: AsRef<Path>>(
        config: Config,
        work_dir: P,
        downloader: Box<dyn Downloader>,
        translator: Box<dyn Translator>,
        media: Box<dyn MediaProcessorTrait>,
    ) -> Self {
        Self {
            config,
            work_dir: work_dir.as_ref().to_path_buf(),
            downloader,
            translator,
            media,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run the whole pipeline for one URL: acquire, select, translate, organize, mux
    pub async fn run(&self, url: &str, mode: RunMode) -> Result<RunSummary> {
        let burn = mode == RunMode::Full && self.config.media.burn_subtitles;

        // Check dependencies
        self.downloader.check_availability().await?;
        if burn {
            self.media.check_availability().await?;
            if let Ok(version) = self.media.get_version_info().await {
                info!("Using {}", version);
            }
        }

        // Step 1: Acquire
        let download = self.acquire(url, mode).await?;

        // Step 2: Select
        let selection = match selector::select(&self.work_dir, &self.config.priority())? {
            Some(selection) => selection,
            None => {
                warn!("No subtitles matching the language priority in {}", self.work_dir.display());
                return Err(SubburnError::NoSubtitles);
            }
        };
        info!("Found subtitle language: {} ({})", selection.language, selection.path.display());

        let title = derive_title(&download, &selection);

        // Step 3: Translate
        let translated_path = self.work_dir.join(format!(
            "{}_{}.srt",
            title, self.config.languages.target_suffix
        ));
        let translation = self
            .translate_subtitle_file(&selection.path, &translated_path, &selection.language)
            .await?;

        // Step 4: Organize
        let organizer = Organizer::new(self.config.layout.clone(), &self.work_dir);
        let artifacts = ArtifactSet {
            title: title.clone(),
            video: download.video.clone(),
            original_subtitle: selection.path.clone(),
            original_language: selection.language.clone(),
            translated_subtitle: translated_path,
            translated_suffix: self.config.languages.target_suffix.clone(),
        };
        let organize = organizer.organize(&artifacts).await?;

        let video = organize.destination(&ArtifactKind::Video).map(Path::to_path_buf);
        let translated_subtitle = organize
            .destination(&ArtifactKind::TranslatedSubtitle)
            .map(Path::to_path_buf);

        // Step 5: Mux
        let output_video = if burn {
            match (&video, &translated_subtitle) {
                (Some(video), Some(subtitle)) => {
                    let output = organizer.video_dir().join(format!(
                        "{}_{}.{}",
                        title, self.config.languages.target_suffix, self.config.media.output_extension
                    ));
                    info!("Burning subtitles into video...");
                    self.media.embed_subtitles(video, subtitle, &output).await?;
                    Some(output)
                }
                _ => {
                    warn!("Skipping subtitle burning: video or translated subtitle was not relocated");
                    None
                }
            }
        } else {
            None
        };

        Ok(RunSummary {
            title,
            source_language: selection.language,
            translated_subtitle,
            video,
            output_video,
            translation,
            organize,
        })
    }

    async fn acquire(&self, url: &str, mode: RunMode) -> Result<DownloadOutcome> {
        let request = DownloadRequest {
            url: url.to_string(),
            format_chain: self.config.download.format_chain.clone(),
            subtitle_languages: self.config.priority().download_languages(),
            output_template: self.config.download.output_template.clone(),
            work_dir: self.work_dir.clone(),
            skip_video: mode == RunMode::SubtitlesOnly,
        };
        self.downloader.download(&request).await
    }

    /// Translate a subtitle file whose source language is known and save the result
    pub async fn translate_subtitle_file(
        &self,
        input_path: &Path,
        output_path: &Path,
        source_language: &str,
    ) -> Result<TranslationReport> {
        let mut document = SubtitleDocument::open(input_path).await?;

        let mut translator = DocumentTranslator::new(self.translator.as_ref(), &self.config.translate);
        let report = translator
            .translate_document(&mut document, source_language, &self.config.languages.target)
            .await;

        document.save(output_path).await?;
        info!("Translated subtitle saved as: {}", output_path.display());
        Ok(report)
    }

    /// Translate a local subtitle file. The source language is taken from
    /// `source_language` or, failing that, from the file name.
    pub async fn translate_file(
        &self,
        input_path: &Path,
        output_path: Option<&Path>,
        source_language: Option<&str>,
    ) -> Result<(PathBuf, TranslationReport)> {
        if !input_path.exists() {
            return Err(SubburnError::FileNotFound(input_path.display().to_string()));
        }

        let priority = self.config.priority();
        let file_name = input_path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();
        let source_language = source_language
            .or_else(|| priority.classify(&file_name))
            .ok_or_else(|| SubburnError::Config(format!(
                "Cannot tell the language of {}; pass it explicitly",
                input_path.display()
            )))?
            .to_string();

        let output_path = match output_path {
            Some(path) => path.to_path_buf(),
            None => {
                let stem = input_path
                    .file_stem()
                    .ok_or_else(|| SubburnError::Config("Invalid subtitle filename".to_string()))?
                    .to_string_lossy();
                input_path.with_file_name(format!("{}_{}.srt", stem, self.config.languages.target_suffix))
            }
        };

        let report = self
            .translate_subtitle_file(input_path, &output_path, &source_language)
            .await?;
        Ok((output_path, report))
    }

    /// Burn a subtitle file into a video
    pub async fn embed_subtitles(
        &self,
        video_path: &Path,
        subtitles_path: &Path,
        output_path: &Path,
    ) -> Result<()> {
        self.media.check_availability().await?;
        self.media.embed_subtitles(video_path, subtitles_path, output_path).await
    }
}

/// Logical title of the run: the downloaded video's file stem, else the selected
/// subtitle's name without its language tag, else the reported title
fn derive_title(download: &DownloadOutcome, selection: &SelectionResult) -> String {
    if let Some(stem) = download.video.as_ref().and_then(|video| video.file_stem()) {
        return stem.to_string_lossy().to_string();
    }

    let subtitle_title = selection
        .path
        .file_stem()
        .map(Path::new)
        .and_then(Path::file_stem)
        .map(|stem| stem.to_string_lossy().to_string());
    if let Some(title) = subtitle_title.filter(|t| !t.is_empty()) {
        return title;
    }

    download
        .metadata
        .title
        .as_deref()
        .map(sanitize_title)
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| "video".to_string())
}

/// Replace characters that cannot appear in file names
fn sanitize_title(title: &str) -> String {
    title
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect::<String>()
        .trim()
        .to_string()
}

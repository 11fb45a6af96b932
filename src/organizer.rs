//! Relocation of run artifacts into the fixed folder layout.
//!
//! Moves are attempted one artifact at a time. A source that is not there is
//! recorded and skipped, a move that fails is recorded and the remaining
//! artifacts are still attempted.

use std::fmt;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::config::LayoutConfig;
use crate::error::Result;
use crate::language::SUBTITLE_EXTENSION;

/// Files produced by one run, before relocation
#[derive(Debug, Clone)]
pub struct ArtifactSet {
    /// Logical title used to name destinations
    pub title: String,
    pub video: Option<PathBuf>,
    pub original_subtitle: PathBuf,
    /// Canonical language of the original subtitle
    pub original_language: String,
    pub translated_subtitle: PathBuf,
    /// Suffix identifying the translation language in file names
    pub translated_suffix: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactKind {
    Video,
    OriginalSubtitle,
    TranslatedSubtitle,
    Transient,
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Video => "video",
            Self::OriginalSubtitle => "original subtitle",
            Self::TranslatedSubtitle => "translated subtitle",
            Self::Transient => "temporary file",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactOutcome {
    Moved(PathBuf),
    /// The source was not at the expected path
    Missing,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactRecord {
    pub kind: ArtifactKind,
    pub source: PathBuf,
    pub outcome: ArtifactOutcome,
}

#[derive(Debug, Clone, Default)]
pub struct OrganizeReport {
    pub records: Vec<ArtifactRecord>,
}

impl OrganizeReport {
    /// Destination of the first moved artifact of `kind`
    pub fn destination(&self, kind: &ArtifactKind) -> Option<&Path> {
        self.records.iter().find_map(|record| match &record.outcome {
            ArtifactOutcome::Moved(dest) if &record.kind == kind => Some(dest.as_path()),
            _ => None,
        })
    }

    pub fn record(&self, kind: &ArtifactKind) -> Option<&ArtifactRecord> {
        self.records.iter().find(|record| &record.kind == kind)
    }

    pub fn failures(&self) -> impl Iterator<Item = &ArtifactRecord> {
        self.records
            .iter()
            .filter(|record| matches!(record.outcome, ArtifactOutcome::Failed(_)))
    }

    pub fn has_failures(&self) -> bool {
        self.failures().next().is_some()
    }
}

pub struct Organizer {
    layout: LayoutConfig,
    work_dir: PathBuf,
}

impl Organizer {
    pub fn new<P: AsRef<Path>>(layout: LayoutConfig, work_dir: P) -> Self {
        Self {
            layout,
            work_dir: work_dir.as_ref().to_path_buf(),
        }
    }

    pub fn video_dir(&self) -> PathBuf {
        self.work_dir.join(&self.layout.video_dir)
    }

    pub fn subtitle_dir(&self) -> PathBuf {
        self.work_dir.join(&self.layout.subtitle_dir)
    }

    pub fn temp_dir(&self) -> PathBuf {
        self.work_dir.join(&self.layout.temp_dir)
    }

    /// Create the destination folders if they are missing
    pub async fn ensure_folders(&self) -> Result<()> {
        for dir in [self.video_dir(), self.subtitle_dir(), self.temp_dir()] {
            fs::create_dir_all(&dir).await?;
        }
        Ok(())
    }

    /// Move every artifact of the run into its folder
    pub async fn organize(&self, artifacts: &ArtifactSet) -> Result<OrganizeReport> {
        self.ensure_folders().await?;
        let mut report = OrganizeReport::default();

        if let Some(video) = &artifacts.video {
            let extension = video
                .extension()
                .map(|ext| format!(".{}", ext.to_string_lossy()))
                .unwrap_or_default();
            let dest = self.video_dir().join(format!("{}{}", artifacts.title, extension));
            report.records.push(self.relocate(ArtifactKind::Video, video, &dest).await);
        }

        let original_dest = self.subtitle_dir().join(format!(
            "{}.{}.{}",
            artifacts.title, artifacts.original_language, SUBTITLE_EXTENSION
        ));
        report.records.push(
            self.relocate(ArtifactKind::OriginalSubtitle, &artifacts.original_subtitle, &original_dest)
                .await,
        );

        let translated_dest = self.subtitle_dir().join(format!(
            "{}_{}.{}",
            artifacts.title, artifacts.translated_suffix, SUBTITLE_EXTENSION
        ));
        report.records.push(
            self.relocate(ArtifactKind::TranslatedSubtitle, &artifacts.translated_subtitle, &translated_dest)
                .await,
        );

        for transient in self.transient_files() {
            let Some(file_name) = transient.file_name() else {
                continue;
            };
            let dest = self.temp_dir().join(file_name);
            report.records.push(self.relocate(ArtifactKind::Transient, &transient, &dest).await);
        }

        for failure in report.failures() {
            warn!("Could not move {} {}", failure.kind, failure.source.display());
        }
        info!("Organized {} artifacts", report.records.len());
        Ok(report)
    }

    /// Files directly inside the working directory whose extension marks them as byproducts
    fn transient_files(&self) -> Vec<PathBuf> {
        WalkDir::new(&self.work_dir)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| {
                e.path().extension().is_some_and(|ext| {
                    let ext = ext.to_string_lossy();
                    self.layout.transient_extensions.iter().any(|t| t.eq_ignore_ascii_case(&ext))
                })
            })
            .map(|e| e.into_path())
            .collect()
    }

    async fn relocate(&self, kind: ArtifactKind, source: &Path, dest: &Path) -> ArtifactRecord {
        let outcome = match fs::try_exists(source).await {
            Ok(false) => {
                debug!("Skipping {}: {} does not exist", kind, source.display());
                ArtifactOutcome::Missing
            }
            Ok(true) => match move_file(source, dest).await {
                Ok(()) => {
                    info!("Moved {} to {}", kind, dest.display());
                    ArtifactOutcome::Moved(dest.to_path_buf())
                }
                Err(e) => ArtifactOutcome::Failed(e.to_string()),
            },
            Err(e) => ArtifactOutcome::Failed(format!("cannot inspect {}: {}", source.display(), e)),
        };

        ArtifactRecord {
            kind,
            source: source.to_path_buf(),
            outcome,
        }
    }
}

/// Rename, falling back to copy and delete when the rename is refused
/// (different filesystems)
async fn move_file(source: &Path, dest: &Path) -> std::io::Result<()> {
    if source == dest {
        return Ok(());
    }
    match fs::rename(source, dest).await {
        Ok(()) => Ok(()),
        Err(rename_err) => {
            debug!("Rename failed ({}), copying instead", rename_err);
            fs::copy(source, dest).await?;
            fs::remove_file(source).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use assert_fs::prelude::*;
    use assert_fs::TempDir;

    fn artifacts(dir: &TempDir) -> ArtifactSet {
        ArtifactSet {
            title: "Clip".to_string(),
            video: Some(dir.path().join("Clip.webm")),
            original_subtitle: dir.path().join("Clip.zh-Hans.srt"),
            original_language: "zh-cn".to_string(),
            translated_subtitle: dir.path().join("Clip_kh.srt"),
            translated_suffix: "kh".to_string(),
        }
    }

    #[tokio::test]
    async fn test_moves_all_artifacts() {
        let dir = TempDir::new().unwrap();
        dir.child("Clip.webm").write_str("video").unwrap();
        dir.child("Clip.zh-Hans.srt").write_str("orig").unwrap();
        dir.child("Clip_kh.srt").write_str("translated").unwrap();
        dir.child("Clip.f137.mp4.part").write_str("partial").unwrap();
        dir.child("notes.txt").write_str("keep").unwrap();

        let organizer = Organizer::new(Config::default().layout, dir.path());
        let report = organizer.organize(&artifacts(&dir)).await.unwrap();

        dir.child("videos/Clip.webm").assert("video");
        dir.child("subtitles/Clip.zh-cn.srt").assert("orig");
        dir.child("subtitles/Clip_kh.srt").assert("translated");
        dir.child("temp/Clip.f137.mp4.part").assert("partial");
        dir.child("notes.txt").assert("keep");
        assert!(!dir.child("Clip.webm").path().exists());
        assert!(!report.has_failures());
        assert_eq!(report.records.len(), 4);
        assert_eq!(
            report.destination(&ArtifactKind::Video),
            Some(dir.child("videos/Clip.webm").path())
        );
    }

    #[tokio::test]
    async fn test_missing_video_is_skipped_without_error() {
        let dir = TempDir::new().unwrap();
        dir.child("Clip.zh-Hans.srt").write_str("orig").unwrap();
        dir.child("Clip_kh.srt").write_str("translated").unwrap();

        let organizer = Organizer::new(Config::default().layout, dir.path());
        let report = organizer.organize(&artifacts(&dir)).await.unwrap();

        let video = report.record(&ArtifactKind::Video).unwrap();
        assert_eq!(video.outcome, ArtifactOutcome::Missing);
        assert!(!dir.child("videos/Clip.webm").path().exists());
        dir.child("subtitles/Clip_kh.srt").assert("translated");
        assert!(matches!(
            report.record(&ArtifactKind::TranslatedSubtitle).unwrap().outcome,
            ArtifactOutcome::Moved(_)
        ));
    }

    #[tokio::test]
    async fn test_failed_move_does_not_stop_the_rest() {
        let dir = TempDir::new().unwrap();
        dir.child("Clip.webm").write_str("video").unwrap();
        dir.child("Clip.zh-Hans.srt").write_str("orig").unwrap();
        dir.child("Clip_kh.srt").write_str("translated").unwrap();
        // A directory squatting on the destination makes both rename and copy fail
        dir.child("subtitles/Clip.zh-cn.srt").create_dir_all().unwrap();

        let organizer = Organizer::new(Config::default().layout, dir.path());
        let report = organizer.organize(&artifacts(&dir)).await.unwrap();

        assert!(matches!(
            report.record(&ArtifactKind::OriginalSubtitle).unwrap().outcome,
            ArtifactOutcome::Failed(_)
        ));
        assert_eq!(report.failures().count(), 1);
        dir.child("videos/Clip.webm").assert("video");
        dir.child("subtitles/Clip_kh.srt").assert("translated");
        dir.child("Clip.zh-Hans.srt").assert("orig");
    }

    #[tokio::test]
    async fn test_uninspectable_source_is_a_failure() {
        let dir = TempDir::new().unwrap();
        dir.child("Clip.zh-Hans.srt").write_str("orig").unwrap();
        dir.child("Clip_kh.srt").write_str("translated").unwrap();
        // A regular file used as a parent directory cannot be stat'ed through
        dir.child("not-a-dir").write_str("").unwrap();

        let mut set = artifacts(&dir);
        set.video = Some(dir.path().join("not-a-dir/Clip.webm"));

        let organizer = Organizer::new(Config::default().layout, dir.path());
        let report = organizer.organize(&set).await.unwrap();

        assert!(matches!(
            report.record(&ArtifactKind::Video).unwrap().outcome,
            ArtifactOutcome::Failed(_)
        ));
        dir.child("subtitles/Clip_kh.srt").assert("translated");
    }

    #[tokio::test]
    async fn test_folders_are_created_idempotently() {
        let dir = TempDir::new().unwrap();
        let organizer = Organizer::new(Config::default().layout, dir.path());

        organizer.ensure_folders().await.unwrap();
        organizer.ensure_folders().await.unwrap();

        assert!(dir.child("videos").path().is_dir());
        assert!(dir.child("subtitles").path().is_dir());
        assert!(dir.child("temp").path().is_dir());
    }
}

use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::error::{Result, SubburnError};
use crate::language::LanguagePriority;

/// A subtitle file recognised by the language matcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleCandidate {
    pub path: PathBuf,
    pub language: String,
    pub rank: usize,
}

/// The subtitle file chosen for translation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionResult {
    pub path: PathBuf,
    pub language: String,
}

/// Pick the highest priority subtitle file directly inside `directory`.
///
/// Files matching the same language tie; the first one enumerated wins, and
/// enumeration order is up to the platform.
pub fn select<P: AsRef<Path>>(directory: P, priority: &LanguagePriority) -> Result<Option<SelectionResult>> {
    let directory = directory.as_ref();
    if !directory.is_dir() {
        return Err(SubburnError::FileNotFound(directory.display().to_string()));
    }

    let mut best: Option<SubtitleCandidate> = None;

    for entry in WalkDir::new(directory)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
    {
        let file_name = entry.file_name().to_string_lossy();
        let Some((rank, language)) = priority.classify_with_rank(&file_name) else {
            continue;
        };
        debug!("Subtitle candidate {} -> {} (rank {})", file_name, language, rank);

        if best.as_ref().is_none_or(|current| rank < current.rank) {
            best = Some(SubtitleCandidate {
                path: entry.path().to_path_buf(),
                language: language.to_string(),
                rank,
            });
        }
    }

    Ok(best.map(|candidate| {
        info!("Selected {} subtitles: {}", candidate.language, candidate.path.display());
        SelectionResult {
            path: candidate.path,
            language: candidate.language,
        }
    }))
}

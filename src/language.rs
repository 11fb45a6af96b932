//! Mapping of subtitle filenames to canonical source languages.
//!
//! yt-dlp names subtitle files `<title>.<lang>.srt`, where `<lang>` is whatever
//! tag the site used (`zh-Hant`, `en-GB`, ...). The matcher folds these aliases
//! into a small set of canonical codes ordered by preference.
//!
//! Matching is substring based rather than tokenized: a title that happens to
//! contain `.en.` will be classified as English even if the track is not. This
//! is a known limitation and is kept as is.

use serde::{Deserialize, Serialize};

/// Extension every candidate subtitle file must carry
pub const SUBTITLE_EXTENSION: &str = "srt";

/// One canonical language and the filename tags that map to it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageEntry {
    pub canonical: String,
    pub aliases: Vec<String>,
}

impl LanguageEntry {
    pub fn new<S: Into<String>>(canonical: S, aliases: &[&str]) -> Self {
        Self {
            canonical: canonical.into(),
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
        }
    }
}

/// Ordered list of accepted source languages; lower index means higher preference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguagePriority {
    entries: Vec<LanguageEntry>,
}

impl Default for LanguagePriority {
    fn default() -> Self {
        Self::new(vec![
            LanguageEntry::new("zh-cn", &["zh-CN", "zh", "zh-Hans", "zh-Hant", "zh-HK", "zh-TW"]),
            LanguageEntry::new("en", &["en", "en-US", "en-GB"]),
        ])
    }
}

impl LanguagePriority {
    pub fn new(entries: Vec<LanguageEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[LanguageEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<LanguageEntry> {
        self.entries
    }

    /// Position of a canonical code in the list
    pub fn priority_of(&self, canonical: &str) -> Option<usize> {
        self.entries.iter().position(|entry| entry.canonical == canonical)
    }

    /// Every alias across all entries, first occurrence wins, for the downloader's
    /// subtitle language request
    pub fn download_languages(&self) -> Vec<String> {
        let mut languages: Vec<String> = Vec::new();
        for alias in self.entries.iter().flat_map(|entry| entry.aliases.iter()) {
            if !languages.contains(alias) {
                languages.push(alias.clone());
            }
        }
        languages
    }

    /// Decide which canonical language a subtitle filename represents.
    ///
    /// Returns the canonical code together with its index in the list.
    pub fn classify_with_rank(&self, filename: &str) -> Option<(usize, &str)> {
        let lower_name = filename.to_lowercase();
        let extension = format!(".{}", SUBTITLE_EXTENSION);
        if !lower_name.ends_with(&extension) {
            return None;
        }

        for (rank, entry) in self.entries.iter().enumerate() {
            for alias in &entry.aliases {
                if alias_matches(&lower_name, &alias.to_lowercase()) {
                    return Some((rank, entry.canonical.as_str()));
                }
            }
        }
        None
    }

    pub fn classify(&self, filename: &str) -> Option<&str> {
        self.classify_with_rank(filename).map(|(_, canonical)| canonical)
    }
}

/// Decide which canonical language a subtitle filename represents
pub fn classify<'a>(filename: &str, priority: &'a LanguagePriority) -> Option<&'a str> {
    priority.classify(filename)
}

fn alias_matches(lower_name: &str, alias: &str) -> bool {
    let token = format!(".{}.", alias);
    let underscore_suffix = format!("_{}.{}", alias, SUBTITLE_EXTENSION);
    let dot_suffix = format!(".{}.{}", alias, SUBTITLE_EXTENSION);

    lower_name.contains(&token)
        || lower_name.ends_with(&underscore_suffix)
        || lower_name.ends_with(&dot_suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_english_dot_suffix() {
        let priority = LanguagePriority::default();
        assert_eq!(classify("movie.en.srt", &priority), Some("en"));
    }

    #[test]
    fn test_aliases_fold_to_canonical() {
        let priority = LanguagePriority::default();
        assert_eq!(classify("a.zh-CN.srt", &priority), Some("zh-cn"));
        assert_eq!(classify("Some Show.zh-Hant.srt", &priority), Some("zh-cn"));
        assert_eq!(classify("clip_en-GB.srt", &priority), Some("en"));
        assert_eq!(classify("CLIP.EN-US.SRT", &priority), Some("en"));
    }

    #[test]
    fn test_non_subtitle_extension_is_rejected() {
        let priority = LanguagePriority::default();
        assert_eq!(classify("movie.en.vtt", &priority), None);
        assert_eq!(classify("movie.en.mp4", &priority), None);
        assert_eq!(classify("movie.en.srt.part", &priority), None);
    }

    #[test]
    fn test_unknown_language_is_none() {
        let priority = LanguagePriority::default();
        assert_eq!(classify("movie.fr.srt", &priority), None);
        assert_eq!(classify("movie.srt", &priority), None);
        assert_eq!(classify("movie_kh.srt", &priority), None);
    }

    #[test]
    fn test_alias_inside_title_false_positive_is_kept() {
        // `.en.` inside the title matches even though the track is French
        let priority = LanguagePriority::default();
        assert_eq!(classify("road.en.route.fr.srt", &priority), Some("en"));
    }

    #[test]
    fn test_first_entry_wins_when_both_match() {
        let priority = LanguagePriority::default();
        assert_eq!(classify("talk.en.zh.srt", &priority), Some("zh-cn"));
        assert_eq!(priority.classify_with_rank("talk.en.srt"), Some((1, "en")));
    }

    #[test]
    fn test_classify_only_depends_on_lowercase_name() {
        let priority = LanguagePriority::default();
        for name in ["Movie.ZH.srt", "movie.zh.SRT", "MOVIE.zh.Srt"] {
            assert_eq!(classify(name, &priority), classify(&name.to_lowercase(), &priority));
        }
    }

    #[test]
    fn test_custom_priority_is_respected() {
        let priority = LanguagePriority::new(vec![
            LanguageEntry::new("en", &["en"]),
            LanguageEntry::new("ja", &["ja", "jpn"]),
        ]);
        assert_eq!(classify("x.jpn.srt", &priority), Some("ja"));
        assert_eq!(classify("x.zh.srt", &priority), None);
        assert_eq!(priority.priority_of("ja"), Some(1));
    }

    #[test]
    fn test_download_languages_dedupes_in_order() {
        let priority = LanguagePriority::new(vec![
            LanguageEntry::new("zh-cn", &["zh-CN", "zh"]),
            LanguageEntry::new("en", &["en", "zh"]),
        ]);
        assert_eq!(priority.download_languages(), vec!["zh-CN", "zh", "en"]);
        assert_eq!(LanguagePriority::default().download_languages().len(), 9);
    }
}

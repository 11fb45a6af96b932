use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::TranslateConfig;
use crate::error::Result;
use crate::subtitle::SubtitleDocument;
use super::Translator;

/// Result of translating one subtitle entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryOutcome {
    Translated(String),
    /// Nothing to translate; the entry keeps its text
    Blank,
    Failed(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationReport {
    pub outcomes: Vec<EntryOutcome>,
}

impl TranslationReport {
    pub fn translated(&self) -> usize {
        self.count(|o| matches!(o, EntryOutcome::Translated(_)))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, EntryOutcome::Failed(_)))
    }

    pub fn blank(&self) -> usize {
        self.count(|o| matches!(o, EntryOutcome::Blank))
    }

    fn count(&self, predicate: impl Fn(&EntryOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|o| predicate(*o)).count()
    }
}

/// Split `text` into consecutive pieces of at most `max_chars` characters.
/// Text at or below the limit comes back as a single piece.
pub fn chunk_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= max_chars {
        return vec![text.to_string()];
    }
    chars.chunks(max_chars).map(|piece| piece.iter().collect()).collect()
}

/// Translates subtitle documents one entry at a time through a [`Translator`]
pub struct DocumentTranslator<'a> {
    translator: &'a dyn Translator,
    chunk_size: usize,
    pacing: Duration,
    placeholder: String,
    calls: usize,
}

impl<'a> DocumentTranslator<'a> {
    pub fn new(translator: &'a dyn Translator, config: &TranslateConfig) -> Self {
        Self {
            translator,
            chunk_size: config.chunk_size,
            pacing: Duration::from_millis(config.pacing_ms),
            placeholder: config.placeholder.clone(),
            calls: 0,
        }
    }

    /// Translate a piece of text, chunking it when it exceeds the chunk size.
    /// Pieces are translated in order and rejoined with a single space.
    pub async fn translate_text(
        &mut self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String> {
        let chunks = chunk_text(text, self.chunk_size);
        if chunks.len() > 1 {
            debug!("Splitting {} characters into {} chunks", text.chars().count(), chunks.len());
        }

        let mut translated = Vec::with_capacity(chunks.len());
        for chunk in &chunks {
            self.pace().await;
            translated.push(self.translator.translate(chunk, source_language, target_language).await?);
        }
        Ok(translated.join(" "))
    }

    /// Translate one entry's text; failures are captured, never propagated
    pub async fn translate_entry(
        &mut self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> EntryOutcome {
        let text = text.trim();
        if text.is_empty() {
            return EntryOutcome::Blank;
        }

        match self.translate_text(text, source_language, target_language).await {
            Ok(translation) => EntryOutcome::Translated(translation),
            Err(e) => EntryOutcome::Failed(e.to_string()),
        }
    }

    /// Translate every entry in order, replacing its text in place.
    /// Entries whose translation failed get the placeholder text; timing is untouched.
    pub async fn translate_document(
        &mut self,
        document: &mut SubtitleDocument,
        source_language: &str,
        target_language: &str,
    ) -> TranslationReport {
        let total = document.entries.len();
        info!("Translating {} entries from {} to {}", total, source_language, target_language);

        let progress = ProgressBar::new(total as u64);
        progress.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );

        let mut outcomes = Vec::with_capacity(total);
        for (idx, entry) in document.entries.iter().enumerate() {
            let outcome = self.translate_entry(&entry.text, source_language, target_language).await;
            // Log lines share the terminal with the bar
            progress.suspend(|| match &outcome {
                EntryOutcome::Translated(translation) => {
                    debug!("Entry {}/{}: {:?} -> {:?}", idx + 1, total, entry.text, translation);
                }
                EntryOutcome::Failed(reason) => {
                    warn!("Error translating entry {}/{}: {}", idx + 1, total, reason);
                }
                EntryOutcome::Blank => {}
            });
            outcomes.push(outcome);
            progress.inc(1);
        }
        progress.finish_and_clear();

        for (entry, outcome) in document.entries.iter_mut().zip(&outcomes) {
            match outcome {
                EntryOutcome::Translated(translation) => entry.text = translation.clone(),
                EntryOutcome::Failed(_) => entry.text = self.placeholder.clone(),
                EntryOutcome::Blank => {}
            }
        }

        let report = TranslationReport { outcomes };
        info!(
            "Translation finished: {} translated, {} failed, {} blank",
            report.translated(),
            report.failed(),
            report.blank()
        );
        report
    }

    /// Sleep between consecutive calls to the translator
    async fn pace(&mut self) {
        if self.calls > 0 && !self.pacing.is_zero() {
            tokio::time::sleep(self.pacing).await;
        }
        self.calls += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::error::SubburnError;
    use crate::subtitle::SubtitleEntry;
    use crate::translate::MockTranslator;

    fn config() -> TranslateConfig {
        let mut config = Config::default().translate;
        config.pacing_ms = 0;
        config
    }

    fn document(texts: &[&str]) -> SubtitleDocument {
        SubtitleDocument {
            entries: texts
                .iter()
                .enumerate()
                .map(|(i, text)| SubtitleEntry {
                    index: i + 1,
                    start: i as u64 * 1000,
                    end: i as u64 * 1000 + 900,
                    text: text.to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_chunk_boundary() {
        let exact = "a".repeat(200);
        assert_eq!(chunk_text(&exact, 200), vec![exact.clone()]);

        let over = format!("{}b", "a".repeat(200));
        let chunks = chunk_text(&over, 200);
        assert_eq!(chunks, vec!["a".repeat(200), "b".to_string()]);
        assert_eq!(chunks.concat(), over);
    }

    #[test]
    fn test_chunk_counts_characters_not_bytes() {
        let text = "字".repeat(200);
        assert_eq!(chunk_text(&text, 200).len(), 1);
        assert_eq!(chunk_text(&"字".repeat(401), 200).len(), 3);
    }

    #[tokio::test]
    async fn test_long_text_is_translated_in_chunks_and_rejoined() {
        let mut translator = MockTranslator::new();
        translator
            .expect_translate()
            .times(2)
            .returning(|text, _, _| Ok(format!("<{}>", text.chars().count())));

        let config = config();
        let mut doc_translator = DocumentTranslator::new(&translator, &config);
        let text = "x".repeat(201);
        let result = doc_translator.translate_text(&text, "en", "km").await.unwrap();

        assert_eq!(result, "<200> <1>");
    }

    #[tokio::test]
    async fn test_failed_entry_gets_placeholder() {
        let mut translator = MockTranslator::new();
        translator
            .expect_translate()
            .times(3)
            .returning(|text, _, _| {
                if text == "boom" {
                    Err(SubburnError::Translation("service unavailable".to_string()))
                } else {
                    Ok(text.to_uppercase())
                }
            });

        let config = config();
        let mut doc = document(&["one", "boom", "three"]);
        let original = doc.clone();
        let report = DocumentTranslator::new(&translator, &config)
            .translate_document(&mut doc, "en", "km")
            .await;

        assert_eq!(doc.entries[0].text, "ONE");
        assert_eq!(doc.entries[1].text, "[Translation Error]");
        assert_eq!(doc.entries[2].text, "THREE");
        assert_eq!(report.failed(), 1);
        assert_eq!(report.translated(), 2);
        for (before, after) in original.entries.iter().zip(&doc.entries) {
            assert_eq!((before.start, before.end), (after.start, after.end));
        }
    }

    #[tokio::test]
    async fn test_blank_entries_skip_the_translator() {
        let mut translator = MockTranslator::new();
        translator
            .expect_translate()
            .withf(|text, source, target| text == "hi" && source == "zh-cn" && target == "km")
            .times(1)
            .returning(|_, _, _| Ok("សួស្តី".to_string()));

        let config = config();
        let mut doc = document(&["  ", "  hi\n"]);
        let report = DocumentTranslator::new(&translator, &config)
            .translate_document(&mut doc, "zh-cn", "km")
            .await;

        assert_eq!(doc.entries[0].text, "  ");
        assert_eq!(doc.entries[1].text, "សួស្តី");
        assert_eq!(report.blank(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_calls_are_paced() {
        let mut translator = MockTranslator::new();
        translator.expect_translate().times(3).returning(|t, _, _| Ok(t.to_string()));

        let mut config = config();
        config.pacing_ms = 100;
        let mut doc = document(&["a", "b", "c"]);

        let started = tokio::time::Instant::now();
        DocumentTranslator::new(&translator, &config)
            .translate_document(&mut doc, "en", "km")
            .await;

        // Two pauses between three calls
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(200));
        assert!(elapsed < Duration::from_millis(300));
    }
}

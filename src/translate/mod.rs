// Translation architecture
//
// - Translator: narrow capability that turns one text fragment into another language
// - Google: HTTP implementation against the public translate endpoint
// - Document: walks a subtitle document entry by entry, chunking long texts,
//   pacing calls and isolating per-entry failures

pub mod document;
pub mod google;

use async_trait::async_trait;

pub use document::*;
use crate::config::TranslateConfig;
use crate::error::Result;

/// Main trait for translation operations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate a single text fragment
    async fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String>;
}

/// Factory for creating translator instances
pub struct TranslatorFactory;

impl TranslatorFactory {
    /// Create the default translator implementation (Google Translate endpoint)
    pub fn create_translator(config: &TranslateConfig) -> Result<Box<dyn Translator>> {
        Ok(Box::new(google::GoogleTranslator::new(config)?))
    }
}

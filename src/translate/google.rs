use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::config::TranslateConfig;
use crate::error::{Result, SubburnError};
use super::Translator;

/// Translator backed by the public `translate_a/single` endpoint
pub struct GoogleTranslator {
    client: Client,
    endpoint: String,
}

impl GoogleTranslator {
    pub fn new(config: &TranslateConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(concat!("subburn/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl Translator for GoogleTranslator {
    async fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String> {
        let url = format!("{}/translate_a/single", self.endpoint);
        let source = endpoint_language_code(source_language);
        let target = endpoint_language_code(target_language);

        debug!("Sending translation request ({} -> {}) to: {}", source, target, url);

        let response = self.client
            .get(&url)
            .query(&[
                ("client", "gtx"),
                ("sl", source.as_str()),
                ("tl", target.as_str()),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await
            .map_err(|e| SubburnError::Translation(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(SubburnError::Translation(format!(
                "Translate API error {}: {}", status, error_text
            )));
        }

        let body: Value = response.json().await
            .map_err(|e| SubburnError::Translation(format!("Failed to parse response: {}", e)))?;

        extract_translation(&body)
    }
}

/// The endpoint wants region subtags upper-cased (`zh-CN`)
fn endpoint_language_code(code: &str) -> String {
    match code.split_once('-') {
        Some((language, region)) if region.len() == 2 => {
            format!("{}-{}", language.to_lowercase(), region.to_uppercase())
        }
        _ => code.to_string(),
    }
}

/// Concatenate the translated sentences of a `[[["out", "in", ...], ...], ...]` body
fn extract_translation(body: &Value) -> Result<String> {
    let sentences = body
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| SubburnError::Translation("Unexpected response shape".to_string()))?;

    let translated: String = sentences
        .iter()
        .filter_map(|sentence| sentence.get(0).and_then(Value::as_str))
        .collect();

    if translated.trim().is_empty() {
        return Err(SubburnError::Translation("Empty translation received".to_string()));
    }
    Ok(translated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_translation_joins_sentences() {
        let body = json!([
            [["សួស្តី។ ", "你好。", null, null, 10], ["លាហើយ", "再见", null, null, 10]],
            null,
            "zh-CN"
        ]);
        assert_eq!(extract_translation(&body).unwrap(), "សួស្តី។ លាហើយ");
    }

    #[test]
    fn test_extract_translation_rejects_unexpected_shape() {
        assert!(extract_translation(&json!({"error": "nope"})).is_err());
        assert!(extract_translation(&json!([[]])).is_err());
    }

    #[test]
    fn test_endpoint_language_code() {
        assert_eq!(endpoint_language_code("zh-cn"), "zh-CN");
        assert_eq!(endpoint_language_code("en"), "en");
        assert_eq!(endpoint_language_code("km"), "km");
        assert_eq!(endpoint_language_code("zh-Hant"), "zh-Hant");
    }
}

//! HTTP translation backend for display labels.
//!
//! Speaks the LibreTranslate `/translate` format: a JSON body of
//! `{q, source, target, format}` answered with `{translatedText}`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::LocalizationConfig;
use crate::error::{Result, RetrievalError};
use crate::label_cache::Localizer;

/// Localizer backed by a LibreTranslate-compatible service.
pub struct HttpLocalizer {
    base_url: String,
    source: String,
    target: String,
    client: reqwest::Client,
}

impl HttpLocalizer {
    /// Create a localizer translating from `source` to `target`.
    pub fn new(
        base_url: impl Into<String>,
        source: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            source: source.into(),
            target: target.into(),
            client: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: &LocalizationConfig) -> Self {
        Self::new(&config.base_url, &config.source, &config.target)
    }

    pub fn target(&self) -> &str {
        &self.target
    }
}

#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    q: &'a str,
    source: &'a str,
    target: &'a str,
    format: &'static str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TranslateResponse {
    translated_text: String,
}

#[async_trait]
impl Localizer for HttpLocalizer {
    fn name(&self) -> &str {
        "http"
    }

    async fn localize(&self, text: &str) -> Result<String> {
        let body = TranslateRequest {
            q: text,
            source: &self.source,
            target: &self.target,
            format: "text",
        };

        let response = self
            .client
            .post(format!("{}/translate", self.base_url))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(RetrievalError::Localization(format!(
                "translation service error ({status}): {error_text}"
            )));
        }

        let parsed: TranslateResponse = response.json().await?;
        if parsed.translated_text.trim().is_empty() {
            return Err(RetrievalError::Localization(format!(
                "empty translation for {text:?}"
            )));
        }

        debug!(target_lang = %self.target, "Translated label");
        Ok(parsed.translated_text)
    }
}

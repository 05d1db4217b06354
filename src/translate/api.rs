//! LibreTranslate client and translation gate.
//!
//! The gate fails open: any detection problem means the original message is
//! delivered untranslated. Per-target translation failures only omit that
//! target's passage.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::common::error::{TranslateError, TranslateResult};

/// Detections at or below this confidence are not acted on. Unitless,
/// service-defined scale.
const MIN_CONFIDENCE: f64 = 10.0;

/// Script variants treated as the same language for skip purposes.
const ZH_VARIANTS: [&str; 2] = ["zh-Hans", "zh-Hant"];

/// Outcome of one translation-gate invocation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TranslationResult {
    /// True iff at least one passage was produced.
    pub action: bool,
    /// Translated passages, tagged `[<source> -> <target>] <text>`, in
    /// target-list order.
    pub passages: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct LanguagesEntry {
    #[serde(default)]
    targets: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct Detection {
    language: Option<String>,
    confidence: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct Translation {
    #[serde(rename = "translatedText")]
    translated_text: Option<String>,
}

#[derive(Debug, Serialize)]
struct DetectRequest<'a> {
    q: &'a str,
    api_key: &'a str,
}

#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    q: &'a str,
    source: &'a str,
    target: &'a str,
    api_key: &'a str,
}

/// LibreTranslate API client with the session's cached allowed-language set.
#[derive(Debug)]
pub struct Translator {
    base: String,
    api_key: String,
    client: reqwest::Client,
    allowed: Vec<String>,
}

impl Translator {
    /// Create a client and fetch the advertised allowed-language set once.
    ///
    /// A failure here is a hard error for the translation feature for the
    /// remainder of the session: the feature must not claim support it
    /// doesn't have.
    pub async fn init(url: &str, api_key: &str) -> TranslateResult<Self> {
        reqwest::Url::parse(url).map_err(|_| TranslateError::InvalidUrl {
            url: url.to_string(),
        })?;
        let base = if url.ends_with('/') {
            url.to_string()
        } else {
            format!("{}/", url)
        };

        let client = reqwest::Client::new();
        let response = client
            .get(format!("{}languages", base))
            .query(&[("api_key", api_key)])
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(TranslateError::Status {
                status: response.status().as_u16(),
            });
        }

        let entries: Vec<LanguagesEntry> = response.json().await?;
        let allowed = entries
            .into_iter()
            .next()
            .map(|entry| entry.targets)
            .unwrap_or_default();
        if allowed.is_empty() {
            return Err(TranslateError::MalformedResponse {
                message: "languages response listed no targets".to_string(),
            });
        }
        info!(
            "Translation service advertises {} target languages",
            allowed.len()
        );

        Ok(Self {
            base,
            api_key: api_key.to_string(),
            client,
            allowed,
        })
    }

    async fn detect(&self, q: &str) -> TranslateResult<Detection> {
        let response = self
            .client
            .post(format!("{}detect", self.base))
            .json(&DetectRequest {
                q,
                api_key: &self.api_key,
            })
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(TranslateError::Status {
                status: response.status().as_u16(),
            });
        }

        let mut detections: Vec<Detection> = response.json().await?;
        if detections.is_empty() {
            return Err(TranslateError::MalformedResponse {
                message: "empty detection response".to_string(),
            });
        }
        Ok(detections.remove(0))
    }

    async fn request_translation(
        &self,
        q: &str,
        source: &str,
        target: &str,
    ) -> TranslateResult<String> {
        let response = self
            .client
            .post(format!("{}translate", self.base))
            .json(&TranslateRequest {
                q,
                source,
                target,
                api_key: &self.api_key,
            })
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(TranslateError::Status {
                status: response.status().as_u16(),
            });
        }

        let translation: Translation = response.json().await?;
        translation
            .translated_text
            .ok_or_else(|| TranslateError::MalformedResponse {
                message: "translate response missing translatedText".to_string(),
            })
    }

    /// Whether translating `detected` into `target` would be pointless.
    fn skip_target(&self, detected: &str, target: &str) -> bool {
        detected == target
            || same_macro_language(detected, target)
            || !self.allowed.iter().any(|code| code == detected)
            || !self.allowed.iter().any(|code| code == target)
    }

    /// Detect the source language and translate into each applicable target.
    pub async fn translate(&self, text: &str, targets: &[String]) -> TranslationResult {
        let detection = match self.detect(text).await {
            Ok(detection) => detection,
            Err(e) => {
                warn!("Language detection failed: {}", e);
                return TranslationResult::default();
            }
        };
        let (language, confidence) = match (detection.language, detection.confidence) {
            (Some(language), Some(confidence)) => (language, confidence),
            _ => {
                warn!("Invalid language detection result");
                return TranslationResult::default();
            }
        };
        // Strictly greater: a detection at exactly the threshold is not
        // acted on.
        if confidence <= MIN_CONFIDENCE {
            return TranslationResult::default();
        }

        let mut passages = Vec::new();
        for target in targets {
            if self.skip_target(&language, target) {
                continue;
            }
            match self.request_translation(text, &language, target).await {
                Ok(translated) => {
                    passages.push(format!("[{} -> {}] {}", language, target, translated));
                }
                Err(e) => warn!("Translation to '{}' failed: {}", target, e),
            }
        }

        TranslationResult {
            action: !passages.is_empty(),
            passages,
        }
    }
}

/// True when both codes are regional script variants of one macro-language.
fn same_macro_language(a: &str, b: &str) -> bool {
    ZH_VARIANTS.contains(&a) && ZH_VARIANTS.contains(&b)
}

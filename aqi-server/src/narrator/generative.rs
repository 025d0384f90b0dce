//! Generative narrator backed by a Gemini-style `generateContent` endpoint.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::ImpactNarrator;
use super::error::NarrationError;

/// Default API base URL.
pub const DEFAULT_NARRATOR_URL: &str = "https://generativelanguage.googleapis.com";

/// Default model name.
pub const DEFAULT_NARRATOR_MODEL: &str = "gemini-2.0-flash";

const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// How the prompt frames the reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PromptStyle {
    /// Punchy, everyday comparisons.
    #[default]
    Witty,
    /// Sober figures with the health data behind them.
    Scientific,
}

impl PromptStyle {
    /// Build the prompt for one reading.
    pub fn build_prompt(&self, aqi: u32, location: &str) -> String {
        let voice = match self {
            PromptStyle::Witty => {
                "You are a witty and relatable environmental assistant. Translate \
                 Air Quality Index numbers into comparisons that make the impact \
                 instantly clear. Keep every line short and punchy."
            }
            PromptStyle::Scientific => {
                "You are an environmental health analyst. Translate Air Quality \
                 Index numbers into plain statements grounded in WHO air pollution \
                 health data. Be precise and avoid jokes."
            }
        };

        format!(
            "{voice}\n\n\
             Location: {location}\n\
             AQI: {aqi}\n\n\
             Give exactly 3 examples of this AQI's impact, one per category:\n\
             1. \"Cigarettes smoked (24hrs): X cigarettes\"\n\
             2. \"Reduced life expectancy: X hours/days per year\"\n\
             3. \"Equivalent to: <relatable scenario>\"\n\n\
             Use realistic numbers: minimal impacts for AQI 0-50, severe ones above 300.\n\
             Reply with JSON only, shaped as {{\"examples\": [\"...\", \"...\", \"...\"]}}."
        )
    }
}

impl FromStr for PromptStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "witty" => Ok(PromptStyle::Witty),
            "scientific" => Ok(PromptStyle::Scientific),
            other => Err(format!("unknown prompt style: {other}")),
        }
    }
}

impl fmt::Display for PromptStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PromptStyle::Witty => write!(f, "witty"),
            PromptStyle::Scientific => write!(f, "scientific"),
        }
    }
}

/// Configuration for the generative narrator.
#[derive(Debug, Clone)]
pub struct GenerativeConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub style: PromptStyle,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl GenerativeConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_NARRATOR_URL.to_string(),
            model: DEFAULT_NARRATOR_MODEL.to_string(),
            style: PromptStyle::default(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Set a custom base URL (for testing or proxies).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_style(mut self, style: PromptStyle) -> Self {
        self.style = style;
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct ExamplesPayload {
    examples: Vec<String>,
}

impl GenerateResponse {
    /// Text of the first candidate, parts concatenated.
    fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        (!text.trim().is_empty()).then_some(text)
    }
}

/// Pull the `{"examples": [...]}` object out of the model's text.
///
/// Models often wrap JSON in Markdown code fences or add a sentence around
/// it, so this parses the outermost `{...}` span. Blank examples are
/// dropped; an empty result is [`NarrationError::NoExamples`].
pub fn extract_examples(text: &str) -> Result<Vec<String>, NarrationError> {
    let start = text.find('{');
    let end = text.rfind('}');
    let json = match (start, end) {
        (Some(start), Some(end)) if start < end => &text[start..=end],
        _ => {
            return Err(NarrationError::Json {
                message: "no JSON object in model output".to_string(),
            });
        }
    };

    let payload: ExamplesPayload =
        serde_json::from_str(json).map_err(|e| NarrationError::Json {
            message: e.to_string(),
        })?;

    let examples: Vec<String> = payload
        .examples
        .into_iter()
        .map(|e| e.trim().to_string())
        .filter(|e| !e.is_empty())
        .collect();

    if examples.is_empty() {
        return Err(NarrationError::NoExamples);
    }
    Ok(examples)
}

/// Narrator that asks a hosted generative model.
#[derive(Debug, Clone)]
pub struct GenerativeNarrator {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    style: PromptStyle,
}

impl GenerativeNarrator {
    pub fn new(config: GenerativeConfig) -> Result<Self, NarrationError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        let endpoint = format!(
            "{}/v1beta/models/{}:generateContent",
            config.base_url.trim_end_matches('/'),
            config.model
        );

        Ok(Self {
            http,
            endpoint,
            api_key: config.api_key,
            style: config.style,
        })
    }

    fn request_body(&self, aqi: u32, location: &str) -> GenerateRequest {
        GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: Some(self.style.build_prompt(aqi, location)),
                }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
            },
        }
    }
}

impl ImpactNarrator for GenerativeNarrator {
    async fn generate_impact_examples(
        &self,
        aqi: u32,
        location: &str,
    ) -> Result<Vec<String>, NarrationError> {
        debug!(aqi, location, style = %self.style, "requesting impact examples");

        let response = self
            .http
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(&self.request_body(aqi, location))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NarrationError::Api {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        let body = response.text().await?;
        let parsed: GenerateResponse =
            serde_json::from_str(&body).map_err(|e| NarrationError::Json {
                message: e.to_string(),
            })?;

        let text = parsed.text().ok_or(NarrationError::NoExamples)?;
        extract_examples(&text)
    }
}

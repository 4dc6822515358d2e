//! Odometer recognition.
//!
//! The [`RecognitionAdapter`] turns image bytes into a validated odometer
//! value. The actual image understanding happens in an external service
//! behind the [`RecognitionService`] trait; [`GeminiClient`] is the HTTP
//! implementation used by the CLI.
//!
//! The service is untrusted: whatever text it returns goes through
//! [`parse_reading`] before it becomes a reading.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::{Config, API_KEY_ENV};
use crate::error::{Error, Result};
use crate::reading::MAX_ODOMETER_VALUE;

/// Instruction sent along with every image.
pub const ODOMETER_INSTRUCTION: &str = "This is a photo of a car's odometer. \
The display shows a six-digit number. Return exactly those six digits as a string \
and nothing else. If the last digit is hard to read, approximate it. \
If the number cannot be read at all, return -1.";

/// Value the service returns when it cannot read the display.
pub const UNREADABLE_SENTINEL: i64 = -1;

/// Validate the service's answer and extract the odometer value.
///
/// # Errors
///
/// Returns [`Error::Recognition`] when the trimmed text is empty, is not a
/// base-10 integer, is the unreadable sentinel, or is outside
/// `0..=999_999`.
pub fn parse_reading(response: &str) -> Result<u32> {
    let trimmed = response.trim();
    if trimmed.is_empty() {
        return Err(Error::recognition(response));
    }

    let value: i64 = trimmed
        .parse()
        .map_err(|_| Error::recognition(response))?;

    if value == UNREADABLE_SENTINEL {
        debug!("Recognition service reported an unreadable odometer");
        return Err(Error::recognition(response));
    }

    u32::try_from(value)
        .ok()
        .filter(|v| *v <= MAX_ODOMETER_VALUE)
        .ok_or_else(|| Error::recognition(response))
}

/// One request to the recognition service.
#[derive(Clone, PartialEq, Eq)]
pub struct RecognitionRequest<'a> {
    /// Credential for the service.
    pub api_key: &'a str,
    /// MIME type of the image.
    pub mime_type: &'a str,
    /// Base64-encoded image bytes.
    pub image_base64: String,
    /// Instruction for interpreting the image.
    pub instruction: &'a str,
}

impl fmt::Debug for RecognitionRequest<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecognitionRequest")
            .field("mime_type", &self.mime_type)
            .field("image_base64_len", &self.image_base64.len())
            .finish_non_exhaustive()
    }
}

/// An external service that describes an image as text.
#[async_trait]
pub trait RecognitionService: Send + Sync + fmt::Debug {
    /// Send the image and instruction; return the service's raw text answer.
    ///
    /// # Errors
    ///
    /// Returns an error if the service cannot be reached or rejects the request.
    async fn generate(&self, request: RecognitionRequest<'_>) -> Result<String>;
}

/// Converts images into validated odometer values.
#[derive(Debug, Clone)]
pub struct RecognitionAdapter {
    service: Arc<dyn RecognitionService>,
    api_key: Option<String>,
}

impl RecognitionAdapter {
    /// Create an adapter over `service`. A blank key counts as missing.
    #[must_use]
    pub fn new(service: Arc<dyn RecognitionService>, api_key: Option<String>) -> Self {
        let api_key = api_key
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());
        Self { service, api_key }
    }

    /// Create an adapter backed by [`GeminiClient`] using `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = GeminiClient::new(&config.recognition.endpoint, &config.recognition.model)?;
        Ok(Self::new(
            Arc::new(client),
            config.api_key().map(str::to_string),
        ))
    }

    /// Whether a credential is configured.
    #[must_use]
    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    /// Read the odometer value shown in `image`.
    ///
    /// # Errors
    ///
    /// - [`Error::Configuration`] if no credential is configured; the service
    ///   is not called.
    /// - [`Error::Recognition`] if the service's answer is not a usable reading.
    /// - [`Error::RecognitionService`] if the call itself fails.
    pub async fn recognize(&self, image: &[u8], mime_type: &str) -> Result<u32> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(Error::configuration(format!(
                "The {API_KEY_ENV} environment variable is not set. \
                 Configure a recognition API key to add readings."
            )));
        };

        let request = RecognitionRequest {
            api_key,
            mime_type,
            image_base64: STANDARD.encode(image),
            instruction: ODOMETER_INSTRUCTION,
        };

        debug!("Sending {} byte {} image for recognition", image.len(), mime_type);
        let response = self.service.generate(request).await?;
        debug!("Recognition service answered {:?}", response);

        let value = parse_reading(&response);
        if value.is_err() {
            warn!("Unusable recognition response: {:?}", response);
        }
        value
    }
}

/// HTTP client for the Gemini `generateContent` API.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    endpoint: String,
    model: String,
}

impl GeminiClient {
    /// Create a client for `model` at `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new(endpoint: &str, model: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("odotrack/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            model: model.to_string(),
        })
    }

    /// The `generateContent` URL for the configured model.
    #[must_use]
    pub fn url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.endpoint, self.model
        )
    }
}

#[async_trait]
impl RecognitionService for GeminiClient {
    async fn generate(&self, request: RecognitionRequest<'_>) -> Result<String> {
        let body = GenerateContentRequest::from_request(&request);

        let response = self
            .http
            .post(self.url())
            .header("x-goog-api-key", request.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(Error::recognition_service(format!(
                "HTTP {status}: {}",
                detail.trim()
            )));
        }

        let parsed: GenerateContentResponse = response.json().await?;
        Ok(parsed.text())
    }
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Image {
        #[serde(rename = "inlineData")]
        inline_data: InlineData<'a>,
    },
    Text {
        text: &'a str,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData<'a> {
    mime_type: &'a str,
    data: &'a str,
}

impl<'a> GenerateContentRequest<'a> {
    fn from_request(request: &'a RecognitionRequest<'a>) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![
                    Part::Image {
                        inline_data: InlineData {
                            mime_type: request.mime_type,
                            data: &request.image_base64,
                        },
                    },
                    Part::Text {
                        text: request.instruction,
                    },
                ],
            }],
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GenerateContentResponse {
    candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CandidateContent {
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Text of the first candidate; empty when the service returned none.
    fn text(&self) -> String {
        self.candidates
            .first()
            .map(|c| {
                c.content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect()
            })
            .unwrap_or_default()
    }
}

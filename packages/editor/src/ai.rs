//! # Text Generation Adapter
//!
//! Listing copy, bullets and ALT text come from a remote model behind the
//! [`TextGenerator`] port. Calls are not retried or cancelled; a failure is
//! reported as text in the output slot.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::EditorConfig;
use crate::errors::EditorError;

/// Placeholder shown while a request is pending
pub const THINKING: &str = "Thinking...";

/// Page text fed to the writer is cut to this many characters
pub const PAGE_TEXT_LIMIT: usize = 2000;

#[allow(async_fn_in_trait)]
pub trait TextGenerator {
    async fn generate(&self, prompt: &str, model: &str) -> Result<String, EditorError>;
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Default, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Default, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateResponse {
    /// Text of every part of the first candidate, one per line
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .map(|p| p.text.as_deref().unwrap_or(""))
                    .collect::<Vec<_>>()
                    .join("\n")
            })
            .unwrap_or_default()
    }
}

/// Extract the generated text from a raw response body
pub fn response_text(body: &str) -> Result<String, EditorError> {
    let response: GenerateResponse = serde_json::from_str(body)
        .map_err(|e| EditorError::RemoteService(format!("Gemini error: {}", e)))?;
    Ok(response.text())
}

/// HTTP client for the Gemini `generateContent` endpoint
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>, config: &EditorConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: config.ai_endpoint.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    fn url(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, model)
    }
}

impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str, model: &str) -> Result<String, EditorError> {
        let key = self.api_key.trim();
        if key.is_empty() {
            return Err(EditorError::RemoteService(
                "Please enter your Gemini API key.".to_string(),
            ));
        }

        let body = GenerateRequest {
            contents: vec![RequestContent {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        debug!(model = %model, prompt_len = prompt.len(), "Requesting generation");
        let response = self
            .http
            .post(self.url(model))
            .query(&[("key", key)])
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(EditorError::RemoteService(format!("Gemini error: {}", text)));
        }
        response_text(&text)
    }
}

/// Free-form prompt, with the selected text appended when there is any
pub fn selection_prompt(base: &str, selection: &str) -> String {
    let base = base.trim();
    if selection.is_empty() {
        base.to_string()
    } else {
        format!("{}\n\nSelection:\n{}", base, selection)
    }
}

pub fn bullets_prompt(selection: &str) -> String {
    let content = if selection.is_empty() {
        "Product benefits and features."
    } else {
        selection
    };
    format!(
        "Turn the following into 4-6 concise eBay-friendly bullet points with emojis where helpful, keep to plain text lines starting with - :\n\n{}",
        content
    )
}

/// ALT text prompt built from the image file name
pub fn alt_text_prompt(src: &str) -> String {
    let file_name = src.rsplit('/').next().unwrap_or(src);
    format!(
        "Generate a concise, descriptive ALT text (max 12 words) for an e-commerce image based on context. If unclear, infer a helpful description via filename or surrounding text. Filename: {}",
        file_name
    )
}

/// What the listing writer should produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WriterGoal {
    Bullets,
    #[serde(rename = "desc")]
    Description,
    Title,
    Faq,
    Meta,
}

impl FromStr for WriterGoal {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bullets" => Ok(WriterGoal::Bullets),
            "desc" | "description" => Ok(WriterGoal::Description),
            "title" => Ok(WriterGoal::Title),
            "faq" => Ok(WriterGoal::Faq),
            "meta" => Ok(WriterGoal::Meta),
            other => Err(format!("unknown writer goal '{}'", other)),
        }
    }
}

impl fmt::Display for WriterGoal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WriterGoal::Bullets => "bullets",
            WriterGoal::Description => "desc",
            WriterGoal::Title => "title",
            WriterGoal::Faq => "faq",
            WriterGoal::Meta => "meta",
        };
        f.write_str(name)
    }
}

pub fn writer_prompt(goal: WriterGoal, tone: &str, content: &str) -> String {
    match goal {
        WriterGoal::Bullets => format!(
            "Create 5-7 short, skimmable bullet points for an eBay listing. Limit to 12 words each, start with an emoji where helpful, keep clear benefits. Tone: {tone}. Content:\n{content}"
        ),
        WriterGoal::Description => format!(
            "Write a concise, high-converting eBay product description (120-180 words). Use short paragraphs and a bullet list. Avoid claims that trigger policies. Tone: {tone}. Content:\n{content}"
        ),
        WriterGoal::Title => format!(
            "Generate 3 optimized eBay titles (max 80 chars). Include top keywords, no symbols except hyphens. Tone: {tone}. Content:\n{content}"
        ),
        WriterGoal::Faq => format!(
            "Generate 3-5 FAQs with brief answers (one sentence each). Tone: {tone}. Content:\n{content}"
        ),
        WriterGoal::Meta => format!(
            "Generate meta title (≤60 chars) and description (≤155 chars) for SEO. Tone: {tone}. Content:\n{content}"
        ),
    }
}

/// Writer input: explicit source text, else the selection, else the start of
/// the page text
pub fn writer_source(explicit: &str, selection: &str, page_text: &str) -> String {
    let explicit = explicit.trim();
    if !explicit.is_empty() {
        return explicit.to_string();
    }
    if !selection.is_empty() {
        return selection.to_string();
    }
    page_text.chars().take(PAGE_TEXT_LIMIT).collect()
}

/// Output slot shared by overlapping requests. Whatever finishes last is
/// what the slot shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AiOutput {
    text: String,
    pending: usize,
}

impl AiOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn pending(&self) -> usize {
        self.pending
    }

    /// Mark a request as started
    pub fn begin(&mut self) {
        self.pending += 1;
        self.text = THINKING.to_string();
    }

    /// Record a finished request; errors are shown as their message
    pub fn finish(&mut self, result: Result<String, EditorError>) {
        self.pending = self.pending.saturating_sub(1);
        self.text = match result {
            Ok(text) => text,
            Err(e) => format!("Error: {}", e),
        };
    }
}

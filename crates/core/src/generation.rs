use crate::error::GenerationError;
use crate::resolver::truncate_chars;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Shape of a generation backend's output, fixed when the capability is
/// selected rather than guessed per call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseMode {
    /// The backend returns the answer alone (sequence-to-sequence models).
    Direct,
    /// The backend returns prompt + answer concatenated (continuation
    /// models); the prompt prefix must be stripped.
    EchoesPrompt,
}

/// Generation capability.
#[async_trait]
pub trait Generator: Send + Sync {
    fn response_mode(&self) -> ResponseMode;

    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExplanationStyle {
    Normal,
    Simple,
}

const SIMPLE_TRIGGERS: [&str; 9] = [
    "explain like i'm 5",
    "eli5",
    "explain like im 5",
    "simple explanation",
    "in simple terms",
    "simply explain",
    "easy explanation",
    "basic explanation",
    "for beginners",
];

/// Detects whether the question asks for a simplified answer.
pub fn detect_explanation_style(question: &str) -> ExplanationStyle {
    let question_lower = question.to_lowercase();
    if SIMPLE_TRIGGERS
        .iter()
        .any(|trigger| question_lower.contains(trigger))
    {
        ExplanationStyle::Simple
    } else {
        ExplanationStyle::Normal
    }
}

/// Builds the prompt for the requested style, embedding context and question
/// verbatim.
pub fn build_prompt(context: &str, question: &str, style: ExplanationStyle) -> String {
    match style {
        ExplanationStyle::Simple => format!(
            "Based on the following context from a document, provide a simple explanation \
             that a 5-year-old could understand. Use simple words, short sentences, and \
             avoid technical jargon.\n\nContext: {context}\n\nQuestion: {question}\n\n\
             Provide a simple, easy-to-understand explanation:"
        ),
        ExplanationStyle::Normal => format!(
            "Based on the following context from a document, provide a clear and accurate \
             answer to the question.\n\nContext: {context}\n\nQuestion: {question}\n\nAnswer:"
        ),
    }
}

/// Produces the final answer. Generation failures and malformed outputs are
/// absorbed here: the caller always receives either the model's answer or a
/// labeled excerpt of the retrieved context, never an error.
pub async fn generate_answer(
    generator: &dyn Generator,
    context: &str,
    question: &str,
    fallback_excerpt_len: usize,
) -> String {
    let style = detect_explanation_style(question);
    let prompt = build_prompt(context, question, style);

    let answer = match generator.generate(&prompt).await {
        Ok(output) => match generator.response_mode() {
            ResponseMode::Direct => output.trim().to_string(),
            ResponseMode::EchoesPrompt => output
                .strip_prefix(&prompt)
                .map(|rest| rest.trim().to_string())
                .unwrap_or_default(),
        },
        Err(_) => String::new(),
    };

    if answer.is_empty() {
        degraded_answer(context, fallback_excerpt_len)
    } else {
        answer
    }
}

fn degraded_answer(context: &str, excerpt_len: usize) -> String {
    format!(
        "Based on the document: {}...",
        truncate_chars(context, excerpt_len)
    )
}

#[derive(Debug, Clone, Serialize)]
struct GenerateRequest<'a> {
    prompt: &'a str,
    max_new_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Clone, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    generated_text: Option<String>,
    #[serde(default)]
    text: Option<String>,
}

/// Sampling parameters forwarded to the generation backend.
#[derive(Debug, Clone, Copy)]
pub struct GenerationParams {
    pub max_new_tokens: u32,
    pub temperature: f32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            max_new_tokens: 200,
            temperature: 0.3,
        }
    }
}

/// Remote generative model behind a JSON endpoint.
pub struct HttpGenerator {
    endpoint: String,
    api_key: Option<String>,
    mode: ResponseMode,
    params: GenerationParams,
    client: Client,
}

impl HttpGenerator {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: Option<String>,
        mode: ResponseMode,
        params: GenerationParams,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key,
            mode,
            params,
            client: Client::new(),
        }
    }
}

#[async_trait]
impl Generator for HttpGenerator {
    fn response_mode(&self) -> ResponseMode {
        self.mode
    }

    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let mut request = self.client.post(&self.endpoint).json(&GenerateRequest {
            prompt,
            max_new_tokens: self.params.max_new_tokens,
            temperature: self.params.temperature,
        });

        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(GenerationError::Request(format!(
                "generation endpoint {} returned {}",
                self.endpoint,
                response.status()
            )));
        }

        let payload: GenerateResponse = response.json().await?;
        payload
            .generated_text
            .or(payload.text)
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| {
                GenerationError::MalformedResponse("response carried no text".to_string())
            })
    }
}

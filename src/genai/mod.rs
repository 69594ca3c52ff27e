//! Remote generative-model access.
//!
//! The [`TravelModel`] trait is the seam between the planner and the hosted
//! model. It bundles three unrelated, stateless capabilities:
//!
//! - conversational chat grounded with web and maps search
//! - hero image synthesis from a short prompt
//! - text-to-speech for step narration
//!
//! Only chat reports failures. Image and speech are best effort: every error
//! is logged and collapsed into `None`, so callers treat absence as a no-op.
//!
//! [`GeminiClient`] implements the trait over the Gemini REST API.

pub mod audio;
pub mod client;
pub mod persona;
pub mod wire;

pub use client::GeminiClient;

use crate::travel::{Coordinates, GroundingLink, Message, TransportMode, TravelStyle};

/// Connection and model settings for the generative API.
#[derive(Clone)]
pub struct GenAiSettings {
    /// API root, e.g. `https://generativelanguage.googleapis.com`.
    pub base_url: String,
    pub api_key: Option<String>,
    pub chat_model: String,
    pub image_model: String,
    pub speech_model: String,
    /// Prebuilt voice used for narration.
    pub voice: String,
}

impl std::fmt::Debug for GenAiSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenAiSettings")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("chat_model", &self.chat_model)
            .field("image_model", &self.image_model)
            .field("speech_model", &self.speech_model)
            .field("voice", &self.voice)
            .finish()
    }
}

/// Everything one chat call needs. History is resent in full every time.
#[derive(Debug, Clone)]
pub struct ChatTurn {
    pub prompt: String,
    /// Prior conversation, oldest first, excluding `prompt`.
    pub history: Vec<Message>,
    pub style: TravelStyle,
    pub transport: TransportMode,
    /// Retrieval bias for maps grounding.
    pub location: Option<Coordinates>,
}

/// A chat reply and the sources the model grounded it on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatReply {
    pub text: String,
    pub links: Vec<GroundingLink>,
}

/// Synthesized narration audio.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechClip {
    /// Mime type reported by the API, e.g. `audio/L16;codec=pcm;rate=24000`.
    pub mime_type: String,
    pub data: Vec<u8>,
}

/// Errors from the chat call.
#[derive(Debug, thiserror::Error)]
pub enum GenAiError {
    /// The HTTP request could not be sent or its body not read.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("API error ({status}): {body}")]
    Status { status: u16, body: String },

    /// The response body was not the expected JSON.
    #[error("response decode failed: {0}")]
    Decode(#[from] serde_json::Error),

    /// The response carried no usable candidate.
    #[error("model returned no content")]
    EmptyReply,

    /// Inline media could not be base64-decoded.
    #[error("invalid inline data: {0}")]
    InvalidInlineData(#[from] base64::DecodeError),
}

/// Hosted model operations used by the planner.
#[async_trait::async_trait]
pub trait TravelModel: Send + Sync {
    /// Send one user utterance with the full prior history.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the reply is unusable.
    /// Failures are never retried.
    async fn send_message(&self, turn: ChatTurn) -> Result<ChatReply, GenAiError>;

    /// Generate a landscape image, returned as a `data:` URL.
    async fn generate_hero_image(&self, prompt: &str) -> Option<String>;

    /// Synthesize speech for `text`.
    async fn generate_speech(&self, text: &str) -> Option<SpeechClip>;
}

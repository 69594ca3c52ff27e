//! Gemini REST client.
//!
//! Implements [`TravelModel`] with one `generateContent` call per operation.
//! No state is kept between calls.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use super::persona::system_instruction;
use super::wire::{
    Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig, ImageConfig,
    LatLng, PrebuiltVoiceConfig, RetrievalConfig, SpeechConfig, Tool, ToolConfig, VoiceConfig,
};
use super::{ChatReply, ChatTurn, GenAiError, GenAiSettings, SpeechClip, TravelModel};

/// Aspect ratio requested for hero images.
const HERO_ASPECT_RATIO: &str = "16:9";

/// Driver for the Gemini `generateContent` endpoint.
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    settings: GenAiSettings,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("settings", &self.settings)
            .finish()
    }
}

impl GeminiClient {
    /// Create a client with the given settings.
    #[must_use]
    pub fn new(settings: GenAiSettings) -> Self {
        Self {
            http: reqwest::Client::new(),
            settings,
        }
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/v1beta/models/{model}:generateContent",
            self.settings.base_url.trim_end_matches('/')
        )
    }

    /// Build the grounded chat request for one turn.
    #[must_use]
    pub fn chat_request(turn: &ChatTurn) -> GenerateContentRequest {
        let mut contents: Vec<Content> = turn
            .history
            .iter()
            .map(|m| Content::text(Some(m.role.as_str()), m.text.clone()))
            .collect();
        contents.push(Content::text(Some("user"), turn.prompt.clone()));

        GenerateContentRequest {
            contents,
            system_instruction: Some(Content::text(
                None,
                system_instruction(turn.style, turn.transport),
            )),
            tools: vec![Tool::google_search(), Tool::google_maps()],
            tool_config: turn.location.map(|c| ToolConfig {
                retrieval_config: RetrievalConfig {
                    lat_lng: LatLng {
                        latitude: c.lat,
                        longitude: c.lng,
                    },
                },
            }),
            generation_config: None,
        }
    }

    /// Build the image request for a short place prompt.
    #[must_use]
    pub fn image_request(prompt: &str) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content::text(
                None,
                format!(
                    "Cinematic, glossy, high resolution travel photography of: {prompt}. beautiful lighting, 8k, photorealistic"
                ),
            )],
            generation_config: Some(GenerationConfig {
                image_config: Some(ImageConfig {
                    aspect_ratio: HERO_ASPECT_RATIO.to_string(),
                }),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    /// Build the text-to-speech request.
    #[must_use]
    pub fn speech_request(text: &str, voice: &str) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content::text(None, text)],
            generation_config: Some(GenerationConfig {
                response_modalities: Some(vec!["AUDIO".to_string()]),
                speech_config: Some(SpeechConfig {
                    voice_config: VoiceConfig {
                        prebuilt_voice_config: PrebuiltVoiceConfig {
                            voice_name: voice.to_string(),
                        },
                    },
                }),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    async fn generate_content(
        &self,
        model: &str,
        body: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, GenAiError> {
        let url = self.endpoint(model);

        let mut rb = self.http.post(&url).json(body);
        if let Some(k) = &self.settings.api_key {
            rb = rb.header("x-goog-api-key", k);
        }

        let resp = rb.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(GenAiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = resp.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn try_generate_image(&self, prompt: &str) -> Result<Option<String>, GenAiError> {
        let resp = self
            .generate_content(&self.settings.image_model, &Self::image_request(prompt))
            .await?;
        Ok(resp.first_inline_data().map(|inline| {
            let mime = if inline.mime_type.is_empty() {
                "image/png"
            } else {
                inline.mime_type.as_str()
            };
            format!("data:{mime};base64,{}", inline.data)
        }))
    }

    async fn try_generate_speech(&self, text: &str) -> Result<Option<SpeechClip>, GenAiError> {
        let resp = self
            .generate_content(
                &self.settings.speech_model,
                &Self::speech_request(text, &self.settings.voice),
            )
            .await?;
        let Some(inline) = resp.first_inline_data() else {
            return Ok(None);
        };
        Ok(Some(SpeechClip {
            mime_type: inline.mime_type.clone(),
            data: STANDARD.decode(&inline.data)?,
        }))
    }
}

#[async_trait::async_trait]
impl TravelModel for GeminiClient {
    async fn send_message(&self, turn: ChatTurn) -> Result<ChatReply, GenAiError> {
        tracing::debug!(
            model = %self.settings.chat_model,
            history_len = turn.history.len(),
            style = turn.style.label(),
            transport = turn.transport.label(),
            has_location = turn.location.is_some(),
            "Sending chat turn"
        );

        let resp = self
            .generate_content(&self.settings.chat_model, &Self::chat_request(&turn))
            .await?;
        let text = resp.text().ok_or(GenAiError::EmptyReply)?;
        let links = resp.grounding_links();

        tracing::debug!(
            reply_length = text.len(),
            link_count = links.len(),
            "Chat reply received"
        );

        Ok(ChatReply { text, links })
    }

    async fn generate_hero_image(&self, prompt: &str) -> Option<String> {
        match self.try_generate_image(prompt).await {
            Ok(image) => {
                if image.is_none() {
                    tracing::warn!(prompt = %prompt, "Image model returned no inline data");
                }
                image
            }
            Err(e) => {
                tracing::warn!(prompt = %prompt, error = %e, "Image generation failed");
                None
            }
        }
    }

    async fn generate_speech(&self, text: &str) -> Option<SpeechClip> {
        match self.try_generate_speech(text).await {
            Ok(clip) => clip,
            Err(e) => {
                tracing::warn!(text_length = text.len(), error = %e, "Speech synthesis failed");
                None
            }
        }
    }
}

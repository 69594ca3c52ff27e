//! Gemini `generateContent` wire types.
//!
//! Only the fields this application reads or writes are modelled; unknown
//! response fields are ignored.

use serde::{Deserialize, Serialize};

use crate::travel::GroundingLink;

/// Citation label when a web chunk has no title.
pub const DEFAULT_WEB_TITLE: &str = "Fuente Web";

/// Citation label when a maps chunk has no title.
pub const DEFAULT_MAPS_TITLE: &str = "Ubicación Maps";

// ─────────────────────────────────────────────────────────────────────────────
// Request
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<Tool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_config: Option<ToolConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    /// A single-part text content with an optional role.
    #[must_use]
    pub fn text(role: Option<&str>, text: impl Into<String>) -> Self {
        Self {
            role: role.map(ToString::to_string),
            parts: vec![Part {
                text: Some(text.into()),
                inline_data: None,
            }],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<InlineData>,
}

/// Base64 media embedded in a part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    #[serde(default)]
    pub mime_type: String,
    pub data: String,
}

/// Marker for tools configured with an empty object.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Enabled {}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_search: Option<Enabled>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_maps: Option<Enabled>,
}

impl Tool {
    #[must_use]
    pub fn google_search() -> Self {
        Self {
            google_search: Some(Enabled {}),
            google_maps: None,
        }
    }

    #[must_use]
    pub fn google_maps() -> Self {
        Self {
            google_search: None,
            google_maps: Some(Enabled {}),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolConfig {
    pub retrieval_config: RetrievalConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrievalConfig {
    pub lat_lng: LatLng,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LatLng {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_modalities: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_config: Option<ImageConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speech_config: Option<SpeechConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageConfig {
    pub aspect_ratio: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeechConfig {
    pub voice_config: VoiceConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceConfig {
    pub prebuilt_voice_config: PrebuiltVoiceConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrebuiltVoiceConfig {
    pub voice_name: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Response
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default)]
    pub grounding_metadata: Option<GroundingMetadata>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroundingMetadata {
    #[serde(default)]
    pub grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GroundingChunk {
    #[serde(default)]
    pub web: Option<ChunkSource>,
    #[serde(default)]
    pub maps: Option<ChunkSource>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChunkSource {
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

impl GenerateContentResponse {
    fn first_parts(&self) -> &[Part] {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map_or(&[], |c| c.parts.as_slice())
    }

    /// Concatenated text parts of the first candidate.
    #[must_use]
    pub fn text(&self) -> Option<String> {
        let texts: Vec<&str> = self
            .first_parts()
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        if texts.is_empty() {
            None
        } else {
            Some(texts.concat())
        }
    }

    /// First inline media part of the first candidate.
    #[must_use]
    pub fn first_inline_data(&self) -> Option<&InlineData> {
        self.first_parts().iter().find_map(|p| p.inline_data.as_ref())
    }

    /// Citations from the first candidate's grounding metadata.
    ///
    /// Web chunks come before maps chunks of the same entry; chunks without
    /// a uri are skipped and missing titles get a generic label.
    #[must_use]
    pub fn grounding_links(&self) -> Vec<GroundingLink> {
        let Some(meta) = self
            .candidates
            .first()
            .and_then(|c| c.grounding_metadata.as_ref())
        else {
            return Vec::new();
        };

        let mut links = Vec::new();
        for chunk in &meta.grounding_chunks {
            if let Some(link) = chunk.web.as_ref().and_then(|s| s.to_link(DEFAULT_WEB_TITLE)) {
                links.push(link);
            }
            if let Some(link) = chunk.maps.as_ref().and_then(|s| s.to_link(DEFAULT_MAPS_TITLE)) {
                links.push(link);
            }
        }
        links
    }
}

impl ChunkSource {
    fn to_link(&self, default_title: &str) -> Option<GroundingLink> {
        let uri = self.uri.as_deref().filter(|u| !u.is_empty())?;
        let title = self
            .title
            .as_deref()
            .filter(|t| !t.is_empty())
            .unwrap_or(default_title);
        Some(GroundingLink {
            uri: uri.to_string(),
            title: title.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tools_serialize_as_empty_objects() {
        let req = GenerateContentRequest {
            contents: vec![Content::text(Some("user"), "hola")],
            tools: vec![Tool::google_search(), Tool::google_maps()],
            ..Default::default()
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["tools"], json!([{ "googleSearch": {} }, { "googleMaps": {} }]));
        assert!(value.get("toolConfig").is_none());
        assert_eq!(value["contents"][0], json!({ "role": "user", "parts": [{ "text": "hola" }] }));
    }

    #[test]
    fn test_grounding_links_with_default_titles() {
        let resp: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": "Hola " }, { "text": "mundo" }] },
                "groundingMetadata": {
                    "groundingChunks": [
                        { "web": { "uri": "https://a.example", "title": "A" } },
                        { "web": { "uri": "https://b.example" } },
                        { "maps": { "uri": "https://maps.example/x" } },
                        { "maps": { "title": "sin uri" } }
                    ]
                }
            }]
        }))
        .unwrap();

        assert_eq!(resp.text().as_deref(), Some("Hola mundo"));
        let links = resp.grounding_links();
        assert_eq!(links.len(), 3);
        assert_eq!(links[0].title, "A");
        assert_eq!(links[1].title, DEFAULT_WEB_TITLE);
        assert_eq!(links[2].title, DEFAULT_MAPS_TITLE);
    }

    #[test]
    fn test_inline_data_lookup_skips_text_parts() {
        let resp: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": { "parts": [
                    { "text": "aquí va" },
                    { "inlineData": { "mimeType": "image/png", "data": "iVBORw0K" } }
                ] }
            }]
        }))
        .unwrap();
        let inline = resp.first_inline_data().unwrap();
        assert_eq!(inline.mime_type, "image/png");
        assert_eq!(inline.data, "iVBORw0K");
    }

    #[test]
    fn test_empty_response_has_no_text_or_links() {
        let resp: GenerateContentResponse = serde_json::from_value(json!({})).unwrap();
        assert!(resp.text().is_none());
        assert!(resp.grounding_links().is_empty());
        assert!(resp.first_inline_data().is_none());
    }
}

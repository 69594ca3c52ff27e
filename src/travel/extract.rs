//! Itinerary extraction from model replies.
//!
//! The persona instruction asks the model to close any itinerary answer with
//! a ```` ```json ```` fenced block. These helpers find that block, parse it,
//! and strip it from the text shown in the chat.

use std::sync::LazyLock;

use regex::Regex;

use super::Itinerary;

/// Fence with its body captured; the body must sit on its own lines.
static FENCED_JSON: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```json\n(.*?)\n```").expect("fenced json pattern"));

/// Looser fence used only for hiding the block from display.
static FENCED_JSON_LOOSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```json.*?```").expect("loose fenced json pattern"));

/// Parse the first fenced JSON block of `text` as an [`Itinerary`].
///
/// Returns `None` when there is no block or the block is not a valid
/// itinerary; the caller treats both the same way.
#[must_use]
pub fn extract_itinerary(text: &str) -> Option<Itinerary> {
    let body = FENCED_JSON.captures(text)?.get(1)?.as_str();
    match serde_json::from_str::<Itinerary>(body) {
        Ok(itinerary) => Some(itinerary),
        Err(e) => {
            tracing::debug!(error = %e, body_length = body.len(), "Fenced block is not an itinerary");
            None
        }
    }
}

/// Remove the first fenced JSON block from `text`.
#[must_use]
pub fn strip_fenced_block(text: &str) -> String {
    FENCED_JSON_LOOSE.replacen(text, 1, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PARIS_REPLY: &str = "¡Claro! Aquí tienes tu plan.\n\n```json\n{\n  \"title\": \"Paris Getaway\",\n  \"summary\": \"Tres días de museos y cafés\",\n  \"steps\": [\n    { \"time\": \"09:00 AM\", \"title\": \"Louvre\", \"description\": \"Arte clásico\", \"location\": \"Musée du Louvre\" },\n    { \"time\": \"02:00 PM\", \"title\": \"Torre Eiffel\", \"description\": \"Vistas\", \"location\": \"Tour Eiffel\" }\n  ]\n}\n```";

    #[test]
    fn test_extracts_trailing_block() {
        let itinerary = extract_itinerary(PARIS_REPLY).unwrap();
        assert_eq!(itinerary.title, "Paris Getaway");
        assert_eq!(itinerary.steps.len(), 2);
        assert_eq!(itinerary.first_location(), Some("Musée du Louvre"));
    }

    #[test]
    fn test_no_block_yields_none() {
        assert!(extract_itinerary("Solo texto, sin plan.").is_none());
    }

    #[test]
    fn test_malformed_block_yields_none() {
        let text = "Plan:\n```json\n{ \"title\": \"Roto\", \n```";
        assert!(extract_itinerary(text).is_none());
    }

    #[test]
    fn test_block_without_newlines_is_not_extracted() {
        let text = "```json{\"title\":\"x\",\"summary\":\"y\",\"steps\":[]}```";
        assert!(extract_itinerary(text).is_none());
    }

    #[test]
    fn test_only_first_block_is_used() {
        let text = "```json\n{\"title\":\"A\",\"summary\":\"\",\"steps\":[]}\n```\n```json\n{\"title\":\"B\",\"summary\":\"\",\"steps\":[]}\n```";
        assert_eq!(extract_itinerary(text).unwrap().title, "A");
    }

    #[test]
    fn test_strip_removes_block_and_keeps_prose() {
        let shown = strip_fenced_block(PARIS_REPLY);
        assert!(!shown.contains("```"));
        assert!(!shown.contains("Paris Getaway"));
        assert!(shown.starts_with("¡Claro! Aquí tienes tu plan."));
    }

    #[test]
    fn test_strip_without_block_is_identity() {
        let text = "Nada que quitar aquí.";
        assert_eq!(strip_fenced_block(text), text);
    }
}

//! Travel domain types.
//!
//! Everything the planner shows or exchanges with the model lives here:
//! conversation messages, the structured itinerary parsed from replies, and
//! the preset travel style and transport labels.
//!
//! # Submodules
//!
//! - [`extract`]: pulls the fenced JSON itinerary out of a model reply
//! - [`export`]: flat text export of an itinerary
//! - [`share`]: local share previews (note card, landing page, thread)
//! - [`place`]: mocked place-details card for the map panel

pub mod export;
pub mod extract;
pub mod place;
pub mod share;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Greeting the model "says" when a session opens.
pub const GREETING: &str =
    "¡Hola viajero! Soy tu Profesor de Turismo IA. ¿Qué tipo de viaje te gustaría planear hoy?";

/// Message appended when the chat call fails.
pub const APOLOGY: &str =
    "Lo siento, tuve un problema conectando con el satélite. Intenta de nuevo.";

/// Map focus before any destination is known.
pub const DEFAULT_MAP_QUERY: &str = "World";

/// Author of a conversation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The traveller.
    User,
    /// The remote model.
    Model,
}

impl Role {
    /// Wire name used by the generative API.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Model => "model",
        }
    }
}

/// A source reference attached to a model reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundingLink {
    pub uri: String,
    pub title: String,
}

/// A single entry in the conversation log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub grounding_links: Vec<GroundingLink>,
}

impl Message {
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
            timestamp: Utc::now(),
            grounding_links: Vec::new(),
        }
    }

    #[must_use]
    pub fn model(text: impl Into<String>, grounding_links: Vec<GroundingLink>) -> Self {
        Self {
            role: Role::Model,
            text: text.into(),
            timestamp: Utc::now(),
            grounding_links,
        }
    }

    /// Text with any fenced itinerary block removed, for display.
    #[must_use]
    pub fn display_text(&self) -> String {
        extract::strip_fenced_block(&self.text)
    }
}

/// Geographic coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// One timed stop of an itinerary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItineraryStep {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Free-text label such as `09:00 AM`.
    #[serde(default)]
    pub time: String,
    /// Free-text place name, used as the map query.
    #[serde(default)]
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
}

/// A structured travel plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Itinerary {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub summary: String,
    pub steps: Vec<ItineraryStep>,
}

impl Itinerary {
    /// Location of the first step, if there is one.
    #[must_use]
    pub fn first_location(&self) -> Option<&str> {
        self.steps.first().map(|s| s.location.as_str())
    }
}

/// Preset travel styles offered to the user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TravelStyle {
    #[default]
    #[serde(rename = "Relax & Chill")]
    Relax,
    #[serde(rename = "Aventura Extrema")]
    Adventure,
    #[serde(rename = "Historia y Cultura")]
    Cultural,
    #[serde(rename = "Vida Nocturna")]
    Party,
    #[serde(rename = "Ruta Foodie")]
    Gastronomic,
    #[serde(rename = "Lo Bizarro & Oculto")]
    Bizarre,
    #[serde(rename = "Fe & Espiritualidad")]
    Religious,
    #[serde(rename = "New Age & Energía")]
    NewAge,
    #[serde(rename = "Biomas & Parques")]
    Nature,
    #[serde(rename = "Encuentro Nativo")]
    Native,
}

impl TravelStyle {
    pub const ALL: [Self; 10] = [
        Self::Relax,
        Self::Adventure,
        Self::Cultural,
        Self::Party,
        Self::Gastronomic,
        Self::Bizarre,
        Self::Religious,
        Self::NewAge,
        Self::Nature,
        Self::Native,
    ];

    /// Full display label, also used in the persona prompt.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Relax => "Relax & Chill",
            Self::Adventure => "Aventura Extrema",
            Self::Cultural => "Historia y Cultura",
            Self::Party => "Vida Nocturna",
            Self::Gastronomic => "Ruta Foodie",
            Self::Bizarre => "Lo Bizarro & Oculto",
            Self::Religious => "Fe & Espiritualidad",
            Self::NewAge => "New Age & Energía",
            Self::Nature => "Biomas & Parques",
            Self::Native => "Encuentro Nativo",
        }
    }

    /// First word of the label, shown on the compact style switcher.
    #[must_use]
    pub fn short_label(self) -> &'static str {
        self.label().split(' ').next().unwrap_or_default()
    }
}

/// Preferred means of transport.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransportMode {
    #[default]
    #[serde(rename = "Vuelo")]
    Flight,
    #[serde(rename = "Autobús")]
    Bus,
    #[serde(rename = "Coche")]
    Car,
    #[serde(rename = "Barco")]
    Boat,
}

impl TransportMode {
    pub const ALL: [Self; 4] = [Self::Flight, Self::Bus, Self::Car, Self::Boat];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Flight => "Vuelo",
            Self::Bus => "Autobús",
            Self::Car => "Coche",
            Self::Boat => "Barco",
        }
    }
}

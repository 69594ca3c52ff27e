//! Local share previews.
//!
//! Nothing here talks to a network: each preview is a pure function of the
//! itinerary, rendered as a modal by the UI. "Publish" stays visual.

use serde::{Deserialize, Serialize};

use super::{Itinerary, ItineraryStep};

/// Steps shown on the landing-page preview.
const LANDING_PAGE_STEPS: usize = 3;

/// Characters of a step description kept in a thread post.
const THREAD_EXCERPT_CHARS: usize = 150;

/// Which preview modal is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShareKind {
    /// Quick note card with title and summary.
    Card,
    /// Mock landing page.
    Site,
    /// Mock social thread.
    Thread,
}

impl ShareKind {
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "card" => Some(Self::Card),
            "site" => Some(Self::Site),
            "thread" => Some(Self::Thread),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Card => "card",
            Self::Site => "site",
            Self::Thread => "thread",
        }
    }
}

/// Toast messages for the local share actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareNotice {
    Saved,
    Exported,
    Scheduled,
}

impl ShareNotice {
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "saved" => Some(Self::Saved),
            "exported" => Some(Self::Exported),
            "scheduled" => Some(Self::Scheduled),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Saved => "saved",
            Self::Exported => "exported",
            Self::Scheduled => "scheduled",
        }
    }

    #[must_use]
    pub fn text(self) -> &'static str {
        match self {
            Self::Saved => "Análisis guardado en la nube ☁️",
            Self::Exported => "Contenido exportado a TXT 📄",
            Self::Scheduled => "Evento programado en Calendario 📅",
        }
    }
}

/// One post of the thread preview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThreadPost {
    /// Position badge; `None` for the opening hook.
    pub number: Option<usize>,
    pub body: String,
}

/// Build the social-thread preview: a hook post, then one post per step.
#[must_use]
pub fn thread_posts(itinerary: &Itinerary) -> Vec<ThreadPost> {
    let hook = ThreadPost {
        number: None,
        body: format!(
            "🧵 Voy a compartir mi plan para {}.\n\n{} 👇",
            itinerary.title, itinerary.summary
        ),
    };

    std::iter::once(hook)
        .chain(itinerary.steps.iter().enumerate().map(|(i, step)| ThreadPost {
            number: Some(i + 1),
            body: step_post(step),
        }))
        .collect()
}

fn step_post(step: &ItineraryStep) -> String {
    let excerpt: String = step.description.chars().take(THREAD_EXCERPT_CHARS).collect();
    format!(
        "{} en {}. 🕒 {}.\n{excerpt}...",
        step.title, step.location, step.time
    )
}

/// Steps featured on the landing-page preview.
#[must_use]
pub fn landing_page_steps(itinerary: &Itinerary) -> &[ItineraryStep] {
    let end = itinerary.steps.len().min(LANDING_PAGE_STEPS);
    &itinerary.steps[..end]
}

//! Glossy Travel
//!
//! A travel-planning chat service. Users talk to a hosted generative model
//! acting as a tourism guide; replies that carry an itinerary are rendered
//! as a timeline with a map, a generated hero image, narrated steps and
//! local share previews.
//!
//! # Architecture
//!
//! - **Server**: Axum HTML-first pages plus a JSON API over the same sessions
//! - **Planner**: Turn orchestration and auxiliary model requests
//! - **Model client**: Gemini `generateContent` behind the [`genai::TravelModel`] trait
//! - **UI**: `format!`-rendered HTML, forms and a small inline script
//!
//! # Modules
//!
//! - [`travel`]: Domain types, itinerary extraction, export and share previews
//! - [`genai`]: Remote-model client, wire types and audio packaging
//! - [`session`]: Per-conversation state and the session store
//! - [`planner`]: Turn state machine, hero images and narration
//! - [`server`]: Router and handlers
//! - [`ui`]: Page rendering

// Allow pedantic clippy warnings that don't add value for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::missing_fields_in_debug)]
#![allow(clippy::implicit_hasher)]
#![allow(clippy::assigning_clones)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::cargo_common_metadata)]
#![allow(clippy::multiple_crate_versions)]
#![allow(clippy::default_trait_access)]
#![allow(clippy::unused_async)]

pub mod config;
pub mod genai;
pub mod planner;
pub mod server;
pub mod session;
pub mod telemetry;
pub mod travel;
pub mod ui;

use crate::config::AppConfig;

use genai::TravelModel;
use planner::Planner;
use session::SessionStore;
use std::sync::Arc;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Turn orchestration against the hosted model.
    pub planner: Planner,
    /// Session store for trip conversations.
    pub sessions: SessionStore,
    /// Global Configuration
    pub config: Arc<AppConfig>,
}

impl AppState {
    #[must_use]
    pub fn new(config: Arc<AppConfig>, model: Arc<dyn TravelModel>) -> Self {
        Self {
            planner: Planner::new(model),
            sessions: SessionStore::new(),
            config,
        }
    }
}

//! Trip sessions and session storage.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::genai::audio::PlayableAudio;
use crate::travel::{
    Coordinates, DEFAULT_MAP_QUERY, GREETING, Itinerary, Message, TransportMode, TravelStyle,
};

/// Default idle timeout before a session is swept (30 minutes).
pub const DEFAULT_SESSION_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// A single planning session.
///
/// Cheap to clone; clones share state.
#[derive(Debug)]
pub struct TripSession {
    inner: Arc<SessionInner>,
}

#[derive(Debug)]
struct SessionInner {
    id: String,
    state: RwLock<TripState>,
}

#[derive(Debug)]
struct TripState {
    messages: Vec<Message>,
    itinerary: Option<Itinerary>,
    style: TravelStyle,
    transport: TransportMode,
    hero_image: Option<String>,
    hero_requests: usize,
    map_query: String,
    coordinates: Option<Coordinates>,
    muted: bool,
    loading: bool,
    narration: Option<usize>,
    narration_clip: Option<(usize, PlayableAudio)>,
    last_activity: DateTime<Utc>,
}

/// Read-only copy of a session, used for rendering and the JSON API.
#[derive(Debug, Clone, Serialize)]
pub struct TripSnapshot {
    pub id: String,
    pub messages: Vec<Message>,
    pub itinerary: Option<Itinerary>,
    pub style: TravelStyle,
    pub transport: TransportMode,
    pub hero_image: Option<String>,
    /// A background hero-image request is still running.
    pub hero_pending: bool,
    pub map_query: String,
    pub coordinates: Option<Coordinates>,
    pub muted: bool,
    pub loading: bool,
    pub narration: Option<usize>,
}

impl Clone for TripSession {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl TripSession {
    /// Create a session opened by the model greeting.
    fn new(id: String) -> Self {
        let now = Utc::now();
        Self {
            inner: Arc::new(SessionInner {
                id,
                state: RwLock::new(TripState {
                    messages: vec![Message::model(GREETING, Vec::new())],
                    itinerary: None,
                    style: TravelStyle::default(),
                    transport: TransportMode::default(),
                    hero_image: None,
                    hero_requests: 0,
                    map_query: DEFAULT_MAP_QUERY.to_string(),
                    coordinates: None,
                    muted: false,
                    loading: false,
                    narration: None,
                    narration_clip: None,
                    last_activity: now,
                }),
            }),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, TripState> {
        self.inner.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, TripState> {
        let mut guard = self.inner.state.write().unwrap_or_else(PoisonError::into_inner);
        guard.last_activity = Utc::now();
        guard
    }

    /// Get the session ID.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.inner.id
    }

    /// Copy the current state.
    #[must_use]
    pub fn snapshot(&self) -> TripSnapshot {
        let s = self.read();
        TripSnapshot {
            id: self.inner.id.clone(),
            messages: s.messages.clone(),
            itinerary: s.itinerary.clone(),
            style: s.style,
            transport: s.transport,
            hero_image: s.hero_image.clone(),
            hero_pending: s.hero_requests > 0,
            map_query: s.map_query.clone(),
            coordinates: s.coordinates,
            muted: s.muted,
            loading: s.loading,
            narration: s.narration,
        }
    }

    // ── Conversation ────────────────────────────────────────────────────────

    /// Mark a turn as in flight and log the user's message.
    ///
    /// Returns the history preceding the new message, or `None`, changing
    /// nothing, if a turn is already outstanding.
    pub fn begin_turn(&self, user_message: Message) -> Option<Vec<Message>> {
        let mut s = self.write();
        if s.loading {
            return None;
        }
        let history = s.messages.clone();
        s.loading = true;
        s.messages.push(user_message);
        Some(history)
    }

    /// Close the outstanding turn with its terminal model message.
    pub fn finish_turn(&self, reply: Message) {
        let mut s = self.write();
        s.messages.push(reply);
        s.loading = false;
    }

    /// All messages, oldest first.
    #[must_use]
    pub fn messages(&self) -> Vec<Message> {
        self.read().messages.clone()
    }

    #[must_use]
    pub fn message_count(&self) -> usize {
        self.read().messages.len()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.read().loading
    }

    // ── Itinerary, map and hero image ───────────────────────────────────────

    #[must_use]
    pub fn itinerary(&self) -> Option<Itinerary> {
        self.read().itinerary.clone()
    }

    /// Replace the current itinerary wholesale.
    ///
    /// Any active narration refers to the old steps and is dropped.
    pub fn replace_itinerary(&self, itinerary: Itinerary) {
        let mut s = self.write();
        s.itinerary = Some(itinerary);
        s.narration = None;
        s.narration_clip = None;
    }

    #[must_use]
    pub fn map_query(&self) -> String {
        self.read().map_query.clone()
    }

    pub fn set_map_query(&self, query: impl Into<String>) {
        self.write().map_query = query.into();
    }

    #[must_use]
    pub fn hero_image(&self) -> Option<String> {
        self.read().hero_image.clone()
    }

    pub fn set_hero_image(&self, image: String) {
        self.write().hero_image = Some(image);
    }

    /// Count a background hero-image request as started.
    pub fn hero_request_started(&self) {
        self.write().hero_requests += 1;
    }

    /// Count a background hero-image request as settled.
    pub fn hero_request_settled(&self) {
        let mut s = self.write();
        s.hero_requests = s.hero_requests.saturating_sub(1);
    }

    // ── Preferences ─────────────────────────────────────────────────────────

    #[must_use]
    pub fn style(&self) -> TravelStyle {
        self.read().style
    }

    pub fn set_style(&self, style: TravelStyle) {
        self.write().style = style;
    }

    #[must_use]
    pub fn transport(&self) -> TransportMode {
        self.read().transport
    }

    pub fn set_transport(&self, transport: TransportMode) {
        self.write().transport = transport;
    }

    #[must_use]
    pub fn coordinates(&self) -> Option<Coordinates> {
        self.read().coordinates
    }

    pub fn set_coordinates(&self, coordinates: Coordinates) {
        self.write().coordinates = Some(coordinates);
    }

    #[must_use]
    pub fn is_muted(&self) -> bool {
        self.read().muted
    }

    /// Flip the ambient-audio mute flag and return the new value.
    pub fn toggle_mute(&self) -> bool {
        let mut s = self.write();
        s.muted = !s.muted;
        s.muted
    }

    // ── Narration slot ──────────────────────────────────────────────────────

    #[must_use]
    pub fn narration(&self) -> Option<usize> {
        self.read().narration
    }

    /// Point the single narration slot at `index`, or clear it.
    pub fn set_narration(&self, index: Option<usize>) {
        let mut s = self.write();
        s.narration = index;
        if s.narration_clip.as_ref().is_some_and(|(i, _)| Some(*i) != index) {
            s.narration_clip = None;
        }
    }

    /// Store the clip for `index` if that step still owns the slot.
    pub fn store_narration_clip(&self, index: usize, audio: PlayableAudio) -> bool {
        let mut s = self.write();
        if s.narration != Some(index) {
            return false;
        }
        s.narration_clip = Some((index, audio));
        true
    }

    /// Clip of the active narration, if synthesized.
    #[must_use]
    pub fn narration_clip(&self) -> Option<(usize, PlayableAudio)> {
        let s = self.read();
        s.narration_clip
            .as_ref()
            .filter(|(i, _)| s.narration == Some(*i))
            .cloned()
    }

    /// Clear the slot if `index` is still the active narration.
    pub fn clear_narration_if(&self, index: usize) -> bool {
        let mut s = self.write();
        if s.narration != Some(index) {
            return false;
        }
        s.narration = None;
        s.narration_clip = None;
        true
    }

    // ── Lifetime ────────────────────────────────────────────────────────────

    /// Check if the session has been idle longer than `timeout`.
    #[must_use]
    pub fn is_expired_with_timeout(&self, timeout: Duration) -> bool {
        let last = self.read().last_activity;
        (Utc::now() - last)
            .to_std()
            .is_ok_and(|idle| idle > timeout)
    }
}

/// Thread-safe store for sessions.
#[derive(Debug, Clone)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<String, TripSession>>>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    /// Create a new session store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Create a new session and return it.
    #[must_use]
    pub fn create(&self) -> TripSession {
        let id = Uuid::new_v4().to_string();
        let session = TripSession::new(id.clone());
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, session.clone());
        session
    }

    /// Get a session by ID.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<TripSession> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    /// Remove a session by ID.
    pub fn remove(&self, id: &str) -> Option<TripSession> {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id)
    }

    /// Get the number of active sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Check if there are no sessions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove sessions that have been inactive longer than the timeout.
    ///
    /// Returns the number of sessions removed.
    pub fn cleanup_expired_with_timeout(&self, timeout: Duration) -> usize {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let before = guard.len();
        guard.retain(|_, session| !session.is_expired_with_timeout(timeout));
        before - guard.len()
    }
}

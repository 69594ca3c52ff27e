//! Turn orchestration for a trip session.
//!
//! The planner drives one conversational turn end to end:
//! 1. Log the user's message and mark the session busy
//! 2. Send the prior history plus preferences to the model
//! 3. Log exactly one model message (the reply or an apology)
//! 4. Adopt any itinerary found in the reply and kick off a hero image
//!
//! It also owns the side requests that talk to the model outside a turn:
//! hero images for a typed location and step narration.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::genai::audio::{PlayableAudio, into_playable};
use crate::genai::{ChatTurn, TravelModel};
use crate::session::TripSession;
use crate::travel::extract::extract_itinerary;
use crate::travel::{APOLOGY, Itinerary, Message};

/// What a call to [`Planner::submit_turn`] did.
#[derive(Debug)]
pub enum TurnOutcome {
    /// Blank input; nothing changed.
    Ignored,
    /// Another turn is still outstanding; nothing changed.
    Busy,
    /// The turn ran to completion.
    Completed(TurnReport),
}

/// Details of a completed turn.
#[derive(Debug)]
pub struct TurnReport {
    /// The model message appended to the log.
    pub reply: Message,
    /// `false` when the model call failed and the apology was logged.
    pub succeeded: bool,
    /// Itinerary parsed from the reply, if any.
    pub itinerary: Option<Itinerary>,
    /// Background hero-image request started for the new itinerary.
    pub hero_task: Option<JoinHandle<()>>,
}

/// Result of toggling narration for a step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NarrationOutcome {
    /// The step was already narrating and has been stopped.
    Stopped,
    /// Audio is ready for the step.
    Playing(PlayableAudio),
    /// Another step became active while audio was being synthesized.
    Superseded,
    /// Speech synthesis produced nothing; the step is no longer active.
    Unavailable,
    /// No itinerary step has that index.
    NoSuchStep,
}

/// An outstanding turn. Dropping it unfinished closes the turn with the
/// apology, so a cancelled request never leaves the session loading.
struct OpenTurn<'a> {
    session: &'a TripSession,
    finished: bool,
}

impl<'a> OpenTurn<'a> {
    fn new(session: &'a TripSession) -> Self {
        Self {
            session,
            finished: false,
        }
    }

    fn finish(mut self, reply: Message) {
        self.session.finish_turn(reply);
        self.finished = true;
    }
}

impl Drop for OpenTurn<'_> {
    fn drop(&mut self) {
        if !self.finished {
            tracing::warn!(session_id = %self.session.id(), "Turn dropped before the model answered");
            self.session.finish_turn(Message::model(APOLOGY, Vec::new()));
        }
    }
}

/// Drives model calls against a [`TripSession`].
#[derive(Clone)]
pub struct Planner {
    model: Arc<dyn TravelModel>,
}

impl std::fmt::Debug for Planner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Planner")
            .field("model", &"TravelModel")
            .finish()
    }
}

impl Planner {
    #[must_use]
    pub fn new(model: Arc<dyn TravelModel>) -> Self {
        Self { model }
    }

    /// Run one conversational turn.
    ///
    /// The user's message is logged before the model is called, and exactly
    /// one model message is logged afterwards. Model failures never surface
    /// as errors; they become the apology message.
    pub async fn submit_turn(&self, session: &TripSession, input: &str) -> TurnOutcome {
        if input.trim().is_empty() {
            return TurnOutcome::Ignored;
        }

        let Some(history) = session.begin_turn(Message::user(input)) else {
            tracing::debug!(session_id = %session.id(), "Turn rejected, another is in flight");
            return TurnOutcome::Busy;
        };
        let open_turn = OpenTurn::new(session);

        let turn = ChatTurn {
            prompt: input.to_string(),
            history,
            style: session.style(),
            transport: session.transport(),
            location: session.coordinates(),
        };

        tracing::info!(
            session_id = %session.id(),
            history_len = turn.history.len(),
            style = turn.style.label(),
            "Submitting turn"
        );

        match self.model.send_message(turn).await {
            Ok(reply) => {
                let reply = Message::model(reply.text, reply.links);
                let itinerary = extract_itinerary(&reply.text);

                let mut hero_task = None;
                if let Some(itinerary) = &itinerary {
                    session.replace_itinerary(itinerary.clone());
                    if let Some(location) = itinerary.first_location() {
                        session.set_map_query(location);
                        hero_task = Some(
                            self.spawn_hero_image(session, format!("{location} landscape view")),
                        );
                    }
                    tracing::info!(
                        session_id = %session.id(),
                        title = %itinerary.title,
                        steps = itinerary.steps.len(),
                        "Itinerary adopted"
                    );
                }

                open_turn.finish(reply.clone());
                TurnOutcome::Completed(TurnReport {
                    reply,
                    succeeded: true,
                    itinerary,
                    hero_task,
                })
            }
            Err(e) => {
                tracing::error!(session_id = %session.id(), error = %e, "Chat turn failed");
                let reply = Message::model(APOLOGY, Vec::new());
                open_turn.finish(reply.clone());
                TurnOutcome::Completed(TurnReport {
                    reply,
                    succeeded: false,
                    itinerary: None,
                    hero_task: None,
                })
            }
        }
    }

    /// Start a hero-image request without waiting for it.
    ///
    /// The session counts the request as pending until it settles. A failed
    /// request leaves the current image in place.
    pub fn spawn_hero_image(&self, session: &TripSession, prompt: String) -> JoinHandle<()> {
        let model = Arc::clone(&self.model);
        let session = session.clone();
        session.hero_request_started();

        tokio::spawn(async move {
            if let Some(image) = model.generate_hero_image(&prompt).await {
                session.set_hero_image(image);
            }
            session.hero_request_settled();
        })
    }

    /// Generate a hero image for `location` and focus the map on it.
    ///
    /// Returns `false` and changes nothing if no image came back.
    pub async fn request_hero_image(&self, session: &TripSession, location: &str) -> bool {
        let Some(image) = self.model.generate_hero_image(location).await else {
            return false;
        };
        session.set_hero_image(image);
        session.set_map_query(location);
        true
    }

    /// Focus the map on a typed location and fetch a scenic image for it.
    ///
    /// The map moves right away; the image follows when ready. Blank input
    /// is ignored.
    pub async fn set_map_location(&self, session: &TripSession, location: &str) -> bool {
        let location = location.trim();
        if location.is_empty() {
            return false;
        }

        session.set_map_query(location);
        if let Some(image) = self
            .model
            .generate_hero_image(&format!("{location} scenic view"))
            .await
        {
            session.set_hero_image(image);
        }
        true
    }

    /// Toggle narration for the itinerary step at `index`.
    ///
    /// Toggling the active step stops it. Any other step becomes active at
    /// once, superseding the previous one, and its description is sent for
    /// synthesis. Audio that arrives after another step took over is dropped.
    pub async fn toggle_narration(&self, session: &TripSession, index: usize) -> NarrationOutcome {
        let Some(step) = session
            .itinerary()
            .and_then(|it| it.steps.into_iter().nth(index))
        else {
            return NarrationOutcome::NoSuchStep;
        };

        if session.narration() == Some(index) {
            session.set_narration(None);
            return NarrationOutcome::Stopped;
        }

        session.set_narration(Some(index));
        match self.model.generate_speech(&step.description).await {
            Some(clip) => {
                let audio = into_playable(clip);
                if session.store_narration_clip(index, audio.clone()) {
                    NarrationOutcome::Playing(audio)
                } else {
                    tracing::debug!(session_id = %session.id(), index, "Narration superseded");
                    NarrationOutcome::Superseded
                }
            }
            None => {
                session.clear_narration_if(index);
                NarrationOutcome::Unavailable
            }
        }
    }

    /// Playback of step `index` ended; clear it if it is still active.
    pub fn finish_narration(&self, session: &TripSession, index: usize) -> bool {
        session.clear_narration_if(index)
    }
}

use axum::{
    Form, Json, Router,
    extract::{Path, Query, Request, State},
    http::{StatusCode, header},
    middleware::Next,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use tracing::info;

use crate::AppState;
use crate::config::AppConfig;
use crate::genai::TravelModel;
use crate::genai::audio::PlayableAudio;
use crate::planner::{NarrationOutcome, TurnOutcome};
use crate::session::{DEFAULT_SESSION_TIMEOUT, TripSession, TripSnapshot};
use crate::travel::export::{EXPORT_FILE_NAME, to_plain_text};
use crate::travel::place::PlaceDetails;
use crate::travel::share::{ShareKind, ShareNotice};
use crate::travel::{Coordinates, DEFAULT_MAP_QUERY, Itinerary, Message, TransportMode, TravelStyle};
use crate::ui::{self, PageOptions};

/// How often idle sessions are swept.
const CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

type HandlerError = (StatusCode, String);

/// Start the Axum server with the provided configuration.
pub async fn start_server(config: Arc<AppConfig>, model: Arc<dyn TravelModel>) -> anyhow::Result<()> {
    info!(
        name: "genai.config.loaded",
        base_url = %config.genai.base_url,
        chat_model = %config.genai.chat_model,
        has_api_key = config.genai.api_key.is_some(),
        "Generative model configuration loaded"
    );

    let state = AppState::new(Arc::clone(&config), model);
    spawn_session_cleanup(state.clone());

    let app = build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(
        name: "server.started",
        address = %addr,
        "Server started"
    );

    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}

/// Build the full router: HTML pages, JSON API, health and static assets.
pub fn build_router(state: AppState) -> Router {
    // A zero timeout means "off"; a year is effectively unbounded.
    let timeout_duration = match state.config.server.request_timeout_secs {
        0 => Duration::from_secs(365 * 24 * 60 * 60),
        secs => Duration::from_secs(secs),
    };
    let static_dir = state.config.server.static_dir.clone();

    Router::new()
        // HTML pages
        .route("/", get(new_trip))
        .route("/trips/{id}", get(trip_page))
        .route("/trips/{id}/send", post(form_send))
        .route("/trips/{id}/style", post(form_style))
        .route("/trips/{id}/transport", post(form_transport))
        .route("/trips/{id}/mute", post(form_mute))
        .route("/trips/{id}/map", post(form_map))
        .route("/trips/{id}/hero", post(form_hero))
        .route("/trips/{id}/narration/audio", get(narration_audio))
        .route("/trips/{id}/narration/{index}", post(form_narration))
        .route("/trips/{id}/save", post(form_save))
        .route("/trips/{id}/calendar", post(form_calendar))
        .route("/trips/{id}/export", get(export_itinerary))
        // JSON API
        .route("/api/sessions", post(api_create_session))
        .route("/api/sessions/{id}", get(api_get_session))
        .route("/api/sessions/{id}/turns", post(api_submit_turn))
        .route("/api/sessions/{id}/style", axum::routing::put(api_set_style))
        .route("/api/sessions/{id}/transport", axum::routing::put(api_set_transport))
        .route("/api/sessions/{id}/mute", post(api_toggle_mute))
        .route("/api/sessions/{id}/location", post(api_set_location))
        .route("/api/sessions/{id}/map", post(api_set_map))
        .route("/api/sessions/{id}/hero", post(api_request_hero))
        .route(
            "/api/sessions/{id}/narration/{index}",
            post(api_toggle_narration).delete(api_finish_narration),
        )
        .route("/api/sessions/{id}/export", get(export_itinerary))
        .route("/healthz", get(healthz))
        // Static assets
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(axum::middleware::from_fn(
            move |req: Request, next: Next| {
                let duration = timeout_duration;
                async move {
                    match tokio::time::timeout(duration, next.run(req)).await {
                        Ok(res) => res,
                        Err(_) => {
                            (StatusCode::REQUEST_TIMEOUT, "Request timed out").into_response()
                        }
                    }
                }
            },
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Periodically drop sessions idle for longer than the default timeout.
fn spawn_session_cleanup(state: AppState) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(CLEANUP_INTERVAL);
        loop {
            ticker.tick().await;
            let removed = state
                .sessions
                .cleanup_expired_with_timeout(DEFAULT_SESSION_TIMEOUT);
            if removed > 0 {
                info!(
                    name: "session.cleanup",
                    removed,
                    remaining = state.sessions.len(),
                    "Expired sessions removed"
                );
            }
        }
    });
}

fn find_session(state: &AppState, id: &str) -> Result<TripSession, HandlerError> {
    state
        .sessions
        .get(id)
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("Unknown session: {id}")))
}

fn back_to(id: &str) -> Redirect {
    Redirect::to(&ui::trip_path(id))
}

fn audio_response(audio: PlayableAudio) -> Response {
    ([(header::CONTENT_TYPE, audio.content_type)], audio.body).into_response()
}

// ─────────────────────────────────────────────────────────────────────────────
// HTML Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// GET / - Open a new trip and go to its page.
async fn new_trip(State(state): State<AppState>) -> Redirect {
    let session = state.sessions.create();
    info!(session_id = %session.id(), "Trip session created");
    back_to(session.id())
}

#[derive(Debug, Default, Deserialize)]
struct PageQuery {
    #[serde(default)]
    share: Option<String>,
    #[serde(default)]
    notice: Option<String>,
}

/// GET /trips/:id - Render the dashboard.
async fn trip_page(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Html<String>, HandlerError> {
    let session = find_session(&state, &id)?;
    let snapshot = session.snapshot();

    let place = (snapshot.map_query != DEFAULT_MAP_QUERY)
        .then(|| PlaceDetails::mock(&snapshot.map_query, &mut rand::rng()));
    let options = PageOptions {
        share: query.share.as_deref().and_then(ShareKind::parse),
        notice: query.notice.as_deref().and_then(ShareNotice::parse),
        place,
        narration_ready: session.narration_clip().is_some(),
    };

    Ok(Html(ui::trip_page(&snapshot, &options)))
}

#[derive(Debug, Deserialize)]
struct MessageForm {
    #[serde(default)]
    message: String,
}

/// POST /trips/:id/send - Submit a chat turn.
async fn form_send(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<MessageForm>,
) -> Result<Redirect, HandlerError> {
    let session = find_session(&state, &id)?;
    if let TurnOutcome::Busy = state.planner.submit_turn(&session, &form.message).await {
        tracing::debug!(session_id = %id, "Form submit while busy");
    }
    Ok(back_to(&id))
}

#[derive(Debug, Deserialize)]
struct StyleForm {
    style: TravelStyle,
}

/// POST /trips/:id/style
async fn form_style(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<StyleForm>,
) -> Result<Redirect, HandlerError> {
    find_session(&state, &id)?.set_style(form.style);
    Ok(back_to(&id))
}

#[derive(Debug, Deserialize)]
struct TransportForm {
    transport: TransportMode,
}

/// POST /trips/:id/transport
async fn form_transport(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<TransportForm>,
) -> Result<Redirect, HandlerError> {
    find_session(&state, &id)?.set_transport(form.transport);
    Ok(back_to(&id))
}

/// POST /trips/:id/mute
async fn form_mute(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Redirect, HandlerError> {
    find_session(&state, &id)?.toggle_mute();
    Ok(back_to(&id))
}

#[derive(Debug, Deserialize)]
struct LocationForm {
    #[serde(default)]
    location: String,
}

/// POST /trips/:id/map - Manual map search.
async fn form_map(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<LocationForm>,
) -> Result<Redirect, HandlerError> {
    let session = find_session(&state, &id)?;
    state.planner.set_map_location(&session, &form.location).await;
    Ok(back_to(&id))
}

/// POST /trips/:id/hero - Show the generated image for a step.
async fn form_hero(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<LocationForm>,
) -> Result<Redirect, HandlerError> {
    let session = find_session(&state, &id)?;
    state
        .planner
        .request_hero_image(&session, &form.location)
        .await;
    Ok(back_to(&id))
}

/// POST /trips/:id/narration/:index - Toggle step narration.
async fn form_narration(
    State(state): State<AppState>,
    Path((id, index)): Path<(String, usize)>,
) -> Result<Redirect, HandlerError> {
    let session = find_session(&state, &id)?;
    state.planner.toggle_narration(&session, index).await;
    Ok(back_to(&id))
}

/// GET /trips/:id/narration/audio - Audio for the active step.
async fn narration_audio(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, HandlerError> {
    let (_, audio) = find_session(&state, &id)?
        .narration_clip()
        .ok_or((StatusCode::NOT_FOUND, "No narration ready".to_string()))?;
    Ok(audio_response(audio))
}

/// POST /trips/:id/save - Local-only "saved" notice.
async fn form_save(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Redirect, HandlerError> {
    find_session(&state, &id)?;
    Ok(notice_redirect(&id, ShareNotice::Saved))
}

/// POST /trips/:id/calendar - Local-only "scheduled" notice.
async fn form_calendar(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Redirect, HandlerError> {
    find_session(&state, &id)?;
    Ok(notice_redirect(&id, ShareNotice::Scheduled))
}

fn notice_redirect(id: &str, notice: ShareNotice) -> Redirect {
    Redirect::to(&format!("{}?notice={}", ui::trip_path(id), notice.as_str()))
}

/// GET /trips/:id/export and /api/sessions/:id/export - Plain-text itinerary.
async fn export_itinerary(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, HandlerError> {
    let itinerary = find_session(&state, &id)?
        .itinerary()
        .ok_or((StatusCode::NOT_FOUND, "No itinerary to export".to_string()))?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{EXPORT_FILE_NAME}\""),
            ),
        ],
        to_plain_text(&itinerary),
    )
        .into_response())
}

// ─────────────────────────────────────────────────────────────────────────────
// API Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// POST /api/sessions - Create a new session.
async fn api_create_session(State(state): State<AppState>) -> (StatusCode, Json<TripSnapshot>) {
    let session = state.sessions.create();
    (StatusCode::CREATED, Json(session.snapshot()))
}

/// GET /api/sessions/:id - Current session state.
async fn api_get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TripSnapshot>, HandlerError> {
    Ok(Json(find_session(&state, &id)?.snapshot()))
}

/// Request body for the turn API.
#[derive(Debug, Deserialize)]
struct TurnRequest {
    message: String,
}

/// Response from the turn API.
#[derive(Debug, Serialize)]
struct TurnResponse {
    /// `completed`, `failed` or `ignored`.
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply: Option<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    itinerary: Option<Itinerary>,
}

/// POST /api/sessions/:id/turns - Run one conversational turn.
async fn api_submit_turn(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<TurnRequest>,
) -> Result<Json<TurnResponse>, HandlerError> {
    let session = find_session(&state, &id)?;

    match state.planner.submit_turn(&session, &req.message).await {
        TurnOutcome::Ignored => Ok(Json(TurnResponse {
            status: "ignored",
            reply: None,
            itinerary: None,
        })),
        TurnOutcome::Busy => Err((
            StatusCode::CONFLICT,
            "A turn is already in progress".to_string(),
        )),
        TurnOutcome::Completed(report) => Ok(Json(TurnResponse {
            status: if report.succeeded {
                "completed"
            } else {
                "failed"
            },
            reply: Some(report.reply),
            itinerary: report.itinerary,
        })),
    }
}

/// PUT /api/sessions/:id/style
async fn api_set_style(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<StyleForm>,
) -> Result<StatusCode, HandlerError> {
    find_session(&state, &id)?.set_style(body.style);
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/sessions/:id/transport
async fn api_set_transport(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<TransportForm>,
) -> Result<StatusCode, HandlerError> {
    find_session(&state, &id)?.set_transport(body.transport);
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Serialize)]
struct MuteResponse {
    muted: bool,
}

/// POST /api/sessions/:id/mute - Flip the ambient-audio flag.
async fn api_toggle_mute(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MuteResponse>, HandlerError> {
    let muted = find_session(&state, &id)?.toggle_mute();
    Ok(Json(MuteResponse { muted }))
}

/// POST /api/sessions/:id/location - Device coordinates from the browser.
async fn api_set_location(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(coordinates): Json<Coordinates>,
) -> Result<StatusCode, HandlerError> {
    find_session(&state, &id)?.set_coordinates(coordinates);
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/sessions/:id/map - Manual map search.
async fn api_set_map(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<LocationForm>,
) -> Result<Json<TripSnapshot>, HandlerError> {
    let session = find_session(&state, &id)?;
    state.planner.set_map_location(&session, &body.location).await;
    Ok(Json(session.snapshot()))
}

#[derive(Debug, Serialize)]
struct HeroResponse {
    updated: bool,
}

/// POST /api/sessions/:id/hero - Generate a hero image for a location.
async fn api_request_hero(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<LocationForm>,
) -> Result<Json<HeroResponse>, HandlerError> {
    let session = find_session(&state, &id)?;
    let updated = state
        .planner
        .request_hero_image(&session, &body.location)
        .await;
    Ok(Json(HeroResponse { updated }))
}

/// POST /api/sessions/:id/narration/:index - Toggle narration; audio or 204.
async fn api_toggle_narration(
    State(state): State<AppState>,
    Path((id, index)): Path<(String, usize)>,
) -> Result<Response, HandlerError> {
    let session = find_session(&state, &id)?;
    match state.planner.toggle_narration(&session, index).await {
        NarrationOutcome::Playing(audio) => Ok(audio_response(audio)),
        NarrationOutcome::NoSuchStep => Err((
            StatusCode::NOT_FOUND,
            format!("No itinerary step {index}"),
        )),
        NarrationOutcome::Stopped
        | NarrationOutcome::Superseded
        | NarrationOutcome::Unavailable => Ok(StatusCode::NO_CONTENT.into_response()),
    }
}

/// DELETE /api/sessions/:id/narration/:index - Playback ended.
async fn api_finish_narration(
    State(state): State<AppState>,
    Path((id, index)): Path<(String, usize)>,
) -> Result<StatusCode, HandlerError> {
    let session = find_session(&state, &id)?;
    state.planner.finish_narration(&session, index);
    Ok(StatusCode::NO_CONTENT)
}

/// GET /healthz
async fn healthz() -> &'static str {
    "ok"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genai::{ChatReply, ChatTurn, GenAiError, SpeechClip};
    use axum::body::{Body, to_bytes};
    use tower::ServiceExt;

    struct SilentModel;

    #[async_trait::async_trait]
    impl TravelModel for SilentModel {
        async fn send_message(&self, _turn: ChatTurn) -> Result<ChatReply, GenAiError> {
            Err(GenAiError::EmptyReply)
        }

        async fn generate_hero_image(&self, _prompt: &str) -> Option<String> {
            None
        }

        async fn generate_speech(&self, _text: &str) -> Option<SpeechClip> {
            None
        }
    }

    fn app() -> (Router, AppState) {
        let config = AppConfig::load_from_args(["glossy-travel"]).unwrap();
        let state = AppState::new(Arc::new(config), Arc::new(SilentModel));
        (build_router(state.clone()), state)
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, String) {
        let resp = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let body = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_healthz() {
        let (app, _) = app();
        assert_eq!(get(app, "/healthz").await, (StatusCode::OK, "ok".to_string()));
    }

    #[tokio::test]
    async fn test_root_redirects_to_new_trip() {
        let (app, state) = app();
        let resp = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        let location = resp.headers()[header::LOCATION].to_str().unwrap();
        assert!(location.starts_with("/trips/"));
        assert_eq!(state.sessions.len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_trip_is_not_found() {
        let (app, _) = app();
        let (status, _) = get(app, "/trips/missing").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_export_without_itinerary_is_not_found() {
        let (app, state) = app();
        let id = state.sessions.create().id().to_string();
        let (status, _) = get(app, &format!("/trips/{id}/export")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}

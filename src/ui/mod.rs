//! Server-rendered HTML.
//!
//! Pages are plain `format!` templates over a [`TripSnapshot`]. Every action
//! is a form post that redirects back to the page, so the UI works without
//! scripts; the small inline script only covers what a form cannot do
//! (geolocation, ambient audio, end of narration).
//!
//! # Structure
//!
//! - [`panels`]: hero, map, itinerary sidebar and chat
//! - [`share`]: share toolbar, toast and preview modals
//! - [`icons`]: inline SVG paths

pub mod icons;
pub mod panels;
pub mod share;

use crate::session::TripSnapshot;
use crate::travel::place::PlaceDetails;
use crate::travel::share::{ShareKind, ShareNotice};

/// Ambient track volume when not muted.
pub const AMBIENT_VOLUME: f32 = 0.15;

/// Per-request extras that are not part of the session state.
#[derive(Debug, Clone, Default)]
pub struct PageOptions {
    /// Share preview to open as a modal.
    pub share: Option<ShareKind>,
    /// Toast to show once.
    pub notice: Option<ShareNotice>,
    /// Mocked details for the current map focus.
    pub place: Option<PlaceDetails>,
    /// Audio for the active narration step is ready to play.
    pub narration_ready: bool,
}

/// Escape text for HTML content and double-quoted attributes.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Base path of a trip's HTML routes.
pub fn trip_path(id: &str) -> String {
    format!("/trips/{id}")
}

/// Render the full trip page.
pub fn trip_page(snapshot: &TripSnapshot, options: &PageOptions) -> String {
    let id = snapshot.id.as_str();
    let base = trip_path(id);

    let content = format!(
        r#"<div class="layout">
    {header}
    <div class="columns">
        <aside class="glass sidebar">{sidebar}</aside>
        <div class="dashboard">
            <div class="top-row">
                <div class="map-cell">{map}</div>
                <div class="hero-cell">{hero}</div>
            </div>
            {chat}
        </div>
    </div>
    {toast}
    {modal}
    {narration}
    <audio id="ambient-audio" src="/static/ambient.mp3" loop preload="none" data-muted="{muted}"></audio>
</div>
{script}"#,
        header = panels::header_bar(&base, snapshot.muted),
        sidebar = panels::itinerary_sidebar(&base, snapshot),
        map = panels::map_panel(&base, snapshot, options.place.as_ref()),
        hero = panels::hero_panel(snapshot),
        chat = panels::chat_panel(&base, snapshot),
        toast = options.notice.map(share::toast).unwrap_or_default(),
        modal = match (options.share, snapshot.itinerary.as_ref()) {
            (Some(kind), Some(itinerary)) => share::modal(&base, kind, itinerary),
            _ => String::new(),
        },
        narration = narration_player(&base, snapshot, options.narration_ready),
        muted = snapshot.muted,
        script = page_script(id, snapshot),
    );

    html_shell(&title_for(snapshot), &content)
}

fn title_for(snapshot: &TripSnapshot) -> String {
    snapshot
        .itinerary
        .as_ref()
        .map_or_else(|| "Planifica tu viaje".to_string(), |it| it.title.clone())
}

fn narration_player(base: &str, snapshot: &TripSnapshot, ready: bool) -> String {
    match snapshot.narration {
        Some(index) if ready => format!(
            r#"<audio id="narration-audio" src="{base}/narration/audio" autoplay data-step="{index}"></audio>"#
        ),
        _ => String::new(),
    }
}

/// Geolocation, ambient audio and narration bookkeeping.
fn page_script(id: &str, snapshot: &TripSnapshot) -> String {
    let locate = snapshot.coordinates.is_none();
    let poll_hero = snapshot.hero_pending;
    let exported = ShareNotice::Exported.as_str();
    format!(
        r#"<script>
(function () {{
    var api = "/api/sessions/{id}";
    if ({locate} && navigator.geolocation) {{
        navigator.geolocation.getCurrentPosition(function (pos) {{
            fetch(api + "/location", {{
                method: "POST",
                headers: {{ "Content-Type": "application/json" }},
                body: JSON.stringify({{ lat: pos.coords.latitude, lng: pos.coords.longitude }})
            }});
        }});
    }}
    var ambient = document.getElementById("ambient-audio");
    if (ambient && ambient.dataset.muted !== "true") {{
        ambient.volume = {AMBIENT_VOLUME};
        ambient.play().catch(function () {{
            document.addEventListener("click", function () {{ ambient.play(); }}, {{ once: true }});
        }});
    }}
    var narration = document.getElementById("narration-audio");
    if (narration) {{
        narration.addEventListener("ended", function () {{
            fetch(api + "/narration/" + narration.dataset.step, {{ method: "DELETE" }})
                .then(function () {{ window.location.reload(); }});
        }});
    }}
    document.querySelectorAll("a[download]").forEach(function (link) {{
        link.addEventListener("click", function () {{
            setTimeout(function () {{ window.location.href = "/trips/{id}?notice={exported}"; }}, 300);
        }});
    }});
    if ({poll_hero}) {{
        setTimeout(function () {{ window.location.reload(); }}, 4000);
    }}
    var log = document.getElementById("chat-log");
    if (log) {{ log.scrollTop = log.scrollHeight; }}
}})();
</script>"#
    )
}

/// Generate the HTML shell for the application.
pub fn html_shell(title: &str, content: &str) -> String {
    let title = html_escape(title);
    format!(
        r#"<!DOCTYPE html>
<html lang="es" class="dark">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <meta name="description" content="Planificador de viajes con IA">
    <title>{title} - Glossy Travel</title>
    <link rel="stylesheet" href="/static/app.css">
</head>
<body>
    {content}
</body>
</html>"#
    )
}

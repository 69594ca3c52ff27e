//! Dashboard panels.

use std::fmt::Write as _;

use super::{html_escape, icons};
use crate::session::TripSnapshot;
use crate::travel::place::PlaceDetails;
use crate::travel::{DEFAULT_MAP_QUERY, Message, Role, TransportMode, TravelStyle};

/// Embed URL for a map query.
pub fn map_embed_url(query: &str) -> String {
    let q: String = url::form_urlencoded::byte_serialize(query.as_bytes()).collect();
    format!("https://www.google.com/maps?q={q}&output=embed")
}

/// Seeded placeholder thumbnail for an itinerary step.
pub fn step_thumbnail_url(index: usize, location: &str) -> String {
    let seed: String = location.split_whitespace().collect();
    let seed: String = url::form_urlencoded::byte_serialize(format!("{index}{seed}").as_bytes())
        .collect();
    format!("https://picsum.photos/seed/{seed}/200")
}

pub fn header_bar(base: &str, muted: bool) -> String {
    let (class, title, icon) = if muted {
        ("mute-btn muted", "Activar ambiente", icons::MUTED)
    } else {
        ("mute-btn", "Silenciar ambiente", icons::SPEAKER)
    };
    format!(
        r#"<header class="top-bar">
    <div class="brand"><span class="brand-dot"></span><h1>GLOSSY<span>TRAVEL</span>.AI</h1></div>
    <form method="post" action="{base}/mute">
        <button type="submit" class="{class}" title="{title}">{icon}</button>
    </form>
</header>"#,
        icon = icons::svg(icon, ""),
    )
}

pub fn hero_panel(snapshot: &TripSnapshot) -> String {
    match &snapshot.hero_image {
        Some(image) => format!(
            r#"<div class="hero">
    <img src="{src}" alt="Destino" class="ken-burns">
    <h2 class="neon-text">{title}</h2>
</div>"#,
            src = html_escape(image),
            title = html_escape(&snapshot.map_query),
        ),
        None => r#"<div class="glass hero-placeholder"><span>Esperando Destino...</span></div>"#
            .to_string(),
    }
}

/// Map embed with search box, place card and transport overlay.
pub fn map_panel(base: &str, snapshot: &TripSnapshot, place: Option<&PlaceDetails>) -> String {
    let query = snapshot.map_query.as_str();
    let flying = snapshot.transport == TransportMode::Flight;
    let search_value = if query == DEFAULT_MAP_QUERY { "" } else { query };

    let overlay = if flying {
        r##"<div class="flight-overlay" aria-hidden="true">
        <svg viewBox="0 0 900 450" preserveAspectRatio="none">
            <path class="flight-path" d="M -50 400 Q 150 350, 400 200 T 900 100"/>
            <path class="plane" d="M21 16v-2l-8-5V3.5A1.5 1.5 0 0 0 11.5 2 1.5 1.5 0 0 0 10 3.5V9l-8 5v2l8-2.5V19l-2 1.5V22l3.5-1 3.5 1v-1.5L13 19v-5.5l8 2.5z">
                <animateMotion dur="10s" repeatCount="indefinite" rotate="auto" path="M -50 400 Q 150 350, 400 200 T 900 100"/>
            </path>
        </svg>
        <div class="telemetry"><span>ALTITUDE <b>32,000 FT</b></span><span>SPEED <b>540 KTS</b></span></div>
    </div>"##
    } else {
        ""
    };

    let card = match place {
        Some(details) if query != DEFAULT_MAP_QUERY => place_card(snapshot, details),
        _ => String::new(),
    };

    format!(
        r#"<div class="glass map-panel">
    <iframe src="{src}" title="Map" allowfullscreen loading="lazy"></iframe>
    {overlay}
    <form class="map-search" method="post" action="{base}/map">
        {search_icon}
        <input type="text" name="location" value="{value}" placeholder="Buscar en Google Maps...">
        <button type="submit">IR</button>
    </form>
    {card}
    <div class="badge">{badge}</div>
</div>"#,
        src = html_escape(&map_embed_url(query)),
        search_icon = icons::svg(icons::SEARCH, "muted"),
        value = html_escape(search_value),
        badge = if flying {
            "FLIGHT TRACKING"
        } else {
            "LIVE SATELLITE"
        },
    )
}

fn place_card(snapshot: &TripSnapshot, details: &PlaceDetails) -> String {
    let image = snapshot.hero_image.as_deref().map_or_else(
        || r#"<div class="place-image empty">🗺️</div>"#.to_string(),
        |src| {
            format!(
                r#"<img class="place-image" src="{}" alt="{}">"#,
                html_escape(src),
                html_escape(&details.name)
            )
        },
    );
    let filled = details.filled_stars();
    let stars: String = (0..5)
        .map(|i| {
            if i < filled {
                r#"<span class="star on">★</span>"#
            } else {
                r#"<span class="star">★</span>"#
            }
        })
        .collect();

    format!(
        r#"<details class="glass place-card" open>
    <summary>Detalles</summary>
    {image}
    <div class="place-body">
        <h2>{name}</h2>
        <div class="rating"><b>{rating}</b>{stars}<span>({reviews})</span></div>
        <p class="muted">Destino Turístico • Abierto 24hs</p>
        <ul class="place-rows">
            <li>{pin}{address}</li>
            <li class="link">{globe}{website}</li>
        </ul>
        <p class="blurb">{blurb}</p>
    </div>
</details>"#,
        name = html_escape(&details.name),
        rating = html_escape(&details.rating),
        reviews = details.reviews,
        pin = icons::svg(icons::PIN, ""),
        address = html_escape(&details.address),
        globe = icons::svg(icons::GLOBE, ""),
        website = html_escape(&details.website),
        blurb = html_escape(&details.blurb),
    )
}

/// Itinerary timeline, or an invitation when there is none yet.
pub fn itinerary_sidebar(base: &str, snapshot: &TripSnapshot) -> String {
    let Some(itinerary) = &snapshot.itinerary else {
        return r#"<div class="sidebar-empty"><div class="big-icon">✈️</div><p>Genera tu primer viaje para ver el plan aquí.</p></div>"#
            .to_string();
    };

    let mut steps = String::new();
    for (index, step) in itinerary.steps.iter().enumerate() {
        let playing = snapshot.narration == Some(index);
        let (play_class, play_icon, play_title) = if playing {
            ("narrate playing", icons::STOP, "Detener narración")
        } else {
            ("narrate", icons::PLAY, "Escuchar")
        };
        let _ = write!(
            steps,
            r#"<li class="glass step">
    <form method="post" action="{base}/hero">
        <input type="hidden" name="location" value="{location}">
        <button type="submit" class="thumb" title="Ver imagen generada"><img src="{thumb}" alt="thumb"></button>
    </form>
    <div class="step-body">
        <div class="step-head">
            <span class="time">{time}</span>
            <form method="post" action="{base}/narration/{index}">
                <button type="submit" class="{play_class}" title="{play_title}">{play_icon}</button>
            </form>
        </div>
        <h3>{title}</h3>
        <p>{description}</p>
    </div>
</li>"#,
            location = html_escape(&step.location),
            thumb = html_escape(&step_thumbnail_url(index, &step.location)),
            time = html_escape(&step.time),
            play_icon = icons::svg(play_icon, ""),
            title = html_escape(&step.title),
            description = html_escape(&step.description),
        );
    }

    format!(
        r#"{toolbar}
<div class="itinerary-head">
    <h2>{title}</h2>
    <p>{summary}</p>
</div>
<ol class="timeline">{steps}</ol>"#,
        toolbar = super::share::toolbar(base),
        title = html_escape(&itinerary.title),
        summary = html_escape(&itinerary.summary),
    )
}

fn message_bubble(message: &Message) -> String {
    let class = match message.role {
        Role::User => "bubble user",
        Role::Model => "bubble model",
    };
    let links: String = message
        .grounding_links
        .iter()
        .map(|link| {
            format!(
                r#"<a href="{}" target="_blank" rel="noreferrer"><span class="dot"></span>{}</a>"#,
                html_escape(&link.uri),
                html_escape(&link.title)
            )
        })
        .collect();
    let links = if links.is_empty() {
        links
    } else {
        format!(r#"<div class="sources">{links}</div>"#)
    };

    format!(
        r#"<div class="{class}"><p>{text}</p>{links}</div>"#,
        text = html_escape(&message.display_text()),
    )
}

fn transport_switch(base: &str, current: TransportMode) -> String {
    let buttons: String = TransportMode::ALL
        .iter()
        .map(|&mode| {
            let icon = match mode {
                TransportMode::Flight => icons::FLIGHT,
                TransportMode::Bus => icons::BUS,
                TransportMode::Car => icons::CAR,
                TransportMode::Boat => icons::BOAT,
            };
            format!(
                r#"<button type="submit" name="transport" value="{label}" title="{label}" class="{class}">{icon}</button>"#,
                label = mode.label(),
                class = if mode == current { "active" } else { "" },
                icon = icons::svg(icon, ""),
            )
        })
        .collect();
    format!(r#"<form class="transport-switch" method="post" action="{base}/transport">{buttons}</form>"#)
}

fn style_switch(base: &str, current: TravelStyle) -> String {
    let buttons: String = TravelStyle::ALL
        .iter()
        .map(|&style| {
            format!(
                r#"<button type="submit" name="style" value="{label}" title="{label}" class="{class}">{short}</button>"#,
                label = html_escape(style.label()),
                class = if style == current { "active" } else { "" },
                short = html_escape(style.short_label()),
            )
        })
        .collect();
    format!(r#"<form class="style-switch" method="post" action="{base}/style">{buttons}</form>"#)
}

/// Conversation log, preference switches and the input form.
pub fn chat_panel(base: &str, snapshot: &TripSnapshot) -> String {
    let log: String = snapshot.messages.iter().map(message_bubble).collect();
    let typing = if snapshot.loading {
        r#"<div class="bubble model typing"><span></span><span></span><span></span></div>"#
    } else {
        ""
    };
    let disabled = if snapshot.loading { " disabled" } else { "" };

    format!(
        r#"<section class="glass chat">
    <div id="chat-log" class="chat-log">{log}{typing}</div>
    <div class="switches">{transport}{style}</div>
    <form class="composer" method="post" action="{base}/send">
        <input type="text" name="message" autocomplete="off" placeholder="Escribe tu próximo destino..." autofocus{disabled}>
        <button type="submit" title="Enviar"{disabled}>{send}</button>
    </form>
</section>"#,
        transport = transport_switch(base, snapshot.transport),
        style = style_switch(base, snapshot.style),
        send = icons::svg(icons::SEND, ""),
    )
}

//! Share toolbar, toast and preview modals.

use super::{html_escape, icons};
use crate::travel::Itinerary;
use crate::travel::share::{ShareKind, ShareNotice, landing_page_steps, thread_posts};

/// Save, export, the three previews and calendar.
pub fn toolbar(base: &str) -> String {
    format!(
        r#"<nav class="share-bar">
    <form method="post" action="{base}/save"><button type="submit" title="Guardar">{save}</button></form>
    <a href="{base}/export" title="Exportar" download>{export}</a>
    <span class="divider"></span>
    <a href="{base}?share=card" title="Nota">{card}</a>
    <a href="{base}?share=site" title="Site">{site}</a>
    <a href="{base}?share=thread" title="Hilo">{thread}</a>
    <form method="post" action="{base}/calendar"><button type="submit" title="Agenda">{calendar}</button></form>
</nav>"#,
        save = icons::svg(icons::SAVE, ""),
        export = icons::svg(icons::EXPORT, ""),
        card = icons::svg(icons::CARD, ""),
        site = icons::svg(icons::SITE, ""),
        thread = icons::svg(icons::THREAD, ""),
        calendar = icons::svg(icons::CALENDAR, ""),
    )
}

pub fn toast(notice: ShareNotice) -> String {
    format!(r#"<div class="toast" role="status">{}</div>"#, notice.text())
}

/// Preview modal for `kind`; closing links back to the bare page.
pub fn modal(base: &str, kind: ShareKind, itinerary: &Itinerary) -> String {
    let body = match kind {
        ShareKind::Card => note_card(itinerary),
        ShareKind::Site => landing_page(itinerary),
        ShareKind::Thread => thread(itinerary),
    };
    format!(
        r#"<div class="modal-backdrop">
    <div class="glass modal modal-{kind}">
        <a class="close" href="{base}" title="Cerrar">✕</a>
        {body}
    </div>
</div>"#,
        kind = kind.as_str(),
    )
}

fn note_card(itinerary: &Itinerary) -> String {
    format!(
        r#"<h3 class="accent-cyan">Nota Rápida</h3>
<div class="note-card">
    <div class="note-tag"><span class="dot"></span>Glossy Travel Insight</div>
    <h2>"{title}"</h2>
    <blockquote>{summary}</blockquote>
</div>
<p class="hint">Listo para compartir en Dashboard</p>"#,
        title = html_escape(&itinerary.title),
        summary = html_escape(&itinerary.summary),
    )
}

fn landing_page(itinerary: &Itinerary) -> String {
    let steps: String = landing_page_steps(itinerary)
        .iter()
        .map(|s| {
            format!(
                r#"<div class="site-step"><h4>{time} • {location}</h4><p class="site-step-title">{title}</p><p>{description}</p></div>"#,
                time = html_escape(&s.time),
                location = html_escape(&s.location),
                title = html_escape(&s.title),
                description = html_escape(&s.description),
            )
        })
        .collect();

    format!(
        r#"<div class="modal-head"><h3 class="accent-pink">Vista Previa Web</h3><span class="chip">index.html</span></div>
<div class="site-preview">
    <div class="browser-bar"><span></span><span></span><span></span><div class="address">glossy.travel/my-trip</div></div>
    <div class="site-body">
        <h1>{title}</h1>
        <img src="https://picsum.photos/seed/travel/800/300" alt="hero">
        <p class="lead">{summary}</p>
        <hr>
        {steps}
    </div>
</div>
<button type="button" class="publish pink">Publicar Landing Page</button>"#,
        title = html_escape(&itinerary.title),
        summary = html_escape(&itinerary.summary),
    )
}

fn thread(itinerary: &Itinerary) -> String {
    let posts = thread_posts(itinerary);
    let count = posts.len();
    let rendered: String = posts
        .iter()
        .map(|post| {
            let avatar = post
                .number
                .map_or_else(String::new, |n| n.to_string());
            let body = html_escape(&post.body).replace('\n', "<br>");
            format!(
                r#"<div class="post"><div class="avatar">{avatar}</div><div><div class="author"><b>User</b> <span>@traveler</span></div><p>{body}</p></div></div>"#
            )
        })
        .collect();

    format!(
        r#"<div class="modal-head"><h3 class="accent-blue">Generar Hilo</h3><span class="muted">{count} tweets</span></div>
<div class="thread">{rendered}</div>
<button type="button" class="publish blue">Postear en X</button>"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::travel::ItineraryStep;

    fn itinerary(steps: usize) -> Itinerary {
        Itinerary {
            title: "Tokio <neón>".to_string(),
            summary: "Cinco días".to_string(),
            steps: (0..steps)
                .map(|i| ItineraryStep {
                    title: format!("Paso {i}"),
                    description: "Descripción".to_string(),
                    time: "08:00".to_string(),
                    location: format!("Barrio {i}"),
                    coordinates: None,
                })
                .collect(),
        }
    }

    #[test]
    fn test_thread_modal_counts_hook_plus_steps() {
        let html = modal("/trips/x", ShareKind::Thread, &itinerary(4));
        assert!(html.contains("5 tweets"));
        assert_eq!(html.matches(r#"class="post""#).count(), 5);
    }

    #[test]
    fn test_site_modal_shows_three_steps() {
        let html = modal("/trips/x", ShareKind::Site, &itinerary(5));
        assert_eq!(html.matches("site-step-title").count(), 3);
    }

    #[test]
    fn test_card_modal_escapes_title() {
        let html = modal("/trips/x", ShareKind::Card, &itinerary(0));
        assert!(html.contains("Tokio &lt;neón&gt;"));
        assert!(html.contains(r#"href="/trips/x""#));
    }
}

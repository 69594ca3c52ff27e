//! Mocked place details for the map panel.
//!
//! The card imitates a maps "place" view. None of it is real data: rating
//! and review count are drawn at random on every render.

use rand::Rng;

/// Decorative place card for the current map focus.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceDetails {
    pub name: String,
    /// Rating formatted with one decimal, e.g. `4.6`.
    pub rating: String,
    pub reviews: u32,
    pub address: String,
    pub website: String,
    pub blurb: String,
}

impl PlaceDetails {
    /// Build a card for `location` using `rng` for the fake figures.
    pub fn mock<R: Rng + ?Sized>(location: &str, rng: &mut R) -> Self {
        let rating: f64 = rng.random_range(4.0..5.0);
        let reviews = rng.random_range(50..1050);
        let slug: String = location
            .to_lowercase()
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        let activity = if location.contains("Beach") {
            "tomar sol"
        } else {
            "caminatas"
        };

        Self {
            name: location.to_string(),
            rating: format!("{rating:.1}"),
            reviews,
            address: format!("{location}, Región Turística"),
            website: format!("www.visit{slug}.com"),
            blurb: format!(
                "\"Un lugar increíble para conectar con la naturaleza y disfrutar de vistas panorámicas. Ideal para {activity} y relajarse.\""
            ),
        }
    }

    /// Number of filled stars (floor of the rating).
    #[must_use]
    pub fn filled_stars(&self) -> usize {
        self.rating
            .split('.')
            .next()
            .and_then(|whole| whole.parse().ok())
            .unwrap_or(0)
    }
}

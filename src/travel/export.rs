//! Plain-text itinerary export.

use super::Itinerary;

/// File name offered to the browser for the export download.
pub const EXPORT_FILE_NAME: &str = "glossy_travel_plan.txt";

/// Render `itinerary` as the flat text document users download.
///
/// The layout is fixed: a title line, a summary line, then one
/// `- [time] title @ location: description` line per step. Output depends
/// only on the itinerary, so repeated exports are byte-identical.
#[must_use]
pub fn to_plain_text(itinerary: &Itinerary) -> String {
    let steps = itinerary
        .steps
        .iter()
        .map(|s| {
            format!(
                "- [{}] {} @ {}: {}",
                s.time, s.title, s.location, s.description
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "TRIP: {}\n\nSUMMARY: {}\n\nITINERARY:\n{steps}",
        itinerary.title, itinerary.summary
    )
}

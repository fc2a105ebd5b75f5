//! Prompt construction.

use marquee_core::category::Category;
use marquee_core::profile::TasteProfile;
use marquee_core::response::{ANSWER_TYPE, RECOMMENDATIONS_TYPE};

/// Fixed system instruction for every generation request.
pub const SYSTEM_INSTRUCTION: &str = concat!(
    "You are a film and television recommendation assistant. ",
    "You receive the user's taste profile as JSON and a request. ",
    "Reply with exactly one JSON object and nothing else, in one of two shapes.\n",
    "1. Recommendations: {\"type\":\"recommendations\",\"items\":[{\"title\":\"...\",",
    "\"category\":\"movie|tv\",\"reason\":\"...\"}]} with 5 to 8 items. ",
    "Only suggest titles of the requested category. ",
    "Never suggest anything already listed in the profile. ",
    "Keep each reason to one sentence tied to the profile.\n",
    "2. Answer: {\"type\":\"answer\",\"heading\":\"...\",\"text\":\"...\"} ",
    "when the request is a question rather than a request for titles.",
);

/// Build the user message: request text followed by the profile JSON.
///
/// A blank request falls back to a generic "what next" request for the
/// category.
pub fn user_message(profile: &TasteProfile, category: Category, request: &str) -> String {
    let request = request.trim();
    let request = if request.is_empty() {
        format!("Recommend {} I should watch next.", category.plural_label())
    } else {
        request.to_string()
    };
    let profile_json =
        serde_json::to_string_pretty(profile).unwrap_or_else(|_| "{}".to_string());

    format!(
        "Requested category: {category}\n\
         Request: {request}\n\
         Reply types: {RECOMMENDATIONS_TYPE} or {ANSWER_TYPE}\n\n\
         Taste profile:\n{profile_json}"
    )
}

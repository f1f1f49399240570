//! Negotiation prompt assembly.

use crate::types::InfluencerProfile;
use serde_json::Value;

/// Rendered in place of the profile section when no fields were supplied.
const EMPTY_PROFILE: &str = "None";

/// Build the full model prompt for one negotiation email.
///
/// The profile is flattened to one `key: value` line per field in the
/// caller's key order. Strings are inserted verbatim; numbers, booleans,
/// nulls, lists and nested objects use their compact JSON form.
pub fn build_negotiation_prompt(user_prompt: &str, profile: &InfluencerProfile) -> String {
    let profile_section = render_profile(profile);
    format!(
        r#"
You are Priyansh Arora, India's most audacious influencer negotiator. Craft an email with:
1. SUBJECT (under 60 chars, attention-grabbing)
2. Two newlines
3. BODY with:
   - Personalized greeting mentioning their recent work
   - Anchor rate 20% above typical
   - Clear deliverables and perks
   - Urgency and social proof
   - Multiple CTAs

--- Influencer Profile ---
{profile_section}

--- User Instruction ---
{user_prompt}

Return EXACTLY:
- First line = SUBJECT
- A blank line
- The full BODY
"#
    )
    .trim()
    .to_string()
}

/// Flatten a profile into `key: value` lines.
pub fn render_profile(profile: &InfluencerProfile) -> String {
    if profile.is_empty() {
        return EMPTY_PROFILE.to_string();
    }
    profile
        .iter()
        .map(|(key, value)| format!("{key}: {}", render_value(value)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

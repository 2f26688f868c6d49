//! Room extraction heuristic
//!
//! An explicit area name always wins. Without one, the entity id is split
//! on underscores and matched against a fixed room vocabulary, trying
//! adjacent two-token combinations first so "master_bedroom" beats the
//! plain "bedroom" hit.

#[cfg(test)]
#[path = "room_test.rs"]
mod tests;

/// Known room names; two-token entries are matched against joined
/// adjacent tokens before single tokens are tried
const ROOM_VOCABULARY: &[&str] = &[
    "living_room",
    "dining_room",
    "master_bedroom",
    "guest_bedroom",
    "guest_room",
    "laundry_room",
    "utility_room",
    "bedroom",
    "kitchen",
    "bathroom",
    "office",
    "garage",
    "hallway",
    "basement",
    "attic",
    "balcony",
    "patio",
    "closet",
    "nursery",
    "porch",
    "pantry",
    "den",
    "study",
    "loft",
    "sunroom",
    "entryway",
    "landing",
    "garden",
    "driveway",
    "shed",
];

/// Extract a room name for an entity
pub fn extract_room(entity_id: &str, area_name: Option<&str>) -> Option<String> {
    if let Some(area) = area_name {
        let trimmed = area.trim();
        if !trimmed.is_empty() {
            return Some(trimmed.to_string());
        }
    }

    let object_id = entity_id.split_once('.').map_or(entity_id, |(_, id)| id);
    let tokens: Vec<&str> = object_id.split('_').filter(|t| !t.is_empty()).collect();

    // Two-token matches first ("master" + "bedroom")
    for pair in tokens.windows(2) {
        let joined = format!("{}_{}", pair[0], pair[1]);
        if ROOM_VOCABULARY.contains(&joined.as_str()) {
            return Some(joined);
        }
    }

    for token in &tokens {
        if ROOM_VOCABULARY.contains(token) {
            return Some((*token).to_string());
        }
    }

    None
}

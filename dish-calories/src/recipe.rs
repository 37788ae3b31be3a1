//! Pulling the ingredient list out of a recipe video's description.

const INGREDIENTS_MARKER: &str = "Ingredients";
const DIRECTIONS_MARKER: &str = "Directions";

/// What we keep from a recipe video once it has been accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoMetadata {
    pub title: String,
    /// The raw text of the description's ingredients section.
    pub ingredients: String,
}

/// Returns the text strictly between the `Ingredients` and `Directions` markers.
///
/// `Directions` is only searched for after the end of `Ingredients`. If there is
/// no `Directions` marker the section runs to the end of the description.
/// Returns `None` if the description has no `Ingredients` marker at all.
pub fn extract_ingredients(description: &str) -> Option<&str> {
    let start = description.find(INGREDIENTS_MARKER)? + INGREDIENTS_MARKER.len();
    let rest = &description[start..];
    match rest.find(DIRECTIONS_MARKER) {
        Some(end) => Some(&rest[..end]),
        None => {
            tracing::warn!("description has no directions section, using the rest of it");
            Some(rest)
        }
    }
}

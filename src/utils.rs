// Utility functions

/// Characters that may not appear in a payload key.
const FORBIDDEN_KEY_CHARS: [char; 7] = ['$', '#', '[', ']', '/', '.', ':'];

/// Keeps only the part of `slug` before the first `/`.
pub fn first_path_segment(slug: &str) -> &str {
    slug.split('/').next().unwrap_or_default()
}

/// Replaces forbidden key characters with spaces, collapses runs of whitespace
/// into a single space and trims both ends.
pub fn sanitize_key(text: &str) -> String {
    text.chars()
        .map(|c| if FORBIDDEN_KEY_CHARS.contains(&c) { ' ' } else { c })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

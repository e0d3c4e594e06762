pub mod currency;
pub mod ids;

pub use ids::generate_id;

use anyhow::{Context, Result};
use std::path::Path;

/// Avatar image service; the seed is passed through as-is
const AVATAR_BASE_URL: &str = "https://api.dicebear.com/7.x/avataaars/svg";

pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)
            .with_context(|| format!("Failed to create directory: {}", path.display()))?;
    }
    Ok(())
}

pub fn avatar_url(seed: &str) -> String {
    format!("{}?seed={}", AVATAR_BASE_URL, seed)
}

/// Collect `@handle` mentions from comment text, in order, without duplicates.
///
/// Handles may contain letters, digits, `.`, `_` and `-`; a trailing `.` is
/// treated as punctuation.
pub fn extract_mentions(content: &str) -> Vec<String> {
    let mut mentions: Vec<String> = Vec::new();

    for (idx, _) in content.match_indices('@') {
        // Skip the `@` inside email addresses
        let preceded_by_word = content[..idx]
            .chars()
            .next_back()
            .is_some_and(|c| c.is_alphanumeric());
        if preceded_by_word {
            continue;
        }

        let handle: String = content[idx + 1..]
            .chars()
            .take_while(|c| c.is_alphanumeric() || matches!(c, '.' | '_' | '-'))
            .collect();
        let handle = handle.trim_end_matches('.');

        if !handle.is_empty() && !mentions.iter().any(|m| m == handle) {
            mentions.push(handle.to_string());
        }
    }

    mentions
}

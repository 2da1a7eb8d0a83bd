//! Pure string utility functions for task titles

use crate::constants::{MAX_TITLE_LENGTH, TITLE_TRUNCATE_SUFFIX};

/// Trim a user-entered title.
///
/// Returns `None` for empty or whitespace-only input, which must never reach
/// the remote store.
///
/// # Examples
///
/// ```
/// use taskboard_domain::utils::title::normalize_title;
///
/// assert_eq!(normalize_title("  Buy milk "), Some("Buy milk".to_string()));
/// assert_eq!(normalize_title(" \t\n"), None);
/// ```
#[must_use]
pub fn normalize_title(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Shorten a title for one-line rendering.
///
/// Cuts on a character boundary and appends the truncation suffix when the
/// title is longer than [`MAX_TITLE_LENGTH`] characters.
#[must_use]
pub fn display_title(title: &str) -> String {
    if title.chars().count() <= MAX_TITLE_LENGTH {
        return title.to_string();
    }
    let keep = MAX_TITLE_LENGTH.saturating_sub(TITLE_TRUNCATE_SUFFIX.len());
    let mut shortened: String = title.chars().take(keep).collect();
    shortened.push_str(TITLE_TRUNCATE_SUFFIX);
    shortened
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_titles_are_untouched() {
        assert_eq!(display_title("Write report"), "Write report");
    }

    #[test]
    fn long_titles_are_cut_on_char_boundary() {
        let long = "é".repeat(MAX_TITLE_LENGTH + 10);
        let shown = display_title(&long);
        assert_eq!(shown.chars().count(), MAX_TITLE_LENGTH);
        assert!(shown.ends_with(TITLE_TRUNCATE_SUFFIX));
    }
}

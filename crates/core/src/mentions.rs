//! Mention extraction.
//!
//! Comments may reference other users with `@name` tokens; the extracted
//! set is stored alongside the comment so notification and rendering
//! layers never re-scan content.

use regex::Regex;

// A mention token is `@` followed by a run of non-whitespace characters.
#[allow(clippy::unwrap_used)]
static MENTION_RE: std::sync::LazyLock<Regex> =
    std::sync::LazyLock::new(|| Regex::new(r"@(\S+)").unwrap());

/// Extract all mentioned usernames from text.
///
/// Duplicates are dropped; first-seen order is preserved.
#[must_use]
#[allow(clippy::unwrap_used)] // Regex capture group 1 always exists on a match
pub fn extract_mentions(text: &str) -> Vec<String> {
    let mut seen = Vec::new();
    for cap in MENTION_RE.captures_iter(text) {
        let name = cap.get(1).unwrap().as_str();
        if !seen.iter().any(|s| s == name) {
            seen.push(name.to_string());
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_single_mention() {
        assert_eq!(extract_mentions("Hello @bob"), vec!["bob"]);
    }

    #[test]
    fn test_extract_multiple_mentions() {
        assert_eq!(
            extract_mentions("@alice thanks, @bob see above"),
            vec!["alice", "bob"]
        );
    }

    #[test]
    fn test_mentions_deduplicated() {
        assert_eq!(extract_mentions("@bob @bob @bob"), vec!["bob"]);
    }

    #[test]
    fn test_no_mentions() {
        assert!(extract_mentions("nothing to see here").is_empty());
        assert!(extract_mentions("").is_empty());
    }

    #[test]
    fn test_bare_at_is_not_a_mention() {
        assert!(extract_mentions("lonely @ sign").is_empty());
    }

    #[test]
    fn test_token_runs_to_whitespace() {
        assert_eq!(extract_mentions("ping @user-1_x!"), vec!["user-1_x!"]);
    }
}

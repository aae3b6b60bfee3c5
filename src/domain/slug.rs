use std::sync::LazyLock;

use regex::Regex;

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));
static DISALLOWED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9-]").expect("valid regex"));
static DASH_RUNS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-+").expect("valid regex"));

/// Computes a URL slug from arbitrary text.
///
/// The text is lowercased, whitespace runs become single dashes, anything
/// outside `[a-z0-9-]` is dropped, dash runs collapse, and leading or trailing
/// dashes are removed.
#[must_use]
pub fn compute_slug(text: &str) -> String {
    let lower = text.to_lowercase();
    let dashed = WHITESPACE.replace_all(&lower, "-");
    let cleaned = DISALLOWED.replace_all(&dashed, "");
    let collapsed = DASH_RUNS.replace_all(&cleaned, "-");
    collapsed.trim_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::compute_slug;

    #[test_case("Hello World", "hello-world"; "spaces")]
    #[test_case("  Leading and trailing  ", "leading-and-trailing"; "outer whitespace")]
    #[test_case("Rust: Ownership & Borrowing!", "rust-ownership-borrowing"; "punctuation")]
    #[test_case("multi---dash -- words", "multi-dash-words"; "dash runs")]
    #[test_case("Tabs\tand\nnewlines", "tabs-and-newlines"; "other whitespace")]
    #[test_case("Café crème", "caf-crme"; "non ascii dropped")]
    #[test_case("already-a-slug-2023", "already-a-slug-2023"; "idempotent")]
    #[test_case("!!!", ""; "nothing left")]
    fn computes_slug(input: &str, expected: &str) {
        assert_eq!(compute_slug(input), expected);
    }
}

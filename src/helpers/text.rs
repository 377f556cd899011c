//! Text helper functions

/// Cut `s` to at most `length` characters, appending "..." when cut
pub fn truncate(s: &str, length: usize) -> String {
    if s.chars().count() <= length {
        return s.to_string();
    }
    let truncated: String = s.chars().take(length).collect();
    format!("{}...", truncated)
}

/// Turn a technical key into a display label
///
/// # Examples
/// ```ignore
/// humanize("go_programming") // -> "Go Programming"
/// humanize("cloud-devops")   // -> "Cloud Devops"
/// ```
pub fn humanize(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut word_start = true;
    for c in s.chars() {
        let c = if c == '_' || c == '-' { ' ' } else { c };
        if c.is_whitespace() {
            out.push(c);
            word_start = true;
        } else if word_start {
            out.extend(c.to_uppercase());
            word_start = false;
        } else {
            out.extend(c.to_lowercase());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("exactly", 7), "exactly");
        assert_eq!(truncate("a longer sentence", 8), "a longer...");
        assert_eq!(truncate("héllo wörld", 5), "héllo...");
    }

    #[test]
    fn test_humanize() {
        assert_eq!(humanize("go_programming"), "Go Programming");
        assert_eq!(humanize("cloud_devops"), "Cloud Devops");
        assert_eq!(humanize("FRONT-end"), "Front End");
        assert_eq!(humanize(""), "");
        assert_eq!(humanize("Go"), "Go");
        assert_eq!(humanize("backend_web_development"), "Backend Web Development");
    }

    #[test]
    fn test_humanize_keeps_spacing() {
        assert_eq!(humanize("a__b"), "A  B");
        assert_eq!(humanize("_lead-"), " Lead ");
        assert_eq!(humanize("two  words"), "Two  Words");
    }
}

// Value extraction helpers for keyword-labelled spans
use regex::Regex;

/// Strip label separators and whitespace from the front, whitespace and
/// trailing `:`/`,` from the back. Returns `None` when nothing is left.
///
/// A leading `-` directly in front of a digit is a sign, not a separator.
pub fn clean_value(raw: &str) -> Option<String> {
    let mut rest = raw;
    loop {
        let trimmed = rest.trim_start_matches(|c: char| c.is_whitespace() || c == ':' || c == ',');
        match trimmed.strip_prefix('-') {
            Some(after) if !after.starts_with(|c: char| c.is_ascii_digit()) => rest = after,
            _ => {
                rest = trimmed;
                break;
            }
        }
    }

    let cleaned = rest.trim_end_matches(|c: char| c.is_whitespace() || c == ':' || c == ',');
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_string())
    }
}

/// Text that follows a keyword ending at byte `keyword_end`, e.g.
/// "Name: John Smith" -> "John Smith"
pub fn residual_after(text: &str, keyword_end: usize) -> Option<String> {
    text.get(keyword_end..).and_then(clean_value)
}

/// Narrow a value to the first match of `pattern`, taking capture group 1
/// when the pattern has one
pub fn narrow_to_pattern(value: &str, pattern: &Regex) -> Option<String> {
    let caps = pattern.captures(value)?;
    let m = caps.get(1).or_else(|| caps.get(0))?;
    clean_value(m.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_residual_strips_separators() {
        assert_eq!(residual_after("Name: John Smith", 4), Some("John Smith".to_string()));
        assert_eq!(residual_after("DOB - 1990-01-02", 3), Some("1990-01-02".to_string()));
        assert_eq!(residual_after("Phone :", 5), None);
        assert_eq!(residual_after("Phone", 5), None);
    }

    #[test]
    fn test_residual_keeps_sign_and_trailing_hyphen() {
        assert_eq!(residual_after("Balance: -500", 7), Some("-500".to_string()));
        assert_eq!(residual_after("Name - John", 4), Some("John".to_string()));
        assert_eq!(residual_after("Name-John", 4), Some("John".to_string()));
        assert_eq!(residual_after("Ref: AB-12-", 3), Some("AB-12-".to_string()));
        assert_eq!(residual_after("Age - ", 3), None);
    }

    #[test]
    fn test_residual_keeps_inner_separators() {
        assert_eq!(
            residual_after("Address: 12, MG Road,", 7),
            Some("12, MG Road".to_string())
        );
    }

    #[test]
    fn test_narrow_prefers_first_group() {
        let age = Regex::new(r"(?i)\b(\d{1,3})\s*(?:years?|yrs?)?\b").unwrap();
        assert_eq!(narrow_to_pattern("34 years", &age), Some("34".to_string()));
        assert_eq!(narrow_to_pattern("unknown", &age), None);

        let id = Regex::new(r"\b[A-Z0-9]{4,}\b").unwrap();
        assert_eq!(narrow_to_pattern("no. ABCD1234 issued", &id), Some("ABCD1234".to_string()));
    }
}

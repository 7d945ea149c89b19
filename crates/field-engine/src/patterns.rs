//! Regex patterns and keyword search used by matching and validation

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use shared_types::DataType;

lazy_static! {
    /// Indian mobile number, optional +91 prefix, optional space/hyphen grouping
    static ref PHONE_PATTERN: Regex =
        Regex::new(r"^(?:\+?91[\s-]?)?[6-9]\d{2}[\s-]?\d{3}[\s-]?\d{4}$").unwrap();

    static ref NUMBER_PATTERN: Regex = Regex::new(r"^[+-]?\d+(?:[.,]\d+)?$").unwrap();

    static ref ALPHANUMERIC_PATTERN: Regex = Regex::new(r"(?i)^[A-Z0-9]{4,}$").unwrap();

    static ref EMAIL_PATTERN: Regex =
        Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").unwrap();

    /// d/m/yyyy or d/m/yy, '/' or '-' separated
    static ref DAY_FIRST_DATE: Regex =
        Regex::new(r"^(\d{1,2})[/-](\d{1,2})[/-](\d{4}|\d{2})$").unwrap();

    /// yyyy/m/d, '/' or '-' separated
    static ref YEAR_FIRST_DATE: Regex = Regex::new(r"^(\d{4})[/-](\d{1,2})[/-](\d{1,2})$").unwrap();

    /// Date-shaped tokens inside free text
    pub static ref DATE_IN_TEXT: Regex = Regex::new(
        r"\b(?:\d{1,2}[/-]\d{1,2}[/-](?:\d{4}|\d{2})|\d{4}[/-]\d{1,2}[/-]\d{1,2})\b"
    )
    .unwrap();
}

/// How a keyword must appear in span text to count as a hit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeywordMode {
    /// Anywhere in the text
    #[default]
    Substring,
    /// Only when not glued to other letters or digits
    WordBoundary,
}

/// Byte range of a keyword hit in the original (not lowercased) text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeywordHit {
    pub start: usize,
    pub end: usize,
}

/// Lowercased copy of a string that remembers where each byte came from,
/// so hits in the folded text map back onto the original.
struct CaseFolded {
    folded: String,
    origin: Vec<usize>, // folded byte -> original byte, plus one past the end
}

impl CaseFolded {
    fn new(text: &str) -> Self {
        let mut folded = String::with_capacity(text.len());
        let mut origin = Vec::with_capacity(text.len() + 1);
        for (idx, c) in text.char_indices() {
            for lower in c.to_lowercase() {
                folded.push(lower);
                origin.extend(std::iter::repeat(idx).take(lower.len_utf8()));
            }
        }
        origin.push(text.len());
        Self { folded, origin }
    }

    /// Map a folded end offset back to the original text. An end inside a
    /// multi-char lowercase expansion rounds up to the next original char.
    fn original_end(&self, folded_end: usize, text: &str) -> usize {
        if folded_end >= self.folded.len() {
            return text.len();
        }
        let at = self.origin[folded_end];
        if folded_end > 0 && self.origin[folded_end - 1] == at {
            text[at..]
                .chars()
                .next()
                .map(|c| at + c.len_utf8())
                .unwrap_or(text.len())
        } else {
            at
        }
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn at_word_boundary(haystack: &str, start: usize, end: usize) -> bool {
    let before = haystack[..start].chars().next_back();
    let after = haystack[end..].chars().next();
    !before.is_some_and(is_word_char) && !after.is_some_and(is_word_char)
}

/// Find the earliest keyword hit in `text`. Keywords must already be
/// lowercased. When two keywords start at the same place the longer wins.
pub fn find_keyword(text: &str, keywords: &[String], mode: KeywordMode) -> Option<KeywordHit> {
    let folded = CaseFolded::new(text);
    let haystack = folded.folded.as_str();

    let mut best: Option<(usize, usize)> = None;
    for keyword in keywords.iter().filter(|k| !k.is_empty()) {
        let hit = haystack
            .match_indices(keyword.as_str())
            .map(|(start, m)| (start, start + m.len()))
            .find(|&(start, end)| match mode {
                KeywordMode::Substring => true,
                KeywordMode::WordBoundary => at_word_boundary(haystack, start, end),
            });

        if let Some((start, end)) = hit {
            let better = match best {
                None => true,
                Some((best_start, best_end)) => {
                    start < best_start || (start == best_start && end > best_end)
                }
            };
            if better {
                best = Some((start, end));
            }
        }
    }

    best.map(|(start, end)| KeywordHit {
        start: folded.origin[start],
        end: folded.original_end(end, text),
    })
}

/// Check whether text contains any of the (lowercased) keywords
pub fn contains_keyword(text: &str, keywords: &[String], mode: KeywordMode) -> bool {
    find_keyword(text, keywords, mode).is_some()
}

/// Parse a d/m/y or y/m/d date, rejecting impossible calendar dates
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();

    if let Some(caps) = YEAR_FIRST_DATE.captures(value) {
        let year = caps[1].parse().ok()?;
        let month = caps[2].parse().ok()?;
        let day = caps[3].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    if let Some(caps) = DAY_FIRST_DATE.captures(value) {
        let day = caps[1].parse().ok()?;
        let month = caps[2].parse().ok()?;
        let year: i32 = caps[3].parse().ok()?;
        let year = if caps[3].len() == 2 {
            // Same pivot as strptime's %y
            if year < 69 {
                2000 + year
            } else {
                1900 + year
            }
        } else {
            year
        };
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    None
}

/// All real calendar dates found in free text
pub fn find_dates(text: &str) -> Vec<(String, NaiveDate)> {
    DATE_IN_TEXT
        .find_iter(text)
        .filter_map(|m| parse_date(m.as_str()).map(|d| (m.as_str().to_string(), d)))
        .collect()
}

/// Whether `value` has the shape its data type requires. `Text` has no
/// pattern and always passes here; its character set is checked separately.
pub fn matches_data_type(data_type: DataType, value: &str) -> bool {
    let value = value.trim();
    match data_type {
        DataType::Text => true,
        DataType::Number => NUMBER_PATTERN.is_match(value),
        DataType::Phone => PHONE_PATTERN.is_match(value),
        DataType::Date => parse_date(value).is_some(),
        DataType::Alphanumeric => ALPHANUMERIC_PATTERN.is_match(value),
        DataType::Email => EMAIL_PATTERN.is_match(value),
    }
}

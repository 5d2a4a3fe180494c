//! Regex fallback for loosely structured replies
//!
//! Recognizes `<title> <sep> <DD/MM/YYYY HH:MM> <sep> <amount>` where the
//! separator is a hyphen or a period with optional whitespace around it.
//! The match is anchored at the start and need not cover the whole text.

use once_cell::sync::Lazy;
use regex::Regex;
use tja_common::Reading;

static READING_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(.*?)\s*[-.]\s*(\d{2}/\d{2}/\d{4} \d{2}:\d{2})\s*[-.]\s*(\d+)")
        .unwrap_or_else(|e| panic!("reading pattern is a valid regex: {e}"))
});

/// Extract a reading from `title - date - amount` text
///
/// Returns `None` when the text does not match, or when the captured title
/// is blank (a reading needs both title and date).
pub fn parse_pattern(text: &str) -> Option<Reading> {
    let caps = READING_PATTERN.captures(text)?;

    let title = caps.get(1).map(|m| m.as_str().trim()).unwrap_or_default();
    let date = caps.get(2).map(|m| m.as_str().trim()).unwrap_or_default();
    let traffic = caps.get(3).map(|m| parse_traffic(m.as_str())).unwrap_or(0);

    let reading = Reading::new(title, date, traffic);
    reading.is_valid().then_some(reading)
}

/// Parse a traffic amount, defaulting to 0 for anything non-numeric
pub fn parse_traffic(text: &str) -> i32 {
    text.trim().parse().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hyphen_separated() {
        let reading = parse_pattern("Main Street Camera - 25/11/2024 11:20 - 60").unwrap();
        assert_eq!(reading, Reading::new("Main Street Camera", "25/11/2024 11:20", 60));
    }

    #[test]
    fn period_separated() {
        let reading = parse_pattern("Highway Entrance . 03/04/2024 08:30 . 25").unwrap();
        assert_eq!(reading, Reading::new("Highway Entrance", "03/04/2024 08:30", 25));
    }

    #[test]
    fn separators_without_spaces() {
        let reading = parse_pattern("TF-1 Norte-12/06/2025 18:47-7").unwrap();
        assert_eq!(reading.title, "TF-1 Norte");
        assert_eq!(reading.date, "12/06/2025 18:47");
        assert_eq!(reading.traffic, 7);
    }

    #[test]
    fn trailing_text_is_ignored() {
        let reading = parse_pattern("Cam - 01/01/2024 12:00 - 15 vehicles visible").unwrap();
        assert_eq!(reading.traffic, 15);
    }

    #[test]
    fn no_structure_declines() {
        assert!(parse_pattern("Invalid pattern without proper structure").is_none());
    }

    #[test]
    fn wrong_date_shape_declines() {
        assert!(parse_pattern("Cam - 2024-01-01 12:00 - 15").is_none());
    }

    #[test]
    fn blank_title_declines() {
        assert!(parse_pattern(" - 25/11/2024 11:20 - 60").is_none());
    }

    #[test]
    fn oversized_amount_defaults_to_zero() {
        let reading = parse_pattern("Cam - 25/11/2024 11:20 - 99999999999").unwrap();
        assert_eq!(reading.traffic, 0);
    }

    #[test]
    fn traffic_text_defaults() {
        assert_eq!(parse_traffic("42"), 42);
        assert_eq!(parse_traffic(" 77 \n"), 77);
        assert_eq!(parse_traffic("abc"), 0);
        assert_eq!(parse_traffic(""), 0);
    }
}

//! Utility functions for label canonicalization, text cleanup, and timestamps.
//!
//! This module provides helper functions used throughout the application:
//! - Canonical keys for map and event labels
//! - Minimal HTML entity decoding for regex-extracted text
//! - Millisecond timestamp conversion
//! - String truncation for logging

use chrono::{DateTime, Utc};

/// Convert a free-text label to a canonical key.
///
/// Trims, collapses whitespace runs to one space, uppercases, drops every
/// character outside `A-Z`, `0-9`, space and `_`, then turns spaces into `_`.
/// Keeping `_` makes the function idempotent: a key maps to itself.
///
/// Never fails: garbage input yields an empty or partial key.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(canonical_key("  Stella   Montis "), "STELLA_MONTIS");
/// assert_eq!(canonical_key("Dam - East"), "DAM__EAST");
/// assert_eq!(canonical_key("STELLA_MONTIS"), "STELLA_MONTIS");
/// ```
pub fn canonical_key(label: &str) -> String {
    label
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
        .chars()
        .filter_map(|c| match c {
            'A'..='Z' | '0'..='9' | '_' => Some(c),
            ' ' => Some('_'),
            _ => None,
        })
        .collect()
}

/// Decode the handful of HTML entities that show up in card labels.
///
/// Only used on text pulled out by regex; the DOM extractor gets decoded
/// text from the parser already. Unknown entities are left as-is.
pub fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    s.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

/// Convert epoch milliseconds to a UTC timestamp.
///
/// Returns `None` when the value is outside chrono's representable range.
pub fn datetime_from_ms(ms: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(ms)
}

/// Truncate a string for logging purposes.
///
/// Long strings are cut at a char boundary at or below `max` bytes with
/// `"…(+N bytes)"` appended.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_canonical_key_known_labels() {
        assert_eq!(canonical_key("Stella Montis"), "STELLA_MONTIS");
        assert_eq!(canonical_key("Spaceport"), "SPACEPORT");
        assert_eq!(canonical_key("Blue Gate"), "BLUE_GATE");
        assert_eq!(canonical_key("Buried City"), "BURIED_CITY");
        assert_eq!(canonical_key("Night Raid"), "NIGHT_RAID");
        assert_eq!(canonical_key("Electromagnetic Storm"), "ELECTROMAGNETIC_STORM");
        assert_eq!(canonical_key("Cold Snap"), "COLD_SNAP");
    }

    #[test]
    fn test_canonical_key_whitespace_and_punctuation() {
        assert_eq!(canonical_key("  night \t\n raid  "), "NIGHT_RAID");
        assert_eq!(canonical_key("Harvester's Lair!"), "HARVESTERS_LAIR");
        assert_eq!(canonical_key("Bird-City"), "BIRDCITY");
        assert_eq!(canonical_key("Zone 51"), "ZONE_51");
        assert_eq!(canonical_key("Dam - East"), "DAM__EAST");
        assert_eq!(canonical_key("A !"), "A_");
        assert_eq!(canonical_key("__x__"), "__X__");
    }

    #[test]
    fn test_canonical_key_garbage_input() {
        assert_eq!(canonical_key(""), "");
        assert_eq!(canonical_key("   "), "");
        assert_eq!(canonical_key(" ! "), "");
        assert_eq!(canonical_key("!!!"), "");
        assert_eq!(canonical_key("ステラ・モンティス"), "");
        assert_eq!(canonical_key("Café 2"), "CAF_2");
    }

    #[test]
    fn test_canonical_key_is_idempotent() {
        let samples = [
            "Stella Montis",
            "  a  _ b ",
            "__x__",
            "Dam - East",
            "Harvester's Lair!",
            "ß straße",
            "Café 2",
            "",
        ];
        for s in samples {
            let once = canonical_key(s);
            assert_eq!(canonical_key(&once), once, "input {s:?}");
        }

        let alphabet: Vec<char> = "aZ9 _-'\t!éß·".chars().collect();
        let mut rng = StdRng::seed_from_u64(0x5eed);
        for _ in 0..2_000 {
            let len = rng.random_range(0..16);
            let s: String = (0..len)
                .map(|_| alphabet[rng.random_range(0..alphabet.len())])
                .collect();
            let once = canonical_key(&s);
            assert_eq!(canonical_key(&once), once, "input {s:?}");
        }
    }

    #[test]
    fn test_decode_entities() {
        assert_eq!(decode_entities("Night &amp; Day"), "Night & Day");
        assert_eq!(decode_entities("Harvester&#39;s"), "Harvester's");
        assert_eq!(decode_entities("&amp;lt;"), "&lt;");
        assert_eq!(decode_entities("plain"), "plain");
    }

    #[test]
    fn test_datetime_from_ms() {
        let dt = datetime_from_ms(1_700_000_000_000).unwrap();
        assert_eq!(dt.timestamp(), 1_700_000_000);
        assert!(datetime_from_ms(i64::MAX).is_none());
    }

    #[test]
    fn test_truncate_for_log() {
        assert_eq!(truncate_for_log("short", 100), "short");
        let s = "a".repeat(500);
        let result = truncate_for_log(&s, 100);
        assert!(result.starts_with(&"a".repeat(100)));
        assert!(result.contains("…(+400 bytes)"));
        assert_eq!(truncate_for_log("ééé", 3), "é…(+4 bytes)");
    }
}

//! Pattern-matching extractor over raw markup.
//!
//! A card block runs from `<div class="event-card` to the first run of three
//! closing `</div>` tags. Blocks are produced lazily as the boundary pattern
//! advances through the document.

use super::{CardFields, Candidate, OccurrenceExtractor};
use crate::utils::decode_entities;
use once_cell::sync::Lazy;
use regex::Regex;

static CARD_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)<div class="event-card.*?</div>\s*</div>\s*</div>"#).unwrap()
});
static DATA_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r#"data-id="([^"]+)""#).unwrap());
static DATA_START: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"data-start-ms="([^"]+)""#).unwrap());
static DATA_END: Lazy<Regex> = Lazy::new(|| Regex::new(r#"data-end-ms="([^"]+)""#).unwrap());
static DATA_MAP: Lazy<Regex> = Lazy::new(|| Regex::new(r#"data-map="([^"]+)""#).unwrap());
static PARAGRAPH: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<p[^>]*>([^<]+)</p>").unwrap());
static HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<h4[^>]*>([^<]+)</h4>").unwrap());

#[derive(Debug, Default, Clone, Copy)]
pub struct RegexCardExtractor;

impl OccurrenceExtractor for RegexCardExtractor {
    fn name(&self) -> &'static str {
        "regex"
    }

    fn candidates<'a>(&'a self, document: &'a str) -> Box<dyn Iterator<Item = Candidate> + 'a> {
        Box::new(
            CARD_BLOCK
                .find_iter(document)
                .map(|block| read_block(block.as_str())),
        )
    }
}

fn capture(re: &Regex, block: &str) -> Option<String> {
    re.captures(block)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

fn capture_text(re: &Regex, block: &str) -> Option<String> {
    capture(re, block).map(|s| decode_entities(s.trim()))
}

fn read_block(block: &str) -> Candidate {
    let map_label = capture(&DATA_MAP, block)
        .map(|s| decode_entities(&s))
        .filter(|s| !s.trim().is_empty())
        .or_else(|| capture_text(&PARAGRAPH, block));

    CardFields {
        external_id: capture(&DATA_ID, block),
        start_ms: capture(&DATA_START, block),
        end_ms: capture(&DATA_END, block),
        map_label,
        event_label: capture_text(&HEADING, block),
    }
    .into_candidate()
}

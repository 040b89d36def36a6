//! Fetching the upstream schedule page and pulling event cards out of it.
//!
//! The page layout is owned by a third party and changes without notice, so
//! matching is hidden behind [`OccurrenceExtractor`]. The normalizer and the
//! assembler only ever see [`RawEventCard`]s.
//!
//! # Strategies
//!
//! | Kind | Module | Method |
//! |------|--------|--------|
//! | `regex` | [`regex_cards`] | Pattern matching over the raw markup (default) |
//! | `dom` | [`dom_cards`] | CSS selectors over a parsed document |
//!
//! Both read the same fields from each `event-card` block:
//! `data-id`, `data-start-ms`, `data-end-ms`, the map from `data-map` (or the
//! first `<p>`), and the event name from the first `<h4>`. A block missing
//! any of them is skipped, never an error.

use crate::models::RawEventCard;
use clap::ValueEnum;
use serde::Deserialize;
use std::fmt;
use tracing::{debug, info, instrument};

pub mod dom_cards;
pub mod fetch;
pub mod regex_cards;

/// Outcome of probing one candidate block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Candidate {
    Card(RawEventCard),
    Skip(SkipReason),
}

/// Why a candidate block did not produce a card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    Missing(&'static str),
    Unparsable { field: &'static str, value: String },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Missing(field) => write!(f, "missing {field}"),
            SkipReason::Unparsable { field, value } => write!(f, "unparsable {field}: {value:?}"),
        }
    }
}

/// Yields candidate event cards from a raw document.
pub trait OccurrenceExtractor {
    fn name(&self) -> &'static str;

    fn candidates<'a>(&'a self, document: &'a str) -> Box<dyn Iterator<Item = Candidate> + 'a>;
}

/// Selectable matching strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractorKind {
    #[default]
    Regex,
    Dom,
}

impl ExtractorKind {
    pub fn build(self) -> Box<dyn OccurrenceExtractor> {
        match self {
            ExtractorKind::Regex => Box::new(regex_cards::RegexCardExtractor),
            ExtractorKind::Dom => Box::new(dom_cards::DomCardExtractor),
        }
    }
}

/// Fields found in one candidate block, before validation.
#[derive(Debug, Default)]
pub(crate) struct CardFields {
    pub external_id: Option<String>,
    pub start_ms: Option<String>,
    pub end_ms: Option<String>,
    pub map_label: Option<String>,
    pub event_label: Option<String>,
}

impl CardFields {
    /// Validate the fields into a card. Blank values count as missing.
    pub(crate) fn into_candidate(self) -> Candidate {
        fn present(v: Option<String>) -> Option<String> {
            v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
        }

        let Some(external_id) = present(self.external_id) else {
            return Candidate::Skip(SkipReason::Missing("data-id"));
        };
        let Some(start_raw) = present(self.start_ms) else {
            return Candidate::Skip(SkipReason::Missing("data-start-ms"));
        };
        let Some(end_raw) = present(self.end_ms) else {
            return Candidate::Skip(SkipReason::Missing("data-end-ms"));
        };
        let Some(map_label) = present(self.map_label) else {
            return Candidate::Skip(SkipReason::Missing("map"));
        };
        let Some(event_label) = present(self.event_label) else {
            return Candidate::Skip(SkipReason::Missing("event"));
        };

        let Ok(start_ms) = start_raw.parse::<i64>() else {
            return Candidate::Skip(SkipReason::Unparsable {
                field: "data-start-ms",
                value: start_raw,
            });
        };
        let Ok(end_ms) = end_raw.parse::<i64>() else {
            return Candidate::Skip(SkipReason::Unparsable {
                field: "data-end-ms",
                value: end_raw,
            });
        };

        Candidate::Card(RawEventCard {
            external_id,
            start_ms,
            end_ms,
            map_label,
            event_label,
        })
    }
}

/// Cards pulled from one document plus the number of skipped candidates.
#[derive(Debug, Default)]
pub struct Extraction {
    pub cards: Vec<RawEventCard>,
    pub skipped: usize,
}

/// Run an extractor over a document and collect the usable cards.
#[instrument(level = "info", skip_all, fields(extractor = extractor.name(), bytes = document.len()))]
pub fn extract_cards(extractor: &dyn OccurrenceExtractor, document: &str) -> Extraction {
    let mut out = Extraction::default();
    for candidate in extractor.candidates(document) {
        match candidate {
            Candidate::Card(card) => out.cards.push(card),
            Candidate::Skip(reason) => {
                debug!(%reason, "Skipping event card");
                out.skipped += 1;
            }
        }
    }
    info!(
        parsed = out.cards.len(),
        skipped = out.skipped,
        "Extracted event cards"
    );
    out
}

#[cfg(test)]
pub(crate) mod fixtures {
    /// A trimmed copy of the upstream markup: two good cards, one with the
    /// map only in a `<p>`, one missing its start, one with a bad end.
    pub const PAGE: &str = r#"<!doctype html>
<html><body>
<section class="events">
  <div class="event-card upcoming" data-id="101" data-start-ms="1700000000000" data-end-ms="1700003600000" data-map="Stella Montis">
    <div class="event-body">
      <div class="event-title"><h4>Night Raid</h4><p>Stella Montis</p></div>
    </div>
  </div>
  <div class="event-card" data-id="102" data-start-ms="1700007200000" data-end-ms="1700010800000">
    <div class="event-body">
      <div class="event-title"><h4 class="name"> Electromagnetic   Storm </h4><p class="map">Blue Gate</p></div>
    </div>
  </div>
  <div class="event-card" data-id="103" data-end-ms="1700010800000" data-map="Dam">
    <div class="event-body">
      <div class="event-title"><h4>Cold Snap</h4></div>
    </div>
  </div>
  <div class="event-card" data-id="104" data-start-ms="1700010800000" data-end-ms="soon" data-map="Dam">
    <div class="event-body">
      <div class="event-title"><h4>Harvester</h4></div>
    </div>
  </div>
</section>
</body></html>
"#;
}

//! Data models for scraped event cards and the published feed.
//!
//! - [`RawEventCard`]: one record as it appears in the upstream HTML
//! - [`NormalizedEvent`]: a card moved onto the current cycle, with canonical keys
//! - [`EventFeed`]: the `events.json` document consumed by the viewer
//!
//! Feed fields are camelCase on the wire to match what the viewer reads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single event card as scraped from the upstream page.
///
/// `start_ms`/`end_ms` are the sample occurrence shown when the page was
/// rendered, not necessarily today's window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEventCard {
    /// Upstream `data-id` attribute.
    pub external_id: String,
    pub start_ms: i64,
    pub end_ms: i64,
    /// Map name in source text, e.g. "Stella Montis".
    pub map_label: String,
    /// Event name in source text, e.g. "Night Raid".
    pub event_label: String,
}

/// An event occurrence on the current cycle.
///
/// Invariant: `end_at > start_at`, and the span equals the sample span
/// (floored at one millisecond).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedEvent {
    pub id: String,
    pub event_type: String,
    pub map: String,
    #[serde(with = "iso_millis")]
    pub start_at: DateTime<Utc>,
    #[serde(with = "iso_millis")]
    pub end_at: DateTime<Utc>,
}

/// The `events.json` document.
///
/// Built fresh on every run and written over the previous one.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventFeed {
    #[serde(with = "iso_millis")]
    pub updated_at: DateTime<Utc>,
    /// Origin URL the events were scraped from.
    pub source: String,
    pub count: usize,
    /// Ascending by `start_at`.
    pub events: Vec<NormalizedEvent>,
}

/// ISO-8601 with millisecond precision and a `Z` suffix, e.g.
/// `2023-11-14T22:13:20.000Z`.
mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(dt: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&dt.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

//! Turning extracted cards into the feed document.
//!
//! Each card gets canonical keys and its current-cycle window, then
//! occurrences are collapsed by `(eventType, map, start, end)` and sorted by
//! start. Upstream ids are ignored for dedup: the page repeats the same
//! occurrence under different ids.

use crate::cycle::CyclePolicy;
use crate::models::{EventFeed, NormalizedEvent, RawEventCard};
use crate::utils::{canonical_key, datetime_from_ms};
use chrono::{DateTime, Utc};
use itertools::Itertools;
use tracing::{debug, info, instrument};

/// Inputs that are fixed for the whole run.
#[derive(Debug, Clone)]
pub struct AssembleContext<'a> {
    pub policy: CyclePolicy,
    /// Instant the windows are resolved against.
    pub now: DateTime<Utc>,
    /// Stamped into `updatedAt`.
    pub generated_at: DateTime<Utc>,
    pub source: &'a str,
    pub id_prefix: &'a str,
}

/// Counters reported alongside the assembled feed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AssembleStats {
    /// Cards whose resolved window cannot be represented as a timestamp.
    pub out_of_range: usize,
    pub duplicates: usize,
}

/// Normalize one card onto the current cycle.
///
/// Returns `None` if the resolved window falls outside the representable
/// timestamp range.
pub fn normalize_card(card: &RawEventCard, ctx: &AssembleContext<'_>) -> Option<NormalizedEvent> {
    let now_ms = ctx.now.timestamp_millis();
    let window = ctx.policy.resolve(card.start_ms, card.end_ms, now_ms);
    debug!(
        external_id = %card.external_id,
        start_ms = window.start_ms,
        duration_ms = window.duration_ms(),
        active = window.is_active_at(now_ms),
        "Resolved current window"
    );

    Some(NormalizedEvent {
        id: format!("{}-{}-{}", ctx.id_prefix, card.external_id, window.start_ms),
        event_type: canonical_key(&card.event_label),
        map: canonical_key(&card.map_label),
        start_at: datetime_from_ms(window.start_ms)?,
        end_at: datetime_from_ms(window.end_ms)?,
    })
}

/// Build the feed from cards in scan order.
///
/// The first card for a given `(eventType, map, start, end)` wins. Sorting is
/// stable, so events starting at the same instant keep scan order.
#[instrument(level = "info", skip_all, fields(cards = cards.len()))]
pub fn assemble_feed(cards: &[RawEventCard], ctx: &AssembleContext<'_>) -> (EventFeed, AssembleStats) {
    let mut stats = AssembleStats::default();

    let normalized: Vec<NormalizedEvent> = cards
        .iter()
        .filter_map(|card| {
            let event = normalize_card(card, ctx);
            if event.is_none() {
                debug!(external_id = %card.external_id, "Resolved window out of range; skipping");
                stats.out_of_range += 1;
            }
            event
        })
        .collect();

    let before = normalized.len();
    let mut events: Vec<NormalizedEvent> = normalized
        .into_iter()
        .unique_by(|e| (e.event_type.clone(), e.map.clone(), e.start_at, e.end_at))
        .collect();
    stats.duplicates = before - events.len();

    events.sort_by_key(|e| e.start_at);

    info!(
        count = events.len(),
        duplicates = stats.duplicates,
        out_of_range = stats.out_of_range,
        "Assembled event feed"
    );

    let feed = EventFeed {
        updated_at: ctx.generated_at,
        source: ctx.source.to_string(),
        count: events.len(),
        events,
    };
    (feed, stats)
}

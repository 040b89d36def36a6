//! CSS-selector extractor over a parsed document.

use super::{CardFields, Candidate, OccurrenceExtractor};
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

static CARD: Lazy<Selector> = Lazy::new(|| Selector::parse("div.event-card").unwrap());
static PARAGRAPH: Lazy<Selector> = Lazy::new(|| Selector::parse("p").unwrap());
static HEADING: Lazy<Selector> = Lazy::new(|| Selector::parse("h4").unwrap());

#[derive(Debug, Default, Clone, Copy)]
pub struct DomCardExtractor;

impl OccurrenceExtractor for DomCardExtractor {
    fn name(&self) -> &'static str {
        "dom"
    }

    fn candidates<'a>(&'a self, document: &'a str) -> Box<dyn Iterator<Item = Candidate> + 'a> {
        // `Html` is not borrowable past this call, so cards are read eagerly.
        let html = Html::parse_document(document);
        let found: Vec<Candidate> = html.select(&CARD).map(read_card).collect();
        Box::new(found.into_iter())
    }
}

fn first_text(card: &ElementRef<'_>, selector: &Selector) -> Option<String> {
    card.select(selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
}

fn read_card(card: ElementRef<'_>) -> Candidate {
    let attr = |name: &str| card.value().attr(name).map(str::to_string);

    let map_label = attr("data-map")
        .filter(|s| !s.trim().is_empty())
        .or_else(|| first_text(&card, &PARAGRAPH));

    CardFields {
        external_id: attr("data-id"),
        start_ms: attr("data-start-ms"),
        end_ms: attr("data-end-ms"),
        map_label,
        event_label: first_text(&card, &HEADING),
    }
    .into_candidate()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrapers::fixtures::PAGE;
    use crate::scrapers::SkipReason;

    #[test]
    fn test_fixture_cards() {
        let out: Vec<_> = DomCardExtractor.candidates(PAGE).collect();
        assert_eq!(out.len(), 4);

        let Candidate::Card(second) = &out[1] else {
            panic!("expected a card");
        };
        assert_eq!(second.external_id, "102");
        assert_eq!(second.map_label, "Blue Gate");
        assert_eq!(second.event_label, "Electromagnetic   Storm");
        assert_eq!(out[2], Candidate::Skip(SkipReason::Missing("data-start-ms")));
    }

    #[test]
    fn test_entities_decoded_by_parser() {
        let doc = r#"<div class="event-card" data-id="5" data-start-ms="1" data-end-ms="2" data-map="Dam &amp; Lake"><h4>Bird&nbsp;City</h4></div>"#;
        let out: Vec<_> = DomCardExtractor.candidates(doc).collect();
        let Candidate::Card(card) = &out[0] else {
            panic!("expected a card");
        };
        assert_eq!(card.map_label, "Dam & Lake");
        assert_eq!(card.event_label, "Bird\u{a0}City");
    }
}

//! Page parsers for the ESPNcricinfo markup.
//!
//! Everything here is pure: HTML in, values out. The selectors track the
//! current site layout and are expected to change with it.

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use std::sync::OnceLock;
use url::Url;

use crate::error::{CricinfoError, Result};
use crate::types::{MatchCard, MatchIds};

/// Match cards for live and finished matches.
pub const MATCH_CARD_SELECTOR: &str = "div.ds-px-4.ds-py-3";

/// Upcoming fixtures are sometimes rendered in a separate container.
pub const UPCOMING_CARD_SELECTOR: &str = "div.ds-p-4";

const CARD_TITLE_SELECTOR: &str = "p.ds-text-tight-m";
const CARD_STATUS_SELECTOR: &str = "span.ds-text-tight-xs";
const CARD_LINK_SELECTOR: &str = "a";

/// Status text given to cards found in the upcoming container.
pub const UPCOMING_STATUS: &str = "UPCOMING";

/// Commentary containers, current layout first.
pub const DEFAULT_COMMENTARY_SELECTORS: &[&str] = &["div.ds-p-3", "div.ds-text-typo"];

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| CricinfoError::Selector {
        selector: css.to_string(),
        reason: e.to_string(),
    })
}

/// Collapse runs of whitespace and trim.
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn element_text(el: ElementRef<'_>) -> String {
    normalize_text(&el.text().collect::<String>())
}

fn first_text(card: ElementRef<'_>, sel: &Selector) -> Option<String> {
    card.select(sel)
        .next()
        .map(element_text)
        .filter(|t| !t.is_empty())
}

fn first_link(card: ElementRef<'_>, sel: &Selector, base: &Url) -> Option<String> {
    card.select(sel)
        .find_map(|a| a.value().attr("href"))
        .and_then(|href| base.join(href.trim()).ok())
        .map(String::from)
}

/// Parse the live scores page into match cards, in page order.
///
/// Cards missing a title, status or link are skipped. Cards from the
/// upcoming container get [`UPCOMING_STATUS`] and are skipped when an
/// upcoming card with the same title was already seen.
pub fn parse_match_cards(html: &str, base: &Url) -> Result<Vec<MatchCard>> {
    let document = Html::parse_document(html);
    let card_sel = selector(MATCH_CARD_SELECTOR)?;
    let upcoming_sel = selector(UPCOMING_CARD_SELECTOR)?;
    let title_sel = selector(CARD_TITLE_SELECTOR)?;
    let status_sel = selector(CARD_STATUS_SELECTOR)?;
    let link_sel = selector(CARD_LINK_SELECTOR)?;

    let mut cards = Vec::new();
    for card in document.select(&card_sel) {
        let Some(title) = first_text(card, &title_sel) else {
            continue;
        };
        let Some(status) = first_text(card, &status_sel) else {
            continue;
        };
        let Some(url) = first_link(card, &link_sel, base) else {
            continue;
        };
        cards.push(MatchCard::new(title, status, url));
    }

    let mut upcoming_titles: HashSet<String> = HashSet::new();
    for card in document.select(&upcoming_sel) {
        let Some(title) = first_text(card, &title_sel) else {
            continue;
        };
        let Some(url) = first_link(card, &link_sel, base) else {
            continue;
        };
        if upcoming_titles.insert(title.clone()) {
            cards.push(MatchCard::new(title, UPCOMING_STATUS, url));
        }
    }

    tracing::debug!(cards = cards.len(), "Parsed match cards");
    Ok(cards)
}

/// Extract commentary lines from a match page.
///
/// Tries each container selector in order; the first container that yields
/// any text wins. Every element below the container contributes its
/// normalized text once, in document order.
pub fn parse_commentary_texts<S: AsRef<str>>(html: &str, selectors: &[S]) -> Result<Vec<String>> {
    let document = Html::parse_document(html);

    for css in selectors {
        let sel = selector(css.as_ref())?;
        let Some(container) = document.select(&sel).next() else {
            continue;
        };

        let mut seen = HashSet::new();
        let mut texts = Vec::new();
        for node in container.descendants().skip(1) {
            let Some(el) = ElementRef::wrap(node) else {
                continue;
            };
            if matches!(el.value().name(), "script" | "style" | "noscript") {
                continue;
            }
            let text = element_text(el);
            if !text.is_empty() && seen.insert(text.clone()) {
                texts.push(text);
            }
        }

        if !texts.is_empty() {
            tracing::debug!(selector = %css.as_ref(), lines = texts.len(), "Parsed commentary");
            return Ok(texts);
        }
    }

    Ok(Vec::new())
}

/// Document `<title>`, if present and non-empty.
pub fn parse_title(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let sel = Selector::parse("title").ok()?;
    document
        .select(&sel)
        .next()
        .map(element_text)
        .filter(|t| !t.is_empty())
}

fn trailing_number(segment: &str) -> Option<u64> {
    static TRAILING: OnceLock<Regex> = OnceLock::new();
    let re = TRAILING.get_or_init(|| Regex::new(r"(?:^|-)(\d+)$").expect("static regex"));
    re.captures(segment)?.get(1)?.as_str().parse().ok()
}

/// Series and match ids from a match URL such as
/// `/series/ipl-2024-1410320/csk-vs-rcb-1st-match-1422119/live-cricket-score`.
///
/// The last pair of adjacent path segments that both end in a number wins.
pub fn match_ids(url: &str) -> Option<MatchIds> {
    let parsed = Url::parse(url)
        .or_else(|_| Url::parse("https://placeholder.invalid/")?.join(url))
        .ok()?;
    let ids: Vec<Option<u64>> = parsed
        .path_segments()?
        .map(trailing_number)
        .collect();

    ids.windows(2).rev().find_map(|pair| match pair {
        [Some(series_id), Some(match_id)] => Some(MatchIds {
            series_id: *series_id,
            match_id: *match_id,
        }),
        _ => None,
    })
}

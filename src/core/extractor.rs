//! Turns the assistant's free-form reply into narrative fragments and cruise
//! offer cards.
//!
//! An offer block opens on a `Departure/Return` line and closes on the first
//! following line that carries a URL (or at end of input). Each closed block
//! is scanned for its fields independently; a block with no recognizable
//! field is put back into the narrative. The layout always lists every
//! fragment before every offer.

use std::sync::LazyLock;

use regex::Regex;

use crate::domain::model::{CruiseOffer, ReplyLayout, TextFragment};

// 行首可能帶的 markdown 裝飾：項目符號、編號、粗體
const DECOR: &str = r"^(?:[-*•]\s*|\d+[.)]\s*)?(?:\*\*|__)?\s*";

fn pattern(source: &str) -> Regex {
    Regex::new(source).expect("extractor patterns are valid")
}

static DEPARTURE_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    pattern(&format!(
        r"(?i){DECOR}(?:departure\s*/\s*return|отправление\s*/\s*возвращение)\s*(?:\*\*|__)?\s*:?\s*(?:\*\*|__)?\s*"
    ))
});

static ROUTE_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    pattern(&format!(
        r"(?i){DECOR}(?:route|маршрут)\s*(?:\*\*|__)?\s*:\s*(?:\*\*|__)?\s*"
    ))
});

static FIELD_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    pattern(&format!(
        r"(?i){DECOR}(?:nights|price|link|ночей|ночи|цена|стоимость|ссылка)\b"
    ))
});

// 同一行裡出現的欄位關鍵字，路線到這裡為止
static FIELD_KEYWORD: LazyLock<Regex> = LazyLock::new(|| {
    pattern(r"(?i)\b(?:nights|price|link|ночей|ночи|цена|стоимость|ссылка)\b")
});

static URL: LazyLock<Regex> = LazyLock::new(|| pattern(r#"https?://[^\s<>"'()\[\]]+"#));

static PRICE: LazyLock<Regex> = LazyLock::new(|| {
    pattern(
        r"(?i)(?:price|цена|стоимость)\s*(?:\*\*|__)?\s*:?\s*(?:\*\*|__)?\s*(?:from\s+|от\s+)?[$€£₽]?\s*(\d[\d \x{A0}\x{202F}]*)",
    )
});

static NIGHTS_LABELED: LazyLock<Regex> = LazyLock::new(|| {
    pattern(r"(?i)(?:nights|ночей|ночи)\s*(?:\*\*|__)?\s*:\s*(?:\*\*|__)?\s*(\d+)")
});

static NIGHTS_COUNT: LazyLock<Regex> =
    LazyLock::new(|| pattern(r"(?i)\b(\d+)[\s-]*(?:nights?|ноч(?:ей|и|ь))\b"));

#[derive(Debug, Clone, Copy, Default)]
pub struct OfferExtractor;

impl OfferExtractor {
    pub fn new() -> Self {
        Self
    }

    pub fn extract(&self, text: &str) -> ReplyLayout {
        extract_layout(text)
    }
}

pub fn is_block_start(line: &str) -> bool {
    DEPARTURE_MARKER.is_match(line)
}

pub fn extract_layout(text: &str) -> ReplyLayout {
    let mut layout = ReplyLayout::default();
    let mut narrative: Vec<&str> = Vec::new();
    let mut block: Vec<&str> = Vec::new();
    let mut in_block = false;

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if in_block {
            block.push(line);
            if URL.is_match(line) {
                flush_block(&mut block, &mut narrative, &mut layout);
                in_block = false;
            }
        } else if is_block_start(line) {
            in_block = true;
            block.push(line);
        } else {
            narrative.push(line);
        }
    }

    // 沒遇到連結就結束的區塊也照同樣規則處理
    if in_block {
        flush_block(&mut block, &mut narrative, &mut layout);
    }
    close_fragment(&mut narrative, &mut layout);

    layout
}

fn flush_block<'a>(
    block: &mut Vec<&'a str>,
    narrative: &mut Vec<&'a str>,
    layout: &mut ReplyLayout,
) {
    let offer = parse_block(block);
    if offer.has_content() {
        close_fragment(narrative, layout);
        layout.offers.push(offer);
    } else {
        narrative.append(block);
    }
    block.clear();
}

fn close_fragment(narrative: &mut Vec<&str>, layout: &mut ReplyLayout) {
    if !narrative.is_empty() {
        layout.fragments.push(TextFragment(narrative.join("\n")));
        narrative.clear();
    }
}

pub fn parse_block(lines: &[&str]) -> CruiseOffer {
    let joined = lines.join("\n");

    CruiseOffer {
        nights: find_nights(&joined),
        price: find_price(&joined),
        url: find_url(&joined),
        departure: find_departure(lines),
        route_list: find_route(lines),
    }
}

fn find_url(text: &str) -> String {
    URL.find(text)
        .map(|m| {
            m.as_str()
                .trim_end_matches(['.', ',', ';', ':', '!', '?', '*'])
                .to_string()
        })
        .unwrap_or_default()
}

fn find_price(text: &str) -> String {
    PRICE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().replace(['\u{a0}', '\u{202f}'], " ").trim_end().to_string())
        .unwrap_or_default()
}

fn find_nights(text: &str) -> String {
    NIGHTS_LABELED
        .captures(text)
        .or_else(|| NIGHTS_COUNT.captures(text))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

fn find_departure(lines: &[&str]) -> String {
    lines
        .iter()
        .find_map(|line| {
            DEPARTURE_MARKER
                .find(line)
                .map(|m| clean_value(&line[m.end()..]))
        })
        .unwrap_or_default()
}

fn find_route(lines: &[&str]) -> Vec<String> {
    let Some(start) = lines.iter().position(|line| ROUTE_LABEL.is_match(line)) else {
        return Vec::new();
    };

    let first = ROUTE_LABEL
        .find(lines[start])
        .map_or("", |m| &lines[start][m.end()..]);
    let rest = lines[start + 1..]
        .iter()
        .take_while(|line| !is_field_line(line))
        .copied();

    let mut pieces = Vec::new();
    for piece in std::iter::once(first).chain(rest) {
        match FIELD_KEYWORD.find(piece) {
            Some(m) => {
                pieces.push(&piece[..m.start()]);
                break;
            }
            None => pieces.push(piece),
        }
    }

    pieces
        .iter()
        .flat_map(|piece| piece.split(['→', ',']))
        .map(clean_stop)
        .filter(|stop| !stop.is_empty())
        .collect()
}

fn is_field_line(line: &str) -> bool {
    FIELD_LABEL.is_match(line)
        || NIGHTS_COUNT.is_match(line)
        || URL.is_match(line)
        || is_block_start(line)
}

fn clean_value(value: &str) -> String {
    value
        .trim()
        .trim_matches(['*', '_'])
        .trim()
        .to_string()
}

fn clean_stop(stop: &str) -> String {
    stop.trim()
        .trim_matches(['-', '*', '•', '_'])
        .trim()
        .to_string()
}

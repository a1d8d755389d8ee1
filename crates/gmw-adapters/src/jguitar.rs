//! J-Guitar: table/cell heuristic with a container fallback.
//!
//! Listings live in table rows without any stable classes, so cells are
//! scored by a product-name classifier and the price is searched in the same
//! cell, then its row siblings. When the tables yield too little, classed
//! containers are scanned the same way with parent/next-sibling price
//! lookup.

use std::collections::HashSet;
use std::sync::LazyLock;

use gmw_core::{extract_price, ProductRecord, StoreKey};
use scraper::{ElementRef, Html, Selector};

use crate::{element_text, resolve_link, ParseContext, SourceParser, ANCHOR};

/// UI-chrome vocabulary that disqualifies a cell as a listing name.
const NOISE_TERMS: &[&str] = &[
    "詳細", "detail", "価格", "price", "在庫", "stock", "送料", "shipping", "ログイン",
    "login", "メニュー", "menu", "カート", "cart", "検索", "search", "年", "月", "日",
    "お問い合わせ", "contact", "ページ", "page",
];

/// Vocabulary that marks a cell as a plausible listing name: brands, makers,
/// instrument/material terms, model/vintage tokens, scale lengths.
const POSITIVE_INDICATORS: &[&str] = &[
    "yamaha", "gibson", "fender", "martin", "taylor", "ibanez",
    "ramirez", "hernandez", "cordoba", "godin", "alhambra",
    "河野", "桜井", "黒澤", "中村", "kohno", "sakurai",
    "classical", "flamenco", "guitar", "ギター", "クラシック", "フラメンコ",
    "nylon", "ナイロン", "cedar", "spruce", "rosewood", "ebony",
    "セダー", "スプルース", "ローズウッド", "エボニー",
    "19", "20", "model", "no.", "#", "vintage", "ヴィンテージ",
    "650mm", "640mm", "630mm", "scale", "top", "back", "side",
];

/// Fall back to container scanning when the tables produce fewer hits.
const MIN_TABLE_RESULTS: usize = 5;

const MAX_RESULTS: usize = 15;

static TABLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("table").unwrap());
static ROW: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").unwrap());
static CELL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td, th").unwrap());
static CLASSED_DIV: LazyLock<Selector> = LazyLock::new(|| Selector::parse("div[class]").unwrap());

pub struct JguitarParser;

impl SourceParser for JguitarParser {
    fn store(&self) -> StoreKey {
        StoreKey::Jguitar
    }

    fn parse(&self, html: &str, ctx: &ParseContext) -> Vec<ProductRecord> {
        let document = Html::parse_document(html);
        let mut records = Vec::new();

        for table in document.select(&TABLE) {
            for row in table.select(&ROW) {
                let cells: Vec<ElementRef> = row.select(&CELL).collect();
                if cells.len() < 2 {
                    continue;
                }

                let mut name = None;
                let mut price = None;
                let mut link = ctx.base_url.to_string();
                for cell in &cells {
                    let text = element_text(*cell).trim().to_string();
                    if !is_likely_product_name(&text) {
                        continue;
                    }
                    price = price_in_cell_or_row(*cell, &cells);
                    if let Some(anchor) = cell.select(&ANCHOR).next() {
                        if let Some(href) = anchor.value().attr("href") {
                            link = resolve_link(&ctx.base_url, href);
                        }
                    }
                    name = Some(text);
                    break;
                }

                let Some(name) = name else {
                    continue;
                };
                // Last resort: any price anywhere in the row.
                let price = price.or_else(|| {
                    cells
                        .iter()
                        .find_map(|cell| extract_price(&element_text(*cell)))
                });
                if let Some(price) = price {
                    records.push(ProductRecord::new(
                        StoreKey::Jguitar,
                        &name,
                        price,
                        link,
                        ctx.fetched_at,
                    ));
                }
            }
        }

        if records.len() < MIN_TABLE_RESULTS {
            records.extend(container_fallback(&document, ctx));
        }

        let mut seen = HashSet::new();
        records.retain(|record| seen.insert(record.name.clone()));
        records.truncate(MAX_RESULTS);
        records
    }
}

/// Product-name classifier: length bounds plus positive vocabulary, minus
/// UI chrome.
pub(crate) fn is_likely_product_name(text: &str) -> bool {
    let len = text.chars().count();
    if len < 10 {
        return false;
    }
    let lower = text.to_lowercase();
    if NOISE_TERMS.iter().any(|term| lower.contains(term)) {
        return false;
    }
    let has_positive = POSITIVE_INDICATORS
        .iter()
        .any(|indicator| lower.contains(indicator));
    has_positive && len <= 150
}

fn price_in_cell_or_row(cell: ElementRef, cells: &[ElementRef]) -> Option<String> {
    if let Some(price) = extract_price(&element_text(cell)) {
        return Some(price);
    }
    cells
        .iter()
        .find_map(|other| extract_price(&element_text(*other)))
}

fn container_fallback(document: &Html, ctx: &ParseContext) -> Vec<ProductRecord> {
    let mut records = Vec::new();
    for div in document.select(&CLASSED_DIV) {
        let text = element_text(div).trim().to_string();
        if !is_likely_product_name(&text) {
            continue;
        }
        let mut price = div
            .parent()
            .and_then(ElementRef::wrap)
            .and_then(|parent| extract_price(&element_text(parent)));
        if price.is_none() {
            price = next_sibling_element(div).and_then(|sib| extract_price(&element_text(sib)));
        }
        let Some(price) = price else {
            continue;
        };
        records.push(ProductRecord::new(
            StoreKey::Jguitar,
            &text,
            price,
            ctx.base_url.to_string(),
            ctx.fetched_at,
        ));
    }
    records
}

fn next_sibling_element(el: ElementRef) -> Option<ElementRef> {
    el.next_siblings().find_map(ElementRef::wrap)
}

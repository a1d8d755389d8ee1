//! 黒澤楽器店: line-window heuristic with a 7-line price window.
//!
//! The catalog renders brand and model on adjacent text lines with the price
//! a few lines below; listing URLs are not line-local, so they are resolved
//! positionally against the page's `/items/` link list in match order.

use std::sync::LazyLock;

use gmw_core::{ProductRecord, StoreKey};
use regex::Regex;
use scraper::{Html, Selector};

use crate::{resolve_link, text_lines, ParseContext, SourceParser};

const BRAND_LINES: &[&str] = &[
    "Juan Hernandez", "Gibson", "Cordoba", "ARIA", "YAMAHA", "その他", "桜井 正毅",
];

/// Stock/state vocabulary that disqualifies the line after a brand line from
/// being a model line.
const SKIP_MODEL_TERMS: &[&str] = &["在庫", "状態", "ポイント", "送料"];

/// Price window after the brand line.
const PRICE_WINDOW: usize = 7;

/// The page mixes listings with recommendation carousels; everything past
/// this many matches is noise in practice.
const MAX_RESULTS: usize = 15;

static LINE_PRICE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"¥\s*([\d,]+)").unwrap());

static ITEM_LINK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"a[href*="/items/"]"#).unwrap());

pub struct KurosawaParser;

impl SourceParser for KurosawaParser {
    fn store(&self) -> StoreKey {
        StoreKey::Kurosawa
    }

    fn parse(&self, html: &str, ctx: &ParseContext) -> Vec<ProductRecord> {
        let document = Html::parse_document(html);
        let lines = text_lines(&document);
        let item_links: Vec<String> = document
            .select(&ITEM_LINK)
            .filter_map(|a| a.value().attr("href"))
            .map(|href| resolve_link(&ctx.base_url, href))
            .collect();

        let mut records = Vec::new();
        let mut i = 0;
        while i < lines.len() {
            let line = &lines[i];
            let is_brand_line = BRAND_LINES.iter().any(|brand| line.contains(brand))
                && line.split_whitespace().count() <= 4;
            if !is_brand_line {
                i += 1;
                continue;
            }

            let Some(model_line) = lines.get(i + 1) else {
                i += 1;
                continue;
            };
            if SKIP_MODEL_TERMS.iter().any(|term| model_line.contains(term)) {
                i += 1;
                continue;
            }

            let mut price = None;
            for candidate in lines.iter().skip(i + 1).take(PRICE_WINDOW) {
                if let Some(caps) = LINE_PRICE.captures(candidate) {
                    price = Some(format!("¥{}", &caps[1]));
                    break;
                }
            }
            let Some(price) = price else {
                i += 2;
                continue;
            };

            // Listing URL by match order; the base URL once links run out.
            let link = item_links
                .get(records.len())
                .cloned()
                .unwrap_or_else(|| ctx.base_url.to_string());

            let full_name = format!("{line} {model_line}");
            records.push(ProductRecord::new(
                StoreKey::Kurosawa,
                &full_name,
                price,
                link,
                ctx.fetched_at,
            ));
            i += 2;
        }

        records.truncate(MAX_RESULTS);
        records
    }
}

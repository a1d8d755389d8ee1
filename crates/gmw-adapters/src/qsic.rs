//! QSic: line-window heuristic with a 3-line price window.
//!
//! Used-instrument listings are text blocks led by a line carrying the
//! returnable marker 【返品OK】; the following line contributes condition and
//! description, and the tax-inclusive price sits within the next three lines.
//! The page offers no per-listing URLs, so records link to the store base.

use std::sync::LazyLock;

use gmw_core::{ProductRecord, StoreKey};
use regex::Regex;
use scraper::Html;

use crate::{text_lines, ParseContext, SourceParser};

const RETURNABLE_MARKER: &str = "【返品OK】";

/// Price window after the name line.
const PRICE_WINDOW: usize = 3;

static CONDITION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[([^\]]+)\]").unwrap());

static TAXED_PRICE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([\d,]+)円\(税込\)").unwrap());

pub struct QsicParser;

impl SourceParser for QsicParser {
    fn store(&self) -> StoreKey {
        StoreKey::Qsic
    }

    fn parse(&self, html: &str, ctx: &ParseContext) -> Vec<ProductRecord> {
        let document = Html::parse_document(html);
        let lines = text_lines(&document);

        let mut records = Vec::new();
        let mut i = 0;
        while i < lines.len() {
            let line = &lines[i];
            if !(line.contains(RETURNABLE_MARKER) && line.contains('[') && line.contains(']')) {
                i += 1;
                continue;
            }

            let name = match line.split_once(RETURNABLE_MARKER) {
                Some((head, _)) => head.trim(),
                None => line.trim(),
            };

            let mut condition = String::new();
            let mut description = String::new();
            if let Some(next_line) = lines.get(i + 1) {
                if next_line.starts_with('[') && next_line.contains(']') {
                    if let Some(caps) = CONDITION.captures(next_line) {
                        condition = caps[1].to_string();
                    }
                    if let Some((_, rest)) = next_line.split_once(']') {
                        description = rest.trim().to_string();
                    }
                }
            }

            let mut price = None;
            for candidate in lines.iter().skip(i + 1).take(PRICE_WINDOW) {
                if candidate.contains("円(税込)") {
                    if let Some(caps) = TAXED_PRICE.captures(candidate) {
                        price = Some(format!("¥{}", &caps[1]));
                    }
                    break;
                }
            }
            let Some(price) = price else {
                i += 1;
                continue;
            };

            let mut full_name = name.to_string();
            if !condition.is_empty() {
                full_name.push_str(&format!(" [{condition}]"));
            }
            if !description.is_empty() {
                full_name.push_str(&format!(" {description}"));
            }

            records.push(ProductRecord::new(
                StoreKey::Qsic,
                &full_name,
                price,
                ctx.base_url.to_string(),
                ctx.fetched_at,
            ));
            i += 3;
        }

        records
    }
}
